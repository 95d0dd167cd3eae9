use crate::error::Result;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs::File;
use std::hash::Hash;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Dynamic Enum
/// bidirectional element <-> index table, used to intern names and to permute ids
#[derive(Debug, Clone)]
pub struct DynamicEnum<T> {
    _elt_to_idx: HashMap<T, usize>, // element to index
    _idx_to_elt: Vec<T>,            // index to element
}

impl<T> Default for DynamicEnum<T>
where
    T: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> DynamicEnum<T>
where
    T: Eq + Hash + Clone,
{
    /// an empty object
    pub fn new() -> Self {
        DynamicEnum {
            _idx_to_elt: Vec::<T>::new(),
            _elt_to_idx: HashMap::<T, usize>::new(),
        }
    }
    /// construct from slice, duplicated elements keep their first index
    pub fn from(vec: &[T]) -> Self {
        let mut d = DynamicEnum::new();
        vec.iter().for_each(|e| {
            d.add_if_new(e.clone());
        });
        d
    }
    /// add element if new
    /// return indices whether new or not
    pub fn add_if_new(&mut self, element: T) -> usize {
        if let Some(&idx) = self._elt_to_idx.get(&element) {
            return idx;
        }
        let idx = self._idx_to_elt.len();
        self._idx_to_elt.push(element.clone());
        self._elt_to_idx.insert(element, idx);
        idx
    }
    /// get index of element
    pub fn index_of(&self, element: &T) -> Option<usize> {
        self._elt_to_idx.get(element).copied()
    }
    /// get element at position of index
    pub fn elt_of(&self, idx: usize) -> Option<&T> {
        self._idx_to_elt.get(idx)
    }
    pub fn size(&self) -> usize {
        self._idx_to_elt.len()
    }
    pub fn get_vec(&self) -> &Vec<T> {
        &self._idx_to_elt
    }

    /// inplace shuffle
    pub fn shuffle<R>(&mut self, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        self._idx_to_elt.shuffle(rng);
        self._idx_to_elt.iter().enumerate().for_each(|(i, e)| {
            self._elt_to_idx.insert(e.clone(), i);
        });
    }
}

/// Read a tab-delimited file with a header row into typed records.
/// Lines starting with '#' are skipped.
pub fn read_tsv<T, P>(file_path: P) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(file_path)?;
    let mut records = Vec::new();
    for result in rdr.deserialize() {
        records.push(result?);
    }
    Ok(records)
}

/// Read one name per line, skipping blanks and '#' comments.
pub fn read_name_list<P: AsRef<Path>>(file_path: P) -> Result<Vec<String>> {
    let input = File::open(file_path)?;
    let buffered = BufReader::new(input);
    let mut names = Vec::new();
    for line in buffered.lines() {
        let line = line?;
        let name = line.trim();
        if name.is_empty() || name.starts_with('#') {
            continue;
        }
        names.push(name.to_string());
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use serde::Deserialize;
    use std::io::Write;

    #[test]
    fn test_dynum() {
        let vec = vec!["A", "B", "C", "D"];
        let mut dynum = DynamicEnum::from(&vec);
        let x = dynum.add_if_new("E");
        let y = dynum.index_of(&"C").unwrap();
        let z = *dynum.elt_of(1).unwrap();
        assert_eq!(x, 4);
        assert_eq!(y, 2);
        assert_eq!(z, "B");
        assert_eq!(dynum.add_if_new("A"), 0);
        assert_eq!(dynum.size(), 5);
    }

    #[test]
    fn test_dynum_shuffle_keeps_bijection() {
        let vec: Vec<u64> = (0..50).collect();
        let mut dynum = DynamicEnum::from(&vec);
        let mut rng = SmallRng::seed_from_u64(11);
        dynum.shuffle(&mut rng);
        assert_eq!(dynum.size(), 50);
        for i in 0..50 {
            let e = *dynum.elt_of(i).unwrap();
            assert_eq!(dynum.index_of(&e), Some(i));
        }
        let mut sorted = dynum.get_vec().clone();
        sorted.sort();
        assert_eq!(sorted, vec);
    }

    #[derive(Debug, Deserialize)]
    struct Row {
        probe: String,
        gene: String,
    }

    #[test]
    fn test_read_tsv_and_names() {
        let mut tsv = tempfile::NamedTempFile::new().unwrap();
        writeln!(tsv, "probe\tgene").unwrap();
        writeln!(tsv, "# comment").unwrap();
        writeln!(tsv, "p1\tTP53").unwrap();
        writeln!(tsv, "p2\tMDM2").unwrap();
        let rows: Vec<Row> = read_tsv(tsv.path()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].probe, "p2");
        assert_eq!(rows[1].gene, "MDM2");

        let mut list = tempfile::NamedTempFile::new().unwrap();
        writeln!(list, "TP53\n\n# skip\nMDM2 ").unwrap();
        let names = read_name_list(list.path()).unwrap();
        assert_eq!(names, vec!["TP53".to_string(), "MDM2".to_string()]);
    }
}
