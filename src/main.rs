use anyhow::{Context, Result};
use clap::Parser;
use coexlink::utils::read_name_list;
use coexlink::*;
use log::{info, warn};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Support of coexpression links across datasets, against a shuffled null model
#[derive(Parser, Debug)]
#[command(name = "linkstats", version, about, long_about = None)]
struct Args {
    /// Probe links TSV: dataset, probe1, probe2, score[, taxon]
    #[arg(short = 'L', long)]
    links: PathBuf,
    /// Probe to gene TSV: probe, gene
    #[arg(short = 'g', long = "probeGenes")]
    probe_genes: PathBuf,
    /// Assayed probes TSV: dataset, probe
    #[arg(short, long)]
    assayed: Option<PathBuf>,
    /// Gene universe, one gene per line [default: all mapped genes]
    #[arg(short = 'G', long)]
    genes: Option<PathBuf>,
    #[arg(short, long, default_value = "human")]
    taxon: String,
    /// Drop probes mapping to more than one gene
    #[arg(short, long = "filterNonSpecific")]
    filter_non_specific: bool,
    /// Number of shuffled runs
    #[arg(short, long = "iterationNum", default_value_t = 2)]
    iteration_num: usize,
    /// Write the gene links of every shuffled run
    #[arg(short = 'l', long = "outputShuffledData")]
    output_shuffled_data: bool,
    /// Also tally the unshuffled links
    #[arg(short, long = "realAnalysis")]
    real_analysis: bool,
    /// Minimum support of links written with --outputShuffledData
    #[arg(short, long, default_value_t = 2)]
    stringency: usize,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, default_value_t = 1)]
    threads: usize,
    /// Output file name
    #[arg(short, long = "outFile")]
    out_file: PathBuf,
}

impl Args {
    fn config(&self) -> AnalysisConfig {
        AnalysisConfig {
            taxon: self.taxon.clone(),
            filter_non_specific: self.filter_non_specific,
            num_iterations: self.iteration_num,
            real_analysis: self.real_analysis,
            output_shuffled_data: self.output_shuffled_data,
            stringency: self.stringency,
            seed: self.seed,
            threads: self.threads,
        }
    }
}

fn links_path(out: &Path, tag: &str) -> PathBuf {
    let mut name = out.as_os_str().to_owned();
    name.push(format!(".{}.links.txt", tag));
    PathBuf::from(name)
}

fn dump_links(source: &TsvSource, stats: &LinkStatistics, path: &Path, stringency: usize) -> coexlink::Result<()> {
    let file = File::create(path)?;
    let n = stats.write_links(BufWriter::new(file), stringency, |g| {
        source
            .gene_name(g)
            .map(|s| s.to_string())
            .unwrap_or_else(|| g.to_string())
    })?;
    info!("Wrote {} links to {}", n, path.display());
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let config = args.config();
    config.validate()?;
    let start = Instant::now();

    let source = TsvSource::from_paths(&args.links, &args.probe_genes, args.assayed.as_ref())
        .context("cannot load the link data")?;

    let genes: Vec<GeneId> = match &args.genes {
        Some(path) => {
            let names = read_name_list(path)
                .with_context(|| format!("cannot read gene list {}", path.display()))?;
            let known: Vec<GeneId> = names.iter().filter_map(|n| source.gene_id(n)).collect();
            if known.len() < names.len() {
                warn!("{} of {} listed genes have no probes", names.len() - known.len(), names.len());
            }
            known
        }
        None => source.genes(),
    };
    let datasets = source.datasets();
    info!("Analysing {} datasets over {} genes", datasets.len(), genes.len());

    // fail before the analysis if the report cannot be written
    let out = File::create(&args.out_file)
        .with_context(|| format!("cannot write {}", args.out_file.display()))?;

    let service = LinkStatisticsService::new(&source, &datasets, genes, &config);
    let report = service.run(
        |stats| {
            if config.output_shuffled_data {
                dump_links(&source, stats, &links_path(&args.out_file, "real"), config.stringency)?;
            }
            Ok(())
        },
        |run, stats| {
            if config.output_shuffled_data {
                let path = links_path(&args.out_file, &format!("shuffle{}", run));
                dump_links(&source, stats, &path, config.stringency)?;
            }
            Ok(())
        },
    )?;
    report.write(BufWriter::new(out))?;

    info!(
        "Wrote {} in {:.2?}",
        args.out_file.display(),
        start.elapsed()
    );
    Ok(())
}
