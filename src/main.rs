use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;
use env_logger::Env;
use log::info;

use rugaps::io::{read_table, write_table, write_table_to_path};
use rugaps::options::DEFAULT_TARGET_GAP_WIDTH;
use rugaps::ShortenOptions;

/// Rescale exon and intron coordinates so long introns are drawn compressed.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Exon table with seqnames, start, end and strand columns
    #[arg(short = 'e', long = "exons", value_name = "TABLE")]
    exons: PathBuf,

    /// Intron table; derived from the exons of each group when omitted
    #[arg(short = 'i', long = "introns", value_name = "TABLE")]
    introns: Option<PathBuf>,

    /// Column(s) identifying a transcript, e.g. transcript_id
    #[arg(short = 'g', long = "group-by", value_delimiter = ',')]
    group_by: Vec<String>,

    /// Gaps wider than this are drawn at this width
    #[arg(short = 'w', long = "target-gap-width", default_value_t = DEFAULT_TARGET_GAP_WIDTH)]
    target_gap_width: i64,

    /// Field separator of input and output tables
    #[arg(short = 's', long = "separator", default_value_t = '\t')]
    separator: char,

    /// Output path; stdout when omitted
    #[arg(short = 'o', long = "output", value_name = "TABLE")]
    output: Option<PathBuf>,

    /// Only log warnings and errors
    #[arg(short = 'q', long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    if !args.separator.is_ascii() {
        bail!("separator must be a single ASCII character, got {:?}", args.separator);
    }
    let separator = args.separator as u8;

    let options = ShortenOptions::new()
        .with_target_gap_width(args.target_gap_width)
        .with_group_by(args.group_by.iter().cloned());
    options.validate()?;

    let start = Instant::now();
    let exons = read_table(&args.exons, separator)
        .with_context(|| format!("failed to read exons from {}", args.exons.display()))?;

    let introns = match &args.introns {
        Some(path) => read_table(path, separator)
            .with_context(|| format!("failed to read introns from {}", path.display()))?,
        None => {
            if options.group_by.is_empty() {
                bail!("--group-by is required to derive introns when --introns is not given");
            }
            options.introns_from(&exons)?
        }
    };
    info!(
        "read {} exons and {} introns in {:?}",
        exons.height(),
        introns.height(),
        start.elapsed()
    );

    let mut rescaled = options.shorten(&exons, &introns)?;
    info!(
        "rescaled {} rows with target gap width {}",
        rescaled.height(),
        options.target_gap_width
    );

    match &args.output {
        Some(path) => write_table_to_path(&mut rescaled, path, separator)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => {
            let stdout = std::io::stdout();
            write_table(&mut rescaled, stdout.lock(), separator)?;
        }
    }

    Ok(())
}
