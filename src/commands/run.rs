//! Functionality related to the main `rrbs` command itself.

use std::path::PathBuf;

use clap::Parser;
use tracing::{debug, info};

use crate::pipeline::context::RunContext;
use crate::pipeline::engine;

/// Clap arguments for the `rrbs` command line.
#[derive(Parser)]
#[command(name = "rrbs")]
#[command(about = "Drives an RRBS methylation analysis pipeline over one sample: \
    quality control, adapter trimming, bisulfite alignment, deduplication, \
    methylation extraction, and report aggregation.")]
pub struct RunArgs {
    /// Input FASTQ file(s) followed by the genome index directory. Two
    /// arguments (`<FASTQ> <GENOME_INDEX_DIR>`) run single-end; three
    /// (`<R1> <R2> <GENOME_INDEX_DIR>`) run paired-end.
    #[arg(value_name = "FASTQ|GENOME_INDEX_DIR", num_args = 2..=3, required = true)]
    pub inputs: Vec<PathBuf>,

    /// Log every command without executing any external tool.
    #[arg(long)]
    pub dry_run: bool,

    /// Only errors are printed to the stderr stream.
    #[arg(short, long)]
    pub quiet: bool,

    /// All available information, including debug information, is printed
    /// to stderr.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Main function for the `rrbs` command.
pub fn run(args: RunArgs) -> anyhow::Result<()> {
    let ctx = RunContext::from_inputs(&args.inputs, args.dry_run)?;

    info!("Starting pipeline run.");
    debug!("  [*] Sample: {}", ctx.sample);
    debug!("  [*] Mode: {}", ctx.mode);
    debug!("  [*] Genome: {}", ctx.genome.display());
    debug!("  [*] Log: {}", ctx.log_path.display());

    let summary = engine::run(&ctx)?;
    print!("{}", summary.render());

    anyhow::Ok(())
}
