//! The immutable context describing a single pipeline run.

use std::fmt;
use std::path::PathBuf;

use anyhow::bail;

use crate::utils::sample::{derive_sample_name, SuffixGrammar};

/// Sequencing layout of the input reads, detected from the argument count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// One FASTQ file per fragment.
    Single,

    /// R1/R2 FASTQ mates.
    Paired,
}

impl Mode {
    /// The layout flag understood by the deduplication and methylation
    /// extraction tools.
    pub fn tool_flag(&self) -> &'static str {
        match self {
            Mode::Single => "-s",
            Mode::Paired => "-p",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Single => write!(f, "single-end"),
            Mode::Paired => write!(f, "paired-end"),
        }
    }
}

/// Everything fixed about a run at startup: inputs, layout, genome index,
/// and where the log lives. Created once from the parsed arguments and
/// never mutated afterwards; the evolving filename state lives in
/// [`PipelineState`](crate::pipeline::state::PipelineState).
pub struct RunContext {
    /// Canonical sample name derived from the primary FASTQ filename.
    pub sample: String,

    /// Sequencing layout of the input reads.
    pub mode: Mode,

    /// Primary (R1) input FASTQ.
    pub fastq1: PathBuf,

    /// Secondary (R2) input FASTQ in paired-end mode.
    pub fastq2: Option<PathBuf>,

    /// Genome index directory handed to the aligner.
    pub genome: PathBuf,

    /// When set, commands are logged but never executed.
    pub dry_run: bool,

    /// Directory the run confines its outputs to.
    pub workdir: PathBuf,

    /// Path of the per-sample run log.
    pub log_path: PathBuf,
}

impl RunContext {
    /// Resolves the run context from the positional arguments: two paths
    /// are single-end `(FASTQ, GENOME_INDEX_DIR)`, three are paired-end
    /// `(R1, R2, GENOME_INDEX_DIR)`. The run is confined to the current
    /// directory.
    pub fn from_inputs(inputs: &[PathBuf], dry_run: bool) -> anyhow::Result<Self> {
        Self::in_workdir(inputs, dry_run, PathBuf::from("."))
    }

    /// Same as [`RunContext::from_inputs`], but confines the run (its log
    /// and all derived files) to `workdir`.
    pub fn in_workdir(inputs: &[PathBuf], dry_run: bool, workdir: PathBuf) -> anyhow::Result<Self> {
        let (fastq1, fastq2, genome, mode) = match inputs {
            [fastq, genome] => (fastq.clone(), None, genome.clone(), Mode::Single),
            [r1, r2, genome] => (r1.clone(), Some(r2.clone()), genome.clone(), Mode::Paired),
            _ => bail!(
                "expected <FASTQ> <GENOME_INDEX_DIR> or <R1> <R2> <GENOME_INDEX_DIR>, \
                got {} positional arguments",
                inputs.len()
            ),
        };

        let filename = match fastq1.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => bail!("input is not a file path: {}", fastq1.display()),
        };

        let sample = derive_sample_name(&filename, &SuffixGrammar::default());
        let log_path = workdir.join(format!("{}.log", sample));

        Ok(RunContext {
            sample,
            mode,
            fastq1,
            fastq2,
            genome,
            dry_run,
            workdir,
            log_path,
        })
    }
}
