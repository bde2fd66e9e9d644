//! The ordered registry of pipeline stages and the filename conventions
//! coupling them.
//!
//! Each external tool renames its inputs according to its own convention,
//! and the next stage must predict the exact output name of the previous
//! one. Those predictions are centralized here so convention drift fails
//! loudly in one place instead of surfacing as a confusing error from the
//! next tool. Command builders assemble explicit argument lists; nothing is
//! ever interpolated through a shell.

use super::context::{Mode, RunContext};
use super::state::PipelineState;
use crate::utils::filename::tag_before_extension;

/// Quality control tool (stage 1).
pub const QC_TOOL: &str = "fastqc";

/// Adapter trimming tool (stage 2).
pub const TRIM_TOOL: &str = "trim_galore";

/// Bisulfite aligner (stage 3).
pub const ALIGN_TOOL: &str = "bismark";

/// Alignment deduplication tool (stage 4).
pub const DEDUP_TOOL: &str = "deduplicate_bismark";

/// Methylation extraction tool (stage 5).
pub const EXTRACT_TOOL: &str = "bismark_methylation_extractor";

/// Report aggregation tool (stage 6).
pub const REPORT_TOOL: &str = "multiqc";

/// Fixed name of the combined report produced by stage 6.
pub const REPORT_FILENAME: &str = "multiqc_report.html";

/// Ordinal of the methylation extraction stage, after which the engine
/// cleans up intermediate files.
pub const EXTRACTION_STAGE: usize = 5;

/// A single pipeline stage: its position, display name, and the two
/// functions tying it into the filename chain.
pub struct Stage {
    /// Ordinal position of the stage, 1 through 6.
    pub ordinal: usize,

    /// Human-readable stage name used in log section headers.
    pub name: &'static str,

    /// Builds the stage's argument list from the run context and the
    /// current filenames.
    pub command: fn(&RunContext, &PipelineState) -> Vec<String>,

    /// The filenames the stage is expected to produce. Empty when nothing
    /// downstream consumes the stage's files by name.
    pub outputs: fn(&RunContext) -> Vec<String>,
}

/// The six stages of the pipeline, in execution order.
pub fn registry() -> [Stage; 6] {
    [
        Stage {
            ordinal: 1,
            name: "quality control",
            command: quality_control,
            outputs: no_outputs,
        },
        Stage {
            ordinal: 2,
            name: "adapter trimming",
            command: adapter_trimming,
            outputs: trimmed_reads,
        },
        Stage {
            ordinal: 3,
            name: "alignment",
            command: alignment,
            outputs: alignment_outputs,
        },
        Stage {
            ordinal: 4,
            name: "deduplication",
            command: deduplication,
            outputs: dedup_outputs,
        },
        Stage {
            ordinal: 5,
            name: "methylation extraction",
            command: methylation_extraction,
            outputs: no_outputs,
        },
        Stage {
            ordinal: 6,
            name: "report aggregation",
            command: report_aggregation,
            outputs: report_outputs,
        },
    ]
}

/// Trimmed FASTQ names the trimming tool emits for this run.
pub fn trimmed_reads(ctx: &RunContext) -> Vec<String> {
    match ctx.mode {
        Mode::Single => vec![format!("{}.R1_trimmed.fq.gz", ctx.sample)],
        Mode::Paired => vec![
            format!("{}.R1_val_1.fq.gz", ctx.sample),
            format!("{}.R2_val_2.fq.gz", ctx.sample),
        ],
    }
}

/// Name of the BAM the aligner emits for this run.
pub fn alignment_bam(ctx: &RunContext) -> String {
    match ctx.mode {
        Mode::Single => format!("{}.R1_trimmed_bismark_bt2.bam", ctx.sample),
        Mode::Paired => format!("{}.R1_val_1_bismark_bt2_pe.bam", ctx.sample),
    }
}

/// Name of the BAM the deduplication tool emits: the alignment BAM with
/// `.deduplicated` inserted before `.bam`.
pub fn deduplicated_bam(ctx: &RunContext) -> String {
    tag_before_extension(&alignment_bam(ctx), "deduplicated")
}

/// The short canonical name the deduplicated BAM is renamed to at cleanup.
pub fn final_bam(ctx: &RunContext) -> String {
    format!("{}.deduplicated.bam", ctx.sample)
}

fn no_outputs(_: &RunContext) -> Vec<String> {
    Vec::new()
}

fn alignment_outputs(ctx: &RunContext) -> Vec<String> {
    vec![alignment_bam(ctx)]
}

fn dedup_outputs(ctx: &RunContext) -> Vec<String> {
    vec![deduplicated_bam(ctx)]
}

fn report_outputs(_: &RunContext) -> Vec<String> {
    vec![REPORT_FILENAME.to_string()]
}

fn quality_control(_: &RunContext, state: &PipelineState) -> Vec<String> {
    let mut argv = vec![QC_TOOL.to_string()];
    argv.extend(state.current().iter().cloned());
    argv
}

fn adapter_trimming(ctx: &RunContext, state: &PipelineState) -> Vec<String> {
    let mut argv = vec![TRIM_TOOL.to_string(), String::from("--rrbs")];
    if ctx.mode == Mode::Paired {
        argv.push(String::from("--paired"));
    }
    argv.extend(state.current().iter().cloned());
    argv
}

fn alignment(ctx: &RunContext, state: &PipelineState) -> Vec<String> {
    let mut argv = vec![
        ALIGN_TOOL.to_string(),
        String::from("--genome"),
        ctx.genome.to_string_lossy().into_owned(),
    ];

    match state.current() {
        [r1, r2] => {
            argv.push(String::from("-1"));
            argv.push(r1.clone());
            argv.push(String::from("-2"));
            argv.push(r2.clone());
        }
        reads => argv.extend(reads.iter().cloned()),
    }

    argv
}

fn deduplication(ctx: &RunContext, state: &PipelineState) -> Vec<String> {
    let mut argv = vec![
        DEDUP_TOOL.to_string(),
        ctx.mode.tool_flag().to_string(),
        String::from("--bam"),
    ];
    argv.extend(state.current().iter().cloned());
    argv
}

fn methylation_extraction(ctx: &RunContext, state: &PipelineState) -> Vec<String> {
    let mut argv = vec![
        EXTRACT_TOOL.to_string(),
        ctx.mode.tool_flag().to_string(),
        String::from("--comprehensive"),
        String::from("--bedGraph"),
        String::from("--gzip"),
        String::from("-o"),
        String::from("."),
    ];
    argv.extend(state.current().iter().cloned());
    argv
}

fn report_aggregation(_: &RunContext, _: &PipelineState) -> Vec<String> {
    vec![REPORT_TOOL.to_string(), String::from(".")]
}
