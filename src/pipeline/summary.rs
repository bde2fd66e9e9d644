//! The fixed-format summary block emitted after a completed run.

use super::context::RunContext;
use super::stage::{self, REPORT_FILENAME};
use super::state::PipelineState;
use crate::utils::filename::swap_bam_suffix;

/// Everything the summary block reports, in its fixed key order. Building
/// the summary is pure string templating; nothing here touches the
/// filesystem.
pub struct RunSummary {
    /// Sample name.
    pub sample: String,

    /// Sequencing layout, rendered for display.
    pub mode: String,

    /// Genome index directory.
    pub genome: String,

    /// Final (post-cleanup) BAM filename.
    pub final_bam: String,

    /// Methylation report filename derived from the final BAM; bedGraph and
    /// `.gz` companion files sit alongside it.
    pub methylation_report: String,

    /// Fixed name of the combined QC report.
    pub qc_report: String,

    /// Path of the run log.
    pub log: String,
}

impl RunSummary {
    /// Builds the summary from the run context and the finished pipeline
    /// state. The final BAM is the cleanup rename target, never an
    /// intermediate stage name.
    pub fn new(ctx: &RunContext, state: &PipelineState) -> Self {
        let final_bam = state
            .final_bam()
            .map(str::to_string)
            .unwrap_or_else(|| stage::final_bam(ctx));

        RunSummary {
            sample: ctx.sample.clone(),
            mode: ctx.mode.to_string(),
            genome: ctx.genome.display().to_string(),
            methylation_report: swap_bam_suffix(&final_bam, "_Methylation_report.txt"),
            final_bam,
            qc_report: REPORT_FILENAME.to_string(),
            log: ctx.log_path.display().to_string(),
        }
    }

    /// Renders the summary block with its fixed key order.
    pub fn render(&self) -> String {
        let mut block = String::new();

        block.push_str("---------------- summary ----------------\n");
        block.push_str(&format!("Sample:             {}\n", self.sample));
        block.push_str(&format!("Mode:               {}\n", self.mode));
        block.push_str(&format!("Genome:             {}\n", self.genome));
        block.push_str(&format!("Final BAM:          {}\n", self.final_bam));
        block.push_str(&format!(
            "Methylation report: {} (bedGraph and .gz companions alongside)\n",
            self.methylation_report
        ));
        block.push_str(&format!("QC report:          {}\n", self.qc_report));
        block.push_str(&format!("Log:                {}\n", self.log));
        block.push_str("-----------------------------------------\n");

        block
    }
}
