//! The mutable filename state threaded through stage execution.

use super::context::RunContext;

/// Tracks the "current" filenames feeding the next stage.
///
/// The state starts as the user-supplied FASTQ path(s); each stage with
/// tracked outputs replaces them with its own. In live runs the engine
/// verifies every tracked output exists on disk before advancing, so the
/// current filenames always refer to real files. In dry runs the state
/// advances through the statically predicted names so the full command
/// sequence renders correctly.
pub struct PipelineState {
    current: Vec<String>,
    final_bam: Option<String>,
}

impl PipelineState {
    /// Seeds the state with the run's raw input file(s).
    pub fn new(ctx: &RunContext) -> Self {
        let mut current = vec![ctx.fastq1.to_string_lossy().into_owned()];
        if let Some(fastq2) = &ctx.fastq2 {
            current.push(fastq2.to_string_lossy().into_owned());
        }

        PipelineState {
            current,
            final_bam: None,
        }
    }

    /// The filenames feeding the next stage.
    pub fn current(&self) -> &[String] {
        &self.current
    }

    /// Replaces the current filenames with a completed stage's outputs.
    /// Stages with no tracked outputs leave the state untouched.
    pub fn advance(&mut self, outputs: Vec<String>) {
        if !outputs.is_empty() {
            self.current = outputs;
        }
    }

    /// Records the post-cleanup name of the final BAM.
    pub fn set_final_bam(&mut self, filename: String) {
        self.final_bam = Some(filename);
    }

    /// The post-cleanup name of the final BAM, once cleanup has run.
    pub fn final_bam(&self) -> Option<&str> {
        self.final_bam.as_deref()
    }
}
