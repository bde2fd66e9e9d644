//! Sequential execution of the stage registry against a run context.
//!
//! Stages run strictly in order; each subprocess blocks the driver until it
//! terminates and the first failure aborts the run. Before advancing past a
//! live stage, every filename the registry predicted is checked on disk so
//! that a tool whose naming convention drifted fails here, loudly, instead
//! of as an opaque "file not found" from the next tool.

use std::fs;
use std::path::Path;
use std::process::Command;

use tracing::{debug, info};

use super::context::RunContext;
use super::log::RunLog;
use super::stage::{self, Stage, EXTRACTION_STAGE};
use super::state::PipelineState;
use super::summary::RunSummary;
use crate::errors::{PipelineError, Result};
use crate::utils::display::render_command;
use crate::utils::filename::swap_bam_suffix;

/// Runs the full pipeline for `ctx`, writing the run log as it goes, and
/// returns the summary of a completed run. The first failing stage aborts
/// the run; no stage is ever retried.
pub fn run(ctx: &RunContext) -> Result<RunSummary> {
    let mut log = RunLog::open(&ctx.log_path)?;
    log.header(ctx)?;

    let mut state = PipelineState::new(ctx);
    run_stages(ctx, &stage::registry(), &mut state, &mut log)?;

    let summary = RunSummary::new(ctx, &state);
    log.line("")?;
    log.line(summary.render().trim_end())?;
    log.footer()?;

    Ok(summary)
}

/// Runs `stages` in order, cleaning up intermediates after the extraction
/// stage. Factored out of [`run`] so the engine can be exercised against
/// small stage lists.
fn run_stages(
    ctx: &RunContext,
    stages: &[Stage],
    state: &mut PipelineState,
    log: &mut RunLog,
) -> Result<()> {
    let total = stages.len();

    for stage in stages {
        run_stage(ctx, stage, total, state, log)?;

        if stage.ordinal == EXTRACTION_STAGE {
            cleanup(ctx, state, log)?;
        }
    }

    Ok(())
}

fn run_stage(
    ctx: &RunContext,
    stage: &Stage,
    total: usize,
    state: &mut PipelineState,
    log: &mut RunLog,
) -> Result<()> {
    info!("[{}/{}] {}", stage.ordinal, total, stage.name);
    log.stage_header(stage.ordinal, total, stage.name)?;

    let argv = (stage.command)(ctx, state);
    let rendered = render_command(&argv);
    log.command(&rendered)?;

    let outputs = (stage.outputs)(ctx);

    if !ctx.dry_run {
        execute(ctx, stage, &argv, &rendered, log)?;

        for filename in &outputs {
            if !ctx.workdir.join(filename).exists() {
                let err = PipelineError::StageOutputMissing {
                    ordinal: stage.ordinal,
                    name: stage.name,
                    filename: filename.clone(),
                };
                log.failure(&err.to_string())?;
                return Err(err);
            }
        }
    }

    state.advance(outputs);
    Ok(())
}

fn execute(
    ctx: &RunContext,
    stage: &Stage,
    argv: &[String],
    rendered: &str,
    log: &mut RunLog,
) -> Result<()> {
    debug!("executing: {}", rendered);

    let output = match Command::new(&argv[0])
        .args(&argv[1..])
        .current_dir(&ctx.workdir)
        .output()
    {
        Ok(output) => output,
        Err(err) => {
            let err = if err.kind() == std::io::ErrorKind::NotFound {
                PipelineError::CommandNotFound {
                    command: argv[0].clone(),
                }
            } else {
                PipelineError::Io(err)
            };
            log.failure(&err.to_string())?;
            return Err(err);
        }
    };

    log.captured(&output.stdout, &output.stderr)?;

    if !output.status.success() {
        let err = PipelineError::CommandFailed {
            ordinal: stage.ordinal,
            name: stage.name,
            command: rendered.to_string(),
            code: output.status.code(),
        };
        log.failure(&err.to_string())?;
        return Err(err);
    }

    Ok(())
}

/// Removes intermediates nothing downstream reads (the trimmed FASTQs, the
/// raw alignment BAM, and the methylation-bias report) and renames the
/// deduplicated BAM to its short canonical name, which becomes the run's
/// final BAM. Intermediates that are already absent are skipped without
/// complaint. Dry runs log the same plan but leave the filesystem alone.
fn cleanup(ctx: &RunContext, state: &mut PipelineState, log: &mut RunLog) -> Result<()> {
    let deduplicated = stage::deduplicated_bam(ctx);
    let final_bam = stage::final_bam(ctx);

    log.line("")?;
    log.line("cleanup: removing intermediate files")?;
    for filename in intermediate_files(ctx) {
        log.line(&format!("cleanup: rm {}", filename))?;
        if !ctx.dry_run {
            remove_if_present(&ctx.workdir.join(&filename))?;
        }
    }

    log.line(&format!("cleanup: mv {} {}", deduplicated, final_bam))?;
    if !ctx.dry_run {
        fs::rename(
            ctx.workdir.join(&deduplicated),
            ctx.workdir.join(&final_bam),
        )?;
    }

    state.set_final_bam(final_bam);
    Ok(())
}

/// The intermediate filenames cleanup removes for this run.
fn intermediate_files(ctx: &RunContext) -> Vec<String> {
    let mut files = stage::trimmed_reads(ctx);
    files.push(stage::alignment_bam(ctx));
    files.push(swap_bam_suffix(&stage::deduplicated_bam(ctx), ".M-bias.txt"));
    files
}

fn remove_if_present(path: &Path) -> std::io::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::{Path, PathBuf};

    fn paired_ctx(workdir: &Path, dry_run: bool) -> RunContext {
        let inputs = vec![
            PathBuf::from("SRR1.R1.fastq.gz"),
            PathBuf::from("SRR1.R2.fastq.gz"),
            PathBuf::from("/g/idx"),
        ];
        RunContext::in_workdir(&inputs, dry_run, workdir.to_path_buf()).unwrap()
    }

    fn read_log(ctx: &RunContext) -> String {
        fs::read_to_string(&ctx.log_path).unwrap()
    }

    fn open_log(ctx: &RunContext) -> RunLog {
        RunLog::open(&ctx.log_path).unwrap()
    }

    fn no_outputs(_: &RunContext) -> Vec<String> {
        Vec::new()
    }

    fn sh_ok(_: &RunContext, _: &PipelineState) -> Vec<String> {
        vec!["sh".into(), "-c".into(), "true".into()]
    }

    fn sh_boom(_: &RunContext, _: &PipelineState) -> Vec<String> {
        vec!["sh".into(), "-c".into(), "echo boom; exit 3".into()]
    }

    fn sh_touch(_: &RunContext, _: &PipelineState) -> Vec<String> {
        vec!["sh".into(), "-c".into(), "touch made.txt".into()]
    }

    fn made_txt(_: &RunContext) -> Vec<String> {
        vec![String::from("made.txt")]
    }

    fn never_made(_: &RunContext) -> Vec<String> {
        vec![String::from("never-made.txt")]
    }

    fn missing_tool(_: &RunContext, _: &PipelineState) -> Vec<String> {
        vec!["definitely-not-a-real-tool-1b2e".into()]
    }

    #[test]
    fn test_dry_run_orders_all_six_stages_and_touches_only_the_log() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = paired_ctx(dir.path(), true);

        let summary = run(&ctx).unwrap();
        assert_eq!(summary.final_bam, "SRR1.deduplicated.bam");

        let log = read_log(&ctx);
        let headers = [
            "[1/6] quality control",
            "[2/6] adapter trimming",
            "[3/6] alignment",
            "[4/6] deduplication",
            "[5/6] methylation extraction",
            "[6/6] report aggregation",
        ];
        let mut last = 0;
        for header in headers {
            let at = log.find(header).unwrap_or_else(|| {
                panic!("expected log to contain {:?}", header);
            });
            assert!(at >= last, "stage headers out of order at {:?}", header);
            last = at;
        }

        // The log is the only file a dry run is allowed to create.
        let entries: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(entries, ["SRR1.log"]);
    }

    #[test]
    fn test_dry_run_renders_the_paired_end_command_chain() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = paired_ctx(dir.path(), true);

        run(&ctx).unwrap();
        let log = read_log(&ctx);

        assert!(log.contains(">> fastqc SRR1.R1.fastq.gz SRR1.R2.fastq.gz"));
        assert!(log.contains(">> trim_galore --rrbs --paired SRR1.R1.fastq.gz SRR1.R2.fastq.gz"));
        assert!(log.contains(
            ">> bismark --genome /g/idx -1 SRR1.R1_val_1.fq.gz -2 SRR1.R2_val_2.fq.gz"
        ));
        assert!(log.contains(">> deduplicate_bismark -p --bam SRR1.R1_val_1_bismark_bt2_pe.bam"));
        assert!(log.contains(">> multiqc ."));
    }

    #[test]
    fn test_rendered_commands_do_not_depend_on_the_dry_run_flag() {
        let dir = tempfile::tempdir().unwrap();
        let dry = paired_ctx(dir.path(), true);
        let live = paired_ctx(dir.path(), false);

        let mut dry_state = PipelineState::new(&dry);
        let mut live_state = PipelineState::new(&live);

        for stage in stage::registry() {
            let dry_argv = (stage.command)(&dry, &dry_state);
            let live_argv = (stage.command)(&live, &live_state);
            assert_eq!(dry_argv, live_argv, "stage {} diverged", stage.ordinal);

            dry_state.advance((stage.outputs)(&dry));
            live_state.advance((stage.outputs)(&live));
        }
    }

    #[test]
    fn test_failing_stage_truncates_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = paired_ctx(dir.path(), false);

        let stages = [
            Stage {
                ordinal: 1,
                name: "first",
                command: sh_ok,
                outputs: no_outputs,
            },
            Stage {
                ordinal: 2,
                name: "second",
                command: sh_boom,
                outputs: no_outputs,
            },
            Stage {
                ordinal: 3,
                name: "third",
                command: sh_ok,
                outputs: no_outputs,
            },
        ];

        let mut state = PipelineState::new(&ctx);
        let mut log = open_log(&ctx);
        let err = run_stages(&ctx, &stages, &mut state, &mut log).unwrap_err();

        match err {
            PipelineError::CommandFailed { ordinal, code, .. } => {
                assert_eq!(ordinal, 2);
                assert_eq!(code, Some(3));
            }
            other => panic!("expected CommandFailed, got {:?}", other),
        }

        let log = read_log(&ctx);
        assert!(log.contains("[2/3] second"));
        assert!(log.contains("boom"));
        assert!(log.contains("FAILED:"));
        assert!(!log.contains("[3/3] third"));
    }

    #[test]
    fn test_missing_predicted_output_is_a_named_error() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = paired_ctx(dir.path(), false);

        let stages = [Stage {
            ordinal: 1,
            name: "first",
            command: sh_ok,
            outputs: never_made,
        }];

        let mut state = PipelineState::new(&ctx);
        let mut log = open_log(&ctx);
        let err = run_stages(&ctx, &stages, &mut state, &mut log).unwrap_err();

        match err {
            PipelineError::StageOutputMissing { filename, .. } => {
                assert_eq!(filename, "never-made.txt");
            }
            other => panic!("expected StageOutputMissing, got {:?}", other),
        }

        assert!(read_log(&ctx).contains("never-made.txt"));
    }

    #[test]
    fn test_created_outputs_advance_the_state() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = paired_ctx(dir.path(), false);

        let stages = [Stage {
            ordinal: 1,
            name: "first",
            command: sh_touch,
            outputs: made_txt,
        }];

        let mut state = PipelineState::new(&ctx);
        let mut log = open_log(&ctx);
        run_stages(&ctx, &stages, &mut state, &mut log).unwrap();

        assert_eq!(state.current(), ["made.txt"]);
        assert!(dir.path().join("made.txt").exists());
    }

    #[test]
    fn test_unresolvable_tool_is_a_named_error() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = paired_ctx(dir.path(), false);

        let stages = [Stage {
            ordinal: 1,
            name: "first",
            command: missing_tool,
            outputs: no_outputs,
        }];

        let mut state = PipelineState::new(&ctx);
        let mut log = open_log(&ctx);
        let err = run_stages(&ctx, &stages, &mut state, &mut log).unwrap_err();

        match err {
            PipelineError::CommandNotFound { command } => {
                assert_eq!(command, "definitely-not-a-real-tool-1b2e");
            }
            other => panic!("expected CommandNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_cleanup_removes_intermediates_and_renames_the_final_bam() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = paired_ctx(dir.path(), false);

        for name in [
            "SRR1.R1_val_1.fq.gz",
            "SRR1.R2_val_2.fq.gz",
            "SRR1.R1_val_1_bismark_bt2_pe.bam",
            "SRR1.R1_val_1_bismark_bt2_pe.deduplicated.bam",
            "SRR1.R1_val_1_bismark_bt2_pe.deduplicated.M-bias.txt",
        ] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }

        let mut state = PipelineState::new(&ctx);
        let mut log = open_log(&ctx);
        cleanup(&ctx, &mut state, &mut log).unwrap();

        assert!(dir.path().join("SRR1.deduplicated.bam").exists());
        assert!(!dir.path().join("SRR1.R1_val_1.fq.gz").exists());
        assert!(!dir.path().join("SRR1.R2_val_2.fq.gz").exists());
        assert!(!dir.path().join("SRR1.R1_val_1_bismark_bt2_pe.bam").exists());
        assert!(!dir
            .path()
            .join("SRR1.R1_val_1_bismark_bt2_pe.deduplicated.M-bias.txt")
            .exists());
        assert_eq!(state.final_bam(), Some("SRR1.deduplicated.bam"));
    }

    #[test]
    fn test_cleanup_tolerates_absent_intermediates() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = paired_ctx(dir.path(), false);

        // Only the deduplicated BAM exists; every removal target is absent.
        fs::write(
            dir.path()
                .join("SRR1.R1_val_1_bismark_bt2_pe.deduplicated.bam"),
            b"x",
        )
        .unwrap();

        let mut state = PipelineState::new(&ctx);
        let mut log = open_log(&ctx);
        cleanup(&ctx, &mut state, &mut log).unwrap();

        assert!(dir.path().join("SRR1.deduplicated.bam").exists());
    }
}
