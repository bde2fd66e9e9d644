//! The append-only per-sample run log.
//!
//! The log is the durable artifact of a run and the primary debugging aid
//! when a tool's naming convention breaks: it carries the timestamped run
//! header, a section header per stage, every rendered command, all captured
//! tool output, any failure notice, the final summary, and a timestamped
//! footer. Entries are only ever appended; re-running a sample appends a
//! fresh run to the same file.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Local;

use super::context::RunContext;

/// Marker prefixed to every rendered command line.
const COMMAND_MARKER: &str = ">>";

/// Marker opening a captured-output block.
const OUTPUT_START: &str = "---- output ----";

/// Marker closing a captured-output block.
const OUTPUT_END: &str = "---- end output ----";

/// Timestamp format used by the run header and footer.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Append-only writer for a run's log file.
pub struct RunLog {
    file: File,
    path: PathBuf,
}

impl RunLog {
    /// Opens the log file in append mode, creating it if needed.
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(RunLog {
            file,
            path: path.to_path_buf(),
        })
    }

    /// Path of the underlying log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one line to the log.
    pub fn line(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.file, "{}", text)
    }

    /// Appends the timestamped run header.
    pub fn header(&mut self, ctx: &RunContext) -> io::Result<()> {
        let started = Local::now().format(TIMESTAMP_FORMAT);

        self.line("========================================")?;
        self.line(&format!("RRBS pipeline run started {}", started))?;
        self.line(&format!("sample: {}", ctx.sample))?;
        self.line(&format!("mode: {}", ctx.mode))?;
        self.line(&format!("genome: {}", ctx.genome.display()))?;
        if ctx.dry_run {
            self.line("dry-run: commands are logged but not executed")?;
        }
        self.line("========================================")
    }

    /// Appends a stage section header, e.g. `[3/6] alignment`.
    pub fn stage_header(&mut self, ordinal: usize, total: usize, name: &str) -> io::Result<()> {
        self.line("")?;
        self.line(&format!("[{}/{}] {}", ordinal, total, name))
    }

    /// Appends a rendered command line prefixed with the command marker.
    pub fn command(&mut self, rendered: &str) -> io::Result<()> {
        self.line(&format!("{} {}", COMMAND_MARKER, rendered))
    }

    /// Appends a captured stdout/stderr block between output markers.
    pub fn captured(&mut self, stdout: &[u8], stderr: &[u8]) -> io::Result<()> {
        self.line(OUTPUT_START)?;
        self.write_lossy(stdout)?;
        self.write_lossy(stderr)?;
        self.line(OUTPUT_END)
    }

    /// Appends a failure notice.
    pub fn failure(&mut self, notice: &str) -> io::Result<()> {
        self.line(&format!("FAILED: {}", notice))
    }

    /// Appends the timestamped run footer.
    pub fn footer(&mut self) -> io::Result<()> {
        let finished = Local::now().format(TIMESTAMP_FORMAT);
        self.line("")?;
        self.line(&format!("RRBS pipeline run finished {}", finished))
    }

    fn write_lossy(&mut self, bytes: &[u8]) -> io::Result<()> {
        if bytes.is_empty() {
            return Ok(());
        }

        let text = String::from_utf8_lossy(bytes);
        write!(self.file, "{}", text)?;
        if !text.ends_with('\n') {
            writeln!(self.file)?;
        }

        Ok(())
    }
}
