//! Single-track wiggle output: one `(position, value)` stream per contig.
//!
//! The wiggle spec requires one contig per stream, so the writer binds to
//! the contig of the first position it sees and fails fatally on any other
//! contig afterwards; it does not auto-split into multiple outputs. Only
//! the variable-step flavor is supported today (no fixed step, span, or
//! explicit start/step parameters).

use std::fmt::Display;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use thiserror::Error;

/// Error type for wiggle output.
#[derive(Error, Debug)]
pub enum WigError {
    /// Wiggle streams hold exactly one contig; a second contig is fatal
    /// and the writer does not recover.
    #[error("Attempting to write multiple contigs into one wiggle stream: bound to {bound}, got {seen}")]
    MultiContig { bound: String, seen: String },

    /// The underlying sink could not be opened or written.
    #[error("Error writing wiggle output to {dest}")]
    Sink {
        dest: String,
        #[source]
        source: io::Error,
    },
}

/// Result type alias for wiggle operations.
pub type Result<T> = std::result::Result<T, WigError>;

/// Step declaration flavor for the track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepType {
    Fixed,
    Variable,
}

impl Display for StepType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StepType::Fixed => write!(f, "fixedStep"),
            StepType::Variable => write!(f, "variableStep"),
        }
    }
}

/// Writer for one wiggle stream.
///
/// Starts empty; the first [`write_value`](Self::write_value) binds the
/// stream to that position's contig and emits the step declaration header
/// before the first value line. The writer owns its sink exclusively for
/// its lifetime and flushes after every line so streaming consumers see
/// output promptly.
#[derive(Debug)]
pub struct WigWriter<W: Write> {
    out: BufWriter<W>,
    dest: String,
    bound: Option<String>,
    step: StepType,
}

impl WigWriter<File> {
    /// Create a wiggle file at `path`, wrapping open failures with the
    /// destination for diagnostics.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let dest = path.display().to_string();
        let file = File::create(path).map_err(|source| WigError::Sink {
            dest: dest.clone(),
            source,
        })?;
        Ok(WigWriter::new(file, dest))
    }
}

impl<W: Write> WigWriter<W> {
    /// Wrap an arbitrary sink; `dest` identifies it in error messages.
    pub fn new(sink: W, dest: impl Into<String>) -> Self {
        WigWriter {
            out: BufWriter::new(sink),
            dest: dest.into(),
            bound: None,
            step: StepType::Variable,
        }
    }

    /// The contig this stream is bound to, once the first value is written.
    pub fn bound_contig(&self) -> Option<&str> {
        self.bound.as_deref()
    }

    /// Append one `(position, value)` pair.
    ///
    /// The first call binds the stream to `contig` and emits the header
    /// line; later calls on a different contig fail with
    /// [`WigError::MultiContig`].
    pub fn write_value(
        &mut self,
        contig: &str,
        position: u32,
        value: impl Display,
    ) -> Result<()> {
        let step = self.step;
        match &self.bound {
            None => {
                self.bound = Some(contig.to_string());
                self.write_line(format_args!("{}\tchrom={}", step, contig))?;
                self.write_line(format_args!("{}\t{}", position, value))
            }
            Some(bound) if bound == contig => {
                self.write_line(format_args!("{}\t{}", position, value))
            }
            Some(bound) => Err(WigError::MultiContig {
                bound: bound.clone(),
                seen: contig.to_string(),
            }),
        }
    }

    fn write_line(&mut self, line: std::fmt::Arguments<'_>) -> Result<()> {
        let io_result = self
            .out
            .write_fmt(format_args!("{}\n", line))
            .and_then(|_| self.out.flush());
        io_result.map_err(|source| WigError::Sink {
            dest: self.dest.clone(),
            source,
        })
    }
}
