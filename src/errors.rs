use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// error type for the converter
#[derive(Error, Debug)]
pub enum ConverterError {
    /// error: I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// error: the input album root (or batch root) does not exist
    #[error("Input directory does not exist: {}", .0.display())]
    InputMissing(PathBuf),

    /// error: an output directory could not be created
    #[error("Could not create output directory {}: {source}", path.display())]
    OutputCreate {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// error: an external tool could not be started at all
    #[error("Failed to execute {tool}. Please check that it is installed and in your PATH: {source}")]
    ToolLaunch {
        tool: String,
        #[source]
        source: io::Error,
    },

    /// error: an external tool ran but exited with a non-zero status
    #[error("{tool} exited with non-zero status {status:?}\nStderr: {stderr}")]
    ToolFailed {
        tool: String,
        status: Option<i32>,
        stderr: String,
    },

    /// error: a file handed to a stage is not of a type that stage handles
    #[error("Input type not supported: {0}")]
    UnsupportedInput(String),

    /// error: error with respect to file paths
    #[error("Path error: {0}")]
    Path(String),

    /// error: error during argument parsing or validation
    #[error("Argument error: {0}")]
    Argument(String),

    /// error: a cue sheet could not be read or understood
    #[error("Cue sheet error: {0}")]
    CueParse(String),
}
