use std::io;
use thiserror::Error;

/// Custom error type for ietlv
#[derive(Error, Debug)]
pub enum IetError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("ietd is not running on this node")]
    DaemonNotRunning,

    #[error("Command not found: {0}")]
    CommandNotFound(String),

    #[error("{program} exited with status {code}: {stderr}")]
    CommandFailed {
        program: String,
        code: i32,
        stderr: String,
    },

    #[error("Target {0} not found in the volume table")]
    TargetNotFound(String),

    #[error("Target {0} already exists")]
    TargetExists(String),

    #[error("No target id left above {0}")]
    TidExhausted(u32),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A multi-step operation stopped after some external state already changed.
    #[error("{step} failed after {done}")]
    Partial {
        done: String,
        step: String,
        #[source]
        source: Box<IetError>,
    },
}

/// Result type alias for ietlv
pub type Result<T> = std::result::Result<T, IetError>;

impl IetError {
    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        IetError::Config(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        IetError::InvalidInput(msg.into())
    }

    pub fn partial<D: Into<String>, S: Into<String>>(done: D, step: S, source: IetError) -> Self {
        IetError::Partial {
            done: done.into(),
            step: step.into(),
            source: Box::new(source),
        }
    }

    /// Exit code reported by a failed external command, if that is what this is
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            IetError::CommandFailed { code, .. } => Some(*code),
            IetError::Partial { source, .. } => source.exit_code(),
            _ => None,
        }
    }
}
