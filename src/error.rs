//! Error types shared by the converter, host bridge and pipeline

use std::path::PathBuf;

use crate::host::HostCodecError;

/// Failures of a single load, save or thumbnail operation
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Texture converter not found: {}", .path.display())]
    ToolNotFound { path: PathBuf },

    #[error("Failed to launch texture converter {}: {source}", .path.display())]
    ToolLaunch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Texture converter failed ({}): {}", exit_label(.exit_code), .output.trim())]
    ExternalToolFailure {
        exit_code: Option<i32>,
        output: String,
    },

    /// `converter_output` holds what the converter printed when it ran
    /// before the host procedure failed
    #[error("{source}")]
    HostCodecFailure {
        #[source]
        source: HostCodecError,
        converter_output: String,
    },

    #[error("Source and target resolve to the same file: {}", .path.display())]
    PathCollision { path: PathBuf },

    #[error("Failed to remove intermediate file {}: {source}", .path.display())]
    Cleanup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unknown procedure: {0}")]
    UnknownProcedure(String),

    #[error("Procedure {procedure} cannot be called as {call}")]
    ProcedureMismatch {
        procedure: &'static str,
        call: &'static str,
    },
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}

impl From<HostCodecError> for PipelineError {
    fn from(source: HostCodecError) -> Self {
        PipelineError::HostCodecFailure {
            source,
            converter_output: String::new(),
        }
    }
}

impl PipelineError {
    /// Captured converter output, if this failure carries any
    pub fn captured_output(&self) -> Option<&str> {
        match self {
            PipelineError::ExternalToolFailure { output, .. } => Some(output),
            PipelineError::HostCodecFailure {
                converter_output, ..
            } if !converter_output.is_empty() => Some(converter_output),
            _ => None,
        }
    }

    /// Whether the caller invoked a procedure incorrectly, as opposed to
    /// the operation failing while running
    pub fn is_calling_error(&self) -> bool {
        matches!(
            self,
            PipelineError::UnknownProcedure(_)
                | PipelineError::ProcedureMismatch { .. }
                | PipelineError::PathCollision { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
