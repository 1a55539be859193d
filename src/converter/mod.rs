//! ultimate_tex_cli wrapper
//!
//! The converter is an opaque executable with a positional contract:
//!
//! ```text
//! ultimate_tex_cli <input> <output> [--format <FORMAT>]
//! ```
//!
//! Direction is picked from the file extensions. Exit code zero means the
//! output was written; anything else is a failure and the captured text is
//! kept verbatim for diagnostics.

mod format;
mod process;

use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{PipelineError, Result};

pub use format::{ColorSpace, TextureFormat};
pub use process::{CommandRunner, CommandSpec, ProcessRunner, ToolOutput};

/// Invokes the external texture converter
#[derive(Debug, Clone)]
pub struct ExternalConverter<R = ProcessRunner> {
    executable: PathBuf,
    runner: R,
}

impl ExternalConverter<ProcessRunner> {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self::with_runner(executable, ProcessRunner)
    }
}

impl<R: CommandRunner> ExternalConverter<R> {
    pub fn with_runner(executable: impl Into<PathBuf>, runner: R) -> Self {
        Self {
            executable: executable.into(),
            runner,
        }
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Fail with `ToolNotFound` unless the executable exists
    pub fn ensure_available(&self) -> Result<()> {
        if self.executable.is_file() {
            Ok(())
        } else {
            Err(PipelineError::ToolNotFound {
                path: self.executable.clone(),
            })
        }
    }

    /// Build the command line for one conversion
    pub fn command(&self, source: &Path, target: &Path, format: Option<TextureFormat>) -> CommandSpec {
        let mut spec = CommandSpec::new(&self.executable)
            .arg(source.as_os_str())
            .arg(target.as_os_str());
        if let Some(format) = format {
            spec = spec.arg("--format").arg(format.name());
        }
        spec
    }

    /// Convert `source` into `target`, passing `--format` only when encoding
    pub fn convert(
        &self,
        source: &Path,
        target: &Path,
        format: Option<TextureFormat>,
    ) -> Result<ToolOutput> {
        let spec = self.command(source, target, format);
        debug!(
            "Running {} {}",
            spec.program.display(),
            spec.display_args().join(" ")
        );

        let output = self.runner.run(&spec).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                PipelineError::ToolNotFound {
                    path: self.executable.clone(),
                }
            } else {
                PipelineError::ToolLaunch {
                    path: self.executable.clone(),
                    source: e,
                }
            }
        })?;

        if !output.success() {
            let combined = output.combined();
            warn!(
                "Converter failed for {} -> {}: {}",
                source.display(),
                target.display(),
                combined.trim()
            );
            return Err(PipelineError::ExternalToolFailure {
                exit_code: output.exit_code,
                output: combined,
            });
        }

        Ok(output)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted runner shared by converter and pipeline tests

    use super::*;
    use std::sync::{Arc, Mutex};

    /// What the fake converter does when invoked
    #[derive(Debug, Clone)]
    pub enum FakeBehavior {
        /// Copy input bytes to output, exit 0
        Copy,
        /// Exit with the given code and stderr, writing nothing
        Fail(i32, &'static str),
        /// Fail to launch with the given error kind
        LaunchError(io::ErrorKind),
    }

    #[derive(Debug, Clone)]
    pub struct FakeRunner {
        behavior: FakeBehavior,
        seen: Arc<Mutex<Vec<CommandSpec>>>,
    }

    impl FakeRunner {
        pub fn new(behavior: FakeBehavior) -> Self {
            Self {
                behavior,
                seen: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn seen(&self) -> Vec<CommandSpec> {
            self.seen.lock().expect("fake runner mutex poisoned").clone()
        }
    }

    impl CommandRunner for FakeRunner {
        fn run(&self, spec: &CommandSpec) -> io::Result<ToolOutput> {
            self.seen
                .lock()
                .expect("fake runner mutex poisoned")
                .push(spec.clone());

            match &self.behavior {
                FakeBehavior::Copy => {
                    std::fs::copy(&spec.args[0], &spec.args[1])?;
                    Ok(ToolOutput {
                        exit_code: Some(0),
                        stdout: "done".to_string(),
                        stderr: String::new(),
                    })
                }
                FakeBehavior::Fail(code, stderr) => Ok(ToolOutput {
                    exit_code: Some(*code),
                    stdout: String::new(),
                    stderr: stderr.to_string(),
                }),
                FakeBehavior::LaunchError(kind) => Err(io::Error::from(*kind)),
            }
        }
    }
}
