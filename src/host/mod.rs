//! Host raster codec bridge
//!
//! The pipeline never decodes or encodes PNG itself. It calls the host's
//! own raster procedures, non-interactively, and passes their status back
//! without reinterpreting it.

mod image_host;

use std::path::Path;

use serde::Serialize;

pub use image_host::ImageCrateHost;

/// Host procedure name for raster decoding
pub const RASTER_LOAD_PROCEDURE: &str = "file-png-load";

/// Host procedure name for raster encoding
pub const RASTER_SAVE_PROCEDURE: &str = "file-png-save";

/// Status values a host procedure reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PdbStatus {
    Success,
    ExecutionError,
    CallingError,
    Cancel,
}

impl PdbStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, PdbStatus::Success)
    }
}

/// Options for writing the intermediate raster
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Keep the alpha channel
    pub preserve_transparency: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            preserve_transparency: true,
        }
    }
}

/// A failed host raster procedure
#[derive(Debug, thiserror::Error)]
#[error("{procedure} failed ({status:?}): {message}")]
pub struct HostCodecError {
    pub procedure: &'static str,
    pub status: PdbStatus,
    pub message: String,
}

impl HostCodecError {
    pub fn new(procedure: &'static str, status: PdbStatus, message: impl Into<String>) -> Self {
        Self {
            procedure,
            status,
            message: message.into(),
        }
    }
}

/// The host's raster load/save procedures
pub trait HostCodec {
    /// Handle to an image owned by the host
    type Image;

    fn decode_raster(&self, path: &Path) -> Result<Self::Image, HostCodecError>;

    fn encode_raster(
        &self,
        image: &Self::Image,
        path: &Path,
        options: &EncodeOptions,
    ) -> Result<(), HostCodecError>;
}

#[cfg(test)]
pub(crate) mod testing {
    //! Recording host used by pipeline and registry tests

    use super::*;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum HostCall {
        Decode(PathBuf),
        Encode(PathBuf, EncodeOptions),
    }

    /// Image handles are the raw file bytes
    #[derive(Debug, Clone, Default)]
    pub struct FakeHost {
        calls: Arc<Mutex<Vec<HostCall>>>,
        fail_with: Option<PdbStatus>,
        /// Intermediate existed on disk during each decode
        saw_file: Arc<Mutex<Vec<bool>>>,
    }

    impl FakeHost {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing(status: PdbStatus) -> Self {
            Self {
                fail_with: Some(status),
                ..Self::default()
            }
        }

        pub fn calls(&self) -> Vec<HostCall> {
            self.calls.lock().expect("fake host mutex poisoned").clone()
        }

        pub fn saw_file(&self) -> Vec<bool> {
            self.saw_file.lock().expect("fake host mutex poisoned").clone()
        }
    }

    impl HostCodec for FakeHost {
        type Image = Vec<u8>;

        fn decode_raster(&self, path: &Path) -> Result<Vec<u8>, HostCodecError> {
            self.calls
                .lock()
                .expect("fake host mutex poisoned")
                .push(HostCall::Decode(path.to_path_buf()));
            self.saw_file
                .lock()
                .expect("fake host mutex poisoned")
                .push(path.is_file());

            if let Some(status) = self.fail_with {
                return Err(HostCodecError::new(RASTER_LOAD_PROCEDURE, status, "rejected"));
            }
            std::fs::read(path).map_err(|e| {
                HostCodecError::new(RASTER_LOAD_PROCEDURE, PdbStatus::ExecutionError, e.to_string())
            })
        }

        fn encode_raster(
            &self,
            image: &Vec<u8>,
            path: &Path,
            options: &EncodeOptions,
        ) -> Result<(), HostCodecError> {
            self.calls
                .lock()
                .expect("fake host mutex poisoned")
                .push(HostCall::Encode(path.to_path_buf(), *options));

            if let Some(status) = self.fail_with {
                return Err(HostCodecError::new(RASTER_SAVE_PROCEDURE, status, "rejected"));
            }
            std::fs::write(path, image).map_err(|e| {
                HostCodecError::new(RASTER_SAVE_PROCEDURE, PdbStatus::ExecutionError, e.to_string())
            })
        }
    }
}
