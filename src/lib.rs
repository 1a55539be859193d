//! nutexb-bridge - nutexb textures for raster image editors
//!
//! Opens, saves and thumbnails Namco Universal Texture Binary files by
//! round-tripping through a PNG next to the texture and the external
//! ultimate_tex_cli converter. The host's own PNG codec does the raster work.

pub mod config;
pub mod converter;
pub mod error;
pub mod host;
pub mod paths;
pub mod pipeline;
pub mod registry;

pub use config::{BridgeConfig, ConfigError};
pub use error::PipelineError;
pub use host::{HostCodec, ImageCrateHost, PdbStatus};
pub use pipeline::{ConversionPipeline, ConversionResult, SaveOptions};
pub use registry::ProcedureRegistry;
