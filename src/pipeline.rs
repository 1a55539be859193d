//! Conversion pipeline
//!
//! Sequences the converter and the host codec for the three nutexb
//! operations:
//!
//! - load:      `model.nutexb` -(converter)-> `model.png` -(host decode)-> image
//! - thumbnail: same as load; the requested size is left to the host
//! - save:      image -(host encode)-> `model.png` -(converter --format)-> `model.nutexb`
//!
//! Each operation is a straight line. The first failure aborts it and is
//! reported through [`ConversionResult`]; nothing is retried.

use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::BridgeConfig;
use crate::converter::{
    ColorSpace, CommandRunner, ExternalConverter, ProcessRunner, TextureFormat, ToolOutput,
};
use crate::error::{PipelineError, Result};
use crate::host::{EncodeOptions, HostCodec, PdbStatus};
use crate::paths;

/// Which procedure a request serves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Load,
    Save,
    Thumbnail,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Load => "load",
            Operation::Save => "save",
            Operation::Thumbnail => "thumbnail",
        }
    }
}

/// One converter invocation, resolved from a user-selected path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    pub source: PathBuf,
    pub target: PathBuf,
    pub operation: Operation,
    /// Only set when encoding to nutexb
    pub format: Option<TextureFormat>,
}

impl ConversionRequest {
    /// nutexb -> png, for load and thumbnail
    pub fn decode(operation: Operation, texture: &Path) -> Result<Self> {
        Self {
            source: texture.to_path_buf(),
            target: paths::intermediate_path(texture),
            operation,
            format: None,
        }
        .checked()
    }

    /// png -> nutexb, for save. The destination is normalized to `.nutexb`
    pub fn encode(destination: &Path, format: TextureFormat) -> Result<Self> {
        Self {
            source: paths::intermediate_path(destination),
            target: paths::texture_path(destination),
            operation: Operation::Save,
            format: Some(format),
        }
        .checked()
    }

    /// The intermediate raster side of the request
    pub fn intermediate(&self) -> &Path {
        match self.operation {
            Operation::Save => &self.source,
            Operation::Load | Operation::Thumbnail => &self.target,
        }
    }

    fn checked(self) -> Result<Self> {
        if self.source == self.target {
            return Err(PipelineError::PathCollision { path: self.source });
        }
        Ok(self)
    }
}

/// Export settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOptions {
    pub format: TextureFormat,
}

impl SaveOptions {
    pub fn for_color_space(color_space: ColorSpace) -> Self {
        Self {
            format: TextureFormat::for_color_space(color_space),
        }
    }
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            format: TextureFormat::DEFAULT_COLOR,
        }
    }
}

/// Output of a successful operation
#[derive(Debug)]
pub struct Converted<I> {
    /// Decoded image, for load and thumbnail
    pub image: Option<I>,
    /// The file the converter wrote
    pub written: PathBuf,
    pub output: ToolOutput,
}

/// What the host receives back from a procedure
#[derive(Debug)]
pub struct ConversionResult<I> {
    pub status: PdbStatus,
    /// Handed to the host; the pipeline keeps no reference
    pub image: Option<I>,
    /// Captured converter output
    pub raw_output: String,
    pub error: Option<PipelineError>,
}

impl<I> ConversionResult<I> {
    pub fn from_outcome(outcome: Result<Converted<I>>) -> Self {
        match outcome {
            Ok(converted) => Self {
                status: PdbStatus::Success,
                image: converted.image,
                raw_output: converted.output.combined(),
                error: None,
            },
            Err(error) => {
                let status = match &error {
                    PipelineError::HostCodecFailure { source, .. } => source.status,
                    e if e.is_calling_error() => PdbStatus::CallingError,
                    _ => PdbStatus::ExecutionError,
                };
                Self {
                    status,
                    image: None,
                    raw_output: error.captured_output().unwrap_or_default().to_string(),
                    error: Some(error),
                }
            }
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Back to a `Result`, for callers that propagate with `?`
    pub fn into_result(self) -> Result<Option<I>> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.image),
        }
    }
}

/// The intermediate PNG of one operation
///
/// Removed when the operation finishes. On a failure path a file that was
/// already there before the operation started is left alone.
struct IntermediateFile {
    path: PathBuf,
    preexisting: bool,
    keep: bool,
    armed: bool,
}

impl IntermediateFile {
    fn claim(path: &Path, keep: bool) -> Self {
        let preexisting = path.exists();
        if preexisting {
            warn!("Overwriting existing file {}", path.display());
        }
        Self {
            path: path.to_path_buf(),
            preexisting,
            keep,
            armed: true,
        }
    }

    fn remove(mut self) -> Result<()> {
        self.armed = false;
        if self.keep {
            debug!("Keeping intermediate {}", self.path.display());
            return Ok(());
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PipelineError::Cleanup {
                path: self.path.clone(),
                source: e,
            }),
        }
    }
}

impl Drop for IntermediateFile {
    fn drop(&mut self) {
        if !self.armed || self.keep || self.preexisting {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed intermediate {} after failure", self.path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!("Could not remove {}: {}", self.path.display(), e),
        }
    }
}

/// Runs load, save and thumbnail against a host codec and the converter
pub struct ConversionPipeline<H, R = ProcessRunner> {
    host: H,
    converter: ExternalConverter<R>,
    keep_intermediates: bool,
}

impl<H: HostCodec> ConversionPipeline<H> {
    pub fn new(config: &BridgeConfig, host: H) -> Self {
        Self::with_converter(
            ExternalConverter::new(&config.converter_path),
            host,
            config.keep_intermediates,
        )
    }
}

impl<H: HostCodec, R: CommandRunner> ConversionPipeline<H, R> {
    pub fn with_converter(converter: ExternalConverter<R>, host: H, keep_intermediates: bool) -> Self {
        Self {
            host,
            converter,
            keep_intermediates,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn converter(&self) -> &ExternalConverter<R> {
        &self.converter
    }

    pub fn load(&self, texture: &Path) -> ConversionResult<H::Image> {
        ConversionResult::from_outcome(self.try_load(texture))
    }

    pub fn thumbnail(&self, texture: &Path, requested_size: u32) -> ConversionResult<H::Image> {
        ConversionResult::from_outcome(self.try_thumbnail(texture, requested_size))
    }

    pub fn save(&self, image: &H::Image, destination: &Path) -> ConversionResult<H::Image> {
        self.save_with(image, destination, SaveOptions::default())
    }

    pub fn save_with(
        &self,
        image: &H::Image,
        destination: &Path,
        options: SaveOptions,
    ) -> ConversionResult<H::Image> {
        ConversionResult::from_outcome(self.try_save_with(image, destination, options))
    }

    pub fn try_load(&self, texture: &Path) -> Result<Converted<H::Image>> {
        info!("Loading nutexb image {}", texture.display());
        self.decode_texture(Operation::Load, texture)
    }

    /// The full image is returned; scaling to `requested_size` is the host's job
    pub fn try_thumbnail(&self, texture: &Path, requested_size: u32) -> Result<Converted<H::Image>> {
        debug!(
            "Thumbnail for {} requested at {}px",
            texture.display(),
            requested_size
        );
        self.decode_texture(Operation::Thumbnail, texture)
    }

    pub fn try_save(&self, image: &H::Image, destination: &Path) -> Result<Converted<H::Image>> {
        self.try_save_with(image, destination, SaveOptions::default())
    }

    pub fn try_save_with(
        &self,
        image: &H::Image,
        destination: &Path,
        options: SaveOptions,
    ) -> Result<Converted<H::Image>> {
        self.converter.ensure_available()?;
        let request = ConversionRequest::encode(destination, options.format)?;
        info!(
            "Exporting nutexb image {} as {}",
            request.target.display(),
            options.format
        );

        let intermediate = IntermediateFile::claim(request.intermediate(), self.keep_intermediates);
        self.host.encode_raster(
            image,
            &request.source,
            &EncodeOptions {
                preserve_transparency: true,
            },
        )?;
        let output = self
            .converter
            .convert(&request.source, &request.target, request.format)?;
        intermediate.remove()?;

        Ok(Converted {
            image: None,
            written: request.target,
            output,
        })
    }

    fn decode_texture(&self, operation: Operation, texture: &Path) -> Result<Converted<H::Image>> {
        self.converter.ensure_available()?;
        let request = ConversionRequest::decode(operation, texture)?;
        if !paths::has_texture_extension(texture) {
            warn!("{} does not have a .nutexb extension", texture.display());
        }

        let intermediate = IntermediateFile::claim(request.intermediate(), self.keep_intermediates);
        let output = self
            .converter
            .convert(&request.source, &request.target, request.format)?;
        let image = self.host.decode_raster(&request.target).map_err(|source| {
            debug!("Converter output before decode failure: {}", output.combined().trim());
            PipelineError::HostCodecFailure {
                source,
                converter_output: output.combined(),
            }
        })?;
        intermediate.remove()?;

        debug!("{} of {} complete", operation.name(), texture.display());
        Ok(Converted {
            image: Some(image),
            written: request.target,
            output,
        })
    }
}
