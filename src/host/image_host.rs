//! Host codec backed by the `image` crate
//!
//! Used by the command-line front end, which plays the host role itself.

use std::path::Path;

use image::{DynamicImage, ImageFormat};
use tracing::debug;

use super::{
    EncodeOptions, HostCodec, HostCodecError, PdbStatus, RASTER_LOAD_PROCEDURE,
    RASTER_SAVE_PROCEDURE,
};

/// Decodes and encodes PNG through `image`
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCrateHost;

impl HostCodec for ImageCrateHost {
    type Image = DynamicImage;

    fn decode_raster(&self, path: &Path) -> Result<DynamicImage, HostCodecError> {
        let image = image::open(path).map_err(|e| {
            HostCodecError::new(
                RASTER_LOAD_PROCEDURE,
                PdbStatus::ExecutionError,
                format!("{}: {}", path.display(), e),
            )
        })?;
        debug!(
            "Decoded {} ({}x{}, {:?})",
            path.display(),
            image.width(),
            image.height(),
            image.color()
        );
        Ok(image)
    }

    fn encode_raster(
        &self,
        image: &DynamicImage,
        path: &Path,
        options: &EncodeOptions,
    ) -> Result<(), HostCodecError> {
        let flattened = if options.preserve_transparency {
            DynamicImage::ImageRgba8(image.to_rgba8())
        } else {
            DynamicImage::ImageRgb8(image.to_rgb8())
        };

        flattened.save_with_format(path, ImageFormat::Png).map_err(|e| {
            HostCodecError::new(
                RASTER_SAVE_PROCEDURE,
                PdbStatus::ExecutionError,
                format!("{}: {}", path.display(), e),
            )
        })
    }
}
