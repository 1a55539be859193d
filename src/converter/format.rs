//! Texture format tags understood by ultimate_tex_cli's `--format` flag

use serde::Serialize;

/// Output formats for nutexb export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TextureFormat {
    /// BC1 - smallest size, no/1-bit alpha
    BC1Unorm,
    BC1Srgb,
    /// BC2 - explicit 4-bit alpha
    BC2Unorm,
    BC2Srgb,
    /// BC3 - interpolated alpha
    BC3Unorm,
    BC3Srgb,
    /// BC4 - single channel
    BC4Unorm,
    BC4Snorm,
    /// BC5 - two channel, normal maps
    BC5Unorm,
    BC5Snorm,
    /// BC6H - HDR
    BC6Ufloat,
    BC6Sfloat,
    /// BC7 - high quality color
    BC7Unorm,
    BC7Srgb,
    /// Uncompressed
    Rgba8Unorm,
    Rgba8Srgb,
    Bgra8Unorm,
    Bgra8Srgb,
}

/// Colorspace of the exported image data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorSpace {
    /// Color textures (albedo, emissive)
    #[default]
    Srgb,
    /// Data textures (normals, masks)
    Linear,
}

impl TextureFormat {
    pub const ALL: [TextureFormat; 18] = [
        TextureFormat::BC1Unorm,
        TextureFormat::BC1Srgb,
        TextureFormat::BC2Unorm,
        TextureFormat::BC2Srgb,
        TextureFormat::BC3Unorm,
        TextureFormat::BC3Srgb,
        TextureFormat::BC4Unorm,
        TextureFormat::BC4Snorm,
        TextureFormat::BC5Unorm,
        TextureFormat::BC5Snorm,
        TextureFormat::BC6Ufloat,
        TextureFormat::BC6Sfloat,
        TextureFormat::BC7Unorm,
        TextureFormat::BC7Srgb,
        TextureFormat::Rgba8Unorm,
        TextureFormat::Rgba8Srgb,
        TextureFormat::Bgra8Unorm,
        TextureFormat::Bgra8Srgb,
    ];

    /// Format used for standard color export
    pub const DEFAULT_COLOR: TextureFormat = TextureFormat::BC7Srgb;

    /// Tag passed to `--format`
    pub fn name(&self) -> &'static str {
        match self {
            TextureFormat::BC1Unorm => "BC1Unorm",
            TextureFormat::BC1Srgb => "BC1Srgb",
            TextureFormat::BC2Unorm => "BC2Unorm",
            TextureFormat::BC2Srgb => "BC2Srgb",
            TextureFormat::BC3Unorm => "BC3Unorm",
            TextureFormat::BC3Srgb => "BC3Srgb",
            TextureFormat::BC4Unorm => "BC4Unorm",
            TextureFormat::BC4Snorm => "BC4Snorm",
            TextureFormat::BC5Unorm => "BC5Unorm",
            TextureFormat::BC5Snorm => "BC5Snorm",
            TextureFormat::BC6Ufloat => "BC6Ufloat",
            TextureFormat::BC6Sfloat => "BC6Sfloat",
            TextureFormat::BC7Unorm => "BC7Unorm",
            TextureFormat::BC7Srgb => "BC7Srgb",
            TextureFormat::Rgba8Unorm => "Rgba8Unorm",
            TextureFormat::Rgba8Srgb => "Rgba8Srgb",
            TextureFormat::Bgra8Unorm => "Bgra8Unorm",
            TextureFormat::Bgra8Srgb => "Bgra8Srgb",
        }
    }

    /// Parse a tag, ignoring case
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|format| format.name().eq_ignore_ascii_case(s.trim()))
    }

    /// BC7 in the matching colorspace
    pub fn for_color_space(color_space: ColorSpace) -> Self {
        match color_space {
            ColorSpace::Srgb => TextureFormat::BC7Srgb,
            ColorSpace::Linear => TextureFormat::BC7Unorm,
        }
    }
}

impl std::fmt::Display for TextureFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_tags() {
        assert_eq!(TextureFormat::parse("BC7Srgb"), Some(TextureFormat::BC7Srgb));
        assert_eq!(TextureFormat::parse("bc7unorm"), Some(TextureFormat::BC7Unorm));
        assert_eq!(TextureFormat::parse(" Rgba8Srgb "), Some(TextureFormat::Rgba8Srgb));
        assert_eq!(TextureFormat::parse("DXT5"), None);
    }

    #[test]
    fn test_every_tag_parses_back() {
        for format in TextureFormat::ALL {
            assert_eq!(TextureFormat::parse(format.name()), Some(format));
        }
    }

    #[test]
    fn test_color_space_selection() {
        assert_eq!(TextureFormat::DEFAULT_COLOR, TextureFormat::BC7Srgb);
        assert_eq!(
            TextureFormat::for_color_space(ColorSpace::default()),
            TextureFormat::DEFAULT_COLOR
        );
        assert_eq!(
            TextureFormat::for_color_space(ColorSpace::Linear),
            TextureFormat::BC7Unorm
        );
    }
}
