//! Sibling path derivation for texture and intermediate files
//!
//! The converter and the host codec hand off through a PNG that lives next
//! to the texture, sharing its stem:
//! - `/tmp/model.nutexb` <-> `/tmp/model.png`
//!
//! Nothing here touches the filesystem.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Extension of the raster intermediate
pub const INTERMEDIATE_EXTENSION: &str = "png";

/// Extension of the texture container
pub const TEXTURE_EXTENSION: &str = "nutexb";

/// Replace the extension of `path` with `extension`, keeping directory and stem
///
/// The stem is carried as raw `OsStr` so non-UTF-8 names survive unchanged.
fn sibling_with_extension(path: &Path, extension: &str) -> PathBuf {
    let mut name: OsString = path.file_stem().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(extension);
    match path.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}

/// Path of the PNG intermediate for a texture or export destination
/// `/tmp/model.nutexb` -> `/tmp/model.png`
pub fn intermediate_path(path: &Path) -> PathBuf {
    sibling_with_extension(path, INTERMEDIATE_EXTENSION)
}

/// Path of the texture written on export
/// `/tmp/model.png` -> `/tmp/model.nutexb`
pub fn texture_path(path: &Path) -> PathBuf {
    sibling_with_extension(path, TEXTURE_EXTENSION)
}

/// Check for a `.nutexb` extension (case-insensitive)
pub fn has_texture_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(TEXTURE_EXTENSION))
        .unwrap_or(false)
}
