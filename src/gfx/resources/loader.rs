//! Filesystem asset loading
//!
//! Thin wrappers over `std::fs` and the `image` decoder that attach the
//! offending path to every error. A missing or unreadable asset is fatal
//! to scene construction, so these surface as `anyhow` errors at the
//! load boundary rather than being swallowed.

use std::path::Path;

use anyhow::Context;

/// Reads a whole text asset (OBJ or MTL source).
pub fn load_text(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading text asset {}", path.display()))
}

/// Decodes an image asset to RGBA8.
pub fn load_rgba_image(path: &Path) -> anyhow::Result<image::RgbaImage> {
    let image = image::open(path).with_context(|| format!("decoding image {}", path.display()))?;
    Ok(image.to_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_text_asset_names_the_path() {
        let err = load_text(Path::new("/nonexistent/streetlamp.obj")).unwrap_err();
        assert!(format!("{err:#}").contains("streetlamp.obj"));
    }

    #[test]
    fn missing_image_asset_names_the_path() {
        let err = load_rgba_image(Path::new("/nonexistent/sign.png")).unwrap_err();
        assert!(format!("{err:#}").contains("sign.png"));
    }
}
