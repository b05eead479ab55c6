//! Cut stage: rasterize the die-cut template and overlay it on the page.

use std::path::{Path, PathBuf};

use image::RgbaImage;
use resvg::{tiny_skia, usvg};

use super::ComposeError;

/// Directory of die-cut templates, one `<print_id>.svg` per product shape.
pub struct CutTemplates {
    dir: PathBuf,
}

impl CutTemplates {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Template path for a print id, if one is installed.
    pub fn resolve(&self, print_id: &str) -> Option<PathBuf> {
        let path = self.dir.join(format!("{print_id}.svg"));
        path.is_file().then_some(path)
    }
}

/// Rasterize a template SVG at the given scale factor.
///
/// Templates are authored at 96 dpi, so the scale is `target_dpi / 96`.
pub(crate) fn render_overlay(svg_path: &Path, scale: f32) -> Result<RgbaImage, ComposeError> {
    let bytes = std::fs::read(svg_path)?;
    let tree = usvg::Tree::from_data(&bytes, &usvg::Options::default())
        .map_err(|e| ComposeError::Template(format!("{}: {}", svg_path.display(), e)))?;

    let size = tree.size();
    let width = (size.width() * scale).ceil() as u32;
    let height = (size.height() * scale).ceil() as u32;

    let mut pixmap = tiny_skia::Pixmap::new(width, height).ok_or_else(|| {
        ComposeError::Template(format!("{}: zero-sized template", svg_path.display()))
    })?;

    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );

    // tiny-skia stores premultiplied alpha; straighten it before compositing
    // with the image crate.
    let mut data = Vec::with_capacity((width * height * 4) as usize);
    for pixel in pixmap.pixels() {
        let c = pixel.demultiply();
        data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }

    RgbaImage::from_raw(width, height, data).ok_or_else(|| {
        ComposeError::Template(format!("{}: rasterization size mismatch", svg_path.display()))
    })
}

/// Composite `top` onto `base`, centered.
pub(crate) fn overlay_centered(base: &mut RgbaImage, top: &RgbaImage) {
    let x = (i64::from(base.width()) - i64::from(top.width())) / 2;
    let y = (i64::from(base.height()) - i64::from(top.height())) / 2;
    image::imageops::overlay(base, top, x.max(0), y.max(0));
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    const SQUARE_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="50">
        <rect x="0" y="0" width="100" height="50" fill="#ff0000"/>
    </svg>"##;

    fn write_template(dir: &Path, print_id: &str, content: &str) -> PathBuf {
        let path = dir.join(format!("{print_id}.svg"));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_resolve_finds_installed_template() {
        let temp_dir = tempfile::tempdir().unwrap();
        write_template(temp_dir.path(), "mavic-3", SQUARE_SVG);

        let templates = CutTemplates::new(temp_dir.path());
        assert!(templates.resolve("mavic-3").is_some());
        assert!(templates.resolve("unknown-shape").is_none());
    }

    #[test]
    fn test_render_overlay_scales_dimensions() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = write_template(temp_dir.path(), "square", SQUARE_SVG);

        let overlay = render_overlay(&path, 1.0).unwrap();
        assert_eq!(overlay.dimensions(), (100, 50));

        // 150 dpi target over the 96 dpi authoring resolution.
        let scaled = render_overlay(&path, 150.0 / 96.0).unwrap();
        assert_eq!(scaled.dimensions(), (157, 79));
    }

    #[test]
    fn test_render_overlay_rejects_malformed_svg() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = write_template(temp_dir.path(), "broken", "<svg nope");

        let err = render_overlay(&path, 1.0).unwrap_err();
        assert!(matches!(err, ComposeError::Template(_)));
        assert!(err.is_permanent());
    }

    #[test]
    fn test_overlay_centered() {
        let mut base = RgbaImage::from_pixel(10, 10, Rgba([255, 255, 255, 255]));
        let top = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255]));

        overlay_centered(&mut base, &top);

        // Offset is (10 - 4) / 2 = 3, so the overlay covers 3..=6 on both axes.
        assert_eq!(*base.get_pixel(3, 3), Rgba([0, 0, 0, 255]));
        assert_eq!(*base.get_pixel(6, 6), Rgba([0, 0, 0, 255]));
        assert_eq!(*base.get_pixel(2, 2), Rgba([255, 255, 255, 255]));
        assert_eq!(*base.get_pixel(7, 7), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_overlay_larger_than_base_clamps() {
        let mut base = RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 255]));
        let top = RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 255]));

        overlay_centered(&mut base, &top);
        assert_eq!(*base.get_pixel(0, 0), Rgba([0, 0, 0, 255]));
    }
}
