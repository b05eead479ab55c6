//! Labeling stage: widen each page and print the shipping label.

use std::io::Cursor;
use std::path::Path;

use ab_glyph::{FontArc, PxScale};
use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;
use tracing::warn;

use crate::shop::ShippingAddress;

use super::{ComposeError, LabelSettings};

/// Extra width added on the left of every page for the label, in pixels.
/// 168 px at screen resolution, times the 3x print scaling.
pub(crate) const LABEL_MARGIN_PX: u32 = 168 * 3;

const LINE_SPACING: f32 = 1.3;

const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Label fonts, loaded once per composer.
pub(crate) struct LabelFonts {
    pub regular: FontArc,
    pub bold: FontArc,
}

const FALLBACK_REGULAR: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
];

const FALLBACK_BOLD: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
];

fn load_font(path: &Path) -> Result<FontArc, ComposeError> {
    let bytes = std::fs::read(path)
        .map_err(|e| ComposeError::Font(format!("{}: {}", path.display(), e)))?;
    FontArc::try_from_vec(bytes).map_err(|e| ComposeError::Font(format!("{}: {}", path.display(), e)))
}

fn first_available(candidates: &[&str]) -> Option<FontArc> {
    candidates
        .iter()
        .map(Path::new)
        .filter(|p| p.is_file())
        .find_map(|p| load_font(p).ok())
}

impl LabelFonts {
    /// Load the configured fonts, falling back to well-known system fonts.
    ///
    /// A configured font that fails to load is a warning, not an error; only
    /// having no usable regular font at all fails.
    pub(crate) fn load(settings: &LabelSettings) -> Result<Self, ComposeError> {
        let configured = settings.font_path.as_deref().and_then(|path| {
            load_font(path)
                .map_err(|e| warn!("Configured label font unusable, trying fallbacks: {}", e))
                .ok()
        });
        let regular = match configured {
            Some(font) => font,
            None => first_available(FALLBACK_REGULAR)
                .ok_or_else(|| ComposeError::Font("no usable label font found".to_string()))?,
        };

        let configured_bold = settings.bold_font_path.as_deref().and_then(|path| {
            load_font(path)
                .map_err(|e| warn!("Configured bold label font unusable, trying fallbacks: {}", e))
                .ok()
        });
        let bold = configured_bold
            .or_else(|| first_available(FALLBACK_BOLD))
            .unwrap_or_else(|| regular.clone());

        Ok(Self { regular, bold })
    }
}

/// Decode the staged artwork into its pages.
///
/// Animated GIFs become one page per frame; every other supported format is a
/// single page.
pub(crate) fn load_pages(path: &Path) -> Result<Vec<RgbaImage>, ComposeError> {
    let bytes = std::fs::read(path)?;

    let format = image::guess_format(&bytes)
        .map_err(|e| ComposeError::UnsupportedSource(e.to_string()))?;

    if format == ImageFormat::Gif {
        let decoder = GifDecoder::new(Cursor::new(&bytes))
            .map_err(|e| ComposeError::UnsupportedSource(e.to_string()))?;
        let frames = decoder
            .into_frames()
            .collect_frames()
            .map_err(|e| ComposeError::UnsupportedSource(e.to_string()))?;
        if frames.is_empty() {
            return Err(ComposeError::UnsupportedSource(
                "gif contains no frames".to_string(),
            ));
        }
        return Ok(frames.into_iter().map(|f| f.into_buffer()).collect());
    }

    let img = image::load_from_memory(&bytes)
        .map_err(|e| ComposeError::UnsupportedSource(e.to_string()))?;
    Ok(vec![img.to_rgba8()])
}

fn full_country_name(code_or_name: &str) -> String {
    let trimmed = code_or_name.trim();
    if trimmed.len() == 2 {
        if let Ok(country) = isocountry::CountryCode::for_alpha2(&trimmed.to_uppercase()) {
            return country.name().to_string();
        }
    }
    trimmed.to_string()
}

fn address_lines(settings: &LabelSettings, recipient: &ShippingAddress) -> (Vec<String>, Vec<String>) {
    let sender = vec![
        settings.sender_name.clone(),
        settings.sender_street.clone(),
        format!("{} {}", settings.sender_postalcode, settings.sender_city),
        full_country_name(&settings.sender_country),
    ];
    let recipient = vec![
        recipient.recipient_name(),
        recipient.address_1.clone(),
        format!("{} {}", recipient.postcode, recipient.city),
        full_country_name(&recipient.country),
    ];
    (sender, recipient)
}

fn draw_block(
    canvas: &mut RgbaImage,
    fonts: &LabelFonts,
    scale: PxScale,
    anchor: [i32; 2],
    heading: &str,
    lines: &[String],
) {
    let [x, y] = anchor;
    let line_height = (scale.y * LINE_SPACING) as i32;
    draw_text_mut(canvas, BLACK, x, y, scale, &fonts.bold, heading);
    for (i, line) in lines.iter().enumerate() {
        draw_text_mut(
            canvas,
            BLACK,
            x,
            y + line_height * (i as i32 + 1),
            scale,
            &fonts.regular,
            line,
        );
    }
}

/// Produce a labeled page: white canvas widened by the label margin, source
/// pasted flush right, address blocks drawn into the margin.
pub(crate) fn label_page(
    page: &RgbaImage,
    settings: &LabelSettings,
    fonts: &LabelFonts,
    recipient: &ShippingAddress,
) -> RgbaImage {
    let width = page.width() + LABEL_MARGIN_PX;
    let mut canvas = RgbaImage::from_pixel(width, page.height(), Rgba([255, 255, 255, 255]));

    image::imageops::overlay(&mut canvas, page, i64::from(LABEL_MARGIN_PX), 0);

    let scale = PxScale::from(settings.font_size * 3.0);
    let (sender_lines, recipient_lines) = address_lines(settings, recipient);

    draw_block(
        &mut canvas,
        fonts,
        scale,
        settings.sender_anchor,
        "Sender:",
        &sender_lines,
    );
    draw_block(
        &mut canvas,
        fonts,
        scale,
        settings.receiver_anchor,
        "Recipient:",
        &recipient_lines,
    );

    canvas
}
