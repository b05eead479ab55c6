//! Full composition pipeline and PDF assembly.

use std::fs::File;
use std::io::BufWriter;

use image::RgbaImage;
use printpdf::{
    ColorBits, ColorSpace, Image, ImageTransform, ImageXObject, Mm, PdfDocument, Px,
};
use tracing::debug;

use super::cut;
use super::label::{self, LabelFonts};
use super::{ComposeError, ComposeRequest, ComposedDocument, Composer, CutTemplates, LabelSettings};

const PDF_TITLE: &str = "skinpress";
const TEMPLATE_DPI: f32 = 96.0;
const MM_PER_INCH: f32 = 25.4;

/// Production composer: labeling, cut overlay, PDF assembly.
pub struct PrintComposer {
    settings: LabelSettings,
    templates: CutTemplates,
    fonts: LabelFonts,
}

impl PrintComposer {
    /// Build a composer, loading the label fonts up front so a broken font
    /// setup fails at startup instead of on the first order.
    pub fn new(settings: LabelSettings, templates: CutTemplates) -> Result<Self, ComposeError> {
        let fonts = LabelFonts::load(&settings)?;
        Ok(Self {
            settings,
            templates,
            fonts,
        })
    }
}

impl Composer for PrintComposer {
    fn compose(&self, request: &ComposeRequest) -> Result<ComposedDocument, ComposeError> {
        let template = self
            .templates
            .resolve(&request.print_id)
            .ok_or_else(|| ComposeError::MissingTemplate {
                print_id: request.print_id.clone(),
            })?;

        let pages = label::load_pages(&request.source)?;
        let overlay = cut::render_overlay(&template, request.dpi as f32 / TEMPLATE_DPI)?;

        let mut composed = Vec::with_capacity(pages.len());
        for page in &pages {
            let mut labeled = label::label_page(page, &self.settings, &self.fonts, &request.recipient);
            cut::overlay_centered(&mut labeled, &overlay);
            composed.push(labeled);
        }

        write_pdf(&composed, request.dpi, request)?;

        debug!(
            output = %request.output.display(),
            pages = composed.len(),
            dpi = request.dpi,
            "Composed print document"
        );

        Ok(ComposedDocument {
            path: request.output.clone(),
            pages: composed.len(),
        })
    }
}

fn page_size_mm(page: &RgbaImage, dpi: u32) -> (Mm, Mm) {
    let scale = MM_PER_INCH / dpi as f32;
    (
        Mm(page.width() as f32 * scale),
        Mm(page.height() as f32 * scale),
    )
}

/// Flatten RGBA over white into raw RGB bytes for embedding.
fn flatten_to_rgb(page: &RgbaImage) -> Vec<u8> {
    let mut data = Vec::with_capacity((page.width() * page.height() * 3) as usize);
    for pixel in page.pixels() {
        let [r, g, b, a] = pixel.0;
        let a = a as u16;
        data.push(((r as u16 * a + 255 * (255 - a)) / 255) as u8);
        data.push(((g as u16 * a + 255 * (255 - a)) / 255) as u8);
        data.push(((b as u16 * a + 255 * (255 - a)) / 255) as u8);
    }
    data
}

fn page_image(page: &RgbaImage) -> Image {
    Image::from(ImageXObject {
        width: Px(page.width() as usize),
        height: Px(page.height() as usize),
        color_space: ColorSpace::Rgb,
        bits_per_component: ColorBits::Bit8,
        interpolate: false,
        image_data: flatten_to_rgb(page),
        image_filter: None,
        clipping_bbox: None,
        smask: None,
    })
}

fn write_pdf(pages: &[RgbaImage], dpi: u32, request: &ComposeRequest) -> Result<(), ComposeError> {
    let first = pages
        .first()
        .ok_or_else(|| ComposeError::Image("no pages to assemble".to_string()))?;

    let transform = |dpi: u32| ImageTransform {
        dpi: Some(dpi as f32),
        ..Default::default()
    };

    let (width, height) = page_size_mm(first, dpi);
    let (doc, first_page, first_layer) = PdfDocument::new(PDF_TITLE, width, height, "Layer 1");

    page_image(first).add_to_layer(
        doc.get_page(first_page).get_layer(first_layer),
        transform(dpi),
    );

    for page in &pages[1..] {
        let (width, height) = page_size_mm(page, dpi);
        let (page_idx, layer_idx) = doc.add_page(width, height, "Layer 1");
        page_image(page).add_to_layer(doc.get_page(page_idx).get_layer(layer_idx), transform(dpi));
    }

    let file = File::create(&request.output)?;
    doc.save(&mut BufWriter::new(file))
        .map_err(|e| ComposeError::Pdf(e.to_string()))?;

    Ok(())
}
