//! Document composition: customer artwork in, press-ready PDF out.
//!
//! Composition runs in two stages. The labeling stage widens each source page
//! by a fixed left margin and prints the shipping label (sender and recipient
//! blocks) into it. The cut stage rasterizes the product's die-cut template
//! SVG at the target resolution and lays it centered over the page. The
//! labeled, cut-marked pages are then assembled into a single PDF sized so
//! that the pixel data comes out at exactly the target DPI.

mod cut;
mod label;
mod print;

pub use cut::CutTemplates;
pub use print::PrintComposer;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shop::ShippingAddress;

/// Errors from document composition.
#[derive(Debug, Error)]
pub enum ComposeError {
    /// No cut template exists for the product's print id.
    #[error("no cut template for print id '{print_id}'")]
    MissingTemplate { print_id: String },

    #[error("label font unavailable: {0}")]
    Font(String),

    #[error("cut template invalid: {0}")]
    Template(String),

    #[error("source artwork unusable: {0}")]
    UnsupportedSource(String),

    #[error("image processing failed: {0}")]
    Image(String),

    #[error("pdf assembly failed: {0}")]
    Pdf(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ComposeError {
    /// Whether retrying the same request can ever succeed.
    ///
    /// Missing or broken templates, missing fonts and undecodable artwork are
    /// structural; only environmental failures (io, transient image/pdf
    /// errors) are worth another attempt.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            ComposeError::MissingTemplate { .. }
                | ComposeError::Font(_)
                | ComposeError::Template(_)
                | ComposeError::UnsupportedSource(_)
        )
    }
}

/// Shipping label content and typography.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelSettings {
    pub sender_name: String,
    pub sender_street: String,
    pub sender_postalcode: String,
    pub sender_city: String,
    pub sender_country: String,
    /// Regular label font; falls back to a well-known system font when unset.
    #[serde(default)]
    pub font_path: Option<PathBuf>,
    /// Bold font for the block headings; falls back to the regular font.
    #[serde(default)]
    pub bold_font_path: Option<PathBuf>,
    /// Point size before the 3x print scaling.
    #[serde(default = "default_font_size")]
    pub font_size: f32,
    /// Top-left corner of the sender block, in margin pixels.
    #[serde(default = "default_sender_anchor")]
    pub sender_anchor: [i32; 2],
    /// Top-left corner of the recipient block, in margin pixels.
    #[serde(default = "default_receiver_anchor")]
    pub receiver_anchor: [i32; 2],
}

fn default_font_size() -> f32 {
    8.0
}

fn default_sender_anchor() -> [i32; 2] {
    [36, 36]
}

fn default_receiver_anchor() -> [i32; 2] {
    [36, 300]
}

/// One composition job: a staged source file plus everything needed to
/// produce its print document.
#[derive(Debug, Clone)]
pub struct ComposeRequest {
    /// Staged customer artwork (already downloaded).
    pub source: PathBuf,
    /// Where the finished PDF goes (inside staging, before delivery).
    pub output: PathBuf,
    /// Cut template identifier from the product metadata.
    pub print_id: String,
    /// Resolved target resolution.
    pub dpi: u32,
    /// Recipient address for the shipping label.
    pub recipient: ShippingAddress,
}

/// A finished print document.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedDocument {
    pub path: PathBuf,
    pub pages: usize,
}

/// Trait over document composition.
///
/// Composition is pure CPU and filesystem work, so the trait is synchronous;
/// the orchestrator wraps calls as needed.
pub trait Composer: Send + Sync {
    fn compose(&self, request: &ComposeRequest) -> Result<ComposedDocument, ComposeError>;
}
