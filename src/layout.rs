//! Page geometry for the journal overlay
//!
//! All coordinates are PDF user-space points with the origin at the bottom-left
//! corner of the page.

/// Simple length type in millimeters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Length(pub f64);

impl Length {
    /// Create a length from millimeters
    pub fn from_mm(mm: f64) -> Self {
        Length(mm)
    }

    /// Create a length from inches
    pub fn from_inches(inches: f64) -> Self {
        Length(inches * 25.4)
    }

    /// Get the value in points (1/72 inch)
    pub fn pt(&self) -> f64 {
        self.0 * 72.0 / 25.4
    }
}

/// Page dimensions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageDimensions {
    pub width: Length,
    pub height: Length,
}

impl PageDimensions {
    /// A4 size (210mm × 297mm), the journal's page size
    pub fn a4() -> Self {
        Self {
            width: Length::from_mm(210.0),
            height: Length::from_mm(297.0),
        }
    }
}

/// Axis-aligned rectangle in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }
}

/// DeviceRGB colour with components in 0..=1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb(pub f32, pub f32, pub f32);

/// Fill used by both header and footer bands
pub const LIGHT_BLUE: Rgb = Rgb(0.678, 0.847, 0.902);
pub const BLACK: Rgb = Rgb(0.0, 0.0, 0.0);

pub const HEADER_BAND_HEIGHT: f64 = 50.0;
pub const FOOTER_BAND_HEIGHT: f64 = 40.0;

pub const HEADER_IMAGE_X: f64 = 60.0;
pub const HEADER_IMAGE_TOP_GAP: f64 = 5.0;
pub const HEADER_IMAGE_WIDTH: f64 = 200.0;
pub const HEADER_IMAGE_HEIGHT: f64 = 100.0;

pub const BODY_IMAGE_X: f64 = 100.0;
/// Vertical distance allotted to each paragraph by the placement heuristic
pub const PARAGRAPH_PITCH: f64 = 100.0;

pub const FOOTER_TEXT_X: f64 = 50.0;
pub const FOOTER_TEXT_FIRST_BASELINE: f64 = 30.0;
pub const FOOTER_LINE_SPACING: f64 = 10.0;
pub const FOOTER_FONT_SIZE: f64 = 8.0;

/// Figure box: 5 × 2 inches
pub fn body_image_size() -> (Length, Length) {
    (Length::from_inches(5.0), Length::from_inches(2.0))
}

/// Full-width band at the top of the page
pub fn header_band(page: &PageDimensions) -> Rect {
    let height = page.height.pt();
    Rect::new(0.0, height - HEADER_BAND_HEIGHT, page.width.pt(), HEADER_BAND_HEIGHT)
}

/// Full-width band at the bottom of the page
pub fn footer_band(page: &PageDimensions) -> Rect {
    Rect::new(0.0, 0.0, page.width.pt(), FOOTER_BAND_HEIGHT)
}

/// Box the header logo is fitted into
pub fn header_image_box(page: &PageDimensions) -> Rect {
    Rect::new(
        HEADER_IMAGE_X,
        page.height.pt() - HEADER_IMAGE_HEIGHT - HEADER_IMAGE_TOP_GAP,
        HEADER_IMAGE_WIDTH,
        HEADER_IMAGE_HEIGHT,
    )
}

/// Vertical position of the inserted figure for a placeholder in paragraph `index`
///
/// This maps paragraph order to a fixed 100pt pitch down the page. It does not
/// reproduce the document's real layout, and it is not clamped: large indices
/// yield positions below the bottom edge (negative values).
pub fn placeholder_offset(page_height: f64, index: usize) -> f64 {
    page_height - (index as f64 + 1.0) * PARAGRAPH_PITCH
}

/// Box the inserted figure is fitted into
pub fn body_image_box(page: &PageDimensions, placeholder_index: usize) -> Rect {
    let (width, height) = body_image_size();
    Rect::new(
        BODY_IMAGE_X,
        placeholder_offset(page.height.pt(), placeholder_index),
        width.pt(),
        height.pt(),
    )
}

/// Baselines for each footer line, top line first
pub fn footer_baselines(line_count: usize) -> Vec<f64> {
    (0..line_count)
        .map(|i| FOOTER_TEXT_FIRST_BASELINE - i as f64 * FOOTER_LINE_SPACING)
        .collect()
}

/// Scale an image of `pixel_width` × `pixel_height` to fit inside `bounds`
/// while keeping its aspect ratio, centred in the box.
pub fn fit_within(bounds: Rect, pixel_width: u32, pixel_height: u32) -> Rect {
    if pixel_width == 0 || pixel_height == 0 {
        return bounds;
    }

    let scale = (bounds.width / pixel_width as f64).min(bounds.height / pixel_height as f64);
    let width = pixel_width as f64 * scale;
    let height = pixel_height as f64 * scale;

    Rect::new(
        bounds.x + (bounds.width - width) / 2.0,
        bounds.y + (bounds.height - height) / 2.0,
        width,
        height,
    )
}
