//! Journal page overlay: header band, logo, inserted figure, footer disclaimer
//!
//! The overlay is drawn once into a Form XObject and that same XObject is
//! invoked on top of every page. Each page's original content is wrapped in
//! `q`/`Q` first, so any transformation it leaves active does not leak into
//! the overlay.

use std::path::{Path, PathBuf};

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat};

use crate::docx::{find_placeholder, SourceDocument, DEFAULT_PLACEHOLDER};
use crate::error::{Error, Result};
use crate::layout::{self, PageDimensions, Rect, Rgb, BLACK, FOOTER_FONT_SIZE, LIGHT_BLUE};
use crate::pdf::fonts::{add_standard_font, encode_win_ansi, FOOTER_FONT};
use crate::pdf::images::embed_image_file;
use crate::pdf::metadata::page_size;
use crate::raster::{normalize_image, DEFAULT_DPI};

/// Resource name of the overlay Form XObject on each page
pub const OVERLAY_XOBJECT: &str = "JournalOverlay";
const FONT_RESOURCE: &str = "FTi";
const HEADER_IMAGE_RESOURCE: &str = "ImHeader";
const BODY_IMAGE_RESOURCE: &str = "ImBody";

/// Inputs for [`compose_overlay`]
#[derive(Debug, Clone)]
pub struct OverlayOptions {
    /// Footer disclaimer; lines are separated by `\n`
    pub footer_text: String,
    /// Logo drawn in the header band
    pub header_image: Option<PathBuf>,
    /// Figure drawn at the placeholder position
    pub body_image: Option<PathBuf>,
    /// DOCX the PDF was rendered from, searched for `placeholder`
    pub source_document: Option<PathBuf>,
    /// Marker token that positions the figure
    pub placeholder: String,
    /// Resolution the figure is normalized to before drawing
    pub target_dpi: u32,
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            footer_text: String::new(),
            header_image: None,
            body_image: None,
            source_document: None,
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            target_dpi: DEFAULT_DPI,
        }
    }
}

/// What [`compose_overlay`] actually drew
#[derive(Debug, Clone, PartialEq)]
pub struct ComposeReport {
    pub page_count: usize,
    pub placeholder_index: Option<usize>,
    pub header_image_drawn: bool,
    pub body_image_drawn: bool,
    /// Bottom-left corner and size of the figure, if drawn
    pub body_image_rect: Option<Rect>,
}

/// Everything drawn on each page, computed once per document
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayDescriptor {
    pub page: PageDimensions,
    pub header_band: Rect,
    pub footer_band: Rect,
    pub band_color: Rgb,
    /// Footer lines, already trimmed
    pub footer_lines: Vec<String>,
    pub placeholder_index: Option<usize>,
}

impl OverlayDescriptor {
    pub fn new(page: PageDimensions, footer_text: &str, placeholder_index: Option<usize>) -> Self {
        Self {
            page,
            header_band: layout::header_band(&page),
            footer_band: layout::footer_band(&page),
            band_color: LIGHT_BLUE,
            footer_lines: split_footer_lines(footer_text),
            placeholder_index,
        }
    }
}

/// Split footer text on explicit newlines and trim each line
pub fn split_footer_lines(text: &str) -> Vec<String> {
    text.split('\n').map(|line| line.trim().to_string()).collect()
}

/// An image resource and the rectangle it is painted into
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawnImage<'a> {
    pub resource: &'a str,
    pub rect: Rect,
}

fn real(value: f64) -> Object {
    Object::Real(value as f32)
}

fn fill_rect(ops: &mut Vec<Operation>, rect: Rect, color: Rgb) {
    ops.push(Operation::new("q", vec![]));
    ops.push(Operation::new(
        "rg",
        vec![Object::Real(color.0), Object::Real(color.1), Object::Real(color.2)],
    ));
    ops.push(Operation::new(
        "re",
        vec![real(rect.x), real(rect.y), real(rect.width), real(rect.height)],
    ));
    ops.push(Operation::new("f", vec![]));
    ops.push(Operation::new("Q", vec![]));
}

fn paint_image(ops: &mut Vec<Operation>, image: &DrawnImage) {
    ops.push(Operation::new("q", vec![]));
    ops.push(Operation::new(
        "cm",
        vec![
            real(image.rect.width),
            real(0.0),
            real(0.0),
            real(image.rect.height),
            real(image.rect.x),
            real(image.rect.y),
        ],
    ));
    ops.push(Operation::new("Do", vec![Object::Name(image.resource.as_bytes().to_vec())]));
    ops.push(Operation::new("Q", vec![]));
}

/// Build the overlay drawing operators.
///
/// Paint order: header band, header image, figure, footer band, footer text.
pub fn render_overlay_content(
    descriptor: &OverlayDescriptor,
    header_image: Option<&DrawnImage>,
    body_image: Option<&DrawnImage>,
) -> Content {
    let mut ops = Vec::new();

    fill_rect(&mut ops, descriptor.header_band, descriptor.band_color);

    if let Some(image) = header_image {
        paint_image(&mut ops, image);
    }

    if let Some(image) = body_image {
        paint_image(&mut ops, image);
    }

    fill_rect(&mut ops, descriptor.footer_band, descriptor.band_color);

    ops.push(Operation::new(
        "rg",
        vec![Object::Real(BLACK.0), Object::Real(BLACK.1), Object::Real(BLACK.2)],
    ));
    let baselines = layout::footer_baselines(descriptor.footer_lines.len());
    for (line, y) in descriptor.footer_lines.iter().zip(baselines) {
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new(
            "Tf",
            vec![Object::Name(FONT_RESOURCE.as_bytes().to_vec()), real(FOOTER_FONT_SIZE)],
        ));
        ops.push(Operation::new(
            "Tm",
            vec![real(1.0), real(0.0), real(0.0), real(1.0), real(layout::FOOTER_TEXT_X), real(y)],
        ));
        ops.push(Operation::new(
            "Tj",
            vec![Object::String(encode_win_ansi(line), StringFormat::Literal)],
        ));
        ops.push(Operation::new("ET", vec![]));
    }

    Content { operations: ops }
}

/// Overlay the journal header, figure and footer onto every page of `input_pdf`.
///
/// Header image problems are logged and the page proceeds without the logo.
/// The figure is only considered when the source document contains the
/// placeholder and a body image is given; if it cannot be normalized or
/// embedded it is skipped with a log entry. Failing to load the input or write
/// the output is returned as an error.
///
/// # Example
///
/// ```no_run
/// use journal_pdf::pdf::{compose_overlay, OverlayOptions};
/// use std::path::Path;
///
/// let options = OverlayOptions {
///     footer_text: "Global Health Equity. © 2024.".to_string(),
///     header_image: Some("picture1.png".into()),
///     body_image: Some("Image1.png".into()),
///     source_document: Some("paper4.docx".into()),
///     ..Default::default()
/// };
///
/// compose_overlay(Path::new("temp_output.pdf"), Path::new("final.pdf"), &options)
///     .expect("Failed to compose overlay");
/// ```
pub fn compose_overlay(input_pdf: &Path, output_pdf: &Path, options: &OverlayOptions) -> Result<ComposeReport> {
    if !input_pdf.exists() {
        return Err(Error::FileNotFound(input_pdf.to_path_buf()));
    }

    let mut doc = Document::load(input_pdf)?;
    let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
    if pages.is_empty() {
        return Err(Error::EmptyPdf(input_pdf.to_path_buf()));
    }

    let placeholder_index = options
        .source_document
        .as_deref()
        .and_then(|path| lookup_placeholder(path, &options.placeholder));

    let page = PageDimensions::a4();
    let descriptor = OverlayDescriptor::new(page, &options.footer_text, placeholder_index);

    let mut xobjects = Dictionary::new();

    let header_image = options.header_image.as_deref().and_then(|path| {
        match embed_image_file(&mut doc, path) {
            Ok(embedded) => {
                xobjects.set(HEADER_IMAGE_RESOURCE, Object::Reference(embedded.id));
                Some(DrawnImage {
                    resource: HEADER_IMAGE_RESOURCE,
                    rect: layout::fit_within(
                        layout::header_image_box(&page),
                        embedded.width,
                        embedded.height,
                    ),
                })
            }
            Err(e) => {
                tracing::warn!(image = %path.display(), error = %e, "error adding header image");
                None
            }
        }
    });

    let body_image = match (placeholder_index, options.body_image.as_deref()) {
        (Some(index), Some(path)) => {
            place_body_image(&mut doc, &mut xobjects, &page, index, path, options.target_dpi)
        }
        _ => None,
    };

    let content = render_overlay_content(&descriptor, header_image.as_ref(), body_image.as_ref());

    let font_id = add_standard_font(&mut doc, FOOTER_FONT);
    let overlay_id = add_overlay_form(&mut doc, &page, content, font_id, xobjects)?;

    for page_id in &pages {
        if let Some((w, h)) = page_size(&doc, *page_id) {
            if (w - page.width.pt()).abs() > 1.0 || (h - page.height.pt()).abs() > 1.0 {
                tracing::debug!(page = ?page_id, width = w, height = h, "page is not A4; overlay uses A4 geometry");
            }
        }
        merge_overlay_onto_page(&mut doc, *page_id, overlay_id)?;
    }

    doc.compress();
    doc.save(output_pdf)?;

    tracing::info!(
        output = %output_pdf.display(),
        pages = pages.len(),
        "final PDF with images and footer saved"
    );

    Ok(ComposeReport {
        page_count: pages.len(),
        placeholder_index,
        header_image_drawn: header_image.is_some(),
        body_image_drawn: body_image.is_some(),
        body_image_rect: body_image.map(|image| image.rect),
    })
}

fn lookup_placeholder(source: &Path, marker: &str) -> Option<usize> {
    match SourceDocument::open(source) {
        Ok(doc) => find_placeholder(&doc, marker),
        Err(e) => {
            tracing::warn!(source = %source.display(), error = %e, "could not read source document; figure skipped");
            None
        }
    }
}

fn place_body_image(
    doc: &mut Document,
    xobjects: &mut Dictionary,
    page: &PageDimensions,
    index: usize,
    path: &Path,
    target_dpi: u32,
) -> Option<DrawnImage<'static>> {
    let normalized = normalize_image(path, target_dpi)?;

    match embed_image_file(doc, normalized.path()) {
        Ok(embedded) => {
            xobjects.set(BODY_IMAGE_RESOURCE, Object::Reference(embedded.id));
            let rect = layout::fit_within(
                layout::body_image_box(page, index),
                embedded.width,
                embedded.height,
            );
            tracing::info!(x = rect.x, y = rect.y, paragraph = index, "figure placed at placeholder");
            Some(DrawnImage {
                resource: BODY_IMAGE_RESOURCE,
                rect,
            })
        }
        Err(e) => {
            tracing::warn!(image = %path.display(), error = %e, "error adding figure");
            None
        }
    }
}

/// Create the overlay Form XObject
fn add_overlay_form(
    doc: &mut Document,
    page: &PageDimensions,
    content: Content,
    font_id: ObjectId,
    xobjects: Dictionary,
) -> Result<ObjectId> {
    let mut fonts = Dictionary::new();
    fonts.set(FONT_RESOURCE, Object::Reference(font_id));

    let mut resources = Dictionary::new();
    resources.set("Font", Object::Dictionary(fonts));
    if !xobjects.is_empty() {
        resources.set("XObject", Object::Dictionary(xobjects));
    }

    let mut form = Dictionary::new();
    form.set("Type", Object::Name(b"XObject".to_vec()));
    form.set("Subtype", Object::Name(b"Form".to_vec()));
    form.set("FormType", Object::Integer(1));
    form.set("BBox", Object::Array(vec![
        real(0.0),
        real(0.0),
        real(page.width.pt()),
        real(page.height.pt()),
    ]));
    form.set("Resources", Object::Dictionary(resources));

    let id = doc.add_object(Stream::new(form, content.encode()?));
    Ok(id)
}

/// Resources dictionary in effect for a page, following inheritance up the
/// page tree and resolving references
fn effective_resources(doc: &Document, page_id: ObjectId) -> Dictionary {
    let mut current = page_id;
    for _ in 0..32 {
        let Ok(dict) = doc.get_dictionary(current) else {
            break;
        };
        match dict.get(b"Resources") {
            Ok(Object::Dictionary(res)) => return res.clone(),
            Ok(Object::Reference(res_id)) => {
                return doc.get_dictionary(*res_id).cloned().unwrap_or_default();
            }
            _ => {}
        }
        match dict.get(b"Parent").and_then(Object::as_reference) {
            Ok(parent) => current = parent,
            Err(_) => break,
        }
    }
    Dictionary::new()
}

/// References to a page's content streams, flattening an indirect array
fn existing_content_streams(doc: &Document, page_id: ObjectId) -> Vec<Object> {
    let Ok(page) = doc.get_dictionary(page_id) else {
        return Vec::new();
    };
    match page.get(b"Contents") {
        Ok(Object::Reference(content_id)) => match doc.get_object(*content_id) {
            Ok(Object::Array(items)) => items.clone(),
            Ok(_) => vec![Object::Reference(*content_id)],
            Err(e) => {
                tracing::warn!(page = ?page_id, error = %e, "dangling page content reference dropped");
                Vec::new()
            }
        },
        Ok(Object::Array(items)) => items.clone(),
        _ => Vec::new(),
    }
}

/// Register the overlay on a page and draw it above the existing content
fn merge_overlay_onto_page(doc: &mut Document, page_id: ObjectId, overlay_id: ObjectId) -> Result<()> {
    let mut resources = effective_resources(doc, page_id);

    let mut xobjects = match resources.get(b"XObject") {
        Ok(Object::Dictionary(xo)) => xo.clone(),
        Ok(Object::Reference(xo_id)) => doc.get_dictionary(*xo_id).cloned().unwrap_or_default(),
        _ => Dictionary::new(),
    };
    xobjects.set(OVERLAY_XOBJECT, Object::Reference(overlay_id));
    resources.set("XObject", Object::Dictionary(xobjects));

    let save_id = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
    let invoke = format!("\nQ\nq\n/{} Do\nQ\n", OVERLAY_XOBJECT);
    let invoke_id = doc.add_object(Stream::new(Dictionary::new(), invoke.into_bytes()));

    let mut contents = vec![Object::Reference(save_id)];
    contents.extend(existing_content_streams(doc, page_id));
    contents.push(Object::Reference(invoke_id));

    let page_dict = doc.get_object_mut(page_id)?.as_dict_mut()?;

    page_dict.set("Contents", Object::Array(contents));
    page_dict.set("Resources", Object::Dictionary(resources));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const FOOTER: &str = "Line one  \n  Line two\nLine three";

    fn ops_named<'a>(content: &'a Content, op: &str) -> Vec<&'a Operation> {
        content.operations.iter().filter(|o| o.operator == op).collect()
    }

    fn as_f64(obj: &Object) -> f64 {
        match obj {
            Object::Real(r) => *r as f64,
            Object::Integer(i) => *i as f64,
            other => panic!("not a number: {:?}", other),
        }
    }

    fn sample_pdf(dir: &TempDir, pages: usize) -> PathBuf {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let mut kids = Vec::new();
        for i in 0..pages {
            let content = format!("BT /F1 12 Tf 72 700 Td (Page {}) Tj ET", i + 1);
            let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));
            let mut page = Dictionary::new();
            page.set("Type", Object::Name(b"Page".to_vec()));
            page.set("Parent", Object::Reference(pages_id));
            page.set("Contents", Object::Reference(content_id));
            kids.push(Object::Reference(doc.add_object(page)));
        }
        let mut font = Dictionary::new();
        font.set("Type", Object::Name(b"Font".to_vec()));
        font.set("Subtype", Object::Name(b"Type1".to_vec()));
        font.set("BaseFont", Object::Name(b"Helvetica".to_vec()));
        let font_id = doc.add_object(font);
        let mut font_res = Dictionary::new();
        font_res.set("F1", Object::Reference(font_id));
        let mut resources = Dictionary::new();
        resources.set("Font", Object::Dictionary(font_res));

        let mut pages_dict = Dictionary::new();
        pages_dict.set("Type", Object::Name(b"Pages".to_vec()));
        pages_dict.set("Count", Object::Integer(pages as i64));
        pages_dict.set("Kids", Object::Array(kids));
        pages_dict.set("Resources", Object::Dictionary(resources));
        pages_dict.set("MediaBox", Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(595.28),
            Object::Real(841.89),
        ]));
        doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

        let mut catalog = Dictionary::new();
        catalog.set("Type", Object::Name(b"Catalog".to_vec()));
        catalog.set("Pages", Object::Reference(pages_id));
        let catalog_id = doc.add_object(catalog);
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let path = dir.path().join("source.pdf");
        doc.save(&path).unwrap();
        path
    }

    fn sample_png(dir: &TempDir, name: &str, w: u32, h: u32) -> PathBuf {
        let path = dir.path().join(name);
        image::RgbImage::from_pixel(w, h, image::Rgb([200, 30, 30])).save(&path).unwrap();
        path
    }

    fn overlay_content(doc: &Document, page_id: ObjectId) -> Content {
        let page = doc.get_dictionary(page_id).unwrap();
        let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
        let xobjects = resources.get(b"XObject").unwrap().as_dict().unwrap();
        let form_id = xobjects.get(OVERLAY_XOBJECT.as_bytes()).unwrap().as_reference().unwrap();
        let form = doc.get_object(form_id).unwrap().as_stream().unwrap();
        Content::decode(&form.content).unwrap()
    }

    #[test]
    fn test_split_footer_lines_trims() {
        assert_eq!(split_footer_lines(FOOTER), vec!["Line one", "Line two", "Line three"]);
        assert_eq!(split_footer_lines("single"), vec!["single"]);
    }

    #[test]
    fn test_render_without_images() {
        let descriptor = OverlayDescriptor::new(PageDimensions::a4(), FOOTER, None);
        let content = render_overlay_content(&descriptor, None, None);

        let rects = ops_named(&content, "re");
        assert_eq!(rects.len(), 2);
        // header band first, footer band second
        assert!((as_f64(&rects[0].operands[1]) - (841.89 - 50.0)).abs() < 0.01);
        assert!((as_f64(&rects[0].operands[3]) - 50.0).abs() < 0.01);
        assert_eq!(as_f64(&rects[1].operands[1]), 0.0);
        assert!((as_f64(&rects[1].operands[3]) - 40.0).abs() < 0.01);

        assert!(ops_named(&content, "Do").is_empty());
    }

    #[test]
    fn test_bands_are_light_blue_and_text_black() {
        let descriptor = OverlayDescriptor::new(PageDimensions::a4(), "x", None);
        let content = render_overlay_content(&descriptor, None, None);
        let colors: Vec<Vec<f64>> = ops_named(&content, "rg")
            .iter()
            .map(|op| op.operands.iter().map(as_f64).collect())
            .collect();

        assert_eq!(colors.len(), 3);
        for band in &colors[..2] {
            assert!((band[0] - 0.678).abs() < 0.001);
            assert!((band[1] - 0.847).abs() < 0.001);
            assert!((band[2] - 0.902).abs() < 0.001);
        }
        assert_eq!(colors[2], vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_footer_lines_left_aligned_descending() {
        let descriptor = OverlayDescriptor::new(PageDimensions::a4(), FOOTER, None);
        let content = render_overlay_content(&descriptor, None, None);

        let matrices = ops_named(&content, "Tm");
        let positions: Vec<(f64, f64)> = matrices
            .iter()
            .map(|op| (as_f64(&op.operands[4]), as_f64(&op.operands[5])))
            .collect();
        assert_eq!(positions, vec![(50.0, 30.0), (50.0, 20.0), (50.0, 10.0)]);

        let fonts = ops_named(&content, "Tf");
        assert!(fonts.iter().all(|op| as_f64(&op.operands[1]) == 8.0));

        let shown: Vec<Vec<u8>> = ops_named(&content, "Tj")
            .iter()
            .map(|op| op.operands[0].as_str().unwrap().to_vec())
            .collect();
        assert_eq!(shown, vec![b"Line one".to_vec(), b"Line two".to_vec(), b"Line three".to_vec()]);
    }

    #[test]
    fn test_images_painted_between_bands() {
        let descriptor = OverlayDescriptor::new(PageDimensions::a4(), "x", Some(2));
        let header = DrawnImage { resource: "ImHeader", rect: Rect::new(60.0, 736.89, 200.0, 100.0) };
        let body = DrawnImage { resource: "ImBody", rect: Rect::new(100.0, 541.89, 360.0, 144.0) };
        let content = render_overlay_content(&descriptor, Some(&header), Some(&body));

        let operators: Vec<&str> = content
            .operations
            .iter()
            .map(|o| o.operator.as_str())
            .filter(|o| matches!(*o, "re" | "Do" | "BT"))
            .collect();
        assert_eq!(operators, vec!["re", "Do", "Do", "re", "BT"]);

        let cms = ops_named(&content, "cm");
        assert_eq!(as_f64(&cms[1].operands[0]), 360.0);
        assert_eq!(as_f64(&cms[1].operands[3]), 144.0);
        assert!((as_f64(&cms[1].operands[5]) - 541.89).abs() < 0.01);
    }

    #[test]
    fn test_compose_keeps_page_count_and_invokes_overlay() {
        let dir = TempDir::new().unwrap();
        let input = sample_pdf(&dir, 3);
        let output = dir.path().join("final.pdf");

        let options = OverlayOptions {
            footer_text: FOOTER.to_string(),
            ..Default::default()
        };
        let report = compose_overlay(&input, &output, &options).unwrap();
        assert_eq!(report.page_count, 3);
        assert_eq!(report.placeholder_index, None);
        assert!(!report.header_image_drawn);
        assert!(!report.body_image_drawn);

        let mut doc = Document::load(&output).unwrap();
        doc.decompress();
        let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
        assert_eq!(pages.len(), 3);

        for page_id in pages {
            // Existing font resource inherited from the page tree survives
            let page = doc.get_dictionary(page_id).unwrap();
            let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
            assert!(resources.get(b"Font").unwrap().as_dict().unwrap().get(b"F1").is_ok());

            let contents = page.get(b"Contents").unwrap().as_array().unwrap();
            assert_eq!(contents.len(), 3);
            let last_id = contents.last().unwrap().as_reference().unwrap();
            let last = doc.get_object(last_id).unwrap().as_stream().unwrap();
            let text = String::from_utf8_lossy(&last.content);
            assert!(text.contains("/JournalOverlay Do"), "{}", text);

            let overlay = overlay_content(&doc, page_id);
            assert_eq!(overlay.operations.iter().filter(|o| o.operator == "Tj").count(), 3);
        }
    }

    #[test]
    fn test_compose_with_missing_header_image_continues() {
        let dir = TempDir::new().unwrap();
        let input = sample_pdf(&dir, 1);
        let output = dir.path().join("final.pdf");

        let options = OverlayOptions {
            footer_text: "Footer".to_string(),
            header_image: Some(dir.path().join("missing-logo.png")),
            ..Default::default()
        };
        let report = compose_overlay(&input, &output, &options).unwrap();
        assert!(!report.header_image_drawn);
        assert!(output.exists());
    }

    #[test]
    fn test_compose_body_image_requires_placeholder() {
        let dir = TempDir::new().unwrap();
        let input = sample_pdf(&dir, 1);
        let output = dir.path().join("final.pdf");
        let figure = sample_png(&dir, "Image1.png", 50, 20);

        let options = OverlayOptions {
            footer_text: "Footer".to_string(),
            header_image: Some(sample_png(&dir, "picture1.png", 40, 20)),
            body_image: Some(figure),
            source_document: None,
            ..Default::default()
        };
        let report = compose_overlay(&input, &output, &options).unwrap();
        assert!(report.header_image_drawn);
        assert!(!report.body_image_drawn);
        assert_eq!(report.body_image_rect, None);
    }

    #[test]
    fn test_compose_rejects_missing_input() {
        let dir = TempDir::new().unwrap();
        let result = compose_overlay(
            &dir.path().join("absent.pdf"),
            &dir.path().join("out.pdf"),
            &OverlayOptions::default(),
        );
        assert!(matches!(result, Err(Error::FileNotFound(_))));
    }

    enum ContentsShape {
        Stream,
        Array,
        IndirectArray,
    }

    const TEXT_OPS: &str = "BT /F1 12 Tf 72 700 Td (Hello) Tj ET";
    const PATH_OPS: &str = "0 0 m 10 10 l S";

    fn pdf_with_contents(dir: &TempDir, shape: ContentsShape) -> PathBuf {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let text_id = doc.add_object(Stream::new(Dictionary::new(), TEXT_OPS.as_bytes().to_vec()));
        let path_id = doc.add_object(Stream::new(Dictionary::new(), PATH_OPS.as_bytes().to_vec()));
        let both = vec![Object::Reference(text_id), Object::Reference(path_id)];

        let contents = match shape {
            ContentsShape::Stream => Object::Reference(text_id),
            ContentsShape::Array => Object::Array(both),
            ContentsShape::IndirectArray => Object::Reference(doc.add_object(Object::Array(both))),
        };

        let mut page = Dictionary::new();
        page.set("Type", Object::Name(b"Page".to_vec()));
        page.set("Parent", Object::Reference(pages_id));
        page.set("Contents", contents);
        page.set("MediaBox", Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(595.28),
            Object::Real(841.89),
        ]));
        let page_id = doc.add_object(page);

        let mut pages_dict = Dictionary::new();
        pages_dict.set("Type", Object::Name(b"Pages".to_vec()));
        pages_dict.set("Count", Object::Integer(1));
        pages_dict.set("Kids", Object::Array(vec![Object::Reference(page_id)]));
        doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

        let mut catalog = Dictionary::new();
        catalog.set("Type", Object::Name(b"Catalog".to_vec()));
        catalog.set("Pages", Object::Reference(pages_id));
        let catalog_id = doc.add_object(catalog);
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let path = dir.path().join("shaped.pdf");
        doc.save(&path).unwrap();
        path
    }

    /// Compose the overlay and return the merged page's content and its
    /// `Contents` entries
    fn merged_page(shape: ContentsShape) -> (String, Vec<Object>) {
        let dir = TempDir::new().unwrap();
        let input = pdf_with_contents(&dir, shape);
        let output = dir.path().join("final.pdf");
        let options = OverlayOptions {
            footer_text: "Footer".to_string(),
            ..Default::default()
        };
        compose_overlay(&input, &output, &options).unwrap();

        let mut doc = Document::load(&output).unwrap();
        doc.decompress();
        let page_id = doc.get_pages().into_values().next().unwrap();
        let content = String::from_utf8_lossy(&doc.get_page_content(page_id).unwrap()).into_owned();
        let entries = doc
            .get_dictionary(page_id)
            .unwrap()
            .get(b"Contents")
            .unwrap()
            .as_array()
            .unwrap()
            .clone();

        for entry in &entries {
            let id = entry.as_reference().unwrap();
            assert!(doc.get_object(id).unwrap().as_stream().is_ok(), "{:?} is not a stream", entry);
        }
        (content, entries)
    }

    #[test]
    fn test_merge_keeps_single_content_stream() {
        let (content, entries) = merged_page(ContentsShape::Stream);
        assert_eq!(entries.len(), 3);
        assert!(content.contains(TEXT_OPS), "{}", content);
        assert!(content.trim_end().ends_with("/JournalOverlay Do\nQ"), "{}", content);
    }

    #[test]
    fn test_merge_keeps_inline_content_array() {
        let (content, entries) = merged_page(ContentsShape::Array);
        assert_eq!(entries.len(), 4);
        assert!(content.contains(TEXT_OPS), "{}", content);
        assert!(content.contains(PATH_OPS), "{}", content);
        assert!(content.find(TEXT_OPS) < content.find("/JournalOverlay Do"));
    }

    #[test]
    fn test_merge_flattens_indirect_content_array() {
        let (content, entries) = merged_page(ContentsShape::IndirectArray);
        assert_eq!(entries.len(), 4);
        assert!(content.contains(TEXT_OPS), "{}", content);
        assert!(content.contains(PATH_OPS), "{}", content);
        assert!(content.find(PATH_OPS) < content.find("/JournalOverlay Do"));
    }
}
