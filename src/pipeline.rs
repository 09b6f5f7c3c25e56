//! End-to-end job: convert the manuscript, then overlay the journal template
//!
//! Both entry points (the upload service and the `format` command) drive the
//! same [`Pipeline`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use unicode_normalization::UnicodeNormalization;

use crate::config::Assets;
use crate::convert::{convert_to_pdf, Converter};
use crate::error::{Error, Result};
use crate::pdf::{compose_overlay, ComposeReport, OverlayOptions};

/// Upload extensions the service accepts
pub const ALLOWED_EXTENSIONS: &[&str] = &["docx", "pdf"];

/// Message returned when the converter backend fails
pub const CONVERSION_FAILED: &str = "Error in PDF conversion";

/// Lower-cased extension after the last `.`, if any
fn extension_of(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
}

/// Whether an uploaded filename carries an allowed extension
pub fn allowed_file(filename: &str) -> bool {
    extension_of(filename).is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
}

/// Reduce an uploaded filename to a safe, flat ASCII name.
///
/// The name is NFKD-decomposed and non-ASCII code points are dropped, so
/// accented letters keep their base letter. Path separators become spaces,
/// whitespace runs become `_`, characters outside `[A-Za-z0-9_.-]` are
/// dropped, and leading/trailing `.`/`_` are stripped. The result may be empty.
pub fn secure_filename(filename: &str) -> String {
    let flattened: String = filename
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = flattened.split_whitespace().collect::<Vec<_>>().join("_");

    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();

    kept.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// Check an uploaded filename against the allow-list and sanitise it.
///
/// Fails with [`Error::InvalidFormat`] when the name has no allowed extension,
/// before or after sanitising.
pub fn upload_file_name(filename: &str) -> Result<String> {
    if !allowed_file(filename) {
        return Err(Error::InvalidFormat(filename.to_string()));
    }
    let safe_name = secure_filename(filename);
    if !allowed_file(&safe_name) {
        return Err(Error::InvalidFormat(filename.to_string()));
    }
    Ok(safe_name)
}

/// Where the intermediate and final PDFs for `source` go: next to it, named
/// `<stem>_temp.pdf` and `<stem>_final.pdf`
pub fn output_paths(source: &Path) -> (PathBuf, PathBuf) {
    let dir = source.parent().unwrap_or_else(|| Path::new(""));
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    (
        dir.join(format!("{}_temp.pdf", stem)),
        dir.join(format!("{}_final.pdf", stem)),
    )
}

/// Files produced by a successful run
#[derive(Debug, Clone)]
pub struct Outcome {
    pub converted_pdf: PathBuf,
    pub final_pdf: PathBuf,
    pub report: ComposeReport,
}

/// Converter plus journal assets
#[derive(Clone)]
pub struct Pipeline {
    converter: Arc<dyn Converter>,
    assets: Assets,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline").field("assets", &self.assets).finish_non_exhaustive()
    }
}

impl Pipeline {
    pub fn new(converter: impl Converter + 'static, assets: Assets) -> Self {
        Self {
            converter: Arc::new(converter),
            assets,
        }
    }

    /// Process an uploaded file, writing results next to it
    pub fn run(&self, source: &Path) -> Result<Outcome> {
        let (converted, final_pdf) = output_paths(source);
        self.run_with_paths(source, &converted, &final_pdf)
    }

    /// Process `source` with explicit intermediate and output paths.
    ///
    /// DOCX input is rendered by the converter and searched for the figure
    /// placeholder. PDF input is used as-is and never receives the figure.
    pub fn run_with_paths(&self, source: &Path, converted: &Path, final_pdf: &Path) -> Result<Outcome> {
        if !source.exists() {
            return Err(Error::FileNotFound(source.to_path_buf()));
        }

        let is_pdf = source
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));

        let source_document = if is_pdf {
            tracing::info!(source = %source.display(), "input is already a PDF; skipping conversion");
            std::fs::copy(source, converted)?;
            None
        } else {
            tracing::info!(source = %source.display(), "converting DOCX to PDF");
            convert_to_pdf(self.converter.as_ref(), source, converted)
                .ok_or_else(|| Error::Conversion(CONVERSION_FAILED.to_string()))?;
            Some(source.to_path_buf())
        };

        if !converted.exists() {
            return Err(Error::FileNotFound(converted.to_path_buf()));
        }

        let options = OverlayOptions {
            footer_text: self.assets.footer_text.clone(),
            header_image: self.assets.header_image.clone(),
            body_image: self.assets.body_image.clone(),
            source_document,
            placeholder: self.assets.placeholder.clone(),
            target_dpi: self.assets.target_dpi,
        };

        let report = compose_overlay(converted, final_pdf, &options)?;

        Ok(Outcome {
            converted_pdf: converted.to_path_buf(),
            final_pdf: final_pdf.to_path_buf(),
            report,
        })
    }
}
