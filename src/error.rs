//! Error types for the journal PDF library

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the journal PDF library
#[derive(Error, Debug)]
pub enum Error {
    /// PDF processing error
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Raster image could not be decoded or encoded
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// PNG encoding error while writing resolution metadata
    #[error("PNG encoding error: {0}")]
    Png(#[from] png::EncodingError),

    /// DOCX container could not be read
    #[error("DOCX archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// DOCX part is not well-formed XML
    #[error("DOCX XML error: {0}")]
    Xml(#[from] roxmltree::Error),

    /// DOCX is structurally invalid (missing parts, no body)
    #[error("Invalid DOCX: {0}")]
    Docx(String),

    /// The document converter backend failed or is unavailable
    #[error("Conversion failed: {0}")]
    Conversion(String),

    /// File not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Invalid PDF (no pages)
    #[error("PDF has no pages: {}", .0.display())]
    EmptyPdf(PathBuf),

    /// Upload rejected by the extension allow-list
    #[error("Invalid file format: {0}")]
    InvalidFormat(String),

    /// General error
    #[error("{0}")]
    General(String),
}
