//! Journal PDF Library
//!
//! Turns a manuscript into a journal-formatted PDF. This library provides
//! functionality to:
//! - Render a DOCX to PDF through a headless office converter
//! - Locate a figure placeholder token in the manuscript's paragraphs
//! - Normalize raster images to a fixed resolution
//! - Overlay header/footer bands, a logo, a figure and a disclaimer on every page
//! - Serve the whole pipeline behind an upload form
//!
//! # Example
//!
//! ```no_run
//! use journal_pdf::config::Assets;
//! use journal_pdf::convert::OfficeConverter;
//! use journal_pdf::pipeline::Pipeline;
//! use std::path::Path;
//!
//! let pipeline = Pipeline::new(OfficeConverter::default(), Assets::default());
//! let outcome = pipeline.run(Path::new("uploads/paper.docx")).expect("pipeline failed");
//! println!("wrote {}", outcome.final_pdf.display());
//! ```

pub mod config;
pub mod convert;
pub mod docx;
pub mod error;
pub mod layout;
pub mod pdf;
pub mod pipeline;
pub mod raster;
pub mod server;

// Re-export commonly used items
pub use error::{Error, Result};
