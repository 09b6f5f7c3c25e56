//! Journal template settings and service configuration
//!
//! Defaults reproduce the fixed journal setup: logo and figure read from
//! `static/`, uploads kept in `uploads/`, the Global Health Equity disclaimer in
//! the footer.

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::docx::DEFAULT_PLACEHOLDER;
use crate::raster::DEFAULT_DPI;

/// Footer disclaimer printed on every page
pub const DEFAULT_FOOTER_TEXT: &str = "Global Health Equity. © 2024. Published by Global Health Equity journal. Global Health Equity is an Open Access journal distributed, \n\
under the terms of the Creative Commons Attribution License (http://creativecommons.org/licenses/by/4.0/), which permits unrestricted use,\n\
distribution, and reproduction in any medium, provided the original work is properly cited.";

pub const DEFAULT_HEADER_IMAGE: &str = "static/picture1.png";
pub const DEFAULT_BODY_IMAGE: &str = "static/Image1.png";
pub const DEFAULT_UPLOADS_DIR: &str = "uploads";
pub const DEFAULT_BIND: &str = "127.0.0.1:5000";
pub const DEFAULT_OFFICE_PROGRAM: &str = "soffice";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// Fixed visual assets of the journal template
#[derive(Debug, Clone, PartialEq)]
pub struct Assets {
    pub header_image: Option<PathBuf>,
    pub body_image: Option<PathBuf>,
    pub footer_text: String,
    pub placeholder: String,
    pub target_dpi: u32,
}

impl Default for Assets {
    fn default() -> Self {
        Self {
            header_image: Some(PathBuf::from(DEFAULT_HEADER_IMAGE)),
            body_image: Some(PathBuf::from(DEFAULT_BODY_IMAGE)),
            footer_text: DEFAULT_FOOTER_TEXT.to_string(),
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            target_dpi: DEFAULT_DPI,
        }
    }
}

/// Settings for the upload service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub bind: SocketAddr,
    pub uploads_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub office_program: String,
    pub assets: Assets,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 5000)),
            uploads_dir: PathBuf::from(DEFAULT_UPLOADS_DIR),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            office_program: DEFAULT_OFFICE_PROGRAM.to_string(),
            assets: Assets::default(),
        }
    }
}
