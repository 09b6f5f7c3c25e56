//! DOCX to PDF conversion
//!
//! Rendering a word-processing document is delegated to an external office
//! suite running headless. The [`Converter`] trait is the seam between the
//! pipeline and that backend, so callers (and tests) can substitute another
//! renderer.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{Error, Result};

/// Something that can turn a source document into a PDF file
pub trait Converter: Send + Sync {
    /// Render `source` as PDF and write it to `destination`
    fn convert(&self, source: &Path, destination: &Path) -> Result<()>;
}

/// LibreOffice (or compatible) running as `soffice --headless --convert-to pdf`
#[derive(Debug, Clone)]
pub struct OfficeConverter {
    /// Program to execute
    pub program: OsString,
}

impl Default for OfficeConverter {
    fn default() -> Self {
        Self {
            program: OsString::from("soffice"),
        }
    }
}

impl OfficeConverter {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Converter for OfficeConverter {
    fn convert(&self, source: &Path, destination: &Path) -> Result<()> {
        if !source.exists() {
            return Err(Error::FileNotFound(source.to_path_buf()));
        }

        // Each run gets its own output directory and user profile so two
        // conversions never fight over the same office instance.
        let scratch = tempfile::Builder::new().prefix("journal-convert-").tempdir()?;
        let profile = scratch.path().join("profile");
        let mut profile_arg = OsString::from("-env:UserInstallation=file://");
        profile_arg.push(profile.as_os_str());

        let output = Command::new(&self.program)
            .arg(profile_arg)
            .arg("--headless")
            .arg("--convert-to")
            .arg("pdf")
            .arg("--outdir")
            .arg(scratch.path())
            .arg(source)
            .output()
            .map_err(|e| {
                Error::Conversion(format!(
                    "could not start {}: {}",
                    Path::new(&self.program).display(),
                    e
                ))
            })?;

        if !output.status.success() {
            return Err(Error::Conversion(format!(
                "{} exited with {}: {}",
                Path::new(&self.program).display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let stem = source
            .file_stem()
            .ok_or_else(|| Error::Conversion(format!("no file name in {}", source.display())))?;
        let produced = scratch
            .path()
            .join(format!("{}.pdf", stem.to_string_lossy()));
        if !produced.exists() {
            return Err(Error::Conversion(format!(
                "converter produced no PDF for {}",
                source.display()
            )));
        }

        std::fs::copy(&produced, destination)?;
        Ok(())
    }
}

/// Run `converter` and report success as the destination path.
///
/// Failures are logged and collapse to `None`; delivery code turns that into a
/// generic conversion message.
pub fn convert_to_pdf(converter: &dyn Converter, source: &Path, destination: &Path) -> Option<PathBuf> {
    match converter.convert(source, destination) {
        Ok(()) => {
            tracing::info!(
                source = %source.display(),
                pdf = %destination.display(),
                "PDF successfully created"
            );
            Some(destination.to_path_buf())
        }
        Err(e) => {
            tracing::error!(source = %source.display(), error = %e, "DOCX to PDF conversion failed");
            None
        }
    }
}
