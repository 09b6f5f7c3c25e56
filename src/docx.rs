//! Source document reading and placeholder lookup
//!
//! Only the paragraph text of the main document part is read. Styles, tables and
//! drawings are ignored; the overlay only needs to know which body paragraph
//! carries the figure placeholder.

use std::io::{Read, Seek};
use std::path::Path;

use crate::error::{Error, Result};

/// Marker token authors type where the figure should go
pub const DEFAULT_PLACEHOLDER: &str = "<Image1>";

const WML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// A body paragraph with its plain text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    pub text: String,
}

impl Paragraph {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// The ordered body paragraphs of a DOCX file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceDocument {
    pub paragraphs: Vec<Paragraph>,
}

impl SourceDocument {
    /// Build a document from already-extracted paragraph texts
    pub fn from_paragraphs<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paragraphs: texts.into_iter().map(Paragraph::new).collect(),
        }
    }

    /// Read the body paragraphs of a DOCX file on disk
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Read the body paragraphs from any seekable DOCX byte source
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut zip = zip::ZipArchive::new(reader)?;

        let mut xml_content = String::new();
        zip.by_name("word/document.xml")
            .map_err(|_| Error::Docx("missing word/document.xml (is this a DOCX file?)".into()))?
            .read_to_string(&mut xml_content)?;

        let xml = roxmltree::Document::parse(&xml_content)?;
        let body = wml(xml.root_element(), "body")
            .ok_or_else(|| Error::Docx("missing w:body".into()))?;

        let paragraphs = body
            .children()
            .filter(|n| is_wml(*n, "p"))
            .map(|p| Paragraph::new(paragraph_text(p)))
            .collect();

        Ok(Self { paragraphs })
    }

    pub fn len(&self) -> usize {
        self.paragraphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }
}

fn is_wml(node: roxmltree::Node, name: &str) -> bool {
    node.tag_name().name() == name && node.tag_name().namespace() == Some(WML_NS)
}

fn wml<'a>(node: roxmltree::Node<'a, 'a>, name: &str) -> Option<roxmltree::Node<'a, 'a>> {
    node.children().find(|n| is_wml(*n, name))
}

/// Concatenate the run text of a paragraph.
///
/// Runs directly under the paragraph and under hyperlinks count; runs inside
/// text boxes belong to their own nested paragraphs and are skipped.
fn paragraph_text(para: roxmltree::Node) -> String {
    let mut text = String::new();
    for child in para.children() {
        if is_wml(child, "r") {
            push_run_text(child, &mut text);
        } else if is_wml(child, "hyperlink") {
            for run in child.children().filter(|n| is_wml(*n, "r")) {
                push_run_text(run, &mut text);
            }
        }
    }
    text
}

fn push_run_text(run: roxmltree::Node, out: &mut String) {
    for node in run.children() {
        if node.tag_name().namespace() != Some(WML_NS) {
            continue;
        }
        match node.tag_name().name() {
            "t" => out.push_str(node.text().unwrap_or("")),
            "tab" => out.push('\t'),
            "br" | "cr" => out.push('\n'),
            "noBreakHyphen" => out.push('-'),
            _ => {}
        }
    }
}

/// Find the first paragraph containing `marker` as a whole whitespace-separated token.
///
/// A marker embedded in a longer word (`x<Image1>`) does not match. Later
/// occurrences are ignored.
pub fn find_placeholder(doc: &SourceDocument, marker: &str) -> Option<usize> {
    for (para_index, paragraph) in doc.paragraphs.iter().enumerate() {
        if let Some(word_index) = paragraph.text.split_whitespace().position(|w| w == marker) {
            tracing::debug!(marker, paragraph = para_index, word = word_index, "found placeholder");
            return Some(para_index);
        }
    }
    None
}
