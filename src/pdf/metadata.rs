//! Page counting and page geometry lookup

use std::path::Path;
use lopdf::{Document, Object, ObjectId};
use crate::error::{Error, Result};

/// Count pages by reading the Count field from the Pages dictionary
fn count_pages_from_catalog(doc: &Document) -> Result<usize> {
    let catalog = doc.catalog()?;
    let pages_id = catalog
        .get(b"Pages")
        .and_then(Object::as_reference)
        .map_err(|_| Error::General("No Pages reference in catalog".to_string()))?;

    let count = doc
        .get_dictionary(pages_id)?
        .get(b"Count")
        .and_then(Object::as_i64)
        .map_err(|_| Error::General("No integer Count in Pages".to_string()))?;

    Ok(count.max(0) as usize)
}

/// Count the number of pages in a PDF file
pub fn count_pages(path: &Path) -> Result<usize> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let doc = Document::load(path)?;
    let page_count = count_pages_from_catalog(&doc)?;

    if page_count == 0 {
        return Err(Error::EmptyPdf(path.to_path_buf()));
    }

    Ok(page_count)
}

/// Width and height in points of a page's MediaBox, following inheritance
/// up the page tree
pub fn page_size(doc: &Document, page_id: ObjectId) -> Option<(f64, f64)> {
    let mut current = page_id;
    // Page trees are shallow; the bound only protects against Parent cycles
    for _ in 0..32 {
        let dict = doc.get_dictionary(current).ok()?;
        if let Ok(Object::Array(media_box)) = dict.get(b"MediaBox") {
            let nums: Vec<f64> = media_box.iter().filter_map(number).collect();
            if nums.len() == 4 {
                return Some(((nums[2] - nums[0]).abs(), (nums[3] - nums[1]).abs()));
            }
            return None;
        }
        current = dict.get(b"Parent").and_then(Object::as_reference).ok()?;
    }
    None
}

fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(*r as f64),
        _ => None,
    }
}
