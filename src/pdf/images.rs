//! Raster images as PDF Image XObjects

use std::path::Path;

use image::GenericImageView;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

use crate::error::Result;

/// An image added to a document, with its pixel size for placement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbeddedImage {
    pub id: ObjectId,
    pub width: u32,
    pub height: u32,
}

/// Decode an image file and add it to `doc` as a DeviceRGB Image XObject.
///
/// Images with an alpha channel get a DeviceGray soft mask so transparent
/// logo backgrounds stay transparent.
pub fn embed_image_file(doc: &mut Document, path: &Path) -> Result<EmbeddedImage> {
    let decoded = image::ImageReader::open(path)?
        .with_guessed_format()?
        .decode()?;
    let (width, height) = decoded.dimensions();

    let smask_id = if decoded.color().has_alpha() {
        let alpha: Vec<u8> = decoded.to_rgba8().pixels().map(|p| p[3]).collect();
        Some(doc.add_object(Stream::new(
            image_dictionary(width, height, "DeviceGray"),
            alpha,
        )))
    } else {
        None
    };

    let mut dict = image_dictionary(width, height, "DeviceRGB");
    if let Some(smask_id) = smask_id {
        dict.set("SMask", Object::Reference(smask_id));
    }

    let rgb = decoded.to_rgb8().into_raw();
    let id = doc.add_object(Stream::new(dict, rgb));

    Ok(EmbeddedImage { id, width, height })
}

fn image_dictionary(width: u32, height: u32, color_space: &str) -> Dictionary {
    let mut dict = Dictionary::new();
    dict.set("Type", Object::Name(b"XObject".to_vec()));
    dict.set("Subtype", Object::Name(b"Image".to_vec()));
    dict.set("Width", Object::Integer(width as i64));
    dict.set("Height", Object::Integer(height as i64));
    dict.set("ColorSpace", Object::Name(color_space.as_bytes().to_vec()));
    dict.set("BitsPerComponent", Object::Integer(8));
    dict
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_embed_rgb_image() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("figure.png");
        image::RgbImage::from_pixel(4, 3, image::Rgb([10, 20, 30]))
            .save(&path)
            .unwrap();

        let mut doc = Document::with_version("1.5");
        let embedded = embed_image_file(&mut doc, &path).unwrap();
        assert_eq!((embedded.width, embedded.height), (4, 3));

        let stream = doc.get_object(embedded.id).unwrap().as_stream().unwrap();
        assert_eq!(stream.dict.get(b"Subtype").unwrap().as_name().unwrap(), b"Image");
        assert_eq!(stream.dict.get(b"ColorSpace").unwrap().as_name().unwrap(), b"DeviceRGB");
        assert!(stream.dict.get(b"SMask").is_err());
        assert_eq!(stream.content.len(), 4 * 3 * 3);
    }

    #[test]
    fn test_embed_image_with_alpha_adds_soft_mask() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("logo.png");
        image::RgbaImage::from_pixel(2, 2, image::Rgba([255, 0, 0, 64]))
            .save(&path)
            .unwrap();

        let mut doc = Document::with_version("1.5");
        let embedded = embed_image_file(&mut doc, &path).unwrap();

        let stream = doc.get_object(embedded.id).unwrap().as_stream().unwrap();
        let smask_id = stream.dict.get(b"SMask").unwrap().as_reference().unwrap();
        let smask = doc.get_object(smask_id).unwrap().as_stream().unwrap();
        assert_eq!(smask.content, vec![64; 4]);
    }

    #[test]
    fn test_embed_unreadable_image_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"nope").unwrap();

        let mut doc = Document::with_version("1.5");
        assert!(embed_image_file(&mut doc, &path).is_err());
    }
}
