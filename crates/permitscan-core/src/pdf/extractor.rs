//! PDF text and image extraction using lopdf and pdf-extract.

use std::collections::HashSet;
use std::io::Cursor;

use image::{DynamicImage, GrayImage, RgbImage};
use lopdf::{Document, Object, ObjectId, Stream};
use tracing::{debug, trace};

use super::PdfKind;
use crate::acquisition::PermitImage;
use crate::error::PdfError;

/// A loaded permit PDF.
pub struct PermitPdf {
    document: Document,
    raw_data: Vec<u8>,
}

impl PermitPdf {
    /// Parse a PDF, decrypting it when it only has an empty user password.
    pub fn load(data: &[u8]) -> Result<Self, PdfError> {
        let mut document = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        let raw_data = if document.is_encrypted() {
            if document.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // pdf-extract needs the decrypted bytes.
            let mut decrypted = Vec::new();
            document
                .save_to(&mut decrypted)
                .map_err(|e| PdfError::Parse(format!("failed to save decrypted PDF: {}", e)))?;
            decrypted
        } else {
            data.to_vec()
        };

        let page_count = document.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        Ok(Self { document, raw_data })
    }

    pub fn page_count(&self) -> u32 {
        self.document.get_pages().len() as u32
    }

    /// Text layer of the whole document.
    pub fn text(&self) -> Result<String, PdfError> {
        pdf_extract::extract_text_from_mem(&self.raw_data)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))
    }

    /// Classify the document by whether it has a usable text layer and embedded images.
    pub fn classify(&self, min_text_length: usize) -> PdfKind {
        let text_len = self.text().map(|t| t.trim().len()).unwrap_or(0);
        let has_images = !self.page_images(0).is_empty();
        let kind = PdfKind::from_content(text_len >= min_text_length && text_len > 0, has_images);

        debug!(
            "PDF analysis: {} chars text, has_images={} -> {:?}",
            text_len, has_images, kind
        );
        kind
    }

    /// Images embedded in the page resources of the first `max_pages` pages (0 = all).
    ///
    /// JPEG streams are returned as-is; 8-bit RGB and grayscale rasters are re-encoded
    /// as PNG. Other encodings are skipped.
    pub fn page_images(&self, max_pages: usize) -> Vec<PermitImage> {
        let pages = self.document.get_pages();
        let limit = if max_pages == 0 { pages.len() } else { max_pages };
        let mut seen: HashSet<ObjectId> = HashSet::new();
        let mut images = Vec::new();

        for (number, page_id) in pages.iter().take(limit) {
            let mut found = 0;
            for id in self.page_xobject_ids(*page_id) {
                if !seen.insert(id) {
                    continue;
                }
                if let Some(image) = self.decode_image_object(id) {
                    images.push(image);
                    found += 1;
                }
            }
            trace!("Page {}: {} images", number, found);
        }

        debug!("Extracted {} images from {} pages", images.len(), limit.min(pages.len()));
        images
    }

    /// Extract the images of a single page (1-indexed).
    pub fn images_on_page(&self, page: u32) -> Result<Vec<PermitImage>, PdfError> {
        let pages = self.document.get_pages();
        let page_id = pages.get(&page).ok_or(PdfError::InvalidPage(page))?;

        Ok(self
            .page_xobject_ids(*page_id)
            .into_iter()
            .filter_map(|id| self.decode_image_object(id))
            .collect())
    }

    fn page_xobject_ids(&self, page_id: ObjectId) -> Vec<ObjectId> {
        let Some(resources) = self.page_resources(page_id) else {
            return Vec::new();
        };
        let Ok(xobjects) = resources.get(b"XObject") else {
            return Vec::new();
        };
        let Ok((_, Object::Dictionary(xobjects))) = self.document.dereference(xobjects) else {
            return Vec::new();
        };

        xobjects
            .iter()
            .filter_map(|(_, obj)| obj.as_reference().ok())
            .collect()
    }

    /// Resources of a page, walking up the page tree for inherited entries.
    fn page_resources(&self, mut node_id: ObjectId) -> Option<lopdf::Dictionary> {
        loop {
            let Ok(Object::Dictionary(node)) = self.document.get_object(node_id) else {
                return None;
            };
            if let Ok(resources) = node.get(b"Resources") {
                if let Ok((_, Object::Dictionary(dict))) = self.document.dereference(resources) {
                    return Some(dict.clone());
                }
            }
            node_id = node.get(b"Parent").ok()?.as_reference().ok()?;
        }
    }

    fn decode_image_object(&self, id: ObjectId) -> Option<PermitImage> {
        let Ok(Object::Stream(stream)) = self.document.get_object(id) else {
            return None;
        };
        let dict = &stream.dict;
        if dict.get(b"Subtype").ok()?.as_name().ok()? != b"Image" {
            return None;
        }

        match self.filter_name(stream) {
            Some(b"DCTDecode") => {
                trace!("Found JPEG image object {:?}", id);
                return Some(PermitImage::from_bytes(stream.content.clone(), Some("jpg")));
            }
            Some(b"JPXDecode") | Some(b"CCITTFaxDecode") | Some(b"JBIG2Decode") => {
                trace!("Skipping unsupported image encoding in object {:?}", id);
                return None;
            }
            _ => {}
        }

        let width = u32::try_from(dict.get(b"Width").ok()?.as_i64().ok()?).ok()?;
        let height = u32::try_from(dict.get(b"Height").ok()?.as_i64().ok()?).ok()?;
        let bits = dict
            .get(b"BitsPerComponent")
            .ok()
            .and_then(|o| o.as_i64().ok())
            .unwrap_or(8);
        if bits != 8 {
            trace!("Unsupported bits per component: {}", bits);
            return None;
        }

        let data = stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone());
        let raster = match self.color_space(stream) {
            Some(b"DeviceGray") | Some(b"G") => {
                let len = width as usize * height as usize;
                GrayImage::from_raw(width, height, data.get(..len)?.to_vec())
                    .map(DynamicImage::ImageLuma8)
            }
            Some(b"DeviceRGB") | Some(b"RGB") | None => {
                let len = width as usize * height as usize * 3;
                RgbImage::from_raw(width, height, data.get(..len)?.to_vec())
                    .map(DynamicImage::ImageRgb8)
            }
            Some(other) => {
                trace!("Unsupported color space {}", String::from_utf8_lossy(other));
                None
            }
        }?;

        let mut png = Vec::new();
        raster
            .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .ok()?;
        Some(PermitImage::from_bytes(png, Some("png")))
    }

    fn filter_name<'a>(&self, stream: &'a Stream) -> Option<&'a [u8]> {
        match stream.dict.get(b"Filter").ok()? {
            Object::Name(name) => Some(name.as_slice()),
            Object::Array(filters) => filters.first().and_then(|o| o.as_name().ok()),
            _ => None,
        }
    }

    fn color_space<'a>(&'a self, stream: &'a Stream) -> Option<&'a [u8]> {
        match stream.dict.get(b"ColorSpace").ok()? {
            Object::Name(name) => Some(name.as_slice()),
            Object::Array(items) => items.first().and_then(|o| o.as_name().ok()),
            Object::Reference(r) => self.document.get_object(*r).ok()?.as_name().ok(),
            _ => None,
        }
    }
}
