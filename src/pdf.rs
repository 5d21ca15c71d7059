//! Minimal PDF assembly on top of lopdf: one image XObject per page.

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

use crate::decode::{DecodedImage, ImagePayload, JpegColor};
use crate::layout::{PageSize, Rect, Unit};
use crate::{Error, Result};

fn name(value: &str) -> Object {
    Object::Name(value.as_bytes().to_vec())
}

fn real(value: f64) -> Object {
    Object::Real(value as f32)
}

/// Builds a document page by page
pub struct PdfBuilder {
    doc: Document,
    pages_id: ObjectId,
    page_ids: Vec<ObjectId>,
    page: PageSize,
    points_per_unit: f64,
    uses_soft_masks: bool,
}

impl PdfBuilder {
    pub fn new(page: PageSize, unit: Unit) -> Self {
        let mut doc = Document::with_version("1.3");
        let pages_id = doc.new_object_id();
        Self {
            doc,
            pages_id,
            page_ids: Vec::new(),
            page,
            points_per_unit: unit.points_per_unit(),
            uses_soft_masks: false,
        }
    }

    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    fn media_box(&self) -> Object {
        Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            real(self.page.width * self.points_per_unit),
            real(self.page.height * self.points_per_unit),
        ])
    }

    fn push_page(&mut self, resources: Dictionary, operations: Vec<Operation>) -> Result<()> {
        let content = Content { operations }
            .encode()
            .map_err(|e| Error::Pdf(format!("content stream: {}", e)))?;
        let content_id = self.doc.add_object(Stream::new(Dictionary::new(), content));

        let media_box = self.media_box();
        let page_id = self.doc.add_object(Dictionary::from_iter([
            ("Type", name("Page")),
            ("Parent", Object::Reference(self.pages_id)),
            ("MediaBox", media_box),
            ("Contents", Object::Reference(content_id)),
            ("Resources", Object::Dictionary(resources)),
        ]));
        self.page_ids.push(page_id);
        Ok(())
    }

    /// Append a page showing `image` inside `rect` (top-left origin, user units).
    pub fn add_image_page(&mut self, image: &DecodedImage, rect: Rect) -> Result<()> {
        let image_id = self.add_image_object(image);
        let xobject_name = format!("Im{}", self.page_ids.len());

        let k = self.points_per_unit;
        let bottom = self.page.height - rect.y - rect.height;
        let operations = vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    real(rect.width * k),
                    Object::Integer(0),
                    Object::Integer(0),
                    real(rect.height * k),
                    real(rect.x * k),
                    real(bottom * k),
                ],
            ),
            Operation::new("Do", vec![name(&xobject_name)]),
            Operation::new("Q", vec![]),
        ];

        let resources = Dictionary::from_iter([(
            "XObject",
            Object::Dictionary(Dictionary::from_iter([(
                xobject_name.as_str(),
                Object::Reference(image_id),
            )])),
        )]);
        self.push_page(resources, operations)
    }

    fn add_image_object(&mut self, image: &DecodedImage) -> ObjectId {
        let mut dict = Dictionary::from_iter([
            ("Type", name("XObject")),
            ("Subtype", name("Image")),
            ("Width", Object::Integer(i64::from(image.width))),
            ("Height", Object::Integer(i64::from(image.height))),
            ("BitsPerComponent", Object::Integer(8)),
        ]);

        let stream = match &image.payload {
            ImagePayload::Jpeg { data, color } => {
                let space = match color {
                    JpegColor::Gray => "DeviceGray",
                    JpegColor::Rgb => "DeviceRGB",
                };
                dict.set("ColorSpace", name(space));
                dict.set("Filter", name("DCTDecode"));
                Stream::new(dict, data.clone()).with_compression(false)
            }
            ImagePayload::Rgb { rgb, alpha } => {
                dict.set("ColorSpace", name("DeviceRGB"));
                if let Some(alpha) = alpha {
                    let mask = Dictionary::from_iter([
                        ("Type", name("XObject")),
                        ("Subtype", name("Image")),
                        ("Width", Object::Integer(i64::from(image.width))),
                        ("Height", Object::Integer(i64::from(image.height))),
                        ("ColorSpace", name("DeviceGray")),
                        ("BitsPerComponent", Object::Integer(8)),
                    ]);
                    let mask_id = self.doc.add_object(Stream::new(mask, alpha.clone()));
                    dict.set("SMask", Object::Reference(mask_id));
                    self.uses_soft_masks = true;
                }
                Stream::new(dict, rgb.clone())
            }
        };
        self.doc.add_object(stream)
    }

    /// Give a document without images its initial blank page.
    pub fn ensure_page(&mut self) -> Result<()> {
        if self.page_ids.is_empty() {
            self.push_page(Dictionary::new(), Vec::new())?;
        }
        Ok(())
    }

    /// Close the page tree and serialize.
    pub fn finish(mut self, title: &str) -> Result<Vec<u8>> {
        self.ensure_page()?;
        // Soft masks need PDF 1.4.
        if self.uses_soft_masks {
            self.doc.version = "1.4".to_string();
        }

        let kids: Vec<Object> = self
            .page_ids
            .iter()
            .map(|&id| Object::Reference(id))
            .collect();
        let pages = Dictionary::from_iter([
            ("Type", name("Pages")),
            ("Kids", Object::Array(kids)),
            ("Count", Object::Integer(self.page_ids.len() as i64)),
        ]);
        self.doc
            .objects
            .insert(self.pages_id, Object::Dictionary(pages));

        let catalog_id = self.doc.add_object(Dictionary::from_iter([
            ("Type", name("Catalog")),
            ("Pages", Object::Reference(self.pages_id)),
        ]));
        let info_id = self.doc.add_object(Dictionary::from_iter([
            ("Title", Object::string_literal(title)),
            ("Producer", Object::string_literal("imagify")),
        ]));
        self.doc.trailer.set("Root", Object::Reference(catalog_id));
        self.doc.trailer.set("Info", Object::Reference(info_id));

        self.doc.compress();

        let mut output = Vec::new();
        self.doc
            .save_to(&mut output)
            .map_err(|e| Error::Pdf(format!("failed to save document: {}", e)))?;
        Ok(output)
    }
}
