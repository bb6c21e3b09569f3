//! Thin object-graph builder over `lopdf` shared by the interior and cover
//! renderers.

use std::io::Write;

use flate2::Compression;
use flate2::write::ZlibEncoder;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat, dictionary};

use super::metrics::{StandardFont, to_win_ansi};
use crate::error::Result;

/// Accumulates pages into a `lopdf` document.
pub struct PdfBuilder {
    document: Document,
    pages_id: ObjectId,
    page_ids: Vec<ObjectId>,
    fonts: Dictionary,
}

impl PdfBuilder {
    pub fn new() -> Self {
        let mut document = Document::with_version("1.7");
        let pages_id = document.new_object_id();

        let mut fonts = Dictionary::new();
        for font in StandardFont::ALL {
            let font_id = document.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => font.base_font(),
                "Encoding" => "WinAnsiEncoding",
            });
            fonts.set(font.resource_name(), font_id);
        }

        Self {
            document,
            pages_id,
            page_ids: Vec::new(),
            fonts,
        }
    }

    /// Ids of the pages added so far, in order.
    pub fn page_ids(&self) -> &[ObjectId] {
        &self.page_ids
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// Embed 8-bit RGB pixels as a Flate-compressed image XObject.
    pub fn add_rgb_image(&mut self, width: u32, height: u32, rgb: &[u8]) -> Result<ObjectId> {
        let stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width as i64,
                "Height" => height as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "FlateDecode",
            },
            deflate(rgb)?,
        );
        Ok(self.document.add_object(stream))
    }

    /// Append a page. `extra` entries (boxes, annotations) are merged into
    /// the page dictionary.
    pub fn add_page(
        &mut self,
        size: (f32, f32),
        operations: Vec<Operation>,
        xobjects: Option<Dictionary>,
        extra: Option<Dictionary>,
    ) -> Result<ObjectId> {
        let content = Content { operations };
        let content_stream = Stream::new(
            dictionary! { "Filter" => "FlateDecode" },
            deflate(&content.encode()?)?,
        );
        let content_id = self.document.add_object(content_stream);

        let mut resources = dictionary! { "Font" => self.fonts.clone() };
        if let Some(xobjects) = xobjects {
            resources.set("XObject", xobjects);
        }

        let mut page_dict = dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![0.into(), 0.into(), size.0.into(), size.1.into()],
            "Contents" => content_id,
            "Resources" => resources,
        };
        if let Some(extra) = extra {
            for (key, value) in extra.iter() {
                page_dict.set(key.clone(), value.clone());
            }
        }

        let page_id = self.document.add_object(page_dict);
        self.page_ids.push(page_id);
        Ok(page_id)
    }

    /// Write the page tree, catalog and info dictionary and serialize.
    pub fn finish(mut self, catalog_extra: Dictionary, info: Dictionary) -> Result<Vec<u8>> {
        let kids: Vec<Object> = self.page_ids.iter().map(|id| Object::from(*id)).collect();
        let pages_dict = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => self.page_ids.len() as i64,
        };
        self.document
            .objects
            .insert(self.pages_id, Object::Dictionary(pages_dict));

        let mut catalog = dictionary! { "Type" => "Catalog", "Pages" => self.pages_id };
        for (key, value) in catalog_extra.iter() {
            catalog.set(key.clone(), value.clone());
        }
        let catalog_id = self.document.add_object(catalog);
        self.document.trailer.set("Root", catalog_id);

        let info_id = self.document.add_object(info);
        self.document.trailer.set("Info", info_id);

        let mut bytes = Vec::new();
        self.document.save_to(&mut bytes)?;
        Ok(bytes)
    }
}

impl Default for PdfBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// Text string for document-level fields (info, outlines).
///
/// ASCII is written as a literal; anything else as UTF-16BE with a BOM.
pub fn text_string(text: &str) -> Object {
    if text.is_ascii() {
        Object::string_literal(text)
    } else {
        let mut bytes = vec![0xFE, 0xFF];
        for unit in text.encode_utf16() {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }
        Object::String(bytes, StringFormat::Hexadecimal)
    }
}

/// Operations that draw one line of text with its baseline at (`x`, `y`).
///
/// `word_spacing` is extra space added at every space character (`Tw`).
pub fn text_line(
    font: StandardFont,
    size: f32,
    x: f32,
    y: f32,
    text: &str,
    word_spacing: f32,
) -> Vec<Operation> {
    vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![font.resource_name().into(), size.into()]),
        Operation::new("Tw", vec![word_spacing.into()]),
        Operation::new("Td", vec![x.into(), y.into()]),
        Operation::new(
            "Tj",
            vec![Object::String(to_win_ansi(text), StringFormat::Literal)],
        ),
        Operation::new("ET", vec![]),
    ]
}

/// Fill colour operation from 8-bit RGB.
pub fn fill_rgb(rgb: [u8; 3]) -> Operation {
    Operation::new(
        "rg",
        rgb.iter().map(|c| (*c as f32 / 255.0).into()).collect(),
    )
}

/// Stroke colour operation from 8-bit RGB.
pub fn stroke_rgb(rgb: [u8; 3]) -> Operation {
    Operation::new(
        "RG",
        rgb.iter().map(|c| (*c as f32 / 255.0).into()).collect(),
    )
}
