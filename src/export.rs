//! Document export: one page per image, in selection order.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use log::{debug, error, info};
use serde::{Deserialize, Serialize};

use crate::decode::{decode_entry, decode_entry_async, DecodedImage};
use crate::layout::{place_image, PageSize, Placement};
use crate::pdf::PdfBuilder;
use crate::selection::ImageEntry;
use crate::{datauri, Error, ExportConfig, Result};

/// Media type of exported documents
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// A finished document, ready to be downloaded
#[derive(Debug, Clone)]
pub struct ExportedDocument {
    file_name: String,
    bytes: Vec<u8>,
    page_count: usize,
    placements: Vec<Placement>,
}

/// Serializable description of an export, without the document bytes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSummary {
    pub file_name: String,
    pub page_count: usize,
    pub byte_len: usize,
    pub placements: Vec<Placement>,
}

impl ExportedDocument {
    /// Name the document should be saved under, exactly as the user typed it
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Pages in the written document. An export without images still has
    /// its blank first page.
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Where each image landed, page by page
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    /// `data:application/pdf;filename=<name>;base64,<document>`
    pub fn to_data_uri(&self) -> String {
        datauri::encode_with_params(
            PDF_MEDIA_TYPE,
            &[("filename", self.file_name.as_str())],
            &self.bytes,
        )
    }

    pub fn summary(&self) -> ExportSummary {
        ExportSummary {
            file_name: self.file_name.clone(),
            page_count: self.page_count(),
            byte_len: self.bytes.len(),
            placements: self.placements.clone(),
        }
    }

    /// Write the document into `dir` under its file name and return the path.
    ///
    /// Names with a directory part are rejected, so the file always lands
    /// directly inside `dir`.
    pub async fn save_in(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        check_file_name(&self.file_name)?;
        let path = dir.as_ref().join(&self.file_name);
        tokio::fs::write(&path, &self.bytes).await?;
        info!("saved {} ({} bytes)", path.display(), self.bytes.len());
        Ok(path)
    }
}

/// Accept only a bare file name: no separators, no `..`, not absolute.
pub fn check_file_name(name: &str) -> Result<()> {
    if Path::new(name).file_name() == Some(OsStr::new(name)) {
        Ok(())
    } else {
        Err(Error::InvalidFileName(name.to_string()))
    }
}

/// Lays images out and collects pages for one export run
struct PageAssembler {
    page: PageSize,
    content: (f64, f64),
    builder: PdfBuilder,
    placements: Vec<Placement>,
}

impl PageAssembler {
    fn new(config: &ExportConfig) -> Result<Self> {
        let page = config.page_size();
        let content = page.content_area(config.margin)?;
        Ok(Self {
            page,
            content,
            builder: PdfBuilder::new(page, config.unit),
            placements: Vec::new(),
        })
    }

    fn push(&mut self, image: &DecodedImage) -> Result<()> {
        let placement = place_image(
            self.page,
            self.content,
            f64::from(image.width),
            f64::from(image.height),
        );
        debug!(
            "page {}: {}x{} image at ({:.2}, {:.2}) size {:.2}x{:.2} scale {:.4}",
            self.placements.len() + 1,
            image.width,
            image.height,
            placement.rect.x,
            placement.rect.y,
            placement.rect.width,
            placement.rect.height,
            placement.scale
        );
        self.builder.add_image_page(image, placement.rect)?;
        self.placements.push(placement);
        Ok(())
    }

    fn finish(mut self, output_name: &str) -> Result<ExportedDocument> {
        self.builder.ensure_page()?;
        let page_count = self.builder.page_count();
        let bytes = self.builder.finish(output_name)?;
        Ok(ExportedDocument {
            file_name: output_name.to_string(),
            bytes,
            page_count,
            placements: self.placements,
        })
    }
}

/// Turns a snapshot of the selection into a PDF document
#[derive(Debug, Clone)]
pub struct Exporter {
    config: ExportConfig,
}

impl Exporter {
    /// Create an exporter; fails when the margin leaves no content area.
    pub fn new(config: ExportConfig) -> Result<Self> {
        config.page_size().content_area(config.margin)?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Export is only attempted with at least one image and a non-empty name.
    pub fn check_preconditions(images: &[ImageEntry], output_name: &str) -> Result<()> {
        if images.is_empty() {
            return Err(Error::Precondition("no images selected".to_string()));
        }
        if output_name.is_empty() {
            return Err(Error::Precondition("output name is empty".to_string()));
        }
        Ok(())
    }

    /// Decode and place every image in order, one page each.
    ///
    /// Decoding happens on the blocking pool, one image at a time. The first
    /// failure is logged and returned; no partial document is produced.
    pub async fn export(
        &self,
        images: &[ImageEntry],
        output_name: &str,
    ) -> Result<ExportedDocument> {
        info!("exporting {} image(s) to {:?}", images.len(), output_name);
        let mut pages = PageAssembler::new(&self.config)?;

        for (index, entry) in images.iter().enumerate() {
            let decoded =
                decode_entry_async(entry.clone(), index, self.config.decode_timeout_ms).await;
            if let Err(e) = decoded.and_then(|image| pages.push(&image)) {
                error!("Error adding image #{} to PDF: {}", index, e);
                return Err(e);
            }
        }

        let document = pages.finish(output_name)?;
        info!(
            "exported {} page(s), {} bytes",
            document.page_count(),
            document.bytes.len()
        );
        Ok(document)
    }

    /// Same as [`Exporter::export`], decoding on the calling thread.
    ///
    /// The decode timeout does not apply here.
    pub fn export_blocking(
        &self,
        images: &[ImageEntry],
        output_name: &str,
    ) -> Result<ExportedDocument> {
        let mut pages = PageAssembler::new(&self.config)?;

        for (index, entry) in images.iter().enumerate() {
            if let Err(e) = decode_entry(entry, index).and_then(|image| pages.push(&image)) {
                error!("Error adding image #{} to PDF: {}", index, e);
                return Err(e);
            }
        }

        pages.finish(output_name)
    }
}
