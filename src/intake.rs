//! Turning file picks, drops and clipboard pastes into selection entries.
//!
//! Each accepted input is read independently; with the default
//! [`IntakeOrder::Completion`] an entry is appended as soon as its own read
//! finishes, so the final order follows read latency rather than the order
//! the inputs were given in.

use std::path::{Path, PathBuf};

use futures::stream::{self, StreamExt};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::selection::{is_image_media_type, ImageEntry, Origin, Selection};
use crate::{Error, Result};

/// Declared media type for a file, derived from its extension.
pub fn media_type_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let media_type = match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" | "jfif" | "pjpeg" | "pjp" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "ico" => "image/x-icon",
        "svg" => "image/svg+xml",
        "avif" => "image/avif",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        _ => return None,
    };
    Some(media_type)
}

/// A file-like input before it is read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawInput {
    /// A file on disk (file picker or drag-and-drop)
    Path { path: PathBuf, origin: Origin },
    /// An in-memory payload with an explicitly declared type (clipboard paste)
    Bytes {
        media_type: String,
        bytes: Vec<u8>,
        origin: Origin,
    },
}

impl RawInput {
    /// A file chosen through the picker
    pub fn file(path: impl Into<PathBuf>) -> Self {
        RawInput::Path {
            path: path.into(),
            origin: Origin::File,
        }
    }

    /// A file dropped onto the drop zone; handled exactly like a picked file
    pub fn dropped(path: impl Into<PathBuf>) -> Self {
        RawInput::Path {
            path: path.into(),
            origin: Origin::Drop,
        }
    }

    /// A pasted clipboard payload
    pub fn clipboard(media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        RawInput::Bytes {
            media_type: media_type.into(),
            bytes,
            origin: Origin::Clipboard,
        }
    }

    /// The media type this input declares, if any
    pub fn declared_media_type(&self) -> Option<&str> {
        match self {
            RawInput::Path { path, .. } => media_type_for_path(path),
            RawInput::Bytes { media_type, .. } => Some(media_type.as_str()),
        }
    }

    /// Whether the input declares an image type and will be read
    pub fn is_image(&self) -> bool {
        self.declared_media_type()
            .map(is_image_media_type)
            .unwrap_or(false)
    }

    fn describe(&self) -> String {
        match self {
            RawInput::Path { path, .. } => path.display().to_string(),
            RawInput::Bytes { media_type, bytes, .. } => {
                format!("<{} bytes of {}>", bytes.len(), media_type)
            }
        }
    }
}

/// One item of a clipboard paste event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardItem {
    pub media_type: String,
    pub bytes: Vec<u8>,
}

/// A paste contributes at most one image: the first item whose type mentions "image".
pub fn first_clipboard_image(items: Vec<ClipboardItem>) -> Option<RawInput> {
    items
        .into_iter()
        .find(|item| item.media_type.contains("image"))
        .map(|item| RawInput::clipboard(item.media_type, item.bytes))
}

/// Order in which concurrently read inputs are appended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntakeOrder {
    /// Append each entry as soon as its read completes
    #[default]
    Completion,
    /// Reads still overlap, but entries are appended in input order
    Input,
}

/// Intake settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntakeConfig {
    /// Append order for a batch of inputs
    pub order: IntakeOrder,
    /// Maximum number of reads in flight at once (at least 1)
    pub max_in_flight: usize,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            order: IntakeOrder::Completion,
            max_in_flight: num_cpus::get().max(1),
        }
    }
}

/// Read one input into an entry.
///
/// Inputs that do not declare an image type yield `Ok(None)` without any I/O.
pub async fn read_input(input: RawInput) -> Result<Option<ImageEntry>> {
    let Some(media_type) = input.declared_media_type().map(str::to_string) else {
        debug!("skipping {}: no declared media type", input.describe());
        return Ok(None);
    };
    if !is_image_media_type(&media_type) {
        debug!("skipping {}: {} is not an image", input.describe(), media_type);
        return Ok(None);
    }

    match input {
        RawInput::Path { path, origin } => {
            let bytes = tokio::fs::read(&path).await.map_err(|e| Error::Read {
                path: path.clone(),
                reason: e.to_string(),
            })?;
            Ok(ImageEntry::from_bytes(&media_type, &bytes, origin))
        }
        RawInput::Bytes { bytes, origin, .. } => {
            Ok(ImageEntry::from_bytes(&media_type, &bytes, origin))
        }
    }
}

/// Read `inputs` concurrently and append every accepted image to `selection`.
///
/// Non-image inputs are skipped silently; unreadable files are logged and
/// skipped. Returns the number of entries appended.
pub async fn add_inputs(
    selection: &mut Selection,
    inputs: Vec<RawInput>,
    config: &IntakeConfig,
) -> usize {
    let limit = config.max_in_flight.max(1);
    let reads = stream::iter(inputs.into_iter().filter(RawInput::is_image)).map(read_input);

    let mut appended = 0;
    match config.order {
        IntakeOrder::Completion => {
            let mut results = reads.buffer_unordered(limit);
            while let Some(result) = results.next().await {
                appended += append_result(selection, result);
            }
        }
        IntakeOrder::Input => {
            let mut results = reads.buffered(limit);
            while let Some(result) = results.next().await {
                appended += append_result(selection, result);
            }
        }
    }
    appended
}

fn append_result(selection: &mut Selection, result: Result<Option<ImageEntry>>) -> usize {
    match result {
        Ok(Some(entry)) => {
            debug!(
                "appending {} entry {} at position {}",
                entry.media_type(),
                entry.digest(),
                selection.len()
            );
            selection.push(entry);
            1
        }
        Ok(None) => 0,
        Err(e) => {
            warn!("{}", e);
            0
        }
    }
}
