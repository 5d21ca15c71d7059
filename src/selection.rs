//! The selection: an ordered list of encoded images plus the output name.
//!
//! `Selection` is a plain value. Every update is a method on `&mut self`
//! (or an equivalent [`SelectionAction`] fed to [`Selection::apply`]), and
//! the exporter only ever sees an immutable [`Selection::snapshot`].

use sha2::{Digest, Sha256};

use crate::datauri;

/// Where an entry came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// Chosen through the file picker
    File,
    /// Dropped onto the drop zone
    Drop,
    /// Pasted from the clipboard
    Clipboard,
}

/// Whether a declared media type names an image (`image/*`).
pub fn is_image_media_type(media_type: &str) -> bool {
    media_type
        .trim()
        .get(..6)
        .map(|prefix| prefix.eq_ignore_ascii_case("image/"))
        .unwrap_or(false)
}

/// One accepted image, held as a self-contained data URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEntry {
    data_uri: String,
    origin: Origin,
}

impl ImageEntry {
    /// Wrap raw encoded bytes. Returns `None` when `media_type` is not an image type.
    pub fn from_bytes(media_type: &str, bytes: &[u8], origin: Origin) -> Option<Self> {
        if !is_image_media_type(media_type) {
            return None;
        }
        Some(Self {
            data_uri: datauri::encode(&media_type.trim().to_ascii_lowercase(), bytes),
            origin,
        })
    }

    /// Adopt an existing data URI. Returns `None` unless it declares an image type.
    pub fn from_data_uri(data_uri: impl Into<String>, origin: Origin) -> Option<Self> {
        let data_uri = data_uri.into();
        let media_type = header_media_type(&data_uri)?;
        if !is_image_media_type(media_type) {
            return None;
        }
        Some(Self { data_uri, origin })
    }

    pub fn data_uri(&self) -> &str {
        &self.data_uri
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// Declared media type from the data URI header
    pub fn media_type(&self) -> &str {
        header_media_type(&self.data_uri).unwrap_or_default()
    }

    /// Short content digest, handy for logs
    pub fn digest(&self) -> String {
        let hash = Sha256::digest(self.data_uri.as_bytes());
        hex::encode(&hash[..8])
    }
}

fn header_media_type(uri: &str) -> Option<&str> {
    let rest = uri.strip_prefix("data:")?;
    let header = rest.split(',').next()?;
    header.split(';').next()
}

/// A discrete state change, as emitted by input events
#[derive(Debug, Clone)]
pub enum SelectionAction {
    Append(ImageEntry),
    Remove(usize),
    Clear,
    SetOutputName(String),
}

/// Ordered images plus the name of the document to produce
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    entries: Vec<ImageEntry>,
    output_name: String,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one entry at the end. Order is append order.
    pub fn push(&mut self, entry: ImageEntry) {
        self.entries.push(entry);
    }

    /// Remove the entry at `index`, keeping the relative order of the rest.
    /// Out-of-range indices leave the selection untouched.
    pub fn remove(&mut self, index: usize) -> Option<ImageEntry> {
        if index < self.entries.len() {
            Some(self.entries.remove(index))
        } else {
            None
        }
    }

    /// Drop every entry. The output name is kept.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Replace the output name verbatim.
    pub fn set_output_name(&mut self, name: impl Into<String>) {
        self.output_name = name.into();
    }

    pub fn apply(&mut self, action: SelectionAction) {
        match action {
            SelectionAction::Append(entry) => self.push(entry),
            SelectionAction::Remove(index) => {
                self.remove(index);
            }
            SelectionAction::Clear => self.clear(),
            SelectionAction::SetOutputName(name) => self.set_output_name(name),
        }
    }

    pub fn entries(&self) -> &[ImageEntry] {
        &self.entries
    }

    pub fn output_name(&self) -> &str {
        &self.output_name
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Export needs at least one image and a non-empty name.
    pub fn can_export(&self) -> bool {
        !self.entries.is_empty() && !self.output_name.is_empty()
    }

    /// Immutable copy of the entries for an export run
    pub fn snapshot(&self) -> Vec<ImageEntry> {
        self.entries.clone()
    }
}
