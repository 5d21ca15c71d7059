//! Imagify
//!
//! Collect images from file picks, drag-and-drop or clipboard pastes and
//! export them as one PDF document, one image per page, each scaled down to
//! fit the page content area and centered on the page.
//!
//! # Features
//!
//! - **Selection**: an explicit state value with add/remove/clear/rename
//! - **Concurrent intake**: reads overlap and entries land in completion order
//! - **Sequential export**: images are decoded one after another and written
//!   to a PDF through `lopdf`; any decode failure aborts the whole export
//!
//! # Example
//!
//! ```no_run
//! use imagify::{RawInput, Session};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut session = Session::new(Default::default(), Default::default())?;
//! session
//!     .add(vec![RawInput::file("scan-1.png"), RawInput::file("scan-2.jpg")])
//!     .await;
//! session.set_output_name("scans.pdf");
//!
//! if let Some(document) = session.export().await? {
//!     let path = document.save_in(".").await?;
//!     println!("wrote {} pages to {}", document.page_count(), path.display());
//! }
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};

pub mod error;
pub use error::{Error, Result};

pub mod datauri;
pub mod decode;
pub mod export;
pub mod intake;
pub mod layout;
pub mod pdf;
pub mod selection;
pub mod session;

pub use export::{ExportSummary, ExportedDocument, Exporter};
pub use intake::{ClipboardItem, IntakeConfig, IntakeOrder, RawInput};
pub use layout::{Orientation, PageFormat, PageSize, Placement, Rect, Unit};
pub use selection::{ImageEntry, Origin, Selection, SelectionAction};
pub use session::{ExportJob, ExportOutcome, ExportState, Session};

/// Configuration for document export
///
/// The defaults reproduce the classic output: A4 portrait measured in px
/// units (446.46 x 631.42) with a 20 px margin, and no limit on how long a
/// single image may take to decode.
///
/// # Examples
///
/// ```
/// let cfg = imagify::ExportConfig::default();
/// assert_eq!(cfg.margin, 20.0);
/// assert!(cfg.decode_timeout_ms.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Paper format
    pub format: PageFormat,
    /// Page orientation
    pub orientation: Orientation,
    /// Unit for page geometry and image sizes (image pixels count as one unit each)
    pub unit: Unit,
    /// Margin on every side, used only to decide whether an image must shrink
    pub margin: f64,
    /// Per-image decode limit in milliseconds (`None` waits indefinitely)
    pub decode_timeout_ms: Option<u64>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: PageFormat::A4,
            orientation: Orientation::Portrait,
            unit: Unit::Px,
            margin: 20.0,
            decode_timeout_ms: None,
        }
    }
}

impl ExportConfig {
    pub fn page_size(&self) -> PageSize {
        PageSize::new(self.format, self.orientation, self.unit)
    }
}
