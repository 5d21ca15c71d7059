//! The export session: selection state plus the `Idle -> Exporting -> Idle` cycle.
//!
//! An export is split into [`Session::begin_export`], which checks the
//! preconditions, raises the busy flag and snapshots the selection, and
//! [`Session::finish_export`], which lowers the flag and records the outcome.
//! The [`ExportJob`] in between owns its snapshot, so the selection can keep
//! changing while a job runs without affecting it.

use log::{debug, error, info};

use crate::intake::{self, first_clipboard_image, ClipboardItem, IntakeConfig, RawInput};
use crate::selection::{ImageEntry, Selection, SelectionAction};
use crate::{Error, ExportConfig, ExportedDocument, Exporter, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportState {
    #[default]
    Idle,
    Exporting,
}

/// How the most recent export ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Succeeded { file_name: String, page_count: usize },
    Failed(String),
}

/// One export run over a frozen copy of the selection
#[derive(Debug, Clone)]
pub struct ExportJob {
    exporter: Exporter,
    images: Vec<ImageEntry>,
    output_name: String,
}

impl ExportJob {
    pub fn images(&self) -> &[ImageEntry] {
        &self.images
    }

    pub fn output_name(&self) -> &str {
        &self.output_name
    }

    pub async fn run(self) -> Result<ExportedDocument> {
        self.exporter.export(&self.images, &self.output_name).await
    }
}

pub struct Session {
    selection: Selection,
    exporter: Exporter,
    intake: IntakeConfig,
    state: ExportState,
    last_outcome: Option<ExportOutcome>,
}

impl Session {
    pub fn new(export: ExportConfig, intake: IntakeConfig) -> Result<Self> {
        if intake.max_in_flight == 0 {
            return Err(Error::ConfigError(
                "max_in_flight must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            selection: Selection::new(),
            exporter: Exporter::new(export)?,
            intake,
            state: ExportState::Idle,
            last_outcome: None,
        })
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn state(&self) -> ExportState {
        self.state
    }

    pub fn is_busy(&self) -> bool {
        self.state == ExportState::Exporting
    }

    pub fn last_outcome(&self) -> Option<&ExportOutcome> {
        self.last_outcome.as_ref()
    }

    /// Read picked or dropped files (or pasted payloads) into the selection.
    pub async fn add(&mut self, inputs: Vec<RawInput>) -> usize {
        intake::add_inputs(&mut self.selection, inputs, &self.intake).await
    }

    /// Handle a paste event; only its first image item is taken.
    pub async fn paste(&mut self, items: Vec<ClipboardItem>) -> bool {
        match first_clipboard_image(items) {
            Some(input) => self.add(vec![input]).await > 0,
            None => false,
        }
    }

    pub fn remove(&mut self, index: usize) -> Option<ImageEntry> {
        self.selection.remove(index)
    }

    pub fn clear(&mut self) {
        self.selection.apply(SelectionAction::Clear);
    }

    pub fn set_output_name(&mut self, name: impl Into<String>) {
        self.selection.set_output_name(name);
    }

    /// Start an export.
    ///
    /// Returns `Ok(None)` without changing state when there is nothing to
    /// export or no output name, and `Err(Error::Busy)` while a job is running.
    pub fn begin_export(&mut self) -> Result<Option<ExportJob>> {
        if self.is_busy() {
            return Err(Error::Busy);
        }
        let images = self.selection.snapshot();
        let output_name = self.selection.output_name().to_string();
        if let Err(e) = Exporter::check_preconditions(&images, &output_name) {
            debug!("export not attempted: {}", e);
            return Ok(None);
        }

        self.state = ExportState::Exporting;
        Ok(Some(ExportJob {
            exporter: self.exporter.clone(),
            images,
            output_name,
        }))
    }

    /// Return to `Idle` and record how the job ended. Failures are logged
    /// here and handed back to the caller.
    pub fn finish_export(
        &mut self,
        result: Result<ExportedDocument>,
    ) -> Result<ExportedDocument> {
        self.state = ExportState::Idle;
        match result {
            Ok(document) => {
                info!(
                    "export of {:?} finished with {} page(s)",
                    document.file_name(),
                    document.page_count()
                );
                self.last_outcome = Some(ExportOutcome::Succeeded {
                    file_name: document.file_name().to_string(),
                    page_count: document.page_count(),
                });
                Ok(document)
            }
            Err(e) => {
                error!("Error generating PDF: {}", e);
                self.last_outcome = Some(ExportOutcome::Failed(e.to_string()));
                Err(e)
            }
        }
    }

    /// Begin, run and finish an export in one go.
    pub async fn export(&mut self) -> Result<Option<ExportedDocument>> {
        let Some(job) = self.begin_export()? else {
            return Ok(None);
        };
        let result = job.run().await;
        self.finish_export(result).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(ExportConfig::default(), IntakeConfig::default()).unwrap()
    }

    #[test]
    fn zero_in_flight_is_rejected() {
        let intake = IntakeConfig {
            max_in_flight: 0,
            ..Default::default()
        };
        assert!(matches!(
            Session::new(ExportConfig::default(), intake),
            Err(Error::ConfigError(_))
        ));
    }

    #[tokio::test]
    async fn empty_selection_is_a_silent_noop() {
        let mut s = session();
        s.set_output_name("out.pdf");
        assert!(s.export().await.unwrap().is_none());
        assert_eq!(s.state(), ExportState::Idle);
        assert!(s.last_outcome().is_none());
    }

    #[tokio::test]
    async fn empty_name_is_a_silent_noop() {
        let mut s = session();
        s.add(vec![RawInput::clipboard("image/png", vec![0])]).await;
        assert!(s.begin_export().unwrap().is_none());
        assert!(!s.is_busy());
    }

    #[tokio::test]
    async fn busy_flag_blocks_reentry() {
        let mut s = session();
        s.add(vec![RawInput::clipboard("image/png", vec![0])]).await;
        s.set_output_name("x");
        let job = s.begin_export().unwrap().expect("job");
        assert!(s.is_busy());
        assert!(matches!(s.begin_export(), Err(Error::Busy)));

        // The undecodable payload fails the job; the session goes back to idle.
        let result = s.finish_export(job.run().await);
        assert!(result.is_err());
        assert_eq!(s.state(), ExportState::Idle);
        assert!(matches!(s.last_outcome(), Some(ExportOutcome::Failed(_))));
    }

    #[tokio::test]
    async fn paste_without_image_adds_nothing() {
        let mut s = session();
        let added = s
            .paste(vec![ClipboardItem {
                media_type: "text/plain".into(),
                bytes: b"hello".to_vec(),
            }])
            .await;
        assert!(!added);
        assert!(s.selection().is_empty());
    }
}
