use crate::domain::error::Result;
use crate::infrastructure::excel::{export_filename, render_workbook};
use crate::infrastructure::session_store::SessionStore;
use chrono::Local;
use std::sync::Arc;
use tracing::info;

pub struct ExportedWorkbook {
    pub filename: String,
    pub bytes: Vec<u8>,
}

pub struct ExportUseCase {
    store: Arc<dyn SessionStore>,
}

impl ExportUseCase {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    pub fn execute(&self, session_id: &str) -> Result<ExportedWorkbook> {
        let session = self.store.get(session_id)?;
        let bytes = render_workbook(&session)?;
        let filename = export_filename(&session.release_version, Local::now());

        info!(
            session_id,
            filename = %filename,
            size_bytes = bytes.len(),
            "Exported workbook"
        );
        Ok(ExportedWorkbook { filename, bytes })
    }
}
