//! Search results under edit and the per-row save flow.

use crate::{Notifier, ViewError};
use audit_types::{AuditEdit, AuditField, AuditRecord, Gateway, RegulationId};
use std::sync::Arc;
use tokio::sync::RwLock;

pub(crate) const SAVE_OK: &str = "Audit sauvegardé avec succès !";
pub(crate) const SAVE_FAILED: &str = "Erreur lors de la sauvegarde";

/// Local, mutable copy of the current search results.
#[derive(Debug, Clone, Default)]
pub struct EditBuffer {
    rows: Vec<AuditRecord>,
}

impl EditBuffer {
    /// Discard every pending edit and start over from `rows`.
    pub fn replace(&mut self, rows: Vec<AuditRecord>) {
        self.rows = rows;
    }

    pub fn rows(&self) -> &[AuditRecord] {
        &self.rows
    }

    pub fn get(&self, id: RegulationId) -> Option<&AuditRecord> {
        self.rows.iter().find(|r| r.id() == id)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Overwrite one field of the row `id`. Every other row and field is left alone.
    pub fn set_field(&mut self, id: RegulationId, edit: AuditEdit) -> Result<(), ViewError> {
        let row = self
            .rows
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or(ViewError::UnknownRecord(id))?;
        edit.apply(row);
        Ok(())
    }

    /// Apply several edits to the row `id` in one step: either all of them land or none.
    pub fn set_fields(
        &mut self,
        id: RegulationId,
        edits: impl IntoIterator<Item = AuditEdit>,
    ) -> Result<(), ViewError> {
        let row = self
            .rows
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or(ViewError::UnknownRecord(id))?;
        for edit in edits {
            edit.apply(row);
        }
        Ok(())
    }
}

/// Applies field edits to the shared buffer and persists rows on request.
pub struct AuditEditor {
    gateway: Arc<dyn Gateway>,
    notifier: Arc<Notifier>,
    buffer: Arc<RwLock<EditBuffer>>,
}

impl AuditEditor {
    pub fn new(
        gateway: Arc<dyn Gateway>,
        notifier: Arc<Notifier>,
        buffer: Arc<RwLock<EditBuffer>>,
    ) -> Self {
        Self {
            gateway,
            notifier,
            buffer,
        }
    }

    pub async fn set_field(&self, id: RegulationId, edit: AuditEdit) -> Result<(), ViewError> {
        let field = edit.field();
        self.buffer.write().await.set_field(id, edit)?;
        tracing::debug!(id, %field, "field edited");
        Ok(())
    }

    /// Apply a whole row form under a single buffer lock, so a concurrent search cannot
    /// leave the row half edited.
    pub async fn set_fields(
        &self,
        id: RegulationId,
        edits: Vec<AuditEdit>,
    ) -> Result<(), ViewError> {
        let count = edits.len();
        self.buffer.write().await.set_fields(id, edits)?;
        tracing::debug!(id, count, "row edited");
        Ok(())
    }

    /// Edit from raw form input; an empty value clears the field.
    pub async fn set_field_str(
        &self,
        id: RegulationId,
        field: AuditField,
        raw: &str,
    ) -> Result<(), ViewError> {
        let edit = AuditEdit::parse(field, raw)?;
        self.set_field(id, edit).await
    }

    /// Send the row's audit fields to the gateway. The buffer is never modified, so a
    /// failed save can simply be retried.
    pub async fn save(&self, id: RegulationId) -> Result<(), ViewError> {
        let submission = {
            let buffer = self.buffer.read().await;
            buffer
                .get(id)
                .map(AuditRecord::submission)
                .ok_or(ViewError::UnknownRecord(id))?
        };
        match self.gateway.submit_audit(&submission).await {
            Ok(()) => {
                tracing::info!(id, "audit saved");
                self.notifier.success(SAVE_OK).await;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(id, error = %e, "audit save failed");
                self.notifier.error(SAVE_FAILED).await;
                Err(e.into())
            }
        }
    }
}
