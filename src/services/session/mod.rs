mod progress;

pub use progress::{BrandSession, BrandStatus, JsonProgressStorage, ProgressState, ProgressStorage};

use std::collections::BTreeSet;

use chrono::Utc;

use crate::services::catalog::Catalog;
use crate::services::pipeline::StartMode;
use crate::types::{AppError, AppResult};

/// Owns the progress state and keeps it persisted across transitions.
pub struct SessionManager {
    state: ProgressState,
    storage: Box<dyn ProgressStorage>,
}

impl SessionManager {
    /// Open a session over `brand_order` according to the chosen start mode.
    ///
    /// Resume reuses stored progress when its brand order still matches the
    /// catalogs; anything else starts fresh. FromBrand additionally moves
    /// the cursor to the named brand and fails if it is not in the order.
    pub fn open(
        storage: Box<dyn ProgressStorage>,
        brand_order: Vec<String>,
        mode: &StartMode,
    ) -> AppResult<Self> {
        let mut state = match mode {
            StartMode::FromBeginning => ProgressState::new(brand_order),
            StartMode::Resume | StartMode::FromBrand(_) => match storage.load()? {
                Some(saved) if saved.brand_order == brand_order => saved,
                Some(_) => {
                    log::warn!("Stored progress no longer matches the catalogs, starting over");
                    ProgressState::new(brand_order)
                }
                None => ProgressState::new(brand_order),
            },
        };

        if let StartMode::FromBrand(brand) = mode {
            let Some(position) = state.position_of(brand) else {
                return Err(AppError::NotFound(format!(
                    "Brand not present in both catalogs: {brand}"
                )));
            };
            state.cursor = position;
        }

        Ok(Self { state, storage })
    }

    pub fn state(&self) -> &ProgressState {
        &self.state
    }

    pub fn next_pending_brand(&self) -> Option<String> {
        self.state.next_pending().map(str::to_string)
    }

    /// Record a confirmed brand together with the entry paths it wrote.
    pub fn commit(&mut self, brand: &str, applied_ids: BTreeSet<String>) -> AppResult<()> {
        self.finish_brand(brand, BrandStatus::Confirmed, applied_ids)
    }

    /// Record a skipped brand; no catalog mutation belongs to a skip.
    pub fn skip(&mut self, brand: &str) -> AppResult<()> {
        self.finish_brand(brand, BrandStatus::Skipped, BTreeSet::new())
    }

    fn finish_brand(
        &mut self,
        brand: &str,
        status: BrandStatus,
        applied_ids: BTreeSet<String>,
    ) -> AppResult<()> {
        let Some(position) = self.state.position_of(brand) else {
            return Err(AppError::NotFound(format!("Brand not in session: {brand}")));
        };

        let session = self
            .state
            .sessions
            .entry(brand.to_string())
            .or_insert_with(|| BrandSession::new(brand));
        session.status = status;
        session.applied_mapping_ids = applied_ids;

        self.state.cursor = position + 1;
        self.state.updated_at = Utc::now();

        // A finished session leaves no file behind.
        if self.state.is_complete() {
            self.storage.delete()
        } else {
            self.storage.save(&self.state)
        }
    }

    /// Clear every mapping this session applied and reset all brands to
    /// pending. Mappings that predate the session are left alone.
    ///
    /// Touches no files: the stored progress is the undo ledger and stays
    /// until the caller has persisted the cleared catalog and calls
    /// [`SessionManager::delete_progress`]. Returns how many entries were
    /// cleared.
    pub fn undo_all(&mut self, catalog: &mut Catalog) -> AppResult<usize> {
        let mut removed = 0;
        for session in self.state.sessions.values() {
            for path in &session.applied_mapping_ids {
                if catalog.clear_mapping(path) {
                    removed += 1;
                } else {
                    log::warn!("Nothing to clear at {path}, entry gone or already unmapped");
                }
            }
        }

        self.state = ProgressState::new(self.state.brand_order.clone());
        Ok(removed)
    }

    /// Remove the stored progress file, if any.
    pub fn delete_progress(&self) -> AppResult<()> {
        self.storage.delete()
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
