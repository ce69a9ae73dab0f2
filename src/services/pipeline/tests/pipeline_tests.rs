use super::*;
use crate::services::catalog::{Catalog, CatalogEntry};
use crate::services::matcher::BrandProposal;
use crate::services::session::{BrandStatus, ProgressState, ProgressStorage};
use crate::types::AppError;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

struct ScriptedControl {
    decisions: VecDeque<Decision>,
    seen: Vec<(String, usize, usize)>,
}

impl ScriptedControl {
    fn new(decisions: &[Decision]) -> Self {
        Self {
            decisions: decisions.iter().copied().collect(),
            seen: Vec::new(),
        }
    }
}

impl ControlSurface for ScriptedControl {
    fn choose_start(&mut self, _resume: Option<&ResumePoint>) -> AppResult<StartMode> {
        Ok(StartMode::FromBeginning)
    }

    fn decide(
        &mut self,
        proposal: &BrandProposal,
        position: usize,
        total: usize,
    ) -> AppResult<Decision> {
        self.seen.push((proposal.brand.clone(), position, total));
        Ok(self.decisions.pop_front().unwrap_or(Decision::Quit))
    }
}

#[derive(Default)]
struct MemoryCatalogStorage {
    saves: Mutex<usize>,
    last: Mutex<Option<Catalog>>,
    fail: AtomicBool,
}

impl MemoryCatalogStorage {
    fn save_count(&self) -> usize {
        *self.saves.lock().unwrap()
    }
}

impl CatalogStorage for MemoryCatalogStorage {
    fn load(&self) -> AppResult<Catalog> {
        self.last
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| AppError::NotFound("no catalog stored".to_string()))
    }

    fn save(&self, catalog: &Catalog) -> AppResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::Io("disk full".to_string()));
        }
        *self.saves.lock().unwrap() += 1;
        *self.last.lock().unwrap() = Some(catalog.clone());
        Ok(())
    }
}

#[derive(Default)]
struct MemoryBackend {
    saved: Mutex<Option<ProgressState>>,
}

struct MemoryProgressStorage {
    backend: Arc<MemoryBackend>,
}

impl ProgressStorage for MemoryProgressStorage {
    fn load(&self) -> AppResult<Option<ProgressState>> {
        Ok(self.backend.saved.lock().unwrap().clone())
    }

    fn save(&self, state: &ProgressState) -> AppResult<()> {
        *self.backend.saved.lock().unwrap() = Some(state.clone());
        Ok(())
    }

    fn delete(&self) -> AppResult<()> {
        *self.backend.saved.lock().unwrap() = None;
        Ok(())
    }
}

fn progress_memory() -> (Arc<MemoryBackend>, Box<dyn ProgressStorage>) {
    let backend = Arc::new(MemoryBackend::default());
    let storage = MemoryProgressStorage {
        backend: Arc::clone(&backend),
    };
    (backend, Box::new(storage))
}

fn brand(name: &str, models: &[&str]) -> CatalogEntry {
    let mut entry = CatalogEntry::new(name, Level::Brand);
    entry.children = models
        .iter()
        .map(|model| CatalogEntry::new(*model, Level::Model))
        .collect();
    entry
}

fn matched_store() -> CatalogStore {
    CatalogStore::new(
        Catalog::new(vec![brand("Audi", &["A3"]), brand("BMW", &["X5"])]),
        Catalog::new(vec![brand("Audi", &["A3"]), brand("BMW", &["X5"])]),
    )
}

fn session_for(store: &CatalogStore, storage: Box<dyn ProgressStorage>) -> SessionManager {
    SessionManager::open(storage, store.shared_brand_order(), &StartMode::FromBeginning).unwrap()
}

#[test]
fn test_confirm_applies_saves_and_records() {
    crate::test_utils::init_test_logging();
    let mut store = matched_store();
    let catalog_storage = MemoryCatalogStorage::default();
    let (backend, progress) = progress_memory();
    let mut session = session_for(&store, progress);
    let config = MatcherConfig::default();
    let mut control = ScriptedControl::new(&[Decision::Confirm, Decision::Confirm]);

    let summary = Orchestrator::new(
        &mut store,
        &catalog_storage,
        &mut session,
        &config,
        AiContext::default(),
    )
    .run(&mut control)
    .unwrap();

    assert_eq!(summary.brands_confirmed, 2);
    assert_eq!(summary.brands_skipped, 0);
    assert_eq!(summary.models_mapped, 2);
    assert_eq!(summary.counts.exact, 2);
    assert!(!summary.quit_early);

    assert!(store.source().entry_by_path("audi/a3").unwrap().is_mapped());
    assert!(store.source().entry_by_path("bmw/x5").unwrap().is_mapped());
    assert_eq!(catalog_storage.save_count(), 2);

    // Both brands done: the progress file is gone.
    assert!(session.state().is_complete());
    assert!(backend.saved.lock().unwrap().is_none());
}

#[test]
fn test_decide_receives_position_and_total() {
    crate::test_utils::init_test_logging();
    let mut store = matched_store();
    let catalog_storage = MemoryCatalogStorage::default();
    let (_backend, progress) = progress_memory();
    let mut session = session_for(&store, progress);
    let config = MatcherConfig::default();
    let mut control = ScriptedControl::new(&[Decision::Confirm, Decision::Confirm]);

    Orchestrator::new(
        &mut store,
        &catalog_storage,
        &mut session,
        &config,
        AiContext::default(),
    )
    .run(&mut control)
    .unwrap();

    assert_eq!(
        control.seen,
        vec![("Audi".to_string(), 1, 2), ("BMW".to_string(), 2, 2)]
    );
}

#[test]
fn test_skip_leaves_catalog_untouched() {
    crate::test_utils::init_test_logging();
    let mut store = matched_store();
    let catalog_storage = MemoryCatalogStorage::default();
    let (_backend, progress) = progress_memory();
    let mut session = session_for(&store, progress);
    let config = MatcherConfig::default();
    let mut control = ScriptedControl::new(&[Decision::Skip, Decision::Skip]);

    let summary = Orchestrator::new(
        &mut store,
        &catalog_storage,
        &mut session,
        &config,
        AiContext::default(),
    )
    .run(&mut control)
    .unwrap();

    assert_eq!(summary.brands_skipped, 2);
    assert_eq!(summary.counts.total(), 0);
    assert!(!store.source().entry_by_path("audi/a3").unwrap().is_mapped());
    assert_eq!(catalog_storage.save_count(), 0);
    assert_eq!(
        session.state().sessions["Audi"].status,
        BrandStatus::Skipped
    );
}

#[test]
fn test_quit_preserves_cursor_and_catalog() {
    crate::test_utils::init_test_logging();
    let mut store = matched_store();
    let catalog_storage = MemoryCatalogStorage::default();
    let (backend, progress) = progress_memory();
    let mut session = session_for(&store, progress);
    let config = MatcherConfig::default();
    let mut control = ScriptedControl::new(&[Decision::Quit]);

    let summary = Orchestrator::new(
        &mut store,
        &catalog_storage,
        &mut session,
        &config,
        AiContext::default(),
    )
    .run(&mut control)
    .unwrap();

    assert!(summary.quit_early);
    assert_eq!(summary.brands_confirmed, 0);
    assert!(!store.source().entry_by_path("audi/a3").unwrap().is_mapped());
    assert_eq!(catalog_storage.save_count(), 0);

    // The interrupted brand stays next in line.
    assert_eq!(session.state().cursor, 0);
    assert_eq!(session.next_pending_brand(), Some("Audi".to_string()));
    assert!(backend.saved.lock().unwrap().is_none());
}

#[test]
fn test_empty_proposal_is_auto_skipped() {
    crate::test_utils::init_test_logging();
    let mut store = CatalogStore::new(
        Catalog::new(vec![brand("VW", &["Polo"])]),
        Catalog::new(vec![brand("VW", &["Golf"])]),
    );
    let catalog_storage = MemoryCatalogStorage::default();
    let (_backend, progress) = progress_memory();
    let mut session = session_for(&store, progress);
    let config = MatcherConfig::default();
    let mut control = ScriptedControl::new(&[Decision::Confirm]);

    let summary = Orchestrator::new(
        &mut store,
        &catalog_storage,
        &mut session,
        &config,
        AiContext::default(),
    )
    .run(&mut control)
    .unwrap();

    // Nothing matchable: the brand is skipped without asking.
    assert!(control.seen.is_empty());
    assert_eq!(summary.brands_skipped, 1);
    assert_eq!(session.state().sessions["VW"].status, BrandStatus::Skipped);
}

#[test]
fn test_catalog_save_failure_is_fatal() {
    crate::test_utils::init_test_logging();
    let mut store = matched_store();
    let catalog_storage = MemoryCatalogStorage::default();
    catalog_storage.fail.store(true, Ordering::SeqCst);
    let (backend, progress) = progress_memory();
    let mut session = session_for(&store, progress);
    let config = MatcherConfig::default();
    let mut control = ScriptedControl::new(&[Decision::Confirm]);

    let result = Orchestrator::new(
        &mut store,
        &catalog_storage,
        &mut session,
        &config,
        AiContext::default(),
    )
    .run(&mut control);

    assert!(result.is_err());
    // The failed brand was never committed.
    assert_eq!(session.state().cursor, 0);
    assert!(backend.saved.lock().unwrap().is_none());
}

#[test]
fn test_candidate_already_mapped_at_apply_is_rejected() {
    crate::test_utils::init_test_logging();
    // "A 3" and "A-3" share the slug a-3, so applying the second candidate
    // hits an entry that already carries a mapping.
    let mut store = CatalogStore::new(
        Catalog::new(vec![brand("Audi", &["A 3", "A-3"])]),
        Catalog::new(vec![brand("Audi", &["A 3", "A-3"])]),
    );
    let catalog_storage = MemoryCatalogStorage::default();
    let (_backend, progress) = progress_memory();
    let mut session = session_for(&store, progress);
    let config = MatcherConfig::default();
    let mut control = ScriptedControl::new(&[Decision::Confirm]);

    let summary = Orchestrator::new(
        &mut store,
        &catalog_storage,
        &mut session,
        &config,
        AiContext::default(),
    )
    .run(&mut control)
    .unwrap();

    // The rejected candidate drops out; the rest of the brand goes through.
    assert_eq!(summary.brands_confirmed, 1);
    assert_eq!(summary.counts.exact, 1);
    assert_eq!(summary.models_mapped, 1);
    assert_eq!(
        session.state().sessions["Audi"].applied_mapping_ids.len(),
        1
    );
    assert_eq!(
        store
            .source()
            .entry_by_path("audi/a-3")
            .unwrap()
            .mapped_name
            .as_deref(),
        Some("A 3")
    );
    assert_eq!(catalog_storage.save_count(), 1);
}

#[test]
fn test_undo_then_rerun_reproduces_mappings() {
    crate::test_utils::init_test_logging();
    let target = Catalog::new(vec![brand("Audi", &["A3", "Coupe"])]);
    let mut store = CatalogStore::new(
        Catalog::new(vec![brand("Audi", &["A3", "Coupé"])]),
        target.clone(),
    );
    let catalog_storage = MemoryCatalogStorage::default();
    let (_backend, progress) = progress_memory();
    let mut session = session_for(&store, progress);
    let config = MatcherConfig::default();
    let mut control = ScriptedControl::new(&[Decision::Confirm]);

    Orchestrator::new(
        &mut store,
        &catalog_storage,
        &mut session,
        &config,
        AiContext::default(),
    )
    .run(&mut control)
    .unwrap();

    let mapped = |catalog: &Catalog, path: &str| {
        catalog.entry_by_path(path).unwrap().mapped_name.clone()
    };
    let first = (
        mapped(store.source(), "audi/a3"),
        mapped(store.source(), "audi/coupe"),
    );
    assert_eq!(first.0.as_deref(), Some("A3"));
    assert_eq!(first.1.as_deref(), Some("Coupe"));

    let mut undone = store.source().clone();
    let removed = session.undo_all(&mut undone).unwrap();
    assert_eq!(removed, 2);
    assert!(!undone.entry_by_path("audi/a3").unwrap().is_mapped());
    assert!(!undone.entry_by_path("audi/coupe").unwrap().is_mapped());

    let mut second_store = CatalogStore::new(undone, target);
    let (_backend2, progress2) = progress_memory();
    let mut second_session = session_for(&second_store, progress2);
    let mut second_control = ScriptedControl::new(&[Decision::Confirm]);

    Orchestrator::new(
        &mut second_store,
        &catalog_storage,
        &mut second_session,
        &config,
        AiContext::default(),
    )
    .run(&mut second_control)
    .unwrap();

    let second = (
        mapped(second_store.source(), "audi/a3"),
        mapped(second_store.source(), "audi/coupe"),
    );
    assert_eq!(second, first);
}

#[test]
fn test_already_mapped_brand_is_skipped_on_rerun() {
    crate::test_utils::init_test_logging();
    let mut store = matched_store();
    store.apply_mapping("audi/a3", "A3");
    store.apply_mapping("bmw/x5", "X5");
    let catalog_storage = MemoryCatalogStorage::default();
    let (_backend, progress) = progress_memory();
    let mut session = session_for(&store, progress);
    let config = MatcherConfig::default();
    let mut control = ScriptedControl::new(&[]);

    let summary = Orchestrator::new(
        &mut store,
        &catalog_storage,
        &mut session,
        &config,
        AiContext::default(),
    )
    .run(&mut control)
    .unwrap();

    // Everything is mapped already; no prompts, no writes.
    assert!(control.seen.is_empty());
    assert_eq!(summary.brands_skipped, 2);
    assert_eq!(catalog_storage.save_count(), 0);
}
