//! Owned task-list session
//!
//! A [`TodoSession`] holds the live collection for one presentation layer.
//! Each intent runs a collection operation, swaps in the new snapshot and
//! mirrors it to storage. A failed save is logged and remembered but never
//! blocks the in-memory change.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::storage::{LoadOutcome, StorageBackend, StorageStats, TaskStorage};
use crate::task::{collection, sample_tasks, validate, Priority, Task, TaskId};
use crate::view::{self, SortCriterion, StatusFilter, TaskStats};
use crate::{transfer, Error, Result};

/// The live collection plus its storage slot
pub struct TodoSession<B> {
    tasks: Vec<Task>,
    storage: TaskStorage<B>,
    durable: bool,
    recovered_from_corrupt: bool,
}

impl<B: StorageBackend> TodoSession<B> {
    /// Open a session from whatever the storage slot holds
    ///
    /// An empty slot starts from the sample tasks when `seed_sample` is set.
    /// A corrupt slot starts empty and is reported by
    /// [`recovered_from_corrupt`](Self::recovered_from_corrupt); it is only
    /// overwritten by the next mutation.
    pub async fn open(storage: TaskStorage<B>, seed_sample: bool) -> Self {
        let (tasks, recovered_from_corrupt) = match storage.load().await {
            LoadOutcome::Loaded(tasks) => {
                info!("Loaded {} todos from storage", tasks.len());
                (tasks, false)
            }
            LoadOutcome::Empty if seed_sample => {
                info!("No saved todos, starting from sample data");
                (sample_tasks(Utc::now()), false)
            }
            LoadOutcome::Empty => (Vec::new(), false),
            LoadOutcome::Corrupt(reason) => {
                warn!("Saved todos are unreadable, starting empty: {}", reason);
                (Vec::new(), true)
            }
        };

        Self {
            tasks,
            storage,
            durable: true,
            recovered_from_corrupt,
        }
    }

    /// Current collection in storage order
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Whether the last save succeeded
    pub fn is_durable(&self) -> bool {
        self.durable
    }

    pub fn recovered_from_corrupt(&self) -> bool {
        self.recovered_from_corrupt
    }

    pub fn storage(&self) -> &TaskStorage<B> {
        &self.storage
    }

    /// Validate and prepend a new task
    pub async fn add(&mut self, text: &str, priority: Priority) -> Result<Task> {
        validate(text).into_result()?;

        let next = collection::add(&self.tasks, text, priority);
        let created = next[0].clone();
        self.commit(next).await;
        Ok(created)
    }

    /// Flip completion; `None` when no task has `id`
    pub async fn toggle(&mut self, id: &TaskId) -> Option<Task> {
        collection::find(&self.tasks, id)?;

        let next = collection::toggle(&self.tasks, id);
        let toggled = collection::find(&next, id).cloned();
        self.commit(next).await;
        toggled
    }

    /// Replace a task's text
    ///
    /// Invalid text is rejected before anything changes. Unknown ids yield
    /// `Ok(None)`; unchanged text returns the task without saving.
    pub async fn edit(&mut self, id: &TaskId, text: &str) -> Result<Option<Task>> {
        validate(text).into_result()?;

        let Some(current) = collection::find(&self.tasks, id) else {
            return Ok(None);
        };
        if current.text == text.trim() {
            return Ok(Some(current.clone()));
        }

        let next = collection::edit(&self.tasks, id, text);
        let edited = collection::find(&next, id).cloned();
        self.commit(next).await;
        Ok(edited)
    }

    /// Remove a task; `false` when no task has `id`
    pub async fn delete(&mut self, id: &TaskId) -> bool {
        let next = collection::delete(&self.tasks, id);
        if next.len() == self.tasks.len() {
            return false;
        }
        self.commit(next).await;
        true
    }

    /// Remove completed tasks, returning how many went
    pub async fn clear_completed(&mut self) -> usize {
        let next = collection::clear_completed(&self.tasks);
        let removed = self.tasks.len() - next.len();
        if removed > 0 {
            self.commit(next).await;
        }
        removed
    }

    /// Remove every task, returning how many went
    pub async fn clear_all(&mut self) -> usize {
        let removed = self.tasks.len();
        let next = collection::clear_all(&self.tasks);
        self.commit(next).await;
        removed
    }

    /// Remove the stored slot, keeping the live collection in memory
    ///
    /// The session is no longer durable until the next mutation saves again.
    pub async fn forget_storage(&mut self) -> bool {
        let removed = self.storage.clear().await;
        if removed {
            self.durable = false;
            info!("Removed saved todos; {} remain in memory", self.tasks.len());
        }
        removed
    }

    /// Replace the collection with fresh sample tasks
    pub async fn reset_to_sample(&mut self) {
        let next = collection::replace_all(&self.tasks, sample_tasks(Utc::now()));
        self.commit(next).await;
    }

    /// Replace the collection with imported tasks
    ///
    /// Consumes the ticket so the import slot frees once the result is applied.
    pub async fn apply_import(&mut self, ticket: ImportTicket, tasks: Vec<Task>) -> usize {
        let count = tasks.len();
        let next = collection::replace_all(&self.tasks, tasks);
        self.commit(next).await;
        drop(ticket);
        info!("Imported {} todos", count);
        count
    }

    /// Filtered and sorted projection for display
    pub fn filtered_sorted(&self, status: StatusFilter, criterion: SortCriterion) -> Vec<Task> {
        view::filtered_sorted(&self.tasks, status, criterion)
    }

    /// Statistics over the full collection
    pub fn stats(&self) -> TaskStats {
        view::compute_stats(&self.tasks)
    }

    pub async fn storage_stats(&self) -> StorageStats {
        self.storage.stats().await
    }

    /// Export document for the current collection
    pub fn export_document(&self) -> Result<String> {
        transfer::export_document(&self.tasks, Utc::now())
    }

    /// Write a backup file into `dir`
    pub async fn export_to_file(&self, dir: &Path) -> Result<PathBuf> {
        transfer::export_to_file(dir, &self.tasks, Utc::now()).await
    }

    async fn commit(&mut self, next: Vec<Task>) {
        self.tasks = next;
        self.durable = self.storage.save(&self.tasks).await;
        if self.durable {
            debug!("Collection now holds {} todos", self.tasks.len());
        } else {
            warn!("Changes are kept in memory only; storage write failed");
        }
    }
}

/// Allows at most one import to be in flight
#[derive(Debug, Clone, Default)]
pub struct ImportGuard {
    in_flight: Arc<AtomicBool>,
}

impl ImportGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the import slot
    pub fn begin(&self) -> Result<ImportTicket> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| Error::ImportInProgress)?;
        Ok(ImportTicket {
            in_flight: Arc::clone(&self.in_flight),
        })
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }
}

/// Proof of a claimed import slot; releases it on drop
#[derive(Debug)]
pub struct ImportTicket {
    in_flight: Arc<AtomicBool>,
}

impl Drop for ImportTicket {
    fn drop(&mut self) {
        self.in_flight.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileStorage, MemoryStorage, STORAGE_KEY};
    use crate::task::{ValidationError, MAX_TEXT_LEN};
    use tempfile::TempDir;

    async fn empty_session() -> TodoSession<MemoryStorage> {
        TodoSession::open(TaskStorage::new(MemoryStorage::new()), false).await
    }

    #[tokio::test]
    async fn test_open_seeds_sample_when_empty() {
        let session = TodoSession::open(TaskStorage::new(MemoryStorage::new()), true).await;
        assert_eq!(session.tasks().len(), 5);
        assert!(!session.recovered_from_corrupt());
    }

    #[tokio::test]
    async fn test_open_corrupt_slot_starts_empty() {
        let backend = MemoryStorage::new();
        backend.set(STORAGE_KEY, "[{broken").await.unwrap();

        let session = TodoSession::open(TaskStorage::new(backend), true).await;
        assert!(session.tasks().is_empty());
        assert!(session.recovered_from_corrupt());
    }

    #[tokio::test]
    async fn test_add_persists() {
        let mut session = empty_session().await;
        let created = session.add("  Buy milk ", Priority::High).await.unwrap();

        assert_eq!(created.text, "Buy milk");
        assert!(session.is_durable());
        assert_eq!(
            session.storage().load().await,
            LoadOutcome::Loaded(vec![created])
        );
    }

    #[tokio::test]
    async fn test_add_rejects_invalid_text() {
        let mut session = empty_session().await;

        match session.add("   ", Priority::Low).await {
            Err(Error::Validation(errors)) => assert_eq!(errors, vec![ValidationError::EmptyText]),
            other => panic!("Expected validation error, got: {:?}", other),
        }
        assert!(session.tasks().is_empty());
        assert_eq!(session.storage().load().await, LoadOutcome::Empty);
    }

    #[tokio::test]
    async fn test_toggle_edit_delete() {
        let mut session = empty_session().await;
        let task = session.add("Draft", Priority::Medium).await.unwrap();

        let toggled = session.toggle(&task.id).await.unwrap();
        assert!(toggled.completed);
        assert!(session.toggle(&TaskId::from("missing")).await.is_none());

        let edited = session.edit(&task.id, "Final").await.unwrap().unwrap();
        assert_eq!(edited.text, "Final");
        assert!(edited.completed);

        assert!(matches!(
            session.edit(&task.id, "").await,
            Err(Error::Validation(_))
        ));
        assert_eq!(session.tasks()[0].text, "Final");
        assert!(session
            .edit(&TaskId::from("missing"), "x")
            .await
            .unwrap()
            .is_none());

        assert!(session.delete(&task.id).await);
        assert!(!session.delete(&task.id).await);
        assert!(session.tasks().is_empty());
    }

    #[tokio::test]
    async fn test_edit_unchanged_text_skips_save() {
        let temp_dir = TempDir::new().unwrap();
        let mut session =
            TodoSession::open(TaskStorage::new(FileStorage::new(temp_dir.path())), false).await;
        let task = session.add("A", Priority::Medium).await.unwrap();

        // Replace the slot behind the session's back; a save would overwrite it
        let slot = temp_dir.path().join(format!("{}.json", STORAGE_KEY));
        std::fs::write(&slot, "[]").unwrap();

        let edited = session.edit(&task.id, "  A ").await.unwrap().unwrap();
        assert_eq!(edited, task);
        assert_eq!(session.tasks(), [task].as_slice());
        assert_eq!(std::fs::read_to_string(&slot).unwrap(), "[]");
    }

    #[tokio::test]
    async fn test_edit_rejects_too_long_text() {
        let mut session = empty_session().await;
        let task = session.add("Short", Priority::Low).await.unwrap();
        let too_long = "x".repeat(MAX_TEXT_LEN + 1);

        match session.edit(&task.id, &too_long).await {
            Err(Error::Validation(errors)) => assert_eq!(errors, vec![ValidationError::TooLong]),
            other => panic!("Expected validation error, got: {:?}", other),
        }
        assert_eq!(session.tasks(), [task.clone()].as_slice());
        assert_eq!(
            session.storage().load().await,
            LoadOutcome::Loaded(vec![task])
        );
    }

    #[tokio::test]
    async fn test_forget_storage_keeps_memory() {
        let mut session = empty_session().await;
        let task = session.add("Keep me", Priority::Low).await.unwrap();

        assert!(session.forget_storage().await);
        assert!(!session.is_durable());
        assert_eq!(session.tasks(), [task].as_slice());
        assert_eq!(session.storage().load().await, LoadOutcome::Empty);

        session.add("Again", Priority::Low).await.unwrap();
        assert!(session.is_durable());
        assert!(matches!(session.storage().load().await, LoadOutcome::Loaded(t) if t.len() == 2));
    }

    #[tokio::test]
    async fn test_clear_operations() {
        let mut session = empty_session().await;
        let a = session.add("A", Priority::Low).await.unwrap();
        session.add("B", Priority::Low).await.unwrap();
        session.toggle(&a.id).await;

        assert_eq!(session.clear_completed().await, 1);
        assert_eq!(session.clear_completed().await, 0);
        assert_eq!(session.clear_all().await, 1);
        assert!(session.tasks().is_empty());
    }

    #[tokio::test]
    async fn test_reset_to_sample() {
        let mut session = empty_session().await;
        session.add("Mine", Priority::Low).await.unwrap();
        session.reset_to_sample().await;

        assert_eq!(session.tasks().len(), 5);
        assert!(session.tasks().iter().all(|t| t.text != "Mine"));
    }

    #[tokio::test]
    async fn test_failed_save_keeps_memory_change() {
        let storage = TaskStorage::new(MemoryStorage::new().with_quota(16));
        let mut session = TodoSession::open(storage, false).await;

        let task = session.add("Too big for the quota", Priority::Low).await.unwrap();
        assert!(!session.is_durable());
        assert_eq!(session.tasks(), &[task]);
    }

    #[tokio::test]
    async fn test_views_read_full_collection() {
        let mut session = empty_session().await;
        let a = session.add("a", Priority::Low).await.unwrap();
        session.add("b", Priority::High).await.unwrap();
        session.toggle(&a.id).await;

        let active = session.filtered_sorted(StatusFilter::Active, SortCriterion::Name);
        assert_eq!(active.len(), 1);
        assert_eq!(session.stats().total, 2);
        assert_eq!(session.stats().completion_percentage, 50);
        assert_eq!(session.storage_stats().await.item_count, 2);
    }

    #[tokio::test]
    async fn test_export_then_import() {
        let mut session = empty_session().await;
        session.add("one", Priority::Low).await.unwrap();
        session.add("two", Priority::High).await.unwrap();
        let exported = session.tasks().to_vec();

        let document = session.export_document().unwrap();
        session.clear_all().await;

        let guard = ImportGuard::new();
        let ticket = guard.begin().unwrap();
        let imported = transfer::parse_import(&document).unwrap();
        assert_eq!(session.apply_import(ticket, imported).await, 2);
        assert_eq!(session.tasks(), exported.as_slice());
        assert!(!guard.is_busy());
    }

    #[test]
    fn test_import_guard_allows_one_in_flight() {
        let guard = ImportGuard::new();
        let ticket = guard.begin().unwrap();

        assert!(guard.is_busy());
        assert!(matches!(guard.clone().begin(), Err(Error::ImportInProgress)));

        drop(ticket);
        assert!(!guard.is_busy());
        assert!(guard.begin().is_ok());
    }
}
