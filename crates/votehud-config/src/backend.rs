//! Persistence backends for the preferences document

use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError, mpsc};
use std::thread;
use std::time::Duration;

use crate::{ConfigError, ConfigResult};

/// Key-value persistence collaborator for the preferences document
pub trait PreferenceBackend: Send {
    /// Read the stored document, `None` if nothing has been stored yet
    fn load(&self) -> ConfigResult<Option<Value>>;

    /// Store the document, replacing any previous one.
    ///
    /// A backend may accept the document and finish the write later;
    /// [`write_status`](Self::write_status) reports when it has.
    fn persist(&mut self, document: &Value) -> ConfigResult<()>;

    /// State of the writes accepted by `persist` so far
    fn write_status(&mut self) -> WriteStatus {
        WriteStatus::Done
    }

    /// Block until every accepted write has finished, returning the last failure
    fn sync(&mut self) -> ConfigResult<()> {
        Ok(())
    }
}

/// State of accepted writes, as reported by [`PreferenceBackend::write_status`]
#[derive(Debug)]
pub enum WriteStatus {
    /// Every accepted document is on storage
    Done,
    /// A write is still queued or running
    Pending,
    /// A write failed since the last report
    Failed(ConfigError),
}

/// Stores the document as a JSON file
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_parent_dir(&self) -> ConfigResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl PreferenceBackend for JsonFileBackend {
    fn load(&self) -> ConfigResult<Option<Value>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn persist(&mut self, document: &Value) -> ConfigResult<()> {
        self.ensure_parent_dir()?;

        // Sibling temp file, then rename over the target
        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, serde_json::to_vec_pretty(document)?)?;
        std::fs::rename(&tmp_path, &self.path)?;

        tracing::debug!(path = %self.path.display(), "Preferences written");
        Ok(())
    }
}

/// Interval at which `sync` checks that the writer thread is still alive
const SYNC_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Progress shared between a [`BackgroundWriter`] and its thread
#[derive(Debug, Default)]
struct WriterState {
    submitted: u64,
    completed: u64,
    failure: Option<String>,
}

type SharedWriterState = Arc<(Mutex<WriterState>, Condvar)>;

/// Moves writes of an inner backend onto a dedicated thread.
///
/// `persist` only hands the document over and returns; the writer thread
/// keeps just the latest pending document, so a backlog collapses into one
/// write. Each finished write is reported back through `write_status`.
/// Dropping the writer finishes any pending write before returning.
pub struct BackgroundWriter {
    loader: Box<dyn Fn() -> ConfigResult<Option<Value>> + Send>,
    sender: Option<mpsc::Sender<(u64, Value)>>,
    state: SharedWriterState,
    handle: Option<thread::JoinHandle<()>>,
}

impl BackgroundWriter {
    pub fn spawn<B>(backend: B) -> ConfigResult<Self>
    where
        B: PreferenceBackend + Clone + 'static,
    {
        let loader_backend = backend.clone();
        let (tx, rx) = mpsc::channel::<(u64, Value)>();
        let state = SharedWriterState::default();
        let thread_state = Arc::clone(&state);

        let handle = thread::Builder::new()
            .name("votehud-prefs-writer".into())
            .spawn(move || writer_loop(backend, rx, thread_state))?;

        Ok(Self {
            loader: Box::new(move || loader_backend.load()),
            sender: Some(tx),
            state,
            handle: Some(handle),
        })
    }

    fn lock_state(&self) -> MutexGuard<'_, WriterState> {
        self.state.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn writer_alive(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

fn writer_loop<B: PreferenceBackend>(
    mut backend: B,
    rx: mpsc::Receiver<(u64, Value)>,
    state: SharedWriterState,
) {
    while let Ok(mut latest) = rx.recv() {
        // Drain anything queued meanwhile, keeping only the newest document
        while let Ok(newer) = rx.try_recv() {
            latest = newer;
        }
        let (seq, document) = latest;

        let result = backend.persist(&document).and_then(|()| backend.sync());

        let (lock, done) = &*state;
        let mut progress = lock.lock().unwrap_or_else(PoisonError::into_inner);
        progress.completed = seq;
        match result {
            Ok(()) => progress.failure = None,
            Err(e) => {
                tracing::error!(error = %e, "Failed to save preferences");
                progress.failure = Some(e.to_string());
            }
        }
        done.notify_all();
    }
}

impl PreferenceBackend for BackgroundWriter {
    fn load(&self) -> ConfigResult<Option<Value>> {
        (self.loader)()
    }

    fn persist(&mut self, document: &Value) -> ConfigResult<()> {
        let sender = self.sender.as_ref().ok_or(ConfigError::WriterClosed)?;

        let mut state = self.lock_state();
        let seq = state.submitted + 1;
        sender
            .send((seq, document.clone()))
            .map_err(|_| ConfigError::WriterClosed)?;
        state.submitted = seq;
        Ok(())
    }

    fn write_status(&mut self) -> WriteStatus {
        let alive = self.writer_alive();
        let mut state = self.lock_state();

        if let Some(reason) = state.failure.take() {
            WriteStatus::Failed(ConfigError::WriteFailed(reason))
        } else if state.completed >= state.submitted {
            WriteStatus::Done
        } else if alive {
            WriteStatus::Pending
        } else {
            WriteStatus::Failed(ConfigError::WriterClosed)
        }
    }

    fn sync(&mut self) -> ConfigResult<()> {
        loop {
            let alive = self.writer_alive();
            let (lock, done) = &*self.state;
            let state = lock.lock().unwrap_or_else(PoisonError::into_inner);
            let (mut state, _) = done
                .wait_timeout_while(state, SYNC_POLL_INTERVAL, |s| s.completed < s.submitted)
                .unwrap_or_else(PoisonError::into_inner);

            if state.completed >= state.submitted {
                return match state.failure.take() {
                    Some(reason) => Err(ConfigError::WriteFailed(reason)),
                    None => Ok(()),
                };
            }
            if !alive {
                return Err(ConfigError::WriterClosed);
            }
        }
    }
}

impl Drop for BackgroundWriter {
    fn drop(&mut self) {
        // Closing the channel lets the writer finish and exit
        self.sender.take();
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            tracing::error!("Preferences writer thread panicked");
        }
    }
}

/// In-memory backend that records every write.
///
/// Clones share the same storage, so a test can keep one clone for
/// inspection while the store owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    stored: Arc<Mutex<Option<Value>>>,
    writes: Arc<Mutex<Vec<Value>>>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend that already holds `document`
    pub fn with_document(document: Value) -> Self {
        let backend = Self::default();
        *backend.stored.lock().unwrap_or_else(|e| e.into_inner()) = Some(document);
        backend
    }

    /// Every document written so far, oldest first
    pub fn writes(&self) -> Vec<Value> {
        self.writes.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Make subsequent writes fail
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl PreferenceBackend for MemoryBackend {
    fn load(&self) -> ConfigResult<Option<Value>> {
        Ok(self.stored.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn persist(&mut self, document: &Value) -> ConfigResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ConfigError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "writes disabled",
            )));
        }
        *self.stored.lock().unwrap_or_else(|e| e.into_inner()) = Some(document.clone());
        self.writes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(document.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn file_backend_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let backend = JsonFileBackend::new(dir.path().join("votehud.json"));
        assert!(backend.load().unwrap().is_none());
    }

    #[test]
    fn file_backend_round_trip_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config").join("votehud.json");
        let mut backend = JsonFileBackend::new(&path);

        backend.persist(&json!({ "hudScale": 1.5 })).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
        assert_eq!(backend.load().unwrap(), Some(json!({ "hudScale": 1.5 })));
    }

    #[test]
    fn file_backend_malformed_json_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("votehud.json");
        std::fs::write(&path, "{ not json").unwrap();

        let backend = JsonFileBackend::new(&path);
        assert!(matches!(backend.load(), Err(ConfigError::Json(_))));
    }

    #[test]
    fn background_writer_flushes_on_drop() {
        let memory = MemoryBackend::new();
        {
            let mut writer = BackgroundWriter::spawn(memory.clone()).unwrap();
            writer.persist(&json!({ "styleIndex": 1 })).unwrap();
            writer.persist(&json!({ "styleIndex": 2 })).unwrap();
        }

        // Writes may have been coalesced, but the last one always lands
        let writes = memory.writes();
        assert!(!writes.is_empty());
        assert_eq!(writes.last(), Some(&json!({ "styleIndex": 2 })));
    }

    #[test]
    fn background_writer_reports_failed_writes() {
        let memory = MemoryBackend::new();
        memory.set_fail_writes(true);
        let mut writer = BackgroundWriter::spawn(memory.clone()).unwrap();

        writer.persist(&json!({ "styleIndex": 1 })).unwrap();
        assert!(matches!(writer.sync(), Err(ConfigError::WriteFailed(_))));
        assert!(matches!(writer.write_status(), WriteStatus::Done));

        memory.set_fail_writes(false);
        writer.persist(&json!({ "styleIndex": 2 })).unwrap();
        writer.sync().unwrap();
        assert!(matches!(writer.write_status(), WriteStatus::Done));
        assert_eq!(memory.writes(), vec![json!({ "styleIndex": 2 })]);
    }

    #[test]
    fn sync_backends_are_always_done() {
        let mut memory = MemoryBackend::new();
        memory.persist(&json!({})).unwrap();
        assert!(matches!(memory.write_status(), WriteStatus::Done));
        memory.sync().unwrap();
    }

    #[test]
    fn background_writer_loads_through_inner_backend() {
        let memory = MemoryBackend::with_document(json!({ "hudAnchor": 1 }));
        let writer = BackgroundWriter::spawn(memory).unwrap();
        assert_eq!(writer.load().unwrap(), Some(json!({ "hudAnchor": 1 })));
    }

    #[test]
    fn memory_backend_failure_toggle() {
        let mut memory = MemoryBackend::new();
        memory.set_fail_writes(true);
        assert!(memory.persist(&json!({})).is_err());
        memory.set_fail_writes(false);
        assert!(memory.persist(&json!({})).is_ok());
        assert_eq!(memory.write_count(), 1);
    }
}
