use crate::{EditsBackend, StorageError};
use doc_model::EditsDocument;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    Load { file_id: String },
    Save { file_id: String, document: EditsDocument },
}

#[derive(Debug, Default)]
struct MemoryState {
    documents: HashMap<String, EditsDocument>,
    calls: Vec<BackendCall>,
    fail_saves: usize,
}

/// In-process backend that records every call. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(self, file_id: &str, document: EditsDocument) -> Self {
        self.lock().documents.insert(file_id.to_owned(), document);
        self
    }

    /// Make the next `count` saves fail without storing anything.
    pub fn fail_next_saves(&self, count: usize) {
        self.lock().fail_saves = count;
    }

    pub fn document(&self, file_id: &str) -> Option<EditsDocument> {
        self.lock().documents.get(file_id).cloned()
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.lock().calls.clone()
    }

    pub fn saves(&self) -> Vec<EditsDocument> {
        self.lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                BackendCall::Save { document, .. } => Some(document.clone()),
                BackendCall::Load { .. } => None,
            })
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl EditsBackend for MemoryBackend {
    fn load(&self, file_id: &str) -> Result<EditsDocument, StorageError> {
        let mut state = self.lock();
        state.calls.push(BackendCall::Load { file_id: file_id.to_owned() });
        Ok(state.documents.get(file_id).cloned().unwrap_or_default())
    }

    fn save(&self, file_id: &str, document: &EditsDocument) -> Result<(), StorageError> {
        let mut state = self.lock();
        state
            .calls
            .push(BackendCall::Save { file_id: file_id.to_owned(), document: document.clone() });

        if state.fail_saves > 0 {
            state.fail_saves -= 1;
            return Err(StorageError::Rejected("injected save failure".to_owned()));
        }

        state.documents.insert(file_id.to_owned(), document.clone());
        Ok(())
    }
}
