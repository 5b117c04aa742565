use crate::StorageError;
use doc_model::EditsDocument;
use std::sync::Arc;

/// Remote or local home of the per-file edits document.
///
/// `save` replaces the stored document wholesale. Loading a file that has no
/// edits yet yields an empty document rather than an error.
pub trait EditsBackend: Send + Sync {
    fn load(&self, file_id: &str) -> Result<EditsDocument, StorageError>;

    fn save(&self, file_id: &str, document: &EditsDocument) -> Result<(), StorageError>;
}

impl<B: EditsBackend + ?Sized> EditsBackend for Arc<B> {
    fn load(&self, file_id: &str) -> Result<EditsDocument, StorageError> {
        (**self).load(file_id)
    }

    fn save(&self, file_id: &str, document: &EditsDocument) -> Result<(), StorageError> {
        (**self).save(file_id, document)
    }
}

impl<B: EditsBackend + ?Sized> EditsBackend for Box<B> {
    fn load(&self, file_id: &str) -> Result<EditsDocument, StorageError> {
        (**self).load(file_id)
    }

    fn save(&self, file_id: &str, document: &EditsDocument) -> Result<(), StorageError> {
        (**self).save(file_id, document)
    }
}
