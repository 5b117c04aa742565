use crate::{EditsBackend, StorageError};
use doc_model::EditsDocument;
use std::fs;
use std::path::{Path, PathBuf};

/// Edits documents kept as `{root}/{file stem}.json`.
#[derive(Debug, Clone)]
pub struct FileBackend {
    root: PathBuf,
}

impl FileBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `report.pdf` and `nested/report.pdf` both map to `{root}/report.json`.
    pub fn edits_path(&self, file_id: &str) -> PathBuf {
        let name = Path::new(file_id).file_name().map(Path::new).unwrap_or(Path::new("upload"));
        let stem =
            name.file_stem().and_then(|s| s.to_str()).filter(|s| !s.is_empty()).unwrap_or("upload");
        self.root.join(format!("{stem}.json"))
    }
}

impl EditsBackend for FileBackend {
    fn load(&self, file_id: &str) -> Result<EditsDocument, StorageError> {
        let path = self.edits_path(file_id);
        if !path.exists() {
            return Ok(EditsDocument::default());
        }

        let bytes = fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn save(&self, file_id: &str, document: &EditsDocument) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)?;

        let path = self.edits_path(file_id);
        let temp_path = path.with_extension("json.tmp");
        let bytes = serde_json::to_vec_pretty(document)?;

        fs::write(&temp_path, bytes)?;
        fs::rename(&temp_path, &path)?;

        tracing::info!(path = %path.display(), items = document.item_count(), "edits written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doc_model::{Annotation, AnnotationKind, Color, ItemId, Rect, RedactionBox};

    fn sample() -> EditsDocument {
        EditsDocument::new().with_added(
            0,
            Annotation::with_id(
                ItemId::new("r1"),
                AnnotationKind::Redaction(RedactionBox {
                    frame: Rect::new(1.0, 2.0, 160.0, 48.0),
                    color: Color::BLACK,
                }),
            ),
        )
    }

    #[test]
    fn missing_file_loads_empty_document() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let backend = FileBackend::new(temp.path());

        let loaded = backend.load("nothing.pdf").expect("load should succeed");
        assert_eq!(loaded, EditsDocument::default());
    }

    #[test]
    fn save_then_load_returns_same_document() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let backend = FileBackend::new(temp.path().join("edits"));

        backend.save("report.pdf", &sample()).expect("save should succeed");
        let loaded = backend.load("report.pdf").expect("load should succeed");

        assert_eq!(loaded, sample());
        assert!(temp.path().join("edits/report.json").exists());
        assert!(!temp.path().join("edits/report.json.tmp").exists());
    }

    #[test]
    fn edits_path_uses_basename_stem() {
        let backend = FileBackend::new("/data");
        assert_eq!(backend.edits_path("../../etc/report.pdf"), PathBuf::from("/data/report.json"));
        assert_eq!(backend.edits_path("scan"), PathBuf::from("/data/scan.json"));
    }

    #[test]
    fn corrupt_file_is_a_serde_error() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        fs::write(temp.path().join("bad.json"), b"{not json").expect("write should succeed");

        let error = FileBackend::new(temp.path()).load("bad.pdf").expect_err("load should fail");
        assert!(matches!(error, StorageError::Serde(_)));
    }
}
