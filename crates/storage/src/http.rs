use crate::{EditsBackend, StorageError};
use doc_model::EditsDocument;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Identity of one rendered page image; a different zoom scale is a
/// different image.
#[derive(Debug, Clone, PartialEq)]
pub struct PageImageKey {
    pub file_id: String,
    pub page_index: u32,
    pub scale: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMeta {
    pub file_id: String,
    pub page_count: u32,
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    ok: bool,
}

/// Client for the edits storage service.
///
/// `GET {base}/files/{id}/edits` and `PUT` of the same URL, with the file id
/// percent-encoded as one path segment.
#[derive(Clone)]
pub struct HttpBackend {
    base_url: String,
    agent: ureq::Agent,
}

impl std::fmt::Debug for HttpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBackend").field("base_url", &self.base_url).finish_non_exhaustive()
    }
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        let agent = ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build();
        Self { base_url, agent }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn edits_url(&self, file_id: &str) -> String {
        format!("{}/files/{}/edits", self.base_url, encode_segment(file_id))
    }

    pub fn page_image_url(&self, key: &PageImageKey) -> String {
        format!(
            "{}/files/{}/page/{}/render?scale={}",
            self.base_url,
            encode_segment(&key.file_id),
            key.page_index,
            key.scale
        )
    }

    pub fn file_meta(&self, file_id: &str) -> Result<FileMeta, StorageError> {
        let url = format!("{}/files/{}", self.base_url, encode_segment(file_id));
        Ok(self.agent.get(&url).call()?.into_json()?)
    }

    /// Query `GET {base}/health`.
    pub fn health(&self) -> Result<bool, StorageError> {
        let response: HealthResponse =
            self.agent.get(&format!("{}/health", self.base_url)).call()?.into_json()?;
        Ok(response.ok)
    }
}

impl EditsBackend for HttpBackend {
    fn load(&self, file_id: &str) -> Result<EditsDocument, StorageError> {
        let url = self.edits_url(file_id);
        tracing::debug!(%url, "loading edits");

        match self.agent.get(&url).call() {
            Ok(response) => Ok(response.into_json()?),
            Err(ureq::Error::Status(404, _)) => Ok(EditsDocument::default()),
            Err(error) => Err(error.into()),
        }
    }

    fn save(&self, file_id: &str, document: &EditsDocument) -> Result<(), StorageError> {
        let url = self.edits_url(file_id);
        self.agent.put(&url).send_json(document)?;
        tracing::info!(%url, items = document.item_count(), "edits stored");
        Ok(())
    }
}

impl From<ureq::Error> for StorageError {
    fn from(error: ureq::Error) -> Self {
        match error {
            ureq::Error::Status(status, response) => {
                let message = response.into_string().unwrap_or_default();
                StorageError::Http { status, message }
            }
            ureq::Error::Transport(transport) => StorageError::Transport(transport.to_string()),
        }
    }
}

/// Percent-encode everything outside the RFC 3986 unreserved set.
fn encode_segment(raw: &str) -> String {
    let mut encoded = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{byte:02X}")),
        }
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_encode_file_id_as_one_segment() {
        let backend = HttpBackend::new("http://localhost:8000/");
        assert_eq!(
            backend.edits_url("my report.pdf"),
            "http://localhost:8000/files/my%20report.pdf/edits"
        );
        assert_eq!(backend.edits_url("a/b.pdf"), "http://localhost:8000/files/a%2Fb.pdf/edits");
    }

    #[test]
    fn page_image_url_carries_scale() {
        let backend = HttpBackend::new("http://localhost:8000");
        let key = PageImageKey { file_id: "doc.pdf".to_owned(), page_index: 3, scale: 1.5 };
        assert_eq!(
            backend.page_image_url(&key),
            "http://localhost:8000/files/doc.pdf/page/3/render?scale=1.5"
        );
    }

    #[test]
    fn unreachable_service_is_a_transport_error() {
        let backend = HttpBackend::new("http://127.0.0.1:9");
        let error = backend
            .save("doc.pdf", &EditsDocument::default())
            .expect_err("nothing listens on port 9");
        assert!(matches!(error, StorageError::Transport(_)));
    }
}
