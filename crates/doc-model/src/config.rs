use crate::{Size, SizeLimits};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default frames for items placed with a single click.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlacementSizes {
    pub text: Size,
    pub stamp: Size,
    pub signature: Size,
    pub comment: Size,
    pub redaction: Size,
}

impl Default for PlacementSizes {
    fn default() -> Self {
        Self {
            text: Size::new(320.0, 70.0),
            stamp: Size::new(160.0, 72.0),
            signature: Size::new(240.0, 90.0),
            comment: Size::new(240.0, 130.0),
            redaction: Size::new(160.0, 48.0),
        }
    }
}

/// Tuning for the editing engine. Every field has a default so a partial
/// config file is enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Quiet period after the last mutation before the document is written.
    pub debounce_ms: u64,

    /// Extent allowed when resizing a box.
    pub size_limits: SizeLimits,

    /// Creation drags shorter than this on both axes are discarded.
    pub creation_threshold: f32,

    /// Drag/resize movement above this on either axis counts as a move.
    pub move_threshold: f32,

    /// Pick radius around resize handles.
    pub handle_radius: f32,

    /// Pick radius around thin items (lines, ink).
    pub hit_tolerance: f32,

    pub stroke_width: f32,

    pub placement: PlacementSizes,

    /// Author written on new comments.
    pub comment_author: String,

    /// Base URL of the edits storage service.
    pub api_base_url: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            size_limits: SizeLimits::default(),
            creation_threshold: 4.0,
            move_threshold: 2.0,
            handle_radius: 8.0,
            hit_tolerance: 4.0,
            stroke_width: 2.0,
            placement: PlacementSizes::default(),
            comment_author: "User".to_owned(),
            api_base_url: "http://localhost:8000".to_owned(),
        }
    }
}

impl EditorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce_ms = u64::try_from(debounce.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_size_limits(mut self, limits: SizeLimits) -> Self {
        self.size_limits = limits;
        self
    }

    pub fn with_thresholds(mut self, creation: f32, movement: f32) -> Self {
        self.creation_threshold = creation;
        self.move_threshold = movement;
        self
    }

    pub fn with_comment_author(mut self, author: impl Into<String>) -> Self {
        self.comment_author = author.into();
        self
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_other_defaults() {
        let raw = r#"{"debounceMs":50,"sizeLimits":{"minW":10,"maxW":20,"minH":1,"maxH":2}}"#;
        let config: EditorConfig = serde_json::from_str(raw).expect("config should load");
        assert_eq!(config.debounce(), Duration::from_millis(50));
        assert_eq!(config.size_limits.max_w, 20.0);
        assert_eq!(config.creation_threshold, 4.0);
        assert_eq!(config.placement.comment, Size::new(240.0, 130.0));
    }

    #[test]
    fn builders_override_fields() {
        let config = EditorConfig::new()
            .with_debounce(Duration::from_millis(10))
            .with_comment_author("Reviewer")
            .with_api_base_url("http://example.test");
        assert_eq!(config.debounce_ms, 10);
        assert_eq!(config.comment_author, "Reviewer");
        assert_eq!(config.api_base_url, "http://example.test");
    }

    #[test]
    fn oversized_debounce_saturates() {
        let config = EditorConfig::new().with_debounce(Duration::MAX);
        assert_eq!(config.debounce_ms, u64::MAX);
    }
}
