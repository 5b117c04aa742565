use crate::{Annotation, AnnotationKind, ItemId, ItemPatch};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

pub const EDITS_SCHEMA_VERSION: u32 = 1;

/// A freehand stroke needs at least this many points to be stored.
pub const MIN_FREEHAND_POINTS: usize = 4;

/// Every annotation of one document, grouped by zero-based page index.
///
/// Page lists are shared between snapshots; the `with_*` methods build a new
/// document and leave `self` untouched. List order is z-order (later on top).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditsDocument {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub pages: BTreeMap<u32, Arc<Vec<Annotation>>>,
}

fn default_version() -> u32 {
    EDITS_SCHEMA_VERSION
}

impl Default for EditsDocument {
    fn default() -> Self {
        Self { version: EDITS_SCHEMA_VERSION, pages: BTreeMap::new() }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationIssue {
    #[error("item id `{id}` is used more than once")]
    DuplicateId { id: ItemId },
    #[error("item `{id}` on page {page} has a non-finite number")]
    NonFinite { id: ItemId, page: u32 },
    #[error("freehand item `{id}` on page {page} has only {points} points")]
    ShortStroke { id: ItemId, page: u32, points: usize },
    #[error("item `{id}` on page {page} has a negative extent")]
    NegativeExtent { id: ItemId, page: u32 },
}

impl EditsDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(&self, index: u32) -> &[Annotation] {
        self.pages.get(&index).map(|items| items.as_slice()).unwrap_or(&[])
    }

    pub fn find(&self, page: u32, id: &ItemId) -> Option<&Annotation> {
        self.page(page).iter().find(|item| &item.id == id)
    }

    /// Page and position of `id` anywhere in the document.
    pub fn locate(&self, id: &ItemId) -> Option<(u32, usize)> {
        self.pages.iter().find_map(|(page, items)| {
            items.iter().position(|item| &item.id == id).map(|index| (*page, index))
        })
    }

    pub fn contains_id(&self, id: &ItemId) -> bool {
        self.locate(id).is_some()
    }

    pub fn item_count(&self) -> usize {
        self.pages.values().map(|items| items.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.item_count() == 0
    }

    pub fn with_added(&self, page: u32, item: Annotation) -> Self {
        let mut next = self.clone();
        let mut items =
            next.pages.get(&page).map(|items| items.as_ref().clone()).unwrap_or_default();
        items.push(item);
        next.pages.insert(page, Arc::new(items));
        next
    }

    /// New snapshot with `patch` merged into `id` on `page`; `None` if absent.
    pub fn with_updated(&self, page: u32, id: &ItemId, patch: &ItemPatch) -> Option<Self> {
        let index = self.page(page).iter().position(|item| &item.id == id)?;
        let mut items = self.page(page).to_vec();
        patch.apply_to(&mut items[index]);

        let mut next = self.clone();
        next.pages.insert(page, Arc::new(items));
        Some(next)
    }

    /// New snapshot without `id` on `page`; `None` if absent.
    pub fn with_removed(&self, page: u32, id: &ItemId) -> Option<Self> {
        if self.find(page, id).is_none() {
            return None;
        }

        let items: Vec<Annotation> =
            self.page(page).iter().filter(|item| &item.id != id).cloned().collect();
        let mut next = self.clone();
        next.pages.insert(page, Arc::new(items));
        Some(next)
    }

    /// Geometric sanity check of the whole document.
    pub fn validate(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        let mut seen = HashSet::new();

        for (&page, items) in &self.pages {
            for item in items.iter() {
                if !seen.insert(item.id.clone()) {
                    issues.push(ValidationIssue::DuplicateId { id: item.id.clone() });
                }
                issues.extend(validate_item(page, item));
            }
        }

        issues
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

/// Checks that apply to a single item regardless of its neighbours.
pub fn validate_item(page: u32, item: &Annotation) -> Option<ValidationIssue> {
    if !item.is_finite() {
        return Some(ValidationIssue::NonFinite { id: item.id.clone(), page });
    }

    if let AnnotationKind::Freehand(stroke) = &item.kind {
        if stroke.points.len() < MIN_FREEHAND_POINTS {
            return Some(ValidationIssue::ShortStroke {
                id: item.id.clone(),
                page,
                points: stroke.points.len(),
            });
        }
    }

    let negative = match &item.kind {
        AnnotationKind::Circle(circle) => circle.radius < 0.0,
        _ => item.frame().is_some_and(|frame| frame.w < 0.0 || frame.h < 0.0),
    };
    negative.then(|| ValidationIssue::NegativeExtent { id: item.id.clone(), page })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, FreehandStroke, Point, RedactionBox, Rect};

    fn redaction(id: &str) -> Annotation {
        Annotation::with_id(
            ItemId::new(id),
            AnnotationKind::Redaction(RedactionBox {
                frame: Rect::new(0.0, 0.0, 160.0, 48.0),
                color: Color::BLACK,
            }),
        )
    }

    #[test]
    fn missing_document_shape_loads_as_empty() {
        let doc: EditsDocument =
            serde_json::from_str(r#"{"version":1,"pages":{}}"#).expect("doc should load");
        assert_eq!(doc, EditsDocument::default());

        let bare: EditsDocument = serde_json::from_str("{}").expect("bare doc should load");
        assert_eq!(bare.version, EDITS_SCHEMA_VERSION);
    }

    #[test]
    fn page_keys_are_strings_on_the_wire() {
        let doc = EditsDocument::new().with_added(2, redaction("a"));
        let value = serde_json::to_value(&doc).expect("serialize");
        assert_eq!(value["pages"]["2"][0]["id"], "a");

        let back: EditsDocument = serde_json::from_value(value).expect("deserialize");
        assert_eq!(back.page(2).len(), 1);
    }

    #[test]
    fn with_methods_leave_prior_snapshot_untouched() {
        let first = EditsDocument::new().with_added(0, redaction("a"));
        let second = first.with_added(0, redaction("b"));
        let third = second.with_removed(0, &ItemId::new("a")).expect("a exists");

        assert_eq!(first.page(0).len(), 1);
        assert_eq!(second.page(0).len(), 2);
        assert_eq!(third.page(0).iter().map(|i| i.id.as_str()).collect::<Vec<_>>(), ["b"]);
    }

    #[test]
    fn updates_and_removals_of_absent_ids_are_none() {
        let doc = EditsDocument::new().with_added(0, redaction("a"));
        let ghost = ItemId::new("ghost");
        assert!(doc.with_updated(0, &ghost, &ItemPatch::text("x")).is_none());
        assert!(doc.with_removed(0, &ghost).is_none());
        assert!(doc.with_removed(1, &ItemId::new("a")).is_none());
    }

    #[test]
    fn validate_reports_each_issue() {
        let short = Annotation::with_id(
            ItemId::new("f"),
            AnnotationKind::Freehand(FreehandStroke {
                points: vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)],
                stroke_color: Color::PEN_BLUE,
                stroke_width: 2.0,
            }),
        );
        let doc = EditsDocument::new()
            .with_added(0, redaction("a"))
            .with_added(1, redaction("a"))
            .with_added(1, short);

        let issues = doc.validate();
        assert_eq!(issues.len(), 2);
        assert!(matches!(issues[0], ValidationIssue::DuplicateId { .. }));
        assert!(matches!(issues[1], ValidationIssue::ShortStroke { points: 2, .. }));
    }
}
