//! Authoritative annotation document
//!
//! The store owns the edits document and exposes it as immutable `Arc`
//! snapshots. Every mutation builds a new snapshot from the previous one and
//! acts on the current page only; a snapshot already handed out (for example
//! to an in-flight write) never changes.
//!
//! Selection and text-editing ids live next to the document but are not part
//! of what gets persisted.

use crate::error::RejectReason;
use crate::EditError;
use doc_model::{validate_item, Annotation, EditsDocument, ItemId, ItemPatch};
use std::sync::Arc;

/// Per-page ordered collection of annotation items
#[derive(Debug, Clone)]
pub struct AnnotationStore {
    document: Arc<EditsDocument>,
    page: u32,
    selection: Option<ItemId>,
    editing: Option<ItemId>,
    revision: u64,
}

impl Default for AnnotationStore {
    fn default() -> Self {
        Self::new(EditsDocument::default())
    }
}

impl AnnotationStore {
    /// Create a store over `document`, positioned on page 0
    pub fn new(document: EditsDocument) -> Self {
        Self {
            document: Arc::new(document),
            page: 0,
            selection: None,
            editing: None,
            revision: 0,
        }
    }

    /// Replace the whole document, e.g. after loading it from the backend
    ///
    /// Clears selection and editing. Does not count as a mutation.
    pub fn load(&mut self, document: EditsDocument) {
        self.document = Arc::new(document);
        self.selection = None;
        self.editing = None;
    }

    /// Current document snapshot
    pub fn snapshot(&self) -> Arc<EditsDocument> {
        Arc::clone(&self.document)
    }

    pub fn document(&self) -> &EditsDocument {
        &self.document
    }

    /// Current page index
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Switch the current page, clearing selection and editing
    pub fn set_page(&mut self, page: u32) {
        if self.page != page {
            self.page = page;
            self.selection = None;
            self.editing = None;
        }
    }

    /// Items of the current page in z-order (last is on top)
    pub fn items(&self) -> &[Annotation] {
        self.document.page(self.page)
    }

    /// Item on the current page
    pub fn get(&self, id: &ItemId) -> Option<&Annotation> {
        self.document.find(self.page, id)
    }

    /// Number of accepted mutations since creation
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn selection(&self) -> Option<&ItemId> {
        self.selection.as_ref()
    }

    pub fn selected_item(&self) -> Option<&Annotation> {
        self.selection.as_ref().and_then(|id| self.get(id))
    }

    /// Select an item on the current page, or clear the selection
    ///
    /// Selecting an id that is not on the current page clears the selection.
    pub fn select(&mut self, id: Option<ItemId>) {
        self.selection = id.filter(|id| self.get(id).is_some());
    }

    pub fn editing(&self) -> Option<&ItemId> {
        self.editing.as_ref()
    }

    pub fn set_editing(&mut self, id: Option<ItemId>) {
        self.editing = id.filter(|id| self.get(id).is_some());
    }

    /// Append `item` to the current page
    ///
    /// Rejects items that fail the geometric sanity check or reuse an id.
    pub fn add(&mut self, item: Annotation) -> Result<Arc<EditsDocument>, EditError> {
        if self.document.contains_id(&item.id) {
            return Err(RejectReason::DuplicateId(item.id).into());
        }
        if let Some(issue) = validate_item(self.page, &item) {
            return Err(issue.into());
        }

        let next = self.document.with_added(self.page, item);
        Ok(self.commit(next))
    }

    /// Merge `patch` into item `id` on the current page
    ///
    /// An absent id leaves the document unchanged and yields
    /// [`EditError::NotFound`]; callers treat that as a no-op.
    pub fn update(
        &mut self,
        id: &ItemId,
        patch: &ItemPatch,
    ) -> Result<Arc<EditsDocument>, EditError> {
        let next = self
            .document
            .with_updated(self.page, id, patch)
            .ok_or_else(|| self.not_found(id))?;

        if let Some(issue) = next
            .find(self.page, id)
            .and_then(|item| validate_item(self.page, item))
        {
            return Err(issue.into());
        }

        Ok(self.commit(next))
    }

    /// Remove item `id` from the current page
    ///
    /// Clears selection and editing when they pointed at the removed item.
    pub fn remove(&mut self, id: &ItemId) -> Result<Arc<EditsDocument>, EditError> {
        let next = self
            .document
            .with_removed(self.page, id)
            .ok_or_else(|| self.not_found(id))?;

        if self.selection.as_ref() == Some(id) {
            self.selection = None;
        }
        if self.editing.as_ref() == Some(id) {
            self.editing = None;
        }

        Ok(self.commit(next))
    }

    fn commit(&mut self, next: EditsDocument) -> Arc<EditsDocument> {
        self.document = Arc::new(next);
        self.revision += 1;
        self.snapshot()
    }

    fn not_found(&self, id: &ItemId) -> EditError {
        EditError::NotFound {
            id: id.clone(),
            page: self.page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doc_model::{AnnotationKind, Color, CommentNote, FreehandStroke, Point, Rect};
    use proptest::prelude::*;

    fn comment(id: &str, text: &str) -> Annotation {
        Annotation::with_id(
            ItemId::new(id),
            AnnotationKind::Comment(CommentNote {
                frame: Rect::new(0.0, 0.0, 240.0, 130.0),
                author: "User".to_owned(),
                text: text.to_owned(),
                timestamp: String::new(),
            }),
        )
    }

    #[test]
    fn test_add_keeps_prior_snapshot() {
        let mut store = AnnotationStore::default();
        let before = store.snapshot();

        let after = store.add(comment("a", "")).expect("add should succeed");

        assert!(before.is_empty());
        assert_eq!(after.page(0).len(), 1);
        assert_eq!(store.revision(), 1);
    }

    #[test]
    fn test_add_only_touches_current_page() {
        let mut store = AnnotationStore::default();
        store.set_page(3);
        store.add(comment("a", "")).expect("add should succeed");

        assert!(store.document().page(0).is_empty());
        assert_eq!(store.document().page(3).len(), 1);
    }

    #[test]
    fn test_add_rejects_duplicate_and_short_stroke() {
        let mut store = AnnotationStore::default();
        store.add(comment("a", "")).expect("add should succeed");

        assert!(matches!(
            store.add(comment("a", "again")),
            Err(EditError::ValidationRejected(RejectReason::DuplicateId(_)))
        ));

        let short = Annotation::new(AnnotationKind::Freehand(FreehandStroke {
            points: vec![Point::new(0.0, 0.0); 3],
            stroke_color: Color::PEN_BLUE,
            stroke_width: 2.0,
        }));
        assert!(store.add(short).is_err());
        assert_eq!(store.revision(), 1);
    }

    #[test]
    fn test_update_absent_id_is_noop() {
        let mut store = AnnotationStore::default();
        store.add(comment("a", "x")).expect("add should succeed");
        let before = store.snapshot();

        let result = store.update(&ItemId::new("ghost"), &ItemPatch::text("y"));

        assert!(matches!(result, Err(EditError::NotFound { .. })));
        assert!(Arc::ptr_eq(&before, &store.snapshot()));
        assert_eq!(store.revision(), 1);
    }

    #[test]
    fn test_update_rejects_non_finite_result() {
        let mut store = AnnotationStore::default();
        store.add(comment("a", "")).expect("add should succeed");

        let result = store.update(
            &ItemId::new("a"),
            &ItemPatch::move_to(Point::new(f32::NAN, 0.0)),
        );

        assert!(result.is_err());
        assert_eq!(
            store.get(&ItemId::new("a")).map(Annotation::origin),
            Some(Point::new(0.0, 0.0))
        );
    }

    #[test]
    fn test_remove_clears_selection_and_editing() {
        let mut store = AnnotationStore::default();
        store.add(comment("a", "")).expect("add should succeed");
        store.select(Some(ItemId::new("a")));
        store.set_editing(Some(ItemId::new("a")));

        store.remove(&ItemId::new("a")).expect("remove should succeed");

        assert!(store.selection().is_none());
        assert!(store.editing().is_none());
        assert!(store.items().is_empty());
    }

    #[test]
    fn test_select_ignores_ids_off_the_page() {
        let mut store = AnnotationStore::default();
        store.add(comment("a", "")).expect("add should succeed");

        store.select(Some(ItemId::new("a")));
        store.set_page(1);
        assert!(store.selection().is_none());

        store.select(Some(ItemId::new("a")));
        assert!(store.selection().is_none());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add,
        Update(usize, String),
        Remove(usize),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            Just(Op::Add),
            (any::<usize>(), "[a-z]{0,6}").prop_map(|(i, s)| Op::Update(i, s)),
            any::<usize>().prop_map(Op::Remove),
        ]
    }

    proptest! {
        #[test]
        fn test_final_document_matches_model(ops in prop::collection::vec(op(), 0..40)) {
            let mut store = AnnotationStore::default();
            let mut model: Vec<(ItemId, String)> = Vec::new();
            let mut next = 0usize;

            for op in ops {
                match op {
                    Op::Add => {
                        let id = format!("item-{next}");
                        next += 1;
                        store.add(comment(&id, "")).expect("fresh id should be accepted");
                        model.push((ItemId::new(id), String::new()));
                    }
                    Op::Update(index, text) => {
                        if model.is_empty() {
                            continue;
                        }
                        let slot = index % model.len();
                        store
                            .update(&model[slot].0, &ItemPatch::text(text.clone()))
                            .expect("live id");
                        model[slot].1 = text;
                    }
                    Op::Remove(index) => {
                        if model.is_empty() {
                            continue;
                        }
                        let (id, _) = model.remove(index % model.len());
                        store.remove(&id).expect("live id");
                    }
                }
            }

            let actual: Vec<(ItemId, String)> = store
                .items()
                .iter()
                .map(|item| (item.id.clone(), item.text().unwrap_or_default().to_owned()))
                .collect();
            prop_assert_eq!(actual, model);
        }
    }
}
