//! Editor session facade
//!
//! Wires the components together for one open file: pointer input is mapped
//! to page coordinates, run through the interaction state machine, and the
//! resulting effects are applied to the store, the text session and the
//! persistence layer. Every accepted mutation schedules a debounced write.
//!
//! The session is single-threaded. The host loop drives it by calling
//! [`EditorSession::begin_frame`] once per frame and
//! [`EditorSession::poll_persistence`] whenever it wakes up, handing returned
//! jobs to a [`storage::WriteWorker`] and feeding outcomes back through
//! [`EditorSession::complete_write`].

use crate::coords::{CoordinateMapper, LayoutBox};
use crate::interaction::{
    self, hit_target, HitTarget, InteractionState, Preview, PointerEvent, TransitionContext,
};
use crate::store::AnnotationStore;
use crate::sync::{PersistenceSync, SyncStats, SyncStatus, WriteRequest};
use crate::text_session::{TextCommit, TextEditSession};
use crate::tools::{ToolController, ToolSetting};
use crate::{EditError, Effect, Tool};
use doc_model::{Annotation, EditorConfig, EditsDocument, ItemId, ItemPatch, Point, TextStyle};
use pdf_studio_scheduler::{Clock, FrameGate, SystemClock};
use std::sync::Arc;
use storage::{WriteJob, WriteOutcome};

/// Display format of comment timestamps
const COMMENT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Caret movement inside the text draft
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaretMove {
    Left,
    Right,
    Start,
    End,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone)]
pub struct EditorView<'a> {
    pub page: u32,

    /// Committed items of the current page, bottom to top
    pub items: &'a [Annotation],
    pub selection: Option<&'a ItemId>,
    pub editing: Option<&'a ItemId>,

    /// Draft shown in place of the edited item's text
    pub draft: Option<&'a str>,

    /// Live geometry of the gesture in progress
    pub preview: Option<Preview>,
    pub tool: Tool,

    /// Style shown in the toolbar: the selected text item's, else the defaults
    pub toolbar_style: TextStyle,
    pub sync: SyncStatus,
}

/// Editing state of one open file
pub struct EditorSession<C: Clock = SystemClock> {
    config: EditorConfig,
    file_id: String,
    mapper: CoordinateMapper,
    tools: ToolController,
    store: AnnotationStore,
    interaction: InteractionState,
    text: TextEditSession,
    sync: PersistenceSync<C>,
    frames: FrameGate,
}

impl EditorSession<SystemClock> {
    /// Create a session on the wall clock
    pub fn with_system_clock(file_id: impl Into<String>, config: EditorConfig) -> Self {
        Self::new(file_id, config, SystemClock)
    }
}

impl<C: Clock> EditorSession<C> {
    /// Create a session for `file_id` with an empty document
    pub fn new(file_id: impl Into<String>, config: EditorConfig, clock: C) -> Self {
        let sync = PersistenceSync::new(clock, config.debounce());
        Self {
            tools: ToolController::new(config.stroke_width),
            file_id: file_id.into(),
            mapper: CoordinateMapper::new(),
            store: AnnotationStore::default(),
            interaction: InteractionState::default(),
            text: TextEditSession::new(),
            sync,
            frames: FrameGate::new(),
            config,
        }
    }

    /// Switch to `file_id` and show `document`
    ///
    /// Drops the gesture, the draft and any write not yet started.
    /// Switch to `document` of `file_id`
    ///
    /// An open draft is committed first. Edits of the previous file that were
    /// not written yet come back as a job tagged with that file's id, so the
    /// caller can still save them.
    pub fn open(
        &mut self,
        file_id: impl Into<String>,
        document: EditsDocument,
    ) -> Option<WriteJob> {
        self.cancel_gesture();
        self.end_editing();
        let handoff = self.sync.detach().map(job);

        self.file_id = file_id.into();
        self.store.load(document);
        self.interaction = InteractionState::default();
        self.text = TextEditSession::new();
        self.sync.reset();
        self.frames.request();
        tracing::info!(
            file_id = %self.file_id,
            items = self.store.document().item_count(),
            "opened edits document"
        );
        handoff
    }

    pub fn file_id(&self) -> &str {
        &self.file_id
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn tools(&self) -> &ToolController {
        &self.tools
    }

    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    pub fn text_session(&self) -> &TextEditSession {
        &self.text
    }

    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }

    /// Current document snapshot
    pub fn document(&self) -> Arc<EditsDocument> {
        self.store.snapshot()
    }

    /// Record where the page surface is laid out on screen
    pub fn set_layout(&mut self, layout: Option<LayoutBox>) {
        self.mapper.set_layout(layout);
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.mapper.set_zoom(zoom);
        self.frames.request();
    }

    /// Show another page, committing any draft first
    pub fn set_page(&mut self, page: u32) {
        if page == self.store.page() {
            return;
        }
        self.cancel_gesture();
        self.end_editing();
        self.store.set_page(page);
        self.frames.request();
    }

    /// What a page-local point lands on
    pub fn hit_target(&self, at: Point) -> HitTarget {
        hit_target(self.store.items(), self.store.selection(), at, &self.config)
    }

    fn map(&self, x: f32, y: f32) -> Option<Point> {
        match self.mapper.map(x, y) {
            Ok(point) => Some(point),
            Err(error) => {
                tracing::debug!(%error, "pointer input skipped");
                None
            }
        }
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) {
        if let Some(at) = self.map(x, y) {
            let target = self.hit_target(at);
            self.dispatch(PointerEvent::Down { at, target });
        }
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        if let Some(at) = self.map(x, y) {
            self.dispatch(PointerEvent::Move { at });
        }
    }

    /// Release; a gesture still ends if the position cannot be mapped
    pub fn pointer_up(&mut self, x: f32, y: f32) {
        let at = self.map(x, y);
        self.dispatch(PointerEvent::Up { at });
    }

    /// Pointer cancel, capture loss, or the pointer leaving the surface
    pub fn pointer_cancel(&mut self, position: Option<(f32, f32)>) {
        let at = position.and_then(|(x, y)| self.map(x, y));
        self.dispatch(PointerEvent::Cancel { at });
    }

    pub fn click(&mut self, x: f32, y: f32) {
        if let Some(at) = self.map(x, y) {
            let target = self.hit_target(at);
            self.dispatch(PointerEvent::Click { at, target });
        }
    }

    pub fn double_click(&mut self, x: f32, y: f32) {
        if let Some(at) = self.map(x, y) {
            let target = self.hit_target(at);
            self.dispatch(PointerEvent::DoubleClick { target });
        }
    }

    /// Run one pointer event through the state machine and apply its effects
    pub fn dispatch(&mut self, event: PointerEvent) {
        let timestamp = chrono::Local::now()
            .format(COMMENT_TIMESTAMP_FORMAT)
            .to_string();
        let state = std::mem::take(&mut self.interaction);

        let step = {
            let ctx = TransitionContext {
                tools: &self.tools,
                config: &self.config,
                items: self.store.items(),
                selection: self.store.selection(),
                editing: self.store.editing(),
                timestamp: &timestamp,
            };
            interaction::transition(state, event, &ctx)
        };

        self.interaction = step.state;
        self.apply_effects(step.effects);
    }

    fn apply_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Commit(item) => self.commit_item(item),
                Effect::Update { id, patch } => {
                    if let Err(error) = self.update_item(&id, &patch) {
                        tracing::debug!(%error, "gesture update dropped");
                    }
                }
                Effect::Select(id) => self.store.select(id),
                Effect::EndEditing => self.end_editing(),
                Effect::BeginEditing(id) => {
                    self.begin_editing(&id);
                }
                Effect::RequestRepaint => {
                    self.frames.request();
                }
                Effect::DiscardRepaint => self.frames.discard(),
            }
        }
    }

    fn commit_item(&mut self, item: Annotation) {
        let kind = item.type_tag();
        match self.store.add(item) {
            Ok(snapshot) => self.sync.schedule(&self.file_id, snapshot),
            Err(error) => tracing::debug!(%error, kind, "new item rejected"),
        }
    }

    fn cancel_gesture(&mut self) {
        let step = interaction::cancel(std::mem::take(&mut self.interaction));
        self.interaction = step.state;
        self.apply_effects(step.effects);
    }

    /// Activate `tool`, abandoning any gesture of the previous one
    pub fn set_tool(&mut self, tool: Tool) {
        if self.tools.set_tool(tool) {
            self.cancel_gesture();
            self.frames.request();
        }
    }

    /// Change a toolbar setting
    ///
    /// Text-style settings also apply to the selected text item.
    pub fn set_tool_setting(&mut self, setting: &ToolSetting) {
        self.frames.request();
        let Some(property) = self.tools.apply(setting) else {
            return;
        };
        let Some(id) = self
            .store
            .selected_item()
            .filter(|item| item.is_text_capable())
            .map(|item| item.id.clone())
        else {
            return;
        };

        if let Err(error) = self.update_item(&id, &ItemPatch::style(property)) {
            tracing::debug!(%error, "style not applied to selection");
        }
    }

    /// Enter text-edit mode on `id`
    ///
    /// Returns `false` if the item is absent or does not hold text.
    pub fn begin_editing(&mut self, id: &ItemId) -> bool {
        let Some(current) = self
            .store
            .get(id)
            .filter(|item| item.is_text_capable())
            .and_then(|item| item.text())
            .map(str::to_owned)
        else {
            return false;
        };

        if let Some(flushed) = self.text.begin(id.clone(), &current) {
            self.commit_text(flushed);
        }
        self.store.set_editing(Some(id.clone()));
        self.store.select(Some(id.clone()));
        self.frames.request();
        true
    }

    /// Insert `text` at the caret of the draft
    pub fn type_text(&mut self, text: &str) {
        if self.text.editing().is_some() {
            self.text.insert(text);
            self.frames.request();
        }
    }

    pub fn backspace(&mut self) {
        if self.text.editing().is_some() {
            self.text.backspace();
            self.frames.request();
        }
    }

    /// Replace the whole draft
    pub fn set_draft(&mut self, text: &str) {
        if self.text.editing().is_some() {
            self.text.set_draft(text);
            self.frames.request();
        }
    }

    pub fn move_caret(&mut self, movement: CaretMove) {
        match movement {
            CaretMove::Left => self.text.caret_left(),
            CaretMove::Right => self.text.caret_right(),
            CaretMove::Start => self.text.caret_to_start(),
            CaretMove::End => self.text.caret_to_end(),
        }
    }

    /// Leave text-edit mode, committing the draft if it changed
    pub fn end_editing(&mut self) {
        if let Some(commit) = self.text.blur() {
            self.commit_text(commit);
        }
        if self.store.editing().is_some() {
            self.store.set_editing(None);
            self.frames.request();
        }
    }

    fn commit_text(&mut self, commit: TextCommit) {
        if let Err(error) = self.update_item(&commit.id, &ItemPatch::text(commit.text)) {
            tracing::debug!(%error, "text draft dropped");
        }
    }

    /// Merge `patch` into `id` on the current page and schedule a write
    pub fn update_item(&mut self, id: &ItemId, patch: &ItemPatch) -> Result<(), EditError> {
        let snapshot = self.store.update(id, patch)?;
        self.sync.schedule(&self.file_id, snapshot);
        self.frames.request();
        Ok(())
    }

    /// Remove `id` from the current page and schedule a write
    ///
    /// A draft of the removed item is dropped, not committed.
    pub fn delete_item(&mut self, id: &ItemId) -> Result<(), EditError> {
        let snapshot = self.store.remove(id)?;
        self.text.discard(id);
        self.sync.schedule(&self.file_id, snapshot);
        self.frames.request();
        Ok(())
    }

    /// Remove the selected item, if any
    pub fn delete_selected(&mut self) -> bool {
        let Some(id) = self.store.selection().cloned() else {
            return false;
        };
        self.delete_item(&id).is_ok()
    }

    /// Consume the coalesced repaint request at frame start
    pub fn begin_frame(&mut self) -> bool {
        self.frames.begin_frame()
    }

    pub fn frames(&self) -> &FrameGate {
        &self.frames
    }

    /// Collect a write that is due
    pub fn poll_persistence(&mut self) -> Option<WriteJob> {
        self.sync.poll().map(job)
    }

    /// Start the scheduled write now, e.g. before closing the file
    pub fn flush_persistence(&mut self) -> Option<WriteJob> {
        self.sync.flush().map(job)
    }

    /// Feed back the outcome of a write started by this session
    pub fn complete_write(&mut self, outcome: WriteOutcome) {
        self.sync.complete(outcome.ticket, outcome.result);
        self.frames.request();
    }

    pub fn sync_status(&self) -> SyncStatus {
        self.sync.status()
    }

    pub fn sync_stats(&self) -> SyncStats {
        self.sync.stats()
    }

    /// Check if no write is scheduled, waiting, or in flight
    pub fn is_settled(&self) -> bool {
        self.sync.is_settled()
    }

    /// Snapshot of what to draw
    pub fn view(&self) -> EditorView<'_> {
        EditorView {
            page: self.store.page(),
            items: self.store.items(),
            selection: self.store.selection(),
            editing: self.store.editing(),
            draft: self.text.draft(),
            preview: self.interaction.preview(&self.config.size_limits),
            tool: self.tools.active(),
            toolbar_style: self.tools.effective_text_style(self.store.selected_item()),
            sync: self.sync.status(),
        }
    }
}

fn job(request: WriteRequest) -> WriteJob {
    WriteJob {
        ticket: request.ticket,
        file_id: request.file_id,
        document: request.document,
    }
}
