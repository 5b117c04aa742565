//! Pointer-driven interaction state machine
//!
//! Interaction is an explicit state value advanced by [`transition`], a pure
//! function of the current state, one pointer event and a read-only view of
//! the editor. It never touches the store; it returns [`Effect`]s that the
//! editor applies. Live previews are derived from the state alone and are
//! visual only until the gesture is released.
//!
//! Gestures:
//! - a drawing tool turns pointer-down anywhere into `Creating` (shapes) or
//!   `Drawing` (freehand), committed or discarded on release
//! - pointer-down on an item body starts `Dragging`
//! - pointer-down on a corner handle of the selected boxed item starts
//!   `Resizing`
//!
//! Pointer-cancel and pointer-leave end a gesture exactly like pointer-up.

use crate::placement::{place_item, shape_from_drag, stroke_from_points, PlacementContext};
use crate::tools::{ShapeTool, ToolController, ToolMode};
use crate::Tool;
use doc_model::{resize_frame, Annotation, EditorConfig, Handle, ItemId, ItemPatch, Point, Rect};

/// What a pointer landed on
#[derive(Debug, Clone, PartialEq)]
pub enum HitTarget {
    /// Bare page surface
    Page,

    /// Body of an item
    Item(ItemId),

    /// Corner handle of an item
    Handle(ItemId, Handle),
}

/// Pointer input in page-local coordinates
#[derive(Debug, Clone, PartialEq)]
pub enum PointerEvent {
    Down { at: Point, target: HitTarget },
    Move { at: Point },

    /// Release; `None` when the position could not be mapped
    Up { at: Option<Point> },

    /// Cancel, capture loss, or leaving the surface
    Cancel { at: Option<Point> },

    /// Synthetic click following a down/up pair
    Click { at: Point, target: HitTarget },

    DoubleClick { target: HitTarget },
}

/// Gesture in progress
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Gesture {
    #[default]
    Idle,

    /// Dragging out a shape from `anchor`
    Creating {
        shape: ShapeTool,
        anchor: Point,
        current: Point,
    },

    /// Recording a freehand stroke
    Drawing { points: Vec<Point> },

    /// Moving an item; `original` is its origin at pointer-down
    Dragging {
        id: ItemId,
        anchor: Point,
        original: Point,
        current: Point,
        moved: bool,
    },

    /// Resizing a boxed item by one corner
    Resizing {
        id: ItemId,
        handle: Handle,
        anchor: Point,
        original: Rect,
        current: Point,
        moved: bool,
    },
}

impl Gesture {
    pub fn is_active(&self) -> bool {
        !matches!(self, Gesture::Idle)
    }
}

/// Complete interaction state
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InteractionState {
    pub gesture: Gesture,

    /// Swallow the next click; set by a drag or resize that moved and by a
    /// double click that entered text editing
    pub suppress_click: bool,
}

/// Side effect requested by a transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Add a new item to the current page
    Commit(Annotation),

    /// Merge a patch into an existing item
    Update { id: ItemId, patch: ItemPatch },

    Select(Option<ItemId>),

    /// Leave text-edit mode, committing the draft if it changed
    EndEditing,

    /// Enter text-edit mode on an item
    BeginEditing(ItemId),

    /// Preview changed; repaint on the next frame
    RequestRepaint,

    /// Drop any pending preview repaint
    DiscardRepaint,
}

/// Read-only view of the editor a transition may consult
pub struct TransitionContext<'a> {
    pub tools: &'a ToolController,
    pub config: &'a EditorConfig,

    /// Items of the current page
    pub items: &'a [Annotation],
    pub selection: Option<&'a ItemId>,
    pub editing: Option<&'a ItemId>,

    /// Display timestamp for click-placed comments
    pub timestamp: &'a str,
}

impl TransitionContext<'_> {
    fn item(&self, id: &ItemId) -> Option<&Annotation> {
        self.items.iter().find(|item| &item.id == id)
    }

    fn end_editing_unless(&self, id: &ItemId) -> Option<Effect> {
        self.editing
            .filter(|editing| *editing != id)
            .map(|_| Effect::EndEditing)
    }
}

/// New state plus the effects to apply, in order
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: InteractionState,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn unchanged(state: InteractionState) -> Self {
        Self {
            state,
            effects: Vec::new(),
        }
    }
}

/// Preview geometry of a shape being created
#[derive(Debug, Clone, PartialEq)]
pub enum ShapePreview {
    Line { start: Point, end: Point },
    Box(Rect),
    Circle { center: Point, radius: f32 },
}

/// Visual-only geometry of the gesture in progress
#[derive(Debug, Clone, PartialEq)]
pub enum Preview {
    Creating { shape: ShapeTool, geometry: ShapePreview },
    Stroke { points: Vec<Point> },
    Moving { id: ItemId, origin: Point },
    Resizing { id: ItemId, frame: Rect },
}

/// Advance the interaction state by one pointer event
pub fn transition(
    state: InteractionState,
    event: PointerEvent,
    ctx: &TransitionContext<'_>,
) -> Transition {
    match event {
        PointerEvent::Down { at, target } => pointer_down(state, at, target, ctx),
        PointerEvent::Move { at } => pointer_move(state, at, ctx),
        PointerEvent::Up { at } | PointerEvent::Cancel { at } => release(state, at, ctx),
        PointerEvent::Click { at, target } => click(state, at, target, ctx),
        PointerEvent::DoubleClick { target } => double_click(state, target, ctx),
    }
}

/// Abandon the gesture in progress without committing anything
pub fn cancel(state: InteractionState) -> Transition {
    let effects = if state.gesture.is_active() {
        vec![Effect::DiscardRepaint]
    } else {
        Vec::new()
    };

    Transition {
        state: InteractionState {
            gesture: Gesture::Idle,
            ..state
        },
        effects,
    }
}

fn pointer_down(
    state: InteractionState,
    at: Point,
    target: HitTarget,
    ctx: &TransitionContext<'_>,
) -> Transition {
    if state.gesture.is_active() {
        return Transition::unchanged(state);
    }
    let state = InteractionState {
        suppress_click: false,
        ..state
    };

    let begin = |gesture: Gesture, effects: Vec<Effect>| Transition {
        state: InteractionState {
            gesture,
            suppress_click: false,
        },
        effects,
    };
    let clear_focus = vec![
        Effect::EndEditing,
        Effect::Select(None),
        Effect::RequestRepaint,
    ];

    match ctx.tools.active().mode() {
        ToolMode::Draw => begin(Gesture::Drawing { points: vec![at] }, clear_focus),
        ToolMode::Drag(shape) => begin(
            Gesture::Creating {
                shape,
                anchor: at,
                current: at,
            },
            clear_focus,
        ),
        ToolMode::Place => match target {
            HitTarget::Page => Transition::unchanged(state),
            HitTarget::Handle(id, handle) => {
                let frame = ctx
                    .item(&id)
                    .and_then(Annotation::frame)
                    .filter(|_| ctx.selection == Some(&id));
                match frame {
                    Some(original) => {
                        let mut effects = Vec::new();
                        if ctx.editing.is_some() {
                            effects.push(Effect::EndEditing);
                        }
                        effects.push(Effect::Select(Some(id.clone())));
                        begin(
                            Gesture::Resizing {
                                id,
                                handle,
                                anchor: at,
                                original,
                                current: at,
                                moved: false,
                            },
                            effects,
                        )
                    }
                    None => start_drag(state, at, id, ctx),
                }
            }
            HitTarget::Item(id) => start_drag(state, at, id, ctx),
        },
    }
}

fn start_drag(
    state: InteractionState,
    at: Point,
    id: ItemId,
    ctx: &TransitionContext<'_>,
) -> Transition {
    if ctx.editing == Some(&id) {
        return Transition::unchanged(state);
    }
    let Some(item) = ctx.item(&id) else {
        return Transition::unchanged(state);
    };

    let mut effects = vec![Effect::Select(Some(id.clone()))];
    effects.extend(ctx.end_editing_unless(&id));

    Transition {
        state: InteractionState {
            gesture: Gesture::Dragging {
                original: item.origin(),
                id,
                anchor: at,
                current: at,
                moved: false,
            },
            suppress_click: false,
        },
        effects,
    }
}

fn exceeds(anchor: Point, at: Point, threshold: f32) -> bool {
    let (dx, dy) = at.delta_from(anchor);
    dx.abs() > threshold || dy.abs() > threshold
}

fn pointer_move(mut state: InteractionState, at: Point, ctx: &TransitionContext<'_>) -> Transition {
    let threshold = ctx.config.move_threshold;

    match &mut state.gesture {
        Gesture::Idle => return Transition::unchanged(state),
        Gesture::Creating { current, .. } => *current = at,
        Gesture::Drawing { points } => points.push(at),
        Gesture::Dragging {
            anchor,
            current,
            moved,
            ..
        }
        | Gesture::Resizing {
            anchor,
            current,
            moved,
            ..
        } => {
            *current = at;
            if !*moved && exceeds(*anchor, at, threshold) {
                *moved = true;
                state.suppress_click = true;
            }
        }
    }

    Transition {
        state,
        effects: vec![Effect::RequestRepaint],
    }
}

fn release(state: InteractionState, at: Option<Point>, ctx: &TransitionContext<'_>) -> Transition {
    let mut suppress_click = state.suppress_click;
    let mut effects = Vec::new();

    match state.gesture {
        Gesture::Idle => {
            return Transition::unchanged(InteractionState {
                gesture: Gesture::Idle,
                suppress_click,
            })
        }
        Gesture::Creating {
            shape,
            anchor,
            current,
        } => {
            let end = at.unwrap_or(current);
            match shape_from_drag(shape, anchor, end, ctx.tools, ctx.config) {
                Ok(item) => {
                    let id = item.id.clone();
                    effects.push(Effect::Commit(item));
                    effects.push(Effect::Select(Some(id)));
                }
                Err(reason) => tracing::debug!(%reason, "shape discarded"),
            }
        }
        Gesture::Drawing { points } => match stroke_from_points(points, ctx.tools) {
            Ok(item) => {
                let id = item.id.clone();
                effects.push(Effect::Commit(item));
                effects.push(Effect::Select(Some(id)));
            }
            Err(reason) => tracing::debug!(%reason, "stroke discarded"),
        },
        Gesture::Dragging {
            id,
            anchor,
            original,
            current,
            moved,
        } => {
            let end = at.unwrap_or(current);
            if moved || exceeds(anchor, end, ctx.config.move_threshold) {
                suppress_click = true;
                let (dx, dy) = end.delta_from(anchor);
                effects.push(Effect::Update {
                    id,
                    patch: ItemPatch::move_to(original.offset(dx, dy)),
                });
            }
        }
        Gesture::Resizing {
            id,
            handle,
            anchor,
            original,
            current,
            moved,
        } => {
            let end = at.unwrap_or(current);
            if moved || exceeds(anchor, end, ctx.config.move_threshold) {
                suppress_click = true;
                let (dx, dy) = end.delta_from(anchor);
                let frame = resize_frame(original, handle, dx, dy, &ctx.config.size_limits);
                effects.push(Effect::Update {
                    id,
                    patch: ItemPatch::frame(frame),
                });
            }
        }
    }

    effects.push(Effect::RequestRepaint);
    Transition {
        state: InteractionState {
            gesture: Gesture::Idle,
            suppress_click,
        },
        effects,
    }
}

fn click(
    state: InteractionState,
    at: Point,
    target: HitTarget,
    ctx: &TransitionContext<'_>,
) -> Transition {
    if state.suppress_click {
        return Transition::unchanged(InteractionState {
            suppress_click: false,
            ..state
        });
    }

    let tool = ctx.tools.active();
    if state.gesture.is_active() || tool.is_drawing() {
        return Transition::unchanged(state);
    }

    let mut effects = Vec::new();
    match target {
        HitTarget::Handle(..) => {}
        HitTarget::Item(id) => {
            effects.extend(ctx.end_editing_unless(&id));
            effects.push(Effect::Select(Some(id)));
        }
        HitTarget::Page => {
            let had_selection = ctx.selection.is_some();
            effects.push(Effect::EndEditing);
            effects.push(Effect::Select(None));

            let deselect_only = had_selection
                && matches!(
                    tool,
                    Tool::TextBox | Tool::CoverText | Tool::Stamp | Tool::Signature
                );
            if !deselect_only {
                let placement = PlacementContext {
                    tools: ctx.tools,
                    config: ctx.config,
                    timestamp: ctx.timestamp,
                };
                if let Some(item) = place_item(tool, at, &placement) {
                    let id = item.id.clone();
                    let edit = item.is_text_capable();
                    effects.push(Effect::Commit(item));
                    effects.push(Effect::Select(Some(id.clone())));
                    if edit {
                        effects.push(Effect::BeginEditing(id));
                    }
                }
            }
        }
    }

    Transition { state, effects }
}

fn double_click(
    state: InteractionState,
    target: HitTarget,
    ctx: &TransitionContext<'_>,
) -> Transition {
    let id = match target {
        HitTarget::Item(id) | HitTarget::Handle(id, _) => id,
        HitTarget::Page => return Transition::unchanged(state),
    };
    if state.gesture.is_active() || ctx.tools.active().is_drawing() {
        return Transition::unchanged(state);
    }
    if !ctx.item(&id).is_some_and(Annotation::is_text_capable) {
        return Transition::unchanged(state);
    }

    Transition {
        state: InteractionState {
            suppress_click: true,
            ..state
        },
        effects: vec![Effect::Select(Some(id.clone())), Effect::BeginEditing(id)],
    }
}

impl InteractionState {
    /// Preview of the gesture in progress
    pub fn preview(&self, limits: &doc_model::SizeLimits) -> Option<Preview> {
        match &self.gesture {
            Gesture::Idle => None,
            Gesture::Creating {
                shape,
                anchor,
                current,
            } => {
                let geometry = match shape {
                    ShapeTool::Line => ShapePreview::Line {
                        start: *anchor,
                        end: *current,
                    },
                    ShapeTool::Rectangle | ShapeTool::Highlight => {
                        ShapePreview::Box(Rect::from_corners(*anchor, *current))
                    }
                    ShapeTool::Circle => ShapePreview::Circle {
                        center: *anchor,
                        radius: anchor.distance_to(*current),
                    },
                };
                Some(Preview::Creating {
                    shape: *shape,
                    geometry,
                })
            }
            Gesture::Drawing { points } => Some(Preview::Stroke {
                points: points.clone(),
            }),
            Gesture::Dragging {
                id,
                anchor,
                original,
                current,
                ..
            } => {
                let (dx, dy) = current.delta_from(*anchor);
                Some(Preview::Moving {
                    id: id.clone(),
                    origin: original.offset(dx, dy),
                })
            }
            Gesture::Resizing {
                id,
                handle,
                anchor,
                original,
                current,
                ..
            } => {
                let (dx, dy) = current.delta_from(*anchor);
                Some(Preview::Resizing {
                    id: id.clone(),
                    frame: resize_frame(*original, *handle, dx, dy, limits),
                })
            }
        }
    }
}

/// Resolve what a page-local point lands on
///
/// Corner handles of the selected boxed item win over item bodies; among
/// bodies the topmost (last) item wins.
pub fn hit_target(
    items: &[Annotation],
    selection: Option<&ItemId>,
    at: Point,
    config: &EditorConfig,
) -> HitTarget {
    let selected_frame = selection
        .and_then(|id| items.iter().find(|item| &item.id == id))
        .and_then(|item| item.frame().map(|frame| (item.id.clone(), frame)));

    if let Some((id, frame)) = selected_frame {
        let handle = Handle::ALL
            .into_iter()
            .find(|handle| frame.corner(*handle).distance_to(at) <= config.handle_radius);
        if let Some(handle) = handle {
            return HitTarget::Handle(id, handle);
        }
    }

    items
        .iter()
        .rev()
        .find(|item| item.hit_test(at, config.hit_tolerance))
        .map(|item| HitTarget::Item(item.id.clone()))
        .unwrap_or(HitTarget::Page)
}
