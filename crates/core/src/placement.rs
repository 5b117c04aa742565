//! Construction of new items
//!
//! Click-placed items get default frames at the click point. Dragged shapes
//! and freehand strokes are built from the finished gesture and rejected when
//! degenerate.

use crate::error::RejectReason;
use crate::tools::{ShapeTool, ToolController};
use crate::{EditError, Tool};
use doc_model::{
    Annotation, AnnotationKind, BoxShape, CircleShape, Color, CommentNote, EditorConfig,
    FreehandStroke, LineShape, Point, Rect, RedactionBox, SignatureMark, StampMark, TextFrame,
    DEFAULT_SIGNATURE_PATH, MIN_FREEHAND_POINTS,
};

/// Placeholder text of a fresh comment
pub const COMMENT_PLACEHOLDER: &str = "Note…";

const SIGNATURE_STROKE_WIDTH: f32 = 2.4;

/// Inputs to click placement besides the tool and point
pub struct PlacementContext<'a> {
    pub tools: &'a ToolController,
    pub config: &'a EditorConfig,

    /// Display timestamp written on new comments
    pub timestamp: &'a str,
}

/// Build the item a click with `tool` places at `at`
///
/// Returns `None` for tools that create by dragging or drawing.
pub fn place_item(tool: Tool, at: Point, ctx: &PlacementContext<'_>) -> Option<Annotation> {
    let sizes = &ctx.config.placement;

    let kind = match tool {
        Tool::TextBox => AnnotationKind::TextBox(TextFrame {
            frame: sizes.text.at(at),
            text: String::new(),
            style: ctx.tools.text_defaults().clone(),
        }),
        Tool::CoverText => {
            let mut style = ctx.tools.text_defaults().clone();
            if style.background.is_transparent() {
                style.background = Color::WHITE.with_alpha(0.98);
            }
            AnnotationKind::CoverText(TextFrame {
                frame: sizes.text.at(at),
                text: String::new(),
                style,
            })
        }
        Tool::Stamp => {
            let stamp = ctx.tools.stamp();
            AnnotationKind::Stamp(StampMark {
                frame: sizes.stamp.at(at),
                label: stamp.label().to_owned(),
                color: stamp.color(),
                stamp,
            })
        }
        Tool::Signature => AnnotationKind::Signature(SignatureMark {
            frame: sizes.signature.at(at),
            path: DEFAULT_SIGNATURE_PATH.to_owned(),
            stroke_color: Color::SIGNATURE_INK,
            stroke_width: SIGNATURE_STROKE_WIDTH,
        }),
        Tool::Comment => AnnotationKind::Comment(CommentNote {
            frame: sizes.comment.at(at),
            author: ctx.config.comment_author.clone(),
            text: COMMENT_PLACEHOLDER.to_owned(),
            timestamp: ctx.timestamp.to_owned(),
        }),
        Tool::Redaction => AnnotationKind::Redaction(RedactionBox {
            frame: sizes.redaction.at(at),
            color: Color::BLACK,
        }),
        Tool::Freehand | Tool::Highlight | Tool::Line | Tool::Rectangle | Tool::Circle => {
            return None
        }
    };

    Some(Annotation::new(kind))
}

/// Build a dragged shape from its anchor and release point
///
/// Drags shorter than `config.creation_threshold` on both axes are rejected.
pub fn shape_from_drag(
    shape: ShapeTool,
    anchor: Point,
    end: Point,
    tools: &ToolController,
    config: &EditorConfig,
) -> Result<Annotation, EditError> {
    let (dx, dy) = end.delta_from(anchor);
    let threshold = config.creation_threshold;
    if dx.abs() < threshold && dy.abs() < threshold {
        return Err(RejectReason::BelowCreationThreshold { dx, dy, threshold }.into());
    }

    let stroke = tools.shape_stroke(shape);
    let kind = match shape {
        ShapeTool::Line => AnnotationKind::Line(LineShape {
            x1: anchor.x,
            y1: anchor.y,
            x2: end.x,
            y2: end.y,
            stroke,
        }),
        ShapeTool::Rectangle => AnnotationKind::Rectangle(BoxShape {
            frame: Rect::from_corners(anchor, end),
            stroke,
        }),
        ShapeTool::Highlight => AnnotationKind::Highlight(BoxShape {
            frame: Rect::from_corners(anchor, end),
            stroke,
        }),
        ShapeTool::Circle => {
            let radius = dx.hypot(dy);
            AnnotationKind::Circle(CircleShape {
                x: anchor.x - radius,
                y: anchor.y - radius,
                radius,
                stroke,
            })
        }
    };

    Ok(Annotation::new(kind))
}

/// Build a freehand item from its recorded points, kept exactly as recorded
pub fn stroke_from_points(
    points: Vec<Point>,
    tools: &ToolController,
) -> Result<Annotation, EditError> {
    if points.len() < MIN_FREEHAND_POINTS {
        return Err(RejectReason::TooFewPoints {
            points: points.len(),
            required: MIN_FREEHAND_POINTS,
        }
        .into());
    }

    Ok(Annotation::new(AnnotationKind::Freehand(FreehandStroke {
        points,
        stroke_color: tools.pen_color(),
        stroke_width: tools.stroke_width(),
    })))
}
