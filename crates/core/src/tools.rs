//! Active tool and per-tool defaults
//!
//! The controller holds what the toolbar shows: which tool is active and the
//! defaults new items are created with. Text-style defaults are two-tier: a
//! setting always updates the default, and the editor additionally writes it
//! onto the selected text item.

use doc_model::{Annotation, Color, StampKind, Stroke, TextStyle, TextStyleProperty};
use serde::{Deserialize, Serialize};

/// Editing tool, serialized with the item type it produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    #[default]
    #[serde(rename = "textbox")]
    TextBox,
    CoverText,
    Freehand,
    Highlight,
    Line,
    Rectangle,
    Circle,
    Comment,
    Stamp,
    #[serde(rename = "redact")]
    Redaction,
    Signature,
}

/// Shapes created by dragging from an anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeTool {
    Line,
    Rectangle,
    Circle,
    Highlight,
}

/// How a tool creates items
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolMode {
    /// Record a freehand stroke between down and up
    Draw,

    /// Drag out a shape from an anchor point
    Drag(ShapeTool),

    /// Place a default-sized item with a click
    Place,
}

impl Tool {
    /// Every tool in toolbar order
    pub const ALL: [Tool; 11] = [
        Tool::TextBox,
        Tool::CoverText,
        Tool::Freehand,
        Tool::Highlight,
        Tool::Line,
        Tool::Rectangle,
        Tool::Circle,
        Tool::Comment,
        Tool::Stamp,
        Tool::Redaction,
        Tool::Signature,
    ];

    /// How this tool creates items
    pub fn mode(self) -> ToolMode {
        match self {
            Tool::Freehand => ToolMode::Draw,
            Tool::Highlight => ToolMode::Drag(ShapeTool::Highlight),
            Tool::Line => ToolMode::Drag(ShapeTool::Line),
            Tool::Rectangle => ToolMode::Drag(ShapeTool::Rectangle),
            Tool::Circle => ToolMode::Drag(ShapeTool::Circle),
            Tool::TextBox
            | Tool::CoverText
            | Tool::Comment
            | Tool::Stamp
            | Tool::Redaction
            | Tool::Signature => ToolMode::Place,
        }
    }

    /// Drawing tools own the pointer: items underneath cannot be dragged
    pub fn is_drawing(self) -> bool {
        !matches!(self.mode(), ToolMode::Place)
    }
}

/// One toolbar setting change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "setting", content = "value", rename_all = "camelCase")]
pub enum ToolSetting {
    PenColor(Color),
    HighlightColor(Color),
    StrokeWidth(f32),
    Stamp(StampKind),
    Text(TextStyleProperty),
}

/// Active tool plus the defaults applied to new items
#[derive(Debug, Clone, PartialEq)]
pub struct ToolController {
    active: Tool,
    pen_color: Color,
    highlight_color: Color,
    stroke_width: f32,
    stamp: StampKind,
    text_defaults: TextStyle,
}

impl Default for ToolController {
    fn default() -> Self {
        Self::new(2.0)
    }
}

impl ToolController {
    /// Create a controller with the text box tool active
    pub fn new(stroke_width: f32) -> Self {
        Self {
            active: Tool::default(),
            pen_color: Color::PEN_BLUE,
            highlight_color: Color::HIGHLIGHT_YELLOW,
            stroke_width,
            stamp: StampKind::default(),
            text_defaults: TextStyle::default(),
        }
    }

    pub fn active(&self) -> Tool {
        self.active
    }

    /// Switch tools. Returns `true` if the tool changed.
    ///
    /// Callers must cancel any in-progress gesture when this returns `true`.
    pub fn set_tool(&mut self, tool: Tool) -> bool {
        let changed = self.active != tool;
        self.active = tool;
        changed
    }

    pub fn pen_color(&self) -> Color {
        self.pen_color
    }

    pub fn highlight_color(&self) -> Color {
        self.highlight_color
    }

    pub fn stroke_width(&self) -> f32 {
        self.stroke_width
    }

    pub fn stamp(&self) -> StampKind {
        self.stamp
    }

    pub fn text_defaults(&self) -> &TextStyle {
        &self.text_defaults
    }

    /// Apply a setting to the defaults
    ///
    /// Returns the text property to mirror onto a selected text item, if the
    /// setting was a text-style one.
    pub fn apply(&mut self, setting: &ToolSetting) -> Option<TextStyleProperty> {
        match setting {
            ToolSetting::PenColor(color) => self.pen_color = *color,
            ToolSetting::HighlightColor(color) => self.highlight_color = *color,
            ToolSetting::StrokeWidth(width) => self.stroke_width = *width,
            ToolSetting::Stamp(kind) => self.stamp = *kind,
            ToolSetting::Text(property) => {
                self.text_defaults.apply(property);
                return Some(property.clone());
            }
        }
        None
    }

    /// Style a property panel shows: the selected text item's own style,
    /// falling back to the defaults
    pub fn effective_text_style(&self, selected: Option<&Annotation>) -> TextStyle {
        selected
            .and_then(Annotation::text_style)
            .cloned()
            .unwrap_or_else(|| self.text_defaults.clone())
    }

    /// Stroke for a newly dragged shape
    pub fn shape_stroke(&self, shape: ShapeTool) -> Stroke {
        match shape {
            ShapeTool::Highlight => Stroke {
                stroke_color: self.highlight_color,
                stroke_width: self.stroke_width,
                fill_color: Some(self.highlight_color.with_alpha(0.25)),
            },
            ShapeTool::Line | ShapeTool::Rectangle | ShapeTool::Circle => Stroke {
                stroke_color: self.pen_color,
                stroke_width: self.stroke_width,
                fill_color: Some(self.pen_color.with_alpha(0.10)),
            },
        }
    }
}
