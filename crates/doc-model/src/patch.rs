use crate::{Annotation, Color, Point, Rect, TextStyleProperty};
use serde::{Deserialize, Serialize};

/// Partial update merged into an existing item.
///
/// Every field is optional; entries that do not apply to the target's variant
/// are skipped, so a patch built for a text box is harmless on a line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ItemPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<Point>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame: Option<Rect>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub style: Vec<TextStyleProperty>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<Color>,
}

impl ItemPatch {
    pub fn move_to(origin: Point) -> Self {
        Self { origin: Some(origin), ..Self::default() }
    }

    pub fn frame(frame: Rect) -> Self {
        Self { frame: Some(frame), ..Self::default() }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self { text: Some(text.into()), ..Self::default() }
    }

    pub fn style(property: TextStyleProperty) -> Self {
        Self { style: vec![property], ..Self::default() }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge into `item`, returning whether any field applied.
    ///
    /// A frame is applied after the origin, so a patch carrying both ends up
    /// exactly at `frame`.
    pub fn apply_to(&self, item: &mut Annotation) -> bool {
        let mut applied = false;

        if let Some(origin) = self.origin {
            item.move_to(origin);
            applied = true;
        }
        if let Some(frame) = self.frame {
            applied |= item.set_frame(frame);
        }
        if let Some(text) = &self.text {
            applied |= item.set_text(text);
        }
        for property in &self.style {
            applied |= item.apply_style(property);
        }
        if let Some(color) = self.stroke_color {
            applied |= item.set_stroke_color(color);
        }
        if let Some(width) = self.stroke_width {
            applied |= item.set_stroke_width(width);
        }
        if let Some(color) = self.fill_color {
            applied |= item.set_fill_color(color);
        }

        applied
    }
}
