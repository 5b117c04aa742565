use crate::Color;
use serde::{Deserialize, Serialize};

pub const DEFAULT_FONT_FAMILY: &str = "Inter, system-ui, -apple-system, Segoe UI, Roboto, Arial";

/// Font families offered by the text property panel, as `(label, css family)`.
pub const FONT_CHOICES: [(&str, &str); 5] = [
    ("Inter", DEFAULT_FONT_FAMILY),
    ("Roboto", "Roboto, system-ui, Arial"),
    ("Arial", "Arial, Helvetica, sans-serif"),
    ("Times", "Times New Roman, Times, serif"),
    ("Courier", "Courier New, Courier, monospace"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShadowLevel {
    #[default]
    None,
    Soft,
    Strong,
}

/// Presentation of a text box or cover-text item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextStyle {
    pub font_size: f32,
    pub font_family: String,
    pub color: Color,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
    pub align: TextAlign,
    pub padding: f32,
    pub border_radius: f32,
    pub border_color: Color,
    pub border_width: f32,
    pub background: Color,
    pub shadow: ShadowLevel,
    pub line_height: f32,
    pub letter_spacing: f32,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: 16.0,
            font_family: DEFAULT_FONT_FAMILY.to_owned(),
            color: Color::INK,
            bold: false,
            italic: false,
            underline: false,
            strikethrough: false,
            align: TextAlign::Left,
            padding: 10.0,
            border_radius: 10.0,
            border_color: Color::rgba(0, 0, 0, 20),
            border_width: 0.0,
            background: Color::TRANSPARENT,
            shadow: ShadowLevel::None,
            line_height: 1.35,
            letter_spacing: 0.0,
        }
    }
}

/// One editable text-style property with its new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "key", content = "value", rename_all = "camelCase")]
pub enum TextStyleProperty {
    FontSize(f32),
    FontFamily(String),
    Color(Color),
    Bold(bool),
    Italic(bool),
    Underline(bool),
    Strikethrough(bool),
    Align(TextAlign),
    Padding(f32),
    BorderRadius(f32),
    BorderColor(Color),
    BorderWidth(f32),
    Background(Color),
    Shadow(ShadowLevel),
    LineHeight(f32),
    LetterSpacing(f32),
}

impl TextStyle {
    pub fn apply(&mut self, property: &TextStyleProperty) {
        match property {
            TextStyleProperty::FontSize(v) => self.font_size = *v,
            TextStyleProperty::FontFamily(v) => self.font_family = v.clone(),
            TextStyleProperty::Color(v) => self.color = *v,
            TextStyleProperty::Bold(v) => self.bold = *v,
            TextStyleProperty::Italic(v) => self.italic = *v,
            TextStyleProperty::Underline(v) => self.underline = *v,
            TextStyleProperty::Strikethrough(v) => self.strikethrough = *v,
            TextStyleProperty::Align(v) => self.align = *v,
            TextStyleProperty::Padding(v) => self.padding = *v,
            TextStyleProperty::BorderRadius(v) => self.border_radius = *v,
            TextStyleProperty::BorderColor(v) => self.border_color = *v,
            TextStyleProperty::BorderWidth(v) => self.border_width = *v,
            TextStyleProperty::Background(v) => self.background = *v,
            TextStyleProperty::Shadow(v) => self.shadow = *v,
            TextStyleProperty::LineHeight(v) => self.line_height = *v,
            TextStyleProperty::LetterSpacing(v) => self.letter_spacing = *v,
        }
    }

    pub fn with(mut self, property: &TextStyleProperty) -> Self {
        self.apply(property);
        self
    }

    pub fn is_finite(&self) -> bool {
        [
            self.font_size,
            self.padding,
            self.border_radius,
            self.border_width,
            self.line_height,
            self.letter_spacing,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_serialize_with_css_values() {
        let value = serde_json::to_value(TextStyle::default()).expect("style should serialize");
        assert_eq!(value["fontSize"], 16.0);
        assert_eq!(value["color"], "#111111");
        assert_eq!(value["background"], "transparent");
        assert_eq!(value["shadow"], "none");
        assert_eq!(value["align"], "left");
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let style: TextStyle = serde_json::from_str(r#"{"bold":true,"fontSize":22}"#)
            .expect("partial style should load");
        assert!(style.bold);
        assert_eq!(style.font_size, 22.0);
        assert_eq!(style.padding, 10.0);
    }

    #[test]
    fn property_wire_form_is_key_value() {
        let property: TextStyleProperty =
            serde_json::from_str(r##"{"key":"background","value":"#ffffff"}"##)
                .expect("property should parse");
        assert_eq!(property, TextStyleProperty::Background(Color::WHITE));

        let style = TextStyle::default().with(&property);
        assert_eq!(style.background, Color::WHITE);
    }
}
