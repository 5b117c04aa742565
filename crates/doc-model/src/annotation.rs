use crate::geometry::point_near_segment;
use crate::{Color, Point, Rect, StampKind, TextStyle, TextStyleProperty};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque item identifier. New items get a UUID v4 string; ids loaded from a
/// stored document are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stroke {
    pub stroke_color: Color,
    pub stroke_width: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<Color>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFrame {
    #[serde(flatten)]
    pub frame: Rect,
    #[serde(default)]
    pub text: String,
    #[serde(flatten)]
    pub style: TextStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineShape {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    #[serde(flatten)]
    pub stroke: Stroke,
}

impl LineShape {
    pub fn start(&self) -> Point {
        Point::new(self.x1, self.y1)
    }

    pub fn end(&self) -> Point {
        Point::new(self.x2, self.y2)
    }
}

/// Rectangle or highlight box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxShape {
    #[serde(flatten)]
    pub frame: Rect,
    #[serde(flatten)]
    pub stroke: Stroke,
}

/// Circle stored by its bounding-box top-left and radius.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircleShape {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    #[serde(flatten)]
    pub stroke: Stroke,
}

impl CircleShape {
    pub fn center(&self) -> Point {
        Point::new(self.x + self.radius, self.y + self.radius)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreehandStroke {
    pub points: Vec<Point>,
    pub stroke_color: Color,
    pub stroke_width: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StampMark {
    #[serde(flatten)]
    pub frame: Rect,
    pub label: String,
    pub color: Color,
    #[serde(rename = "stampId", default)]
    pub stamp: StampKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureMark {
    #[serde(flatten)]
    pub frame: Rect,
    pub path: String,
    pub stroke_color: Color,
    pub stroke_width: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentNote {
    #[serde(flatten)]
    pub frame: Rect,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedactionBox {
    #[serde(flatten)]
    pub frame: Rect,
    pub color: Color,
}

/// Variant payload of an annotation, tagged by `type` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnnotationKind {
    #[serde(rename = "textbox")]
    TextBox(TextFrame),
    CoverText(TextFrame),
    Line(LineShape),
    Rectangle(BoxShape),
    Circle(CircleShape),
    Freehand(FreehandStroke),
    Highlight(BoxShape),
    Stamp(StampMark),
    Signature(SignatureMark),
    Comment(CommentNote),
    #[serde(rename = "redact")]
    Redaction(RedactionBox),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: ItemId,
    #[serde(flatten)]
    pub kind: AnnotationKind,
}

impl Annotation {
    pub fn new(kind: AnnotationKind) -> Self {
        Self { id: ItemId::generate(), kind }
    }

    pub fn with_id(id: ItemId, kind: AnnotationKind) -> Self {
        Self { id, kind }
    }

    /// Wire value of the `type` tag.
    pub fn type_tag(&self) -> &'static str {
        match &self.kind {
            AnnotationKind::TextBox(_) => "textbox",
            AnnotationKind::CoverText(_) => "cover_text",
            AnnotationKind::Line(_) => "line",
            AnnotationKind::Rectangle(_) => "rectangle",
            AnnotationKind::Circle(_) => "circle",
            AnnotationKind::Freehand(_) => "freehand",
            AnnotationKind::Highlight(_) => "highlight",
            AnnotationKind::Stamp(_) => "stamp",
            AnnotationKind::Signature(_) => "signature",
            AnnotationKind::Comment(_) => "comment",
            AnnotationKind::Redaction(_) => "redact",
        }
    }

    /// Box extent for variants that have one. Only these can be resized.
    pub fn frame(&self) -> Option<Rect> {
        match &self.kind {
            AnnotationKind::TextBox(item) | AnnotationKind::CoverText(item) => Some(item.frame),
            AnnotationKind::Rectangle(item) | AnnotationKind::Highlight(item) => Some(item.frame),
            AnnotationKind::Stamp(item) => Some(item.frame),
            AnnotationKind::Signature(item) => Some(item.frame),
            AnnotationKind::Comment(item) => Some(item.frame),
            AnnotationKind::Redaction(item) => Some(item.frame),
            AnnotationKind::Line(_) | AnnotationKind::Circle(_) | AnnotationKind::Freehand(_) => {
                None
            }
        }
    }

    fn frame_mut(&mut self) -> Option<&mut Rect> {
        match &mut self.kind {
            AnnotationKind::TextBox(item) | AnnotationKind::CoverText(item) => {
                Some(&mut item.frame)
            }
            AnnotationKind::Rectangle(item) | AnnotationKind::Highlight(item) => {
                Some(&mut item.frame)
            }
            AnnotationKind::Stamp(item) => Some(&mut item.frame),
            AnnotationKind::Signature(item) => Some(&mut item.frame),
            AnnotationKind::Comment(item) => Some(&mut item.frame),
            AnnotationKind::Redaction(item) => Some(&mut item.frame),
            AnnotationKind::Line(_) | AnnotationKind::Circle(_) | AnnotationKind::Freehand(_) => {
                None
            }
        }
    }

    pub fn is_resizable(&self) -> bool {
        self.frame().is_some()
    }

    /// Text boxes and cover text accept text editing and style properties.
    pub fn is_text_capable(&self) -> bool {
        matches!(self.kind, AnnotationKind::TextBox(_) | AnnotationKind::CoverText(_))
    }

    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            AnnotationKind::TextBox(item) | AnnotationKind::CoverText(item) => Some(&item.text),
            AnnotationKind::Comment(item) => Some(&item.text),
            _ => None,
        }
    }

    pub fn text_style(&self) -> Option<&TextStyle> {
        match &self.kind {
            AnnotationKind::TextBox(item) | AnnotationKind::CoverText(item) => Some(&item.style),
            _ => None,
        }
    }

    pub fn bounds(&self) -> Rect {
        match &self.kind {
            AnnotationKind::Line(line) => Rect::from_corners(line.start(), line.end()),
            AnnotationKind::Circle(circle) => {
                Rect::new(circle.x, circle.y, circle.radius * 2.0, circle.radius * 2.0)
            }
            AnnotationKind::Freehand(stroke) => Rect::bounding(&stroke.points).unwrap_or_default(),
            _ => self.frame().unwrap_or_default(),
        }
    }

    /// Top-left of the bounding box; this is the position a drag moves.
    pub fn origin(&self) -> Point {
        self.bounds().origin()
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        match &mut self.kind {
            AnnotationKind::Line(line) => {
                line.x1 += dx;
                line.y1 += dy;
                line.x2 += dx;
                line.y2 += dy;
            }
            AnnotationKind::Circle(circle) => {
                circle.x += dx;
                circle.y += dy;
            }
            AnnotationKind::Freehand(stroke) => {
                for point in &mut stroke.points {
                    *point = point.offset(dx, dy);
                }
            }
            _ => {
                if let Some(frame) = self.frame_mut() {
                    frame.x += dx;
                    frame.y += dy;
                }
            }
        }
    }

    pub fn move_to(&mut self, origin: Point) {
        let (dx, dy) = origin.delta_from(self.origin());
        self.translate(dx, dy);
    }

    /// Replace the box extent. Returns `false` for variants without one.
    pub fn set_frame(&mut self, rect: Rect) -> bool {
        match self.frame_mut() {
            Some(frame) => {
                *frame = rect;
                true
            }
            None => false,
        }
    }

    pub fn set_text(&mut self, text: &str) -> bool {
        match &mut self.kind {
            AnnotationKind::TextBox(item) | AnnotationKind::CoverText(item) => {
                item.text = text.to_owned();
                true
            }
            AnnotationKind::Comment(item) => {
                item.text = text.to_owned();
                true
            }
            _ => false,
        }
    }

    pub fn apply_style(&mut self, property: &TextStyleProperty) -> bool {
        match &mut self.kind {
            AnnotationKind::TextBox(item) | AnnotationKind::CoverText(item) => {
                item.style.apply(property);
                true
            }
            _ => false,
        }
    }

    pub fn set_stroke_color(&mut self, color: Color) -> bool {
        match &mut self.kind {
            AnnotationKind::Line(LineShape { stroke, .. })
            | AnnotationKind::Rectangle(BoxShape { stroke, .. })
            | AnnotationKind::Highlight(BoxShape { stroke, .. })
            | AnnotationKind::Circle(CircleShape { stroke, .. }) => stroke.stroke_color = color,
            AnnotationKind::Freehand(item) => item.stroke_color = color,
            AnnotationKind::Signature(item) => item.stroke_color = color,
            AnnotationKind::Stamp(item) => item.color = color,
            AnnotationKind::Redaction(item) => item.color = color,
            _ => return false,
        }
        true
    }

    pub fn set_stroke_width(&mut self, width: f32) -> bool {
        match &mut self.kind {
            AnnotationKind::Line(LineShape { stroke, .. })
            | AnnotationKind::Rectangle(BoxShape { stroke, .. })
            | AnnotationKind::Highlight(BoxShape { stroke, .. })
            | AnnotationKind::Circle(CircleShape { stroke, .. }) => stroke.stroke_width = width,
            AnnotationKind::Freehand(item) => item.stroke_width = width,
            AnnotationKind::Signature(item) => item.stroke_width = width,
            _ => return false,
        }
        true
    }

    pub fn set_fill_color(&mut self, color: Color) -> bool {
        match &mut self.kind {
            AnnotationKind::Line(LineShape { stroke, .. })
            | AnnotationKind::Rectangle(BoxShape { stroke, .. })
            | AnnotationKind::Highlight(BoxShape { stroke, .. })
            | AnnotationKind::Circle(CircleShape { stroke, .. }) => {
                stroke.fill_color = Some(color);
                true
            }
            _ => false,
        }
    }

    /// Whether `point` lands on this item. Thin variants use `tolerance` as the
    /// pick radius around their outline.
    pub fn hit_test(&self, point: Point, tolerance: f32) -> bool {
        match &self.kind {
            AnnotationKind::Line(line) => {
                let reach = tolerance.max(line.stroke.stroke_width);
                point_near_segment(point, line.start(), line.end(), reach)
            }
            AnnotationKind::Circle(circle) => {
                point.distance_to(circle.center()) <= circle.radius + tolerance
            }
            AnnotationKind::Freehand(stroke) => {
                let reach = tolerance.max(stroke.stroke_width);
                stroke
                    .points
                    .windows(2)
                    .any(|pair| point_near_segment(point, pair[0], pair[1], reach))
            }
            _ => self.bounds().contains(point),
        }
    }

    pub fn is_finite(&self) -> bool {
        let geometry = match &self.kind {
            AnnotationKind::Freehand(stroke) => {
                stroke.points.iter().all(Point::is_finite) && stroke.stroke_width.is_finite()
            }
            AnnotationKind::Line(line) => {
                [line.x1, line.y1, line.x2, line.y2, line.stroke.stroke_width]
                    .iter()
                    .all(|v| v.is_finite())
            }
            AnnotationKind::Circle(circle) => {
                [circle.x, circle.y, circle.radius, circle.stroke.stroke_width]
                    .iter()
                    .all(|v| v.is_finite())
            }
            _ => self.frame().is_some_and(|frame| frame.is_finite()),
        };

        let extras = match &self.kind {
            AnnotationKind::TextBox(item) | AnnotationKind::CoverText(item) => {
                item.style.is_finite()
            }
            AnnotationKind::Rectangle(item) | AnnotationKind::Highlight(item) => {
                item.stroke.stroke_width.is_finite()
            }
            AnnotationKind::Signature(item) => item.stroke_width.is_finite(),
            _ => true,
        };

        geometry && extras
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rectangle(x: f32, y: f32, w: f32, h: f32) -> Annotation {
        Annotation::with_id(
            ItemId::new("r1"),
            AnnotationKind::Rectangle(BoxShape {
                frame: Rect::new(x, y, w, h),
                stroke: Stroke {
                    stroke_color: Color::PEN_BLUE,
                    stroke_width: 2.0,
                    fill_color: Some(Color::PEN_BLUE.with_alpha(0.1)),
                },
            }),
        )
    }

    #[test]
    fn rectangle_wire_format_is_flat() {
        let value = serde_json::to_value(rectangle(10.0, 10.0, 100.0, 50.0)).expect("serialize");
        assert_eq!(
            value,
            json!({
                "id": "r1",
                "type": "rectangle",
                "x": 10.0, "y": 10.0, "w": 100.0, "h": 50.0,
                "strokeColor": "#0066ff",
                "strokeWidth": 2.0,
                "fillColor": "rgba(0,102,255,0.102)"
            })
        );
    }

    #[test]
    fn loads_stored_textbox_and_freehand() {
        let textbox: Annotation = serde_json::from_value(json!({
            "id": "t1", "type": "textbox", "x": 5, "y": 6, "w": 320, "h": 70,
            "text": "Hello", "fontSize": 18, "bold": true, "background": "transparent",
            "borderColor": "rgba(0,0,0,0.08)", "unknownKey": 1
        }))
        .expect("textbox should load");
        assert_eq!(textbox.text(), Some("Hello"));
        assert_eq!(textbox.frame(), Some(Rect::new(5.0, 6.0, 320.0, 70.0)));
        let style = textbox.text_style().expect("textbox has style");
        assert_eq!(style.font_size, 18.0);
        assert!(style.bold);

        let stroke: Annotation = serde_json::from_value(json!({
            "id": "f1", "type": "freehand", "points": [[0, 0], [1, 2], [3, 4], [5, 6]],
            "strokeColor": "#0066ff", "strokeWidth": 2
        }))
        .expect("freehand should load");
        assert_eq!(stroke.type_tag(), "freehand");
        assert_eq!(stroke.bounds(), Rect::new(0.0, 0.0, 5.0, 6.0));
    }

    #[test]
    fn redaction_uses_redact_tag() {
        let item = Annotation::with_id(
            ItemId::new("x"),
            AnnotationKind::Redaction(RedactionBox {
                frame: Rect::new(0.0, 0.0, 160.0, 48.0),
                color: Color::BLACK,
            }),
        );
        let value = serde_json::to_value(&item).expect("serialize");
        assert_eq!(value["type"], "redact");
        let back: Annotation = serde_json::from_value(value).expect("deserialize");
        assert_eq!(back, item);
    }

    #[test]
    fn move_to_translates_every_coordinate() {
        let mut line = Annotation::new(AnnotationKind::Line(LineShape {
            x1: 50.0,
            y1: 40.0,
            x2: 10.0,
            y2: 80.0,
            stroke: Stroke { stroke_color: Color::PEN_BLUE, stroke_width: 2.0, fill_color: None },
        }));
        line.move_to(Point::new(20.0, 20.0));

        let AnnotationKind::Line(moved) = &line.kind else { panic!("expected line") };
        assert_eq!((moved.x1, moved.y1, moved.x2, moved.y2), (60.0, 20.0, 20.0, 60.0));
    }

    #[test]
    fn only_boxed_items_resize() {
        let mut item = rectangle(0.0, 0.0, 10.0, 10.0);
        assert!(item.set_frame(Rect::new(1.0, 2.0, 90.0, 40.0)));
        assert_eq!(item.bounds(), Rect::new(1.0, 2.0, 90.0, 40.0));

        let mut circle = Annotation::new(AnnotationKind::Circle(CircleShape {
            x: 0.0,
            y: 0.0,
            radius: 5.0,
            stroke: Stroke { stroke_color: Color::PEN_BLUE, stroke_width: 2.0, fill_color: None },
        }));
        assert!(!circle.is_resizable());
        assert!(!circle.set_frame(Rect::new(0.0, 0.0, 1.0, 1.0)));
    }

    #[test]
    fn hit_test_by_variant() {
        let item = rectangle(10.0, 10.0, 100.0, 50.0);
        assert!(item.hit_test(Point::new(50.0, 30.0), 4.0));
        assert!(!item.hit_test(Point::new(150.0, 30.0), 4.0));

        let circle = Annotation::new(AnnotationKind::Circle(CircleShape {
            x: 0.0,
            y: 0.0,
            radius: 10.0,
            stroke: Stroke { stroke_color: Color::PEN_BLUE, stroke_width: 2.0, fill_color: None },
        }));
        assert!(circle.hit_test(Point::new(10.0, 10.0), 4.0));
        assert!(!circle.hit_test(Point::new(30.0, 30.0), 4.0));
    }

    #[test]
    fn non_finite_geometry_is_detected() {
        assert!(rectangle(0.0, 0.0, 10.0, 10.0).is_finite());
        assert!(!rectangle(f32::NAN, 0.0, 10.0, 10.0).is_finite());
    }
}
