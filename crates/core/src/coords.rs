//! Viewport to page-local coordinate mapping
//!
//! Pointer positions arrive in viewport space. Items are stored relative to
//! the top-left corner of the rendered page image, in that image's on-screen
//! pixels at the zoom active when the coordinate was captured. Changing the
//! zoom later does not rescale stored items.

use crate::EditError;
use doc_model::Point;
use serde::{Deserialize, Serialize};

/// On-screen box of the rendered page image, in viewport pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutBox {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl LayoutBox {
    /// Create a layout box
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// A box is usable once it is finite and has a positive extent
    pub fn is_measurable(&self) -> bool {
        [self.left, self.top, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
            && self.width > 0.0
            && self.height > 0.0
    }
}

/// Converts pointer viewport coordinates into page-local coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateMapper {
    layout: Option<LayoutBox>,
    zoom: f32,
}

impl Default for CoordinateMapper {
    fn default() -> Self {
        Self {
            layout: None,
            zoom: 1.0,
        }
    }
}

impl CoordinateMapper {
    /// Create a mapper with no layout yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the page image's current layout box, `None` while it is not laid out
    pub fn set_layout(&mut self, layout: Option<LayoutBox>) {
        self.layout = layout;
    }

    /// Current layout box
    pub fn layout(&self) -> Option<LayoutBox> {
        self.layout
    }

    /// Record the display zoom the layout belongs to
    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom;
    }

    /// Display zoom the layout belongs to
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Map a viewport position to page-local pixels
    ///
    /// Fails with [`EditError::CoordinateUnavailable`] until a measurable layout
    /// box has been recorded.
    pub fn map(&self, pointer_x: f32, pointer_y: f32) -> Result<Point, EditError> {
        let layout = self
            .layout
            .filter(LayoutBox::is_measurable)
            .ok_or(EditError::CoordinateUnavailable)?;

        let point = Point::new(pointer_x - layout.left, pointer_y - layout.top);
        if !point.is_finite() {
            return Err(EditError::CoordinateUnavailable);
        }

        Ok(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_is_relative_to_image_top_left() {
        let mut mapper = CoordinateMapper::new();
        mapper.set_layout(Some(LayoutBox::new(40.0, 120.0, 800.0, 1000.0)));

        assert_eq!(mapper.map(50.0, 130.0), Ok(Point::new(10.0, 10.0)));
        assert_eq!(mapper.map(20.0, 100.0), Ok(Point::new(-20.0, -20.0)));
    }

    #[test]
    fn test_map_without_layout_is_unavailable() {
        let mapper = CoordinateMapper::new();
        assert_eq!(mapper.map(1.0, 1.0), Err(EditError::CoordinateUnavailable));
    }

    #[test]
    fn test_zero_sized_layout_is_unavailable() {
        let mut mapper = CoordinateMapper::new();
        mapper.set_layout(Some(LayoutBox::new(0.0, 0.0, 0.0, 600.0)));
        assert_eq!(mapper.map(1.0, 1.0), Err(EditError::CoordinateUnavailable));
    }

    #[test]
    fn test_zoom_is_recorded_not_applied() {
        let mut mapper = CoordinateMapper::new();
        mapper.set_layout(Some(LayoutBox::new(0.0, 0.0, 1600.0, 2000.0)));
        mapper.set_zoom(2.0);

        assert_eq!(mapper.zoom(), 2.0);
        assert_eq!(mapper.map(100.0, 100.0), Ok(Point::new(100.0, 100.0)));
    }
}
