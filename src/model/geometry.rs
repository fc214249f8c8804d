use serde::{Deserialize, Serialize};

/// A point in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle with a top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[inline]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Builds a rectangle from any two opposite corners.
    pub fn from_corners(a: Point, b: Point) -> Self {
        let x = a.x.min(b.x);
        let y = a.y.min(b.y);
        Self {
            x,
            y,
            width: a.x.max(b.x) - x,
            height: a.y.max(b.y) - y,
        }
    }

    /// Area, with negative extents treated as empty.
    #[inline]
    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Area shared with `other` (zero when disjoint or merely touching).
    pub fn intersection_area(&self, other: &Rect) -> f64 {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = (self.x + self.width.max(0.0)).min(other.x + other.width.max(0.0));
        let bottom = (self.y + self.height.max(0.0)).min(other.y + other.height.max(0.0));

        (right - left).max(0.0) * (bottom - top).max(0.0)
    }
}

/// A user-drawn box in rendered (on-screen) pixel space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawnBox {
    pub start: Point,
    pub end: Point,
    #[serde(default)]
    pub label: String,
}

impl DrawnBox {
    pub fn new(start: Point, end: Point, label: impl Into<String>) -> Self {
        Self {
            start,
            end,
            label: label.into(),
        }
    }

    /// Convenience constructor from a top-left corner and a size.
    pub fn from_rect(x: f64, y: f64, width: f64, height: f64, label: impl Into<String>) -> Self {
        Self::new(Point::new(x, y), Point::new(x + width, y + height), label)
    }

    /// The normalised rectangle, still in rendered space.
    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::from_corners(self.start, self.end)
    }
}

/// A box predicted by a model, in original-image pixel space.
///
/// `(x, y)` is the top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictedBox {
    pub class: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub confidence: f64,
}

impl PredictedBox {
    pub fn new(
        class: impl Into<String>,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        confidence: f64,
    ) -> Self {
        Self {
            class: class.into(),
            x,
            y,
            width,
            height,
            confidence,
        }
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// How the image is displayed: rendered size plus the offset of its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageFrame {
    pub rendered_width: f64,
    pub rendered_height: f64,
    #[serde(default)]
    pub offset_x: f64,
    #[serde(default)]
    pub offset_y: f64,
}

impl ImageFrame {
    pub fn new(rendered_width: f64, rendered_height: f64) -> Self {
        Self {
            rendered_width,
            rendered_height,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }

    pub fn with_offset(mut self, offset_x: f64, offset_y: f64) -> Self {
        self.offset_x = offset_x;
        self.offset_y = offset_y;
        self
    }

    /// Resolves the rendered→original transform for an image of the given native size.
    ///
    /// A non-positive rendered extent keeps a scale of `1.0` on that axis.
    pub fn transform_for(&self, original_width: f64, original_height: f64) -> FrameTransform {
        let scale = |original: f64, rendered: f64| {
            if rendered > 0.0 && original > 0.0 {
                original / rendered
            } else {
                1.0
            }
        };

        FrameTransform {
            scale_x: scale(original_width, self.rendered_width),
            scale_y: scale(original_height, self.rendered_height),
            offset_x: self.offset_x,
            offset_y: self.offset_y,
        }
    }
}

/// Resolved mapping `original = (rendered - offset) * scale`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTransform {
    pub scale_x: f64,
    pub scale_y: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Default for FrameTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl FrameTransform {
    pub fn new(scale_x: f64, scale_y: f64, offset_x: f64, offset_y: f64) -> Self {
        Self {
            scale_x,
            scale_y,
            offset_x,
            offset_y,
        }
    }

    pub fn identity() -> Self {
        Self::new(1.0, 1.0, 0.0, 0.0)
    }

    #[inline]
    pub fn to_original(&self, p: Point) -> Point {
        Point::new(
            (p.x - self.offset_x) * self.scale_x,
            (p.y - self.offset_y) * self.scale_y,
        )
    }

    /// Maps a drawn box into original-image space.
    pub fn map_drawn(&self, drawn: &DrawnBox) -> Rect {
        Rect::from_corners(self.to_original(drawn.start), self.to_original(drawn.end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_from_corners_any_direction() {
        let r = Rect::from_corners(Point::new(100.0, 80.0), Point::new(20.0, 10.0));
        assert_eq!(r, Rect::new(20.0, 10.0, 80.0, 70.0));
        assert_eq!(r.area(), 5600.0);
    }

    #[test]
    fn test_intersection_partial_disjoint_touching() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert_eq!(a.intersection_area(&Rect::new(50.0, 50.0, 100.0, 100.0)), 2500.0);
        assert_eq!(a.intersection_area(&Rect::new(200.0, 0.0, 10.0, 10.0)), 0.0);
        assert_eq!(a.intersection_area(&Rect::new(100.0, 0.0, 10.0, 10.0)), 0.0);
        assert_eq!(a.intersection_area(&Rect::new(10.0, 10.0, 5.0, 5.0)), 25.0);
    }

    #[test]
    fn test_negative_extent_is_empty() {
        let r = Rect::new(0.0, 0.0, -10.0, 10.0);
        assert_eq!(r.area(), 0.0);
        assert_eq!(r.intersection_area(&Rect::new(-20.0, 0.0, 40.0, 40.0)), 0.0);
    }

    #[test]
    fn test_frame_transform_for_scaled_display() {
        let frame = ImageFrame::new(400.0, 300.0).with_offset(10.0, 20.0);
        let t = frame.transform_for(800.0, 600.0);

        assert_eq!(t.scale_x, 2.0);
        assert_eq!(t.scale_y, 2.0);
        assert_eq!(t.to_original(Point::new(10.0, 20.0)), Point::new(0.0, 0.0));
        assert_eq!(t.to_original(Point::new(60.0, 70.0)), Point::new(100.0, 100.0));
    }

    #[test]
    fn test_frame_transform_degenerate_rendered_size() {
        let t = ImageFrame::new(0.0, 300.0).transform_for(800.0, 600.0);
        assert_eq!(t.scale_x, 1.0);
        assert_eq!(t.scale_y, 2.0);
    }

    #[test]
    fn test_map_drawn_normalises_drag_direction() {
        let t = FrameTransform::new(2.0, 2.0, 0.0, 0.0);
        let drawn = DrawnBox::new(Point::new(50.0, 50.0), Point::new(0.0, 0.0), "cat");
        assert_eq!(t.map_drawn(&drawn), Rect::new(0.0, 0.0, 100.0, 100.0));
    }

    #[test]
    fn test_image_frame_serde_camel_case() {
        let frame: ImageFrame =
            serde_json::from_str(r#"{"renderedWidth":640,"renderedHeight":480}"#).unwrap();
        assert_eq!(frame, ImageFrame::new(640.0, 480.0));
    }
}
