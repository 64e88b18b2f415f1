//! Pan offset between the visible viewport and the drawing surfaces.

use kurbo::{Point, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Tracks where the surfaces sit inside the visible viewport.
///
/// The offset is the position of the surface's top-left corner in
/// viewport coordinates. On an axis where the surface is larger than the
/// viewport it is clamped so no blank area can be scrolled into view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    offset: Vec2,
    surface: Size,
    visible: Size,
}

impl Viewport {
    /// Create a viewport with the surface centred, then clamped.
    pub fn new(surface: Size, visible: Size) -> Self {
        let mut viewport = Self {
            offset: Vec2::ZERO,
            surface,
            visible,
        };
        viewport.center();
        viewport
    }

    /// Current (clamped) offset.
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn surface_size(&self) -> Size {
        self.surface
    }

    pub fn visible_size(&self) -> Size {
        self.visible
    }

    /// Set the offset, clamping it per axis. Returns the applied offset.
    pub fn set_offset(&mut self, offset: Vec2) -> Vec2 {
        self.offset = Vec2::new(
            clamp_axis(offset.x, self.surface.width, self.visible.width),
            clamp_axis(offset.y, self.surface.height, self.visible.height),
        );
        self.offset
    }

    /// Shift the offset by `delta`.
    pub fn pan(&mut self, delta: Vec2) -> Vec2 {
        self.set_offset(self.offset + delta)
    }

    /// Centre the surface in the visible area.
    pub fn center(&mut self) -> Vec2 {
        self.set_offset(Vec2::new(
            (self.visible.width - self.surface.width) / 2.0,
            (self.visible.height - self.surface.height) / 2.0,
        ))
    }

    /// The visible area changed size; re-clamp the current offset.
    pub fn resize(&mut self, visible: Size) -> Vec2 {
        self.visible = visible;
        self.set_offset(self.offset)
    }

    /// Convert a viewport-local position to surface coordinates.
    pub fn to_surface(&self, position: Point) -> Point {
        position - self.offset
    }

    /// Convert a surface position to viewport-local coordinates.
    pub fn to_visible(&self, position: Point) -> Point {
        position + self.offset
    }
}

/// Clamp one axis to `[visible - surface, 0]` when the surface overflows.
fn clamp_axis(value: f64, surface: f64, visible: f64) -> f64 {
    if surface > visible {
        value.clamp(visible - surface, 0.0)
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_when_surface_smaller() {
        let vp = Viewport::new(Size::new(200.0, 100.0), Size::new(400.0, 300.0));
        assert!((vp.offset().x - 100.0).abs() < f64::EPSILON);
        assert!((vp.offset().y - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_small_surface_is_unclamped() {
        let mut vp = Viewport::new(Size::new(200.0, 100.0), Size::new(400.0, 300.0));
        vp.set_offset(Vec2::new(-1000.0, 5000.0));
        assert!((vp.offset().x + 1000.0).abs() < f64::EPSILON);
        assert!((vp.offset().y - 5000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_large_surface_stays_within_bounds() {
        let mut vp = Viewport::new(Size::new(1000.0, 1000.0), Size::new(500.0, 500.0));
        let deltas = [
            Vec2::new(700.0, -20.0),
            Vec2::new(-1300.0, 60.0),
            Vec2::new(250.0, -999.0),
            Vec2::new(-3.5, 2000.0),
            Vec2::new(-600.0, -600.0),
        ];
        for delta in deltas {
            let offset = vp.pan(delta);
            assert!(offset.x <= 0.0 && offset.x >= -500.0);
            assert!(offset.y <= 0.0 && offset.y >= -500.0);
        }
    }

    #[test]
    fn test_mixed_axes() {
        let mut vp = Viewport::new(Size::new(1000.0, 100.0), Size::new(500.0, 500.0));
        vp.set_offset(Vec2::new(50.0, 450.0));
        assert!(vp.offset().x.abs() < f64::EPSILON);
        assert!((vp.offset().y - 450.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_resize_reclamps() {
        let mut vp = Viewport::new(Size::new(1000.0, 1000.0), Size::new(500.0, 500.0));
        vp.set_offset(Vec2::new(-500.0, -500.0));
        vp.resize(Size::new(800.0, 800.0));
        assert!((vp.offset().x + 200.0).abs() < f64::EPSILON);
        assert!((vp.offset().y + 200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_coordinate_roundtrip() {
        let mut vp = Viewport::new(Size::new(100.0, 100.0), Size::new(300.0, 300.0));
        vp.set_offset(Vec2::new(30.0, -20.0));
        let surface = vp.to_surface(Point::new(50.0, 50.0));
        assert!((surface.x - 20.0).abs() < f64::EPSILON);
        assert!((surface.y - 70.0).abs() < f64::EPSILON);
        let back = vp.to_visible(surface);
        assert!((back.x - 50.0).abs() < f64::EPSILON);
        assert!((back.y - 50.0).abs() < f64::EPSILON);
    }
}
