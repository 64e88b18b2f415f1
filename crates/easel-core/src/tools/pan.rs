//! Pan ("move") tool: drags both surfaces inside the viewport.

use super::ToolContext;
use crate::surface::Surface;
use crate::Path;
use kurbo::Point;

/// Moves the surfaces instead of drawing on them.
#[derive(Debug, Clone, Default)]
pub struct Pan {
    /// Surface coordinate grabbed on `mouse_down`.
    anchor: Option<Point>,
}

impl Pan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.anchor.is_some()
    }

    pub fn mouse_down(&mut self, coord: Point) {
        self.anchor = Some(coord);
    }

    /// Shift the offset so the anchor stays under the pointer.
    ///
    /// `coord` is resolved against the current offset, so `coord - anchor`
    /// is exactly how far the pointer moved since the last pan step.
    pub fn mouse_move<S: Surface>(&mut self, coord: Point, ctx: &mut ToolContext<'_, S>) {
        if let Some(anchor) = self.anchor {
            let offset = ctx.viewport.pan(coord - anchor);
            log::trace!("pan offset now {offset:?}");
        }
    }

    pub fn mouse_up(&mut self) -> Path {
        self.anchor = None;
        Vec::new()
    }

    pub fn cancel(&mut self) {
        self.anchor = None;
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::Rig;
    use super::*;
    use crate::viewport::Viewport;
    use kurbo::{Size, Vec2};

    #[test]
    fn test_pan_follows_pointer() {
        let mut rig = Rig::new(100.0, 100.0);
        rig.viewport = Viewport::new(Size::new(100.0, 100.0), Size::new(400.0, 400.0));
        let start = rig.viewport.offset();

        // Pointer at viewport (200, 200) grabs surface point (50, 50)
        let mut pan = Pan::new();
        let grab = rig.viewport.to_surface(Point::new(200.0, 200.0));
        pan.mouse_down(grab);

        // Pointer moves to viewport (230, 190)
        let coord = rig.viewport.to_surface(Point::new(230.0, 190.0));
        pan.mouse_move(coord, &mut rig.ctx());
        assert_eq!(rig.viewport.offset(), start + Vec2::new(30.0, -10.0));

        // The grabbed point is still under the pointer
        assert_eq!(rig.viewport.to_surface(Point::new(230.0, 190.0)), grab);

        // A second move resolves against the new offset
        let coord = rig.viewport.to_surface(Point::new(240.0, 190.0));
        pan.mouse_move(coord, &mut rig.ctx());
        assert_eq!(rig.viewport.offset(), start + Vec2::new(40.0, -10.0));

        assert!(pan.mouse_up().is_empty());
        assert!(!pan.is_active());
    }

    #[test]
    fn test_pan_is_clamped() {
        let mut rig = Rig::new(1000.0, 1000.0);
        rig.viewport = Viewport::new(Size::new(1000.0, 1000.0), Size::new(500.0, 500.0));
        let mut pan = Pan::new();
        pan.mouse_down(Point::new(0.0, 0.0));
        pan.mouse_move(Point::new(5000.0, -5000.0), &mut rig.ctx());
        assert_eq!(rig.viewport.offset(), Vec2::new(0.0, -500.0));
    }
}
