//! Two-point drag tools: rectangle and circle.

use super::{Gesture, ToolContext, reset_brush};
use crate::settings::{SettingsOverride, ToolSettings};
use crate::style::{Color, LineCap, LineJoin};
use crate::surface::Surface;
use crate::Path;
use kurbo::{BezPath, Circle, Point, Rect, Shape};

/// Geometry produced from the anchor and the drag point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    /// Axis-aligned rectangle spanning both corners.
    Rectangle,
    /// Circle centred on the anchor, passing through the drag point.
    Circle,
}

impl ShapeKind {
    /// Default settings for this shape.
    pub fn defaults(self) -> ToolSettings {
        match self {
            ShapeKind::Rectangle => ToolSettings {
                stroke_color: Color::BLACK,
                fill_color: Color::WHITE,
                line_width: 1.0,
                line_cap: LineCap::Butt,
                line_join: LineJoin::Miter,
                ..ToolSettings::default()
            },
            ShapeKind::Circle => ToolSettings::default(),
        }
    }

    /// Outline for an anchor and a drag point.
    pub fn outline(self, anchor: Point, end: Point) -> BezPath {
        match self {
            ShapeKind::Rectangle => rectangle_path(anchor, end),
            ShapeKind::Circle => circle_path(anchor, end),
        }
    }
}

/// Rectangle spanning two corners, normalized per axis.
pub fn rectangle_path(a: Point, b: Point) -> BezPath {
    Rect::new(a.x.min(b.x), a.y.min(b.y), a.x.max(b.x), a.y.max(b.y)).to_path(0.1)
}

/// Circle centred at `center` whose radius is the distance to `edge`.
pub fn circle_path(center: Point, edge: Point) -> BezPath {
    Circle::new(center, center.distance(edge)).to_path(0.1)
}

/// A filled-and-stroked shape dragged out from an anchor.
#[derive(Debug, Clone)]
pub struct ShapeTool {
    kind: ShapeKind,
    pub(crate) settings: ToolSettings,
    gesture: Gesture,
}

impl ShapeTool {
    pub fn new(kind: ShapeKind, overrides: &SettingsOverride) -> Self {
        Self {
            kind,
            settings: ToolSettings::with_defaults(kind.defaults(), overrides),
            gesture: Gesture::Idle,
        }
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    pub fn settings(&self) -> &ToolSettings {
        &self.settings
    }

    pub fn is_active(&self) -> bool {
        self.gesture.is_active()
    }

    /// Start a two-point path anchored at `coord`.
    pub fn mouse_down(&mut self, coord: Point) {
        self.gesture.begin(vec![coord, coord], coord);
    }

    /// Move the second corner and redraw the whole preview.
    pub fn mouse_move<S: Surface>(&mut self, coord: Point, ctx: &mut ToolContext<'_, S>) {
        if let Gesture::Dragging { path, last } = &mut self.gesture {
            path[1] = coord;
            *last = coord;

            reset_brush(ctx.draft_surface, &self.settings);
            ctx.draft_surface.clear();
            paint(ctx.draft_surface, &self.kind.outline(path[0], path[1]));
        }
    }

    pub fn mouse_up<S: Surface>(&mut self, ctx: &mut ToolContext<'_, S>) -> Path {
        match self.gesture.finish() {
            Some(path) => {
                ctx.draft_surface.clear();
                self.draw(&path, &SettingsOverride::default(), ctx.final_surface);
                log::debug!("{:?} committed", self.kind);
                path
            }
            None => Vec::new(),
        }
    }

    pub fn cancel<S: Surface>(&mut self, ctx: &mut ToolContext<'_, S>) {
        if self.gesture.finish().is_some() {
            ctx.draft_surface.clear();
        }
    }

    /// Commit the shape described by the first two points of `path`. A
    /// single point is treated as a zero-size shape at that point.
    pub fn draw<S: Surface>(&self, path: &[Point], overrides: &SettingsOverride, surface: &mut S) {
        let (anchor, end) = match path {
            [] => return,
            [only] => (*only, *only),
            [anchor, end, ..] => (*anchor, *end),
        };
        reset_brush(surface, &self.settings.merged(overrides));
        paint(surface, &self.kind.outline(anchor, end));
    }
}

/// Fill then stroke, so the outline sits on top.
fn paint<S: Surface>(surface: &mut S, outline: &BezPath) {
    surface.fill(outline);
    surface.stroke(outline);
}
