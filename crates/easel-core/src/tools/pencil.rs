//! Freehand pencil, and the eraser built on it.

use super::{Gesture, ToolContext};
use crate::settings::{Brush, SettingsOverride, ToolSettings};
use crate::simplify::simplify;
use crate::style::Color;
use crate::surface::Surface;
use crate::Path;
use kurbo::{BezPath, Circle, Point, Shape};

/// Where the pencil's stroke colour comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ink {
    /// The configured stroke colour (after the primary/secondary swap).
    Configured,
    /// Always the given colour. The eraser paints with the background.
    Background(Color),
}

/// Freehand stroke tool.
#[derive(Debug, Clone)]
pub struct Pencil {
    pub(crate) settings: ToolSettings,
    gesture: Gesture,
    ink: Ink,
}

impl Pencil {
    pub fn new(overrides: &SettingsOverride) -> Self {
        Self::with_ink(Ink::Configured, overrides)
    }

    /// A pencil that overpaints with `background`.
    pub fn eraser(background: Color, overrides: &SettingsOverride) -> Self {
        Self::with_ink(Ink::Background(background), overrides)
    }

    pub fn with_ink(ink: Ink, overrides: &SettingsOverride) -> Self {
        Self {
            settings: ToolSettings::with_defaults(ToolSettings::default(), overrides),
            gesture: Gesture::Idle,
            ink,
        }
    }

    pub fn ink(&self) -> Ink {
        self.ink
    }

    pub fn settings(&self) -> &ToolSettings {
        &self.settings
    }

    pub fn is_active(&self) -> bool {
        self.gesture.is_active()
    }

    fn brush(&self, settings: &ToolSettings) -> Brush {
        let mut brush = settings.brush();
        if let Ink::Background(color) = self.ink {
            brush.stroke = color;
        }
        brush
    }

    pub fn mouse_down(&mut self, coord: Point) {
        self.gesture.begin(vec![coord], coord);
    }

    /// Extend the stroke and preview just the newest segment.
    pub fn mouse_move<S: Surface>(&mut self, coord: Point, ctx: &mut ToolContext<'_, S>) {
        let brush = self.brush(&self.settings);
        if let Gesture::Dragging { path, last } = &mut self.gesture {
            path.push(coord);

            let mut segment = BezPath::new();
            segment.move_to(*last);
            segment.line_to(coord);
            ctx.draft_surface.set_brush(&brush);
            ctx.draft_surface.stroke(&segment);

            *last = coord;
        }
    }

    pub fn mouse_up<S: Surface>(&mut self, ctx: &mut ToolContext<'_, S>) -> Path {
        match self.gesture.finish() {
            Some(path) => {
                ctx.draft_surface.clear();
                self.draw(&path, &SettingsOverride::default(), ctx.final_surface);
                log::debug!("pencil committed {} points", path.len());
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

    /// Commit `path`: a dot for one point, otherwise a simplified, smoothed stroke.
    pub fn draw<S: Surface>(&self, path: &[Point], overrides: &SettingsOverride, surface: &mut S) {
        let Some(&first) = path.first() else {
            return;
        };
        let settings = self.settings.merged(overrides);
        let mut brush = self.brush(&settings);

        if path.len() == 1 {
            brush.fill = brush.stroke;
            surface.set_brush(&brush);
            let dot = Circle::new(first, settings.line_width / 2.0);
            surface.fill(&dot.to_path(0.1));
        } else {
            surface.set_brush(&brush);
            let simplified = simplify(path, settings.tolerance());
            surface.stroke(&stroke_path(&simplified));
        }
    }
}

/// Build the committed stroke: a straight segment for two points, else
/// quadratic curves through the midpoints of consecutive points.
pub fn stroke_path(points: &[Point]) -> BezPath {
    let mut bez = BezPath::new();
    let Some(&first) = points.first() else {
        return bez;
    };
    bez.move_to(first);

    match points.len() {
        1 => {}
        2 => bez.line_to(points[1]),
        n => {
            for i in 1..n - 2 {
                bez.quad_to(points[i], points[i].midpoint(points[i + 1]));
            }
            bez.quad_to(points[n - 2], points[n - 1]);
        }
    }
    bez
}
