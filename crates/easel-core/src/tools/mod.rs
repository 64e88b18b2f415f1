//! Tool system for the drawing surface.
//!
//! Every tool follows the same gesture state machine: `mouse_down` starts
//! a gesture, `mouse_move` extends it and previews on the draft surface,
//! and `mouse_up` commits to the final surface and returns the path.

mod pan;
mod pencil;
mod picker;
mod shape;
mod toolbox;

pub use pan::Pan;
pub use pencil::{Ink, Pencil, stroke_path};
pub use picker::ColorPicker;
pub use shape::{ShapeKind, ShapeTool, circle_path, rectangle_path};
pub use toolbox::ToolBox;

use crate::settings::{SettingsOverride, ToolSettings};
use crate::style::Color;
use crate::surface::Surface;
use crate::viewport::Viewport;
use crate::Path;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Available tools, by their registry name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    #[default]
    Pencil,
    Eraser,
    Rectangle,
    Circle,
    ColorPicker,
    Move,
}

impl ToolKind {
    pub const ALL: [ToolKind; 6] = [
        ToolKind::Pencil,
        ToolKind::Eraser,
        ToolKind::Rectangle,
        ToolKind::Circle,
        ToolKind::ColorPicker,
        ToolKind::Move,
    ];

    /// Registry name, as used by the host's tool inputs.
    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Pencil => "pencil",
            ToolKind::Eraser => "eraser",
            ToolKind::Rectangle => "rectangle",
            ToolKind::Circle => "circle",
            ToolKind::ColorPicker => "colorpicker",
            ToolKind::Move => "move",
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a tool name is not registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTool(pub String);

impl FromStr for ToolKind {
    type Err = UnknownTool;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| UnknownTool(s.to_string()))
    }
}

/// Which colour a picked sample should become.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorTarget {
    Stroke,
    Fill,
}

/// Side effects a tool asks the coordinator to carry out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToolEvent {
    Picked { target: ColorTarget, color: Color },
}

/// Everything a tool may touch while handling one event.
pub struct ToolContext<'a, S: Surface> {
    pub final_surface: &'a mut S,
    pub draft_surface: &'a mut S,
    pub viewport: &'a mut Viewport,
    pub events: &'a mut Vec<ToolEvent>,
}

/// State of a gesture.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Gesture {
    /// Waiting for a `mouse_down`.
    #[default]
    Idle,
    /// Between `mouse_down` and `mouse_up`.
    Dragging {
        /// Points accumulated so far, in sample order.
        path: Path,
        /// Last coordinate handed to the tool.
        last: Point,
    },
}

impl Gesture {
    /// Start a gesture with `path`, remembering `coord` as the last point.
    pub fn begin(&mut self, path: Path, coord: Point) {
        *self = Gesture::Dragging { path, last: coord };
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Gesture::Dragging { .. })
    }

    pub fn path(&self) -> Option<&[Point]> {
        match self {
            Gesture::Dragging { path, .. } => Some(path),
            Gesture::Idle => None,
        }
    }

    /// Append a point. No-op while idle.
    pub fn push(&mut self, coord: Point) {
        if let Gesture::Dragging { path, .. } = self {
            path.push(coord);
        }
    }

    /// Go back to idle, handing out the accumulated path.
    pub fn finish(&mut self) -> Option<Path> {
        match std::mem::take(self) {
            Gesture::Dragging { path, .. } => Some(path),
            Gesture::Idle => None,
        }
    }
}

/// Apply `settings` to a surface's brush.
pub(crate) fn reset_brush<S: Surface>(surface: &mut S, settings: &ToolSettings) {
    surface.set_brush(&settings.brush());
}

/// A tool instance.
#[derive(Debug, Clone)]
pub enum Tool {
    Pencil(Pencil),
    Shape(ShapeTool),
    ColorPicker(ColorPicker),
    Pan(Pan),
}

impl Tool {
    /// Build the tool registered under `kind`.
    pub fn for_kind(kind: ToolKind, background: Color, overrides: &SettingsOverride) -> Self {
        match kind {
            ToolKind::Pencil => Tool::Pencil(Pencil::new(overrides)),
            ToolKind::Eraser => Tool::Pencil(Pencil::eraser(background, overrides)),
            ToolKind::Rectangle => Tool::Shape(ShapeTool::new(ShapeKind::Rectangle, overrides)),
            ToolKind::Circle => Tool::Shape(ShapeTool::new(ShapeKind::Circle, overrides)),
            ToolKind::ColorPicker => Tool::ColorPicker(ColorPicker::new(overrides)),
            ToolKind::Move => Tool::Pan(Pan::new()),
        }
    }

    pub fn mouse_down<S: Surface>(&mut self, coord: Point, ctx: &mut ToolContext<'_, S>) {
        match self {
            Tool::Pencil(t) => t.mouse_down(coord),
            Tool::Shape(t) => t.mouse_down(coord),
            Tool::ColorPicker(t) => t.mouse_down(coord, ctx),
            Tool::Pan(t) => t.mouse_down(coord),
        }
    }

    pub fn mouse_move<S: Surface>(&mut self, coord: Point, ctx: &mut ToolContext<'_, S>) {
        match self {
            Tool::Pencil(t) => t.mouse_move(coord, ctx),
            Tool::Shape(t) => t.mouse_move(coord, ctx),
            Tool::ColorPicker(t) => t.mouse_move(coord, ctx),
            Tool::Pan(t) => t.mouse_move(coord, ctx),
        }
    }

    /// End the gesture. Returns the committed path, or an empty path when
    /// nothing was drawn.
    pub fn mouse_up<S: Surface>(&mut self, ctx: &mut ToolContext<'_, S>) -> Path {
        match self {
            Tool::Pencil(t) => t.mouse_up(ctx),
            Tool::Shape(t) => t.mouse_up(ctx),
            Tool::ColorPicker(t) => t.mouse_up(),
            Tool::Pan(t) => t.mouse_up(),
        }
    }

    /// Abandon the gesture without committing anything.
    pub fn cancel<S: Surface>(&mut self, ctx: &mut ToolContext<'_, S>) {
        match self {
            Tool::Pencil(t) => t.cancel(ctx),
            Tool::Shape(t) => t.cancel(ctx),
            Tool::ColorPicker(t) => t.cancel(),
            Tool::Pan(t) => t.cancel(),
        }
    }

    /// Render `path` onto `surface` with this tool's settings merged with `overrides`.
    pub fn draw<S: Surface>(&self, path: &[Point], overrides: &SettingsOverride, surface: &mut S) {
        match self {
            Tool::Pencil(t) => t.draw(path, overrides, surface),
            Tool::Shape(t) => t.draw(path, overrides, surface),
            Tool::ColorPicker(_) | Tool::Pan(_) => {}
        }
    }

    pub fn is_active(&self) -> bool {
        match self {
            Tool::Pencil(t) => t.is_active(),
            Tool::Shape(t) => t.is_active(),
            Tool::ColorPicker(t) => t.is_active(),
            Tool::Pan(t) => t.is_active(),
        }
    }

    /// Settings record, or `None` for tools that do not draw.
    pub fn settings(&self) -> Option<&ToolSettings> {
        match self {
            Tool::Pencil(t) => Some(&t.settings),
            Tool::Shape(t) => Some(&t.settings),
            Tool::ColorPicker(t) => Some(&t.settings),
            Tool::Pan(_) => None,
        }
    }

    pub fn settings_mut(&mut self) -> Option<&mut ToolSettings> {
        match self {
            Tool::Pencil(t) => Some(&mut t.settings),
            Tool::Shape(t) => Some(&mut t.settings),
            Tool::ColorPicker(t) => Some(&mut t.settings),
            Tool::Pan(_) => None,
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::surface::RecordingSurface;
    use kurbo::Size;

    /// Surfaces and viewport for exercising tools directly.
    pub struct Rig {
        pub final_surface: RecordingSurface,
        pub draft_surface: RecordingSurface,
        pub viewport: Viewport,
        pub events: Vec<ToolEvent>,
    }

    impl Rig {
        pub fn new(width: f64, height: f64) -> Self {
            Self {
                final_surface: RecordingSurface::new(width, height),
                draft_surface: RecordingSurface::new(width, height),
                viewport: Viewport::new(Size::new(width, height), Size::new(width, height)),
                events: Vec::new(),
            }
        }

        pub fn ctx(&mut self) -> ToolContext<'_, RecordingSurface> {
            ToolContext {
                final_surface: &mut self.final_surface,
                draft_surface: &mut self.draft_surface,
                viewport: &mut self.viewport,
                events: &mut self.events,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::Rig;
    use super::*;

    fn all_tools() -> Vec<Tool> {
        ToolKind::ALL
            .into_iter()
            .map(|kind| Tool::for_kind(kind, Color::WHITE, &SettingsOverride::default()))
            .collect()
    }

    #[test]
    fn test_kind_names_roundtrip() {
        for kind in ToolKind::ALL {
            assert_eq!(kind.name().parse::<ToolKind>(), Ok(kind));
        }
        assert!("lasso".parse::<ToolKind>().is_err());
    }

    #[test]
    fn test_mouse_up_while_idle_is_noop() {
        for mut tool in all_tools() {
            let mut rig = Rig::new(50.0, 50.0);
            let path = tool.mouse_up(&mut rig.ctx());
            assert!(path.is_empty());
            assert!(rig.final_surface.commands().is_empty());
            assert!(rig.draft_surface.commands().is_empty());
            assert_eq!(rig.draft_surface.clear_count(), 0);
            assert!(!tool.is_active());
        }
    }

    #[test]
    fn test_mouse_move_while_idle_is_noop() {
        for mut tool in all_tools() {
            let mut rig = Rig::new(50.0, 50.0);
            let before = rig.viewport.offset();
            tool.mouse_move(Point::new(5.0, 5.0), &mut rig.ctx());
            assert!(rig.draft_surface.commands().is_empty());
            assert!(rig.events.is_empty());
            assert_eq!(rig.viewport.offset(), before);
        }
    }

    #[test]
    fn test_active_only_during_gesture() {
        for mut tool in all_tools() {
            let mut rig = Rig::new(50.0, 50.0);
            assert!(!tool.is_active());
            tool.mouse_down(Point::new(1.0, 1.0), &mut rig.ctx());
            assert!(tool.is_active());
            tool.mouse_move(Point::new(2.0, 2.0), &mut rig.ctx());
            assert!(tool.is_active());
            tool.mouse_up(&mut rig.ctx());
            assert!(!tool.is_active());
        }
    }

    #[test]
    fn test_cancel_commits_nothing() {
        for mut tool in all_tools() {
            let mut rig = Rig::new(50.0, 50.0);
            tool.mouse_down(Point::new(1.0, 1.0), &mut rig.ctx());
            tool.mouse_move(Point::new(9.0, 9.0), &mut rig.ctx());
            tool.cancel(&mut rig.ctx());
            assert!(!tool.is_active());
            assert!(rig.final_surface.commands().is_empty());
            assert!(tool.mouse_up(&mut rig.ctx()).is_empty());
        }
    }

    #[test]
    fn test_pan_has_no_settings() {
        let tool = Tool::for_kind(ToolKind::Move, Color::WHITE, &SettingsOverride::default());
        assert!(tool.settings().is_none());
    }

    #[test]
    fn test_gesture_finish_resets() {
        let mut gesture = Gesture::default();
        gesture.push(Point::new(1.0, 1.0));
        assert!(gesture.path().is_none());
        gesture.begin(vec![Point::ZERO], Point::ZERO);
        gesture.push(Point::new(1.0, 1.0));
        assert_eq!(gesture.path().map(<[Point]>::len), Some(2));
        assert_eq!(gesture.finish().map(|p| p.len()), Some(2));
        assert_eq!(gesture, Gesture::Idle);
        assert!(gesture.finish().is_none());
    }
}
