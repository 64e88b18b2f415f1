//! Colour picker: samples the final surface under the pointer.

use super::{ColorTarget, ToolContext, ToolEvent};
use crate::settings::{SettingsOverride, ToolSettings};
use crate::style::Color;
use crate::surface::Surface;
use crate::Path;
use kurbo::Point;

/// Reports the colour under the pointer instead of drawing.
///
/// A primary pick sets the stroke colour, a secondary pick the fill colour.
#[derive(Debug, Clone)]
pub struct ColorPicker {
    pub(crate) settings: ToolSettings,
    active: bool,
}

impl ColorPicker {
    pub fn new(overrides: &SettingsOverride) -> Self {
        Self {
            settings: ToolSettings::with_defaults(Self::defaults(), overrides),
            active: false,
        }
    }

    /// Picks are never strokes, so they are not reported to the host.
    pub fn defaults() -> ToolSettings {
        ToolSettings {
            send_updates: false,
            ..ToolSettings::default()
        }
    }

    pub fn settings(&self) -> &ToolSettings {
        &self.settings
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn mouse_down<S: Surface>(&mut self, coord: Point, ctx: &mut ToolContext<'_, S>) {
        self.active = true;
        self.pick(coord, ctx);
    }

    pub fn mouse_move<S: Surface>(&mut self, coord: Point, ctx: &mut ToolContext<'_, S>) {
        if self.active {
            self.pick(coord, ctx);
        }
    }

    /// Always empty: the pick was already delivered.
    pub fn mouse_up(&mut self) -> Path {
        self.active = false;
        Vec::new()
    }

    pub fn cancel(&mut self) {
        self.active = false;
    }

    fn pick<S: Surface>(&self, coord: Point, ctx: &mut ToolContext<'_, S>) {
        let sample = ctx.final_surface.sample(coord);
        let target = if self.settings.primary {
            ColorTarget::Stroke
        } else {
            ColorTarget::Fill
        };
        // Alpha is not part of a picked colour
        let color = Color::rgb(sample.r, sample.g, sample.b);
        log::trace!("picked {color} for {target:?} at {coord:?}");
        ctx.events.push(ToolEvent::Picked { target, color });
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::Rig;
    use super::*;
    use crate::settings::Setting;
    use kurbo::{Rect, Shape};

    fn painted_rig() -> Rig {
        let mut rig = Rig::new(100.0, 100.0);
        let brush = crate::settings::Brush {
            fill: Color::rgb(0x12, 0x34, 0x56),
            ..Default::default()
        };
        rig.final_surface.set_brush(&brush);
        rig.final_surface
            .fill(&Rect::new(0.0, 0.0, 50.0, 100.0).to_path(0.1));
        rig
    }

    #[test]
    fn test_primary_pick_targets_stroke() {
        let mut rig = painted_rig();
        let mut picker = ColorPicker::new(&SettingsOverride::default());
        picker.mouse_down(Point::new(10.0, 10.0), &mut rig.ctx());
        assert_eq!(
            rig.events,
            vec![ToolEvent::Picked {
                target: ColorTarget::Stroke,
                color: Color::rgb(0x12, 0x34, 0x56)
            }]
        );
    }

    #[test]
    fn test_secondary_pick_targets_fill() {
        let mut rig = painted_rig();
        let mut picker = ColorPicker::new(&SettingsOverride::new().with(Setting::Primary(false)));
        picker.mouse_down(Point::new(10.0, 10.0), &mut rig.ctx());
        assert!(matches!(
            rig.events[0],
            ToolEvent::Picked {
                target: ColorTarget::Fill,
                ..
            }
        ));
    }

    #[test]
    fn test_drag_keeps_sampling() {
        let mut rig = painted_rig();
        let mut picker = ColorPicker::new(&SettingsOverride::default());
        picker.mouse_down(Point::new(10.0, 10.0), &mut rig.ctx());
        picker.mouse_move(Point::new(80.0, 10.0), &mut rig.ctx());
        assert_eq!(rig.events.len(), 2);
        // Unpainted pixels read as opaque black, like an empty canvas
        assert_eq!(
            rig.events[1],
            ToolEvent::Picked {
                target: ColorTarget::Stroke,
                color: Color::BLACK
            }
        );
        assert!(picker.mouse_up().is_empty());
        picker.mouse_move(Point::new(10.0, 10.0), &mut rig.ctx());
        assert_eq!(rig.events.len(), 2);
    }

    #[test]
    fn test_picker_does_not_send_updates() {
        let picker = ColorPicker::new(&SettingsOverride::default());
        assert!(!picker.settings().send_updates);
        assert!(picker.settings().primary);
    }

    #[test]
    fn test_picker_never_draws() {
        let mut rig = painted_rig();
        let mut picker = ColorPicker::new(&SettingsOverride::default());
        picker.mouse_down(Point::new(10.0, 10.0), &mut rig.ctx());
        picker.mouse_up();
        assert_eq!(rig.final_surface.commands().len(), 1);
        assert!(rig.draft_surface.commands().is_empty());
    }
}
