//! Tool settings: the full per-tool record, partial overrides, and the
//! single-attribute changes the coordinator broadcasts to every tool.

use crate::style::{Color, CompositeOp, LineCap, LineJoin};
use serde::{Deserialize, Serialize};

/// Upper bound of the opacity and smoothness sliders.
pub const PERCENT_MAX: u8 = 100;

/// Complete style/behaviour record owned by one tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    pub stroke_color: Color,
    pub fill_color: Color,
    pub line_width: f64,
    pub line_cap: LineCap,
    pub line_join: LineJoin,
    pub composite: CompositeOp,
    /// 0 (invisible) to 100 (opaque).
    pub opacity: u8,
    /// Simplification tolerance for freehand strokes, 0 to 100.
    pub smoothness: u8,
    /// Primary (left button) vs secondary action. Secondary swaps colours.
    pub primary: bool,
    /// Whether strokes from this tool are reported to the host.
    pub send_updates: bool,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            stroke_color: Color::BLACK,
            fill_color: Color::WHITE,
            line_width: 1.0,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            composite: CompositeOp::SourceOver,
            opacity: PERCENT_MAX,
            smoothness: 80,
            primary: true,
            send_updates: true,
        }
    }
}

impl ToolSettings {
    /// Start from `defaults` and let every field set in `overrides` win.
    pub fn with_defaults(defaults: ToolSettings, overrides: &SettingsOverride) -> Self {
        defaults.merged(overrides)
    }

    /// A copy of these settings with `overrides` applied on top.
    pub fn merged(&self, overrides: &SettingsOverride) -> Self {
        let mut merged = self.clone();
        for setting in overrides.changes() {
            merged.apply(setting);
        }
        merged
    }

    /// Change one attribute. Percentages are clamped to 0..=100 and widths to >= 0.
    pub fn apply(&mut self, setting: Setting) {
        match setting {
            Setting::StrokeColor(c) => self.stroke_color = c,
            Setting::FillColor(c) => self.fill_color = c,
            Setting::LineWidth(w) => self.line_width = w.max(0.0),
            Setting::LineCap(cap) => self.line_cap = cap,
            Setting::LineJoin(join) => self.line_join = join,
            Setting::Composite(op) => self.composite = op,
            Setting::Opacity(o) => self.opacity = o.min(PERCENT_MAX),
            Setting::Smoothness(s) => self.smoothness = s.min(PERCENT_MAX),
            Setting::Primary(p) => self.primary = p,
            Setting::SendUpdates(s) => self.send_updates = s,
        }
    }

    /// Opacity as an alpha fraction.
    pub fn alpha(&self) -> f64 {
        f64::from(self.opacity) / f64::from(PERCENT_MAX)
    }

    /// Smoothness as the simplifier tolerance (0.0 to 1.0).
    pub fn tolerance(&self) -> f64 {
        f64::from(self.smoothness) / f64::from(PERCENT_MAX)
    }

    /// Resolve these settings into the brush a surface paints with.
    pub fn brush(&self) -> Brush {
        let (stroke, fill) = if self.primary {
            (self.stroke_color, self.fill_color)
        } else {
            (self.fill_color, self.stroke_color)
        };
        Brush {
            stroke,
            fill,
            width: self.line_width,
            cap: self.line_cap,
            join: self.line_join,
            alpha: self.alpha(),
            composite: self.composite,
        }
    }
}

/// A partial settings record. `None` fields leave the base value alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsOverride {
    pub stroke_color: Option<Color>,
    pub fill_color: Option<Color>,
    pub line_width: Option<f64>,
    pub line_cap: Option<LineCap>,
    pub line_join: Option<LineJoin>,
    pub composite: Option<CompositeOp>,
    pub opacity: Option<u8>,
    pub smoothness: Option<u8>,
    pub primary: Option<bool>,
    pub send_updates: Option<bool>,
}

impl SettingsOverride {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a single attribute change, replacing any earlier value for it.
    pub fn set(&mut self, setting: Setting) {
        match setting {
            Setting::StrokeColor(c) => self.stroke_color = Some(c),
            Setting::FillColor(c) => self.fill_color = Some(c),
            Setting::LineWidth(w) => self.line_width = Some(w),
            Setting::LineCap(cap) => self.line_cap = Some(cap),
            Setting::LineJoin(join) => self.line_join = Some(join),
            Setting::Composite(op) => self.composite = Some(op),
            Setting::Opacity(o) => self.opacity = Some(o),
            Setting::Smoothness(s) => self.smoothness = Some(s),
            Setting::Primary(p) => self.primary = Some(p),
            Setting::SendUpdates(s) => self.send_updates = Some(s),
        }
    }

    /// Builder form of [`SettingsOverride::set`].
    pub fn with(mut self, setting: Setting) -> Self {
        self.set(setting);
        self
    }

    /// The fields that are set, as individual changes.
    pub fn changes(&self) -> Vec<Setting> {
        let mut out = Vec::new();
        if let Some(c) = self.stroke_color {
            out.push(Setting::StrokeColor(c));
        }
        if let Some(c) = self.fill_color {
            out.push(Setting::FillColor(c));
        }
        if let Some(w) = self.line_width {
            out.push(Setting::LineWidth(w));
        }
        if let Some(cap) = self.line_cap {
            out.push(Setting::LineCap(cap));
        }
        if let Some(join) = self.line_join {
            out.push(Setting::LineJoin(join));
        }
        if let Some(op) = self.composite {
            out.push(Setting::Composite(op));
        }
        if let Some(o) = self.opacity {
            out.push(Setting::Opacity(o));
        }
        if let Some(s) = self.smoothness {
            out.push(Setting::Smoothness(s));
        }
        if let Some(p) = self.primary {
            out.push(Setting::Primary(p));
        }
        if let Some(s) = self.send_updates {
            out.push(Setting::SendUpdates(s));
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.changes().is_empty()
    }
}

impl From<&ToolSettings> for SettingsOverride {
    /// Every field set, so merging reproduces `settings` exactly.
    fn from(settings: &ToolSettings) -> Self {
        Self {
            stroke_color: Some(settings.stroke_color),
            fill_color: Some(settings.fill_color),
            line_width: Some(settings.line_width),
            line_cap: Some(settings.line_cap),
            line_join: Some(settings.line_join),
            composite: Some(settings.composite),
            opacity: Some(settings.opacity),
            smoothness: Some(settings.smoothness),
            primary: Some(settings.primary),
            send_updates: Some(settings.send_updates),
        }
    }
}

/// One attribute change, as broadcast to every tool.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "name", content = "value")]
pub enum Setting {
    StrokeColor(Color),
    FillColor(Color),
    LineWidth(f64),
    LineCap(LineCap),
    LineJoin(LineJoin),
    Composite(CompositeOp),
    Opacity(u8),
    Smoothness(u8),
    Primary(bool),
    SendUpdates(bool),
}

/// Resolved paint state handed to a surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Brush {
    pub stroke: Color,
    pub fill: Color,
    pub width: f64,
    pub cap: LineCap,
    pub join: LineJoin,
    /// 0.0 to 1.0.
    pub alpha: f64,
    pub composite: CompositeOp,
}

impl Default for Brush {
    fn default() -> Self {
        ToolSettings::default().brush()
    }
}
