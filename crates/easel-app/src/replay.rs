//! Gesture script replay.
//!
//! A script is a JSON document holding construction options and a list of
//! steps (pointer input, tool changes, settings, programmatic draws). The
//! steps drive an [`Easel`] over [`RecordingSurface`]s and the report lists
//! what the host would have been told plus the final display list.

use easel_core::{
    Brush, Color, ColorTarget, CommittedStroke, DrawOp, Easel, EaselError, EaselOptions,
    MouseButton, PointerEvent, RasterImage, RecordingSurface, Setting, SettingsOverride, ToolKind,
    TouchPhase,
};
use kurbo::{Point, Size, Vec2};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;
use thiserror::Error;

/// Replay errors.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Script parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Easel error: {0}")]
    Easel(#[from] EaselError),
}

/// One scripted action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    Down {
        at: Point,
        #[serde(default)]
        button: MouseButton,
    },
    Move {
        at: Point,
    },
    Up {
        #[serde(default)]
        at: Point,
    },
    Touch {
        phase: TouchPhase,
        at: Point,
    },
    Tool {
        name: String,
    },
    Setting {
        setting: Setting,
    },
    Draw {
        tool: String,
        path: Vec<Point>,
        #[serde(default)]
        settings: SettingsOverride,
    },
    Image {
        image: RasterImage,
        at: Point,
    },
    Resize {
        viewport: Size,
    },
    Clear,
}

/// A replayable session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Script {
    pub options: EaselOptions,
    /// Visible area. Defaults to the surface size.
    pub viewport: Option<Size>,
    pub steps: Vec<Step>,
}

impl Script {
    pub fn from_json(json: &str) -> Result<Self, ReplayError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ReplayError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Run every step and collect the outcome.
    pub fn run(&self) -> Result<ReplayReport, ReplayError> {
        let size = self.options.size();
        let mut easel = Easel::new(
            self.options.clone(),
            RecordingSurface::new(size.width, size.height),
            RecordingSurface::new(size.width, size.height),
            self.viewport.unwrap_or(size),
        )?;

        let strokes = Rc::new(RefCell::new(Vec::new()));
        let picks = Rc::new(RefCell::new(Vec::new()));
        {
            let strokes = Rc::clone(&strokes);
            easel.on_draw(move |stroke| strokes.borrow_mut().push(stroke.clone()));
            let picks = Rc::clone(&picks);
            easel.on_pick(move |target, color| picks.borrow_mut().push(Pick { target, color }));
        }

        for step in &self.steps {
            apply(&mut easel, step);
        }
        log::debug!("Replayed {} steps", self.steps.len());

        let commands = easel
            .final_surface()
            .commands()
            .iter()
            .map(|cmd| CommandSummary::from_op(&cmd.op, cmd.brush))
            .collect();
        Ok(ReplayReport {
            tool: easel.tool(),
            offset: easel.offset(),
            strokes: strokes.take(),
            picks: picks.take(),
            commands,
        })
    }
}

fn apply(easel: &mut Easel<RecordingSurface>, step: &Step) {
    match step {
        Step::Down { at, button } => easel.handle_pointer(PointerEvent::Down {
            position: *at,
            button: *button,
        }),
        Step::Move { at } => easel.handle_pointer(PointerEvent::Move { position: *at }),
        Step::Up { at } => easel.handle_pointer(PointerEvent::Up { position: *at }),
        Step::Touch { phase, at } => easel.handle_touch(*phase, *at),
        Step::Tool { name } => easel.set_tool(name),
        Step::Setting { setting } => easel.set_tool_setting(*setting),
        Step::Draw {
            tool,
            path,
            settings,
        } => easel.draw(tool, path, settings),
        Step::Image { image, at } => easel.draw_image(image, *at),
        Step::Resize { viewport } => {
            easel.set_viewport_size(*viewport);
        }
        Step::Clear => easel.clear(),
    }
}

/// A colour reported by the picker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Pick {
    pub target: ColorTarget,
    pub color: Color,
}

/// One display-list entry of the final surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandSummary {
    /// `stroke`, `fill` or `image`.
    pub op: &'static str,
    /// SVG path data for strokes and fills.
    pub svg: Option<String>,
    pub brush: Brush,
}

impl CommandSummary {
    fn from_op(op: &DrawOp, brush: Brush) -> Self {
        let (op, svg) = match op {
            DrawOp::Stroke(path) => ("stroke", Some(path.to_svg())),
            DrawOp::Fill(path) => ("fill", Some(path.to_svg())),
            DrawOp::Image { .. } => ("image", None),
        };
        Self { op, svg, brush }
    }
}

/// Outcome of a replay.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    /// Tool selected at the end.
    pub tool: ToolKind,
    /// Final pan offset.
    pub offset: Vec2,
    /// Strokes that would have been reported to the host.
    pub strokes: Vec<CommittedStroke>,
    pub picks: Vec<Pick>,
    pub commands: Vec<CommandSummary>,
}

impl ReplayReport {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Load and run the script at `path`.
pub fn replay_file(path: impl AsRef<Path>) -> Result<ReplayReport, ReplayError> {
    Script::load(path)?.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, tempdir};

    const SCRIPT: &str = r##"{
        "options": { "width": 200, "height": 100, "background_color": "#fafafa" },
        "steps": [
            { "action": "setting", "setting": { "name": "stroke_color", "value": "#ff0000" } },
            { "action": "down", "at": { "x": 10.0, "y": 10.0 } },
            { "action": "move", "at": { "x": 20.0, "y": 15.0 } },
            { "action": "move", "at": { "x": 30.0, "y": 30.0 } },
            { "action": "up" },
            { "action": "tool", "name": "rectangle" },
            { "action": "down", "at": { "x": 50.0, "y": 50.0 }, "button": "right" },
            { "action": "move", "at": { "x": 80.0, "y": 70.0 } },
            { "action": "up" },
            { "action": "tool", "name": "colorpicker" },
            { "action": "down", "at": { "x": 60.0, "y": 60.0 } },
            { "action": "up" }
        ]
    }"##;

    fn write_script(json: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_replay_reports_strokes() {
        let file = write_script(SCRIPT);
        let report = replay_file(file.path()).unwrap();

        assert_eq!(report.tool, ToolKind::ColorPicker);
        assert_eq!(report.strokes.len(), 2);
        assert_eq!(report.strokes[0].tool, ToolKind::Pencil);
        assert_eq!(report.strokes[0].path.len(), 3);
        assert_eq!(report.strokes[0].settings.stroke_color, Color::rgb(255, 0, 0));
        assert_eq!(report.strokes[1].tool, ToolKind::Rectangle);
        assert!(!report.strokes[1].settings.primary);
    }

    #[test]
    fn test_replay_display_list() {
        let report = Script::from_json(SCRIPT).unwrap().run().unwrap();
        // Background fill + stroke, pencil stroke, rectangle fill + stroke
        let ops: Vec<&str> = report.commands.iter().map(|c| c.op).collect();
        assert_eq!(ops, vec!["fill", "stroke", "stroke", "fill", "stroke"]);
        assert_eq!(report.commands[0].brush.fill, Color::rgb(0xfa, 0xfa, 0xfa));
        let svg = report.commands[2].svg.as_deref().unwrap();
        assert!(svg.starts_with('M'));
        assert!(svg.contains('Q'));
        // Secondary button swaps: rectangle filled with the stroke colour
        assert_eq!(report.commands[3].brush.fill, Color::rgb(255, 0, 0));
    }

    #[test]
    fn test_replay_picks_from_final_surface() {
        let report = Script::from_json(SCRIPT).unwrap().run().unwrap();
        assert_eq!(
            report.picks,
            vec![Pick {
                target: ColorTarget::Stroke,
                color: Color::rgb(255, 0, 0)
            }]
        );
    }

    #[test]
    fn test_replay_programmatic_draw_is_not_reported() {
        let script = Script::from_json(
            r##"{
                "options": { "width": 50, "height": 50 },
                "steps": [
                    { "action": "draw", "tool": "circle",
                      "path": [{ "x": 25.0, "y": 25.0 }, { "x": 28.0, "y": 29.0 }],
                      "settings": { "fill_color": "#0000ff" } },
                    { "action": "draw", "tool": "lasso", "path": [{ "x": 1.0, "y": 1.0 }] },
                    { "action": "clear" }
                ]
            }"##,
        )
        .unwrap();
        let report = script.run().unwrap();
        assert!(report.strokes.is_empty());
        assert_eq!(report.commands.len(), 6);
        assert_eq!(report.commands[2].brush.fill, Color::rgb(0, 0, 255));
    }

    #[test]
    fn test_replay_pan_and_resize() {
        let script = Script::from_json(
            r#"{
                "options": { "width": 1000, "height": 1000, "tool": "move" },
                "viewport": { "width": 500.0, "height": 500.0 },
                "steps": [
                    { "action": "touch", "phase": "start", "at": { "x": 100.0, "y": 100.0 } },
                    { "action": "touch", "phase": "move", "at": { "x": 900.0, "y": -800.0 } },
                    { "action": "touch", "phase": "end", "at": { "x": 900.0, "y": -800.0 } }
                ]
            }"#,
        )
        .unwrap();
        let report = script.run().unwrap();
        assert!((report.offset.x - 0.0).abs() < f64::EPSILON);
        assert!((report.offset.y + 500.0).abs() < f64::EPSILON);
        assert!(report.strokes.is_empty());
    }

    #[test]
    fn test_replay_missing_file() {
        let dir = tempdir().unwrap();
        let result = replay_file(dir.path().join("missing.json"));
        assert!(matches!(result, Err(ReplayError::Io(_))));
    }

    #[test]
    fn test_replay_bad_json() {
        let file = write_script("{ \"steps\": [ { \"action\": \"jump\" } ] }");
        assert!(matches!(replay_file(file.path()), Err(ReplayError::Parse(_))));
    }

    #[test]
    fn test_replay_invalid_options() {
        let script = Script::from_json(r#"{ "options": { "width": 0 } }"#).unwrap();
        assert!(matches!(
            script.run(),
            Err(ReplayError::Easel(EaselError::InvalidDimensions { .. }))
        ));
    }

    #[test]
    fn test_report_serializes() {
        let report = Script::from_json(SCRIPT).unwrap().run().unwrap();
        let json = report.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["tool"], "colorpicker");
        assert_eq!(value["strokes"][0]["tool"], "pencil");
    }
}
