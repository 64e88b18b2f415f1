//! The coordinator: owns both surfaces, the viewport and the tool set,
//! and routes pointer input to the selected tool.

use crate::Path;
use crate::error::{EaselError, EaselResult};
use crate::input::{MouseButton, PointerEvent, TouchPhase};
use crate::options::EaselOptions;
use crate::settings::{Setting, SettingsOverride, ToolSettings};
use crate::style::{Color, CompositeOp};
use crate::surface::Surface;
use crate::tools::{ColorTarget, Tool, ToolBox, ToolContext, ToolEvent, ToolKind};
use crate::viewport::Viewport;
use kurbo::{Point, Size, Vec2};
use serde::{Deserialize, Serialize};

/// A path committed through pointer input, as reported to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommittedStroke {
    pub tool: ToolKind,
    pub path: Path,
    pub settings: ToolSettings,
}

impl CommittedStroke {
    /// Overrides that reproduce this stroke through [`Easel::draw`].
    pub fn overrides(&self) -> SettingsOverride {
        SettingsOverride::from(&self.settings)
    }
}

type MoveCallback = Box<dyn FnMut(Point)>;
type DrawCallback = Box<dyn FnMut(&CommittedStroke)>;
type PickCallback = Box<dyn FnMut(ColorTarget, Color)>;

#[derive(Default)]
struct Callbacks {
    on_mouse_move: Option<MoveCallback>,
    on_draw: Option<DrawCallback>,
    on_pick: Option<PickCallback>,
}

/// Drawing surface coordinator.
pub struct Easel<S: Surface> {
    options: EaselOptions,
    final_surface: S,
    draft_surface: S,
    viewport: Viewport,
    tools: ToolBox,
    current: ToolKind,
    /// Set between pointer down and pointer up.
    drawing: bool,
    callbacks: Callbacks,
}

impl<S: Surface> Easel<S> {
    /// Build a coordinator over two surfaces of `options.width` x `options.height`,
    /// shown through a viewport of `viewport_size`.
    pub fn new(
        options: EaselOptions,
        final_surface: S,
        draft_surface: S,
        viewport_size: Size,
    ) -> EaselResult<Self> {
        let current = options.validate()?;
        let expected = options.size();
        for actual in [final_surface.size(), draft_surface.size()] {
            if actual != expected {
                return Err(EaselError::SurfaceMismatch { expected, actual });
            }
        }

        let mut easel = Self {
            tools: ToolBox::new(options.background_color),
            viewport: Viewport::new(expected, viewport_size),
            final_surface,
            draft_surface,
            current,
            drawing: false,
            callbacks: Callbacks::default(),
            options,
        };
        easel.clear();
        log::info!(
            "Easel ready: {}x{}, tool {}",
            easel.options.width,
            easel.options.height,
            easel.current
        );
        Ok(easel)
    }

    pub fn options(&self) -> &EaselOptions {
        &self.options
    }

    pub fn background_color(&self) -> Color {
        self.options.background_color
    }

    /// Called with the surface coordinate of every pointer move.
    pub fn on_mouse_move(&mut self, callback: impl FnMut(Point) + 'static) {
        self.callbacks.on_mouse_move = Some(Box::new(callback));
    }

    /// Called after a gesture commits a non-empty path.
    pub fn on_draw(&mut self, callback: impl FnMut(&CommittedStroke) + 'static) {
        self.callbacks.on_draw = Some(Box::new(callback));
    }

    /// Called when the colour picker samples a colour.
    pub fn on_pick(&mut self, callback: impl FnMut(ColorTarget, Color) + 'static) {
        self.callbacks.on_pick = Some(Box::new(callback));
    }

    // --- Input ---

    pub fn handle_pointer(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down { position, button } => self.pointer_down(position, button),
            PointerEvent::Move { position } => self.pointer_move(position),
            PointerEvent::Up { .. } => self.pointer_up(),
        }
    }

    /// Route a touch through the pointer path. Touches act as the left button.
    pub fn handle_touch(&mut self, phase: TouchPhase, position: Point) {
        self.handle_pointer(PointerEvent::from_touch(phase, position));
    }

    /// `position` is viewport-local.
    pub fn pointer_down(&mut self, position: Point, button: MouseButton) {
        let coord = self.viewport.to_surface(position);
        log::trace!("pointer down at {coord:?} ({button:?})");
        self.drawing = true;
        self.tools.broadcast(Setting::Primary(button.is_primary()));
        self.dispatch(|tool, ctx| tool.mouse_down(coord, ctx));
    }

    pub fn pointer_move(&mut self, position: Point) {
        let coord = self.viewport.to_surface(position);
        if self.drawing {
            self.dispatch(|tool, ctx| tool.mouse_move(coord, ctx));
        }
        if let Some(callback) = self.callbacks.on_mouse_move.as_mut() {
            callback(coord);
        }
    }

    pub fn pointer_up(&mut self) {
        if !self.drawing {
            return;
        }
        self.drawing = false;
        let path = self
            .dispatch(|tool, ctx| tool.mouse_up(ctx))
            .unwrap_or_default();
        if path.is_empty() {
            return;
        }

        let Some(settings) = self.tools.settings(self.current) else {
            return;
        };
        if !settings.send_updates {
            return;
        }
        let stroke = CommittedStroke {
            tool: self.current,
            path,
            settings,
        };
        log::debug!("{} committed {} points", stroke.tool, stroke.path.len());
        if let Some(callback) = self.callbacks.on_draw.as_mut() {
            callback(&stroke);
        }
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    /// Run `f` on the active tool with a fresh context, then act on the
    /// events it raised.
    fn dispatch<R>(&mut self, f: impl FnOnce(&mut Tool, &mut ToolContext<'_, S>) -> R) -> Option<R> {
        let tool = self.tools.get_mut(self.current)?;
        let mut events = Vec::new();
        let mut ctx = ToolContext {
            final_surface: &mut self.final_surface,
            draft_surface: &mut self.draft_surface,
            viewport: &mut self.viewport,
            events: &mut events,
        };
        let out = f(tool, &mut ctx);
        for event in events {
            self.handle_event(event);
        }
        Some(out)
    }

    fn handle_event(&mut self, event: ToolEvent) {
        match event {
            ToolEvent::Picked { target, color } => {
                let setting = match target {
                    ColorTarget::Stroke => Setting::StrokeColor(color),
                    ColorTarget::Fill => Setting::FillColor(color),
                };
                self.tools.broadcast(setting);
                if let Some(callback) = self.callbacks.on_pick.as_mut() {
                    callback(target, color);
                }
            }
        }
    }

    // --- Tools ---

    pub fn tool(&self) -> ToolKind {
        self.current
    }

    /// Select a tool by registry name. Unknown names are ignored.
    pub fn set_tool(&mut self, name: &str) {
        match name.parse() {
            Ok(kind) => self.select_tool(kind),
            Err(_) => log::debug!("Ignoring unknown tool {name:?}"),
        }
    }

    /// Select a tool. A gesture still in progress on the old tool is
    /// cancelled without committing.
    pub fn select_tool(&mut self, kind: ToolKind) {
        if kind == self.current {
            return;
        }
        if self.drawing || self.tools.get(self.current).is_some_and(Tool::is_active) {
            log::debug!("Cancelling {} gesture on tool switch", self.current);
            self.dispatch(|tool, ctx| tool.cancel(ctx));
            self.drawing = false;
        }
        log::debug!("Tool: {} -> {}", self.current, kind);
        self.current = kind;
    }

    pub fn tools(&self) -> &ToolBox {
        &self.tools
    }

    /// Snapshot of the active tool's settings. `None` for the move tool.
    pub fn tool_settings(&self) -> Option<ToolSettings> {
        self.tools.settings(self.current)
    }

    /// Apply one attribute change to every tool.
    pub fn set_tool_setting(&mut self, setting: Setting) {
        log::debug!("Broadcast {setting:?}");
        self.tools.broadcast(setting);
    }

    pub fn set_stroke_color(&mut self, color: Color) {
        self.set_tool_setting(Setting::StrokeColor(color));
    }

    pub fn set_fill_color(&mut self, color: Color) {
        self.set_tool_setting(Setting::FillColor(color));
    }

    /// Parse a hex colour from a host input and apply it.
    pub fn set_color_hex(&mut self, target: ColorTarget, hex: &str) -> EaselResult<()> {
        let color: Color = hex.parse()?;
        match target {
            ColorTarget::Stroke => self.set_stroke_color(color),
            ColorTarget::Fill => self.set_fill_color(color),
        }
        Ok(())
    }

    /// Exchange stroke and fill colours. Returns the new `(stroke, fill)`.
    pub fn swap_colors(&mut self) -> Option<(Color, Color)> {
        let settings = self
            .tools
            .settings(self.current)
            .or_else(|| self.tools.settings(ToolKind::Pencil))?;
        self.set_stroke_color(settings.fill_color);
        self.set_fill_color(settings.stroke_color);
        Some((settings.fill_color, settings.stroke_color))
    }

    pub fn set_line_width(&mut self, width: f64) {
        self.set_tool_setting(Setting::LineWidth(width));
    }

    pub fn set_opacity(&mut self, opacity: u8) {
        self.set_tool_setting(Setting::Opacity(opacity));
    }

    pub fn set_smoothness(&mut self, smoothness: u8) {
        self.set_tool_setting(Setting::Smoothness(smoothness));
    }

    // --- Programmatic drawing ---

    /// Commit `path` with the named tool, bypassing pointer input.
    /// Unknown tool names are ignored.
    pub fn draw(&mut self, tool: &str, path: &[Point], overrides: &SettingsOverride) {
        match tool.parse() {
            Ok(kind) => self.draw_with(kind, path, overrides),
            Err(_) => log::debug!("Ignoring draw with unknown tool {tool:?}"),
        }
    }

    pub fn draw_with(&mut self, kind: ToolKind, path: &[Point], overrides: &SettingsOverride) {
        if let Some(tool) = self.tools.get(kind) {
            tool.draw(path, overrides, &mut self.final_surface);
        }
    }

    /// Draw a host-supplied image on the final surface.
    pub fn draw_image(&mut self, image: &S::Image, at: Point) {
        self.final_surface.draw_image(image, at);
    }

    /// Paint the whole final surface with the background colour and
    /// empty the draft surface.
    pub fn clear(&mut self) {
        let size = self.final_surface.size();
        let background = self.options.background_color;
        let overrides = SettingsOverride::new()
            .with(Setting::StrokeColor(background))
            .with(Setting::FillColor(background))
            .with(Setting::Opacity(100))
            .with(Setting::Composite(CompositeOp::SourceOver));
        self.draw_with(
            ToolKind::Rectangle,
            &[Point::ZERO, Point::new(size.width, size.height)],
            &overrides,
        );
        self.draft_surface.clear();
    }

    // --- Viewport ---

    /// Pan offset of the surfaces within the viewport.
    pub fn offset(&self) -> Vec2 {
        self.viewport.offset()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// The visible area changed size. Returns the re-clamped offset.
    pub fn set_viewport_size(&mut self, size: Size) -> Vec2 {
        self.viewport.resize(size)
    }

    // --- Surfaces ---

    pub fn final_surface(&self) -> &S {
        &self.final_surface
    }

    pub fn draft_surface(&self) -> &S {
        &self.draft_surface
    }
}
