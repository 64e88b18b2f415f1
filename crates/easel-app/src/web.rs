//! WebAssembly entry point: canvas surfaces and the DOM binding.

use easel_core::{
    Brush, Color, ColorTarget, CommittedStroke, Easel, EaselOptions, MouseButton, SettingsOverride,
    Surface, TouchPhase,
};
use kurbo::{BezPath, PathEl, Point, Size, Vec2};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    CanvasRenderingContext2d, Element, Event, EventTarget, HtmlCanvasElement, HtmlElement,
    HtmlImageElement, HtmlInputElement, MouseEvent, TouchEvent,
};

fn js_error(message: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&message.to_string())
}

/// A [`Surface`] backed by a 2D canvas context.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    /// Resize `canvas` to `width` x `height` and take its 2D context.
    pub fn new(canvas: HtmlCanvasElement, width: u32, height: u32) -> Result<Self, JsValue> {
        canvas.set_width(width);
        canvas.set_height(height);
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| js_error("no 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self { canvas, ctx })
    }

    /// Current pixels as a PNG data URL.
    pub fn to_png_data_url(&self) -> Result<String, JsValue> {
        self.canvas.to_data_url_with_type("image/png")
    }

    fn trace(&self, path: &BezPath) {
        self.ctx.begin_path();
        for el in path.elements() {
            match *el {
                PathEl::MoveTo(p) => self.ctx.move_to(p.x, p.y),
                PathEl::LineTo(p) => self.ctx.line_to(p.x, p.y),
                PathEl::QuadTo(c, p) => self.ctx.quadratic_curve_to(c.x, c.y, p.x, p.y),
                PathEl::CurveTo(c1, c2, p) => {
                    self.ctx.bezier_curve_to(c1.x, c1.y, c2.x, c2.y, p.x, p.y)
                }
                PathEl::ClosePath => self.ctx.close_path(),
            }
        }
    }
}

impl Surface for CanvasSurface {
    type Image = HtmlImageElement;

    fn size(&self) -> Size {
        Size::new(
            f64::from(self.canvas.width()),
            f64::from(self.canvas.height()),
        )
    }

    fn set_brush(&mut self, brush: &Brush) {
        self.ctx.set_stroke_style_str(&brush.stroke.to_css());
        self.ctx.set_fill_style_str(&brush.fill.to_css());
        self.ctx.set_line_width(brush.width);
        self.ctx.set_line_cap(brush.cap.as_css());
        self.ctx.set_line_join(brush.join.as_css());
        self.ctx.set_global_alpha(brush.alpha);
        if let Err(e) = self
            .ctx
            .set_global_composite_operation(brush.composite.as_css())
        {
            log::warn!("Composite operation rejected: {e:?}");
        }
    }

    fn stroke(&mut self, path: &BezPath) {
        self.trace(path);
        self.ctx.stroke();
    }

    fn fill(&mut self, path: &BezPath) {
        self.trace(path);
        self.ctx.fill();
    }

    fn clear(&mut self) {
        let size = self.size();
        self.ctx.clear_rect(0.0, 0.0, size.width, size.height);
    }

    fn sample(&self, point: Point) -> Color {
        if !self.bounds().contains(point) {
            return Color::TRANSPARENT;
        }
        match self.ctx.get_image_data(point.x.floor(), point.y.floor(), 1.0, 1.0) {
            Ok(data) => match data.data().0.as_slice() {
                [r, g, b, a, ..] => Color::new(*r, *g, *b, *a),
                _ => Color::TRANSPARENT,
            },
            Err(e) => {
                log::warn!("Pixel read failed: {e:?}");
                Color::TRANSPARENT
            }
        }
    }

    fn draw_image(&mut self, image: &HtmlImageElement, at: Point) {
        if let Err(e) = self.ctx.draw_image_with_html_image_element(image, at.x, at.y) {
            log::warn!("Image draw failed: {e:?}");
        }
    }
}

// --- DOM lookup ---

fn by_class<T: JsCast>(container: &Element, class: &str) -> Result<T, JsValue> {
    container
        .get_elements_by_class_name(class)
        .item(0)
        .ok_or_else(|| js_error(format!("missing .{class} element")))?
        .dyn_into::<T>()
        .map_err(|_| js_error(format!(".{class} has the wrong element type")))
}

fn all_by_class(container: &Element, class: &str) -> Vec<HtmlElement> {
    let found = container.get_elements_by_class_name(class);
    (0..found.length())
        .filter_map(|i| found.item(i))
        .filter_map(|el| el.dyn_into::<HtmlElement>().ok())
        .collect()
}

fn input(container: &Element, name: &str) -> Result<HtmlInputElement, JsValue> {
    container
        .query_selector(&format!("[name={name}]"))?
        .ok_or_else(|| js_error(format!("missing [name={name}] input")))?
        .dyn_into::<HtmlInputElement>()
        .map_err(|_| js_error(format!("[name={name}] is not an input")))
}

fn all_inputs(container: &Element, name: &str) -> Result<Vec<HtmlInputElement>, JsValue> {
    let found = container.query_selector_all(&format!("[name={name}]"))?;
    Ok((0..found.length())
        .filter_map(|i| found.get(i))
        .filter_map(|node| node.dyn_into::<HtmlInputElement>().ok())
        .collect())
}

/// The elements a container must provide.
struct Dom {
    wrap: HtmlElement,
    final_canvas: HtmlCanvasElement,
    draft_canvas: HtmlCanvasElement,
    /// Elements that pan together with the canvases.
    overlays: Vec<HtmlElement>,
    save: HtmlElement,
    tools: Vec<HtmlInputElement>,
    stroke_color: HtmlInputElement,
    fill_color: HtmlInputElement,
    color_switch: HtmlElement,
    size: HtmlInputElement,
    opacity: HtmlInputElement,
    smoothness: HtmlInputElement,
}

impl Dom {
    fn find(container: &Element) -> Result<Self, JsValue> {
        Ok(Self {
            wrap: by_class(container, "easel__canvas")?,
            final_canvas: by_class(container, "easel__canvas-final")?,
            draft_canvas: by_class(container, "easel__canvas-draft")?,
            overlays: all_by_class(container, "easel__overlay"),
            save: by_class(container, "easel__save")?,
            tools: all_inputs(container, "tool")?,
            stroke_color: input(container, "stroke-color")?,
            fill_color: input(container, "fill-color")?,
            color_switch: by_class(container, "easel__color-switch")?,
            size: input(container, "size")?,
            opacity: input(container, "opacity")?,
            smoothness: input(container, "smoothness")?,
        })
    }

    fn checked_tool(&self) -> Option<String> {
        self.tools.iter().find(|t| t.checked()).map(|t| t.value())
    }

    fn viewport_size(&self) -> Size {
        Size::new(
            f64::from(self.wrap.client_width()),
            f64::from(self.wrap.client_height()),
        )
    }

    /// Pointer position relative to the wrapper.
    fn local(&self, page_x: i32, page_y: i32) -> Point {
        Point::new(
            f64::from(page_x - self.wrap.offset_left()),
            f64::from(page_y - self.wrap.offset_top()),
        )
    }

    fn offset_targets(&self) -> impl Iterator<Item = &HtmlElement> {
        self.overlays
            .iter()
            .chain([&*self.final_canvas, &*self.draft_canvas])
    }

    fn apply_offset(&self, offset: Vec2) {
        for el in self.offset_targets() {
            let style = el.style();
            let result = style
                .set_property("left", &format!("{}px", offset.x))
                .and_then(|_| style.set_property("top", &format!("{}px", offset.y)));
            if let Err(e) = result {
                log::warn!("Could not position element: {e:?}");
            }
        }
    }

    fn show_colors(&self, stroke: Color, fill: Color) {
        self.stroke_color.set_value(&stroke.to_hex());
        self.fill_color.set_value(&fill.to_hex());
    }
}

// --- Host callbacks ---

/// Notifications raised while the easel is borrowed, delivered afterwards.
enum HostEvent {
    MouseMove(Point),
    Draw(CommittedStroke),
    Pick(ColorTarget, Color),
}

struct HostCallbacks {
    on_mouse_move: Option<js_sys::Function>,
    on_draw: Option<js_sys::Function>,
}

impl HostCallbacks {
    fn from_options(options: &JsValue) -> Self {
        let function = |key: &str| {
            js_sys::Reflect::get(options, &JsValue::from_str(key))
                .ok()
                .and_then(|f| f.dyn_into::<js_sys::Function>().ok())
        };
        Self {
            on_mouse_move: function("onMouseMove"),
            on_draw: function("onDraw"),
        }
    }
}

fn call(function: &js_sys::Function, value: Result<JsValue, serde_wasm_bindgen::Error>) {
    let result = value
        .map_err(JsValue::from)
        .and_then(|v| function.call1(&JsValue::NULL, &v));
    if let Err(e) = result {
        log::warn!("Host callback failed: {e:?}");
    }
}

struct Shared {
    easel: RefCell<Easel<CanvasSurface>>,
    dom: Dom,
    host: HostCallbacks,
    pending: Rc<RefCell<Vec<HostEvent>>>,
}

impl Shared {
    /// Run `f` on the easel, then sync the DOM and notify the host.
    fn with_easel<R>(&self, f: impl FnOnce(&mut Easel<CanvasSurface>) -> R) -> R {
        let out = f(&mut self.easel.borrow_mut());
        let offset = self.easel.borrow().offset();
        self.dom.apply_offset(offset);
        self.flush();
        out
    }

    fn flush(&self) {
        let events = std::mem::take(&mut *self.pending.borrow_mut());
        for event in events {
            match event {
                HostEvent::MouseMove(p) => {
                    if let Some(f) = &self.host.on_mouse_move {
                        call(f, serde_wasm_bindgen::to_value(&p));
                    }
                }
                HostEvent::Draw(stroke) => {
                    if let Some(f) = &self.host.on_draw {
                        call(f, serde_wasm_bindgen::to_value(&stroke));
                    }
                }
                HostEvent::Pick(ColorTarget::Stroke, color) => {
                    self.dom.stroke_color.set_value(&color.to_hex())
                }
                HostEvent::Pick(ColorTarget::Fill, color) => {
                    self.dom.fill_color.set_value(&color.to_hex())
                }
            }
        }
    }

    fn set_color(&self, target: ColorTarget, hex: &str) {
        if let Err(e) = self.with_easel(|easel| easel.set_color_hex(target, hex)) {
            log::warn!("{e}");
        }
    }

    fn save(&self) {
        let url = match self.easel.borrow().final_surface().to_png_data_url() {
            Ok(url) => url,
            Err(e) => {
                log::warn!("Export failed: {e:?}");
                return;
            }
        };
        if let Some(window) = web_sys::window() {
            if let Err(e) = window.open_with_url_and_target(&url, "_blank") {
                log::warn!("Could not open export: {e:?}");
            }
        }
    }
}

/// An event listener removed again when dropped.
struct Listener {
    target: EventTarget,
    event: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

impl Listener {
    fn new(
        target: &EventTarget,
        event: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<Self, JsValue> {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        target.add_event_listener_with_callback_and_bool(
            event,
            closure.as_ref().unchecked_ref(),
            true,
        )?;
        Ok(Self {
            target: target.clone(),
            event,
            closure,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self.target.remove_event_listener_with_callback_and_bool(
            self.event,
            self.closure.as_ref().unchecked_ref(),
            true,
        );
    }
}

fn parse_input<T: std::str::FromStr>(input: &HtmlInputElement) -> Option<T> {
    let value = input.value();
    let parsed = value.trim().parse().ok();
    if parsed.is_none() {
        log::debug!("Ignoring input value {value:?}");
    }
    parsed
}

fn bind(shared: &Rc<Shared>) -> Result<Vec<Listener>, JsValue> {
    let dom = &shared.dom;
    let wrap: &EventTarget = &dom.wrap;
    let mut listeners = Vec::new();

    let s = Rc::clone(shared);
    listeners.push(Listener::new(wrap, "mousedown", move |e| {
        e.prevent_default();
        if let Some(m) = e.dyn_ref::<MouseEvent>() {
            let position = s.dom.local(m.page_x(), m.page_y());
            let button = MouseButton::from_dom(m.button());
            s.with_easel(|easel| easel.pointer_down(position, button));
        }
    })?);

    let s = Rc::clone(shared);
    listeners.push(Listener::new(wrap, "mousemove", move |e| {
        e.prevent_default();
        if let Some(m) = e.dyn_ref::<MouseEvent>() {
            let position = s.dom.local(m.page_x(), m.page_y());
            s.with_easel(|easel| easel.pointer_move(position));
        }
    })?);

    let s = Rc::clone(shared);
    listeners.push(Listener::new(wrap, "mouseup", move |e| {
        e.prevent_default();
        s.with_easel(|easel| easel.pointer_up());
    })?);

    for event in ["touchstart", "touchmove", "touchend", "touchcancel"] {
        let s = Rc::clone(shared);
        listeners.push(Listener::new(wrap, event, move |e| {
            e.prevent_default();
            let Some(phase) = TouchPhase::from_dom(&e.type_()) else {
                return;
            };
            let Some(touch) = e
                .dyn_ref::<TouchEvent>()
                .and_then(|t| t.changed_touches().get(0))
            else {
                return;
            };
            let position = s.dom.local(touch.page_x(), touch.page_y());
            s.with_easel(|easel| easel.handle_touch(phase, position));
        })?);
    }

    let s = Rc::clone(shared);
    listeners.push(Listener::new(&dom.save, "click", move |e| {
        e.prevent_default();
        s.save();
    })?);

    for tool in &dom.tools {
        let s = Rc::clone(shared);
        let input = tool.clone();
        listeners.push(Listener::new(tool, "change", move |_| {
            if input.checked() {
                let name = input.value();
                s.with_easel(|easel| easel.set_tool(&name));
            }
        })?);
    }

    let s = Rc::clone(shared);
    listeners.push(Listener::new(&dom.stroke_color, "change", move |_| {
        let hex = s.dom.stroke_color.value();
        s.set_color(ColorTarget::Stroke, &hex);
    })?);

    let s = Rc::clone(shared);
    listeners.push(Listener::new(&dom.fill_color, "change", move |_| {
        let hex = s.dom.fill_color.value();
        s.set_color(ColorTarget::Fill, &hex);
    })?);

    let s = Rc::clone(shared);
    listeners.push(Listener::new(&dom.color_switch, "click", move |e| {
        e.prevent_default();
        if let Some((stroke, fill)) = s.with_easel(|easel| easel.swap_colors()) {
            s.dom.show_colors(stroke, fill);
        }
    })?);

    let s = Rc::clone(shared);
    listeners.push(Listener::new(&dom.size, "change", move |_| {
        if let Some(width) = parse_input::<f64>(&s.dom.size) {
            s.with_easel(|easel| easel.set_line_width(width));
        }
    })?);

    let s = Rc::clone(shared);
    listeners.push(Listener::new(&dom.opacity, "change", move |_| {
        if let Some(opacity) = parse_input::<u8>(&s.dom.opacity) {
            s.with_easel(|easel| easel.set_opacity(opacity));
        }
    })?);

    let s = Rc::clone(shared);
    listeners.push(Listener::new(&dom.smoothness, "change", move |_| {
        if let Some(smoothness) = parse_input::<u8>(&s.dom.smoothness) {
            s.with_easel(|easel| easel.set_smoothness(smoothness));
        }
    })?);

    if let Some(window) = web_sys::window() {
        let s = Rc::clone(shared);
        listeners.push(Listener::new(&window, "resize", move |_| {
            let size = s.dom.viewport_size();
            s.with_easel(|easel| {
                easel.set_viewport_size(size);
            });
        })?);
    }

    Ok(listeners)
}

/// An easel bound to a container element.
#[wasm_bindgen(js_name = Easel)]
pub struct EaselHandle {
    shared: Rc<Shared>,
    _listeners: Vec<Listener>,
}

#[wasm_bindgen(js_class = Easel)]
impl EaselHandle {
    /// Bind to `container`. `options` may carry `width`, `height`,
    /// `backgroundColor`, `onMouseMove` and `onDraw`.
    #[wasm_bindgen(constructor)]
    pub fn new(container: Element, options: JsValue) -> Result<EaselHandle, JsValue> {
        let dom = Dom::find(&container)?;

        let mut parsed: EaselOptions = if options.is_undefined() || options.is_null() {
            EaselOptions::default()
        } else {
            serde_wasm_bindgen::from_value(options.clone())?
        };
        if let Some(tool) = dom.checked_tool() {
            parsed.tool = tool;
        }
        let host = HostCallbacks::from_options(&options);

        for overlay in &dom.overlays {
            let style = overlay.style();
            style.set_property("width", &format!("{}px", parsed.width))?;
            style.set_property("height", &format!("{}px", parsed.height))?;
        }
        let final_surface = CanvasSurface::new(dom.final_canvas.clone(), parsed.width, parsed.height)?;
        let draft_surface = CanvasSurface::new(dom.draft_canvas.clone(), parsed.width, parsed.height)?;

        let mut easel = Easel::new(parsed, final_surface, draft_surface, dom.viewport_size())
            .map_err(js_error)?;
        let pending = Rc::new(RefCell::new(Vec::new()));
        {
            let queue = Rc::clone(&pending);
            easel.on_mouse_move(move |p| queue.borrow_mut().push(HostEvent::MouseMove(p)));
            let queue = Rc::clone(&pending);
            easel.on_draw(move |stroke| queue.borrow_mut().push(HostEvent::Draw(stroke.clone())));
            let queue = Rc::clone(&pending);
            easel.on_pick(move |target, color| {
                queue.borrow_mut().push(HostEvent::Pick(target, color))
            });
        }
        dom.apply_offset(easel.offset());

        let shared = Rc::new(Shared {
            easel: RefCell::new(easel),
            dom,
            host,
            pending,
        });
        let listeners = bind(&shared)?;
        Ok(Self {
            shared,
            _listeners: listeners,
        })
    }

    #[wasm_bindgen(js_name = getTool)]
    pub fn get_tool(&self) -> String {
        self.shared.easel.borrow().tool().name().to_string()
    }

    /// Unknown names are ignored.
    #[wasm_bindgen(js_name = setTool)]
    pub fn set_tool(&self, tool: &str) {
        self.shared.with_easel(|easel| easel.set_tool(tool));
    }

    /// Settings of the active tool, or `undefined` for the move tool.
    #[wasm_bindgen(js_name = getToolSettings)]
    pub fn get_tool_settings(&self) -> Result<JsValue, JsValue> {
        let settings = self.shared.easel.borrow().tool_settings();
        Ok(serde_wasm_bindgen::to_value(&settings)?)
    }

    #[wasm_bindgen(js_name = setStrokeColor)]
    pub fn set_stroke_color(&self, color: &str) {
        self.shared.dom.stroke_color.set_value(color);
        self.shared.set_color(ColorTarget::Stroke, color);
    }

    #[wasm_bindgen(js_name = setFillColor)]
    pub fn set_fill_color(&self, color: &str) {
        self.shared.dom.fill_color.set_value(color);
        self.shared.set_color(ColorTarget::Fill, color);
    }

    /// Commit `path` (an array of `{x, y}`) with the named tool.
    pub fn draw(&self, tool: &str, path: JsValue, settings: JsValue) -> Result<(), JsValue> {
        let path: Vec<Point> = serde_wasm_bindgen::from_value(path)?;
        let overrides: SettingsOverride = if settings.is_undefined() || settings.is_null() {
            SettingsOverride::default()
        } else {
            serde_wasm_bindgen::from_value(settings)?
        };
        self.shared
            .with_easel(|easel| easel.draw(tool, &path, &overrides));
        Ok(())
    }

    #[wasm_bindgen(js_name = drawImage)]
    pub fn draw_image(&self, image: &HtmlImageElement, x: f64, y: f64) {
        self.shared
            .with_easel(|easel| easel.draw_image(image, Point::new(x, y)));
    }

    pub fn clear(&self) {
        self.shared.with_easel(|easel| easel.clear());
    }

    /// The final surface as a PNG data URL.
    #[wasm_bindgen(js_name = toDataURL)]
    pub fn to_data_url(&self) -> Result<String, JsValue> {
        self.shared.easel.borrow().final_surface().to_png_data_url()
    }
}

/// Initialize logging and the panic hook.
#[wasm_bindgen(start)]
pub fn run_wasm() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        log::debug!("Logger already initialized");
    }
    log::info!("Easel (WASM) loaded");
}
