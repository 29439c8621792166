use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Once;

use anyhow::{anyhow, Context, Result};
use log::{info, warn};
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, Window};

use crate::config::SwarmConfig;
use crate::math::Vec2;
use crate::render::{RenderSurface, TriangleStyle};
use crate::swarm::{HostSignals, Swarm};
use crate::SurfaceSize;

const THEME_PROPERTY: &str = "--triangle-color";
const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";
const MAX_PIXEL_RATIO: f64 = 2.0;

static LOGGER: Once = Once::new();

type FrameCallback = Closure<dyn FnMut(f64)>;

struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
}

impl RenderSurface for CanvasSurface {
    fn clear(&mut self, size: SurfaceSize) {
        self.ctx
            .clear_rect(0.0, 0.0, f64::from(size.width), f64::from(size.height));
    }

    fn draw_triangle(&mut self, vertices: [Vec2; 3], style: &TriangleStyle) {
        let [a, b, c] = vertices;
        let ctx = &self.ctx;
        ctx.set_line_width(f64::from(style.stroke_width));
        ctx.set_fill_style_str(&style.color);
        ctx.set_stroke_style_str(&style.color);
        ctx.begin_path();
        ctx.move_to(f64::from(a.x), f64::from(a.y));
        ctx.line_to(f64::from(b.x), f64::from(b.y));
        ctx.line_to(f64::from(c.x), f64::from(c.y));
        ctx.close_path();

        ctx.set_global_alpha(f64::from(style.fill_opacity));
        ctx.fill();
        ctx.set_global_alpha(f64::from(style.stroke_opacity));
        ctx.stroke();
        ctx.set_global_alpha(1.0);
    }
}

struct Host {
    swarm: Swarm,
    signals: HostSignals,
    window: Window,
    canvas: HtmlCanvasElement,
    surface: CanvasSurface,
}

impl Host {
    fn frame(&mut self, now_ms: f64) {
        self.signals.theme_color = self.theme_color();
        self.signals.reduced_motion = self.reduced_motion();
        self.swarm.tick(now_ms, &self.signals, &mut self.surface);
    }

    fn pointer_moved(&mut self, client_x: f32, client_y: f32, now_ms: f64) {
        let rect = self.canvas.get_bounding_client_rect();
        self.signals.pointer_moved(
            client_x - rect.left() as f32,
            client_y - rect.top() as f32,
            now_ms,
        );
    }

    fn resize(&mut self) -> Result<()> {
        let size = fit_canvas(&self.window, &self.canvas, &self.surface.ctx)?;
        self.signals.size = size;
        self.swarm.resize(size);
        Ok(())
    }

    fn theme_color(&self) -> String {
        let declared = self
            .window
            .document()
            .and_then(|document| document.document_element())
            .and_then(|root| self.window.get_computed_style(&root).ok().flatten())
            .and_then(|style| style.get_property_value(THEME_PROPERTY).ok());

        match declared {
            Some(color) if !color.trim().is_empty() => color.trim().to_string(),
            _ => self.swarm.config().fallback_color.clone(),
        }
    }

    fn reduced_motion(&self) -> bool {
        self.window
            .match_media(REDUCED_MOTION_QUERY)
            .ok()
            .flatten()
            .is_some_and(|query| query.matches())
    }
}

/// Window listeners and the animation-frame chain. Dropping it cancels the
/// pending frame and detaches both listeners.
struct EventLoop {
    window: Window,
    on_resize: Closure<dyn FnMut()>,
    on_mouse_move: Closure<dyn FnMut(MouseEvent)>,
    animation: Rc<RefCell<Option<FrameCallback>>>,
    pending_frame: Rc<Cell<Option<i32>>>,
}

impl EventLoop {
    fn start(host: &Rc<RefCell<Host>>) -> Result<Self> {
        let window = host.borrow().window.clone();

        let on_resize = {
            let host = Rc::clone(host);
            Closure::<dyn FnMut()>::new(move || {
                if let Ok(mut host) = host.try_borrow_mut() {
                    if let Err(err) = host.resize() {
                        warn!("resize failed: {err:#}");
                    }
                }
            })
        };
        let on_mouse_move = {
            let host = Rc::clone(host);
            Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
                if let Ok(mut host) = host.try_borrow_mut() {
                    host.pointer_moved(
                        event.client_x() as f32,
                        event.client_y() as f32,
                        event.time_stamp(),
                    );
                }
            })
        };

        let animation: Rc<RefCell<Option<FrameCallback>>> = Rc::new(RefCell::new(None));
        let pending_frame = Rc::new(Cell::new(None));
        let step = {
            let host = Rc::clone(host);
            let animation = Rc::clone(&animation);
            let pending_frame = Rc::clone(&pending_frame);
            let window = window.clone();
            Closure::<dyn FnMut(f64)>::new(move |now_ms: f64| {
                if let Ok(mut host) = host.try_borrow_mut() {
                    host.frame(now_ms);
                }
                pending_frame.set(request_frame(&window, &animation));
            })
        };
        *animation.borrow_mut() = Some(step);

        // Built before registering so a failed registration still detaches
        // whatever was attached.
        let event_loop = Self {
            window,
            on_resize,
            on_mouse_move,
            animation,
            pending_frame,
        };
        event_loop.listen("resize", event_loop.on_resize.as_ref())?;
        event_loop.listen("mousemove", event_loop.on_mouse_move.as_ref())?;
        event_loop
            .pending_frame
            .set(request_frame(&event_loop.window, &event_loop.animation));

        Ok(event_loop)
    }

    fn listen(&self, event: &str, callback: &JsValue) -> Result<()> {
        self.window
            .add_event_listener_with_callback(event, callback.unchecked_ref())
            .map_err(|err| anyhow!("adding {event} listener failed: {err:?}"))
    }

    fn unlisten(&self, event: &str, callback: &JsValue) {
        if let Err(err) = self
            .window
            .remove_event_listener_with_callback(event, callback.unchecked_ref())
        {
            warn!("removing {event} listener failed: {err:?}");
        }
    }
}

impl Drop for EventLoop {
    fn drop(&mut self) {
        if let Some(handle) = self.pending_frame.take() {
            if let Err(err) = self.window.cancel_animation_frame(handle) {
                warn!("cancelAnimationFrame failed: {err:?}");
            }
        }
        self.unlisten("resize", self.on_resize.as_ref());
        self.unlisten("mousemove", self.on_mouse_move.as_ref());
        // The frame callback holds the cell it lives in; taking it breaks
        // the cycle.
        self.animation.borrow_mut().take();
    }
}

fn request_frame(window: &Window, animation: &RefCell<Option<FrameCallback>>) -> Option<i32> {
    let animation = animation.borrow();
    let step = animation.as_ref()?;
    match window.request_animation_frame(step.as_ref().unchecked_ref()) {
        Ok(handle) => Some(handle),
        Err(err) => {
            warn!("requestAnimationFrame failed: {err:?}");
            None
        }
    }
}

#[wasm_bindgen]
pub struct Sim {
    host: Rc<RefCell<Host>>,
    event_loop: Option<EventLoop>,
}

#[wasm_bindgen]
impl Sim {
    /// `options` is a partial `SwarmConfig` in camelCase, or `undefined`.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement, options: JsValue) -> Result<Sim, JsValue> {
        init_logging();

        let config = if options.is_null() || options.is_undefined() {
            SwarmConfig::default()
        } else {
            from_value::<SwarmConfig>(options).map_err(js_error)?
        };

        let window = web_sys::window()
            .context("no global window")
            .map_err(js_error)?;
        let ctx = context_2d(&canvas).map_err(js_error)?;
        let size = fit_canvas(&window, &canvas, &ctx).map_err(js_error)?;

        let swarm = Swarm::new(config, size).map_err(js_error)?;
        info!(
            "swarm ready: {} agents on {}x{}",
            swarm.config().count,
            size.width,
            size.height
        );

        let host = Host {
            swarm,
            signals: HostSignals::new(size),
            window,
            canvas,
            surface: CanvasSurface { ctx },
        };
        Ok(Sim {
            host: Rc::new(RefCell::new(host)),
            event_loop: None,
        })
    }

    /// Drives the swarm from `requestAnimationFrame` and the window's
    /// `resize` and `mousemove` events until `stop` or `free`.
    pub fn start(&mut self) -> Result<(), JsValue> {
        if self.event_loop.is_none() {
            self.event_loop = Some(EventLoop::start(&self.host).map_err(js_error)?);
            info!("animation loop started");
        }
        Ok(())
    }

    pub fn stop(&mut self) {
        if self.event_loop.take().is_some() {
            info!("animation loop stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.event_loop.is_some()
    }

    pub fn frame(&mut self, now_ms: f64) {
        self.host.borrow_mut().frame(now_ms);
    }

    pub fn pointer_moved(&mut self, client_x: f32, client_y: f32, now_ms: f64) {
        self.host
            .borrow_mut()
            .pointer_moved(client_x, client_y, now_ms);
    }

    pub fn resize(&mut self) -> Result<(), JsValue> {
        self.host.borrow_mut().resize().map_err(js_error)
    }

    pub fn set_count(&mut self, count: usize) -> Result<(), JsValue> {
        self.host
            .borrow_mut()
            .swarm
            .set_count(count)
            .map_err(js_error)
    }

    pub fn reset(&mut self) {
        self.host.borrow_mut().swarm.reset();
    }

    pub fn count(&self) -> usize {
        self.host.borrow().swarm.agents().len()
    }

    pub fn frame_index(&self) -> f64 {
        self.host.borrow().swarm.frame() as f64
    }
}

#[wasm_bindgen]
pub fn default_options() -> Result<JsValue, JsValue> {
    to_value(&SwarmConfig::default()).map_err(js_error)
}

fn init_logging() {
    LOGGER.call_once(|| {
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"swarm-wasm: logger already installed".into());
        }
    });
}

fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d> {
    canvas
        .get_context("2d")
        .map_err(|err| anyhow!("getContext(\"2d\") threw: {err:?}"))?
        .context("canvas has no 2d context")?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|_| anyhow!("2d context has an unexpected type"))
}

/// Sizes the backing store for the device pixel ratio (capped at 2) and
/// scales the context so drawing happens in CSS pixels.
fn fit_canvas(
    window: &Window,
    canvas: &HtmlCanvasElement,
    ctx: &CanvasRenderingContext2d,
) -> Result<SurfaceSize> {
    let dpr = match window.device_pixel_ratio() {
        ratio if ratio > 0.0 => ratio.min(MAX_PIXEL_RATIO),
        _ => 1.0,
    };
    let width = f64::from(canvas.client_width());
    let height = f64::from(canvas.client_height());

    canvas.set_width((width * dpr).floor() as u32);
    canvas.set_height((height * dpr).floor() as u32);
    ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0)
        .map_err(|err| anyhow!("setTransform failed: {err:?}"))?;

    Ok(SurfaceSize::new(width as f32, height as f32))
}

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsError::new(&format!("{err:#}")).into()
}
