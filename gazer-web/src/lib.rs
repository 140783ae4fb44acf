/// Gazer Web - browser front end
///
/// Draws the scene onto a 2D canvas and feeds DOM pointer, touch, wheel and
/// resize events into the shared head-tracking app. All state lives on the
/// browser's UI thread behind `Rc<RefCell<_>>`.

use std::cell::RefCell;
use std::rc::Rc;

use gazer_core::{gltf_loader, HeadTrackingApp, SceneConfig, Viewport};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Event, HtmlCanvasElement, MouseEvent, TouchEvent, WheelEvent, Window};

pub mod canvas;

use canvas::CanvasRenderer;

fn to_js(error: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("no global window"))
}

fn window_size(window: &Window) -> Result<(f32, f32), JsValue> {
    let width = window.inner_width()?.as_f64().unwrap_or(1.0);
    let height = window.inner_height()?.as_f64().unwrap_or(1.0);
    Ok((width as f32, height as f32))
}

struct ViewerState {
    app: HeadTrackingApp,
    renderer: CanvasRenderer,
    canvas: HtmlCanvasElement,
    running: bool,
}

impl ViewerState {
    fn resize(&mut self, width: f32, height: f32, pixel_ratio: f64) -> Result<(), JsValue> {
        self.app.resize(width, height).map_err(to_js)?;
        self.canvas.set_width((width as f64 * pixel_ratio) as u32);
        self.canvas.set_height((height as f64 * pixel_ratio) as u32);
        self.renderer.resize(width, height, pixel_ratio)
    }

    fn frame(&mut self) -> Result<(), JsValue> {
        self.app.frame(&mut self.renderer)?;
        Ok(())
    }
}

/// A DOM listener kept alive for as long as the viewer
struct Listener {
    target: web_sys::EventTarget,
    kind: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

#[wasm_bindgen]
pub struct WebViewer {
    state: Rc<RefCell<ViewerState>>,
    listeners: Vec<Listener>,
}

#[wasm_bindgen]
impl WebViewer {
    /// Attach to the canvas with the given id. `config_json` overrides the
    /// default scene config.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str, config_json: Option<String>) -> Result<WebViewer, JsValue> {
        let window = window()?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let canvas: HtmlCanvasElement = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| JsValue::from_str(&format!("missing #{canvas_id}")))?
            .dyn_into()?;
        let context: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into()?;

        let config = match config_json {
            Some(json) => SceneConfig::from_json_str(&json).map_err(to_js)?,
            None => SceneConfig::default(),
        };

        let (width, height) = window_size(&window)?;
        let viewport = Viewport::new(width, height).map_err(to_js)?;
        let renderer = CanvasRenderer::new(context, width, height, config.render.background);
        let app = HeadTrackingApp::with_lizard(config, viewport);

        let mut state = ViewerState {
            app,
            renderer,
            canvas,
            running: false,
        };
        state.resize(width, height, window.device_pixel_ratio())?;

        let mut viewer = WebViewer {
            state: Rc::new(RefCell::new(state)),
            listeners: Vec::new(),
        };
        viewer.install_listeners(&window)?;

        tracing::info!(width, height, "web viewer attached to #{canvas_id}");
        Ok(viewer)
    }

    /// Replace the built-in lizard with a glTF/GLB model.
    pub fn load_model(&self, bytes: &[u8]) -> Result<(), JsValue> {
        let mut state = self.state.borrow_mut();
        let scene = gltf_loader::load_gltf_slice(bytes, state.app.config()).map_err(to_js)?;
        tracing::info!(nodes = scene.len(), "model loaded");
        state.app.replace_scene(scene);
        Ok(())
    }

    /// Start the requestAnimationFrame loop.
    pub fn start(&self) -> Result<(), JsValue> {
        {
            let mut state = self.state.borrow_mut();
            if state.running {
                return Ok(());
            }
            state.running = true;
        }

        let frame: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
        let next = frame.clone();
        let state = self.state.clone();

        *frame.borrow_mut() = Some(Closure::new(move || {
            {
                let mut state = state.borrow_mut();
                if !state.running {
                    // Dropping the closure ends the loop
                    let _ = next.borrow_mut().take();
                    return;
                }
                if let Err(e) = state.frame() {
                    tracing::error!("frame failed: {e:?}");
                }
            }
            if let Some(callback) = next.borrow().as_ref() {
                if let Err(e) = request_animation_frame(callback) {
                    tracing::error!("failed to schedule frame: {e:?}");
                }
            }
        }));

        if let Some(callback) = frame.borrow().as_ref() {
            request_animation_frame(callback)?;
        }
        Ok(())
    }

    /// Stop the frame loop after the current frame.
    pub fn stop(&self) {
        self.state.borrow_mut().running = false;
    }

    /// Feed a pointer position in CSS pixels (for hosts that route events themselves).
    pub fn pointer_move(&self, x: f32, y: f32) {
        self.state.borrow_mut().app.pointer_move(x, y);
    }

    /// Current tracked point as `[x, y, z]`.
    pub fn tracked_point(&self) -> Box<[f32]> {
        canvas::point_to_array(&self.state.borrow().app.pointer().position)
    }
}

impl WebViewer {
    fn listen(
        &mut self,
        target: &web_sys::EventTarget,
        kind: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<(), JsValue> {
        let closure = Closure::<dyn FnMut(Event)>::new(handler);
        target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
        self.listeners.push(Listener {
            target: target.clone(),
            kind,
            closure,
        });
        Ok(())
    }

    fn install_listeners(&mut self, host: &Window) -> Result<(), JsValue> {
        let target: &web_sys::EventTarget = host.as_ref();

        let state = self.state.clone();
        self.listen(target, "mousemove", move |event| {
            let Some(event) = event.dyn_ref::<MouseEvent>() else {
                return;
            };
            let mut state = state.borrow_mut();
            // Primary button held: orbit as well as look
            if event.buttons() & 1 == 1 {
                state
                    .app
                    .orbit(event.movement_x() as f32, event.movement_y() as f32);
            }
            state
                .app
                .pointer_move(event.client_x() as f32, event.client_y() as f32);
        })?;

        let state = self.state.clone();
        self.listen(target, "touchmove", move |event| {
            let Some(touch) = event
                .dyn_ref::<TouchEvent>()
                .and_then(|event| event.touches().get(0))
            else {
                return;
            };
            state
                .borrow_mut()
                .app
                .pointer_move(touch.client_x() as f32, touch.client_y() as f32);
        })?;

        let state = self.state.clone();
        self.listen(target, "wheel", move |event| {
            if let Some(event) = event.dyn_ref::<WheelEvent>() {
                let steps = -(event.delta_y().signum() as f32);
                state.borrow_mut().app.zoom(steps);
            }
        })?;

        let state = self.state.clone();
        self.listen(target, "resize", move |_| {
            let result = window().and_then(|window| {
                let (width, height) = window_size(&window)?;
                state
                    .borrow_mut()
                    .resize(width, height, window.device_pixel_ratio())
            });
            if let Err(e) = result {
                tracing::warn!("resize ignored: {e:?}");
            }
        })?;

        Ok(())
    }
}

impl Drop for WebViewer {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.try_borrow_mut() {
            state.running = false;
        }
        for listener in self.listeners.drain(..) {
            let _ = listener
                .target
                .remove_event_listener_with_callback(listener.kind, listener.closure.as_ref().unchecked_ref());
        }
    }
}

fn request_animation_frame(callback: &Closure<dyn FnMut()>) -> Result<(), JsValue> {
    window()?.request_animation_frame(callback.as_ref().unchecked_ref())?;
    Ok(())
}

#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    // Setup panic hook for better error messages in browser console
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();

    tracing::info!("Gazer web module loaded");
    Ok(())
}
