pub mod config;
pub mod engine;
pub mod logging;
pub mod orbit;
pub mod provider;
pub mod scene;

use wasm_bindgen::convert::FromWasmAbi;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{EventTarget, HtmlCanvasElement, KeyboardEvent, MouseEvent, Request, RequestInit, RequestMode, Response, WebGlRenderingContext, WheelEvent};
use std::cell::RefCell;
use std::rc::Rc;
use crate::config::AppConfig;
use crate::engine::picking::client_to_ndc;
use crate::engine::renderer::Renderer;
use crate::scene::view::{aspect_ratio, SceneView};
use crate::scene::SceneContext;

/// Pointer travel (pixels) after which a press counts as a drag, not a click
const DRAG_THRESHOLD: i32 = 3;

struct App {
    renderer: Renderer,
    scene: SceneContext,
    view: SceneView,
    canvas: HtmlCanvasElement,
    pointer_down: Option<(i32, i32)>,
    last_pointer: (i32, i32),
    dragged: bool,
}

impl App {
    fn ndc(&self, event: &MouseEvent) -> (f32, f32, f32) {
        let width = self.canvas.client_width();
        let height = self.canvas.client_height();
        let (x, y) = client_to_ndc(event.offset_x() as f32, event.offset_y() as f32, width.max(1) as f32, height.max(1) as f32);
        (x, y, aspect_ratio(width, height))
    }

    fn fit_canvas(&self) -> (i32, i32) {
        let width = self.canvas.client_width();
        let height = self.canvas.client_height();
        if self.canvas.width() as i32 != width || self.canvas.height() as i32 != height {
            self.canvas.set_width(width.max(0) as u32);
            self.canvas.set_height(height.max(0) as u32);
        }
        (width, height)
    }
}

thread_local! {
    static APP: RefCell<Option<App>> = RefCell::new(None);
}

fn with_app(f: impl FnOnce(&mut App)) {
    APP.with(|a| {
        if let Some(app) = a.borrow_mut().as_mut() {
            f(app);
        }
    });
}

#[wasm_bindgen]
pub async fn init_orrery() -> Result<(), JsValue> {
    logging::init(log::Level::Info);

    let window = web_sys::window().ok_or("No window")?;
    let document = window.document().ok_or("No document")?;
    let canvas = document.get_element_by_id("canvas")
        .ok_or("No canvas")?
        .dyn_into::<HtmlCanvasElement>()?;

    let gl = canvas
        .get_context("webgl")?
        .ok_or("No WebGL")?
        .dyn_into::<WebGlRenderingContext>()?;

    let renderer = Renderer::new(gl)?;

    let config = load_config(&window).await;
    let catalog = provider::fetch_catalog(&config.api_url).await;
    let scene = SceneContext::from_catalog(config, &catalog);
    let view = SceneView::new(&renderer, &scene)?;

    APP.with(|a| {
        *a.borrow_mut() = Some(App {
            renderer,
            scene,
            view,
            canvas: canvas.clone(),
            pointer_down: None,
            last_pointer: (0, 0),
            dragged: false,
        })
    });

    setup_ui(&document)?;
    setup_input(&window, &canvas)?;

    // Render loop
    let f = Rc::new(RefCell::new(None));
    let g = f.clone();

    *g.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        with_app(|app| {
            let (width, height) = app.fit_canvas();
            app.scene.update(js_sys::Date::now());
            app.view.draw(&app.renderer, &app.scene, width, height);
        });
        if let Some(callback) = f.borrow().as_ref() {
            request_animation_frame(callback);
        }
    }) as Box<dyn FnMut()>));

    if let Some(callback) = g.borrow().as_ref() {
        request_animation_frame(callback);
    }

    Ok(())
}

async fn load_config(window: &web_sys::Window) -> AppConfig {
    match fetch_config(window).await {
        Ok(config) => config,
        Err(e) => {
            log::warn!("Using default config: {:?}", e);
            AppConfig::default()
        }
    }
}

async fn fetch_config(window: &web_sys::Window) -> Result<AppConfig, JsValue> {
    let opts = RequestInit::new();
    opts.set_method("GET");
    opts.set_mode(RequestMode::Cors);

    let request = Request::new_with_str_and_init("/assets/config.json", &opts)?;
    let resp: Response = JsFuture::from(window.fetch_with_request(&request)).await?.dyn_into()?;
    if !resp.ok() {
        return Err(JsValue::from_str(&format!("config.json returned {}", resp.status())));
    }
    let json = JsFuture::from(resp.json()?).await?;
    Ok(serde_wasm_bindgen::from_value(json)?)
}

fn request_animation_frame(f: &Closure<dyn FnMut()>) {
    if let Some(window) = web_sys::window() {
        if let Err(e) = window.request_animation_frame(f.as_ref().unchecked_ref()) {
            log::error!("requestAnimationFrame failed: {:?}", e);
        }
    }
}

fn listen<E>(target: &EventTarget, event: &str, handler: impl FnMut(E) + 'static) -> Result<(), JsValue>
where
    E: FromWasmAbi + 'static,
{
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(E)>);
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn setup_input(window: &web_sys::Window, canvas: &HtmlCanvasElement) -> Result<(), JsValue> {
    listen(canvas, "mousedown", |event: MouseEvent| {
        with_app(|app| {
            let pos = (event.client_x(), event.client_y());
            app.pointer_down = Some(pos);
            app.last_pointer = pos;
            app.dragged = false;
        });
    })?;

    listen(window, "mouseup", |_event: MouseEvent| {
        with_app(|app| app.pointer_down = None);
    })?;

    listen(canvas, "mousemove", |event: MouseEvent| {
        with_app(|app| {
            let pos = (event.client_x(), event.client_y());
            if let Some(start) = app.pointer_down {
                let (dx, dy) = (pos.0 - app.last_pointer.0, pos.1 - app.last_pointer.1);
                app.scene.rotate(dx as f32, dy as f32);
                if (pos.0 - start.0).abs() > DRAG_THRESHOLD || (pos.1 - start.1).abs() > DRAG_THRESHOLD {
                    app.dragged = true;
                }
            } else {
                let (x, y, aspect) = app.ndc(&event);
                app.scene.handle_hover(x, y, aspect);
            }
            app.last_pointer = pos;
        });
    })?;

    listen(canvas, "mouseleave", |_event: MouseEvent| {
        with_app(|app| app.scene.clear_hover());
    })?;

    listen(canvas, "click", |event: MouseEvent| {
        event.prevent_default();
        with_app(|app| {
            if app.dragged {
                return;
            }
            let (x, y, aspect) = app.ndc(&event);
            if app.scene.handle_click(x, y, aspect).is_some() {
                sync_info_panel(&app.scene);
            }
        });
    })?;

    listen(canvas, "wheel", |event: WheelEvent| {
        event.prevent_default();
        with_app(|app| app.scene.zoom(event.delta_y() as f32));
    })?;

    listen(window, "keydown", |event: KeyboardEvent| {
        with_app(|app| {
            if app.scene.handle_key(&event.key()) {
                event.prevent_default();
                sync_info_panel(&app.scene);
            }
        });
    })?;

    Ok(())
}

fn setup_ui(document: &web_sys::Document) -> Result<(), JsValue> {
    if let Some(button) = document.get_element_by_id("toggleButton") {
        listen(&button, "click", |_event: MouseEvent| {
            with_app(|app| {
                app.scene.toggle_info();
                sync_info_panel(&app.scene);
            });
        })?;
    }

    if let Some(button) = document.get_element_by_id("toggleHighlightButton") {
        listen(&button, "click", |_event: MouseEvent| {
            with_app(|app| {
                app.scene.toggle_halos();
            });
        })?;
    }

    APP.with(|a| {
        if let Some(app) = a.borrow().as_ref() {
            sync_info_panel(&app.scene);
        }
    });
    Ok(())
}

fn sync_info_panel(scene: &SceneContext) {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else { return };

    match document.get_element_by_id("infoText") {
        Some(text) => text.set_text_content(Some(scene.info_text())),
        None => log::error!("Element with id 'infoText' not found."),
    }
    if let Some(display) = document.get_element_by_id("infoDisplay") {
        if let Err(e) = display.class_list().toggle_with_force("hide", !scene.info_visible()) {
            log::warn!("Failed to toggle info display: {:?}", e);
        }
    }
}
