//! Coin Flip entry point
//!
//! Handles platform-specific initialization and runs the frame loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use gloo::events::EventListener;
    use wasm_bindgen::JsCast;
    use web_sys::{Document, HtmlCanvasElement, HtmlElement, MouseEvent};

    use coin_flip::platform::{
        BrowserFrames, FrameClock, FrameLoop, Listeners, WebRuntime, drawing_buffer_size,
    };
    use coin_flip::renderer::SdfRenderState;
    use coin_flip::sim::Scene;
    use coin_flip::{InitError, Settings};

    const CANVAS_ID: &str = "canvas";
    const RESULT_ID: &str = "result";
    const LOADING_ID: &str = "loading";

    /// Scene plus everything needed to draw it
    struct App {
        scene: Scene,
        renderer: SdfRenderState,
        settings: Settings,
        clock: FrameClock,
        canvas: HtmlCanvasElement,
        label: Option<HtmlElement>,
        shown_label: Option<&'static str>,
    }

    impl App {
        fn frame(&mut self, time: f64) {
            let dt = self.clock.delta(time);
            self.scene.tick(dt);
            self.render();
            self.update_label();
        }

        /// Render the current frame
        fn render(&mut self) {
            match self.renderer.render(&self.scene, &self.settings) {
                Ok(_) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    self.renderer
                        .resize(self.renderer.size.0, self.renderer.size.1);
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("Out of memory!");
                }
                Err(e) => log::warn!("Render error: {:?}", e),
            }
        }

        /// Show, hide and position the result overlay
        fn update_label(&mut self) {
            let Some(el) = &self.label else {
                return;
            };
            let style = el.style();

            match self.scene.label() {
                Some(label) => {
                    if self.shown_label != Some(label.text) {
                        el.set_text_content(Some(label.text));
                        let _ = el.set_attribute("class", "result");
                        self.shown_label = Some(label.text);
                    }
                    let _ = style.set_property("left", &format!("{:.2}%", label.anchor.x * 100.0));
                    let _ = style.set_property("top", &format!("{:.2}%", label.anchor.y * 100.0));
                }
                None => {
                    if self.shown_label.take().is_some() {
                        let _ = el.set_attribute("class", "result hidden");
                    }
                }
            }
        }

        fn click(&mut self, event: &MouseEvent) {
            let w = self.canvas.client_width().max(1) as f32;
            let h = self.canvas.client_height().max(1) as f32;
            let uv = Vec2::new(event.offset_x() as f32 / w, event.offset_y() as f32 / h);
            if self.scene.click(uv).is_none() {
                log::debug!("Click missed the coin at ({:.3}, {:.3})", uv.x, uv.y);
            }
        }

        fn resize(&mut self) {
            let (width, height) = fit_canvas(&self.canvas, &self.settings);
            self.renderer.resize(width, height);
            self.scene.resize(width, height);
        }
    }

    /// Size the canvas drawing buffer to its CSS box times the pixel ratio
    fn fit_canvas(canvas: &HtmlCanvasElement, settings: &Settings) -> (u32, u32) {
        let device_ratio = web_sys::window()
            .map(|w| w.device_pixel_ratio())
            .unwrap_or(1.0);
        let (width, height) = drawing_buffer_size(
            canvas.client_width() as f64,
            canvas.client_height() as f64,
            settings.pixel_ratio(device_ratio),
        );
        canvas.set_width(width);
        canvas.set_height(height);
        (width, height)
    }

    thread_local! {
        static RUNTIME: RefCell<Option<WebRuntime>> = const { RefCell::new(None) };
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).ok();

        log::info!("Coin Flip starting...");

        if let Err(e) = start().await {
            log::error!("Startup failed: {}", e);
            show_loading_message(&format!("Unable to start: {e}"));
        }
    }

    /// Stop the scene and release its callbacks
    pub fn stop() {
        let Some(runtime) = RUNTIME.with(|rt| rt.borrow_mut().take()) else {
            return;
        };
        log::debug!(
            "Releasing {} listeners (frame pending: {})",
            runtime.listener_count(),
            runtime.is_running()
        );
        drop(runtime);
        log::info!("Coin Flip stopped");
    }

    async fn start() -> Result<(), InitError> {
        let window = web_sys::window().ok_or(InitError::NoWindow)?;
        let document = window.document().ok_or(InitError::NoDocument)?;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id(CANVAS_ID)
            .ok_or(InitError::MissingElement(CANVAS_ID))?
            .dyn_into()
            .map_err(|_| InitError::NotACanvas(CANVAS_ID))?;

        let settings = Settings::load();
        let (width, height) = fit_canvas(&canvas, &settings);

        let seed = settings.seed.unwrap_or_else(|| js_sys::Date::now() as u64);
        let scene = Scene::new(seed, width, height, settings.rig_params());
        log::info!("Scene initialized with seed: {}", seed);

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });
        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let renderer = SdfRenderState::new(surface, &adapter, width, height).await?;

        let label = document
            .get_element_by_id(RESULT_ID)
            .and_then(|el| el.dyn_into::<HtmlElement>().ok());
        if label.is_none() {
            log::warn!("No #{} element; results will only be logged", RESULT_ID);
        }

        let app = Rc::new(RefCell::new(App {
            scene,
            renderer,
            settings,
            clock: FrameClock::new(),
            canvas: canvas.clone(),
            label,
            shown_label: None,
        }));

        let listeners = setup_listeners(&window, &canvas, &app);

        let frame_loop = {
            let app = app.clone();
            FrameLoop::start(BrowserFrames, move |time| app.borrow_mut().frame(time))
        };

        let runtime = WebRuntime::new(frame_loop, listeners);
        log::debug!("{} listeners registered", runtime.listener_count());

        hide_loading(&document);
        RUNTIME.with(|rt| *rt.borrow_mut() = Some(runtime));

        log::info!("Coin Flip running!");
        Ok(())
    }

    fn setup_listeners(
        window: &web_sys::Window,
        canvas: &HtmlCanvasElement,
        app: &Rc<RefCell<App>>,
    ) -> Listeners<EventListener> {
        let mut listeners = Listeners::new();

        // Click on the coin
        {
            let app = app.clone();
            listeners.on(canvas, "click", move |event| {
                if let Some(event) = event.dyn_ref::<MouseEvent>() {
                    event.stop_propagation();
                    app.borrow_mut().click(event);
                }
            });
        }

        // Window resize
        {
            let app = app.clone();
            listeners.on(window, "resize", move |_event| {
                app.borrow_mut().resize();
            });
        }

        listeners
    }

    fn hide_loading(document: &Document) {
        if let Some(loading) = document.get_element_by_id(LOADING_ID) {
            let _ = loading.set_attribute("class", "hidden");
        }
    }

    fn show_loading_message(message: &str) {
        let loading = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(LOADING_ID));
        if let Some(el) = loading {
            el.set_text_content(Some(message));
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_app::run().await;
}

/// Tear the scene down, cancelling the frame loop and removing listeners
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn stop() {
    wasm_app::stop();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use coin_flip::consts::FIRST_FRAME_DT;
    use coin_flip::sim::{CoinEvent, Scene};
    use coin_flip::{QualityPreset, Settings};

    env_logger::init();
    log::info!("Coin Flip (native) starting...");
    log::info!("Native mode runs a headless flip - run with `trunk serve` for the web version");

    // coin-flip [seed] [quality]
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut settings = match args.get(1).map(String::as_str).and_then(QualityPreset::from_str) {
        Some(quality) => Settings::from_preset(quality),
        None => Settings::load(),
    };
    if let Some(seed) = args.first() {
        match seed.parse::<u64>() {
            Ok(seed) => settings.seed = Some(seed),
            Err(_) => log::warn!("Ignoring non-numeric seed {:?}", seed),
        }
    }

    let seed = settings.seed.unwrap_or_else(|| {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    });
    let mut scene = Scene::new(seed, 800, 600, settings.rig_params());
    log::info!("Scene initialized with seed: {}", seed);

    let Some(CoinEvent::SpinStarted { target_spins, .. }) = scene.click(glam::Vec2::splat(0.5))
    else {
        log::error!("Center click did not reach the coin");
        return;
    };

    let mut frames = 0u32;
    loop {
        frames += 1;
        if let Some(CoinEvent::Landed { face, angle }) = scene.tick(FIRST_FRAME_DT) {
            println!(
                "{} after {} frames ({:.2} turns requested, final angle {:.4} rad)",
                face.as_str(),
                frames,
                target_spins,
                angle
            );
            break;
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
