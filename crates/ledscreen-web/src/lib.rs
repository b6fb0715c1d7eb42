#![cfg(target_arch = "wasm32")]
use ledscreen_core::{ColorMode, FrameDriver, LedScene, PreviewConfig, PreviewError};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

mod audio;
mod dom;
mod frame;

use frame::{FrameContext, FrameLoop};

pub const DEFAULT_CANVAS_ID: &str = "led-canvas";

fn js_error(e: PreviewError) -> JsValue {
    js_sys::Error::new(&e.to_string()).into()
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("ledscreen-web starting");
    Ok(())
}

/// Browser LED preview mounted on a canvas.
///
/// Mounting wires the resize listener, kicks off the microphone request and
/// GPU setup, and draws the calibration gradient as soon as the GPU is ready.
#[wasm_bindgen]
pub struct LedScreen {
    frame_loop: FrameLoop,
    resize_closure: Option<Closure<dyn FnMut()>>,
}

#[wasm_bindgen]
impl LedScreen {
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: Option<String>, run: Option<bool>) -> Result<LedScreen, JsValue> {
        let config = PreviewConfig {
            run: run.unwrap_or(true),
            ..PreviewConfig::default()
        };
        let id = canvas_id.as_deref().unwrap_or(DEFAULT_CANVAS_ID);
        let canvas = dom::canvas_by_id(id).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self::mount(canvas, config))
    }

    /// Copies the external `run` prop; restarts the loop if it had stopped.
    pub fn set_run(&self, run: bool) {
        let restart = self.frame_loop.ctx().borrow_mut().driver.set_run(run);
        if restart {
            self.frame_loop.request();
        }
    }

    pub fn set_expression(&self, expression: Option<String>) {
        log::debug!("[screen] expression={:?}", expression);
        self.frame_loop.ctx().borrow_mut().expression = expression;
    }

    /// Switches between `"waterfall"` and `"sinusoid"`.
    pub fn set_mode(&self, mode: &str) -> Result<(), JsValue> {
        let mode: ColorMode = mode.parse().map_err(js_error)?;
        self.frame_loop.ctx().borrow_mut().scene.set_mode(mode);
        Ok(())
    }

    pub fn mode(&self) -> String {
        self.frame_loop.ctx().borrow().scene.mode().to_string()
    }

    /// Driver state, e.g. `"running"` or `"permission-denied"`.
    pub fn state(&self) -> String {
        self.frame_loop.ctx().borrow().driver.state().to_string()
    }

    /// Removes the resize listener and cancels any queued frame.
    pub fn unmount(&mut self) {
        self.teardown();
    }
}

// `free()` from JS (or the finalizer) lands here without `unmount()`; the
// listener must come off `window` before its closure is dropped.
impl Drop for LedScreen {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl LedScreen {
    fn teardown(&mut self) {
        if let Some(closure) = self.resize_closure.take() {
            if let Some(window) = web::window() {
                _ = window.remove_event_listener_with_callback(
                    "resize",
                    closure.as_ref().unchecked_ref(),
                );
            }
        }
        if self.frame_loop.is_shut_down() {
            return;
        }
        self.frame_loop.shutdown();
        log::info!("[screen] unmounted");
    }

    fn mount(canvas: web::HtmlCanvasElement, config: PreviewConfig) -> LedScreen {
        let scene = LedScene::new(&config);
        let ctx = Rc::new(RefCell::new(FrameContext::new(
            scene,
            FrameDriver::new(config.run),
            canvas,
        )));
        let frame_loop = FrameLoop::new(ctx.clone());
        log::info!(
            "[screen] grid={}x{} leds={} mode={}",
            config.grid.width(),
            config.grid.height(),
            config.grid.num_leds(),
            config.mode
        );

        let resize_ctx = ctx.clone();
        let resize_closure = Closure::wrap(Box::new(move || {
            resize_ctx.borrow_mut().update_size();
        }) as Box<dyn FnMut()>);
        if let Some(window) = web::window() {
            _ = window
                .add_event_listener_with_callback("resize", resize_closure.as_ref().unchecked_ref());
        }
        ctx.borrow_mut().update_size();

        // Microphone first: the permission prompt can take arbitrarily long.
        {
            let frame_loop = frame_loop.clone();
            let settings = config.analyser.clone();
            spawn_local(async move {
                match audio::start_microphone(&settings).await {
                    Ok(analyser) => {
                        let start = {
                            let mut ctx = frame_loop.ctx().borrow_mut();
                            ctx.analyser = Some(analyser);
                            ctx.driver.audio_ready()
                        };
                        if start {
                            frame_loop.request();
                        }
                    }
                    Err(e) => {
                        log::warn!("{}", e);
                        frame_loop.ctx().borrow_mut().driver.permission_denied();
                    }
                }
            });
        }

        {
            let ctx = ctx.clone();
            let roi = config.roi;
            spawn_local(async move {
                let (canvas, positions) = {
                    let c = ctx.borrow();
                    (c.canvas.clone(), c.scene.positions().clone())
                };
                let gpu = frame::init_gpu(canvas, positions, roi).await;
                ctx.borrow_mut().gpu_ready(gpu);
            });
        }

        LedScreen {
            frame_loop,
            resize_closure: Some(resize_closure),
        }
    }
}
