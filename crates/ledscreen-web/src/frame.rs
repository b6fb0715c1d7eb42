use crate::audio::MicAnalyser;
use crate::dom;
use instant::Instant;
use ledscreen_core::{FrameDriver, LedPositions, LedScene, PreviewError, Viewport};
use ledscreen_render::GpuState;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

const FPS_LOG_INTERVAL_SEC: f32 = 10.0;

/// Everything one animation frame touches. Lives in an `Rc<RefCell<_>>`; the
/// browser event loop guarantees color mutation and the redraw that reads it
/// never interleave.
pub struct FrameContext {
    pub scene: LedScene,
    pub driver: FrameDriver,
    pub gpu: Option<GpuState<'static>>,
    pub analyser: Option<MicAnalyser>,
    pub canvas: web::HtmlCanvasElement,
    /// Stored for a future expression-driven mode; nothing reads it yet.
    pub expression: Option<String>,
    pub raf_handle: Option<i32>,
    fps_window_start: Instant,
    fps_frames: u32,
}

impl FrameContext {
    pub fn new(scene: LedScene, driver: FrameDriver, canvas: web::HtmlCanvasElement) -> Self {
        Self {
            scene,
            driver,
            gpu: None,
            analyser: None,
            canvas,
            expression: None,
            raf_handle: None,
            fps_window_start: Instant::now(),
            fps_frames: 0,
        }
    }

    /// Update colors from the microphone, then draw them.
    pub fn frame(&mut self, timestamp_ms: f64) {
        if let Some(analyser) = self.analyser.as_mut() {
            self.scene.step(timestamp_ms, analyser);
        }
        self.redraw();
        self.tick_fps();
    }

    pub fn redraw(&mut self) {
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };
        match gpu.render(self.scene.colors()) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => gpu.reconfigure(),
            Err(e) => log::error!("render error: {:?}", e),
        }
    }

    /// Window resize: new canvas size, matching viewport, redraw.
    pub fn update_size(&mut self) {
        let Some(viewport) = dom::sync_canvas_to_window(&self.canvas) else {
            return;
        };
        if let Some(gpu) = self.gpu.as_mut() {
            gpu.resize(viewport);
        }
        self.redraw();
    }

    pub fn gpu_ready(&mut self, gpu: Result<GpuState<'static>, PreviewError>) {
        match gpu {
            Ok(g) => {
                self.gpu = Some(g);
                self.redraw();
            }
            Err(e) => {
                log::error!("WebGPU init error: {}", e);
                self.driver.shader_failed();
            }
        }
    }

    fn tick_fps(&mut self) {
        self.fps_frames += 1;
        let elapsed = self.fps_window_start.elapsed().as_secs_f32();
        if elapsed >= FPS_LOG_INTERVAL_SEC {
            log::debug!("[frame] fps={:.1}", self.fps_frames as f32 / elapsed);
            self.fps_frames = 0;
            self.fps_window_start = Instant::now();
        }
    }
}

pub async fn init_gpu(
    canvas: web::HtmlCanvasElement,
    positions: LedPositions,
    roi: f32,
) -> Result<GpuState<'static>, PreviewError> {
    let instance = wgpu::Instance::default();
    let surface = instance
        .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
        .map_err(|e| PreviewError::Gpu(e.to_string()))?;
    let viewport = Viewport::for_window(canvas.width() as f64, canvas.height() as f64);
    GpuState::new(&instance, surface, viewport, &positions, roi).await
}

type Tick = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// Self-scheduling requestAnimationFrame loop around a [`FrameContext`].
#[derive(Clone)]
pub struct FrameLoop {
    ctx: Rc<RefCell<FrameContext>>,
    tick: Tick,
}

impl FrameLoop {
    pub fn new(ctx: Rc<RefCell<FrameContext>>) -> Self {
        let tick: Tick = Rc::new(RefCell::new(None));
        let frame_loop = Self {
            ctx: ctx.clone(),
            tick: tick.clone(),
        };
        let inner = frame_loop.clone();
        *tick.borrow_mut() = Some(Closure::wrap(Box::new(move |timestamp_ms: f64| {
            // decide on the next callback before doing this frame's work
            let step = inner.ctx.borrow_mut().driver.begin_frame();
            if step.schedule_next {
                inner.request();
            }
            if step.redraw {
                inner.ctx.borrow_mut().frame(timestamp_ms);
            }
        }) as Box<dyn FnMut(f64)>));
        frame_loop
    }

    pub fn ctx(&self) -> &Rc<RefCell<FrameContext>> {
        &self.ctx
    }

    pub fn request(&self) {
        let Some(window) = web::window() else {
            return;
        };
        let handle = match self.tick.borrow().as_ref() {
            Some(cb) => window.request_animation_frame(cb.as_ref().unchecked_ref()),
            None => return,
        };
        match handle {
            Ok(h) => self.ctx.borrow_mut().raf_handle = Some(h),
            Err(e) => log::error!("requestAnimationFrame error: {:?}", e),
        }
    }

    /// Cancels the queued callback and drops the closure, breaking the
    /// `tick -> closure -> FrameLoop -> tick` cycle. Idempotent.
    pub fn shutdown(&self) {
        let (pending, handle) = {
            let mut ctx = self.ctx.borrow_mut();
            (ctx.driver.unmount(), ctx.raf_handle.take())
        };
        // a handle that already fired cancels as a no-op
        if let Some(handle) = handle {
            if let Some(window) = web::window() {
                _ = window.cancel_animation_frame(handle);
            }
        }
        if pending {
            log::debug!("[frame] cancelled pending animation frame");
        }
        self.tick.borrow_mut().take();
    }

    pub fn is_shut_down(&self) -> bool {
        self.ctx.borrow().driver.is_unmounted()
    }
}
