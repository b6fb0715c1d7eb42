//! Run/stop bookkeeping for the self-scheduling frame loop.
//!
//! Hosts (the browser RAF loop, the winit event loop) own the actual callback
//! and ask the driver what to do at the top of every frame. The run flag is only
//! observed there, so a stop request always lets exactly one already-pending
//! frame through before scheduling ends.

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverState {
    /// Waiting for the microphone grant and GPU setup.
    Initializing,
    Running,
    Stopped,
    PermissionDenied,
    ShaderCompileFailed,
}

impl DriverState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DriverState::Initializing => "initializing",
            DriverState::Running => "running",
            DriverState::Stopped => "stopped",
            DriverState::PermissionDenied => "permission-denied",
            DriverState::ShaderCompileFailed => "shader-compile-failed",
        }
    }

    /// Failure states end the session; the last frame stays on screen.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DriverState::PermissionDenied | DriverState::ShaderCompileFailed
        )
    }
}

impl fmt::Display for DriverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of [`FrameDriver::begin_frame`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameStep {
    /// Request another animation-frame callback.
    pub schedule_next: bool,
    /// Update colors and redraw in this callback.
    pub redraw: bool,
}

impl FrameStep {
    const IDLE: FrameStep = FrameStep {
        schedule_next: false,
        redraw: false,
    };
}

#[derive(Debug)]
pub struct FrameDriver {
    state: DriverState,
    run: bool,
    loop_pending: bool,
    frames: u64,
    unmounted: bool,
}

impl FrameDriver {
    pub fn new(run: bool) -> Self {
        Self {
            state: DriverState::Initializing,
            run,
            loop_pending: false,
            frames: 0,
            unmounted: false,
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn run(&self) -> bool {
        self.run
    }

    /// Whether an animation-frame callback is currently queued.
    pub fn loop_pending(&self) -> bool {
        self.loop_pending
    }

    /// Frames drawn by the audio loop so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn is_unmounted(&self) -> bool {
        self.unmounted
    }

    /// Audio capture is live. Returns `true` when the host must queue the
    /// first callback.
    pub fn audio_ready(&mut self) -> bool {
        if self.unmounted || self.state != DriverState::Initializing {
            return false;
        }
        if self.run {
            self.state = DriverState::Running;
            self.loop_pending = true;
            true
        } else {
            self.state = DriverState::Stopped;
            false
        }
    }

    /// Copies the external `run` prop. Returns `true` when a stopped loop has to
    /// be restarted by queueing a callback.
    pub fn set_run(&mut self, run: bool) -> bool {
        if self.unmounted {
            return false;
        }
        if run != self.run {
            log::info!("[driver] run={}", run);
        }
        self.run = run;
        if run && self.state == DriverState::Stopped && !self.loop_pending {
            self.state = DriverState::Running;
            self.loop_pending = true;
            return true;
        }
        false
    }

    /// Called first thing in every animation-frame callback.
    pub fn begin_frame(&mut self) -> FrameStep {
        self.loop_pending = false;
        if self.unmounted {
            return FrameStep::IDLE;
        }
        match self.state {
            DriverState::Running | DriverState::Stopped => {}
            _ => return FrameStep::IDLE,
        }
        self.frames += 1;
        if self.run {
            self.state = DriverState::Running;
            self.loop_pending = true;
            FrameStep {
                schedule_next: true,
                redraw: true,
            }
        } else {
            if self.state == DriverState::Running {
                log::info!("[driver] stopped after {} frames", self.frames);
            }
            self.state = DriverState::Stopped;
            FrameStep {
                schedule_next: false,
                redraw: true,
            }
        }
    }

    pub fn permission_denied(&mut self) {
        log::warn!("[driver] microphone unavailable; keeping last frame");
        self.state = DriverState::PermissionDenied;
    }

    pub fn shader_failed(&mut self) {
        log::error!("[driver] shader setup failed; rendering disabled");
        self.state = DriverState::ShaderCompileFailed;
    }

    /// Teardown. Returns `true` when the host still has a callback queued that
    /// it should cancel. Safe to call more than once; after the first call the
    /// loop can no longer be restarted.
    pub fn unmount(&mut self) -> bool {
        self.unmounted = true;
        self.run = false;
        if !self.state.is_terminal() {
            self.state = DriverState::Stopped;
        }
        std::mem::take(&mut self.loop_pending)
    }
}

/// GPU viewport covering the whole canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    /// Canvas backing size follows the window's inner size in CSS pixels.
    pub fn for_window(inner_width: f64, inner_height: f64) -> Self {
        Self {
            x: 0,
            y: 0,
            width: (inner_width.max(1.0)) as u32,
            height: (inner_height.max(1.0)) as u32,
        }
    }

    pub fn canvas_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// The viewport to switch to after a resize, or `None` when `next` is
    /// zero-sized or identical to `self`.
    pub fn resized(&self, next: Viewport) -> Option<Viewport> {
        if next.width == 0 || next.height == 0 || next == *self {
            return None;
        }
        Some(next)
    }
}
