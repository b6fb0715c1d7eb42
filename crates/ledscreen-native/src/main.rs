use std::sync::{Arc, Mutex};
use std::time::Instant;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::Sample;
use winit::{
    event::*,
    event_loop::EventLoop,
    keyboard::{Key, NamedKey},
    window::WindowBuilder,
};

use ledscreen_core::{
    FrameDriver, Grid, LedScene, PreviewConfig, PreviewError, SpectrumAnalyser, Viewport,
};
use ledscreen_render::GpuState;

const WINDOW_TITLE: &str = "LED Screen Preview";

fn config_from_env() -> PreviewConfig {
    let mut config = PreviewConfig::default();
    if let Ok(mode) = std::env::var("LEDSCREEN_MODE") {
        match mode.parse() {
            Ok(m) => config.mode = m,
            Err(e) => log::warn!("LEDSCREEN_MODE: {}; using {}", e, config.mode),
        }
    }
    if let Ok(grid) = std::env::var("LEDSCREEN_GRID") {
        match grid.parse::<Grid>() {
            Ok(g) => config.grid = g,
            Err(e) => log::warn!(
                "LEDSCREEN_GRID: {}; using {}x{}",
                e,
                config.grid.width(),
                config.grid.height()
            ),
        }
    }
    config
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    let config = config_from_env();
    let mut scene = LedScene::new(&config);
    let mut driver = FrameDriver::new(config.run);
    log::info!(
        "[native] grid={}x{} leds={} mode={} run={}",
        config.grid.width(),
        config.grid.height(),
        config.grid.num_leds(),
        config.mode,
        config.run
    );

    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title(WINDOW_TITLE)
        .build(&event_loop)?;

    let analyser = Arc::new(Mutex::new(SpectrumAnalyser::new(config.analyser.clone())));
    let _mic_stream = match start_microphone(Arc::clone(&analyser)) {
        Ok(stream) => {
            if driver.audio_ready() {
                window.request_redraw();
            }
            Some(stream)
        }
        Err(e) => {
            log::warn!("{}", e);
            driver.permission_denied();
            None
        }
    };

    let instance = wgpu::Instance::default();
    let surface = instance.create_surface(&window)?;
    let size = window.inner_size();
    let viewport = Viewport::for_window(size.width as f64, size.height as f64);
    let mut gpu = match pollster::block_on(GpuState::new(
        &instance,
        surface,
        viewport,
        scene.positions(),
        config.roi,
    )) {
        Ok(g) => Some(g),
        Err(e) => {
            log::error!("{}", e);
            driver.shader_failed();
            None
        }
    };

    let window = &window;
    let start = Instant::now();

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { event, .. } => match event {
            WindowEvent::Resized(size) => {
                if let Some(gpu) = gpu.as_mut() {
                    gpu.resize(Viewport::for_window(size.width as f64, size.height as f64));
                }
                window.request_redraw();
            }
            WindowEvent::CloseRequested => {
                driver.unmount();
                elwt.exit();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key,
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => match logical_key {
                Key::Named(NamedKey::Escape) => {
                    driver.unmount();
                    elwt.exit();
                }
                Key::Named(NamedKey::Space) => {
                    if driver.set_run(!driver.run()) {
                        window.request_redraw();
                    }
                }
                Key::Character(c) if c.eq_ignore_ascii_case("m") => {
                    scene.set_mode(scene.mode().toggled());
                }
                _ => {}
            },
            WindowEvent::RedrawRequested => {
                // Only a queued loop callback advances the scene; other
                // redraws (expose, resize) repaint the current colors.
                if driver.loop_pending() {
                    let step = driver.begin_frame();
                    if step.redraw {
                        let ts = start.elapsed().as_secs_f64() * 1000.0;
                        let mut source = analyser.lock().unwrap_or_else(|e| e.into_inner());
                        scene.step(ts, &mut *source);
                    }
                    if step.schedule_next {
                        window.request_redraw();
                    }
                }
                let Some(gpu) = gpu.as_mut() else {
                    return;
                };
                match gpu.render(scene.colors()) {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        gpu.reconfigure()
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => elwt.exit(),
                    Err(e) => log::error!("render error: {:?}", e),
                }
            }
            _ => {}
        },
        Event::LoopExiting => {
            log::info!("[native] exiting after {} frames", driver.frames());
        }
        _ => {}
    })?;
    Ok(())
}

// ---------------- Microphone (cpal) ----------------

/// Opens the default input device and feeds every callback into `analyser`.
fn start_microphone(analyser: Arc<Mutex<SpectrumAnalyser>>) -> Result<cpal::Stream, PreviewError> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| PreviewError::Microphone("no input device".into()))?;
    let supported = device
        .default_input_config()
        .map_err(|e| PreviewError::Microphone(e.to_string()))?;
    let channels = supported.channels() as usize;
    log::info!(
        "[audio] input {:?} rate={} channels={} format={:?}",
        device.name().unwrap_or_default(),
        supported.sample_rate().0,
        channels,
        supported.sample_format()
    );

    let config: cpal::StreamConfig = supported.config();
    let stream = match supported.sample_format() {
        cpal::SampleFormat::F32 => build_input::<f32>(&device, &config, channels, analyser),
        cpal::SampleFormat::I16 => build_input::<i16>(&device, &config, channels, analyser),
        cpal::SampleFormat::U16 => build_input::<u16>(&device, &config, channels, analyser),
        other => {
            return Err(PreviewError::Microphone(format!(
                "unsupported sample format {:?}",
                other
            )))
        }
    }
    .map_err(|e| PreviewError::Microphone(e.to_string()))?;

    stream
        .play()
        .map_err(|e| PreviewError::Microphone(e.to_string()))?;
    Ok(stream)
}

fn build_input<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: usize,
    analyser: Arc<Mutex<SpectrumAnalyser>>,
) -> Result<cpal::Stream, cpal::BuildStreamError>
where
    T: cpal::SizedSample,
    f32: cpal::FromSample<T>,
{
    let mut buf: Vec<f32> = Vec::new();
    device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            buf.clear();
            buf.extend(data.iter().map(|s| s.to_sample::<f32>()));
            let mut analyser = analyser.lock().unwrap_or_else(|e| e.into_inner());
            analyser.push_interleaved(&buf, channels);
        },
        |err| log::error!("audio stream error: {err}"),
        None,
    )
}
