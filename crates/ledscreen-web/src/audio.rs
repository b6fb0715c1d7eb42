use ledscreen_core::{AnalyserSettings, PreviewError, SpectrumSource};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

/// Microphone → `AnalyserNode` graph. Kept alive for the component's lifetime.
pub struct MicAnalyser {
    _audio_ctx: web::AudioContext,
    _source: web::MediaStreamAudioSourceNode,
    node: web::AnalyserNode,
}

impl SpectrumSource for MicAnalyser {
    fn bin_count(&self) -> usize {
        self.node.frequency_bin_count() as usize
    }

    fn read_bytes(&mut self, out: &mut [u8]) {
        out.fill(0);
        self.node.get_byte_frequency_data(out);
    }
}

fn mic_err(what: &str, e: JsValue) -> PreviewError {
    PreviewError::Microphone(format!("{}: {:?}", what, e))
}

/// Asks for microphone access and builds the analyser graph.
///
/// Suspends until the user answers the permission prompt; there is no timeout.
pub async fn start_microphone(settings: &AnalyserSettings) -> Result<MicAnalyser, PreviewError> {
    let window = web::window().ok_or_else(|| PreviewError::Microphone("no window".into()))?;
    let devices = window
        .navigator()
        .media_devices()
        .map_err(|e| mic_err("mediaDevices", e))?;
    let constraints = web::MediaStreamConstraints::new();
    constraints.set_audio(&JsValue::TRUE);
    constraints.set_video(&JsValue::FALSE);
    let promise = devices
        .get_user_media_with_constraints(&constraints)
        .map_err(|e| mic_err("getUserMedia", e))?;
    let stream: web::MediaStream = JsFuture::from(promise)
        .await
        .map_err(|e| mic_err("permission", e))?
        .dyn_into()
        .map_err(|e| mic_err("stream", e))?;
    log::info!("[audio] microphone stream {}", stream.id());

    let audio_ctx = web::AudioContext::new().map_err(|e| mic_err("AudioContext", e))?;
    let source = audio_ctx
        .create_media_stream_source(&stream)
        .map_err(|e| mic_err("MediaStreamSource", e))?;
    let node = audio_ctx
        .create_analyser()
        .map_err(|e| mic_err("AnalyserNode", e))?;
    node.set_min_decibels(settings.min_db as f64);
    node.set_max_decibels(settings.max_db as f64);
    node.set_smoothing_time_constant(settings.smoothing as f64);
    node.set_fft_size(settings.fft_size as u32);
    source
        .connect_with_audio_node(&node)
        .map_err(|e| mic_err("connect", e))?;
    if audio_ctx.state() == web::AudioContextState::Suspended {
        _ = audio_ctx.resume();
    }
    log::info!(
        "[audio] analyser fft={} bins={} db=[{}, {}] smoothing={}",
        settings.fft_size,
        node.frequency_bin_count(),
        settings.min_db,
        settings.max_db,
        settings.smoothing
    );

    Ok(MicAnalyser {
        _audio_ctx: audio_ctx,
        _source: source,
        node,
    })
}
