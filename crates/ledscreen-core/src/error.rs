use thiserror::Error;

/// Everything that can go wrong while setting up or driving the preview.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PreviewError {
    #[error("grid must be at least 1x1, got {width}x{height}")]
    InvalidGrid { width: u32, height: u32 },

    #[error("cannot parse grid {0:?}, expected WxH such as \"21x13\"")]
    GridSyntax(String),

    #[error("shader compilation failed: {0}")]
    ShaderCompile(String),

    #[error("microphone unavailable: {0}")]
    Microphone(String),

    #[error("gpu error: {0}")]
    Gpu(String),

    #[error("unknown color mode: {0}")]
    InvalidMode(String),
}

pub type Result<T> = std::result::Result<T, PreviewError>;
