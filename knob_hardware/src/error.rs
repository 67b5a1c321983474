use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("gpio error: {0}")]
    Gpio(String),
    #[error("framebuffer error: {0}")]
    Framebuffer(String),
    #[error("missing display asset: {0}")]
    Asset(String),
    #[error("speech error: {0}")]
    Speech(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
