/// Error type shared by the core crate
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GazerError {
    #[error("failed to import glTF: {0}")]
    Gltf(#[from] gltf::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),

    #[error("invalid viewport {width}x{height}: both sides must be positive")]
    InvalidViewport { width: f32, height: f32 },

    #[error("model contains no scene")]
    EmptyModel,
}

pub type Result<T> = std::result::Result<T, GazerError>;
