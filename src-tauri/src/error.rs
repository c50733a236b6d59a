use thiserror::Error;

#[derive(Debug, Error)]
pub enum TryOnError {
    #[error("Image error: {0}")]
    Image(String),

    #[error("Credential error: {0}")]
    Credential(String),

    #[error("Gemini API error: {0}")]
    Api(String),

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl From<TryOnError> for String {
    fn from(err: TryOnError) -> Self {
        err.to_string()
    }
}
