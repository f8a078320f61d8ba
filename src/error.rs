pub type FrameResult<T> = Result<T, FrameError>;

#[derive(thiserror::Error, Debug)]
pub enum FrameError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("tool error: {0}")]
    Tool(String),

    #[error("svg structure error: {0}")]
    SvgStructure(String),

    #[error("fetch error: {0}")]
    Fetch(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FrameError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn tool(msg: impl Into<String>) -> Self {
        Self::Tool(msg.into())
    }

    pub fn svg_structure(msg: impl Into<String>) -> Self {
        Self::SvgStructure(msg.into())
    }

    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch(msg.into())
    }
}
