use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The Web API answered `ok: false`.
    #[error("slack {method} failed: {code}")]
    Api { method: String, code: String },

    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Slack error string (`name_taken`, `channel_not_found`, ...).
    pub fn api_code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => Some(code),
            _ => None,
        }
    }
}

impl From<Error> for hookrelay_channels::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Api { method, code } => Self::destination(code, format!("slack {method}")),
            other => Self::transport("slack", other),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
