use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The Bot API answered `ok: false`.
    #[error("telegram api error {code}: {description}")]
    Api { code: i64, description: String },

    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    #[error("{message}")]
    Message { message: String },
}

impl Error {
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }
}

impl From<Error> for hookrelay_channels::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Api { code, description } => Self::destination(code.to_string(), description),
            other => Self::transport("telegram", other),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
