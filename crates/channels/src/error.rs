use std::error::Error as StdError;

/// Crate-wide result type for channel operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Channel failures. Each variant maps to a stable [`Error::kind`] tag.
///
/// A poll timeout is not an error: pollers return `None`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing credentials or destination input. Never retried.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// The platform rejected creating or looking up a destination.
    #[error("destination error ({code}): {message}")]
    Destination { code: String, message: String },

    /// The platform rejected one chunk of a send. Earlier chunks may have
    /// been delivered.
    #[error("send failed at chunk {chunk_index}: {message}")]
    Send { chunk_index: usize, message: String },

    /// Network failure, HTTP timeout or unparsable response on a single call.
    #[error("transport error: {context}: {source}")]
    Transport {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl Error {
    #[must_use]
    pub fn config(message: impl std::fmt::Display) -> Self {
        Self::Config {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn destination(code: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Destination {
            code: code.into(),
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn send(chunk_index: usize, message: impl std::fmt::Display) -> Self {
        Self::Send {
            chunk_index,
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn transport(
        context: impl Into<String>,
        source: impl Into<Box<dyn StdError + Send + Sync>>,
    ) -> Self {
        Self::Transport {
            context: context.into(),
            source: source.into(),
        }
    }

    /// Stable tag for logs and structured error output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config { .. } => "config_error",
            Self::Destination { .. } => "destination_error",
            Self::Send { .. } => "send_error",
            Self::Transport { .. } => "transport_error",
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    #[rstest]
    #[case(Error::config("no token"), "config_error")]
    #[case(Error::destination("restricted_action", "nope"), "destination_error")]
    #[case(Error::send(2, "bad request"), "send_error")]
    #[case(Error::transport("getUpdates", "connection reset"), "transport_error")]
    fn kind_tags_are_stable(#[case] err: Error, #[case] tag: &str) {
        assert_eq!(err.kind(), tag);
    }

    #[test]
    fn send_error_names_chunk() {
        let err = Error::send(3, "Bad Request: can't parse entities");
        assert_eq!(
            err.to_string(),
            "send failed at chunk 3: Bad Request: can't parse entities"
        );
    }

    #[test]
    fn transport_error_keeps_source() {
        let err = Error::transport("sendMessage", "timed out");
        assert!(StdError::source(&err).is_some());
    }
}
