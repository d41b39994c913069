use std::{
    path::{Path, PathBuf},
    time::SystemTime,
};

use {hookrelay_channels::CancelCheck, tracing::info};

/// Cancels reply polling once the user answers at the terminal, detected as
/// the transcript's mtime moving past its value when the watch was armed.
///
/// Without a transcript, or when its mtime cannot be read at arming time,
/// the watch never fires.
#[derive(Debug)]
pub struct TranscriptWatch {
    armed: Option<(PathBuf, SystemTime)>,
}

impl TranscriptWatch {
    pub fn arm(path: Option<&Path>) -> Self {
        let armed = path.and_then(|p| modified(p).map(|mtime| (p.to_path_buf(), mtime)));
        Self { armed }
    }
}

impl CancelCheck for TranscriptWatch {
    fn is_cancelled(&self) -> bool {
        let Some((path, baseline)) = &self.armed else {
            return false;
        };
        let moved = modified(path).is_some_and(|now| now > *baseline);
        if moved {
            info!(path = %path.display(), "transcript changed, user answered in terminal");
        }
        moved
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        std::{fs::OpenOptions, time::Duration},
    };

    #[test]
    fn fires_when_transcript_is_touched() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let watch = TranscriptWatch::arm(Some(file.path()));
        assert!(!watch.is_cancelled());

        let handle = OpenOptions::new().write(true).open(file.path()).unwrap();
        handle
            .set_modified(SystemTime::now() + Duration::from_secs(5))
            .unwrap();

        assert!(watch.is_cancelled());
    }

    #[test]
    fn without_transcript_never_fires() {
        assert!(!TranscriptWatch::arm(None).is_cancelled());
        assert!(!TranscriptWatch::arm(Some(Path::new("/nonexistent/t.jsonl"))).is_cancelled());
    }
}
