//! Local alert sound (macOS system sounds via `afplay`).

use std::{
    path::PathBuf,
    process::{Command, Stdio},
};

use tracing::{debug, warn};

const SOUNDS_DIR: &str = "/System/Library/Sounds";
const DEFAULT_SOUND: &str = "Glass";

/// System sound file for a configured sound name; `None` when muted.
pub fn sound_file(name: &str) -> Option<PathBuf> {
    let file = match name.trim() {
        "" | "silent" => return None,
        "default" => DEFAULT_SOUND,
        other => other,
    };
    Some(PathBuf::from(SOUNDS_DIR).join(format!("{file}.aiff")))
}

/// Start playing `name` and return immediately.
pub fn play(name: &str) {
    let Some(file) = sound_file(name) else {
        return;
    };
    if !cfg!(target_os = "macos") {
        debug!(sound = name, "local sounds are only played on macOS");
        return;
    }
    if !file.exists() {
        warn!(path = %file.display(), "sound file not found");
        return;
    }
    match Command::new("afplay")
        .arg(&file)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
    {
        Ok(_) => debug!(sound = name, "playing sound"),
        Err(e) => warn!(error = %e, "failed to start afplay"),
    }
}

#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    #[rstest]
    #[case("default", Some("/System/Library/Sounds/Glass.aiff"))]
    #[case("Ping", Some("/System/Library/Sounds/Ping.aiff"))]
    #[case("silent", None)]
    #[case("", None)]
    fn resolves_sound_names(#[case] name: &str, #[case] expected: Option<&str>) {
        assert_eq!(sound_file(name), expected.map(PathBuf::from));
    }
}
