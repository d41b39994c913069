use std::path::{Path, PathBuf};

use {
    directories::BaseDirs,
    serde_json::Value,
    tracing::{debug, warn},
};

use crate::{
    error::{Error, Result},
    resolve::{Settings, resolve},
    schema::NotifyConfig,
};

pub const CONFIG_FILENAME: &str = "notification-config.json";

/// `~/.claude/claude-notify/configs`, the root of every per-project config.
pub fn configs_dir() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| {
        dirs.home_dir()
            .join(".claude")
            .join("claude-notify")
            .join("configs")
    })
}

/// Absolute project path with every `/` replaced by `-`
/// (`/Users/aaron/foo` becomes `-Users-aaron-foo`).
///
/// The path is made absolute lexically; the project directory is never
/// touched on disk.
pub fn encode_project_path(project_dir: &Path) -> String {
    let absolute = std::path::absolute(project_dir).unwrap_or_else(|_| project_dir.to_path_buf());
    absolute.to_string_lossy().replace('/', "-")
}

pub fn config_path_for(project_dir: &Path) -> Result<PathBuf> {
    let root = configs_dir().ok_or(Error::NoHomeDir)?;
    Ok(root
        .join(encode_project_path(project_dir))
        .join(CONFIG_FILENAME))
}

/// Read a config file. A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<NotifyConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "no config file, using defaults");
        return Ok(NotifyConfig::default());
    }
    let raw = std::fs::read_to_string(path).map_err(Error::io("read", path))?;
    serde_json::from_str(&raw).map_err(Error::parse(path))
}

/// Load and resolve the settings for one project, reading credentials from
/// the process environment.
///
/// A file that cannot be read or parsed is reported and replaced by the
/// defaults, which leaves the project disabled.
pub fn load_settings(project_dir: &Path) -> Result<Settings> {
    let path = config_path_for(project_dir)?;
    let config = match load_config(&path) {
        Ok(config) => config,
        Err(e) => {
            warn!(error = %e, "ignoring unusable config file");
            NotifyConfig::default()
        },
    };
    Ok(resolve(config, project_dir, path, |name| {
        std::env::var(name).ok()
    }))
}

/// Set `section.key = value` in the config file at `path`.
///
/// Creates the parent directory, re-reads the current file (an unreadable
/// file counts as empty) and rewrites it as pretty JSON. Concurrent writers
/// are not coordinated; the last one wins.
pub fn update_config_field(path: &Path, section: &str, key: &str, value: Value) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(Error::io("create", dir))?;
    }

    let mut root = std::fs::read_to_string(path)
        .ok()
        .and_then(|raw| serde_json::from_str::<Value>(&raw).ok())
        .filter(Value::is_object)
        .unwrap_or_else(|| Value::Object(Default::default()));

    let Value::Object(map) = &mut root else {
        return Err(Error::NotAnObject);
    };
    let section_value = map
        .entry(section.to_string())
        .or_insert_with(|| Value::Object(Default::default()));
    if !section_value.is_object() {
        *section_value = Value::Object(Default::default());
    }
    if let Value::Object(section_map) = section_value {
        section_map.insert(key.to_string(), value);
    }

    let mut out = serde_json::to_string_pretty(&root)?;
    out.push('\n');
    std::fs::write(path, out).map_err(Error::io("write", path))?;
    debug!(path = %path.display(), section, key, "config field updated");
    Ok(())
}

pub fn save_topic_id(path: &Path, topic_id: i64) -> Result<()> {
    update_config_field(path, "telegram", "topic_id", Value::from(topic_id))
}

pub fn save_slack_channel_id(path: &Path, channel_id: &str) -> Result<()> {
    update_config_field(path, "slack", "channel_id", Value::from(channel_id))
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_absolute_path() {
        assert_eq!(
            encode_project_path(Path::new("/Users/aaron/foo")),
            "-Users-aaron-foo"
        );
    }

    #[test]
    fn config_path_lives_under_configs_dir() {
        let path = config_path_for(Path::new("/work/proj")).unwrap();
        assert!(path.ends_with("configs/-work-proj/notification-config.json"));
        assert!(path.starts_with(configs_dir().unwrap()));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config(&dir.path().join("absent.json")).unwrap();
        assert!(!cfg.enabled);
        assert_eq!(cfg.reply_timeout, 120);
    }

    #[test]
    fn unparsable_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "{ not json").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, Error::Parse { path: ref p, .. } if p == &path));
        assert!(err.to_string().starts_with("failed to parse"));
    }

    #[test]
    fn update_creates_directory_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILENAME);
        save_topic_id(&path, 42).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.ends_with("}\n"));
        let value: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["telegram"]["topic_id"], 42);
    }

    #[test]
    fn update_preserves_unrelated_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(
            &path,
            r#"{"enabled":true,"slack":{"auto_create_channel":true},"custom":1}"#,
        )
        .unwrap();

        save_slack_channel_id(&path, "C123").unwrap();

        let cfg = load_config(&path).unwrap();
        assert!(cfg.enabled);
        assert!(cfg.slack.auto_create_channel);
        assert_eq!(cfg.slack.channel_id.as_deref(), Some("C123"));
        let value: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["custom"], 1);
    }

    #[test]
    fn update_replaces_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "garbage").unwrap();
        update_config_field(&path, "telegram", "topic_id", Value::from(7)).unwrap();
        assert_eq!(load_config(&path).unwrap().telegram.topic_id, Some(7));
    }
}
