use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::controller::AutoSaveConfig;
use crate::retry::RetryPolicy;

const DEFAULT_CONFIG: &str = include_str!("../config.toml");

#[derive(Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    autosave: AutosaveSection,
    #[serde(default)]
    retry: RetrySection,
    #[serde(default)]
    local: LocalSection,
    #[serde(default)]
    remote: RemoteSection,
}

#[derive(Deserialize, Default)]
struct AutosaveSection {
    enabled: Option<bool>,
    idle_ms: Option<u64>,
    max_wait_ms: Option<u64>,
}

#[derive(Deserialize, Default)]
struct RetrySection {
    policy: Option<String>,
    base_ms: Option<u64>,
    max_ms: Option<u64>,
}

#[derive(Deserialize, Default)]
struct LocalSection {
    enabled: Option<bool>,
    quota_bytes: Option<usize>,
    key: Option<String>,
}

#[derive(Deserialize, Default)]
struct RemoteSection {
    path: Option<PathBuf>,
}

pub struct Config {
    autosave: AutosaveSection,
    retry: RetrySection,
    local: LocalSection,
    remote: RemoteSection,
}

impl Config {
    /// Embedded defaults merged with the user's config file, if any.
    pub fn load() -> Self {
        let mut config = Self::embedded();
        if let Some(path) = user_config_path() {
            if path.exists() {
                match std::fs::read_to_string(&path) {
                    Ok(contents) => {
                        if let Err(e) = config.merge_str(&contents) {
                            log::warn!(target: "config", "ignoring malformed config {}: {}", path.display(), e)
                        }
                    }
                    Err(e) => {
                        log::warn!(target: "config", "could not read config {}: {}", path.display(), e)
                    }
                }
            }
        }
        config
    }

    /// Embedded defaults only.
    pub fn embedded() -> Self {
        let base: ConfigFile = toml::from_str(DEFAULT_CONFIG).unwrap_or_else(|e| {
            log::error!(target: "config", "embedded config.toml is invalid: {}", e);
            ConfigFile::default()
        });
        Config {
            autosave: base.autosave,
            retry: base.retry,
            local: base.local,
            remote: base.remote,
        }
    }

    /// Overlay the keys present in `contents` on top of the current values.
    pub fn merge_str(&mut self, contents: &str) -> Result<(), toml::de::Error> {
        let user: ConfigFile = toml::from_str(contents)?;
        merge_autosave(&mut self.autosave, user.autosave);
        merge_retry(&mut self.retry, user.retry);
        merge_local(&mut self.local, user.local);
        if user.remote.path.is_some() {
            self.remote.path = user.remote.path;
        }
        Ok(())
    }

    pub fn autosave_enabled(&self) -> bool {
        self.autosave.enabled.unwrap_or(true)
    }

    /// Quiet period after the last change before saving (clamped to 50ms..10min).
    pub fn idle_interval(&self) -> Duration {
        let ms = self.autosave.idle_ms.unwrap_or(1500).clamp(50, 600_000);
        Duration::from_millis(ms)
    }

    /// Upper bound on how long continuous edits can postpone a save.
    /// Never shorter than the idle interval.
    pub fn max_wait(&self) -> Duration {
        let ms = self.autosave.max_wait_ms.unwrap_or(15_000).clamp(50, 3_600_000);
        Duration::from_millis(ms).max(self.idle_interval())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        let base = Duration::from_millis(self.retry.base_ms.unwrap_or(1000).clamp(10, 600_000));
        let max = Duration::from_millis(self.retry.max_ms.unwrap_or(60_000).clamp(10, 3_600_000));
        match self.retry.policy.as_deref().and_then(parse_policy) {
            Some(PolicyKind::Fixed) => RetryPolicy::Fixed(base),
            Some(PolicyKind::Exponential) | None => RetryPolicy::Exponential {
                base,
                max: max.max(base),
            },
        }
    }

    /// A quota of 0 turns the fallback off.
    pub fn local_enabled(&self) -> bool {
        self.local.enabled.unwrap_or(true) && self.local.quota_bytes != Some(0)
    }

    /// Fallback store size limit (clamped to 1KiB..1GiB).
    pub fn local_quota_bytes(&self) -> usize {
        self.local
            .quota_bytes
            .unwrap_or(5 * 1024 * 1024)
            .clamp(1024, 1024 * 1024 * 1024)
    }

    pub fn local_key(&self) -> String {
        self.local
            .key
            .clone()
            .filter(|k| !k.is_empty())
            .unwrap_or_else(|| "savepoint.pending".to_string())
    }

    /// Remote document path; relative paths resolve under the data directory.
    pub fn remote_path(&self) -> PathBuf {
        let path = self
            .remote
            .path
            .clone()
            .unwrap_or_else(|| PathBuf::from("remote/document.txt"));
        if path.is_absolute() {
            path
        } else {
            data_dir().join(path)
        }
    }

    pub fn autosave(&self) -> AutoSaveConfig {
        AutoSaveConfig {
            enabled: self.autosave_enabled(),
            idle_interval: self.idle_interval(),
            max_wait: self.max_wait(),
            retry: self.retry_policy(),
            local_key: self.local_key(),
        }
    }
}

/// Platform data directory for savepoint (`~/.local/share/savepoint` on Linux).
pub fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("savepoint")
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("savepoint").join("config.toml"))
}

fn merge_autosave(base: &mut AutosaveSection, user: AutosaveSection) {
    if user.enabled.is_some() {
        base.enabled = user.enabled;
    }
    if user.idle_ms.is_some() {
        base.idle_ms = user.idle_ms;
    }
    if user.max_wait_ms.is_some() {
        base.max_wait_ms = user.max_wait_ms;
    }
}

fn merge_retry(base: &mut RetrySection, user: RetrySection) {
    if user.policy.is_some() {
        base.policy = user.policy;
    }
    if user.base_ms.is_some() {
        base.base_ms = user.base_ms;
    }
    if user.max_ms.is_some() {
        base.max_ms = user.max_ms;
    }
}

fn merge_local(base: &mut LocalSection, user: LocalSection) {
    if user.enabled.is_some() {
        base.enabled = user.enabled;
    }
    if user.quota_bytes.is_some() {
        base.quota_bytes = user.quota_bytes;
    }
    if user.key.is_some() {
        base.key = user.key;
    }
}

#[derive(Debug, PartialEq, Eq)]
enum PolicyKind {
    Fixed,
    Exponential,
}

fn parse_policy(s: &str) -> Option<PolicyKind> {
    match s.to_lowercase().as_str() {
        "fixed" | "constant" => Some(PolicyKind::Fixed),
        "exponential" | "exp" => Some(PolicyKind::Exponential),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_embedded_config() {
        let config = Config::embedded();
        assert!(config.autosave_enabled());
        assert_eq!(config.idle_interval(), Duration::from_millis(1500));
        assert_eq!(config.max_wait(), Duration::from_secs(15));
        assert_eq!(
            config.retry_policy(),
            RetryPolicy::Exponential {
                base: Duration::from_secs(1),
                max: Duration::from_secs(60),
            }
        );
        assert!(config.local_enabled());
        assert_eq!(config.local_quota_bytes(), 5 * 1024 * 1024);
        assert_eq!(config.local_key(), "savepoint.pending");
        assert!(config.remote_path().ends_with("remote/document.txt"));
    }

    #[test]
    fn test_user_override_merges_per_field() {
        let mut config = Config::embedded();
        config
            .merge_str("[autosave]\nidle_ms = 200\n\n[retry]\npolicy = \"fixed\"\n")
            .unwrap();
        assert_eq!(config.idle_interval(), Duration::from_millis(200));
        // untouched keys keep their defaults
        assert_eq!(config.max_wait(), Duration::from_secs(15));
        assert!(config.autosave_enabled());
        assert_eq!(
            config.retry_policy(),
            RetryPolicy::Fixed(Duration::from_secs(1))
        );
    }

    #[test]
    fn test_malformed_override_is_rejected_without_changes() {
        let mut config = Config::embedded();
        assert!(config.merge_str("[autosave\nidle_ms = ").is_err());
        assert_eq!(config.idle_interval(), Duration::from_millis(1500));
    }

    #[test]
    fn test_values_are_clamped() {
        let mut config = Config::embedded();
        config
            .merge_str("[autosave]\nidle_ms = 1\nmax_wait_ms = 2\n")
            .unwrap();
        assert_eq!(config.idle_interval(), Duration::from_millis(50));
        assert!(config.max_wait() >= config.idle_interval());
    }

    #[test]
    fn test_local_quota_is_clamped_and_zero_disables() {
        let mut config = Config::embedded();
        config.merge_str("[local]
quota_bytes = 10
").unwrap();
        assert!(config.local_enabled());
        assert_eq!(config.local_quota_bytes(), 1024);

        config.merge_str("[local]
quota_bytes = 0
").unwrap();
        assert!(!config.local_enabled());
    }

    #[test]
    fn test_absolute_remote_path_is_kept() {
        let mut config = Config::embedded();
        config
            .merge_str("[remote]\npath = \"/srv/doc.txt\"\n")
            .unwrap();
        assert_eq!(config.remote_path(), PathBuf::from("/srv/doc.txt"));
    }

    #[test]
    fn test_parse_policy() {
        assert_eq!(parse_policy("Fixed"), Some(PolicyKind::Fixed));
        assert_eq!(parse_policy("exp"), Some(PolicyKind::Exponential));
        assert_eq!(parse_policy("linear"), None);
    }

    #[test]
    fn test_autosave_config_mirrors_sections() {
        let config = Config::embedded();
        let autosave = config.autosave();
        assert!(autosave.enabled);
        assert_eq!(autosave.idle_interval, config.idle_interval());
        assert_eq!(autosave.local_key, "savepoint.pending");
    }
}
