use serde::Deserialize;
use std::time::Duration;

/// Timing for the auto-save rules, usually read from the `[autosave]`
/// table of `storyforge.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AutoSaveConfig {
    /// Quiet period after the last edit
    #[serde(with = "humantime_serde")]
    pub debounce: Duration,
    /// Period of the backstop check
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
    /// Treat restored content as already saved
    pub resync_after_restore: bool,
}

impl Default for AutoSaveConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_secs(5),
            interval: Duration::from_secs(120),
            resync_after_restore: false,
        }
    }
}

impl AutoSaveConfig {
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_resync_after_restore(mut self, resync: bool) -> Self {
        self.resync_after_restore = resync;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AutoSaveConfig::default();
        assert_eq!(config.debounce, Duration::from_secs(5));
        assert_eq!(config.interval, Duration::from_secs(120));
        assert!(!config.resync_after_restore);
    }

    #[test]
    fn test_parse_humantime_durations() {
        let config: AutoSaveConfig = toml::from_str(
            r#"
debounce = "750ms"
interval = "1m 30s"
resync_after_restore = true
"#,
        )
        .unwrap();
        assert_eq!(config.debounce, Duration::from_millis(750));
        assert_eq!(config.interval, Duration::from_secs(90));
        assert!(config.resync_after_restore);
    }

    #[test]
    fn test_missing_keys_fall_back_to_defaults() {
        let config: AutoSaveConfig = toml::from_str(r#"debounce = "2s""#).unwrap();
        assert_eq!(config.debounce, Duration::from_secs(2));
        assert_eq!(config.interval, Duration::from_secs(120));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result: Result<AutoSaveConfig, _> = toml::from_str(r#"debounc = "2s""#);
        assert!(result.is_err());
    }
}
