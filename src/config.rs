use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::utils::LowercaseString;

fn default_api_version() -> String {
    String::from("v2.1")
}

fn default_features() -> Vec<String> {
    ["Tags", "Faces", "Objects", "Description"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_message() -> String {
    String::from("Motion detected")
}

fn default_telegram_base() -> String {
    String::from("https://api.telegram.org")
}

fn default_snapshot_dir() -> PathBuf {
    PathBuf::from("/var/lib/motion")
}

fn default_snapshot_suffix() -> String {
    String::from("-snapshot.jpg")
}

fn lowercase_all(items: &[&str]) -> Vec<LowercaseString> {
    items.iter().map(|s| LowercaseString::new(*s)).collect()
}

fn default_objects() -> Vec<LowercaseString> {
    lowercase_all(&["person", "animal", "mammal"])
}

fn default_tags() -> Vec<LowercaseString> {
    lowercase_all(&["person", "animal", "mammal", "clothing"])
}

fn default_phrases() -> Vec<LowercaseString> {
    lowercase_all(&["a person", "a man", "a woman", "a dog", "a cat"])
}

fn default_min_confidence() -> f32 {
    0.5
}

fn default_attempts() -> u32 {
    3
}

fn default_backoff_ms() -> u64 {
    500
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize)]
pub struct VisionConfig {
    pub endpoint: String,
    pub subscription_key: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_features")]
    pub features: Vec<String>,
}

/// Either a numeric chat id such as `-100200` or a `@channelusername`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ChatId {
    Id(i64),
    Username(String),
}

impl std::fmt::Display for ChatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => id.fmt(f),
            Self::Username(name) => name.fmt(f),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TelegramConfig {
    pub token: String,
    pub chat_id: ChatId,
    #[serde(default = "default_message")]
    pub message: String,
    #[serde(default = "default_telegram_base")]
    pub api_base: String,
}

#[derive(Debug, Deserialize)]
pub struct BlobConfig {
    /// e.g. `https://myaccount.blob.core.windows.net`
    pub account_url: String,
    pub container: String,
    pub sas_token: String,
}

#[derive(Debug, Deserialize)]
pub struct SnapshotConfig {
    #[serde(default = "default_snapshot_dir")]
    pub directory: PathBuf,
    #[serde(default = "default_snapshot_suffix")]
    pub suffix: String,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            directory: default_snapshot_dir(),
            suffix: default_snapshot_suffix(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RulesConfig {
    #[serde(default = "default_objects")]
    pub objects: Vec<LowercaseString>,
    #[serde(default = "default_tags")]
    pub tags: Vec<LowercaseString>,
    #[serde(default = "default_phrases")]
    pub phrases: Vec<LowercaseString>,
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f32,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            objects: default_objects(),
            tags: default_tags(),
            phrases: default_phrases(),
            min_confidence: default_min_confidence(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_attempts")]
    pub attempts: u32,
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: default_attempts(),
            backoff_ms: default_backoff_ms(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub vision: VisionConfig,
    pub telegram: TelegramConfig,
    pub blob: Option<BlobConfig>,
    #[serde(default)]
    pub snapshots: SnapshotConfig,
    #[serde(default)]
    pub rules: RulesConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    pub logfile: Option<PathBuf>,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .with_context(|| format!("opening config file {path:?}"))?;
        let config: Config = serde_json::from_reader(std::io::BufReader::new(file))
            .with_context(|| format!("parsing config file {path:?}"))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.vision.endpoint.trim().is_empty() {
            anyhow::bail!("vision.endpoint must not be empty");
        }
        if self.telegram.token.trim().is_empty() {
            anyhow::bail!("telegram.token must not be empty");
        }
        if !(0.0..=1.0).contains(&self.rules.min_confidence) {
            anyhow::bail!(
                "rules.min_confidence must be between 0 and 1, got {}",
                self.rules.min_confidence
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const MINIMAL: &str = r#"{
        "vision": { "endpoint": "https://westeurope.api.cognitive.microsoft.com/", "subscription_key": "abc" },
        "telegram": { "token": "123:xyz", "chat_id": "-100200" }
    }"#;

    fn write_config(text: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    #[test]
    fn minimal_uses_defaults() {
        let file = write_config(MINIMAL);
        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.vision.api_version, "v2.1");
        assert_eq!(
            config.vision.features,
            vec!["Tags", "Faces", "Objects", "Description"]
        );
        assert_eq!(config.telegram.message, "Motion detected");
        assert_eq!(config.telegram.api_base, "https://api.telegram.org");
        assert!(config.blob.is_none());
        assert_eq!(config.snapshots.directory, PathBuf::from("/var/lib/motion"));
        assert_eq!(config.snapshots.suffix, "-snapshot.jpg");
        assert_eq!(config.retry.attempts, 3);
        assert_eq!(config.timeout_secs, 30);
        assert!(config
            .rules
            .tags
            .contains(&LowercaseString::new("clothing")));
    }

    #[test]
    fn rules_are_lowercased() {
        let file = write_config(
            r#"{
            "vision": { "endpoint": "https://x/", "subscription_key": "abc" },
            "telegram": { "token": "t", "chat_id": "1" },
            "rules": { "objects": ["Person", "DOG"], "min_confidence": 0.8 },
            "blob": { "account_url": "https://acct.blob.core.windows.net", "container": "motion", "sas_token": "sv=1" }
        }"#,
        );
        let config = Config::load(file.path()).unwrap();

        assert_eq!(
            config.rules.objects,
            vec![LowercaseString::new("person"), LowercaseString::new("dog")]
        );
        assert_eq!(config.rules.min_confidence, 0.8);
        assert_eq!(config.blob.unwrap().container, "motion");
    }

    #[test]
    fn missing_token_fails() {
        let file = write_config(
            r#"{ "vision": { "endpoint": "https://x/", "subscription_key": "abc" },
                 "telegram": { "chat_id": "1" } }"#,
        );
        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn chat_id_number_or_string() {
        let numeric = write_config(
            r#"{ "vision": { "endpoint": "https://x/", "subscription_key": "abc" },
                 "telegram": { "token": "t", "chat_id": -100200 } }"#,
        );
        let config = Config::load(numeric.path()).unwrap();
        assert_eq!(config.telegram.chat_id, ChatId::Id(-100200));
        assert_eq!(config.telegram.chat_id.to_string(), "-100200");

        let named = write_config(
            r#"{ "vision": { "endpoint": "https://x/", "subscription_key": "abc" },
                 "telegram": { "token": "t", "chat_id": "@frontdoor" } }"#,
        );
        let config = Config::load(named.path()).unwrap();
        assert_eq!(
            config.telegram.chat_id,
            ChatId::Username("@frontdoor".into())
        );
    }

    #[test]
    fn bad_confidence_fails() {
        let file = write_config(
            r#"{ "vision": { "endpoint": "https://x/", "subscription_key": "abc" },
                 "telegram": { "token": "t", "chat_id": "1" },
                 "rules": { "min_confidence": 1.5 } }"#,
        );
        let err = Config::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("min_confidence"));
    }

    #[test]
    fn example_config_parses() {
        let file = write_config(include_str!("../config.example.json"));
        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.retry.backoff_ms, 500);
        assert_eq!(
            config.logfile,
            Some(PathBuf::from("/var/log/motion-notify.log"))
        );
        assert!(config.blob.is_some());
    }

    #[test]
    fn missing_file_fails() {
        assert!(Config::load("/definitely/not/here/config.json").is_err());
    }
}
