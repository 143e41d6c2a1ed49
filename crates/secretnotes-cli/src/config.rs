use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use secretnotes_core::crypto::{EnvelopeFormat, KdfParams, PassphrasePolicy, WriteFormat};
use secretnotes_core::service::{ServiceOptions, DEFAULT_MAX_ATTACHMENT_BYTES};

use crate::constants::APP_DIR;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnConfig {
    #[serde(default)]
    pub store: StoreSection,
    #[serde(default)]
    pub security: SecuritySection,
    #[serde(default)]
    pub attachments: AttachmentsSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecuritySection {
    pub min_passphrase_length: usize,
    pub envelope_format: EnvelopeChoice,
    /// KDF for versioned envelopes; ignored for legacy writes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kdf: Option<KdfParams>,
}

impl Default for SecuritySection {
    fn default() -> Self {
        Self {
            min_passphrase_length: PassphrasePolicy::default().min_length(),
            envelope_format: EnvelopeChoice::Legacy,
            kdf: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AttachmentsSection {
    pub max_bytes: u64,
}

impl Default for AttachmentsSection {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_ATTACHMENT_BYTES,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeChoice {
    /// salt ‖ nonce ‖ ciphertext, PBKDF2 with 10 000 rounds
    #[default]
    Legacy,
    /// Versioned header with recorded KDF parameters
    V1,
}

impl EnvelopeChoice {
    pub fn envelope_format(self) -> EnvelopeFormat {
        match self {
            EnvelopeChoice::Legacy => EnvelopeFormat::Legacy,
            EnvelopeChoice::V1 => EnvelopeFormat::Versioned,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EnvelopeChoice::Legacy => "legacy",
            EnvelopeChoice::V1 => "v1",
        }
    }
}

impl SnConfig {
    pub fn new(store_path: &Path, strict: bool, format: EnvelopeChoice) -> Self {
        let policy = if strict {
            PassphrasePolicy::strict()
        } else {
            PassphrasePolicy::default()
        };
        Self {
            store: StoreSection {
                path: Some(store_path.to_string_lossy().to_string()),
            },
            security: SecuritySection {
                min_passphrase_length: policy.min_length(),
                envelope_format: format,
                kdf: match format {
                    EnvelopeChoice::Legacy => None,
                    EnvelopeChoice::V1 => Some(KdfParams::argon2id()),
                },
            },
            attachments: AttachmentsSection::default(),
        }
    }

    pub fn policy(&self) -> PassphrasePolicy {
        PassphrasePolicy::new(self.security.min_passphrase_length)
    }

    /// Write format selected by `choice`, using the configured KDF for v1.
    pub fn write_format_for(&self, choice: EnvelopeChoice) -> anyhow::Result<WriteFormat> {
        match choice {
            EnvelopeChoice::Legacy => Ok(WriteFormat::Legacy),
            EnvelopeChoice::V1 => {
                let kdf = self.security.kdf.unwrap_or_else(KdfParams::argon2id);
                kdf.validate()
                    .map_err(|e| anyhow::anyhow!("Invalid [security.kdf] settings: {}", e))?;
                Ok(WriteFormat::Versioned(kdf))
            }
        }
    }

    pub fn service_options(&self) -> anyhow::Result<ServiceOptions> {
        Ok(ServiceOptions {
            policy: self.policy(),
            write_format: self.write_format_for(self.security.envelope_format)?,
            max_attachment_bytes: self.attachments.max_bytes,
        })
    }
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("config.toml"))
}

pub fn default_store_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_data_dir()?.join("notes.db"))
}

pub fn read_config(path: &Path) -> anyhow::Result<SnConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))
}

pub fn write_config(path: &Path, config: &SnConfig) -> anyhow::Result<()> {
    let contents =
        toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("TOML error: {}", e))?;
    secretnotes_core::fs::write_atomic(path, contents.as_bytes())
        .map_err(|e| anyhow::anyhow!("Failed to write config {}: {}", path.display(), e))?;
    Ok(())
}

pub fn xdg_config_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_CONFIG_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join(APP_DIR));
        }
    }
    Ok(home_dir()?.join(".config").join(APP_DIR))
}

pub fn xdg_data_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_DATA_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join(APP_DIR));
        }
    }
    Ok(home_dir()?.join(".local").join("share").join(APP_DIR))
}

fn home_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| anyhow::anyhow!("HOME is not set; cannot resolve default paths"))?;
    Ok(PathBuf::from(home))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: SnConfig = toml::from_str("").unwrap();
        assert!(config.store.path.is_none());
        assert_eq!(config.security.min_passphrase_length, 3);
        assert_eq!(config.security.envelope_format, EnvelopeChoice::Legacy);
        assert_eq!(config.attachments.max_bytes, DEFAULT_MAX_ATTACHMENT_BYTES);

        let options = config.service_options().unwrap();
        assert_eq!(options.write_format, WriteFormat::Legacy);
        assert_eq!(options.policy.min_length(), 3);
    }

    #[test]
    fn test_parse_v1_with_kdf_table() {
        let contents = r#"
[store]
path = "/tmp/notes.db"

[security]
min_passphrase_length = 12
envelope_format = "v1"

[security.kdf]
algorithm = "argon2id"
memory_kib = 19456
iterations = 2
parallelism = 1
"#;
        let config: SnConfig = toml::from_str(contents).unwrap();
        assert_eq!(config.store.path.as_deref(), Some("/tmp/notes.db"));
        assert_eq!(config.policy().min_length(), 12);

        let options = config.service_options().unwrap();
        assert_eq!(
            options.write_format,
            WriteFormat::Versioned(KdfParams::Argon2id {
                memory_kib: 19456,
                iterations: 2,
                parallelism: 1,
            })
        );
    }

    #[test]
    fn test_invalid_kdf_rejected() {
        let contents = r#"
[security]
envelope_format = "v1"

[security.kdf]
algorithm = "pbkdf2_sha256"
rounds = 5
"#;
        let config: SnConfig = toml::from_str(contents).unwrap();
        assert!(config.service_options().is_err());
    }

    #[test]
    fn test_strict_init_config_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secretnotes").join("config.toml");
        let config = SnConfig::new(Path::new("/data/notes.db"), true, EnvelopeChoice::V1);

        write_config(&path, &config).unwrap();
        let loaded = read_config(&path).unwrap();

        assert_eq!(loaded.security.min_passphrase_length, 32);
        assert_eq!(loaded.security.envelope_format, EnvelopeChoice::V1);
        assert_eq!(loaded.security.kdf, Some(KdfParams::argon2id()));
        assert_eq!(loaded.store.path.as_deref(), Some("/data/notes.db"));
    }
}
