use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use ed25519_dalek::VerifyingKey;
use secrecy::SecretString;

use crate::backup::DEFAULT_INTERVAL;
use crate::error::AppError;
use crate::ledger::Ledger;
use crate::machine::EmojiSet;

const DEFAULT_LEDGER_PATH: &str = "db";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// S3-compatible bucket the backups are uploaded to.
#[derive(Clone)]
pub struct S3Config {
    pub access_key: SecretString,
    pub secret_key: SecretString,
    pub region: String,
    pub endpoint: String,
    pub bucket: String,
}

impl fmt::Debug for S3Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3Config")
            .field("access_key", &"[REDACTED]")
            .field("secret_key", &"[REDACTED]")
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("bucket", &self.bucket)
            .finish()
    }
}

/// Process configuration, read from the environment.
///
/// Locally reads from `.env` via dotenvy; in the container the variables
/// are injected by the runtime. Tokens and keys are wrapped in
/// [`SecretString`] so they never reach logs.
#[derive(Clone)]
pub struct SlotsConfig {
    pub discord_token: SecretString,
    pub application_id: u64,
    pub guild_id: u64,
    pub public_key: VerifyingKey,
    pub s3: S3Config,
    pub ledger_path: PathBuf,
    pub bind_addr: SocketAddr,
    pub backup_interval: Duration,
}

impl fmt::Debug for SlotsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotsConfig")
            .field("discord_token", &"[REDACTED]")
            .field("application_id", &self.application_id)
            .field("guild_id", &self.guild_id)
            .field("public_key", &hex::encode(self.public_key.as_bytes()))
            .field("s3", &self.s3)
            .field("ledger_path", &self.ledger_path)
            .field("bind_addr", &self.bind_addr)
            .field("backup_interval", &self.backup_interval)
            .finish()
    }
}

impl SlotsConfig {
    pub fn load() -> Result<Self, AppError> {
        // Attempt to load .env file (silently ignore if not found)
        let dotenv_loaded = dotenvy::dotenv().is_ok();
        tracing::debug!(dotenv = dotenv_loaded, "loading SlotsConfig");
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let config = Self {
            discord_token: SecretString::from(required(&lookup, "DISCORD_TOKEN")?),
            application_id: parsed(&lookup, "APPLICATION_ID")?,
            guild_id: parsed(&lookup, "GUILD_ID")?,
            public_key: parse_public_key(&required(&lookup, "DISCORD_PUBLIC_KEY")?)?,
            s3: S3Config {
                access_key: SecretString::from(required(&lookup, "S3_ACCESS_KEY")?),
                secret_key: SecretString::from(required(&lookup, "S3_SECRET_KEY")?),
                region: required(&lookup, "S3_REGION")?,
                endpoint: required(&lookup, "S3_ENDPOINT")?,
                bucket: required(&lookup, "S3_BUCKET_NAME")?,
            },
            ledger_path: PathBuf::from(optional_or(&lookup, "LEDGER_PATH", DEFAULT_LEDGER_PATH)),
            bind_addr: parse_var(
                "BIND_ADDR",
                &optional_or(&lookup, "BIND_ADDR", DEFAULT_BIND_ADDR),
            )?,
            backup_interval: match optional(&lookup, "BACKUP_INTERVAL_SECS") {
                Some(raw) => Duration::from_secs(parse_var("BACKUP_INTERVAL_SECS", &raw)?),
                None => DEFAULT_INTERVAL,
            },
        };

        if config.backup_interval.is_zero() {
            return Err(AppError::InvalidEnvVar {
                key: "BACKUP_INTERVAL_SECS".to_owned(),
                detail: "must be greater than zero".to_owned(),
            });
        }

        tracing::debug!(
            application_id = config.application_id,
            guild_id = config.guild_id,
            bind_addr = %config.bind_addr,
            "SlotsConfig loaded",
        );
        Ok(config)
    }
}

/// Shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Ledger,
    pub public_key: VerifyingKey,
    pub emoji: Arc<EmojiSet>,
}

impl AppState {
    pub fn new(ledger: Ledger, public_key: VerifyingKey) -> Self {
        Self {
            ledger,
            public_key,
            emoji: Arc::new(EmojiSet::default()),
        }
    }
}

/// Parse the application's hex-encoded Ed25519 public key.
pub fn parse_public_key(hex_key: &str) -> Result<VerifyingKey, AppError> {
    let bytes = hex::decode(hex_key.trim()).map_err(|e| AppError::InvalidPublicKey(e.to_string()))?;
    let bytes: [u8; 32] = bytes
        .as_slice()
        .try_into()
        .map_err(|_| AppError::InvalidPublicKey(format!("expected 32 bytes, got {}", bytes.len())))?;
    VerifyingKey::from_bytes(&bytes).map_err(|e| AppError::InvalidPublicKey(e.to_string()))
}

fn env_lookup(key: &str) -> Option<String> {
    // arch-lint: allow(no-silent-result-drop) reason="an unset variable is reported as MissingEnvVar or replaced by its default"
    std::env::var(key).ok()
}

fn optional(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key).filter(|v| !v.trim().is_empty())
}

fn optional_or(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    // arch-lint: allow(no-silent-result-drop) reason="an unset optional variable takes its documented default"
    optional(lookup, key).unwrap_or_else(|| default.to_owned())
}

fn required(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String, AppError> {
    optional(lookup, key).ok_or_else(|| AppError::MissingEnvVar(key.to_owned()))
}

fn parsed<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    parse_var(key, &required(lookup, key)?)
}

fn parse_var<T>(key: &str, raw: &str) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| AppError::InvalidEnvVar {
        key: key.to_owned(),
        detail: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const PUBLIC_KEY: &str = "d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a";

    fn base_env() -> HashMap<&'static str, String> {
        [
            ("DISCORD_TOKEN", "bot-token"),
            ("APPLICATION_ID", "123456789012345678"),
            ("GUILD_ID", "876543210987654321"),
            ("DISCORD_PUBLIC_KEY", PUBLIC_KEY),
            ("S3_ACCESS_KEY", "access"),
            ("S3_SECRET_KEY", "secret"),
            ("S3_REGION", "us-west-004"),
            ("S3_ENDPOINT", "https://s3.us-west-004.backblazeb2.com"),
            ("S3_BUCKET_NAME", "geezer-backups"),
        ]
        .into_iter()
        .map(|(k, v)| (k, v.to_owned()))
        .collect()
    }

    fn load(env: HashMap<&'static str, String>) -> Result<SlotsConfig, AppError> {
        SlotsConfig::from_lookup(move |k: &str| env.get(k).cloned())
    }

    #[test]
    fn loads_with_defaults() {
        let config = load(base_env()).unwrap();
        assert_eq!(config.application_id, 123456789012345678);
        assert_eq!(config.guild_id, 876543210987654321);
        assert_eq!(config.ledger_path, PathBuf::from("db"));
        assert_eq!(config.bind_addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.backup_interval, Duration::from_secs(4 * 60 * 60));
    }

    #[test]
    fn optional_overrides() {
        let mut env = base_env();
        env.insert("LEDGER_PATH", "/data/ledger".to_owned());
        env.insert("BIND_ADDR", "127.0.0.1:3000".to_owned());
        env.insert("BACKUP_INTERVAL_SECS", "60".to_owned());

        let config = load(env).unwrap();
        assert_eq!(config.ledger_path, PathBuf::from("/data/ledger"));
        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(config.backup_interval, Duration::from_secs(60));
    }

    #[test]
    fn missing_variable_is_named() {
        let mut env = base_env();
        env.remove("S3_BUCKET_NAME");
        let err = load(env).unwrap_err();
        assert!(matches!(err, AppError::MissingEnvVar(ref k) if k == "S3_BUCKET_NAME"));
    }

    #[test]
    fn non_numeric_guild_id_rejected() {
        let mut env = base_env();
        env.insert("GUILD_ID", "geezers".to_owned());
        let err = load(env).unwrap_err();
        assert!(matches!(err, AppError::InvalidEnvVar { ref key, .. } if key == "GUILD_ID"));
    }

    #[test]
    fn zero_backup_interval_rejected() {
        let mut env = base_env();
        env.insert("BACKUP_INTERVAL_SECS", "0".to_owned());
        assert!(load(env).is_err());
    }

    #[test]
    fn public_key_must_be_32_bytes() {
        assert!(parse_public_key(PUBLIC_KEY).is_ok());
        let err = parse_public_key("abcd").unwrap_err();
        assert!(err.to_string().contains("expected 32 bytes"));
        assert!(parse_public_key("not hex").is_err());
    }

    #[test]
    fn debug_redacts_secrets() {
        let config = load(base_env()).unwrap();
        let debug = format!("{config:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("bot-token"));
        assert!(!debug.contains("\"secret\""));
    }
}
