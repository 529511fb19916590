use anyhow::{anyhow, Context, Result};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct DecoderConfig {
    /// `None` disables the per-request search deadline.
    pub decode_timeout: Option<Duration>,
    /// `None` leaves the number of returned solutions unbounded.
    pub max_solutions: Option<usize>,

    pub max_devices: u32,
    pub max_signal_length: u32,
    pub max_strength: u32,

    /// Empty means any origin is allowed.
    pub cors_origins: Vec<String>,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            decode_timeout: Some(Duration::from_millis(5_000)),
            max_solutions: Some(10_000),
            max_devices: 100,
            max_signal_length: 20,
            max_strength: 100,
            cors_origins: Vec::new(),
        }
    }
}

impl DecoderConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let timeout_ms = env_u64(&lookup, "DECODER_DECODE_TIMEOUT_MS", Some(5_000))?;
        let decode_timeout = (timeout_ms > 0).then(|| Duration::from_millis(timeout_ms));

        let max_solutions = env_u64(&lookup, "DECODER_MAX_SOLUTIONS", Some(10_000))?;
        let max_solutions = (max_solutions > 0)
            .then(|| usize::try_from(max_solutions))
            .transpose()
            .context("invalid DECODER_MAX_SOLUTIONS")?;

        let max_devices = env_u32(&lookup, "DECODER_MAX_DEVICES", defaults.max_devices)?;
        let max_signal_length =
            env_u32(&lookup, "DECODER_MAX_SIGNAL_LENGTH", defaults.max_signal_length)?;
        let max_strength = env_u32(&lookup, "DECODER_MAX_STRENGTH", defaults.max_strength)?;
        for (key, value) in [
            ("DECODER_MAX_DEVICES", max_devices),
            ("DECODER_MAX_SIGNAL_LENGTH", max_signal_length),
            ("DECODER_MAX_STRENGTH", max_strength),
        ] {
            if value == 0 {
                return Err(anyhow!("{key} must be at least 1"));
            }
        }

        let cors_origins = env_optional(&lookup, "DECODER_CORS_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            decode_timeout,
            max_solutions,
            max_devices,
            max_signal_length,
            max_strength,
            cors_origins,
        })
    }
}

fn env_u64(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: Option<u64>,
) -> Result<u64> {
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse::<u64>()
            .with_context(|| format!("invalid {key}")),
        None => default.ok_or_else(|| anyhow!("missing env var {key}")),
    }
}

fn env_u32(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: u32) -> Result<u32> {
    let value = env_u64(lookup, key, Some(u64::from(default)))?;
    u32::try_from(value).with_context(|| format!("{key} is out of range"))
}

fn env_optional(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
