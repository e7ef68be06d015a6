//! Server configuration, read from the environment once at startup.
//!
//! Env vars:
//!   ALPINO_HOME          — Alpino installation directory (required)
//!   NERC_JAR, NERC_MODEL — ixa-pipe-nerc jar and model (both or neither)
//!   COREF_CMD            — coreference resolver command line (optional)
//!   PROCESS_TIMEOUT_SECS — external tool wall-clock bound (default: 600)
//!   BIND_ADDR            — listen address (default: 0.0.0.0:5002)

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ServerError;

const DEFAULT_TIMEOUT_SECS: u64 = 600;

/// Location of the NERC tagger jar and model.
#[derive(Debug, Clone)]
pub struct NercConfig {
    pub jar: PathBuf,
    pub model: PathBuf,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory for every external tool invocation.
    pub alpino_home: PathBuf,
    /// Tokenizer command, relative to `alpino_home`.
    pub tokenize_cmd: Vec<String>,
    /// Alpino binary, relative to `alpino_home`.
    pub alpino_cmd: String,
    pub nerc: Option<NercConfig>,
    /// Coreference resolver command line, e.g. `python3 -m multisieve_coreference`.
    pub coref_cmd: Option<Vec<String>>,
    pub process_timeout: Duration,
    pub bind_addr: String,
}

impl Config {
    /// Build and validate the configuration from the environment. Missing
    /// `ALPINO_HOME` or a half-configured NERC pair fail here, not per-call.
    pub fn from_env() -> Result<Self, ServerError> {
        let alpino_home = std::env::var("ALPINO_HOME")
            .map(PathBuf::from)
            .map_err(|_| ServerError::Configuration("ALPINO_HOME must be set".into()))?;
        let nerc = nerc_pair(
            std::env::var("NERC_JAR").ok(),
            std::env::var("NERC_MODEL").ok(),
        )?;
        let coref_cmd = std::env::var("COREF_CMD")
            .ok()
            .map(|cmd| cmd.split_whitespace().map(str::to_string).collect());
        let process_timeout = timeout_secs(std::env::var("PROCESS_TIMEOUT_SECS").ok())?;
        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:5002".to_string());

        let mut config = Self::for_home(alpino_home);
        config.nerc = nerc;
        config.coref_cmd = coref_cmd;
        config.process_timeout = process_timeout;
        config.bind_addr = bind_addr;
        Ok(config)
    }

    /// Minimal configuration for a given Alpino home; everything else at
    /// defaults. Used by tests.
    pub fn for_home(alpino_home: PathBuf) -> Self {
        Self {
            alpino_home,
            tokenize_cmd: vec!["Tokenization/tok".to_string()],
            alpino_cmd: "bin/Alpino".to_string(),
            nerc: None,
            coref_cmd: None,
            process_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            bind_addr: "0.0.0.0:5002".to_string(),
        }
    }
}

/// NERC is configured by a jar/model pair; one without the other is a
/// configuration mistake we want to surface at startup.
fn nerc_pair(
    jar: Option<String>,
    model: Option<String>,
) -> Result<Option<NercConfig>, ServerError> {
    match (jar, model) {
        (Some(jar), Some(model)) => Ok(Some(NercConfig {
            jar: jar.into(),
            model: model.into(),
        })),
        (None, None) => Ok(None),
        _ => Err(ServerError::Configuration(
            "NERC_JAR and NERC_MODEL must be set together".into(),
        )),
    }
}

/// A malformed timeout is a configuration mistake and fails at startup; it
/// is not a cue to fall back to the default.
fn timeout_secs(value: Option<String>) -> Result<Duration, ServerError> {
    match value {
        None => Ok(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        Some(v) => v.parse().map(Duration::from_secs).map_err(|_| {
            ServerError::Configuration(format!(
                "PROCESS_TIMEOUT_SECS must be a number of seconds, got {v:?}"
            ))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nerc_pair_requires_both() {
        assert!(nerc_pair(None, None).unwrap().is_none());
        assert!(nerc_pair(Some("nerc.jar".into()), Some("nl.bin".into()))
            .unwrap()
            .is_some());
        assert!(nerc_pair(Some("nerc.jar".into()), None).is_err());
        assert!(nerc_pair(None, Some("nl.bin".into())).is_err());
    }

    #[test]
    fn unset_timeout_falls_back_to_the_default() {
        assert_eq!(
            timeout_secs(None).unwrap(),
            Duration::from_secs(DEFAULT_TIMEOUT_SECS)
        );
        assert_eq!(
            timeout_secs(Some("30".into())).unwrap(),
            Duration::from_secs(30)
        );
    }

    #[test]
    fn malformed_timeout_is_a_configuration_error() {
        assert!(matches!(
            timeout_secs(Some("soon".into())),
            Err(ServerError::Configuration(_))
        ));
        assert!(matches!(
            timeout_secs(Some("-1".into())),
            Err(ServerError::Configuration(_))
        ));
    }

    #[test]
    fn defaults_point_into_alpino_home() {
        let config = Config::for_home(PathBuf::from("/opt/Alpino"));
        assert_eq!(config.alpino_cmd, "bin/Alpino");
        assert_eq!(config.tokenize_cmd, vec!["Tokenization/tok"]);
        assert_eq!(config.process_timeout, Duration::from_secs(600));
    }
}
