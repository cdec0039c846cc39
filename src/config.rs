//! Runtime configuration resolved from command-line arguments and
//! environment variables.

use log::debug;

use crate::api::DEFAULT_API_URL;
use crate::ci::{CiMode, EnvMap};
use crate::shared::error::LynkError;

pub const ENV_API_URL: &str = "INTERLYNK_API_URL";
pub const ENV_SECURITY_TOKEN: &str = "INTERLYNK_SECURITY_TOKEN";
pub const ENV_INCLUDE_CI_METADATA: &str = "PYLYNK_INCLUDE_CI_METADATA";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub token: String,
    pub ci_mode: CiMode,
}

impl Config {
    /// Resolve configuration from the process environment, with an
    /// optional `--token` override.
    pub fn resolve(token_arg: Option<&str>) -> Result<Self, LynkError> {
        let env: EnvMap = std::env::vars().collect();
        Self::from_parts(token_arg, &env)
    }

    /// Pure form of [`Config::resolve`], driven by an environment
    /// snapshot.
    pub fn from_parts(token_arg: Option<&str>, env: &EnvMap) -> Result<Self, LynkError> {
        let api_url = env
            .get(ENV_API_URL)
            .filter(|v| !v.is_empty())
            .cloned()
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let token = token_arg
            .map(str::to_string)
            .or_else(|| env.get(ENV_SECURITY_TOKEN).filter(|v| !v.is_empty()).cloned())
            .ok_or(LynkError::TokenMissing)?;

        let ci_mode = match env.get(ENV_INCLUDE_CI_METADATA).filter(|v| !v.is_empty()) {
            Some(raw) => raw
                .parse::<CiMode>()
                .map_err(|message| LynkError::InvalidParameterCombination { message })?,
            None => CiMode::default(),
        };

        debug!("Token found: {}", masked_token(&token));

        Ok(Self {
            api_url,
            token,
            ci_mode,
        })
    }
}

/// Abbreviate a token for debug logs. Short tokens and tokens whose
/// prefix/suffix boundaries fall inside a multi-byte character are fully
/// redacted rather than sliced.
fn masked_token(token: &str) -> String {
    if token.len() > 14 {
        if let (Some(prefix), Some(suffix)) =
            (token.get(..10), token.get(token.len() - 4..))
        {
            return format!("{}...{}", prefix, suffix);
        }
    }
    "<redacted>".to_string()
}

/// Configure the global logger: errors only by default, everything with
/// `-v`.
pub fn init_logging(verbose: u8) {
    let level = if verbose == 0 {
        log::LevelFilter::Error
    } else {
        log::LevelFilter::Debug
    };
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp_secs()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> EnvMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_token_from_environment() {
        let snapshot = env(&[(ENV_SECURITY_TOKEN, "lynk_abc")]);
        let config = Config::from_parts(None, &snapshot).unwrap();
        assert_eq!(config.token, "lynk_abc");
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.ci_mode, CiMode::Auto);
    }

    #[test]
    fn test_token_argument_overrides_environment() {
        let snapshot = env(&[(ENV_SECURITY_TOKEN, "lynk_env")]);
        let config = Config::from_parts(Some("lynk_arg"), &snapshot).unwrap();
        assert_eq!(config.token, "lynk_arg");
    }

    #[test]
    fn test_missing_token_is_an_error() {
        let snapshot = env(&[]);
        let error = Config::from_parts(None, &snapshot).unwrap_err();
        assert!(matches!(error, LynkError::TokenMissing));
    }

    #[test]
    fn test_api_url_override() {
        let snapshot = env(&[
            (ENV_SECURITY_TOKEN, "lynk_abc"),
            (ENV_API_URL, "https://staging.example.com/lynkapi"),
        ]);
        let config = Config::from_parts(None, &snapshot).unwrap();
        assert_eq!(config.api_url, "https://staging.example.com/lynkapi");
    }

    #[test]
    fn test_ci_mode_from_environment() {
        let snapshot = env(&[
            (ENV_SECURITY_TOKEN, "lynk_abc"),
            (ENV_INCLUDE_CI_METADATA, "false"),
        ]);
        let config = Config::from_parts(None, &snapshot).unwrap();
        assert_eq!(config.ci_mode, CiMode::Never);
    }

    #[test]
    fn test_masked_token_abbreviates_long_ascii_tokens() {
        assert_eq!(masked_token("lynk_0123456789abcdef"), "lynk_01234...cdef");
    }

    #[test]
    fn test_masked_token_redacts_short_tokens() {
        assert_eq!(masked_token("lynk_short"), "<redacted>");
    }

    #[test]
    fn test_masked_token_handles_multibyte_boundaries() {
        // 'é' straddles the 10-byte prefix boundary
        assert_eq!(masked_token("aaaaaaaaaéaaaaaaaaaa"), "<redacted>");
        // and the 4-byte suffix boundary
        assert_eq!(masked_token("aaaaaaaaaaaaaaaaéaaa"), "<redacted>");
    }

    #[test]
    fn test_invalid_ci_mode_is_an_error() {
        let snapshot = env(&[
            (ENV_SECURITY_TOKEN, "lynk_abc"),
            (ENV_INCLUDE_CI_METADATA, "sometimes"),
        ]);
        let error = Config::from_parts(None, &snapshot).unwrap_err();
        assert!(matches!(
            error,
            LynkError::InvalidParameterCombination { .. }
        ));
    }
}
