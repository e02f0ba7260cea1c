use std::path::PathBuf;

use postwizard_db::{ConnectionMode, VaultLocation};
use postwizard_workflows::{SiteConfig, TitleSource};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} must be true or false, got {value:?}. Double check your true/false values")]
    InvalidBool { var: &'static str, value: String },

    #[error("{var} must be `rendered` or `yoast`, got {value:?}")]
    InvalidTitleSource { var: &'static str, value: String },
}

/// Settings read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub vault: VaultLocation,
    pub wp_cache: PathBuf,
    pub models_dir: PathBuf,
    pub title_source: TitleSource,
    pub site: SiteConfig,
}

fn var_or(name: &str, default: impl Into<String>) -> String {
    std::env::var(name).unwrap_or_else(|_| default.into())
}

fn parse_bool(var: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidBool { var, value }),
    }
}

fn bool_var(name: &'static str, default: bool) -> Result<bool, ConfigError> {
    match std::env::var(name) {
        Ok(value) => parse_bool(name, value),
        Err(_) => Ok(default),
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        let base = PathBuf::from(var_or("POSTWIZARD_HOME", format!("{}/.postwizard", home)));

        let vault_dir = std::env::var("POSTWIZARD_VAULT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| base.join("vault"));
        let key_dir = std::env::var("POSTWIZARD_KEY_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| base.join("keys"));
        let mode = if bool_var("POSTWIZARD_THREAD_SAFE", false)? {
            ConnectionMode::PerOperation
        } else {
            ConnectionMode::Shared
        };

        let title_source = match var_or("POSTWIZARD_TITLE_SOURCE", "rendered").to_ascii_lowercase().as_str() {
            "rendered" => TitleSource::Rendered,
            "yoast" => TitleSource::Yoast,
            other => {
                return Err(ConfigError::InvalidTitleSource {
                    var: "POSTWIZARD_TITLE_SOURCE",
                    value: other.to_string(),
                });
            }
        };

        Ok(Self {
            vault: VaultLocation {
                vault_dir,
                key_dir,
                test_mode: bool_var("POSTWIZARD_TEST_MODE", false)?,
                mode,
            },
            wp_cache: std::env::var("POSTWIZARD_WP_CACHE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| base.join("wp_posts.json")),
            models_dir: std::env::var("POSTWIZARD_MODELS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| base.join("models")),
            title_source,
            site: SiteConfig {
                site_name: var_or("POSTWIZARD_SITE_NAME", ""),
                domain: var_or("POSTWIZARD_DOMAIN", ""),
                img_seo_attrs: bool_var("POSTWIZARD_IMG_SEO_ATTRS", true)?,
                post_status: var_or("POSTWIZARD_POST_STATUS", "draft"),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booleans_accept_common_spellings() {
        assert!(parse_bool("X", " True ".into()).unwrap());
        assert!(parse_bool("X", "yes".into()).unwrap());
        assert!(!parse_bool("X", "0".into()).unwrap());
    }

    #[test]
    fn bad_boolean_names_the_variable() {
        let err = parse_bool("POSTWIZARD_TEST_MODE", "maybe".into()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("POSTWIZARD_TEST_MODE"));
        assert!(msg.contains("Double check your true/false values"));
    }
}
