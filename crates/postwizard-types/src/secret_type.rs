use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tag stored in the `secret_type` column of the vault.
///
/// The string forms are persisted, so they must never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecretType {
    BraveApiKey,
    GoogleApiKey,
    MongercashPassword,
    YandexClientSecret,
    TelegramAccessToken,
    PwapiPassword,
    PwapiToken,
    WpAppPassword,
    XClientSecret,
    XAccessToken,
    XApiKey,
    XApiSecret,
    XRefreshToken,
    XPassword,
    XUsername,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown secret type: {0}")]
pub struct UnknownSecretType(pub String);

impl SecretType {
    pub const ALL: [SecretType; 15] = [
        SecretType::BraveApiKey,
        SecretType::GoogleApiKey,
        SecretType::MongercashPassword,
        SecretType::YandexClientSecret,
        SecretType::TelegramAccessToken,
        SecretType::PwapiPassword,
        SecretType::PwapiToken,
        SecretType::WpAppPassword,
        SecretType::XClientSecret,
        SecretType::XAccessToken,
        SecretType::XApiKey,
        SecretType::XApiSecret,
        SecretType::XRefreshToken,
        SecretType::XPassword,
        SecretType::XUsername,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SecretType::BraveApiKey => "brave_api_key",
            SecretType::GoogleApiKey => "google_api_key",
            SecretType::MongercashPassword => "mongercash_password",
            SecretType::YandexClientSecret => "yandex_client_secret",
            SecretType::TelegramAccessToken => "telegram_access_token",
            SecretType::PwapiPassword => "pwapi_password",
            SecretType::PwapiToken => "pwapi_token",
            SecretType::WpAppPassword => "wp_app_password",
            SecretType::XClientSecret => "x_client_secret",
            SecretType::XAccessToken => "x_access_token",
            SecretType::XApiKey => "x_api_key",
            SecretType::XApiSecret => "x_api_secret",
            SecretType::XRefreshToken => "x_refresh_token",
            SecretType::XPassword => "x_password",
            SecretType::XUsername => "x_username",
        }
    }

    /// Every X secret shares this prefix; the X controller looks rows up by it.
    pub fn is_x(&self) -> bool {
        self.as_str().starts_with("x_")
    }
}

impl fmt::Display for SecretType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SecretType {
    type Err = UnknownSecretType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SecretType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s.trim())
            .ok_or_else(|| UnknownSecretType(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_form_roundtrips_through_from_str() {
        for t in SecretType::ALL {
            assert_eq!(t.as_str().parse::<SecretType>().unwrap(), t);
        }
    }

    #[test]
    fn serde_uses_the_stored_tag() {
        let json = serde_json::to_string(&SecretType::WpAppPassword).unwrap();
        assert_eq!(json, "\"wp_app_password\"");
        let back: SecretType = serde_json::from_str("\"x_refresh_token\"").unwrap();
        assert_eq!(back, SecretType::XRefreshToken);
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let err = "ftp_password".parse::<SecretType>().unwrap_err();
        assert_eq!(err, UnknownSecretType("ftp_password".into()));
    }

    #[test]
    fn x_prefix_detection() {
        assert!(SecretType::XApiKey.is_x());
        assert!(!SecretType::YandexClientSecret.is_x());
    }
}
