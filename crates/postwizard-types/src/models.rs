/// Provider credential models.
/// These are what controllers hand out after decrypting vault rows.
/// `Debug` never prints the secret fields, so a model can be logged safely.
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::SecretType;

/// OAuth callback registered for the X developer app.
pub const X_OAUTH_CALLBACK: &str = "http://127.0.0.47:8888";

/// Stand-in printed for secret fields.
struct Redacted;

impl fmt::Debug for Redacted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("\"********\"")
    }
}

macro_rules! redacted_debug {
    ($ty:ident { $($plain:ident),* } secret { $($hidden:ident),+ }) => {
        impl fmt::Debug for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($ty))
                    $(.field(stringify!($plain), &self.$plain))*
                    $(.field(stringify!($hidden), &Redacted))+
                    .finish()
            }
        }
    };
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WpSecrets {
    pub hostname: String,
    pub user: String,
    pub app_password: String,
}
redacted_debug!(WpSecrets { hostname, user } secret { app_password });

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XCredentials {
    pub username: String,
    pub email: String,
    pub password: String,
}
redacted_debug!(XCredentials { username, email } secret { password });

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XApiSecrets {
    pub username: String,
    pub api_key: String,
    pub api_secret: String,
}
redacted_debug!(XApiSecrets { username } secret { api_key, api_secret });

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XClientSecrets {
    pub username: String,
    pub client_id: String,
    pub client_secret: String,
}
redacted_debug!(XClientSecrets { username, client_id } secret { client_secret });

impl XClientSecrets {
    pub fn callback_uri(&self) -> &'static str {
        X_OAUTH_CALLBACK
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XTokens {
    pub username: String,
    pub access_token: String,
    pub refresh_token: String,
}
redacted_debug!(XTokens { username } secret { access_token, refresh_token });

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotAuth {
    pub chat_id: String,
    pub token: String,
}
redacted_debug!(BotAuth { chat_id } secret { token });

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoogleSearch {
    pub cse_id: String,
    pub api_key: String,
}
redacted_debug!(GoogleSearch { cse_id } secret { api_key });

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BraveAuth {
    pub api_key: String,
}
redacted_debug!(BraveAuth {} secret { api_key });

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MongerCashAuth {
    pub username: String,
    pub password: String,
}
redacted_debug!(MongerCashAuth { username } secret { password });

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YandexAuth {
    pub client_id: String,
    pub client_secret: String,
}
redacted_debug!(YandexAuth { client_id } secret { client_secret });

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostWizardApiLogin {
    pub api_user: String,
    pub api_secret: String,
}
redacted_debug!(PostWizardApiLogin { api_user } secret { api_secret });

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostWizardApiToken {
    pub api_user: String,
    pub access_token: String,
}
redacted_debug!(PostWizardApiToken { api_user } secret { access_token });

/// Any provider credential, used both as controller input and output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "snake_case")]
pub enum ProviderSecret {
    WordPress(WpSecrets),
    XCredentials(XCredentials),
    XApi(XApiSecrets),
    XClient(XClientSecrets),
    XTokens(XTokens),
    Telegram(BotAuth),
    Google(GoogleSearch),
    Brave(BraveAuth),
    MongerCash(MongerCashAuth),
    Yandex(YandexAuth),
    PostWizardLogin(PostWizardApiLogin),
    PostWizardToken(PostWizardApiToken),
}

impl ProviderSecret {
    /// Vault tags written when this credential is stored.
    pub fn secret_types(&self) -> &'static [SecretType] {
        match self {
            ProviderSecret::WordPress(_) => &[SecretType::WpAppPassword],
            ProviderSecret::XCredentials(_) => &[SecretType::XPassword],
            ProviderSecret::XApi(_) => &[SecretType::XApiKey, SecretType::XApiSecret],
            ProviderSecret::XClient(_) => &[SecretType::XClientSecret],
            ProviderSecret::XTokens(_) => &[SecretType::XAccessToken, SecretType::XRefreshToken],
            ProviderSecret::Telegram(_) => &[SecretType::TelegramAccessToken],
            ProviderSecret::Google(_) => &[SecretType::GoogleApiKey],
            ProviderSecret::Brave(_) => &[SecretType::BraveApiKey],
            ProviderSecret::MongerCash(_) => &[SecretType::MongercashPassword],
            ProviderSecret::Yandex(_) => &[SecretType::YandexClientSecret],
            ProviderSecret::PostWizardLogin(_) => &[SecretType::PwapiPassword],
            ProviderSecret::PostWizardToken(_) => &[SecretType::PwapiToken],
        }
    }

    /// The tag used to pick a controller for this credential.
    pub fn primary_type(&self) -> SecretType {
        self.secret_types()[0]
    }

    pub fn has_type(&self, secret_type: SecretType) -> bool {
        self.secret_types().contains(&secret_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_hides_secret_fields() {
        let wp = WpSecrets {
            hostname: "example.com".into(),
            user: "admin".into(),
            app_password: "abcd efgh ijkl".into(),
        };
        let printed = format!("{:?}", wp);
        assert!(printed.contains("example.com"));
        assert!(printed.contains("admin"));
        assert!(!printed.contains("abcd"));
    }

    #[test]
    fn enum_debug_goes_through_redaction() {
        let secret = ProviderSecret::XTokens(XTokens {
            username: "poster".into(),
            access_token: "tok-a".into(),
            refresh_token: "tok-r".into(),
        });
        let printed = format!("{:?}", secret);
        assert!(printed.contains("poster"));
        assert!(!printed.contains("tok-"));
    }

    #[test]
    fn paired_x_secrets_report_both_types() {
        let api = ProviderSecret::XApi(XApiSecrets {
            username: "u".into(),
            api_key: "k".into(),
            api_secret: "s".into(),
        });
        assert!(api.has_type(SecretType::XApiSecret));
        assert_eq!(api.primary_type(), SecretType::XApiKey);
    }
}
