use std::sync::Arc;

use postwizard_auth::search::BraveSearchController;
use postwizard_auth::wordpress::WordPressController;
use postwizard_auth::{ControllerError, SecretController, SecretHandler, StoreOutcome};
use postwizard_crypto::FernetKey;
use postwizard_db::Vault;
use postwizard_types::models::*;
use postwizard_types::SecretType;

fn vault() -> Arc<Vault> {
    Arc::new(Vault::open_in_memory(FernetKey::generate()).unwrap())
}

fn wp(host: &str, password: &str) -> ProviderSecret {
    ProviderSecret::WordPress(WpSecrets {
        hostname: host.into(),
        user: "editor".into(),
        app_password: password.into(),
    })
}

#[test]
fn every_provider_roundtrips_through_the_handler() {
    let handler = SecretHandler::new(vault());
    let secrets = vec![
        wp("site.example", "wp-pass"),
        ProviderSecret::Telegram(BotAuth {
            chat_id: "-100123".into(),
            token: "bot:token".into(),
        }),
        ProviderSecret::Google(GoogleSearch {
            cse_id: "cse-1".into(),
            api_key: "g-key".into(),
        }),
        ProviderSecret::Brave(BraveAuth {
            api_key: "b-key".into(),
        }),
        ProviderSecret::MongerCash(MongerCashAuth {
            username: "affiliate".into(),
            password: "m-pass".into(),
        }),
        ProviderSecret::Yandex(YandexAuth {
            client_id: "yc".into(),
            client_secret: "y-secret".into(),
        }),
        ProviderSecret::PostWizardLogin(PostWizardApiLogin {
            api_user: "api".into(),
            api_secret: "pw-secret".into(),
        }),
        ProviderSecret::XCredentials(XCredentials {
            username: "poster".into(),
            email: "poster@example.com".into(),
            password: "x-pass".into(),
        }),
    ];

    for secret in &secrets {
        handler.store(secret).unwrap();
        let found = handler.get(secret.primary_type()).unwrap();
        assert_eq!(found, vec![secret.clone()], "{:?}", secret.primary_type());
    }

    for secret in &secrets {
        handler.delete(secret.primary_type(), None).unwrap();
        assert!(handler.get(secret.primary_type()).unwrap().is_empty());
    }
}

#[test]
fn update_changes_only_the_targeted_site() {
    let handler = SecretHandler::new(vault());
    handler.store(&wp("one.example", "old-1")).unwrap();
    handler.store(&wp("two.example", "old-2")).unwrap();

    handler
        .update(SecretType::WpAppPassword, "two.example", "new-2")
        .unwrap();

    let all = handler.get(SecretType::WpAppPassword).unwrap();
    assert_eq!(all, vec![wp("one.example", "old-1"), wp("two.example", "new-2")]);
}

#[test]
fn delete_by_name_keeps_other_entries() {
    let handler = SecretHandler::new(vault());
    handler.store(&wp("one.example", "p1")).unwrap();
    handler.store(&wp("two.example", "p2")).unwrap();

    assert_eq!(handler.delete(SecretType::WpAppPassword, Some("one.example")).unwrap(), 1);
    assert_eq!(handler.delete(SecretType::WpAppPassword, Some("one.example")).unwrap(), 0);
    assert_eq!(handler.get(SecretType::WpAppPassword).unwrap(), vec![wp("two.example", "p2")]);
}

#[test]
fn controller_rejects_foreign_credentials() {
    let vault = vault();
    let controller = WordPressController::new(vault.clone());
    let telegram = ProviderSecret::Telegram(BotAuth {
        chat_id: "1".into(),
        token: "t".into(),
    });

    let err = controller.store_secrets(&telegram).unwrap_err();
    assert!(matches!(
        err,
        ControllerError::Unsupported {
            secret_type: SecretType::TelegramAccessToken,
            ..
        }
    ));
    assert!(vault.list_entries().unwrap().is_empty());
}

#[test]
fn unhandled_type_has_no_controller() {
    let handler = SecretHandler::new(vault());
    assert!(matches!(
        handler.get(SecretType::XUsername),
        Err(ControllerError::NoController(SecretType::XUsername))
    ));
    assert!(!handler.supported_secret_types().contains(&SecretType::XUsername));
}

#[test]
fn x_pairs_are_reassembled_and_both_kinds_returned() {
    let handler = SecretHandler::new(vault());
    let api = ProviderSecret::XApi(XApiSecrets {
        username: "poster".into(),
        api_key: "key".into(),
        api_secret: "secret".into(),
    });
    let tokens = ProviderSecret::XTokens(XTokens {
        username: "poster".into(),
        access_token: "access".into(),
        refresh_token: "refresh".into(),
    });
    let client = ProviderSecret::XClient(XClientSecrets {
        username: "poster".into(),
        client_id: "client-1".into(),
        client_secret: "client-secret".into(),
    });
    handler.store(&api).unwrap();
    handler.store(&tokens).unwrap();
    handler.store(&client).unwrap();

    assert_eq!(handler.get(SecretType::XApiSecret).unwrap(), vec![api.clone()]);
    assert_eq!(handler.get(SecretType::XRefreshToken).unwrap(), vec![tokens.clone()]);
    assert_eq!(handler.get(SecretType::XClientSecret).unwrap(), vec![client]);

    handler.delete(SecretType::XApiKey, None).unwrap();
    // a lone secret half is not a usable credential
    assert!(handler.get(SecretType::XApiKey).unwrap().is_empty());
    assert_eq!(handler.get(SecretType::XAccessToken).unwrap(), vec![tokens]);
}

#[test]
fn x_duplicates_resolve_to_the_latest_row() {
    let vault = vault();
    let handler = SecretHandler::new(vault.clone());
    let first = ProviderSecret::XTokens(XTokens {
        username: "poster".into(),
        access_token: "a1".into(),
        refresh_token: "r1".into(),
    });
    let second = ProviderSecret::XTokens(XTokens {
        username: "poster".into(),
        access_token: "a2".into(),
        refresh_token: "r2".into(),
    });
    handler.store(&first).unwrap();
    handler.store(&second).unwrap();

    assert_eq!(vault.list_entries().unwrap().len(), 4);
    assert_eq!(handler.get(SecretType::XAccessToken).unwrap(), vec![second]);
}

#[test]
fn store_or_update_checks_existing_rows_first() {
    let vault = vault();
    let handler = SecretHandler::new(vault.clone());

    assert_eq!(handler.store_or_update(&wp("site.example", "p1")).unwrap(), StoreOutcome::Stored);
    assert_eq!(handler.store_or_update(&wp("site.example", "p2")).unwrap(), StoreOutcome::Updated);

    assert_eq!(vault.list_entries().unwrap().len(), 1);
    assert_eq!(handler.get(SecretType::WpAppPassword).unwrap(), vec![wp("site.example", "p2")]);
}

#[test]
fn replace_drops_previous_rows() {
    let vault = vault();
    let handler = SecretHandler::new(vault.clone());
    handler.store(&wp("site.example", "p1")).unwrap();
    handler.store(&wp("site.example", "p1-dup")).unwrap();

    handler.replace(&wp("site.example", "p3")).unwrap();
    assert_eq!(handler.get(SecretType::WpAppPassword).unwrap(), vec![wp("site.example", "p3")]);
}

#[test]
fn brave_update_ignores_the_given_name() {
    let vault = vault();
    let brave = BraveSearchController::new(vault.clone());
    brave
        .store_secrets(&ProviderSecret::Brave(BraveAuth { api_key: "old".into() }))
        .unwrap();
    brave.update_secrets(SecretType::BraveApiKey, "", "new").unwrap();
    assert_eq!(
        brave.get_secrets(SecretType::BraveApiKey).unwrap(),
        vec![ProviderSecret::Brave(BraveAuth { api_key: "new".into() })]
    );
}

#[test]
fn mongercash_update_defaults_to_first_account() {
    let handler = SecretHandler::new(vault());
    handler
        .store(&ProviderSecret::MongerCash(MongerCashAuth {
            username: "affiliate".into(),
            password: "old".into(),
        }))
        .unwrap();
    handler.update(SecretType::MongercashPassword, "", "new").unwrap();
    assert_eq!(
        handler.get(SecretType::MongercashPassword).unwrap(),
        vec![ProviderSecret::MongerCash(MongerCashAuth {
            username: "affiliate".into(),
            password: "new".into(),
        })]
    );

    let empty = SecretHandler::new(vault());
    assert!(empty.update(SecretType::MongercashPassword, "", "x").is_err());
}

#[test]
fn postwizard_api_returns_only_the_first_account() {
    let handler = SecretHandler::new(vault());
    for user in ["first", "second"] {
        handler
            .store(&ProviderSecret::PostWizardToken(PostWizardApiToken {
                api_user: user.into(),
                access_token: format!("{}-token", user),
            }))
            .unwrap();
    }
    let got = handler.get(SecretType::PwapiToken).unwrap();
    assert_eq!(got.len(), 1);
    assert!(matches!(&got[0], ProviderSecret::PostWizardToken(t) if t.api_user == "first"));
}

#[test]
fn update_of_missing_entry_surfaces_not_found() {
    let handler = SecretHandler::new(vault());
    let err = handler
        .update(SecretType::YandexClientSecret, "nobody", "x")
        .unwrap_err();
    assert!(matches!(err, ControllerError::Vault(postwizard_db::VaultError::NotFound { .. })));
}
