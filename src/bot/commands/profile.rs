//! Per-user settings: `set location <city>`, `set lastfm <account>` and
//! `lastfm [user]`.

use crate::bot::dispatch::Invocation;
use crate::bot::Services;
use crate::chat::normalize_user;
use crate::error::Result;

pub async fn cmd_set(services: &Services, inv: &Invocation) -> Result<()> {
    let user = inv.sender.name();
    let what = inv.args.first().map(|s| s.to_lowercase());
    let rest = inv.args.get(1..).unwrap_or_default();

    let reply = match what.as_deref() {
        Some("location") => {
            let city = rest.join(" ");
            if city.is_empty() {
                format!("/me {}, укажите город для установки.", user)
            } else {
                services.locations.set(user, &city).await;
                tracing::info!("Location for {} set to {}", user, city);
                format!("/me {}, ваше местоположение успешно обновлено.", user)
            }
        }
        Some("lastfm") => match rest.first() {
            None => format!("/me {}, укажите аккаунт Last.fm.", user),
            Some(account) => match services.accounts.save(&inv.sender.username, account) {
                Ok(()) => format!("/me {}, аккаунт Last.fm {} привязан.", user, account),
                Err(e) => {
                    tracing::error!("Failed to save Last.fm account for {}: {}", inv.sender.username, e);
                    format!("/me {}, не удалось сохранить аккаунт Last.fm.", user)
                }
            },
        },
        _ => format!(
            "/me {}, используйте set location <город> или set lastfm <аккаунт>.",
            user
        ),
    };

    services.say(&inv.channel, &reply).await;
    Ok(())
}

pub async fn cmd_lastfm(services: &Services, inv: &Invocation) -> Result<()> {
    let target = inv
        .args
        .first()
        .map(|arg| normalize_user(arg))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| inv.sender.username.clone());

    let reply = match services.accounts.get(&target)? {
        Some(account) => format!("/me Last.fm аккаунт {}: {}", target, account),
        None => format!(
            "/me {} не привязал аккаунт Last.fm. Используйте set lastfm <аккаунт>.",
            target
        ),
    };
    services.say(&inv.channel, &reply).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::bot::testing::Harness;
    use crate::chat::Sender;

    fn viewer() -> Sender {
        Sender::new("viewer").with_display_name("Viewer")
    }

    #[tokio::test]
    async fn set_location_joins_words() {
        let harness = Harness::new();
        harness.run("forsen", viewer(), "*set Location alpha beta").await;

        assert_eq!(
            harness.services.locations.city_of("viewer").await.as_deref(),
            Some("alpha beta")
        );
        assert_eq!(
            harness.transport.replies_to("forsen").await,
            vec!["/me Viewer, ваше местоположение успешно обновлено."]
        );
    }

    #[tokio::test]
    async fn set_location_needs_a_city() {
        let harness = Harness::new();
        harness.run("forsen", viewer(), "*set location").await;

        assert_eq!(harness.services.locations.city_of("viewer").await, None);
        assert_eq!(
            harness.transport.replies_to("forsen").await,
            vec!["/me Viewer, укажите город для установки."]
        );
    }

    #[tokio::test]
    async fn lastfm_link_round_trip() {
        let harness = Harness::new();
        harness.run("forsen", viewer(), "*set lastfm viewer_fm").await;
        harness.run("forsen", Sender::new("other"), "*lastfm @Viewer").await;
        harness.run("forsen", Sender::new("other"), "*lastfm").await;

        assert_eq!(
            harness.transport.replies_to("forsen").await,
            vec![
                "/me Viewer, аккаунт Last.fm viewer_fm привязан.",
                "/me Last.fm аккаунт viewer: viewer_fm",
                "/me other не привязал аккаунт Last.fm. Используйте set lastfm <аккаунт>.",
            ]
        );
    }

    #[tokio::test]
    async fn unknown_setting_shows_usage() {
        let harness = Harness::new();
        harness.run("forsen", viewer(), "*set color red").await;

        assert_eq!(
            harness.transport.replies_to("forsen").await,
            vec!["/me Viewer, используйте set location <город> или set lastfm <аккаунт>."]
        );
    }
}
