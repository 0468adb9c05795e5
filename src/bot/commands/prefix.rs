//! `prefix <new>`: change the command prefix of the current channel.

use crate::bot::dispatch::Invocation;
use crate::bot::{ChannelError, Services};
use crate::error::Result;

pub async fn cmd_prefix(services: &Services, inv: &Invocation) -> Result<()> {
    let new_prefix = inv.args.first().map(String::as_str).unwrap_or("");

    let reply = match services
        .channels
        .set_prefix(&inv.channel, new_prefix, inv.sender.is_moderator())
        .await
    {
        Ok(()) => format!("Префикс успешно изменен на {}.", new_prefix),
        Err(ChannelError::PermissionDenied) => {
            tracing::info!(
                "Prefix change in #{} denied for {}",
                inv.channel,
                inv.sender.username
            );
            "Доступ запрещен. Вы не модератор.".to_string()
        }
        Err(ChannelError::InvalidPrefix) => {
            format!("/me {}, пожалуйста, укажите новый префикс.", inv.sender.name())
        }
        Err(e) => return Err(e.into()),
    };

    services.say(&inv.channel, &reply).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::bot::testing::Harness;
    use crate::chat::Sender;

    #[tokio::test]
    async fn moderator_changes_prefix() {
        let harness = Harness::new();
        harness
            .run("forsen", Sender::new("modguy").moderator(), "*prefix !")
            .await;

        assert_eq!(
            harness.transport.replies_to("forsen").await,
            vec!["Префикс успешно изменен на !."]
        );
        assert_eq!(harness.services.channels.effective_prefix("forsen").await, "!");

        // the old prefix no longer triggers commands here
        harness.run("forsen", Sender::new("viewer"), "*uptime").await;
        assert_eq!(harness.transport.said().await.len(), 1);
    }

    #[tokio::test]
    async fn viewers_are_denied() {
        let harness = Harness::new();
        harness.run("forsen", Sender::new("viewer"), "*prefix !").await;

        assert_eq!(
            harness.transport.replies_to("forsen").await,
            vec!["Доступ запрещен. Вы не модератор."]
        );
        assert_eq!(harness.services.channels.effective_prefix("forsen").await, "*");
    }

    #[tokio::test]
    async fn missing_prefix_asks_for_one() {
        let harness = Harness::new();
        harness
            .run(
                "forsen",
                Sender::new("modguy").with_display_name("ModGuy").moderator(),
                "*prefix",
            )
            .await;

        assert_eq!(
            harness.transport.replies_to("forsen").await,
            vec!["/me ModGuy, пожалуйста, укажите новый префикс."]
        );
        assert_eq!(harness.services.channels.effective_prefix("forsen").await, "*");
    }
}
