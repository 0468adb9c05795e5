//! `join`, `part` and `channels`.

use crate::bot::dispatch::Invocation;
use crate::bot::{ChannelError, Services};
use crate::chat::normalize_channel;
use crate::error::Result;

/// Target channel from the first argument, if any.
fn target_channel(inv: &Invocation) -> Option<String> {
    inv.args
        .first()
        .map(|arg| normalize_channel(arg))
        .filter(|name| !name.is_empty())
}

async fn ask_for_channel(services: &Services, inv: &Invocation) {
    let reply = format!(
        "/me {}, пожалуйста, укажите название канала.",
        inv.sender.name()
    );
    services.say(&inv.channel, &reply).await;
}

pub async fn cmd_join(services: &Services, inv: &Invocation) -> Result<()> {
    let Some(target) = target_channel(inv) else {
        ask_for_channel(services, inv).await;
        return Ok(());
    };

    match services.channels.add_channel(&target).await {
        Ok(()) => {
            services.say(&target, &services.greeting).await;
            services
                .say(
                    &inv.channel,
                    &format!("/me Успешно подключился к каналу {}", target),
                )
                .await;
        }
        Err(ChannelError::AlreadyJoined(_)) => {
            tracing::info!("Already joined #{}", target);
        }
        Err(e) => {
            tracing::error!("Failed to join #{}: {}", target, e);
            services
                .say(
                    &inv.channel,
                    &format!("/me Произошла ошибка при подключении к каналу {}", target),
                )
                .await;
        }
    }
    Ok(())
}

pub async fn cmd_part(services: &Services, inv: &Invocation) -> Result<()> {
    let Some(target) = target_channel(inv) else {
        ask_for_channel(services, inv).await;
        return Ok(());
    };

    match services.channels.remove_channel(&target).await {
        Ok(()) => {
            services
                .say(
                    &inv.channel,
                    &format!("/me Успешно отключился от канала {}", target),
                )
                .await;
        }
        Err(ChannelError::NotJoined(_)) => {
            tracing::info!("Not joined to #{}", target);
        }
        Err(e) => {
            tracing::error!("Failed to part #{}: {}", target, e);
            services
                .say(
                    &inv.channel,
                    &format!("/me Произошла ошибка при отключении от канала {}", target),
                )
                .await;
        }
    }
    Ok(())
}

pub async fn cmd_channels(services: &Services, inv: &Invocation) -> Result<()> {
    let channels = services.channels.list_channels().await;
    let reply = if channels.is_empty() {
        "/me Каналы (0)".to_string()
    } else {
        format!("/me Каналы ({}): {}", channels.len(), channels.join(", "))
    };
    services.say(&inv.channel, &reply).await;
    Ok(())
}
