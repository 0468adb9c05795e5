//! `weather` / `погода` (full report) and `temp` (temperature only).

use crate::bot::dispatch::Invocation;
use crate::bot::{LocationBook, Services};
use crate::error::Result;
use crate::weather::report;

/// Pick the city to look up:
/// 1. first argument naming a user with a saved location
/// 2. all arguments as a literal city
/// 3. the sender's own saved location
pub async fn resolve_city(locations: &LocationBook, sender: &str, args: &[String]) -> Option<String> {
    if let Some(first) = args.first() {
        if let Some(city) = locations.city_of(first).await {
            return Some(city);
        }
        let literal = args.join(" ");
        if !literal.trim().is_empty() {
            return Some(literal);
        }
    }
    locations.city_of(sender).await
}

pub async fn cmd_weather(services: &Services, inv: &Invocation, temperature_only: bool) -> Result<()> {
    let user = inv.sender.name();

    let Some(city) = resolve_city(&services.locations, user, &inv.args).await else {
        services
            .say(
                &inv.channel,
                &format!(
                    "/me {}, местоположение не задано. Установите его командой set location.",
                    user
                ),
            )
            .await;
        return Ok(());
    };

    let response = match services.weather.current(&city).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("Weather lookup for {} failed: {}", city, e);
            services
                .say(
                    &inv.channel,
                    &format!("/me {}, произошла ошибка при получении данных о погоде.", user),
                )
                .await;
            return Ok(());
        }
    };

    let reply = if temperature_only {
        response
            .current
            .as_ref()
            .map(|current| report::temperature(user, current))
    } else {
        report::full(user, &response)
    };

    let reply = reply.unwrap_or_else(|| {
        tracing::warn!("Weather response for {} has no current conditions", city);
        format!("/me {}, не удалось получить данные о погоде.", user)
    });
    services.say(&inv.channel, &reply).await;
    Ok(())
}
