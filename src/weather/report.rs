//! Chat replies built from a weather response.

use super::conditions;
use super::{Current, WeatherResponse};

const UNKNOWN: &str = "Неизвестно";

/// Render a reading the way chat expects: `21` rather than `21.0`.
pub fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) if v.fract() == 0.0 => format!("{}", v as i64),
        Some(v) => {
            let rounded = (v * 100.0).round() / 100.0;
            format!("{}", rounded)
        }
        None => UNKNOWN.to_string(),
    }
}

/// Temperature-only reply.
pub fn temperature(user: &str, current: &Current) -> String {
    format!(
        "/me {}, сейчас Температура {}°C, ощущается как {}°C.",
        user,
        format_value(current.temp_c),
        format_value(current.feelslike_c)
    )
}

/// Full reply. `None` when the response carries no current conditions.
pub fn full(user: &str, response: &WeatherResponse) -> Option<String> {
    let current = response.current.as_ref()?;

    let condition = current
        .condition
        .as_ref()
        .and_then(|c| c.text.as_deref())
        .unwrap_or(UNKNOWN);
    let alert = format!(
        "{} {}",
        conditions::emoji(condition),
        conditions::translate(condition)
    );

    let mut message = format!(
        "/me {}, сейчас Температура {}°C, ощущается как {}°C. Облачность: {}%. Ветер: {} км/ч. Влажность: {}%. Давление: {} гПа. Видимость: {} км. Оповещения о погоде: {}.",
        user,
        format_value(current.temp_c),
        format_value(current.feelslike_c),
        format_value(current.cloud),
        format_value(current.wind_kph),
        format_value(current.humidity),
        format_value(current.pressure_mb.map(|mb| mb / 10.0)),
        format_value(current.vis_km),
        alert.trim()
    );

    if let Some(astro) = response.astro() {
        if let (Some(sunrise), Some(sunset)) = (&astro.sunrise, &astro.sunset) {
            message.push_str(&format!(" Восход: {}, закат: {}.", sunrise, sunset));
        }
    }

    Some(message)
}
