//! Condition text translations and emoji.

/// Russian text for a provider condition, or the original text.
pub fn translate(condition: &str) -> &str {
    match condition {
        "Clear" => "Ясно",
        "Sunny" => "Солнечно",
        "Partly cloudy" => "Частично облачно",
        "Cloudy" => "Облачно",
        "Overcast" => "Переменная облачность",
        "Rain" => "Дождь",
        "Drizzle" => "Морось",
        "Showers" => "Ливень",
        "Snow" => "Снег",
        "Fog" => "Туман",
        "Wind" => "Ветер",
        "Thunderstorm" => "Гроза",
        "Hail" => "Град",
        other => other,
    }
}

pub fn emoji(condition: &str) -> &'static str {
    match condition {
        "Clear" => "☀️",
        "Partly cloudy" => "⛅",
        "Cloudy" | "Overcast" => "☁️",
        "Rain" => "🌧️",
        "Drizzle" | "Showers" => "🌦️",
        "Snow" => "❄️",
        "Fog" => "🌫️",
        "Wind" => "🌬️",
        "Thunderstorm" => "⛈️",
        "Hail" => "🌨️",
        _ => "",
    }
}
