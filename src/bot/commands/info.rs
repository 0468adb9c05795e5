//! `ping` and `uptime`.

use std::time::Instant;

use crate::bot::dispatch::Invocation;
use crate::bot::format::{format_memory, format_time, format_uptime};
use crate::bot::Services;
use crate::error::Result;

pub async fn cmd_ping(services: &Services, inv: &Invocation) -> Result<()> {
    let started = Instant::now();

    let uptime = format_uptime(services.sensors.uptime().as_secs());
    let memory = format_memory(services.sensors.memory());
    let temperature = services
        .sensors
        .cpu_temperature()
        .map(|t| format!("{} °C", t))
        .unwrap_or_else(|| "N/A".to_string());

    let latency = match services.transport.ping().await {
        Ok(rtt) => rtt.as_millis().to_string(),
        Err(e) => {
            tracing::warn!("Ping to chat server failed: {}", e);
            "N/A".to_string()
        }
    };
    let internal = format_time(started.elapsed().as_millis() as u64);
    let channels = services.channels.channel_count().await;

    let reply = format!(
        "● Понг! ● Задержка: {} мс (TMI) {} (Internal) ● Время работы: {} ● Использование памяти: {} ● Температура CPU: {} ● Каналы: {}",
        latency, internal, uptime, memory, temperature, channels
    );
    services.say(&inv.channel, &reply).await;
    Ok(())
}

pub async fn cmd_uptime(services: &Services, inv: &Invocation) -> Result<()> {
    let uptime = format_uptime(services.sensors.uptime().as_secs());
    services
        .say(&inv.channel, &format!("● Время работы: {}", uptime))
        .await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::bot::testing::{FixedSensors, Harness};
    use crate::chat::Sender;

    #[tokio::test]
    async fn uptime_reply() {
        let harness = Harness::new();
        harness.run("forsen", Sender::new("viewer"), "*uptime").await;
        assert_eq!(
            harness.transport.replies_to("forsen").await,
            vec!["● Время работы: 01:02:05"]
        );
    }

    #[tokio::test]
    async fn ping_reports_everything() {
        let harness = Harness::with_sensors(FixedSensors {
            temperature: Some(48.3),
            ..FixedSensors::default()
        });
        harness.services.channels.add_channel("forsen").await.unwrap();

        harness.run("forsen", Sender::new("viewer"), "*ping").await;

        let replies = harness.transport.replies_to("forsen").await;
        assert_eq!(replies.len(), 1);
        let reply = &replies[0];
        assert!(reply.starts_with("● Понг! ● Задержка: 42 мс (TMI) 00:00 (Internal)"));
        assert!(reply.contains("Время работы: 01:02:05"));
        assert!(reply.contains("50.00 MB RSS, 1.50 MB Heap"));
        assert!(reply.contains("Температура CPU: 48.3 °C"));
        assert!(reply.ends_with("Каналы: 1"));
    }

    #[tokio::test]
    async fn ping_degrades_to_placeholders() {
        let harness = Harness::with_sensors(FixedSensors {
            memory: None,
            temperature: None,
            ..FixedSensors::default()
        });
        harness.transport.fail_ping();

        harness.run("forsen", Sender::new("viewer"), "*ping").await;

        let replies = harness.transport.replies_to("forsen").await;
        assert_eq!(replies.len(), 1);
        assert!(replies[0].contains("Задержка: N/A мс"));
        assert!(replies[0].contains("Использование памяти: N/A"));
        assert!(replies[0].contains("Температура CPU: N/A"));
        assert!(replies[0].ends_with("Каналы: 0"));
    }
}
