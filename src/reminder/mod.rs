//! The watch daemon: instead of polling a broad tolerance band, it computes
//! the next prayer's trigger point (start minus the configured lead) and
//! sleeps exactly until then.

use anyhow::{Result, bail};
use chrono::Local;
use rusqlite::Connection;
use std::time::Duration;

use crate::config::AppConfig;
use crate::models::Reminder;
use crate::notify::Outbox;
use crate::prayer_times::{AladhanClient, cached_or_fetch, schedule};

pub async fn run(conn: &Connection, config: &AppConfig) -> Result<()> {
    if config.reminders.phone.is_empty() {
        bail!("No phone number configured. Run `mizan setup` first.");
    }
    if !config.reminders.enabled {
        bail!("Reminders are disabled in the config.");
    }
    // Fail fast on missing credentials instead of at the first trigger.
    Outbox::from_env(config.reminders.channel)?;

    let client = AladhanClient::new();
    let lead = config.reminders.lead_minutes;
    log::info!(
        "Watching prayer times for {} ({} min lead, {} channel)",
        config.location.city,
        lead,
        config.reminders.channel
    );

    loop {
        let today = Local::now().date_naive();
        let now = Local::now().time();
        let times = cached_or_fetch(conn, &client, &config.location, today).await?;

        match schedule::next_trigger(&times, now, lead) {
            Some((prayer, sleep_minutes)) => {
                let start = times.start(prayer).format("%H:%M").to_string();
                log::info!(
                    "Next: {} at {}, reminder in {} min",
                    prayer,
                    start,
                    sleep_minutes
                );
                tokio::time::sleep(Duration::from_secs(u64::from(sleep_minutes) * 60)).await;

                let reminder = Reminder::Prayer { prayer, time: start };
                let outbox = Outbox::from_env(config.reminders.channel)?;
                if let Err(err) = outbox.deliver(&config.reminders.phone, &reminder).await {
                    // No retry; the next prayer gets its own attempt.
                    log::error!("Reminder delivery failed: {}", err);
                }
                // Step past the trigger minute before recomputing.
                tokio::time::sleep(Duration::from_secs(60)).await;
            }
            None => {
                let now_m = schedule::minutes_of(Local::now().time());
                let minutes = (1440 - now_m) + 1;
                log::info!("Done for today; sleeping {} min into tomorrow", minutes);
                tokio::time::sleep(Duration::from_secs(u64::from(minutes) * 60)).await;
            }
        }
    }
}
