pub mod client;
pub mod schedule;

pub use client::{ALADHAN_BASE, AladhanClient};

use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::Connection;

use crate::config::settings::LocationConfig;
use crate::db::repository::CacheRepo;
use crate::models::DayTimes;

/// Cache-through lookup for one day's times: per (date, city) the upstream
/// is asked once, everything after that is served from SQLite.
pub async fn cached_or_fetch(
    conn: &Connection,
    client: &AladhanClient,
    location: &LocationConfig,
    date: NaiveDate,
) -> Result<DayTimes> {
    if let Some(times) = CacheRepo::get(conn, date, &location.city)? {
        return Ok(times);
    }
    let fetched = client
        .timings_by_city(&location.city, &location.country, location.method, date)
        .await?;
    CacheRepo::store(conn, &location.city, &fetched)?;
    Ok(fetched)
}
