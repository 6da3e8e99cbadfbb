use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;

use crate::models::{DayTimes, default_midnight};
use crate::prayer_times::schedule::time_to_minutes;

pub const ALADHAN_BASE: &str = "https://api.aladhan.com";

/// Thin client for the Aladhan `timingsByCity` endpoint. The base URL is
/// swappable so tests can point it at a local mock.
#[derive(Debug, Clone)]
pub struct AladhanClient {
    http: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ApiEnvelope {
    data: ApiData,
}

#[derive(Debug, Deserialize)]
struct ApiData {
    timings: ApiTimings,
}

#[derive(Debug, Deserialize)]
struct ApiTimings {
    #[serde(rename = "Fajr")]
    fajr: String,
    #[serde(rename = "Sunrise")]
    sunrise: String,
    #[serde(rename = "Dhuhr")]
    dhuhr: String,
    #[serde(rename = "Asr")]
    asr: String,
    #[serde(rename = "Maghrib")]
    maghrib: String,
    #[serde(rename = "Isha")]
    isha: String,
    #[serde(rename = "Midnight")]
    midnight: Option<String>,
}

fn api_time(s: &str) -> Result<chrono::NaiveTime> {
    let minutes = time_to_minutes(s)?;
    chrono::NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0)
        .ok_or_else(|| anyhow!("Time '{}' out of range", s))
}

impl Default for AladhanClient {
    fn default() -> Self {
        Self::new()
    }
}

impl AladhanClient {
    pub fn new() -> Self {
        Self::with_base(ALADHAN_BASE)
    }

    pub fn with_base(base: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base.into().trim_end_matches('/').to_string(),
        }
    }

    /// Fetch the timings for `city`/`country` using the given calculation
    /// method. The endpoint always answers for the current day; `date` is
    /// the caller's label for it.
    pub async fn timings_by_city(
        &self,
        city: &str,
        country: &str,
        method: u8,
        date: NaiveDate,
    ) -> Result<DayTimes> {
        let url = format!("{}/v1/timingsByCity", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("city", city),
                ("country", country),
                ("method", &method.to_string()),
            ])
            .send()
            .await
            .context("Requesting prayer times")?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("Prayer times service returned HTTP {}", status));
        }

        let envelope: ApiEnvelope = response
            .json()
            .await
            .context("Decoding prayer times response")?;
        let t = envelope.data.timings;

        let midnight = match t.midnight.as_deref() {
            Some(s) => api_time(s)?,
            None => default_midnight(),
        };

        Ok(DayTimes {
            date,
            fajr: api_time(&t.fajr)?,
            sunrise: api_time(&t.sunrise)?,
            dhuhr: api_time(&t.dhuhr)?,
            asr: api_time(&t.asr)?,
            maghrib: api_time(&t.maghrib)?,
            isha: api_time(&t.isha)?,
            midnight,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use mockito::Matcher;

    fn timings_body(fajr: &str, midnight: Option<&str>) -> String {
        let mut timings = serde_json::json!({
            "Fajr": fajr,
            "Sunrise": "07:00",
            "Dhuhr": "13:00",
            "Asr": "16:00",
            "Maghrib": "19:00",
            "Isha": "20:30",
        });
        if let Some(m) = midnight {
            timings["Midnight"] = serde_json::json!(m);
        }
        serde_json::json!({
            "code": 200,
            "status": "OK",
            "data": {
                "timings": timings,
                "date": { "readable": "06 Aug 2026" },
            }
        })
        .to_string()
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[tokio::test]
    async fn fetches_and_parses_a_day_of_timings() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/timingsByCity")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("city".into(), "Bad Kissingen".into()),
                Matcher::UrlEncoded("country".into(), "Germany".into()),
                Matcher::UrlEncoded("method".into(), "2".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(timings_body("05:00", Some("00:48")))
            .create_async()
            .await;

        let client = AladhanClient::with_base(server.url());
        let date = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
        let day = client
            .timings_by_city("Bad Kissingen", "Germany", 2, date)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(day.date, date);
        assert_eq!(day.fajr, t(5, 0));
        assert_eq!(day.isha, t(20, 30));
        assert_eq!(day.midnight, t(0, 48));
    }

    #[tokio::test]
    async fn missing_midnight_falls_back_to_end_of_day() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/v1/timingsByCity")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(timings_body("05:31 (CEST)", None))
            .create_async()
            .await;

        let client = AladhanClient::with_base(server.url());
        let date = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
        let day = client
            .timings_by_city("Berlin", "Germany", 2, date)
            .await
            .unwrap();

        // Annotated times are tolerated and the cutoff defaults to 23:59.
        assert_eq!(day.fajr, t(5, 31));
        assert_eq!(day.midnight, t(23, 59));
    }

    #[tokio::test]
    async fn upstream_errors_surface_as_failures() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/v1/timingsByCity")
            .match_query(Matcher::Any)
            .with_status(500)
            .with_body("upstream broke")
            .create_async()
            .await;

        let client = AladhanClient::with_base(server.url());
        let date = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
        let err = client
            .timings_by_city("Berlin", "Germany", 2, date)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn malformed_payloads_are_rejected() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/v1/timingsByCity")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data": {"timings": {"Fajr": "not-a-time"}}}"#)
            .create_async()
            .await;

        let client = AladhanClient::with_base(server.url());
        let date = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
        assert!(
            client
                .timings_by_city("Berlin", "Germany", 2, date)
                .await
                .is_err()
        );
    }
}
