#![allow(dead_code)]
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrayerName {
    Fajr,
    Sunrise,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
}

impl PrayerName {
    /// All six daily entries in their fixed order, Sunrise included.
    pub fn all() -> [PrayerName; 6] {
        [
            PrayerName::Fajr,
            PrayerName::Sunrise,
            PrayerName::Dhuhr,
            PrayerName::Asr,
            PrayerName::Maghrib,
            PrayerName::Isha,
        ]
    }

    /// The five reminder targets. Sunrise is informational only.
    pub fn reminded() -> [PrayerName; 5] {
        [
            PrayerName::Fajr,
            PrayerName::Dhuhr,
            PrayerName::Asr,
            PrayerName::Maghrib,
            PrayerName::Isha,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PrayerName::Fajr => "fajr",
            PrayerName::Sunrise => "sunrise",
            PrayerName::Dhuhr => "dhuhr",
            PrayerName::Asr => "asr",
            PrayerName::Maghrib => "maghrib",
            PrayerName::Isha => "isha",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PrayerName::Fajr => "Fajr",
            PrayerName::Sunrise => "Sunrise",
            PrayerName::Dhuhr => "Dhuhr",
            PrayerName::Asr => "Asr",
            PrayerName::Maghrib => "Maghrib",
            PrayerName::Isha => "Isha",
        }
    }

    pub fn arabic_name(&self) -> &'static str {
        match self {
            PrayerName::Fajr => "الفجر",
            PrayerName::Sunrise => "الشروق",
            PrayerName::Dhuhr => "الظهر",
            PrayerName::Asr => "العصر",
            PrayerName::Maghrib => "المغرب",
            PrayerName::Isha => "العشاء",
        }
    }
}

impl std::fmt::Display for PrayerName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for PrayerName {
    type Err = anyhow::Error;

    /// Accepts both our lowercase names and the Title-Case keys Aladhan uses.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fajr" => Ok(PrayerName::Fajr),
            "sunrise" => Ok(PrayerName::Sunrise),
            "dhuhr" | "zuhr" | "dhuhur" => Ok(PrayerName::Dhuhr),
            "asr" => Ok(PrayerName::Asr),
            "maghrib" => Ok(PrayerName::Maghrib),
            "isha" => Ok(PrayerName::Isha),
            _ => Err(anyhow::anyhow!("Unknown prayer name: {}", s)),
        }
    }
}

/// One calendar day's prayer start times in the viewer's local wall-clock
/// frame, plus the midnight cutoff that ends Isha.
///
/// A window runs from a prayer's start to the next prayer's start; Fajr ends
/// at Sunrise, Isha at `midnight` (the API's Midnight timing, or 23:59 when
/// the API does not supply one).
#[derive(Debug, Clone, PartialEq)]
pub struct DayTimes {
    pub date: NaiveDate,
    pub fajr: NaiveTime,
    pub sunrise: NaiveTime,
    pub dhuhr: NaiveTime,
    pub asr: NaiveTime,
    pub maghrib: NaiveTime,
    pub isha: NaiveTime,
    pub midnight: NaiveTime,
}

impl DayTimes {
    pub fn start(&self, prayer: PrayerName) -> NaiveTime {
        match prayer {
            PrayerName::Fajr => self.fajr,
            PrayerName::Sunrise => self.sunrise,
            PrayerName::Dhuhr => self.dhuhr,
            PrayerName::Asr => self.asr,
            PrayerName::Maghrib => self.maghrib,
            PrayerName::Isha => self.isha,
        }
    }

    pub fn end(&self, prayer: PrayerName) -> NaiveTime {
        match prayer {
            PrayerName::Fajr => self.sunrise,
            PrayerName::Sunrise => self.dhuhr,
            PrayerName::Dhuhr => self.asr,
            PrayerName::Asr => self.maghrib,
            PrayerName::Maghrib => self.isha,
            PrayerName::Isha => self.midnight,
        }
    }

    pub fn entries(&self) -> [(PrayerName, NaiveTime); 6] {
        PrayerName::all().map(|p| (p, self.start(p)))
    }
}

pub fn default_midnight() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 0).expect("23:59 is a valid time")
}
