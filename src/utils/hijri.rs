use chrono::{Datelike, Duration};
use hijri_date::HijriDate;

/// Islamic month names in English (index 0 = Muharram = month 1)
const HIJRI_MONTH_NAMES: &[&str] = &[
    "Muharram",
    "Safar",
    "Rabi' al-Awwal",
    "Rabi' al-Thani",
    "Jumada al-Awwal",
    "Jumada al-Thani",
    "Rajab",
    "Sha'ban",
    "Ramadan",
    "Shawwal",
    "Dhu al-Qi'dah",
    "Dhu al-Hijjah",
];

fn month_name(month: usize) -> &'static str {
    if (1..=12).contains(&month) {
        HIJRI_MONTH_NAMES[month - 1]
    } else {
        "Unknown"
    }
}

/// Today's Hijri date as "14 Safar 1448". `offset_days` adjusts for local
/// moon sighting (e.g. -1 for regions one day behind Saudi Arabia).
pub fn today_hijri_string(offset_days: i32) -> String {
    let adjusted = chrono::Local::now().date_naive() + Duration::days(offset_days as i64);
    match HijriDate::from_gr(
        adjusted.year() as usize,
        adjusted.month() as usize,
        adjusted.day() as usize,
    ) {
        Ok(hd) => format!("{} {} {}", hd.day(), month_name(hd.month()), hd.year()),
        Err(_) => {
            let hd = HijriDate::today();
            format!("{} {} {}", hd.day(), month_name(hd.month()), hd.year())
        }
    }
}
