//! Pure arithmetic over a single day's prayer start times.
//!
//! Everything in here works on minutes since local midnight and takes the
//! current time as a parameter, so it can be tested without a clock, a
//! database or the upstream API.

use anyhow::{Result, anyhow};
use chrono::{NaiveTime, Timelike};

use crate::models::{DayTimes, PrayerName};

/// Inclusive tolerance band, in minutes before a prayer's start, inside which
/// a polled cron check fires a reminder. The band is wider than the nominal
/// ten-minute lead so a caller polling every ~5 minutes cannot step over it.
pub const REMINDER_BAND_MIN: u32 = 8;
pub const REMINDER_BAND_MAX: u32 = 12;

/// Parse an "HH:MM" string into minutes since midnight, in `[0, 1439]`.
///
/// Tolerates a trailing annotation after the time ("05:31 (CEST)"), which
/// some upstream endpoints append.
pub fn time_to_minutes(s: &str) -> Result<u32> {
    let bare = s.trim().split_whitespace().next().unwrap_or("");
    let (h, m) = bare
        .split_once(':')
        .ok_or_else(|| anyhow!("Bad time '{}': expected HH:MM", s))?;
    let hours: u32 = h.parse().map_err(|_| anyhow!("Bad hour in '{}'", s))?;
    let minutes: u32 = m.parse().map_err(|_| anyhow!("Bad minute in '{}'", s))?;
    if hours > 23 || minutes > 59 {
        return Err(anyhow!("Time '{}' out of range", s));
    }
    Ok(hours * 60 + minutes)
}

/// Render minutes since midnight back to "HH:MM", wrapping past a day.
pub fn minutes_to_time(minutes: u32) -> String {
    let m = minutes % 1440;
    format!("{:02}:{:02}", m / 60, m % 60)
}

pub fn minutes_of(t: NaiveTime) -> u32 {
    t.hour() * 60 + t.minute()
}

/// Half-open window containment: `start <= now < end`.
///
/// A window whose end sorts before its start (the API midnight falling past
/// 00:00) is never considered active; late-night Isha then reports no
/// current prayer. Kept as-is until the intended Isha cutoff is settled.
pub fn is_within_window(start: u32, end: u32, now: u32) -> bool {
    start <= now && now < end
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextPrayer {
    pub prayer: PrayerName,
    pub minutes_until: u32,
}

/// The first reminder prayer whose start is strictly after `now`. Once all
/// five have passed, wraps to tomorrow's Fajr, counting the remainder of
/// today plus Fajr's offset from midnight.
pub fn next_prayer(times: &DayTimes, now: NaiveTime) -> NextPrayer {
    let now_m = minutes_of(now);

    for prayer in PrayerName::reminded() {
        let start = minutes_of(times.start(prayer));
        if start > now_m {
            return NextPrayer {
                prayer,
                minutes_until: start - now_m,
            };
        }
    }

    NextPrayer {
        prayer: PrayerName::Fajr,
        minutes_until: (1440 - now_m) + minutes_of(times.fajr),
    }
}

/// The prayer whose window contains `now`, if any. Windows are contiguous
/// and non-overlapping, so at most one matches; Sunrise is skipped, which
/// leaves the stretch from Sunrise to Dhuhr with no current prayer.
pub fn current_prayer(times: &DayTimes, now: NaiveTime) -> Option<PrayerName> {
    let now_m = minutes_of(now);
    PrayerName::reminded().into_iter().find(|&prayer| {
        is_within_window(
            minutes_of(times.start(prayer)),
            minutes_of(times.end(prayer)),
            now_m,
        )
    })
}

/// Minutes left in `prayer`'s window, zero once the end has passed.
pub fn minutes_until_end(times: &DayTimes, prayer: PrayerName, now: NaiveTime) -> u32 {
    let end = minutes_of(times.end(prayer));
    end.saturating_sub(minutes_of(now))
}

/// "45 Min" under an hour, "2h 5m" from there on.
pub fn format_countdown(minutes: u32) -> String {
    if minutes < 60 {
        format!("{} Min", minutes)
    } else {
        format!("{}h {}m", minutes / 60, minutes % 60)
    }
}

/// Polled reminder check: the first prayer starting 8 to 12 minutes
/// (inclusive) from `now`, scanning the fixed order. At most one prayer can
/// match since starts are hours apart.
pub fn reminder_due(times: &DayTimes, now: NaiveTime) -> Option<PrayerName> {
    let now_m = minutes_of(now);
    for prayer in PrayerName::reminded() {
        let start = minutes_of(times.start(prayer));
        if start >= now_m {
            let diff = start - now_m;
            if (REMINDER_BAND_MIN..=REMINDER_BAND_MAX).contains(&diff) {
                return Some(prayer);
            }
        }
    }
    None
}

/// Exact-timer variant used by the watch daemon: the next prayer whose
/// trigger point (start minus `lead_minutes`) is still ahead of `now`,
/// together with the minutes to sleep until it. `None` once today is
/// exhausted; the caller rolls over to tomorrow's times.
pub fn next_trigger(times: &DayTimes, now: NaiveTime, lead_minutes: u32) -> Option<(PrayerName, u32)> {
    let now_m = minutes_of(now);
    for prayer in PrayerName::reminded() {
        let start = minutes_of(times.start(prayer));
        let trigger = start.saturating_sub(lead_minutes);
        if trigger > now_m {
            return Some((prayer, trigger - now_m));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn day(midnight: NaiveTime) -> DayTimes {
        DayTimes {
            date: NaiveDate::from_ymd_opt(2026, 8, 6).unwrap(),
            fajr: t(5, 0),
            sunrise: t(7, 0),
            dhuhr: t(13, 0),
            asr: t(16, 0),
            maghrib: t(19, 0),
            isha: t(20, 30),
            midnight,
        }
    }

    #[test]
    fn hhmm_round_trips_over_the_whole_day() {
        for m in 0..1440 {
            assert_eq!(time_to_minutes(&minutes_to_time(m)).unwrap(), m);
        }
    }

    #[test]
    fn parses_annotated_and_rejects_malformed_times() {
        assert_eq!(time_to_minutes("05:31 (CEST)").unwrap(), 331);
        assert_eq!(time_to_minutes("00:00").unwrap(), 0);
        assert_eq!(time_to_minutes("23:59").unwrap(), 1439);
        assert!(time_to_minutes("24:00").is_err());
        assert!(time_to_minutes("12:60").is_err());
        assert!(time_to_minutes("noon").is_err());
        assert!(time_to_minutes("").is_err());
    }

    #[test]
    fn next_prayer_before_fajr_is_the_literal_difference() {
        let times = day(t(23, 59));
        let next = next_prayer(&times, t(4, 0));
        assert_eq!(next.prayer, PrayerName::Fajr);
        assert_eq!(next.minutes_until, 60);
    }

    #[test]
    fn next_prayer_mid_day_skips_sunrise() {
        let times = day(t(23, 59));
        let next = next_prayer(&times, t(6, 30));
        assert_eq!(next.prayer, PrayerName::Dhuhr);
        assert_eq!(next.minutes_until, 390);
    }

    #[test]
    fn next_prayer_at_ten_to_dhuhr() {
        let times = day(t(23, 59));
        let next = next_prayer(&times, t(12, 50));
        assert_eq!(next.prayer, PrayerName::Dhuhr);
        assert_eq!(next.minutes_until, 10);
    }

    #[test]
    fn next_prayer_on_a_start_moves_to_the_following_one() {
        // Strictly-greater comparison: at exactly 13:00 Dhuhr has begun,
        // so the next upcoming prayer is Asr.
        let times = day(t(23, 59));
        let next = next_prayer(&times, t(13, 0));
        assert_eq!(next.prayer, PrayerName::Asr);
        assert_eq!(next.minutes_until, 180);
    }

    #[test]
    fn next_prayer_after_isha_wraps_to_tomorrows_fajr() {
        let times = day(t(23, 59));
        let next = next_prayer(&times, t(21, 0));
        assert_eq!(next.prayer, PrayerName::Fajr);
        assert_eq!(next.minutes_until, (1440 - (21 * 60)) + 5 * 60);
    }

    #[test]
    fn current_prayer_inside_a_window() {
        let times = day(t(23, 59));
        assert_eq!(current_prayer(&times, t(13, 5)), Some(PrayerName::Dhuhr));
        assert_eq!(current_prayer(&times, t(5, 30)), Some(PrayerName::Fajr));
    }

    #[test]
    fn current_prayer_switches_exactly_on_the_boundary() {
        let times = day(t(23, 59));
        // 12:59 sits in the Sunrise-to-Dhuhr gap: no current prayer.
        assert_eq!(current_prayer(&times, t(12, 59)), None);
        // At 13:00 sharp the Dhuhr window is active.
        assert_eq!(current_prayer(&times, t(13, 0)), Some(PrayerName::Dhuhr));
    }

    #[test]
    fn current_prayer_isha_with_same_day_cutoff() {
        let times = day(t(23, 59));
        assert_eq!(current_prayer(&times, t(21, 0)), Some(PrayerName::Isha));
        assert_eq!(current_prayer(&times, t(23, 59)), None);
    }

    #[test]
    fn isha_window_crossing_midnight_is_never_active() {
        // When the API midnight lands past 00:00 the naive comparison can't
        // see the window, so late evening reports no current prayer.
        let times = day(t(0, 48));
        assert_eq!(current_prayer(&times, t(21, 0)), None);
        assert_eq!(
            next_prayer(&times, t(21, 0)).prayer,
            PrayerName::Fajr
        );
    }

    #[test]
    fn minutes_until_end_counts_down_and_floors_at_zero() {
        let times = day(t(23, 59));
        assert_eq!(minutes_until_end(&times, PrayerName::Dhuhr, t(13, 5)), 175);
        assert_eq!(minutes_until_end(&times, PrayerName::Fajr, t(9, 0)), 0);
    }

    #[test]
    fn countdown_formatting() {
        assert_eq!(format_countdown(45), "45 Min");
        assert_eq!(format_countdown(0), "0 Min");
        assert_eq!(format_countdown(59), "59 Min");
        assert_eq!(format_countdown(60), "1h 0m");
        assert_eq!(format_countdown(125), "2h 5m");
    }

    #[test]
    fn reminder_band_bounds_are_inclusive() {
        let times = day(t(23, 59));
        // Dhuhr at 13:00: diffs of 13, 12, 8 and 7 minutes.
        assert_eq!(reminder_due(&times, t(12, 47)), None);
        assert_eq!(reminder_due(&times, t(12, 48)), Some(PrayerName::Dhuhr));
        assert_eq!(reminder_due(&times, t(12, 52)), Some(PrayerName::Dhuhr));
        assert_eq!(reminder_due(&times, t(12, 53)), None);
    }

    #[test]
    fn reminder_check_picks_the_first_match_only() {
        let times = day(t(23, 59));
        assert_eq!(reminder_due(&times, t(4, 50)), Some(PrayerName::Fajr));
        assert_eq!(reminder_due(&times, t(18, 52)), Some(PrayerName::Maghrib));
    }

    #[test]
    fn next_trigger_skips_passed_prayers() {
        let times = day(t(23, 59));
        let (prayer, sleep) = next_trigger(&times, t(6, 0), 10).unwrap();
        assert_eq!(prayer, PrayerName::Dhuhr);
        assert_eq!(sleep, 410); // 12:50 is 6h50m away

        let (prayer, sleep) = next_trigger(&times, t(4, 0), 10).unwrap();
        assert_eq!(prayer, PrayerName::Fajr);
        assert_eq!(sleep, 50);
    }

    #[test]
    fn next_trigger_exhausts_after_ishas_lead_point() {
        let times = day(t(23, 59));
        assert_eq!(next_trigger(&times, t(20, 25), 10), None);
    }
}
