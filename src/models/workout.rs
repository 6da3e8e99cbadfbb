use serde::{Deserialize, Serialize};

/// One line of the workout plan, e.g. 4x12 push-ups. Reps stay a string so
/// time-based sets ("60s") fit the same field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub name: String,
    pub sets: u32,
    pub reps: String,
}

impl Exercise {
    pub fn summary(&self) -> String {
        format!("{} {}x{}", self.name, self.sets, self.reps)
    }
}

/// Whether `weekday` (lowercase English name) is one of the configured
/// workout days.
pub fn is_workout_day(days: &[String], weekday: &str) -> bool {
    days.iter().any(|d| d.eq_ignore_ascii_case(weekday))
}

/// The lowercase English name used in config and messages.
pub fn weekday_name(weekday: chrono::Weekday) -> &'static str {
    match weekday {
        chrono::Weekday::Mon => "monday",
        chrono::Weekday::Tue => "tuesday",
        chrono::Weekday::Wed => "wednesday",
        chrono::Weekday::Thu => "thursday",
        chrono::Weekday::Fri => "friday",
        chrono::Weekday::Sat => "saturday",
        chrono::Weekday::Sun => "sunday",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workout_day_lookup_ignores_case() {
        let days = vec!["monday".to_string(), "thursday".to_string()];
        assert!(is_workout_day(&days, "Monday"));
        assert!(is_workout_day(&days, "thursday"));
        assert!(!is_workout_day(&days, "friday"));
    }

    #[test]
    fn exercise_summary_reads_like_a_plan_line() {
        let e = Exercise {
            name: "Push-ups".into(),
            sets: 4,
            reps: "12".into(),
        };
        assert_eq!(e.summary(), "Push-ups 4x12");
    }
}
