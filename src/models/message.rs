use serde::{Deserialize, Serialize};

use crate::models::{Exercise, PrayerName};

/// A name/detail pair used by the summary messages: prayer name + start
/// time, or meal slot + recipe name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub name: String,
    pub detail: String,
}

impl Entry {
    pub fn new(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MorningSummary {
    pub prayers: Vec<Entry>,
    pub meals: Vec<Entry>,
    pub habits: Vec<String>,
    pub workout: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EveningCheck {
    pub completed: usize,
    pub total: usize,
    pub missing: Vec<String>,
}

/// Every outbound message kind with the fields it needs. The wire shape is
/// `{"type": ..., "data": {...}}`, matched exhaustively both here and at the
/// `/api/send` boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Reminder {
    Prayer { prayer: PrayerName, time: String },
    Morning(MorningSummary),
    Evening(EveningCheck),
    Meal { name: String, kcal: u32, protein: u32 },
    Workout { exercises: Vec<Exercise> },
    Quran,
    Custom { text: String },
}

impl Reminder {
    pub fn kind(&self) -> &'static str {
        match self {
            Reminder::Prayer { .. } => "prayer",
            Reminder::Morning(_) => "morning",
            Reminder::Evening(_) => "evening",
            Reminder::Meal { .. } => "meal",
            Reminder::Workout { .. } => "workout",
            Reminder::Quran => "quran",
            Reminder::Custom { .. } => "custom",
        }
    }

    /// Render the message body sent over SMS/WhatsApp. Kept short; SMS
    /// splits past 160 characters.
    pub fn render(&self) -> String {
        match self {
            Reminder::Prayer { prayer, time } => {
                format!("🕌 {} in 10 min ({}) - Allahu Akbar", prayer.display_name(), time)
            }
            Reminder::Morning(summary) => render_morning(summary),
            Reminder::Evening(check) => render_evening(check),
            Reminder::Meal { name, kcal, protein } => {
                format!("🍽️ {}\n{} kcal | {}g protein\nEnjoy! 🤲", name, kcal, protein)
            }
            Reminder::Workout { exercises } => {
                let lines: Vec<String> = exercises.iter().map(|e| e.summary()).collect();
                format!("💪 Workout!\n\n{}\n\nYallah! 🔥", lines.join("\n"))
            }
            Reminder::Quran => {
                "📖 Quran reminder\n\nTake 10-15 minutes to read.\n\nبِسْمِ اللَّهِ 🤲".to_string()
            }
            Reminder::Custom { text } => text.clone(),
        }
    }
}

fn render_morning(summary: &MorningSummary) -> String {
    let mut msg = String::from("☀️ Good morning!\n\n");

    msg.push_str("🕌 Prayer times:\n");
    for p in &summary.prayers {
        msg.push_str(&format!("• {}: {}\n", p.name, p.detail));
    }

    if !summary.meals.is_empty() {
        msg.push_str("\n🍽️ Meals:\n");
        for m in &summary.meals {
            msg.push_str(&format!("• {}: {}\n", m.name, m.detail));
        }
    }

    if !summary.habits.is_empty() {
        msg.push_str("\n✅ Habits for today:\n");
        for h in &summary.habits {
            msg.push_str(&format!("• {}\n", h));
        }
    }

    if let Some(workout) = &summary.workout {
        msg.push_str(&format!("\n💪 {}\n", workout));
    }

    msg.push_str("\nBismillah! 🔥");
    msg
}

fn render_evening(check: &EveningCheck) -> String {
    let mut msg = String::from("🌙 Evening check\n\n");
    msg.push_str(&format!("{}/{} habits done.\n", check.completed, check.total));

    if check.missing.is_empty() {
        msg.push_str("\n✅ All done. Strong day! 🏆");
    } else {
        msg.push_str("\nStill open:\n");
        for name in &check.missing {
            msg.push_str(&format!("• {}\n", name));
        }
        msg.push_str("\nStill time until midnight! 💪");
    }
    msg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prayer_reminder_names_the_prayer_and_time() {
        let msg = Reminder::Prayer {
            prayer: PrayerName::Maghrib,
            time: "19:04".into(),
        }
        .render();
        assert_eq!(msg, "🕌 Maghrib in 10 min (19:04) - Allahu Akbar");
    }

    #[test]
    fn morning_summary_lists_every_section() {
        let msg = Reminder::Morning(MorningSummary {
            prayers: vec![Entry::new("Fajr", "05:31")],
            meals: vec![Entry::new("Breakfast", "Mega Scramble")],
            habits: vec!["Read Quran".into()],
            workout: Some("Workout day!".into()),
        })
        .render();
        assert!(msg.contains("• Fajr: 05:31"));
        assert!(msg.contains("• Breakfast: Mega Scramble"));
        assert!(msg.contains("• Read Quran"));
        assert!(msg.contains("💪 Workout day!"));
    }

    #[test]
    fn morning_summary_skips_empty_sections() {
        let msg = Reminder::Morning(MorningSummary {
            prayers: vec![Entry::new("Fajr", "05:31")],
            meals: vec![],
            habits: vec![],
            workout: None,
        })
        .render();
        assert!(!msg.contains("Meals"));
        assert!(!msg.contains("Habits"));
        assert!(!msg.contains("💪"));
    }

    #[test]
    fn evening_check_reports_open_habits() {
        let msg = Reminder::Evening(EveningCheck {
            completed: 4,
            total: 6,
            missing: vec!["Dhikr".into(), "Read a book".into()],
        })
        .render();
        assert!(msg.contains("4/6 habits done."));
        assert!(msg.contains("• Dhikr"));
        assert!(msg.contains("• Read a book"));
    }

    #[test]
    fn evening_check_celebrates_a_clean_day() {
        let msg = Reminder::Evening(EveningCheck {
            completed: 6,
            total: 6,
            missing: vec![],
        })
        .render();
        assert!(msg.contains("All done"));
        assert!(!msg.contains("Still open"));
    }

    #[test]
    fn wire_shape_matches_the_type_data_envelope() {
        let json = r#"{"type":"prayer","data":{"prayer":"fajr","time":"05:31"}}"#;
        let parsed: Reminder = serde_json::from_str(json).unwrap();
        assert_eq!(
            parsed,
            Reminder::Prayer {
                prayer: PrayerName::Fajr,
                time: "05:31".into()
            }
        );
    }

    #[test]
    fn every_kind_survives_a_serde_round_trip() {
        let all = vec![
            Reminder::Prayer { prayer: PrayerName::Isha, time: "21:40".into() },
            Reminder::Morning(MorningSummary {
                prayers: vec![Entry::new("Fajr", "05:31")],
                meals: vec![],
                habits: vec!["Dhikr".into()],
                workout: None,
            }),
            Reminder::Evening(EveningCheck { completed: 1, total: 2, missing: vec!["x".into()] }),
            Reminder::Meal { name: "Salmon & Greens".into(), kcal: 710, protein: 50 },
            Reminder::Workout {
                exercises: vec![Exercise { name: "Rows".into(), sets: 4, reps: "10".into() }],
            },
            Reminder::Quran,
            Reminder::Custom { text: "ping".into() },
        ];
        for reminder in all {
            let json = serde_json::to_string(&reminder).unwrap();
            let back: Reminder = serde_json::from_str(&json).unwrap();
            assert_eq!(back, reminder);
        }
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let json = r#"{"type":"telegram","data":{}}"#;
        assert!(serde_json::from_str::<Reminder>(json).is_err());
    }
}
