pub mod habit;
pub mod meal;
pub mod message;
pub mod prayer;
pub mod workout;

pub use habit::{Habit, HabitStatus};
pub use meal::{DayPlan, MealSlot, Recipe, day_plan};
pub use message::{Entry, EveningCheck, MorningSummary, Reminder};
pub use prayer::{DayTimes, PrayerName, default_midnight};
pub use workout::{Exercise, is_workout_day, weekday_name};
