use serde::{Deserialize, Serialize};
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Snack,
    Dinner,
}

impl MealSlot {
    pub fn all() -> [MealSlot; 4] {
        [
            MealSlot::Breakfast,
            MealSlot::Lunch,
            MealSlot::Snack,
            MealSlot::Dinner,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MealSlot::Breakfast => "breakfast",
            MealSlot::Lunch => "lunch",
            MealSlot::Snack => "snack",
            MealSlot::Dinner => "dinner",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            MealSlot::Breakfast => "Breakfast",
            MealSlot::Lunch => "Lunch",
            MealSlot::Snack => "Snack",
            MealSlot::Dinner => "Dinner",
        }
    }
}

impl FromStr for MealSlot {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "breakfast" => Ok(MealSlot::Breakfast),
            "lunch" => Ok(MealSlot::Lunch),
            "snack" => Ok(MealSlot::Snack),
            "dinner" => Ok(MealSlot::Dinner),
            _ => Err(anyhow::anyhow!("Unknown meal slot: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    pub id: String,
    pub name: String,
    pub emoji: String,
    pub slot: MealSlot,
    pub kcal: u32,
    pub protein: u32,
    pub carbs: u32,
    pub fat: u32,
    pub tip: Option<String>,
}

/// Recipe ids for the four slots of one day.
#[derive(Debug, Clone, PartialEq)]
pub struct DayPlan {
    pub breakfast: &'static str,
    pub lunch: &'static str,
    pub snack: &'static str,
    pub dinner: &'static str,
}

impl DayPlan {
    pub fn recipe_id(&self, slot: MealSlot) -> &'static str {
        match slot {
            MealSlot::Breakfast => self.breakfast,
            MealSlot::Lunch => self.lunch,
            MealSlot::Snack => self.snack,
            MealSlot::Dinner => self.dinner,
        }
    }
}

const WEEK_A: [DayPlan; 7] = [
    // Monday .. Sunday
    DayPlan { breakfast: "mega-scramble", lunch: "chicken-power-plate", snack: "protein-shake", dinner: "salmon-greens" },
    DayPlan { breakfast: "quinoa-bowl", lunch: "beef-rice-bowl", snack: "nut-quark", dinner: "chicken-power-plate" },
    DayPlan { breakfast: "mega-scramble", lunch: "chicken-power-plate", snack: "protein-shake", dinner: "beef-rice-bowl" },
    DayPlan { breakfast: "quinoa-bowl", lunch: "beef-rice-bowl", snack: "nut-quark", dinner: "salmon-greens" },
    DayPlan { breakfast: "mega-scramble", lunch: "chicken-power-plate", snack: "protein-shake", dinner: "chicken-power-plate" },
    DayPlan { breakfast: "quinoa-bowl", lunch: "salmon-greens", snack: "nut-quark", dinner: "beef-rice-bowl" },
    DayPlan { breakfast: "mega-scramble", lunch: "beef-rice-bowl", snack: "protein-shake", dinner: "salmon-greens" },
];

const WEEK_B: [DayPlan; 7] = [
    DayPlan { breakfast: "quinoa-bowl", lunch: "beef-rice-bowl", snack: "nut-quark", dinner: "chicken-power-plate" },
    DayPlan { breakfast: "mega-scramble", lunch: "salmon-greens", snack: "protein-shake", dinner: "beef-rice-bowl" },
    DayPlan { breakfast: "quinoa-bowl", lunch: "chicken-power-plate", snack: "nut-quark", dinner: "salmon-greens" },
    DayPlan { breakfast: "mega-scramble", lunch: "beef-rice-bowl", snack: "protein-shake", dinner: "chicken-power-plate" },
    DayPlan { breakfast: "quinoa-bowl", lunch: "salmon-greens", snack: "nut-quark", dinner: "beef-rice-bowl" },
    DayPlan { breakfast: "mega-scramble", lunch: "chicken-power-plate", snack: "protein-shake", dinner: "salmon-greens" },
    DayPlan { breakfast: "quinoa-bowl", lunch: "beef-rice-bowl", snack: "nut-quark", dinner: "chicken-power-plate" },
];

/// The plan rotates over two week templates by ISO week parity, so the same
/// weekday alternates between them from one week to the next.
pub fn day_plan(date: NaiveDate) -> DayPlan {
    let weekday = date.weekday().num_days_from_monday() as usize;
    if date.iso_week().week() % 2 == 0 {
        WEEK_A[weekday].clone()
    } else {
        WEEK_B[weekday].clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_names_round_trip() {
        for slot in MealSlot::all() {
            assert_eq!(slot.as_str().parse::<MealSlot>().unwrap(), slot);
        }
        assert!("brunch".parse::<MealSlot>().is_err());
    }

    #[test]
    fn plan_alternates_between_week_templates() {
        // 2026-08-03 is a Monday in ISO week 32 (even), the next Monday is odd.
        let even_monday = NaiveDate::from_ymd_opt(2026, 8, 3).unwrap();
        let odd_monday = NaiveDate::from_ymd_opt(2026, 8, 10).unwrap();
        assert_eq!(day_plan(even_monday), WEEK_A[0]);
        assert_eq!(day_plan(odd_monday), WEEK_B[0]);
    }

    #[test]
    fn every_plan_day_covers_all_four_slots() {
        for plan in WEEK_A.iter().chain(WEEK_B.iter()) {
            for slot in MealSlot::all() {
                assert!(!plan.recipe_id(slot).is_empty());
            }
        }
    }
}
