use serde::{Deserialize, Serialize};

/// A daily habit definition. The streak is a stored counter that moves in
/// lockstep with the completion toggle: toggling on adds one, toggling off
/// takes one back (floored at zero). It is not audited against the actual
/// day-by-day history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Habit {
    pub id: i64,
    pub name: String,
    pub emoji: String,
    pub streak: u32,
}

/// Today's completion snapshot, as used by the evening check message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitStatus {
    pub name: String,
    pub completed: bool,
}
