use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "mizan",
    version,
    about = "A terminal life dashboard - prayer times, habits, workouts and meals"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// First-run setup (location, reminder phone and channel)
    Setup {
        /// Reset existing configuration
        #[arg(long)]
        reset: bool,
    },
    /// Show today's prayer times and the countdown to the next prayer
    Times {
        /// Refetch from the prayer times service even if today is cached
        #[arg(long)]
        refresh: bool,
    },
    /// Habit tracking
    Habit {
        #[command(subcommand)]
        action: HabitCommands,
    },
    /// Today's workout
    Workout {
        #[command(subcommand)]
        action: Option<WorkoutCommands>,
    },
    /// Today's meal plan
    Meals {
        #[command(subcommand)]
        action: Option<MealCommands>,
    },
    /// Show statistics
    Stats {
        /// Show the habit grid for the last 7 days
        #[arg(long)]
        week: bool,
    },
    /// Send a one-off message through the configured channel
    Send {
        /// Destination number; defaults to the configured reminder phone
        #[arg(long)]
        to: Option<String>,
        /// Message text
        text: String,
    },
    /// Serve the HTTP endpoints for external cron schedulers
    Serve {
        /// Port to listen on
        #[arg(long, default_value_t = 3000)]
        port: u16,
    },
    /// Run the reminder daemon with exact per-prayer timers
    Watch,
}

#[derive(Subcommand, Debug)]
pub enum HabitCommands {
    /// Show today's habits with completion and streaks
    List,
    /// Flip a habit's completion for today
    Toggle {
        /// Habit name (case-insensitive)
        name: String,
    },
    /// Add a custom habit
    Add {
        /// Habit name
        name: String,
        /// Emoji shown next to the name
        #[arg(long, default_value = "✅")]
        emoji: String,
    },
    /// Remove a habit from the list (history is kept)
    Remove {
        /// Habit name
        name: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum WorkoutCommands {
    /// Toggle today's workout as done
    Done,
}

#[derive(Subcommand, Debug)]
pub enum MealCommands {
    /// Toggle a meal slot as eaten (breakfast, lunch, snack, dinner)
    Eaten {
        /// Meal slot
        slot: String,
    },
}
