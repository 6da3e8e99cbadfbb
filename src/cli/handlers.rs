use anyhow::{Result, anyhow};
use chrono::{Datelike, Duration, Local};
use rusqlite::Connection;
use std::io::{self, BufRead, Write};
use std::str::FromStr;

use crate::cli::args::{HabitCommands, MealCommands, WorkoutCommands};
use crate::config::AppConfig;
use crate::db::repository::{
    CacheRepo, HabitRepo, MealRepo, MetaRepo, StatsRepo, WorkoutRepo, date_key,
};
use crate::models::{MealSlot, Reminder, day_plan, is_workout_day, weekday_name};
use crate::notify::{Channel, Outbox};
use crate::prayer_times::{AladhanClient, cached_or_fetch, schedule};
use crate::utils::format::{format_time, progress_bar};

// ─── ANSI helpers ────────────────────────────────────────────────────────────

macro_rules! println_colored {
    ($color:expr, $($arg:tt)*) => {{
        print!("{}", $color);
        print!($($arg)*);
        println!("\x1b[0m");
    }};
}

const GREEN: &str = "\x1b[32m";
const AMBER: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const GOLD: &str = "\x1b[38;2;196;160;68m";

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().map_err(anyhow::Error::from)
}

// ─── Setup wizard ────────────────────────────────────────────────────────────

pub fn handle_setup(conn: &Connection, config: &mut AppConfig, reset: bool) -> Result<()> {
    if !reset {
        if let Some(done) = MetaRepo::get(conn, "setup_done")? {
            if done == "1" {
                println!("mizan is already configured. Use --reset to reconfigure.");
                return Ok(());
            }
        }
    }

    println!();
    println_colored!(GOLD, "  mizan setup");
    println_colored!(DIM, "  Prayer times come from the Aladhan service by city.");
    println!();

    config.location.city = prompt("City", &config.location.city)?;
    config.location.country = prompt("Country", &config.location.country)?;
    config.reminders.phone = prompt("Reminder phone (+49...)", &config.reminders.phone)?;
    config.reminders.channel = loop {
        let raw = prompt("Channel (whatsapp/sms)", config.reminders.channel.as_str())?;
        match Channel::from_str(&raw) {
            Ok(channel) => break channel,
            Err(err) => println_colored!(RED, "  {}", err),
        }
    };

    config.save()?;
    MetaRepo::set(conn, "setup_done", "1")?;
    // Cached times belong to the old city.
    CacheRepo::clear(conn)?;

    println!();
    println_colored!(GREEN, "  Saved. Credentials are read from the environment:");
    println_colored!(
        DIM,
        "  CRON_SECRET, SUPERCHAT_API_KEY, TWILIO_ACCOUNT_SID/AUTH_TOKEN/PHONE_NUMBER"
    );
    println!();
    Ok(())
}

fn prompt(label: &str, default: &str) -> Result<String> {
    print!("  {} [{}]: ", label, default);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let trimmed = line.trim();
    Ok(if trimmed.is_empty() {
        default.to_string()
    } else {
        trimmed.to_string()
    })
}

// ─── Times ───────────────────────────────────────────────────────────────────

pub fn handle_times(conn: &Connection, config: &AppConfig, refresh: bool) -> Result<()> {
    let rt = runtime()?;
    let client = AladhanClient::new();
    let today = Local::now().date_naive();
    let now = Local::now().time();

    let times = if refresh {
        let fetched = rt.block_on(client.timings_by_city(
            &config.location.city,
            &config.location.country,
            config.location.method,
            today,
        ))?;
        CacheRepo::store(conn, &config.location.city, &fetched)?;
        fetched
    } else {
        rt.block_on(cached_or_fetch(conn, &client, &config.location, today))?
    };

    println!();
    println_colored!(
        GOLD,
        "  Prayer Times · {} ({})",
        config.location.city,
        date_key(today)
    );
    println!();

    let current = schedule::current_prayer(&times, now);
    let next = schedule::next_prayer(&times, now);

    for (prayer, start) in times.entries() {
        let time_str = format_time(start);
        if current == Some(prayer) {
            println_colored!(GREEN, "  {:<10}  {}  ● now", prayer.display_name(), time_str);
        } else if next.prayer == prayer {
            println_colored!(AMBER, "  {:<10}  {}  ▸ next", prayer.display_name(), time_str);
        } else if start < now {
            println_colored!(DIM, "  {:<10}  {}", prayer.display_name(), time_str);
        } else {
            println_colored!(BOLD, "  {:<10}  {}", prayer.display_name(), time_str);
        }
    }

    println!();
    println_colored!(
        AMBER,
        "  Next: {} in {}",
        next.prayer.display_name(),
        schedule::format_countdown(next.minutes_until)
    );
    if let Some(prayer) = current {
        let left = schedule::minutes_until_end(&times, prayer, now);
        println_colored!(
            DIM,
            "  {} window ends {} ({} left)",
            prayer.display_name(),
            format_time(times.end(prayer)),
            schedule::format_countdown(left)
        );
    }
    println!();
    Ok(())
}

// ─── Habits ──────────────────────────────────────────────────────────────────

pub fn handle_habit(conn: &Connection, action: &HabitCommands) -> Result<()> {
    let today = date_key(Local::now().date_naive());

    match action {
        HabitCommands::List => {
            let habits = HabitRepo::active(conn)?;
            let done = HabitRepo::completion_map(conn, &today)?;

            println!();
            let completed = habits
                .iter()
                .filter(|h| done.get(&h.id).copied().unwrap_or(false))
                .count();
            println_colored!(GOLD, "  Habits · {}/{} today", completed, habits.len());
            println!();
            for habit in &habits {
                let is_done = done.get(&habit.id).copied().unwrap_or(false);
                let icon = if is_done { "●" } else { "○" };
                let color = if is_done { GREEN } else { DIM };
                println_colored!(
                    color,
                    "  {} {} {:<16} streak {}",
                    icon,
                    habit.emoji,
                    habit.name,
                    habit.streak
                );
            }
            println!();
        }
        HabitCommands::Toggle { name } => {
            let habit = HabitRepo::find_by_name(conn, name)?
                .ok_or_else(|| anyhow!("No habit named '{}'. See `mizan habit list`.", name))?;
            let now_done = HabitRepo::toggle(conn, habit.id, &today)?;
            let habit = HabitRepo::find_by_name(conn, name)?
                .ok_or_else(|| anyhow!("Habit '{}' disappeared during toggle", name))?;
            if now_done {
                println_colored!(GREEN, "  ● {} done · streak {}", habit.name, habit.streak);
            } else {
                println_colored!(AMBER, "  ○ {} unchecked · streak {}", habit.name, habit.streak);
            }
        }
        HabitCommands::Add { name, emoji } => {
            HabitRepo::add(conn, name, emoji)?;
            println_colored!(GREEN, "  Added habit '{}'", name);
        }
        HabitCommands::Remove { name } => {
            let habit = HabitRepo::find_by_name(conn, name)?
                .ok_or_else(|| anyhow!("No habit named '{}'", name))?;
            HabitRepo::deactivate(conn, habit.id)?;
            println_colored!(AMBER, "  Removed habit '{}'", habit.name);
        }
    }
    Ok(())
}

// ─── Workout ─────────────────────────────────────────────────────────────────

pub fn handle_workout(
    conn: &Connection,
    config: &AppConfig,
    action: &Option<WorkoutCommands>,
) -> Result<()> {
    let today = Local::now().date_naive();
    let today_str = date_key(today);

    if let Some(WorkoutCommands::Done) = action {
        let now_done = WorkoutRepo::toggle(conn, &today_str)?;
        if now_done {
            println_colored!(GREEN, "  Workout done. Strong!");
        } else {
            println_colored!(AMBER, "  Workout unchecked.");
        }
        return Ok(());
    }

    println!();
    if !is_workout_day(&config.workout.days, weekday_name(today.weekday())) {
        println_colored!(DIM, "  Rest day. Next workout: {}", config.workout.days.join(", "));
        println!();
        return Ok(());
    }

    let done = WorkoutRepo::is_done(conn, &today_str)?;
    let marker = if done { "● done" } else { "○ open" };
    println_colored!(GOLD, "  Workout day · {}", marker);
    println!();
    for exercise in WorkoutRepo::exercises(conn)? {
        println_colored!(BOLD, "  {}", exercise.summary());
    }
    println!();
    Ok(())
}

// ─── Meals ───────────────────────────────────────────────────────────────────

pub fn handle_meals(conn: &Connection, action: &Option<MealCommands>) -> Result<()> {
    let today = Local::now().date_naive();
    let today_str = date_key(today);

    if let Some(MealCommands::Eaten { slot }) = action {
        let slot = MealSlot::from_str(slot)?;
        let now_done = MealRepo::toggle(conn, &today_str, slot)?;
        if now_done {
            println_colored!(GREEN, "  {} eaten. Enjoy!", slot.display_name());
        } else {
            println_colored!(AMBER, "  {} unchecked.", slot.display_name());
        }
        return Ok(());
    }

    let plan = day_plan(today);
    let eaten = MealRepo::completion_map(conn, &today_str)?;

    println!();
    println_colored!(GOLD, "  Meals · {}", today_str);
    println!();

    let mut kcal = 0u32;
    let mut protein = 0u32;
    let mut carbs = 0u32;
    let mut fat = 0u32;
    for slot in MealSlot::all() {
        let Some(recipe) = MealRepo::by_id(conn, plan.recipe_id(slot))? else {
            continue;
        };
        let is_eaten = eaten.get(&slot).copied().unwrap_or(false);
        let icon = if is_eaten { "●" } else { "○" };
        let color = if is_eaten { GREEN } else { BOLD };
        println_colored!(
            color,
            "  {} {:<10} {} {:<22} {} kcal · {}g protein",
            icon,
            slot.display_name(),
            recipe.emoji,
            recipe.name,
            recipe.kcal,
            recipe.protein
        );
        if let Some(tip) = &recipe.tip {
            println_colored!(DIM, "      {}", tip);
        }
        kcal += recipe.kcal;
        protein += recipe.protein;
        carbs += recipe.carbs;
        fat += recipe.fat;
    }
    println!();
    println_colored!(
        DIM,
        "  Total: {} kcal · {}g protein · {}g carbs · {}g fat",
        kcal,
        protein,
        carbs,
        fat
    );
    println!();
    Ok(())
}

// ─── Stats ───────────────────────────────────────────────────────────────────

pub fn handle_stats(conn: &Connection, week: bool) -> Result<()> {
    let habits = HabitRepo::active(conn)?;

    println!();
    println_colored!(GOLD, "  Streaks");
    println!();
    for habit in &habits {
        let bar = progress_bar(habit.streak.min(30), 30, 12);
        println_colored!(
            BOLD,
            "  {} {:<16} {} {} days",
            habit.emoji,
            habit.name,
            bar,
            habit.streak
        );
    }

    if week {
        let today = Local::now().date_naive();
        let start = date_key(today - Duration::days(6));
        let end = date_key(today);
        let stats = StatsRepo::daily_habit_stats(conn, &start, &end)?;

        println!();
        println_colored!(GOLD, "  Last 7 Days");
        println!();
        for i in 0..7 {
            let date = date_key(today - Duration::days(6 - i));
            let (done, total) = stats
                .iter()
                .find(|s| s.date == date)
                .map(|s| (s.habits_done, s.habits_total))
                .unwrap_or((0, habits.len() as u32));
            let bar = progress_bar(done, total, 12);
            println_colored!(DIM, "  {}  {}  {}/{}", date, bar, done, total);
        }
    }
    println!();
    Ok(())
}

// ─── Send / Serve / Watch ────────────────────────────────────────────────────

pub fn handle_send(config: &AppConfig, to: &Option<String>, text: &str) -> Result<()> {
    let to = to
        .clone()
        .filter(|t| !t.is_empty())
        .or_else(|| Some(config.reminders.phone.clone()).filter(|p| !p.is_empty()))
        .ok_or_else(|| anyhow!("No destination. Pass --to or run `mizan setup`."))?;

    let outbox = Outbox::from_env(config.reminders.channel)?;
    let reminder = Reminder::Custom { text: text.to_string() };

    let rt = runtime()?;
    match rt.block_on(outbox.deliver(&to, &reminder)) {
        Ok(()) => println_colored!(GREEN, "  ✓ Sent to {}", to),
        Err(err) => {
            println_colored!(RED, "  ✗ {}", err);
            return Err(err.into());
        }
    }
    Ok(())
}

pub fn handle_serve(conn: Connection, config: &AppConfig, port: u16) -> Result<()> {
    let state = crate::server::AppState::new(conn, config.clone());
    if state.cron_secret.is_none() {
        log::warn!("CRON_SECRET is not set; the cron endpoints will answer 500");
    }
    println_colored!(GOLD, "  mizan serve · port {}", port);
    println_colored!(DIM, "  GET  /api/prayer-times");
    println_colored!(DIM, "  GET  /api/cron/prayer-check?secret=&phone=");
    println_colored!(DIM, "  GET  /api/cron/morning-summary?secret=&phone=");
    println_colored!(DIM, "  GET  /api/cron/evening-check?secret=&phone=");
    println_colored!(DIM, "  POST /api/send");

    let rt = runtime()?;
    rt.block_on(crate::server::serve(state, port))
}

pub fn handle_watch(conn: &Connection, config: &AppConfig) -> Result<()> {
    let rt = runtime()?;
    rt.block_on(crate::reminder::run(conn, config))
}
