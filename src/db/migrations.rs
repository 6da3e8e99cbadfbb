use anyhow::Result;
use rusqlite::Connection;

pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS prayer_cache (
            date     TEXT NOT NULL,
            city     TEXT NOT NULL,
            fajr     TEXT NOT NULL,
            sunrise  TEXT NOT NULL,
            dhuhr    TEXT NOT NULL,
            asr      TEXT NOT NULL,
            maghrib  TEXT NOT NULL,
            isha     TEXT NOT NULL,
            midnight TEXT NOT NULL,
            PRIMARY KEY (date, city)
        );

        CREATE TABLE IF NOT EXISTS habits (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            name       TEXT NOT NULL UNIQUE,
            emoji      TEXT NOT NULL DEFAULT '',
            streak     INTEGER NOT NULL DEFAULT 0,
            sort_order INTEGER NOT NULL DEFAULT 0,
            active     INTEGER NOT NULL DEFAULT 1,
            created_at TEXT DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS habit_log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            habit_id  INTEGER NOT NULL REFERENCES habits(id),
            date      TEXT NOT NULL,
            completed INTEGER NOT NULL DEFAULT 0,
            UNIQUE(habit_id, date)
        );

        CREATE TABLE IF NOT EXISTS recipes (
            id      TEXT PRIMARY KEY,
            name    TEXT NOT NULL,
            emoji   TEXT NOT NULL DEFAULT '',
            slot    TEXT NOT NULL CHECK(slot IN ('breakfast','lunch','snack','dinner')),
            kcal    INTEGER NOT NULL,
            protein INTEGER NOT NULL,
            carbs   INTEGER NOT NULL,
            fat     INTEGER NOT NULL,
            tip     TEXT
        );

        CREATE TABLE IF NOT EXISTS meal_log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            slot      TEXT NOT NULL CHECK(slot IN ('breakfast','lunch','snack','dinner')),
            completed INTEGER NOT NULL DEFAULT 0,
            UNIQUE(date, slot)
        );

        CREATE TABLE IF NOT EXISTS workout_exercises (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            name       TEXT NOT NULL UNIQUE,
            sets       INTEGER NOT NULL,
            reps       TEXT NOT NULL,
            sort_order INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS workout_log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL UNIQUE,
            completed INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS app_meta (
            key   TEXT PRIMARY KEY,
            value TEXT
        );
    ",
    )?;

    seed_defaults(conn)?;
    Ok(())
}

/// First-run seed data. INSERT OR IGNORE keeps user edits on later startups.
fn seed_defaults(conn: &Connection) -> Result<()> {
    let habits = [
        ("Read Quran", "📖", 0),
        ("Workout", "💪", 1),
        ("Read a book", "📚", 2),
        ("Post story", "📱", 3),
        ("Post reel", "🎬", 4),
        ("Dhikr", "🤲", 5),
    ];
    for (name, emoji, order) in &habits {
        conn.execute(
            "INSERT OR IGNORE INTO habits (name, emoji, streak, sort_order, active)
             VALUES (?1, ?2, 0, ?3, 1)",
            rusqlite::params![name, emoji, order],
        )?;
    }

    let recipes = [
        ("mega-scramble", "Mega Scramble", "🍳", "breakfast", 620, 56, 8, 40,
         Some("The eggs keep cooking off the heat. Pull the pan early.")),
        ("quinoa-bowl", "Power Quinoa Bowl", "🥣", "breakfast", 640, 22, 85, 24,
         Some("Cook the quinoa the night before and eat it cold.")),
        ("chicken-power-plate", "Chicken Power Plate", "🍗", "lunch", 780, 75, 55, 26, None),
        ("beef-rice-bowl", "Beef & Rice Bowl", "🥩", "lunch", 820, 62, 70, 30,
         Some("Double the batch. Tomorrow's lunch is done.")),
        ("protein-shake", "Protein Shake", "🥤", "snack", 320, 42, 18, 8, None),
        ("nut-quark", "Nut Quark", "🥜", "snack", 380, 35, 14, 20, None),
        ("salmon-greens", "Salmon & Greens", "🐟", "dinner", 710, 50, 20, 44, None),
    ];
    for (id, name, emoji, slot, kcal, protein, carbs, fat, tip) in &recipes {
        conn.execute(
            "INSERT OR IGNORE INTO recipes (id, name, emoji, slot, kcal, protein, carbs, fat, tip)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            rusqlite::params![id, name, emoji, slot, kcal, protein, carbs, fat, tip],
        )?;
    }

    let exercises = [
        ("Push-ups", 4, "12", 0),
        ("Squats", 4, "10", 1),
        ("Rows", 4, "10", 2),
        ("Plank", 3, "60s", 3),
    ];
    for (name, sets, reps, order) in &exercises {
        conn.execute(
            "INSERT OR IGNORE INTO workout_exercises (name, sets, reps, sort_order)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![name, sets, reps, order],
        )?;
    }

    Ok(())
}
