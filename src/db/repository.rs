use anyhow::{Result, anyhow};
use chrono::{NaiveDate, NaiveTime};
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::HashMap;
use std::str::FromStr;

use crate::models::{DayTimes, Exercise, Habit, HabitStatus, MealSlot, Recipe};

fn parse_time(s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M").map_err(|e| anyhow!("Bad time '{}': {}", s, e))
}

fn fmt_time(t: NaiveTime) -> String {
    t.format("%H:%M").to_string()
}

pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

// ─── Cached prayer times ─────────────────────────────────────────────────────

/// One fetched day per (date, city). The upstream is queried at most once a
/// day per city; everything else reads from here.
pub struct CacheRepo;

impl CacheRepo {
    pub fn get(conn: &Connection, date: NaiveDate, city: &str) -> Result<Option<DayTimes>> {
        let row = conn
            .query_row(
                "SELECT fajr, sunrise, dhuhr, asr, maghrib, isha, midnight
                 FROM prayer_cache WHERE date = ?1 AND city = ?2",
                params![date_key(date), city],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, String>(5)?,
                        row.get::<_, String>(6)?,
                    ))
                },
            )
            .optional()?;

        match row {
            None => Ok(None),
            Some((fajr, sunrise, dhuhr, asr, maghrib, isha, midnight)) => Ok(Some(DayTimes {
                date,
                fajr: parse_time(&fajr)?,
                sunrise: parse_time(&sunrise)?,
                dhuhr: parse_time(&dhuhr)?,
                asr: parse_time(&asr)?,
                maghrib: parse_time(&maghrib)?,
                isha: parse_time(&isha)?,
                midnight: parse_time(&midnight)?,
            })),
        }
    }

    pub fn store(conn: &Connection, city: &str, times: &DayTimes) -> Result<()> {
        conn.execute(
            "INSERT OR REPLACE INTO prayer_cache
                (date, city, fajr, sunrise, dhuhr, asr, maghrib, isha, midnight)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                date_key(times.date),
                city,
                fmt_time(times.fajr),
                fmt_time(times.sunrise),
                fmt_time(times.dhuhr),
                fmt_time(times.asr),
                fmt_time(times.maghrib),
                fmt_time(times.isha),
                fmt_time(times.midnight),
            ],
        )?;
        Ok(())
    }

    pub fn clear(conn: &Connection) -> Result<()> {
        conn.execute("DELETE FROM prayer_cache", [])?;
        Ok(())
    }
}

// ─── Habits ──────────────────────────────────────────────────────────────────

pub struct HabitRepo;

impl HabitRepo {
    pub fn active(conn: &Connection) -> Result<Vec<Habit>> {
        let mut stmt = conn.prepare(
            "SELECT id, name, emoji, streak
             FROM habits WHERE active = 1 ORDER BY sort_order, id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(Habit {
                id: row.get(0)?,
                name: row.get(1)?,
                emoji: row.get(2)?,
                streak: row.get::<_, i64>(3)?.max(0) as u32,
            })
        })?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(anyhow::Error::from)
    }

    pub fn find_by_name(conn: &Connection, name: &str) -> Result<Option<Habit>> {
        let habits = Self::active(conn)?;
        Ok(habits
            .into_iter()
            .find(|h| h.name.eq_ignore_ascii_case(name)))
    }

    pub fn add(conn: &Connection, name: &str, emoji: &str) -> Result<()> {
        let max_order: i32 = conn
            .query_row(
                "SELECT COALESCE(MAX(sort_order), 0) FROM habits",
                [],
                |row| row.get(0),
            )
            .unwrap_or(0);
        conn.execute(
            "INSERT INTO habits (name, emoji, streak, sort_order, active)
             VALUES (?1, ?2, 0, ?3, 1)",
            params![name, emoji, max_order + 1],
        )?;
        Ok(())
    }

    pub fn deactivate(conn: &Connection, habit_id: i64) -> Result<()> {
        conn.execute(
            "UPDATE habits SET active = 0 WHERE id = ?1",
            params![habit_id],
        )?;
        Ok(())
    }

    /// Completion flags for one date. A habit with no row for the date reads
    /// as not completed; that absence is the whole daily-reset mechanism, and
    /// the streak column on the definition is left alone by it.
    pub fn completion_map(conn: &Connection, date: &str) -> Result<HashMap<i64, bool>> {
        let mut stmt =
            conn.prepare("SELECT habit_id, completed FROM habit_log WHERE date = ?1")?;
        let rows = stmt.query_map(params![date], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)? != 0))
        })?;
        rows.collect::<rusqlite::Result<HashMap<_, _>>>()
            .map_err(anyhow::Error::from)
    }

    /// Flip the completion flag for one habit on one date and move the
    /// stored streak in lockstep: on adds one, off takes one back (never
    /// below zero). Returns the new completion state.
    pub fn toggle(conn: &Connection, habit_id: i64, date: &str) -> Result<bool> {
        let was_done: bool = conn
            .query_row(
                "SELECT completed FROM habit_log WHERE habit_id = ?1 AND date = ?2",
                params![habit_id, date],
                |row| row.get::<_, i64>(0),
            )
            .optional()?
            .map(|v| v != 0)
            .unwrap_or(false);
        let now_done = !was_done;

        conn.execute(
            "INSERT INTO habit_log (habit_id, date, completed)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(habit_id, date) DO UPDATE SET completed = ?3",
            params![habit_id, date, now_done as i64],
        )?;

        if now_done {
            conn.execute(
                "UPDATE habits SET streak = streak + 1 WHERE id = ?1",
                params![habit_id],
            )?;
        } else {
            conn.execute(
                "UPDATE habits SET streak = MAX(streak - 1, 0) WHERE id = ?1",
                params![habit_id],
            )?;
        }
        Ok(now_done)
    }

    /// Active habits joined with the given date's log; missing rows read as
    /// not completed, which is what a fresh day looks like.
    pub fn snapshot(conn: &Connection, date: &str) -> Result<Vec<HabitStatus>> {
        let done = Self::completion_map(conn, date)?;
        Ok(Self::active(conn)?
            .into_iter()
            .map(|h| HabitStatus {
                completed: done.get(&h.id).copied().unwrap_or(false),
                name: h.name,
            })
            .collect())
    }
}

// ─── Meals ───────────────────────────────────────────────────────────────────

pub struct MealRepo;

impl MealRepo {
    pub fn recipes(conn: &Connection) -> Result<Vec<Recipe>> {
        let mut stmt = conn.prepare(
            "SELECT id, name, emoji, slot, kcal, protein, carbs, fat, tip
             FROM recipes ORDER BY slot, id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, i64>(4)?,
                row.get::<_, i64>(5)?,
                row.get::<_, i64>(6)?,
                row.get::<_, i64>(7)?,
                row.get::<_, Option<String>>(8)?,
            ))
        })?;

        let mut result = Vec::new();
        for r in rows {
            let (id, name, emoji, slot, kcal, protein, carbs, fat, tip) = r?;
            result.push(Recipe {
                id,
                name,
                emoji,
                slot: MealSlot::from_str(&slot)
                    .map_err(|e| anyhow!("Bad slot in recipes table: {}", e))?,
                kcal: kcal as u32,
                protein: protein as u32,
                carbs: carbs as u32,
                fat: fat as u32,
                tip,
            });
        }
        Ok(result)
    }

    pub fn by_id(conn: &Connection, id: &str) -> Result<Option<Recipe>> {
        Ok(Self::recipes(conn)?.into_iter().find(|r| r.id == id))
    }

    pub fn completion_map(conn: &Connection, date: &str) -> Result<HashMap<MealSlot, bool>> {
        let mut stmt =
            conn.prepare("SELECT slot, completed FROM meal_log WHERE date = ?1")?;
        let rows = stmt.query_map(params![date], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? != 0))
        })?;

        let mut map = HashMap::new();
        for r in rows {
            let (slot, completed) = r?;
            map.insert(
                MealSlot::from_str(&slot).map_err(|e| anyhow!("Bad slot in meal_log: {}", e))?,
                completed,
            );
        }
        Ok(map)
    }

    pub fn toggle(conn: &Connection, date: &str, slot: MealSlot) -> Result<bool> {
        let was_done: bool = conn
            .query_row(
                "SELECT completed FROM meal_log WHERE date = ?1 AND slot = ?2",
                params![date, slot.as_str()],
                |row| row.get::<_, i64>(0),
            )
            .optional()?
            .map(|v| v != 0)
            .unwrap_or(false);
        let now_done = !was_done;

        conn.execute(
            "INSERT INTO meal_log (date, slot, completed)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(date, slot) DO UPDATE SET completed = ?3",
            params![date, slot.as_str(), now_done as i64],
        )?;
        Ok(now_done)
    }
}

// ─── Workouts ────────────────────────────────────────────────────────────────

pub struct WorkoutRepo;

impl WorkoutRepo {
    pub fn exercises(conn: &Connection) -> Result<Vec<Exercise>> {
        let mut stmt = conn.prepare(
            "SELECT name, sets, reps FROM workout_exercises ORDER BY sort_order, id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(Exercise {
                name: row.get(0)?,
                sets: row.get::<_, i64>(1)? as u32,
                reps: row.get(2)?,
            })
        })?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(anyhow::Error::from)
    }

    pub fn is_done(conn: &Connection, date: &str) -> Result<bool> {
        Ok(conn
            .query_row(
                "SELECT completed FROM workout_log WHERE date = ?1",
                params![date],
                |row| row.get::<_, i64>(0),
            )
            .optional()?
            .map(|v| v != 0)
            .unwrap_or(false))
    }

    pub fn toggle(conn: &Connection, date: &str) -> Result<bool> {
        let now_done = !Self::is_done(conn, date)?;
        conn.execute(
            "INSERT INTO workout_log (date, completed)
             VALUES (?1, ?2)
             ON CONFLICT(date) DO UPDATE SET completed = ?2",
            params![date, now_done as i64],
        )?;
        Ok(now_done)
    }
}

// ─── Stats ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct DailyStats {
    pub date: String,
    pub habits_done: u32,
    pub habits_total: u32,
}

pub struct StatsRepo;

impl StatsRepo {
    /// Habit completion per day over an inclusive date range. Days with no
    /// log rows are absent; callers pad the grid.
    pub fn daily_habit_stats(conn: &Connection, start: &str, end: &str) -> Result<Vec<DailyStats>> {
        let total: i64 =
            conn.query_row("SELECT COUNT(*) FROM habits WHERE active = 1", [], |row| {
                row.get(0)
            })?;

        let mut stmt = conn.prepare(
            "SELECT l.date, SUM(CASE WHEN l.completed = 1 THEN 1 ELSE 0 END)
             FROM habit_log l
             JOIN habits h ON h.id = l.habit_id AND h.active = 1
             WHERE l.date >= ?1 AND l.date <= ?2
             GROUP BY l.date
             ORDER BY l.date",
        )?;
        let rows = stmt.query_map(params![start, end], |row| {
            Ok(DailyStats {
                date: row.get(0)?,
                habits_done: row.get::<_, i64>(1)?.max(0) as u32,
                habits_total: total.max(0) as u32,
            })
        })?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(anyhow::Error::from)
    }
}

// ─── App meta ────────────────────────────────────────────────────────────────

pub struct MetaRepo;

impl MetaRepo {
    pub fn get(conn: &Connection, key: &str) -> Result<Option<String>> {
        conn.query_row(
            "SELECT value FROM app_meta WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .map_err(anyhow::Error::from)
    }

    pub fn set(conn: &Connection, key: &str, value: &str) -> Result<()> {
        conn.execute(
            "INSERT INTO app_meta (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::models::default_midnight;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn sample_day() -> DayTimes {
        let t = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
        DayTimes {
            date: NaiveDate::from_ymd_opt(2026, 8, 6).unwrap(),
            fajr: t(5, 0),
            sunrise: t(7, 0),
            dhuhr: t(13, 0),
            asr: t(16, 0),
            maghrib: t(19, 0),
            isha: t(20, 30),
            midnight: default_midnight(),
        }
    }

    #[test]
    fn migrations_seed_defaults_idempotently() {
        let conn = setup();
        run_migrations(&conn).unwrap();

        assert_eq!(HabitRepo::active(&conn).unwrap().len(), 6);
        assert_eq!(MealRepo::recipes(&conn).unwrap().len(), 7);
        assert_eq!(WorkoutRepo::exercises(&conn).unwrap().len(), 4);
    }

    #[test]
    fn cache_round_trips_and_is_keyed_per_city() {
        let conn = setup();
        let times = sample_day();

        CacheRepo::store(&conn, "Bad Kissingen", &times).unwrap();
        let back = CacheRepo::get(&conn, times.date, "Bad Kissingen")
            .unwrap()
            .unwrap();
        assert_eq!(back, times);

        assert!(CacheRepo::get(&conn, times.date, "Berlin").unwrap().is_none());
        let next_day = times.date.succ_opt().unwrap();
        assert!(CacheRepo::get(&conn, next_day, "Bad Kissingen").unwrap().is_none());
    }

    #[test]
    fn habit_toggle_moves_streak_in_lockstep() {
        let conn = setup();
        let habit = HabitRepo::find_by_name(&conn, "dhikr").unwrap().unwrap();

        assert!(HabitRepo::toggle(&conn, habit.id, "2026-08-06").unwrap());
        let h = HabitRepo::find_by_name(&conn, "Dhikr").unwrap().unwrap();
        assert_eq!(h.streak, 1);

        assert!(!HabitRepo::toggle(&conn, habit.id, "2026-08-06").unwrap());
        let h = HabitRepo::find_by_name(&conn, "Dhikr").unwrap().unwrap();
        assert_eq!(h.streak, 0);

        // Off again on a fresh date: the counter never dips below zero.
        HabitRepo::toggle(&conn, habit.id, "2026-08-07").unwrap();
        HabitRepo::toggle(&conn, habit.id, "2026-08-07").unwrap();
        let h = HabitRepo::find_by_name(&conn, "Dhikr").unwrap().unwrap();
        assert_eq!(h.streak, 0);
    }

    #[test]
    fn a_new_date_resets_completion_but_not_streaks() {
        let conn = setup();
        let habit = HabitRepo::find_by_name(&conn, "Workout").unwrap().unwrap();

        HabitRepo::toggle(&conn, habit.id, "2026-08-06").unwrap();

        let yesterday = HabitRepo::snapshot(&conn, "2026-08-06").unwrap();
        assert!(yesterday.iter().any(|s| s.name == "Workout" && s.completed));

        let today = HabitRepo::snapshot(&conn, "2026-08-07").unwrap();
        assert!(today.iter().all(|s| !s.completed));

        let h = HabitRepo::find_by_name(&conn, "Workout").unwrap().unwrap();
        assert_eq!(h.streak, 1);
    }

    #[test]
    fn added_habits_sort_after_the_seeds() {
        let conn = setup();
        HabitRepo::add(&conn, "Cold shower", "🚿").unwrap();
        let habits = HabitRepo::active(&conn).unwrap();
        assert_eq!(habits.last().unwrap().name, "Cold shower");
    }

    #[test]
    fn meal_toggle_is_per_slot_and_per_date() {
        let conn = setup();
        assert!(MealRepo::toggle(&conn, "2026-08-06", MealSlot::Lunch).unwrap());

        let map = MealRepo::completion_map(&conn, "2026-08-06").unwrap();
        assert_eq!(map.get(&MealSlot::Lunch), Some(&true));
        assert!(map.get(&MealSlot::Dinner).is_none());

        let tomorrow = MealRepo::completion_map(&conn, "2026-08-07").unwrap();
        assert!(tomorrow.is_empty());
    }

    #[test]
    fn workout_toggle_flips_per_date() {
        let conn = setup();
        assert!(!WorkoutRepo::is_done(&conn, "2026-08-06").unwrap());
        assert!(WorkoutRepo::toggle(&conn, "2026-08-06").unwrap());
        assert!(WorkoutRepo::is_done(&conn, "2026-08-06").unwrap());
        assert!(!WorkoutRepo::toggle(&conn, "2026-08-06").unwrap());
    }

    #[test]
    fn daily_stats_count_completed_habits_per_day() {
        let conn = setup();
        let habits = HabitRepo::active(&conn).unwrap();
        HabitRepo::toggle(&conn, habits[0].id, "2026-08-05").unwrap();
        HabitRepo::toggle(&conn, habits[1].id, "2026-08-05").unwrap();
        HabitRepo::toggle(&conn, habits[0].id, "2026-08-06").unwrap();

        let stats =
            StatsRepo::daily_habit_stats(&conn, "2026-08-01", "2026-08-07").unwrap();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].date, "2026-08-05");
        assert_eq!(stats[0].habits_done, 2);
        assert_eq!(stats[0].habits_total, 6);
        assert_eq!(stats[1].habits_done, 1);
    }

    #[test]
    fn meta_kv_upserts() {
        let conn = setup();
        assert!(MetaRepo::get(&conn, "setup_done").unwrap().is_none());
        MetaRepo::set(&conn, "setup_done", "1").unwrap();
        MetaRepo::set(&conn, "setup_done", "2").unwrap();
        assert_eq!(MetaRepo::get(&conn, "setup_done").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn file_backed_db_runs_the_startup_pragmas() {
        let dir = tempfile::tempdir().unwrap();
        let conn = Connection::open(dir.path().join("mizan.db")).unwrap();
        conn.execute_batch("PRAGMA journal_mode=WAL;").unwrap();
        run_migrations(&conn).unwrap();
        assert_eq!(HabitRepo::active(&conn).unwrap().len(), 6);
    }
}
