//! SQLite persistence layer.
//!
//! RULE: Only store.rs talks to the database.
//! The engine calls store methods — it never executes SQL directly.

use crate::{
    error::{SimError, SimResult},
    event::EventLogEntry,
    snapshot::{self, SNAPSHOT_KEY},
    state::GameState,
    types::Tick,
};
use rusqlite::{params, Connection, OptionalExtension};

pub struct SimStore {
    conn: Connection,
}

impl SimStore {
    /// Open (or create) the database at `path`.
    pub fn open(path: &str) -> SimResult<Self> {
        let conn = Connection::open(path)?;
        // WAL mode only for real files; :memory: ignores it.
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> SimResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> SimResult<()> {
        self.conn
            .execute_batch(include_str!("../../migrations/001_foundation.sql"))?;
        Ok(())
    }

    // ── Run ────────────────────────────────────────────────────

    pub fn insert_run(&self, run_id: &str, version: &str) -> SimResult<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO run (run_id, version, started_at) VALUES (?1, ?2, ?3)",
            params![run_id, version, now_rfc3339()],
        )?;
        Ok(())
    }

    // ── Event log ──────────────────────────────────────────────

    pub fn append_event(&self, entry: &EventLogEntry) -> SimResult<()> {
        insert_event(&self.conn, entry)
    }

    pub fn events_for_tick(&self, run_id: &str, tick: Tick) -> SimResult<Vec<EventLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, run_id, tick, kind, payload
             FROM event_log WHERE run_id = ?1 AND tick = ?2
             ORDER BY id ASC",
        )?;
        let entries = stmt
            .query_map(params![run_id, tick as i64], |row| {
                Ok(EventLogEntry {
                    id:      Some(row.get(0)?),
                    run_id:  row.get(1)?,
                    tick:    row.get::<_, i64>(2)? as u64,
                    kind:    row.get(3)?,
                    payload: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    pub fn event_count(&self, run_id: &str, kind: &str) -> SimResult<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM event_log WHERE run_id = ?1 AND kind = ?2",
            params![run_id, kind],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    // ── Key-value ──────────────────────────────────────────────

    pub fn put(&self, key: &str, value: &str) -> SimResult<()> {
        upsert(&self.conn, key, value)
    }

    pub fn get(&self, key: &str) -> SimResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    pub fn saved_at(&self, key: &str) -> SimResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT saved_at FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    pub fn delete(&self, key: &str) -> SimResult<()> {
        self.conn
            .execute("DELETE FROM kv_store WHERE key = ?1", params![key])?;
        Ok(())
    }

    // ── Game state snapshot ────────────────────────────────────

    /// Replace the stored snapshot with `state`.
    pub fn save_game_state(&self, state: &GameState) -> SimResult<()> {
        let json = snapshot::encode(state)?;
        self.put(SNAPSHOT_KEY, &json)?;
        log::debug!(
            "Snapshot saved: {} buildings, money={}",
            state.buildings.len(),
            state.resources.money
        );
        Ok(())
    }

    /// Save `state` and append `events` atomically: either both land or
    /// neither does.
    pub fn commit_game_state(&self, state: &GameState, events: &[EventLogEntry]) -> SimResult<()> {
        let json = snapshot::encode(state)?;
        let tx = self.conn.unchecked_transaction()?;
        upsert(&tx, SNAPSHOT_KEY, &json)?;
        for entry in events {
            insert_event(&tx, entry)?;
        }
        tx.commit()?;
        log::debug!(
            "Snapshot committed with {} events: {} buildings, money={}",
            events.len(),
            state.buildings.len(),
            state.resources.money
        );
        Ok(())
    }

    /// Load the stored snapshot merged over the defaults.
    /// A missing or corrupt snapshot yields the default state.
    pub fn load_game_state(&self) -> SimResult<GameState> {
        let Some(json) = self.get(SNAPSHOT_KEY)? else {
            log::info!("No saved game found; starting from defaults");
            return Ok(GameState::default());
        };
        match snapshot::decode(&json) {
            Ok(state) => {
                log::info!("Restored saved game with {} buildings", state.buildings.len());
                Ok(state)
            }
            Err(SimError::CorruptSnapshot { reason }) => {
                log::warn!("Discarding corrupt snapshot ({reason}); starting from defaults");
                Ok(GameState::default())
            }
            Err(e) => Err(e),
        }
    }

    pub fn clear_game_state(&self) -> SimResult<()> {
        self.delete(SNAPSHOT_KEY)
    }
}

fn upsert(conn: &Connection, key: &str, value: &str) -> SimResult<()> {
    conn.execute(
        "INSERT INTO kv_store (key, value, saved_at) VALUES (?1, ?2, ?3)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, saved_at = excluded.saved_at",
        params![key, value, now_rfc3339()],
    )?;
    Ok(())
}

fn insert_event(conn: &Connection, entry: &EventLogEntry) -> SimResult<()> {
    conn.execute(
        "INSERT INTO event_log (run_id, tick, kind, payload, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            entry.run_id,
            entry.tick as i64,
            entry.kind,
            entry.payload,
            now_rfc3339(),
        ],
    )?;
    Ok(())
}

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}
