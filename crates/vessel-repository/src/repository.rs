use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use rusqlite::{named_params, Connection};

use crate::error::RepositoryError;
use crate::row::{UpsertVessel, VesselRow, VesselStats};

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS vessels (
    mmsi                  TEXT PRIMARY KEY,
    imo                   INTEGER NOT NULL,
    name                  TEXT NOT NULL,
    callsign              TEXT NOT NULL,
    "type"                INTEGER NOT NULL,
    bow                   INTEGER NOT NULL,
    stern                 INTEGER NOT NULL,
    port                  INTEGER NOT NULL,
    starboard             INTEGER NOT NULL,
    first_sight           INTEGER NOT NULL,
    last_sight            INTEGER NOT NULL,
    has_static_data       INTEGER NOT NULL,
    static_data_received  INTEGER
);
CREATE INDEX IF NOT EXISTS idx_vessels_last_sight ON vessels (last_sight DESC);
CREATE INDEX IF NOT EXISTS idx_vessels_has_static_data ON vessels (has_static_data);
"#;

const UPSERT_SQL: &str = r#"
INSERT INTO vessels
    (mmsi, imo, name, callsign, "type", bow, stern, port, starboard,
     first_sight, last_sight, has_static_data, static_data_received)
VALUES
    (:mmsi, :imo, :name, :callsign, :ship_type, :bow, :stern, :port, :starboard,
     :now, :now, :has_static, :static_received)
ON CONFLICT(mmsi) DO UPDATE SET
    last_sight = :now,
    imo = CASE WHEN :allow_update THEN :imo ELSE vessels.imo END,
    name = CASE WHEN :allow_update THEN :name ELSE vessels.name END,
    callsign = CASE WHEN :allow_update THEN :callsign ELSE vessels.callsign END,
    "type" = CASE WHEN :allow_update THEN :ship_type ELSE vessels."type" END,
    bow = CASE WHEN :allow_update THEN :bow ELSE vessels.bow END,
    stern = CASE WHEN :allow_update THEN :stern ELSE vessels.stern END,
    port = CASE WHEN :allow_update THEN :port ELSE vessels.port END,
    starboard = CASE WHEN :allow_update THEN :starboard ELSE vessels.starboard END,
    has_static_data = CASE WHEN :allow_update THEN 1 ELSE vessels.has_static_data END,
    static_data_received = CASE WHEN :allow_update
        THEN COALESCE(vessels.static_data_received, :now)
        ELSE vessels.static_data_received
    END
RETURNING mmsi, imo, name, callsign, "type", bow, stern, port, starboard,
          first_sight, last_sight, has_static_data, static_data_received;
"#;

/// Durable key-value store of vessels indexed by MMSI (spec §4.3).
///
/// The `rusqlite::Connection` is synchronous; every call bridges through
/// [`tokio::task::spawn_blocking`] so the async runtime's worker threads are
/// never blocked on disk I/O, matching spec §5's "threads escape hatch".
pub struct Repository {
    conn: Arc<Mutex<Connection>>,
}

impl Repository {
    /// Open `path`, creating the schema if absent. Failure here is fatal
    /// per spec §7 ("cannot open database file: startup aborts").
    pub async fn start(path: impl Into<PathBuf>) -> Result<Self, RepositoryError> {
        let path = path.into();
        let display_path = path.display().to_string();
        let conn = tokio::task::spawn_blocking(move || -> Result<Connection, RepositoryError> {
            let conn = Connection::open(&path).map_err(|source| RepositoryError::Open {
                path: display_path.clone(),
                source,
            })?;
            conn.execute_batch(SCHEMA_SQL).map_err(RepositoryError::Schema)?;
            Ok(conn)
        })
        .await
        .map_err(RepositoryError::WorkerPanicked)??;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Idempotent; the connection closes when the last `Arc` drops.
    pub async fn stop(&self) {}

    /// Insert-or-update one vessel and return the post-write row.
    ///
    /// A database error is logged and `None` is returned (spec §7: "log the
    /// exception, roll back the current write, and return a null row"); the
    /// caller treats `None` as "skip this update".
    pub async fn upsert_vessel(&self, values: UpsertVessel, allow_static_update: bool, now: i64) -> Option<VesselRow> {
        let conn = self.conn.clone();
        let outcome = tokio::task::spawn_blocking(move || {
            let guard = conn.lock().expect("repository connection mutex poisoned");
            Self::upsert_blocking(&guard, &values, allow_static_update, now)
        })
        .await;

        match outcome {
            Ok(Ok(row)) => Some(row),
            Ok(Err(source)) => {
                tracing::error!(error = %source, "vessel upsert failed, skipping");
                None
            }
            Err(join_error) => {
                tracing::error!(error = %join_error, "repository worker panicked during upsert");
                None
            }
        }
    }

    fn upsert_blocking(
        conn: &Connection,
        values: &UpsertVessel,
        allow_static_update: bool,
        now: i64,
    ) -> rusqlite::Result<VesselRow> {
        let static_received: Option<i64> = allow_static_update.then_some(now);
        conn.query_row(
            UPSERT_SQL,
            named_params! {
                ":mmsi": values.mmsi.as_str(),
                ":imo": values.imo,
                ":name": values.name,
                ":callsign": values.callsign,
                ":ship_type": values.ship_type,
                ":bow": values.bow,
                ":stern": values.stern,
                ":port": values.port,
                ":starboard": values.starboard,
                ":now": now,
                ":has_static": allow_static_update,
                ":static_received": static_received,
                ":allow_update": allow_static_update,
            },
            VesselRow::from_row,
        )
    }

    /// Fetch one row, or `None` if absent or on error (logged).
    pub async fn get_vessel(&self, mmsi: &str) -> Option<VesselRow> {
        let conn = self.conn.clone();
        let mmsi = mmsi.to_string();
        let outcome = tokio::task::spawn_blocking(move || -> rusqlite::Result<Option<VesselRow>> {
            let guard = conn.lock().expect("repository connection mutex poisoned");
            guard
                .query_row("SELECT * FROM vessels WHERE mmsi = ?1", [&mmsi], VesselRow::from_row)
                .map(Some)
                .or_else(|e| if matches!(e, rusqlite::Error::QueryReturnedNoRows) { Ok(None) } else { Err(e) })
        })
        .await;

        match outcome {
            Ok(Ok(row)) => row,
            Ok(Err(source)) => {
                tracing::error!(error = %source, %mmsi, "vessel lookup failed");
                None
            }
            Err(join_error) => {
                tracing::error!(error = %join_error, "repository worker panicked during lookup");
                None
            }
        }
    }

    /// Aggregate counts for the admin surface.
    pub async fn get_vessel_stats(&self) -> Option<VesselStats> {
        let conn = self.conn.clone();
        let outcome = tokio::task::spawn_blocking(move || -> rusqlite::Result<VesselStats> {
            let guard = conn.lock().expect("repository connection mutex poisoned");
            let total: i64 = guard.query_row("SELECT COUNT(*) FROM vessels", [], |row| row.get(0))?;
            let identified: i64 =
                guard.query_row("SELECT COUNT(*) FROM vessels WHERE has_static_data = 1", [], |row| row.get(0))?;
            let unknown = total - identified;
            let percent_identified = if total > 0 { (identified as f64 / total as f64) * 100.0 } else { 0.0 };
            Ok(VesselStats {
                total,
                identified,
                unknown,
                percent_identified,
            })
        })
        .await;

        match outcome {
            Ok(Ok(stats)) => Some(stats),
            Ok(Err(source)) => {
                tracing::error!(error = %source, "vessel stats query failed");
                None
            }
            Err(join_error) => {
                tracing::error!(error = %join_error, "repository worker panicked during stats query");
                None
            }
        }
    }
}
