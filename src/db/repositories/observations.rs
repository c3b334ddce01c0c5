use anyhow::{Context, Result};
use rusqlite::{params, Row};

use crate::db::{
    connection::Database,
    helpers::{format_datetime, parse_datetime, parse_kind, parse_source, to_u64},
    models::{KindCount, Observation, ObservationKind, TimeRange},
};
use crate::log_warn;

const ENABLE_LOGS: bool = true;

const SELECT_COLUMNS: &str =
    "SELECT id, kind, timestamp, value, label, note, source, created_at FROM observations";

fn row_to_observation(row: &Row) -> Result<Observation> {
    let kind: String = row.get("kind")?;
    let timestamp: String = row.get("timestamp")?;
    let source: String = row.get("source")?;
    let created_at: String = row.get("created_at")?;

    Ok(Observation {
        id: row.get("id")?,
        kind: parse_kind(&kind)?,
        timestamp: parse_datetime(&timestamp, "timestamp")?,
        value: row.get("value")?,
        label: row.get("label")?,
        note: row.get("note")?,
        source: parse_source(&source)?,
        created_at: parse_datetime(&created_at, "created_at")?,
    })
}

/// Collect rows, skipping any that no longer parse.
fn collect_lenient(rows: &mut rusqlite::Rows<'_>) -> Result<Vec<Observation>> {
    let mut observations = Vec::new();
    while let Some(row) = rows.next()? {
        match row_to_observation(row) {
            Ok(observation) => observations.push(observation),
            Err(err) => {
                let id: Option<String> = row.get("id").ok();
                log_warn!(
                    "Skipping unreadable observation {}: {err:#}",
                    id.as_deref().unwrap_or("<unknown>")
                );
            }
        }
    }
    Ok(observations)
}

fn insert_record(conn: &rusqlite::Connection, record: &Observation) -> Result<()> {
    conn.execute(
        "INSERT INTO observations (id, kind, timestamp, value, label, note, source, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            record.id,
            record.kind.as_str(),
            format_datetime(&record.timestamp),
            record.value,
            record.label,
            record.note,
            record.source.as_str(),
            format_datetime(&record.created_at),
        ],
    )
    .with_context(|| format!("failed to insert observation {}", record.id))?;
    Ok(())
}

impl Database {
    pub async fn insert_observation(&self, observation: &Observation) -> Result<()> {
        let record = observation.clone();
        self.execute(move |conn| insert_record(conn, &record)).await
    }

    /// Insert a batch in one transaction; either all rows land or none do.
    pub async fn insert_observations(&self, observations: Vec<Observation>) -> Result<usize> {
        self.execute(move |conn| {
            let tx = conn
                .transaction()
                .context("failed to open insert transaction")?;
            for record in &observations {
                insert_record(&tx, record)?;
            }
            tx.commit().context("failed to commit observations")?;
            Ok(observations.len())
        })
        .await
    }

    pub async fn get_observation(&self, observation_id: &str) -> Result<Option<Observation>> {
        let observation_id = observation_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} WHERE id = ?1"))?;
            let mut rows = stmt.query(params![observation_id])?;
            match rows.next()? {
                Some(row) => Ok(Some(row_to_observation(row)?)),
                None => Ok(None),
            }
        })
        .await
    }

    /// Observations of the given kinds, oldest first. An empty `kinds` slice
    /// means every kind; `range` is inclusive on both ends.
    pub async fn get_observations(
        &self,
        kinds: &[ObservationKind],
        range: Option<TimeRange>,
    ) -> Result<Vec<Observation>> {
        let kinds = kinds.to_vec();
        self.execute(move |conn| {
            let mut clauses = Vec::new();
            let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

            if !kinds.is_empty() {
                let placeholders = vec!["?"; kinds.len()].join(", ");
                clauses.push(format!("kind IN ({placeholders})"));
                for kind in &kinds {
                    params_vec.push(Box::new(kind.as_str()));
                }
            }
            if let Some(range) = range {
                clauses.push("timestamp >= ?".to_string());
                params_vec.push(Box::new(format_datetime(&range.start)));
                clauses.push("timestamp <= ?".to_string());
                params_vec.push(Box::new(format_datetime(&range.end)));
            }

            let where_clause = if clauses.is_empty() {
                String::new()
            } else {
                format!(" WHERE {}", clauses.join(" AND "))
            };
            let query = format!("{SELECT_COLUMNS}{where_clause} ORDER BY timestamp ASC, id ASC");

            let params_refs: Vec<&dyn rusqlite::ToSql> =
                params_vec.iter().map(|b| b.as_ref()).collect();

            let mut stmt = conn.prepare(&query)?;
            let mut rows = stmt.query(params_refs.as_slice())?;
            collect_lenient(&mut rows)
        })
        .await
    }

    /// Returns false if no observation had this id.
    pub async fn delete_observation(&self, observation_id: &str) -> Result<bool> {
        let observation_id = observation_id.to_string();
        self.execute(move |conn| {
            let rows_affected = conn.execute(
                "DELETE FROM observations WHERE id = ?1",
                params![observation_id],
            )?;
            Ok(rows_affected > 0)
        })
        .await
    }

    pub async fn count_observations_by_kind(&self) -> Result<Vec<KindCount>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT kind, COUNT(*) FROM observations GROUP BY kind ORDER BY kind ASC",
            )?;
            let rows = stmt
                .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
                .collect::<Result<Vec<_>, _>>()?;

            let mut counts = Vec::new();
            for (kind, count) in rows {
                match parse_kind(&kind) {
                    Ok(kind) => counts.push(KindCount {
                        kind,
                        count: to_u64(count, "count")?,
                    }),
                    Err(err) => log_warn!("Ignoring {count} rows of unknown kind: {err}"),
                }
            }
            Ok(counts)
        })
        .await
    }

    #[cfg(test)]
    pub(crate) async fn execute_raw(&self, sql: &'static str) -> Result<()> {
        self.execute(move |conn| {
            conn.execute_batch(sql)?;
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::ObservationSource;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn observation(id: &str, kind: ObservationKind, at: DateTime<Utc>, value: f64) -> Observation {
        Observation {
            id: id.to_string(),
            kind,
            timestamp: at,
            value,
            label: None,
            note: None,
            source: ObservationSource::Manual,
            created_at: at,
        }
    }

    fn open(temp_dir: &TempDir) -> Database {
        Database::new(temp_dir.path().join("test.sqlite3")).unwrap()
    }

    #[tokio::test]
    async fn insert_and_fetch_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let db = open(&temp_dir);
        let at = Utc.with_ymd_and_hms(2024, 5, 6, 12, 0, 0).unwrap();

        let mut meal = observation("m1", ObservationKind::Meal, at, 650.0);
        meal.label = Some("oatmeal".into());
        meal.note = Some("with berries".into());
        db.insert_observation(&meal).await.unwrap();

        let fetched = db.get_observation("m1").await.unwrap();
        assert_eq!(fetched, Some(meal));
        assert_eq!(db.get_observation("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn filters_by_kind_and_range() {
        let temp_dir = TempDir::new().unwrap();
        let db = open(&temp_dir);
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();

        db.insert_observations(vec![
            observation("e3", ObservationKind::Energy, start + Duration::days(2), 7.0),
            observation("e1", ObservationKind::Energy, start, 5.0),
            observation("e2", ObservationKind::Energy, start + Duration::days(1), 6.0),
            observation("s1", ObservationKind::Sleep, start, 8.0),
        ])
        .await
        .unwrap();

        let energy = db
            .get_observations(&[ObservationKind::Energy], None)
            .await
            .unwrap();
        let ids: Vec<&str> = energy.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["e1", "e2", "e3"]);

        let range = TimeRange {
            start: start + Duration::hours(1),
            end: start + Duration::days(1),
        };
        let ranged = db
            .get_observations(&[ObservationKind::Energy, ObservationKind::Sleep], Some(range))
            .await
            .unwrap();
        let ids: Vec<&str> = ranged.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["e2"]);

        let everything = db.get_observations(&[], None).await.unwrap();
        assert_eq!(everything.len(), 4);
    }

    #[tokio::test]
    async fn failed_batch_inserts_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let db = open(&temp_dir);
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();

        db.insert_observation(&observation("dup", ObservationKind::Mood, at, 3.0))
            .await
            .unwrap();
        let result = db
            .insert_observations(vec![
                observation("fresh", ObservationKind::Mood, at, 4.0),
                observation("dup", ObservationKind::Mood, at, 5.0),
            ])
            .await;

        assert!(result.is_err());
        assert_eq!(db.get_observation("fresh").await.unwrap(), None);
    }

    #[tokio::test]
    async fn unreadable_rows_are_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let db = open(&temp_dir);
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();

        db.insert_observation(&observation("ok", ObservationKind::Energy, at, 6.0))
            .await
            .unwrap();
        db.execute_raw(
            "INSERT INTO observations (id, kind, timestamp, value, created_at)
             VALUES ('bad', 'energy', 'not a date', 1.0, '2024-05-01T09:00:00.000Z')",
        )
        .await
        .unwrap();

        let energy = db
            .get_observations(&[ObservationKind::Energy], None)
            .await
            .unwrap();
        assert_eq!(energy.len(), 1);
        assert_eq!(energy[0].id, "ok");
    }

    #[tokio::test]
    async fn delete_and_count() {
        let temp_dir = TempDir::new().unwrap();
        let db = open(&temp_dir);
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();

        db.insert_observations(vec![
            observation("a", ObservationKind::Energy, at, 6.0),
            observation("b", ObservationKind::Energy, at, 7.0),
            observation("c", ObservationKind::Stress, at, 2.0),
        ])
        .await
        .unwrap();

        assert!(db.delete_observation("a").await.unwrap());
        assert!(!db.delete_observation("a").await.unwrap());

        let counts = db.count_observations_by_kind().await.unwrap();
        assert_eq!(
            counts,
            vec![
                KindCount { kind: ObservationKind::Energy, count: 1 },
                KindCount { kind: ObservationKind::Stress, count: 1 },
            ]
        );
    }

    #[tokio::test]
    async fn schema_is_current_after_open() {
        let temp_dir = TempDir::new().unwrap();
        let db = open(&temp_dir);
        assert_eq!(
            db.schema_version().await.unwrap(),
            crate::db::migrations::CURRENT_SCHEMA_VERSION
        );
    }
}
