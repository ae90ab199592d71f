//! SQLite implementation of the contest store
//!
//! Tables read (see `/sql/` directory): `contests` (+ the
//! `contest_listed_users` / `contest_categories` / `contest_regions`
//! constraint tables), `participants`, `users`, `votes`, `shipments`.
//!
//! The engine only reads through the [`ContestStore`] trait. The append
//! helpers on the concrete type (`record_vote`, `record_shipment`, the
//! upserts) model the external transactional/administrative collaborators
//! that own these rows; the runtime and the tests use them to seed data.

use super::store::{BoxError, ContestStore};
use super::types::{
    CategoryId, Contest, CreditWeights, EligibilityMode, Participant, ParticipantId, UserId,
};
use async_trait::async_trait;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Run schema migrations from SQL files
///
/// Reads all .sql files from the specified directory, sorted by filename
/// (00_, 01_, ...), and executes them. Every file must use
/// "IF NOT EXISTS" clauses so reruns stay idempotent.
pub fn run_schema_migrations(conn: &mut Connection, schema_dir: &str) -> Result<(), BoxError> {
    let schema_path = Path::new(schema_dir);

    if !schema_path.exists() {
        return Err(format!("Schema directory not found: {}", schema_dir).into());
    }

    // WAL mode: concurrent readers while a collaborator writes
    conn.pragma_update(None, "journal_mode", "WAL")?;

    let mut sql_files: Vec<_> = fs::read_dir(schema_path)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().extension().and_then(|s| s.to_str()) == Some("sql"))
        .collect();

    sql_files.sort_by_key(|entry| entry.file_name());

    log::info!("🔧 Running schema migrations from: {}", schema_dir);

    for entry in sql_files {
        let path = entry.path();
        let filename = path.file_name().unwrap().to_string_lossy().to_string();

        let sql_content = fs::read_to_string(&path)?;
        conn.execute_batch(&sql_content)?;

        log::info!("   └─ ✅ Applied: {}", filename);
    }

    Ok(())
}

/// SQLite-backed [`ContestStore`]
pub struct SqliteContestStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteContestStore {
    /// Open a store over an existing database file
    ///
    /// Does not create the schema; run [`run_schema_migrations`] first.
    pub fn new(db_path: &str) -> Result<Self, BoxError> {
        let conn = Connection::open(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn constraint_set(
        conn: &Connection,
        sql: &str,
        contest_id: u64,
    ) -> rusqlite::Result<HashSet<u64>> {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map([contest_id], |row| row.get::<_, u64>(0))?;
        rows.collect()
    }

    fn count_in_window(
        conn: &Connection,
        table: &str,
        participant: ParticipantId,
        from: i64,
        to: i64,
        allowed_categories: Option<&HashSet<CategoryId>>,
        select: &str,
    ) -> rusqlite::Result<f64> {
        match allowed_categories {
            None => conn.query_row(
                &format!(
                    "SELECT {} FROM {} WHERE participant_id = ?1 AND timestamp BETWEEN ?2 AND ?3",
                    select, table
                ),
                params![participant, from, to],
                |row| row.get(0),
            ),
            Some(set) if set.is_empty() => Ok(0.0),
            Some(set) => {
                let placeholders = vec!["?"; set.len()].join(", ");
                let sql = format!(
                    "SELECT {} FROM {} WHERE participant_id = ? AND timestamp BETWEEN ? AND ? \
                     AND category_id IN ({})",
                    select, table, placeholders
                );
                let mut values: Vec<i64> = vec![participant as i64, from, to];
                values.extend(set.iter().map(|c| *c as i64));

                let mut stmt = conn.prepare(&sql)?;
                stmt.query_row(params_from_iter(values.iter()), |row| row.get(0))
            }
        }
    }

    // --- append/upsert helpers modeling the external collaborators ---

    pub fn upsert_user(&self, id: UserId, email: &str) -> rusqlite::Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO users (id, email) VALUES (?1, ?2)",
            params![id, email],
        )?;
        Ok(())
    }

    pub fn upsert_contest(&self, contest: &Contest) -> rusqlite::Result<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        let mode = match contest.eligibility {
            EligibilityMode::Whitelist => "whitelist",
            EligibilityMode::Blacklist => "blacklist",
        };

        tx.execute(
            "INSERT OR REPLACE INTO contests \
             (id, first_day, last_day, credits_per_vote, credits_per_shipment, credits_per_unit, \
              eligibility_mode, leaderboard_enabled, show_credits) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                contest.id,
                contest.first_day,
                contest.last_day,
                contest.weights.per_vote,
                contest.weights.per_shipment,
                contest.weights.per_unit,
                mode,
                contest.leaderboard_enabled,
                contest.show_credits,
            ],
        )?;

        tx.execute(
            "DELETE FROM contest_listed_users WHERE contest_id = ?1",
            [contest.id],
        )?;
        for user_id in &contest.listed_user_ids {
            tx.execute(
                "INSERT INTO contest_listed_users (contest_id, user_id) VALUES (?1, ?2)",
                params![contest.id, user_id],
            )?;
        }

        tx.execute(
            "DELETE FROM contest_categories WHERE contest_id = ?1",
            [contest.id],
        )?;
        if let Some(categories) = &contest.allowed_category_ids {
            for category_id in categories {
                tx.execute(
                    "INSERT INTO contest_categories (contest_id, category_id) VALUES (?1, ?2)",
                    params![contest.id, category_id],
                )?;
            }
        }

        tx.execute(
            "DELETE FROM contest_regions WHERE contest_id = ?1",
            [contest.id],
        )?;
        if let Some(regions) = &contest.allowed_region_ids {
            for region_id in regions {
                tx.execute(
                    "INSERT INTO contest_regions (contest_id, region_id) VALUES (?1, ?2)",
                    params![contest.id, region_id],
                )?;
            }
        }

        tx.commit()
    }

    pub fn upsert_participant(&self, participant: &Participant) -> rusqlite::Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO participants \
             (id, owner_user_id, organization, first_name, last_name, city, region_code, \
              postal_code, category_id, region_id) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                participant.id,
                participant.owner_user_id,
                participant.organization,
                participant.first_name,
                participant.last_name,
                participant.city,
                participant.region_code,
                participant.postal_code,
                participant.category_id,
                participant.region_id,
            ],
        )?;
        Ok(())
    }

    pub fn record_vote(
        &self,
        participant: ParticipantId,
        timestamp: i64,
        verified: bool,
    ) -> rusqlite::Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO votes (participant_id, timestamp, verified) VALUES (?1, ?2, ?3)",
            params![participant, timestamp, verified],
        )?;
        Ok(())
    }

    pub fn record_shipment(
        &self,
        participant: ParticipantId,
        timestamp: i64,
        category_id: Option<CategoryId>,
        units: Option<f64>,
    ) -> rusqlite::Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO shipments (participant_id, timestamp, category_id, units) \
             VALUES (?1, ?2, ?3, ?4)",
            params![participant, timestamp, category_id, units],
        )?;
        Ok(())
    }
}

#[async_trait]
impl ContestStore for SqliteContestStore {
    async fn contest(&self, id: u64) -> Result<Option<Contest>, BoxError> {
        let conn = self.conn.lock().unwrap();

        let row = conn
            .query_row(
                "SELECT first_day, last_day, credits_per_vote, credits_per_shipment, \
                 credits_per_unit, eligibility_mode, leaderboard_enabled, show_credits \
                 FROM contests WHERE id = ?1",
                [id],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, f64>(2)?,
                        row.get::<_, f64>(3)?,
                        row.get::<_, f64>(4)?,
                        row.get::<_, String>(5)?,
                        row.get::<_, bool>(6)?,
                        row.get::<_, bool>(7)?,
                    ))
                },
            )
            .optional()?;

        let Some((
            first_day,
            last_day,
            per_vote,
            per_shipment,
            per_unit,
            mode,
            leaderboard_enabled,
            show_credits,
        )) = row
        else {
            return Ok(None);
        };

        let eligibility = match mode.as_str() {
            "whitelist" => EligibilityMode::Whitelist,
            "blacklist" => EligibilityMode::Blacklist,
            other => {
                log::warn!(
                    "Unknown eligibility_mode '{}' for contest {}, defaulting to blacklist",
                    other,
                    id
                );
                EligibilityMode::Blacklist
            }
        };

        let listed_user_ids = Self::constraint_set(
            &conn,
            "SELECT user_id FROM contest_listed_users WHERE contest_id = ?1",
            id,
        )?;
        let categories = Self::constraint_set(
            &conn,
            "SELECT category_id FROM contest_categories WHERE contest_id = ?1",
            id,
        )?;
        let regions = Self::constraint_set(
            &conn,
            "SELECT region_id FROM contest_regions WHERE contest_id = ?1",
            id,
        )?;

        Ok(Some(Contest {
            id,
            first_day,
            last_day,
            weights: CreditWeights {
                per_vote,
                per_shipment,
                per_unit,
            },
            eligibility,
            listed_user_ids,
            allowed_category_ids: if categories.is_empty() {
                None
            } else {
                Some(categories)
            },
            allowed_region_ids: if regions.is_empty() {
                None
            } else {
                Some(regions)
            },
            leaderboard_enabled,
            show_credits,
        }))
    }

    async fn participants(&self) -> Result<Vec<Participant>, BoxError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, owner_user_id, organization, first_name, last_name, city, \
             region_code, postal_code, category_id, region_id \
             FROM participants ORDER BY id",
        )?;

        let participants = stmt
            .query_map([], |row| {
                Ok(Participant {
                    id: row.get(0)?,
                    owner_user_id: row.get(1)?,
                    organization: row.get(2)?,
                    first_name: row.get(3)?,
                    last_name: row.get(4)?,
                    city: row.get(5)?,
                    region_code: row.get(6)?,
                    postal_code: row.get(7)?,
                    category_id: row.get(8)?,
                    region_id: row.get(9)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(participants)
    }

    async fn known_user_ids(&self) -> Result<HashSet<UserId>, BoxError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT id FROM users")?;
        let ids = stmt
            .query_map([], |row| row.get::<_, u64>(0))?
            .collect::<rusqlite::Result<HashSet<_>>>()?;
        Ok(ids)
    }

    async fn count_verified_votes(
        &self,
        participant: ParticipantId,
        from: i64,
        to: i64,
    ) -> Result<i64, BoxError> {
        let conn = self.conn.lock().unwrap();
        let count = conn.query_row(
            "SELECT COUNT(*) FROM votes \
             WHERE participant_id = ?1 AND verified = 1 AND timestamp BETWEEN ?2 AND ?3",
            params![participant, from, to],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    async fn count_shipments(
        &self,
        participant: ParticipantId,
        from: i64,
        to: i64,
        allowed_categories: Option<&HashSet<CategoryId>>,
    ) -> Result<i64, BoxError> {
        let conn = self.conn.lock().unwrap();
        let count = Self::count_in_window(
            &conn,
            "shipments",
            participant,
            from,
            to,
            allowed_categories,
            "COUNT(*)",
        )?;
        Ok(count as i64)
    }

    async fn sum_units(
        &self,
        participant: ParticipantId,
        from: i64,
        to: i64,
        allowed_categories: Option<&HashSet<CategoryId>>,
    ) -> Result<f64, BoxError> {
        let conn = self.conn.lock().unwrap();
        Self::count_in_window(
            &conn,
            "shipments",
            participant,
            from,
            to,
            allowed_categories,
            "COALESCE(SUM(COALESCE(units, 0)), 0.0)",
        )
        .map_err(Into::into)
    }
}
