//! Repository layer for database operations.
//!
//! Movement listings come back in `occurred_at ASC, id ASC` order. This
//! is a documented contract with the fee aggregation layer: the order is
//! stable across identical queries, so aggregation output is
//! reproducible.

use crate::domain::{
    Decimal, Email, Instrument, InstrumentId, Investor, InvestorId, MovementEvent, Symbol,
};
use chrono::{DateTime, TimeZone, Utc};
use sqlx::sqlite::SqlitePool;
use sqlx::Row;
use std::str::FromStr;
use tracing::warn;

/// Repository for database operations.
pub struct Repository {
    pool: SqlitePool,
}

const MOVEMENT_SELECT: &str = r#"
    SELECT m.id, m.investor_id, i.name AS investor_name,
           m.instrument_id, s.symbol, s.name AS instrument_name,
           m.recorded_value, m.occurred_at_ms, m.created_at_ms
    FROM movements m
    JOIN investors i ON i.id = m.investor_id
    JOIN instruments s ON s.id = m.instrument_id
"#;

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }

    // =========================================================================
    // Investor operations
    // =========================================================================

    /// Insert an investor and return the stored record.
    ///
    /// # Errors
    /// Returns an error if the insert fails, including on a duplicate
    /// email (UNIQUE constraint).
    pub async fn insert_investor(
        &self,
        name: &str,
        email: &Email,
    ) -> Result<Investor, sqlx::Error> {
        let created_at = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO investors (name, email, created_at_ms)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(name)
        .bind(email.as_str())
        .bind(created_at.timestamp_millis())
        .execute(&self.pool)
        .await?;

        Ok(Investor {
            id: InvestorId::new(result.last_insert_rowid()),
            name: name.to_string(),
            email: email.clone(),
            created_at,
        })
    }

    /// Get an investor by id.
    pub async fn get_investor(&self, id: InvestorId) -> Result<Option<Investor>, sqlx::Error> {
        let row = sqlx::query("SELECT id, name, email, created_at_ms FROM investors WHERE id = ?")
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| investor_from_row(&r)))
    }

    /// Get an investor by normalized email.
    pub async fn get_investor_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<Investor>, sqlx::Error> {
        let row =
            sqlx::query("SELECT id, name, email, created_at_ms FROM investors WHERE email = ?")
                .bind(email.as_str())
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|r| investor_from_row(&r)))
    }

    /// List all investors in insertion order.
    pub async fn list_investors(&self) -> Result<Vec<Investor>, sqlx::Error> {
        let rows =
            sqlx::query("SELECT id, name, email, created_at_ms FROM investors ORDER BY id ASC")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.iter().map(investor_from_row).collect())
    }

    pub async fn count_investors(&self) -> Result<i64, sqlx::Error> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM investors")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("n"))
    }

    // =========================================================================
    // Instrument operations
    // =========================================================================

    /// Insert an instrument and return the stored record.
    ///
    /// # Errors
    /// Returns an error if the insert fails, including on a duplicate
    /// symbol (UNIQUE constraint).
    pub async fn insert_instrument(
        &self,
        symbol: &Symbol,
        name: &str,
    ) -> Result<Instrument, sqlx::Error> {
        let created_at = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO instruments (symbol, name, created_at_ms)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(symbol.as_str())
        .bind(name)
        .bind(created_at.timestamp_millis())
        .execute(&self.pool)
        .await?;

        Ok(Instrument {
            id: InstrumentId::new(result.last_insert_rowid()),
            symbol: symbol.clone(),
            name: name.to_string(),
            created_at,
        })
    }

    /// Get an instrument by id.
    pub async fn get_instrument(
        &self,
        id: InstrumentId,
    ) -> Result<Option<Instrument>, sqlx::Error> {
        let row =
            sqlx::query("SELECT id, symbol, name, created_at_ms FROM instruments WHERE id = ?")
                .bind(id.as_i64())
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|r| instrument_from_row(&r)))
    }

    /// Get an instrument by its (upper-cased) symbol.
    pub async fn get_instrument_by_symbol(
        &self,
        symbol: &Symbol,
    ) -> Result<Option<Instrument>, sqlx::Error> {
        let row =
            sqlx::query("SELECT id, symbol, name, created_at_ms FROM instruments WHERE symbol = ?")
                .bind(symbol.as_str())
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|r| instrument_from_row(&r)))
    }

    /// List all instruments in insertion order.
    pub async fn list_instruments(&self) -> Result<Vec<Instrument>, sqlx::Error> {
        let rows =
            sqlx::query("SELECT id, symbol, name, created_at_ms FROM instruments ORDER BY id ASC")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.iter().map(instrument_from_row).collect())
    }

    pub async fn count_instruments(&self) -> Result<i64, sqlx::Error> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM instruments")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("n"))
    }

    // =========================================================================
    // Movement operations
    // =========================================================================

    /// Insert a movement and return it joined with investor and
    /// instrument details.
    ///
    /// # Errors
    /// Returns an error if the insert fails or the stored row cannot be
    /// read back.
    pub async fn insert_movement(
        &self,
        investor_id: InvestorId,
        instrument_id: InstrumentId,
        recorded_value: Decimal,
        occurred_at: DateTime<Utc>,
    ) -> Result<MovementEvent, sqlx::Error> {
        let created_at = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO movements (investor_id, instrument_id, recorded_value, occurred_at_ms, created_at_ms)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(investor_id.as_i64())
        .bind(instrument_id.as_i64())
        .bind(recorded_value.to_canonical_string())
        .bind(occurred_at.timestamp_millis())
        .bind(created_at.timestamp_millis())
        .execute(&self.pool)
        .await?;

        self.get_movement(result.last_insert_rowid())
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Get one movement by id, joined with investor and instrument.
    pub async fn get_movement(&self, id: i64) -> Result<Option<MovementEvent>, sqlx::Error> {
        let sql = format!("{} WHERE m.id = ?", MOVEMENT_SELECT);
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;

        Ok(row.map(|r| movement_from_row(&r)))
    }

    /// Query movements with optional investor, instrument, and
    /// occurred-at upper-bound filters.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn query_movements(
        &self,
        investor_id: Option<InvestorId>,
        instrument_id: Option<InstrumentId>,
        occurred_before: Option<DateTime<Utc>>,
    ) -> Result<Vec<MovementEvent>, sqlx::Error> {
        let upper_ms = occurred_before
            .map(|t| t.timestamp_millis())
            .unwrap_or(i64::MAX);

        let mut sql = format!("{} WHERE m.occurred_at_ms <= ?", MOVEMENT_SELECT);
        if investor_id.is_some() {
            sql.push_str(" AND m.investor_id = ?");
        }
        if instrument_id.is_some() {
            sql.push_str(" AND m.instrument_id = ?");
        }
        sql.push_str(" ORDER BY m.occurred_at_ms ASC, m.id ASC");

        let mut query = sqlx::query(&sql).bind(upper_ms);
        if let Some(investor) = investor_id {
            query = query.bind(investor.as_i64());
        }
        if let Some(instrument) = instrument_id {
            query = query.bind(instrument.as_i64());
        }

        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.iter().map(movement_from_row).collect())
    }

    /// Count movements matching the optional filters.
    pub async fn count_movements(
        &self,
        investor_id: Option<InvestorId>,
        instrument_id: Option<InstrumentId>,
    ) -> Result<i64, sqlx::Error> {
        let mut sql = String::from("SELECT COUNT(*) AS n FROM movements WHERE 1 = 1");
        if investor_id.is_some() {
            sql.push_str(" AND investor_id = ?");
        }
        if instrument_id.is_some() {
            sql.push_str(" AND instrument_id = ?");
        }

        let mut query = sqlx::query(&sql);
        if let Some(investor) = investor_id {
            query = query.bind(investor.as_i64());
        }
        if let Some(instrument) = instrument_id {
            query = query.bind(instrument.as_i64());
        }

        let row = query.fetch_one(&self.pool).await?;
        Ok(row.get("n"))
    }
}

fn investor_from_row(row: &sqlx::sqlite::SqliteRow) -> Investor {
    let email_str: String = row.get("email");
    // Stored emails were normalized on the way in; re-parse defensively.
    let email = Email::parse(&email_str).unwrap_or_else(|e| {
        warn!(email = %email_str, error = %e, "Stored email failed to re-parse, using placeholder");
        Email::parse("unknown@invalid").expect("placeholder email is valid")
    });

    Investor {
        id: InvestorId::new(row.get("id")),
        name: row.get("name"),
        email,
        created_at: ms_to_utc(row.get("created_at_ms")),
    }
}

fn instrument_from_row(row: &sqlx::sqlite::SqliteRow) -> Instrument {
    Instrument {
        id: InstrumentId::new(row.get("id")),
        symbol: Symbol::new(row.get::<String, _>("symbol").as_str()),
        name: row.get("name"),
        created_at: ms_to_utc(row.get("created_at_ms")),
    }
}

fn movement_from_row(row: &sqlx::sqlite::SqliteRow) -> MovementEvent {
    let value_str: String = row.get("recorded_value");
    let recorded_value = Decimal::from_str(&value_str).unwrap_or_else(|e| {
        warn!(
            recorded_value = %value_str,
            error = %e,
            "Failed to parse recorded value decimal, using default"
        );
        Decimal::default()
    });

    MovementEvent {
        id: row.get("id"),
        investor_id: InvestorId::new(row.get("investor_id")),
        investor_name: row.get("investor_name"),
        instrument_id: InstrumentId::new(row.get("instrument_id")),
        symbol: Symbol::new(row.get::<String, _>("symbol").as_str()),
        instrument_name: row.get("instrument_name"),
        recorded_value,
        occurred_at: ms_to_utc(row.get("occurred_at_ms")),
        created_at: ms_to_utc(row.get("created_at_ms")),
    }
}

fn ms_to_utc(ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms).single().unwrap_or_else(|| {
        warn!(ms, "Stored timestamp out of range, clamping to epoch");
        DateTime::<Utc>::UNIX_EPOCH
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::init_db;
    use chrono::TimeZone;
    use tempfile::TempDir;

    async fn setup_test_db() -> (Repository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir
            .path()
            .join("test.db")
            .to_string_lossy()
            .to_string();
        let pool = init_db(&db_path).await.expect("init_db failed");
        (Repository::new(pool), temp_dir)
    }

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, 9, 30, 0).unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_get_investor() {
        let (repo, _temp) = setup_test_db().await;

        let email = Email::parse("Joao@Email.com").unwrap();
        let created = repo.insert_investor("Joao Silva", &email).await.unwrap();

        let fetched = repo.get_investor(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Joao Silva");
        assert_eq!(fetched.email.as_str(), "joao@email.com");

        let by_email = repo.get_investor_by_email(&email).await.unwrap();
        assert_eq!(by_email.map(|i| i.id), Some(created.id));
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected_by_schema() {
        let (repo, _temp) = setup_test_db().await;

        let email = Email::parse("maria@email.com").unwrap();
        repo.insert_investor("Maria Santos", &email).await.unwrap();

        let duplicate = repo.insert_investor("Maria Souza", &email).await;
        assert!(duplicate.is_err());
    }

    #[tokio::test]
    async fn test_insert_and_lookup_instrument_by_symbol() {
        let (repo, _temp) = setup_test_db().await;

        let symbol = Symbol::new("juro11");
        repo.insert_instrument(&symbol, "Infra RF Fund").await.unwrap();

        let fetched = repo
            .get_instrument_by_symbol(&Symbol::new("JURO11"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.symbol.as_str(), "JURO11");
        assert_eq!(fetched.name, "Infra RF Fund");
        assert_eq!(repo.count_instruments().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_movement_roundtrip_preserves_value_and_names() {
        let (repo, _temp) = setup_test_db().await;

        let investor = repo
            .insert_investor("Ana Costa", &Email::parse("ana@email.com").unwrap())
            .await
            .unwrap();
        let instrument = repo
            .insert_instrument(&Symbol::new("CDII11"), "CDI Fund")
            .await
            .unwrap();

        let movement = repo
            .insert_movement(
                investor.id,
                instrument.id,
                Decimal::from_str("125.50").unwrap(),
                at(5),
            )
            .await
            .unwrap();

        assert_eq!(movement.investor_name, "Ana Costa");
        assert_eq!(movement.symbol.as_str(), "CDII11");
        assert_eq!(
            movement.recorded_value,
            Decimal::from_str("125.5").unwrap()
        );
        assert_eq!(movement.occurred_at, at(5));

        let fetched = repo.get_movement(movement.id).await.unwrap().unwrap();
        assert_eq!(fetched, movement);
    }

    #[tokio::test]
    async fn test_query_movements_filters_and_order() {
        let (repo, _temp) = setup_test_db().await;

        let ana = repo
            .insert_investor("Ana", &Email::parse("ana@email.com").unwrap())
            .await
            .unwrap();
        let pedro = repo
            .insert_investor("Pedro", &Email::parse("pedro@email.com").unwrap())
            .await
            .unwrap();
        let juro = repo
            .insert_instrument(&Symbol::new("JURO11"), "Infra RF")
            .await
            .unwrap();
        let cdii = repo
            .insert_instrument(&Symbol::new("CDII11"), "CDI")
            .await
            .unwrap();

        let value = Decimal::from_str("100").unwrap();
        // Insert out of chronological order to exercise the sort.
        repo.insert_movement(ana.id, juro.id, value, at(10)).await.unwrap();
        repo.insert_movement(ana.id, cdii.id, value, at(2)).await.unwrap();
        repo.insert_movement(pedro.id, juro.id, value, at(6)).await.unwrap();

        let all = repo.query_movements(None, None, None).await.unwrap();
        assert_eq!(all.len(), 3);
        assert!(all.windows(2).all(|w| w[0].occurred_at <= w[1].occurred_at));

        let anas = repo
            .query_movements(Some(ana.id), None, None)
            .await
            .unwrap();
        assert_eq!(anas.len(), 2);
        assert!(anas.iter().all(|m| m.investor_id == ana.id));

        let juros = repo
            .query_movements(None, Some(juro.id), None)
            .await
            .unwrap();
        assert_eq!(juros.len(), 2);

        let early = repo
            .query_movements(None, None, Some(at(6)))
            .await
            .unwrap();
        assert_eq!(early.len(), 2);

        assert_eq!(repo.count_movements(Some(ana.id), None).await.unwrap(), 2);
        assert_eq!(repo.count_movements(None, Some(cdii.id)).await.unwrap(), 1);
        assert_eq!(repo.count_movements(None, None).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_movement_requires_existing_references() {
        let (repo, _temp) = setup_test_db().await;

        let result = repo
            .insert_movement(
                InvestorId::new(99),
                InstrumentId::new(99),
                Decimal::from_str("10").unwrap(),
                at(1),
            )
            .await;
        assert!(result.is_err(), "foreign keys should reject orphan movements");
    }
}
