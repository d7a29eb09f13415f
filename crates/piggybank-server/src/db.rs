use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, OptionalExtension, ToSql};
use std::sync::{Arc, Mutex};

use crate::error::{is_unique_violation, ApiError};

/// Creator profile: slug → payout address.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    pub id: i64,
    pub slug: String,
    /// Payout address, lower-cased hex.
    pub address: String,
    pub display_name: Option<String>,
    #[serde(skip_serializing)]
    pub active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Donation lifecycle. This flow only ever writes `Confirmed`, which is
/// terminal; a failed settlement produces no record at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DonationStatus {
    Pending,
    Confirmed,
    Failed,
}

impl DonationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DonationStatus::Pending => "pending",
            DonationStatus::Confirmed => "confirmed",
            DonationStatus::Failed => "failed",
        }
    }
}

impl ToSql for DonationStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for DonationStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "pending" => Ok(DonationStatus::Pending),
            "confirmed" => Ok(DonationStatus::Confirmed),
            "failed" => Ok(DonationStatus::Failed),
            other => Err(FromSqlError::Other(
                format!("unknown donation status: {other}").into(),
            )),
        }
    }
}

/// A recorded donation. Write-once; `tx_hash` is unique.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Donation {
    pub id: i64,
    pub tx_hash: String,
    pub from_address: String,
    pub to_address: String,
    pub token_address: String,
    pub token_symbol: String,
    pub token_decimals: u32,
    /// Amount in the token's smallest unit (integer string).
    pub amount_raw: String,
    /// Human-readable amount as the sender entered it.
    pub amount_formatted: String,
    pub message: Option<String>,
    pub status: DonationStatus,
    pub transaction_timestamp: i64,
    pub created_at: i64,
}

/// Fields for a new ledger entry; id and created_at are store-assigned.
#[derive(Debug, Clone)]
pub struct NewDonation {
    pub tx_hash: String,
    pub from_address: String,
    pub to_address: String,
    pub token_address: String,
    pub token_symbol: String,
    pub token_decimals: u32,
    pub amount_raw: String,
    pub amount_formatted: String,
    pub message: Option<String>,
    pub status: DonationStatus,
    pub transaction_timestamp: i64,
}

/// SQLite database wrapper.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

const DONATION_COLUMNS: &str = "id, tx_hash, from_address, to_address, token_address, \
     token_symbol, token_decimals, amount_raw, amount_formatted, message, status, \
     transaction_timestamp, created_at";

fn donation_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Donation> {
    Ok(Donation {
        id: row.get(0)?,
        tx_hash: row.get(1)?,
        from_address: row.get(2)?,
        to_address: row.get(3)?,
        token_address: row.get(4)?,
        token_symbol: row.get(5)?,
        token_decimals: row.get(6)?,
        amount_raw: row.get(7)?,
        amount_formatted: row.get(8)?,
        message: row.get(9)?,
        status: row.get(10)?,
        transaction_timestamp: row.get(11)?,
        created_at: row.get(12)?,
    })
}

fn recipient_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Recipient> {
    Ok(Recipient {
        id: row.get(0)?,
        slug: row.get(1)?,
        address: row.get(2)?,
        display_name: row.get(3)?,
        active: row.get::<_, i32>(4)? == 1,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

impl Database {
    pub fn new(path: &str) -> Result<Self, ApiError> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.init_schema()?;
        Ok(db)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, ApiError> {
        self.conn
            .lock()
            .map_err(|_| ApiError::Internal("database lock poisoned".to_string()))
    }

    fn init_schema(&self) -> Result<(), ApiError> {
        let conn = self.lock()?;

        // WAL mode for better concurrent read/write performance
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS recipients (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                slug TEXT UNIQUE NOT NULL,
                address TEXT UNIQUE NOT NULL,
                display_name TEXT,
                active INTEGER NOT NULL DEFAULT 1,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_recipients_slug ON recipients(slug)",
            [],
        )?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS donations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                tx_hash TEXT UNIQUE NOT NULL,
                from_address TEXT NOT NULL,
                to_address TEXT NOT NULL,
                token_address TEXT NOT NULL,
                token_symbol TEXT NOT NULL,
                token_decimals INTEGER NOT NULL,
                amount_raw TEXT NOT NULL,
                amount_formatted TEXT NOT NULL,
                message TEXT,
                status TEXT NOT NULL,
                transaction_timestamp INTEGER NOT NULL,
                created_at INTEGER NOT NULL
            )
            "#,
            [],
        )?;

        // Recipient donation history is read most-recent-first
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_donations_to_address \
             ON donations(to_address, transaction_timestamp DESC)",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_donations_from_address \
             ON donations(from_address, transaction_timestamp DESC)",
            [],
        )?;

        Ok(())
    }

    /// Cheap liveness probe for /health.
    pub fn ping(&self) -> Result<(), ApiError> {
        let conn = self.lock()?;
        conn.query_row("SELECT 1", [], |_| Ok(()))?;
        Ok(())
    }

    /// Register a new recipient. `slug` and `address` must already be
    /// validated and lower-cased by the caller.
    pub fn create_recipient(
        &self,
        slug: &str,
        address: &str,
        display_name: Option<&str>,
    ) -> Result<Recipient, ApiError> {
        let conn = self.lock()?;
        let now = chrono::Utc::now().timestamp();

        conn.execute(
            r#"
            INSERT INTO recipients (slug, address, display_name, active, created_at, updated_at)
            VALUES (?1, ?2, ?3, 1, ?4, ?4)
            "#,
            params![slug, address, display_name, now],
        )
        .map_err(|e| {
            if is_unique_violation(&e) {
                if e.to_string().contains("recipients.address") {
                    ApiError::AddressExists(address.to_string())
                } else {
                    ApiError::SlugExists(slug.to_string())
                }
            } else {
                ApiError::Database(e)
            }
        })?;

        let id = conn.last_insert_rowid();

        Ok(Recipient {
            id,
            slug: slug.to_string(),
            address: address.to_string(),
            display_name: display_name.map(String::from),
            active: true,
            created_at: now,
            updated_at: now,
        })
    }

    /// Resolve an active recipient by slug. The caller normalizes case.
    pub fn get_recipient(&self, slug: &str) -> Result<Option<Recipient>, ApiError> {
        let conn = self.lock()?;

        let recipient = conn
            .query_row(
                r#"
                SELECT id, slug, address, display_name, active, created_at, updated_at
                FROM recipients
                WHERE slug = ?1 AND active = 1
                "#,
                params![slug],
                recipient_from_row,
            )
            .optional()?;

        Ok(recipient)
    }

    /// Check whether a slug is free, counting inactive profiles too so a
    /// deactivated slug is not silently reassigned.
    pub fn slug_available(&self, slug: &str) -> Result<bool, ApiError> {
        let conn = self.lock()?;

        let count: i32 = conn.query_row(
            "SELECT COUNT(*) FROM recipients WHERE slug = ?1",
            params![slug],
            |row| row.get(0),
        )?;

        Ok(count == 0)
    }

    /// Append a donation to the ledger. Write-once: a duplicate `tx_hash`
    /// is rejected by the UNIQUE constraint and there is no update path.
    pub fn record_donation(&self, donation: NewDonation) -> Result<Donation, ApiError> {
        let conn = self.lock()?;
        let now = chrono::Utc::now().timestamp();

        conn.execute(
            r#"
            INSERT INTO donations (tx_hash, from_address, to_address, token_address,
                token_symbol, token_decimals, amount_raw, amount_formatted, message,
                status, transaction_timestamp, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
            params![
                donation.tx_hash,
                donation.from_address,
                donation.to_address,
                donation.token_address,
                donation.token_symbol,
                donation.token_decimals,
                donation.amount_raw,
                donation.amount_formatted,
                donation.message,
                donation.status,
                donation.transaction_timestamp,
                now,
            ],
        )
        .map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::DuplicateTransaction(donation.tx_hash.clone())
            } else {
                ApiError::Database(e)
            }
        })?;

        let id = conn.last_insert_rowid();

        Ok(Donation {
            id,
            tx_hash: donation.tx_hash,
            from_address: donation.from_address,
            to_address: donation.to_address,
            token_address: donation.token_address,
            token_symbol: donation.token_symbol,
            token_decimals: donation.token_decimals,
            amount_raw: donation.amount_raw,
            amount_formatted: donation.amount_formatted,
            message: donation.message,
            status: donation.status,
            transaction_timestamp: donation.transaction_timestamp,
            created_at: now,
        })
    }

    pub fn get_donation_by_tx(&self, tx_hash: &str) -> Result<Option<Donation>, ApiError> {
        let conn = self.lock()?;

        let donation = conn
            .query_row(
                &format!("SELECT {DONATION_COLUMNS} FROM donations WHERE tx_hash = ?1"),
                params![tx_hash],
                donation_from_row,
            )
            .optional()?;

        Ok(donation)
    }

    /// Confirmed donations received by an address, most recent first.
    /// `limit` is clamped to 1..=100.
    pub fn donations_for_recipient(
        &self,
        to_address: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Donation>, ApiError> {
        let limit = limit.clamp(1, 100);
        let conn = self.lock()?;

        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT {DONATION_COLUMNS}
            FROM donations
            WHERE to_address = ?1 AND status = 'confirmed'
            ORDER BY transaction_timestamp DESC, id DESC
            LIMIT ?2 OFFSET ?3
            "#
        ))?;

        let donations = stmt
            .query_map(params![to_address, limit, offset], donation_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(donations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDR_A: &str = "0x1111111111111111111111111111111111111111";
    const ADDR_B: &str = "0x2222222222222222222222222222222222222222";

    fn sample_donation(tx: &str, to: &str) -> NewDonation {
        NewDonation {
            tx_hash: tx.to_string(),
            from_address: ADDR_B.to_string(),
            to_address: to.to_string(),
            token_address: x402::USDC_ADDRESS.to_string(),
            token_symbol: "USDC".to_string(),
            token_decimals: 6,
            amount_raw: "1500000".to_string(),
            amount_formatted: "1.5".to_string(),
            message: Some("great stream!".to_string()),
            status: DonationStatus::Confirmed,
            transaction_timestamp: 1_700_000_000,
        }
    }

    #[test]
    fn test_create_and_get_recipient() {
        let db = Database::new(":memory:").unwrap();

        let created = db.create_recipient("alice", ADDR_A, Some("Alice")).unwrap();
        assert_eq!(created.slug, "alice");
        assert!(created.active);

        let fetched = db.get_recipient("alice").unwrap().unwrap();
        assert_eq!(fetched.address, ADDR_A);
        assert_eq!(fetched.display_name.as_deref(), Some("Alice"));
    }

    #[test]
    fn test_unknown_recipient_is_none() {
        let db = Database::new(":memory:").unwrap();
        assert!(db.get_recipient("nobody").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_slug_rejected() {
        let db = Database::new(":memory:").unwrap();
        db.create_recipient("alice", ADDR_A, None).unwrap();

        let err = db.create_recipient("alice", ADDR_B, None).unwrap_err();
        assert!(matches!(err, ApiError::SlugExists(_)));
    }

    #[test]
    fn test_duplicate_address_rejected() {
        let db = Database::new(":memory:").unwrap();
        db.create_recipient("alice", ADDR_A, None).unwrap();

        let err = db.create_recipient("alice2", ADDR_A, None).unwrap_err();
        assert!(matches!(err, ApiError::AddressExists(_)));
    }

    #[test]
    fn test_slug_available() {
        let db = Database::new(":memory:").unwrap();
        assert!(db.slug_available("alice").unwrap());
        db.create_recipient("alice", ADDR_A, None).unwrap();
        assert!(!db.slug_available("alice").unwrap());
    }

    #[test]
    fn test_record_donation_is_write_once() {
        let db = Database::new(":memory:").unwrap();

        let recorded = db.record_donation(sample_donation("0xabc", ADDR_A)).unwrap();
        assert_eq!(recorded.status, DonationStatus::Confirmed);

        let err = db
            .record_donation(sample_donation("0xabc", ADDR_A))
            .unwrap_err();
        assert!(matches!(err, ApiError::DuplicateTransaction(_)));

        let fetched = db.get_donation_by_tx("0xabc").unwrap().unwrap();
        assert_eq!(fetched.id, recorded.id);
        assert_eq!(fetched.amount_raw, "1500000");
    }

    #[test]
    fn test_donation_history_most_recent_first() {
        let db = Database::new(":memory:").unwrap();

        let mut older = sample_donation("0xold", ADDR_A);
        older.transaction_timestamp = 1_600_000_000;
        db.record_donation(older).unwrap();
        db.record_donation(sample_donation("0xnew", ADDR_A)).unwrap();
        db.record_donation(sample_donation("0xother", ADDR_B)).unwrap();

        let history = db.donations_for_recipient(ADDR_A, 100, 0).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].tx_hash, "0xnew");
        assert_eq!(history[1].tx_hash, "0xold");
    }

    #[test]
    fn test_donation_history_pagination() {
        let db = Database::new(":memory:").unwrap();
        for i in 0..5 {
            db.record_donation(sample_donation(&format!("0x{i}"), ADDR_A))
                .unwrap();
        }

        let page = db.donations_for_recipient(ADDR_A, 2, 2).unwrap();
        assert_eq!(page.len(), 2);
    }

    #[test]
    fn test_donation_status_roundtrip() {
        let db = Database::new(":memory:").unwrap();
        let mut d = sample_donation("0xstat", ADDR_A);
        d.status = DonationStatus::Confirmed;
        db.record_donation(d).unwrap();

        let fetched = db.get_donation_by_tx("0xstat").unwrap().unwrap();
        assert_eq!(fetched.status.as_str(), "confirmed");
    }
}
