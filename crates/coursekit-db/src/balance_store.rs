//! Instructor balance persistence: the append-only ledger, the cached
//! projection, and payout requests.
//!
//! Every balance movement writes a `balance_ledger` row and updates the
//! `instructor_balances` projection inside one transaction, so replaying
//! the ledger always reproduces the cached figure. Payouts lock the
//! projection row (`SELECT ... FOR UPDATE`) before validating, which
//! serializes concurrent withdrawals and makes overdraw impossible.

use coursekit_ledger::audit::ProjectionStatus;
use coursekit_ledger::ledger::{REASON_COURSE_SALE, REASON_PAYOUT};
use coursekit_ledger::{EntryBuilder, Ledger};
use coursekit_types::{
    BalanceEntry, BalanceEntryId, BalanceEntryType, CourseId, PayoutRequest, PayoutRequestId,
    UserId,
};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::account_store::AccountStore;
use crate::error::DbError;

/// Operations on the `instructor_balances`, `balance_ledger`, and
/// `payout_requests` tables.
pub struct BalanceStore<'a> {
    pool: &'a PgPool,
}

impl<'a> BalanceStore<'a> {
    /// Create a new balance store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Current cached balance for an instructor.
    ///
    /// An instructor with no ledger activity has a zero balance.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn balance(&self, instructor_id: UserId) -> Result<Decimal, DbError> {
        let row: Option<(Decimal,)> = sqlx::query_as(
            r"SELECT balance FROM instructor_balances WHERE instructor_id = $1",
        )
        .bind(instructor_id.into_inner())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map_or(Decimal::ZERO, |r| r.0))
    }

    /// All ledger entries for an instructor, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn entries_for(&self, instructor_id: UserId) -> Result<Vec<BalanceEntry>, DbError> {
        let rows = sqlx::query_as::<_, BalanceEntryRow>(
            r"SELECT id, entry_type::TEXT as entry_type, instructor_id, amount, reference_id, reason, created_at
              FROM balance_ledger
              WHERE instructor_id = $1
              ORDER BY created_at, id",
        )
        .bind(instructor_id.into_inner())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(BalanceEntryRow::into_entry).collect()
    }

    /// Submit a payout request, debiting the balance atomically.
    ///
    /// The balance row is locked for the duration of the transaction:
    /// validate, insert the request, append the ledger debit, and update
    /// the projection all commit together or not at all. Two concurrent
    /// requests against the same balance serialize on the row lock, so
    /// at most one can succeed when funds only cover one.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::NotFound`] / [`DbError::NotInstructor`] for a
    /// missing or non-instructor account, [`DbError::Payout`] when
    /// validation rejects the amount, or [`DbError::Postgres`] on query
    /// failure.
    pub async fn request_payout(
        &self,
        instructor_id: UserId,
        amount: Decimal,
    ) -> Result<PayoutRequest, DbError> {
        AccountStore::new(self.pool)
            .require_instructor(instructor_id)
            .await?;

        let mut tx = self.pool.begin().await?;

        ensure_balance_row(&mut *tx, instructor_id).await?;

        let (balance,): (Decimal,) = sqlx::query_as(
            r"SELECT balance FROM instructor_balances WHERE instructor_id = $1 FOR UPDATE",
        )
        .bind(instructor_id.into_inner())
        .fetch_one(&mut *tx)
        .await?;

        coursekit_core::payout::validate(balance, amount)?;

        let payout_id = PayoutRequestId::new();
        let row = sqlx::query_as::<_, PayoutRequestRow>(
            r"INSERT INTO payout_requests (id, instructor_id, amount)
              VALUES ($1, $2, $3)
              RETURNING id, instructor_id, amount, processed, requested_at",
        )
        .bind(payout_id.into_inner())
        .bind(instructor_id.into_inner())
        .bind(amount)
        .fetch_one(&mut *tx)
        .await?;

        let debit = EntryBuilder::new(BalanceEntryType::Payout, instructor_id)
            .amount(amount)
            .reason(REASON_PAYOUT.to_owned())
            .reference_id(payout_id.into_inner())
            .build()?;
        persist_entry(&mut *tx, &debit).await?;

        sqlx::query(
            r"UPDATE instructor_balances
              SET balance = balance - $2, updated_at = now()
              WHERE instructor_id = $1",
        )
        .bind(instructor_id.into_inner())
        .bind(amount)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            instructor_id = %instructor_id,
            %amount,
            payout_id = %row.id,
            "Recorded payout request"
        );

        Ok(row.into_request())
    }

    /// List an instructor's payout requests, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn list_payout_requests(
        &self,
        instructor_id: UserId,
    ) -> Result<Vec<PayoutRequest>, DbError> {
        let rows = sqlx::query_as::<_, PayoutRequestRow>(
            r"SELECT id, instructor_id, amount, processed, requested_at
              FROM payout_requests
              WHERE instructor_id = $1
              ORDER BY requested_at DESC, id DESC",
        )
        .bind(instructor_id.into_inner())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(PayoutRequestRow::into_request).collect())
    }

    /// Replay an instructor's ledger and compare it to the cached balance.
    ///
    /// The persisted entries are appended to an in-memory [`Ledger`] and
    /// the balance is re-derived from scratch, so any drift between the
    /// `instructor_balances` projection and the log is surfaced.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if a query fails.
    pub async fn audit_balance(&self, instructor_id: UserId) -> Result<ProjectionStatus, DbError> {
        let cached = self.balance(instructor_id).await?;

        let mut ledger = Ledger::new();
        for entry in self.entries_for(instructor_id).await? {
            ledger.append(entry);
        }

        Ok(coursekit_ledger::audit::verify_projection(
            instructor_id,
            cached,
            &ledger,
        ))
    }
}

/// Credit a course sale to the instructor inside the caller's transaction.
///
/// Appends the ledger entry and bumps the projection; the enrollment
/// store calls this from the payment-confirmation transaction so the
/// credit commits (or rolls back) with the enrollment row.
pub(crate) async fn credit_sale(
    conn: &mut PgConnection,
    instructor_id: UserId,
    course_id: CourseId,
    amount: Decimal,
) -> Result<(), DbError> {
    ensure_balance_row(conn, instructor_id).await?;

    let credit = EntryBuilder::new(BalanceEntryType::CourseSale, instructor_id)
        .amount(amount)
        .reason(REASON_COURSE_SALE.to_owned())
        .reference_id(course_id.into_inner())
        .build()?;
    persist_entry(conn, &credit).await?;

    sqlx::query(
        r"UPDATE instructor_balances
          SET balance = balance + $2, updated_at = now()
          WHERE instructor_id = $1",
    )
    .bind(instructor_id.into_inner())
    .bind(amount)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Insert a validated ledger entry into the `balance_ledger` table.
async fn persist_entry(conn: &mut PgConnection, entry: &BalanceEntry) -> Result<(), DbError> {
    sqlx::query(
        r"INSERT INTO balance_ledger (id, entry_type, instructor_id, amount, reference_id, reason, created_at)
          VALUES ($1, $2::balance_entry_type, $3, $4, $5, $6, $7)",
    )
    .bind(entry.id.into_inner())
    .bind(entry_type_to_db(entry.entry_type))
    .bind(entry.instructor_id.into_inner())
    .bind(entry.amount)
    .bind(entry.reference_id)
    .bind(&entry.reason)
    .bind(entry.created_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Create the projection row for an instructor if it does not exist yet.
async fn ensure_balance_row(conn: &mut PgConnection, instructor_id: UserId) -> Result<(), DbError> {
    sqlx::query(
        r"INSERT INTO instructor_balances (instructor_id, balance)
          VALUES ($1, 0)
          ON CONFLICT (instructor_id) DO NOTHING",
    )
    .bind(instructor_id.into_inner())
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// A row from the `balance_ledger` table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct BalanceEntryRow {
    id: Uuid,
    entry_type: String,
    instructor_id: Uuid,
    amount: Decimal,
    reference_id: Option<Uuid>,
    reason: String,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl BalanceEntryRow {
    fn into_entry(self) -> Result<BalanceEntry, DbError> {
        Ok(BalanceEntry {
            id: BalanceEntryId::from(self.id),
            entry_type: entry_type_from_db(&self.entry_type)?,
            instructor_id: UserId::from(self.instructor_id),
            amount: self.amount,
            reference_id: self.reference_id,
            reason: self.reason,
            created_at: self.created_at,
        })
    }
}

/// A row from the `payout_requests` table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct PayoutRequestRow {
    id: Uuid,
    instructor_id: Uuid,
    amount: Decimal,
    processed: bool,
    requested_at: chrono::DateTime<chrono::Utc>,
}

impl PayoutRequestRow {
    fn into_request(self) -> PayoutRequest {
        PayoutRequest {
            id: PayoutRequestId::from(self.id),
            instructor_id: UserId::from(self.instructor_id),
            amount: self.amount,
            processed: self.processed,
            requested_at: self.requested_at,
        }
    }
}

/// Convert a [`BalanceEntryType`] to its `PostgreSQL` enum string.
const fn entry_type_to_db(entry_type: BalanceEntryType) -> &'static str {
    match entry_type {
        BalanceEntryType::CourseSale => "course_sale",
        BalanceEntryType::Payout => "payout",
    }
}

/// Parse a `PostgreSQL` `balance_entry_type` string.
fn entry_type_from_db(value: &str) -> Result<BalanceEntryType, DbError> {
    match value {
        "course_sale" => Ok(BalanceEntryType::CourseSale),
        "payout" => Ok(BalanceEntryType::Payout),
        other => Err(DbError::InvalidEnum {
            what: "balance_entry_type",
            value: other.to_owned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_type_round_trips_through_db_strings() {
        for entry_type in [BalanceEntryType::CourseSale, BalanceEntryType::Payout] {
            assert!(matches!(
                entry_type_from_db(entry_type_to_db(entry_type)),
                Ok(t) if t == entry_type
            ));
        }
    }

    #[test]
    fn entry_type_strings_parse() {
        assert!(matches!(
            entry_type_from_db("course_sale"),
            Ok(BalanceEntryType::CourseSale)
        ));
        assert!(matches!(
            entry_type_from_db("payout"),
            Ok(BalanceEntryType::Payout)
        ));
        assert!(matches!(
            entry_type_from_db("refund"),
            Err(DbError::InvalidEnum { .. })
        ));
    }
}
