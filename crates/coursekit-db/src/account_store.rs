//! User account persistence.
//!
//! Accounts carry a role (`student` or `instructor`) stored as a
//! `PostgreSQL` enum. Instructor-only operations in the balance store
//! use [`AccountStore::require_instructor`] to reject student accounts
//! before touching the ledger.

use coursekit_types::{Role, UserAccount, UserId};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DbError;

/// Operations on the `user_accounts` table.
pub struct AccountStore<'a> {
    pool: &'a PgPool,
}

impl<'a> AccountStore<'a> {
    /// Create a new account store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a new account with the given role.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the insert fails (including
    /// unique violations on username or email).
    pub async fn create_account(
        &self,
        username: &str,
        email: &str,
        role: Role,
    ) -> Result<UserAccount, DbError> {
        let id = UserId::new();
        let row = sqlx::query_as::<_, AccountRow>(
            r"INSERT INTO user_accounts (id, username, email, role)
              VALUES ($1, $2, $3, $4::user_role)
              RETURNING id, username, email, role::TEXT as role, created_at",
        )
        .bind(id.into_inner())
        .bind(username)
        .bind(email)
        .bind(role_to_db(role))
        .fetch_one(self.pool)
        .await?;

        tracing::info!(account_id = %row.id, username, "Created account");

        row.into_account()
    }

    /// Look up an account by ID.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn account(&self, id: UserId) -> Result<Option<UserAccount>, DbError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r"SELECT id, username, email, role::TEXT as role, created_at
              FROM user_accounts
              WHERE id = $1",
        )
        .bind(id.into_inner())
        .fetch_optional(self.pool)
        .await?;

        row.map(AccountRow::into_account).transpose()
    }

    /// List all instructor accounts, ordered by username.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn list_instructors(&self) -> Result<Vec<UserAccount>, DbError> {
        let rows = sqlx::query_as::<_, AccountRow>(
            r"SELECT id, username, email, role::TEXT as role, created_at
              FROM user_accounts
              WHERE role = 'instructor'
              ORDER BY username",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(AccountRow::into_account).collect()
    }

    /// Look up an account and verify it holds the instructor role.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::NotFound`] if no account exists, or
    /// [`DbError::NotInstructor`] if the account is a student.
    pub async fn require_instructor(&self, id: UserId) -> Result<UserAccount, DbError> {
        let account = self.account(id).await?.ok_or(DbError::NotFound {
            entity: "account",
            id: id.into_inner(),
        })?;

        if account.role != Role::Instructor {
            return Err(DbError::NotInstructor(id.into_inner()));
        }

        Ok(account)
    }
}

/// A row from the `user_accounts` table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct AccountRow {
    id: Uuid,
    username: String,
    email: String,
    role: String,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl AccountRow {
    fn into_account(self) -> Result<UserAccount, DbError> {
        Ok(UserAccount {
            id: UserId::from(self.id),
            username: self.username,
            email: self.email,
            role: role_from_db(&self.role)?,
            created_at: self.created_at,
        })
    }
}

/// Convert a [`Role`] to its `PostgreSQL` enum string.
pub(crate) const fn role_to_db(role: Role) -> &'static str {
    match role {
        Role::Student => "student",
        Role::Instructor => "instructor",
    }
}

/// Parse a `PostgreSQL` `user_role` string back into a [`Role`].
pub(crate) fn role_from_db(value: &str) -> Result<Role, DbError> {
    match value {
        "student" => Ok(Role::Student),
        "instructor" => Ok(Role::Instructor),
        other => Err(DbError::InvalidEnum {
            what: "user_role",
            value: other.to_owned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_roundtrips_through_db_strings() {
        for role in [Role::Student, Role::Instructor] {
            let parsed = role_from_db(role_to_db(role));
            assert!(matches!(parsed, Ok(r) if r == role));
        }
    }

    #[test]
    fn unknown_role_string_is_rejected() {
        let result = role_from_db("admin");
        assert!(matches!(result, Err(DbError::InvalidEnum { .. })));
    }
}
