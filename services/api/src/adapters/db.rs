//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `IdentityService` port from the `core` crate. It stores users and their
//! browser auth sessions in PostgreSQL using `sqlx`. Uploaded documents are never
//! written here.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use doc_summarizer_core::domain::{AuthSession, User, UserCredentials};
use doc_summarizer_core::ports::{IdentityService, PortError, PortResult};
use sqlx::{FromRow, PgPool};
use tracing::debug;
use uuid::Uuid;

/// Postgres SQLSTATE for a unique constraint violation.
const UNIQUE_VIOLATION: &str = "23505";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `IdentityService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    user_id: Uuid,
    email: Option<String>,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            user_id: self.user_id,
            email: self.email,
        }
    }
}

#[derive(FromRow)]
struct CredentialsRecord {
    user_id: Uuid,
    email: String,
    hashed_password: String,
}
impl CredentialsRecord {
    fn to_domain(self) -> UserCredentials {
        UserCredentials {
            user_id: self.user_id,
            email: self.email,
            hashed_password: self.hashed_password,
        }
    }
}

#[derive(FromRow)]
struct AuthSessionRecord {
    id: String,
    user_id: Uuid,
    email: Option<String>,
    expires_at: DateTime<Utc>,
}
impl AuthSessionRecord {
    fn to_domain(self) -> (AuthSession, User) {
        (
            AuthSession {
                id: self.id,
                user_id: self.user_id,
                expires_at: self.expires_at,
            },
            User {
                user_id: self.user_id,
                email: self.email,
            },
        )
    }
}

fn map_unique_violation(e: sqlx::Error, what: &str) -> PortError {
    match &e {
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            PortError::Conflict(format!("{} already exists", what))
        }
        _ => PortError::Unexpected(e.to_string()),
    }
}

//=========================================================================================
// `IdentityService` Trait Implementation
//=========================================================================================

#[async_trait]
impl IdentityService for DbAdapter {
    async fn create_user_with_email(
        &self,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (user_id, email, hashed_password) VALUES ($1, $2, $3) RETURNING user_id, email",
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(hashed_password)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "A user with this email"))?;

        Ok(record.to_domain())
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let record = sqlx::query_as::<_, CredentialsRecord>(
            "SELECT user_id, email, hashed_password FROM users WHERE email = $1 AND hashed_password IS NOT NULL",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("User {} not found", email)),
            _ => PortError::Unexpected(e.to_string()),
        })?;

        Ok(record.to_domain())
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query("INSERT INTO auth_sessions (id, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(session_id)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, "Auth session"))?;
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<User> {
        let record = sqlx::query_as::<_, AuthSessionRecord>(
            "SELECT s.id, s.user_id, u.email, s.expires_at FROM auth_sessions s JOIN users u ON u.user_id = s.user_id WHERE s.id = $1",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?
        .ok_or(PortError::Unauthorized)?;

        let (session, user) = record.to_domain();
        if session.expires_at <= Utc::now() {
            debug!(user_id = %session.user_id, "Auth session expired");
            return Err(PortError::Unauthorized);
        }
        Ok(user)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }
}
