//! Authentication service
//!
//! Email/password accounts with server-side sessions. Every issued token is
//! backed by an `auth_sessions` row so logout can revoke it before expiry.

use chrono::{Duration, Utc};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    AuthSession, ClientInfo, IssuedSession, LoginRequest, RegisterRequest, User, UserRole,
};

use super::jwt::{generate_session_token, JwtError};
use super::password::{hash_password, verify_password, PasswordError};

/// Auth service errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Un compte existe déjà avec cet email")]
    EmailTaken,

    #[error("Email ou mot de passe incorrect")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("Session not found or revoked")]
    SessionNotFound,

    #[error("Token error: {0}")]
    TokenError(String),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),
}

impl From<sqlx::Error> for AuthError {
    fn from(e: sqlx::Error) -> Self {
        AuthError::DatabaseError(e.to_string())
    }
}

impl From<JwtError> for AuthError {
    fn from(e: JwtError) -> Self {
        AuthError::TokenError(e.to_string())
    }
}

impl From<PasswordError> for AuthError {
    fn from(e: PasswordError) -> Self {
        AuthError::PasswordHash(e.to_string())
    }
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db_pool: PgPool,
    jwt_secret: String,
    session_ttl_hours: i64,
    admin_emails: Vec<String>,
    secure_cookies: bool,
}

impl AuthService {
    pub fn new(
        db_pool: PgPool,
        jwt_secret: String,
        session_ttl_hours: i64,
        admin_emails: Vec<String>,
        secure_cookies: bool,
    ) -> Self {
        Self {
            db_pool,
            jwt_secret,
            session_ttl_hours,
            admin_emails,
            secure_cookies,
        }
    }

    /// Create an account. Emails listed in `ADMIN_EMAILS` get the admin role.
    pub async fn register(&self, request: &RegisterRequest) -> Result<User, AuthError> {
        let email = normalize_email(&request.email);
        let role = self.role_for(&email);
        let password_hash = hash_password(&request.password).await?;
        let now = Utc::now();

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, password_hash, first_name, last_name, role, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, email, password_hash, first_name, last_name, role, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&email)
        .bind(&password_hash)
        .bind(request.first_name.trim())
        .bind(request.last_name.trim())
        .bind(role)
        .bind(now)
        .bind(now)
        .fetch_one(&self.db_pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AuthError::EmailTaken;
                }
            }
            AuthError::from(e)
        })?;

        tracing::info!(user_id = %user.id, role = user.role.as_str(), "User registered");

        Ok(user)
    }

    /// Check credentials. Unknown emails and wrong passwords are indistinguishable.
    pub async fn login(&self, request: &LoginRequest) -> Result<User, AuthError> {
        let email = normalize_email(&request.email);

        let user: User = sqlx::query_as(
            r#"
            SELECT id, email, password_hash, first_name, last_name, role, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(&email)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(&request.password, &user.password_hash).await? {
            tracing::debug!(user_id = %user.id, "Password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Sign a token for `user` and record its session
    pub async fn issue_session(
        &self,
        user: &User,
        client: ClientInfo,
    ) -> Result<IssuedSession, AuthError> {
        let jti = Uuid::new_v4().to_string();
        let ttl = Duration::hours(self.session_ttl_hours);
        let token = generate_session_token(user, &jti, &self.jwt_secret, ttl.num_seconds())?;
        let expires_at = Utc::now() + ttl;

        sqlx::query(
            r#"
            INSERT INTO auth_sessions (id, user_id, jti, ip_address, user_agent, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user.id)
        .bind(&jti)
        .bind(&client.ip_address)
        .bind(&client.user_agent)
        .bind(expires_at)
        .execute(&self.db_pool)
        .await?;

        Ok(IssuedSession {
            token,
            jti,
            expires_at,
        })
    }

    /// Revoke a session (logout)
    pub async fn revoke_session(&self, jti: &str) -> Result<(), AuthError> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE auth_sessions
            SET revoked = TRUE, revoked_at = NOW()
            WHERE jti = $1 AND revoked = FALSE
            "#,
        )
        .bind(jti)
        .execute(&self.db_pool)
        .await?
        .rows_affected();

        if rows_affected == 0 {
            return Err(AuthError::SessionNotFound);
        }

        Ok(())
    }

    /// Verify a session is valid (not revoked, not expired)
    pub async fn verify_session(&self, jti: &str) -> Result<AuthSession, AuthError> {
        sqlx::query_as(
            r#"
            SELECT id, user_id, jti, ip_address, user_agent, expires_at, revoked, revoked_at, created_at
            FROM auth_sessions
            WHERE jti = $1 AND revoked = FALSE AND expires_at > NOW()
            "#,
        )
        .bind(jti)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or(AuthError::SessionNotFound)
    }

    pub async fn get_user_by_id(&self, user_id: Uuid) -> Result<User, AuthError> {
        sqlx::query_as(
            r#"
            SELECT id, email, password_hash, first_name, last_name, role, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or(AuthError::UserNotFound)
    }

    /// Delete expired and revoked sessions; returns the number removed
    pub async fn purge_expired_sessions(&self) -> Result<u64, AuthError> {
        let rows_affected = sqlx::query(
            r#"
            DELETE FROM auth_sessions
            WHERE expires_at <= NOW() OR revoked = TRUE
            "#,
        )
        .execute(&self.db_pool)
        .await?
        .rows_affected();

        Ok(rows_affected)
    }

    /// Startup sweep of sessions that can no longer authenticate. Failures are
    /// logged and never block startup.
    pub async fn purge_stale_sessions(&self) {
        match self.purge_expired_sessions().await {
            Ok(0) => {}
            Ok(removed) => tracing::info!(removed, "Purged expired sessions"),
            Err(e) => tracing::warn!(error = %e, "Failed to purge expired sessions"),
        }
    }

    /// Get JWT secret (for middleware access)
    pub fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }

    /// Whether the session cookie carries the `Secure` attribute
    pub fn secure_cookies(&self) -> bool {
        self.secure_cookies
    }

    fn role_for(&self, email: &str) -> UserRole {
        if self.admin_emails.iter().any(|admin| admin == email) {
            UserRole::Admin
        } else {
            UserRole::User
        }
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
