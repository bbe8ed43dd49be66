//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::id::{IdentityId, ResetTokenId};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::entity::{identity::Identity, reset_token::ResetToken};
use crate::domain::repository::{IdentityRepository, ResetTokenRepository};
use crate::domain::value_object::{
    credential::StoredCredential, email::Email, identity_role::IdentityRole,
    public_id::PublicId, role_profile::RoleProfile,
};
use crate::error::{AuthError, AuthResult};

const IDENTITY_COLUMNS: &str = r#"
    identity_id,
    public_id,
    email,
    password_hash,
    role,
    profile,
    active,
    verified,
    registered_at,
    last_login_at,
    updated_at
"#;

const RESET_TOKEN_COLUMNS: &str = r#"
    token_id,
    identity_id,
    token_digest,
    created_at,
    expires_at,
    used
"#;

/// PostgreSQL-backed auth repository
#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Whether a database error is a unique constraint violation
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

/// Serialize reset-token writes per identity
async fn lock_identity(tx: &mut Transaction<'_, Postgres>, identity_id: &IdentityId) -> AuthResult<()> {
    sqlx::query_scalar::<_, Uuid>("SELECT identity_id FROM identities WHERE identity_id = $1 FOR UPDATE")
        .bind(identity_id.as_uuid())
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(AuthError::IdentityNotFound)?;
    Ok(())
}

async fn invalidate_outstanding(
    tx: &mut Transaction<'_, Postgres>,
    identity_id: &IdentityId,
) -> AuthResult<u64> {
    let invalidated = sqlx::query(
        "UPDATE password_reset_tokens SET used = TRUE WHERE identity_id = $1 AND used = FALSE",
    )
    .bind(identity_id.as_uuid())
    .execute(&mut **tx)
    .await?
    .rows_affected();
    Ok(invalidated)
}

// ============================================================================
// Identity Repository Implementation
// ============================================================================

impl IdentityRepository for PgAuthRepository {
    async fn create(&self, identity: &Identity) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO identities (
                identity_id,
                public_id,
                email,
                password_hash,
                role,
                profile,
                active,
                verified,
                registered_at,
                last_login_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(identity.id.as_uuid())
        .bind(identity.public_id.as_str())
        .bind(identity.email.as_str())
        .bind(identity.credential.as_phc_string())
        .bind(identity.role().id())
        .bind(Json(&identity.profile))
        .bind(identity.active)
        .bind(identity.verified)
        .bind(identity.registered_at)
        .bind(identity.last_login_at)
        .bind(identity.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AuthError::EmailTaken
            } else {
                AuthError::Database(e)
            }
        })?;

        Ok(())
    }

    async fn update(&self, identity: &Identity) -> AuthResult<()> {
        // role is immutable after creation; password_hash only changes in redeem
        let updated = sqlx::query(
            r#"
            UPDATE identities SET
                email = $2,
                profile = $3,
                active = $4,
                verified = $5,
                last_login_at = $6,
                updated_at = $7
            WHERE identity_id = $1
            "#,
        )
        .bind(identity.id.as_uuid())
        .bind(identity.email.as_str())
        .bind(Json(&identity.profile))
        .bind(identity.active)
        .bind(identity.verified)
        .bind(identity.last_login_at)
        .bind(identity.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AuthError::EmailTaken
            } else {
                AuthError::Database(e)
            }
        })?
        .rows_affected();

        if updated == 0 {
            return Err(AuthError::IdentityNotFound);
        }
        Ok(())
    }

    async fn record_login(&self, id: &IdentityId, at: DateTime<Utc>) -> AuthResult<()> {
        let updated = sqlx::query(
            "UPDATE identities SET last_login_at = $2, updated_at = $2 WHERE identity_id = $1",
        )
        .bind(id.as_uuid())
        .bind(at)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(AuthError::IdentityNotFound);
        }
        Ok(())
    }

    async fn find_by_id(&self, id: &IdentityId) -> AuthResult<Option<Identity>> {
        let row = sqlx::query_as::<_, IdentityRow>(&format!(
            "SELECT {IDENTITY_COLUMNS} FROM identities WHERE identity_id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(IdentityRow::into_identity).transpose()
    }

    async fn find_by_public_id(&self, public_id: &PublicId) -> AuthResult<Option<Identity>> {
        let row = sqlx::query_as::<_, IdentityRow>(&format!(
            "SELECT {IDENTITY_COLUMNS} FROM identities WHERE public_id = $1"
        ))
        .bind(public_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(IdentityRow::into_identity).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<Identity>> {
        let row = sqlx::query_as::<_, IdentityRow>(&format!(
            "SELECT {IDENTITY_COLUMNS} FROM identities WHERE lower(email) = lower($1)"
        ))
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(IdentityRow::into_identity).transpose()
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM identities WHERE lower(email) = lower($1))",
        )
        .bind(email.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn count_by_role(&self, role: IdentityRole) -> AuthResult<u64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM identities WHERE role = $1")
            .bind(role.id())
            .fetch_one(&self.pool)
            .await?;

        Ok(count as u64)
    }
}

// ============================================================================
// Reset Token Repository Implementation
// ============================================================================

impl ResetTokenRepository for PgAuthRepository {
    async fn find_by_value(&self, digest: &[u8; 32]) -> AuthResult<Option<ResetToken>> {
        let row = sqlx::query_as::<_, ResetTokenRow>(&format!(
            "SELECT {RESET_TOKEN_COLUMNS} FROM password_reset_tokens WHERE token_digest = $1"
        ))
        .bind(&digest[..])
        .fetch_optional(&self.pool)
        .await?;

        row.map(ResetTokenRow::into_reset_token).transpose()
    }

    async fn issue(&self, token: &ResetToken) -> AuthResult<u64> {
        let mut tx = self.pool.begin().await?;
        lock_identity(&mut tx, &token.identity_id).await?;

        let invalidated = invalidate_outstanding(&mut tx, &token.identity_id).await?;

        sqlx::query(
            r#"
            INSERT INTO password_reset_tokens (
                token_id,
                identity_id,
                token_digest,
                created_at,
                expires_at,
                used
            ) VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(token.id.as_uuid())
        .bind(token.identity_id.as_uuid())
        .bind(&token.token_digest[..])
        .bind(token.created_at)
        .bind(token.expires_at)
        .bind(token.used)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(invalidated)
    }

    async fn redeem(
        &self,
        token: &ResetToken,
        credential: &StoredCredential,
        now: DateTime<Utc>,
    ) -> AuthResult<bool> {
        let mut tx = self.pool.begin().await?;
        lock_identity(&mut tx, &token.identity_id).await?;

        let consumed = sqlx::query(
            r#"
            UPDATE password_reset_tokens SET used = TRUE
            WHERE token_id = $1 AND used = FALSE AND expires_at > $2
            "#,
        )
        .bind(token.id.as_uuid())
        .bind(now)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if consumed == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query(
            "UPDATE identities SET password_hash = $2, updated_at = $3 WHERE identity_id = $1",
        )
        .bind(token.identity_id.as_uuid())
        .bind(credential.as_phc_string())
        .bind(now)
        .execute(&mut *tx)
        .await?;

        invalidate_outstanding(&mut tx, &token.identity_id).await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn invalidate_all_for_identity(&self, identity_id: &IdentityId) -> AuthResult<u64> {
        let mut tx = self.pool.begin().await?;
        lock_identity(&mut tx, identity_id).await?;
        let invalidated = invalidate_outstanding(&mut tx, identity_id).await?;
        tx.commit().await?;
        Ok(invalidated)
    }

    async fn delete_expired_before(&self, cutoff: DateTime<Utc>) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM password_reset_tokens WHERE expires_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }
}

// ============================================================================
// Row Types for sqlx mapping
// ============================================================================

#[derive(sqlx::FromRow)]
struct IdentityRow {
    identity_id: Uuid,
    public_id: String,
    email: String,
    password_hash: String,
    role: i16,
    profile: Json<RoleProfile>,
    active: bool,
    verified: bool,
    registered_at: DateTime<Utc>,
    last_login_at: Option<DateTime<Utc>>,
    updated_at: DateTime<Utc>,
}

impl IdentityRow {
    fn into_identity(self) -> AuthResult<Identity> {
        let public_id = PublicId::parse_str(&self.public_id)
            .map_err(|e| AuthError::Internal(format!("Invalid public_id: {}", e)))?;

        let role = IdentityRole::from_id(self.role)
            .ok_or_else(|| AuthError::Internal(format!("Invalid role id: {}", self.role)))?;

        let Json(profile) = self.profile;
        if profile.role() != role {
            return Err(AuthError::Internal(format!(
                "Profile of identity {} does not match role {}",
                self.identity_id, role
            )));
        }

        Ok(Identity {
            id: IdentityId::from_uuid(self.identity_id),
            public_id,
            email: Email::from_db(self.email),
            credential: StoredCredential::from_phc_string(self.password_hash)?,
            profile,
            active: self.active,
            verified: self.verified,
            registered_at: self.registered_at,
            last_login_at: self.last_login_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ResetTokenRow {
    token_id: Uuid,
    identity_id: Uuid,
    token_digest: Vec<u8>,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    used: bool,
}

impl ResetTokenRow {
    fn into_reset_token(self) -> AuthResult<ResetToken> {
        let token_digest: [u8; 32] = self
            .token_digest
            .try_into()
            .map_err(|_| AuthError::Internal("Invalid reset token digest length".into()))?;

        Ok(ResetToken {
            id: ResetTokenId::from_uuid(self.token_id),
            identity_id: IdentityId::from_uuid(self.identity_id),
            token_digest,
            created_at: self.created_at,
            expires_at: self.expires_at,
            used: self.used,
        })
    }
}
