use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::principal::models::Principal;
use crate::domain::principal::models::PrincipalId;
use crate::domain::principal::models::Profile;
use crate::domain::principal::models::Subject;
use crate::domain::principal::ports::PrincipalRepository;
use crate::principal::errors::PrincipalError;

const SUBJECT_UNIQUE_CONSTRAINT: &str = "principals_subject_key";

pub struct PostgresPrincipalRepository {
    pool: PgPool,
}

impl PostgresPrincipalRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PrincipalRow {
    id: Uuid,
    subject: String,
    credential_digest: String,
    first_name: String,
    last_name: String,
    role: String,
    enabled: bool,
    account_locked: bool,
    credentials_expired: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PrincipalRow> for Principal {
    type Error = PrincipalError;

    fn try_from(row: PrincipalRow) -> Result<Self, Self::Error> {
        Ok(Principal {
            id: PrincipalId(row.id),
            subject: Subject::new(row.subject)?,
            credential_digest: row.credential_digest,
            profile: Profile {
                first_name: row.first_name,
                last_name: row.last_name,
            },
            role: row.role.parse()?,
            enabled: row.enabled,
            account_locked: row.account_locked,
            credentials_expired: row.credentials_expired,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl PrincipalRepository for PostgresPrincipalRepository {
    async fn find_by_subject(&self, subject: &Subject) -> Result<Option<Principal>, PrincipalError> {
        let row = sqlx::query_as::<_, PrincipalRow>(
            r#"
            SELECT id, subject, credential_digest, first_name, last_name, role,
                   enabled, account_locked, credentials_expired, created_at, updated_at
            FROM principals
            WHERE subject = $1
            "#,
        )
        .bind(subject.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| PrincipalError::DatabaseError(e.to_string()))?;

        row.map(Principal::try_from).transpose()
    }

    async fn exists_by_subject(&self, subject: &Subject) -> Result<bool, PrincipalError> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM principals WHERE subject = $1)
            "#,
        )
        .bind(subject.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| PrincipalError::DatabaseError(e.to_string()))
    }

    async fn save(&self, principal: Principal) -> Result<Principal, PrincipalError> {
        sqlx::query(
            r#"
            INSERT INTO principals (
                id, subject, credential_digest, first_name, last_name, role,
                enabled, account_locked, credentials_expired, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (id) DO UPDATE SET
                subject = EXCLUDED.subject,
                credential_digest = EXCLUDED.credential_digest,
                first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                role = EXCLUDED.role,
                enabled = EXCLUDED.enabled,
                account_locked = EXCLUDED.account_locked,
                credentials_expired = EXCLUDED.credentials_expired,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(principal.id.0)
        .bind(principal.subject.as_str())
        .bind(&principal.credential_digest)
        .bind(&principal.profile.first_name)
        .bind(&principal.profile.last_name)
        .bind(principal.role.as_str())
        .bind(principal.enabled)
        .bind(principal.account_locked)
        .bind(principal.credentials_expired)
        .bind(principal.created_at)
        .bind(principal.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation()
                    && db_err.constraint() == Some(SUBJECT_UNIQUE_CONSTRAINT)
                {
                    return PrincipalError::DuplicateSubject(principal.subject.as_str().to_string());
                }
            }
            PrincipalError::DatabaseError(e.to_string())
        })?;

        Ok(principal)
    }
}
