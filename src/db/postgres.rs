use crate::config::{PoolConfig, PostgresConfig};
use crate::db::models::{NewUser, RoleRecord, UserChanges, UserRecord};
use crate::db::schema::{MIGRATIONS, MIGRATIONS_TABLE};
use crate::error::ApiError;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::{Pool, Postgres};
use std::str::FromStr;
use std::time::Duration;
use tracing::{error, info};

pub type PgPool = Pool<Postgres>;

const USER_COLUMNS: &str = "id, username, email, full_name, hashed_password, \
     is_active, is_superuser, created_at, updated_at, bio";

#[derive(Clone)]
pub struct UserStorage {
    pool: PgPool,
}

impl UserStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Build a lazily-connecting pool from configuration. No connection is
    /// opened until the first query runs.
    pub fn connect_lazy(pg: &PostgresConfig, pool: &PoolConfig) -> Result<Self, ApiError> {
        let sslmode = PgSslMode::from_str(pg.effective_sslmode())
            .map_err(|e| ApiError::Internal(format!("invalid sslmode: {e}")))?;

        let mut opts = PgConnectOptions::new()
            .host(&pg.host)
            .port(pg.port)
            .database(&pg.db_name)
            .ssl_mode(sslmode);
        if let Some(user) = pg.username.as_deref() {
            opts = opts.username(user);
        }
        if let Some(pass) = pg.password.as_deref() {
            opts = opts.password(pass);
        }

        let pool = PgPoolOptions::new()
            .min_connections(pool.min_connections)
            .max_connections(pool.max_connections)
            .acquire_timeout(Duration::from_secs(pool.acquire_timeout_secs))
            .connect_lazy_with(opts);
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Apply pending schema migrations, one transaction each. Already
    /// applied versions are skipped via the `_migrations` ledger.
    pub async fn run_migrations(&self) -> Result<(), ApiError> {
        sqlx::raw_sql(MIGRATIONS_TABLE).execute(&self.pool).await?;

        let applied: Vec<i64> = sqlx::query_scalar("SELECT version FROM _migrations")
            .fetch_all(&self.pool)
            .await?;

        for m in MIGRATIONS {
            if applied.contains(&m.version) {
                continue;
            }
            let mut tx = self.pool.begin().await?;
            sqlx::raw_sql(m.sql)
                .execute(&mut *tx)
                .await
                .map_err(|e| ApiError::Migration {
                    version: m.version,
                    reason: e.to_string(),
                })?;
            sqlx::query("INSERT INTO _migrations (version, name) VALUES ($1, $2)")
                .bind(m.version)
                .bind(m.name)
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;
            info!(version = m.version, name = m.name, "applied migration");
        }
        Ok(())
    }

    /// Pool liveness probe: `SELECT 1` on a pooled connection.
    pub async fn health_check(&self) -> Result<(), ApiError> {
        let one: i32 = sqlx::query_scalar("SELECT 1").fetch_one(&self.pool).await?;
        if one != 1 {
            error!("health probe returned unexpected value");
            return Err(ApiError::Internal("health probe mismatch".to_string()));
        }
        Ok(())
    }

    pub async fn insert_user(&self, user: NewUser) -> Result<UserRecord, ApiError> {
        let sql = format!(
            r#"INSERT INTO users (username, email, full_name, hashed_password, is_superuser, bio)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING {USER_COLUMNS}"#
        );
        sqlx::query_as::<_, UserRecord>(&sql)
            .bind(user.username)
            .bind(user.email)
            .bind(user.full_name)
            .bind(user.hashed_password)
            .bind(user.is_superuser)
            .bind(user.bio)
            .fetch_one(&self.pool)
            .await
            .map_err(map_constraint_err)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<UserRecord>, ApiError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        Ok(sqlx::query_as::<_, UserRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<UserRecord>, ApiError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");
        Ok(sqlx::query_as::<_, UserRecord>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?)
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<UserRecord>, ApiError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        Ok(sqlx::query_as::<_, UserRecord>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    pub async fn list_users(&self, limit: i64, offset: i64) -> Result<Vec<UserRecord>, ApiError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY id LIMIT $1 OFFSET $2");
        Ok(sqlx::query_as::<_, UserRecord>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?)
    }

    pub async fn count_users(&self) -> Result<i64, ApiError> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?)
    }

    /// Partial update; unset fields keep their current value. `updated_at`
    /// is touched on every call. Returns `None` when the id is unknown.
    pub async fn update_user(
        &self,
        id: i64,
        changes: UserChanges,
    ) -> Result<Option<UserRecord>, ApiError> {
        let sql = format!(
            r#"UPDATE users SET
                email = COALESCE($2, email),
                full_name = COALESCE($3, full_name),
                hashed_password = COALESCE($4, hashed_password),
                is_active = COALESCE($5, is_active),
                is_superuser = COALESCE($6, is_superuser),
                bio = COALESCE($7, bio),
                updated_at = now()
              WHERE id = $1
              RETURNING {USER_COLUMNS}"#
        );
        sqlx::query_as::<_, UserRecord>(&sql)
            .bind(id)
            .bind(changes.email)
            .bind(changes.full_name)
            .bind(changes.hashed_password)
            .bind(changes.is_active)
            .bind(changes.is_superuser)
            .bind(changes.bio)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_constraint_err)
    }

    /// Soft activation toggle. Returns false when the id is unknown.
    pub async fn set_active(&self, id: i64, active: bool) -> Result<bool, ApiError> {
        let result = sqlx::query("UPDATE users SET is_active = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(active)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Upsert by unique role name.
    pub async fn upsert_role(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<RoleRecord, ApiError> {
        Ok(sqlx::query_as::<_, RoleRecord>(
            r#"INSERT INTO roles (name, description) VALUES ($1, $2)
               ON CONFLICT (name) DO UPDATE SET description = excluded.description
               RETURNING id, name, description"#,
        )
        .bind(name)
        .bind(description)
        .fetch_one(&self.pool)
        .await?)
    }

    pub async fn list_roles(&self) -> Result<Vec<RoleRecord>, ApiError> {
        Ok(
            sqlx::query_as::<_, RoleRecord>(
                "SELECT id, name, description FROM roles ORDER BY name",
            )
            .fetch_all(&self.pool)
            .await?,
        )
    }
}

/// Map unique-constraint violations to a 409 with the offending field.
fn map_constraint_err(e: sqlx::Error) -> ApiError {
    if let sqlx::Error::Database(db) = &e
        && db.is_unique_violation()
    {
        let constraint = db.constraint().unwrap_or_default();
        let field = if constraint.contains("email") {
            "email"
        } else {
            "username"
        };
        return ApiError::Conflict { field };
    }
    ApiError::Database(e)
}
