use sqlx::PgPool;

use crate::auth::password;
use crate::config::SecurityConfig;
use crate::database::models::{User, UserRole};
use crate::pagination::PageParams;

const USER_COLUMNS: &str = "id, username, email, full_name, hashed_password, role, \
                            is_active, created_at, updated_at, last_login";

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("user not found")]
    NotFound,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("account is disabled")]
    Inactive,
    #[error("{0} '{1}' already taken")]
    Duplicate(&'static str, String),
    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

#[derive(Debug)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub password: String,
    pub role: UserRole,
}

#[derive(Debug, Default)]
pub struct UserChanges {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub password: Option<String>,
    pub role: Option<UserRole>,
}

#[derive(Debug, Default)]
pub struct UserFilter {
    pub role: Option<UserRole>,
    pub search: Option<String>,
}

pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn register(
        &self,
        new_user: NewUser,
        security: &SecurityConfig,
    ) -> Result<User, UserError> {
        if self.username_taken(&new_user.username).await? {
            return Err(UserError::Duplicate("username", new_user.username));
        }
        if self.email_taken(&new_user.email).await? {
            return Err(UserError::Duplicate("email", new_user.email));
        }

        let hashed = password::hash_password(&new_user.password, security.bcrypt_cost)?;

        let sql = format!(
            "INSERT INTO users (username, email, full_name, hashed_password, role) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {USER_COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(&new_user.username)
            .bind(&new_user.email)
            .bind(&new_user.full_name)
            .bind(&hashed)
            .bind(new_user.role)
            .fetch_one(&self.pool)
            .await?;

        tracing::info!("registered user {} ({})", user.username, user.id);
        Ok(user)
    }

    /// Verify credentials and stamp `last_login`. A missing user and a wrong
    /// password are indistinguishable to the caller.
    pub async fn authenticate(&self, username: &str, pass: &str) -> Result<User, UserError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(UserError::InvalidCredentials)?;

        if !password::verify_password(pass, &user.hashed_password)? {
            return Err(UserError::InvalidCredentials);
        }
        if !user.is_active {
            return Err(UserError::Inactive);
        }

        let sql = format!(
            "UPDATE users SET last_login = NOW() WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(user.id)
            .fetch_one(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn get(&self, id: i32) -> Result<User, UserError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND is_active = TRUE");
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(UserError::NotFound)
    }

    pub async fn list(
        &self,
        params: PageParams,
        filter: &UserFilter,
    ) -> Result<(Vec<User>, i64), UserError> {
        let where_clause = "WHERE is_active = TRUE \
             AND ($1::text IS NULL OR role = $1) \
             AND ($2::text IS NULL OR username ILIKE '%' || $2 || '%' \
                                   OR email ILIKE '%' || $2 || '%')";
        let role = filter.role.map(|r| r.as_str());

        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users {where_clause} \
             ORDER BY created_at DESC LIMIT $3 OFFSET $4"
        );
        let users = sqlx::query_as::<_, User>(&sql)
            .bind(role)
            .bind(&filter.search)
            .bind(params.size)
            .bind(params.offset())
            .fetch_all(&self.pool)
            .await?;

        let sql = format!("SELECT COUNT(*) FROM users {where_clause}");
        let (total,): (i64,) = sqlx::query_as(&sql)
            .bind(role)
            .bind(&filter.search)
            .fetch_one(&self.pool)
            .await?;

        Ok((users, total))
    }

    pub async fn update(
        &self,
        id: i32,
        changes: UserChanges,
        security: &SecurityConfig,
    ) -> Result<User, UserError> {
        let current = self.get(id).await?;

        if let Some(ref email) = changes.email {
            if *email != current.email && self.email_taken(email).await? {
                return Err(UserError::Duplicate("email", email.clone()));
            }
        }

        let hashed = match changes.password {
            Some(ref p) => Some(password::hash_password(p, security.bcrypt_cost)?),
            None => None,
        };

        let sql = format!(
            "UPDATE users SET \
                email = COALESCE($2, email), \
                full_name = COALESCE($3, full_name), \
                role = COALESCE($4, role), \
                hashed_password = COALESCE($5, hashed_password), \
                updated_at = NOW() \
             WHERE id = $1 AND is_active = TRUE RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(&changes.email)
            .bind(&changes.full_name)
            .bind(changes.role)
            .bind(&hashed)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(UserError::NotFound)
    }

    pub async fn soft_delete(&self, id: i32) -> Result<(), UserError> {
        let result =
            sqlx::query("UPDATE users SET is_active = FALSE, updated_at = NOW() \
                         WHERE id = $1 AND is_active = TRUE")
                .bind(id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(UserError::NotFound);
        }
        Ok(())
    }

    async fn username_taken(&self, username: &str) -> Result<bool, UserError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM users WHERE username = $1")
                .bind(username)
                .fetch_one(&self.pool)
                .await?;
        Ok(count > 0)
    }

    async fn email_taken(&self, email: &str) -> Result<bool, UserError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE email = $1")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }
}
