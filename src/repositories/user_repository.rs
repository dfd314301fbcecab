//! User repository for all MySQL operations on `pd_users`.

use log::debug;
use sqlx::{MySql, MySqlPool, QueryBuilder};

use crate::errors::ApiError;
use crate::models::{Pagination, User, UserStatus};
use crate::repositories::like_pattern;

const USER_COLUMNS: &str = "id, name, account, password_hash, role, phone, email, status, created_at, updated_at";

/// Fields a user update may change; `None` leaves the column alone.
#[derive(Debug, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub role: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.role.is_none() && self.phone.is_none() && self.email.is_none()
    }
}

/// Repository for user-related database operations.
#[derive(Clone)]
pub struct UserRepository {
    pool: MySqlPool,
}

impl UserRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Insert a new user and return its id.
    pub async fn insert(
        &self,
        name: &str,
        account: &str,
        password_hash: &str,
        role: &str,
        phone: Option<&str>,
        email: Option<&str>,
    ) -> Result<i64, ApiError> {
        let result = sqlx::query(
            r#"
            INSERT INTO pd_users (name, account, password_hash, role, phone, email, status)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(name)
        .bind(account)
        .bind(password_hash)
        .bind(role)
        .bind(phone)
        .bind(email)
        .bind(UserStatus::Normal.as_i8())
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_id() as i64)
    }

    /// Find a user that has not been deleted.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, ApiError> {
        debug!("Repository: Finding user by ID: {}", id);
        let sql = format!("SELECT {} FROM pd_users WHERE id = ? AND status != ?", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(UserStatus::Deleted.as_i8())
            .fetch_optional(&self.pool)
            .await?)
    }

    /// Find a login candidate; deleted accounts are invisible.
    pub async fn find_by_account(&self, account: &str) -> Result<Option<User>, ApiError> {
        let sql = format!(
            "SELECT {} FROM pd_users WHERE account = ? AND status != ?",
            USER_COLUMNS
        );
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(account)
            .bind(UserStatus::Deleted.as_i8())
            .fetch_optional(&self.pool)
            .await?)
    }

    /// Accounts stay reserved after soft deletion.
    pub async fn account_exists(&self, account: &str) -> Result<bool, ApiError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pd_users WHERE account = ?")
            .bind(account)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    /// Whether a non-deleted user other than `exclude_id` uses this phone.
    pub async fn phone_in_use(&self, phone: &str, exclude_id: Option<i64>) -> Result<bool, ApiError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM pd_users WHERE phone = ? AND status != ? AND id != ?",
        )
        .bind(phone)
        .bind(UserStatus::Deleted.as_i8())
        .bind(exclude_id.unwrap_or(0))
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }

    /// Non-deleted users, newest first.
    pub async fn list(
        &self,
        role: Option<&str>,
        keyword: Option<&str>,
        pagination: Pagination,
    ) -> Result<(Vec<User>, u64), ApiError> {
        fn push_filters(qb: &mut QueryBuilder<'_, MySql>, role: Option<&str>, keyword: Option<&str>) {
            qb.push(" WHERE status != ").push_bind(UserStatus::Deleted.as_i8());
            if let Some(role) = role.filter(|r| !r.trim().is_empty()) {
                qb.push(" AND role = ").push_bind(role.trim().to_string());
            }
            if let Some(keyword) = keyword.map(str::trim).filter(|k| !k.is_empty()) {
                qb.push(" AND (name LIKE ")
                    .push_bind(like_pattern(keyword))
                    .push(" OR account LIKE ")
                    .push_bind(like_pattern(keyword))
                    .push(")");
            }
        }

        let mut count_qb = QueryBuilder::<MySql>::new("SELECT COUNT(*) FROM pd_users");
        push_filters(&mut count_qb, role, keyword);
        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::<MySql>::new(format!("SELECT {} FROM pd_users", USER_COLUMNS));
        push_filters(&mut qb, role, keyword);
        qb.push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(pagination.limit())
            .push(" OFFSET ")
            .push_bind(pagination.offset());
        let users = qb.build_query_as::<User>().fetch_all(&self.pool).await?;

        Ok((users, total as u64))
    }

    /// Apply the given changes; returns the number of rows affected.
    pub async fn update(&self, id: i64, changes: UserChanges) -> Result<u64, ApiError> {
        if changes.is_empty() {
            return Ok(0);
        }

        let mut qb = QueryBuilder::<MySql>::new("UPDATE pd_users SET ");
        let mut sets = qb.separated(", ");
        if let Some(name) = changes.name {
            sets.push("name = ").push_bind_unseparated(name);
        }
        if let Some(role) = changes.role {
            sets.push("role = ").push_bind_unseparated(role);
        }
        if let Some(phone) = changes.phone {
            sets.push("phone = ").push_bind_unseparated(phone);
        }
        if let Some(email) = changes.email {
            sets.push("email = ").push_bind_unseparated(email);
        }
        qb.push(" WHERE id = ").push_bind(id);

        Ok(qb.build().execute(&self.pool).await?.rows_affected())
    }

    pub async fn update_password(&self, id: i64, password_hash: &str) -> Result<(), ApiError> {
        sqlx::query("UPDATE pd_users SET password_hash = ? WHERE id = ?")
            .bind(password_hash)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn set_status(&self, id: i64, status: UserStatus) -> Result<(), ApiError> {
        sqlx::query("UPDATE pd_users SET status = ? WHERE id = ?")
            .bind(status.as_i8())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
