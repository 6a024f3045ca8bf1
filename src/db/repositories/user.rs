use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait, sea_query::Expr,
};
use serde::Serialize;
use std::collections::HashMap;
use tokio::task;

use crate::config::SecurityConfig;
use crate::db::now_timestamp;
use crate::entities::{downloads, favorites, history, playlists, prelude::*, users};

/// User data returned from repository (without sensitive password hash)
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub is_admin: bool,
    pub created_at: String,
    pub last_login: Option<String>,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            is_admin: model.is_admin,
            created_at: model.created_at,
            last_login: model.last_login,
        }
    }
}

/// User row with its download count, as listed on the admin panel.
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    #[serde(flatten)]
    pub user: User,
    pub download_count: u64,
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<User>> {
        let user = Users::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")?;

        Ok(user.map(User::from))
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = Users::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query user by email")?;

        Ok(user.map(User::from))
    }

    pub async fn username_exists(&self, username: &str) -> Result<bool> {
        let count = Users::find()
            .filter(users::Column::Username.eq(username))
            .count(&self.conn)
            .await
            .context("Failed to check username")?;

        Ok(count > 0)
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let count = Users::find()
            .filter(users::Column::Email.eq(email))
            .count(&self.conn)
            .await
            .context("Failed to check email")?;

        Ok(count > 0)
    }

    /// Inserts a user, hashing the password off the async runtime.
    pub async fn create(
        &self,
        username: &str,
        email: &str,
        password: &str,
        is_admin: bool,
        security: &SecurityConfig,
    ) -> Result<User> {
        let password = password.to_string();
        let security = security.clone();
        let password_hash = task::spawn_blocking(move || hash_password(&password, Some(&security)))
            .await
            .context("Password hashing task panicked")??;

        let active = users::ActiveModel {
            username: Set(username.to_string()),
            email: Set(email.to_string()),
            password_hash: Set(password_hash),
            is_admin: Set(is_admin),
            created_at: Set(now_timestamp()),
            last_login: Set(None),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert user")?;

        Ok(User::from(model))
    }

    /// Verify credentials by email; returns the user on success.
    /// Note: This uses `spawn_blocking` because Argon2 hashing is CPU-intensive
    /// and would block the async runtime if run directly.
    pub async fn verify_credentials(&self, email: &str, password: &str) -> Result<Option<User>> {
        let user = Users::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query user for password verification")?;

        let Some(user) = user else {
            return Ok(None);
        };

        if verify_hash(user.password_hash.clone(), password).await? {
            Ok(Some(User::from(user)))
        } else {
            Ok(None)
        }
    }

    pub async fn verify_password_by_id(&self, id: i32, password: &str) -> Result<bool> {
        let user = Users::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user for password verification")?;

        match user {
            Some(user) => verify_hash(user.password_hash, password).await,
            None => Ok(false),
        }
    }

    pub async fn update_password(
        &self,
        id: i32,
        new_password: &str,
        security: &SecurityConfig,
    ) -> Result<()> {
        let user = Users::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user for password update")?
            .ok_or_else(|| anyhow::anyhow!("User not found: {id}"))?;

        let password = new_password.to_string();
        let security = security.clone();
        let new_hash = task::spawn_blocking(move || hash_password(&password, Some(&security)))
            .await
            .context("Password hashing task panicked")??;

        let mut active: users::ActiveModel = user.into();
        active.password_hash = Set(new_hash);
        active.update(&self.conn).await?;

        Ok(())
    }

    pub async fn touch_last_login(&self, id: i32) -> Result<()> {
        Users::update_many()
            .col_expr(users::Column::LastLogin, Expr::value(now_timestamp()))
            .filter(users::Column::Id.eq(id))
            .exec(&self.conn)
            .await
            .context("Failed to update last login")?;
        Ok(())
    }

    pub async fn set_admin(&self, id: i32, is_admin: bool) -> Result<bool> {
        let result = Users::update_many()
            .col_expr(users::Column::IsAdmin, Expr::value(is_admin))
            .filter(users::Column::Id.eq(id))
            .exec(&self.conn)
            .await
            .context("Failed to update admin flag")?;
        Ok(result.rows_affected > 0)
    }

    pub async fn list_with_download_counts(&self) -> Result<Vec<UserSummary>> {
        let rows = Users::find()
            .order_by_desc(users::Column::CreatedAt)
            .order_by_desc(users::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list users")?;

        let counts: Vec<(i32, i64)> = Downloads::find()
            .select_only()
            .column(downloads::Column::UserId)
            .column_as(Expr::col(downloads::Column::Id).count(), "count")
            .group_by(downloads::Column::UserId)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to count downloads per user")?;

        let counts: HashMap<i32, u64> = counts
            .into_iter()
            .map(|(user_id, count)| (user_id, u64::try_from(count).unwrap_or(0)))
            .collect();

        Ok(rows
            .into_iter()
            .map(|model| {
                let download_count = counts.get(&model.id).copied().unwrap_or(0);
                UserSummary {
                    user: User::from(model),
                    download_count,
                }
            })
            .collect())
    }

    /// Deletes a user and every record they own in one transaction.
    /// Returns `false` when the user does not exist.
    pub async fn delete_cascade(&self, id: i32) -> Result<bool> {
        let txn = self.conn.begin().await?;

        Downloads::delete_many()
            .filter(downloads::Column::UserId.eq(id))
            .exec(&txn)
            .await?;
        History::delete_many()
            .filter(history::Column::UserId.eq(id))
            .exec(&txn)
            .await?;
        Favorites::delete_many()
            .filter(favorites::Column::UserId.eq(id))
            .exec(&txn)
            .await?;
        Playlists::delete_many()
            .filter(playlists::Column::UserId.eq(id))
            .exec(&txn)
            .await?;
        let result = Users::delete_by_id(id).exec(&txn).await?;

        txn.commit().await.context("Failed to commit user deletion")?;

        Ok(result.rows_affected > 0)
    }

    pub async fn count(&self) -> Result<u64> {
        Ok(Users::find().count(&self.conn).await?)
    }

    pub async fn count_admins(&self) -> Result<u64> {
        Ok(Users::find()
            .filter(users::Column::IsAdmin.eq(true))
            .count(&self.conn)
            .await?)
    }
}

async fn verify_hash(password_hash: String, password: &str) -> Result<bool> {
    let password = password.to_string();

    // Run CPU-intensive password verification in a blocking task
    task::spawn_blocking(move || {
        let parsed_hash = PasswordHash::new(&password_hash)
            .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

        Ok::<bool, anyhow::Error>(
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed_hash)
                .is_ok(),
        )
    })
    .await
    .context("Password verification task panicked")?
}

/// Hash a password using Argon2id with optional custom params.
/// If config is None, uses the library default params.
pub fn hash_password(password: &str, config: Option<&SecurityConfig>) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let argon2 = if let Some(cfg) = config {
        let params = Params::new(
            cfg.argon2_memory_cost_kib,
            cfg.argon2_time_cost,
            cfg.argon2_parallelism,
            None,
        )
        .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    } else {
        Argon2::default()
    };

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_round_trips_through_verify() {
        let hash = hash_password("segredo123", Some(&SecurityConfig::default())).unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_hash(hash.clone(), "segredo123").await.unwrap());
        assert!(!verify_hash(hash, "errado").await.unwrap());
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("same", None).unwrap();
        let b = hash_password("same", None).unwrap();
        assert_ne!(a, b);
    }
}
