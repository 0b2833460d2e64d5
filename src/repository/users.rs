//! Users repository: accounts, groups and the permission union

use sqlx::{Pool, Postgres, Row};

use crate::{
    error::AppResult,
    models::user::{PermissionSet, User},
};

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn get_by_login(&self, login: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, login, password, created_at FROM users WHERE login = $1",
        )
        .bind(login)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn create(&self, login: &str, password_hash: &str) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (login, password)
            VALUES ($1, $2)
            RETURNING id, login, password, created_at
            "#,
        )
        .bind(login)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// A user's effective permissions: the union over all group memberships
    pub async fn permissions_for_user(&self, user_id: i32) -> AppResult<PermissionSet> {
        let rows = sqlx::query(
            r#"
            SELECT DISTINCT p.code
            FROM user_groups ug
            JOIN group_permissions gp ON gp.group_id = ug.group_id
            JOIN permissions p ON p.id = gp.permission_id
            WHERE ug.user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        // Unknown codes in the table are skipped rather than rejected
        Ok(rows
            .iter()
            .filter_map(|r| r.get::<String, _>("code").parse().ok())
            .collect())
    }

    pub async fn group_id_by_name(&self, name: &str) -> AppResult<Option<i32>> {
        let row = sqlx::query("SELECT id FROM groups WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| r.get("id")))
    }

    pub async fn add_to_group(&self, user_id: i32, group_id: i32) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_groups (user_id, group_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(group_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
