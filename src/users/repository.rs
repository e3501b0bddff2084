// Database repository for user records

use crate::users::models::{NewUser, Role, User, UserChanges};
use sqlx::{PgPool, QueryBuilder};

const USER_COLUMNS: &str = "id, name, email, phone, password_hash, profile_image, \
     address, state, city, country, pincode, role, created_at, updated_at";

/// User repository for database operations
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new UserRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new user row
    /// A duplicate email surfaces as a unique constraint violation
    pub async fn create(&self, new_user: &NewUser) -> Result<User, sqlx::Error> {
        let sql = format!(
            "INSERT INTO users (name, email, phone, password_hash, address, state, city, country, pincode, role) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {USER_COLUMNS}"
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(&new_user.name)
            .bind(&new_user.email)
            .bind(&new_user.phone)
            .bind(&new_user.password_hash)
            .bind(&new_user.address)
            .bind(&new_user.state)
            .bind(&new_user.city)
            .bind(&new_user.country)
            .bind(&new_user.pincode)
            .bind(new_user.role)
            .fetch_one(&self.pool)
            .await
    }

    /// Find a user by ID
    pub async fn find_by_id(&self, id: i32) -> Result<Option<User>, sqlx::Error> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");

        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Find a user by email (case-insensitive)
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)");

        sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
    }

    /// Find a user by phone number
    pub async fn find_by_phone(&self, phone: &str) -> Result<Option<User>, sqlx::Error> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE phone = $1");

        sqlx::query_as::<_, User>(&sql)
            .bind(phone)
            .fetch_optional(&self.pool)
            .await
    }

    /// Check if an email exists (case-insensitive)
    pub async fn email_exists(&self, email: &str) -> Result<bool, sqlx::Error> {
        let exists: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1))")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists.0)
    }

    /// Apply a partial update to a user, keeping current values for omitted
    /// fields. Runs in a transaction so the read-merge-write is atomic.
    /// Returns `None` when no such user exists.
    pub async fn update(
        &self,
        id: i32,
        changes: UserChanges,
    ) -> Result<Option<User>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let select_sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1 FOR UPDATE");
        let existing = match sqlx::query_as::<_, User>(&select_sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        {
            Some(user) => user,
            None => return Ok(None),
        };

        let update_sql = format!(
            "UPDATE users \
             SET name = $1, phone = $2, address = $3, state = $4, city = $5, \
                 country = $6, pincode = $7, password_hash = $8, role = $9, \
                 updated_at = NOW() \
             WHERE id = $10 \
             RETURNING {USER_COLUMNS}"
        );

        let updated = sqlx::query_as::<_, User>(&update_sql)
            .bind(changes.name.or(existing.name))
            .bind(changes.phone.or(existing.phone))
            .bind(changes.address.or(existing.address))
            .bind(changes.state.or(existing.state))
            .bind(changes.city.or(existing.city))
            .bind(changes.country.or(existing.country))
            .bind(changes.pincode.or(existing.pincode))
            .bind(changes.password_hash.unwrap_or(existing.password_hash))
            .bind(changes.role.unwrap_or(existing.role))
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Some(updated))
    }

    /// Set or clear a user's role
    pub async fn update_role(&self, id: i32, role: Role) -> Result<Option<User>, sqlx::Error> {
        let sql = format!(
            "UPDATE users SET role = $1, updated_at = NOW() WHERE id = $2 RETURNING {USER_COLUMNS}"
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(role)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Set or clear a user's profile image URL
    pub async fn set_profile_image(
        &self,
        id: i32,
        url: Option<&str>,
    ) -> Result<Option<User>, sqlx::Error> {
        let sql = format!(
            "UPDATE users SET profile_image = $1, updated_at = NOW() WHERE id = $2 \
             RETURNING {USER_COLUMNS}"
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(url)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Delete a user row; returns whether a row was removed
    pub async fn delete(&self, id: i32) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List users with optional search and role filters, paginated
    pub async fn list(
        &self,
        search: Option<&str>,
        role: Option<Role>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<User>, sqlx::Error> {
        let mut builder = QueryBuilder::new(format!("SELECT {USER_COLUMNS} FROM users WHERE 1=1"));
        Self::push_filters(&mut builder, search, role);
        builder.push(" ORDER BY id OFFSET ");
        builder.push_bind(offset);
        builder.push(" LIMIT ");
        builder.push_bind(limit);

        builder
            .build_query_as::<User>()
            .fetch_all(&self.pool)
            .await
    }

    /// Count users matching the same filters as [`list`](Self::list)
    pub async fn count(
        &self,
        search: Option<&str>,
        role: Option<Role>,
    ) -> Result<i64, sqlx::Error> {
        let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM users WHERE 1=1");
        Self::push_filters(&mut builder, search, role);

        builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
    }

    fn push_filters(
        builder: &mut QueryBuilder<'_, sqlx::Postgres>,
        search: Option<&str>,
        role: Option<Role>,
    ) {
        if let Some(search) = search {
            let pattern = format!("%{}%", search);
            builder.push(" AND (name ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR email ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR phone ILIKE ");
            builder.push_bind(pattern);
            builder.push(")");
        }

        if let Some(role) = role {
            builder.push(" AND role = ");
            builder.push_bind(role);
        }
    }
}
