use async_trait::async_trait;
use derive_new::new;
use kernel::model::id::UserId;
use kernel::model::user::{
    event::{CreateUser, UpdateUser},
    User,
};
use kernel::repository::user::UserRepository;
use shared::error::{AppError, AppResult};

use crate::database::{model::user::UserRow, ConnectionPool};

#[derive(new)]
pub struct UserRepositoryImpl {
    db: ConnectionPool,
}

// email の一意制約違反は 409 として返す
fn map_user_write_error(e: sqlx::Error) -> AppError {
    match e {
        sqlx::Error::Database(ref de) if de.is_unique_violation() => {
            AppError::ConflictError("email is already in use".into())
        }
        e => AppError::SpecificOperationError(e),
    }
}

#[async_trait]
impl UserRepository for UserRepositoryImpl {
    async fn create(&self, event: CreateUser) -> AppResult<User> {
        let user_id = UserId::new();
        let res = sqlx::query!(
            r#"
                INSERT INTO users (user_id, user_name, email)
                VALUES ($1, $2, $3)
            "#,
            user_id as _,
            event.user_name,
            event.email,
        )
        .execute(self.db.inner_ref())
        .await
        .map_err(map_user_write_error)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No user record has been created".into(),
            ));
        }

        Ok(User {
            user_id,
            user_name: event.user_name,
            email: event.email,
        })
    }

    async fn update(&self, event: UpdateUser) -> AppResult<User> {
        // 未指定のフィールドは現在値を維持する
        let res = sqlx::query!(
            r#"
                UPDATE users
                SET
                    user_name = COALESCE($2, user_name),
                    email = COALESCE($3, email),
                    updated_at = CURRENT_TIMESTAMP
                WHERE user_id = $1
            "#,
            event.user_id as _,
            event.user_name,
            event.email,
        )
        .execute(self.db.inner_ref())
        .await
        .map_err(map_user_write_error)?;

        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound(format!(
                "user ({}) not found",
                event.user_id
            )));
        }

        let user = self.find_by_id(event.user_id).await?;
        user.ok_or_else(|| AppError::EntityNotFound(format!("user ({}) not found", event.user_id)))
    }

    async fn delete(&self, user_id: UserId) -> AppResult<()> {
        let res = sqlx::query!(
            r#"
                DELETE FROM users
                WHERE user_id = $1
            "#,
            user_id as _,
        )
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound(format!(
                "user ({user_id}) not found"
            )));
        }

        Ok(())
    }

    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<User>> {
        let row = sqlx::query_as!(
            UserRow,
            r#"
                SELECT
                    user_id AS "user_id: UserId",
                    user_name,
                    email
                FROM users
                WHERE user_id = $1
            "#,
            user_id as _,
        )
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(row.map(User::from))
    }

    async fn find_all(&self) -> AppResult<Vec<User>> {
        let rows = sqlx::query_as!(
            UserRow,
            r#"
                SELECT
                    user_id AS "user_id: UserId",
                    user_name,
                    email
                FROM users
                ORDER BY created_at ASC
            "#,
        )
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn exists_by_id(&self, user_id: UserId) -> AppResult<bool> {
        let row = sqlx::query!(
            r#"
                SELECT EXISTS (
                    SELECT 1 FROM users WHERE user_id = $1
                ) AS "exists!"
            "#,
            user_id as _,
        )
        .fetch_one(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(row.exists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test]
    async fn create_and_fetch_user(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = UserRepositoryImpl::new(ConnectionPool::new(pool));

        let user = repo
            .create(CreateUser::new("alice".into(), "alice@example.com".into()))
            .await?;

        let found = repo.find_by_id(user.user_id).await?;
        assert_eq!(found.map(|u| u.email), Some("alice@example.com".into()));
        assert!(repo.exists_by_id(user.user_id).await?);
        assert!(!repo.exists_by_id(UserId::new()).await?);

        Ok(())
    }

    #[sqlx::test]
    async fn duplicate_email_conflicts(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = UserRepositoryImpl::new(ConnectionPool::new(pool));

        repo.create(CreateUser::new("alice".into(), "alice@example.com".into()))
            .await?;
        let res = repo
            .create(CreateUser::new("bob".into(), "alice@example.com".into()))
            .await;
        assert!(matches!(res, Err(AppError::ConflictError(_))));

        Ok(())
    }

    #[sqlx::test]
    async fn partial_update_keeps_unspecified_fields(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = UserRepositoryImpl::new(ConnectionPool::new(pool));

        let user = repo
            .create(CreateUser::new("alice".into(), "alice@example.com".into()))
            .await?;

        let updated = repo
            .update(UpdateUser::new(user.user_id, Some("alicia".into()), None))
            .await?;
        assert_eq!(updated.user_name, "alicia");
        assert_eq!(updated.email, "alice@example.com");

        Ok(())
    }

    #[sqlx::test]
    async fn update_and_delete_unknown_user_fail(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = UserRepositoryImpl::new(ConnectionPool::new(pool));

        let res = repo
            .update(UpdateUser::new(UserId::new(), Some("ghost".into()), None))
            .await;
        assert!(matches!(res, Err(AppError::EntityNotFound(_))));

        let res = repo.delete(UserId::new()).await;
        assert!(matches!(res, Err(AppError::EntityNotFound(_))));

        Ok(())
    }
}
