use async_trait::async_trait;
use derive_new::new;
use kernel::model::comment::{event::CreateComment, Comment};
use kernel::model::id::{CommentId, ItemId, UserId};
use kernel::repository::comment::CommentRepository;
use shared::error::{AppError, AppResult};

use crate::database::{model::comment::CommentRow, ConnectionPool};

#[derive(new)]
pub struct CommentRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl CommentRepository for CommentRepositoryImpl {
    async fn create(&self, event: CreateComment) -> AppResult<Comment> {
        let comment_id = CommentId::new();
        let res = sqlx::query!(
            r#"
                INSERT INTO comments (comment_id, item_id, commented_by, comment_text)
                VALUES ($1, $2, $3, $4)
            "#,
            comment_id as _,
            event.item_id as _,
            event.commented_by as _,
            event.comment_text,
        )
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No comment record has been created".into(),
            ));
        }

        // created_at と投稿者名を含めて読み戻す
        sqlx::query_as!(
            CommentRow,
            r#"
                SELECT
                    c.comment_id AS "comment_id: CommentId",
                    c.item_id AS "item_id: ItemId",
                    c.comment_text,
                    c.commented_by AS "commented_by: UserId",
                    u.user_name AS "user_name!",
                    c.created_at
                FROM comments AS c
                INNER JOIN users AS u ON c.commented_by = u.user_id
                WHERE c.comment_id = $1
            "#,
            comment_id as _,
        )
        .fetch_one(self.db.inner_ref())
        .await
        .map(Comment::from)
        .map_err(AppError::SpecificOperationError)
    }

    async fn find_by_item_ids(&self, item_ids: &[ItemId]) -> AppResult<Vec<Comment>> {
        let ids = item_ids.iter().map(|id| id.raw()).collect::<Vec<_>>();
        let rows = sqlx::query_as!(
            CommentRow,
            r#"
                SELECT
                    c.comment_id AS "comment_id: CommentId",
                    c.item_id AS "item_id: ItemId",
                    c.comment_text,
                    c.commented_by AS "commented_by: UserId",
                    u.user_name AS "user_name!",
                    c.created_at
                FROM comments AS c
                INNER JOIN users AS u ON c.commented_by = u.user_id
                WHERE c.item_id = ANY($1)
                ORDER BY c.created_at DESC
            "#,
            &ids,
        )
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(rows.into_iter().map(Comment::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn register_user(pool: &sqlx::PgPool, name: &str, email: &str) -> anyhow::Result<UserId> {
        let user_id = UserId::new();
        sqlx::query!(
            "INSERT INTO users (user_id, user_name, email) VALUES ($1, $2, $3)",
            user_id as _,
            name,
            email,
        )
        .execute(pool)
        .await?;
        Ok(user_id)
    }

    async fn register_item(pool: &sqlx::PgPool, owned_by: UserId) -> anyhow::Result<ItemId> {
        let item_id = ItemId::new();
        sqlx::query!(
            r#"
                INSERT INTO items (item_id, item_name, description, is_available, owned_by)
                VALUES ($1, 'Drill', 'test', TRUE, $2)
            "#,
            item_id as _,
            owned_by as _,
        )
        .execute(pool)
        .await?;
        Ok(item_id)
    }

    #[sqlx::test]
    async fn create_resolves_author_name(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = CommentRepositoryImpl::new(ConnectionPool::new(pool.clone()));
        let owner = register_user(&pool, "owner", "owner@example.com").await?;
        let booker = register_user(&pool, "booker", "booker@example.com").await?;
        let item_id = register_item(&pool, owner).await?;

        let comment = repo
            .create(CreateComment::new(item_id, booker, "works great".into()))
            .await?;

        assert_eq!(comment.item_id, item_id);
        assert_eq!(comment.author.user_id, booker);
        assert_eq!(comment.author.user_name, "booker");
        assert_eq!(comment.comment_text, "works great");

        Ok(())
    }

    #[sqlx::test]
    async fn batch_fetch_groups_newest_first(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = CommentRepositoryImpl::new(ConnectionPool::new(pool.clone()));
        let owner = register_user(&pool, "owner", "owner@example.com").await?;
        let booker = register_user(&pool, "booker", "booker@example.com").await?;
        let item_a = register_item(&pool, owner).await?;
        let item_b = register_item(&pool, owner).await?;

        let older = repo
            .create(CreateComment::new(item_a, booker, "first".into()))
            .await?;
        let newer = repo
            .create(CreateComment::new(item_a, booker, "second".into()))
            .await?;
        repo.create(CreateComment::new(item_b, booker, "other item".into()))
            .await?;

        let found = repo.find_by_item_ids(&[item_a]).await?;
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].comment_id, newer.comment_id);
        assert_eq!(found[1].comment_id, older.comment_id);

        let found = repo.find_by_item_ids(&[item_a, item_b]).await?;
        assert_eq!(found.len(), 3);

        Ok(())
    }
}
