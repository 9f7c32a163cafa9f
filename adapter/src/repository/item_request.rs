use async_trait::async_trait;
use derive_new::new;
use kernel::model::id::{RequestId, UserId};
use kernel::model::item_request::{event::CreateItemRequest, ItemRequest};
use kernel::model::list::PageQuery;
use kernel::repository::item_request::ItemRequestRepository;
use shared::error::{AppError, AppResult};

use crate::database::{model::item_request::ItemRequestRow, ConnectionPool};

#[derive(new)]
pub struct ItemRequestRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl ItemRequestRepository for ItemRequestRepositoryImpl {
    async fn create(&self, event: CreateItemRequest) -> AppResult<ItemRequest> {
        let request_id = RequestId::new();
        let res = sqlx::query!(
            r#"
                INSERT INTO item_requests (request_id, description, requested_by)
                VALUES ($1, $2, $3)
            "#,
            request_id as _,
            event.description,
            event.requested_by as _,
        )
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No item request record has been created".into(),
            ));
        }

        let request = self.find_by_id(request_id).await?;
        request
            .ok_or_else(|| AppError::EntityNotFound(format!("item request ({request_id}) not found")))
    }

    async fn find_by_id(&self, request_id: RequestId) -> AppResult<Option<ItemRequest>> {
        let row = sqlx::query_as!(
            ItemRequestRow,
            r#"
                SELECT
                    request_id AS "request_id: RequestId",
                    description,
                    requested_by AS "requested_by: UserId",
                    created_at
                FROM item_requests
                WHERE request_id = $1
            "#,
            request_id as _,
        )
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(row.map(ItemRequest::from))
    }

    async fn find_by_requestor(&self, requested_by: UserId) -> AppResult<Vec<ItemRequest>> {
        let rows = sqlx::query_as!(
            ItemRequestRow,
            r#"
                SELECT
                    request_id AS "request_id: RequestId",
                    description,
                    requested_by AS "requested_by: UserId",
                    created_at
                FROM item_requests
                WHERE requested_by = $1
                ORDER BY created_at ASC
            "#,
            requested_by as _,
        )
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(rows.into_iter().map(ItemRequest::from).collect())
    }

    async fn find_from_others(
        &self,
        requested_by: UserId,
        page: PageQuery,
    ) -> AppResult<Vec<ItemRequest>> {
        let rows = sqlx::query_as!(
            ItemRequestRow,
            r#"
                SELECT
                    request_id AS "request_id: RequestId",
                    description,
                    requested_by AS "requested_by: UserId",
                    created_at
                FROM item_requests
                WHERE requested_by <> $1
                ORDER BY created_at ASC
                LIMIT $2 OFFSET $3
            "#,
            requested_by as _,
            page.limit(),
            page.offset(),
        )
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(rows.into_iter().map(ItemRequest::from).collect())
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

    fn page() -> PageQuery {
        PageQuery { from: 0, size: 10 }
    }

    #[sqlx::test]
    async fn create_and_fetch_request(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = ItemRequestRepositoryImpl::new(ConnectionPool::new(pool.clone()));
        let requestor = register_user(&pool, "alice", "alice@example.com").await?;

        let request = repo
            .create(CreateItemRequest::new("need a drill".into(), requestor))
            .await?;
        assert_eq!(request.requested_by, requestor);

        let found = repo.find_by_id(request.request_id).await?;
        assert_eq!(found.map(|r| r.description), Some("need a drill".into()));

        Ok(())
    }

    #[sqlx::test]
    async fn listings_split_own_and_others(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = ItemRequestRepositoryImpl::new(ConnectionPool::new(pool.clone()));
        let alice = register_user(&pool, "alice", "alice@example.com").await?;
        let bob = register_user(&pool, "bob", "bob@example.com").await?;

        let first = repo
            .create(CreateItemRequest::new("need a drill".into(), alice))
            .await?;
        let second = repo
            .create(CreateItemRequest::new("need a saw".into(), alice))
            .await?;
        let bobs = repo
            .create(CreateItemRequest::new("need a ladder".into(), bob))
            .await?;

        let own = repo.find_by_requestor(alice).await?;
        assert_eq!(own.len(), 2);
        assert_eq!(own[0].request_id, first.request_id);
        assert_eq!(own[1].request_id, second.request_id);

        let others = repo.find_from_others(alice, page()).await?;
        assert_eq!(others.len(), 1);
        assert_eq!(others[0].request_id, bobs.request_id);

        Ok(())
    }
}
