use async_trait::async_trait;
use derive_new::new;
use kernel::model::id::{ItemId, RequestId, UserId};
use kernel::model::item::{
    event::{CreateItem, DeleteItem, UpdateItem},
    Item,
};
use kernel::model::list::PageQuery;
use kernel::repository::item::ItemRepository;
use shared::error::{AppError, AppResult};

use crate::database::{model::item::ItemRow, ConnectionPool};

#[derive(new)]
pub struct ItemRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl ItemRepository for ItemRepositoryImpl {
    async fn create(&self, event: CreateItem) -> AppResult<Item> {
        let owner_exists = sqlx::query!(
            r#"SELECT EXISTS (SELECT 1 FROM users WHERE user_id = $1) AS "exists!""#,
            event.owned_by as _,
        )
        .fetch_one(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?
        .exists;

        if !owner_exists {
            return Err(AppError::EntityNotFound(format!(
                "user ({}) not found",
                event.owned_by
            )));
        }

        // リクエストへの回答として登録する場合はリクエストの存在も確認する
        if let Some(request_id) = event.request_id {
            let request_exists = sqlx::query!(
                r#"SELECT EXISTS (SELECT 1 FROM item_requests WHERE request_id = $1) AS "exists!""#,
                request_id as _,
            )
            .fetch_one(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?
            .exists;

            if !request_exists {
                return Err(AppError::EntityNotFound(format!(
                    "item request ({request_id}) not found"
                )));
            }
        }

        let item_id = ItemId::new();
        let res = sqlx::query!(
            r#"
                INSERT INTO items (item_id, item_name, description, is_available, owned_by, request_id)
                VALUES ($1, $2, $3, $4, $5, $6)
            "#,
            item_id as _,
            event.item_name,
            event.description,
            event.is_available,
            event.owned_by as _,
            event.request_id as _,
        )
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No item record has been created".into(),
            ));
        }

        let item = self.find_by_id(item_id).await?;
        item.ok_or_else(|| AppError::EntityNotFound(format!("item ({item_id}) not found")))
    }

    async fn update(&self, event: UpdateItem) -> AppResult<Item> {
        self.ensure_owned_by(event.item_id, event.requested_user)
            .await?;

        // 未指定のフィールドは現在値を維持する
        let res = sqlx::query!(
            r#"
                UPDATE items
                SET
                    item_name = COALESCE($2, item_name),
                    description = COALESCE($3, description),
                    is_available = COALESCE($4, is_available),
                    updated_at = CURRENT_TIMESTAMP
                WHERE item_id = $1
            "#,
            event.item_id as _,
            event.item_name,
            event.description,
            event.is_available,
        )
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No item record has been updated".into(),
            ));
        }

        let item = self.find_by_id(event.item_id).await?;
        item.ok_or_else(|| AppError::EntityNotFound(format!("item ({}) not found", event.item_id)))
    }

    async fn delete(&self, event: DeleteItem) -> AppResult<()> {
        self.ensure_owned_by(event.item_id, event.requested_user)
            .await?;

        let res = sqlx::query!(
            r#"
                DELETE FROM items
                WHERE item_id = $1
            "#,
            event.item_id as _,
        )
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No item record has been deleted".into(),
            ));
        }

        Ok(())
    }

    async fn find_by_id(&self, item_id: ItemId) -> AppResult<Option<Item>> {
        let row = sqlx::query_as!(
            ItemRow,
            r#"
                SELECT
                    i.item_id AS "item_id: ItemId",
                    i.item_name,
                    i.description,
                    i.is_available,
                    i.owned_by AS "owned_by: UserId",
                    u.user_name AS "owner_name!",
                    i.request_id AS "request_id: RequestId"
                FROM items AS i
                INNER JOIN users AS u ON i.owned_by = u.user_id
                WHERE i.item_id = $1
            "#,
            item_id as _,
        )
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(row.map(Item::from))
    }

    async fn find_by_owner(&self, owned_by: UserId, page: PageQuery) -> AppResult<Vec<Item>> {
        let rows = sqlx::query_as!(
            ItemRow,
            r#"
                SELECT
                    i.item_id AS "item_id: ItemId",
                    i.item_name,
                    i.description,
                    i.is_available,
                    i.owned_by AS "owned_by: UserId",
                    u.user_name AS "owner_name!",
                    i.request_id AS "request_id: RequestId"
                FROM items AS i
                INNER JOIN users AS u ON i.owned_by = u.user_id
                WHERE i.owned_by = $1
                ORDER BY i.created_at ASC
                LIMIT $2 OFFSET $3
            "#,
            owned_by as _,
            page.limit(),
            page.offset(),
        )
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(rows.into_iter().map(Item::from).collect())
    }

    async fn find_by_request_ids(&self, request_ids: &[RequestId]) -> AppResult<Vec<Item>> {
        let ids = request_ids.iter().map(|id| id.raw()).collect::<Vec<_>>();
        let rows = sqlx::query_as!(
            ItemRow,
            r#"
                SELECT
                    i.item_id AS "item_id: ItemId",
                    i.item_name,
                    i.description,
                    i.is_available,
                    i.owned_by AS "owned_by: UserId",
                    u.user_name AS "owner_name!",
                    i.request_id AS "request_id: RequestId"
                FROM items AS i
                INNER JOIN users AS u ON i.owned_by = u.user_id
                WHERE i.request_id = ANY($1)
                ORDER BY i.created_at ASC
            "#,
            &ids,
        )
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(rows.into_iter().map(Item::from).collect())
    }

    async fn search(&self, text: &str, page: PageQuery) -> AppResult<Vec<Item>> {
        // 大文字小文字を区別せず名前と説明を部分一致で探す。貸出可能なもののみ。
        let rows = sqlx::query_as!(
            ItemRow,
            r#"
                SELECT
                    i.item_id AS "item_id: ItemId",
                    i.item_name,
                    i.description,
                    i.is_available,
                    i.owned_by AS "owned_by: UserId",
                    u.user_name AS "owner_name!",
                    i.request_id AS "request_id: RequestId"
                FROM items AS i
                INNER JOIN users AS u ON i.owned_by = u.user_id
                WHERE i.is_available
                  AND (i.item_name ILIKE '%' || $1 || '%'
                       OR i.description ILIKE '%' || $1 || '%')
                ORDER BY i.created_at ASC
                LIMIT $2 OFFSET $3
            "#,
            text,
            page.limit(),
            page.offset(),
        )
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(rows.into_iter().map(Item::from).collect())
    }
}

impl ItemRepositoryImpl {
    // 所有者以外にはアイテムの存在を隠す
    async fn ensure_owned_by(&self, item_id: ItemId, requested_user: UserId) -> AppResult<()> {
        let row = sqlx::query!(
            r#"
                SELECT owned_by AS "owned_by: UserId"
                FROM items
                WHERE item_id = $1
            "#,
            item_id as _,
        )
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        match row {
            Some(r) if r.owned_by == requested_user => Ok(()),
            _ => Err(AppError::EntityNotFound(format!(
                "item ({item_id}) not found"
            ))),
        }
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
    async fn create_and_fetch_item(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = ItemRepositoryImpl::new(ConnectionPool::new(pool.clone()));
        let owner = register_user(&pool, "owner", "owner@example.com").await?;

        let item = repo
            .create(CreateItem::new(
                "Drill".into(),
                "Cordless drill".into(),
                true,
                owner,
                None,
            ))
            .await?;

        assert_eq!(item.owner.owner_id, owner);
        assert_eq!(item.owner.owner_name, "owner");
        assert!(item.is_available);

        let found = repo.find_by_id(item.item_id).await?;
        assert_eq!(found.map(|i| i.item_name), Some("Drill".into()));

        Ok(())
    }

    #[sqlx::test]
    async fn create_requires_existing_owner(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = ItemRepositoryImpl::new(ConnectionPool::new(pool.clone()));

        let res = repo
            .create(CreateItem::new(
                "Drill".into(),
                "Cordless drill".into(),
                true,
                UserId::new(),
                None,
            ))
            .await;
        assert!(matches!(res, Err(AppError::EntityNotFound(_))));

        Ok(())
    }

    #[sqlx::test]
    async fn update_is_hidden_from_non_owner(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = ItemRepositoryImpl::new(ConnectionPool::new(pool.clone()));
        let owner = register_user(&pool, "owner", "owner@example.com").await?;
        let other = register_user(&pool, "other", "other@example.com").await?;

        let item = repo
            .create(CreateItem::new(
                "Drill".into(),
                "Cordless drill".into(),
                true,
                owner,
                None,
            ))
            .await?;

        let res = repo
            .update(UpdateItem::new(
                item.item_id,
                other,
                Some("Stolen".into()),
                None,
                None,
            ))
            .await;
        assert!(matches!(res, Err(AppError::EntityNotFound(_))));

        let updated = repo
            .update(UpdateItem::new(item.item_id, owner, None, None, Some(false)))
            .await?;
        assert!(!updated.is_available);
        assert_eq!(updated.item_name, "Drill");

        Ok(())
    }

    #[sqlx::test]
    async fn delete_is_hidden_from_non_owner(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = ItemRepositoryImpl::new(ConnectionPool::new(pool.clone()));
        let owner = register_user(&pool, "owner", "owner@example.com").await?;
        let other = register_user(&pool, "other", "other@example.com").await?;

        let item = repo
            .create(CreateItem::new(
                "Drill".into(),
                "Cordless drill".into(),
                true,
                owner,
                None,
            ))
            .await?;

        let res = repo.delete(DeleteItem::new(item.item_id, other)).await;
        assert!(matches!(res, Err(AppError::EntityNotFound(_))));

        repo.delete(DeleteItem::new(item.item_id, owner)).await?;
        assert!(repo.find_by_id(item.item_id).await?.is_none());

        Ok(())
    }

    #[sqlx::test]
    async fn search_matches_available_items_case_insensitively(
        pool: sqlx::PgPool,
    ) -> anyhow::Result<()> {
        let repo = ItemRepositoryImpl::new(ConnectionPool::new(pool.clone()));
        let owner = register_user(&pool, "owner", "owner@example.com").await?;

        repo.create(CreateItem::new(
            "Power Drill".into(),
            "for walls".into(),
            true,
            owner,
            None,
        ))
        .await?;
        repo.create(CreateItem::new(
            "Hand drill".into(),
            "manual".into(),
            false,
            owner,
            None,
        ))
        .await?;
        repo.create(CreateItem::new(
            "Ladder".into(),
            "a DRILL substitute it is not".into(),
            true,
            owner,
            None,
        ))
        .await?;

        let found = repo.search("dRiLl", page()).await?;
        // 貸出不可のものは除外、説明のヒットは含む
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|i| i.is_available));

        Ok(())
    }

    #[sqlx::test]
    async fn owner_listing_keeps_insertion_order(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = ItemRepositoryImpl::new(ConnectionPool::new(pool.clone()));
        let owner = register_user(&pool, "owner", "owner@example.com").await?;
        let other = register_user(&pool, "other", "other@example.com").await?;

        let first = repo
            .create(CreateItem::new(
                "Drill".into(),
                "first".into(),
                true,
                owner,
                None,
            ))
            .await?;
        let second = repo
            .create(CreateItem::new(
                "Saw".into(),
                "second".into(),
                true,
                owner,
                None,
            ))
            .await?;
        repo.create(CreateItem::new(
            "Ladder".into(),
            "someone else's".into(),
            true,
            other,
            None,
        ))
        .await?;

        let found = repo.find_by_owner(owner, page()).await?;
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].item_id, first.item_id);
        assert_eq!(found[1].item_id, second.item_id);

        Ok(())
    }
}
