use std::sync::Arc;

use kernel::model::id::UserId;
use kernel::repository::user::UserRepository;
use shared::error::{AppError, AppResult};

pub mod booking;
pub mod health;
pub mod item;
pub mod item_request;
pub mod user;

// 操作ユーザーの存在確認。未登録なら 404。
async fn ensure_user_exists(repo: Arc<dyn UserRepository>, user_id: UserId) -> AppResult<()> {
    if repo.exists_by_id(user_id).await? {
        Ok(())
    } else {
        Err(AppError::EntityNotFound(format!(
            "user ({user_id}) not found"
        )))
    }
}
