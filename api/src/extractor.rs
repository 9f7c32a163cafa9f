use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use kernel::model::id::UserId;
use shared::error::AppError;

pub const SHARER_USER_ID_HEADER: &str = "X-Sharer-User-Id";

/// X-Sharer-User-Id ヘッダーから操作ユーザーを取り出す
pub struct SharerUserId(pub UserId);

#[async_trait]
impl<S> FromRequestParts<S> for SharerUserId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(SHARER_USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::UnprocessableEntity(format!(
                    "{SHARER_USER_ID_HEADER} header is required"
                ))
            })?;

        let user_id = value.parse::<UserId>().map_err(|_| {
            AppError::UnprocessableEntity(format!(
                "{SHARER_USER_ID_HEADER} header is not a valid user id"
            ))
        })?;

        Ok(Self(user_id))
    }
}
