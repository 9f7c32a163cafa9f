use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use garde::Validate;
use kernel::model::id::UserId;
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

use crate::model::user::{CreateUserRequest, UpdateUserRequest, UserResponse, UsersResponse};

pub async fn register_user(
    State(registry): State<AppRegistry>,
    Json(req): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    req.validate(&())?;

    registry
        .user_repository()
        .create(req.into())
        .await
        .map(UserResponse::from)
        .map(|res| (StatusCode::CREATED, Json(res)))
}

pub async fn show_user_list(
    State(registry): State<AppRegistry>,
) -> AppResult<Json<UsersResponse>> {
    registry
        .user_repository()
        .find_all()
        .await
        .map(UsersResponse::from)
        .map(Json)
}

pub async fn show_user(
    Path(user_id): Path<UserId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<UserResponse>> {
    registry
        .user_repository()
        .find_by_id(user_id)
        .await
        .and_then(|user| match user {
            Some(user) => Ok(Json(user.into())),
            None => Err(AppError::EntityNotFound(format!(
                "user ({user_id}) not found"
            ))),
        })
}

pub async fn update_user(
    Path(user_id): Path<UserId>,
    State(registry): State<AppRegistry>,
    Json(req): Json<UpdateUserRequest>,
) -> AppResult<Json<UserResponse>> {
    req.validate(&())?;

    registry
        .user_repository()
        .update(req.into_event(user_id))
        .await
        .map(UserResponse::from)
        .map(Json)
}

pub async fn delete_user(
    Path(user_id): Path<UserId>,
    State(registry): State<AppRegistry>,
) -> AppResult<StatusCode> {
    registry
        .user_repository()
        .delete(user_id)
        .await
        .map(|_| StatusCode::OK)
}
