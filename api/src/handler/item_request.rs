use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use garde::Validate;
use kernel::model::{
    id::RequestId,
    item::Item,
    item_request::ItemRequest,
};
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

use super::ensure_user_exists;
use crate::{
    extractor::SharerUserId,
    model::item_request::{
        ItemRequestListQuery, ItemRequestResponse, ItemRequestsResponse, RegisterItemRequestRequest,
    },
};

pub async fn register_item_request(
    SharerUserId(user_id): SharerUserId,
    State(registry): State<AppRegistry>,
    Json(req): Json<RegisterItemRequestRequest>,
) -> AppResult<(StatusCode, Json<ItemRequestResponse>)> {
    req.validate(&())?;
    ensure_user_exists(registry.user_repository(), user_id).await?;

    registry
        .item_request_repository()
        .create(req.into_event(user_id))
        .await
        .map(|request| ItemRequestResponse::new(request, Vec::new()))
        .map(|res| (StatusCode::CREATED, Json(res)))
}

pub async fn show_own_item_requests(
    SharerUserId(user_id): SharerUserId,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ItemRequestsResponse>> {
    ensure_user_exists(registry.user_repository(), user_id).await?;

    let requests = registry
        .item_request_repository()
        .find_by_requestor(user_id)
        .await?;
    let responses = attach_offered_items(&registry, requests).await?;

    Ok(Json(ItemRequestsResponse {
        requests: responses,
    }))
}

pub async fn show_other_item_requests(
    SharerUserId(user_id): SharerUserId,
    Query(query): Query<ItemRequestListQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ItemRequestsResponse>> {
    query.validate(&())?;
    ensure_user_exists(registry.user_repository(), user_id).await?;

    let requests = registry
        .item_request_repository()
        .find_from_others(user_id, query.page())
        .await?;
    let responses = attach_offered_items(&registry, requests).await?;

    Ok(Json(ItemRequestsResponse {
        requests: responses,
    }))
}

pub async fn show_item_request(
    SharerUserId(user_id): SharerUserId,
    Path(request_id): Path<RequestId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ItemRequestResponse>> {
    ensure_user_exists(registry.user_repository(), user_id).await?;

    let request = registry
        .item_request_repository()
        .find_by_id(request_id)
        .await?
        .ok_or_else(|| {
            AppError::EntityNotFound(format!("item request ({request_id}) not found"))
        })?;

    let items = registry
        .item_repository()
        .find_by_request_ids(&[request_id])
        .await?;

    Ok(Json(ItemRequestResponse::new(request, items)))
}

// 回答アイテムはまとめて引いてからリクエストごとに割り付ける
async fn attach_offered_items(
    registry: &AppRegistry,
    requests: Vec<ItemRequest>,
) -> AppResult<Vec<ItemRequestResponse>> {
    let request_ids = requests.iter().map(|r| r.request_id).collect::<Vec<_>>();

    let mut items_by_request: HashMap<RequestId, Vec<Item>> = HashMap::new();
    for item in registry
        .item_repository()
        .find_by_request_ids(&request_ids)
        .await?
    {
        if let Some(request_id) = item.request_id {
            items_by_request.entry(request_id).or_default().push(item);
        }
    }

    Ok(requests
        .into_iter()
        .map(|request| {
            let items = items_by_request.remove(&request.request_id).unwrap_or_default();
            ItemRequestResponse::new(request, items)
        })
        .collect())
}
