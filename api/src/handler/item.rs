use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use garde::Validate;
use kernel::model::{
    booking::{last_and_next, Booking},
    comment::{event::CreateComment, Comment},
    id::ItemId,
    item::event::DeleteItem,
};
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

use super::ensure_user_exists;
use crate::{
    extractor::SharerUserId,
    model::{
        booking::BookingSummaryResponse,
        item::{
            CommentResponse, CreateCommentRequest, CreateItemRequest, ItemListQuery, ItemResponse,
            ItemSearchQuery, ItemsResponse, UpdateItemRequest,
        },
    },
};

pub async fn register_item(
    SharerUserId(user_id): SharerUserId,
    State(registry): State<AppRegistry>,
    Json(req): Json<CreateItemRequest>,
) -> AppResult<(StatusCode, Json<ItemResponse>)> {
    req.validate(&())?;

    registry
        .item_repository()
        .create(req.into_event(user_id))
        .await
        .map(ItemResponse::from)
        .map(|res| (StatusCode::CREATED, Json(res)))
}

pub async fn update_item(
    SharerUserId(user_id): SharerUserId,
    Path(item_id): Path<ItemId>,
    State(registry): State<AppRegistry>,
    Json(req): Json<UpdateItemRequest>,
) -> AppResult<Json<ItemResponse>> {
    req.validate(&())?;

    registry
        .item_repository()
        .update(req.into_event(item_id, user_id))
        .await
        .map(ItemResponse::from)
        .map(Json)
}

pub async fn delete_item(
    SharerUserId(user_id): SharerUserId,
    Path(item_id): Path<ItemId>,
    State(registry): State<AppRegistry>,
) -> AppResult<StatusCode> {
    registry
        .item_repository()
        .delete(DeleteItem::new(item_id, user_id))
        .await
        .map(|_| StatusCode::OK)
}

/// アイテム詳細。所有者にだけ直前・直後の承認済み予約を載せる。
pub async fn show_item(
    SharerUserId(user_id): SharerUserId,
    Path(item_id): Path<ItemId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ItemResponse>> {
    ensure_user_exists(registry.user_repository(), user_id).await?;

    let item = registry
        .item_repository()
        .find_by_id(item_id)
        .await?
        .ok_or_else(|| AppError::EntityNotFound(format!("item ({item_id}) not found")))?;

    let comments = registry
        .comment_repository()
        .find_by_item_ids(&[item_id])
        .await?;

    let is_owner = item.owner.owner_id == user_id;
    let mut res = ItemResponse::from(item);

    if is_owner {
        let bookings = registry
            .booking_repository()
            .find_approved_by_item_ids(&[item_id])
            .await?;
        let (last, next) = last_and_next(&bookings, Utc::now());
        res.last_booking = last.map(BookingSummaryResponse::from);
        res.next_booking = next.map(BookingSummaryResponse::from);
    }

    res.comments = Some(comments.into_iter().map(CommentResponse::from).collect());

    Ok(Json(res))
}

/// 所有アイテムの一覧。予約とコメントはまとめて引いてから割り付ける。
pub async fn show_item_list(
    SharerUserId(user_id): SharerUserId,
    Query(query): Query<ItemListQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ItemsResponse>> {
    query.validate(&())?;
    ensure_user_exists(registry.user_repository(), user_id).await?;

    let items = registry
        .item_repository()
        .find_by_owner(user_id, query.page())
        .await?;
    let item_ids = items.iter().map(|i| i.item_id).collect::<Vec<_>>();

    let mut bookings_by_item: HashMap<ItemId, Vec<Booking>> = HashMap::new();
    for booking in registry
        .booking_repository()
        .find_approved_by_item_ids(&item_ids)
        .await?
    {
        bookings_by_item
            .entry(booking.item.item_id)
            .or_default()
            .push(booking);
    }

    let mut comments_by_item: HashMap<ItemId, Vec<Comment>> = HashMap::new();
    for comment in registry
        .comment_repository()
        .find_by_item_ids(&item_ids)
        .await?
    {
        comments_by_item
            .entry(comment.item_id)
            .or_default()
            .push(comment);
    }

    let now = Utc::now();
    let items = items
        .into_iter()
        .map(|item| {
            let bookings = bookings_by_item.remove(&item.item_id).unwrap_or_default();
            let (last, next) = last_and_next(&bookings, now);
            let last = last.map(BookingSummaryResponse::from);
            let next = next.map(BookingSummaryResponse::from);
            let comments = comments_by_item.remove(&item.item_id).unwrap_or_default();

            let mut res = ItemResponse::from(item);
            res.last_booking = last;
            res.next_booking = next;
            res.comments = Some(comments.into_iter().map(CommentResponse::from).collect());
            res
        })
        .collect();

    Ok(Json(ItemsResponse { items }))
}

/// 検索は利用者ヘッダーなしで呼べる
pub async fn search_items(
    Query(query): Query<ItemSearchQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ItemsResponse>> {
    query.validate(&())?;

    // 空文字での検索は問い合わせせずに空を返す
    if query.is_blank() {
        return Ok(Json(ItemsResponse { items: Vec::new() }));
    }

    let items = registry
        .item_repository()
        .search(&query.text, query.page())
        .await?;

    Ok(Json(ItemsResponse {
        items: items.into_iter().map(ItemResponse::from).collect(),
    }))
}

/// 借り終えた利用者だけがコメントを残せる
pub async fn register_comment(
    SharerUserId(user_id): SharerUserId,
    Path(item_id): Path<ItemId>,
    State(registry): State<AppRegistry>,
    Json(req): Json<CreateCommentRequest>,
) -> AppResult<(StatusCode, Json<CommentResponse>)> {
    req.validate(&())?;

    ensure_user_exists(registry.user_repository(), user_id).await?;
    registry
        .item_repository()
        .find_by_id(item_id)
        .await?
        .ok_or_else(|| AppError::EntityNotFound(format!("item ({item_id}) not found")))?;

    let completed = registry
        .booking_repository()
        .has_completed_rental(user_id, item_id, Utc::now())
        .await?;
    if !completed {
        return Err(AppError::UnprocessableEntity(format!(
            "user ({user_id}) has not completed a rental of item ({item_id})"
        )));
    }

    registry
        .comment_repository()
        .create(CreateComment::new(item_id, user_id, req.text))
        .await
        .map(CommentResponse::from)
        .map(|res| (StatusCode::CREATED, Json(res)))
}
