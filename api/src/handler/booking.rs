use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use garde::Validate;
use kernel::model::{
    booking::event::{CreateBooking, DecideBooking},
    id::BookingId,
};
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

use super::ensure_user_exists;
use crate::{
    extractor::SharerUserId,
    model::booking::{
        BookingListQuery, BookingResponse, BookingsResponse, CreateBookingRequest,
        DecideBookingQuery,
    },
};

pub async fn register_booking(
    SharerUserId(user_id): SharerUserId,
    State(registry): State<AppRegistry>,
    Json(req): Json<CreateBookingRequest>,
) -> AppResult<(StatusCode, Json<BookingResponse>)> {
    registry
        .booking_repository()
        .create(CreateBooking::new(req.item_id, user_id, req.start, req.end))
        .await
        .map(BookingResponse::from)
        .map(|res| (StatusCode::CREATED, Json(res)))
}

pub async fn decide_booking(
    SharerUserId(user_id): SharerUserId,
    Path(booking_id): Path<BookingId>,
    Query(query): Query<DecideBookingQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<BookingResponse>> {
    registry
        .booking_repository()
        .decide(DecideBooking::new(booking_id, user_id, query.approved))
        .await
        .map(BookingResponse::from)
        .map(Json)
}

pub async fn show_booking(
    SharerUserId(user_id): SharerUserId,
    Path(booking_id): Path<BookingId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<BookingResponse>> {
    let booking = registry
        .booking_repository()
        .find_by_id(booking_id)
        .await?
        .ok_or_else(|| AppError::EntityNotFound(format!("booking ({booking_id}) not found")))?;

    ensure_user_exists(registry.user_repository(), user_id).await?;

    // 予約者と所有者以外には存在を隠す
    if booking.booked_by.user_id != user_id && booking.item.owned_by != user_id {
        return Err(AppError::EntityNotFound(format!(
            "booking ({booking_id}) not found"
        )));
    }

    Ok(Json(booking.into()))
}

pub async fn show_booking_list(
    SharerUserId(user_id): SharerUserId,
    Query(query): Query<BookingListQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<BookingsResponse>> {
    query.validate(&())?;
    ensure_user_exists(registry.user_repository(), user_id).await?;
    let filter = query.filter()?;

    registry
        .booking_repository()
        .find_for_booker(user_id, filter, query.page())
        .await
        .map(BookingsResponse::from)
        .map(Json)
}

pub async fn show_owner_booking_list(
    SharerUserId(user_id): SharerUserId,
    Query(query): Query<BookingListQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<BookingsResponse>> {
    query.validate(&())?;
    ensure_user_exists(registry.user_repository(), user_id).await?;
    let filter = query.filter()?;

    registry
        .booking_repository()
        .find_for_owner(user_id, filter, query.page())
        .await
        .map(BookingsResponse::from)
        .map(Json)
}
