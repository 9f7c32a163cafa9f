use crate::model::{
    booking::{
        event::{CreateBooking, DecideBooking},
        Booking,
    },
    id::{BookingId, ItemId, UserId},
    list::{BookingFilter, PageQuery},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::error::AppResult;

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// 予約リクエストを検証のうえ WAITING 状態で登録する
    async fn create(&self, event: CreateBooking) -> AppResult<Booking>;
    /// WAITING の予約を承認または却下する（一度きり）
    async fn decide(&self, event: DecideBooking) -> AppResult<Booking>;
    async fn find_by_id(&self, booking_id: BookingId) -> AppResult<Option<Booking>>;
    /// 予約者視点の一覧。開始時刻の降順。
    async fn find_for_booker(
        &self,
        booked_by: UserId,
        filter: BookingFilter,
        page: PageQuery,
    ) -> AppResult<Vec<Booking>>;
    /// 所有アイテム視点の一覧。開始時刻の降順。
    async fn find_for_owner(
        &self,
        owned_by: UserId,
        filter: BookingFilter,
        page: PageQuery,
    ) -> AppResult<Vec<Booking>>;
    /// 複数アイテムの承認済み予約をまとめて取得する（N+1 回避用）
    async fn find_approved_by_item_ids(&self, item_ids: &[ItemId]) -> AppResult<Vec<Booking>>;
    /// 指定ユーザーが指定アイテムを過去に借り終えているか
    async fn has_completed_rental(
        &self,
        booked_by: UserId,
        item_id: ItemId,
        as_of: DateTime<Utc>,
    ) -> AppResult<bool>;
}
