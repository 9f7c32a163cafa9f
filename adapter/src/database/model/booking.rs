use kernel::model::{
    booking::{Booking, BookingItem, BookingStatus, BookingUser},
    id::{BookingId, ItemId, UserId},
};
use sqlx::types::chrono::{DateTime, Utc};

/// bookings テーブルの booking_status 列に対応する型
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "booking_status", rename_all = "UPPERCASE")]
pub enum BookingStatusRow {
    Waiting,
    Approved,
    Rejected,
}

impl From<BookingStatusRow> for BookingStatus {
    fn from(value: BookingStatusRow) -> Self {
        match value {
            BookingStatusRow::Waiting => BookingStatus::Waiting,
            BookingStatusRow::Approved => BookingStatus::Approved,
            BookingStatusRow::Rejected => BookingStatus::Rejected,
        }
    }
}

impl From<BookingStatus> for BookingStatusRow {
    fn from(value: BookingStatus) -> Self {
        match value {
            BookingStatus::Waiting => BookingStatusRow::Waiting,
            BookingStatus::Approved => BookingStatusRow::Approved,
            BookingStatus::Rejected => BookingStatusRow::Rejected,
        }
    }
}

/// 予約一覧・単体取得に使う型。items / users と JOIN した結果を受ける。
pub struct BookingRow {
    pub booking_id: BookingId,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub booking_status: BookingStatusRow,
    pub booked_by: UserId,
    pub user_name: String,
    pub item_id: ItemId,
    pub item_name: String,
    pub owned_by: UserId,
}

impl From<BookingRow> for Booking {
    fn from(value: BookingRow) -> Self {
        let BookingRow {
            booking_id,
            start_time,
            end_time,
            booking_status,
            booked_by,
            user_name,
            item_id,
            item_name,
            owned_by,
        } = value;
        Booking {
            booking_id,
            start_time,
            end_time,
            status: booking_status.into(),
            booked_by: BookingUser {
                user_id: booked_by,
                user_name,
            },
            item: BookingItem {
                item_id,
                item_name,
                owned_by,
            },
        }
    }
}
