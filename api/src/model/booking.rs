use std::str::FromStr;

use chrono::{DateTime, Utc};
use garde::Validate;
use kernel::model::{
    booking::{Booking, BookingItem, BookingStatus, BookingUser},
    id::{BookingId, ItemId, UserId},
    list::{BookingFilter, PageQuery},
};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, AppResult};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub item_id: ItemId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct DecideBookingQuery {
    pub approved: bool,
}

fn default_state() -> String {
    "ALL".into()
}

fn default_size() -> i64 {
    10
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BookingListQuery {
    #[garde(skip)]
    #[serde(default = "default_state")]
    pub state: String,
    #[garde(range(min = 0))]
    #[serde(default)]
    pub from: i64,
    #[garde(range(min = 1))]
    #[serde(default = "default_size")]
    pub size: i64,
}

impl BookingListQuery {
    /// 絞り込み条件の文字列は大文字のトークンのみ受け付ける
    pub fn filter(&self) -> AppResult<BookingFilter> {
        BookingFilter::from_str(&self.state)
            .map_err(|_| AppError::UnprocessableEntity("Unknown state: UNSUPPORTED_STATUS".into()))
    }

    pub fn page(&self) -> PageQuery {
        PageQuery {
            from: self.from,
            size: self.size,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub id: BookingId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub status: BookingStatus,
    pub booker: BookerResponse,
    pub item: BookedItemResponse,
}

impl From<Booking> for BookingResponse {
    fn from(value: Booking) -> Self {
        let Booking {
            booking_id,
            start_time,
            end_time,
            status,
            booked_by,
            item,
        } = value;
        let BookingUser { user_id, user_name } = booked_by;
        let BookingItem {
            item_id, item_name, ..
        } = item;
        Self {
            id: booking_id,
            start: start_time,
            end: end_time,
            status,
            booker: BookerResponse {
                id: user_id,
                name: user_name,
            },
            item: BookedItemResponse {
                id: item_id,
                name: item_name,
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookerResponse {
    pub id: UserId,
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookedItemResponse {
    pub id: ItemId,
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingsResponse {
    pub bookings: Vec<BookingResponse>,
}

impl From<Vec<Booking>> for BookingsResponse {
    fn from(value: Vec<Booking>) -> Self {
        Self {
            bookings: value.into_iter().map(BookingResponse::from).collect(),
        }
    }
}

/// アイテム詳細に載せる直前・直後の予約の要約
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingSummaryResponse {
    pub id: BookingId,
    pub booker_id: UserId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl From<&Booking> for BookingSummaryResponse {
    fn from(value: &Booking) -> Self {
        Self {
            id: value.booking_id,
            booker_id: value.booked_by.user_id,
            start: value.start_time,
            end: value.end_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(state: &str) -> BookingListQuery {
        BookingListQuery {
            state: state.into(),
            from: 0,
            size: 10,
        }
    }

    #[test]
    fn filter_accepts_known_states() {
        assert_eq!(query("ALL").filter().unwrap(), BookingFilter::All);
        assert_eq!(query("CURRENT").filter().unwrap(), BookingFilter::Current);
        assert_eq!(query("WAITING").filter().unwrap(), BookingFilter::Waiting);
    }

    // 不明な state は入力によらず固定の文言で 400 を返す
    #[test]
    fn unknown_state_yields_canonical_message() {
        for state in ["UNSUPPORTED_STATUS", "waiting", "SOMETHING", ""] {
            match query(state).filter() {
                Err(AppError::UnprocessableEntity(msg)) => {
                    assert_eq!(msg, "Unknown state: UNSUPPORTED_STATUS");
                }
                other => panic!("unexpected result for {state:?}: {other:?}"),
            }
        }
    }
}
