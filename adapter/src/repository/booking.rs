use crate::database::{
    model::booking::{BookingRow, BookingStatusRow},
    ConnectionPool,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use derive_new::new;
use kernel::model::booking::{
    event::{CreateBooking, DecideBooking},
    Booking, BookingStatus,
};
use kernel::model::id::{BookingId, ItemId, UserId};
use kernel::model::list::{BookingFilter, PageQuery};
use kernel::repository::booking::BookingRepository;
use shared::error::{AppError, AppResult};

#[derive(new)]
pub struct BookingRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl BookingRepository for BookingRepositoryImpl {
    // 予約リクエストを登録する
    async fn create(&self, event: CreateBooking) -> AppResult<Booking> {
        let mut tx = self.db.begin().await?;

        // トランザクション分離レベルを SERIALIZABLE に設定する
        self.set_transaction_serializable(&mut tx).await?;

        // 事前チェック。検査順は
        // 利用者 → アイテム → 期間 → 所有者 → 貸出可否 で、最初の違反を返す。
        {
            let user_row = sqlx::query!(
                r#"
                SELECT user_id
                FROM users
                WHERE user_id = $1
                "#,
                event.booked_by as _
            )
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

            if user_row.is_none() {
                return Err(AppError::EntityNotFound(format!(
                    "user ({}) not found",
                    event.booked_by
                )));
            }

            let item_row = sqlx::query!(
                r#"
                SELECT
                    item_id,
                    owned_by AS "owned_by: UserId",
                    is_available
                FROM items
                WHERE item_id = $1
                "#,
                event.item_id as _
            )
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

            let item = match item_row {
                None => {
                    return Err(AppError::EntityNotFound(format!(
                        "item ({}) not found",
                        event.item_id
                    )))
                }
                Some(i) => i,
            };

            if event.start_time > event.end_time {
                return Err(AppError::UnprocessableEntity(
                    "end of booking cannot be before its start".into(),
                ));
            }

            if event.start_time == event.end_time {
                return Err(AppError::UnprocessableEntity(
                    "end of booking cannot be equal to its start".into(),
                ));
            }

            // 所有者が自分のアイテムを予約しようとした場合は、
            // 所有関係を漏らさないよう「見つからない」として返す
            if item.owned_by == event.booked_by {
                return Err(AppError::EntityNotFound(format!(
                    "item ({}) not found",
                    event.item_id
                )));
            }

            if !item.is_available {
                return Err(AppError::ItemNotAvailable(event.item_id.to_string()));
            }
        }

        // 予約レコードを WAITING で追加する
        let booking_id = BookingId::new();
        let res = sqlx::query!(
            r#"
                INSERT INTO bookings (booking_id, item_id, booked_by, start_time, end_time, booking_status)
                VALUES ($1, $2, $3, $4, $5, 'WAITING')
            "#,
            booking_id as _,
            event.item_id as _,
            event.booked_by as _,
            event.start_time,
            event.end_time,
        )
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No booking record has been created".into(),
            ));
        }

        let booking = self.fetch_in_tx(&mut tx, booking_id).await?;

        tx.commit().await.map_err(AppError::TransactionError)?;

        Ok(booking)
    }

    // WAITING の予約を承認または却下する
    async fn decide(&self, event: DecideBooking) -> AppResult<Booking> {
        let mut tx = self.db.begin().await?;

        // 同じ予約に対する並行した承認操作が両方成功しないよう、
        // トランザクション分離レベルを SERIALIZABLE に設定する
        self.set_transaction_serializable(&mut tx).await?;

        {
            let booking_row = sqlx::query!(
                r#"
                SELECT
                    b.booking_id,
                    b.booking_status AS "booking_status: BookingStatusRow",
                    i.owned_by AS "owned_by!: UserId"
                FROM bookings AS b
                INNER JOIN items AS i ON b.item_id = i.item_id
                WHERE b.booking_id = $1
                "#,
                event.booking_id as _
            )
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

            let Some(booking_row) = booking_row else {
                return Err(AppError::EntityNotFound(format!(
                    "booking ({}) not found",
                    event.booking_id
                )));
            };

            let user_row = sqlx::query!(
                r#"
                SELECT user_id
                FROM users
                WHERE user_id = $1
                "#,
                event.decided_by as _
            )
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

            if user_row.is_none() {
                return Err(AppError::EntityNotFound(format!(
                    "user ({}) not found",
                    event.decided_by
                )));
            }

            // 所有者以外には予約の存在を隠す
            if booking_row.owned_by != event.decided_by {
                return Err(AppError::EntityNotFound(format!(
                    "booking ({}) not found",
                    event.booking_id
                )));
            }

            // WAITING からの遷移は一度きり
            if booking_row.booking_status != BookingStatusRow::Waiting {
                return Err(AppError::UnprocessableEntity(format!(
                    "booking ({}) has already been processed",
                    event.booking_id
                )));
            }
        }

        let decided = if event.approved {
            BookingStatus::Approved
        } else {
            BookingStatus::Rejected
        };
        let new_status = BookingStatusRow::from(decided);

        let res = sqlx::query!(
            r#"
                UPDATE bookings
                SET
                    booking_status = $2,
                    updated_at = CURRENT_TIMESTAMP
                WHERE booking_id = $1
            "#,
            event.booking_id as _,
            new_status as _,
        )
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No booking record has been updated".into(),
            ));
        }

        let booking = self.fetch_in_tx(&mut tx, event.booking_id).await?;

        tx.commit().await.map_err(AppError::TransactionError)?;

        Ok(booking)
    }

    async fn find_by_id(&self, booking_id: BookingId) -> AppResult<Option<Booking>> {
        let row = sqlx::query_as!(
            BookingRow,
            r#"
                SELECT
                    b.booking_id AS "booking_id: BookingId",
                    b.start_time,
                    b.end_time,
                    b.booking_status AS "booking_status: BookingStatusRow",
                    b.booked_by AS "booked_by: UserId",
                    u.user_name AS "user_name!",
                    b.item_id AS "item_id: ItemId",
                    i.item_name AS "item_name!",
                    i.owned_by AS "owned_by!: UserId"
                FROM bookings AS b
                INNER JOIN items AS i ON b.item_id = i.item_id
                INNER JOIN users AS u ON b.booked_by = u.user_id
                WHERE b.booking_id = $1
            "#,
            booking_id as _
        )
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(row.map(Booking::from))
    }

    // 予約者視点の一覧を取得する
    async fn find_for_booker(
        &self,
        booked_by: UserId,
        filter: BookingFilter,
        page: PageQuery,
    ) -> AppResult<Vec<Booking>> {
        let now = Utc::now();
        let rows: Vec<BookingRow> = match filter {
            BookingFilter::All => {
                sqlx::query_as!(
                    BookingRow,
                    r#"
                        SELECT
                            b.booking_id AS "booking_id: BookingId",
                            b.start_time,
                            b.end_time,
                            b.booking_status AS "booking_status: BookingStatusRow",
                            b.booked_by AS "booked_by: UserId",
                            u.user_name AS "user_name!",
                            b.item_id AS "item_id: ItemId",
                            i.item_name AS "item_name!",
                            i.owned_by AS "owned_by!: UserId"
                        FROM bookings AS b
                        INNER JOIN items AS i ON b.item_id = i.item_id
                        INNER JOIN users AS u ON b.booked_by = u.user_id
                        WHERE b.booked_by = $1
                        ORDER BY b.start_time DESC
                        LIMIT $2 OFFSET $3
                    "#,
                    booked_by as _,
                    page.limit(),
                    page.offset(),
                )
                .fetch_all(self.db.inner_ref())
                .await
            }
            BookingFilter::Current => {
                sqlx::query_as!(
                    BookingRow,
                    r#"
                        SELECT
                            b.booking_id AS "booking_id: BookingId",
                            b.start_time,
                            b.end_time,
                            b.booking_status AS "booking_status: BookingStatusRow",
                            b.booked_by AS "booked_by: UserId",
                            u.user_name AS "user_name!",
                            b.item_id AS "item_id: ItemId",
                            i.item_name AS "item_name!",
                            i.owned_by AS "owned_by!: UserId"
                        FROM bookings AS b
                        INNER JOIN items AS i ON b.item_id = i.item_id
                        INNER JOIN users AS u ON b.booked_by = u.user_id
                        WHERE b.booked_by = $1
                          AND b.start_time <= $2
                          AND b.end_time > $2
                        ORDER BY b.start_time DESC
                        LIMIT $3 OFFSET $4
                    "#,
                    booked_by as _,
                    now,
                    page.limit(),
                    page.offset(),
                )
                .fetch_all(self.db.inner_ref())
                .await
            }
            BookingFilter::Past => {
                sqlx::query_as!(
                    BookingRow,
                    r#"
                        SELECT
                            b.booking_id AS "booking_id: BookingId",
                            b.start_time,
                            b.end_time,
                            b.booking_status AS "booking_status: BookingStatusRow",
                            b.booked_by AS "booked_by: UserId",
                            u.user_name AS "user_name!",
                            b.item_id AS "item_id: ItemId",
                            i.item_name AS "item_name!",
                            i.owned_by AS "owned_by!: UserId"
                        FROM bookings AS b
                        INNER JOIN items AS i ON b.item_id = i.item_id
                        INNER JOIN users AS u ON b.booked_by = u.user_id
                        WHERE b.booked_by = $1
                          AND b.end_time < $2
                        ORDER BY b.start_time DESC
                        LIMIT $3 OFFSET $4
                    "#,
                    booked_by as _,
                    now,
                    page.limit(),
                    page.offset(),
                )
                .fetch_all(self.db.inner_ref())
                .await
            }
            BookingFilter::Future => {
                sqlx::query_as!(
                    BookingRow,
                    r#"
                        SELECT
                            b.booking_id AS "booking_id: BookingId",
                            b.start_time,
                            b.end_time,
                            b.booking_status AS "booking_status: BookingStatusRow",
                            b.booked_by AS "booked_by: UserId",
                            u.user_name AS "user_name!",
                            b.item_id AS "item_id: ItemId",
                            i.item_name AS "item_name!",
                            i.owned_by AS "owned_by!: UserId"
                        FROM bookings AS b
                        INNER JOIN items AS i ON b.item_id = i.item_id
                        INNER JOIN users AS u ON b.booked_by = u.user_id
                        WHERE b.booked_by = $1
                          AND b.start_time > $2
                        ORDER BY b.start_time DESC
                        LIMIT $3 OFFSET $4
                    "#,
                    booked_by as _,
                    now,
                    page.limit(),
                    page.offset(),
                )
                .fetch_all(self.db.inner_ref())
                .await
            }
            BookingFilter::Waiting => {
                sqlx::query_as!(
                    BookingRow,
                    r#"
                        SELECT
                            b.booking_id AS "booking_id: BookingId",
                            b.start_time,
                            b.end_time,
                            b.booking_status AS "booking_status: BookingStatusRow",
                            b.booked_by AS "booked_by: UserId",
                            u.user_name AS "user_name!",
                            b.item_id AS "item_id: ItemId",
                            i.item_name AS "item_name!",
                            i.owned_by AS "owned_by!: UserId"
                        FROM bookings AS b
                        INNER JOIN items AS i ON b.item_id = i.item_id
                        INNER JOIN users AS u ON b.booked_by = u.user_id
                        WHERE b.booked_by = $1
                          AND b.booking_status = 'WAITING'
                        ORDER BY b.start_time DESC
                        LIMIT $2 OFFSET $3
                    "#,
                    booked_by as _,
                    page.limit(),
                    page.offset(),
                )
                .fetch_all(self.db.inner_ref())
                .await
            }
            BookingFilter::Rejected => {
                sqlx::query_as!(
                    BookingRow,
                    r#"
                        SELECT
                            b.booking_id AS "booking_id: BookingId",
                            b.start_time,
                            b.end_time,
                            b.booking_status AS "booking_status: BookingStatusRow",
                            b.booked_by AS "booked_by: UserId",
                            u.user_name AS "user_name!",
                            b.item_id AS "item_id: ItemId",
                            i.item_name AS "item_name!",
                            i.owned_by AS "owned_by!: UserId"
                        FROM bookings AS b
                        INNER JOIN items AS i ON b.item_id = i.item_id
                        INNER JOIN users AS u ON b.booked_by = u.user_id
                        WHERE b.booked_by = $1
                          AND b.booking_status = 'REJECTED'
                        ORDER BY b.start_time DESC
                        LIMIT $2 OFFSET $3
                    "#,
                    booked_by as _,
                    page.limit(),
                    page.offset(),
                )
                .fetch_all(self.db.inner_ref())
                .await
            }
        }
        .map_err(AppError::SpecificOperationError)?;

        Ok(rows.into_iter().map(Booking::from).collect())
    }

    // 所有アイテム視点の一覧を取得する
    async fn find_for_owner(
        &self,
        owned_by: UserId,
        filter: BookingFilter,
        page: PageQuery,
    ) -> AppResult<Vec<Booking>> {
        let now = Utc::now();
        let rows: Vec<BookingRow> = match filter {
            BookingFilter::All => {
                sqlx::query_as!(
                    BookingRow,
                    r#"
                        SELECT
                            b.booking_id AS "booking_id: BookingId",
                            b.start_time,
                            b.end_time,
                            b.booking_status AS "booking_status: BookingStatusRow",
                            b.booked_by AS "booked_by: UserId",
                            u.user_name AS "user_name!",
                            b.item_id AS "item_id: ItemId",
                            i.item_name AS "item_name!",
                            i.owned_by AS "owned_by!: UserId"
                        FROM bookings AS b
                        INNER JOIN items AS i ON b.item_id = i.item_id
                        INNER JOIN users AS u ON b.booked_by = u.user_id
                        WHERE i.owned_by = $1
                        ORDER BY b.start_time DESC
                        LIMIT $2 OFFSET $3
                    "#,
                    owned_by as _,
                    page.limit(),
                    page.offset(),
                )
                .fetch_all(self.db.inner_ref())
                .await
            }
            BookingFilter::Current => {
                sqlx::query_as!(
                    BookingRow,
                    r#"
                        SELECT
                            b.booking_id AS "booking_id: BookingId",
                            b.start_time,
                            b.end_time,
                            b.booking_status AS "booking_status: BookingStatusRow",
                            b.booked_by AS "booked_by: UserId",
                            u.user_name AS "user_name!",
                            b.item_id AS "item_id: ItemId",
                            i.item_name AS "item_name!",
                            i.owned_by AS "owned_by!: UserId"
                        FROM bookings AS b
                        INNER JOIN items AS i ON b.item_id = i.item_id
                        INNER JOIN users AS u ON b.booked_by = u.user_id
                        WHERE i.owned_by = $1
                          AND b.start_time <= $2
                          AND b.end_time > $2
                        ORDER BY b.start_time DESC
                        LIMIT $3 OFFSET $4
                    "#,
                    owned_by as _,
                    now,
                    page.limit(),
                    page.offset(),
                )
                .fetch_all(self.db.inner_ref())
                .await
            }
            BookingFilter::Past => {
                sqlx::query_as!(
                    BookingRow,
                    r#"
                        SELECT
                            b.booking_id AS "booking_id: BookingId",
                            b.start_time,
                            b.end_time,
                            b.booking_status AS "booking_status: BookingStatusRow",
                            b.booked_by AS "booked_by: UserId",
                            u.user_name AS "user_name!",
                            b.item_id AS "item_id: ItemId",
                            i.item_name AS "item_name!",
                            i.owned_by AS "owned_by!: UserId"
                        FROM bookings AS b
                        INNER JOIN items AS i ON b.item_id = i.item_id
                        INNER JOIN users AS u ON b.booked_by = u.user_id
                        WHERE i.owned_by = $1
                          AND b.end_time < $2
                        ORDER BY b.start_time DESC
                        LIMIT $3 OFFSET $4
                    "#,
                    owned_by as _,
                    now,
                    page.limit(),
                    page.offset(),
                )
                .fetch_all(self.db.inner_ref())
                .await
            }
            BookingFilter::Future => {
                sqlx::query_as!(
                    BookingRow,
                    r#"
                        SELECT
                            b.booking_id AS "booking_id: BookingId",
                            b.start_time,
                            b.end_time,
                            b.booking_status AS "booking_status: BookingStatusRow",
                            b.booked_by AS "booked_by: UserId",
                            u.user_name AS "user_name!",
                            b.item_id AS "item_id: ItemId",
                            i.item_name AS "item_name!",
                            i.owned_by AS "owned_by!: UserId"
                        FROM bookings AS b
                        INNER JOIN items AS i ON b.item_id = i.item_id
                        INNER JOIN users AS u ON b.booked_by = u.user_id
                        WHERE i.owned_by = $1
                          AND b.start_time > $2
                        ORDER BY b.start_time DESC
                        LIMIT $3 OFFSET $4
                    "#,
                    owned_by as _,
                    now,
                    page.limit(),
                    page.offset(),
                )
                .fetch_all(self.db.inner_ref())
                .await
            }
            BookingFilter::Waiting => {
                sqlx::query_as!(
                    BookingRow,
                    r#"
                        SELECT
                            b.booking_id AS "booking_id: BookingId",
                            b.start_time,
                            b.end_time,
                            b.booking_status AS "booking_status: BookingStatusRow",
                            b.booked_by AS "booked_by: UserId",
                            u.user_name AS "user_name!",
                            b.item_id AS "item_id: ItemId",
                            i.item_name AS "item_name!",
                            i.owned_by AS "owned_by!: UserId"
                        FROM bookings AS b
                        INNER JOIN items AS i ON b.item_id = i.item_id
                        INNER JOIN users AS u ON b.booked_by = u.user_id
                        WHERE i.owned_by = $1
                          AND b.booking_status = 'WAITING'
                        ORDER BY b.start_time DESC
                        LIMIT $2 OFFSET $3
                    "#,
                    owned_by as _,
                    page.limit(),
                    page.offset(),
                )
                .fetch_all(self.db.inner_ref())
                .await
            }
            BookingFilter::Rejected => {
                sqlx::query_as!(
                    BookingRow,
                    r#"
                        SELECT
                            b.booking_id AS "booking_id: BookingId",
                            b.start_time,
                            b.end_time,
                            b.booking_status AS "booking_status: BookingStatusRow",
                            b.booked_by AS "booked_by: UserId",
                            u.user_name AS "user_name!",
                            b.item_id AS "item_id: ItemId",
                            i.item_name AS "item_name!",
                            i.owned_by AS "owned_by!: UserId"
                        FROM bookings AS b
                        INNER JOIN items AS i ON b.item_id = i.item_id
                        INNER JOIN users AS u ON b.booked_by = u.user_id
                        WHERE i.owned_by = $1
                          AND b.booking_status = 'REJECTED'
                        ORDER BY b.start_time DESC
                        LIMIT $2 OFFSET $3
                    "#,
                    owned_by as _,
                    page.limit(),
                    page.offset(),
                )
                .fetch_all(self.db.inner_ref())
                .await
            }
        }
        .map_err(AppError::SpecificOperationError)?;

        Ok(rows.into_iter().map(Booking::from).collect())
    }

    // 複数アイテムの承認済み予約をまとめて取得する
    async fn find_approved_by_item_ids(&self, item_ids: &[ItemId]) -> AppResult<Vec<Booking>> {
        let ids = item_ids.iter().map(|id| id.raw()).collect::<Vec<_>>();
        sqlx::query_as!(
            BookingRow,
            r#"
                SELECT
                    b.booking_id AS "booking_id: BookingId",
                    b.start_time,
                    b.end_time,
                    b.booking_status AS "booking_status: BookingStatusRow",
                    b.booked_by AS "booked_by: UserId",
                    u.user_name AS "user_name!",
                    b.item_id AS "item_id: ItemId",
                    i.item_name AS "item_name!",
                    i.owned_by AS "owned_by!: UserId"
                FROM bookings AS b
                INNER JOIN items AS i ON b.item_id = i.item_id
                INNER JOIN users AS u ON b.booked_by = u.user_id
                WHERE b.item_id = ANY($1)
                  AND b.booking_status = 'APPROVED'
                ORDER BY b.start_time ASC
            "#,
            &ids
        )
        .fetch_all(self.db.inner_ref())
        .await
        .map(|rows| rows.into_iter().map(Booking::from).collect())
        .map_err(AppError::SpecificOperationError)
    }

    // 過去に借り終えた承認済み予約があるか
    async fn has_completed_rental(
        &self,
        booked_by: UserId,
        item_id: ItemId,
        as_of: DateTime<Utc>,
    ) -> AppResult<bool> {
        let row = sqlx::query!(
            r#"
                SELECT EXISTS (
                    SELECT 1
                    FROM bookings
                    WHERE booked_by = $1
                      AND item_id = $2
                      AND booking_status = 'APPROVED'
                      AND end_time < $3
                ) AS "completed!"
            "#,
            booked_by as _,
            item_id as _,
            as_of,
        )
        .fetch_one(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(row.completed)
    }
}

impl BookingRepositoryImpl {
    // create, decide メソッドでのトランザクションを利用するにあたり
    // トランザクション分離レベルを SERIALIZABLE にするために
    // 内部的に使うメソッド
    async fn set_transaction_serializable(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ) -> AppResult<()> {
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut **tx)
            .await
            .map_err(AppError::SpecificOperationError)?;
        Ok(())
    }

    // 書き込み直後の予約をトランザクション内で読み戻す
    async fn fetch_in_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        booking_id: BookingId,
    ) -> AppResult<Booking> {
        sqlx::query_as!(
            BookingRow,
            r#"
                SELECT
                    b.booking_id AS "booking_id: BookingId",
                    b.start_time,
                    b.end_time,
                    b.booking_status AS "booking_status: BookingStatusRow",
                    b.booked_by AS "booked_by: UserId",
                    u.user_name AS "user_name!",
                    b.item_id AS "item_id: ItemId",
                    i.item_name AS "item_name!",
                    i.owned_by AS "owned_by!: UserId"
                FROM bookings AS b
                INNER JOIN items AS i ON b.item_id = i.item_id
                INNER JOIN users AS u ON b.booked_by = u.user_id
                WHERE b.booking_id = $1
            "#,
            booking_id as _
        )
        .fetch_one(&mut **tx)
        .await
        .map(Booking::from)
        .map_err(AppError::SpecificOperationError)
    }
}
