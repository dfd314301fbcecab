//! Balance ledger and payment receipt repository.
//!
//! Covers `pd_balance_details`, `pd_payment_receipts` and the
//! `pd_receipt_settlements` join table.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use sqlx::{MySql, MySqlPool, QueryBuilder};

use crate::constants::{ERR_RECEIPT_ALREADY_VERIFIED, ERR_RECEIPT_NOT_FOUND, MAX_MATCH_CANDIDATES};
use crate::errors::ApiError;
use crate::models::{
    cap_settlement, payment_status_for, BalanceDetail, BalanceListItem, BalanceListQuery,
    BalanceReceipt, GenerateBalanceQuery, GeneratedBalance, Pagination, PayeeDetailsQuery,
    PayeeSummary, PayeeSummaryQuery, PaymentReceipt, ReceiptListQuery, ReceiptSettlement,
    ReceiptStatus, RecalculatedBalance, SettledItem, UnbalancedWeighbill, VerifyPaymentResult,
    WeighbillStatus,
};
use crate::repositories::{like_pattern, push_exact, push_fuzzy_tokens};

/// Column values for a new payment receipt.
#[derive(Debug, Clone)]
pub struct NewReceipt {
    pub receipt_no: Option<String>,
    pub receipt_image: Option<String>,
    pub payment_date: NaiveDate,
    pub payment_time: Option<NaiveTime>,
    pub payer_name: Option<String>,
    pub payer_account: Option<String>,
    pub payee_name: String,
    pub payee_account: Option<String>,
    pub amount: Decimal,
    pub bank_name: Option<String>,
    pub remark: Option<String>,
    pub ocr_status: ReceiptStatus,
    pub is_manual_corrected: bool,
    pub ocr_raw_data: Option<String>,
}

#[derive(Clone)]
pub struct BalanceRepository {
    pool: MySqlPool,
}

impl BalanceRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Creates balance rows for confirmed weighbills that have none yet.
    pub async fn generate(
        &self,
        filter: &GenerateBalanceQuery,
    ) -> Result<Vec<GeneratedBalance>, ApiError> {
        let mut tx = self.pool.begin().await?;

        let mut qb = QueryBuilder::<MySql>::new(
            r#"
            SELECT w.id AS weighbill_id, w.contract_no, w.delivery_id, w.vehicle_no,
                   w.net_weight, w.unit_price, d.driver_name, d.driver_phone
            FROM pd_weighbills w
            LEFT JOIN pd_deliveries d ON d.id = w.delivery_id
            WHERE w.ocr_status = "#,
        );
        qb.push_bind(WeighbillStatus::Confirmed.as_str());
        qb.push(" AND NOT EXISTS (SELECT 1 FROM pd_balance_details b WHERE b.weighbill_id = w.id)");
        push_exact(&mut qb, "w.contract_no", filter.contract_no.as_deref());
        if let Some(delivery_id) = filter.delivery_id {
            qb.push(" AND w.delivery_id = ").push_bind(delivery_id);
        }
        if let Some(weighbill_id) = filter.weighbill_id {
            qb.push(" AND w.id = ").push_bind(weighbill_id);
        }
        qb.push(" ORDER BY w.id");

        let pending = qb
            .build_query_as::<UnbalancedWeighbill>()
            .fetch_all(&mut *tx)
            .await?;

        let mut generated = Vec::with_capacity(pending.len());
        for row in pending {
            let payable = row.payable();
            let result = sqlx::query(
                r#"
                INSERT IGNORE INTO pd_balance_details
                    (contract_no, delivery_id, weighbill_id, driver_name, driver_phone, vehicle_no,
                     payable_amount, paid_amount, balance_amount, payment_status)
                VALUES (?, ?, ?, ?, ?, ?, ?, 0, ?, 0)
                "#,
            )
            .bind(&row.contract_no)
            .bind(row.delivery_id)
            .bind(row.weighbill_id)
            .bind(&row.driver_name)
            .bind(&row.driver_phone)
            .bind(&row.vehicle_no)
            .bind(payable)
            .bind(payable)
            .execute(&mut *tx)
            .await?;

            // a concurrent run already created this row
            if result.rows_affected() == 0 {
                continue;
            }
            generated.push(GeneratedBalance {
                balance_id: result.last_insert_id() as i64,
                weighbill_id: row.weighbill_id,
                driver_name: row.driver_name,
                payable_amount: payable,
            });
        }

        tx.commit().await?;
        Ok(generated)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<BalanceDetail>, ApiError> {
        Ok(
            sqlx::query_as::<_, BalanceDetail>("SELECT * FROM pd_balance_details WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    /// Receipts settled against a balance row, newest payment first.
    pub async fn receipts_for_balance(&self, balance_id: i64) -> Result<Vec<BalanceReceipt>, ApiError> {
        Ok(sqlx::query_as::<_, BalanceReceipt>(
            r#"
            SELECT r.id AS receipt_id, r.payee_name, r.amount, r.payment_date,
                   s.settled_amount, r.receipt_image
            FROM pd_receipt_settlements s
            JOIN pd_payment_receipts r ON r.id = s.receipt_id
            WHERE s.balance_id = ?
            ORDER BY r.payment_date DESC, r.id DESC
            "#,
        )
        .bind(balance_id)
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn list(
        &self,
        query: &BalanceListQuery,
        tokens: &[String],
        pagination: Pagination,
    ) -> Result<(Vec<BalanceListItem>, u64), ApiError> {
        fn push_filters(qb: &mut QueryBuilder<'_, MySql>, query: &BalanceListQuery, tokens: &[String]) {
            push_exact(qb, "b.contract_no", query.exact_contract_no.as_deref());
            push_exact(qb, "b.driver_name", query.exact_driver_name.as_deref());
            if let Some(status) = query.payment_status {
                qb.push(" AND b.payment_status = ").push_bind(status);
            }
            push_fuzzy_tokens(
                qb,
                tokens,
                &["b.contract_no", "b.driver_name", "b.driver_phone", "b.vehicle_no"],
            );
        }

        let mut count_qb =
            QueryBuilder::<MySql>::new("SELECT COUNT(*) FROM pd_balance_details b WHERE 1=1");
        push_filters(&mut count_qb, query, tokens);
        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::<MySql>::new(
            r#"
            SELECT b.*, w.weighbill_image,
                   (SELECT COUNT(*) FROM pd_receipt_settlements s WHERE s.balance_id = b.id) AS receipt_count
            FROM pd_balance_details b
            LEFT JOIN pd_weighbills w ON w.id = b.weighbill_id
            WHERE 1=1"#,
        );
        push_filters(&mut qb, query, tokens);
        qb.push(" ORDER BY b.created_at DESC, b.id DESC LIMIT ")
            .push_bind(pagination.limit())
            .push(" OFFSET ")
            .push_bind(pagination.offset());
        let items = qb
            .build_query_as::<BalanceListItem>()
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(BalanceListItem::with_status_name)
            .collect();

        Ok((items, total as u64))
    }

    /// Recomputes balance and status from payable and paid amounts.
    pub async fn recalculate(&self, id: i64) -> Result<Option<RecalculatedBalance>, ApiError> {
        let Some(balance) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        let remaining = balance.payable_amount - balance.paid_amount;
        let status = payment_status_for(balance.payable_amount, balance.paid_amount).as_i8();
        sqlx::query(
            "UPDATE pd_balance_details SET balance_amount = ?, payment_status = ? WHERE id = ?",
        )
        .bind(remaining)
        .bind(status)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(Some(RecalculatedBalance {
            payable: balance.payable_amount,
            paid: balance.paid_amount,
            balance: remaining,
            status,
        }))
    }

    /// Open balances of a payee whose payable is within a cent of `amount`.
    pub async fn match_pending(
        &self,
        payee_name: &str,
        amount: Decimal,
        days: i64,
    ) -> Result<Vec<BalanceDetail>, ApiError> {
        Ok(sqlx::query_as::<_, BalanceDetail>(
            r#"
            SELECT * FROM pd_balance_details
            WHERE payment_status IN (0, 1)
              AND driver_name LIKE ?
              AND ABS(payable_amount - ?) <= 0.01
              AND created_at >= DATE_SUB(NOW(), INTERVAL ? DAY)
            ORDER BY balance_amount DESC, created_at ASC
            LIMIT ?
            "#,
        )
        .bind(like_pattern(payee_name.trim()))
        .bind(amount)
        .bind(days)
        .bind(MAX_MATCH_CANDIDATES)
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn payee_summary(
        &self,
        query: &PayeeSummaryQuery,
        tokens: &[String],
        min_balance: Decimal,
    ) -> Result<Vec<PayeeSummary>, ApiError> {
        let mut qb = QueryBuilder::<MySql>::new(
            r#"
            SELECT driver_name, driver_phone,
                   COUNT(*) AS bill_count,
                   COALESCE(SUM(payable_amount), 0) AS total_payable,
                   COALESCE(SUM(paid_amount), 0) AS total_paid,
                   COALESCE(SUM(balance_amount), 0) AS total_balance,
                   CAST(GROUP_CONCAT(DISTINCT contract_no ORDER BY contract_no) AS CHAR) AS contract_nos,
                   CAST(GROUP_CONCAT(DISTINCT vehicle_no ORDER BY vehicle_no) AS CHAR) AS vehicle_nos,
                   CAST(SUM(CASE WHEN payment_status = 0 THEN 1 ELSE 0 END) AS SIGNED) AS pending_count,
                   CAST(SUM(CASE WHEN payment_status = 1 THEN 1 ELSE 0 END) AS SIGNED) AS partial_count,
                   CAST(SUM(CASE WHEN payment_status = 2 THEN 1 ELSE 0 END) AS SIGNED) AS settled_count,
                   MAX(created_at) AS latest_created_at
            FROM pd_balance_details
            WHERE 1=1"#,
        );
        if let Some(name) = query.payee_name.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            qb.push(" AND driver_name LIKE ").push_bind(like_pattern(name));
        }
        push_exact(&mut qb, "driver_phone", query.driver_phone.as_deref());
        if let Some(status) = query.payment_status {
            qb.push(" AND payment_status = ").push_bind(status);
        }
        push_fuzzy_tokens(
            &mut qb,
            tokens,
            &["driver_name", "driver_phone", "contract_no", "vehicle_no"],
        );
        qb.push(" GROUP BY driver_name, driver_phone HAVING total_balance >= ")
            .push_bind(min_balance)
            .push(" ORDER BY total_balance DESC, latest_created_at DESC");

        Ok(qb
            .build_query_as::<PayeeSummary>()
            .fetch_all(&self.pool)
            .await?)
    }

    /// A payee's balance rows, oldest first.
    pub async fn payee_details(
        &self,
        payee_name: &str,
        query: &PayeeDetailsQuery,
    ) -> Result<Vec<BalanceDetail>, ApiError> {
        let mut qb = QueryBuilder::<MySql>::new("SELECT * FROM pd_balance_details WHERE driver_name = ");
        qb.push_bind(payee_name.trim().to_string());
        push_exact(&mut qb, "driver_phone", query.driver_phone.as_deref());
        if let Some(status) = query.payment_status {
            qb.push(" AND payment_status = ").push_bind(status);
        }
        qb.push(" ORDER BY created_at ASC, id ASC");

        Ok(qb
            .build_query_as::<BalanceDetail>()
            .fetch_all(&self.pool)
            .await?)
    }

    /// `(balance_id, remaining)` of a payee's unsettled rows, oldest first.
    pub async fn open_balances(
        &self,
        payee_name: &str,
        driver_phone: Option<&str>,
    ) -> Result<Vec<(i64, Decimal)>, ApiError> {
        let mut qb = QueryBuilder::<MySql>::new(
            "SELECT id, balance_amount FROM pd_balance_details WHERE payment_status IN (0, 1) AND driver_name = ",
        );
        qb.push_bind(payee_name.trim().to_string());
        push_exact(&mut qb, "driver_phone", driver_phone);
        qb.push(" ORDER BY created_at ASC, id ASC");

        Ok(qb
            .build_query_as::<(i64, Decimal)>()
            .fetch_all(&self.pool)
            .await?)
    }

    pub async fn insert_receipt(&self, r: &NewReceipt) -> Result<i64, ApiError> {
        let result = sqlx::query(
            r#"
            INSERT INTO pd_payment_receipts
                (receipt_no, receipt_image, payment_date, payment_time, payer_name, payer_account,
                 payee_name, payee_account, amount, bank_name, remark,
                 ocr_status, is_manual_corrected, ocr_raw_data)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&r.receipt_no)
        .bind(&r.receipt_image)
        .bind(r.payment_date)
        .bind(r.payment_time)
        .bind(&r.payer_name)
        .bind(&r.payer_account)
        .bind(r.payee_name.trim())
        .bind(&r.payee_account)
        .bind(r.amount)
        .bind(&r.bank_name)
        .bind(&r.remark)
        .bind(r.ocr_status.as_i8())
        .bind(r.is_manual_corrected as i8)
        .bind(&r.ocr_raw_data)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_id() as i64)
    }

    pub async fn find_receipt(&self, id: i64) -> Result<Option<PaymentReceipt>, ApiError> {
        Ok(
            sqlx::query_as::<_, PaymentReceipt>("SELECT * FROM pd_payment_receipts WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    pub async fn set_receipt_image(&self, id: i64, image: &str) -> Result<(), ApiError> {
        sqlx::query("UPDATE pd_payment_receipts SET receipt_image = ? WHERE id = ?")
            .bind(image)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn receipt_settlements(&self, receipt_id: i64) -> Result<Vec<ReceiptSettlement>, ApiError> {
        Ok(sqlx::query_as::<_, ReceiptSettlement>(
            r#"
            SELECT b.id AS balance_id, b.driver_name, b.vehicle_no, b.payable_amount, s.settled_amount
            FROM pd_receipt_settlements s
            JOIN pd_balance_details b ON b.id = s.balance_id
            WHERE s.receipt_id = ?
            ORDER BY s.id
            "#,
        )
        .bind(receipt_id)
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn list_receipts(
        &self,
        query: &ReceiptListQuery,
        tokens: &[String],
        pagination: Pagination,
    ) -> Result<(Vec<PaymentReceipt>, u64), ApiError> {
        fn push_filters(qb: &mut QueryBuilder<'_, MySql>, query: &ReceiptListQuery, tokens: &[String]) {
            push_exact(qb, "payee_name", query.exact_payee_name.as_deref());
            if let Some(status) = query.ocr_status {
                qb.push(" AND ocr_status = ").push_bind(status);
            }
            if let Some(from) = query.date_from {
                qb.push(" AND payment_date >= ").push_bind(from);
            }
            if let Some(to) = query.date_to {
                qb.push(" AND payment_date <= ").push_bind(to);
            }
            push_fuzzy_tokens(
                qb,
                tokens,
                &["receipt_no", "payee_name", "payer_name", "bank_name", "remark"],
            );
        }

        let mut count_qb =
            QueryBuilder::<MySql>::new("SELECT COUNT(*) FROM pd_payment_receipts WHERE 1=1");
        push_filters(&mut count_qb, query, tokens);
        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::<MySql>::new("SELECT * FROM pd_payment_receipts WHERE 1=1");
        push_filters(&mut qb, query, tokens);
        qb.push(" ORDER BY payment_date DESC, id DESC LIMIT ")
            .push_bind(pagination.limit())
            .push(" OFFSET ")
            .push_bind(pagination.offset());
        let receipts = qb
            .build_query_as::<PaymentReceipt>()
            .fetch_all(&self.pool)
            .await?;

        Ok((receipts, total as u64))
    }

    /// Settles a receipt against balance rows in one transaction.
    ///
    /// Each amount is capped to the row's remaining balance and unknown rows
    /// are skipped. The receipt becomes verified once the settled total covers
    /// its amount, otherwise confirmed.
    pub async fn settle(
        &self,
        receipt_id: i64,
        items: &[(i64, Decimal)],
    ) -> Result<VerifyPaymentResult, ApiError> {
        let mut tx = self.pool.begin().await?;

        let receipt: Option<(Decimal, i8)> = sqlx::query_as(
            "SELECT amount, ocr_status FROM pd_payment_receipts WHERE id = ? FOR UPDATE",
        )
        .bind(receipt_id)
        .fetch_optional(&mut *tx)
        .await?;
        let (receipt_amount, receipt_status) =
            receipt.ok_or_else(|| ApiError::NotFound(ERR_RECEIPT_NOT_FOUND.to_string()))?;
        if ReceiptStatus::from_i8(receipt_status) == Some(ReceiptStatus::Verified) {
            return Err(ApiError::BadRequest(ERR_RECEIPT_ALREADY_VERIFIED.to_string()));
        }

        let mut total_settled = Decimal::ZERO;
        let mut settled = Vec::with_capacity(items.len());
        for (balance_id, requested) in items {
            let row: Option<(Decimal, Decimal, Decimal)> = sqlx::query_as(
                "SELECT payable_amount, paid_amount, balance_amount FROM pd_balance_details WHERE id = ? FOR UPDATE",
            )
            .bind(balance_id)
            .fetch_optional(&mut *tx)
            .await?;
            let Some((payable, paid, remaining)) = row else {
                continue;
            };

            let amount = cap_settlement(*requested, remaining);
            if amount <= Decimal::ZERO {
                continue;
            }

            let paid = paid + amount;
            let balance_amount = payable - paid;
            let status = payment_status_for(payable, paid).as_i8();
            sqlx::query(
                "UPDATE pd_balance_details SET paid_amount = ?, balance_amount = ?, payment_status = ? WHERE id = ?",
            )
            .bind(paid)
            .bind(balance_amount)
            .bind(status)
            .bind(balance_id)
            .execute(&mut *tx)
            .await?;

            sqlx::query(
                r#"
                INSERT INTO pd_receipt_settlements (receipt_id, balance_id, settled_amount)
                VALUES (?, ?, ?)
                ON DUPLICATE KEY UPDATE settled_amount = settled_amount + VALUES(settled_amount)
                "#,
            )
            .bind(receipt_id)
            .bind(balance_id)
            .bind(amount)
            .execute(&mut *tx)
            .await?;

            total_settled += amount;
            settled.push(SettledItem {
                balance_id: *balance_id,
                settled_amount: amount,
                paid_amount: paid,
                balance_amount,
                payment_status: status,
            });
        }

        let receipt_status = if total_settled >= receipt_amount {
            ReceiptStatus::Verified
        } else {
            ReceiptStatus::Confirmed
        };
        sqlx::query("UPDATE pd_payment_receipts SET ocr_status = ? WHERE id = ?")
            .bind(receipt_status.as_i8())
            .bind(receipt_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(VerifyPaymentResult {
            receipt_id,
            total_settled,
            receipt_status: receipt_status.as_i8(),
            items: settled,
        })
    }
}
