//! Weighbill repository for `pd_weighbills`.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use sqlx::{MySql, MySqlPool, QueryBuilder};

use crate::errors::ApiError;
use crate::models::{
    DeliveryStatus, Pagination, Weighbill, WeighbillDetail, WeighbillListItem, WeighbillListQuery,
    WeighbillStatus,
};
use crate::repositories::{push_exact, push_fuzzy_tokens};

const LIST_SELECT: &str = r#"
    SELECT w.*,
           d.report_date AS delivery_report_date,
           d.warehouse AS delivery_warehouse,
           d.target_factory_id AS delivery_target_factory_id,
           d.target_factory_name AS delivery_target_factory_name,
           d.quantity AS delivery_quantity,
           d.driver_name AS delivery_driver_name,
           d.driver_phone AS delivery_driver_phone,
           d.driver_id_card AS delivery_driver_id_card,
           d.has_delivery_order AS delivery_has_delivery_order,
           d.delivery_order_image AS delivery_order_image,
           d.source_type AS delivery_source_type,
           d.shipper AS delivery_shipper,
           d.payee AS delivery_payee,
           d.service_fee AS delivery_service_fee,
           d.contract_no AS delivery_contract_no,
           d.contract_unit_price AS delivery_contract_unit_price,
           d.total_amount AS delivery_total_amount,
           d.status AS delivery_status
    FROM pd_weighbills w
    LEFT JOIN pd_deliveries d ON d.id = w.delivery_id
    WHERE 1=1"#;

/// Column values for a new weighbill.
#[derive(Debug, Clone, Default)]
pub struct NewWeighbill {
    pub weigh_date: Option<NaiveDate>,
    pub delivery_time: Option<NaiveDateTime>,
    pub weigh_ticket_no: Option<String>,
    pub contract_no: Option<String>,
    pub delivery_id: Option<i64>,
    pub vehicle_no: Option<String>,
    pub product_name: Option<String>,
    pub gross_weight: Option<Decimal>,
    pub tare_weight: Option<Decimal>,
    pub net_weight: Option<Decimal>,
    pub unit_price: Option<Decimal>,
    pub total_amount: Option<Decimal>,
    pub weighbill_image: Option<String>,
    pub ocr_status: String,
    pub ocr_raw_data: Option<String>,
    pub is_manual_corrected: i8,
    pub uploader_id: i64,
    pub uploader_name: String,
}

/// Partial weighbill update. Any update marks the bill as manually corrected.
#[derive(Debug, Default)]
pub struct WeighbillChanges {
    pub weigh_date: Option<NaiveDate>,
    pub delivery_time: Option<NaiveDateTime>,
    pub weigh_ticket_no: Option<String>,
    pub contract_no: Option<String>,
    pub delivery_id: Option<i64>,
    pub vehicle_no: Option<String>,
    pub product_name: Option<String>,
    pub gross_weight: Option<Decimal>,
    pub tare_weight: Option<Decimal>,
    pub net_weight: Option<Decimal>,
    pub unit_price: Option<Decimal>,
    pub total_amount: Option<Decimal>,
    pub weighbill_image: Option<String>,
}

#[derive(Clone)]
pub struct WeighbillRepository {
    pool: MySqlPool,
}

impl WeighbillRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, w: &NewWeighbill) -> Result<i64, ApiError> {
        let result = sqlx::query(
            r#"
            INSERT INTO pd_weighbills
                (weigh_date, delivery_time, weigh_ticket_no, contract_no, delivery_id,
                 vehicle_no, product_name, gross_weight, tare_weight, net_weight,
                 unit_price, total_amount, weighbill_image, ocr_status, ocr_raw_data,
                 is_manual_corrected, uploader_id, uploader_name, uploaded_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, NOW())
            "#,
        )
        .bind(w.weigh_date)
        .bind(w.delivery_time)
        .bind(&w.weigh_ticket_no)
        .bind(&w.contract_no)
        .bind(w.delivery_id)
        .bind(&w.vehicle_no)
        .bind(&w.product_name)
        .bind(w.gross_weight)
        .bind(w.tare_weight)
        .bind(w.net_weight)
        .bind(w.unit_price)
        .bind(w.total_amount)
        .bind(&w.weighbill_image)
        .bind(&w.ocr_status)
        .bind(&w.ocr_raw_data)
        .bind(w.is_manual_corrected)
        .bind(w.uploader_id)
        .bind(&w.uploader_name)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_id() as i64)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Weighbill>, ApiError> {
        Ok(
            sqlx::query_as::<_, Weighbill>("SELECT * FROM pd_weighbills WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    /// Weighbill with the linked delivery's shipper and payee.
    pub async fn find_detail(&self, id: i64) -> Result<Option<WeighbillDetail>, ApiError> {
        Ok(sqlx::query_as::<_, WeighbillDetail>(
            r#"
            SELECT w.*, d.shipper, d.payee
            FROM pd_weighbills w
            LEFT JOIN pd_deliveries d ON d.id = w.delivery_id
            WHERE w.id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    pub async fn list(
        &self,
        query: &WeighbillListQuery,
        tokens: &[String],
        pagination: Pagination,
    ) -> Result<(Vec<WeighbillListItem>, u64), ApiError> {
        fn push_filters(qb: &mut QueryBuilder<'_, MySql>, query: &WeighbillListQuery, tokens: &[String]) {
            push_exact(qb, "w.ocr_status", query.exact_ocr_status.as_deref());
            push_exact(qb, "w.vehicle_no", query.exact_vehicle_no.as_deref());
            push_exact(qb, "w.contract_no", query.exact_contract_no.as_deref());
            if let Some(from) = query.date_from {
                qb.push(" AND w.weigh_date >= ").push_bind(from);
            }
            if let Some(to) = query.date_to {
                qb.push(" AND w.weigh_date <= ").push_bind(to);
            }
            push_fuzzy_tokens(
                qb,
                tokens,
                &["w.contract_no", "w.vehicle_no", "w.product_name", "w.weigh_ticket_no"],
            );
        }

        let mut count_qb = QueryBuilder::<MySql>::new("SELECT COUNT(*) FROM pd_weighbills w WHERE 1=1");
        push_filters(&mut count_qb, query, tokens);
        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::<MySql>::new(LIST_SELECT);
        push_filters(&mut qb, query, tokens);
        qb.push(" ORDER BY w.created_at DESC, w.id DESC LIMIT ")
            .push_bind(pagination.limit())
            .push(" OFFSET ")
            .push_bind(pagination.offset());
        let items = qb
            .build_query_as::<WeighbillListItem>()
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(WeighbillListItem::with_union_fee)
            .collect();

        Ok((items, total as u64))
    }

    pub async fn update(&self, id: i64, c: WeighbillChanges) -> Result<(), ApiError> {
        let mut qb = QueryBuilder::<MySql>::new("UPDATE pd_weighbills SET is_manual_corrected = 1, ocr_status = ");
        qb.push_bind(WeighbillStatus::Corrected.as_str());

        macro_rules! set {
            ($field:ident) => {
                if let Some(v) = c.$field {
                    qb.push(concat!(", ", stringify!($field), " = ")).push_bind(v);
                }
            };
        }

        set!(weigh_date);
        set!(delivery_time);
        set!(weigh_ticket_no);
        set!(contract_no);
        set!(delivery_id);
        set!(vehicle_no);
        set!(product_name);
        set!(gross_weight);
        set!(tare_weight);
        set!(net_weight);
        set!(unit_price);
        set!(total_amount);
        set!(weighbill_image);

        qb.push(" WHERE id = ").push_bind(id);
        qb.build().execute(&self.pool).await?;
        Ok(())
    }

    /// Marks the bill confirmed and completes its delivery, atomically.
    ///
    /// A cancelled or already completed delivery keeps its status.
    pub async fn confirm(&self, id: i64, delivery_id: Option<i64>) -> Result<(), ApiError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE pd_weighbills SET ocr_status = ? WHERE id = ?")
            .bind(WeighbillStatus::Confirmed.as_str())
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if let Some(delivery_id) = delivery_id {
            let status: Option<String> =
                sqlx::query_scalar("SELECT status FROM pd_deliveries WHERE id = ? FOR UPDATE")
                    .bind(delivery_id)
                    .fetch_optional(&mut *tx)
                    .await?;

            let is_final = status
                .and_then(|s| s.parse::<DeliveryStatus>().ok())
                .map(|s| s.is_final());
            if is_final == Some(false) {
                sqlx::query("UPDATE pd_deliveries SET status = ? WHERE id = ?")
                    .bind(DeliveryStatus::Completed.as_str())
                    .bind(delivery_id)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn set_payment_schedule(&self, id: i64, date: NaiveDate) -> Result<u64, ApiError> {
        Ok(
            sqlx::query("UPDATE pd_weighbills SET payment_schedule_date = ? WHERE id = ?")
                .bind(date)
                .bind(id)
                .execute(&self.pool)
                .await?
                .rows_affected(),
        )
    }

    pub async fn delete(&self, id: i64) -> Result<u64, ApiError> {
        Ok(sqlx::query("DELETE FROM pd_weighbills WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected())
    }
}
