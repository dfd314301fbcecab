//! Delivery repository for `pd_deliveries`.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{MySql, MySqlPool, QueryBuilder};

use crate::errors::ApiError;
use crate::models::{Delivery, DeliveryListQuery, DeliveryStatus, Pagination};
use crate::repositories::{push_exact, push_fuzzy_tokens};

/// Column values for a new delivery.
#[derive(Debug, Clone, Default)]
pub struct NewDelivery {
    pub report_date: Option<NaiveDate>,
    pub warehouse: Option<String>,
    pub target_factory_id: Option<i64>,
    pub target_factory_name: Option<String>,
    pub product_name: Option<String>,
    pub quantity: Option<Decimal>,
    pub vehicle_no: Option<String>,
    pub driver_name: Option<String>,
    pub driver_phone: Option<String>,
    pub driver_id_card: Option<String>,
    pub has_delivery_order: String,
    pub delivery_order_image: Option<String>,
    pub source_type: String,
    pub shipper: Option<String>,
    pub payee: Option<String>,
    pub service_fee: Decimal,
    pub contract_no: Option<String>,
    pub contract_unit_price: Option<Decimal>,
    pub total_amount: Option<Decimal>,
    pub status: String,
}

/// Partial delivery update.
#[derive(Debug, Default)]
pub struct DeliveryChanges {
    pub report_date: Option<NaiveDate>,
    pub warehouse: Option<String>,
    pub target_factory_id: Option<i64>,
    pub target_factory_name: Option<String>,
    pub product_name: Option<String>,
    pub quantity: Option<Decimal>,
    pub vehicle_no: Option<String>,
    pub driver_name: Option<String>,
    pub driver_phone: Option<String>,
    pub driver_id_card: Option<String>,
    pub has_delivery_order: Option<String>,
    pub delivery_order_image: Option<String>,
    pub source_type: Option<String>,
    pub shipper: Option<String>,
    pub payee: Option<String>,
    pub service_fee: Option<Decimal>,
    pub contract_no: Option<String>,
    pub contract_unit_price: Option<Decimal>,
    pub total_amount: Option<Decimal>,
    pub status: Option<String>,
}

#[derive(Clone)]
pub struct DeliveryRepository {
    pool: MySqlPool,
}

impl DeliveryRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, d: &NewDelivery) -> Result<i64, ApiError> {
        let result = sqlx::query(
            r#"
            INSERT INTO pd_deliveries
                (report_date, warehouse, target_factory_id, target_factory_name,
                 product_name, quantity, vehicle_no, driver_name, driver_phone, driver_id_card,
                 has_delivery_order, delivery_order_image, source_type,
                 shipper, payee, service_fee, contract_no, contract_unit_price, total_amount, status)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(d.report_date)
        .bind(&d.warehouse)
        .bind(d.target_factory_id)
        .bind(&d.target_factory_name)
        .bind(&d.product_name)
        .bind(d.quantity)
        .bind(&d.vehicle_no)
        .bind(&d.driver_name)
        .bind(&d.driver_phone)
        .bind(&d.driver_id_card)
        .bind(&d.has_delivery_order)
        .bind(&d.delivery_order_image)
        .bind(&d.source_type)
        .bind(&d.shipper)
        .bind(&d.payee)
        .bind(d.service_fee)
        .bind(&d.contract_no)
        .bind(d.contract_unit_price)
        .bind(d.total_amount)
        .bind(&d.status)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_id() as i64)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Delivery>, ApiError> {
        Ok(
            sqlx::query_as::<_, Delivery>("SELECT * FROM pd_deliveries WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    /// Delivery of the same vehicle reported within a day of `weigh_date`,
    /// nearest date first, then newest.
    pub async fn match_for_weighing(
        &self,
        vehicle_no: &str,
        weigh_date: NaiveDate,
    ) -> Result<Option<Delivery>, ApiError> {
        Ok(sqlx::query_as::<_, Delivery>(
            r#"
            SELECT * FROM pd_deliveries
            WHERE vehicle_no = ?
              AND report_date BETWEEN DATE_SUB(?, INTERVAL 1 DAY) AND DATE_ADD(?, INTERVAL 1 DAY)
              AND status != ?
            ORDER BY ABS(DATEDIFF(report_date, ?)), created_at DESC
            LIMIT 1
            "#,
        )
        .bind(vehicle_no)
        .bind(weigh_date)
        .bind(weigh_date)
        .bind(DeliveryStatus::Cancelled.as_str())
        .bind(weigh_date)
        .fetch_optional(&self.pool)
        .await?)
    }

    pub async fn list(
        &self,
        query: &DeliveryListQuery,
        tokens: &[String],
        pagination: Pagination,
    ) -> Result<(Vec<Delivery>, u64), ApiError> {
        fn push_filters(qb: &mut QueryBuilder<'_, MySql>, query: &DeliveryListQuery, tokens: &[String]) {
            push_exact(qb, "target_factory_name", query.exact_target_factory_name.as_deref());
            push_exact(qb, "status", query.exact_status.as_deref());
            push_exact(qb, "vehicle_no", query.exact_vehicle_no.as_deref());
            push_exact(qb, "driver_name", query.exact_driver_name.as_deref());
            push_exact(qb, "driver_phone", query.exact_driver_phone.as_deref());
            push_fuzzy_tokens(
                qb,
                tokens,
                &["vehicle_no", "driver_name", "driver_phone", "target_factory_name", "product_name"],
            );
            if let Some(from) = query.date_from {
                qb.push(" AND report_date >= ").push_bind(from);
            }
            if let Some(to) = query.date_to {
                qb.push(" AND report_date <= ").push_bind(to);
            }
        }

        let mut count_qb = QueryBuilder::<MySql>::new("SELECT COUNT(*) FROM pd_deliveries WHERE 1=1");
        push_filters(&mut count_qb, query, tokens);
        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::<MySql>::new("SELECT * FROM pd_deliveries WHERE 1=1");
        push_filters(&mut qb, query, tokens);
        qb.push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(pagination.limit())
            .push(" OFFSET ")
            .push_bind(pagination.offset());
        let items = qb.build_query_as::<Delivery>().fetch_all(&self.pool).await?;

        Ok((items, total as u64))
    }

    /// Returns false when there was nothing to change.
    pub async fn update(&self, id: i64, c: DeliveryChanges) -> Result<bool, ApiError> {
        let mut qb = QueryBuilder::<MySql>::new("UPDATE pd_deliveries SET ");
        let mut sets = qb.separated(", ");
        let mut any = false;

        macro_rules! set {
            ($field:ident) => {
                if let Some(v) = c.$field {
                    sets.push(concat!(stringify!($field), " = ")).push_bind_unseparated(v);
                    any = true;
                }
            };
        }

        set!(report_date);
        set!(warehouse);
        set!(target_factory_id);
        set!(target_factory_name);
        set!(product_name);
        set!(quantity);
        set!(vehicle_no);
        set!(driver_name);
        set!(driver_phone);
        set!(driver_id_card);
        set!(has_delivery_order);
        set!(delivery_order_image);
        set!(source_type);
        set!(shipper);
        set!(payee);
        set!(service_fee);
        set!(contract_no);
        set!(contract_unit_price);
        set!(total_amount);
        set!(status);

        if !any {
            return Ok(false);
        }
        qb.push(" WHERE id = ").push_bind(id);
        qb.build().execute(&self.pool).await?;
        Ok(true)
    }

    pub async fn clear_order_image(&self, id: i64) -> Result<(), ApiError> {
        sqlx::query("UPDATE pd_deliveries SET delivery_order_image = NULL WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn delete(&self, id: i64) -> Result<u64, ApiError> {
        Ok(sqlx::query("DELETE FROM pd_deliveries WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected())
    }
}
