//! Contract repository for `pd_contracts` and `pd_contract_products`.

use chrono::NaiveDate;
use log::debug;
use rust_decimal::Decimal;
use sqlx::{MySql, MySqlConnection, MySqlPool, QueryBuilder};

use crate::errors::ApiError;
use crate::models::{
    normalize_products, Contract, ContractExportRow, ContractListItem, ContractListQuery,
    ContractProduct, ContractProductInput, ContractStatus, Pagination, PricedProduct,
};
use crate::repositories::{like_pattern, push_exact};

/// Column values for a new contract, after defaults and derived fields.
#[derive(Debug, Clone)]
pub struct NewContract {
    pub contract_no: String,
    pub contract_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub smelter_company: Option<String>,
    pub total_quantity: Option<Decimal>,
    pub truck_count: Option<Decimal>,
    pub arrival_payment_ratio: Decimal,
    pub final_payment_ratio: Decimal,
    pub contract_image_path: Option<String>,
    pub status: String,
    pub remarks: Option<String>,
    pub products: Vec<ContractProductInput>,
}

/// Partial contract update; `products` replaces the product list when set.
#[derive(Debug, Default)]
pub struct ContractChanges {
    pub contract_no: Option<String>,
    pub contract_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub smelter_company: Option<String>,
    pub total_quantity: Option<Decimal>,
    pub truck_count: Option<Decimal>,
    pub arrival_payment_ratio: Option<Decimal>,
    pub final_payment_ratio: Option<Decimal>,
    pub contract_image_path: Option<String>,
    pub status: Option<String>,
    pub remarks: Option<String>,
    pub products: Option<Vec<ContractProductInput>>,
}

impl ContractChanges {
    fn has_column_changes(&self) -> bool {
        self.contract_no.is_some()
            || self.contract_date.is_some()
            || self.end_date.is_some()
            || self.smelter_company.is_some()
            || self.total_quantity.is_some()
            || self.truck_count.is_some()
            || self.arrival_payment_ratio.is_some()
            || self.final_payment_ratio.is_some()
            || self.contract_image_path.is_some()
            || self.status.is_some()
            || self.remarks.is_some()
    }

    pub fn is_empty(&self) -> bool {
        !self.has_column_changes() && self.products.is_none()
    }
}

#[derive(Clone)]
pub struct ContractRepository {
    pool: MySqlPool,
}

impl ContractRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Id of an existing contract equal to `contract` in every business field
    /// and in its normalized product list.
    pub async fn find_duplicate(&self, contract: &NewContract) -> Result<Option<i64>, ApiError> {
        let candidates: Vec<i64> = sqlx::query_scalar(
            r#"
            SELECT id FROM pd_contracts
            WHERE contract_date <=> ?
              AND end_date <=> ?
              AND smelter_company <=> ?
              AND total_quantity <=> ?
              AND arrival_payment_ratio <=> ?
              AND final_payment_ratio <=> ?
              AND status <=> ?
              AND remarks <=> ?
            "#,
        )
        .bind(contract.contract_date)
        .bind(contract.end_date)
        .bind(&contract.smelter_company)
        .bind(contract.total_quantity)
        .bind(contract.arrival_payment_ratio)
        .bind(contract.final_payment_ratio)
        .bind(&contract.status)
        .bind(&contract.remarks)
        .fetch_all(&self.pool)
        .await?;

        if candidates.is_empty() {
            return Ok(None);
        }

        let wanted = normalize_products(
            contract
                .products
                .iter()
                .map(|p| (p.product_name.as_str(), p.unit_price)),
        );

        for id in candidates {
            let existing: Vec<(String, Option<Decimal>)> = sqlx::query_as(
                "SELECT product_name, unit_price FROM pd_contract_products WHERE contract_id = ?",
            )
            .bind(id)
            .fetch_all(&self.pool)
            .await?;

            let existing = normalize_products(existing.iter().map(|(n, p)| (n.as_str(), *p)));
            if existing == wanted {
                return Ok(Some(id));
            }
        }

        Ok(None)
    }

    pub async fn contract_no_taken(
        &self,
        contract_no: &str,
        exclude_id: Option<i64>,
    ) -> Result<bool, ApiError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM pd_contracts WHERE contract_no = ? AND id != ?")
                .bind(contract_no)
                .bind(exclude_id.unwrap_or(0))
                .fetch_one(&self.pool)
                .await?;
        Ok(count > 0)
    }

    /// Inserts the contract and its products in one transaction; the next
    /// sequence number is assigned inside it.
    pub async fn create(&self, contract: &NewContract) -> Result<i64, ApiError> {
        let mut tx = self.pool.begin().await?;

        let seq_no: i64 =
            sqlx::query_scalar("SELECT COALESCE(MAX(seq_no), 0) + 1 FROM pd_contracts FOR UPDATE")
                .fetch_one(&mut *tx)
                .await?;

        let result = sqlx::query(
            r#"
            INSERT INTO pd_contracts
                (seq_no, contract_no, contract_date, end_date, smelter_company,
                 total_quantity, truck_count, arrival_payment_ratio, final_payment_ratio,
                 contract_image_path, status, remarks)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(seq_no)
        .bind(&contract.contract_no)
        .bind(contract.contract_date)
        .bind(contract.end_date)
        .bind(&contract.smelter_company)
        .bind(contract.total_quantity)
        .bind(contract.truck_count)
        .bind(contract.arrival_payment_ratio)
        .bind(contract.final_payment_ratio)
        .bind(&contract.contract_image_path)
        .bind(&contract.status)
        .bind(&contract.remarks)
        .execute(&mut *tx)
        .await?;

        let contract_id = result.last_insert_id() as i64;
        insert_products(&mut *tx, contract_id, &contract.products).await?;

        tx.commit().await?;
        debug!("Repository: Created contract {} with seq_no {}", contract_id, seq_no);
        Ok(contract_id)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Contract>, ApiError> {
        Ok(
            sqlx::query_as::<_, Contract>("SELECT * FROM pd_contracts WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    pub async fn find_by_no(&self, contract_no: &str) -> Result<Option<Contract>, ApiError> {
        Ok(
            sqlx::query_as::<_, Contract>("SELECT * FROM pd_contracts WHERE contract_no = ?")
                .bind(contract_no)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    pub async fn products(&self, contract_id: i64) -> Result<Vec<ContractProduct>, ApiError> {
        Ok(sqlx::query_as::<_, ContractProduct>(
            "SELECT * FROM pd_contract_products WHERE contract_id = ? ORDER BY sort_order, id",
        )
        .bind(contract_id)
        .fetch_all(&self.pool)
        .await?)
    }

    /// Products with a positive price, in contract order.
    pub async fn priced_products(&self, contract_no: &str) -> Result<Vec<PricedProduct>, ApiError> {
        Ok(sqlx::query_as::<_, PricedProduct>(
            r#"
            SELECT p.product_name, p.unit_price
            FROM pd_contract_products p
            JOIN pd_contracts c ON c.id = p.contract_id
            WHERE c.contract_no = ? AND p.unit_price > 0
            ORDER BY p.sort_order, p.id
            "#,
        )
        .bind(contract_no)
        .fetch_all(&self.pool)
        .await?)
    }

    /// Newest active contract of a smelter that is in force today.
    pub async fn current_for_smelter(&self, smelter: &str) -> Result<Option<Contract>, ApiError> {
        Ok(sqlx::query_as::<_, Contract>(
            r#"
            SELECT * FROM pd_contracts
            WHERE smelter_company = ?
              AND status = ?
              AND contract_date <= CURDATE()
              AND (end_date IS NULL OR end_date >= CURDATE())
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(smelter)
        .bind(ContractStatus::Active.as_str())
        .fetch_optional(&self.pool)
        .await?)
    }

    pub async fn list(
        &self,
        query: &ContractListQuery,
        tokens: &[String],
        pagination: Pagination,
    ) -> Result<(Vec<ContractListItem>, u64), ApiError> {
        fn push_filters(qb: &mut QueryBuilder<'_, MySql>, query: &ContractListQuery, tokens: &[String]) {
            push_exact(qb, "c.contract_no", query.exact_contract_no.as_deref());
            push_exact(qb, "c.smelter_company", query.exact_smelter_company.as_deref());
            push_exact(qb, "c.status", query.exact_status.as_deref());

            if tokens.is_empty() {
                return;
            }
            qb.push(" AND (");
            for (i, token) in tokens.iter().enumerate() {
                if i > 0 {
                    qb.push(" OR ");
                }
                let like = like_pattern(token);
                qb.push("(c.contract_no LIKE ")
                    .push_bind(like.clone())
                    .push(" OR c.smelter_company LIKE ")
                    .push_bind(like.clone())
                    .push(" OR c.remarks LIKE ")
                    .push_bind(like.clone())
                    .push(
                        " OR EXISTS (SELECT 1 FROM pd_contract_products p \
                         WHERE p.contract_id = c.id AND p.product_name LIKE ",
                    )
                    .push_bind(like)
                    .push("))");
            }
            qb.push(")");
        }

        let mut count_qb = QueryBuilder::<MySql>::new("SELECT COUNT(*) FROM pd_contracts c WHERE 1=1");
        push_filters(&mut count_qb, query, tokens);
        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::<MySql>::new(
            "SELECT c.*, \
             (SELECT COUNT(*) FROM pd_contract_products WHERE contract_id = c.id) AS product_count \
             FROM pd_contracts c WHERE 1=1",
        );
        push_filters(&mut qb, query, tokens);
        qb.push(" ORDER BY c.seq_no DESC, c.created_at DESC LIMIT ")
            .push_bind(pagination.limit())
            .push(" OFFSET ")
            .push_bind(pagination.offset());
        let items = qb
            .build_query_as::<ContractListItem>()
            .fetch_all(&self.pool)
            .await?;

        Ok((items, total as u64))
    }

    /// Applies column changes and, when given, replaces the products, in one
    /// transaction.
    pub async fn update(&self, id: i64, changes: ContractChanges) -> Result<(), ApiError> {
        let mut tx = self.pool.begin().await?;

        if changes.has_column_changes() {
            let mut qb = QueryBuilder::<MySql>::new("UPDATE pd_contracts SET ");
            let mut sets = qb.separated(", ");
            if let Some(v) = changes.contract_no {
                sets.push("contract_no = ").push_bind_unseparated(v);
            }
            if let Some(v) = changes.contract_date {
                sets.push("contract_date = ").push_bind_unseparated(v);
            }
            if let Some(v) = changes.end_date {
                sets.push("end_date = ").push_bind_unseparated(v);
            }
            if let Some(v) = changes.smelter_company {
                sets.push("smelter_company = ").push_bind_unseparated(v);
            }
            if let Some(v) = changes.total_quantity {
                sets.push("total_quantity = ").push_bind_unseparated(v);
            }
            if let Some(v) = changes.truck_count {
                sets.push("truck_count = ").push_bind_unseparated(v);
            }
            if let Some(v) = changes.arrival_payment_ratio {
                sets.push("arrival_payment_ratio = ").push_bind_unseparated(v);
            }
            if let Some(v) = changes.final_payment_ratio {
                sets.push("final_payment_ratio = ").push_bind_unseparated(v);
            }
            if let Some(v) = changes.contract_image_path {
                sets.push("contract_image_path = ").push_bind_unseparated(v);
            }
            if let Some(v) = changes.status {
                sets.push("status = ").push_bind_unseparated(v);
            }
            if let Some(v) = changes.remarks {
                sets.push("remarks = ").push_bind_unseparated(v);
            }
            qb.push(" WHERE id = ").push_bind(id);
            qb.build().execute(&mut *tx).await?;
        }

        if let Some(products) = changes.products {
            sqlx::query("DELETE FROM pd_contract_products WHERE contract_id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            insert_products(&mut *tx, id, &products).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Products go with the contract through the foreign key cascade.
    pub async fn delete(&self, id: i64) -> Result<u64, ApiError> {
        Ok(sqlx::query("DELETE FROM pd_contracts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected())
    }

    /// One row per contract product (or per contract without products).
    pub async fn export_rows(&self, ids: &[i64]) -> Result<Vec<ContractExportRow>, ApiError> {
        let mut qb = QueryBuilder::<MySql>::new(
            r#"
            SELECT c.id, c.seq_no, c.contract_no, c.contract_date, c.end_date, c.smelter_company,
                   c.total_quantity, c.truck_count, c.arrival_payment_ratio, c.final_payment_ratio,
                   c.status, c.remarks, c.created_at, p.product_name, p.unit_price
            FROM pd_contracts c
            LEFT JOIN pd_contract_products p ON p.contract_id = c.id
            "#,
        );
        if !ids.is_empty() {
            qb.push(" WHERE c.id IN (");
            let mut in_list = qb.separated(", ");
            for id in ids {
                in_list.push_bind(*id);
            }
            in_list.push_unseparated(")");
        }
        qb.push(" ORDER BY c.seq_no, c.id, p.sort_order");

        Ok(qb
            .build_query_as::<ContractExportRow>()
            .fetch_all(&self.pool)
            .await?)
    }

    /// Marks active contracts whose grace period after signing has passed.
    pub async fn expire_overdue(&self, grace_days: i64) -> Result<u64, ApiError> {
        let result = sqlx::query(
            r#"
            UPDATE pd_contracts
            SET status = ?
            WHERE status = ?
              AND contract_date IS NOT NULL
              AND DATE_ADD(contract_date, INTERVAL ? DAY) <= CURDATE()
            "#,
        )
        .bind(ContractStatus::Lapsed.as_str())
        .bind(ContractStatus::Active.as_str())
        .bind(grace_days)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

async fn insert_products(
    conn: &mut MySqlConnection,
    contract_id: i64,
    products: &[ContractProductInput],
) -> Result<(), ApiError> {
    for (idx, product) in products.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO pd_contract_products (contract_id, product_name, unit_price, sort_order)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(contract_id)
        .bind(product.product_name.trim())
        .bind(product.unit_price)
        .bind(idx as i32)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}
