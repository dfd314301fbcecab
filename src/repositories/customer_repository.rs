//! Customer repository for `pd_customers`.

use sqlx::{MySql, MySqlPool, QueryBuilder};

use crate::errors::ApiError;
use crate::models::{CreateCustomerRequest, Customer, Pagination, UpdateCustomerRequest};
use crate::repositories::push_fuzzy_tokens;

#[derive(Clone)]
pub struct CustomerRepository {
    pool: MySqlPool,
}

impl CustomerRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, req: &CreateCustomerRequest) -> Result<i64, ApiError> {
        let result = sqlx::query(
            r#"
            INSERT INTO pd_customers (smelter_name, address, contact_person, contact_phone, contact_address)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(req.smelter_name.trim())
        .bind(&req.address)
        .bind(&req.contact_person)
        .bind(&req.contact_phone)
        .bind(&req.contact_address)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_id() as i64)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Customer>, ApiError> {
        Ok(
            sqlx::query_as::<_, Customer>("SELECT * FROM pd_customers WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    pub async fn exists_by_name(&self, smelter_name: &str) -> Result<bool, ApiError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM pd_customers WHERE smelter_name = ?")
                .bind(smelter_name)
                .fetch_one(&self.pool)
                .await?;
        Ok(count > 0)
    }

    pub async fn list(
        &self,
        tokens: &[String],
        pagination: Pagination,
    ) -> Result<(Vec<Customer>, u64), ApiError> {
        const SEARCH_COLUMNS: [&str; 3] = ["smelter_name", "contact_person", "contact_phone"];

        let mut count_qb = QueryBuilder::<MySql>::new("SELECT COUNT(*) FROM pd_customers WHERE 1=1");
        push_fuzzy_tokens(&mut count_qb, tokens, &SEARCH_COLUMNS);
        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::<MySql>::new("SELECT * FROM pd_customers WHERE 1=1");
        push_fuzzy_tokens(&mut qb, tokens, &SEARCH_COLUMNS);
        qb.push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(pagination.limit())
            .push(" OFFSET ")
            .push_bind(pagination.offset());
        let customers = qb.build_query_as::<Customer>().fetch_all(&self.pool).await?;

        Ok((customers, total as u64))
    }

    pub async fn update(&self, id: i64, req: UpdateCustomerRequest) -> Result<(), ApiError> {
        if req.is_empty() {
            return Ok(());
        }

        let mut qb = QueryBuilder::<MySql>::new("UPDATE pd_customers SET ");
        let mut sets = qb.separated(", ");
        if let Some(v) = req.smelter_name {
            sets.push("smelter_name = ").push_bind_unseparated(v.trim().to_string());
        }
        if let Some(v) = req.address {
            sets.push("address = ").push_bind_unseparated(v);
        }
        if let Some(v) = req.contact_person {
            sets.push("contact_person = ").push_bind_unseparated(v);
        }
        if let Some(v) = req.contact_phone {
            sets.push("contact_phone = ").push_bind_unseparated(v);
        }
        if let Some(v) = req.contact_address {
            sets.push("contact_address = ").push_bind_unseparated(v);
        }
        qb.push(" WHERE id = ").push_bind(id);
        qb.build().execute(&self.pool).await?;
        Ok(())
    }

    pub async fn delete(&self, id: i64) -> Result<u64, ApiError> {
        Ok(sqlx::query("DELETE FROM pd_customers WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected())
    }
}
