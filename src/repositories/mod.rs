//! Repository layer for database operations.
//!
//! Repositories own the SQL; services own the business rules.

pub mod balance_repository;
pub mod contract_repository;
pub mod customer_repository;
pub mod delivery_repository;
pub mod user_repository;
pub mod weighbill_repository;

pub use balance_repository::BalanceRepository;
pub use contract_repository::ContractRepository;
pub use customer_repository::CustomerRepository;
pub use delivery_repository::DeliveryRepository;
pub use user_repository::UserRepository;
pub use weighbill_repository::WeighbillRepository;

use sqlx::{MySql, QueryBuilder};

pub(crate) fn like_pattern(token: &str) -> String {
    format!("%{}%", token)
}

/// Appends ` AND (...)` where each token must appear in at least one of
/// `columns`, and any token may match.
pub(crate) fn push_fuzzy_tokens(
    qb: &mut QueryBuilder<'_, MySql>,
    tokens: &[String],
    columns: &[&str],
) {
    if tokens.is_empty() || columns.is_empty() {
        return;
    }

    qb.push(" AND (");
    for (i, token) in tokens.iter().enumerate() {
        if i > 0 {
            qb.push(" OR ");
        }
        qb.push("(");
        for (j, column) in columns.iter().enumerate() {
            if j > 0 {
                qb.push(" OR ");
            }
            qb.push(*column).push(" LIKE ").push_bind(like_pattern(token));
        }
        qb.push(")");
    }
    qb.push(")");
}

/// Appends ` AND column = value` when a non-blank value is given.
pub(crate) fn push_exact(qb: &mut QueryBuilder<'_, MySql>, column: &str, value: Option<&str>) {
    if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
        qb.push(" AND ")
            .push(column)
            .push(" = ")
            .push_bind(value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fuzzy_tokens_sql() {
        let mut qb = QueryBuilder::<MySql>::new("SELECT * FROM t WHERE 1=1");
        push_fuzzy_tokens(
            &mut qb,
            &["a".to_string(), "b".to_string()],
            &["x", "y"],
        );
        assert_eq!(
            qb.sql(),
            "SELECT * FROM t WHERE 1=1 AND ((x LIKE ? OR y LIKE ?) OR (x LIKE ? OR y LIKE ?))"
        );
    }

    #[test]
    fn test_exact_skips_blank_values() {
        let mut qb = QueryBuilder::<MySql>::new("SELECT * FROM t WHERE 1=1");
        push_exact(&mut qb, "status", Some("  "));
        push_exact(&mut qb, "status", None);
        assert_eq!(qb.sql(), "SELECT * FROM t WHERE 1=1");

        push_exact(&mut qb, "status", Some("生效中"));
        assert_eq!(qb.sql(), "SELECT * FROM t WHERE 1=1 AND status = ?");
    }
}
