use chrono::{Duration, NaiveDate, NaiveDateTime};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

use crate::constants::{CONTRACT_VALID_DAYS, TONS_PER_TRUCK};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, ToSchema)]
pub enum ContractStatus {
    #[serde(rename = "生效中")]
    Active,
    #[serde(rename = "已到期")]
    Expired,
    #[serde(rename = "已终止")]
    Terminated,
    #[serde(rename = "已失效")]
    Lapsed,
}

impl ContractStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContractStatus::Active => "生效中",
            ContractStatus::Expired => "已到期",
            ContractStatus::Terminated => "已终止",
            ContractStatus::Lapsed => "已失效",
        }
    }
}

impl FromStr for ContractStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "生效中" => Ok(ContractStatus::Active),
            "已到期" => Ok(ContractStatus::Expired),
            "已终止" => Ok(ContractStatus::Terminated),
            "已失效" => Ok(ContractStatus::Lapsed),
            other => Err(format!("unknown contract status '{}'", other)),
        }
    }
}

/// Row of `pd_contracts`.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct Contract {
    pub id: i64,
    pub seq_no: Option<i32>,
    pub contract_no: String,
    pub contract_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub smelter_company: Option<String>,
    pub total_quantity: Option<Decimal>,
    pub truck_count: Option<Decimal>,
    pub arrival_payment_ratio: Option<Decimal>,
    pub final_payment_ratio: Option<Decimal>,
    pub contract_image_path: Option<String>,
    pub status: String,
    pub remarks: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

/// Row of `pd_contract_products`.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct ContractProduct {
    pub id: i64,
    pub contract_id: i64,
    pub product_name: String,
    pub unit_price: Option<Decimal>,
    pub sort_order: i32,
    pub created_at: Option<NaiveDateTime>,
}

/// Contract list row with the number of products attached.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct ContractListItem {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub contract: Contract,
    pub product_count: i64,
}

/// Contract with its products in `sort_order`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ContractDetail {
    #[serde(flatten)]
    pub contract: Contract,
    pub products: Vec<ContractProduct>,
}

impl ContractDetail {
    /// Contracts created before sequence numbers existed show their id instead.
    pub fn new(mut contract: Contract, products: Vec<ContractProduct>) -> Self {
        if contract.seq_no.is_none() {
            contract.seq_no = i32::try_from(contract.id).ok();
        }
        Self { contract, products }
    }
}

/// One exported CSV line: a contract joined with one of its products.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ContractExportRow {
    pub id: i64,
    pub seq_no: Option<i32>,
    pub contract_no: String,
    pub contract_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub smelter_company: Option<String>,
    pub total_quantity: Option<Decimal>,
    pub truck_count: Option<Decimal>,
    pub arrival_payment_ratio: Option<Decimal>,
    pub final_payment_ratio: Option<Decimal>,
    pub status: String,
    pub remarks: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub product_name: Option<String>,
    pub unit_price: Option<Decimal>,
}

impl ContractExportRow {
    pub const HEADERS: [&'static str; 15] = [
        "id",
        "seq_no",
        "contract_no",
        "contract_date",
        "end_date",
        "smelter_company",
        "total_quantity",
        "truck_count",
        "arrival_payment_ratio",
        "final_payment_ratio",
        "status",
        "remarks",
        "created_at",
        "product_name",
        "unit_price",
    ];

    pub fn to_record(&self) -> Vec<String> {
        fn opt<T: ToString>(v: &Option<T>) -> String {
            v.as_ref().map(ToString::to_string).unwrap_or_default()
        }

        vec![
            self.id.to_string(),
            opt(&self.seq_no),
            self.contract_no.clone(),
            opt(&self.contract_date),
            opt(&self.end_date),
            opt(&self.smelter_company),
            opt(&self.total_quantity),
            opt(&self.truck_count),
            opt(&self.arrival_payment_ratio),
            opt(&self.final_payment_ratio),
            self.status.clone(),
            opt(&self.remarks),
            self.created_at
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_default(),
            opt(&self.product_name),
            opt(&self.unit_price),
        ]
    }
}

/// Planned trucks for a contract quantity, to two decimals.
pub fn truck_count(total_quantity: Option<Decimal>) -> Option<Decimal> {
    total_quantity.map(|q| {
        (q / Decimal::from(TONS_PER_TRUCK))
            .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
    })
}

/// Contracts run for a fixed number of days after signing.
pub fn end_date_for(contract_date: NaiveDate) -> NaiveDate {
    contract_date + Duration::days(CONTRACT_VALID_DAYS)
}

/// Canonical product list used for duplicate detection: names trimmed,
/// blank names dropped, prices rounded to cents, sorted.
pub fn normalize_products<'a, I>(products: I) -> Vec<(String, Option<Decimal>)>
where
    I: IntoIterator<Item = (&'a str, Option<Decimal>)>,
{
    let mut normalized: Vec<(String, Option<Decimal>)> = products
        .into_iter()
        .filter_map(|(name, price)| {
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            let price = price.map(|p| {
                p.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
                    .normalize()
            });
            Some((name.to_string(), price))
        })
        .collect();
    normalized.sort();
    normalized
}

/// Replaces characters that are unsafe in a download file name.
pub fn export_file_name(contract_no: Option<&str>) -> String {
    match contract_no.map(str::trim).filter(|s| !s.is_empty()) {
        Some(no) => {
            let safe: String = no
                .chars()
                .map(|c| {
                    if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                        c
                    } else {
                        '_'
                    }
                })
                .collect();
            format!("{}.csv", safe)
        }
        None => "contracts_export.csv".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_truck_count() {
        assert_eq!(truck_count(Some(d("350"))), Some(d("10.00")));
        assert_eq!(truck_count(Some(d("100"))), Some(d("2.86")));
        assert_eq!(truck_count(None), None);
    }

    #[test]
    fn test_end_date_is_five_days_after_signing() {
        let signed = NaiveDate::from_ymd_opt(2025, 2, 26).unwrap();
        assert_eq!(end_date_for(signed), NaiveDate::from_ymd_opt(2025, 3, 3).unwrap());
    }

    #[test]
    fn test_normalize_products_ignores_order_and_scale() {
        let a = normalize_products(vec![("新能源 ", Some(d("9100.0"))), ("电动车", Some(d("9200")))]);
        let b = normalize_products(vec![
            ("电动车", Some(d("9200.00"))),
            ("", Some(d("1"))),
            (" 新能源", Some(d("9100"))),
        ]);
        assert_eq!(a, b);
        assert_eq!(a[0].0, "新能源");
    }

    #[test]
    fn test_normalize_products_distinguishes_missing_price() {
        let a = normalize_products(vec![("黑皮", None)]);
        let b = normalize_products(vec![("黑皮", Some(d("0")))]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(export_file_name(Some("HT-2025/01")), "HT-2025_01.csv");
        assert_eq!(export_file_name(Some("  ")), "contracts_export.csv");
        assert_eq!(export_file_name(None), "contracts_export.csv");
    }

    #[test]
    fn test_status_labels() {
        assert_eq!("已失效".parse::<ContractStatus>().unwrap(), ContractStatus::Lapsed);
        assert_eq!(ContractStatus::Active.as_str(), "生效中");
        assert!("active".parse::<ContractStatus>().is_err());
    }
}
