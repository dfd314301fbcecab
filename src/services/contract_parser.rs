//! Rule-based extraction of contract fields from recognised text lines.
//!
//! The text comes from an OCR pass done by the client. Lines are matched
//! against labelled patterns first; the product table is read column by
//! column between its `品名`, `单价(元)` and `数量(吨)` headers.

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::constants::PRODUCT_TYPES;
use crate::models::{end_date_for, truck_count, ContractParseResult, ParsedProduct};
use crate::utils::{first_capture, first_date, missing_fields_message, round_money};

/// Smallest table number read as the contract's total quantity.
const MIN_TOTAL_QUANTITY: i64 = 50;

/// Smelter implied by a delivery location at one of its plants.
const DEFAULT_SMELTER: &str = "河南金利金铅集团有限公司";

/// Contract prices include tax; the net price divides by this factor.
const TAX_FACTOR: &str = "1.3";

const OCR_CORRECTIONS: [(&str, &str); 4] = [
    ("乙万", "乙方"),
    ("合司", "合同"),
    ("编亏", "编号"),
    ("金辆", "金铅"),
];

lazy_static! {
    static ref CONTRACT_NO_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"合同编号[：:]\s*([A-Za-z0-9\-]+)").unwrap(),
        Regex::new(r"编号[：:]\s*([A-Za-z0-9\-]+)").unwrap(),
        Regex::new(r"([A-Z]{2,6}-\d{6,12})").unwrap(),
    ];
    static ref SIGNING_DATE_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"签订时间[：:]\s*(\d{4})[-年](\d{1,2})[-月](\d{1,2})").unwrap(),
        Regex::new(r"签订日期[：:]\s*(\d{4})[-年](\d{1,2})[-月](\d{1,2})").unwrap(),
    ];
    static ref END_DATE_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"合同期限.*?(\d{4})[-年](\d{1,2})[-月](\d{1,2})").unwrap(),
        Regex::new(r"有效期至[：:]\s*(\d{4})[-年](\d{1,2})[-月](\d{1,2})").unwrap(),
        Regex::new(r"截止日期[：:]\s*(\d{4})[-年](\d{1,2})[-月](\d{1,2})").unwrap(),
    ];
    static ref PARTY_A: Regex = Regex::new(r"甲方[：:]\s*([^\n]+)").unwrap();
    static ref DELIVERY_LOCATION: Regex = Regex::new(r"交货地点[：:]\s*([^\n]+)").unwrap();
    static ref RATIO_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"到货款.*?(\d+)%").unwrap(),
        Regex::new(r"付到货款.*?(\d+)%").unwrap(),
        Regex::new(r"(\d+)%.*到货款").unwrap(),
        Regex::new(r"结算付到货款的(\d+)%").unwrap(),
    ];
    static ref NUMBER: Regex = Regex::new(r"^(\d+\.?\d*)$").unwrap();
}

/// Fixes recognition slips seen on scanned contracts.
///
/// A line starting with a bare `方：` lost its `甲`.
pub fn fix_ocr_errors(line: &str) -> String {
    let mut fixed = line.trim().to_string();
    for prefix in ["方：", "方:"] {
        if fixed.starts_with(prefix) {
            fixed.insert(0, '甲');
            break;
        }
    }
    for (wrong, right) in OCR_CORRECTIONS {
        fixed = fixed.replace(wrong, right);
    }
    fixed
}

pub fn parse_contract(lines: &[String]) -> ContractParseResult {
    let lines: Vec<String> = lines.iter().map(|l| fix_ocr_errors(l)).collect();
    let text = lines.join("\n");

    let contract_no = first_capture(&CONTRACT_NO_PATTERNS, &text);
    let contract_date = first_date(&SIGNING_DATE_PATTERNS, &text);
    let end_date = first_date(&END_DATE_PATTERNS, &text).or_else(|| contract_date.map(end_date_for));
    let smelter_company = extract_smelter(&text);
    let arrival_ratio = extract_arrival_ratio(&text);
    let (products, total_quantity) = extract_products(&lines);

    let main_price = products
        .iter()
        .map(|p| p.unit_price)
        .find(|price| *price > Decimal::ZERO);
    let net_price = main_price.and_then(|price| {
        Decimal::from_str(TAX_FACTOR)
            .ok()
            .map(|factor| round_money(price / factor))
    });

    let mut missing = Vec::new();
    if contract_no.is_none() {
        missing.push("合同编号");
    }
    if products.is_empty() {
        missing.push("品种表格");
    }

    let arrival_payment_ratio = arrival_ratio.unwrap_or_else(|| Decimal::new(9, 1));
    ContractParseResult {
        contract_no,
        contract_date,
        end_date,
        smelter_company,
        total_quantity,
        truck_count: truck_count(total_quantity),
        arrival_payment_ratio,
        final_payment_ratio: Decimal::ONE - arrival_payment_ratio,
        products,
        contract_unit_price: main_price,
        remittance_unit_price: main_price,
        unit_price: net_price,
        raw_text: text,
        message: missing_fields_message(&missing),
    }
}

fn extract_smelter(text: &str) -> Option<String> {
    if let Some(party) = first_capture(std::slice::from_ref(&PARTY_A), text) {
        return Some(party);
    }

    let location = first_capture(std::slice::from_ref(&DELIVERY_LOCATION), text)?;
    if location.contains("再生铅") || location.contains("分厂") {
        return Some(DEFAULT_SMELTER.to_string());
    }
    None
}

fn extract_arrival_ratio(text: &str) -> Option<Decimal> {
    let percent: i64 = first_capture(&RATIO_PATTERNS, text)?.parse().ok()?;
    Some(Decimal::new(percent, 2))
}

/// Reads the product table: names under `品名`, prices under the unit price
/// header, and the first quantity of at least 50 tonnes under the quantity
/// header. Names without a price get 0.
fn extract_products(lines: &[String]) -> (Vec<ParsedProduct>, Option<Decimal>) {
    let mut name_start = None;
    let mut price_start = None;
    let mut qty_start = None;

    for (i, line) in lines.iter().enumerate() {
        if line == "品名" && price_start.is_none() {
            name_start = Some(i);
        } else if line.contains("单价") && line.contains('元') && name_start.is_some() && price_start.is_none() {
            price_start = Some(i);
        } else if line.contains("数量") && line.contains('吨') && price_start.is_some() && qty_start.is_none() {
            qty_start = Some(i);
        }
    }

    let (Some(name_start), Some(price_start)) = (name_start, price_start) else {
        return (Vec::new(), None);
    };

    let names: Vec<&str> = lines
        .get(name_start + 1..price_start)
        .unwrap_or_default()
        .iter()
        .map(String::as_str)
        .filter(|l| PRODUCT_TYPES.contains(l))
        .collect();

    let price_end = qty_start.unwrap_or(price_start + 1);
    let prices: Vec<Decimal> = lines
        .get(price_start + 1..price_end)
        .unwrap_or_default()
        .iter()
        .filter_map(|l| parse_number(l))
        .collect();

    let total_quantity = qty_start.and_then(|start| {
        lines
            .get(start + 1..)
            .unwrap_or_default()
            .iter()
            .filter_map(|l| parse_number(l))
            .find(|q| *q >= Decimal::from(MIN_TOTAL_QUANTITY))
    });

    let products = names
        .into_iter()
        .enumerate()
        .map(|(i, name)| ParsedProduct {
            product_name: name.to_string(),
            unit_price: prices.get(i).copied().unwrap_or(Decimal::ZERO),
        })
        .collect();

    (products, total_quantity)
}

fn parse_number(line: &str) -> Option<Decimal> {
    NUMBER
        .captures(line)
        .and_then(|c| c.get(1))
        .and_then(|m| Decimal::from_str(m.as_str()).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn sample() -> Vec<String> {
        lines(&[
            "废旧电瓶购销合同",
            "合同编号：JL-20250226",
            "方：河南金利金铅集团有限公司",
            "乙万：某某回收站",
            "签订时间：2025年2月26日",
            "结算付到货款的90%，余款开票后付清",
            "品名",
            "电动车",
            "黑皮",
            "单价(元/吨)",
            "9200",
            "8800",
            "数量(吨)",
            "10",
            "350",
        ])
    }

    #[test]
    fn test_parse_full_contract() {
        let result = parse_contract(&sample());

        assert_eq!(result.contract_no.as_deref(), Some("JL-20250226"));
        assert_eq!(result.contract_date, NaiveDate::from_ymd_opt(2025, 2, 26));
        assert_eq!(result.end_date, NaiveDate::from_ymd_opt(2025, 3, 3));
        assert_eq!(result.smelter_company.as_deref(), Some("河南金利金铅集团有限公司"));
        assert_eq!(result.arrival_payment_ratio, d("0.90"));
        assert_eq!(result.final_payment_ratio, d("0.10"));
        assert_eq!(
            result.products,
            vec![
                ParsedProduct { product_name: "电动车".into(), unit_price: d("9200") },
                ParsedProduct { product_name: "黑皮".into(), unit_price: d("8800") },
            ]
        );
        assert_eq!(result.total_quantity, Some(d("350")));
        assert_eq!(result.truck_count, Some(d("10.00")));
        assert_eq!(result.contract_unit_price, Some(d("9200")));
        assert_eq!(result.unit_price, Some(d("7076.92")));
        assert_eq!(result.message, "Recognition complete");
    }

    #[test]
    fn test_missing_fields_are_reported() {
        let result = parse_contract(&lines(&["无关内容"]));

        assert!(result.contract_no.is_none());
        assert!(result.products.is_empty());
        assert_eq!(result.arrival_payment_ratio, d("0.9"));
        assert!(result.message.contains("合同编号"));
        assert!(result.message.contains("品种表格"));
    }

    #[test]
    fn test_fix_only_touches_leading_party_label() {
        assert_eq!(fix_ocr_errors("方：某公司"), "甲方：某公司");
        assert_eq!(fix_ocr_errors("甲方：某公司"), "甲方：某公司");
        assert_eq!(fix_ocr_errors("乙方：某站"), "乙方：某站");
        assert_eq!(fix_ocr_errors("合司编亏：X"), "合同编号：X");
    }

    #[test]
    fn test_smelter_from_delivery_location() {
        let text = "交货地点：金利再生铅分厂";
        assert_eq!(extract_smelter(text).as_deref(), Some(DEFAULT_SMELTER));
        assert_eq!(extract_smelter("交货地点：某仓库"), None);
    }

    #[test]
    fn test_explicit_end_date_wins() {
        let result = parse_contract(&lines(&[
            "签订日期：2025-01-10",
            "有效期至：2025年1月31日",
        ]));
        assert_eq!(result.end_date, NaiveDate::from_ymd_opt(2025, 1, 31));
    }

    #[test]
    fn test_missing_prices_default_to_zero() {
        let (products, qty) = extract_products(&lines(&["品名", "新能源", "通信", "单价(元)", "9100"]));
        assert_eq!(products.len(), 2);
        assert_eq!(products[1].unit_price, Decimal::ZERO);
        assert_eq!(qty, None);
    }

    #[test]
    fn test_repeated_name_header_after_prices_is_ignored() {
        let raw = lines(&["品名", "电动车", "单价（元/吨）", "9200", "品名"]);
        let (products, qty) = extract_products(&raw);
        assert_eq!(
            products,
            vec![ParsedProduct { product_name: "电动车".into(), unit_price: Decimal::ZERO }]
        );
        assert!(qty.is_none());

        let result = parse_contract(&raw);
        assert_eq!(result.products.len(), 1);
    }
}
