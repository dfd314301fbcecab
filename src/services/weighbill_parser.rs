//! Rule-based extraction of weighbill fields from recognised text lines.

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::models::WeighbillParseResult;
use crate::utils::{first_capture, first_date, missing_fields_message};

const PLATE: &str =
    r"[京津沪渝冀豫云辽黑湘皖鲁新苏浙赣鄂桂甘晋蒙陕吉闽贵粤青藏川宁琼][A-Z][A-Z0-9]{4,6}";

lazy_static! {
    static ref DATE_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"日期[：:]\s*(\d{4})年(\d{1,2})月(\d{1,2})日").unwrap(),
        Regex::new(r"(\d{4})年(\d{1,2})月(\d{1,2})日").unwrap(),
    ];
    static ref TICKET_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"单据号[：:]\s*(\d+)").unwrap(),
        Regex::new(r"磅单号[：:]\s*(\d+)").unwrap(),
    ];
    static ref CONTRACT_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"合同编号[：:]\s*([A-Za-z0-9\-]+)").unwrap(),
        Regex::new(r"合同号[：:]\s*([A-Za-z0-9\-]+)").unwrap(),
    ];
    static ref VEHICLE_PATTERNS: Vec<Regex> = vec![
        Regex::new(&format!(r"车号[：:]\s*({})", PLATE)).unwrap(),
        Regex::new(&format!(r"车牌[：:]\s*({})", PLATE)).unwrap(),
        Regex::new(&format!(r"({})", PLATE)).unwrap(),
    ];
    static ref PRODUCT_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"货物名称[：:]\s*([^\n]+)").unwrap(),
        Regex::new(r"品名[：:]\s*([^\n]+)").unwrap(),
    ];
    static ref GROSS: Vec<Regex> = vec![Regex::new(r"毛重[：:]\s*(\d+\.?\d*)").unwrap()];
    static ref TARE: Vec<Regex> = vec![Regex::new(r"皮重[：:]\s*(\d+\.?\d*)").unwrap()];
    static ref NET: Vec<Regex> = vec![Regex::new(r"净重[：:]\s*(\d+\.?\d*)").unwrap()];
    static ref DELIVERY_UNIT: Vec<Regex> = vec![Regex::new(r"送货单位[：:]\s*([^\n]+)").unwrap()];
    static ref RECEIVE_UNIT: Vec<Regex> = vec![Regex::new(r"收货单位[：:]\s*([^\n]+)").unwrap()];
}

pub fn parse_weighbill(lines: &[String]) -> WeighbillParseResult {
    let text = lines
        .iter()
        .map(|l| l.trim())
        .collect::<Vec<_>>()
        .join("\n");

    let weight = |patterns: &[Regex]| {
        first_capture(patterns, &text).and_then(|v| Decimal::from_str(&v).ok())
    };

    let weigh_date = first_date(&DATE_PATTERNS, &text);
    let vehicle_no = first_capture(&VEHICLE_PATTERNS, &text);
    let net_weight = weight(&NET);
    let contract_no = first_capture(&CONTRACT_PATTERNS, &text);

    let mut missing = Vec::new();
    if weigh_date.is_none() {
        missing.push("日期");
    }
    if vehicle_no.is_none() {
        missing.push("车牌号");
    }
    if net_weight.is_none() {
        missing.push("净重");
    }
    if contract_no.is_none() {
        missing.push("合同编号");
    }

    WeighbillParseResult {
        weigh_date,
        weigh_ticket_no: first_capture(&TICKET_PATTERNS, &text),
        contract_no,
        vehicle_no,
        product_name: first_capture(&PRODUCT_PATTERNS, &text),
        gross_weight: weight(&GROSS),
        tare_weight: weight(&TARE),
        net_weight,
        delivery_unit: first_capture(&DELIVERY_UNIT, &text),
        receive_unit: first_capture(&RECEIVE_UNIT, &text),
        message: missing_fields_message(&missing),
        raw_text: text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_complete_weighbill() {
        let result = parse_weighbill(&lines(&[
            "河南金利金铅集团 过磅单",
            "日期：2025年3月4日",
            "磅单号：20250304017",
            "合同编号：JL-20250226",
            "车号：豫A12345",
            "货物名称：电动车",
            "毛重：49.36",
            "皮重：16.12",
            "净重：33.24",
            "送货单位：某某回收站",
            "收货单位：金利再生铅分厂",
        ]));

        assert_eq!(result.weigh_date, NaiveDate::from_ymd_opt(2025, 3, 4));
        assert_eq!(result.weigh_ticket_no.as_deref(), Some("20250304017"));
        assert_eq!(result.contract_no.as_deref(), Some("JL-20250226"));
        assert_eq!(result.vehicle_no.as_deref(), Some("豫A12345"));
        assert_eq!(result.product_name.as_deref(), Some("电动车"));
        assert_eq!(result.gross_weight, Decimal::from_str("49.36").ok());
        assert_eq!(result.tare_weight, Decimal::from_str("16.12").ok());
        assert_eq!(result.net_weight, Decimal::from_str("33.24").ok());
        assert_eq!(result.delivery_unit.as_deref(), Some("某某回收站"));
        assert_eq!(result.receive_unit.as_deref(), Some("金利再生铅分厂"));
        assert_eq!(result.message, "Recognition complete");
    }

    #[test]
    fn test_bare_plate_and_date_are_found() {
        let result = parse_weighbill(&lines(&["2025年12月1日", "鲁B9K321 入厂"]));
        assert_eq!(result.weigh_date, NaiveDate::from_ymd_opt(2025, 12, 1));
        assert_eq!(result.vehicle_no.as_deref(), Some("鲁B9K321"));
        assert!(result.message.contains("净重"));
        assert!(result.message.contains("合同编号"));
        assert!(!result.message.contains("车牌号"));
    }

    #[test]
    fn test_empty_text_reports_all_required_fields() {
        let result = parse_weighbill(&[]);
        for field in ["日期", "车牌号", "净重", "合同编号"] {
            assert!(result.message.contains(field), "missing {}", field);
        }
    }
}
