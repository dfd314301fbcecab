//! Validators for the status labels stored on business records.

use validator::ValidationError;

use crate::constants::{
    ERR_INVALID_CONTRACT_STATUS, ERR_INVALID_DELIVERY_ORDER_FLAG, ERR_INVALID_DELIVERY_STATUS,
};
use crate::models::{ContractStatus, DeliveryOrderFlag, DeliveryStatus, WeighbillStatus};

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

pub fn validate_contract_status(status: &str) -> Result<(), ValidationError> {
    status
        .parse::<ContractStatus>()
        .map(|_| ())
        .map_err(|_| error("invalid_contract_status", ERR_INVALID_CONTRACT_STATUS))
}

pub fn validate_delivery_status(status: &str) -> Result<(), ValidationError> {
    status
        .parse::<DeliveryStatus>()
        .map(|_| ())
        .map_err(|_| error("invalid_delivery_status", ERR_INVALID_DELIVERY_STATUS))
}

/// `有` or `无`.
pub fn validate_delivery_order_flag(flag: &str) -> Result<(), ValidationError> {
    flag.parse::<DeliveryOrderFlag>()
        .map(|_| ())
        .map_err(|_| error("invalid_delivery_order_flag", ERR_INVALID_DELIVERY_ORDER_FLAG))
}

pub fn validate_weighbill_status(status: &str) -> Result<(), ValidationError> {
    status.parse::<WeighbillStatus>().map(|_| ()).map_err(|_| {
        error(
            "invalid_weighbill_status",
            "Status must be one of 待确认, 已确认, 已修正",
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_labels() {
        assert!(validate_contract_status("生效中").is_ok());
        assert!(validate_contract_status("active").is_err());
        assert!(validate_delivery_status("已取消").is_ok());
        assert!(validate_delivery_status("已修正").is_err());
        assert!(validate_weighbill_status("已修正").is_ok());
    }

    #[test]
    fn test_delivery_order_flag() {
        assert!(validate_delivery_order_flag("有").is_ok());
        assert!(validate_delivery_order_flag("无").is_ok());
        let err = validate_delivery_order_flag("是").unwrap_err();
        assert_eq!(err.message.unwrap(), ERR_INVALID_DELIVERY_ORDER_FLAG);
    }
}
