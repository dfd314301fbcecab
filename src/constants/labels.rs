//! Business constants shared by contracts, deliveries and weighbills.

/// Capacity used to derive a contract's planned truck count.
pub const TONS_PER_TRUCK: i64 = 35;

/// Days after signing before an active contract is considered expired.
pub const CONTRACT_VALID_DAYS: i64 = 5;

/// Flat fee charged when a delivery arrives without a delivery order.
pub const UNION_FEE_WITHOUT_ORDER: i64 = 150;

/// Product assumed when pricing a weighbill that names none.
pub const DEFAULT_PRODUCT_NAME: &str = "废电瓶";

/// Product categories recognised in contract text and weighbills.
pub const PRODUCT_TYPES: [&str; 7] = ["电动车", "黑皮", "新能源", "通信", "摩托车", "大白", "牵引"];

/// Weighbill product names mapped to the contract products they may be priced against.
pub const PRODUCT_PRICE_ALIASES: &[(&str, &[&str])] = &[
    ("废电瓶", &["电动车", "新能源", "通信", "摩托车", "大白", "牵引", "黑皮"]),
    ("新能源电瓶", &["新能源"]),
    ("电动车电瓶", &["电动车"]),
];

pub const DELIVERY_UPLOADED: &str = "联单已上传";
pub const DELIVERY_NOT_UPLOADED: &str = "联单未上传";

/// `uploaded_by` value that keeps company ownership of a delivery with an order.
pub const UPLOADED_BY_COMPANY: &str = "公司";
