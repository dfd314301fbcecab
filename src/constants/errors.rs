//! Error message constants used throughout the application.

// Authentication errors
pub const ERR_AUTH_REQUIRED: &str = "Authentication required";
pub const ERR_INVALID_AUTH_HEADER: &str = "Missing or invalid authorization header";
pub const ERR_INVALID_TOKEN: &str = "Invalid or expired token";
pub const ERR_TOKEN_REVOKED: &str = "Token has been revoked";
pub const ERR_INVALID_CREDENTIALS: &str = "Invalid account or password";
pub const ERR_ACCOUNT_FROZEN: &str = "Account is frozen, contact an administrator";

// User errors
pub const ERR_USER_NOT_FOUND: &str = "User not found";
pub const ERR_ACCOUNT_EXISTS: &str = "Account already exists";
pub const ERR_PHONE_EXISTS: &str = "Phone number already in use";
pub const ERR_WRONG_PASSWORD: &str = "Current password is incorrect";
pub const ERR_INVALID_ROLE: &str = "Role must be one of 管理员, 大区经理, 自营库管理, 财务, 会计";
pub const ERR_INVALID_ADMIN_KEY: &str = "Invalid admin key";
pub const ERR_STATUS_UNCHANGED: &str = "User status unchanged";

// Authorization errors
pub const ERR_NO_PERMISSION_CREATE_USER: &str = "You don't have permission to create this user";
pub const ERR_NO_PERMISSION_EDIT_USER: &str = "You don't have permission to modify this user";
pub const ERR_ONLY_ADMINS_DELETE: &str = "Only administrators can delete users";
pub const ERR_ONLY_ADMINS: &str = "Only administrators can perform this action";
pub const ERR_MANAGER_REQUIRED: &str = "Regional manager or administrator role required";
pub const ERR_FINANCE_REQUIRED: &str = "Finance role required";
pub const ERR_CANNOT_CHANGE_OWN_ROLE: &str = "You cannot change your own role";
pub const ERR_CANNOT_DELETE_SELF: &str = "You cannot delete your own account";
pub const ERR_CANNOT_FREEZE_SELF: &str = "You cannot freeze your own account";

// Customer errors
pub const ERR_CUSTOMER_NOT_FOUND: &str = "Customer not found";

// Contract errors
pub const ERR_CONTRACT_NOT_FOUND: &str = "Contract not found";
pub const ERR_CONTRACT_NO_EXISTS: &str = "Contract number already exists";
pub const ERR_CONTRACT_NO_REQUIRED: &str = "Contract number is required";
pub const ERR_PRODUCT_NAME_REQUIRED: &str = "Product name must not be empty";
pub const ERR_INVALID_CONTRACT_STATUS: &str = "Status must be one of 生效中, 已到期, 已终止, 已失效";

// Delivery errors
pub const ERR_DELIVERY_NOT_FOUND: &str = "Delivery not found";
pub const ERR_INVALID_DELIVERY_STATUS: &str = "Status must be one of 待确认, 已确认, 已完成, 已取消";
pub const ERR_INVALID_DELIVERY_ORDER_FLAG: &str = "has_delivery_order must be 有 or 无";

// Weighbill errors
pub const ERR_WEIGHBILL_NOT_FOUND: &str = "Weighbill not found";
pub const ERR_NO_MATCHING_DELIVERY: &str = "No matching delivery found";
pub const ERR_NO_CONTRACT_PRICE: &str = "No priced product found for this contract";

// Balance and receipt errors
pub const ERR_BALANCE_NOT_FOUND: &str = "Balance record not found";
pub const ERR_RECEIPT_NOT_FOUND: &str = "Payment receipt not found";
pub const ERR_RECEIPT_ALREADY_VERIFIED: &str = "Payment receipt has already been verified";
pub const ERR_NO_SETTLEMENT_ITEMS: &str = "At least one settlement item is required";
pub const ERR_NO_OPEN_BALANCES: &str = "No outstanding balances for this payee";

// Upload errors
pub const ERR_FAILED_PROCESS_UPLOAD: &str = "Failed to process upload";
pub const ERR_FAILED_READ_FILE: &str = "Failed to read file data";
pub const ERR_FAILED_SAVE_FILE: &str = "Failed to save file";
pub const ERR_INVALID_FILE_TYPE: &str = "Only jpg, png and bmp images are accepted";
pub const ERR_FILE_TOO_LARGE: &str = "File too large";
pub const ERR_FORM_FIELD_TOO_LARGE: &str = "Form field too large";
pub const ERR_INVALID_FORM: &str = "Invalid form data";
pub const ERR_INVALID_FORM_FIELD: &str = "Form fields must be UTF-8 text";
pub const ERR_NO_IMAGE_FILE: &str = "No image provided; upload it in the 'image' field";
pub const ERR_NO_IMAGE: &str = "No image has been uploaded for this record";
pub const ERR_IMAGE_FILE_MISSING: &str = "Image file not found";

// Generic errors
pub const ERR_INTERNAL: &str = "Internal server error";
