//! Success message constants used throughout the application.

// Authentication messages
pub const MSG_LOGIN_SUCCESS: &str = "Login successful";
pub const MSG_LOGOUT_SUCCESS: &str = "Logout successful";
pub const MSG_TOKEN_REFRESHED: &str = "Token refreshed";

// User management messages
pub const MSG_USER_CREATED: &str = "User created successfully";
pub const MSG_USER_FOUND: &str = "User found";
pub const MSG_USERS_LISTED: &str = "Users retrieved";
pub const MSG_USER_PROFILE_RETRIEVED: &str = "User profile retrieved";
pub const MSG_USER_UPDATED: &str = "User updated successfully";
pub const MSG_USER_DELETED: &str = "User deleted successfully";
pub const MSG_PASSWORD_CHANGED: &str = "Password changed successfully";
pub const MSG_PASSWORD_RESET: &str = "Password reset successfully";
pub const MSG_USER_FROZEN: &str = "User frozen successfully";
pub const MSG_USER_UNFROZEN: &str = "User unfrozen successfully";
pub const MSG_ROLES_LISTED: &str = "Roles retrieved";

// Customer messages
pub const MSG_CUSTOMER_CREATED: &str = "Customer created successfully";
pub const MSG_CUSTOMER_UPDATED: &str = "Customer updated successfully";
pub const MSG_CUSTOMER_DELETED: &str = "Customer deleted successfully";

// Contract messages
pub const MSG_CONTRACT_CREATED: &str = "Contract created successfully";
pub const MSG_CONTRACT_UPDATED: &str = "Contract updated successfully";
pub const MSG_CONTRACT_DELETED: &str = "Contract deleted successfully";
pub const MSG_CONTRACTS_EXPIRED: &str = "Contract expiry check completed";
pub const MSG_CONTRACT_PARSED: &str = "Contract text parsed";

// Delivery messages
pub const MSG_DELIVERY_CREATED: &str = "Delivery created successfully";
pub const MSG_DELIVERY_UPDATED: &str = "Delivery updated successfully";
pub const MSG_DELIVERY_DELETED: &str = "Delivery deleted successfully";

// Weighbill messages
pub const MSG_WEIGHBILL_CREATED: &str = "Weighbill created successfully";
pub const MSG_WEIGHBILL_UPDATED: &str = "Weighbill updated successfully";
pub const MSG_WEIGHBILL_CONFIRMED: &str = "Weighbill confirmed";
pub const MSG_WEIGHBILL_DELETED: &str = "Weighbill deleted successfully";
pub const MSG_DELIVERY_MATCHED: &str = "Matching delivery found";
pub const MSG_PRICE_FOUND: &str = "Contract price found";
pub const MSG_AUTO_FILLED: &str = "Weighbill draft filled";
pub const MSG_PAYMENT_SCHEDULED: &str = "Payment schedule date updated";

// Balance messages
pub const MSG_BALANCES_GENERATED: &str = "Balance records generated";
pub const MSG_BALANCE_RECALCULATED: &str = "Balance recalculated";
pub const MSG_PAYMENT_VERIFIED: &str = "Payment verified";
pub const MSG_RECEIPT_CREATED: &str = "Payment receipt saved";

// Image messages
pub const MSG_IMAGE_UPLOADED: &str = "Image uploaded";
pub const MSG_IMAGE_DELETED: &str = "Image deleted";

// Generic messages
pub const MSG_OK: &str = "OK";
pub const MSG_NOTHING_TO_UPDATE: &str = "Nothing to update";
