// Key space
pub const DEFAULT_KEY_PREFIX: &str = "vape_shop";
pub const PRODUCTS_COLLECTION: &str = "products";
pub const ORDERS_COLLECTION: &str = "orders";
pub const USERS_COLLECTION: &str = "users";
pub const PROMOS_COLLECTION: &str = "promos";
pub const STATS_KEY: &str = "stats";
pub const COUNTER_SUFFIX: &str = "counter";

// Referral program
pub const REFERRAL_BONUS_PERCENT: i64 = 10;
pub const REFERRAL_CODE_PREFIX: &str = "REF";
pub const DEFAULT_USERNAME_PREFIX: &str = "user_";

/// Referral code a user gets when none was set explicitly, e.g. `REF000042`.
pub fn default_referral_code(user_id: i64) -> String {
    format!("{}{:06}", REFERRAL_CODE_PREFIX, user_id)
}

/// The user whose derived referral code is `code`, if it has that shape.
pub fn default_referral_code_owner(code: &str) -> Option<i64> {
    let user_id = code.strip_prefix(REFERRAL_CODE_PREFIX)?.parse::<i64>().ok()?;
    (default_referral_code(user_id) == code).then_some(user_id)
}

/// Username given to a user synthesized on first read.
pub fn default_username(user_id: i64) -> String {
    format!("{}{}", DEFAULT_USERNAME_PREFIX, user_id)
}

// Error messages
pub const ERROR_ORDER_WITHOUT_ITEMS: &str = "Order must contain items";
pub const ERROR_STATUS_REQUIRED: &str = "Status is required";
pub const ERROR_USER_ID_REQUIRED: &str = "User ID is required";
pub const ERROR_PRODUCT_NOT_FOUND: &str = "Product not found";
pub const ERROR_ORDER_NOT_FOUND: &str = "Order not found";
pub const ERROR_PROMO_NOT_FOUND: &str = "Promo not found";
pub const ERROR_PROMO_CODE_NOT_FOUND: &str = "Promo code not found";
pub const ERROR_PROMO_EXISTS: &str = "Promo code already exists";
pub const ERROR_PROMO_LIMIT_REACHED: &str = "Promo code limit reached";
pub const ERROR_REFERRAL_CODE_TAKEN: &str = "Referral code already in use";

/// Message for a required field absent from a request body.
pub fn missing_field_message(field: &str) -> String {
    format!("Missing field: {}", field)
}

/// Message returned by the standalone promo apply endpoint.
pub fn promo_applied_message(discount: i64) -> String {
    format!("Promo applied! {}% discount", discount)
}
