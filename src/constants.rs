pub const APP_STORE_PRODUCTION_VERIFY_RECEIPT_URL: &str = "https://buy.itunes.apple.com/verifyReceipt";
pub const APP_STORE_SANDBOX_VERIFY_RECEIPT_URL: &str =
    "https://sandbox.itunes.apple.com/verifyReceipt";

pub const APP_STORE_EXCLUDE_OLD_TRANSACTIONS_ENV: &str = "APP_STORE_EXCLUDE_OLD_TRANSACTIONS";
