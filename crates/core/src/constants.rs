//! Constants used throughout the healthcare core crate.

/// Database connection string used when `DATABASE_URL` is not set.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://healthcare.db?mode=rwc";

/// Pool size used when `DATABASE_MAX_CONNECTIONS` is not set.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Seconds to wait for a pooled connection before failing the request.
pub const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 10;

/// Page size applied to list operations when the caller does not pass `limit`.
pub const DEFAULT_PAGE_LIMIT: i64 = 20;

/// Largest page a list operation will return.
pub const MAX_PAGE_LIMIT: i64 = 100;

/// LOINC code of the blood pressure panel that the importer splits into components.
pub const BLOOD_PRESSURE_PANEL_CODE: &str = "85354-9";
