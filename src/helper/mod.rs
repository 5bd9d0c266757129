pub mod account_helpers;
pub mod dashboard_helpers;
pub mod form_helpers;
pub mod public_helpers;
pub mod sanitization_helpers;
pub mod storage_helpers;
pub mod theme_helpers;
