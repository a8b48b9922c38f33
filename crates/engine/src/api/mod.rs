//! External API clients

pub mod backpack;

pub use backpack::{BackpackClient, FetchError, DEFAULT_BASE_URL};
