//! Sync layer: HTTP client for the sitelog backend and the dashboard fetch controller.

pub mod dashboard;
pub mod http;

pub use dashboard::{Dashboard, DashboardApi, LoadState, Source};
pub use http::{ApiClient, ApiError, GeneratedReply};
