//! Content source abstractions and implementations.

mod http;
mod mock;
mod provider;
mod retry;

pub use http::HttpContentSource;
pub use mock::MockContentSource;
pub use provider::ContentSource;
pub use retry::RetryingSource;
