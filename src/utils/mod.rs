pub mod cache;
pub mod retry;

pub use cache::{Clock, ManualClock, SystemClock, TimedCache};
pub use retry::{retry_with_backoff, RetryPolicy};
