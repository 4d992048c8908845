//! ClauseLens HTTP service: upload analysis, PDF report export, feedback.

pub mod error;
pub mod logging;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::build_router;
pub use state::{AppState, FeedbackLog};
