pub mod api;
pub mod error;
pub mod models;
pub mod services;
pub mod session;
pub mod utils;

pub use api::{ApiClient, ApiGateway};
pub use error::{FetchError, SyncError, ValidationError};
pub use services::sync::{DashboardSynchronizer, SyncPhase};
pub use services::triggers::{RefreshTrigger, TriggerHandle, TriggerSource};
pub use session::{Session, SessionStore};
