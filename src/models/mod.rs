pub mod assignment;
pub mod calendar;
pub mod dashboard;
pub mod filters;
pub mod semester;
pub mod subject;
pub mod user;

pub use assignment::*;
pub use calendar::*;
pub use dashboard::*;
pub use filters::*;
pub use semester::*;
pub use subject::*;
pub use user::*;
