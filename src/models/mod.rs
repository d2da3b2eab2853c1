pub mod activity;
pub mod activity_type;
pub mod common;
pub mod milestone;
pub mod prize;
pub mod roster;

pub use activity::*;
pub use activity_type::*;
pub use common::*;
pub use milestone::*;
pub use prize::*;
pub use roster::*;

pub use crate::utils::pagination::{PaginatedResponse, PaginationInfo, PaginationParams};
