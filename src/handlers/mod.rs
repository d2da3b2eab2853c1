pub mod activity;
pub mod digest;
pub mod milestone;
pub mod prize;
pub mod roster;

pub use activity::activity_config;
pub use digest::digest_config;
pub use milestone::milestone_config;
pub use prize::prize_config;
pub use roster::roster_config;
