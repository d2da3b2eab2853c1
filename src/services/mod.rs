pub mod activity_service;
pub mod milestone_service;
pub mod qualification_service;
pub mod raffle_service;
pub mod roster_service;
pub mod stats_service;

pub use activity_service::ActivityService;
pub use milestone_service::MilestoneService;
pub use qualification_service::QualificationService;
pub use raffle_service::RaffleService;
pub use roster_service::RosterService;
pub use stats_service::StatsService;
