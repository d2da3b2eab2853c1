pub mod activity_logs;
pub mod milestone_events;
pub mod participants;
pub mod prize_entries;
pub mod prizes;
pub mod teams;

pub use activity_logs as activity_log_entity;
pub use milestone_events as milestone_event_entity;
pub use participants as participant_entity;
pub use prize_entries as prize_entry_entity;
pub use prizes as prize_entity;
pub use teams as team_entity;
