pub mod agents;
pub mod ai;
pub mod decisions;
pub mod health;
pub mod time;
