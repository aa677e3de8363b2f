pub mod health;
pub mod pipeline;
pub mod scheduler;
