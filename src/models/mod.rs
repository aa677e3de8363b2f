pub mod appointment;
pub mod extraction;
pub mod task;

pub use appointment::{Appointment, NormalizedDateTime};
pub use extraction::{Entities, EntityExtraction, ExtractedText};
pub use task::{ScheduledTask, TaskStatus};
