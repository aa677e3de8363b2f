pub mod ai;
pub mod normalize;
pub mod ocr;
pub mod pipeline;
pub mod queue;
pub mod scheduler;
