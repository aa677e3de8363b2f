use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::config::AppConfig;
use crate::services::ai::LlmProvider;
use crate::services::ocr::OcrProvider;
use crate::services::queue::JobQueue;

pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub config: AppConfig,
    pub llm: Box<dyn LlmProvider>,
    pub ocr: Box<dyn OcrProvider>,
    pub queue: Box<dyn JobQueue>,
}
