use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::CourseService;

#[derive(Clone)]
pub struct AppState {
    pub service: CourseService,
    pub config: Arc<AppConfig>,
}
