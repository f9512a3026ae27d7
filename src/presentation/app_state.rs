// Application state for HTTP handlers
use crate::application::status_service::StatusService;

#[derive(Clone)]
pub struct AppState {
    pub status_service: StatusService,
}
