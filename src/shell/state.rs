use crate::modules::calorie_sync::use_cases::sync_calories::runner::SyncRunner;
use crate::modules::calorie_sync::use_cases::today_calories::handler::TodayCaloriesHandler;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub runner: Arc<SyncRunner>,
    pub today: Arc<TodayCaloriesHandler>,
}
