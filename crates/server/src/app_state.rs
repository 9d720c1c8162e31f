use std::time::Duration;

use crate::api::TaskBoard;

#[derive(Clone)]
pub struct AppState {
    pub board: TaskBoard,
    pub clock_interval: Duration,
}

impl AppState {
    pub fn new(board: TaskBoard, clock_interval: Duration) -> Self {
        Self {
            board,
            clock_interval,
        }
    }
}
