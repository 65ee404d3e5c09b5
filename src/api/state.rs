use crate::tools::CalendarTools;

pub struct AppState {
    pub tools: CalendarTools,
}

impl AppState {
    pub fn new(tools: CalendarTools) -> Self {
        Self { tools }
    }
}
