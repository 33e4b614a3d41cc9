use crate::shell::config::AppConfig;
use crate::shell::state::AppState;

pub fn make_test_state() -> AppState {
    AppState::in_memory(&AppConfig::default())
}
