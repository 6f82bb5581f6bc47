use crate::client::ApiClient;
use crate::shell::Shell;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub shell: Arc<Shell>,
}

impl AppState {
    pub fn new(api: ApiClient) -> Self {
        Self {
            shell: Arc::new(Shell::new(api)),
        }
    }
}
