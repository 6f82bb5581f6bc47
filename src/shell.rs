use crate::analytics::TaskAnalyticsView;
use crate::client::ApiClient;
use crate::management::TaskManagementView;
use serde::{Deserialize, Serialize};
use std::{
    str::FromStr,
    sync::{Mutex, PoisonError},
};
use tokio::task::JoinHandle;
use tracing::info;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    #[default]
    Tasks,
    Analytics,
}

impl Tab {
    pub const ALL: [Tab; 2] = [Tab::Tasks, Tab::Analytics];

    pub fn slug(self) -> &'static str {
        match self {
            Tab::Tasks => "tasks",
            Tab::Analytics => "analytics",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Tab::Tasks => "Task Management",
            Tab::Analytics => "Task Analytics",
        }
    }

    pub fn subtitle(self) -> &'static str {
        match self {
            Tab::Tasks => "Manage roommate tasks and track completion",
            Tab::Analytics => "View task completion statistics and roommate performance",
        }
    }
}

impl FromStr for Tab {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "tasks" => Ok(Tab::Tasks),
            "analytics" => Ok(Tab::Analytics),
            other => Err(format!("unknown tab '{other}', expected 'tasks' or 'analytics'")),
        }
    }
}

/// Tab container: exactly one view is active, switching tabs cancels
/// whatever the previous view was still loading.
pub struct Shell {
    active: Mutex<Tab>,
    pub tasks: TaskManagementView,
    pub analytics: TaskAnalyticsView,
}

impl Shell {
    pub fn new(api: ApiClient) -> Self {
        Self {
            active: Mutex::new(Tab::default()),
            tasks: TaskManagementView::new(api.clone()),
            analytics: TaskAnalyticsView::new(api),
        }
    }

    pub fn active(&self) -> Tab {
        *self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Makes `tab` the active view and starts its load.
    pub fn activate(&self, tab: Tab) -> JoinHandle<()> {
        let previous = std::mem::replace(
            &mut *self.active.lock().unwrap_or_else(PoisonError::into_inner),
            tab,
        );
        if previous != tab {
            info!("switching tab: {} -> {}", previous.slug(), tab.slug());
            match previous {
                Tab::Tasks => self.tasks.deactivate(),
                Tab::Analytics => self.analytics.deactivate(),
            }
        }
        match tab {
            Tab::Tasks => self.tasks.activate(),
            Tab::Analytics => self.analytics.activate(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tabs_parse_from_slugs() {
        for tab in Tab::ALL {
            assert_eq!(tab.slug().parse::<Tab>(), Ok(tab));
        }
        assert!("dashboard".parse::<Tab>().is_err());
        assert_eq!(Tab::default(), Tab::Tasks);
    }
}
