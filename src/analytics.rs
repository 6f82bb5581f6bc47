//! Task Analytics view. All counting happens server-side; this joins
//! roommate ids to names and reshapes the snapshot into chart series.

use crate::client::ApiClient;
use crate::errors::ApiError;
use crate::format::month_label;
use crate::lifecycle::{push_notice, LoadTicket, Notice, ViewLoader};
use crate::models::{AnalyticsSnapshot, MonthlyTally, Roommate, RoommateSummary, RoommateTotal};
use serde::Serialize;
use std::sync::Arc;
use tokio::{sync::Mutex, task::JoinHandle};
use tracing::{debug, error, warn};

const UNKNOWN_ROOMMATE: &str = "Unknown";

#[derive(Debug, Clone, Default)]
pub struct AnalyticsBoard {
    pub snapshot: AnalyticsSnapshot,
    pub roommates: Vec<Roommate>,
    pub notices: Vec<Notice>,
}

/// Summary card content; `NoData` when the server had nothing to report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Card {
    Active { name: String, tasks: u64 },
    NoData,
}

impl From<Option<&RoommateSummary>> for Card {
    fn from(summary: Option<&RoommateSummary>) -> Self {
        match summary {
            Some(summary) => Card::Active {
                name: summary.name.clone(),
                tasks: summary.tasks,
            },
            None => Card::NoData,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyDatum {
    pub name: String,
    pub month: String,
    pub task_count: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsPage {
    pub most_active: Card,
    pub least_active: Card,
    pub totals: Vec<RoommateTotal>,
    pub monthly: Vec<MonthlyDatum>,
    pub notices: Vec<Notice>,
}

/// One datum per tally; tallies with a month outside 1..=12 (negative
/// included) are dropped.
pub fn monthly_data(tallies: &[MonthlyTally], roommates: &[Roommate]) -> Vec<MonthlyDatum> {
    tallies
        .iter()
        .filter_map(|tally| {
            let month = match month_label(tally.month, tally.year) {
                Ok(month) => month,
                Err(err) => {
                    warn!("skipping tally for roommate {}: {err}", tally.roommate_id);
                    return None;
                }
            };
            let name = roommates
                .iter()
                .find(|roommate| roommate.id == tally.roommate_id)
                .map_or(UNKNOWN_ROOMMATE, |roommate| roommate.name.as_str());
            Some(MonthlyDatum {
                name: name.to_string(),
                month,
                task_count: tally.task_count,
            })
        })
        .collect()
}

pub fn build_page(board: &AnalyticsBoard, notices: Vec<Notice>) -> AnalyticsPage {
    let snapshot = &board.snapshot;
    AnalyticsPage {
        most_active: Card::from(snapshot.most_active_roommate.as_ref()),
        least_active: Card::from(snapshot.least_active_roommate.as_ref()),
        totals: snapshot.tasks_by_roommate.clone(),
        monthly: monthly_data(&snapshot.monthly_tasks_by_roommate, &board.roommates),
        notices,
    }
}

pub struct TaskAnalyticsView {
    api: ApiClient,
    board: Arc<Mutex<AnalyticsBoard>>,
    loader: ViewLoader,
}

impl TaskAnalyticsView {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            board: Arc::new(Mutex::new(AnalyticsBoard::default())),
            loader: ViewLoader::new("analytics"),
        }
    }

    pub fn activate(&self) -> JoinHandle<()> {
        let api = self.api.clone();
        let board = Arc::clone(&self.board);
        self.loader
            .start(move |ticket| async move { load(api, board, ticket).await })
    }

    pub fn deactivate(&self) {
        self.loader.cancel();
    }

    pub async fn board(&self) -> AnalyticsBoard {
        self.board.lock().await.clone()
    }

    pub async fn page(&self) -> AnalyticsPage {
        let board = self.board.lock().await;
        build_page(&board, board.notices.clone())
    }

    pub async fn take_page(&self) -> AnalyticsPage {
        let mut board = self.board.lock().await;
        let notices = std::mem::take(&mut board.notices);
        build_page(&board, notices)
    }
}

async fn load(api: ApiClient, board: Arc<Mutex<AnalyticsBoard>>, ticket: LoadTicket) {
    let snapshot = async {
        let result = api.analytics().await;
        apply(&board, &ticket, "analytics", result, |board, snapshot| {
            board.snapshot = snapshot
        })
        .await;
    };
    let roommates = async {
        let result = api.roommates().await;
        apply(&board, &ticket, "roommates", result, |board, roommates| {
            board.roommates = roommates
        })
        .await;
    };
    tokio::join!(snapshot, roommates);
}

async fn apply<T: Default>(
    board: &Mutex<AnalyticsBoard>,
    ticket: &LoadTicket,
    what: &str,
    result: Result<T, ApiError>,
    set: impl FnOnce(&mut AnalyticsBoard, T),
) {
    let mut board = board.lock().await;
    let board = &mut *board;
    let written = ticket.write_if_live(|| match result {
        Ok(value) => set(&mut *board, value),
        Err(err) => {
            error!("failed to fetch {what}: {err}");
            set(&mut *board, T::default());
            push_notice(
                &mut board.notices,
                Notice::Error(format!("Could not load {what}: {err}")),
            );
        }
    });
    if written.is_none() {
        debug!("dropping late {what} result");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Vec<Roommate> {
        vec![Roommate {
            id: "1".to_string(),
            name: "Alice".to_string(),
        }]
    }

    fn tally(roommate_id: &str, month: i64) -> MonthlyTally {
        MonthlyTally {
            roommate_id: roommate_id.to_string(),
            month,
            year: 2024,
            task_count: 4,
        }
    }

    #[test]
    fn monthly_data_joins_names_and_labels_months() {
        let data = monthly_data(&[tally("1", 3)], &alice());
        assert_eq!(
            data,
            vec![MonthlyDatum {
                name: "Alice".to_string(),
                month: "Mar 2024".to_string(),
                task_count: 4,
            }]
        );
    }

    #[test]
    fn monthly_data_marks_unknown_roommates_and_drops_bad_months() {
        let data = monthly_data(
            &[tally("9", 1), tally("1", 0), tally("1", 13), tally("1", -1)],
            &alice(),
        );
        assert_eq!(data.len(), 1);
        assert_eq!(data[0].name, "Unknown");
        assert_eq!(data[0].month, "Jan 2024");
    }

    #[test]
    fn empty_snapshot_renders_no_data_cards() {
        let page = build_page(&AnalyticsBoard::default(), Vec::new());
        assert_eq!(page.most_active, Card::NoData);
        assert_eq!(page.least_active, Card::NoData);
        assert!(page.totals.is_empty());
        assert!(page.monthly.is_empty());
    }

    #[test]
    fn summaries_become_active_cards() {
        let board = AnalyticsBoard {
            snapshot: AnalyticsSnapshot {
                most_active_roommate: Some(RoommateSummary {
                    name: "Alice".to_string(),
                    tasks: 9,
                }),
                ..AnalyticsSnapshot::default()
            },
            ..AnalyticsBoard::default()
        };
        let page = build_page(&board, Vec::new());
        assert_eq!(
            page.most_active,
            Card::Active {
                name: "Alice".to_string(),
                tasks: 9
            }
        );
        assert_eq!(page.least_active, Card::NoData);
    }
}
