//! Task Management view: roommates, the task-type catalog and completed
//! tasks, plus the three create operations.

use crate::client::ApiClient;
use crate::errors::ApiError;
use crate::format::long_date;
use crate::lifecycle::{push_notice, InFlight, LoadTicket, Notice, ViewLoader};
use crate::models::{NewRoommate, NewTask, NewTaskType, Roommate, Task};
use chrono::NaiveDate;
use serde::Serialize;
use std::{fmt, sync::Arc};
use tokio::{sync::Mutex, task::JoinHandle};
use tracing::{debug, error, info, warn};

/// Current form inputs. The date survives a successful Add Task so
/// consecutive entries for the same day need one pick.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskForm {
    pub task_name: String,
    pub date: Option<NaiveDate>,
    pub roommate_id: String,
    pub new_roommate: String,
    pub new_task_type: String,
}

#[derive(Debug, Clone, Default)]
pub struct TaskBoard {
    pub tasks: Vec<Task>,
    pub roommates: Vec<Roommate>,
    pub task_types: Vec<String>,
    pub form: TaskForm,
    pub notices: Vec<Notice>,
}

/// Add Task inputs as picked in one form submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskSelection {
    pub task_name: String,
    pub date: Option<NaiveDate>,
    pub roommate_id: String,
}

/// Outcome of a create operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    Sent,
    /// Input failed the local guard; nothing was sent.
    Skipped,
    /// The same operation is still outstanding; nothing was sent and a
    /// notice was recorded.
    Busy,
    /// The request failed; a notice was recorded.
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRow {
    pub id: String,
    pub name: String,
    pub date: String,
    /// Blank when the roommate is not known.
    pub completed_by: String,
}

impl fmt::Display for TaskRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {} | {}", self.name, self.date, self.completed_by)
    }
}

pub fn task_rows(tasks: &[Task], roommates: &[Roommate]) -> Vec<TaskRow> {
    tasks
        .iter()
        .map(|task| TaskRow {
            id: task.id.clone(),
            name: task.name.clone(),
            date: task.date_completed.map(long_date).unwrap_or_default(),
            completed_by: roommates
                .iter()
                .find(|roommate| roommate.id == task.completed_by)
                .map(|roommate| roommate.name.clone())
                .unwrap_or_default(),
        })
        .collect()
}

/// Everything the tasks tab renders.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPage {
    pub rows: Vec<TaskRow>,
    pub roommates: Vec<Roommate>,
    pub task_types: Vec<String>,
    pub form: TaskForm,
    pub notices: Vec<Notice>,
}

pub struct TaskManagementView {
    api: ApiClient,
    board: Arc<Mutex<TaskBoard>>,
    loader: ViewLoader,
    adding_task: InFlight,
    adding_roommate: InFlight,
    adding_task_type: InFlight,
}

impl TaskManagementView {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            board: Arc::new(Mutex::new(TaskBoard::default())),
            loader: ViewLoader::new("tasks"),
            adding_task: InFlight::default(),
            adding_roommate: InFlight::default(),
            adding_task_type: InFlight::default(),
        }
    }

    /// Starts loading tasks, roommates and task types concurrently.
    pub fn activate(&self) -> JoinHandle<()> {
        let api = self.api.clone();
        let board = Arc::clone(&self.board);
        self.loader
            .start(move |ticket| async move { load(api, board, ticket).await })
    }

    pub fn deactivate(&self) {
        self.loader.cancel();
    }

    pub async fn board(&self) -> TaskBoard {
        self.board.lock().await.clone()
    }

    pub async fn page(&self) -> TaskPage {
        let board = self.board.lock().await;
        to_page(&board, board.notices.clone())
    }

    /// Like [`Self::page`], but consumes pending notices.
    pub async fn take_page(&self) -> TaskPage {
        let mut board = self.board.lock().await;
        let notices = std::mem::take(&mut board.notices);
        to_page(&board, notices)
    }

    pub async fn select_task(&self, name: impl Into<String>) {
        self.board.lock().await.form.task_name = name.into();
    }

    pub async fn select_date(&self, date: Option<NaiveDate>) {
        self.board.lock().await.form.date = date;
    }

    pub async fn select_roommate(&self, roommate_id: impl Into<String>) {
        self.board.lock().await.form.roommate_id = roommate_id.into();
    }

    pub async fn set_new_roommate(&self, name: impl Into<String>) {
        self.board.lock().await.form.new_roommate = name.into();
    }

    pub async fn set_new_task_type(&self, name: impl Into<String>) {
        self.board.lock().await.form.new_task_type = name.into();
    }

    /// Records a completed task from the current selections. Empty fields
    /// are sent as-is; the server is the judge of what is acceptable.
    pub async fn add_task(&self) -> Submission {
        self.send_task(None).await
    }

    /// Writes `selection` into the form and records it, unless an earlier
    /// Add Task is still outstanding, in which case the form is untouched.
    pub async fn submit_task(&self, selection: TaskSelection) -> Submission {
        self.send_task(Some(selection)).await
    }

    pub async fn add_roommate(&self) -> Submission {
        self.send_roommate(None).await
    }

    pub async fn submit_roommate(&self, name: impl Into<String>) -> Submission {
        self.send_roommate(Some(name.into())).await
    }

    /// Adds a task type unless it is empty or already in the catalog
    /// (exact, case-sensitive comparison).
    pub async fn add_task_type(&self) -> Submission {
        self.send_task_type(None).await
    }

    pub async fn submit_task_type(&self, name: impl Into<String>) -> Submission {
        self.send_task_type(Some(name.into())).await
    }

    async fn send_task(&self, selection: Option<TaskSelection>) -> Submission {
        let Some(_guard) = self.adding_task.try_begin() else {
            return self.busy("add task").await;
        };

        let new_task = {
            let mut board = self.board.lock().await;
            if let Some(selection) = selection {
                board.form.task_name = selection.task_name;
                board.form.date = selection.date;
                board.form.roommate_id = selection.roommate_id;
            }
            NewTask {
                name: board.form.task_name.clone(),
                date_completed: board.form.date,
                completed_by: board.form.roommate_id.clone(),
            }
        };
        debug!("new task: {new_task:?}");

        match self.api.create_task(&new_task).await {
            Ok(task) => {
                info!("task {} recorded", task.id);
                let mut board = self.board.lock().await;
                board.tasks.push(task);
                board.form.task_name.clear();
                board.form.roommate_id.clear();
                Submission::Sent
            }
            Err(err) => self.fail("add task", err).await,
        }
    }

    async fn send_roommate(&self, pending: Option<String>) -> Submission {
        let Some(_guard) = self.adding_roommate.try_begin() else {
            return self.busy("add roommate").await;
        };
        let name = {
            let mut board = self.board.lock().await;
            if let Some(pending) = pending {
                board.form.new_roommate = pending;
            }
            board.form.new_roommate.trim().to_string()
        };
        if name.is_empty() {
            return Submission::Skipped;
        }

        match self.api.create_roommate(&NewRoommate { name }).await {
            Ok(roommate) => {
                info!("roommate {} added", roommate.id);
                let mut board = self.board.lock().await;
                board.roommates.push(roommate);
                board.form.new_roommate.clear();
                Submission::Sent
            }
            Err(err) => self.fail("add roommate", err).await,
        }
    }

    async fn send_task_type(&self, pending: Option<String>) -> Submission {
        let Some(_guard) = self.adding_task_type.try_begin() else {
            return self.busy("add task type").await;
        };
        let name = {
            let mut board = self.board.lock().await;
            if let Some(pending) = pending {
                board.form.new_task_type = pending;
            }
            let name = board.form.new_task_type.trim().to_string();
            if name.is_empty() || board.task_types.contains(&name) {
                return Submission::Skipped;
            }
            name
        };

        match self.api.create_task_type(&NewTaskType { name }).await {
            Ok(task_type) => {
                info!("task type {:?} added", task_type.name);
                let mut board = self.board.lock().await;
                board.task_types.push(task_type.name);
                board.form.new_task_type.clear();
                Submission::Sent
            }
            Err(err) => self.fail("add task type", err).await,
        }
    }

    async fn busy(&self, action: &str) -> Submission {
        warn!("{action} ignored: previous submission still in flight");
        push_notice(
            &mut self.board.lock().await.notices,
            Notice::Error(format!(
                "Could not {action}: a previous submission is still in progress"
            )),
        );
        Submission::Busy
    }

    async fn fail(&self, action: &str, err: ApiError) -> Submission {
        error!("failed to {action}: {err}");
        let notice = match &err {
            ApiError::Status { message, .. } if err.is_validation() => {
                let message = if message.trim().is_empty() {
                    format!("Could not {action}: the server rejected the input")
                } else {
                    message.trim().to_string()
                };
                Notice::Validation(message)
            }
            _ => Notice::Error(format!("Could not {action}: {err}")),
        };
        push_notice(&mut self.board.lock().await.notices, notice);
        Submission::Failed
    }
}

fn to_page(board: &TaskBoard, notices: Vec<Notice>) -> TaskPage {
    TaskPage {
        rows: task_rows(&board.tasks, &board.roommates),
        roommates: board.roommates.clone(),
        task_types: board.task_types.clone(),
        form: board.form.clone(),
        notices,
    }
}

async fn load(api: ApiClient, board: Arc<Mutex<TaskBoard>>, ticket: LoadTicket) {
    let tasks = async {
        let result = api.tasks().await;
        apply(&board, &ticket, "tasks", result, |board, tasks| board.tasks = tasks).await;
    };
    let roommates = async {
        let result = api.roommates().await;
        apply(&board, &ticket, "roommates", result, |board, roommates| {
            board.roommates = roommates
        })
        .await;
    };
    let task_types = async {
        let result = api
            .task_types()
            .await
            .map(|types| {
                types
                    .into_iter()
                    .map(|task_type| task_type.name)
                    .collect::<Vec<String>>()
            });
        apply(&board, &ticket, "task types", result, |board, names| {
            board.task_types = names
        })
        .await;
    };
    tokio::join!(tasks, roommates, task_types);
}

async fn apply<T: Default>(
    board: &Mutex<TaskBoard>,
    ticket: &LoadTicket,
    what: &str,
    result: Result<T, ApiError>,
    set: impl FnOnce(&mut TaskBoard, T),
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
