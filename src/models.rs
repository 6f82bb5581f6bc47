use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roommate {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskType {
    pub name: String,
}

/// A completed-task record as stored by the remote API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub name: String,
    #[serde(
        default,
        deserialize_with = "deserialize_completed_on",
        serialize_with = "serialize_completed_on"
    )]
    pub date_completed: Option<NaiveDate>,
    #[serde(default)]
    pub completed_by: String,
}

/// Body of `POST /tasks`. Fields are sent as selected, empty or not; the
/// server decides whether the record is acceptable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub name: String,
    #[serde(serialize_with = "serialize_completed_on")]
    pub date_completed: Option<NaiveDate>,
    pub completed_by: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRoommate {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewTaskType {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoommateTotal {
    pub name: String,
    pub tasks: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoommateSummary {
    pub name: String,
    pub tasks: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTally {
    pub roommate_id: String,
    /// 1-based month as sent by the server. Signed so that a bad value
    /// costs one chart datum rather than the whole snapshot.
    pub month: i64,
    pub year: i32,
    pub task_count: u64,
}

/// Aggregates computed server-side. Every field may be missing on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSnapshot {
    #[serde(default)]
    pub tasks_by_roommate: Vec<RoommateTotal>,
    #[serde(default, deserialize_with = "deserialize_summary")]
    pub most_active_roommate: Option<RoommateSummary>,
    #[serde(default, deserialize_with = "deserialize_summary")]
    pub least_active_roommate: Option<RoommateSummary>,
    #[serde(default)]
    pub monthly_tasks_by_roommate: Vec<MonthlyTally>,
}

#[derive(Deserialize)]
struct RawSummary {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    tasks: Option<f64>,
}

// Counts that are absent, negative or non-finite mean "no data".
fn deserialize_summary<'de, D>(deserializer: D) -> Result<Option<RoommateSummary>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawSummary>::deserialize(deserializer)?;
    Ok(raw.and_then(|raw| {
        let tasks = raw.tasks.filter(|tasks| tasks.is_finite() && *tasks >= 0.0)?;
        Some(RoommateSummary {
            name: raw.name.unwrap_or_default(),
            tasks: tasks.round() as u64,
        })
    }))
}

pub fn parse_completed_on(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(stamp) = DateTime::parse_from_rfc3339(value) {
        return Some(stamp.date_naive());
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|stamp| stamp.date())
}

fn deserialize_completed_on<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|raw| !raw.trim().is_empty()).and_then(|raw| {
        let date = parse_completed_on(&raw);
        if date.is_none() {
            warn!("ignoring unparseable dateCompleted {raw:?}");
        }
        date
    }))
}

// Dates go out as a timestamp at UTC midnight, the shape the API stores.
fn serialize_completed_on<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match date {
        Some(date) => serializer.serialize_str(&format!("{}T00:00:00.000Z", date.format("%Y-%m-%d"))),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_accepts_plain_dates_and_timestamps() {
        let plain: Task = serde_json::from_value(serde_json::json!({
            "id": "t1",
            "name": "Dishes",
            "dateCompleted": "2024-03-05",
            "completedBy": "1"
        }))
        .unwrap();
        let stamped: Task = serde_json::from_value(serde_json::json!({
            "id": "t2",
            "name": "Trash",
            "dateCompleted": "2024-03-05T00:00:00.000Z",
            "completedBy": "1"
        }))
        .unwrap();

        let expected = NaiveDate::from_ymd_opt(2024, 3, 5);
        assert_eq!(plain.date_completed, expected);
        assert_eq!(stamped.date_completed, expected);
    }

    #[test]
    fn task_tolerates_missing_date() {
        let task: Task = serde_json::from_value(serde_json::json!({
            "id": "t1",
            "name": "Dishes",
            "dateCompleted": null,
            "completedBy": ""
        }))
        .unwrap();
        assert_eq!(task.date_completed, None);
    }

    #[test]
    fn malformed_date_is_dropped_not_fatal() {
        let tasks: Vec<Task> = serde_json::from_value(serde_json::json!([
            { "id": "t1", "name": "Dishes", "dateCompleted": "last tuesday", "completedBy": "1" },
            { "id": "t2", "name": "Trash", "dateCompleted": "2024-03-05", "completedBy": "1" }
        ]))
        .unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].date_completed, None);
        assert_eq!(tasks[1].date_completed, NaiveDate::from_ymd_opt(2024, 3, 5));
    }

    #[test]
    fn new_task_sends_midnight_timestamp_or_null() {
        let task = NewTask {
            name: "Dishes".to_string(),
            date_completed: NaiveDate::from_ymd_opt(2024, 3, 5),
            completed_by: "1".to_string(),
        };
        let body = serde_json::to_value(&task).unwrap();
        assert_eq!(body["dateCompleted"], "2024-03-05T00:00:00.000Z");
        assert_eq!(body["completedBy"], "1");

        let empty = NewTask {
            name: String::new(),
            date_completed: None,
            completed_by: String::new(),
        };
        let body = serde_json::to_value(&empty).unwrap();
        assert!(body["dateCompleted"].is_null());
        assert_eq!(body["name"], "");
    }

    #[test]
    fn snapshot_defaults_when_fields_missing() {
        let snapshot: AnalyticsSnapshot = serde_json::from_str("{}").unwrap();
        assert_eq!(snapshot, AnalyticsSnapshot::default());
        assert!(snapshot.most_active_roommate.is_none());
        assert!(snapshot.least_active_roommate.is_none());
    }

    #[test]
    fn snapshot_drops_summaries_without_usable_counts() {
        let snapshot: AnalyticsSnapshot = serde_json::from_value(serde_json::json!({
            "mostActiveRoommate": { "name": "Alice", "tasks": 7 },
            "leastActiveRoommate": { "name": "No data", "tasks": null },
            "monthlyTasksByRoommate": [
                { "roommateId": "1", "month": 3, "year": 2024, "taskCount": 4 }
            ]
        }))
        .unwrap();

        assert_eq!(
            snapshot.most_active_roommate,
            Some(RoommateSummary {
                name: "Alice".to_string(),
                tasks: 7
            })
        );
        assert_eq!(snapshot.least_active_roommate, None);
        assert_eq!(snapshot.monthly_tasks_by_roommate[0].month, 3);
    }

    #[test]
    fn negative_month_still_decodes() {
        let snapshot: AnalyticsSnapshot = serde_json::from_value(serde_json::json!({
            "tasksByRoommate": [{ "name": "Alice", "tasks": 4 }],
            "monthlyTasksByRoommate": [
                { "roommateId": "1", "month": -1, "year": 2024, "taskCount": 4 }
            ]
        }))
        .unwrap();
        assert_eq!(snapshot.tasks_by_roommate.len(), 1);
        assert_eq!(snapshot.monthly_tasks_by_roommate[0].month, -1);
    }
}
