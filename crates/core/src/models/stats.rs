//! Aggregate statistics returned by the task backend

use serde::{Deserialize, Deserializer, Serialize};

/// `GET /tasks/stats`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    pub completed_count: u64,
    pub total_count: u64,
}

impl TaskStats {
    /// Completed share in `0.0..=1.0`; zero when there are no tasks
    pub fn progress(&self) -> f64 {
        if self.total_count == 0 {
            return 0.0;
        }
        (self.completed_count as f64 / self.total_count as f64).min(1.0)
    }
}

/// One bucket of the status or priority breakdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatEntry {
    /// Status name or priority level; numeric names are read as text
    #[serde(deserialize_with = "string_or_number")]
    pub name: String,
    pub count: u64,
}

/// New tasks created on a given weekday (`Mon`, `Tue`, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayStat {
    pub day: String,
    pub count: u64,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Name {
        Text(String),
        Int(i64),
    }

    Ok(match Name::deserialize(deserializer)? {
        Name::Text(s) => s,
        Name::Int(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_ratio() {
        let stats: TaskStats =
            serde_json::from_str(r#"{"completedCount":3,"totalCount":10}"#).unwrap();
        assert!((stats.progress() - 0.3).abs() < f64::EPSILON);
    }

    #[test]
    fn test_progress_zero_total() {
        let stats = TaskStats {
            completed_count: 0,
            total_count: 0,
        };
        assert_eq!(stats.progress(), 0.0);
    }

    #[test]
    fn test_stat_entry_numeric_name() {
        let entries: Vec<StatEntry> =
            serde_json::from_str(r#"[{"name":1,"count":4},{"name":"2","count":1}]"#).unwrap();
        assert_eq!(entries[0].name, "1");
        assert_eq!(entries[1].name, "2");
    }
}
