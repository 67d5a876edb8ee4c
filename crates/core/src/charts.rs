//! Chart shaping for the statistics dashboard
//!
//! Turns the backend's aggregate counts into series a chart widget can
//! draw directly. Rendering itself belongs to the front end.

use serde::Serialize;

use crate::models::{DayStat, StatEntry, TaskStats};

/// Weekday labels on the new-tasks trend, Monday first
pub const WEEK_DAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Slice colours for the status pie, cycled when there are more buckets
pub const PIE_PALETTE: [&str; 5] = ["#42a5f5", "#ffa726", "#66bb6a", "#ab47bc", "#ef5350"];

/// Completed/total card
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressView {
    pub completed: u64,
    pub total: u64,
    /// `0.0..=1.0`
    pub progress: f64,
}

impl ProgressView {
    pub fn percent_label(&self) -> String {
        format!("{}%", (self.progress * 100.0).round() as u64)
    }

    pub fn caption(&self) -> String {
        format!("{} of {} done", self.completed, self.total)
    }
}

impl From<TaskStats> for ProgressView {
    fn from(stats: TaskStats) -> Self {
        Self {
            completed: stats.completed_count,
            total: stats.total_count,
            progress: stats.progress(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PieSlice {
    pub name: String,
    pub count: u64,
    pub color: &'static str,
}

/// Labels paired index-for-index with values
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Series {
    pub labels: Vec<String>,
    pub data: Vec<u64>,
}

impl Series {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn max(&self) -> u64 {
        self.data.iter().copied().max().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.labels.iter().map(String::as_str).zip(self.data.iter().copied())
    }
}

/// Status distribution, one slice per bucket in backend order
pub fn status_pie(stats: &[StatEntry]) -> Vec<PieSlice> {
    stats
        .iter()
        .enumerate()
        .map(|(i, s)| PieSlice {
            name: s.name.replace('_', " "),
            count: s.count,
            color: PIE_PALETTE[i % PIE_PALETTE.len()],
        })
        .collect()
}

/// Priority breakdown as a bar series
pub fn priority_bars(stats: &[StatEntry]) -> Series {
    Series {
        labels: stats.iter().map(|p| p.name.clone()).collect(),
        data: stats.iter().map(|p| p.count).collect(),
    }
}

/// New tasks per weekday, Monday to Sunday, zero-filled
///
/// Day names are matched case-insensitively; repeated days are summed.
pub fn weekly_trend(stats: &[DayStat]) -> Series {
    let data = WEEK_DAYS
        .iter()
        .map(|day| {
            stats
                .iter()
                .filter(|s| s.day.trim().eq_ignore_ascii_case(day))
                .map(|s| s.count)
                .sum()
        })
        .collect();

    Series {
        labels: WEEK_DAYS.iter().map(|d| d.to_string()).collect(),
        data,
    }
}

/// Everything the dashboard draws
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardCharts {
    pub status: Vec<PieSlice>,
    pub priority: Series,
    pub new_tasks: Series,
}

impl DashboardCharts {
    pub fn shape(status: &[StatEntry], priority: &[StatEntry], new_tasks: &[DayStat]) -> Self {
        Self {
            status: status_pie(status),
            priority: priority_bars(priority),
            new_tasks: weekly_trend(new_tasks),
        }
    }
}
