//! Plain-text views for the terminal

use std::fmt::Write;

use taskdeck_core::{priority_label, PieSlice, ProgressView, Series, Task, UserProfile};

use crate::dashboard::DashboardData;

const BAR_WIDTH: usize = 30;

pub fn user(user: &UserProfile) -> String {
    format!("{} (id {})", user.username, user.id)
}

/// One line per task
pub fn task_line(task: &Task) -> String {
    let due = task
        .due_date_local()
        .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
        .or_else(|| task.due_date.clone())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "#{:<5} {:<8} {:<12} {:<17} {}",
        task.id,
        priority_label(task.priority),
        task.task_status.label(),
        due,
        task.title
    )
}

pub fn task_list(tasks: &[Task]) -> String {
    if tasks.is_empty() {
        return "No tasks".to_string();
    }
    tasks.iter().map(task_line).collect::<Vec<_>>().join("\n")
}

pub fn task_detail(task: &Task) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "#{} {}", task.id, task.title);
    let _ = writeln!(out, "  status:   {}", task.task_status.label());
    let _ = writeln!(
        out,
        "  priority: {} ({})",
        task.priority,
        priority_label(task.priority)
    );
    let _ = writeln!(
        out,
        "  due:      {}",
        task.due_date.as_deref().unwrap_or("-")
    );
    if let Some(description) = task.description.as_deref().filter(|d| !d.is_empty()) {
        let _ = writeln!(out, "\n  {}", description);
    }
    out.trim_end().to_string()
}

pub fn progress(view: &ProgressView) -> String {
    let filled = ((view.progress * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH);
    format!(
        "[{}{}] {}  {}",
        "#".repeat(filled),
        ".".repeat(BAR_WIDTH - filled),
        view.percent_label(),
        view.caption()
    )
}

/// Horizontal bars scaled to the largest value
pub fn bars(series: &Series) -> String {
    let max = series.max();
    let width = series.labels.iter().map(String::len).max().unwrap_or(0);
    series
        .iter()
        .map(|(label, value)| {
            let len = if max == 0 {
                0
            } else {
                (u128::from(value) * BAR_WIDTH as u128).div_ceil(u128::from(max)) as usize
            };
            format!("{:>width$} | {} {}", label, "=".repeat(len), value, width = width)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Pie as a share table
pub fn slices(slices: &[PieSlice]) -> String {
    let total: u64 = slices.iter().map(|s| s.count).sum();
    let width = slices.iter().map(|s| s.name.len()).max().unwrap_or(0);
    slices
        .iter()
        .map(|s| {
            let share = if total == 0 {
                0.0
            } else {
                s.count as f64 * 100.0 / total as f64
            };
            format!("{:>width$} {:>4} {:>5.1}%", s.name, s.count, share, width = width)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn dashboard(data: &DashboardData) -> String {
    let charts = &data.charts;
    format!(
        "Progress\n{}\n\nBy status\n{}\n\nBy priority\n{}\n\nNew this week\n{}",
        progress(&data.progress),
        slices(&charts.status),
        bars(&charts.priority),
        bars(&charts.new_tasks),
    )
}

#[cfg(test)]
mod tests {
    use taskdeck_core::{TaskStats, TaskStatus};

    use super::*;

    fn task() -> Task {
        Task {
            id: 3,
            title: "Write report".to_string(),
            description: None,
            task_status: TaskStatus::InProgress,
            priority: 2,
            due_date: Some("2024-05-01T10:00:00".to_string()),
            user_id: 1,
        }
    }

    #[test]
    fn test_task_line() {
        let line = task_line(&task());
        assert!(line.starts_with("#3"));
        assert!(line.contains("IN PROGRESS"));
        assert!(line.contains("Medium"));
        assert!(line.contains("2024-05-01 10:00"));
        assert!(line.ends_with("Write report"));
    }

    #[test]
    fn test_progress_bar() {
        let view = ProgressView::from(TaskStats {
            completed_count: 0,
            total_count: 0,
        });
        assert!(progress(&view).starts_with(&format!("[{}]", ".".repeat(BAR_WIDTH))));

        let view = ProgressView::from(TaskStats {
            completed_count: 5,
            total_count: 10,
        });
        assert!(progress(&view).contains("50%"));
    }

    #[test]
    fn test_bars_scale_to_max() {
        let series = Series {
            labels: vec!["Mon".to_string(), "Tue".to_string()],
            data: vec![4, 0],
        };
        let out = bars(&series);
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines[0].matches('=').count(), BAR_WIDTH);
        assert_eq!(lines[1].matches('=').count(), 0);
    }

    #[test]
    fn test_bars_handle_huge_counts() {
        let series = Series {
            labels: vec!["a".to_string(), "b".to_string()],
            data: vec![u64::MAX, u64::MAX / 2],
        };
        let out = bars(&series);
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines[0].matches('=').count(), BAR_WIDTH);
        assert_eq!(lines[1].matches('=').count(), BAR_WIDTH / 2);
    }

    #[test]
    fn test_unknown_priority_label() {
        let mut odd = task();
        odd.priority = 300;
        assert!(task_detail(&odd).contains("300 (Unknown)"));
    }

    #[test]
    fn test_empty_list() {
        assert_eq!(task_list(&[]), "No tasks");
    }
}
