//! CLI argument definitions for Taskdeck.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use taskdeck_core::{parse_due_date, TaskRequest, TaskStatus, MAX_PRIORITY, MIN_PRIORITY};

use crate::error::{AppError, Result};

/// Taskdeck - personal task tracking against a Taskdeck backend.
///
/// Start with `taskdeck login <username>`, then `taskdeck tasks list`.
#[derive(Parser, Debug)]
#[command(name = "taskdeck")]
#[command(author, version, about = "Personal task tracking client", long_about = None)]
pub struct Cli {
    /// Backend base URL (overrides the config file)
    #[arg(long, global = true, env = "TASKDECK_BASE_URL")]
    pub base_url: Option<String>,

    /// Keep config and token store under this directory instead of the platform default
    #[arg(long, global = true, env = "TASKDECK_HOME")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in and remember the session
    Login {
        username: String,

        #[arg(long, env = "TASKDECK_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account and sign in
    Register {
        username: String,

        email: String,

        #[arg(long, env = "TASKDECK_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the stored session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Task management commands
    Tasks {
        #[command(subcommand)]
        command: TaskCommands,
    },

    /// Completion summary
    Stats,

    /// Progress plus status, priority and weekly charts
    Dashboard,
}

#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// List your tasks
    List {
        /// Only tasks in this status, e.g. in-progress
        #[arg(short, long, value_parser = parse_status)]
        status: Option<TaskStatus>,
    },

    /// Show one task
    Show { id: i64 },

    /// Create a task
    Add {
        title: String,

        #[command(flatten)]
        fields: TaskFields,
    },

    /// Change fields of an existing task; unspecified fields keep their value
    Update {
        id: i64,

        /// New title
        #[arg(long)]
        title: Option<String>,

        #[command(flatten)]
        fields: TaskFields,
    },

    /// Delete a task
    Delete { id: i64 },
}

#[derive(Args, Debug, Default)]
pub struct TaskFields {
    #[arg(short, long)]
    pub description: Option<String>,

    /// NEW, IN_PROGRESS, COMPLETED, ON_HOLD or CANCELED
    #[arg(short, long, value_parser = parse_status)]
    pub status: Option<TaskStatus>,

    /// 1 (Low), 2 (Medium), 3 (High) or 4 (Critical)
    #[arg(short, long)]
    pub priority: Option<i32>,

    /// Due date, e.g. 2024-05-01T10:00
    #[arg(long)]
    pub due: Option<String>,

    /// Remove the due date
    #[arg(long, conflicts_with = "due")]
    pub no_due: bool,
}

/// Accept only the statuses the backend defines, leniently spelled
fn parse_status(s: &str) -> taskdeck_core::Result<TaskStatus> {
    s.parse()
}

impl TaskFields {
    /// Overlay the given fields onto `req`
    pub fn apply(&self, req: &mut TaskRequest) -> Result<()> {
        if let Some(description) = &self.description {
            req.description = Some(description.clone());
        }
        if let Some(status) = &self.status {
            req.status = status.clone();
        }
        if let Some(priority) = self.priority {
            if !(MIN_PRIORITY..=MAX_PRIORITY).contains(&priority) {
                return Err(AppError::InvalidInput(format!(
                    "priority must be between {} and {}",
                    MIN_PRIORITY, MAX_PRIORITY
                )));
            }
            req.priority = priority;
        }
        if let Some(due) = &self.due {
            let parsed = parse_due_date(due)
                .ok_or_else(|| AppError::InvalidInput(format!("unrecognized due date: {}", due)))?;
            req.set_due(parsed);
        }
        if self.no_due {
            req.due_date = None;
        }
        Ok(())
    }
}
