//! Backend route table

pub const AUTH_LOGIN: &str = "/auth/login";
pub const AUTH_REGISTER: &str = "/auth/register";

pub const USER_ME: &str = "/users/me";

pub const TASKS: &str = "/tasks";
pub const TASK_STATS: &str = "/tasks/stats";
pub const TASK_STATUS_STATS: &str = "/tasks/status/stats";
pub const TASK_PRIORITY_STATS: &str = "/tasks/priority/stats";
pub const TASK_NEW_STATS: &str = "/tasks/new-tasks/stats";

/// `/tasks/{id}`
pub fn task(id: i64) -> String {
    format!("{}/{}", TASKS, id)
}
