//! Command implementations
//!
//! Each command returns the text to print; `main` owns stdout.

use taskdeck_core::{SignupRequest, TaskRequest, UserProfile};
use taskdeck_net::CancellationToken;
use tracing::{debug, instrument};

use crate::cli::{Commands, TaskCommands};
use crate::dashboard::load_dashboard;
use crate::error::{AppError, Result};
use crate::render;
use crate::session::SessionPhase;
use crate::state::AppState;

#[instrument(skip_all)]
pub async fn execute(
    state: &AppState,
    command: Commands,
    cancel: &CancellationToken,
) -> Result<String> {
    match command {
        Commands::Login { username, password } => {
            let user = state.session.login(&username, &password, cancel).await?;
            Ok(format!("Signed in as {}", render::user(&user)))
        }
        Commands::Register {
            username,
            email,
            password,
        } => {
            let req = SignupRequest {
                username,
                email,
                password,
            };
            let user = state.session.register(&req, cancel).await?;
            Ok(format!("Registered and signed in as {}", render::user(&user)))
        }
        Commands::Logout => {
            state.session.sign_out().await?;
            Ok("Signed out".to_string())
        }
        Commands::Whoami => {
            let user = require_session(state, cancel).await?;
            Ok(render::user(&user))
        }
        Commands::Tasks { command } => {
            require_session(state, cancel).await?;
            tasks(state, command, cancel).await
        }
        Commands::Stats => {
            require_session(state, cancel).await?;
            let stats = state.api.tasks().stats(cancel).await?;
            Ok(render::progress(&stats.into()))
        }
        Commands::Dashboard => {
            require_session(state, cancel).await?;
            let data = load_dashboard(&state.api, cancel).await?;
            Ok(render::dashboard(&data))
        }
    }
}

async fn tasks(
    state: &AppState,
    command: TaskCommands,
    cancel: &CancellationToken,
) -> Result<String> {
    let api = state.api.tasks();
    match command {
        TaskCommands::List { status } => {
            let mut tasks = api.list(cancel).await?;
            if let Some(status) = status {
                tasks.retain(|t| t.task_status == status);
            }
            Ok(render::task_list(&tasks))
        }
        TaskCommands::Show { id } => {
            let task = api.get(id, cancel).await?;
            Ok(render::task_detail(&task))
        }
        TaskCommands::Add { title, fields } => {
            let mut req = TaskRequest::new(title);
            fields.apply(&mut req)?;
            req.validate()?;
            let task = api.create(&req, cancel).await?;
            Ok(format!("Created {}", render::task_line(&task)))
        }
        TaskCommands::Update { id, title, fields } => {
            let current = api.get(id, cancel).await?;
            let mut req = TaskRequest::from(&current);
            if let Some(title) = title {
                req.title = title;
            }
            fields.apply(&mut req)?;
            req.validate_update(&current)?;
            let task = api.update(id, &req, cancel).await?;
            Ok(format!("Updated {}", render::task_line(&task)))
        }
        TaskCommands::Delete { id } => {
            api.delete(id, cancel).await?;
            Ok(format!("Deleted #{}", id))
        }
    }
}

/// The signed-in user, retrying the profile check once if startup was offline
async fn require_session(state: &AppState, cancel: &CancellationToken) -> Result<UserProfile> {
    let mut session = state.session.snapshot();
    if session.phase == SessionPhase::Offline {
        debug!("Session offline, revalidating");
        session = state.session.revalidate(cancel).await?;
    }

    match session.phase {
        SessionPhase::Authenticated => session.user.ok_or(AppError::NotSignedIn),
        SessionPhase::Offline => Err(AppError::Offline),
        _ => Err(AppError::NotSignedIn),
    }
}
