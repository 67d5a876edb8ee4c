//! Front-end errors

use thiserror::Error;

use crate::session::SessionError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] taskdeck_core::Error),

    #[error(transparent)]
    Net(#[from] taskdeck_net::Error),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Not signed in; run `taskdeck login <username>` first")]
    NotSignedIn,

    #[error("Backend unreachable and session could not be verified")]
    Offline,

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
