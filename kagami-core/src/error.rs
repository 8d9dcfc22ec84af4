use thiserror::Error;

use crate::api::gateway::GatewayError;
use crate::evaluatee::AngleError;
use crate::form::FormError;
use crate::session::SessionError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Form error: {0}")]
    Form(#[from] FormError),
    #[error("Angle error: {0}")]
    Angle(#[from] AngleError),
    #[error("Session error: {0}")]
    Session(#[from] SessionError),
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type KagamiResult<T> = Result<T, Error>;

impl Error {
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Error::Internal(message.into())
    }
}
