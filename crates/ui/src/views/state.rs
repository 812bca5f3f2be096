use dioxus::prelude::*;
use services::{ApiError, AttemptError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewError {
    Unknown,
    Offline,
    NotFound,
    Unsupported,
}

impl ViewError {
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::Unknown => "Something went wrong. Please try again.",
            Self::Offline => "Could not reach the server. Check your connection and retry.",
            Self::NotFound => "This test is not available to you.",
            Self::Unsupported => "This test has coding questions and cannot be taken here.",
        }
    }
}

impl From<&ApiError> for ViewError {
    fn from(err: &ApiError) -> Self {
        match err {
            ApiError::NotFound => Self::NotFound,
            ApiError::Unsupported(_) => Self::Unsupported,
            ApiError::Network(_) => Self::Offline,
            _ => Self::Unknown,
        }
    }
}

impl From<AttemptError> for ViewError {
    fn from(err: AttemptError) -> Self {
        match &err {
            AttemptError::LoadFailed(api) | AttemptError::SubmitFailed(api) => Self::from(api),
            _ => Self::Unknown,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ViewState<T> {
    Idle,
    Loading,
    Ready(T),
    Error(ViewError),
}

#[must_use]
pub fn view_state_from_resource<T: Clone>(
    resource: &Resource<Result<T, ViewError>>,
) -> ViewState<T> {
    match resource.state().cloned() {
        UseResourceState::Pending => ViewState::Loading,
        UseResourceState::Ready => match resource.value().read().as_ref() {
            Some(Ok(data)) => ViewState::Ready(data.clone()),
            Some(Err(err)) => ViewState::Error(*err),
            None => ViewState::Error(ViewError::Unknown),
        },
        UseResourceState::Paused | UseResourceState::Stopped => ViewState::Idle,
    }
}
