#![forbid(unsafe_code)]

pub mod api;
pub mod app_services;
pub mod attempt;
pub mod catalog;
pub mod countdown;
pub mod error;

pub use exam_core::Clock;

pub use api::{ApiConfig, AttemptStart, HttpTestApi, TestApi};
pub use app_services::AppServices;
pub use attempt::{AttemptService, LoadedAttempt, TickReport, ViolationReport};
pub use catalog::CatalogService;
pub use countdown::{CountdownTicker, TICK_INTERVAL, TickFlow};
pub use error::{ApiError, AppServicesError, AttemptError};
