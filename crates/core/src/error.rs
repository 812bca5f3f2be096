use thiserror::Error;

use crate::model::{IdError, TestError, TestResultError};
use crate::session::SessionStateError;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Id(#[from] IdError),
    #[error(transparent)]
    Test(#[from] TestError),
    #[error(transparent)]
    Result(#[from] TestResultError),
    #[error(transparent)]
    Session(#[from] SessionStateError),
}
