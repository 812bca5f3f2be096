mod attempt;
mod results;
mod state;

#[cfg(test)]
mod test_harness;
#[cfg(test)]
mod view_smoke;

pub use attempt::AttemptView;
pub use results::ResultsView;
pub use state::{ViewError, ViewState, view_state_from_resource};
pub use tests::TestsView;
