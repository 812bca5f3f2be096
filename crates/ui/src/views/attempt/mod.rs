mod components;
mod scripts;
mod view;

pub use view::AttemptView;

#[cfg(test)]
pub(crate) use view::AttemptTestHandles;
