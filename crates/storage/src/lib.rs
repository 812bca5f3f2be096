pub mod repository;
pub mod sqlite;

pub use repository::{AttemptDraft, DraftRepository, InMemoryDraftRepository, Storage, StorageError};
