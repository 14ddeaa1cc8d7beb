pub mod cache;
pub mod draft;

pub use cache::{CacheKey, CacheValue, OperationKind, ResultCache};
pub use draft::{DraftPatch, DraftStore, QuestionPatch};
