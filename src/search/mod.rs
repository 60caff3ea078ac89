//! Article ranking: keyword heuristics and the embedding-backed semantic index.

pub mod keyword;
pub mod semantic;

pub use keyword::rank_by_keyword;
pub use semantic::{IndexError, IndexState, SearchError, SemanticIndex};
