//! Static twist dataset: the few-shot pool for retrieval.

mod error;
mod loader;
mod model;

#[cfg(test)]
mod tests;

pub use error::CorpusError;
pub use loader::{CorpusFormat, load_corpus, parse_corpus};
pub use model::TwistExample;
