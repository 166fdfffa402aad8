pub mod annotate;
pub mod classify;
pub mod config;
pub mod dataset;
pub mod dictionary;
pub mod error;
pub mod session;

pub use annotate::{annotate_dataset, AnnotateOptions, RunSummary};
pub use classify::{classify_text, detect, Detection};
pub use dataset::{AnnotatedDataset, Dataset};
pub use dictionary::{Dictionary, DictionaryStore, TermSet};
pub use error::{LexitagError, ValidationError};
pub use session::{RunOutcome, RunState, Session};
