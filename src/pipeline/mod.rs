//! The parse pipeline: tool invocation, tokenization, triple parsing and
//! output assembly.

pub mod assemble;
pub mod invoke;
pub mod tokenize;
pub mod triples;

pub use assemble::{OutputKind, ParsePipeline};
pub use invoke::{ToolOutput, ToolRunner};
pub use triples::{read_triples, ResultMap, SentenceResult};
