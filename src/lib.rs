//! Web API over the external Alpino parser.
//!
//! The linguistic analysis is delegated entirely to external processes;
//! what lives here is the orchestration around them: input-format
//! detection, the module chain (alpino → nerc → coref), triple parsing
//! into per-sentence result maps, and the two-phase XML/treebank assembly
//! mediated by a scoped temporary workspace.

pub mod chain;
pub mod classify;
pub mod config;
pub mod error;
pub mod handlers;
pub mod naf;
pub mod pipeline;
pub mod router;
