//! ape: a small dynamically typed expression language.
//!
//! Source text flows through `frontend` (tokens, Pratt parser), is lowered
//! by `bytecode::Compiler` into a [`bytecode::Bytecode`] package and runs on
//! the stack machine in `runtime`. [`pipeline`] strings the stages together.

pub mod bytecode;
pub mod frontend;
pub mod lang;
pub mod pipeline;
pub mod repl;
pub mod runtime;

pub use pipeline::{PipelineError, run_source};
