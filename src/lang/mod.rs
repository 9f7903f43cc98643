//! # ape language model
//!
//! The AST produced by the parser and the runtime values the compiler and
//! VM work with.
//!
//! ## Rendering conventions
//!
//! - AST nodes render (`Display`) to canonical, fully parenthesized source.
//!   Parsing that text again gives back the same rendering.
//! - Values render to their inspect form, the text the REPL prints.

pub mod environment;
pub mod node;
pub mod program;
pub mod value;
