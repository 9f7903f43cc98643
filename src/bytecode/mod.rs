pub mod compile;
pub mod compile_error;
pub mod disasm;
pub mod ir;
pub mod op;
pub mod stack_check_error;

pub use compile::Compiler;
pub use compile_error::CompileError;
pub use ir::{Bytecode, Instructions};
pub use op::Opcode;
pub use stack_check_error::{StackCheckError, check_bytecode};
