//! Source-to-result call sequence shared by the REPL, the CLI and tests.

use tracing::debug;

use crate::bytecode::{
    Bytecode, CompileError, Compiler, StackCheckError,
    stack_check_error::check_bytecode_with_capacity,
};
use crate::frontend::{Lexer, Parser, ParserError};
use crate::lang::program::Program;
use crate::lang::value::Value;
use crate::runtime::{RuntimeError, Vm, VmConfig};

/// The first stage that failed, with its diagnostics.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PipelineError {
    #[error("parser errors:{}", fmt_parser_errors(.0))]
    Parse(Vec<ParserError>),

    #[error("compile error: {0}")]
    Compile(#[from] CompileError),

    #[error("stack-check error: {0}")]
    Check(#[from] StackCheckError),

    #[error("runtime error: {0}")]
    Runtime(#[from] RuntimeError),
}

/// One diagnostic per line, tab-indented.
fn fmt_parser_errors(errors: &[ParserError]) -> String {
    errors.iter().map(|e| format!("\n\t{}", e)).collect()
}

/// Parses `source`, returning every diagnostic if there were any.
pub fn parse(source: &str) -> Result<Program, PipelineError> {
    let mut parser = Parser::new(Lexer::new(source));
    let program = parser.parse_program();

    if !parser.errors().is_empty() {
        return Err(PipelineError::Parse(parser.into_errors()));
    }
    Ok(program)
}

/// Parses and compiles `source` into a fresh bytecode package.
pub fn compile_source(source: &str) -> Result<Bytecode, PipelineError> {
    let program = parse(source)?;
    let mut compiler = Compiler::new();
    compiler.compile(&program)?;
    Ok(compiler.into_bytecode())
}

/// Checks and executes a package, returning the value left on top of the
/// stack (`None` when the stack ends empty).
pub fn run_bytecode(bytecode: &Bytecode, config: &VmConfig) -> Result<Option<Value>, PipelineError> {
    check_bytecode_with_capacity(bytecode, config.stack_size)?;

    let mut vm = Vm::with_config(bytecode, config.clone());
    vm.run()?;

    let top = vm.stack_top().cloned();
    debug!(result = ?top, "pipeline finished");
    Ok(top)
}

/// Full pipeline: lex, parse, compile, check, run, read the stack top.
pub fn run_source(source: &str, config: &VmConfig) -> Result<Option<Value>, PipelineError> {
    let bytecode = compile_source(source)?;
    run_bytecode(&bytecode, config)
}
