use tracing::{debug, trace};

use crate::{
    bytecode::{
        compile_error::{CompileError, MAX_CONSTANTS},
        ir::{Bytecode, Instructions},
        op::{Opcode, make},
    },
    lang::{
        node::{Expression, InfixOperator, Statement},
        program::Program,
        value::Value,
    },
};

/// Single-pass AST to bytecode compiler.
///
/// The instruction buffer and constant pool only ever grow; a constant's
/// index is its position in the pool and is never reused. The first node
/// without a lowering aborts compilation.
#[derive(Debug, Default)]
pub struct Compiler {
    /// Output instruction stream
    instructions: Instructions,

    /// Constant pool, in emission order
    constants: Vec<Value>,
}

impl Compiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles every statement of `program`, appending to the current
    /// instruction stream and constant pool.
    pub fn compile(&mut self, program: &Program) -> Result<(), CompileError> {
        for stmt in &program.statements {
            self.compile_statement(stmt)?;
        }

        debug!(
            bytes = self.instructions.len(),
            constants = self.constants.len(),
            "compiled program"
        );
        Ok(())
    }

    /// Snapshot of what has been compiled so far.
    pub fn bytecode(&self) -> Bytecode {
        Bytecode::new(self.instructions.clone(), self.constants.clone())
    }

    pub fn into_bytecode(self) -> Bytecode {
        Bytecode::new(self.instructions, self.constants)
    }

    fn compile_statement(&mut self, stmt: &Statement) -> Result<(), CompileError> {
        match stmt {
            Statement::Expression { expression, .. } => self.compile_expression(expression),
            Statement::Block(block) => {
                for stmt in &block.statements {
                    self.compile_statement(stmt)?;
                }
                Ok(())
            }
            Statement::Let { .. } | Statement::Return { .. } => {
                Err(CompileError::unhandled_statement(stmt))
            }
        }
    }

    fn compile_expression(&mut self, expr: &Expression) -> Result<(), CompileError> {
        match expr {
            Expression::Integer { value, .. } => {
                let index = self.add_constant(Value::Integer(*value))?;
                self.emit(Opcode::Constant, &[index]);
                Ok(())
            }
            Expression::Infix {
                operator,
                left,
                right,
                ..
            } => {
                let Some(op) = arithmetic_opcode(*operator) else {
                    return Err(CompileError::unhandled_expression(expr));
                };
                self.compile_expression(left)?;
                self.compile_expression(right)?;
                self.emit(op, &[]);
                Ok(())
            }
            other => Err(CompileError::unhandled_expression(other)),
        }
    }

    /// Appends `value` to the pool and returns its index.
    fn add_constant(&mut self, value: Value) -> Result<usize, CompileError> {
        if self.constants.len() >= MAX_CONSTANTS {
            return Err(CompileError::TooManyConstants);
        }
        self.constants.push(value);
        Ok(self.constants.len() - 1)
    }

    /// Encodes and appends one instruction, returning its offset.
    fn emit(&mut self, op: Opcode, operands: &[usize]) -> usize {
        let position = self.instructions.push(&make(op, operands));
        trace!(position, op = op.name(), ?operands, "emit");
        position
    }
}

fn arithmetic_opcode(operator: InfixOperator) -> Option<Opcode> {
    match operator {
        InfixOperator::Add => Some(Opcode::Add),
        InfixOperator::Sub => Some(Opcode::Sub),
        InfixOperator::Mul => Some(Opcode::Mul),
        InfixOperator::Div => Some(Opcode::Div),
        InfixOperator::Eq | InfixOperator::NotEq | InfixOperator::Lt | InfixOperator::Gt => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::{lexer::Lexer, parser::Parser};
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> Program {
        let mut parser = Parser::new(Lexer::new(source));
        let program = parser.parse_program();
        assert!(parser.errors().is_empty(), "parser errors: {:?}", parser.errors());
        program
    }

    fn compile(source: &str) -> Result<Bytecode, CompileError> {
        let mut compiler = Compiler::new();
        compiler.compile(&parse(source))?;
        Ok(compiler.into_bytecode())
    }

    fn expect(source: &str, constants: &[i64], instructions: &[Vec<u8>]) {
        let bc = compile(source).unwrap();
        let expected_constants: Vec<Value> = constants.iter().map(|n| Value::Integer(*n)).collect();
        let expected_instructions: Instructions = instructions.iter().cloned().collect();
        assert_eq!(bc.constants, expected_constants, "constants for {source:?}");
        assert_eq!(
            bc.instructions.to_string(),
            expected_instructions.to_string(),
            "instructions for {source:?}"
        );
    }

    // =========================================================================
    // Arithmetic
    // =========================================================================

    #[test]
    fn test_integer_addition() {
        expect(
            "1 + 2",
            &[1, 2],
            &[
                make(Opcode::Constant, &[0]),
                make(Opcode::Constant, &[1]),
                make(Opcode::Add, &[]),
            ],
        );
    }

    #[test]
    fn test_each_arithmetic_operator() {
        for (src, op) in [
            ("1 - 2", Opcode::Sub),
            ("1 * 2", Opcode::Mul),
            ("2 / 1", Opcode::Div),
        ] {
            let bc = compile(src).unwrap();
            assert_eq!(bc.instructions.last().copied(), Some(op as u8), "{src}");
        }
    }

    #[test]
    fn test_operands_before_operator() {
        // (1 + (2 * 3))
        expect(
            "1 + 2 * 3",
            &[1, 2, 3],
            &[
                make(Opcode::Constant, &[0]),
                make(Opcode::Constant, &[1]),
                make(Opcode::Constant, &[2]),
                make(Opcode::Mul, &[]),
                make(Opcode::Add, &[]),
            ],
        );
    }

    #[test]
    fn test_constants_are_not_deduplicated() {
        expect(
            "7; 7",
            &[7, 7],
            &[make(Opcode::Constant, &[0]), make(Opcode::Constant, &[1])],
        );
    }

    #[test]
    fn test_block_statement_compiles_contents() {
        expect(
            "{ 1 + 2 }",
            &[1, 2],
            &[
                make(Opcode::Constant, &[0]),
                make(Opcode::Constant, &[1]),
                make(Opcode::Add, &[]),
            ],
        );
    }

    #[test]
    fn test_compile_appends_across_calls() {
        let mut compiler = Compiler::new();
        compiler.compile(&parse("1")).unwrap();
        let first = compiler.bytecode();
        compiler.compile(&parse("2")).unwrap();
        let second = compiler.bytecode();

        assert_eq!(first.constants, vec![Value::Integer(1)]);
        assert_eq!(second.constants, vec![Value::Integer(1), Value::Integer(2)]);
        assert_eq!(
            second.instructions.to_string(),
            "0000 OpConstant 0\n0003 OpConstant 1\n"
        );
    }

    #[test]
    fn test_empty_program() {
        let bc = compile("").unwrap();
        assert!(bc.instructions.is_empty());
        assert!(bc.constants.is_empty());
    }

    // =========================================================================
    // Unsupported nodes
    // =========================================================================

    #[test]
    fn test_unhandled_nodes() {
        for (src, node_type) in [
            ("x", "identifier"),
            ("\"s\"", "string literal"),
            ("true", "boolean literal"),
            ("-1", "prefix expression"),
            ("1 < 2", "infix expression"),
            ("[1]", "array literal"),
            ("f(1)", "function call"),
            ("if (1) { 2 }", "if expression"),
            ("let x = 1;", "let statement"),
            ("return 1;", "return statement"),
        ] {
            match compile(src) {
                Err(CompileError::UnhandledNode { node_type: got, .. }) => {
                    assert_eq!(got, node_type, "source: {src}")
                }
                other => panic!("expected UnhandledNode for {src:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_fail_fast_keeps_earlier_output() {
        let mut compiler = Compiler::new();
        let err = compiler.compile(&parse("1 + 2; x; 3")).unwrap_err();
        assert!(matches!(err, CompileError::UnhandledNode { .. }));
        // nothing after the failing statement was emitted
        assert_eq!(compiler.bytecode().constants.len(), 2);
    }

    #[test]
    fn test_too_many_constants() {
        let mut compiler = Compiler::new();
        compiler.constants = vec![Value::Null; MAX_CONSTANTS];
        assert_eq!(
            compiler.compile(&parse("1")),
            Err(CompileError::TooManyConstants)
        );
    }

    #[test]
    fn test_last_constant_index_is_addressable() {
        let mut compiler = Compiler::new();
        compiler.constants = vec![Value::Null; MAX_CONSTANTS - 1];
        compiler.compile(&parse("1")).unwrap();
        let bc = compiler.into_bytecode();
        assert_eq!(bc.instructions.as_bytes(), &[0, 0xFF, 0xFF]);
    }
}
