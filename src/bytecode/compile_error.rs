use crate::lang::node::{Expression, Statement};

/// Largest constant pool an `OpConstant` operand can address.
pub const MAX_CONSTANTS: usize = u16::MAX as usize + 1;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    /// A node the compiler has no lowering for yet.
    #[error("cannot compile '{node_type}' node{}", fmt_hint(.hint))]
    UnhandledNode {
        node_type: String,
        hint: Option<String>,
    },

    /// The constant pool is full; a further `OpConstant` operand would not
    /// fit in two bytes.
    #[error("too many constants: the pool holds at most 65536 entries")]
    TooManyConstants,
}

impl CompileError {
    /// Create an error for an expression with no lowering
    pub fn unhandled_expression(expr: &Expression) -> Self {
        CompileError::UnhandledNode {
            node_type: expr.kind_name().to_string(),
            hint: Some(hint_for_expression(expr).to_string()),
        }
    }

    /// Create an error for a statement with no lowering
    pub fn unhandled_statement(stmt: &Statement) -> Self {
        CompileError::UnhandledNode {
            node_type: stmt.kind_name().to_string(),
            hint: Some(
                "only expression statements are supported by the bytecode compiler".to_string(),
            ),
        }
    }
}

fn fmt_hint(hint: &Option<String>) -> String {
    match hint {
        Some(h) => format!("\n  hint: {}", h),
        None => String::new(),
    }
}

fn hint_for_expression(expr: &Expression) -> &'static str {
    match expr {
        Expression::Infix { .. } => {
            "only the arithmetic operators + - * / are supported by the bytecode compiler"
        }
        Expression::Identifier(_) => "variables are not supported by the bytecode compiler",
        Expression::Call { .. } | Expression::Function { .. } => {
            "functions are not supported by the bytecode compiler"
        }
        Expression::If { .. } | Expression::For { .. } => {
            "control flow is not supported by the bytecode compiler"
        }
        _ => "this may be a language feature not yet supported by the bytecode compiler",
    }
}
