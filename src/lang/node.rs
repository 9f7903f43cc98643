use std::fmt;

use crate::frontend::token::{Token, TokenKind};

/// A bare name, used both as an expression and as a binding site
/// (`let` targets and function parameters).
#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub token: Token,
    pub value: String,
}

impl Identifier {
    pub fn new(token: Token) -> Self {
        let value = token.literal.clone();
        Identifier { token, value }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Unary operators accepted in prefix position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixOperator {
    /// `!x`
    Not,
    /// `-x`
    Negate,
}

impl PrefixOperator {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Bang => Some(PrefixOperator::Not),
            TokenKind::Minus => Some(PrefixOperator::Negate),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            PrefixOperator::Not => "!",
            PrefixOperator::Negate => "-",
        }
    }
}

/// Binary operators accepted in infix position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfixOperator {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    NotEq,
    Lt,
    Gt,
}

impl InfixOperator {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        Some(match kind {
            TokenKind::Plus => InfixOperator::Add,
            TokenKind::Minus => InfixOperator::Sub,
            TokenKind::Asterisk => InfixOperator::Mul,
            TokenKind::Slash => InfixOperator::Div,
            TokenKind::Eq => InfixOperator::Eq,
            TokenKind::NotEq => InfixOperator::NotEq,
            TokenKind::Lt => InfixOperator::Lt,
            TokenKind::Gt => InfixOperator::Gt,
            _ => return None,
        })
    }

    pub fn symbol(self) -> &'static str {
        match self {
            InfixOperator::Add => "+",
            InfixOperator::Sub => "-",
            InfixOperator::Mul => "*",
            InfixOperator::Div => "/",
            InfixOperator::Eq => "==",
            InfixOperator::NotEq => "!=",
            InfixOperator::Lt => "<",
            InfixOperator::Gt => ">",
        }
    }
}

impl fmt::Display for PrefixOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl fmt::Display for InfixOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Expression nodes. Every variant carries the token it started from.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Identifier(Identifier),

    /// `5`
    Integer { token: Token, value: i64 },

    /// `"text"`
    String { token: Token, value: String },

    /// `true` / `false`
    Boolean { token: Token, value: bool },

    /// `[a, b, c]`
    Array {
        token: Token,
        elements: Vec<Expression>,
    },

    /// `{{ key: value, ... }}`
    ///
    /// Pairs keep source order for rendering only; lookups never depend on it.
    Object {
        token: Token,
        pairs: Vec<(Expression, Expression)>,
    },

    /// `!x`, `-x`
    Prefix {
        token: Token,
        operator: PrefixOperator,
        right: Box<Expression>,
    },

    /// `a + b`
    Infix {
        token: Token,
        operator: InfixOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },

    /// `if (cond) { ... } else { ... }`
    If {
        token: Token,
        condition: Box<Expression>,
        consequence: BlockStatement,
        alternative: Option<BlockStatement>,
    },

    /// `for (cond) { ... }`
    For {
        token: Token,
        condition: Box<Expression>,
        body: BlockStatement,
    },

    /// `fn(x, y) { ... }`
    Function {
        token: Token,
        params: Vec<Identifier>,
        body: BlockStatement,
    },

    /// `callee(a, b)`
    Call {
        token: Token,
        function: Box<Expression>,
        arguments: Vec<Expression>,
    },

    /// `collection[index]`
    Index {
        token: Token,
        left: Box<Expression>,
        index: Box<Expression>,
    },
}

impl Expression {
    fn token(&self) -> &Token {
        match self {
            Expression::Identifier(ident) => &ident.token,
            Expression::Integer { token, .. }
            | Expression::String { token, .. }
            | Expression::Boolean { token, .. }
            | Expression::Array { token, .. }
            | Expression::Object { token, .. }
            | Expression::Prefix { token, .. }
            | Expression::Infix { token, .. }
            | Expression::If { token, .. }
            | Expression::For { token, .. }
            | Expression::Function { token, .. }
            | Expression::Call { token, .. }
            | Expression::Index { token, .. } => token,
        }
    }

    /// Literal text of the token this expression started from.
    pub fn token_literal(&self) -> &str {
        &self.token().literal
    }

    /// Human-readable node kind, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Expression::Identifier(_) => "identifier",
            Expression::Integer { .. } => "integer literal",
            Expression::String { .. } => "string literal",
            Expression::Boolean { .. } => "boolean literal",
            Expression::Array { .. } => "array literal",
            Expression::Object { .. } => "object literal",
            Expression::Prefix { .. } => "prefix expression",
            Expression::Infix { .. } => "infix expression",
            Expression::If { .. } => "if expression",
            Expression::For { .. } => "for expression",
            Expression::Function { .. } => "function literal",
            Expression::Call { .. } => "function call",
            Expression::Index { .. } => "index expression",
        }
    }
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for Expression {
    /// Canonical, fully parenthesized source form. Re-parsing the output
    /// yields an expression with the same rendering.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Identifier(ident) => write!(f, "{}", ident),
            Expression::Integer { token, .. } => write!(f, "{}", token.literal),
            Expression::String { value, .. } => write!(f, "\"{}\"", value),
            Expression::Boolean { value, .. } => write!(f, "{}", value),
            Expression::Array { elements, .. } => {
                write!(f, "[")?;
                write_list(f, elements)?;
                write!(f, "]")
            }
            Expression::Object { pairs, .. } => {
                // Spaces keep a trailing `}` of a nested block from fusing
                // with the closing brace into `}}`.
                write!(f, "{{{{ ")?;
                for (i, (key, value)) in pairs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                if !pairs.is_empty() {
                    write!(f, " ")?;
                }
                write!(f, "}}}}")
            }
            Expression::Prefix {
                operator, right, ..
            } => write!(f, "({}{})", operator, right),
            Expression::Infix {
                operator,
                left,
                right,
                ..
            } => write!(f, "({} {} {})", left, operator, right),
            Expression::If {
                condition,
                consequence,
                alternative,
                ..
            } => {
                write!(f, "if ({}) {}", condition, consequence)?;
                if let Some(alt) = alternative {
                    write!(f, " else {}", alt)?;
                }
                Ok(())
            }
            Expression::For {
                condition, body, ..
            } => write!(f, "for ({}) {}", condition, body),
            Expression::Function { params, body, .. } => {
                write!(f, "fn(")?;
                write_list(f, params)?;
                write!(f, ") {}", body)
            }
            Expression::Call {
                function,
                arguments,
                ..
            } => {
                write!(f, "{}(", function)?;
                write_list(f, arguments)?;
                write!(f, ")")
            }
            Expression::Index { left, index, .. } => write!(f, "({}[{}])", left, index),
        }
    }
}

/// `{ stmt stmt ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct BlockStatement {
    pub token: Token,
    pub statements: Vec<Statement>,
}

impl fmt::Display for BlockStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{ ")?;
        write_statements(f, &self.statements)?;
        if !self.statements.is_empty() {
            write!(f, " ")?;
        }
        write!(f, "}}")
    }
}

/// Space-separated statements. An expression statement followed by another
/// statement keeps its `;`, otherwise a next statement starting with `(`,
/// `[` or `-` would parse as a call, index or infix on it.
pub(crate) fn write_statements(f: &mut fmt::Formatter<'_>, statements: &[Statement]) -> fmt::Result {
    for (i, stmt) in statements.iter().enumerate() {
        if i > 0 {
            write!(f, " ")?;
        }
        write!(f, "{}", stmt)?;
        if matches!(stmt, Statement::Expression { .. }) && i + 1 < statements.len() {
            write!(f, ";")?;
        }
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `let name = value;`
    Let {
        token: Token,
        name: Identifier,
        value: Expression,
    },

    /// `return value;` / `return;`
    Return {
        token: Token,
        value: Option<Expression>,
    },

    /// A bare expression, optionally followed by `;`.
    Expression { token: Token, expression: Expression },

    Block(BlockStatement),
}

impl Statement {
    pub fn token_literal(&self) -> &str {
        match self {
            Statement::Let { token, .. }
            | Statement::Return { token, .. }
            | Statement::Expression { token, .. } => &token.literal,
            Statement::Block(block) => &block.token.literal,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Statement::Let { .. } => "let statement",
            Statement::Return { .. } => "return statement",
            Statement::Expression { .. } => "expression statement",
            Statement::Block(_) => "block statement",
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Let { name, value, .. } => write!(f, "let {} = {};", name, value),
            Statement::Return { value: Some(v), .. } => write!(f, "return {};", v),
            Statement::Return { value: None, .. } => write!(f, "return;"),
            Statement::Expression { expression, .. } => write!(f, "{}", expression),
            Statement::Block(block) => write!(f, "{}", block),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::token::Span;

    fn tok(kind: TokenKind, literal: &str) -> Token {
        Token::new(kind, literal, Span::default())
    }

    fn int(n: i64) -> Expression {
        Expression::Integer {
            token: tok(TokenKind::Int, &n.to_string()),
            value: n,
        }
    }

    fn ident(name: &str) -> Identifier {
        Identifier::new(tok(TokenKind::Ident, name))
    }

    #[test]
    fn test_let_rendering() {
        let stmt = Statement::Let {
            token: tok(TokenKind::Let, "let"),
            name: ident("myVar"),
            value: Expression::Identifier(ident("anotherVar")),
        };
        assert_eq!(stmt.to_string(), "let myVar = anotherVar;");
        assert_eq!(stmt.token_literal(), "let");
    }

    #[test]
    fn test_infix_and_prefix_rendering() {
        let expr = Expression::Infix {
            token: tok(TokenKind::Plus, "+"),
            operator: InfixOperator::Add,
            left: Box::new(Expression::Prefix {
                token: tok(TokenKind::Minus, "-"),
                operator: PrefixOperator::Negate,
                right: Box::new(int(1)),
            }),
            right: Box::new(int(2)),
        };
        assert_eq!(expr.to_string(), "((-1) + 2)");
        assert_eq!(expr.token_literal(), "+");
        assert_eq!(expr.kind_name(), "infix expression");
    }

    #[test]
    fn test_block_and_function_rendering() {
        let body = BlockStatement {
            token: tok(TokenKind::LBrace, "{"),
            statements: vec![Statement::Return {
                token: tok(TokenKind::Return, "return"),
                value: Some(Expression::Identifier(ident("x"))),
            }],
        };
        let func = Expression::Function {
            token: tok(TokenKind::Function, "fn"),
            params: vec![ident("x"), ident("y")],
            body,
        };
        assert_eq!(func.to_string(), "fn(x, y) { return x; }");

        let empty = BlockStatement {
            token: tok(TokenKind::LBrace, "{"),
            statements: vec![],
        };
        assert_eq!(Statement::Block(empty).to_string(), "{ }");
    }

    #[test]
    fn test_expression_statements_keep_separator() {
        let expr_stmt = |expression: Expression| Statement::Expression {
            token: tok(TokenKind::Int, "1"),
            expression,
        };
        let negated = Expression::Prefix {
            token: tok(TokenKind::Minus, "-"),
            operator: PrefixOperator::Negate,
            right: Box::new(int(2)),
        };
        let block = BlockStatement {
            token: tok(TokenKind::LBrace, "{"),
            statements: vec![expr_stmt(int(1)), expr_stmt(negated.clone())],
        };
        assert_eq!(block.to_string(), "{ 1; (-2) }");

        let single = BlockStatement {
            token: tok(TokenKind::LBrace, "{"),
            statements: vec![expr_stmt(negated)],
        };
        assert_eq!(single.to_string(), "{ (-2) }");
    }

    #[test]
    fn test_object_rendering() {
        let obj = Expression::Object {
            token: tok(TokenKind::LObjectBrace, "{{"),
            pairs: vec![(
                Expression::String {
                    token: tok(TokenKind::String, "a"),
                    value: "a".to_string(),
                },
                int(1),
            )],
        };
        assert_eq!(obj.to_string(), "{{ \"a\": 1 }}");
    }
}
