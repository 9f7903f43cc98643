use crate::frontend::lexer::Lexer;
use crate::frontend::parser_error::ParserError;
use crate::frontend::token::{Span, Token, TokenKind};
use crate::lang::node::{BlockStatement, Expression, Identifier, InfixOperator, PrefixOperator, Statement};
use crate::lang::program::Program;

/// Binding power of an operator token, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Lowest,
    Equals,      // == !=
    LessGreater, // < >
    Sum,         // + -
    Product,     // * /
    Prefix,      // -x !x
    Call,        // f(x)
    Index,       // a[i]
}

impl Precedence {
    pub fn of(kind: TokenKind) -> Precedence {
        match kind {
            TokenKind::Eq | TokenKind::NotEq => Precedence::Equals,
            TokenKind::Lt | TokenKind::Gt => Precedence::LessGreater,
            TokenKind::Plus | TokenKind::Minus => Precedence::Sum,
            TokenKind::Asterisk | TokenKind::Slash => Precedence::Product,
            TokenKind::LParen => Precedence::Call,
            TokenKind::LBracket => Precedence::Index,
            _ => Precedence::Lowest,
        }
    }
}

type PrefixRule = fn(&mut Parser) -> Option<Expression>;
type InfixRule = fn(&mut Parser, Expression) -> Option<Expression>;

/// Pratt parser for ape.
///
/// The parser pulls tokens from the lexer on demand, keeping one token of
/// lookahead (`peek`). Syntax errors never abort the parse: each one is
/// recorded in `errors` and the offending production yields `None`, so a
/// node whose required child failed is never built.
///
/// Invariant shared by every `parse_*` method: it is entered with `current`
/// on the first token of its construct and leaves `current` on the last
/// token it consumed.
pub struct Parser {
    lexer: Lexer,
    current: Token,
    peek: Token,
    errors: Vec<ParserError>,
}

impl Parser {
    /// Creates a parser and primes `current` and `peek`.
    pub fn new(mut lexer: Lexer) -> Self {
        let current = lexer.next_token();
        let peek = lexer.next_token();
        Parser {
            lexer,
            current,
            peek,
            errors: Vec::new(),
        }
    }

    /// Diagnostics recorded so far, in source order.
    pub fn errors(&self) -> &[ParserError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<ParserError> {
        self.errors
    }

    fn next_token(&mut self) {
        let next = self.lexer.next_token();
        self.current = std::mem::replace(&mut self.peek, next);
    }

    fn error(&mut self, message: String, span: Span) {
        self.errors.push(ParserError::new(message, span));
    }

    /// Advances if the peek token has the expected kind, otherwise records
    /// `expected next token to be ...` at the peek token.
    fn expect_peek(&mut self, kind: TokenKind) -> Option<()> {
        if self.peek.is(kind) {
            self.next_token();
            Some(())
        } else {
            self.error(
                format!("expected next token to be {}, got {} instead", kind, self.peek.kind),
                self.peek.span,
            );
            None
        }
    }

    fn peek_precedence(&self) -> Precedence {
        Precedence::of(self.peek.kind)
    }

    fn current_precedence(&self) -> Precedence {
        Precedence::of(self.current.kind)
    }

    /// Parses statements until end of input.
    ///
    /// Every iteration moves past at least one token, so malformed input
    /// cannot stall the loop.
    pub fn parse_program(&mut self) -> Program {
        let mut program = Program::default();

        while !self.current.is(TokenKind::Eof) {
            if let Some(stmt) = self.parse_statement() {
                program.statements.push(stmt);
            }
            self.next_token();
        }

        program
    }

    fn parse_statement(&mut self) -> Option<Statement> {
        match self.current.kind {
            TokenKind::Let => self.parse_let_statement(),
            TokenKind::Return => self.parse_return_statement(),
            TokenKind::LBrace => Some(Statement::Block(self.parse_block_statement())),
            _ => self.parse_expression_statement(),
        }
    }

    /// ```text
    /// let <ident> = <expr> [;]
    /// ```
    fn parse_let_statement(&mut self) -> Option<Statement> {
        let token = self.current.clone();

        self.expect_peek(TokenKind::Ident)?;
        let name = Identifier::new(self.current.clone());

        self.expect_peek(TokenKind::Assign)?;
        self.next_token();

        let value = self.parse_expression(Precedence::Lowest)?;
        self.skip_semicolons();

        Some(Statement::Let { token, name, value })
    }

    /// ```text
    /// return [<expr>] [;]
    /// ```
    ///
    /// The value is absent when `return` is directly followed by `;`, `}`
    /// or end of input.
    fn parse_return_statement(&mut self) -> Option<Statement> {
        let token = self.current.clone();

        let value = match self.peek.kind {
            TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Eof => None,
            _ => {
                self.next_token();
                Some(self.parse_expression(Precedence::Lowest)?)
            }
        };
        self.skip_semicolons();

        Some(Statement::Return { token, value })
    }

    fn parse_expression_statement(&mut self) -> Option<Statement> {
        let token = self.current.clone();
        let expression = self.parse_expression(Precedence::Lowest)?;

        if self.peek.is(TokenKind::Semicolon) {
            self.next_token();
        }

        Some(Statement::Expression { token, expression })
    }

    fn skip_semicolons(&mut self) {
        while self.peek.is(TokenKind::Semicolon) {
            self.next_token();
        }
    }

    /// Parses `{ <stmt>* }`, stopping at the closing brace or end of input.
    /// Leaves `current` on the `}` (or `Eof`).
    fn parse_block_statement(&mut self) -> BlockStatement {
        let token = self.current.clone();
        let mut statements = Vec::new();

        self.next_token();
        while !self.current.is(TokenKind::RBrace) && !self.current.is(TokenKind::Eof) {
            if let Some(stmt) = self.parse_statement() {
                statements.push(stmt);
            }
            self.next_token();
        }

        BlockStatement { token, statements }
    }

    /// Core Pratt loop: a prefix rule for the current token, then infix rules
    /// for as long as the next operator binds tighter than `precedence`.
    fn parse_expression(&mut self, precedence: Precedence) -> Option<Expression> {
        let Some(prefix) = prefix_rule(self.current.kind) else {
            self.error(
                format!("no prefix parse function for {} found", self.current.kind),
                self.current.span,
            );
            return None;
        };
        let mut left = prefix(self)?;

        while !self.peek.is(TokenKind::Semicolon) && precedence < self.peek_precedence() {
            let Some(infix) = infix_rule(self.peek.kind) else {
                return Some(left);
            };
            self.next_token();
            left = infix(self, left)?;
        }

        Some(left)
    }

    fn parse_identifier(&mut self) -> Option<Expression> {
        Some(Expression::Identifier(Identifier::new(self.current.clone())))
    }

    fn parse_integer_literal(&mut self) -> Option<Expression> {
        let token = self.current.clone();
        match token.literal.parse::<i64>() {
            Ok(value) => Some(Expression::Integer { token, value }),
            Err(_) => {
                self.error(format!("could not parse {} as integer", token.literal), token.span);
                None
            }
        }
    }

    fn parse_string_literal(&mut self) -> Option<Expression> {
        let token = self.current.clone();
        let value = token.literal.clone();
        Some(Expression::String { token, value })
    }

    fn parse_boolean(&mut self) -> Option<Expression> {
        let token = self.current.clone();
        let value = token.is(TokenKind::True);
        Some(Expression::Boolean { token, value })
    }

    fn parse_prefix_expression(&mut self) -> Option<Expression> {
        let token = self.current.clone();
        let operator = PrefixOperator::from_token(token.kind)?;

        self.next_token();
        let right = self.parse_expression(Precedence::Prefix)?;

        Some(Expression::Prefix {
            token,
            operator,
            right: Box::new(right),
        })
    }

    fn parse_infix_expression(&mut self, left: Expression) -> Option<Expression> {
        let token = self.current.clone();
        let operator = InfixOperator::from_token(token.kind)?;
        let precedence = self.current_precedence();

        self.next_token();
        let right = self.parse_expression(precedence)?;

        Some(Expression::Infix {
            token,
            operator,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn parse_grouped_expression(&mut self) -> Option<Expression> {
        self.next_token();
        let expr = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::RParen)?;
        Some(expr)
    }

    /// Shared head of `if` and `for`: `( <cond> ) {`, leaving `current` on
    /// the opening brace.
    fn parse_condition(&mut self) -> Option<Expression> {
        self.expect_peek(TokenKind::LParen)?;
        self.next_token();
        let condition = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::RParen)?;
        self.expect_peek(TokenKind::LBrace)?;
        Some(condition)
    }

    /// ```text
    /// if ( <cond> ) { ... } [else { ... }]
    /// ```
    fn parse_if_expression(&mut self) -> Option<Expression> {
        let token = self.current.clone();
        let condition = self.parse_condition()?;
        let consequence = self.parse_block_statement();

        let alternative = if self.peek.is(TokenKind::Else) {
            self.next_token();
            self.expect_peek(TokenKind::LBrace)?;
            Some(self.parse_block_statement())
        } else {
            None
        };

        Some(Expression::If {
            token,
            condition: Box::new(condition),
            consequence,
            alternative,
        })
    }

    /// ```text
    /// for ( <cond> ) { ... }
    /// ```
    fn parse_for_expression(&mut self) -> Option<Expression> {
        let token = self.current.clone();
        let condition = self.parse_condition()?;
        let body = self.parse_block_statement();

        Some(Expression::For {
            token,
            condition: Box::new(condition),
            body,
        })
    }

    /// ```text
    /// fn ( <ident>, ... ) { ... }
    /// ```
    fn parse_function_literal(&mut self) -> Option<Expression> {
        let token = self.current.clone();

        self.expect_peek(TokenKind::LParen)?;
        let params = self.parse_function_parameters()?;
        self.expect_peek(TokenKind::LBrace)?;
        let body = self.parse_block_statement();

        Some(Expression::Function {
            token,
            params,
            body,
        })
    }

    /// Entered on `(`, leaves `current` on `)`.
    fn parse_function_parameters(&mut self) -> Option<Vec<Identifier>> {
        let mut params = Vec::new();

        if self.peek.is(TokenKind::RParen) {
            self.next_token();
            return Some(params);
        }

        self.expect_peek(TokenKind::Ident)?;
        params.push(Identifier::new(self.current.clone()));

        while self.peek.is(TokenKind::Comma) {
            self.next_token();
            self.expect_peek(TokenKind::Ident)?;
            params.push(Identifier::new(self.current.clone()));
        }

        self.expect_peek(TokenKind::RParen)?;
        Some(params)
    }

    fn parse_call_expression(&mut self, function: Expression) -> Option<Expression> {
        let token = self.current.clone();
        let arguments = self.parse_expression_list(TokenKind::RParen)?;

        Some(Expression::Call {
            token,
            function: Box::new(function),
            arguments,
        })
    }

    /// Comma-separated expressions up to `end`. Entered on the opening
    /// delimiter, leaves `current` on `end`.
    fn parse_expression_list(&mut self, end: TokenKind) -> Option<Vec<Expression>> {
        let mut items = Vec::new();

        if self.peek.is(end) {
            self.next_token();
            return Some(items);
        }

        self.next_token();
        items.push(self.parse_expression(Precedence::Lowest)?);

        while self.peek.is(TokenKind::Comma) {
            self.next_token();
            self.next_token();
            items.push(self.parse_expression(Precedence::Lowest)?);
        }

        self.expect_peek(end)?;
        Some(items)
    }

    fn parse_index_expression(&mut self, left: Expression) -> Option<Expression> {
        let token = self.current.clone();

        self.next_token();
        let index = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::RBracket)?;

        Some(Expression::Index {
            token,
            left: Box::new(left),
            index: Box::new(index),
        })
    }

    /// ```text
    /// [ <expr>, <expr>, ... [,] ]
    /// ```
    ///
    /// A malformed element list records a diagnostic and returns the
    /// elements collected so far.
    fn parse_array_literal(&mut self) -> Option<Expression> {
        let token = self.current.clone();
        let mut elements = Vec::new();

        self.next_token();
        while !self.current.is(TokenKind::RBracket) {
            if self.current.is(TokenKind::Eof) {
                self.unterminated(TokenKind::RBracket);
                break;
            }

            let Some(element) = self.parse_expression(Precedence::Lowest) else {
                break;
            };
            elements.push(element);

            match self.peek.kind {
                TokenKind::Comma => {
                    self.next_token();
                    self.next_token();
                }
                TokenKind::RBracket => {
                    self.next_token();
                    break;
                }
                other => {
                    self.error(format!("no comma after element in array, got {}", other), self.peek.span);
                    break;
                }
            }
        }

        Some(Expression::Array { token, elements })
    }

    /// ```text
    /// {{ <expr> : <expr>, ... [,] }}
    /// ```
    ///
    /// Like arrays, a malformed pair list records a diagnostic and returns
    /// the pairs collected so far.
    fn parse_object_literal(&mut self) -> Option<Expression> {
        let token = self.current.clone();
        let mut pairs = Vec::new();

        self.next_token();
        while !self.current.is(TokenKind::RObjectBrace) {
            if self.current.is(TokenKind::Eof) {
                self.unterminated(TokenKind::RObjectBrace);
                break;
            }

            let Some(key) = self.parse_expression(Precedence::Lowest) else {
                break;
            };
            if !self.peek.is(TokenKind::Colon) {
                self.error(
                    format!("no separator found between key and value, got {}", self.peek.kind),
                    self.peek.span,
                );
                break;
            }
            self.next_token();
            self.next_token();

            let Some(value) = self.parse_expression(Precedence::Lowest) else {
                break;
            };
            pairs.push((key, value));

            match self.peek.kind {
                TokenKind::Comma => {
                    self.next_token();
                    self.next_token();
                }
                TokenKind::RObjectBrace => {
                    self.next_token();
                    break;
                }
                other => {
                    self.error(format!("no comma after element in object, got {}", other), self.peek.span);
                    break;
                }
            }
        }

        Some(Expression::Object { token, pairs })
    }

    fn unterminated(&mut self, closing: TokenKind) {
        self.error(
            format!("expected next token to be {}, got {} instead", closing, TokenKind::Eof),
            self.current.span,
        );
    }
}

fn prefix_rule(kind: TokenKind) -> Option<PrefixRule> {
    let rule: PrefixRule = match kind {
        TokenKind::Ident => Parser::parse_identifier,
        TokenKind::Int => Parser::parse_integer_literal,
        TokenKind::String => Parser::parse_string_literal,
        TokenKind::True | TokenKind::False => Parser::parse_boolean,
        TokenKind::Bang | TokenKind::Minus => Parser::parse_prefix_expression,
        TokenKind::LParen => Parser::parse_grouped_expression,
        TokenKind::If => Parser::parse_if_expression,
        TokenKind::For => Parser::parse_for_expression,
        TokenKind::Function => Parser::parse_function_literal,
        TokenKind::LBracket => Parser::parse_array_literal,
        TokenKind::LObjectBrace => Parser::parse_object_literal,
        _ => return None,
    };
    Some(rule)
}

fn infix_rule(kind: TokenKind) -> Option<InfixRule> {
    let rule: InfixRule = match kind {
        TokenKind::Plus
        | TokenKind::Minus
        | TokenKind::Asterisk
        | TokenKind::Slash
        | TokenKind::Eq
        | TokenKind::NotEq
        | TokenKind::Lt
        | TokenKind::Gt => Parser::parse_infix_expression,
        TokenKind::LParen => Parser::parse_call_expression,
        TokenKind::LBracket => Parser::parse_index_expression,
        _ => return None,
    };
    Some(rule)
}
