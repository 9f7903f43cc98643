/// Token classification for the ape language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Keywords
    Let,
    Function,
    True,
    False,
    If,
    Else,
    For,
    Return,

    // Operators
    Plus,
    Minus,
    Slash,
    Asterisk,
    Lt,
    Gt,
    Bang,
    Assign,
    Eq,
    NotEq,
    Increment,
    Decrement,

    // Delimiters
    Comma,
    Semicolon,
    Colon,
    LParen,       // (
    RParen,       // )
    LBrace,       // {
    RBrace,       // }
    LObjectBrace, // {{
    RObjectBrace, // }}
    LBracket,     // [
    RBracket,     // ]

    // Literals
    Ident,
    Int,
    String,

    // Special
    Illegal,
    Eof,
}

impl TokenKind {
    /// Upper-case name used in diagnostics and token dumps.
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Let => "LET",
            TokenKind::Function => "FUNCTION",
            TokenKind::True => "TRUE",
            TokenKind::False => "FALSE",
            TokenKind::If => "IF",
            TokenKind::Else => "ELSE",
            TokenKind::For => "FOR",
            TokenKind::Return => "RETURN",
            TokenKind::Plus => "PLUS",
            TokenKind::Minus => "MINUS",
            TokenKind::Slash => "SLASH",
            TokenKind::Asterisk => "ASTERISK",
            TokenKind::Lt => "LT",
            TokenKind::Gt => "GT",
            TokenKind::Bang => "BANG",
            TokenKind::Assign => "ASSIGN",
            TokenKind::Eq => "EQ",
            TokenKind::NotEq => "NOT_EQ",
            TokenKind::Increment => "INCREMENT",
            TokenKind::Decrement => "DECREMENT",
            TokenKind::Comma => "COMMA",
            TokenKind::Semicolon => "SEMICOLON",
            TokenKind::Colon => "COLON",
            TokenKind::LParen => "LPAREN",
            TokenKind::RParen => "RPAREN",
            TokenKind::LBrace => "LBRACE",
            TokenKind::RBrace => "RBRACE",
            TokenKind::LObjectBrace => "LOBJECT_BRACE",
            TokenKind::RObjectBrace => "ROBJECT_BRACE",
            TokenKind::LBracket => "LBRACKET",
            TokenKind::RBracket => "RBRACKET",
            TokenKind::Ident => "IDENTIFIER",
            TokenKind::Int => "INTEGER",
            TokenKind::String => "STRING",
            TokenKind::Illegal => "ILLEGAL",
            TokenKind::Eof => "EOF",
        }
    }

    /// Maps an identifier to its keyword kind, or `Ident` if it is not one.
    pub fn lookup_ident(ident: &str) -> TokenKind {
        match ident {
            "let" => TokenKind::Let,
            "fn" => TokenKind::Function,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "for" => TokenKind::For,
            "return" => TokenKind::Return,
            _ => TokenKind::Ident,
        }
    }

    pub fn is_keyword(self) -> bool {
        matches!(
            self,
            TokenKind::Let
                | TokenKind::Function
                | TokenKind::True
                | TokenKind::False
                | TokenKind::If
                | TokenKind::Else
                | TokenKind::For
                | TokenKind::Return
        )
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 1-based source position of a token's first character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub line: usize,
    pub col: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, literal: impl Into<String>, span: Span) -> Self {
        Token {
            kind,
            literal: literal.into(),
            span,
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({:?})", self.kind, self.literal)
    }
}
