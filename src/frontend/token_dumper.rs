use std::fmt::Write;

use crate::frontend::token::{Token, TokenKind};

/// Prints a token stream one token per line, for `ape --tokens`.
pub struct TokenDumper {
    pub color: bool,
    pub show_debug_repr: bool, // if false, prints just the literal for most tokens
}

impl Default for TokenDumper {
    fn default() -> Self {
        Self {
            color: true,
            show_debug_repr: true,
        }
    }
}

impl TokenDumper {
    // ANSI colors
    const RESET: &'static str = "\x1b[0m";
    const DIM: &'static str = "\x1b[2m";
    const GRN: &'static str = "\x1b[32m";
    const YEL: &'static str = "\x1b[33m";
    const CYN: &'static str = "\x1b[36m";
    const MAG: &'static str = "\x1b[35m";
    const RED: &'static str = "\x1b[31m";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn no_color(mut self) -> Self {
        self.color = false;
        self
    }

    pub fn pretty(mut self) -> Self {
        self.show_debug_repr = false;
        self
    }

    pub fn dump(&self, tokens: &[Token]) {
        print!("{}", self.render(tokens));
    }

    pub fn render(&self, tokens: &[Token]) -> String {
        let mut out = String::new();
        for t in tokens {
            self.render_one(&mut out, t);
        }
        out
    }

    fn render_one(&self, out: &mut String, t: &Token) {
        let line = t.span.line;
        let col = t.span.col;

        let group = self.group(t.kind);
        let colr = if self.color { self.color(t.kind) } else { "" };
        let reset = if self.color { Self::RESET } else { "" };

        // Writing into a String cannot fail.
        let _ = if self.show_debug_repr {
            writeln!(out, "[{:02}:{:02}] {}{:<8} {}{}", line, col, colr, group, t, reset)
        } else {
            match t.kind {
                TokenKind::Eof => writeln!(out, "[{:02}:{:02}] {}{:<8} EOF{}", line, col, colr, group, reset),
                TokenKind::String => writeln!(
                    out,
                    "[{:02}:{:02}] {}{:<8} {:?}{}",
                    line, col, colr, group, t.literal, reset
                ),
                _ => writeln!(
                    out,
                    "[{:02}:{:02}] {}{:<8} {}{}",
                    line, col, colr, group, t.literal, reset
                ),
            }
        };
    }

    fn group(&self, kind: TokenKind) -> &'static str {
        use TokenKind::*;
        match kind {
            Eof => "EOF",
            Illegal => "ILLEGAL",

            // literals
            Int => "INT",
            String => "STRING",
            True | False => "BOOL",

            // names
            Ident => "IDENT",

            // structure
            LParen | RParen => "PAREN",
            LBracket | RBracket => "BRACKET",
            LBrace | RBrace => "BRACE",
            LObjectBrace | RObjectBrace => "OBJECT",
            Comma | Semicolon | Colon => "PUNCT",

            // ops / comparisons
            Plus | Minus | Asterisk | Slash | Bang | Assign | Increment | Decrement => "OP",
            Eq | NotEq | Lt | Gt => "CMP",

            k if k.is_keyword() => "KEYWORD",
            _ => "OTHER",
        }
    }

    fn color(&self, kind: TokenKind) -> &'static str {
        use TokenKind::*;
        match kind {
            Eof => Self::DIM,
            Illegal => Self::RED,
            String => Self::GRN,
            Int | True | False => Self::CYN,
            Ident => Self::YEL,
            Plus | Minus | Asterisk | Slash | Bang | Assign | Increment | Decrement => Self::MAG,
            Eq | NotEq | Lt | Gt => Self::MAG,
            _ => Self::RESET,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::lexer::Lexer;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plain_dump() {
        let tokens = Lexer::new("let x = \"hi\";").tokenize();
        let out = TokenDumper::new().no_color().render(&tokens);
        assert_eq!(
            out,
            concat!(
                "[01:01] KEYWORD  LET(\"let\")\n",
                "[01:05] IDENT    IDENTIFIER(\"x\")\n",
                "[01:07] OP       ASSIGN(\"=\")\n",
                "[01:09] STRING   STRING(\"hi\")\n",
                "[01:13] PUNCT    SEMICOLON(\";\")\n",
                "[01:14] EOF      EOF(\"\")\n",
            )
        );
    }

    #[test]
    fn test_pretty_dump() {
        let tokens = Lexer::new("1 < \"a\"").tokenize();
        let out = TokenDumper::new().no_color().pretty().render(&tokens);
        assert_eq!(
            out,
            concat!(
                "[01:01] INT      1\n",
                "[01:03] CMP      <\n",
                "[01:05] STRING   \"a\"\n",
                "[01:08] EOF      EOF\n",
            )
        );
    }

    #[test]
    fn test_color_wraps_each_line() {
        let tokens = Lexer::new("x").tokenize();
        let out = TokenDumper::new().render(&tokens);
        assert!(out.starts_with("[01:01] \x1b[33mIDENT"));
        assert!(out.lines().all(|l| l.ends_with("\x1b[0m")));
    }
}
