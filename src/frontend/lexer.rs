use crate::frontend::token::{Span, Token, TokenKind};

/// On-demand tokenizer.
///
/// `next_token` classifies one token per call and keeps returning `Eof` once
/// the input is exhausted. Lexical problems never abort: unknown characters
/// become `Illegal` tokens and an unterminated string keeps the rest of the
/// input as its literal.
pub struct Lexer {
    source: Vec<char>,
    pos: usize,
    line: usize,
    col: usize,
    finished: bool,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Lexer {
            source: source.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
            finished: false,
        }
    }

    fn current(&self) -> Option<char> {
        self.source.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.current();
        if ch == Some('\n') {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        self.pos += 1;
        ch
    }

    fn span(&self) -> Span {
        Span {
            line: self.line,
            col: self.col,
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current() {
            if ch == ' ' || ch == '\t' || ch == '\n' || ch == '\r' {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Skips whitespace and any number of `# ... #` comments.
    fn skip_trivia(&mut self) {
        loop {
            self.skip_whitespace();
            if self.current() != Some('#') {
                return;
            }
            self.advance(); // opening '#'
            while let Some(ch) = self.advance() {
                if ch == '#' {
                    break;
                }
            }
        }
    }

    fn read_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let mut out = String::new();
        while let Some(ch) = self.current() {
            if !pred(ch) {
                break;
            }
            out.push(ch);
            self.advance();
        }
        out
    }

    fn read_string(&mut self) -> String {
        self.advance(); // opening quote

        let mut string = String::new();
        while let Some(ch) = self.advance() {
            if ch == '"' {
                break;
            }
            string.push(ch);
        }
        string
    }

    /// Emits `double` if the next character is `second`, else `single`.
    fn one_or_two(&mut self, second: char, double: TokenKind, single: TokenKind) -> Token {
        let span = self.span();
        let first = self.advance().unwrap_or_default();
        if self.current() == Some(second) {
            self.advance();
            Token::new(double, format!("{}{}", first, second), span)
        } else {
            Token::new(single, first.to_string(), span)
        }
    }

    fn single(&mut self, kind: TokenKind) -> Token {
        let span = self.span();
        let ch = self.advance().unwrap_or_default();
        Token::new(kind, ch.to_string(), span)
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_trivia();
        let span = self.span();

        let Some(ch) = self.current() else {
            return Token::new(TokenKind::Eof, "", span);
        };

        match ch {
            '=' => self.one_or_two('=', TokenKind::Eq, TokenKind::Assign),
            '!' => self.one_or_two('=', TokenKind::NotEq, TokenKind::Bang),
            '+' => self.one_or_two('+', TokenKind::Increment, TokenKind::Plus),
            '-' => self.one_or_two('-', TokenKind::Decrement, TokenKind::Minus),
            '{' => self.one_or_two('{', TokenKind::LObjectBrace, TokenKind::LBrace),
            '}' => self.one_or_two('}', TokenKind::RObjectBrace, TokenKind::RBrace),
            '*' => self.single(TokenKind::Asterisk),
            '/' => self.single(TokenKind::Slash),
            '<' => self.single(TokenKind::Lt),
            '>' => self.single(TokenKind::Gt),
            ',' => self.single(TokenKind::Comma),
            ';' => self.single(TokenKind::Semicolon),
            ':' => self.single(TokenKind::Colon),
            '(' => self.single(TokenKind::LParen),
            ')' => self.single(TokenKind::RParen),
            '[' => self.single(TokenKind::LBracket),
            ']' => self.single(TokenKind::RBracket),
            '"' => {
                let literal = self.read_string();
                Token::new(TokenKind::String, literal, span)
            }
            c if c.is_ascii_alphabetic() => {
                let ident = self.read_while(|c| c.is_ascii_alphabetic());
                Token::new(TokenKind::lookup_ident(&ident), ident, span)
            }
            c if c.is_ascii_digit() => {
                let digits = self.read_while(|c| c.is_ascii_digit());
                Token::new(TokenKind::Int, digits, span)
            }
            _ => self.single(TokenKind::Illegal),
        }
    }

    /// Collects every token up to and including `Eof`.
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let done = token.is(TokenKind::Eof);
            tokens.push(token);
            if done {
                break;
            }
        }
        tokens
    }
}

impl Iterator for Lexer {
    type Item = Token;

    /// Yields tokens until `Eof`, which is not itself yielded.
    fn next(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }
        let token = self.next_token();
        if token.is(TokenKind::Eof) {
            self.finished = true;
            return None;
        }
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tokens(source: &str) -> Vec<(TokenKind, String)> {
        Lexer::new(source)
            .tokenize()
            .into_iter()
            .map(|t| (t.kind, t.literal))
            .collect()
    }

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source).map(|t| t.kind).collect()
    }

    fn tok(kind: TokenKind, literal: &str) -> (TokenKind, String) {
        (kind, literal.to_string())
    }

    #[test]
    fn test_let_statement() {
        use TokenKind::*;
        assert_eq!(
            tokens("let five = 5;"),
            vec![
                tok(Let, "let"),
                tok(Ident, "five"),
                tok(Assign, "="),
                tok(Int, "5"),
                tok(Semicolon, ";"),
                tok(Eof, ""),
            ]
        );
    }

    #[test]
    fn test_function_definition_and_call() {
        use TokenKind::*;
        let src = "let add = fn(x, y) {\n  x + y;\n};\nlet result = add(five, ten);";
        assert_eq!(
            kinds(src),
            vec![
                Let, Ident, Assign, Function, LParen, Ident, Comma, Ident, RParen, LBrace, Ident,
                Plus, Ident, Semicolon, RBrace, Semicolon, Let, Ident, Assign, Ident, LParen,
                Ident, Comma, Ident, RParen, Semicolon,
            ]
        );
    }

    #[test]
    fn test_operators() {
        use TokenKind::*;
        assert_eq!(
            tokens("!-/*5; 5 < 10 > 5==5!=67;"),
            vec![
                tok(Bang, "!"),
                tok(Minus, "-"),
                tok(Slash, "/"),
                tok(Asterisk, "*"),
                tok(Int, "5"),
                tok(Semicolon, ";"),
                tok(Int, "5"),
                tok(Lt, "<"),
                tok(Int, "10"),
                tok(Gt, ">"),
                tok(Int, "5"),
                tok(Eq, "=="),
                tok(Int, "5"),
                tok(NotEq, "!="),
                tok(Int, "67"),
                tok(Semicolon, ";"),
                tok(Eof, ""),
            ]
        );
    }

    #[test]
    fn test_two_character_tokens() {
        use TokenKind::*;
        assert_eq!(
            tokens("++ -- {{ }} + - { }"),
            vec![
                tok(Increment, "++"),
                tok(Decrement, "--"),
                tok(LObjectBrace, "{{"),
                tok(RObjectBrace, "}}"),
                tok(Plus, "+"),
                tok(Minus, "-"),
                tok(LBrace, "{"),
                tok(RBrace, "}"),
                tok(Eof, ""),
            ]
        );
    }

    #[test]
    fn test_strings_and_collections() {
        use TokenKind::*;
        assert_eq!(
            tokens(r#""foobar" "foo bar" [1,] {{"a": 1}}"#),
            vec![
                tok(String, "foobar"),
                tok(String, "foo bar"),
                tok(LBracket, "["),
                tok(Int, "1"),
                tok(Comma, ","),
                tok(RBracket, "]"),
                tok(LObjectBrace, "{{"),
                tok(String, "a"),
                tok(Colon, ":"),
                tok(Int, "1"),
                tok(RObjectBrace, "}}"),
                tok(Eof, ""),
            ]
        );
    }

    #[test]
    fn test_no_escape_processing() {
        assert_eq!(
            tokens(r#""a\nb""#)[0],
            tok(TokenKind::String, r"a\nb")
        );
    }

    #[test]
    fn test_unterminated_string_keeps_rest_of_input() {
        assert_eq!(
            tokens("\"hello world"),
            vec![tok(TokenKind::String, "hello world"), tok(TokenKind::Eof, "")]
        );
    }

    #[test]
    fn test_keywords_vs_identifiers() {
        use TokenKind::*;
        assert_eq!(
            kinds("let fn true false if else for return lets iff"),
            vec![Let, Function, True, False, If, Else, For, Return, Ident, Ident]
        );
    }

    #[test]
    fn test_identifiers_are_letters_only() {
        use TokenKind::*;
        assert_eq!(
            tokens("foo_bar x1"),
            vec![
                tok(Ident, "foo"),
                tok(Illegal, "_"),
                tok(Ident, "bar"),
                tok(Ident, "x"),
                tok(Int, "1"),
                tok(Eof, ""),
            ]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        use TokenKind::*;
        assert_eq!(
            kinds("# a comment # 1 #another# # third #\n+ 2"),
            vec![Int, Plus, Int]
        );
    }

    #[test]
    fn test_unterminated_comment_runs_to_end() {
        assert_eq!(tokens("1 # never closed 2"), vec![
            tok(TokenKind::Int, "1"),
            tok(TokenKind::Eof, ""),
        ]);
    }

    #[test]
    fn test_illegal_characters() {
        use TokenKind::*;
        assert_eq!(
            tokens("@ $"),
            vec![tok(Illegal, "@"), tok(Illegal, "$"), tok(Eof, "")]
        );
    }

    #[test]
    fn test_eof_is_sticky() {
        let mut lexer = Lexer::new("x");
        assert_eq!(lexer.next_token().kind, TokenKind::Ident);
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
    }

    #[test]
    fn test_spans() {
        let toks = Lexer::new("let x = 10;\n  x + \"s\"").tokenize();

        macro_rules! at {
            ($i:expr, $kind:expr, $line:expr, $col:expr) => {{
                assert_eq!(toks[$i].kind, $kind, "kind mismatch at index {}", $i);
                assert_eq!(toks[$i].span.line, $line, "line mismatch at index {}", $i);
                assert_eq!(toks[$i].span.col, $col, "col mismatch at index {}", $i);
            }};
        }

        at!(0, TokenKind::Let, 1, 1);
        at!(1, TokenKind::Ident, 1, 5);
        at!(2, TokenKind::Assign, 1, 7);
        at!(3, TokenKind::Int, 1, 9);
        at!(4, TokenKind::Semicolon, 1, 11);
        at!(5, TokenKind::Ident, 2, 3);
        at!(6, TokenKind::Plus, 2, 5);
        at!(7, TokenKind::String, 2, 7);
        at!(8, TokenKind::Eof, 2, 10);
    }
}
