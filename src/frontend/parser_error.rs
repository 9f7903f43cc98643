use crate::frontend::token::Span;

/// A parsing diagnostic with source location.
///
/// `line` and `col` are 1-based positions taken from the span of the token
/// the parser was looking at when the problem was found. The parser keeps
/// going after recording one, so a single parse may produce several.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{line}:{col}: {message}")]
pub struct ParserError {
    pub message: String,
    pub line: usize,
    pub col: usize,
}

impl ParserError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        ParserError {
            message: message.into(),
            line: span.line,
            col: span.col,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_line_col_message() {
        let err = ParserError::new("no prefix parse function for RPAREN found", Span { line: 3, col: 7 });
        assert_eq!(err.to_string(), "3:7: no prefix parse function for RPAREN found");
    }
}
