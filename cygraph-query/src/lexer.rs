//! Hand-written tokenizer. Produces a finite token stream ending in `Eof`;
//! never fails outright on an unrecognized character — it emits an
//! `Unknown` token the parser turns into a recorded error, per `spec.md` §4.B.

use std::iter::Peekable;
use std::str::Chars;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Match,
    Where,
    Create,
    Set,
    Delete,
    Detach,
    Return,
    Exists,
    Not,
    And,
    Or,
    Xor,
    Is,
    Null,
    In,
    Contains,
    Starts,
    Ends,
    With,

    Boolean(bool),
    Identifier(String),
    String(String),
    Number(f64),

    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,
    OpenBrace,
    CloseBrace,
    Colon,
    Comma,
    Dot,
    Asterisk,
    Minus,
    ForwardArrow,
    BackwardArrow,
    Equals,
    NotEquals,
    Lt,
    Le,
    Gt,
    Ge,

    /// An unrecognized character or an unterminated string. Carried as a
    /// token (rather than aborting the lexer) so the parser can report it
    /// with position information and keep going.
    Unknown(String),

    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: u32,
    pub col: u32,
}

pub struct Lexer<'a> {
    source: &'a str,
    chars: Peekable<Chars<'a>>,
    line: u32,
    col: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.chars().peekable(),
            line: 1,
            col: 1,
        }
    }

    /// Rewinds the cursor to the beginning of the input.
    pub fn reset(&mut self) {
        self.chars = self.source.chars().peekable();
        self.line = 1;
        self.col = 1;
    }

    /// Tokenizes the whole input, always terminating in a single `Eof`.
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }

    /// Produces the next token, skipping whitespace and line comments.
    pub fn next(&mut self) -> Token {
        self.skip_trivia();

        let line = self.line;
        let col = self.col;

        let Some(ch) = self.advance() else {
            return Token {
                kind: TokenKind::Eof,
                text: String::new(),
                line,
                col,
            };
        };

        if ch == '\'' || ch == '"' {
            return self.read_string(ch, line, col);
        }
        if ch.is_ascii_digit() {
            return self.read_number(ch, line, col);
        }
        if ch.is_alphabetic() || ch == '_' {
            return self.read_identifier(ch, line, col);
        }

        let (kind, text) = match ch {
            '(' => (TokenKind::OpenParen, "(".to_string()),
            ')' => (TokenKind::CloseParen, ")".to_string()),
            '[' => (TokenKind::OpenBracket, "[".to_string()),
            ']' => (TokenKind::CloseBracket, "]".to_string()),
            '{' => (TokenKind::OpenBrace, "{".to_string()),
            '}' => (TokenKind::CloseBrace, "}".to_string()),
            ':' => (TokenKind::Colon, ":".to_string()),
            ',' => (TokenKind::Comma, ",".to_string()),
            '.' => (TokenKind::Dot, ".".to_string()),
            '*' => (TokenKind::Asterisk, "*".to_string()),
            '-' => {
                if self.peek() == Some('>') {
                    self.advance();
                    (TokenKind::ForwardArrow, "->".to_string())
                } else {
                    (TokenKind::Minus, "-".to_string())
                }
            }
            '<' => {
                if self.peek() == Some('-') {
                    self.advance();
                    (TokenKind::BackwardArrow, "<-".to_string())
                } else if self.peek() == Some('=') {
                    self.advance();
                    (TokenKind::Le, "<=".to_string())
                } else if self.peek() == Some('>') {
                    self.advance();
                    (TokenKind::NotEquals, "<>".to_string())
                } else {
                    (TokenKind::Lt, "<".to_string())
                }
            }
            '>' => {
                if self.peek() == Some('=') {
                    self.advance();
                    (TokenKind::Ge, ">=".to_string())
                } else {
                    (TokenKind::Gt, ">".to_string())
                }
            }
            '=' => (TokenKind::Equals, "=".to_string()),
            other => {
                let text = other.to_string();
                (TokenKind::Unknown(text.clone()), text)
            }
        };

        Token {
            kind,
            text,
            line,
            col,
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.chars.next();
        if let Some(c) = ch {
            if c == '\n' {
                self.line += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }
        }
        ch
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some('/') => {
                    let mut lookahead = self.chars.clone();
                    lookahead.next();
                    if lookahead.peek() == Some(&'/') {
                        self.advance();
                        self.advance();
                        while let Some(c) = self.peek() {
                            if c == '\n' {
                                break;
                            }
                            self.advance();
                        }
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }
    }

    fn read_string(&mut self, quote: char, line: u32, col: u32) -> Token {
        let mut value = String::new();
        let mut terminated = false;
        while let Some(c) = self.advance() {
            if c == '\\' {
                match self.peek() {
                    Some('\\') => {
                        value.push('\\');
                        self.advance();
                    }
                    Some(q) if q == quote => {
                        value.push(q);
                        self.advance();
                    }
                    _ => value.push('\\'),
                }
                continue;
            }
            if c == quote {
                terminated = true;
                break;
            }
            value.push(c);
        }
        if !terminated {
            return Token {
                kind: TokenKind::Unknown(format!("unterminated string: {value}")),
                text: value,
                line,
                col,
            };
        }
        Token {
            kind: TokenKind::String(value.clone()),
            text: value,
            line,
            col,
        }
    }

    fn read_number(&mut self, first: char, line: u32, col: u32) -> Token {
        let mut text = String::new();
        text.push(first);
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }
        if self.peek() == Some('.') {
            let mut lookahead = self.chars.clone();
            lookahead.next();
            if lookahead.peek().is_some_and(|c| c.is_ascii_digit()) {
                text.push('.');
                self.advance();
                while let Some(c) = self.peek() {
                    if c.is_ascii_digit() {
                        text.push(c);
                        self.advance();
                    } else {
                        break;
                    }
                }
            }
        }
        let value: f64 = text.parse().unwrap_or(0.0);
        Token {
            kind: TokenKind::Number(value),
            text,
            line,
            col,
        }
    }

    fn read_identifier(&mut self, first: char, line: u32, col: u32) -> Token {
        let mut text = String::new();
        text.push(first);
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }

        let kind = match text.to_uppercase().as_str() {
            "MATCH" => TokenKind::Match,
            "WHERE" => TokenKind::Where,
            "CREATE" => TokenKind::Create,
            "SET" => TokenKind::Set,
            "DELETE" => TokenKind::Delete,
            "DETACH" => TokenKind::Detach,
            "RETURN" => TokenKind::Return,
            "EXISTS" => TokenKind::Exists,
            "NOT" => TokenKind::Not,
            "AND" => TokenKind::And,
            "OR" => TokenKind::Or,
            "XOR" => TokenKind::Xor,
            "IS" => TokenKind::Is,
            "NULL" => TokenKind::Null,
            "IN" => TokenKind::In,
            "CONTAINS" => TokenKind::Contains,
            "STARTS" => TokenKind::Starts,
            "ENDS" => TokenKind::Ends,
            "WITH" => TokenKind::With,
            "TRUE" => TokenKind::Boolean(true),
            "FALSE" => TokenKind::Boolean(false),
            _ => TokenKind::Identifier(text.clone()),
        };

        Token {
            kind,
            text,
            line,
            col,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source).tokenize().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn keywords_are_case_insensitive() {
        assert_eq!(
            kinds("match MATCH Match"),
            vec![TokenKind::Match, TokenKind::Match, TokenKind::Match, TokenKind::Eof]
        );
    }

    #[test]
    fn identifiers_are_not_confused_with_keywords() {
        assert_eq!(
            kinds("matcher"),
            vec![TokenKind::Identifier("matcher".to_string()), TokenKind::Eof]
        );
    }

    #[test]
    fn arrows_and_comparisons_are_multi_char() {
        assert_eq!(
            kinds("-> <- <= >= <> ="),
            vec![
                TokenKind::ForwardArrow,
                TokenKind::BackwardArrow,
                TokenKind::Le,
                TokenKind::Ge,
                TokenKind::NotEquals,
                TokenKind::Equals,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn bare_minus_does_not_swallow_the_following_token() {
        assert_eq!(
            kinds("- 5"),
            vec![TokenKind::Minus, TokenKind::Number(5.0), TokenKind::Eof]
        );
    }

    #[test]
    fn numbers_parse_integer_and_decimal_forms() {
        assert_eq!(
            kinds("42 3.14"),
            vec![TokenKind::Number(42.0), TokenKind::Number(3.14), TokenKind::Eof]
        );
    }

    #[test]
    fn a_dot_not_followed_by_a_digit_is_not_part_of_a_number() {
        assert_eq!(
            kinds("n.age"),
            vec![
                TokenKind::Identifier("n".to_string()),
                TokenKind::Dot,
                TokenKind::Identifier("age".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn strings_support_escaped_quotes() {
        assert_eq!(
            kinds(r#""a \"b\" c""#),
            vec![TokenKind::String("a \"b\" c".to_string()), TokenKind::Eof]
        );
    }

    #[test]
    fn unterminated_string_becomes_an_unknown_token_rather_than_panicking() {
        let tokens = kinds("'open");
        assert!(matches!(tokens[0], TokenKind::Unknown(_)));
    }

    #[test]
    fn line_comments_are_skipped() {
        assert_eq!(
            kinds("MATCH // trailing comment\nRETURN"),
            vec![TokenKind::Match, TokenKind::Return, TokenKind::Eof]
        );
    }

    #[test]
    fn line_and_column_tracking_follows_newlines() {
        let tokens = Lexer::new("MATCH\nRETURN").tokenize();
        assert_eq!(tokens[0].line, 1);
        assert_eq!(tokens[1].line, 2);
        assert_eq!(tokens[1].col, 1);
    }

    #[test]
    fn unrecognized_character_becomes_unknown_not_a_lexer_failure() {
        assert_eq!(kinds("@"), vec![TokenKind::Unknown("@".to_string()), TokenKind::Eof]);
    }

    #[test]
    fn reset_rewinds_to_the_start_of_the_input() {
        let mut lexer = Lexer::new("MATCH RETURN");
        assert_eq!(lexer.next().kind, TokenKind::Match);
        lexer.reset();
        assert_eq!(lexer.next().kind, TokenKind::Match);
    }
}
