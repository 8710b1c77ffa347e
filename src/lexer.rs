use std::{iter::Peekable, str::CharIndices};

use crate::token::{Token, TokenKind};

mod error;

pub use error::{LexError, LexResult};

pub struct Lexer<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
    line: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
            line: 1,
        }
    }

    pub fn next_token(&mut self) -> LexResult<Token> {
        self.skip_trivia();

        let Some(&(start, ch)) = self.chars.peek() else {
            return Ok(Token::new(TokenKind::EOF, "", self.line));
        };

        match ch {
            '"' => self.read_string(start),
            '\'' => self.read_char(),
            c if c.is_alphabetic() || c == '_' => Ok(self.read_identifier(start)),
            c if c.is_ascii_digit() => Ok(self.read_number(start)),
            _ => self.read_symbol(start, ch),
        }
    }

    fn skip_trivia(&mut self) {
        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_whitespace() {
                self.advance_char();
            } else if c == '/' && self.peek_second() == Some('/') {
                while let Some(&(_, c)) = self.chars.peek() {
                    if c == '\n' {
                        break;
                    }
                    self.advance_char();
                }
            } else {
                break;
            }
        }
    }

    fn read_identifier(&mut self, start: usize) -> Token {
        let line = self.line;
        self.advance_char(); // Consume first char
        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_alphanumeric() || c == '_' {
                self.advance_char();
            } else {
                break;
            }
        }

        let word = &self.input[start..self.current_index()];
        let kind = TokenKind::keyword(word).unwrap_or(TokenKind::Identifier);
        Token::new(kind, word, line)
    }

    /// Reads a digit run that may contain a single `.`. Value validation is
    /// left to the parser.
    fn read_number(&mut self, start: usize) -> Token {
        let line = self.line;
        let mut seen_dot = false;
        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_ascii_digit() {
                self.advance_char();
            } else if c == '.' && !seen_dot {
                seen_dot = true;
                self.advance_char();
            } else {
                break;
            }
        }

        let kind = if seen_dot {
            TokenKind::FloatLiteral
        } else {
            TokenKind::IntegerLiteral
        };
        Token::new(kind, &self.input[start..self.current_index()], line)
    }

    fn read_char(&mut self) -> LexResult<Token> {
        let line = self.line;
        self.advance_char(); // Consume opening quote
        let Some((_, value)) = self.advance_char() else {
            return Err(LexError::UnterminatedChar { line: self.line });
        };
        if !self.eat('\'') {
            return Err(LexError::UnterminatedChar { line: self.line });
        }
        Ok(Token::new(TokenKind::CharLiteral, value.to_string(), line))
    }

    fn read_string(&mut self, start: usize) -> LexResult<Token> {
        let line = self.line;
        self.advance_char(); // Consume opening quote
        let content_start = start + 1;
        while let Some((idx, c)) = self.advance_char() {
            if c == '"' {
                return Ok(Token::new(
                    TokenKind::StringLiteral,
                    &self.input[content_start..idx],
                    line,
                ));
            }
        }
        Err(LexError::UnterminatedString { line: self.line })
    }

    fn read_symbol(&mut self, start: usize, ch: char) -> LexResult<Token> {
        let line = self.line;
        self.advance_char();

        let kind = match ch {
            '+' => self.either(
                &[('+', TokenKind::Increment), ('=', TokenKind::PlusAssign)],
                TokenKind::Plus,
            ),
            '-' => self.either(
                &[('-', TokenKind::Decrement), ('=', TokenKind::MinusAssign)],
                TokenKind::Minus,
            ),
            '*' => self.either(&[('=', TokenKind::StarAssign)], TokenKind::Star),
            '/' => self.either(&[('=', TokenKind::SlashAssign)], TokenKind::Slash),
            '%' => self.either(&[('=', TokenKind::PercentAssign)], TokenKind::Percent),
            '=' => self.either(&[('=', TokenKind::Equal)], TokenKind::Assign),
            '!' => self.either(&[('=', TokenKind::NotEqual)], TokenKind::Not),
            '<' => self.either(&[('=', TokenKind::LessEqual)], TokenKind::Less),
            '>' => self.either(&[('=', TokenKind::GreaterEqual)], TokenKind::Greater),
            '&' if self.eat('&') => TokenKind::And,
            '|' if self.eat('|') => TokenKind::Or,
            ';' => TokenKind::Semicolon,
            ',' => TokenKind::Comma,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            _ => {
                return Err(LexError::UnexpectedCharacter {
                    character: ch,
                    line,
                });
            }
        };

        Ok(Token::new(kind, &self.input[start..self.current_index()], line))
    }

    /// Longest match: picks the two-character operator whose second char is
    /// next in the input, else falls back to `single`.
    fn either(&mut self, pairs: &[(char, TokenKind)], single: TokenKind) -> TokenKind {
        for &(second, kind) in pairs {
            if self.eat(second) {
                return kind;
            }
        }
        single
    }

    fn eat(&mut self, expected: char) -> bool {
        if matches!(self.chars.peek(), Some(&(_, c)) if c == expected) {
            self.advance_char();
            true
        } else {
            false
        }
    }

    fn peek_second(&self) -> Option<char> {
        let mut lookahead = self.chars.clone();
        lookahead.next();
        lookahead.peek().map(|&(_, c)| c)
    }

    fn advance_char(&mut self) -> Option<(usize, char)> {
        let next = self.chars.next();
        if let Some((_, '\n')) = next {
            self.line += 1;
        }
        next
    }

    fn current_index(&mut self) -> usize {
        self.chars
            .peek()
            .map(|(idx, _)| *idx)
            .unwrap_or(self.input.len())
    }
}

pub fn tokenize(input: &str) -> LexResult<Vec<Token>> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let is_eof = token.is(TokenKind::EOF);
        tokens.push(token);
        if is_eof {
            break;
        }
    }
    Ok(tokens)
}
