use std::{iter::Peekable, str::CharIndices};

use crate::token::{Span, Token, TokenKind};

pub struct Lexer<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
    indent_stack: Vec<usize>,
    pending_tokens: Vec<Token<'a>>,
    at_line_start: bool,
    eof_reached: bool,
    yielded_eof: bool,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
            indent_stack: vec![0],
            pending_tokens: Vec::new(),
            at_line_start: true,
            eof_reached: false,
            yielded_eof: false,
            line: 1,
            column: 0,
        }
    }

    /// Produces the next token. Never fails: unrecognized characters come
    /// back as `Illegal` tokens and the end of input repeats as `Eof`.
    pub fn next_token(&mut self) -> Token<'a> {
        if let Some(token) = self.pending_tokens.pop() {
            return token;
        }

        if self.eof_reached {
            return Token::new(TokenKind::Eof, self.here());
        }

        if self.at_line_start {
            self.at_line_start = false;
            let indent_level = self.count_indentation();
            let current_indent = *self.indent_stack.last().unwrap_or(&0);
            let span = self.here();

            if indent_level > current_indent {
                self.indent_stack.push(indent_level);
                return Token::new(TokenKind::Indent, span);
            } else if indent_level < current_indent {
                while let Some(&top) = self.indent_stack.last() {
                    if top > indent_level {
                        self.indent_stack.pop();
                        self.pending_tokens
                            .push(Token::new(TokenKind::Dedent, span));
                    } else {
                        break;
                    }
                }
                // A width that lands between two recorded levels snaps to the
                // nearest enclosing level instead of erroring.
                if let Some(token) = self.pending_tokens.pop() {
                    return token;
                }
            }
        }

        self.skip_whitespace();

        let (start_idx, ch) = match self.chars.peek() {
            Some(&(idx, c)) => (idx, c),
            None => {
                self.eof_reached = true;
                // Close any blocks still open at end of input.
                let span = self.here();
                while self.indent_stack.len() > 1 {
                    self.indent_stack.pop();
                    self.pending_tokens
                        .push(Token::new(TokenKind::Dedent, span));
                }
                if let Some(token) = self.pending_tokens.pop() {
                    return token;
                }
                return Token::new(TokenKind::Eof, span);
            }
        };

        let start_line = self.line;
        let start_column = self.column;
        let single = |end: usize| Span {
            start: start_idx,
            end,
            line: start_line,
            column: start_column,
        };

        match ch {
            '\n' => {
                self.advance_char();
                self.at_line_start = true;
                Token::new(TokenKind::Newline, single(start_idx + 1))
            }
            '=' => {
                self.advance_char();
                Token::new(TokenKind::Assign, single(start_idx + 1))
            }
            '+' => {
                self.advance_char();
                Token::new(TokenKind::Plus, single(start_idx + 1))
            }
            '-' => {
                self.advance_char();
                if matches!(self.chars.peek(), Some(&(_, '>'))) {
                    self.advance_char();
                    Token::new(TokenKind::Arrow, single(start_idx + 2))
                } else {
                    Token::new(TokenKind::Minus, single(start_idx + 1))
                }
            }
            '*' => {
                self.advance_char();
                Token::new(TokenKind::Star, single(start_idx + 1))
            }
            '/' => {
                self.advance_char();
                Token::new(TokenKind::Slash, single(start_idx + 1))
            }
            '<' => {
                self.advance_char();
                Token::new(TokenKind::Less, single(start_idx + 1))
            }
            '>' => {
                self.advance_char();
                Token::new(TokenKind::Greater, single(start_idx + 1))
            }
            '!' => {
                self.advance_char();
                Token::new(TokenKind::Bang, single(start_idx + 1))
            }
            ':' => {
                self.advance_char();
                Token::new(TokenKind::Colon, single(start_idx + 1))
            }
            ',' => {
                self.advance_char();
                Token::new(TokenKind::Comma, single(start_idx + 1))
            }
            '.' => {
                self.advance_char();
                Token::new(TokenKind::Dot, single(start_idx + 1))
            }
            '(' => {
                self.advance_char();
                Token::new(TokenKind::LParen, single(start_idx + 1))
            }
            ')' => {
                self.advance_char();
                Token::new(TokenKind::RParen, single(start_idx + 1))
            }
            '"' => self.read_string(start_idx, start_line, start_column),
            c if c.is_alphabetic() || c == '_' => {
                self.read_identifier(start_idx, start_line, start_column)
            }
            c if c.is_ascii_digit() => self.read_number(start_idx, start_line, start_column),
            other => {
                self.advance_char();
                Token::new(TokenKind::Illegal(other), single(start_idx + other.len_utf8()))
            }
        }
    }

    fn count_indentation(&mut self) -> usize {
        // Look ahead first: a line holding only spaces contributes no
        // structure, so report the current level unchanged.
        let mut lookahead = self.chars.clone();
        loop {
            match lookahead.peek() {
                Some(&(_, ' ')) => {
                    lookahead.next();
                }
                Some(&(_, '\n')) | None => {
                    return *self.indent_stack.last().unwrap_or(&0);
                }
                Some(_) => break,
            }
        }

        let mut count = 0;
        while let Some(&(_, c)) = self.chars.peek() {
            if c == ' ' {
                self.advance_char();
                count += 1;
            } else {
                break;
            }
        }
        count
    }

    fn skip_whitespace(&mut self) {
        while let Some(&(_, c)) = self.chars.peek() {
            if c == ' ' || c == '\t' || c == '\r' {
                self.advance_char();
            } else {
                break;
            }
        }
    }

    fn read_identifier(&mut self, start: usize, line: usize, column: usize) -> Token<'a> {
        self.advance_char(); // Consume first char
        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_alphanumeric() || c == '_' {
                self.advance_char();
            } else {
                break;
            }
        }

        let end_idx = self.current_index();
        let ident = &self.input[start..end_idx];
        Token::new(
            TokenKind::lookup_ident(ident),
            Span {
                start,
                end: end_idx,
                line,
                column,
            },
        )
    }

    fn read_number(&mut self, start: usize, line: usize, column: usize) -> Token<'a> {
        self.advance_char(); // Consume first digit
        let mut has_dot = false;
        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_ascii_digit() {
                self.advance_char();
            } else if c == '.' && !has_dot {
                // A second dot ends the number; "1.2.3" lexes as FLOAT "1.2"
                // followed by ".3".
                has_dot = true;
                self.advance_char();
            } else {
                break;
            }
        }

        let end_idx = self.current_index();
        let text = &self.input[start..end_idx];
        let kind = if has_dot {
            TokenKind::Float(text)
        } else {
            TokenKind::Int(text)
        };
        Token::new(
            kind,
            Span {
                start,
                end: end_idx,
                line,
                column,
            },
        )
    }

    fn read_string(&mut self, start: usize, line: usize, column: usize) -> Token<'a> {
        self.advance_char(); // Consume opening quote
        let content_start = (start + 1).min(self.input.len());
        while let Some(&(idx, c)) = self.chars.peek() {
            if c == '"' {
                self.advance_char(); // Consume closing quote
                return Token::new(
                    TokenKind::Str(&self.input[content_start..idx]),
                    Span {
                        start,
                        end: idx + 1,
                        line,
                        column,
                    },
                );
            }
            self.advance_char();
        }
        // Unterminated string: everything to end of input, no error signaled.
        Token::new(
            TokenKind::Str(&self.input[content_start..]),
            Span {
                start,
                end: self.input.len(),
                line,
                column,
            },
        )
    }

    fn advance_char(&mut self) -> Option<(usize, char)> {
        let next = self.chars.next();
        if let Some((_, c)) = next {
            if c == '\n' {
                self.line += 1;
                self.column = 0;
            } else {
                self.column += 1;
            }
        }
        next
    }

    fn current_index(&mut self) -> usize {
        self.chars
            .peek()
            .map(|(idx, _)| *idx)
            .unwrap_or(self.input.len())
    }

    fn here(&mut self) -> Span {
        let index = self.current_index();
        Span {
            start: index,
            end: index,
            line: self.line,
            column: self.column,
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    // Ends only after yielding the Eof token, so collecting the iterator
    // produces the same stream as `tokenize` even when end-of-input drains
    // open indent levels first.
    fn next(&mut self) -> Option<Self::Item> {
        if self.yielded_eof {
            return None;
        }
        let token = self.next_token();
        if matches!(token.kind, TokenKind::Eof) {
            self.yielded_eof = true;
        }
        Some(token)
    }
}

pub fn tokenize<'a>(input: &'a str) -> Vec<Token<'a>> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token();
        let is_eof = matches!(token.kind, TokenKind::Eof);
        tokens.push(token);
        if is_eof {
            break;
        }
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn kinds<'a>(input: &'a str) -> Vec<TokenKind<'a>> {
        tokenize(input).into_iter().map(|token| token.kind).collect()
    }

    #[test]
    fn tokenizes_spell_declaration_with_block_structure() {
        let input = indoc! {r#"
            spell add(a, b):
                return a + b
            munin.print(add(2, 3))
        "#};
        let expected = vec![
            TokenKind::Spell,
            TokenKind::Identifier("add"),
            TokenKind::LParen,
            TokenKind::Identifier("a"),
            TokenKind::Comma,
            TokenKind::Identifier("b"),
            TokenKind::RParen,
            TokenKind::Colon,
            TokenKind::Newline,
            TokenKind::Indent,
            TokenKind::Return,
            TokenKind::Identifier("a"),
            TokenKind::Plus,
            TokenKind::Identifier("b"),
            TokenKind::Newline,
            TokenKind::Dedent,
            TokenKind::Identifier("munin"),
            TokenKind::Dot,
            TokenKind::Identifier("print"),
            TokenKind::LParen,
            TokenKind::Identifier("add"),
            TokenKind::LParen,
            TokenKind::Int("2"),
            TokenKind::Comma,
            TokenKind::Int("3"),
            TokenKind::RParen,
            TokenKind::RParen,
            TokenKind::Newline,
            TokenKind::Eof,
        ];
        assert_eq!(kinds(input), expected);
    }

    #[test]
    fn pairs_indents_and_dedents_across_nested_blocks() {
        let input = "spellbook A:\n    spell f():\n        return\nx = 1\n";
        let tokens = kinds(input);
        let indents = tokens
            .iter()
            .filter(|kind| matches!(kind, TokenKind::Indent))
            .count();
        let dedents = tokens
            .iter()
            .filter(|kind| matches!(kind, TokenKind::Dedent))
            .count();
        assert_eq!(indents, 2);
        assert_eq!(dedents, 2);
    }

    #[test]
    fn drains_open_indents_at_end_of_input() {
        let input = "spell f():\n    return 1";
        let tokens = kinds(input);
        assert_eq!(
            &tokens[tokens.len() - 2..],
            &[TokenKind::Dedent, TokenKind::Eof]
        );
    }

    #[test]
    fn blank_lines_do_not_change_block_structure() {
        let input = "spell f():\n    x = 1\n\n    y = 2\n";
        let tokens = kinds(input);
        let indents = tokens
            .iter()
            .filter(|kind| matches!(kind, TokenKind::Indent))
            .count();
        let dedents = tokens
            .iter()
            .filter(|kind| matches!(kind, TokenKind::Dedent))
            .count();
        assert_eq!(indents, 1);
        assert_eq!(dedents, 1);
    }

    #[test]
    fn indentation_tokens_never_appear_mid_line() {
        let input = "x = 1 + 2\n    y = 3\n";
        let tokens = tokenize(input);
        for window in tokens.windows(2) {
            if matches!(window[1].kind, TokenKind::Indent | TokenKind::Dedent) {
                assert!(
                    matches!(window[0].kind, TokenKind::Newline | TokenKind::Indent | TokenKind::Dedent),
                    "structural token after {:?}",
                    window[0].kind
                );
            }
        }
    }

    #[test]
    fn mismatched_dedent_snaps_to_enclosing_level() {
        // Dedent to width 2 when the stack holds [0, 4]: pops to 0 and carries on.
        let input = "spell f():\n    x = 1\n  y = 2\n";
        let tokens = kinds(input);
        let dedents = tokens
            .iter()
            .filter(|kind| matches!(kind, TokenKind::Dedent))
            .count();
        assert_eq!(dedents, 1);
        assert!(tokens.contains(&TokenKind::Identifier("y")));
    }

    #[test]
    fn iterator_matches_tokenize_including_trailing_dedents() {
        // No trailing newline, so end-of-input owes a Dedent before Eof.
        let input = "spell f():\n    return 1";
        let collected: Vec<Token<'_>> = Lexer::new(input).collect();
        assert_eq!(collected, tokenize(input));
        assert!(matches!(
            collected.last().map(|token| token.kind),
            Some(TokenKind::Eof)
        ));
    }

    #[test]
    fn recognizes_arrow_with_single_lookahead() {
        assert_eq!(
            kinds("spell f() -> int:"),
            vec![
                TokenKind::Spell,
                TokenKind::Identifier("f"),
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::Arrow,
                TokenKind::Identifier("int"),
                TokenKind::Colon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn second_dot_ends_a_number() {
        assert_eq!(
            kinds("1.2.3"),
            vec![
                TokenKind::Float("1.2"),
                TokenKind::Dot,
                TokenKind::Int("3"),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn unterminated_string_scans_to_end_of_input() {
        assert_eq!(
            kinds("x = \"oops"),
            vec![
                TokenKind::Identifier("x"),
                TokenKind::Assign,
                TokenKind::Str("oops"),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn unrecognized_characters_become_illegal_tokens() {
        assert_eq!(
            kinds("x = @"),
            vec![
                TokenKind::Identifier("x"),
                TokenKind::Assign,
                TokenKind::Illegal('@'),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn classifies_keywords_and_reserved_words() {
        assert_eq!(
            kinds("spellbook spell begin shared for in return if while"),
            vec![
                TokenKind::Spellbook,
                TokenKind::Spell,
                TokenKind::Begin,
                TokenKind::Shared,
                TokenKind::For,
                TokenKind::In,
                TokenKind::Return,
                TokenKind::If,
                TokenKind::While,
                TokenKind::Eof,
            ]
        );
    }
}
