use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenKind<'a> {
    Illegal(char),
    Eof,

    Identifier(&'a str),
    Int(&'a str),
    Float(&'a str),
    Str(&'a str),

    // Operators
    Assign,  // =
    Plus,    // +
    Minus,   // -
    Star,    // *
    Slash,   // /
    Less,    // <
    Greater, // >
    Eq,      // ==
    NotEq,   // !=
    Bang,    // !
    Arrow,   // ->

    // Delimiters
    Colon,  // :
    Comma,  // ,
    Dot,    // .
    LParen, // (
    RParen, // )

    // Structural
    Newline,
    Indent,
    Dedent,

    // Keywords
    Spellbook,
    Spell,
    Begin,
    Shared,
    For,
    In,
    Return,
    // Reserved words from the extended grammar; no parse rules exist for these.
    If,
    Elif,
    Else,
    Range,
    While,
}

impl<'a> TokenKind<'a> {
    pub fn lookup_ident(ident: &'a str) -> Self {
        match ident {
            "spellbook" => TokenKind::Spellbook,
            "spell" => TokenKind::Spell,
            "begin" => TokenKind::Begin,
            "shared" => TokenKind::Shared,
            "for" => TokenKind::For,
            "in" => TokenKind::In,
            "return" => TokenKind::Return,
            "if" => TokenKind::If,
            "elif" => TokenKind::Elif,
            "else" => TokenKind::Else,
            "range" => TokenKind::Range,
            "while" => TokenKind::While,
            _ => TokenKind::Identifier(ident),
        }
    }
}

impl fmt::Display for TokenKind<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Illegal(_) => "ILLEGAL",
            TokenKind::Eof => "EOF",
            TokenKind::Identifier(_) => "IDENT",
            TokenKind::Int(_) => "INT",
            TokenKind::Float(_) => "FLOAT",
            TokenKind::Str(_) => "STRING",
            TokenKind::Assign => "=",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Less => "<",
            TokenKind::Greater => ">",
            TokenKind::Eq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::Bang => "!",
            TokenKind::Arrow => "->",
            TokenKind::Colon => ":",
            TokenKind::Comma => ",",
            TokenKind::Dot => ".",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::Newline => "NEWLINE",
            TokenKind::Indent => "INDENT",
            TokenKind::Dedent => "DEDENT",
            TokenKind::Spellbook => "SPELLBOOK",
            TokenKind::Spell => "SPELL",
            TokenKind::Begin => "BEGIN",
            TokenKind::Shared => "SHARED",
            TokenKind::For => "FOR",
            TokenKind::In => "IN",
            TokenKind::Return => "RETURN",
            TokenKind::If => "IF",
            TokenKind::Elif => "ELIF",
            TokenKind::Else => "ELSE",
            TokenKind::Range => "RANGE",
            TokenKind::While => "WHILE",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token<'a> {
    pub kind: TokenKind<'a>,
    pub span: Span,
}

impl<'a> Token<'a> {
    pub fn new(kind: TokenKind<'a>, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn kind(&self) -> &TokenKind<'a> {
        &self.kind
    }

    pub fn span(&self) -> Span {
        self.span
    }
}
