use logos::Logos;

use crate::error::ParseError;

/// Scanner patterns, one per recognizable lexeme class.
///
/// This private enum only exists to drive the generated scanner; the public
/// token classification is [`TokenKind`], which additionally carries the
/// `Eof` and `Invalid` kinds that are produced by the [`Lexer`] itself
/// rather than by a pattern.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum Scan {
    /// `[`
    #[token("[")]
    OpenList,
    /// `]`
    #[token("]")]
    CloseList,
    /// `{`
    #[token("{")]
    OpenMap,
    /// `}`
    #[token("}")]
    CloseMap,
    /// `(`
    #[token("(")]
    OpenExpression,
    /// `)`
    #[token(")")]
    CloseExpression,
    /// `\n`
    #[token("\n")]
    NewLine,
    /// `"`
    #[token("\"")]
    DoubleQuote,
    /// `#`
    #[token("#")]
    Hash,
    /// A run of spaces, tabs, carriage returns or form feeds.
    #[regex(r"[ \t\r\x0C]+")]
    Whitespace,
    /// A run of ASCII letters and underscores.
    #[regex(r"[A-Za-z_]+")]
    Word,
    /// A digit run, optionally preceded by a single `+` or `-` sign.
    #[regex(r"[0-9]+")]
    #[regex(r"[+-][0-9]+")]
    Integer,
    /// `:`
    #[token(":")]
    Colon,
    /// `.`
    #[token(".")]
    Dot,
    /// `\`
    #[token("\\")]
    Backslash,
    /// Catch-all run: starts on any character no other pattern claims
    /// (including a sign that is not followed by a digit) and continues
    /// until whitespace, a newline, a double quote or any bracket. Colons,
    /// dots, hashes, backslashes and multibyte characters are all legal
    /// inside a running sequence.
    #[regex(r##"[^\[\]{}()"#:.\\ \t\r\x0C\nA-Za-z_0-9+-][^\[\]{}()" \t\r\x0C\n]*"##)]
    #[regex(r"[+-]")]
    #[regex(r##"[+-][^\[\]{}()" \t\r\x0C\n0-9][^\[\]{}()" \t\r\x0C\n]*"##)]
    Sequence,
}

/// Classifies every lexical unit the scanner can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Unrecognizable input. Kept as the fallback classification; the
    /// scan table is total, so this kind never occurs in practice.
    Invalid,
    /// Open square bracket: `[`
    OpenList,
    /// Close square bracket: `]`
    CloseList,
    /// Open curly bracket: `{`
    OpenMap,
    /// Close curly bracket: `}`
    CloseMap,
    /// Open parenthesis: `(`
    OpenExpression,
    /// Close parenthesis: `)`
    CloseExpression,
    /// Newline: `\n`
    NewLine,
    /// Double quote: `"`
    DoubleQuote,
    /// Hash: `#`
    Hash,
    /// Space, form feed, tab or carriage return runs.
    Whitespace,
    /// ASCII letters and underscore runs.
    Word,
    /// Digit runs, with an optional leading sign.
    Integer,
    /// Extended catch-all runs.
    Sequence,
    /// Colon: `:`
    Colon,
    /// Dot: `.`
    Dot,
    /// Backslash: `\`
    Backslash,
    /// End of input.
    Eof,
}

impl From<Scan> for TokenKind {
    fn from(s: Scan) -> Self {
        match s {
            Scan::OpenList => Self::OpenList,
            Scan::CloseList => Self::CloseList,
            Scan::OpenMap => Self::OpenMap,
            Scan::CloseMap => Self::CloseMap,
            Scan::OpenExpression => Self::OpenExpression,
            Scan::CloseExpression => Self::CloseExpression,
            Scan::NewLine => Self::NewLine,
            Scan::DoubleQuote => Self::DoubleQuote,
            Scan::Hash => Self::Hash,
            Scan::Whitespace => Self::Whitespace,
            Scan::Word => Self::Word,
            Scan::Integer => Self::Integer,
            Scan::Colon => Self::Colon,
            Scan::Dot => Self::Dot,
            Scan::Backslash => Self::Backslash,
            Scan::Sequence => Self::Sequence,
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Invalid => "invalid",
            Self::OpenList => "open_list",
            Self::CloseList => "close_list",
            Self::OpenMap => "open_map",
            Self::CloseMap => "close_map",
            Self::OpenExpression => "open_expression",
            Self::CloseExpression => "close_expression",
            Self::NewLine => "newline",
            Self::DoubleQuote => "double_quote",
            Self::Hash => "hash",
            Self::Whitespace => "separator",
            Self::Word => "word",
            Self::Integer => "integer",
            Self::Sequence => "sequence",
            Self::Colon => "colon",
            Self::Dot => "dot",
            Self::Backslash => "backslash",
            Self::Eof => "EOF",
        };
        f.write_str(name)
    }
}

/// A known sequence of characters (lexical unit) with its source position.
///
/// Tokens are immutable once emitted. The position refers to the first
/// character of the lexeme; both `line` and `column` are 1-based, and the
/// column counts characters from the start of the line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    kind:   TokenKind,
    text:   String,
    line:   usize,
    column: usize,
}

impl Token {
    /// Creates a lexical unit.
    #[must_use]
    pub fn new(kind: TokenKind, text: impl Into<String>, line: usize, column: usize) -> Self {
        Self { kind,
               text: text.into(),
               line,
               column }
    }

    /// Returns the classification of the lexical unit.
    #[must_use]
    pub const fn kind(&self) -> TokenKind {
        self.kind
    }

    /// Returns the raw text of the lexical unit.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the 1-based source line of the first character.
    #[must_use]
    pub const fn line(&self) -> usize {
        self.line
    }

    /// Returns the 1-based source column of the first character.
    #[must_use]
    pub const fn column(&self) -> usize {
        self.column
    }

    /// Returns true if the token is of the given kind.
    #[must_use]
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f,
               "(:{} {:?} [{} {}])",
               self.kind, self.text, self.line, self.column)
    }
}

/// A pull-driven lexical analyzer.
///
/// Each call to [`Lexer::next_token`] advances the underlying scanner by
/// exactly one token and then pauses; the caller fully controls the pace of
/// the scan. Once the input is exhausted an `Eof` token is emitted, and
/// every later pull yields `Eof` again. [`Lexer::stop`] aborts the scan:
/// all subsequent pulls fail with [`ParseError::ForceStopped`].
pub struct Lexer<'src> {
    inner:   logos::Lexer<'src, Scan>,
    line:    usize,
    column:  usize,
    stopped: bool,
}

impl<'src> Lexer<'src> {
    /// Initializes a lexer over the given source text.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        Self { inner:   Scan::lexer(source),
               line:    1,
               column:  1,
               stopped: false, }
    }

    /// Scans and returns the next token.
    ///
    /// # Errors
    /// Returns [`ParseError::ForceStopped`] when the lexer was stopped.
    pub fn next_token(&mut self) -> Result<Token, ParseError> {
        if self.stopped {
            return Err(ParseError::ForceStopped);
        }

        let Some(scanned) = self.inner.next() else {
            return Ok(Token::new(TokenKind::Eof, "", self.line, self.column));
        };

        let kind = match scanned {
            Ok(s) => TokenKind::from(s),
            Err(()) => TokenKind::Invalid,
        };

        let text = self.inner.slice();
        let token = Token::new(kind, text, self.line, self.column);

        if kind == TokenKind::NewLine {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += text.chars().count();
        }

        Ok(token)
    }

    /// Requests the scan to stop before reaching the end of input.
    pub fn stop(&mut self) {
        self.stopped = true;
    }
}

/// Takes a byte stream and returns all the tokens within it, terminated by
/// an `Eof` token.
///
/// # Errors
/// Returns [`ParseError::InvalidEncoding`] when the bytes are not valid
/// UTF-8.
pub fn tokenize(input: &[u8]) -> Result<Vec<Token>, ParseError> {
    let source = std::str::from_utf8(input).map_err(|_| ParseError::InvalidEncoding)?;
    let mut lx = Lexer::new(source);

    let mut tokens = Vec::new();
    loop {
        let token = lx.next_token()?;
        let done = token.is(TokenKind::Eof);
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}
