use crate::{
    ast::{Node, NodeRef},
    error::ParseError,
    interpreter::{
        lexer::{Lexer, Token, TokenKind},
        value::Value,
    },
};

/// Result type used by the parser.
pub type ParseResult<T> = Result<T, ParseError>;

/// Configuration for a [`Parser`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ParserOptions {
    /// When set, reaching end of input inside unterminated containers (or
    /// an unterminated string) silently closes them instead of failing
    /// with an unexpected-EOF error. Used for incremental input; it never
    /// suppresses unexpected-token errors.
    pub auto_close_on_eof: bool,
}

/// A recursive-descent parser over a pulled token stream.
///
/// The parser owns its lexer and drives it in lock-step, buffering at most
/// one lookahead token. Forms accumulate under a synthetic root list; on
/// the first grammar violation the parser stops the lexer and reports the
/// offending token with its source position.
pub struct Parser<'src> {
    lx:        Lexer<'src>,
    options:   ParserOptions,
    lookahead: Option<Token>,
}

impl<'src> Parser<'src> {
    /// Initializes a parser over the given source text.
    #[must_use]
    pub fn new(source: &'src str, options: ParserOptions) -> Self {
        Self { lx: Lexer::new(source),
               options,
               lookahead: None }
    }

    /// Parses the whole input into a root list of top-level forms.
    ///
    /// # Errors
    /// Returns the first [`ParseError`] encountered; the internal lexer is
    /// stopped when that happens.
    pub fn parse(&mut self) -> ParseResult<NodeRef> {
        let root = Node::list(None);
        match self.parse_program(&root) {
            Ok(()) => Ok(root),
            Err(error) => {
                self.lx.stop();
                Err(error)
            },
        }
    }

    fn parse_program(&mut self, root: &NodeRef) -> ParseResult<()> {
        loop {
            let token = self.next_token()?;
            if token.is(TokenKind::Eof) {
                return Ok(());
            }
            self.parse_form(root, token)?;
        }
    }

    fn next_token(&mut self) -> ParseResult<Token> {
        match self.lookahead.take() {
            Some(token) => Ok(token),
            None => self.lx.next_token(),
        }
    }

    fn peek_kind(&mut self) -> ParseResult<TokenKind> {
        if self.lookahead.is_none() {
            self.lookahead = Some(self.lx.next_token()?);
        }
        Ok(self.lookahead.as_ref().map_or(TokenKind::Eof, Token::kind))
    }

    /// Dispatches one already-pulled token at a form position.
    fn parse_form(&mut self, parent: &NodeRef, token: Token) -> ParseResult<()> {
        match token.kind() {
            TokenKind::Whitespace | TokenKind::NewLine => Ok(()),

            TokenKind::Hash => self.skip_comment(),

            TokenKind::DoubleQuote => self.parse_string(parent, token),

            TokenKind::Integer => self.parse_number(parent, &token),

            TokenKind::Colon => self.parse_atom(parent, token),

            TokenKind::Word | TokenKind::Sequence => {
                let symbol = Value::symbol(token.text());
                push_leaf(parent, token, symbol);
                Ok(())
            },

            TokenKind::OpenList => {
                let node = push_container(parent, Node::list(Some(token)));
                self.parse_container(&node, TokenKind::CloseList)
            },

            TokenKind::OpenMap => {
                let node = push_container(parent, Node::map(Some(token)));
                self.parse_container(&node, TokenKind::CloseMap)
            },

            TokenKind::OpenExpression => {
                let node = push_container(parent, Node::expression(Some(token)));
                self.parse_container(&node, TokenKind::CloseExpression)
            },

            _ => Err(unexpected(&token)),
        }
    }

    /// Consumes tokens until the end of the line or of the input.
    fn skip_comment(&mut self) -> ParseResult<()> {
        loop {
            let token = self.next_token()?;
            if matches!(token.kind(), TokenKind::NewLine | TokenKind::Eof) {
                return Ok(());
            }
        }
    }

    /// Loops over forms until the matching close token.
    fn parse_container(&mut self, node: &NodeRef, close: TokenKind) -> ParseResult<()> {
        loop {
            let token = self.next_token()?;
            if token.is(close) {
                return Ok(());
            }
            if token.is(TokenKind::Eof) {
                if self.options.auto_close_on_eof {
                    return Ok(());
                }
                return Err(unexpected_eof(&token));
            }
            self.parse_form(node, token)?;
        }
    }

    /// Accumulates every lexeme up to the closing quote into one string
    /// leaf, decoding conventional escapes afterwards.
    fn parse_string(&mut self, parent: &NodeRef, open: Token) -> ParseResult<()> {
        let mut content = String::new();
        loop {
            let token = self.next_token()?;
            match token.kind() {
                TokenKind::DoubleQuote => break,
                TokenKind::Eof => {
                    if self.options.auto_close_on_eof {
                        break;
                    }
                    return Err(unexpected_eof(&token));
                },
                _ => content.push_str(token.text()),
            }
        }

        let value = Value::String(decode_escapes(&content));
        push_leaf(parent, open, value);
        Ok(())
    }

    /// Pairs a colon with the following word into one atom leaf.
    fn parse_atom(&mut self, parent: &NodeRef, colon: Token) -> ParseResult<()> {
        let token = self.next_token()?;
        match token.kind() {
            TokenKind::Word => {
                let spelling = format!(":{}", token.text());
                push_leaf(parent, colon, Value::atom(spelling));
                Ok(())
            },
            TokenKind::Eof if !self.options.auto_close_on_eof => Err(unexpected_eof(&token)),
            _ => Err(unexpected(&token)),
        }
    }

    /// Reads an integer leaf, or merges `integer dot integer` into one
    /// float leaf when a dot follows.
    fn parse_number(&mut self, parent: &NodeRef, int_token: &Token) -> ParseResult<()> {
        if self.peek_kind()? != TokenKind::Dot {
            let value: i64 = int_token.text().parse().map_err(|_| {
                ParseError::NumberOutOfRange { token:  int_token.text().to_owned(),
                                               line:   int_token.line(),
                                               column: int_token.column() }
            })?;
            push_leaf(parent, int_token.clone(), Value::Int(value));
            return Ok(());
        }

        let _dot = self.next_token()?;
        let mantissa = self.next_token()?;
        match mantissa.kind() {
            TokenKind::Integer => {},
            TokenKind::Eof if !self.options.auto_close_on_eof => {
                return Err(unexpected_eof(&mantissa));
            },
            _ => return Err(unexpected(&mantissa)),
        }

        let text = format!("{}.{}", int_token.text(), mantissa.text());
        let value: f64 = text.parse().map_err(|_| unexpected(&mantissa))?;
        push_leaf(parent, int_token.clone(), Value::Float(value));
        Ok(())
    }
}

fn unexpected(token: &Token) -> ParseError {
    ParseError::UnexpectedToken { token:  token.text().to_owned(),
                                  line:   token.line(),
                                  column: token.column() }
}

fn unexpected_eof(token: &Token) -> ParseError {
    ParseError::UnexpectedEof { line:   token.line(),
                                column: token.column() }
}

/// Appends a leaf under a container node.
///
/// The parser only ever pushes into containers, so a refusal here is a
/// programmer bug.
fn push_leaf(parent: &NodeRef, token: Token, value: Value) {
    parent.push_value(Some(token), value)
          .expect("form position is always a container node");
}

fn push_container(parent: &NodeRef, node: NodeRef) -> NodeRef {
    parent.push(std::sync::Arc::clone(&node))
          .expect("form position is always a container node");
    node
}

/// Decodes the conventional escapes `\n`, `\t`, `\r` and `\\`; any other
/// backslash pair (and a trailing backslash) is preserved literally, which
/// keeps decoding the exact inverse of the encoder's quoting.
fn decode_escapes(content: &str) -> String {
    let mut decoded = String::with_capacity(content.len());
    let mut chars = content.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            decoded.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => decoded.push('\n'),
            Some('t') => decoded.push('\t'),
            Some('r') => decoded.push('\r'),
            Some('\\') => decoded.push('\\'),
            Some(other) => {
                decoded.push('\\');
                decoded.push(other);
            },
            None => decoded.push('\\'),
        }
    }
    decoded
}

/// Parses a byte stream into a root list of top-level forms.
///
/// # Errors
/// Returns a [`ParseError`] for invalid UTF-8 input or the first grammar
/// violation, with its source position.
pub fn parse(input: &[u8]) -> ParseResult<NodeRef> {
    parse_with_options(input, ParserOptions::default())
}

/// Parses a byte stream with explicit [`ParserOptions`].
///
/// # Errors
/// Returns a [`ParseError`] for invalid UTF-8 input or the first grammar
/// violation, with its source position.
pub fn parse_with_options(input: &[u8], options: ParserOptions) -> ParseResult<NodeRef> {
    let source = std::str::from_utf8(input).map_err(|_| ParseError::InvalidEncoding)?;
    Parser::new(source, options).parse()
}
