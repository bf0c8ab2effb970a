//! Logos-based lexer for native configuration syntax
//!
//! Quoted strings are lexed as single tokens, including any `${ ... }`
//! interpolations they contain. The parser re-lexes their contents as
//! templates.

use logos::{FilterResult, Logos};
use text_size::{TextRange, TextSize};

/// Token kinds produced by the lexer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Newline,
    Ident,
    Number,
    /// `"..."`, possibly unterminated
    String,
    /// `<<EOF` ... `EOF`
    Heredoc,

    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LParen,
    RParen,

    Eq,
    EqEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    AndAnd,
    OrOr,
    Bang,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Question,
    Colon,
    Comma,
    Dot,
    Ellipsis,
    FatArrow,

    Error,
    Eof,
}

impl TokenKind {
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Newline => "newline",
            TokenKind::Ident => "identifier",
            TokenKind::Number => "number",
            TokenKind::String => "string",
            TokenKind::Heredoc => "heredoc",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::Eq => "'='",
            TokenKind::EqEq => "'=='",
            TokenKind::NotEq => "'!='",
            TokenKind::Lt => "'<'",
            TokenKind::LtEq => "'<='",
            TokenKind::Gt => "'>'",
            TokenKind::GtEq => "'>='",
            TokenKind::AndAnd => "'&&'",
            TokenKind::OrOr => "'||'",
            TokenKind::Bang => "'!'",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Percent => "'%'",
            TokenKind::Question => "'?'",
            TokenKind::Colon => "':'",
            TokenKind::Comma => "','",
            TokenKind::Dot => "'.'",
            TokenKind::Ellipsis => "'...'",
            TokenKind::FatArrow => "'=>'",
            TokenKind::Error => "invalid token",
            TokenKind::Eof => "end of file",
        }
    }
}

/// A token with its kind, text, and position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub offset: TextSize,
}

impl Token<'_> {
    pub fn range(&self) -> TextRange {
        TextRange::at(self.offset, TextSize::of(self.text))
    }
}

/// Lexer wrapping the logos-generated tokenizer
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, LogosToken>,
    base: TextSize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self::with_offset(input, TextSize::new(0))
    }

    /// Lex a fragment whose first byte sits at `base` in the enclosing file.
    pub fn with_offset(input: &'a str, base: TextSize) -> Self {
        Self {
            inner: LogosToken::lexer(input),
            base,
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let logos_token = self.inner.next()?;
        let text = self.inner.slice();
        let offset = self.base + TextSize::new(self.inner.span().start as u32);

        let kind = match logos_token {
            Ok(t) => t.into(),
            Err(()) => TokenKind::Error,
        };

        Some(Token { kind, text, offset })
    }
}

/// Tokenize an entire string into a Vec
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    Lexer::new(input).collect()
}

/// Logos token enum - maps to TokenKind
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r]+")]
#[logos(skip r"#[^\n]*")]
#[logos(skip r"//[^\n]*")]
enum LogosToken {
    #[token("\n")]
    Newline,

    #[token("/*", lex_block_comment)]
    BlockComment,

    #[regex(r"[\p{XID_Start}_][\p{XID_Continue}-]*")]
    Ident,

    #[regex(r"[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?")]
    Number,

    #[token("\"", lex_quoted)]
    String,

    #[regex(r"<<-?[A-Za-z_][A-Za-z0-9_]*\r?\n", lex_heredoc)]
    Heredoc,

    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,

    #[token("=")]
    Eq,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<")]
    Lt,
    #[token("<=")]
    LtEq,
    #[token(">")]
    Gt,
    #[token(">=")]
    GtEq,
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("!")]
    Bang,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("?")]
    Question,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("...")]
    Ellipsis,
    #[token("=>")]
    FatArrow,
}

impl From<LogosToken> for TokenKind {
    fn from(token: LogosToken) -> Self {
        match token {
            LogosToken::Newline => TokenKind::Newline,
            // never emitted; the callback skips or fails
            LogosToken::BlockComment => TokenKind::Error,
            LogosToken::Ident => TokenKind::Ident,
            LogosToken::Number => TokenKind::Number,
            LogosToken::String => TokenKind::String,
            LogosToken::Heredoc => TokenKind::Heredoc,
            LogosToken::LBrace => TokenKind::LBrace,
            LogosToken::RBrace => TokenKind::RBrace,
            LogosToken::LBracket => TokenKind::LBracket,
            LogosToken::RBracket => TokenKind::RBracket,
            LogosToken::LParen => TokenKind::LParen,
            LogosToken::RParen => TokenKind::RParen,
            LogosToken::Eq => TokenKind::Eq,
            LogosToken::EqEq => TokenKind::EqEq,
            LogosToken::NotEq => TokenKind::NotEq,
            LogosToken::Lt => TokenKind::Lt,
            LogosToken::LtEq => TokenKind::LtEq,
            LogosToken::Gt => TokenKind::Gt,
            LogosToken::GtEq => TokenKind::GtEq,
            LogosToken::AndAnd => TokenKind::AndAnd,
            LogosToken::OrOr => TokenKind::OrOr,
            LogosToken::Bang => TokenKind::Bang,
            LogosToken::Plus => TokenKind::Plus,
            LogosToken::Minus => TokenKind::Minus,
            LogosToken::Star => TokenKind::Star,
            LogosToken::Slash => TokenKind::Slash,
            LogosToken::Percent => TokenKind::Percent,
            LogosToken::Question => TokenKind::Question,
            LogosToken::Colon => TokenKind::Colon,
            LogosToken::Comma => TokenKind::Comma,
            LogosToken::Dot => TokenKind::Dot,
            LogosToken::Ellipsis => TokenKind::Ellipsis,
            LogosToken::FatArrow => TokenKind::FatArrow,
        }
    }
}

/// Consume the rest of a quoted string. An unterminated string runs to the
/// end of the line and is reported by the parser.
fn lex_quoted(lex: &mut logos::Lexer<LogosToken>) -> bool {
    let rest = lex.remainder();
    let len = match scan_quoted(rest) {
        Some(len) => len,
        None => rest.find('\n').unwrap_or(rest.len()),
    };
    lex.bump(len);
    true
}

/// Skip a block comment through its closing `*/`. An unterminated comment
/// runs to the end of input and becomes an error token.
fn lex_block_comment(lex: &mut logos::Lexer<LogosToken>) -> FilterResult<(), ()> {
    let rest = lex.remainder();
    match rest.find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            FilterResult::Skip
        }
        None => {
            lex.bump(rest.len());
            FilterResult::Error(())
        }
    }
}

/// Consume heredoc lines up to and including the closing marker line.
fn lex_heredoc(lex: &mut logos::Lexer<LogosToken>) -> bool {
    let marker = lex
        .slice()
        .trim_start_matches("<<")
        .trim_start_matches('-')
        .trim_end();
    let rest = lex.remainder();

    let mut consumed = 0;
    for line in rest.split_inclusive('\n') {
        consumed += line.len();
        if line.trim() == marker {
            // leave the newline after the marker for the parser
            let trailing = line.len() - line.trim_end_matches(['\n', '\r']).len();
            lex.bump(consumed - trailing);
            return true;
        }
    }
    lex.bump(rest.len());
    true
}

/// Length of a quoted string body including its closing quote, with
/// `src` starting just after the opening quote.
pub(crate) fn scan_quoted(src: &str) -> Option<usize> {
    let bytes = src.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return Some(i + 1),
            b'\n' => return None,
            b'$' | b'%' if bytes.get(i + 1) == Some(&bytes[i]) && bytes.get(i + 2) == Some(&b'{') => {
                i += 3
            }
            b'$' | b'%' if bytes.get(i + 1) == Some(&b'{') => {
                i += 2 + scan_interpolation(&src[i + 2..])?;
            }
            _ => i += 1,
        }
    }
    None
}

/// Length of an interpolation body through its closing brace, with `src`
/// starting just after `${`.
pub(crate) fn scan_interpolation(src: &str) -> Option<usize> {
    let bytes = src.as_bytes();
    let mut depth = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'{' => depth += 1,
            b'}' if depth == 0 => return Some(i + 1),
            b'}' => depth -= 1,
            b'"' => {
                i += 1 + scan_quoted(&src[i + 1..])?;
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_attribute_tokens() {
        assert_eq!(
            kinds("foo = 42\n"),
            vec![
                TokenKind::Ident,
                TokenKind::Eq,
                TokenKind::Number,
                TokenKind::Newline
            ]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(
            kinds("# one\n// two\n/* three */ a"),
            vec![TokenKind::Newline, TokenKind::Newline, TokenKind::Ident]
        );
    }

    #[test]
    fn test_block_comments() {
        assert_eq!(
            kinds("a /* x * y\n ** */ = /**/ 1"),
            vec![TokenKind::Ident, TokenKind::Eq, TokenKind::Number]
        );
        assert_eq!(kinds("a /* open"), vec![TokenKind::Ident, TokenKind::Error]);
    }

    #[test]
    fn test_string_with_nested_interpolation_is_one_token() {
        let tokens = tokenize(r#""a ${lookup(m, "k}")} b" x"#);
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].text, r#""a ${lookup(m, "k}")} b""#);
        assert_eq!(tokens[1].kind, TokenKind::Ident);
    }

    #[test]
    fn test_escaped_interpolation() {
        let tokens = tokenize(r#""$${literal}""#);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].text, r#""$${literal}""#);
    }

    #[test]
    fn test_unterminated_string_stops_at_newline() {
        let tokens = tokenize("\"abc\nfoo");
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].text, "\"abc");
        assert_eq!(tokens[1].kind, TokenKind::Newline);
    }

    #[test]
    fn test_identifiers_may_contain_dashes() {
        let tokens = tokenize("aws-instance.foo");
        assert_eq!(tokens[0].text, "aws-instance");
        assert_eq!(tokens[1].kind, TokenKind::Dot);
    }

    #[test]
    fn test_heredoc() {
        let tokens = tokenize("x = <<EOT\nhello\nEOT\ny");
        assert_eq!(tokens[2].kind, TokenKind::Heredoc);
        assert_eq!(tokens[2].text, "<<EOT\nhello\nEOT");
        assert_eq!(tokens[3].kind, TokenKind::Newline);
    }

    #[test]
    fn test_offsets_respect_base() {
        let tokens: Vec<_> = Lexer::with_offset("a.b", TextSize::new(10)).collect();
        assert_eq!(tokens[2].offset, TextSize::new(12));
    }
}
