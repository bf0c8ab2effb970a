//! JSON syntax parsing
//!
//! Produces a positioned JSON tree. Turning that tree into a [`Body`] needs a
//! schema and happens in [`crate::syntax::json`].
//!
//! [`Body`]: crate::syntax::ast::Body

use logos::Logos;
use smol_str::SmolStr;
use text_size::{TextRange, TextSize};

use super::parser::SyntaxError;

/// A JSON value with its source range
#[derive(Debug, Clone, PartialEq)]
pub struct JsonValue {
    pub kind: JsonKind,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq)]
pub enum JsonKind {
    Null,
    Bool(bool),
    Number(f64),
    String(JsonString),
    Array(Vec<JsonValue>),
    /// Properties in source order; duplicate keys are kept.
    Object(Vec<JsonProperty>),
    Invalid,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JsonString {
    pub value: SmolStr,
    /// The source text contained escape sequences, so offsets into `value`
    /// no longer line up with the source.
    pub escaped: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JsonProperty {
    pub key: SmolStr,
    pub key_range: TextRange,
    pub value: JsonValue,
}

impl JsonValue {
    pub fn as_str(&self) -> Option<&str> {
        match &self.kind {
            JsonKind::String(s) => Some(&s.value),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&[JsonProperty]> {
        match &self.kind {
            JsonKind::Object(props) => Some(props),
            _ => None,
        }
    }

    /// Offset where the content of a string value starts.
    pub fn content_offset(&self) -> TextSize {
        match self.kind {
            JsonKind::String(_) => self.range.start() + TextSize::new(1),
            _ => self.range.start(),
        }
    }
}

#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
enum JsonToken {
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,
    #[regex(r#""([^"\\\x00-\x1F]|\\.)*""#)]
    String,
    #[regex(r"-?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?[0-9]+)?")]
    Number,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,
}

#[derive(Debug, Clone, Copy)]
struct Tok<'a> {
    kind: Option<JsonToken>,
    text: &'a str,
    range: TextRange,
}

/// Parse a JSON document. Always returns a value; broken parts become
/// [`JsonKind::Invalid`].
pub fn parse_json(input: &str) -> (JsonValue, Vec<SyntaxError>) {
    let mut lexer = JsonToken::lexer(input);
    let mut tokens = Vec::new();
    while let Some(result) = lexer.next() {
        let span = lexer.span();
        tokens.push(Tok {
            kind: result.ok(),
            text: lexer.slice(),
            range: TextRange::new(
                TextSize::new(span.start as u32),
                TextSize::new(span.end as u32),
            ),
        });
    }

    let mut parser = JsonParser {
        tokens,
        pos: 0,
        end: TextSize::of(input),
        errors: Vec::new(),
    };
    let value = parser.value();
    if let Some(t) = parser.peek() {
        parser.error("extra data after JSON value", t.range);
    }
    (value, parser.errors)
}

struct JsonParser<'a> {
    tokens: Vec<Tok<'a>>,
    pos: usize,
    end: TextSize,
    errors: Vec<SyntaxError>,
}

impl<'a> JsonParser<'a> {
    fn peek(&self) -> Option<Tok<'a>> {
        self.tokens.get(self.pos).copied()
    }

    fn peek_kind(&self) -> Option<JsonToken> {
        self.peek().and_then(|t| t.kind)
    }

    fn bump(&mut self) -> Option<Tok<'a>> {
        let t = self.peek();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn error(&mut self, message: impl Into<String>, range: TextRange) {
        self.errors.push(SyntaxError::new(message, range));
    }

    fn here(&self) -> TextRange {
        self.peek()
            .map(|t| t.range)
            .unwrap_or_else(|| TextRange::empty(self.end))
    }

    fn prev_end(&self) -> TextSize {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map(|t| t.range.end())
            .unwrap_or(self.end)
    }

    /// Skip to the next `,` or closer at the current nesting level.
    fn skip_member(&mut self) {
        let mut depth = 0usize;
        while let Some(t) = self.peek() {
            match t.kind {
                Some(JsonToken::LBrace | JsonToken::LBracket) => depth += 1,
                Some(JsonToken::RBrace | JsonToken::RBracket) => {
                    if depth == 0 {
                        return;
                    }
                    depth -= 1;
                }
                Some(JsonToken::Comma) if depth == 0 => return,
                _ => {}
            }
            self.pos += 1;
        }
    }

    fn value(&mut self) -> JsonValue {
        let Some(t) = self.peek() else {
            let range = TextRange::empty(self.end);
            self.error("expected JSON value", range);
            return JsonValue {
                kind: JsonKind::Invalid,
                range,
            };
        };
        let kind = match t.kind {
            Some(JsonToken::LBrace) => return self.object(),
            Some(JsonToken::LBracket) => return self.array(),
            Some(JsonToken::String) => JsonKind::String(decode_string(t.text)),
            Some(JsonToken::Number) => match t.text.parse::<f64>() {
                Ok(n) => JsonKind::Number(n),
                Err(_) => {
                    self.error("invalid number", t.range);
                    JsonKind::Invalid
                }
            },
            Some(JsonToken::True) => JsonKind::Bool(true),
            Some(JsonToken::False) => JsonKind::Bool(false),
            Some(JsonToken::Null) => JsonKind::Null,
            Some(JsonToken::RBrace | JsonToken::RBracket | JsonToken::Comma | JsonToken::Colon) => {
                self.error("expected JSON value", t.range);
                return JsonValue {
                    kind: JsonKind::Invalid,
                    range: TextRange::empty(t.range.start()),
                };
            }
            None => {
                self.error(format!("invalid JSON token {:?}", t.text), t.range);
                JsonKind::Invalid
            }
        };
        self.bump();
        JsonValue {
            kind,
            range: t.range,
        }
    }

    fn object(&mut self) -> JsonValue {
        let open = self.bump().map(|t| t.range.start()).unwrap_or(self.end);
        let mut props = Vec::new();
        loop {
            match self.peek_kind() {
                Some(JsonToken::RBrace) => {
                    self.bump();
                    break;
                }
                Some(JsonToken::String) => {}
                None if self.peek().is_none() => {
                    self.error("unclosed object, expected '}'", TextRange::empty(self.end));
                    break;
                }
                _ => {
                    let here = self.here();
                    self.error("expected property name", here);
                    self.skip_member();
                    if self.peek_kind() == Some(JsonToken::Comma) {
                        self.bump();
                        continue;
                    }
                    if self.peek_kind() == Some(JsonToken::RBrace) {
                        self.bump();
                    } else {
                        self.error("unclosed object, expected '}'", here);
                    }
                    break;
                }
            }

            let Some(key) = self.bump() else { break };
            if self.peek_kind() == Some(JsonToken::Colon) {
                self.bump();
            } else {
                let here = self.here();
                self.error("expected ':' after property name", here);
            }
            let value = self.value();
            props.push(JsonProperty {
                key: decode_string(key.text).value,
                key_range: key.range,
                value,
            });

            match self.peek_kind() {
                Some(JsonToken::Comma) => {
                    self.bump();
                }
                Some(JsonToken::RBrace) => {}
                _ => {
                    let here = self.here();
                    self.error("expected ',' or '}'", here);
                    self.skip_member();
                    if self.peek_kind() == Some(JsonToken::Comma) {
                        self.bump();
                    } else if self.peek_kind() != Some(JsonToken::RBrace) {
                        break;
                    }
                }
            }
        }
        JsonValue {
            kind: JsonKind::Object(props),
            range: TextRange::new(open, self.prev_end().max(open)),
        }
    }

    fn array(&mut self) -> JsonValue {
        let open = self.bump().map(|t| t.range.start()).unwrap_or(self.end);
        let mut elems = Vec::new();
        loop {
            match self.peek_kind() {
                Some(JsonToken::RBracket) => {
                    self.bump();
                    break;
                }
                _ if self.peek().is_none() => {
                    self.error("unclosed array, expected ']'", TextRange::empty(self.end));
                    break;
                }
                _ => {}
            }
            let before = self.pos;
            elems.push(self.value());
            match self.peek_kind() {
                Some(JsonToken::Comma) => {
                    self.bump();
                }
                Some(JsonToken::RBracket) => {}
                _ => {
                    let here = self.here();
                    self.error("expected ',' or ']'", here);
                    if self.pos == before {
                        self.bump();
                    }
                    self.skip_member();
                    if self.peek_kind() == Some(JsonToken::Comma) {
                        self.bump();
                    } else if self.peek_kind() != Some(JsonToken::RBracket) {
                        break;
                    }
                }
            }
        }
        JsonValue {
            kind: JsonKind::Array(elems),
            range: TextRange::new(open, self.prev_end().max(open)),
        }
    }
}

/// Decode a quoted JSON string token.
fn decode_string(text: &str) -> JsonString {
    let inner = text
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(text);
    if !inner.contains('\\') {
        return JsonString {
            value: SmolStr::new(inner),
            escaped: false,
        };
    }

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('u') => {
                let code = read_hex4(&mut chars);
                let ch = match code {
                    Some(hi @ 0xD800..=0xDBFF) => {
                        let rest = chars.as_str();
                        match rest.strip_prefix("\\u") {
                            Some(after) => {
                                let mut lo_chars = after.chars();
                                let lo = read_hex4(&mut lo_chars);
                                chars = lo_chars;
                                lo.filter(|lo| (0xDC00..=0xDFFF).contains(lo)).and_then(|lo| {
                                    char::from_u32(0x10000 + ((hi - 0xD800) << 10) + (lo - 0xDC00))
                                })
                            }
                            None => None,
                        }
                    }
                    Some(code) => char::from_u32(code),
                    None => None,
                };
                out.push(ch.unwrap_or(char::REPLACEMENT_CHARACTER));
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    JsonString {
        value: SmolStr::new(out),
        escaped: true,
    }
}

fn read_hex4(chars: &mut std::str::Chars<'_>) -> Option<u32> {
    let hex: String = chars.by_ref().take(4).collect();
    if hex.len() != 4 {
        return None;
    }
    u32::from_str_radix(&hex, 16).ok()
}
