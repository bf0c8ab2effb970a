//! Recursive descent parser for native configuration syntax
//!
//! Builds a [`Body`] tree straight from tokens. Errors are collected rather
//! than returned so a partially written file still yields a usable tree:
//! missing expressions become [`Expr::Empty`], unparseable ones
//! [`Expr::Invalid`], and broken lines are skipped.

use smol_str::SmolStr;
use text_size::{TextRange, TextSize};
use thiserror::Error;

use super::lexer::{Lexer, Token, TokenKind, scan_interpolation, scan_quoted};
use crate::syntax::ast::{
    Attribute, BinaryOp, Block, Body, BodyItem, Expr, ForExpr, IndexKey, Label, ObjectItem,
    TemplatePart, Traversal, TraversalStep, TraversalStepKind, UnaryOp,
};
use crate::ty::Value;

/// Parse result containing the body and any errors
#[derive(Debug, Clone, PartialEq)]
pub struct Parse {
    pub body: Body,
    pub errors: Vec<SyntaxError>,
}

impl Parse {
    /// Check if parsing succeeded without errors
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// A syntax error with location and message
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SyntaxError {
    pub message: String,
    pub range: TextRange,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, range: TextRange) -> Self {
        Self {
            message: message.into(),
            range,
        }
    }
}

/// Parse a whole file into its root body.
pub fn parse(input: &str) -> Parse {
    let mut parser = Parser::new(input, TextSize::new(0));
    let items = parser.parse_body_items(false);
    Parse {
        body: Body::new(items, TextRange::up_to(TextSize::of(input))),
        errors: parser.errors,
    }
}

/// Parse a standalone expression whose text starts at `offset`.
/// Newlines are insignificant.
pub fn parse_expression(input: &str, offset: TextSize) -> (Expr, Vec<SyntaxError>) {
    let mut parser = Parser::new(input, offset);
    parser.nl_skip = 1;
    let expr = if parser.at(TokenKind::Eof) {
        Expr::Empty(TextRange::empty(offset))
    } else {
        parser.parse_expr()
    };
    if !parser.at(TokenKind::Eof) {
        let t = parser.current();
        parser.error(
            format!("extra characters after expression: {}", t.kind.describe()),
            t.range(),
        );
    }
    (expr, parser.errors)
}

/// Parse unquoted template text (no escape sequences) starting at `offset`.
pub fn parse_template(input: &str, offset: TextSize) -> (Expr, Vec<SyntaxError>) {
    let mut errors = Vec::new();
    let parts = template_parts(input, offset, false, &mut errors);
    let range = TextRange::at(offset, TextSize::of(input));
    (template_expr(parts, range), errors)
}

struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    pos: usize,
    end: TextSize,
    prev_end: TextSize,
    errors: Vec<SyntaxError>,
    /// Newlines are skipped while inside brackets or parentheses
    nl_skip: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str, base: TextSize) -> Self {
        Self {
            tokens: Lexer::with_offset(input, base).collect(),
            pos: 0,
            end: base + TextSize::of(input),
            prev_end: base,
            errors: Vec::new(),
            nl_skip: 0,
        }
    }

    // =========================================================================
    // Token inspection
    // =========================================================================

    fn skip_newlines(&mut self) {
        if self.nl_skip > 0 {
            while self
                .tokens
                .get(self.pos)
                .is_some_and(|t| t.kind == TokenKind::Newline)
            {
                self.pos += 1;
            }
        }
    }

    fn eof(&self) -> Token<'a> {
        Token {
            kind: TokenKind::Eof,
            text: "",
            offset: self.end,
        }
    }

    fn current(&mut self) -> Token<'a> {
        self.skip_newlines();
        self.tokens.get(self.pos).copied().unwrap_or_else(|| self.eof())
    }

    fn peek(&mut self) -> TokenKind {
        self.current().kind
    }

    /// Look ahead `n` significant tokens.
    fn nth(&mut self, n: usize) -> Token<'a> {
        self.skip_newlines();
        self.tokens[self.pos..]
            .iter()
            .filter(|t| self.nl_skip == 0 || t.kind != TokenKind::Newline)
            .nth(n)
            .copied()
            .unwrap_or_else(|| self.eof())
    }

    fn at(&mut self, kind: TokenKind) -> bool {
        self.peek() == kind
    }

    fn at_keyword(&mut self, keyword: &str) -> bool {
        let t = self.current();
        t.kind == TokenKind::Ident && t.text == keyword
    }

    fn bump(&mut self) -> Token<'a> {
        let t = self.current();
        if self.pos < self.tokens.len() {
            self.pos += 1;
            self.prev_end = t.range().end();
        }
        t
    }

    fn eat(&mut self, kind: TokenKind) -> Option<Token<'a>> {
        if self.at(kind) { Some(self.bump()) } else { None }
    }

    fn expect(&mut self, kind: TokenKind) -> Option<Token<'a>> {
        if let Some(t) = self.eat(kind) {
            return Some(t);
        }
        let t = self.current();
        self.error(
            format!("expected {}, found {}", kind.describe(), t.kind.describe()),
            t.range(),
        );
        None
    }

    fn error(&mut self, message: impl Into<String>, range: TextRange) {
        self.errors.push(SyntaxError::new(message, range));
    }

    // =========================================================================
    // Recovery
    // =========================================================================

    /// Skip balanced tokens until one of `stops` at depth zero, an
    /// unbalanced closer, or end of file. The stop token is not consumed.
    fn skip_until(&mut self, stops: &[TokenKind]) {
        let mut depth = 0usize;
        loop {
            let kind = self.peek();
            match kind {
                TokenKind::Eof => return,
                k if depth == 0 && stops.contains(&k) => return,
                TokenKind::LBrace | TokenKind::LBracket | TokenKind::LParen => depth += 1,
                TokenKind::RBrace | TokenKind::RBracket | TokenKind::RParen => {
                    if depth == 0 {
                        return;
                    }
                    depth -= 1;
                }
                _ => {}
            }
            self.bump();
        }
    }

    fn recover_line(&mut self) {
        self.bump();
        self.skip_until(&[TokenKind::Newline]);
    }

    fn finish_line(&mut self) {
        match self.peek() {
            TokenKind::Newline => {
                self.bump();
            }
            TokenKind::Eof | TokenKind::RBrace => {}
            _ => {
                let t = self.current();
                self.error(
                    format!("expected newline, found {}", t.kind.describe()),
                    t.range(),
                );
                self.skip_until(&[TokenKind::Newline]);
            }
        }
    }

    // =========================================================================
    // Bodies
    // =========================================================================

    fn parse_body_items(&mut self, in_block: bool) -> Vec<BodyItem> {
        let mut items = Vec::new();
        loop {
            match self.peek() {
                TokenKind::Newline => {
                    self.bump();
                }
                TokenKind::Eof => break,
                TokenKind::RBrace if in_block => break,
                TokenKind::Ident => {
                    if let Some(item) = self.parse_body_item() {
                        items.push(item);
                    }
                }
                _ => {
                    let t = self.current();
                    self.error(
                        format!("expected attribute or block, found {}", t.kind.describe()),
                        t.range(),
                    );
                    self.recover_line();
                }
            }
        }
        items
    }

    fn parse_body_item(&mut self) -> Option<BodyItem> {
        let name = self.bump();
        match self.peek() {
            TokenKind::Eq => {
                let eq = self.bump();
                let expr = match self.peek() {
                    TokenKind::Newline | TokenKind::Eof | TokenKind::RBrace => {
                        self.error("expected expression", eq.range());
                        Expr::Empty(TextRange::empty(eq.range().end()))
                    }
                    _ => self.parse_expr(),
                };
                let end = expr.range().end().max(eq.range().end());
                self.finish_line();
                Some(BodyItem::Attribute(Attribute {
                    name: SmolStr::new(name.text),
                    name_range: name.range(),
                    expr,
                    range: TextRange::new(name.offset, end),
                }))
            }
            TokenKind::String | TokenKind::Ident | TokenKind::LBrace => {
                Some(BodyItem::Block(self.parse_block(name)))
            }
            _ => {
                self.error(
                    format!("expected '=' or block after {:?}", name.text),
                    name.range(),
                );
                self.skip_until(&[TokenKind::Newline]);
                None
            }
        }
    }

    fn parse_block(&mut self, ty: Token<'a>) -> Block {
        let mut labels = Vec::new();
        loop {
            match self.peek() {
                TokenKind::String => {
                    let t = self.bump();
                    let label = self.string_label(t);
                    labels.push(label);
                }
                TokenKind::Ident => {
                    let t = self.bump();
                    labels.push(Label {
                        value: SmolStr::new(t.text),
                        range: t.range(),
                    });
                }
                _ => break,
            }
        }

        let Some(open) = self.eat(TokenKind::LBrace) else {
            let t = self.current();
            self.error(
                format!("expected '{{' to open block, found {}", t.kind.describe()),
                t.range(),
            );
            self.skip_until(&[TokenKind::Newline]);
            let at = self.prev_end;
            return Block {
                ty: SmolStr::new(ty.text),
                ty_range: ty.range(),
                labels,
                body: Body::empty(TextRange::empty(at)),
                range: TextRange::new(ty.offset, at),
            };
        };

        let items = self.parse_body_items(true);
        let close_end = match self.eat(TokenKind::RBrace) {
            Some(t) => t.range().end(),
            None => {
                self.error("unclosed block, expected '}'", open.range());
                self.prev_end.max(open.range().end())
            }
        };
        self.finish_line();

        Block {
            ty: SmolStr::new(ty.text),
            ty_range: ty.range(),
            labels,
            body: Body::new(items, TextRange::new(open.offset, close_end)),
            range: TextRange::new(ty.offset, close_end),
        }
    }

    fn string_label(&mut self, t: Token<'a>) -> Label {
        let (content, offset) = self.string_content(t);
        let parts = template_parts(content, offset, true, &mut self.errors);
        let value = match literal_text(&parts) {
            Some(text) => text,
            None => {
                self.error("block labels cannot contain interpolations", t.range());
                SmolStr::new(content)
            }
        };
        Label {
            value,
            range: t.range(),
        }
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn parse_expr(&mut self) -> Expr {
        let cond = self.parse_binary(1);
        if self.eat(TokenKind::Question).is_none() {
            return cond;
        }
        let then = self.parse_expr();
        self.expect(TokenKind::Colon);
        let otherwise = self.parse_expr();
        let range = cond.range().cover(otherwise.range());
        Expr::Conditional {
            cond: Box::new(cond),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
            range,
        }
    }

    fn parse_binary(&mut self, min_prec: u8) -> Expr {
        let mut lhs = self.parse_unary();
        while let Some((op, prec)) = binary_op(self.peek()) {
            if prec < min_prec {
                break;
            }
            self.bump();
            let rhs = self.parse_binary(prec + 1);
            let range = lhs.range().cover(rhs.range());
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                range,
            };
        }
        lhs
    }

    fn parse_unary(&mut self) -> Expr {
        let op = match self.peek() {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Bang => UnaryOp::Not,
            _ => return self.parse_postfix(),
        };
        let t = self.bump();
        let operand = self.parse_unary();
        let range = TextRange::new(t.offset, operand.range().end().max(t.range().end()));
        Expr::Unary {
            op,
            operand: Box::new(operand),
            range,
        }
    }

    fn parse_postfix(&mut self) -> Expr {
        let mut expr = self.parse_primary();
        loop {
            match self.peek() {
                TokenKind::Dot => {
                    let dot = self.bump();
                    let t = self.current();
                    match t.kind {
                        TokenKind::Ident => {
                            self.bump();
                            expr = push_step(
                                expr,
                                TraversalStepKind::Attr(SmolStr::new(t.text)),
                                TextRange::new(dot.offset, t.range().end()),
                            );
                        }
                        TokenKind::Number => {
                            self.bump();
                            // `a.0.1` lexes its indices as the single number "0.1"
                            let mut start = dot.offset;
                            let mut cursor = t.offset;
                            for part in t.text.split('.') {
                                let end = cursor + TextSize::of(part);
                                let kind = match part.parse::<i64>() {
                                    Ok(i) => {
                                        TraversalStepKind::Index(IndexKey::Literal(Value::Number(i as f64)))
                                    }
                                    Err(_) => {
                                        self.error(
                                            "legacy index must be a whole number",
                                            TextRange::new(cursor, end),
                                        );
                                        break;
                                    }
                                };
                                expr = push_step(expr, kind, TextRange::new(start, end));
                                start = end;
                                cursor = end + TextSize::new(1);
                            }
                        }
                        TokenKind::Star => {
                            self.bump();
                            expr = push_step(
                                expr,
                                TraversalStepKind::Splat,
                                TextRange::new(dot.offset, t.range().end()),
                            );
                        }
                        _ => {
                            self.error("expected attribute name after '.'", dot.range());
                            break;
                        }
                    }
                }
                TokenKind::LBracket => {
                    let open = self.bump();
                    self.nl_skip += 1;
                    let kind = if self.at(TokenKind::Star) && self.nth(1).kind == TokenKind::RBracket
                    {
                        self.bump();
                        TraversalStepKind::Splat
                    } else {
                        let key = self.parse_expr();
                        TraversalStepKind::Index(index_key(key))
                    };
                    let end = match self.expect(TokenKind::RBracket) {
                        Some(close) => close.range().end(),
                        None => self.prev_end,
                    };
                    self.nl_skip -= 1;
                    expr = push_step(expr, kind, TextRange::new(open.offset, end));
                }
                _ => break,
            }
        }
        expr
    }

    fn parse_primary(&mut self) -> Expr {
        let t = self.current();
        match t.kind {
            TokenKind::Number => {
                self.bump();
                match t.text.parse::<f64>() {
                    Ok(n) => Expr::Literal {
                        value: Value::Number(n),
                        range: t.range(),
                    },
                    Err(_) => {
                        self.error("invalid number", t.range());
                        Expr::Invalid(t.range())
                    }
                }
            }
            TokenKind::Ident => {
                let literal = match t.text {
                    "true" => Some(Value::Bool(true)),
                    "false" => Some(Value::Bool(false)),
                    "null" => Some(Value::Null),
                    _ => None,
                };
                if let Some(value) = literal {
                    self.bump();
                    return Expr::Literal {
                        value,
                        range: t.range(),
                    };
                }
                if self.nth(1).kind == TokenKind::LParen {
                    return self.parse_call();
                }
                self.bump();
                Expr::Traversal(Traversal {
                    root: SmolStr::new(t.text),
                    root_range: t.range(),
                    steps: Vec::new(),
                    range: t.range(),
                })
            }
            TokenKind::String => {
                self.bump();
                self.string_expr(t)
            }
            TokenKind::Heredoc => {
                self.bump();
                self.heredoc_expr(t)
            }
            TokenKind::LParen => {
                self.bump();
                self.nl_skip += 1;
                let inner = self.parse_expr();
                let end = match self.expect(TokenKind::RParen) {
                    Some(close) => close.range().end(),
                    None => self.prev_end,
                };
                self.nl_skip -= 1;
                Expr::Parens {
                    inner: Box::new(inner),
                    range: TextRange::new(t.offset, end),
                }
            }
            TokenKind::LBracket => self.parse_tuple(),
            TokenKind::LBrace => self.parse_object(),
            TokenKind::Newline
            | TokenKind::Eof
            | TokenKind::RBrace
            | TokenKind::RBracket
            | TokenKind::RParen
            | TokenKind::Comma
            | TokenKind::Colon => {
                self.error(
                    format!("expected expression, found {}", t.kind.describe()),
                    t.range(),
                );
                Expr::Empty(TextRange::empty(t.offset))
            }
            _ => {
                self.bump();
                self.error(
                    format!("expected expression, found {}", t.kind.describe()),
                    t.range(),
                );
                Expr::Invalid(t.range())
            }
        }
    }

    /// Comma-separated items up to `close`. Returns the end offset.
    fn parse_seq(&mut self, close: TokenKind, mut item: impl FnMut(&mut Self)) -> TextSize {
        loop {
            if let Some(t) = self.eat(close) {
                return t.range().end();
            }
            if matches!(
                self.peek(),
                TokenKind::Eof | TokenKind::RBrace | TokenKind::RBracket | TokenKind::RParen
            ) {
                let t = self.current();
                self.error(format!("expected {}", close.describe()), t.range());
                return self.prev_end;
            }
            let before = self.pos;
            item(self);
            if self.eat(TokenKind::Comma).is_some() || self.at(close) {
                continue;
            }
            let t = self.current();
            self.error(
                format!("expected ',' or {}, found {}", close.describe(), t.kind.describe()),
                t.range(),
            );
            if self.pos == before && !matches!(t.kind, TokenKind::Eof) {
                self.bump();
            }
            self.skip_until(&[TokenKind::Comma, close]);
            self.eat(TokenKind::Comma);
        }
    }

    fn parse_call(&mut self) -> Expr {
        let name = self.bump();
        self.bump();
        self.nl_skip += 1;
        let mut args = Vec::new();
        let end = self.parse_seq(TokenKind::RParen, |p| {
            args.push(p.parse_expr());
            p.eat(TokenKind::Ellipsis);
        });
        self.nl_skip -= 1;
        Expr::FunctionCall {
            name: SmolStr::new(name.text),
            name_range: name.range(),
            args,
            range: TextRange::new(name.offset, end),
        }
    }

    fn parse_tuple(&mut self) -> Expr {
        let open = self.bump();
        self.nl_skip += 1;
        let expr = if self.at_keyword("for") && self.nth(1).kind == TokenKind::Ident {
            self.parse_for(open, false)
        } else {
            let mut elements = Vec::new();
            let end = self.parse_seq(TokenKind::RBracket, |p| elements.push(p.parse_expr()));
            Expr::Tuple {
                elements,
                range: TextRange::new(open.offset, end),
            }
        };
        self.nl_skip -= 1;
        expr
    }

    fn parse_object(&mut self) -> Expr {
        let open = self.bump();
        let saved = self.nl_skip;

        self.nl_skip = 1;
        let is_for = self.at_keyword("for") && self.nth(1).kind == TokenKind::Ident;
        if is_for {
            let expr = self.parse_for(open, true);
            self.nl_skip = saved;
            return expr;
        }

        // items are separated by commas or newlines
        self.nl_skip = 0;
        let mut items = Vec::new();
        let end = loop {
            while self.eat(TokenKind::Newline).is_some() {}
            if let Some(t) = self.eat(TokenKind::RBrace) {
                break t.range().end();
            }
            if matches!(
                self.peek(),
                TokenKind::Eof | TokenKind::RBracket | TokenKind::RParen
            ) {
                self.error("unclosed object, expected '}'", open.range());
                break self.prev_end;
            }
            let before = self.pos;
            let key = self.parse_expr();
            let value = if self.eat(TokenKind::Eq).is_some() || self.eat(TokenKind::Colon).is_some() {
                match self.peek() {
                    TokenKind::Newline | TokenKind::Comma | TokenKind::RBrace => {
                        let at = self.prev_end;
                        self.error("expected expression", TextRange::empty(at));
                        Expr::Empty(TextRange::empty(at))
                    }
                    _ => self.parse_expr(),
                }
            } else {
                let t = self.current();
                self.error(
                    format!("expected '=' after object key, found {}", t.kind.describe()),
                    t.range(),
                );
                if self.pos == before {
                    self.bump();
                }
                self.skip_until(&[TokenKind::Newline, TokenKind::Comma, TokenKind::RBrace]);
                self.eat(TokenKind::Comma);
                continue;
            };
            items.push(ObjectItem { key, value });
            if self.eat(TokenKind::Comma).is_some()
                || self.at(TokenKind::Newline)
                || self.at(TokenKind::RBrace)
            {
                continue;
            }
            let t = self.current();
            self.error(
                format!("expected ',' or newline, found {}", t.kind.describe()),
                t.range(),
            );
            self.skip_until(&[TokenKind::Newline, TokenKind::Comma, TokenKind::RBrace]);
            self.eat(TokenKind::Comma);
        };
        self.nl_skip = saved;

        Expr::Object {
            items,
            range: TextRange::new(open.offset, end),
        }
    }

    fn parse_for(&mut self, open: Token<'a>, is_object: bool) -> Expr {
        let close = if is_object {
            TokenKind::RBrace
        } else {
            TokenKind::RBracket
        };
        match self.parse_for_clauses(is_object) {
            Some(mut for_expr) => {
                let end = match self.expect(close) {
                    Some(t) => t.range().end(),
                    None => {
                        self.skip_until(&[close]);
                        self.eat(close).map(|t| t.range().end()).unwrap_or(self.prev_end)
                    }
                };
                for_expr.range = TextRange::new(open.offset, end);
                Expr::For(for_expr)
            }
            None => {
                self.skip_until(&[close]);
                let end = self.eat(close).map(|t| t.range().end()).unwrap_or(self.prev_end);
                Expr::Invalid(TextRange::new(open.offset, end))
            }
        }
    }

    fn parse_for_clauses(&mut self, is_object: bool) -> Option<ForExpr> {
        self.bump();
        let first = SmolStr::new(self.expect(TokenKind::Ident)?.text);
        let (key_var, value_var) = if self.eat(TokenKind::Comma).is_some() {
            let second = SmolStr::new(self.expect(TokenKind::Ident)?.text);
            (Some(first), second)
        } else {
            (None, first)
        };
        if !self.at_keyword("in") {
            let t = self.current();
            self.error("expected 'in' in for expression", t.range());
            return None;
        }
        self.bump();
        let collection = self.parse_expr();
        self.expect(TokenKind::Colon)?;

        let key = if is_object {
            let key = self.parse_expr();
            self.expect(TokenKind::FatArrow)?;
            Some(Box::new(key))
        } else {
            None
        };
        let value = self.parse_expr();
        self.eat(TokenKind::Ellipsis);
        let cond = if self.at_keyword("if") {
            self.bump();
            Some(Box::new(self.parse_expr()))
        } else {
            None
        };

        Some(ForExpr {
            key_var,
            value_var,
            collection: Box::new(collection),
            key,
            value: Box::new(value),
            cond,
            is_object,
            range: TextRange::empty(self.prev_end),
        })
    }

    // =========================================================================
    // Strings
    // =========================================================================

    /// Inner text of a quoted string and the offset it starts at.
    fn string_content(&mut self, t: Token<'a>) -> (&'a str, TextSize) {
        let text = t.text;
        let inner = &text[1..];
        let terminated = scan_quoted(inner) == Some(inner.len());
        let content = if terminated {
            &inner[..inner.len() - 1]
        } else {
            self.error("unterminated string", t.range());
            inner
        };
        (content, t.offset + TextSize::new(1))
    }

    fn string_expr(&mut self, t: Token<'a>) -> Expr {
        let (content, offset) = self.string_content(t);
        let parts = template_parts(content, offset, true, &mut self.errors);
        template_expr(parts, t.range())
    }

    fn heredoc_expr(&mut self, t: Token<'a>) -> Expr {
        let text = t.text;
        let header_end = text.find('\n').map(|i| i + 1).unwrap_or(text.len());
        let marker = text[..header_end]
            .trim()
            .trim_start_matches("<<")
            .trim_start_matches('-');
        let last_line_start = text.rfind('\n').map(|i| i + 1).unwrap_or(text.len());

        let content = if last_line_start >= header_end && text[last_line_start..].trim() == marker {
            &text[header_end..last_line_start]
        } else {
            self.error(format!("unterminated heredoc, expected {:?}", marker), t.range());
            &text[header_end..]
        };
        let offset = t.offset + TextSize::of(&text[..header_end]);
        let parts = template_parts(content, offset, false, &mut self.errors);
        template_expr(parts, t.range())
    }
}

fn binary_op(kind: TokenKind) -> Option<(BinaryOp, u8)> {
    let op = match kind {
        TokenKind::OrOr => (BinaryOp::Or, 1),
        TokenKind::AndAnd => (BinaryOp::And, 2),
        TokenKind::EqEq => (BinaryOp::Eq, 3),
        TokenKind::NotEq => (BinaryOp::NotEq, 3),
        TokenKind::Lt => (BinaryOp::Lt, 4),
        TokenKind::LtEq => (BinaryOp::LtEq, 4),
        TokenKind::Gt => (BinaryOp::Gt, 4),
        TokenKind::GtEq => (BinaryOp::GtEq, 4),
        TokenKind::Plus => (BinaryOp::Add, 5),
        TokenKind::Minus => (BinaryOp::Sub, 5),
        TokenKind::Star => (BinaryOp::Mul, 6),
        TokenKind::Slash => (BinaryOp::Div, 6),
        TokenKind::Percent => (BinaryOp::Mod, 6),
        _ => return None,
    };
    Some(op)
}

fn index_key(key: Expr) -> IndexKey {
    match key.value() {
        Ok(value @ (Value::Number(_) | Value::String(_))) => IndexKey::Literal(value),
        _ => IndexKey::Computed(Box::new(key)),
    }
}

fn push_step(expr: Expr, kind: TraversalStepKind, range: TextRange) -> Expr {
    let step = TraversalStep { kind, range };
    match expr {
        Expr::Traversal(mut t) => {
            t.range = t.range.cover(range);
            t.steps.push(step);
            Expr::Traversal(t)
        }
        Expr::Relative {
            source,
            mut steps,
            range: prev,
        } => {
            steps.push(step);
            Expr::Relative {
                source,
                steps,
                range: prev.cover(range),
            }
        }
        other => {
            let range = other.range().cover(range);
            Expr::Relative {
                source: Box::new(other),
                steps: vec![step],
                range,
            }
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

fn literal_text(parts: &[TemplatePart]) -> Option<SmolStr> {
    let mut text = String::new();
    for part in parts {
        match part {
            TemplatePart::Literal { text: t, .. } => text.push_str(t),
            TemplatePart::Interpolation(_) => return None,
        }
    }
    Some(SmolStr::new(text))
}

fn template_expr(mut parts: Vec<TemplatePart>, range: TextRange) -> Expr {
    if let Some(text) = literal_text(&parts) {
        return Expr::Literal {
            value: Value::String(text),
            range,
        };
    }
    if parts.len() == 1 {
        if let Some(TemplatePart::Interpolation(inner)) = parts.pop() {
            return inner;
        }
    }
    Expr::Template { parts, range }
}

/// Split template text into literal and interpolated parts. Template
/// directives (`%{ ... }`) are skipped.
fn template_parts(
    content: &str,
    offset: TextSize,
    escapes: bool,
    errors: &mut Vec<SyntaxError>,
) -> Vec<TemplatePart> {
    let mut parts = Vec::new();
    let mut literal = String::new();
    let mut literal_start = 0usize;
    let at = |i: usize| offset + TextSize::new(i as u32);

    let mut i = 0;
    while i < content.len() {
        let rest = &content[i..];
        if rest.starts_with("$${") || rest.starts_with("%%{") {
            literal.push_str(&rest[1..3]);
            i += 3;
            continue;
        }
        if rest.starts_with("${") || rest.starts_with("%{") {
            let Some(len) = scan_interpolation(&rest[2..]) else {
                errors.push(SyntaxError::new(
                    "unclosed template interpolation",
                    TextRange::new(at(i), at(content.len())),
                ));
                literal.push_str(rest);
                i = content.len();
                break;
            };
            if !literal.is_empty() {
                parts.push(TemplatePart::Literal {
                    text: SmolStr::new(&literal),
                    range: TextRange::new(at(literal_start), at(i)),
                });
                literal.clear();
            }
            let inner_start = i + 2;
            let inner_end = inner_start + len - 1;
            if rest.starts_with('$') {
                let mut inner = &content[inner_start..inner_end];
                let mut inner_offset = inner_start;
                if let Some(stripped) = inner.strip_prefix('~') {
                    inner = stripped;
                    inner_offset += 1;
                }
                if let Some(stripped) = inner.strip_suffix('~') {
                    inner = stripped;
                }
                let (expr, errs) = parse_expression(inner, at(inner_offset));
                errors.extend(errs);
                if expr.is_empty() {
                    errors.push(SyntaxError::new(
                        "empty interpolation",
                        TextRange::new(at(i), at(inner_end + 1)),
                    ));
                }
                parts.push(TemplatePart::Interpolation(expr));
            }
            i = inner_end + 1;
            literal_start = i;
            continue;
        }
        if escapes && rest.starts_with('\\') {
            let (decoded, consumed) = unescape(&rest[1..]);
            match decoded {
                Some(ch) => literal.push(ch),
                None => {
                    errors.push(SyntaxError::new(
                        "invalid escape sequence",
                        TextRange::new(at(i), at(i + 1 + consumed)),
                    ));
                    literal.push_str(&rest[..1 + consumed]);
                }
            }
            i += 1 + consumed;
            continue;
        }
        match rest.chars().next() {
            Some(ch) => {
                literal.push(ch);
                i += ch.len_utf8();
            }
            None => break,
        }
    }

    if !literal.is_empty() || parts.is_empty() {
        parts.push(TemplatePart::Literal {
            text: SmolStr::new(&literal),
            range: TextRange::new(at(literal_start), at(content.len())),
        });
    }
    parts
}

/// Decode the escape sequence following a backslash. Returns the character
/// and the number of bytes consumed after the backslash.
fn unescape(rest: &str) -> (Option<char>, usize) {
    let Some(first) = rest.chars().next() else {
        return (None, 0);
    };
    let simple = match first {
        'n' => Some('\n'),
        't' => Some('\t'),
        'r' => Some('\r'),
        '"' => Some('"'),
        '\\' => Some('\\'),
        _ => None,
    };
    if let Some(ch) = simple {
        return (Some(ch), 1);
    }
    let digits = match first {
        'u' => 4,
        'U' => 8,
        _ => return (None, first.len_utf8()),
    };
    let hex = rest.get(1..1 + digits);
    let decoded = hex
        .and_then(|h| u32::from_str_radix(h, 16).ok())
        .and_then(char::from_u32);
    match decoded {
        Some(ch) => (Some(ch), 1 + digits),
        None => (None, 1),
    }
}
