//! Syntax tree for configuration bodies and expressions.
//!
//! Both the native parser and the JSON lowering produce these types, so the
//! semantic layer only ever sees one representation.

use smol_str::SmolStr;
use text_size::{TextRange, TextSize};

use crate::base::{Address, Step};
use crate::ty::Value;

// ============================================================================
// BODIES
// ============================================================================

/// A sequence of attributes and blocks, in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub items: Vec<BodyItem>,
    /// For block bodies this spans the braces; for the root body, the file.
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BodyItem {
    Attribute(Attribute),
    Block(Block),
}

impl BodyItem {
    pub fn range(&self) -> TextRange {
        match self {
            BodyItem::Attribute(attr) => attr.range,
            BodyItem::Block(block) => block.range,
        }
    }
}

impl Body {
    pub fn new(items: Vec<BodyItem>, range: TextRange) -> Self {
        Self { items, range }
    }

    pub fn empty(range: TextRange) -> Self {
        Self::new(Vec::new(), range)
    }

    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.items.iter().filter_map(|item| match item {
            BodyItem::Attribute(attr) => Some(attr),
            BodyItem::Block(_) => None,
        })
    }

    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.items.iter().filter_map(|item| match item {
            BodyItem::Block(block) => Some(block),
            BodyItem::Attribute(_) => None,
        })
    }

    /// Find an attribute by name. The first occurrence wins.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes().find(|attr| attr.name == name)
    }

    /// Offset of the opening brace (or file start for the root body).
    pub fn open_offset(&self) -> TextSize {
        self.range.start()
    }
}

/// `name = expr`
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: SmolStr,
    pub name_range: TextRange,
    pub expr: Expr,
    pub range: TextRange,
}

/// `type "label" label2 { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub ty: SmolStr,
    pub ty_range: TextRange,
    pub labels: Vec<Label>,
    pub body: Body,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub value: SmolStr,
    pub range: TextRange,
}

impl Block {
    /// Range of the block header: type name through the last label.
    pub fn def_range(&self) -> TextRange {
        match self.labels.last() {
            Some(label) => self.ty_range.cover(label.range),
            None => self.ty_range,
        }
    }

    pub fn label(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(|l| l.value.as_str())
    }

    pub fn label_values(&self) -> Vec<&str> {
        self.labels.iter().map(|l| l.value.as_str()).collect()
    }
}

// ============================================================================
// EXPRESSIONS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl BinaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Or => "||",
            BinaryOp::And => "&&",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

/// A piece of a quoted template.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplatePart {
    Literal { text: SmolStr, range: TextRange },
    Interpolation(Expr),
}

/// Variable traversal rooted at a name: `var.foo[0].bar`.
#[derive(Debug, Clone, PartialEq)]
pub struct Traversal {
    pub root: SmolStr,
    pub root_range: TextRange,
    pub steps: Vec<TraversalStep>,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TraversalStep {
    pub kind: TraversalStepKind,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TraversalStepKind {
    /// `.name`
    Attr(SmolStr),
    /// `[key]` or legacy `.0`
    Index(IndexKey),
    /// `[*]` or `.*`
    Splat,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IndexKey {
    Literal(Value),
    /// A key only known at evaluation time, e.g. `foo[var.i]`
    Computed(Box<Expr>),
}

/// One `key = value` item of an object constructor.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectItem {
    pub key: Expr,
    pub value: Expr,
}

impl ObjectItem {
    pub fn range(&self) -> TextRange {
        self.key.range().cover(self.value.range())
    }
}

/// `[for k, v in coll : v]` or `{for k, v in coll : k => v}`
#[derive(Debug, Clone, PartialEq)]
pub struct ForExpr {
    pub key_var: Option<SmolStr>,
    pub value_var: SmolStr,
    pub collection: Box<Expr>,
    pub key: Option<Box<Expr>>,
    pub value: Box<Expr>,
    pub cond: Option<Box<Expr>>,
    pub is_object: bool,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal {
        value: Value,
        range: TextRange,
    },
    Template {
        parts: Vec<TemplatePart>,
        range: TextRange,
    },
    Traversal(Traversal),
    /// Traversal steps applied to something other than a variable.
    Relative {
        source: Box<Expr>,
        steps: Vec<TraversalStep>,
        range: TextRange,
    },
    Tuple {
        elements: Vec<Expr>,
        range: TextRange,
    },
    Object {
        items: Vec<ObjectItem>,
        range: TextRange,
    },
    FunctionCall {
        name: SmolStr,
        name_range: TextRange,
        args: Vec<Expr>,
        range: TextRange,
    },
    For(ForExpr),
    Conditional {
        cond: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
        range: TextRange,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        range: TextRange,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        range: TextRange,
    },
    Parens {
        inner: Box<Expr>,
        range: TextRange,
    },
    /// Placeholder for an expression not (yet) written.
    Empty(TextRange),
    /// Expression that failed to parse.
    Invalid(TextRange),
}

impl Expr {
    pub fn range(&self) -> TextRange {
        match self {
            Expr::Literal { range, .. }
            | Expr::Template { range, .. }
            | Expr::Relative { range, .. }
            | Expr::Tuple { range, .. }
            | Expr::Object { range, .. }
            | Expr::FunctionCall { range, .. }
            | Expr::Conditional { range, .. }
            | Expr::Binary { range, .. }
            | Expr::Unary { range, .. }
            | Expr::Parens { range, .. } => *range,
            Expr::Traversal(t) => t.range,
            Expr::For(f) => f.range,
            Expr::Empty(range) | Expr::Invalid(range) => *range,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Expr::Empty(_))
    }

    /// The expression as a variable traversal, looking through parentheses.
    pub fn as_traversal(&self) -> Option<&Traversal> {
        match self {
            Expr::Traversal(t) => Some(t),
            Expr::Parens { inner, .. } => inner.as_traversal(),
            _ => None,
        }
    }

    /// A bare identifier like `foo`, used by keywords and attribute values.
    pub fn as_keyword(&self) -> Option<&str> {
        match self.as_traversal() {
            Some(t) if t.steps.is_empty() => Some(&t.root),
            _ => None,
        }
    }

    /// Name of an object key: a bare identifier or anything evaluating to a string.
    pub fn as_object_key(&self) -> Option<SmolStr> {
        match self {
            Expr::Traversal(t) if t.steps.is_empty() => Some(t.root.clone()),
            _ => match self.value() {
                Ok(Value::String(s)) => Some(s),
                _ => None,
            },
        }
    }

    /// Collect every variable traversal contained in the expression, in
    /// source order. Variables introduced by enclosing `for` expressions are
    /// local and left out.
    pub fn variables(&self) -> Vec<&Traversal> {
        let mut out = Vec::new();
        collect_variables(self, &mut Vec::new(), &mut out);
        out
    }
}

fn collect_variables<'a>(expr: &'a Expr, locals: &mut Vec<SmolStr>, out: &mut Vec<&'a Traversal>) {
    match expr {
        Expr::Traversal(t) => {
            if !locals.contains(&t.root) {
                out.push(t);
            }
            collect_step_variables(&t.steps, locals, out);
        }
        Expr::Relative { source, steps, .. } => {
            collect_variables(source, locals, out);
            collect_step_variables(steps, locals, out);
        }
        Expr::Template { parts, .. } => {
            for part in parts {
                if let TemplatePart::Interpolation(inner) = part {
                    collect_variables(inner, locals, out);
                }
            }
        }
        Expr::Tuple { elements, .. } => {
            for elem in elements {
                collect_variables(elem, locals, out);
            }
        }
        Expr::Object { items, .. } => {
            for item in items {
                // bare identifier keys are names, not variables
                if !matches!(&item.key, Expr::Traversal(t) if t.steps.is_empty()) {
                    collect_variables(&item.key, locals, out);
                }
                collect_variables(&item.value, locals, out);
            }
        }
        Expr::FunctionCall { args, .. } => {
            for arg in args {
                collect_variables(arg, locals, out);
            }
        }
        Expr::For(f) => {
            collect_variables(&f.collection, locals, out);
            let before = locals.len();
            locals.extend(f.key_var.iter().cloned());
            locals.push(f.value_var.clone());
            if let Some(key) = &f.key {
                collect_variables(key, locals, out);
            }
            collect_variables(&f.value, locals, out);
            if let Some(cond) = &f.cond {
                collect_variables(cond, locals, out);
            }
            locals.truncate(before);
        }
        Expr::Conditional {
            cond,
            then,
            otherwise,
            ..
        } => {
            collect_variables(cond, locals, out);
            collect_variables(then, locals, out);
            collect_variables(otherwise, locals, out);
        }
        Expr::Binary { lhs, rhs, .. } => {
            collect_variables(lhs, locals, out);
            collect_variables(rhs, locals, out);
        }
        Expr::Unary { operand, .. } => collect_variables(operand, locals, out),
        Expr::Parens { inner, .. } => collect_variables(inner, locals, out),
        Expr::Literal { .. } | Expr::Empty(_) | Expr::Invalid(_) => {}
    }
}

fn collect_step_variables<'a>(
    steps: &'a [TraversalStep],
    locals: &mut Vec<SmolStr>,
    out: &mut Vec<&'a Traversal>,
) {
    for step in steps {
        if let TraversalStepKind::Index(IndexKey::Computed(key)) = &step.kind {
            collect_variables(key, locals, out);
        }
    }
}

// ============================================================================
// ADDRESSES
// ============================================================================

impl Traversal {
    /// Convert to an [`Address`].
    ///
    /// Fails on splats, computed keys and indexes that are not whole numbers.
    pub fn address(&self) -> Option<Address> {
        let mut steps = Vec::with_capacity(self.steps.len() + 1);
        steps.push(Step::root(self.root.clone()));
        for step in &self.steps {
            let step = match &step.kind {
                TraversalStepKind::Attr(name) => Step::attr(name.clone()),
                TraversalStepKind::Index(IndexKey::Literal(Value::String(key))) => {
                    Step::key(key.clone())
                }
                TraversalStepKind::Index(IndexKey::Literal(value)) => Step::index(value.as_integer()?),
                TraversalStepKind::Index(IndexKey::Computed(_)) | TraversalStepKind::Splat => {
                    return None;
                }
            };
            steps.push(step);
        }
        Some(Address::new(steps))
    }
}
