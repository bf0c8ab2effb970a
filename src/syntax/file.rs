//! Syntax file wrapper for parsed native and JSON files.
//!
//! Native files carry their body directly. JSON files keep the raw JSON tree
//! and are lowered into a body on demand, since the shape of that body
//! depends on the schema.

use std::borrow::Cow;

use smol_str::SmolStr;

use super::ast::Body;
use super::json::lower_json;
use crate::parser::{JsonValue, SyntaxError, parse, parse_json};
use crate::schema::BodySchema;

/// File format type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Native,
    Json,
}

impl FileFormat {
    /// Pick the format from a file name: `.json` files are JSON.
    pub fn from_name(name: &str) -> Self {
        if name.ends_with(".json") {
            FileFormat::Json
        } else {
            FileFormat::Native
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Syntax {
    Native(Body),
    Json(JsonValue),
}

/// A parsed syntax file.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxFile {
    name: SmolStr,
    syntax: Syntax,
    errors: Vec<SyntaxError>,
}

impl SyntaxFile {
    /// Parse `source`, picking the format from `name`.
    pub fn new(name: impl Into<SmolStr>, source: &str) -> Self {
        let name = name.into();
        match FileFormat::from_name(&name) {
            FileFormat::Native => Self::native(name, source),
            FileFormat::Json => Self::json(name, source),
        }
    }

    /// Create a native syntax file
    pub fn native(name: impl Into<SmolStr>, source: &str) -> Self {
        let parse = parse(source);
        Self {
            name: name.into(),
            syntax: Syntax::Native(parse.body),
            errors: parse.errors,
        }
    }

    /// Create a JSON syntax file
    pub fn json(name: impl Into<SmolStr>, source: &str) -> Self {
        let (value, errors) = parse_json(source);
        Self {
            name: name.into(),
            syntax: Syntax::Json(value),
            errors,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn format(&self) -> FileFormat {
        match self.syntax {
            Syntax::Native(_) => FileFormat::Native,
            Syntax::Json(_) => FileFormat::Json,
        }
    }

    /// The root body as seen under `schema`.
    pub fn body(&self, schema: &BodySchema) -> Cow<'_, Body> {
        match &self.syntax {
            Syntax::Native(body) => Cow::Borrowed(body),
            Syntax::Json(value) => Cow::Owned(lower_json(value, schema).0),
        }
    }

    /// Check if parsing had errors
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Get parse errors
    pub fn errors(&self) -> &[SyntaxError] {
        &self.errors
    }

    /// Parse errors plus any found while lowering a JSON file under `schema`.
    pub fn diagnostics(&self, schema: &BodySchema) -> Vec<SyntaxError> {
        let mut errors = self.errors.clone();
        if let Syntax::Json(value) = &self.syntax {
            errors.extend(lower_json(value, schema).1);
        }
        errors
    }
}
