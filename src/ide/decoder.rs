//! Decoder and PathContext: the document set and its query snapshots.
//!
//! The `Decoder` owns the schema and every parsed file behind a lock and
//! hands out `PathContext` snapshots for querying. A snapshot never
//! observes later edits, so a batch of queries sees one consistent state.
//!
//! ## Usage
//!
//! ```ignore
//! let decoder = Decoder::new();
//! decoder.set_schema(schema);
//! decoder.set_file_content("main.hcl", "a = var.b\n");
//!
//! let ctx = decoder.path_context()?;
//! let targets = ctx.collect_reference_targets(&cancel, "main.hcl")?;
//! ```

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use tracing::debug;

use super::DecodeError;
use super::path_context::PathContext;
use crate::parser::SyntaxError;
use crate::schema::BodySchema;
use crate::syntax::{Body, SyntaxFile};

/// Owns the schema and the document set.
///
/// All methods take `&self`; edits and snapshots may come from different
/// threads.
#[derive(Default)]
pub struct Decoder {
    state: RwLock<DecoderState>,
}

#[derive(Default)]
struct DecoderState {
    schema: Option<Arc<BodySchema>>,
    /// Parsed files in insertion order
    files: IndexMap<SmolStr, Arc<SyntaxFile>>,
    /// Root bodies lowered under the current schema
    bodies: FxHashMap<SmolStr, Arc<Body>>,
}

impl Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the root schema, replacing any previous one.
    pub fn set_schema(&self, schema: BodySchema) {
        let mut state = self.state.write();
        state.schema = Some(Arc::new(schema));
        // JSON bodies depend on the schema
        state.bodies.clear();
    }

    /// Parse and store a file, picking the format from its name.
    ///
    /// Returns the parse errors, if any.
    pub fn set_file_content(&self, name: &str, content: &str) -> Vec<SyntaxError> {
        self.insert(SyntaxFile::new(name, content))
    }

    /// Parse and store a JSON file regardless of its name.
    pub fn set_json_content(&self, name: &str, content: &str) -> Vec<SyntaxError> {
        self.insert(SyntaxFile::json(name, content))
    }

    fn insert(&self, file: SyntaxFile) -> Vec<SyntaxError> {
        let errors = file.errors().to_vec();
        let name = SmolStr::new(file.name());
        debug!("[DECODER] set {} ({} errors)", name, errors.len());

        let mut state = self.state.write();
        state.bodies.remove(&name);
        state.files.insert(name, Arc::new(file));
        errors
    }

    /// Remove a file. Returns whether it was present.
    pub fn remove_file(&self, name: &str) -> bool {
        let mut state = self.state.write();
        state.bodies.remove(name);
        state.files.shift_remove(name).is_some()
    }

    pub fn has_file(&self, name: &str) -> bool {
        self.state.read().files.contains_key(name)
    }

    pub fn file_count(&self) -> usize {
        self.state.read().files.len()
    }

    /// File names in insertion order.
    pub fn file_names(&self) -> Vec<SmolStr> {
        self.state.read().files.keys().cloned().collect()
    }

    /// Parse errors of a file, plus JSON lowering errors under the schema.
    pub fn diagnostics(&self, name: &str) -> Result<Vec<SyntaxError>, DecodeError> {
        let state = self.state.read();
        let schema = state.schema.as_ref().ok_or(DecodeError::NoSchema)?;
        let file = state
            .files
            .get(name)
            .ok_or_else(|| DecodeError::FileNotFound(name.to_string()))?;
        Ok(file.diagnostics(schema))
    }

    /// Get a consistent snapshot for querying.
    ///
    /// Bodies not lowered since the last edit are lowered first.
    pub fn path_context(&self) -> Result<PathContext, DecodeError> {
        let mut state = self.state.write();
        let schema = state.schema.clone().ok_or(DecodeError::NoSchema)?;

        let DecoderState { files, bodies, .. } = &mut *state;
        let snapshot: IndexMap<SmolStr, Arc<Body>> = files
            .iter()
            .map(|(name, file)| {
                let body = bodies
                    .entry(name.clone())
                    .or_insert_with(|| Arc::new(file.body(&schema).into_owned()));
                (name.clone(), Arc::clone(body))
            })
            .collect();

        Ok(PathContext::new(schema, snapshot))
    }
}
