//! Read-only query snapshot over the decoder's document set.

use std::sync::Arc;

use indexmap::IndexMap;
use rayon::prelude::*;
use smol_str::SmolStr;
use text_size::TextSize;
use tokio_util::sync::CancellationToken;

use super::DecodeError;
use crate::hir::{self, Origin, Origins, Targets};
use crate::schema::BodySchema;
use crate::syntax::Body;
use crate::ty::Type;

/// Immutable view of one schema and the bodies lowered under it.
///
/// Cheap to clone; every query is a pure function of the snapshot.
#[derive(Debug, Clone)]
pub struct PathContext {
    schema: Arc<BodySchema>,
    bodies: IndexMap<SmolStr, Arc<Body>>,
}

impl PathContext {
    pub(super) fn new(schema: Arc<BodySchema>, bodies: IndexMap<SmolStr, Arc<Body>>) -> Self {
        Self { schema, bodies }
    }

    pub fn schema(&self) -> &BodySchema {
        &self.schema
    }

    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.bodies.keys().map(SmolStr::as_str)
    }

    /// Root body of a file as seen under the schema.
    pub fn body(&self, file: &str) -> Result<&Body, DecodeError> {
        self.bodies
            .get(file)
            .map(|body| &**body)
            .ok_or_else(|| DecodeError::FileNotFound(file.to_string()))
    }

    // =========================================================================
    // Collection
    // =========================================================================

    pub fn collect_reference_targets(
        &self,
        cancel: &CancellationToken,
        file: &str,
    ) -> Result<Targets, DecodeError> {
        let body = self.body(file)?;
        Ok(hir::collect_reference_targets(file, body, &self.schema, cancel)?)
    }

    pub fn collect_reference_origins(
        &self,
        cancel: &CancellationToken,
        file: &str,
    ) -> Result<Origins, DecodeError> {
        let body = self.body(file)?;
        Ok(hir::collect_reference_origins(file, body, &self.schema, cancel)?)
    }

    /// Targets of every file, collected in parallel and concatenated in
    /// file order.
    pub fn collect_all_targets(&self, cancel: &CancellationToken) -> Result<Targets, DecodeError> {
        let per_file = self
            .bodies
            .iter()
            .collect::<Vec<_>>()
            .into_par_iter()
            .map(|(file, body)| hir::collect_reference_targets(file, body, &self.schema, cancel))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(per_file.into_iter().flatten().collect())
    }

    /// Origins of every file, collected in parallel, sorted by file and
    /// offset.
    pub fn collect_all_origins(&self, cancel: &CancellationToken) -> Result<Origins, DecodeError> {
        let per_file = self
            .bodies
            .iter()
            .collect::<Vec<_>>()
            .into_par_iter()
            .map(|(file, body)| hir::collect_reference_origins(file, body, &self.schema, cancel))
            .collect::<Result<Vec<_>, _>>()?;
        let mut origins: Origins = per_file.into_iter().flatten().collect();
        origins.sort();
        Ok(origins)
    }

    // =========================================================================
    // Position queries
    // =========================================================================

    pub fn reference_origin_at_pos(
        &self,
        file: &str,
        pos: TextSize,
    ) -> Result<Option<Origin>, DecodeError> {
        let body = self.body(file)?;
        Ok(hir::reference_origin_at_pos(file, body, &self.schema, pos))
    }

    /// Targets, in any file, that the origin at `pos` refers to.
    pub fn reference_targets_for_origin_at_pos(
        &self,
        cancel: &CancellationToken,
        file: &str,
        pos: TextSize,
    ) -> Result<Targets, DecodeError> {
        let Some(origin) = self.reference_origin_at_pos(file, pos)? else {
            return Ok(Targets::default());
        };
        Ok(self.collect_all_targets(cancel)?.match_origin(&origin))
    }

    /// Origins, in any file, referring to the innermost target at `pos`.
    pub fn reference_origins_targeting_pos(
        &self,
        cancel: &CancellationToken,
        file: &str,
        pos: TextSize,
    ) -> Result<Origins, DecodeError> {
        let targets = self.collect_reference_targets(cancel, file)?;
        let Some(target) = targets.innermost_at_pos(file, pos) else {
            return Ok(Origins::default());
        };
        Ok(self.collect_all_origins(cancel)?.targeting(target))
    }

    /// Inferred type of the attribute expression at `pos`.
    pub fn type_at_pos(&self, file: &str, pos: TextSize) -> Result<Option<Type>, DecodeError> {
        let body = self.body(file)?;
        Ok(hir::type_at_pos(file, body, &self.schema, pos))
    }
}
