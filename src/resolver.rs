//! `$ref` resolution - follows reference hops to a concrete schema fragment.

use std::collections::HashSet;

use crate::error::ReferenceError;
use crate::schema::{SchemaNode, SchemaStore};

/// The hops followed from a starting node to its non-`$ref` target.
#[derive(Debug, Clone)]
pub struct ReferenceChain {
    hops: Vec<String>,
    target: SchemaNode,
}

impl ReferenceChain {
    /// `$ref` values in the order they were followed. Empty when the start had no `$ref`.
    pub fn hops(&self) -> &[String] {
        &self.hops
    }

    pub fn target(&self) -> &SchemaNode {
        &self.target
    }

    pub fn into_target(self) -> SchemaNode {
        self.target
    }
}

/// Resolve `node` to the first fragment without a `$ref`.
///
/// # Errors
///
/// Returns `ReferenceError::Cyclic` if a fragment is revisited, or whatever
/// the store reports for an unresolvable reference.
pub fn resolve(node: &SchemaNode, store: &dyn SchemaStore) -> Result<SchemaNode, ReferenceError> {
    resolve_chain(node, store).map(ReferenceChain::into_target)
}

/// Like [`resolve`], keeping the list of hops.
pub fn resolve_chain(
    node: &SchemaNode,
    store: &dyn SchemaStore,
) -> Result<ReferenceChain, ReferenceError> {
    let mut visited = HashSet::new();
    let mut hops = Vec::new();
    let mut trail = vec![node.absolute_pointer()];
    visited.insert(node.absolute_pointer());

    let mut current = node.clone();
    while let Some(reference) = current.reference() {
        let next = store.resolve(reference, current.document())?;
        hops.push(reference.to_string());

        let key = next.absolute_pointer();
        trail.push(key.clone());
        if !visited.insert(key) {
            return Err(ReferenceError::Cyclic { chain: trail });
        }
        current = next;
    }

    tracing::trace!(
        start = %node.absolute_pointer(),
        hops = hops.len(),
        "resolved reference chain"
    );
    Ok(ReferenceChain {
        hops,
        target: current,
    })
}
