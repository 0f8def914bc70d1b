//! The generation pass: turns a `oneOf` schema node into a [`UnionType`].

use serde_json::Value;

use crate::compiler::{ObjectTypeCompiler, TypeCompiler};
use crate::descriptor::VariantDescriptor;
use crate::error::GenerationError;
use crate::naming::{DefaultNamingPolicy, NameRegistry, NamingPolicy, Namespace};
use crate::resolver::resolve;
use crate::schema::{FileSchemaStore, SchemaDocument, SchemaNode, SchemaStore};
use crate::types::GenerateOptions;
use crate::union::UnionType;

/// Generate the union for an in-memory schema whose root holds the `oneOf`.
///
/// Uses the default store, compiler, and naming policy with a fresh run.
/// External file references resolve against the working directory.
///
/// # Errors
///
/// See [`UnionGenerator::generate`].
pub fn generate_union(
    schema: &Value,
    field_name: &str,
    options: &GenerateOptions,
) -> Result<UnionType, GenerationError> {
    let store = FileSchemaStore::new();
    let compiler = ObjectTypeCompiler::new();
    let naming = DefaultNamingPolicy::new(options);
    let document = SchemaDocument::inline(schema.clone());

    UnionGenerator::new(&store, &compiler, &naming).generate(
        field_name,
        &document.root_node(),
        &mut GenerationRun::new(),
    )
}

/// State shared by every union generated in one run: declared type names and
/// anonymous branch counters.
#[derive(Debug, Clone, Default)]
pub struct GenerationRun {
    namespace: Namespace,
    registry: NameRegistry,
}

impl GenerationRun {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a run whose destination already holds `namespace`.
    pub fn with_namespace(namespace: Namespace) -> Self {
        Self {
            namespace,
            registry: NameRegistry::new(),
        }
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }
}

/// Generates union types with the given collaborators.
pub struct UnionGenerator<'a> {
    store: &'a dyn SchemaStore,
    compiler: &'a dyn TypeCompiler,
    naming: &'a dyn NamingPolicy,
}

impl<'a> UnionGenerator<'a> {
    pub fn new(
        store: &'a dyn SchemaStore,
        compiler: &'a dyn TypeCompiler,
        naming: &'a dyn NamingPolicy,
    ) -> Self {
        Self {
            store,
            compiler,
            naming,
        }
    }

    /// Generate the union for the `oneOf` at `node`, named after `field_name`.
    ///
    /// The wrapper name is declared first, then one variant per branch in
    /// declaration order. On error `run` is left as it was.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError` for a missing or empty `oneOf`, a branch that
    /// is not object-typed, an unresolvable reference, or a name the type
    /// compiler finds already declared.
    pub fn generate(
        &self,
        field_name: &str,
        node: &SchemaNode,
        run: &mut GenerationRun,
    ) -> Result<UnionType, GenerationError> {
        let branches = node.one_of().ok_or_else(|| GenerationError::NotOneOf {
            pointer: node.absolute_pointer(),
        })?;
        if branches.is_empty() {
            return Err(GenerationError::EmptyOneOf {
                pointer: node.absolute_pointer(),
            });
        }

        let mut scratch = run.clone();

        let name = scratch
            .namespace
            .make_unique(&self.naming.type_name(field_name));
        if !scratch.namespace.declare(&name) {
            return Err(GenerationError::DuplicateVariant { name });
        }

        let variants = branches
            .iter()
            .map(|branch| self.variant(field_name, branch, &mut scratch))
            .collect::<Result<Vec<_>, _>>()?;

        let union = UnionType::new(name, variants);
        for (tag, names) in union.tag_collisions() {
            tracing::warn!(
                union = union.name(),
                tag = %tag,
                variants = ?names,
                "oneOf options share an enum tag"
            );
        }

        *run = scratch;
        tracing::debug!(union = union.name(), variants = union.len(), "generated oneOf union");
        Ok(union)
    }

    fn variant(
        &self,
        field_name: &str,
        branch: &SchemaNode,
        run: &mut GenerationRun,
    ) -> Result<VariantDescriptor, GenerationError> {
        let (candidate, target) = match branch.reference() {
            Some(reference) => {
                let target = resolve(branch, self.store)?;
                (self.naming.type_name(reference_name(reference)), target)
            }
            None => {
                let index = run.registry.next_index(field_name);
                let numbered = format!("{}{}", field_name, index);
                (self.naming.type_name(&numbered), branch.clone())
            }
        };

        if !target.is_object_typed() {
            return Err(GenerationError::NonObjectBranch {
                pointer: target.absolute_pointer(),
                actual: target.type_label(),
            });
        }

        let name = run.namespace.make_unique(&candidate);
        let handle = self.compiler.compile(&name, &target, &mut run.namespace)?;
        let descriptor = VariantDescriptor::from_handle(handle, self.naming);
        tracing::debug!(
            branch = branch.pointer(),
            type_name = descriptor.type_name(),
            tag = descriptor.tag_name(),
            "compiled oneOf option"
        );
        Ok(descriptor)
    }
}

/// Last path segment of a reference: `#/definitions/dog` and `pets/dog.json` give `dog`.
fn reference_name(reference: &str) -> &str {
    let trimmed = reference.trim_end_matches(['#', '/']);
    let segment = trimmed.rsplit('/').next().unwrap_or(trimmed);
    let segment = segment.trim_start_matches('#');
    segment.strip_suffix(".json").unwrap_or(segment)
}
