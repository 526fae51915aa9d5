//! The predicate compiler: walks a condition tree and produces a composable
//! query filter, a list of required joins plus an optional boolean predicate.
//!
//! Compilation is pure over its input tree. The only mutable state is the
//! alias allocator, which is constructed fresh for every top-level `compile`
//! call so concurrent compiles never share counters.

use crate::catalog::{Catalog, ColumnRef};
use crate::node::{NodeKind, Operator};
use crate::tree::{AttributeTypeError, ConditionTree};
use sea_query::{Alias, Expr, SimpleExpr, Value};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompileError {
    /// Operator token outside the recognized vocabulary. Fatal: a malformed
    /// condition cannot be ignored without weakening the filter.
    #[error("unknown operator `{0}`")]
    UnknownOperator(String),
    #[error(transparent)]
    AttributeType(#[from] AttributeTypeError),
    /// Recursion guard tripped on a pathologically deep document.
    #[error("condition tree exceeds the maximum depth of {0}")]
    TreeTooDeep(usize),
}

/// The record type a document selects over, chosen by its root element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseEntity {
    Host,
    Distro,
}

impl BaseEntity {
    /// A `distro` root selects distributions; everything else, including an
    /// unrecognized root, falls back to the host entity.
    pub fn of_root(name: &str) -> Self {
        match NodeKind::resolve(name) {
            NodeKind::Distro => Self::Distro,
            _ => Self::Host,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompilerConfig {
    /// Maximum nesting depth accepted before compilation aborts.
    pub max_depth: usize,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self { max_depth: 64 }
    }
}

/// A join the compiled filter requires: `table` bound under `alias` with the
/// given ON condition.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    pub table: String,
    pub alias: String,
    pub on: SimpleExpr,
}

/// Result of compiling one subtree. A `None` predicate means the subtree
/// contributed no constraint; callers must not turn it into a vacuous
/// true/false.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledFilter {
    pub joins: Vec<JoinClause>,
    pub predicate: Option<SimpleExpr>,
}

impl CompiledFilter {
    pub fn empty() -> Self {
        Self {
            joins: Vec::new(),
            predicate: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.joins.is_empty() && self.predicate.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    And,
    Or,
}

/// Fold child results into one filter: joins concatenated in document order
/// (never de-duplicated or reordered, since a join must precede predicates
/// referencing its alias), non-null predicates folded under the combinator.
/// Zero non-null predicates fold to `None`, not to a vacuous constant.
pub fn compose(children: Vec<CompiledFilter>, combinator: Combinator) -> CompiledFilter {
    let mut joins = Vec::new();
    let mut predicates = Vec::new();
    for child in children {
        joins.extend(child.joins);
        if let Some(predicate) = child.predicate {
            predicates.push(predicate);
        }
    }
    let predicate = predicates.into_iter().reduce(|acc, next| match combinator {
        Combinator::And => acc.and(next),
        Combinator::Or => acc.or(next),
    });
    CompiledFilter { joins, predicate }
}

/// Mints fresh join aliases for tables that may be referenced more than once
/// within a single document. Scoped to one compile session: two independent
/// compiles both start their counters at zero.
#[derive(Debug, Default)]
pub struct AliasAllocator {
    counters: HashMap<String, usize>,
}

impl AliasAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next alias for a table family, `<family>_<n>` with `n` counting from
    /// zero. Every call increments, regardless of which branch of the tree
    /// asked, so two occurrences never collide on an alias.
    pub fn next_alias(&mut self, family: &str) -> String {
        let counter = self.counters.entry(family.to_string()).or_insert(0);
        let alias = format!("{family}_{counter}");
        *counter += 1;
        alias
    }
}

/// Per-compile state: the entity the document's root selected and the alias
/// counters for this invocation.
struct Session {
    entity: BaseEntity,
    aliases: AliasAllocator,
}

/// Compiles condition trees against a column/table catalog.
pub struct FilterCompiler {
    catalog: Catalog,
    config: CompilerConfig,
}

impl FilterCompiler {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            config: CompilerConfig::default(),
        }
    }

    pub fn with_config(catalog: Catalog, config: CompilerConfig) -> Self {
        Self { catalog, config }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Compile a whole document. The root element name picks the base entity.
    pub fn compile(&self, tree: &ConditionTree) -> Result<CompiledFilter, CompileError> {
        self.compile_for(BaseEntity::of_root(tree.name()), tree)
    }

    /// Compile a tree against an explicit base entity.
    pub fn compile_for(
        &self,
        entity: BaseEntity,
        tree: &ConditionTree,
    ) -> Result<CompiledFilter, CompileError> {
        let mut session = Session {
            entity,
            aliases: AliasAllocator::new(),
        };
        self.compile_node(tree, &mut session, 0)
    }

    fn compile_node(
        &self,
        node: &ConditionTree,
        session: &mut Session,
        depth: usize,
    ) -> Result<CompiledFilter, CompileError> {
        if depth >= self.config.max_depth {
            return Err(CompileError::TreeTooDeep(self.config.max_depth));
        }
        match NodeKind::resolve(node.name()) {
            // Structural roots behave as an implicit AND over their children.
            NodeKind::Host | NodeKind::Distro | NodeKind::And => {
                self.compile_group(node, Combinator::And, session, depth)
            }
            NodeKind::Or => self.compile_group(node, Combinator::Or, session, depth),
            NodeKind::DistroArch => self.compile_scalar(node, &self.catalog.distro_arch),
            NodeKind::DistroFamily => self.compile_scalar(node, &self.catalog.distro_family),
            NodeKind::DistroTag => self.compile_scalar(node, &self.catalog.distro_tag),
            NodeKind::DistroVariant => self.compile_scalar(node, &self.catalog.distro_variant),
            NodeKind::DistroName => self.compile_scalar(node, &self.catalog.distro_name),
            NodeKind::KeyValue => self.compile_key_value(node, session),
            // Power is a capability marker checked by the allocation layer,
            // not expressible as a relational predicate. Unknown elements are
            // forward-compatible no-ops.
            NodeKind::Power | NodeKind::Unknown => Ok(CompiledFilter::empty()),
        }
    }

    fn compile_group(
        &self,
        node: &ConditionTree,
        combinator: Combinator,
        session: &mut Session,
        depth: usize,
    ) -> Result<CompiledFilter, CompileError> {
        let mut children = Vec::new();
        for child in node.elements() {
            children.push(self.compile_node(child, session, depth + 1)?);
        }
        Ok(compose(children, combinator))
    }

    /// Single-column comparison against the catalog's column for this
    /// condition family. A missing `value` makes the condition inert;
    /// presence is checked before the operator token is validated.
    fn compile_scalar(
        &self,
        node: &ConditionTree,
        column: &ColumnRef,
    ) -> Result<CompiledFilter, CompileError> {
        let Some(value) = node.attr_str("value") else {
            return Ok(CompiledFilter::empty());
        };
        let op = self.operator_of(node)?;
        Ok(CompiledFilter {
            joins: Vec::new(),
            predicate: Some(op.apply(column.expr(), Value::from(value))),
        })
    }

    /// Multi-valued key/value lookup. Requires `key`, `op` and `value` all
    /// present; the same underlying table may be referenced several times in
    /// one document, so each occurrence joins under a fresh alias.
    fn compile_key_value(
        &self,
        node: &ConditionTree,
        session: &mut Session,
    ) -> Result<CompiledFilter, CompileError> {
        let (Some(key), Some(op_token), Some(value)) = (
            node.attr_str("key"),
            node.attr_str("op"),
            node.attr_str("value"),
        ) else {
            return Ok(CompiledFilter::empty());
        };
        let op = Operator::parse(op_token)
            .ok_or_else(|| CompileError::UnknownOperator(op_token.to_string()))?;

        let kv = &self.catalog.key_value;
        let alias = session.aliases.next_alias(&kv.table);
        let base = match session.entity {
            BaseEntity::Host => &self.catalog.host,
            BaseEntity::Distro => &self.catalog.distro,
        };

        let on = Expr::col((Alias::new(&alias), Alias::new(&kv.fk_column)))
            .equals(base.id().idens());
        let predicate = Expr::col((Alias::new(&alias), Alias::new(&kv.key_column)))
            .eq(Value::from(key))
            .and(op.apply(
                Expr::col((Alias::new(&alias), Alias::new(&kv.value_column))),
                Value::from(value),
            ));

        Ok(CompiledFilter {
            joins: vec![JoinClause {
                table: kv.table.clone(),
                alias,
                on,
            }],
            predicate: Some(predicate),
        })
    }

    fn operator_of(&self, node: &ConditionTree) -> Result<Operator, CompileError> {
        let token = node.attr_str("op").unwrap_or("=");
        Operator::parse(token).ok_or_else(|| CompileError::UnknownOperator(token.to_string()))
    }
}
