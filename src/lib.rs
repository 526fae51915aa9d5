//! Compiles declarative host/distro requirement documents into SQL selection
//! filters.
//!
//! A requirement document is a boolean-expression tree over a small element
//! vocabulary (`distro_arch`, `key_value`, `and`, `or`, ...). The compiler
//! walks the tree and produces a [`compiler::CompiledFilter`]: the joins the
//! query must perform plus an optional predicate, which the
//! [`query`] module attaches to a base query for the selected entity.
//!
//! ```
//! use needproperty::{Catalog, ConditionTree, FilterCompiler};
//! use needproperty::{compiler::BaseEntity, query};
//!
//! let doc = ConditionTree::new("distro").with_child(
//!     ConditionTree::new("distro_arch")
//!         .with_attr("op", "=")
//!         .with_attr("value", "x86_64"),
//! );
//! let compiler = FilterCompiler::new(Catalog::default());
//! let filter = compiler.compile(&doc).unwrap();
//! let select = query::apply(query::base_query(compiler.catalog(), BaseEntity::Distro), &filter);
//! assert!(query::render(&select).contains("x86_64"));
//! ```

pub mod catalog;
pub mod compiler;
pub mod node;
pub mod query;
pub mod tree;

pub use catalog::{Catalog, CatalogError};
pub use compiler::{
    BaseEntity, CompileError, CompiledFilter, CompilerConfig, FilterCompiler, JoinClause,
};
pub use node::{NodeKind, Operator};
pub use tree::{AttributeTypeError, ConditionTree, NodeContent};
