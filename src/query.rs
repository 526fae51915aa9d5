//! Query applier boundary: attaches a compiled filter to a base query and
//! renders it. Used identically for the distro-selection pass and the
//! host-selection pass.

use crate::catalog::Catalog;
use crate::compiler::{BaseEntity, CompiledFilter};
use sea_query::{
    Alias, Asterisk, JoinType, PostgresQueryBuilder, SelectStatement,
};

/// Base query for one entity type: `SELECT * FROM <base>` plus the catalog's
/// static lookup joins (left joins, so rows without a lookup row survive
/// until a predicate says otherwise).
pub fn base_query(catalog: &Catalog, entity: BaseEntity) -> SelectStatement {
    let (base, lookups) = match entity {
        BaseEntity::Host => (&catalog.host, &catalog.host_joins),
        BaseEntity::Distro => (&catalog.distro, &catalog.distro_joins),
    };
    let mut select = SelectStatement::new();
    select.column(Asterisk).from(Alias::new(&base.table));
    for lookup in lookups {
        select.join(
            JoinType::LeftJoin,
            Alias::new(&lookup.table),
            lookup.left.expr().equals(lookup.right.idens()),
        );
    }
    select
}

/// Attach a compiled filter: joins in declaration order (a key/value alias
/// join must appear before predicates referencing it), then the predicate if
/// one was contributed. A `None` predicate leaves the query's WHERE clause
/// untouched; join-only filters are still meaningful as existence checks.
pub fn apply(mut select: SelectStatement, filter: &CompiledFilter) -> SelectStatement {
    for join in &filter.joins {
        select.join_as(
            JoinType::InnerJoin,
            Alias::new(&join.table),
            Alias::new(&join.alias),
            join.on.clone(),
        );
    }
    if let Some(predicate) = &filter.predicate {
        select.and_where(predicate.clone());
    }
    select
}

/// Render to SQL text.
pub fn render(select: &SelectStatement) -> String {
    select.to_string(PostgresQueryBuilder)
}
