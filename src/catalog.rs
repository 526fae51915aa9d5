//! Column/table catalog: tells the compiler which concrete columns and
//! tables each condition family maps to, so it is retargetable to any
//! relational layout satisfying the same logical joins.
//!
//! Loadable from a JSON file; `Catalog::default()` mirrors the lab inventory
//! schema (system/distro/arch/osversion/osmajor/distro_tag/key_value).

use sea_query::{Alias, Expr};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog file not found: {0}")]
    NotFound(String),
    #[error("failed to read catalog file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse catalog file {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

/// A table-qualified column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRef {
    pub table: String,
    pub column: String,
}

impl ColumnRef {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }

    /// The column as a sea-query expression, for use as a comparison operand.
    pub fn expr(&self) -> Expr {
        Expr::col(self.idens())
    }

    /// The column as an ident pair, for use as a join target.
    pub fn idens(&self) -> (Alias, Alias) {
        (Alias::new(&self.table), Alias::new(&self.column))
    }
}

/// A static join the base query performs so that scalar condition columns
/// are reachable (e.g. `arch` for `distro_arch` conditions).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupJoin {
    pub table: String,
    pub left: ColumnRef,
    pub right: ColumnRef,
}

/// The table and id column of a base entity (host or distro).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseTable {
    pub table: String,
    pub id_column: String,
}

impl BaseTable {
    /// The base entity's identifier column, which key/value aliases bind to.
    pub fn id(&self) -> ColumnRef {
        ColumnRef::new(&self.table, &self.id_column)
    }
}

/// Schema of the multi-valued key/value lookup table. Each `key_value`
/// condition joins this table under a fresh alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValueTable {
    pub table: String,
    pub fk_column: String,
    pub key_column: String,
    pub value_column: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub host: BaseTable,
    pub distro: BaseTable,
    pub distro_arch: ColumnRef,
    pub distro_family: ColumnRef,
    pub distro_tag: ColumnRef,
    pub distro_variant: ColumnRef,
    pub distro_name: ColumnRef,
    pub key_value: KeyValueTable,
    /// Lookup joins attached to the host base query.
    #[serde(default)]
    pub host_joins: Vec<LookupJoin>,
    /// Lookup joins attached to the distro base query.
    #[serde(default)]
    pub distro_joins: Vec<LookupJoin>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            host: BaseTable {
                table: "system".to_string(),
                id_column: "id".to_string(),
            },
            distro: BaseTable {
                table: "distro".to_string(),
                id_column: "id".to_string(),
            },
            distro_arch: ColumnRef::new("arch", "arch"),
            distro_family: ColumnRef::new("osmajor", "osmajor"),
            distro_tag: ColumnRef::new("distro_tag", "tag"),
            distro_variant: ColumnRef::new("distro", "variant"),
            distro_name: ColumnRef::new("distro", "name"),
            key_value: KeyValueTable {
                table: "key_value".to_string(),
                fk_column: "system_id".to_string(),
                key_column: "key_name".to_string(),
                value_column: "key_value".to_string(),
            },
            host_joins: vec![],
            distro_joins: vec![
                LookupJoin {
                    table: "arch".to_string(),
                    left: ColumnRef::new("distro", "arch_id"),
                    right: ColumnRef::new("arch", "id"),
                },
                LookupJoin {
                    table: "osversion".to_string(),
                    left: ColumnRef::new("distro", "osversion_id"),
                    right: ColumnRef::new("osversion", "id"),
                },
                LookupJoin {
                    table: "osmajor".to_string(),
                    left: ColumnRef::new("osversion", "osmajor_id"),
                    right: ColumnRef::new("osmajor", "id"),
                },
                LookupJoin {
                    table: "distro_tag_map".to_string(),
                    left: ColumnRef::new("distro", "id"),
                    right: ColumnRef::new("distro_tag_map", "distro_id"),
                },
                LookupJoin {
                    table: "distro_tag".to_string(),
                    left: ColumnRef::new("distro_tag", "id"),
                    right: ColumnRef::new("distro_tag_map", "distro_tag_id"),
                },
            ],
        }
    }
}

impl Catalog {
    /// Load a catalog from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path_ref = path.as_ref();
        if !path_ref.exists() {
            return Err(CatalogError::NotFound(path_ref.display().to_string()));
        }
        let content = fs::read_to_string(path_ref).map_err(|e| CatalogError::Io {
            path: path_ref.display().to_string(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(|e| CatalogError::Parse {
            path: path_ref.display().to_string(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_catalog_schema() {
        let catalog = Catalog::default();
        assert_eq!(catalog.host.table, "system");
        assert_eq!(catalog.distro.table, "distro");
        assert_eq!(catalog.distro_arch, ColumnRef::new("arch", "arch"));
        assert_eq!(catalog.key_value.fk_column, "system_id");
        assert!(catalog.host_joins.is_empty());
        assert_eq!(catalog.distro_joins.len(), 5);
    }

    #[test]
    fn test_load_valid_json_catalog() {
        let temp_file = "test_catalog_valid.json";
        let json = serde_json::to_string_pretty(&Catalog::default()).unwrap();
        let mut file = fs::File::create(temp_file).unwrap();
        write!(file, "{json}").unwrap();

        let loaded = Catalog::from_json_file(temp_file).unwrap();
        assert_eq!(loaded, Catalog::default());

        fs::remove_file(temp_file).ok();
    }

    #[test]
    fn test_invalid_json_catalog() {
        let temp_file = "test_catalog_invalid.json";
        let mut file = fs::File::create(temp_file).unwrap();
        writeln!(file, "not json").unwrap();

        let result = Catalog::from_json_file(temp_file);
        assert!(matches!(result, Err(CatalogError::Parse { .. })));

        fs::remove_file(temp_file).ok();
    }

    #[test]
    fn test_missing_catalog_file() {
        let result = Catalog::from_json_file("no_such_catalog.json");
        assert!(matches!(result, Err(CatalogError::NotFound(_))));
    }
}
