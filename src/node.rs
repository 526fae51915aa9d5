//! Node kind registry and the comparison operator vocabulary.

use sea_query::{Expr, SimpleExpr, Value};

/// The closed set of condition element kinds. Element names resolve through
/// a static table; anything unrecognized becomes `Unknown`, which compiles to
/// no joins and no predicate. Unknown elements are a deliberate no-op so that
/// documents carrying forward-compatible elements still compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Host,
    Distro,
    DistroArch,
    DistroFamily,
    DistroTag,
    DistroVariant,
    DistroName,
    KeyValue,
    And,
    Or,
    Power,
    Unknown,
}

impl NodeKind {
    /// Exact-match lookup from element name to kind.
    pub fn resolve(name: &str) -> Self {
        match name {
            "host" => Self::Host,
            "distro" => Self::Distro,
            "distro_arch" => Self::DistroArch,
            "distro_family" => Self::DistroFamily,
            "distro_tag" => Self::DistroTag,
            "distro_variant" => Self::DistroVariant,
            "distro_name" => Self::DistroName,
            "key_value" => Self::KeyValue,
            "and" => Self::And,
            "or" => Self::Or,
            "power" => Self::Power,
            _ => Self::Unknown,
        }
    }
}

/// Comparison operators recognized in `op` attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl Operator {
    /// Parse an operator token. `=` and `==` are synonyms; any token outside
    /// the six-token vocabulary is `None` (the compiler turns that into
    /// `CompileError::UnknownOperator`).
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "=" | "==" => Some(Self::Eq),
            "!=" => Some(Self::Ne),
            ">" => Some(Self::Gt),
            ">=" => Some(Self::Ge),
            "<" => Some(Self::Lt),
            "<=" => Some(Self::Le),
            _ => None,
        }
    }

    /// Apply the operator to a column expression and a literal value.
    pub fn apply(self, col: Expr, value: Value) -> SimpleExpr {
        match self {
            Self::Eq => col.eq(value),
            Self::Ne => col.ne(value),
            Self::Gt => col.gt(value),
            Self::Ge => col.gte(value),
            Self::Lt => col.lt(value),
            Self::Le => col.lte(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_query::Alias;

    #[test]
    fn test_resolve_known_names() {
        assert_eq!(NodeKind::resolve("host"), NodeKind::Host);
        assert_eq!(NodeKind::resolve("distro_arch"), NodeKind::DistroArch);
        assert_eq!(NodeKind::resolve("key_value"), NodeKind::KeyValue);
        assert_eq!(NodeKind::resolve("and"), NodeKind::And);
        assert_eq!(NodeKind::resolve("or"), NodeKind::Or);
        assert_eq!(NodeKind::resolve("power"), NodeKind::Power);
    }

    #[test]
    fn test_resolve_unrecognized_is_unknown() {
        assert_eq!(NodeKind::resolve("hypervisor"), NodeKind::Unknown);
        assert_eq!(NodeKind::resolve(""), NodeKind::Unknown);
        // Case-sensitive, exact match only.
        assert_eq!(NodeKind::resolve("Host"), NodeKind::Unknown);
    }

    #[test]
    fn test_operator_vocabulary() {
        assert_eq!(Operator::parse("="), Some(Operator::Eq));
        assert_eq!(Operator::parse("=="), Some(Operator::Eq));
        assert_eq!(Operator::parse("!="), Some(Operator::Ne));
        assert_eq!(Operator::parse(">"), Some(Operator::Gt));
        assert_eq!(Operator::parse(">="), Some(Operator::Ge));
        assert_eq!(Operator::parse("<"), Some(Operator::Lt));
        assert_eq!(Operator::parse("<="), Some(Operator::Le));
    }

    #[test]
    fn test_operator_rejects_foreign_tokens() {
        for token in ["===", "=>", "<>", "like", "in", "!", ""] {
            assert_eq!(Operator::parse(token), None, "token {token:?}");
        }
    }

    #[test]
    fn test_apply_builds_comparison() {
        let expr = Operator::Ge.apply(
            Expr::col((Alias::new("kv_0"), Alias::new("key_value"))),
            "4096".into(),
        );
        let expected =
            Expr::col((Alias::new("kv_0"), Alias::new("key_value"))).gte(Value::from("4096"));
        assert_eq!(expr, expected);
    }
}
