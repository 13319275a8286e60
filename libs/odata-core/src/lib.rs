pub mod ast {
    use std::fmt;
    use uuid::Uuid;

    #[derive(Clone, Debug, PartialEq)]
    pub enum Expr {
        Compare(Box<Expr>, CompareOperator, Box<Expr>),
        /// Lambda over a collection property: `collection/any(var:predicate)`.
        Any {
            collection: String,
            var: String,
            predicate: Box<Expr>,
        },
        Identifier(String),
        Value(Value),
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum CompareOperator {
        Eq,
        Ne,
    }

    #[derive(Clone, Debug, PartialEq)]
    pub enum Value {
        Number(i64),
        Uuid(Uuid),
    }

    impl Expr {
        pub fn ident(name: impl Into<String>) -> Self {
            Expr::Identifier(name.into())
        }

        pub fn value(v: Value) -> Self {
            Expr::Value(v)
        }

        pub fn compare(left: Expr, op: CompareOperator, right: Expr) -> Self {
            Expr::Compare(Box::new(left), op, Box::new(right))
        }

        pub fn any(collection: impl Into<String>, var: impl Into<String>, predicate: Expr) -> Self {
            Expr::Any {
                collection: collection.into(),
                var: var.into(),
                predicate: Box::new(predicate),
            }
        }
    }

    impl Value {
        /// Parse a GUID literal. OData renders GUIDs unquoted, so anything that
        /// does not parse cannot be used as a GUID operand.
        pub fn guid(raw: &str) -> Result<Self, crate::Error> {
            Uuid::parse_str(raw.trim())
                .map(Value::Uuid)
                .map_err(|_| crate::Error::InvalidGuid(raw.to_string()))
        }
    }

    impl fmt::Display for CompareOperator {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let s = match self {
                CompareOperator::Eq => "eq",
                CompareOperator::Ne => "ne",
            };
            f.write_str(s)
        }
    }

    impl fmt::Display for Value {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Value::Number(n) => write!(f, "{n}"),
                Value::Uuid(u) => write!(f, "{u}"),
            }
        }
    }

    impl fmt::Display for Expr {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Expr::Compare(l, op, r) => write!(f, "{l} {op} {r}"),
                Expr::Any {
                    collection,
                    var,
                    predicate,
                } => write!(f, "{collection}/any({var}:{predicate})"),
                Expr::Identifier(s) => f.write_str(s),
                Expr::Value(v) => write!(f, "{v}"),
            }
        }
    }
}

pub mod page;
pub use page::{Page, PageInfo, PageRequest};

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("not a GUID literal: {0}")]
    InvalidGuid(String),
}

/// A `$filter` expression. `None` means the collection is queried unfiltered.
#[derive(Clone, Debug, Default)]
pub struct ODataQuery(pub Option<Box<ast::Expr>>);

impl ODataQuery {
    pub fn some(expr: ast::Expr) -> Self {
        Self(Some(Box::new(expr)))
    }
    pub fn as_ast(&self) -> Option<&ast::Expr> {
        self.0.as_deref()
    }
    /// Render the expression as `$filter` text.
    pub fn to_filter_string(&self) -> Option<String> {
        self.as_ast().map(|e| e.to_string())
    }
}
