//! Filter expressions, ordering directives, and join predicates.

use crate::field::Value;

/// Comparison operators available in filters and join predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// `=`
    Eq,
    /// `<>`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl CompareOp {
    /// The SQL rendering of this operator.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }
}

/// One `(column, operator, value)` predicate.
///
/// Filters appended to a query are AND-combined in append order, and their
/// values are always bound as parameters, never interpolated into the SQL
/// text.
#[derive(Debug, Clone)]
pub struct Filter {
    pub(crate) column: String,
    pub(crate) op: CompareOp,
    pub(crate) value: Value,
}

impl Filter {
    /// An arbitrary comparison predicate.
    #[must_use]
    pub fn new(column: impl Into<String>, op: CompareOp, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            op,
            value: value.into(),
        }
    }

    /// column = value
    #[must_use]
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, CompareOp::Eq, value)
    }

    /// column <> value
    #[must_use]
    pub fn ne(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, CompareOp::Ne, value)
    }

    /// column < value
    #[must_use]
    pub fn lt(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, CompareOp::Lt, value)
    }

    /// column <= value
    #[must_use]
    pub fn le(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, CompareOp::Le, value)
    }

    /// column > value
    #[must_use]
    pub fn gt(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, CompareOp::Gt, value)
    }

    /// column >= value
    #[must_use]
    pub fn ge(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column, CompareOp::Ge, value)
    }
}

/// An ORDER BY directive. Bare column names convert to ascending order.
#[derive(Debug, Clone)]
pub struct Order {
    pub(crate) column: String,
    pub(crate) descending: bool,
}

impl Order {
    /// Ascending order on a column.
    #[must_use]
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: false,
        }
    }

    /// Descending order on a column.
    #[must_use]
    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: true,
        }
    }
}

impl From<&str> for Order {
    fn from(column: &str) -> Self {
        Self::asc(column)
    }
}

impl From<String> for Order {
    fn from(column: String) -> Self {
        Self::asc(column)
    }
}

/// A schema-qualified column reference used in join predicates.
#[derive(Debug, Clone)]
pub struct ColumnRef {
    pub(crate) table: String,
    pub(crate) column: String,
}

impl ColumnRef {
    /// Reference `table.column`.
    #[must_use]
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }
}

impl<T: Into<String>, C: Into<String>> From<(T, C)> for ColumnRef {
    fn from((table, column): (T, C)) -> Self {
        Self::new(table, column)
    }
}

/// A join predicate comparing two schema-qualified columns.
///
/// Both sides name their table explicitly; the query refuses predicates
/// whose table is not part of the join or whose column is undeclared, so a
/// column name shared by both schemas can never be resolved by guesswork.
#[derive(Debug, Clone)]
pub struct JoinOn {
    pub(crate) left: ColumnRef,
    pub(crate) op: CompareOp,
    pub(crate) right: ColumnRef,
}

impl JoinOn {
    /// An arbitrary column-to-column predicate.
    #[must_use]
    pub fn new(left: impl Into<ColumnRef>, op: CompareOp, right: impl Into<ColumnRef>) -> Self {
        Self {
            left: left.into(),
            op,
            right: right.into(),
        }
    }

    /// left.column = right.column
    #[must_use]
    pub fn eq(left: impl Into<ColumnRef>, right: impl Into<ColumnRef>) -> Self {
        Self::new(left, CompareOp::Eq, right)
    }
}
