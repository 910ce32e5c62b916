use crate::proto;
use crate::types::{ConsistencyLevel, IndexOperator, SlicePredicate, SliceRange, DEFAULT_CONSISTENCY_LEVEL};

/// Default number of rows an indexed query returns.
pub const DEFAULT_ROW_COUNT: i32 = 100;

/// One condition of a secondary-index query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexExpression {
    pub column_name: Vec<u8>,
    pub op: IndexOperator,
    pub value: Vec<u8>,
}

impl From<IndexExpression> for proto::IndexExpression {
    fn from(val: IndexExpression) -> Self {
        proto::IndexExpression {
            column_name: val.column_name,
            op: val.op.into(),
            value: val.value,
        }
    }
}

/// A query over rows of a column family selected through secondary indexes.
///
/// At least one expression must use [`IndexOperator::Eq`] on an indexed
/// column; the server rejects the query otherwise.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexedSlicesQuery {
    column_family: String,
    expressions: Vec<IndexExpression>,
    predicate: SlicePredicate,
    start_key: Vec<u8>,
    row_count: i32,
    consistency_level: ConsistencyLevel,
}

impl IndexedSlicesQuery {
    /// Creates a query returning up to 100 columns of up to 100 rows.
    pub fn new(column_family: impl Into<String>) -> Self {
        Self {
            column_family: column_family.into(),
            expressions: Vec::new(),
            predicate: SlicePredicate::Range(SliceRange::all(100)),
            start_key: Vec::new(),
            row_count: DEFAULT_ROW_COUNT,
            consistency_level: DEFAULT_CONSISTENCY_LEVEL,
        }
    }

    pub fn add_expression(mut self, column_name: impl Into<Vec<u8>>, op: IndexOperator, value: impl Into<Vec<u8>>) -> Self {
        self.expressions.push(IndexExpression {
            column_name: column_name.into(),
            op,
            value: value.into(),
        });
        self
    }

    pub fn add_eq(self, column_name: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        self.add_expression(column_name, IndexOperator::Eq, value)
    }

    /// Returns only the named columns of each matching row.
    pub fn with_column_names<I, N>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<Vec<u8>>,
    {
        self.predicate = SlicePredicate::names(names);
        self
    }

    /// Returns the columns of each matching row that fall in `range`.
    pub fn with_range(mut self, range: SliceRange) -> Self {
        self.predicate = SlicePredicate::Range(range);
        self
    }

    /// Starts scanning at this row key (inclusive).
    pub fn with_start_key(mut self, start_key: impl Into<Vec<u8>>) -> Self {
        self.start_key = start_key.into();
        self
    }

    pub fn with_row_count(mut self, row_count: i32) -> Self {
        self.row_count = row_count;
        self
    }

    pub fn with_consistency_level(mut self, level: ConsistencyLevel) -> Self {
        self.consistency_level = level;
        self
    }

    pub fn column_family(&self) -> &str {
        &self.column_family
    }

    pub fn expressions(&self) -> &[IndexExpression] {
        &self.expressions
    }

    pub fn consistency_level(&self) -> ConsistencyLevel {
        self.consistency_level
    }

    pub fn predicate(&self) -> &SlicePredicate {
        &self.predicate
    }

    pub(crate) fn into_request(self) -> proto::GetIndexedSlicesRequest {
        proto::GetIndexedSlicesRequest {
            column_parent: Some(proto::ColumnParent {
                column_family: self.column_family,
                super_column: None,
            }),
            index_clause: Some(proto::IndexClause {
                expressions: self.expressions.into_iter().map(Into::into).collect(),
                start_key: self.start_key,
                count: self.row_count,
            }),
            predicate: Some(self.predicate.into()),
            consistency_level: self.consistency_level.into(),
        }
    }
}
