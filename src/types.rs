use crate::error::{Error, Result};
use crate::proto;
use crate::proto::column_or_super_column::Kind;
use crate::timestamp::create_timestamp;

// Re-export proto types that are part of the public API
pub use crate::proto::{ConsistencyLevel, IndexOperator, TokenRange};

/// Consistency level used whenever a caller does not pick one.
pub const DEFAULT_CONSISTENCY_LEVEL: ConsistencyLevel = ConsistencyLevel::Quorum;

/// A named value stored in a row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Column {
    pub name: Vec<u8>,
    pub value: Vec<u8>,
    /// Write time in microseconds; the store keeps the value with the highest timestamp.
    pub timestamp: i64,
    /// Time to live in seconds, if the column should expire.
    pub ttl: Option<i32>,
}

impl Column {
    /// Creates a column stamped with the current time.
    pub fn new(name: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            timestamp: create_timestamp(),
            ttl: None,
        }
    }

    pub fn with_ttl(mut self, ttl: i32) -> Self {
        self.ttl = Some(ttl);
        self
    }
}

impl From<Column> for proto::Column {
    fn from(val: Column) -> Self {
        proto::Column {
            name: val.name,
            value: val.value,
            timestamp: val.timestamp,
            ttl: val.ttl,
        }
    }
}

impl From<proto::Column> for Column {
    fn from(val: proto::Column) -> Self {
        Column {
            name: val.name,
            value: val.value,
            timestamp: val.timestamp,
            ttl: val.ttl,
        }
    }
}

/// A named group of columns inside a row of a super column family.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SuperColumn {
    pub name: Vec<u8>,
    pub columns: Vec<Column>,
}

impl From<SuperColumn> for proto::SuperColumn {
    fn from(val: SuperColumn) -> Self {
        proto::SuperColumn {
            name: val.name,
            columns: val.columns.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<proto::SuperColumn> for SuperColumn {
    fn from(val: proto::SuperColumn) -> Self {
        SuperColumn {
            name: val.name,
            columns: val.columns.into_iter().map(Into::into).collect(),
        }
    }
}

/// A read result: either a plain column or a super column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ColumnOrSuperColumn {
    Column(Column),
    SuperColumn(SuperColumn),
}

impl ColumnOrSuperColumn {
    pub fn into_column(self) -> Option<Column> {
        match self {
            Self::Column(column) => Some(column),
            Self::SuperColumn(_) => None,
        }
    }

    pub fn into_super_column(self) -> Option<SuperColumn> {
        match self {
            Self::SuperColumn(super_column) => Some(super_column),
            Self::Column(_) => None,
        }
    }
}

impl TryFrom<proto::ColumnOrSuperColumn> for ColumnOrSuperColumn {
    type Error = Error;

    fn try_from(val: proto::ColumnOrSuperColumn) -> Result<Self> {
        match val.kind {
            Some(Kind::Column(column)) => Ok(Self::Column(column.into())),
            Some(Kind::SuperColumn(super_column)) => Ok(Self::SuperColumn(super_column.into())),
            None => Err(Error::InvalidValue("empty column or super column".to_string())),
        }
    }
}

/// Keeps only the plain columns of a read result.
pub(crate) fn column_list(values: Vec<proto::ColumnOrSuperColumn>) -> Vec<Column> {
    values
        .into_iter()
        .filter_map(|cosc| match cosc.kind {
            Some(Kind::Column(column)) => Some(column.into()),
            _ => None,
        })
        .collect()
}

/// Keeps only the super columns of a read result.
pub(crate) fn super_column_list(values: Vec<proto::ColumnOrSuperColumn>) -> Vec<SuperColumn> {
    values
        .into_iter()
        .filter_map(|cosc| match cosc.kind {
            Some(Kind::SuperColumn(super_column)) => Some(super_column.into()),
            _ => None,
        })
        .collect()
}

/// Where a column is written: a column family, optionally inside a super column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnParent {
    pub column_family: String,
    pub super_column: Option<Vec<u8>>,
}

impl ColumnParent {
    pub fn new(column_family: impl Into<String>) -> Self {
        Self {
            column_family: column_family.into(),
            super_column: None,
        }
    }

    pub fn with_super_column(mut self, super_column: impl Into<Vec<u8>>) -> Self {
        self.super_column = Some(super_column.into());
        self
    }
}

impl From<ColumnParent> for proto::ColumnParent {
    fn from(val: ColumnParent) -> Self {
        proto::ColumnParent {
            column_family: val.column_family,
            super_column: val.super_column,
        }
    }
}

/// Address of a column, a super column, or a whole row within a column family.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnPath {
    pub column_family: String,
    pub super_column: Option<Vec<u8>>,
    pub column: Option<Vec<u8>>,
}

impl ColumnPath {
    /// Path naming the whole row of a column family.
    pub fn new(column_family: impl Into<String>) -> Self {
        Self {
            column_family: column_family.into(),
            super_column: None,
            column: None,
        }
    }

    pub fn column(column_family: impl Into<String>, column: impl Into<Vec<u8>>) -> Self {
        Self::new(column_family).with_column(column)
    }

    pub fn super_column(column_family: impl Into<String>, super_column: impl Into<Vec<u8>>) -> Self {
        Self::new(column_family).with_super_column(super_column)
    }

    pub fn with_column(mut self, column: impl Into<Vec<u8>>) -> Self {
        self.column = Some(column.into());
        self
    }

    pub fn with_super_column(mut self, super_column: impl Into<Vec<u8>>) -> Self {
        self.super_column = Some(super_column.into());
        self
    }
}

impl From<ColumnPath> for proto::ColumnPath {
    fn from(val: ColumnPath) -> Self {
        proto::ColumnPath {
            column_family: val.column_family,
            super_column: val.super_column,
            column: val.column,
        }
    }
}

/// A contiguous range of column names.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SliceRange {
    /// First column name; empty means the beginning of the row.
    pub start: Vec<u8>,
    /// Last column name; empty means the end of the row.
    pub finish: Vec<u8>,
    pub reversed: bool,
    /// Maximum number of columns returned.
    pub count: i32,
}

impl SliceRange {
    pub fn new(start: impl Into<Vec<u8>>, finish: impl Into<Vec<u8>>, count: i32) -> Self {
        Self {
            start: start.into(),
            finish: finish.into(),
            reversed: false,
            count,
        }
    }

    /// The first `count` columns of the row.
    pub fn all(count: i32) -> Self {
        Self::new(Vec::new(), Vec::new(), count)
    }

    pub fn reversed(mut self) -> Self {
        self.reversed = true;
        self
    }
}

impl From<SliceRange> for proto::SliceRange {
    fn from(val: SliceRange) -> Self {
        proto::SliceRange {
            start: val.start,
            finish: val.finish,
            reversed: val.reversed,
            count: val.count,
        }
    }
}

/// Which columns of a row a read returns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SlicePredicate {
    /// Exactly these column names.
    ColumnNames(Vec<Vec<u8>>),
    /// Every column within a name range.
    Range(SliceRange),
}

impl SlicePredicate {
    pub fn names<I, N>(names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<Vec<u8>>,
    {
        Self::ColumnNames(names.into_iter().map(Into::into).collect())
    }
}

impl From<SlicePredicate> for proto::SlicePredicate {
    fn from(val: SlicePredicate) -> Self {
        match val {
            SlicePredicate::ColumnNames(column_names) => proto::SlicePredicate {
                column_names,
                slice_range: None,
            },
            SlicePredicate::Range(range) => proto::SlicePredicate {
                column_names: Vec::new(),
                slice_range: Some(range.into()),
            },
        }
    }
}

/// Rows selected by a range read, bounded either by keys or by tokens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyRange {
    Keys {
        start: Vec<u8>,
        end: Vec<u8>,
        count: i32,
    },
    Tokens {
        start: String,
        end: String,
        count: i32,
    },
}

impl KeyRange {
    pub fn keys(start: impl Into<Vec<u8>>, end: impl Into<Vec<u8>>, count: i32) -> Self {
        Self::Keys {
            start: start.into(),
            end: end.into(),
            count,
        }
    }

    pub fn tokens(start: impl Into<String>, end: impl Into<String>, count: i32) -> Self {
        Self::Tokens {
            start: start.into(),
            end: end.into(),
            count,
        }
    }
}

impl From<KeyRange> for proto::KeyRange {
    fn from(val: KeyRange) -> Self {
        match val {
            KeyRange::Keys { start, end, count } => proto::KeyRange {
                start_key: Some(start),
                end_key: Some(end),
                start_token: None,
                end_token: None,
                count,
            },
            KeyRange::Tokens { start, end, count } => proto::KeyRange {
                start_key: None,
                end_key: None,
                start_token: Some(start),
                end_token: Some(end),
                count,
            },
        }
    }
}

/// Encodes an integer column value (8 bytes, big-endian).
pub fn encode_long(value: i64) -> Vec<u8> {
    value.to_be_bytes().to_vec()
}

/// Decodes an integer column value written by [`encode_long`].
pub fn decode_long(bytes: &[u8]) -> Result<i64> {
    let buf: [u8; 8] = bytes
        .try_into()
        .map_err(|_| Error::InvalidValue(format!("expected 8 bytes for a long, got {}", bytes.len())))?;
    Ok(i64::from_be_bytes(buf))
}
