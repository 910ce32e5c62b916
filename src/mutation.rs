//! Batch mutations.
//!
//! A batch is a [`MutationsMap`]: row key, then column family, then the
//! ordered list of [`Mutation`]s applied to that row. Plain column inserts
//! each become their own mutation. Super column inserts that target the same
//! `(row key, column family, super column)` are merged into one mutation
//! carrying all of their columns; the merged mutation moves to the end of the
//! list every time a column is added to it.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tracing::debug;

use crate::error::Result;
use crate::proto;
use crate::proto::column_or_super_column::Kind;
use crate::types::{Column, ConsistencyLevel, SuperColumn, DEFAULT_CONSISTENCY_LEVEL};

/// Row key -> column family -> mutations, in application order.
pub type MutationsMap = BTreeMap<Vec<u8>, BTreeMap<String, Vec<Mutation>>>;

/// A single pending change to one row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mutation {
    Column(Column),
    SuperColumn(SuperColumn),
}

impl Mutation {
    pub fn as_column(&self) -> Option<&Column> {
        match self {
            Self::Column(column) => Some(column),
            Self::SuperColumn(_) => None,
        }
    }

    pub fn as_super_column(&self) -> Option<&SuperColumn> {
        match self {
            Self::SuperColumn(super_column) => Some(super_column),
            Self::Column(_) => None,
        }
    }
}

impl From<Mutation> for proto::Mutation {
    fn from(val: Mutation) -> Self {
        let kind = match val {
            Mutation::Column(column) => Kind::Column(column.into()),
            Mutation::SuperColumn(super_column) => Kind::SuperColumn(super_column.into()),
        };
        proto::Mutation {
            column_or_supercolumn: Some(proto::ColumnOrSuperColumn { kind: Some(kind) }),
        }
    }
}

/// Converts a mutation map into its wire form, keeping row, column family and mutation order.
pub fn mutation_rows(mutations: MutationsMap) -> Vec<proto::RowMutations> {
    mutations
        .into_iter()
        .map(|(key, per_cf)| proto::RowMutations {
            key,
            column_families: per_cf
                .into_iter()
                .map(|(column_family, list)| proto::ColumnFamilyMutations {
                    column_family,
                    mutations: list.into_iter().map(Into::into).collect(),
                })
                .collect(),
        })
        .collect()
}

/// Insert of a plain column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnInsert {
    pub column_family: String,
    pub key: Vec<u8>,
    pub name: Vec<u8>,
    pub value: Vec<u8>,
}

impl ColumnInsert {
    pub fn new(
        column_family: impl Into<String>,
        key: impl Into<Vec<u8>>,
        name: impl Into<Vec<u8>>,
        value: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            column_family: column_family.into(),
            key: key.into(),
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Insert of a column nested in a super column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SuperColumnInsert {
    pub column_family: String,
    pub key: Vec<u8>,
    pub super_column: Vec<u8>,
    pub name: Vec<u8>,
    pub value: Vec<u8>,
}

impl SuperColumnInsert {
    pub fn new(
        column_family: impl Into<String>,
        key: impl Into<Vec<u8>>,
        super_column: impl Into<Vec<u8>>,
        name: impl Into<Vec<u8>>,
        value: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            column_family: column_family.into(),
            key: key.into(),
            super_column: super_column.into(),
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Accumulates inserts into a [`MutationsMap`].
#[derive(Clone, Debug, Default)]
pub struct MutationBatch {
    mutations: MutationsMap,
}

impl MutationBatch {
    pub fn new() -> Self {
        Self::default()
    }

    fn mutation_list(&mut self, key: Vec<u8>, column_family: String) -> &mut Vec<Mutation> {
        self.mutations.entry(key).or_default().entry(column_family).or_default()
    }

    /// Appends a new column mutation for the row.
    pub fn add_column(&mut self, insert: ColumnInsert) {
        let column = Column::new(insert.name, insert.value);
        self.mutation_list(insert.key, insert.column_family)
            .push(Mutation::Column(column));
    }

    /// Adds a column to the row's mutation for `insert.super_column`, creating
    /// it if needed, and moves that mutation to the end of the list.
    pub fn add_super_column(&mut self, insert: SuperColumnInsert) {
        let list = self.mutation_list(insert.key, insert.column_family);
        let existing = list.iter().position(|m| {
            matches!(m, Mutation::SuperColumn(sc) if sc.name == insert.super_column)
        });
        let mut super_column = match existing.map(|idx| list.remove(idx)) {
            Some(Mutation::SuperColumn(super_column)) => super_column,
            _ => SuperColumn {
                name: insert.super_column,
                columns: Vec::new(),
            },
        };
        super_column.columns.push(Column::new(insert.name, insert.value));
        list.push(Mutation::SuperColumn(super_column));
    }

    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    pub fn mutations(&self) -> &MutationsMap {
        &self.mutations
    }

    pub fn into_mutations(self) -> MutationsMap {
        self.mutations
    }
}

/// Builds the mutation map for one batch. Column inserts are applied first,
/// then super column inserts, each in input order.
pub fn build_mutations(
    columns: impl IntoIterator<Item = ColumnInsert>,
    super_columns: impl IntoIterator<Item = SuperColumnInsert>,
) -> MutationsMap {
    let mut batch = MutationBatch::new();
    for column in columns {
        batch.add_column(column);
    }
    for super_column in super_columns {
        batch.add_super_column(super_column);
    }
    batch.into_mutations()
}

/// Receives finished batches. Implemented by [`crate::CassandraClient`].
#[async_trait]
pub trait MutationSubmitter: Send + Sync {
    async fn submit_mutations(&self, mutations: MutationsMap, level: ConsistencyLevel) -> Result<()>;
}

/// Builds a batch from column and super column inserts and hands it to a [`MutationSubmitter`].
pub struct MutationBatchBuilder<'a, S: ?Sized> {
    submitter: &'a S,
}

impl<'a, S: MutationSubmitter + ?Sized> MutationBatchBuilder<'a, S> {
    pub fn new(submitter: &'a S) -> Self {
        Self { submitter }
    }

    /// Builds the batch and submits it at `level`, or QUORUM when `None`.
    ///
    /// Errors from the submitter are returned as-is; nothing is retried.
    pub async fn build_and_submit(
        &self,
        columns: impl IntoIterator<Item = ColumnInsert>,
        super_columns: impl IntoIterator<Item = SuperColumnInsert>,
        level: Option<ConsistencyLevel>,
    ) -> Result<()> {
        let mutations = build_mutations(columns, super_columns);
        let level = level.unwrap_or(DEFAULT_CONSISTENCY_LEVEL);
        debug!(rows = mutations.len(), level = level.as_str_name(), "submitting mutation batch");
        self.submitter.submit_mutations(mutations, level).await
    }
}
