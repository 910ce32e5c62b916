//! Keyspace and column family definitions.
//!
//! Plain data holders mirroring the schema messages. Optional fields left as
//! `None` are not sent, so the server applies its own defaults.

use std::collections::BTreeMap;

use crate::proto;

pub use crate::proto::IndexType;

/// Metadata of one named column of a column family, usually declaring a secondary index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnDefinition {
    pub name: Vec<u8>,
    pub validation_class: String,
    pub index_type: Option<IndexType>,
    pub index_name: Option<String>,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<Vec<u8>>, validation_class: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            validation_class: validation_class.into(),
            index_type: None,
            index_name: None,
        }
    }

    /// Declares a secondary index on this column.
    pub fn indexed(mut self, index_name: impl Into<String>) -> Self {
        self.index_type = Some(IndexType::Keys);
        self.index_name = Some(index_name.into());
        self
    }
}

impl From<ColumnDefinition> for proto::ColumnDef {
    fn from(val: ColumnDefinition) -> Self {
        proto::ColumnDef {
            name: val.name,
            validation_class: val.validation_class,
            index_type: val.index_type.map(|t| t as i32),
            index_name: val.index_name,
        }
    }
}

impl From<proto::ColumnDef> for ColumnDefinition {
    fn from(val: proto::ColumnDef) -> Self {
        ColumnDefinition {
            name: val.name,
            validation_class: val.validation_class,
            index_type: val.index_type.and_then(|t| IndexType::try_from(t).ok()),
            index_name: val.index_name,
        }
    }
}

/// Definition of a column family.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ColumnFamilyDefinition {
    pub keyspace_name: String,
    pub name: String,
    /// `Standard` or `Super`.
    pub column_type: Option<String>,
    pub comparator_type: Option<String>,
    pub sub_comparator_type: Option<String>,
    pub comment: Option<String>,
    pub read_repair_chance: Option<f64>,
    pub column_metadata: Vec<ColumnDefinition>,
    pub gc_grace_seconds: Option<i32>,
    pub default_validation_class: Option<String>,
    pub id: Option<i32>,
    pub min_compaction_threshold: Option<i32>,
    pub max_compaction_threshold: Option<i32>,
    pub key_validation_class: Option<String>,
    pub compaction_strategy: Option<String>,
    pub compaction_strategy_options: BTreeMap<String, String>,
    pub compression_options: BTreeMap<String, String>,
}

impl ColumnFamilyDefinition {
    pub fn new(keyspace_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            keyspace_name: keyspace_name.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn is_super(&self) -> bool {
        self.column_type.as_deref() == Some("Super")
    }

    pub fn add_column_metadata(&mut self, column: ColumnDefinition) {
        self.column_metadata.push(column);
    }
}

impl From<ColumnFamilyDefinition> for proto::CfDef {
    fn from(val: ColumnFamilyDefinition) -> Self {
        proto::CfDef {
            keyspace: val.keyspace_name,
            name: val.name,
            column_type: val.column_type,
            comparator_type: val.comparator_type,
            subcomparator_type: val.sub_comparator_type,
            comment: val.comment,
            read_repair_chance: val.read_repair_chance,
            column_metadata: val.column_metadata.into_iter().map(Into::into).collect(),
            gc_grace_seconds: val.gc_grace_seconds,
            default_validation_class: val.default_validation_class,
            id: val.id,
            min_compaction_threshold: val.min_compaction_threshold,
            max_compaction_threshold: val.max_compaction_threshold,
            key_validation_class: val.key_validation_class,
            compaction_strategy: val.compaction_strategy,
            compaction_strategy_options: val.compaction_strategy_options.into_iter().collect(),
            compression_options: val.compression_options.into_iter().collect(),
        }
    }
}

impl From<proto::CfDef> for ColumnFamilyDefinition {
    fn from(val: proto::CfDef) -> Self {
        ColumnFamilyDefinition {
            keyspace_name: val.keyspace,
            name: val.name,
            column_type: val.column_type,
            comparator_type: val.comparator_type,
            sub_comparator_type: val.subcomparator_type,
            comment: val.comment,
            read_repair_chance: val.read_repair_chance,
            column_metadata: val.column_metadata.into_iter().map(Into::into).collect(),
            gc_grace_seconds: val.gc_grace_seconds,
            default_validation_class: val.default_validation_class,
            id: val.id,
            min_compaction_threshold: val.min_compaction_threshold,
            max_compaction_threshold: val.max_compaction_threshold,
            key_validation_class: val.key_validation_class,
            compaction_strategy: val.compaction_strategy,
            compaction_strategy_options: val.compaction_strategy_options.into_iter().collect(),
            compression_options: val.compression_options.into_iter().collect(),
        }
    }
}

/// Definition of a keyspace and its column families.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyspaceDefinition {
    pub name: String,
    /// Replica placement strategy, e.g. `org.apache.cassandra.locator.SimpleStrategy`.
    pub strategy_class: String,
    pub strategy_options: BTreeMap<String, String>,
    pub replication_factor: Option<i32>,
    pub column_families: Vec<ColumnFamilyDefinition>,
    /// Whether writes go through the commit log before being acknowledged.
    pub durable_writes: bool,
}

impl KeyspaceDefinition {
    pub fn new(name: impl Into<String>, strategy_class: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            strategy_class: strategy_class.into(),
            strategy_options: BTreeMap::new(),
            replication_factor: None,
            column_families: Vec::new(),
            durable_writes: true,
        }
    }

    pub fn with_replication_factor(mut self, replication_factor: i32) -> Self {
        self.replication_factor = Some(replication_factor);
        self
    }

    pub fn with_strategy_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.strategy_options.insert(key.into(), value.into());
        self
    }

    pub fn column_family(&self, name: &str) -> Option<&ColumnFamilyDefinition> {
        self.column_families.iter().find(|cf| cf.name == name)
    }
}

impl From<KeyspaceDefinition> for proto::KsDef {
    fn from(val: KeyspaceDefinition) -> Self {
        proto::KsDef {
            name: val.name,
            strategy_class: val.strategy_class,
            strategy_options: val.strategy_options.into_iter().collect(),
            replication_factor: val.replication_factor,
            cf_defs: val.column_families.into_iter().map(Into::into).collect(),
            durable_writes: Some(val.durable_writes),
        }
    }
}

impl From<proto::KsDef> for KeyspaceDefinition {
    fn from(val: proto::KsDef) -> Self {
        KeyspaceDefinition {
            name: val.name,
            strategy_class: val.strategy_class,
            strategy_options: val.strategy_options.into_iter().collect(),
            replication_factor: val.replication_factor,
            column_families: val.cf_defs.into_iter().map(Into::into).collect(),
            durable_writes: val.durable_writes.unwrap_or(true),
        }
    }
}
