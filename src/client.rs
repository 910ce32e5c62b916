use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{OnceCell, RwLock};
use tonic::transport::Channel;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::mutation::{
    mutation_rows, ColumnInsert, MutationBatchBuilder, MutationSubmitter, MutationsMap, SuperColumnInsert,
};
use crate::proto::cassandra_service_client::CassandraServiceClient;
use crate::proto::*; // For request/response types
use crate::query::IndexedSlicesQuery;
use crate::schema::{ColumnFamilyDefinition, KeyspaceDefinition};
use crate::timestamp::create_timestamp;
use crate::types::*;
use crate::types::{Column, ColumnOrSuperColumn, ColumnParent, ColumnPath, KeyRange, SlicePredicate, SuperColumn}; // Disambiguate from proto

/// Rows returned by a range read: row key and the columns read from it.
pub type Rows<T> = Vec<(Vec<u8>, Vec<T>)>;

#[derive(Debug, Default)]
struct ClusterMetadata {
    cluster_name: OnceCell<String>,
    server_version: OnceCell<String>,
    keyspaces: RwLock<Vec<KeyspaceDefinition>>,
    current_keyspace: RwLock<Option<String>>,
}

fn level_or_default(level: Option<ConsistencyLevel>) -> i32 {
    level.unwrap_or(DEFAULT_CONSISTENCY_LEVEL).into()
}

fn describe_path(key: &[u8], path: &ColumnPath) -> String {
    let mut out = format!("{}[{}]", path.column_family, String::from_utf8_lossy(key));
    if let Some(super_column) = &path.super_column {
        out.push_str(&format!("[{}]", String::from_utf8_lossy(super_column)));
    }
    if let Some(column) = &path.column {
        out.push_str(&format!("[{}]", String::from_utf8_lossy(column)));
    }
    out
}

/// Client for a Cassandra RPC server.
///
/// Wraps the raw [`CassandraServiceClient`] stub with typed operations. Every
/// operation that takes an `Option<ConsistencyLevel>` uses QUORUM when given
/// `None`.
///
/// # Cloning
/// The client is cheap to clone. Clones share the connection and the cached
/// cluster metadata.
#[derive(Clone, Debug)]
pub struct CassandraClient {
    client: CassandraServiceClient<Channel>,
    config: Arc<ClientConfig>,
    metadata: Arc<ClusterMetadata>,
}

impl CassandraClient {
    /// Connects to the server described by `config`, then logs in and selects
    /// the keyspace if the configuration names them.
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        let channel = config.endpoint()?.connect().await?;
        info!(uri = %config.uri(), "connected to cassandra");
        let client = Self::new(channel, config);

        if let Some(credentials) = client.config.credentials.clone() {
            client.login(&credentials.username, &credentials.password).await?;
        }
        if let Some(keyspace) = client.config.keyspace.clone() {
            client.set_keyspace(&keyspace).await?;
        }
        Ok(client)
    }

    /// Create a new client from an existing Tonic `Channel`.
    pub fn new(channel: Channel, config: ClientConfig) -> Self {
        Self {
            client: CassandraServiceClient::new(channel),
            config: Arc::new(config),
            metadata: Arc::new(ClusterMetadata::default()),
        }
    }

    pub fn host(&self) -> &str {
        &self.config.host
    }

    pub fn port(&self) -> u16 {
        self.config.port
    }

    // ============================================================================================
    // Session
    // ============================================================================================

    /// Authenticates the connection.
    pub async fn login(&self, username: &str, password: &str) -> Result<()> {
        let credentials = HashMap::from([
            ("username".to_string(), username.to_string()),
            ("password".to_string(), password.to_string()),
        ]);
        let req = AuthenticationRequest { credentials };
        self.client.clone().login(req).await?;
        debug!(username, "logged in");
        Ok(())
    }

    /// Selects the keyspace subsequent operations run against.
    pub async fn set_keyspace(&self, keyspace: &str) -> Result<()> {
        let req = SetKeyspaceRequest {
            keyspace: keyspace.to_string(),
        };
        self.client.clone().set_keyspace(req).await?;
        *self.metadata.current_keyspace.write().await = Some(keyspace.to_string());
        info!(keyspace, "keyspace selected");
        Ok(())
    }

    /// The keyspace selected by the last successful [`Self::set_keyspace`].
    pub async fn current_keyspace(&self) -> Option<String> {
        self.metadata.current_keyspace.read().await.clone()
    }

    // ============================================================================================
    // Data Operations - Write
    // ============================================================================================

    /// Inserts a column under `parent` in the row `key`.
    pub async fn insert(
        &self,
        key: impl Into<Vec<u8>>,
        parent: ColumnParent,
        column: Column,
        level: Option<ConsistencyLevel>,
    ) -> Result<()> {
        let req = InsertRequest {
            key: key.into(),
            column_parent: Some(parent.into()),
            column: Some(column.into()),
            consistency_level: level_or_default(level),
        };
        self.client.clone().insert(req).await?;
        Ok(())
    }

    /// Inserts a plain column.
    pub async fn insert_column(
        &self,
        key: impl Into<Vec<u8>>,
        column_family: &str,
        name: impl Into<Vec<u8>>,
        value: impl Into<Vec<u8>>,
    ) -> Result<()> {
        self.insert(key, ColumnParent::new(column_family), Column::new(name, value), None)
            .await
    }

    /// Inserts a column nested in `super_column`.
    pub async fn insert_super_column(
        &self,
        key: impl Into<Vec<u8>>,
        column_family: &str,
        super_column: impl Into<Vec<u8>>,
        name: impl Into<Vec<u8>>,
        value: impl Into<Vec<u8>>,
    ) -> Result<()> {
        let parent = ColumnParent::new(column_family).with_super_column(super_column);
        self.insert(key, parent, Column::new(name, value), None).await
    }

    /// Inserts a plain column holding an integer, encoded with [`encode_long`].
    pub async fn insert_integer_column(
        &self,
        key: impl Into<Vec<u8>>,
        column_family: &str,
        name: impl Into<Vec<u8>>,
        value: i64,
    ) -> Result<()> {
        self.insert_column(key, column_family, name, encode_long(value)).await
    }

    /// Removes whatever `path` names: a column, a super column, or the whole row.
    pub async fn remove(&self, key: impl Into<Vec<u8>>, path: ColumnPath, level: Option<ConsistencyLevel>) -> Result<()> {
        let req = RemoveRequest {
            key: key.into(),
            column_path: Some(path.into()),
            timestamp: create_timestamp(),
            consistency_level: level_or_default(level),
        };
        self.client.clone().remove(req).await?;
        Ok(())
    }

    pub async fn remove_column(
        &self,
        key: impl Into<Vec<u8>>,
        column_family: &str,
        name: impl Into<Vec<u8>>,
    ) -> Result<()> {
        self.remove(key, ColumnPath::column(column_family, name), None).await
    }

    pub async fn remove_super_column(
        &self,
        key: impl Into<Vec<u8>>,
        column_family: &str,
        super_column: impl Into<Vec<u8>>,
    ) -> Result<()> {
        self.remove(key, ColumnPath::super_column(column_family, super_column), None)
            .await
    }

    /// Writes all inserts in one `batch_mutate` call.
    ///
    /// Columns bound for the same super column of the same row are sent as a
    /// single super column mutation. See [`crate::mutation`].
    pub async fn batch_insert(
        &self,
        columns: impl IntoIterator<Item = ColumnInsert>,
        super_columns: impl IntoIterator<Item = SuperColumnInsert>,
        level: Option<ConsistencyLevel>,
    ) -> Result<()> {
        MutationBatchBuilder::new(self)
            .build_and_submit(columns, super_columns, level)
            .await
    }

    // ============================================================================================
    // Data Operations - Read
    // ============================================================================================

    /// Reads the column or super column named by `path`.
    pub async fn get(
        &self,
        key: impl Into<Vec<u8>>,
        path: ColumnPath,
        level: Option<ConsistencyLevel>,
    ) -> Result<ColumnOrSuperColumn> {
        let key = key.into();
        let what = describe_path(&key, &path);
        let req = GetRequest {
            key,
            column_path: Some(path.into()),
            consistency_level: level_or_default(level),
        };
        let resp = self.client.clone().get(req).await.map_err(Error::from_read)?;
        match resp.into_inner().column {
            Some(value) => value.try_into(),
            None => {
                warn!(path = %what, "get returned no value");
                Err(Error::not_found(what))
            }
        }
    }

    /// Reads a single column. `path` must name a column.
    pub async fn get_column(
        &self,
        key: impl Into<Vec<u8>>,
        path: ColumnPath,
        level: Option<ConsistencyLevel>,
    ) -> Result<Column> {
        let key = key.into();
        let what = describe_path(&key, &path);
        self.get(key, path, level)
            .await?
            .into_column()
            .ok_or_else(|| Error::not_found(what))
    }

    pub async fn get_column_value(
        &self,
        key: impl Into<Vec<u8>>,
        column_family: &str,
        name: impl Into<Vec<u8>>,
    ) -> Result<Vec<u8>> {
        let column = self
            .get_column(key, ColumnPath::column(column_family, name), None)
            .await?;
        Ok(column.value)
    }

    /// Reads a column written by [`Self::insert_integer_column`].
    pub async fn get_integer_column_value(
        &self,
        key: impl Into<Vec<u8>>,
        column_family: &str,
        name: impl Into<Vec<u8>>,
    ) -> Result<i64> {
        let value = self.get_column_value(key, column_family, name).await?;
        decode_long(&value)
    }

    pub async fn get_super_column(
        &self,
        key: impl Into<Vec<u8>>,
        column_family: &str,
        super_column: impl Into<Vec<u8>>,
        level: Option<ConsistencyLevel>,
    ) -> Result<SuperColumn> {
        let key = key.into();
        let path = ColumnPath::super_column(column_family, super_column);
        let what = describe_path(&key, &path);
        self.get(key, path, level)
            .await?
            .into_super_column()
            .ok_or_else(|| Error::not_found(what))
    }

    /// Reads the columns of one row selected by `predicate`. Super columns in
    /// the result are skipped.
    pub async fn get_slice(
        &self,
        key: impl Into<Vec<u8>>,
        parent: ColumnParent,
        predicate: SlicePredicate,
        level: Option<ConsistencyLevel>,
    ) -> Result<Vec<Column>> {
        let req = GetSliceRequest {
            key: key.into(),
            column_parent: Some(parent.into()),
            predicate: Some(predicate.into()),
            consistency_level: level_or_default(level),
        };
        let resp = self.client.clone().get_slice(req).await?;
        Ok(column_list(resp.into_inner().columns))
    }

    /// Counts the columns of one row selected by `predicate`.
    pub async fn get_count(
        &self,
        key: impl Into<Vec<u8>>,
        parent: ColumnParent,
        predicate: SlicePredicate,
        level: Option<ConsistencyLevel>,
    ) -> Result<i32> {
        let req = GetSliceRequest {
            key: key.into(),
            column_parent: Some(parent.into()),
            predicate: Some(predicate.into()),
            consistency_level: level_or_default(level),
        };
        let resp = self.client.clone().get_count(req).await?;
        Ok(resp.into_inner().count)
    }

    async fn range_slices(
        &self,
        parent: ColumnParent,
        predicate: SlicePredicate,
        range: KeyRange,
        level: Option<ConsistencyLevel>,
    ) -> Result<Vec<KeySlice>> {
        let req = GetRangeSlicesRequest {
            column_parent: Some(parent.into()),
            predicate: Some(predicate.into()),
            range: Some(range.into()),
            consistency_level: level_or_default(level),
        };
        let resp = self.client.clone().get_range_slices(req).await?;
        Ok(resp.into_inner().key_slices)
    }

    /// Reads the plain columns of every row in `range`.
    pub async fn get_range_slice(
        &self,
        parent: ColumnParent,
        predicate: SlicePredicate,
        range: KeyRange,
        level: Option<ConsistencyLevel>,
    ) -> Result<Rows<Column>> {
        let slices = self.range_slices(parent, predicate, range, level).await?;
        Ok(slices
            .into_iter()
            .map(|slice| (slice.key, column_list(slice.columns)))
            .collect())
    }

    /// Reads the super columns of every row in `range`.
    pub async fn get_super_range_slice(
        &self,
        parent: ColumnParent,
        predicate: SlicePredicate,
        range: KeyRange,
        level: Option<ConsistencyLevel>,
    ) -> Result<Rows<SuperColumn>> {
        let slices = self.range_slices(parent, predicate, range, level).await?;
        Ok(slices
            .into_iter()
            .map(|slice| (slice.key, super_column_list(slice.columns)))
            .collect())
    }

    /// Reads rows matching a secondary-index query.
    pub async fn get_indexed_slices(&self, query: IndexedSlicesQuery) -> Result<Rows<Column>> {
        debug!(
            column_family = query.column_family(),
            expressions = query.expressions().len(),
            "indexed slices query"
        );
        let req = query.into_request();
        let resp = self.client.clone().get_indexed_slices(req).await?;
        Ok(resp
            .into_inner()
            .key_slices
            .into_iter()
            .map(|slice| (slice.key, column_list(slice.columns)))
            .collect())
    }

    // ============================================================================================
    // Schema Management
    // ============================================================================================

    /// Retrieves all keyspace definitions and refreshes the local keyspace cache.
    pub async fn get_keyspaces(&self) -> Result<Vec<KeyspaceDefinition>> {
        let resp = self.client.clone().describe_keyspaces(Empty {}).await?;
        let keyspaces: Vec<KeyspaceDefinition> = resp.into_inner().keyspaces.into_iter().map(Into::into).collect();
        *self.metadata.keyspaces.write().await = keyspaces.clone();
        Ok(keyspaces)
    }

    /// Whether the keyspace cache filled by [`Self::get_keyspaces`] contains `name`.
    pub async fn find_keyspace(&self, name: &str) -> bool {
        self.metadata.keyspaces.read().await.iter().any(|ks| ks.name == name)
    }

    /// Creates a column family; returns the new schema version.
    pub async fn create_column_family(&self, definition: ColumnFamilyDefinition) -> Result<String> {
        info!(column_family = %definition.name, "creating column family");
        let resp = self.client.clone().system_add_column_family(CfDef::from(definition)).await?;
        Ok(resp.into_inner().schema_id)
    }

    pub async fn update_column_family(&self, definition: ColumnFamilyDefinition) -> Result<String> {
        let resp = self.client.clone().system_update_column_family(CfDef::from(definition)).await?;
        Ok(resp.into_inner().schema_id)
    }

    pub async fn drop_column_family(&self, name: &str) -> Result<String> {
        info!(column_family = name, "dropping column family");
        let req = DropRequest { name: name.to_string() };
        let resp = self.client.clone().system_drop_column_family(req).await?;
        Ok(resp.into_inner().schema_id)
    }

    /// Creates a keyspace together with its column families; returns the new schema version.
    pub async fn create_keyspace(&self, definition: KeyspaceDefinition) -> Result<String> {
        info!(keyspace = %definition.name, "creating keyspace");
        let resp = self.client.clone().system_add_keyspace(KsDef::from(definition)).await?;
        Ok(resp.into_inner().schema_id)
    }

    pub async fn update_keyspace(&self, definition: KeyspaceDefinition) -> Result<String> {
        let resp = self.client.clone().system_update_keyspace(KsDef::from(definition)).await?;
        Ok(resp.into_inner().schema_id)
    }

    pub async fn drop_keyspace(&self, name: &str) -> Result<String> {
        info!(keyspace = name, "dropping keyspace");
        let req = DropRequest { name: name.to_string() };
        let resp = self.client.clone().system_drop_keyspace(req).await?;
        Ok(resp.into_inner().schema_id)
    }

    // ============================================================================================
    // Cluster Metadata
    // ============================================================================================

    /// Name of the cluster. Fetched once per client.
    pub async fn get_cluster_name(&self) -> Result<String> {
        let name = self
            .metadata
            .cluster_name
            .get_or_try_init(|| async {
                let resp = self.client.clone().describe_cluster_name(Empty {}).await?;
                Ok::<_, Error>(resp.into_inner().value)
            })
            .await?;
        Ok(name.clone())
    }

    /// Version of the server's RPC interface. Fetched once per client.
    pub async fn get_server_version(&self) -> Result<String> {
        let version = self
            .metadata
            .server_version
            .get_or_try_init(|| async {
                let resp = self.client.clone().describe_version(Empty {}).await?;
                Ok::<_, Error>(resp.into_inner().value)
            })
            .await?;
        Ok(version.clone())
    }

    /// Token ranges of the ring and the endpoints replicating each of them for `keyspace`.
    pub async fn describe_ring(&self, keyspace: &str) -> Result<Vec<TokenRange>> {
        let req = DescribeRingRequest {
            keyspace: keyspace.to_string(),
        };
        let resp = self.client.clone().describe_ring(req).await?;
        Ok(resp.into_inner().token_ranges)
    }
}

#[async_trait]
impl MutationSubmitter for CassandraClient {
    async fn submit_mutations(&self, mutations: MutationsMap, level: ConsistencyLevel) -> Result<()> {
        let req = BatchMutateRequest {
            mutation_map: mutation_rows(mutations),
            consistency_level: level.into(),
        };
        self.client.clone().batch_mutate(req).await?;
        Ok(())
    }
}
