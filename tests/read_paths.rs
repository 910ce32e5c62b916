//! Read calls against an in-process server that answers `Get` with a canned reply.

use cassandra_client::proto::cassandra_service_server::{CassandraService, CassandraServiceServer};
use cassandra_client::proto::column_or_super_column::Kind;
use cassandra_client::{proto, CassandraClient, ClientConfig, ColumnPath, Error};
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::{Endpoint, Server};
use tonic::{Code, Request, Response, Status};

type RpcResult<T> = std::result::Result<Response<T>, Status>;

/// Serves `reply` for every `Get`, or fails it with `error` when set.
#[derive(Default)]
struct CannedGet {
    reply: Option<Kind>,
    error: Option<Code>,
}

#[tonic::async_trait]
impl CassandraService for CannedGet {
    async fn login(&self, _: Request<proto::AuthenticationRequest>) -> RpcResult<proto::Empty> {
        Ok(Response::new(proto::Empty {}))
    }

    async fn set_keyspace(&self, _: Request<proto::SetKeyspaceRequest>) -> RpcResult<proto::Empty> {
        Ok(Response::new(proto::Empty {}))
    }

    async fn get(&self, _: Request<proto::GetRequest>) -> RpcResult<proto::GetResponse> {
        if let Some(code) = self.error {
            return Err(Status::new(code, "no such column"));
        }
        let column = self
            .reply
            .clone()
            .map(|kind| proto::ColumnOrSuperColumn { kind: Some(kind) });
        Ok(Response::new(proto::GetResponse { column }))
    }

    async fn get_slice(&self, _: Request<proto::GetSliceRequest>) -> RpcResult<proto::GetSliceResponse> {
        Err(Status::unimplemented("get_slice"))
    }

    async fn get_count(&self, _: Request<proto::GetSliceRequest>) -> RpcResult<proto::GetCountResponse> {
        Err(Status::unimplemented("get_count"))
    }

    async fn get_range_slices(
        &self,
        _: Request<proto::GetRangeSlicesRequest>,
    ) -> RpcResult<proto::KeySlicesResponse> {
        Err(Status::unimplemented("get_range_slices"))
    }

    async fn get_indexed_slices(
        &self,
        _: Request<proto::GetIndexedSlicesRequest>,
    ) -> RpcResult<proto::KeySlicesResponse> {
        Err(Status::unimplemented("get_indexed_slices"))
    }

    async fn insert(&self, _: Request<proto::InsertRequest>) -> RpcResult<proto::Empty> {
        Err(Status::unimplemented("insert"))
    }

    async fn remove(&self, _: Request<proto::RemoveRequest>) -> RpcResult<proto::Empty> {
        Err(Status::unimplemented("remove"))
    }

    async fn batch_mutate(&self, _: Request<proto::BatchMutateRequest>) -> RpcResult<proto::Empty> {
        Err(Status::unimplemented("batch_mutate"))
    }

    async fn describe_cluster_name(&self, _: Request<proto::Empty>) -> RpcResult<proto::StringResponse> {
        Err(Status::unimplemented("describe_cluster_name"))
    }

    async fn describe_version(&self, _: Request<proto::Empty>) -> RpcResult<proto::StringResponse> {
        Err(Status::unimplemented("describe_version"))
    }

    async fn describe_ring(
        &self,
        _: Request<proto::DescribeRingRequest>,
    ) -> RpcResult<proto::DescribeRingResponse> {
        Err(Status::unimplemented("describe_ring"))
    }

    async fn describe_keyspaces(&self, _: Request<proto::Empty>) -> RpcResult<proto::DescribeKeyspacesResponse> {
        Err(Status::unimplemented("describe_keyspaces"))
    }

    async fn system_add_column_family(&self, _: Request<proto::CfDef>) -> RpcResult<proto::SchemaVersionResponse> {
        Err(Status::unimplemented("system_add_column_family"))
    }

    async fn system_update_column_family(
        &self,
        _: Request<proto::CfDef>,
    ) -> RpcResult<proto::SchemaVersionResponse> {
        Err(Status::unimplemented("system_update_column_family"))
    }

    async fn system_drop_column_family(
        &self,
        _: Request<proto::DropRequest>,
    ) -> RpcResult<proto::SchemaVersionResponse> {
        Err(Status::unimplemented("system_drop_column_family"))
    }

    async fn system_add_keyspace(&self, _: Request<proto::KsDef>) -> RpcResult<proto::SchemaVersionResponse> {
        Err(Status::unimplemented("system_add_keyspace"))
    }

    async fn system_update_keyspace(&self, _: Request<proto::KsDef>) -> RpcResult<proto::SchemaVersionResponse> {
        Err(Status::unimplemented("system_update_keyspace"))
    }

    async fn system_drop_keyspace(
        &self,
        _: Request<proto::DropRequest>,
    ) -> RpcResult<proto::SchemaVersionResponse> {
        Err(Status::unimplemented("system_drop_keyspace"))
    }
}

async fn serve(service: CannedGet) -> CassandraClient {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(
        Server::builder()
            .add_service(CassandraServiceServer::new(service))
            .serve_with_incoming(TcpListenerStream::new(listener)),
    );
    let channel = Endpoint::from_shared(format!("http://{addr}"))
        .unwrap()
        .connect()
        .await
        .unwrap();
    CassandraClient::new(channel, ClientConfig::new("127.0.0.1", addr.port()))
}

fn wire_column(name: &str, value: &[u8]) -> Kind {
    Kind::Column(proto::Column {
        name: name.as_bytes().to_vec(),
        value: value.to_vec(),
        timestamp: 1,
        ttl: None,
    })
}

fn wire_super_column(name: &str) -> Kind {
    Kind::SuperColumn(proto::SuperColumn {
        name: name.as_bytes().to_vec(),
        columns: vec![proto::Column {
            name: b"ip".to_vec(),
            value: b"1.2.3.4".to_vec(),
            timestamp: 1,
            ttl: None,
        }],
    })
}

#[tokio::test]
async fn empty_get_reply_is_not_found() {
    let client = serve(CannedGet::default()).await;
    let err = client
        .get("u1", ColumnPath::column("users", "email"), None)
        .await
        .unwrap_err();
    match err {
        Error::NotFound { what } => assert_eq!(what, "users[u1][email]"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn super_column_where_a_column_was_asked_for_is_not_found() {
    let client = serve(CannedGet {
        reply: Some(wire_super_column("2024")),
        ..Default::default()
    })
    .await;
    let err = client
        .get_column("u1", ColumnPath::column("users", "email"), None)
        .await
        .unwrap_err();
    assert!(err.is_not_found(), "unexpected error: {err:?}");
}

#[tokio::test]
async fn column_where_a_super_column_was_asked_for_is_not_found() {
    let client = serve(CannedGet {
        reply: Some(wire_column("email", b"a@x.com")),
        ..Default::default()
    })
    .await;
    let err = client.get_super_column("u1", "logs", "2024", None).await.unwrap_err();
    assert!(err.is_not_found(), "unexpected error: {err:?}");
}

#[tokio::test]
async fn not_found_status_becomes_not_found() {
    let client = serve(CannedGet {
        error: Some(Code::NotFound),
        ..Default::default()
    })
    .await;
    let err = client.get_column_value("u1", "users", "email").await.unwrap_err();
    assert!(err.is_not_found(), "unexpected error: {err:?}");
}

#[tokio::test]
async fn other_statuses_stay_request_errors() {
    let client = serve(CannedGet {
        error: Some(Code::Unavailable),
        ..Default::default()
    })
    .await;
    let err = client.get_column_value("u1", "users", "email").await.unwrap_err();
    assert_eq!(err.status().map(Status::code), Some(Code::Unavailable));
}

#[tokio::test]
async fn matching_replies_are_returned() {
    let client = serve(CannedGet {
        reply: Some(wire_column("email", b"a@x.com")),
        ..Default::default()
    })
    .await;
    assert_eq!(client.get_column_value("u1", "users", "email").await.unwrap(), b"a@x.com");

    let client = serve(CannedGet {
        reply: Some(wire_super_column("2024")),
        ..Default::default()
    })
    .await;
    let sc = client.get_super_column("u1", "logs", "2024", None).await.unwrap();
    assert_eq!(sc.name, b"2024");
    assert_eq!(sc.columns.len(), 1);
}
