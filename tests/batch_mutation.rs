use std::sync::Mutex;

use async_trait::async_trait;
use cassandra_client::proto::column_or_super_column::Kind;
use cassandra_client::{
    mutation::mutation_rows, ColumnInsert, ConsistencyLevel, Mutation, MutationBatchBuilder, MutationSubmitter,
    MutationsMap, Result, SuperColumnInsert,
};

/// Keeps the wire form of every submitted batch.
#[derive(Default)]
struct WireRecorder {
    requests: Mutex<Vec<cassandra_client::proto::BatchMutateRequest>>,
}

#[async_trait]
impl MutationSubmitter for WireRecorder {
    async fn submit_mutations(&self, mutations: MutationsMap, level: ConsistencyLevel) -> Result<()> {
        let request = cassandra_client::proto::BatchMutateRequest {
            mutation_map: mutation_rows(mutations),
            consistency_level: level.into(),
        };
        self.requests.lock().unwrap().push(request);
        Ok(())
    }
}

fn column_inserts() -> Vec<ColumnInsert> {
    vec![ColumnInsert::new("users", "u1", "email", "a@x.com")]
}

fn super_column_inserts() -> Vec<SuperColumnInsert> {
    vec![
        SuperColumnInsert::new("logs", "u1", "2024", "msg", "login"),
        SuperColumnInsert::new("logs", "u1", "2024", "ip", "1.2.3.4"),
    ]
}

#[tokio::test]
async fn users_and_logs_batch_reaches_the_wire_nested_by_row_and_column_family() {
    let recorder = WireRecorder::default();
    MutationBatchBuilder::new(&recorder)
        .build_and_submit(column_inserts(), super_column_inserts(), None)
        .await
        .unwrap();

    let requests = recorder.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.consistency_level, ConsistencyLevel::Quorum as i32);
    assert_eq!(request.mutation_map.len(), 1);

    let row = &request.mutation_map[0];
    assert_eq!(row.key, b"u1");
    let families: Vec<&str> = row.column_families.iter().map(|cf| cf.column_family.as_str()).collect();
    assert_eq!(families, vec!["logs", "users"]);

    let logs = &row.column_families[0].mutations;
    assert_eq!(logs.len(), 1);
    match logs[0].column_or_supercolumn.as_ref().and_then(|c| c.kind.as_ref()) {
        Some(Kind::SuperColumn(sc)) => {
            assert_eq!(sc.name, b"2024");
            let names: Vec<&[u8]> = sc.columns.iter().map(|c| c.name.as_slice()).collect();
            assert_eq!(names, vec![&b"msg"[..], b"ip"]);
            assert!(sc.columns[1].timestamp > sc.columns[0].timestamp);
        }
        other => panic!("expected a super column, got {other:?}"),
    }

    let users = &row.column_families[1].mutations;
    assert_eq!(users.len(), 1);
    match users[0].column_or_supercolumn.as_ref().and_then(|c| c.kind.as_ref()) {
        Some(Kind::Column(column)) => {
            assert_eq!(column.name, b"email");
            assert_eq!(column.value, b"a@x.com");
            assert_eq!(column.ttl, None);
        }
        other => panic!("expected a column, got {other:?}"),
    }
}

#[tokio::test]
async fn consecutive_batches_are_independent() {
    let recorder = WireRecorder::default();
    let builder = MutationBatchBuilder::new(&recorder);
    builder
        .build_and_submit(vec![], super_column_inserts(), Some(ConsistencyLevel::One))
        .await
        .unwrap();
    builder
        .build_and_submit(vec![], super_column_inserts(), Some(ConsistencyLevel::One))
        .await
        .unwrap();

    let requests = recorder.requests.lock().unwrap();
    assert_eq!(requests.len(), 2);
    for request in requests.iter() {
        let logs = &request.mutation_map[0].column_families[0].mutations;
        assert_eq!(logs.len(), 1);
        match logs[0].column_or_supercolumn.as_ref().and_then(|c| c.kind.as_ref()) {
            Some(Kind::SuperColumn(sc)) => assert_eq!(sc.columns.len(), 2),
            other => panic!("expected a super column, got {other:?}"),
        }
    }
}

#[test]
fn interleaved_super_columns_sink_in_last_touched_order() {
    let map = cassandra_client::build_mutations(
        vec![],
        vec![
            SuperColumnInsert::new("cf", "k", "a", "1", "v"),
            SuperColumnInsert::new("cf", "k", "b", "1", "v"),
            SuperColumnInsert::new("cf", "k", "c", "1", "v"),
            SuperColumnInsert::new("cf", "k", "a", "2", "v"),
            SuperColumnInsert::new("cf", "k", "b", "2", "v"),
        ],
    );
    let list = &map[b"k".as_slice()]["cf"];
    let order: Vec<(&[u8], usize)> = list
        .iter()
        .map(|m| match m {
            Mutation::SuperColumn(sc) => (sc.name.as_slice(), sc.columns.len()),
            Mutation::Column(_) => panic!("unexpected plain column"),
        })
        .collect();
    assert_eq!(order, vec![(&b"c"[..], 1), (&b"a"[..], 2), (&b"b"[..], 2)]);
}
