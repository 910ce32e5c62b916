use cassandra_client::{
    CassandraClient, ClientConfig, ColumnFamilyDefinition, ColumnInsert, ColumnParent, KeyspaceDefinition,
    SlicePredicate, SliceRange, SuperColumnInsert,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let host = std::env::args().nth(1).unwrap_or_else(|| "localhost".to_string());
    let client = CassandraClient::connect(ClientConfig::new(host, 9160)).await?;

    println!(
        "Connected to cluster '{}' (version {})",
        client.get_cluster_name().await?,
        client.get_server_version().await?
    );

    // Create the keyspace on first run.
    client.get_keyspaces().await?;
    if !client.find_keyspace("demo").await {
        let mut users = ColumnFamilyDefinition::new("demo", "users");
        users.comparator_type = Some("UTF8Type".to_string());
        let mut logs = ColumnFamilyDefinition::new("demo", "logs");
        logs.column_type = Some("Super".to_string());
        logs.comparator_type = Some("UTF8Type".to_string());
        logs.sub_comparator_type = Some("UTF8Type".to_string());

        let mut keyspace = KeyspaceDefinition::new("demo", "org.apache.cassandra.locator.SimpleStrategy")
            .with_replication_factor(1);
        keyspace.column_families = vec![users, logs];
        let schema_id = client.create_keyspace(keyspace).await?;
        println!("Created keyspace 'demo' (schema {})", schema_id);
    }
    client.set_keyspace("demo").await?;

    // One round trip: a plain column plus two columns merged into super column "2024".
    client
        .batch_insert(
            vec![ColumnInsert::new("users", "u1", "email", "a@x.com")],
            vec![
                SuperColumnInsert::new("logs", "u1", "2024", "msg", "login"),
                SuperColumnInsert::new("logs", "u1", "2024", "ip", "1.2.3.4"),
            ],
            None,
        )
        .await?;

    let email = client.get_column_value("u1", "users", "email").await?;
    println!("users[u1][email] = {}", String::from_utf8_lossy(&email));

    let log = client.get_super_column("u1", "logs", "2024", None).await?;
    for column in log.columns {
        println!(
            "logs[u1][2024][{}] = {}",
            String::from_utf8_lossy(&column.name),
            String::from_utf8_lossy(&column.value)
        );
    }

    let columns = client
        .get_slice("u1", ColumnParent::new("users"), SlicePredicate::Range(SliceRange::all(10)), None)
        .await?;
    println!("users[u1] has {} column(s)", columns.len());

    Ok(())
}
