fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Compile proto
    tonic_build::compile_protos("proto/cassandra.proto")?;
    Ok(())
}
