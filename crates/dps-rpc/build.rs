// Path: crates/dps-rpc/build.rs
fn main() -> Result<(), Box<dyn std::error::Error>> {
    tonic_build::compile_protos("proto/index_reader.proto")?;
    Ok(())
}
