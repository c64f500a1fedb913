fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Fall back to the bundled protoc when the host has none configured
    if std::env::var_os("PROTOC").is_none() {
        std::env::set_var("PROTOC", protoc_bin_vendored::protoc_bin_path()?);
    }

    // Compile the proto file for the catalog client and service
    tonic_build::compile_protos("../../proto/catalog.proto")?;
    Ok(())
}
