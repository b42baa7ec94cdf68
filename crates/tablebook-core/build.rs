/// Builds the gRPC client and server code for the `tablebook.proto` definition
/// using `tonic-prost-build`.
///
/// This code generation step processes the Protocol Buffer definitions located
/// in the `proto` directory and emits Rust modules with gRPC bindings into the
/// crate's `OUT_DIR`.
///
/// # Descriptor Set
///
/// A serialized `FileDescriptorSet` is written next to the generated code as
/// `tablebook_descriptor.bin`. The server registers it with
/// `tonic-reflection` so tools such as `grpcurl` can discover the services
/// without a local copy of the proto file.
///
/// # Files and Paths
///
/// - Proto file: `proto/tablebook.proto`
/// - Includes: `proto/`
///
/// # Panics
///
/// This function will `panic!` if code generation fails.
///
/// # Output
///
/// Generated code will be accessible in Rust via:
///
/// ```rust
/// pub mod proto {
///     tonic::include_proto!("tablebook.v1");
/// }
/// ```
use std::env;
use std::path::PathBuf;
fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let descriptor_path = out_dir.join("tablebook_descriptor.bin");

    let mut config = tonic_prost_build::Config::new();
    config.file_descriptor_set_path(&descriptor_path);

    println!("cargo:rerun-if-changed=proto/tablebook.proto");

    tonic_prost_build::configure()
        .compile_with_config(config, &["proto/tablebook.proto"], &["proto"])
        .unwrap();
}
