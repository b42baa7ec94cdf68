//! Shared protocol and error types.
//!
//! - [`proto`] - generated gRPC bindings and the reflection descriptor set.
//! - [`error`] - the crate-wide [`Error`] and its `tonic::Status` mapping.
//! - [`types`] - document identifiers and collection names.
//! - [`convert`] - conversions between protobuf messages and the model.

pub mod convert;
pub mod error;
pub mod types;

pub use error::{Error, Result};

pub mod proto {
    tonic::include_proto!("tablebook.v1");

    /// Encoded `FileDescriptorSet` for `tonic-reflection`.
    pub const FILE_DESCRIPTOR_SET: &[u8] =
        tonic::include_file_descriptor_set!("tablebook_descriptor");
}
