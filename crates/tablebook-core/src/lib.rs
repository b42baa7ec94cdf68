#![doc = include_str!("../README.md")]

mod common;
pub mod model;
pub mod service;
pub mod store;
pub mod validation;

pub use common::*;
