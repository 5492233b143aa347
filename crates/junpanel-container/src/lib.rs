pub mod action;
pub mod client;
pub mod converter;
pub mod docker;
pub mod engine;
pub mod error;
pub mod inspector;
pub mod model;
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use action::*;
pub use client::*;
pub use docker::*;
pub use engine::*;
pub use error::*;
pub use inspector::*;
pub use model::*;
