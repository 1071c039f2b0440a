//! ZenHub (and GitHub) API access: client, wire types, cached shapes and
//! the fetchers that turn one into the other.

pub mod api_types;
pub mod cache;
pub mod client;
pub mod fetch;
pub mod queries;
pub mod types;

pub use client::{GraphQl, GraphQlClient};
