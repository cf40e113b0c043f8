//! HTTP plumbing for the marketplace API.

mod client;

pub use client::ApiClient;
