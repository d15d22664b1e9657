//! Adapters for the relational store, the timing provider, the cache tiers
//! and the REST API.

pub mod cache;
pub mod http;
pub mod sqlite;
pub mod timing;
