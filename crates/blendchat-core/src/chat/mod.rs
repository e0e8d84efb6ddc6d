//! Chat domain logic: the store port, access verification, sentiment
//! tagging, and the orchestrating service.

pub mod access;
pub mod sentiment;
pub mod service;
pub mod store;
