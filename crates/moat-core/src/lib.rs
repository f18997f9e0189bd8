//! # moat-core
//!
//! Foundation types and utilities shared by the moat assistant core crates.
//!
//! This crate provides the vocabulary the other moat crates depend on:
//!
//! - **Branded IDs**: [`ids::SessionId`] as a newtype for type safety
//! - **Text utilities**: UTF-8–safe truncation for summaries and log output
//! - **Logging**: `tracing` subscriber bootstrap for the CLI shell
//! - **Capabilities**: the data-driven dispatch table consumed by the
//!   command and plugin layers

#![deny(unsafe_code)]

pub mod capabilities;
pub mod ids;
pub mod logging;
pub mod text;
