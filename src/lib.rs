#![deny(missing_docs)]

//! # DynamoDB Access
//!
//! A validating request builder and typed marshaling bridge for Amazon DynamoDB.
//!
//! ## Overview
//!
//! Requests are accumulated in a [`ContextQuery`](context_query::ContextQuery) whose setters
//! never fail. Sufficiency is checked once, when the query is compiled into one of the ten SDK
//! inputs (get, query, scan, put, update, delete, batch write, batch get, transaction write and
//! transaction get):
//! - a query missing what its operation needs fails with an insufficiency error that carries
//!   the first failed requirement, before anything is sent
//! - expressions are compiled from structured trees with collision-free placeholders
//! - records cross the table boundary through serde, with optional hooks and derived sort keys
//! - continuation tokens are opaque strings that round-trip the last evaluated key
//!
//! ## Quick Example
//!
//! ```rust
//! use aws_sdk_dynamodb::{operation::query::QueryInput, types::AttributeValue};
//! use dynamodb_access::{
//!     context_query::ContextQuery,
//!     key_condition::{KeyConditionBuilder, KeyOperator},
//!     pagination::PaginationKey,
//! };
//!
//! let start_key = PaginationKey::decode("").unwrap();
//! let query = ContextQuery::new()
//!     .table("orders")
//!     .start_key(start_key)
//!     .limit(20)
//!     .key_condition_builder(
//!         KeyConditionBuilder::new()
//!             .with_partition_key("customerId", "c-1")
//!             .with_sort_key(KeyOperator::BeginsWith, "orderId", "2024#")
//!             .with_projection(["orderId", "total"]),
//!     );
//! let input = QueryInput::try_from(query).unwrap();
//! assert_eq!(
//!     input.key_condition_expression(),
//!     Some("#customerId = :customerId_eq0 AND begins_with(#orderId, :orderId_begins_with1)")
//! );
//! assert_eq!(input.projection_expression(), Some("#orderId, #total"));
//! assert_eq!(
//!     input.expression_attribute_values().unwrap()[":customerId_eq0"],
//!     AttributeValue::S("c-1".to_string())
//! );
//! ```
//!
//! ## Modules
//!
//! - [`mod@context_query`] - Request accumulation, validation and compilation
//! - [`mod@client`] - Transport seam and typed operation wrappers
//! - [`mod@crud`] - CRUD over keyed records
//! - [`mod@expression`] - Condition, projection and update expression compiler
//! - [`mod@marshal`] - Record capabilities and the marshal bridge

/// Transport seam and typed operation wrappers.
pub mod client;

pub mod config;

/// Request accumulation, validation and compilation.
pub mod context_query;

pub mod crud;

pub mod error;

/// Condition, projection and update expression compiler.
pub mod expression;

pub mod index;

pub mod key;

pub mod key_condition;

pub mod marshal;

pub mod pagination;

pub mod update;

pub mod value;
