// SPDX-License-Identifier: MIT OR Apache-2.0
//! Typed dataflow graph core.
//!
//! This crate provides the data model and engine behind a visual node
//! editor:
//! - Nodes owning named, typed, directed ports
//! - Symmetric connections with per-side type constraints
//! - Schema synchronization that reconciles live ports against a node
//!   type's current declaration
//! - Demand-driven pull evaluation
//!
//! ## Architecture
//!
//! A [`Graph`] owns its [`Node`]s; each node owns its [`Port`]s; ports
//! reference each other across nodes through weak [`Connection`] records
//! (node identity plus field name) resolved on demand. Per-type port
//! declarations and compute behavior come from a [`SchemaProvider`] —
//! typically a [`NodeRegistry`] — which the [`Evaluator`] and the schema
//! synchronizer consume; the core never inspects type metadata itself.
//!
//! Evaluation is pull-based and recursive: asking for a port's value runs
//! the owning node's behavior, which pulls its inputs upstream. There is no
//! scheduler, no memoization and, by default, no cycle detection.

pub mod connection;
pub mod evaluation;
pub mod graph;
pub mod node;
pub mod nodes;
pub mod port;
pub mod schema;

pub use connection::{Connection, PortRef};
pub use evaluation::{EvalContext, Evaluator};
pub use graph::{ConnectError, Graph};
pub use node::{Node, NodeBehavior, NodeCategory, NodeId, NodeRegistry, NodeTypeDef};
pub use port::{Port, PortCapacity, PortDirection, TypeConstraint, Value, ValueType};
pub use schema::{PortSchema, SchemaCache, SchemaProvider};
