// SPDX-License-Identifier: MIT OR Apache-2.0
//! Demand-driven pull evaluation.
//!
//! There is no scheduler: requesting a port's value invokes the owning
//! node's behavior, which pulls its own inputs by following their first
//! connection upstream, recursively. Nothing is memoized between pulls and
//! no ordering is guaranteed across independent pulls.
//!
//! There is no cycle detection either — a cyclic graph recurses until the
//! call stack is exhausted. Hosts that need bounded evaluation can opt into
//! a recursion-depth guard with [`Evaluator::with_max_depth`]; a tripped
//! guard resolves the pull to no value.

use crate::connection::PortRef;
use crate::graph::Graph;
use crate::node::{Node, NodeId};
use crate::port::Value;
use crate::schema::SchemaProvider;

/// Pull-based value resolution over one graph
pub struct Evaluator<'a> {
    graph: &'a Graph,
    provider: &'a dyn SchemaProvider,
    max_depth: Option<usize>,
}

impl<'a> Evaluator<'a> {
    /// Create an evaluator over a graph and its behavior provider
    pub fn new(graph: &'a Graph, provider: &'a dyn SchemaProvider) -> Self {
        Self {
            graph,
            provider,
            max_depth: None,
        }
    }

    /// Bound the upstream recursion depth. Unset by default.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// The graph being evaluated
    pub fn graph(&self) -> &Graph {
        self.graph
    }

    /// Compute a port's value by invoking the owning node's behavior.
    /// Yields `None` for dangling addresses or unregistered node types.
    pub fn value(&self, port: &PortRef) -> Option<Value> {
        self.value_at(port, 0)
    }

    /// Value of the first live connected port, pulled upstream
    pub fn connected_value(&self, port: &PortRef) -> Option<Value> {
        self.connected_value_at(port, 0)
    }

    /// Values of all live connected ports, in connection order. Dangling
    /// connections and valueless pulls are omitted.
    pub fn connected_values(&self, port: &PortRef) -> Vec<Value> {
        self.connected_values_at(port, 0)
    }

    /// Upstream value of the named input port, or `fallback` when the port
    /// is absent, unconnected, or its connection cannot produce a value
    pub fn input_value(&self, node_id: NodeId, field: &str, fallback: Value) -> Value {
        let Some(node) = self.graph.node(node_id) else {
            return fallback;
        };
        input_value_at(self, node, field, fallback, 0)
    }

    /// Like [`Evaluator::input_value`], for an output port: reads the value
    /// connected downstream (pass-through semantics)
    pub fn output_value(&self, node_id: NodeId, field: &str, fallback: Value) -> Value {
        let Some(node) = self.graph.node(node_id) else {
            return fallback;
        };
        output_value_at(self, node, field, fallback, 0)
    }

    fn value_at(&self, port: &PortRef, depth: usize) -> Option<Value> {
        if self.max_depth.is_some_and(|max| depth > max) {
            tracing::warn!(
                node = ?port.node.0,
                field = %port.field,
                depth,
                "evaluation exceeded the recursion depth limit; yielding no value"
            );
            return None;
        }

        let node = self.graph.node(port.node)?;
        let live = node.port(&port.field)?;
        let Some(behavior) = self.provider.behavior(node.type_tag()) else {
            tracing::warn!(type_tag = %node.type_tag(), "no behavior registered for node type");
            return None;
        };
        let ctx = EvalContext { eval: self, depth };
        behavior.value(&ctx, node, live)
    }

    fn connected_value_at(&self, port: &PortRef, depth: usize) -> Option<Value> {
        let live = self.graph.port(port)?;
        let target = live
            .connections()
            .iter()
            .find(|c| c.resolve(self.graph).is_some())?
            .port_ref();
        self.value_at(&target, depth + 1)
    }

    fn connected_values_at(&self, port: &PortRef, depth: usize) -> Vec<Value> {
        let Some(live) = self.graph.port(port) else {
            return Vec::new();
        };
        live.connections()
            .iter()
            .filter(|c| c.resolve(self.graph).is_some())
            .filter_map(|c| self.value_at(&c.port_ref(), depth + 1))
            .collect()
    }
}

fn input_value_at(
    eval: &Evaluator<'_>,
    node: &Node,
    field: &str,
    fallback: Value,
    depth: usize,
) -> Value {
    match node.input(field) {
        Some(port) if port.is_connected() => eval
            .connected_value_at(&port.port_ref(), depth)
            .unwrap_or(fallback),
        _ => fallback,
    }
}

fn output_value_at(
    eval: &Evaluator<'_>,
    node: &Node,
    field: &str,
    fallback: Value,
    depth: usize,
) -> Value {
    match node.output(field) {
        Some(port) if port.is_connected() => eval
            .connected_value_at(&port.port_ref(), depth)
            .unwrap_or(fallback),
        _ => fallback,
    }
}

/// Per-pull view handed to [`crate::node::NodeBehavior::value`], carrying
/// the recursion state of the current traversal
pub struct EvalContext<'e, 'a> {
    eval: &'e Evaluator<'a>,
    depth: usize,
}

impl EvalContext<'_, '_> {
    /// The graph being evaluated
    pub fn graph(&self) -> &Graph {
        self.eval.graph
    }

    /// Upstream value of the node's named input port, or `fallback`
    pub fn input_value(&self, node: &Node, field: &str, fallback: Value) -> Value {
        input_value_at(self.eval, node, field, fallback, self.depth)
    }

    /// Downstream value of the node's named output port, or `fallback`
    pub fn output_value(&self, node: &Node, field: &str, fallback: Value) -> Value {
        output_value_at(self.eval, node, field, fallback, self.depth)
    }

    /// Value of the first live connected port
    pub fn connected_value(&self, port: &PortRef) -> Option<Value> {
        self.eval.connected_value_at(port, self.depth)
    }

    /// Values of all live connected ports, in connection order
    pub fn connected_values(&self, port: &PortRef) -> Vec<Value> {
        self.eval.connected_values_at(port, self.depth)
    }
}
