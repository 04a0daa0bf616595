// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph container: node ownership and pairwise topology operations.
//!
//! Connections are recorded redundantly on both endpoint ports, so every
//! operation that creates or severs an edge has to touch two nodes. Those
//! operations live here, addressed by [`PortRef`], and leave the graph
//! unchanged when they fail.

use crate::connection::{Connection, PortRef};
use crate::node::{Node, NodeId};
use crate::port::{Port, PortCapacity, PortDirection};
use crate::schema::SchemaProvider;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A node graph: the unit of serialization and the root for traversal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Graph {
    /// Graph name
    pub name: String,
    nodes: IndexMap<NodeId, Node>,
}

impl Graph {
    /// Create a new empty graph
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: IndexMap::new(),
        }
    }

    /// Add a node to the graph
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = node.id();
        self.nodes.insert(id, node);
        id
    }

    /// Get a node by ID
    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(&node_id)
    }

    /// Get a mutable node by ID
    pub fn node_mut(&mut self, node_id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&node_id)
    }

    /// All nodes, in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// All node IDs, in insertion order
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Resolve a port address to the live port
    pub fn port(&self, port: &PortRef) -> Option<&Port> {
        self.nodes.get(&port.node)?.port(&port.field)
    }

    /// Connect two ports on distinct nodes.
    ///
    /// Exactly one endpoint must be an input and the other an output; both
    /// sides must approve the pairing under their own type constraint; a
    /// `Single`-capacity endpoint must be unconnected. On success a record
    /// is appended to both ports and `on_create_connection` fires on both
    /// owning nodes.
    pub fn connect(
        &mut self,
        provider: &dyn SchemaProvider,
        a: &PortRef,
        b: &PortRef,
    ) -> Result<(), ConnectError> {
        let port_a = self.resolve(a)?;
        let port_b = self.resolve(b)?;

        if a.node == b.node {
            return Err(ConnectError::SelfConnection);
        }

        match (port_a.direction(), port_b.direction()) {
            (PortDirection::Input, PortDirection::Output)
            | (PortDirection::Output, PortDirection::Input) => {}
            _ => return Err(ConnectError::DirectionMismatch),
        }

        if port_a.is_connected_to(port_b) {
            return Err(ConnectError::AlreadyConnected);
        }

        if !port_a.is_compatible(port_b) || !port_b.is_compatible(port_a) {
            return Err(ConnectError::TypeIncompatible);
        }

        if (port_a.capacity() == PortCapacity::Single && port_a.is_connected())
            || (port_b.capacity() == PortCapacity::Single && port_b.is_connected())
        {
            return Err(ConnectError::CapacityExceeded);
        }

        let record_a = Connection::new(port_b);
        let record_b = Connection::new(port_a);
        // Skip the reverse insertion if it already exists, so one-sided
        // leftovers can never become duplicate symmetric edges.
        let reverse_exists = port_b.is_connected_to(port_a);

        if let Some(port) = self.port_record_mut(a) {
            port.connections.push(record_a);
        }
        if !reverse_exists {
            if let Some(port) = self.port_record_mut(b) {
                port.connections.push(record_b);
            }
        }

        tracing::debug!(from = ?a, to = ?b, "connected ports");

        self.fire_create_hook(provider, a, b);
        self.fire_create_hook(provider, b, a);
        Ok(())
    }

    /// Remove the pairing between two ports from both sides. Idempotent:
    /// a no-op when no record exists. Hooks fire only when something was
    /// actually removed.
    pub fn disconnect(&mut self, provider: &dyn SchemaProvider, a: &PortRef, b: &PortRef) {
        let mut removed = false;
        if let Some(port) = self.port_record_mut(a) {
            let before = port.connections.len();
            port.connections.retain(|c| !c.points_at(b));
            removed |= port.connections.len() != before;
        }
        if let Some(port) = self.port_record_mut(b) {
            let before = port.connections.len();
            port.connections.retain(|c| !c.points_at(a));
            removed |= port.connections.len() != before;
        }

        if removed {
            tracing::debug!(from = ?a, to = ?b, "disconnected ports");
            self.fire_remove_hook(provider, a, b);
            self.fire_remove_hook(provider, b, a);
        }
    }

    /// Disconnect all of a port's connections, last-to-first
    pub fn clear_port_connections(&mut self, provider: &dyn SchemaProvider, port: &PortRef) {
        let Some(live) = self.port(port) else { return };
        let targets: Vec<PortRef> = live.connections().iter().rev().map(Connection::port_ref).collect();
        for target in &targets {
            self.disconnect(provider, port, target);
        }
    }

    /// Disconnect every port owned by a node
    pub fn clear_node_connections(&mut self, provider: &dyn SchemaProvider, node_id: NodeId) {
        let Some(node) = self.nodes.get(&node_id) else { return };
        let fields: Vec<String> = node.port_names().map(str::to_owned).collect();
        for field in fields {
            self.clear_port_connections(provider, &PortRef::new(node_id, field));
        }
    }

    /// Remove a node, severing all of its connections on both sides first.
    /// Removal preserves the order of the remaining nodes.
    pub fn remove_node(&mut self, provider: &dyn SchemaProvider, node_id: NodeId) -> Option<Node> {
        if !self.nodes.contains_key(&node_id) {
            return None;
        }
        self.clear_node_connections(provider, node_id);
        self.nodes.shift_remove(&node_id)
    }

    /// Copy a single node under a fresh identity. The copy starts with zero
    /// connections; the original's edges are untouched.
    pub fn copy_node(&mut self, original: NodeId) -> Option<NodeId> {
        let mut copy = self.nodes.get(&original)?.duplicate();
        copy.strip_connections();
        Some(self.add_node(copy))
    }

    /// Deep-copy the whole graph: every node is cloned under a fresh
    /// identity and every connection is redirected to the clone at the same
    /// index, preserving topology without touching the originals.
    pub fn copy(&self) -> Self {
        let old_ids: Vec<NodeId> = self.nodes.keys().copied().collect();

        let mut nodes = IndexMap::with_capacity(self.nodes.len());
        let mut new_ids = Vec::with_capacity(old_ids.len());
        for node in self.nodes.values() {
            let copy = node.duplicate();
            new_ids.push(copy.id());
            nodes.insert(copy.id(), copy);
        }

        let mut graph = Self {
            name: self.name.clone(),
            nodes,
        };
        for node in graph.nodes.values_mut() {
            for port in node.ports_mut() {
                port.redirect(&old_ids, &new_ids);
            }
        }
        graph
    }

    /// Remove all nodes
    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    fn resolve(&self, port: &PortRef) -> Result<&Port, ConnectError> {
        self.nodes
            .get(&port.node)
            .ok_or(ConnectError::NodeNotFound(port.node))?
            .port(&port.field)
            .ok_or_else(|| ConnectError::PortNotFound {
                node: port.node,
                field: port.field.clone(),
            })
    }

    fn port_record_mut(&mut self, port: &PortRef) -> Option<&mut Port> {
        self.nodes.get_mut(&port.node)?.port_mut(&port.field)
    }

    fn fire_create_hook(&mut self, provider: &dyn SchemaProvider, own: &PortRef, other: &PortRef) {
        let Some(tag) = self.nodes.get(&own.node).map(|n| n.type_tag().to_owned()) else {
            return;
        };
        let Some(behavior) = provider.behavior(&tag) else {
            return;
        };
        if let Some(node) = self.nodes.get_mut(&own.node) {
            behavior.on_create_connection(node, &own.field, other);
        }
    }

    fn fire_remove_hook(&mut self, provider: &dyn SchemaProvider, own: &PortRef, other: &PortRef) {
        let Some(tag) = self.nodes.get(&own.node).map(|n| n.type_tag().to_owned()) else {
            return;
        };
        let Some(behavior) = provider.behavior(&tag) else {
            return;
        };
        if let Some(node) = self.nodes.get_mut(&own.node) {
            behavior.on_remove_connection(node, &own.field, other);
        }
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

/// Error when creating a connection. All variants are recoverable and leave
/// the graph unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectError {
    /// Endpoint node not found
    #[error("node not found: {0:?}")]
    NodeNotFound(NodeId),

    /// Endpoint port not found on its node
    #[error("port not found: {field} on node {node:?}")]
    PortNotFound {
        /// Node the port was looked up on
        node: NodeId,
        /// Field name that failed to resolve
        field: String,
    },

    /// Both ports belong to the same node
    #[error("cannot connect two ports of the same node")]
    SelfConnection,

    /// The pairing is not exactly one input and one output
    #[error("connection requires one input and one output port")]
    DirectionMismatch,

    /// The pairing already exists
    #[error("ports are already connected")]
    AlreadyConnected,

    /// One side rejected the pairing under its type constraint
    #[error("port types are incompatible")]
    TypeIncompatible,

    /// A single-capacity endpoint already holds a connection
    #[error("single-capacity port already has a connection")]
    CapacityExceeded,
}
