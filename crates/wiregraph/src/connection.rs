// SPDX-License-Identifier: MIT OR Apache-2.0
//! Connection records: weak references between ports across nodes.

use crate::graph::Graph;
use crate::node::NodeId;
use crate::port::Port;
use serde::{Deserialize, Serialize};

/// Address of a port: owning node identity plus field name.
///
/// Every graph-level topology operation takes port addresses rather than
/// port references, since the ports live inside independently-owned nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortRef {
    /// Identity of the owning node
    pub node: NodeId,
    /// Field name of the port on that node
    pub field: String,
}

impl PortRef {
    /// Create a port address
    pub fn new(node: NodeId, field: impl Into<String>) -> Self {
        Self {
            node,
            field: field.into(),
        }
    }
}

/// One side's record of a symmetric edge between two ports.
///
/// A connection is a weak reference — node identity plus field name — never
/// ownership. Resolving it performs a lookup against the graph, so it
/// tolerates deletion and re-creation of the target node: a dangling record
/// simply resolves to nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    /// Identity of the target node
    pub node: NodeId,
    /// Field name of the target port
    pub field: String,
}

impl Connection {
    /// Record an edge toward `target`
    pub fn new(target: &Port) -> Self {
        Self {
            node: target.node(),
            field: target.field().to_owned(),
        }
    }

    /// Record an edge toward the port addressed by `(node, field)`
    pub fn to(node: NodeId, field: impl Into<String>) -> Self {
        Self {
            node,
            field: field.into(),
        }
    }

    /// Address of the target port
    pub fn port_ref(&self) -> PortRef {
        PortRef::new(self.node, &self.field)
    }

    /// Whether this record points at the given address
    pub fn points_at(&self, target: &PortRef) -> bool {
        self.node == target.node && self.field == target.field
    }

    /// Resolve the record to the live target port, if it still exists
    pub fn resolve<'g>(&self, graph: &'g Graph) -> Option<&'g Port> {
        graph.node(self.node)?.port(&self.field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes;
    use crate::node::NodeRegistry;

    fn graph_with_float() -> (Graph, NodeId, NodeRegistry) {
        let registry = nodes::standard_registry();
        let mut graph = Graph::new("g");
        let node = registry.create_node("float").expect("registered");
        let id = graph.add_node(node);
        (graph, id, registry)
    }

    #[test]
    fn test_resolve_live_target() {
        let (graph, id, _registry) = graph_with_float();
        let connection = Connection::to(id, "value");
        let port = connection.resolve(&graph).expect("port exists");
        assert_eq!(port.field(), "value");
        assert_eq!(port.node(), id);
    }

    #[test]
    fn test_resolve_dangling_target() {
        let (mut graph, id, registry) = graph_with_float();
        let connection = Connection::to(id, "value");
        graph.remove_node(&registry, id);
        assert!(connection.resolve(&graph).is_none());

        let missing_field = Connection::to(id, "no_such_field");
        assert!(missing_field.resolve(&graph).is_none());
    }
}
