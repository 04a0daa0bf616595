// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions: instances, per-type behavior and the type registry.

use crate::connection::PortRef;
use crate::evaluation::EvalContext;
use crate::port::{Port, PortDirection, Value};
use crate::schema::{self, PortSchema, SchemaProvider};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a node, stable across the node's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Create a new random node ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// Node type category, used to group registered types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeCategory {
    /// Source nodes (constants, parameters)
    Input,
    /// Sink nodes (display, result)
    Output,
    /// Math operations
    Math,
    /// Utility nodes
    Utility,
    /// Custom/user-defined
    Custom,
}

/// A node instance in the graph.
///
/// The type tag selects the node's declared port schema and its compute
/// behavior through a [`SchemaProvider`]. Ports are keyed by field name;
/// insertion order is irrelevant for evaluation and only kept stable for
/// serialization and UI iteration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    id: NodeId,
    type_tag: String,
    /// Display name (can be customized)
    pub name: String,
    /// Position in the graph UI, irrelevant to evaluation
    pub position: [f32; 2],
    ports: IndexMap<String, Port>,
    properties: IndexMap<String, Value>,
}

impl Node {
    /// Create an empty node with the given type tag. Ports are populated by
    /// [`NodeRegistry::create_node`] or by schema synchronization.
    pub fn new(type_tag: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: NodeId::new(),
            type_tag: type_tag.into(),
            name: name.into(),
            position: [0.0, 0.0],
            ports: IndexMap::new(),
            properties: IndexMap::new(),
        }
    }

    /// Set the position
    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.position = [x, y];
        self
    }

    /// Unique instance ID
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Type tag, selecting schema and behavior
    pub fn type_tag(&self) -> &str {
        &self.type_tag
    }

    /// Get a port by field name
    pub fn port(&self, field: &str) -> Option<&Port> {
        self.ports.get(field)
    }

    /// Get an input port by field name, `None` if absent or not an input
    pub fn input(&self, field: &str) -> Option<&Port> {
        self.port(field)
            .filter(|p| p.direction() == PortDirection::Input)
    }

    /// Get an output port by field name, `None` if absent or not an output
    pub fn output(&self, field: &str) -> Option<&Port> {
        self.port(field)
            .filter(|p| p.direction() == PortDirection::Output)
    }

    /// Whether a port with this field name exists
    pub fn has_port(&self, field: &str) -> bool {
        self.ports.contains_key(field)
    }

    /// All ports, in insertion order
    pub fn ports(&self) -> impl Iterator<Item = &Port> {
        self.ports.values()
    }

    /// Field names of all ports, in insertion order
    pub fn port_names(&self) -> impl Iterator<Item = &str> {
        self.ports.keys().map(String::as_str)
    }

    pub(crate) fn port_mut(&mut self, field: &str) -> Option<&mut Port> {
        self.ports.get_mut(field)
    }

    pub(crate) fn ports_mut(&mut self) -> impl Iterator<Item = &mut Port> {
        self.ports.values_mut()
    }

    /// Inserts or replaces; replacing keeps the original map position.
    pub(crate) fn insert_port(&mut self, port: Port) {
        self.ports.insert(port.field().to_owned(), port);
    }

    /// Order-preserving removal.
    pub(crate) fn remove_port(&mut self, field: &str) -> Option<Port> {
        self.ports.shift_remove(field)
    }

    /// Per-instance property value
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// Per-instance property value, or `fallback` when unset
    pub fn property_or(&self, name: &str, fallback: Value) -> Value {
        self.properties.get(name).cloned().unwrap_or(fallback)
    }

    /// Set a per-instance property value
    pub fn set_property(&mut self, name: impl Into<String>, value: Value) {
        self.properties.insert(name.into(), value);
    }

    /// All properties, in insertion order
    pub fn properties(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Clone under a fresh identity, re-owning every port. Connection
    /// records still point wherever the original's pointed.
    pub(crate) fn duplicate(&self) -> Self {
        let mut node = self.clone();
        node.id = NodeId::new();
        for port in node.ports.values_mut() {
            port.set_node(node.id);
        }
        node
    }

    /// Drop all connection records without touching the far sides. Used on
    /// fresh copies, whose records reference the original's pairings.
    pub(crate) fn strip_connections(&mut self) {
        for port in self.ports.values_mut() {
            port.connections.clear();
        }
    }
}

/// Per-type compute behavior and topology hooks.
///
/// Each node type implements one `value` entry point; the core treats all
/// node instances uniformly through this capability.
pub trait NodeBehavior {
    /// Compute the semantic value of one of the node's ports. Must tolerate
    /// being called with any port the node owns, whatever its direction.
    fn value(&self, ctx: &EvalContext<'_, '_>, node: &Node, port: &Port) -> Option<Value>;

    /// Called after a connection involving one of the node's ports is
    /// created. `own_field` names the port on this node.
    fn on_create_connection(&self, node: &mut Node, own_field: &str, other: &PortRef) {
        let _ = (node, own_field, other);
    }

    /// Called after a connection involving one of the node's ports is
    /// removed. `own_field` names the port on this node.
    fn on_remove_connection(&self, node: &mut Node, own_field: &str, other: &PortRef) {
        let _ = (node, own_field, other);
    }
}

/// Node type definition: declared ports plus behavior
pub struct NodeTypeDef {
    /// Unique type tag
    pub id: String,
    /// Display name
    pub title: String,
    /// Category
    pub category: NodeCategory,
    /// Description
    pub description: String,
    /// Declared port schema, in declaration order (`Both` not yet expanded)
    pub ports: Vec<PortSchema>,
    /// Compute behavior and hooks
    pub behavior: Box<dyn NodeBehavior>,
}

/// Registry of available node types; the standard [`SchemaProvider`].
#[derive(Default)]
pub struct NodeRegistry {
    types: IndexMap<String, NodeTypeDef>,
}

impl NodeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            types: IndexMap::new(),
        }
    }

    /// Register a node type
    pub fn register(&mut self, def: NodeTypeDef) {
        self.types.insert(def.id.clone(), def);
    }

    /// Get a node type by tag
    pub fn get(&self, id: &str) -> Option<&NodeTypeDef> {
        self.types.get(id)
    }

    /// All registered types
    pub fn types(&self) -> impl Iterator<Item = &NodeTypeDef> {
        self.types.values()
    }

    /// Registered types in a category
    pub fn types_in_category(&self, category: NodeCategory) -> impl Iterator<Item = &NodeTypeDef> {
        self.types.values().filter(move |t| t.category == category)
    }

    /// Create a node instance from a type tag, with its declared ports
    /// already expanded and populated.
    pub fn create_node(&self, id: &str) -> Option<Node> {
        let def = self.get(id)?;
        let mut node = Node::new(&def.id, &def.title);
        for entry in schema::expand(&def.ports) {
            node.insert_port(Port::from_schema(&entry, node.id()));
        }
        Some(node)
    }
}

impl SchemaProvider for NodeRegistry {
    fn declared_ports(&self, type_tag: &str) -> Vec<PortSchema> {
        self.get(type_tag)
            .map(|def| def.ports.clone())
            .unwrap_or_default()
    }

    fn behavior(&self, type_tag: &str) -> Option<&dyn NodeBehavior> {
        self.get(type_tag).map(|def| def.behavior.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes;
    use crate::port::{PortCapacity, TypeConstraint, ValueType};

    #[test]
    fn test_create_node_populates_declared_ports() {
        let registry = nodes::standard_registry();
        let node = registry.create_node("add").expect("registered");

        assert_eq!(node.type_tag(), "add");
        let x = node.input("x").expect("input port");
        assert_eq!(x.capacity(), PortCapacity::Single);
        assert_eq!(x.constraint(), TypeConstraint::Inherited);
        assert_eq!(x.value_type(), &ValueType::Float);
        assert!(node.input("result").is_none());
        assert!(node.output("result").is_some());
        assert_eq!(node.ports().count(), 3);
        for port in node.ports() {
            assert_eq!(port.node(), node.id());
            assert_eq!(port.connection_count(), 0);
        }
    }

    #[test]
    fn test_create_node_unknown_tag() {
        let registry = nodes::standard_registry();
        assert!(registry.create_node("no_such_type").is_none());
    }

    #[test]
    fn test_property_fallback() {
        let registry = nodes::standard_registry();
        let mut node = registry.create_node("float").expect("registered");
        assert_eq!(node.property_or("value", Value::Float(0.0)), Value::Float(0.0));
        node.set_property("value", Value::Float(2.5));
        assert_eq!(node.property_or("value", Value::Float(0.0)), Value::Float(2.5));
    }

    #[test]
    fn test_duplicate_reowns_ports() {
        let registry = nodes::standard_registry();
        let node = registry.create_node("add").expect("registered");
        let copy = node.duplicate();

        assert_ne!(copy.id(), node.id());
        for port in copy.ports() {
            assert_eq!(port.node(), copy.id());
        }
    }

    #[test]
    fn test_types_in_category() {
        let registry = nodes::standard_registry();
        let math: Vec<&str> = registry
            .types_in_category(NodeCategory::Math)
            .map(|t| t.id.as_str())
            .collect();
        assert!(math.contains(&"add"));
        assert!(!math.contains(&"float"));
    }
}
