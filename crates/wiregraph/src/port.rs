// SPDX-License-Identifier: MIT OR Apache-2.0
//! Port definitions: direction, capacity, type constraints and values.

use crate::connection::{Connection, PortRef};
use crate::node::NodeId;
use crate::schema::PortSchema;
use serde::{Deserialize, Serialize};

/// Port direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortDirection {
    /// Input port
    Input,
    /// Output port
    Output,
    /// Declaration-time convenience: expands into one Input and one Output
    /// port with derived names. Never appears on a live port.
    Both,
}

/// How many connections a port accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortCapacity {
    /// Any number of connections
    Multi,
    /// At most one connection
    Single,
}

/// Policy governing which value types may connect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeConstraint {
    /// Accept any type
    None,
    /// Accept the same type or a type assignable to it
    Inherited,
    /// Accept exactly the same type
    Strict,
}

/// Type tag for values flowing through ports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueType {
    /// Boolean value
    Bool,
    /// Integer value
    Int,
    /// Floating point value
    Float,
    /// 2D vector
    Vector2,
    /// 3D vector
    Vector3,
    /// 4D vector
    Vector4,
    /// String value
    String,
    /// Any type (assignable from everything)
    Any,
    /// Custom type, matched by name
    Custom(String),
}

impl ValueType {
    /// Covariance relation used by the `Inherited` constraint: `true` if a
    /// value of `other` may flow into a slot of type `self`.
    pub fn is_assignable_from(&self, other: &ValueType) -> bool {
        if self == other {
            return true;
        }

        match (self, other) {
            (Self::Any, _) => true,
            // Numeric widening
            (Self::Float, Self::Int) => true,
            // Scalar splat into vectors
            (Self::Vector2 | Self::Vector3 | Self::Vector4, Self::Float) => true,
            // Vector widening
            (Self::Vector3, Self::Vector2) => true,
            (Self::Vector4, Self::Vector3) => true,
            _ => false,
        }
    }
}

/// Value that can flow through a port
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i32),
    /// Float
    Float(f32),
    /// 2D vector
    Vector2([f32; 2]),
    /// 3D vector
    Vector3([f32; 3]),
    /// 4D vector
    Vector4([f32; 4]),
    /// String
    String(String),
}

impl Value {
    /// Get the type tag for this value
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Bool(_) => ValueType::Bool,
            Self::Int(_) => ValueType::Int,
            Self::Float(_) => ValueType::Float,
            Self::Vector2(_) => ValueType::Vector2,
            Self::Vector3(_) => ValueType::Vector3,
            Self::Vector4(_) => ValueType::Vector4,
            Self::String(_) => ValueType::String,
        }
    }

    /// Read as a float, widening integers
    pub fn as_float(&self) -> Option<f32> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) => Some(*i as f32),
            _ => None,
        }
    }

    /// Read as an integer
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Read as a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Read as a string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

/// A single named, typed, directed connection point belonging to one node.
///
/// Identity is `(owning node, field name)`. The direction is fixed for the
/// lifetime of the port; schema synchronization may rewrite type, capacity
/// and constraint in place but replaces the port outright on a direction
/// change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Port {
    field: String,
    node: NodeId,
    direction: PortDirection,
    capacity: PortCapacity,
    constraint: TypeConstraint,
    value_type: ValueType,
    pub(crate) connections: Vec<Connection>,
}

impl Port {
    /// Build a live port from a schema declaration
    pub(crate) fn from_schema(entry: &PortSchema, node: NodeId) -> Self {
        Self {
            field: entry.field.clone(),
            node,
            direction: entry.direction,
            capacity: entry.capacity,
            constraint: entry.constraint,
            value_type: entry.value_type.clone(),
            connections: Vec::new(),
        }
    }

    /// Rewrite the declared attributes from a schema entry, keeping the
    /// field name, direction and existing connections.
    pub(crate) fn reload(&mut self, entry: &PortSchema) {
        self.capacity = entry.capacity;
        self.constraint = entry.constraint;
        self.value_type = entry.value_type.clone();
    }

    /// Refresh the cached type handle without touching anything else
    pub(crate) fn refresh_value_type(&mut self, value_type: ValueType) {
        self.value_type = value_type;
    }

    /// Field name (unique within the owning node)
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Identity of the owning node
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub(crate) fn set_node(&mut self, node: NodeId) {
        self.node = node;
    }

    /// Port direction
    pub fn direction(&self) -> PortDirection {
        self.direction
    }

    /// Connection count limit
    pub fn capacity(&self) -> PortCapacity {
        self.capacity
    }

    /// Type matching policy
    pub fn constraint(&self) -> TypeConstraint {
        self.constraint
    }

    /// Type of values flowing through this port
    pub fn value_type(&self) -> &ValueType {
        &self.value_type
    }

    /// Address of this port
    pub fn port_ref(&self) -> PortRef {
        PortRef::new(self.node, &self.field)
    }

    /// Connection records, in connection order
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Number of connection records
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Whether any connection record exists
    pub fn is_connected(&self) -> bool {
        !self.connections.is_empty()
    }

    /// First connection record, if any
    pub fn first_connection(&self) -> Option<&Connection> {
        self.connections.first()
    }

    /// Whether a record pairing this port with `other` exists on this side
    pub fn is_connected_to(&self, other: &Port) -> bool {
        self.connections
            .iter()
            .any(|c| c.node == other.node && c.field == other.field)
    }

    /// Check this side's half of the compatibility rule. A connection is
    /// permitted only when both sides approve, since each side's constraint
    /// policy is independent.
    pub fn is_compatible(&self, other: &Port) -> bool {
        if other.constraint == TypeConstraint::None || self.constraint == TypeConstraint::None {
            return true;
        }

        match self.constraint {
            TypeConstraint::Inherited => self.value_type.is_assignable_from(&other.value_type),
            TypeConstraint::Strict => self.value_type == other.value_type,
            TypeConstraint::None => true,
        }
    }

    /// Rewrite each connection's target node from its old identity to the
    /// new identity at the same index. Used when deep-copying a graph to
    /// preserve topology across the clone.
    pub fn redirect(&mut self, old_nodes: &[NodeId], new_nodes: &[NodeId]) {
        for connection in &mut self.connections {
            if let Some(index) = old_nodes.iter().position(|id| *id == connection.node) {
                connection.node = new_nodes[index];
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn port(direction: PortDirection, value_type: ValueType, constraint: TypeConstraint) -> Port {
        let entry = PortSchema::new("p", direction, value_type).constraint(constraint);
        Port::from_schema(&entry, NodeId::new())
    }

    #[test]
    fn test_assignability_lattice() {
        assert!(ValueType::Float.is_assignable_from(&ValueType::Int));
        assert!(!ValueType::Int.is_assignable_from(&ValueType::Float));
        assert!(ValueType::Any.is_assignable_from(&ValueType::String));
        assert!(!ValueType::String.is_assignable_from(&ValueType::Any));
        assert!(ValueType::Vector3.is_assignable_from(&ValueType::Float));
        assert!(ValueType::Custom("foo".into()).is_assignable_from(&ValueType::Custom("foo".into())));
        assert!(!ValueType::Custom("foo".into()).is_assignable_from(&ValueType::Custom("bar".into())));
    }

    #[test]
    fn test_none_constraint_accepts_anything() {
        let a = port(PortDirection::Output, ValueType::String, TypeConstraint::None);
        let b = port(PortDirection::Input, ValueType::Vector2, TypeConstraint::Strict);
        // Either side declaring None short-circuits both checks.
        assert!(a.is_compatible(&b));
        assert!(b.is_compatible(&a));
    }

    #[test]
    fn test_strict_requires_exact_type() {
        let a = port(PortDirection::Output, ValueType::Float, TypeConstraint::Strict);
        let b = port(PortDirection::Input, ValueType::Float, TypeConstraint::Strict);
        let c = port(PortDirection::Input, ValueType::Int, TypeConstraint::Strict);
        assert!(a.is_compatible(&b));
        assert!(!a.is_compatible(&c));
        assert!(!c.is_compatible(&a));
    }

    #[test]
    fn test_inherited_is_covariant() {
        // A supertype slot accepts a subtype value, not the reverse.
        let wide = port(PortDirection::Input, ValueType::Float, TypeConstraint::Inherited);
        let narrow = port(PortDirection::Output, ValueType::Int, TypeConstraint::None);
        assert!(wide.is_compatible(&narrow));

        let narrow_in = port(PortDirection::Input, ValueType::Int, TypeConstraint::Inherited);
        let wide_out = port(PortDirection::Output, ValueType::Float, TypeConstraint::None);
        assert!(!narrow_in.is_compatible(&wide_out));
    }

    #[test]
    fn test_inherited_against_strict_must_agree_exactly() {
        // Output accepts the pairing through covariance, but the strict
        // input side independently rejects it: both sides must approve.
        let out = port(PortDirection::Output, ValueType::Float, TypeConstraint::Inherited);
        let strict_in = port(PortDirection::Input, ValueType::Int, TypeConstraint::Strict);
        assert!(out.is_compatible(&strict_in));
        assert!(!strict_in.is_compatible(&out));
    }

    #[test]
    fn test_value_coercions() {
        assert_eq!(Value::Int(3).as_float(), Some(3.0));
        assert_eq!(Value::Float(1.5).as_float(), Some(1.5));
        assert_eq!(Value::String("x".into()).as_float(), None);
        assert_eq!(Value::Bool(true).as_bool(), Some(true));
        assert_eq!(Value::Float(2.0).value_type(), ValueType::Float);
    }

    #[test]
    fn test_redirect_rewrites_matching_targets_only() {
        let old = NodeId::new();
        let unrelated = NodeId::new();
        let new = NodeId::new();

        let mut p = port(PortDirection::Input, ValueType::Float, TypeConstraint::None);
        p.connections.push(Connection::to(old, "a"));
        p.connections.push(Connection::to(unrelated, "b"));
        p.redirect(&[old], &[new]);

        assert_eq!(p.connections[0].node, new);
        assert_eq!(p.connections[1].node, unrelated);
    }
}
