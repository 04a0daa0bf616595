// SPDX-License-Identifier: MIT OR Apache-2.0
//! Constant value nodes backed by a `value` property.

use crate::evaluation::EvalContext;
use crate::node::{Node, NodeBehavior, NodeCategory, NodeRegistry, NodeTypeDef};
use crate::port::{Port, Value, ValueType};
use crate::schema::PortSchema;

/// Returns the node's `value` property, or the type's zero value when the
/// property was never set.
struct Constant {
    fallback: Value,
}

impl NodeBehavior for Constant {
    fn value(&self, _ctx: &EvalContext<'_, '_>, node: &Node, _port: &Port) -> Option<Value> {
        Some(node.property_or("value", self.fallback.clone()))
    }
}

fn constant_def(id: &str, title: &str, value_type: ValueType, fallback: Value) -> NodeTypeDef {
    NodeTypeDef {
        id: id.to_owned(),
        title: title.to_owned(),
        category: NodeCategory::Input,
        description: format!("Constant {title} value"),
        ports: vec![PortSchema::output("value", value_type).inherited()],
        behavior: Box::new(Constant { fallback }),
    }
}

/// Register the constant node types
pub fn register(registry: &mut NodeRegistry) {
    registry.register(constant_def("float", "Float", ValueType::Float, Value::Float(0.0)));
    registry.register(constant_def("int", "Int", ValueType::Int, Value::Int(0)));
    registry.register(constant_def(
        "string",
        "String",
        ValueType::String,
        Value::String(String::new()),
    ));
    registry.register(constant_def(
        "vector3",
        "Vector3",
        ValueType::Vector3,
        Value::Vector3([0.0, 0.0, 0.0]),
    ));
}
