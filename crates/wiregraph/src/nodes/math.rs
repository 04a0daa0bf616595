// SPDX-License-Identifier: MIT OR Apache-2.0
//! Binary float arithmetic nodes.

use crate::evaluation::EvalContext;
use crate::node::{Node, NodeBehavior, NodeCategory, NodeRegistry, NodeTypeDef};
use crate::port::{Port, Value, ValueType};
use crate::schema::PortSchema;

#[derive(Clone, Copy)]
enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

/// Pulls `x` and `y`, falling back to the node's properties of the same
/// name when unconnected, and applies the operation. The requested port is
/// ignored on purpose: there is only one meaningful result.
struct BinaryMath {
    op: BinaryOp,
}

impl NodeBehavior for BinaryMath {
    fn value(&self, ctx: &EvalContext<'_, '_>, node: &Node, _port: &Port) -> Option<Value> {
        let x = ctx
            .input_value(node, "x", node.property_or("x", Value::Float(0.0)))
            .as_float()?;
        let y = ctx
            .input_value(node, "y", node.property_or("y", Value::Float(0.0)))
            .as_float()?;

        let result = match self.op {
            BinaryOp::Add => x + y,
            BinaryOp::Subtract => x - y,
            BinaryOp::Multiply => x * y,
            BinaryOp::Divide => {
                if y == 0.0 {
                    return None;
                }
                x / y
            }
        };
        Some(Value::Float(result))
    }
}

fn binary_def(id: &str, title: &str, description: &str, op: BinaryOp) -> NodeTypeDef {
    NodeTypeDef {
        id: id.to_owned(),
        title: title.to_owned(),
        category: NodeCategory::Math,
        description: description.to_owned(),
        ports: vec![
            PortSchema::input("x", ValueType::Float).single().inherited(),
            PortSchema::input("y", ValueType::Float).single().inherited(),
            PortSchema::output("result", ValueType::Float).inherited(),
        ],
        behavior: Box::new(BinaryMath { op }),
    }
}

/// Register the math node types
pub fn register(registry: &mut NodeRegistry) {
    registry.register(binary_def("add", "Add", "Add two values", BinaryOp::Add));
    registry.register(binary_def(
        "subtract",
        "Subtract",
        "Subtract y from x",
        BinaryOp::Subtract,
    ));
    registry.register(binary_def(
        "multiply",
        "Multiply",
        "Multiply two values",
        BinaryOp::Multiply,
    ));
    registry.register(binary_def(
        "divide",
        "Divide",
        "Divide x by y",
        BinaryOp::Divide,
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::PortRef;
    use crate::evaluation::Evaluator;
    use crate::graph::Graph;
    use crate::nodes;

    fn eval_with_properties(tag: &str, x: f32, y: f32) -> Option<Value> {
        let registry = nodes::standard_registry();
        let mut graph = Graph::new("g");
        let id = graph.add_node(registry.create_node(tag).expect("registered"));
        let node = graph.node_mut(id).expect("node");
        node.set_property("x", Value::Float(x));
        node.set_property("y", Value::Float(y));

        let eval = Evaluator::new(&graph, &registry);
        eval.value(&PortRef::new(id, "result"))
    }

    #[test]
    fn test_unconnected_inputs_use_property_fallbacks() {
        assert_eq!(eval_with_properties("add", 2.0, 5.0), Some(Value::Float(7.0)));
        assert_eq!(eval_with_properties("subtract", 2.0, 5.0), Some(Value::Float(-3.0)));
        assert_eq!(eval_with_properties("multiply", 2.0, 5.0), Some(Value::Float(10.0)));
        assert_eq!(eval_with_properties("divide", 10.0, 5.0), Some(Value::Float(2.0)));
    }

    #[test]
    fn test_divide_by_zero_yields_no_value() {
        assert_eq!(eval_with_properties("divide", 1.0, 0.0), None);
    }

    #[test]
    fn test_chained_operations() {
        let registry = nodes::standard_registry();
        let mut graph = Graph::new("g");
        let mul = graph.add_node(registry.create_node("multiply").expect("registered"));
        let add = graph.add_node(registry.create_node("add").expect("registered"));

        // (2 + 3) * 4
        {
            let node = graph.node_mut(add).expect("node");
            node.set_property("x", Value::Float(2.0));
            node.set_property("y", Value::Float(3.0));
        }
        graph
            .node_mut(mul)
            .expect("node")
            .set_property("y", Value::Float(4.0));
        graph
            .connect(&registry, &PortRef::new(add, "result"), &PortRef::new(mul, "x"))
            .expect("connect");

        let eval = Evaluator::new(&graph, &registry);
        assert_eq!(eval.value(&PortRef::new(mul, "result")), Some(Value::Float(20.0)));
    }

    #[test]
    fn test_result_port_identity_is_irrelevant() {
        // Asking any of the node's ports for a value computes the same sum.
        let registry = nodes::standard_registry();
        let mut graph = Graph::new("g");
        let id = graph.add_node(registry.create_node("add").expect("registered"));
        graph
            .node_mut(id)
            .expect("node")
            .set_property("x", Value::Float(1.0));

        let eval = Evaluator::new(&graph, &registry);
        assert_eq!(eval.value(&PortRef::new(id, "x")), Some(Value::Float(1.0)));
    }
}
