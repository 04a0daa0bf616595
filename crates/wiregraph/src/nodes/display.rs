// SPDX-License-Identifier: MIT OR Apache-2.0
//! Pass-through display node.

use crate::evaluation::EvalContext;
use crate::node::{Node, NodeBehavior, NodeCategory, NodeRegistry, NodeTypeDef};
use crate::port::{Port, Value, ValueType};
use crate::schema::PortSchema;

/// Forwards whatever is connected to `result`, defaulting to an empty
/// string so a sink always has something to show.
struct Display;

impl NodeBehavior for Display {
    fn value(&self, ctx: &EvalContext<'_, '_>, node: &Node, _port: &Port) -> Option<Value> {
        Some(ctx.input_value(node, "result", Value::String(String::new())))
    }
}

/// Register the display node type
pub fn register(registry: &mut NodeRegistry) {
    registry.register(NodeTypeDef {
        id: "display".to_owned(),
        title: "Display".to_owned(),
        category: NodeCategory::Output,
        description: "Shows the connected value".to_owned(),
        ports: vec![PortSchema::input("result", ValueType::String).single()],
        behavior: Box::new(Display),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::PortRef;
    use crate::evaluation::Evaluator;
    use crate::graph::Graph;
    use crate::nodes;

    #[test]
    fn test_display_forwards_upstream_value() {
        let registry = nodes::standard_registry();
        let mut graph = Graph::new("g");
        let display = graph.add_node(registry.create_node("display").expect("registered"));
        let constant = graph.add_node(registry.create_node("string").expect("registered"));
        graph
            .node_mut(constant)
            .expect("node")
            .set_property("value", Value::String("hello".into()));
        graph
            .connect(
                &registry,
                &PortRef::new(constant, "value"),
                &PortRef::new(display, "result"),
            )
            .expect("connect");

        let eval = Evaluator::new(&graph, &registry);
        assert_eq!(
            eval.value(&PortRef::new(display, "result")),
            Some(Value::String("hello".into()))
        );
    }

    #[test]
    fn test_display_defaults_to_empty_string() {
        let registry = nodes::standard_registry();
        let mut graph = Graph::new("g");
        let display = graph.add_node(registry.create_node("display").expect("registered"));

        let eval = Evaluator::new(&graph, &registry);
        assert_eq!(
            eval.value(&PortRef::new(display, "result")),
            Some(Value::String(String::new()))
        );
    }
}
