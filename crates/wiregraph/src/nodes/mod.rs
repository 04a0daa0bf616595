// SPDX-License-Identifier: MIT OR Apache-2.0
//! Standard node library: math operations, constants and display.

pub mod display;
pub mod math;
pub mod property;

use crate::node::NodeRegistry;

/// Build a registry with every standard node type
pub fn standard_registry() -> NodeRegistry {
    let mut registry = NodeRegistry::new();
    property::register(&mut registry);
    math::register(&mut registry);
    display::register(&mut registry);
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry_contents() {
        let registry = standard_registry();
        for id in ["add", "subtract", "multiply", "divide", "float", "int", "string", "vector3", "display"] {
            assert!(registry.get(id).is_some(), "missing node type {id}");
        }
    }
}
