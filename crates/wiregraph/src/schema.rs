// SPDX-License-Identifier: MIT OR Apache-2.0
//! Port schema declarations and live-port synchronization.
//!
//! A node type declares its ports once; live nodes carry whatever ports
//! they were serialized with. [`synchronize`] reconciles the two whenever a
//! node is activated or its type's declaration changes: missing ports are
//! added, changed ports are repaired in place, obsolete ports are removed,
//! and connections that no longer pass the compatibility test are pruned.
//! The algorithm is idempotent and safe to run repeatedly.

use crate::connection::{Connection, PortRef};
use crate::graph::Graph;
use crate::node::{NodeBehavior, NodeId};
use crate::port::{Port, PortCapacity, PortDirection, TypeConstraint, ValueType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Declared attributes of one port on a node type.
///
/// Declarations default to `Multi` capacity and no type constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortSchema {
    /// Field name (unique within the node type)
    pub field: String,
    /// Declared direction; `Both` expands into two physical ports
    pub direction: PortDirection,
    /// Connection count limit
    pub capacity: PortCapacity,
    /// Type matching policy
    pub constraint: TypeConstraint,
    /// Type of values flowing through the port
    pub value_type: ValueType,
}

impl PortSchema {
    /// Declare a port
    pub fn new(field: impl Into<String>, direction: PortDirection, value_type: ValueType) -> Self {
        Self {
            field: field.into(),
            direction,
            capacity: PortCapacity::Multi,
            constraint: TypeConstraint::None,
            value_type,
        }
    }

    /// Declare an input port
    pub fn input(field: impl Into<String>, value_type: ValueType) -> Self {
        Self::new(field, PortDirection::Input, value_type)
    }

    /// Declare an output port
    pub fn output(field: impl Into<String>, value_type: ValueType) -> Self {
        Self::new(field, PortDirection::Output, value_type)
    }

    /// Declare a both-direction port (expands into an input and an output)
    pub fn both(field: impl Into<String>, value_type: ValueType) -> Self {
        Self::new(field, PortDirection::Both, value_type)
    }

    /// Limit to a single connection
    pub fn single(mut self) -> Self {
        self.capacity = PortCapacity::Single;
        self
    }

    /// Accept the same type or a type assignable to it
    pub fn inherited(mut self) -> Self {
        self.constraint = TypeConstraint::Inherited;
        self
    }

    /// Accept exactly the same type
    pub fn strict(mut self) -> Self {
        self.constraint = TypeConstraint::Strict;
        self
    }

    /// Set the type matching policy
    pub fn constraint(mut self, constraint: TypeConstraint) -> Self {
        self.constraint = constraint;
        self
    }
}

/// Derived name for one half of an expanded `Both` declaration
pub fn both_name(field: &str, direction: PortDirection) -> String {
    match direction {
        PortDirection::Input => format!("{field} In"),
        PortDirection::Output => format!("{field} Out"),
        PortDirection::Both => field.to_owned(),
    }
}

/// Expand `Both` declarations into their input and output halves
pub(crate) fn expand(declared: &[PortSchema]) -> Vec<PortSchema> {
    let mut expanded = Vec::with_capacity(declared.len());
    for entry in declared {
        if entry.direction == PortDirection::Both {
            for direction in [PortDirection::Input, PortDirection::Output] {
                let mut half = entry.clone();
                half.field = both_name(&entry.field, direction);
                half.direction = direction;
                expanded.push(half);
            }
        } else {
            expanded.push(entry.clone());
        }
    }
    expanded
}

/// Capability supplying declared ports and compute behavior per node type.
///
/// The core never inspects type metadata itself; any implementation (static
/// registry, code generation, runtime inspection) may back this.
pub trait SchemaProvider {
    /// Ordered port declarations for a node type (`Both` not yet expanded).
    /// Unknown tags yield an empty list.
    fn declared_ports(&self, type_tag: &str) -> Vec<PortSchema>;

    /// Compute behavior for a node type, if one is registered
    fn behavior(&self, type_tag: &str) -> Option<&dyn NodeBehavior>;
}

/// Read-through cache of expanded port declarations per node type.
///
/// Invalidation is explicit and deterministic: call [`SchemaCache::invalidate`]
/// (or [`SchemaCache::invalidate_type`]) after the backing provider changes,
/// then re-run synchronization.
#[derive(Debug, Default)]
pub struct SchemaCache {
    ports: HashMap<String, Vec<PortSchema>>,
}

impl SchemaCache {
    /// Create a new empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Expanded declarations for a node type, filled from the provider on
    /// first use
    pub fn ports(&mut self, provider: &dyn SchemaProvider, type_tag: &str) -> &[PortSchema] {
        self.ports
            .entry(type_tag.to_owned())
            .or_insert_with(|| expand(&provider.declared_ports(type_tag)))
    }

    /// Drop every cached declaration
    pub fn invalidate(&mut self) {
        self.ports.clear();
    }

    /// Drop the cached declaration for one node type
    pub fn invalidate_type(&mut self, type_tag: &str) {
        self.ports.remove(type_tag);
    }
}

/// Reconcile one node's live ports against its declared schema.
///
/// Ports are matched purely by field name. A declared name reused for a
/// different role after a schema change therefore adopts the new role's
/// attributes rather than being treated as a rename; that drift is accepted,
/// not repaired.
pub fn synchronize(
    graph: &mut Graph,
    node_id: NodeId,
    cache: &mut SchemaCache,
    provider: &dyn SchemaProvider,
) {
    let Some(node) = graph.node(node_id) else { return };
    let type_tag = node.type_tag().to_owned();
    let live: Vec<String> = node.port_names().map(str::to_owned).collect();

    let declared = cache.ports(provider, &type_tag);
    let by_name: HashMap<&str, &PortSchema> = declared
        .iter()
        .map(|entry| (entry.field.as_str(), entry))
        .collect();

    for field in live {
        let address = PortRef::new(node_id, field.as_str());
        let Some(entry) = by_name.get(field.as_str()) else {
            // Obsolete: the declaration is gone.
            graph.clear_port_connections(provider, &address);
            if let Some(node) = graph.node_mut(node_id) {
                node.remove_port(&field);
            }
            tracing::debug!(node = ?node_id.0, field = %field, "removed obsolete port");
            continue;
        };

        let Some(port) = graph.port(&address) else { continue };
        let direction_changed = port.direction() != entry.direction;
        let stale = direction_changed
            || port.value_type() != &entry.value_type
            || port.capacity() != entry.capacity
            || port.constraint() != entry.constraint;

        if !stale {
            // Refresh the cached type handle; guards against type-identity
            // changes across a reload without otherwise perturbing state.
            if let Some(port) = graph.node_mut(node_id).and_then(|n| n.port_mut(&field)) {
                port.refresh_value_type(entry.value_type.clone());
            }
        } else if direction_changed {
            // Direction is fixed for a port's lifetime: replace the port
            // wholesale instead of rewriting it.
            graph.clear_port_connections(provider, &address);
            if let Some(node) = graph.node_mut(node_id) {
                node.insert_port(Port::from_schema(entry, node_id));
            }
            tracing::debug!(node = ?node_id.0, field = %field, "replaced port after direction change");
        } else {
            if let Some(port) = graph.node_mut(node_id).and_then(|n| n.port_mut(&field)) {
                port.reload(entry);
            }
            // Keep only the connections still valid under the new attributes.
            let targets: Vec<PortRef> = graph
                .port(&address)
                .map(|p| {
                    p.connections()
                        .iter()
                        .filter(|c| c.resolve(graph).is_some())
                        .map(Connection::port_ref)
                        .collect()
                })
                .unwrap_or_default();
            for target in &targets {
                let compatible = match (graph.port(&address), graph.port(target)) {
                    (Some(own), Some(far)) => own.is_compatible(far),
                    _ => true,
                };
                if !compatible {
                    graph.disconnect(provider, &address, target);
                    tracing::debug!(
                        node = ?node_id.0,
                        field = %field,
                        "pruned incompatible connection after schema change"
                    );
                }
            }
        }
    }

    // Add every declared port with no live counterpart.
    for entry in declared {
        let missing = graph
            .node(node_id)
            .is_some_and(|n| !n.has_port(&entry.field));
        if missing {
            if let Some(node) = graph.node_mut(node_id) {
                node.insert_port(Port::from_schema(entry, node_id));
            }
        }
    }
}

/// Reconcile every node in the graph, e.g. immediately after load
pub fn synchronize_all(graph: &mut Graph, cache: &mut SchemaCache, provider: &dyn SchemaProvider) {
    let ids: Vec<NodeId> = graph.node_ids().collect();
    for id in ids {
        synchronize(graph, id, cache, provider);
    }
}
