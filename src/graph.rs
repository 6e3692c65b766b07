//! Declared-resource graph.
//!
//! Every entity the synthesizer declares becomes a node; every "depends-on"
//! relationship becomes an explicit edge. The provisioning engine consumes the
//! edges to parallelize independent branches while serializing dependent ones,
//! so creation order is never implied by declaration order alone.

use std::collections::HashMap;

use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One declared resource: a provider-kind, a name unique within that kind,
/// opaque properties, and the addresses it depends on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeclaredResource {
    /// Provider resource kind, e.g. `aws_subnet`.
    pub kind: String,
    /// Resource name, unique within the kind.
    pub name: String,
    /// Provider-specific properties. The core never inspects these.
    pub properties: serde_json::Value,
    /// Addresses (`kind.name`) of resources that must exist first.
    pub depends_on: Vec<String>,
    /// Declaration sequence number, for stable plan output.
    pub sequence: u64,
}

impl DeclaredResource {
    /// The unique address of this resource within a plan.
    pub fn address(&self) -> String {
        format!("{}.{}", self.kind, self.name)
    }
}

/// The dependency graph of one synthesized plan.
///
/// Mutated only by the single synthesis pass; the `(kind, name)` address of
/// every node is unique and duplicates are rejected as [`Error::Graph`].
#[derive(Debug, Clone, Default)]
pub struct ResourceGraph {
    graph: DiGraph<DeclaredResource, ()>,
    node_indices: HashMap<String, NodeIndex>,
    sequence_counter: u64,
}

impl ResourceGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a resource node and its dependency edges.
    ///
    /// Every address in `depends_on` must already be declared; forward
    /// references would let the provisioning engine observe an incomplete
    /// ordering.
    pub fn declare(&mut self, mut resource: DeclaredResource) -> Result<()> {
        let address = resource.address();
        if self.node_indices.contains_key(&address) {
            return Err(Error::graph(format!("duplicate declaration '{address}'")));
        }

        resource.sequence = self.sequence_counter;
        self.sequence_counter += 1;

        let depends_on = resource.depends_on.clone();
        let idx = self.graph.add_node(resource);
        self.node_indices.insert(address.clone(), idx);

        for dep in &depends_on {
            let dep_idx = self.node_indices.get(dep).ok_or_else(|| {
                Error::graph(format!("'{address}' depends on undeclared '{dep}'"))
            })?;
            self.graph.add_edge(*dep_idx, idx, ());
        }
        Ok(())
    }

    /// Looks up a resource by address.
    pub fn get(&self, address: &str) -> Option<&DeclaredResource> {
        self.node_indices
            .get(address)
            .and_then(|idx| self.graph.node_weight(*idx))
    }

    /// All resources in declaration order.
    pub fn resources(&self) -> Vec<&DeclaredResource> {
        let mut all: Vec<&DeclaredResource> = self
            .graph
            .node_indices()
            .filter_map(|idx| self.graph.node_weight(idx))
            .collect();
        all.sort_by_key(|r| r.sequence);
        all
    }

    /// Resources of one kind, in declaration order.
    pub fn resources_of_kind(&self, kind: &str) -> Vec<&DeclaredResource> {
        self.resources()
            .into_iter()
            .filter(|r| r.kind == kind)
            .collect()
    }

    /// Number of declared resources.
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// True if nothing has been declared.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Number of dependency edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Direct prerequisites of a resource.
    pub fn dependencies_of(&self, address: &str) -> Vec<String> {
        let mut deps = Vec::new();
        if let Some(&idx) = self.node_indices.get(address) {
            for neighbor in self.graph.neighbors_directed(idx, Direction::Incoming) {
                if let Some(node) = self.graph.node_weight(neighbor) {
                    deps.push(node.address());
                }
            }
        }
        deps.sort();
        deps
    }

    /// True if the graph contains a dependency cycle.
    pub fn has_cycles(&self) -> bool {
        tarjan_scc(&self.graph).iter().any(|scc| scc.len() > 1)
    }

    /// A valid creation order: every resource appears after everything it
    /// depends on.
    pub fn creation_order(&self) -> Result<Vec<String>> {
        match toposort(&self.graph, None) {
            Ok(order) => Ok(order
                .into_iter()
                .filter_map(|idx| self.graph.node_weight(idx).map(DeclaredResource::address))
                .collect()),
            Err(_) => Err(Error::graph(
                "cannot determine creation order: dependency cycle exists".to_string(),
            )),
        }
    }

    /// DOT rendering for plan visualization.
    pub fn to_dot(&self) -> String {
        let mut output = String::new();
        output.push_str("digraph plan {\n");
        output.push_str("  rankdir=LR;\n");
        output.push_str("  node [shape=box];\n\n");

        for resource in self.resources() {
            output.push_str(&format!(
                "  \"{}\" [label=\"{}\\n{}\"];\n",
                resource.address(),
                resource.kind,
                resource.name
            ));
        }

        output.push('\n');

        for edge in self.graph.edge_references() {
            let source = self
                .graph
                .node_weight(edge.source())
                .map(DeclaredResource::address)
                .unwrap_or_else(|| "?".to_string());
            let target = self
                .graph
                .node_weight(edge.target())
                .map(DeclaredResource::address)
                .unwrap_or_else(|| "?".to_string());
            output.push_str(&format!("  \"{source}\" -> \"{target}\";\n"));
        }

        output.push_str("}\n");
        output
    }
}
