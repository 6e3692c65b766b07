//! The resource provider seam.
//!
//! The synthesizer never creates anything: it *declares* resources through
//! [`ResourceProvider::declare`] and reads back an opaque handle for
//! cross-referencing. The in-tree implementation, [`PlanRecorder`], appends
//! every declaration to a [`ResourceGraph`] and is what the CLI and tests
//! consume; a real provisioning engine would substitute its own.

use serde_json::Value;

use crate::error::Result;
use crate::graph::{DeclaredResource, ResourceGraph};

/// Opaque reference to a declared resource.
///
/// The `id` is a placeholder resolved by the provisioning engine at apply
/// time; within this core it is only ever wired into other declarations,
/// never computed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceHandle {
    address: String,
    id: String,
}

impl ResourceHandle {
    /// The plan-unique `kind.name` address.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// The opaque id reference, e.g. `${aws_subnet.demo-public-1a2b3c4d.id}`.
    pub fn id(&self) -> &str {
        &self.id
    }
}

/// A single resource declaration.
#[derive(Debug, Clone)]
pub struct Declaration {
    /// Provider resource kind, e.g. `aws_nat_gateway`.
    pub kind: &'static str,
    /// Name, unique within the kind.
    pub name: String,
    /// Provider-specific properties, opaque to the core.
    pub properties: Value,
    /// Resources that must exist before this one.
    pub depends_on: Vec<ResourceHandle>,
}

impl Declaration {
    /// Creates a declaration with no properties and no dependencies.
    pub fn new(kind: &'static str, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            properties: Value::Null,
            depends_on: Vec::new(),
        }
    }

    /// Sets the property document.
    pub fn with_properties(mut self, properties: Value) -> Self {
        self.properties = properties;
        self
    }

    /// Adds an explicit predecessor.
    pub fn depends_on(mut self, handle: &ResourceHandle) -> Self {
        self.depends_on.push(handle.clone());
        self
    }
}

/// Abstract capability to declare (not execute) an infrastructure resource.
pub trait ResourceProvider {
    /// Declares a resource and returns its opaque handle.
    fn declare(&mut self, declaration: Declaration) -> Result<ResourceHandle>;
}

/// Records declarations into a [`ResourceGraph`] and mints interpolation-style
/// handles the way the downstream engine's language expects them.
#[derive(Debug, Default)]
pub struct PlanRecorder {
    graph: ResourceGraph,
}

impl PlanRecorder {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// The recorded plan so far.
    pub fn graph(&self) -> &ResourceGraph {
        &self.graph
    }

    /// Consumes the recorder, returning the plan.
    pub fn into_graph(self) -> ResourceGraph {
        self.graph
    }
}

impl ResourceProvider for PlanRecorder {
    fn declare(&mut self, declaration: Declaration) -> Result<ResourceHandle> {
        let address = format!("{}.{}", declaration.kind, declaration.name);
        self.graph.declare(DeclaredResource {
            kind: declaration.kind.to_string(),
            name: declaration.name,
            properties: declaration.properties,
            depends_on: declaration
                .depends_on
                .iter()
                .map(|h| h.address().to_string())
                .collect(),
            sequence: 0,
        })?;
        Ok(ResourceHandle {
            id: format!("${{{address}.id}}"),
            address,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn declare_returns_interpolation_handle() {
        let mut recorder = PlanRecorder::new();
        let handle = recorder
            .declare(Declaration::new("aws_vpc", "demo").with_properties(json!({
                "cidr_block": "10.0.0.0/16",
            })))
            .unwrap();
        assert_eq!(handle.address(), "aws_vpc.demo");
        assert_eq!(handle.id(), "${aws_vpc.demo.id}");
    }

    #[test]
    fn dependencies_are_recorded_as_edges() {
        let mut recorder = PlanRecorder::new();
        let vpc = recorder.declare(Declaration::new("aws_vpc", "demo")).unwrap();
        recorder
            .declare(Declaration::new("aws_internet_gateway", "demo").depends_on(&vpc))
            .unwrap();

        let graph = recorder.into_graph();
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(
            graph.dependencies_of("aws_internet_gateway.demo"),
            vec!["aws_vpc.demo".to_string()]
        );
    }

    #[test]
    fn duplicate_declaration_surfaces_graph_error() {
        let mut recorder = PlanRecorder::new();
        recorder.declare(Declaration::new("aws_vpc", "demo")).unwrap();
        let err = recorder
            .declare(Declaration::new("aws_vpc", "demo"))
            .unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }
}
