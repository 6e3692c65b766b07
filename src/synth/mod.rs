//! Topology synthesis.
//!
//! The assembler sequences the components in dependency order: subnets are
//! allocated first (NAT gateways need a public subnet to sit in), gateways
//! are planned next (private routes need gateway handles), route tables come
//! last. The shared registry is threaded through the whole pass and has
//! exactly one writer; any configuration error aborts the pass with no
//! partial topology returned.

pub mod gateways;
pub mod routes;
pub mod subnets;

pub use gateways::GatewayPlanner;
pub use routes::RouteTableBuilder;
pub use subnets::SubnetAllocator;

use serde::Serialize;
use tracing::{info, info_span};

use crate::cloud::{Cloud, CloudDialect, NetworkHandles};
use crate::error::Result;
use crate::graph::ResourceGraph;
use crate::output::TopologyOutputs;
use crate::provider::{PlanRecorder, ResourceHandle, ResourceProvider};
use crate::registry::TopologyRegistry;
use crate::spec::{NetworkSpec, Tier};

/// Mutable state threaded through one synthesis pass. Constructed only by
/// the synthesizer; components receive it by mutable reference.
pub struct SynthContext<'a> {
    pub(crate) spec: &'a NetworkSpec,
    pub(crate) dialect: &'a dyn CloudDialect,
    pub(crate) provider: &'a mut dyn ResourceProvider,
    pub(crate) network: NetworkHandles,
    pub(crate) registry: TopologyRegistry,
}

/// Handles kept for wiring downstream declarations (cluster subnet lists).
/// Never serialized; the ids in [`Topology`] are the exported surface.
#[derive(Debug, Clone)]
pub struct TopologyHandles {
    pub network: ResourceHandle,
    pub public_subnets: Vec<ResourceHandle>,
    pub private_subnets: Vec<ResourceHandle>,
    pub isolated_subnets: Vec<ResourceHandle>,
}

/// The flattened, read-only result of one synthesis.
///
/// All id fields are opaque references resolved by the provisioning engine at
/// apply time - they are wired into downstream resource specs, never computed
/// on.
#[derive(Debug, Clone, Serialize)]
pub struct Topology {
    pub cloud: Cloud,
    pub name: String,
    pub network_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_association_id: Option<String>,
    pub public_subnet_ids: Vec<String>,
    pub private_subnet_ids: Vec<String>,
    pub isolated_subnet_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internet_gateway_id: Option<String>,
    pub nat_gateway_ids: Vec<String>,
    pub public_route_table_ids: Vec<String>,
    pub private_route_table_ids: Vec<String>,
    pub isolated_route_table_ids: Vec<String>,
    #[serde(skip_serializing)]
    handles: TopologyHandles,
}

impl Topology {
    /// Subnet ids of one tier, in zone order.
    pub fn subnet_ids(&self, tier: Tier) -> &[String] {
        match tier {
            Tier::Public => &self.public_subnet_ids,
            Tier::Private => &self.private_subnet_ids,
            Tier::Isolated => &self.isolated_subnet_ids,
        }
    }

    /// Route table ids of one tier. Empty when the cloud dialect lowered the
    /// tables to association primitives.
    pub fn route_table_ids(&self, tier: Tier) -> &[String] {
        match tier {
            Tier::Public => &self.public_route_table_ids,
            Tier::Private => &self.private_route_table_ids,
            Tier::Isolated => &self.isolated_route_table_ids,
        }
    }

    /// Handles for downstream wiring.
    pub fn handles(&self) -> &TopologyHandles {
        &self.handles
    }

    /// The stable-key output map consumed by downstream provisioners.
    pub fn outputs(&self) -> TopologyOutputs {
        TopologyOutputs::from_topology(self)
    }

    fn from_context(cloud: Cloud, ctx: &SynthContext<'_>) -> Self {
        let subnet_ids = |tier: Tier| -> Vec<String> {
            ctx.registry
                .subnets_in(tier)
                .iter()
                .map(|s| s.handle.id().to_string())
                .collect()
        };
        let subnet_handles = |tier: Tier| -> Vec<ResourceHandle> {
            ctx.registry
                .subnets_in(tier)
                .iter()
                .map(|s| s.handle.clone())
                .collect()
        };
        let table_ids = |tier: Tier| -> Vec<String> {
            ctx.registry
                .route_tables_in(tier)
                .iter()
                .filter_map(|t| t.handle.as_ref().map(|h| h.id().to_string()))
                .collect()
        };

        Topology {
            cloud,
            name: ctx.spec.name.clone(),
            network_id: ctx.network.network.id().to_string(),
            secondary_association_id: ctx
                .network
                .secondary_association
                .as_ref()
                .map(|h| h.id().to_string()),
            public_subnet_ids: subnet_ids(Tier::Public),
            private_subnet_ids: subnet_ids(Tier::Private),
            isolated_subnet_ids: subnet_ids(Tier::Isolated),
            internet_gateway_id: ctx
                .registry
                .internet_gateway()
                .map(|g| g.handle.id().to_string()),
            nat_gateway_ids: ctx
                .registry
                .nat_gateways()
                .iter()
                .map(|g| g.handle.id().to_string())
                .collect(),
            public_route_table_ids: table_ids(Tier::Public),
            private_route_table_ids: table_ids(Tier::Private),
            isolated_route_table_ids: table_ids(Tier::Isolated),
            handles: TopologyHandles {
                network: ctx.network.network.clone(),
                public_subnets: subnet_handles(Tier::Public),
                private_subnets: subnet_handles(Tier::Private),
                isolated_subnets: subnet_handles(Tier::Isolated),
            },
        }
    }
}

/// Sequences the synthesis components for one cloud.
#[derive(Debug, Clone, Copy)]
pub struct TopologySynthesizer {
    cloud: Cloud,
}

impl TopologySynthesizer {
    pub fn new(cloud: Cloud) -> Self {
        Self { cloud }
    }

    /// Runs the full synthesis pass against `provider`.
    ///
    /// On error the caller must discard whatever the provider recorded; no
    /// `Topology` is returned and the registry is dropped, so nothing
    /// downstream can act on a half-built graph.
    pub fn synthesize(
        &self,
        spec: &NetworkSpec,
        provider: &mut dyn ResourceProvider,
    ) -> Result<Topology> {
        spec.validate()?;

        let span = info_span!("synthesize", topology = %spec.name, cloud = %self.cloud);
        let _guard = span.enter();

        let dialect = self.cloud.dialect();
        let network = dialect.declare_network(provider, spec)?;

        let mut ctx = SynthContext {
            spec,
            dialect: dialect.as_ref(),
            provider,
            network,
            registry: TopologyRegistry::new(),
        };

        for tier in Tier::all() {
            SubnetAllocator::allocate(&mut ctx, tier)?;
        }
        GatewayPlanner::plan(&mut ctx)?;
        for tier in Tier::all() {
            RouteTableBuilder::build(&mut ctx, tier)?;
        }

        let topology = Topology::from_context(self.cloud, &ctx);
        info!(
            subnets = spec.subnet_count(),
            nat_gateways = topology.nat_gateway_ids.len(),
            "topology synthesized"
        );
        Ok(topology)
    }
}

/// Synthesizes against a fresh in-memory recorder, returning the topology and
/// its plan. On error both are discarded, so a failed run leaves nothing.
pub fn synthesize_plan(spec: &NetworkSpec, cloud: Cloud) -> Result<(Topology, ResourceGraph)> {
    let mut recorder = PlanRecorder::new();
    let topology = TopologySynthesizer::new(cloud).synthesize(spec, &mut recorder)?;
    Ok((topology, recorder.into_graph()))
}
