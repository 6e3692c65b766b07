//! # Netforge - A Deterministic Network Topology Synthesizer
//!
//! Netforge turns a small declarative spec (CIDR ranges, availability zones,
//! a NAT strategy) into a complete multi-tier cloud network topology: the
//! network itself, its subnets, internet and NAT gateways, route tables, and
//! every dependency edge between them. It declares resources - it never
//! creates them; the emitted plan is handed to an external provisioning
//! engine that owns apply, state, and diffing.
//!
//! ## Core Concepts
//!
//! - **NetworkSpec**: the immutable input - CIDRs per tier, zones, NAT mode
//! - **Tiers**: public, private, and isolated subnet classes, each with its
//!   own routing policy
//! - **Dialects**: AWS and Azure lowerings of the same neutral topology
//! - **Plan**: a typed resource graph with explicit depends-on edges
//! - **Topology**: the read-only result - opaque ids wired into downstream
//!   resource specs
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        NetworkSpec                          │
//! │              (YAML file, validated once at load)            │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Topology Synthesizer                     │
//! │   subnet allocator → gateway planner → route table builder  │
//! └─────────────────────────────────────────────────────────────┘
//!                │                             │
//!                ▼                             ▼
//! ┌──────────────────────────┐   ┌──────────────────────────────┐
//! │      Cloud Dialect       │   │      Entity Registry         │
//! │   (AWS / Azure lowering) │   │   (subnets, gateways, keyed  │
//! │                          │   │    by tier and zone index)   │
//! └──────────────────────────┘   └──────────────────────────────┘
//!                │
//!                ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Resource Provider                       │
//! │        declare(kind, name, properties, depends_on)          │
//! │          → dependency-ordered plan for the engine           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Example
//!
//! ```rust
//! use netforge::prelude::*;
//!
//! fn main() -> netforge::error::Result<()> {
//!     let spec = NetworkSpec::new("demo", "10.0.0.0/16".parse().unwrap())
//!         .with_zones(["us-east-1a", "us-east-1b"])
//!         .with_subnets(
//!             Tier::Public,
//!             vec!["10.0.16.0/21".parse().unwrap(), "10.0.24.0/21".parse().unwrap()],
//!         )
//!         .with_subnets(
//!             Tier::Private,
//!             vec!["10.0.0.0/21".parse().unwrap(), "10.0.8.0/21".parse().unwrap()],
//!         )
//!         .with_nat_mode(NatMode::PerZone);
//!
//!     let (topology, plan) = synthesize_plan(&spec, Cloud::Aws)?;
//!     assert_eq!(topology.nat_gateway_ids.len(), 2);
//!     println!("{}", topology.outputs().to_json()?);
//!     println!("creation order: {:?}", plan.creation_order()?);
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod cloud;
pub mod cluster;
pub mod error;
pub mod graph;
pub mod ident;
pub mod output;
pub mod provider;
pub mod registry;
pub mod spec;
pub mod synth;

// Re-export commonly used items in prelude
pub mod prelude {
    //! Convenient re-exports of the types most callers need.

    pub use crate::cloud::{Cloud, CloudDialect};
    pub use crate::cluster::{ClusterProvisioner, ClusterSpec};
    pub use crate::error::{Error, Result};
    pub use crate::graph::ResourceGraph;
    pub use crate::output::TopologyOutputs;
    pub use crate::provider::{Declaration, PlanRecorder, ResourceHandle, ResourceProvider};
    pub use crate::spec::{NatMode, NetworkSpec, Tier, Zone};
    pub use crate::synth::{synthesize_plan, Topology, TopologySynthesizer};
}
