//! Registry of synthesized network entities.
//!
//! The topology assembler is the registry's only writer; downstream consumers
//! read exported handles and never mutate. Subnets are keyed by
//! `(tier, zone index)` so later components resolve them by position, and the
//! key space rejects duplicates - a duplicate here means a synthesizer bug.

use indexmap::IndexMap;
use ipnet::Ipv4Net;

use crate::error::{Error, Result};
use crate::provider::ResourceHandle;
use crate::spec::{Tier, Zone};

/// A synthesized subnet, immutable after creation.
#[derive(Debug, Clone)]
pub struct SubnetRecord {
    pub tier: Tier,
    /// Position in the tier list; also the zone index.
    pub index: usize,
    pub zone: Zone,
    pub cidr: Ipv4Net,
    /// Console-facing name, `"{topology}/{Tier}/{zone}"`.
    pub display_name: String,
    pub handle: ResourceHandle,
}

/// Gateway flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayKind {
    Internet,
    Nat,
}

/// A synthesized gateway.
#[derive(Debug, Clone)]
pub struct GatewayRecord {
    pub kind: GatewayKind,
    /// Zone index of the bound public subnet; `None` for the internet gateway.
    pub zone_index: Option<usize>,
    pub handle: ResourceHandle,
    /// Bound public subnet, NAT only.
    pub subnet: Option<ResourceHandle>,
    /// Bound elastic/public address, NAT only.
    pub address: Option<ResourceHandle>,
}

/// A synthesized route table and its subnet associations.
///
/// `handle` is `None` when the active cloud dialect lowers the table to
/// association primitives instead of a table resource.
#[derive(Debug, Clone)]
pub struct RouteTableRecord {
    pub tier: Tier,
    pub index: usize,
    pub handle: Option<ResourceHandle>,
    /// Address of the default-route gateway, if any.
    pub default_target: Option<String>,
    /// `(tier, index)` keys of the associated subnets.
    pub associated: Vec<(Tier, usize)>,
}

/// Shared registry threaded through the synthesis pass.
#[derive(Debug, Default)]
pub struct TopologyRegistry {
    subnets: IndexMap<(Tier, usize), SubnetRecord>,
    internet_gateway: Option<GatewayRecord>,
    nat_gateways: Vec<GatewayRecord>,
    route_tables: Vec<RouteTableRecord>,
}

impl TopologyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a subnet under its `(tier, index)` key.
    pub fn insert_subnet(&mut self, record: SubnetRecord) -> Result<()> {
        let key = (record.tier, record.index);
        if self.subnets.contains_key(&key) {
            return Err(Error::graph(format!(
                "duplicate subnet registration ({}, {})",
                key.0, key.1
            )));
        }
        self.subnets.insert(key, record);
        Ok(())
    }

    /// Subnets of one tier, ordered by index.
    pub fn subnets_in(&self, tier: Tier) -> Vec<&SubnetRecord> {
        self.subnets
            .values()
            .filter(|s| s.tier == tier)
            .collect()
    }

    /// Looks up a subnet by key.
    pub fn subnet(&self, tier: Tier, index: usize) -> Option<&SubnetRecord> {
        self.subnets.get(&(tier, index))
    }

    pub fn set_internet_gateway(&mut self, record: GatewayRecord) {
        self.internet_gateway = Some(record);
    }

    pub fn internet_gateway(&self) -> Option<&GatewayRecord> {
        self.internet_gateway.as_ref()
    }

    pub fn push_nat_gateway(&mut self, record: GatewayRecord) {
        self.nat_gateways.push(record);
    }

    /// NAT gateways in creation order (index-aligned with public subnets).
    pub fn nat_gateways(&self) -> &[GatewayRecord] {
        &self.nat_gateways
    }

    pub fn push_route_table(&mut self, record: RouteTableRecord) {
        self.route_tables.push(record);
    }

    pub fn route_tables_in(&self, tier: Tier) -> Vec<&RouteTableRecord> {
        self.route_tables.iter().filter(|t| t.tier == tier).collect()
    }

    pub fn route_tables(&self) -> &[RouteTableRecord] {
        &self.route_tables
    }
}
