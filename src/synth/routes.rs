//! Route table construction: one routing policy per tier.

use tracing::debug;

use super::SynthContext;
use crate::error::{Error, Result};
use crate::registry::{GatewayRecord, RouteTableRecord, SubnetRecord};
use crate::spec::{NatMode, Tier};

/// Builds each tier's route tables, default routes, and associations.
pub struct RouteTableBuilder;

impl RouteTableBuilder {
    /// Builds the route tables for one tier.
    ///
    /// - Public: one table, default route to the internet gateway, one
    ///   association per public subnet.
    /// - Private: one table per NAT gateway; under `per-zone` mode a table
    ///   serves the private subnets sharing its gateway's zone, under
    ///   `single` mode the one table serves them all. With no NAT gateways
    ///   the single table has no default route.
    /// - Isolated: one table, no default route, all isolated subnets.
    pub fn build(ctx: &mut SynthContext<'_>, tier: Tier) -> Result<()> {
        match tier {
            Tier::Public => Self::build_public(ctx),
            Tier::Private => Self::build_private(ctx),
            Tier::Isolated => Self::build_isolated(ctx),
        }
    }

    fn build_public(ctx: &mut SynthContext<'_>) -> Result<()> {
        let subnets = Self::tier_subnets(ctx, Tier::Public);
        if subnets.is_empty() {
            return Ok(());
        }
        let target = ctx.registry.internet_gateway().cloned();
        Self::declare_table(ctx, Tier::Public, 0, target.as_ref(), &subnets)
    }

    fn build_private(ctx: &mut SynthContext<'_>) -> Result<()> {
        let subnets = Self::tier_subnets(ctx, Tier::Private);
        if subnets.is_empty() {
            return Ok(());
        }

        let gateways = ctx.registry.nat_gateways().to_vec();
        if gateways.is_empty() {
            // Intentional dead end: no NAT means no outbound path.
            return Self::declare_table(ctx, Tier::Private, 0, None, &subnets);
        }

        match ctx.spec.nat_mode {
            NatMode::Single => Self::declare_table(ctx, Tier::Private, 0, Some(&gateways[0]), &subnets),
            NatMode::PerZone => {
                // Alignment is by zone identity, not list position: a private
                // subnet whose zone has no NAT gateway is a configuration
                // error, caught before anything is declared.
                for subnet in &subnets {
                    if !gateways.iter().any(|g| g.zone_index == Some(subnet.index)) {
                        return Err(Error::configuration(format!(
                            "private subnet in zone '{}' has no NAT gateway",
                            subnet.zone
                        )));
                    }
                }

                for (index, gateway) in gateways.iter().enumerate() {
                    let zone_index = gateway.zone_index.ok_or_else(|| {
                        Error::graph("NAT gateway record is missing its zone index")
                    })?;
                    let zone_subnets: Vec<SubnetRecord> = subnets
                        .iter()
                        .filter(|s| s.index == zone_index)
                        .cloned()
                        .collect();
                    Self::declare_table(ctx, Tier::Private, index, Some(gateway), &zone_subnets)?;
                }
                Ok(())
            }
            // Unreachable: NatMode::None never plans gateways.
            NatMode::None => Ok(()),
        }
    }

    fn build_isolated(ctx: &mut SynthContext<'_>) -> Result<()> {
        let subnets = Self::tier_subnets(ctx, Tier::Isolated);
        if subnets.is_empty() {
            return Ok(());
        }
        // Isolated subnets never route outbound, whatever the NAT mode says.
        Self::declare_table(ctx, Tier::Isolated, 0, None, &subnets)
    }

    fn tier_subnets(ctx: &SynthContext<'_>, tier: Tier) -> Vec<SubnetRecord> {
        ctx.registry
            .subnets_in(tier)
            .into_iter()
            .cloned()
            .collect()
    }

    fn declare_table(
        ctx: &mut SynthContext<'_>,
        tier: Tier,
        index: usize,
        target: Option<&GatewayRecord>,
        subnets: &[SubnetRecord],
    ) -> Result<()> {
        let refs: Vec<&SubnetRecord> = subnets.iter().collect();
        let handle = ctx.dialect.declare_route_table(
            ctx.provider,
            ctx.spec,
            &ctx.network,
            tier,
            index,
            target,
            &refs,
        )?;

        ctx.registry.push_route_table(RouteTableRecord {
            tier,
            index,
            handle,
            default_target: target.map(|t| t.handle.address().to_string()),
            associated: subnets.iter().map(|s| (s.tier, s.index)).collect(),
        });

        debug!(tier = %tier, index, subnets = subnets.len(), "built route table");
        Ok(())
    }
}
