//! Gateway planning: internet gateway and NAT placement.

use tracing::debug;

use super::SynthContext;
use crate::error::{Error, Result};
use crate::ident::derive_short_id;
use crate::registry::{GatewayKind, GatewayRecord, SubnetRecord};
use crate::spec::{NatMode, Tier};

/// Decides how many NAT gateways exist and where they sit.
pub struct GatewayPlanner;

impl GatewayPlanner {
    /// Declares the internet gateway and the NAT gateways the spec's mode
    /// calls for, recording each into the registry.
    ///
    /// Every NAT gateway owns a 1:1 elastic/public address and carries
    /// explicit dependency edges on that address and on its bound public
    /// subnet - creation order is never implied by declaration order.
    pub fn plan(ctx: &mut SynthContext<'_>) -> Result<()> {
        if let Some(handle) =
            ctx.dialect
                .declare_internet_gateway(ctx.provider, ctx.spec, &ctx.network)?
        {
            ctx.registry.set_internet_gateway(GatewayRecord {
                kind: GatewayKind::Internet,
                zone_index: None,
                handle,
                subnet: None,
                address: None,
            });
        }

        let public: Vec<SubnetRecord> = ctx
            .registry
            .subnets_in(Tier::Public)
            .into_iter()
            .cloned()
            .collect();

        match ctx.spec.nat_mode {
            NatMode::None => {
                debug!("NAT disabled; private subnets get no outbound path");
            }
            NatMode::Single | NatMode::PerZone if public.is_empty() => {
                return Err(Error::configuration(
                    "NAT gateway requested with no public subnet",
                ));
            }
            NatMode::Single => {
                Self::place_nat(ctx, &public[0])?;
                debug!("planned a single shared NAT gateway");
            }
            NatMode::PerZone => {
                for subnet in &public {
                    Self::place_nat(ctx, subnet)?;
                }
                debug!(count = public.len(), "planned one NAT gateway per zone");
            }
        }

        Ok(())
    }

    /// Declares one address + NAT gateway pair bound to `subnet`.
    fn place_nat(ctx: &mut SynthContext<'_>, subnet: &SubnetRecord) -> Result<()> {
        let suffix = derive_short_id(&subnet.cidr.to_string());
        let address = ctx
            .dialect
            .declare_nat_address(ctx.provider, ctx.spec, &suffix)?;
        let handle = ctx.dialect.declare_nat_gateway(
            ctx.provider,
            ctx.spec,
            &suffix,
            &subnet.handle,
            &address,
        )?;

        ctx.registry.push_nat_gateway(GatewayRecord {
            kind: GatewayKind::Nat,
            zone_index: Some(subnet.index),
            handle,
            subnet: Some(subnet.handle.clone()),
            address: Some(address),
        });
        Ok(())
    }
}
