//! Subnet allocation: binds tier CIDR lists to availability zones.

use indexmap::IndexMap;
use tracing::debug;

use super::SynthContext;
use crate::error::{Error, Result};
use crate::registry::SubnetRecord;
use crate::spec::Tier;

/// Allocates one subnet per CIDR entry, positionally bound to a zone.
pub struct SubnetAllocator;

impl SubnetAllocator {
    /// Binds `cidrs[i]` to `zones[i]` and declares one subnet per CIDR.
    ///
    /// Binding is strictly positional: a CIDR list longer than the zone list
    /// is a configuration error, never a wraparound. Each subnet is
    /// registered under `(tier, index)` before this returns, so later
    /// components resolve by position.
    pub fn allocate(ctx: &mut SynthContext<'_>, tier: Tier) -> Result<Vec<SubnetRecord>> {
        let cidrs = ctx.spec.subnets_for(tier).to_vec();
        let zones = ctx.spec.zones.clone();

        if cidrs.len() > zones.len() {
            return Err(Error::configuration(format!(
                "{} CIDR count exceeds zone count ({} > {})",
                tier,
                cidrs.len(),
                zones.len()
            )));
        }

        let mut records = Vec::with_capacity(cidrs.len());
        for (index, cidr) in cidrs.iter().enumerate() {
            let zone = &zones[index];
            let display_name = format!("{}/{}/{}", ctx.spec.name, tier.label(), zone);
            let tags = Self::subnet_tags(ctx, tier, &display_name);

            let handle = ctx.dialect.declare_subnet(
                ctx.provider,
                ctx.spec,
                &ctx.network,
                tier,
                cidr,
                zone,
                &display_name,
                &tags,
            )?;

            let record = SubnetRecord {
                tier,
                index,
                zone: zone.clone(),
                cidr: *cidr,
                display_name,
                handle,
            };
            ctx.registry.insert_subnet(record.clone())?;
            records.push(record);
        }

        debug!(tier = %tier, count = records.len(), "allocated subnets");
        Ok(records)
    }

    /// Console-facing tags: the tier-qualified name, the spec's tag map, and
    /// the Kubernetes load-balancer role tags when a cluster will schedule
    /// into this topology.
    fn subnet_tags(
        ctx: &SynthContext<'_>,
        tier: Tier,
        display_name: &str,
    ) -> IndexMap<String, String> {
        let mut tags = IndexMap::new();
        tags.insert("Name".to_string(), display_name.to_string());
        for (k, v) in &ctx.spec.tags {
            tags.insert(k.clone(), v.clone());
        }

        if let Some(cluster) = &ctx.spec.cluster_name {
            match tier {
                Tier::Public => {
                    tags.insert("kubernetes.io/role/elb".to_string(), "1".to_string());
                    tags.insert(format!("kubernetes.io/cluster/{cluster}"), "shared".to_string());
                }
                Tier::Private => {
                    tags.insert("kubernetes.io/role/internal-elb".to_string(), "1".to_string());
                    tags.insert(format!("kubernetes.io/cluster/{cluster}"), "shared".to_string());
                }
                Tier::Isolated => {}
            }
        }

        tags
    }
}
