//! Azure dialect: virtual network, subnets, NAT gateway associations.
//!
//! Azure has no internet-gateway or route-table primitive in this topology.
//! Public subnets are internet-reachable through the platform's default
//! outbound path, and private egress is expressed by associating subnets with
//! a NAT gateway directly.

use indexmap::IndexMap;
use ipnet::Ipv4Net;
use serde_json::json;

use crate::cloud::{Cloud, CloudDialect, NetworkHandles};
use crate::error::Result;
use crate::ident::derive_short_id;
use crate::provider::{Declaration, ResourceHandle, ResourceProvider};
use crate::registry::{GatewayKind, GatewayRecord, SubnetRecord};
use crate::spec::{NetworkSpec, Tier, Zone};

/// Lowers the neutral topology onto the azurerm provider's primitives.
#[derive(Debug, Clone, Copy, Default)]
pub struct AzureDialect;

impl CloudDialect for AzureDialect {
    fn cloud(&self) -> Cloud {
        Cloud::Azure
    }

    fn declare_network(
        &self,
        provider: &mut dyn ResourceProvider,
        spec: &NetworkSpec,
    ) -> Result<NetworkHandles> {
        // The secondary CIDR is an extra entry in the address space, not a
        // separate resource.
        let mut address_space = vec![spec.cidr.to_string()];
        if let Some(secondary) = &spec.cidr_secondary {
            address_space.push(secondary.to_string());
        }

        let network = provider.declare(
            Declaration::new("azurerm_virtual_network", format!("{}-vnet", spec.name))
                .with_properties(json!({
                    "address_space": address_space,
                    "tags": serde_json::to_value(&spec.tags)?,
                })),
        )?;

        Ok(NetworkHandles {
            network,
            secondary_association: None,
        })
    }

    fn declare_subnet(
        &self,
        provider: &mut dyn ResourceProvider,
        spec: &NetworkSpec,
        network: &NetworkHandles,
        tier: Tier,
        cidr: &Ipv4Net,
        zone: &Zone,
        display_name: &str,
        tags: &IndexMap<String, String>,
    ) -> Result<ResourceHandle> {
        // Subnet placement is zonal at the resource level on AWS only; Azure
        // subnets span zones, so the zone survives solely in the tags.
        let _ = (zone, tags);
        let name = format!("{}-{}-{}", spec.name, tier, derive_short_id(&cidr.to_string()));
        provider.declare(
            Declaration::new("azurerm_subnet", name)
                .with_properties(json!({
                    "virtual_network_name": network.network.id(),
                    "address_prefixes": [cidr.to_string()],
                    "display_name": display_name,
                }))
                .depends_on(&network.network),
        )
    }

    fn declare_internet_gateway(
        &self,
        _provider: &mut dyn ResourceProvider,
        _spec: &NetworkSpec,
        _network: &NetworkHandles,
    ) -> Result<Option<ResourceHandle>> {
        // Default outbound connectivity plays this role.
        Ok(None)
    }

    fn declare_nat_address(
        &self,
        provider: &mut dyn ResourceProvider,
        spec: &NetworkSpec,
        suffix: &str,
    ) -> Result<ResourceHandle> {
        provider.declare(
            Declaration::new("azurerm_public_ip", format!("{}-nat-ip-{}", spec.name, suffix))
                .with_properties(json!({
                    "allocation_method": "Static",
                    "sku": "Standard",
                    "tags": serde_json::to_value(&spec.tags)?,
                })),
        )
    }

    fn declare_nat_gateway(
        &self,
        provider: &mut dyn ResourceProvider,
        spec: &NetworkSpec,
        suffix: &str,
        subnet: &ResourceHandle,
        address: &ResourceHandle,
    ) -> Result<ResourceHandle> {
        // Azure NAT gateways are not placed *in* a subnet; the public subnet
        // binding survives as a dependency edge only.
        let name = format!("{}-nat-{}", spec.name, suffix);
        let gateway = provider.declare(
            Declaration::new("azurerm_nat_gateway", name.clone())
                .with_properties(json!({
                    "sku_name": "Standard",
                    "tags": serde_json::to_value(&spec.tags)?,
                }))
                .depends_on(subnet),
        )?;

        provider.declare(
            Declaration::new("azurerm_nat_gateway_public_ip_association", name)
                .with_properties(json!({
                    "nat_gateway_id": gateway.id(),
                    "public_ip_address_id": address.id(),
                }))
                .depends_on(&gateway)
                .depends_on(address),
        )?;

        Ok(gateway)
    }

    fn declare_route_table(
        &self,
        provider: &mut dyn ResourceProvider,
        spec: &NetworkSpec,
        _network: &NetworkHandles,
        tier: Tier,
        _index: usize,
        default_target: Option<&GatewayRecord>,
        subnets: &[&SubnetRecord],
    ) -> Result<Option<ResourceHandle>> {
        match default_target {
            // A NAT default route lowers to one association per subnet.
            Some(target) if target.kind == GatewayKind::Nat => {
                for subnet in subnets {
                    let name = format!(
                        "{}-{}-{}",
                        spec.name,
                        tier,
                        derive_short_id(&subnet.cidr.to_string())
                    );
                    provider.declare(
                        Declaration::new("azurerm_subnet_nat_gateway_association", name)
                            .with_properties(json!({
                                "subnet_id": subnet.handle.id(),
                                "nat_gateway_id": target.handle.id(),
                            }))
                            .depends_on(&subnet.handle)
                            .depends_on(&target.handle),
                    )?;
                }
            }
            // Internet routing and isolated tiers need no primitives.
            Some(_) | None => {}
        }
        Ok(None)
    }
}
