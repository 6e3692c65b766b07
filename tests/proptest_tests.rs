//! Property-based tests for the synthesizer's invariants.

use proptest::prelude::*;

use netforge::ident::{derive_id, derive_short_id};
use netforge::prelude::*;

/// Strategy for zone-count / subnet-count pairs with `subnets <= zones`.
fn tier_shape() -> impl Strategy<Value = (usize, usize)> {
    (1usize..=6).prop_flat_map(|zones| (Just(zones), 1usize..=zones))
}

/// Builds `count` disjoint /24 blocks inside 10.0.0.0/16.
fn blocks(count: usize) -> Vec<ipnet::Ipv4Net> {
    (0..count)
        .map(|i| format!("10.0.{i}.0/24").parse().unwrap())
        .collect()
}

fn zone_names(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("zone-{i}")).collect()
}

proptest! {
    #[test]
    fn derive_id_is_pure(input in "\\PC{0,128}") {
        prop_assert_eq!(derive_id(&input), derive_id(&input));
        prop_assert_eq!(derive_id(&input).len(), 40);
        prop_assert!(derive_id(&input).chars().all(|c| c.is_ascii_hexdigit()));
        let short = derive_short_id(&input);
        prop_assert_eq!(&derive_id(&input)[..8], short.as_str());
    }

    #[test]
    fn allocator_emits_one_subnet_per_cidr((zones, subnets) in tier_shape()) {
        let spec = NetworkSpec::new("prop", "10.0.0.0/16".parse().unwrap())
            .with_zones(zone_names(zones).iter().map(String::as_str))
            .with_subnets(Tier::Public, blocks(subnets))
            .with_nat_mode(NatMode::None);

        let (topology, plan) = synthesize_plan(&spec, Cloud::Aws).unwrap();
        prop_assert_eq!(topology.public_subnet_ids.len(), subnets);

        // each subnet is bound to the zone sharing its index
        for (index, resource) in plan.resources_of_kind("aws_subnet").iter().enumerate() {
            prop_assert_eq!(
                resource.properties["availability_zone"].as_str().unwrap(),
                format!("zone-{index}")
            );
        }
    }

    #[test]
    fn per_zone_mode_matches_public_subnet_count((zones, subnets) in tier_shape()) {
        let spec = NetworkSpec::new("prop", "10.0.0.0/16".parse().unwrap())
            .with_zones(zone_names(zones).iter().map(String::as_str))
            .with_subnets(Tier::Public, blocks(subnets))
            .with_nat_mode(NatMode::PerZone);

        let (topology, plan) = synthesize_plan(&spec, Cloud::Aws).unwrap();
        prop_assert_eq!(topology.nat_gateway_ids.len(), subnets);
        prop_assert_eq!(plan.resources_of_kind("aws_eip").len(), subnets);
    }

    #[test]
    fn single_mode_always_yields_one_gateway((zones, subnets) in tier_shape()) {
        let spec = NetworkSpec::new("prop", "10.0.0.0/16".parse().unwrap())
            .with_zones(zone_names(zones).iter().map(String::as_str))
            .with_subnets(Tier::Public, blocks(subnets))
            .with_nat_mode(NatMode::Single);

        let (topology, _) = synthesize_plan(&spec, Cloud::Aws).unwrap();
        prop_assert_eq!(topology.nat_gateway_ids.len(), 1);
    }

    #[test]
    fn creation_order_always_exists((zones, subnets) in tier_shape()) {
        let spec = NetworkSpec::new("prop", "10.0.0.0/16".parse().unwrap())
            .with_zones(zone_names(zones).iter().map(String::as_str))
            .with_subnets(Tier::Public, blocks(subnets))
            .with_nat_mode(NatMode::PerZone);

        let (_, plan) = synthesize_plan(&spec, Cloud::Aws).unwrap();
        prop_assert!(!plan.has_cycles());
        prop_assert_eq!(plan.creation_order().unwrap().len(), plan.len());
    }
}
