//! Network specification: the immutable input to synthesis.
//!
//! A [`NetworkSpec`] is loaded once (YAML file or built in code), validated
//! once at the boundary, and then passed by reference through the synthesis
//! pass. Nothing downstream re-reads ambient configuration.

use indexmap::IndexMap;
use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::{Error, Result};

/// A named class of subnet sharing a routing policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Routable from the internet through the internet gateway.
    Public,
    /// Outbound-only through a NAT gateway.
    Private,
    /// No default route in either direction.
    Isolated,
}

impl Tier {
    /// All tiers in synthesis order.
    pub fn all() -> [Tier; 3] {
        [Tier::Public, Tier::Private, Tier::Isolated]
    }

    /// Lowercase name used in resource names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Public => "public",
            Tier::Private => "private",
            Tier::Isolated => "isolated",
        }
    }

    /// Capitalized label used in console-facing tags.
    pub fn label(&self) -> &'static str {
        match self {
            Tier::Public => "Public",
            Tier::Private => "Private",
            Tier::Isolated => "Isolated",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Strategy for outbound address translation placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NatMode {
    /// No NAT gateways; private subnets have no outbound path.
    None,
    /// One shared NAT gateway in the first public subnet.
    Single,
    /// One NAT gateway per public subnet, index-aligned with zones.
    #[default]
    PerZone,
}

impl NatMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            NatMode::None => "none",
            NatMode::Single => "single",
            NatMode::PerZone => "per-zone",
        }
    }
}

impl fmt::Display for NatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An availability zone, referenced by position from the tier CIDR lists.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Zone(pub String);

impl Zone {
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Zone {
    fn from(s: &str) -> Self {
        Zone(s.to_string())
    }
}

impl From<String> for Zone {
    fn from(s: String) -> Self {
        Zone(s)
    }
}

/// Immutable input describing one network topology.
///
/// Invariants enforced by [`NetworkSpec::validate`]:
/// - every tier's CIDR list is no longer than the zone list,
/// - CIDR blocks do not overlap pairwise (across tiers),
/// - the secondary CIDR does not overlap the primary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkSpec {
    /// Topology name, used as the prefix of every resource name.
    pub name: String,

    /// Primary CIDR block of the network.
    pub cidr: Ipv4Net,

    /// Optional secondary CIDR block associated with the network.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cidr_secondary: Option<Ipv4Net>,

    /// Ordered availability zones. Tier CIDRs bind to these by position.
    pub zones: Vec<Zone>,

    /// Ordered public subnet CIDRs.
    #[serde(default)]
    pub public_subnets: Vec<Ipv4Net>,

    /// Ordered private subnet CIDRs.
    #[serde(default)]
    pub private_subnets: Vec<Ipv4Net>,

    /// Ordered isolated subnet CIDRs.
    #[serde(default)]
    pub isolated_subnets: Vec<Ipv4Net>,

    /// NAT gateway placement strategy.
    #[serde(default)]
    pub nat_mode: NatMode,

    /// Enable DNS hostnames on the network.
    #[serde(default = "default_true")]
    pub enable_dns_hostnames: bool,

    /// Enable DNS resolution support on the network.
    #[serde(default = "default_true")]
    pub enable_dns_support: bool,

    /// When set, public/private subnets carry the Kubernetes load-balancer
    /// role tags expected by managed cluster schedulers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_name: Option<String>,

    /// Tags applied to every declared resource, in insertion order.
    #[serde(default)]
    pub tags: IndexMap<String, String>,
}

fn default_true() -> bool {
    true
}

impl NetworkSpec {
    /// Creates a spec with the given name and primary CIDR and no subnets.
    pub fn new(name: impl Into<String>, cidr: Ipv4Net) -> Self {
        Self {
            name: name.into(),
            cidr,
            cidr_secondary: None,
            zones: Vec::new(),
            public_subnets: Vec::new(),
            private_subnets: Vec::new(),
            isolated_subnets: Vec::new(),
            nat_mode: NatMode::default(),
            enable_dns_hostnames: true,
            enable_dns_support: true,
            cluster_name: None,
            tags: IndexMap::new(),
        }
    }

    /// Sets the availability zones.
    pub fn with_zones<I, Z>(mut self, zones: I) -> Self
    where
        I: IntoIterator<Item = Z>,
        Z: Into<Zone>,
    {
        self.zones = zones.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the CIDR list for one tier.
    pub fn with_subnets(mut self, tier: Tier, cidrs: Vec<Ipv4Net>) -> Self {
        match tier {
            Tier::Public => self.public_subnets = cidrs,
            Tier::Private => self.private_subnets = cidrs,
            Tier::Isolated => self.isolated_subnets = cidrs,
        }
        self
    }

    /// Sets the NAT placement strategy.
    pub fn with_nat_mode(mut self, mode: NatMode) -> Self {
        self.nat_mode = mode;
        self
    }

    /// Sets the secondary CIDR block.
    pub fn with_secondary_cidr(mut self, cidr: Ipv4Net) -> Self {
        self.cidr_secondary = Some(cidr);
        self
    }

    /// Sets the cluster name for subnet role tagging.
    pub fn with_cluster_name(mut self, name: impl Into<String>) -> Self {
        self.cluster_name = Some(name.into());
        self
    }

    /// Adds a tag.
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Loads and validates a spec from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::spec_load(path, e.to_string()))?;
        let spec: NetworkSpec = serde_yaml::from_str(&text)
            .map_err(|e| Error::spec_load(path, e.to_string()))?;
        spec.validate()?;
        Ok(spec)
    }

    /// Parses and validates a spec from a YAML string.
    pub fn from_str(text: &str) -> Result<Self> {
        let spec: NetworkSpec = serde_yaml::from_str(text)?;
        spec.validate()?;
        Ok(spec)
    }

    /// Returns the CIDR list for one tier.
    pub fn subnets_for(&self, tier: Tier) -> &[Ipv4Net] {
        match tier {
            Tier::Public => &self.public_subnets,
            Tier::Private => &self.private_subnets,
            Tier::Isolated => &self.isolated_subnets,
        }
    }

    /// Total number of subnets across all tiers.
    pub fn subnet_count(&self) -> usize {
        Tier::all().iter().map(|t| self.subnets_for(*t).len()).sum()
    }

    /// Validates the boundary invariants. Called by the loaders and again by
    /// the synthesizer, so specs built in code are checked too.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::configuration("topology name must not be empty"));
        }

        for tier in Tier::all() {
            let cidrs = self.subnets_for(tier);
            if cidrs.len() > self.zones.len() {
                return Err(Error::configuration(format!(
                    "{} CIDR count exceeds zone count ({} > {})",
                    tier,
                    cidrs.len(),
                    self.zones.len()
                )));
            }
        }

        if let Some(secondary) = &self.cidr_secondary {
            if blocks_overlap(&self.cidr, secondary) {
                return Err(Error::configuration(format!(
                    "secondary CIDR {} overlaps primary CIDR {}",
                    secondary, self.cidr
                )));
            }
        }

        // Pairwise overlap across every tier. Every routing decision keys off
        // these blocks, so the caller is not trusted to have checked.
        let all: Vec<(Tier, &Ipv4Net)> = Tier::all()
            .iter()
            .flat_map(|t| self.subnets_for(*t).iter().map(move |c| (*t, c)))
            .collect();
        for (i, (tier_a, a)) in all.iter().enumerate() {
            for (tier_b, b) in &all[i + 1..] {
                if blocks_overlap(a, b) {
                    return Err(Error::configuration(format!(
                        "overlapping CIDR blocks: {} ({}) and {} ({})",
                        a, tier_a, b, tier_b
                    )));
                }
            }
        }

        for (tier, block) in &all {
            let in_primary = self.cidr.contains(*block);
            let in_secondary = self
                .cidr_secondary
                .as_ref()
                .map(|s| s.contains(*block))
                .unwrap_or(false);
            if !in_primary && !in_secondary {
                tracing::warn!(
                    tier = %tier,
                    cidr = %block,
                    "subnet CIDR is outside the network's address space"
                );
            }
        }

        Ok(())
    }
}

fn blocks_overlap(a: &Ipv4Net, b: &Ipv4Net) -> bool {
    a.contains(&b.network()) || b.contains(&a.network())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn net(s: &str) -> Ipv4Net {
        s.parse().unwrap()
    }

    fn two_zone_spec() -> NetworkSpec {
        NetworkSpec::new("demo", net("10.0.0.0/16"))
            .with_zones(["us-east-1a", "us-east-1b"])
            .with_subnets(Tier::Public, vec![net("10.0.16.0/21"), net("10.0.24.0/21")])
            .with_subnets(Tier::Private, vec![net("10.0.0.0/21"), net("10.0.8.0/21")])
    }

    #[test]
    fn valid_spec_passes() {
        two_zone_spec().validate().unwrap();
    }

    #[test]
    fn cidr_count_exceeding_zone_count_is_rejected() {
        let spec = two_zone_spec().with_subnets(
            Tier::Isolated,
            vec![net("10.0.32.0/24"), net("10.0.33.0/24"), net("10.0.34.0/24")],
        );
        let err = spec.validate().unwrap_err();
        assert!(err.to_string().contains("isolated CIDR count exceeds zone count (3 > 2)"));
    }

    #[test]
    fn overlapping_tier_blocks_are_rejected() {
        let spec = two_zone_spec().with_subnets(Tier::Isolated, vec![net("10.0.16.0/22")]);
        let err = spec.validate().unwrap_err();
        assert!(err.to_string().contains("overlapping CIDR blocks"));
    }

    #[test]
    fn secondary_overlapping_primary_is_rejected() {
        let spec = two_zone_spec().with_secondary_cidr(net("10.0.128.0/17"));
        assert!(spec.validate().is_err());
    }

    #[test]
    fn nat_mode_parses_kebab_case() {
        let spec: NetworkSpec = serde_yaml::from_str(
            r#"
name: demo
cidr: 10.0.0.0/16
zones: [us-east-1a]
nat_mode: per-zone
"#,
        )
        .unwrap();
        assert_eq!(spec.nat_mode, NatMode::PerZone);
    }

    #[test]
    fn yaml_round_trip_preserves_tag_order() {
        let spec = two_zone_spec()
            .with_tag("CreatedBy", "netforge")
            .with_tag("Environment", "dev");
        let text = serde_yaml::to_string(&spec).unwrap();
        let parsed = NetworkSpec::from_str(&text).unwrap();
        let keys: Vec<_> = parsed.tags.keys().cloned().collect();
        assert_eq!(keys, ["CreatedBy", "Environment"]);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result = NetworkSpec::from_str(
            r#"
name: demo
cidr: 10.0.0.0/16
zones: [a]
nat_gateways: 3
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn dns_flags_default_on() {
        let spec = NetworkSpec::from_str("name: demo\ncidr: 10.0.0.0/16\nzones: [a]\n").unwrap();
        assert!(spec.enable_dns_hostnames);
        assert!(spec.enable_dns_support);
    }
}
