//! Content-addressed resource naming.
//!
//! Resource names embed a digest of the CIDR they were derived from, so
//! repeated synthesis runs over the same spec produce byte-identical names and
//! the provisioning engine can reconcile instead of recreate.

use sha1::{Digest, Sha1};

/// Derives a stable, collision-resistant suffix from a CIDR string.
///
/// The digest is a pure function of the input text: same CIDR, same suffix,
/// across calls and across process runs. Any string input is accepted; CIDR
/// validation happens at the spec boundary, not here.
pub fn derive_id(cidr: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(cidr.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Short form of [`derive_id`], enough to disambiguate resources within one
/// topology while keeping provider console names readable.
pub fn derive_short_id(cidr: &str) -> String {
    let mut id = derive_id(cidr);
    id.truncate(8);
    id
}
