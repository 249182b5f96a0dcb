//! Display-name generation for directly created deployments
//!
//! Names only need to be unique per owner among currently active rows, so the
//! caller passes the set of names already in use and gets back one that does
//! not collide.

use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashSet;

/// Curated pool of friendly deployment names
const NAME_POOL: &[&str] = &[
    "amber-harbor",
    "bold-lantern",
    "brisk-meadow",
    "calm-anchor",
    "clever-osprey",
    "crimson-wharf",
    "eager-beacon",
    "gentle-tide",
    "golden-quay",
    "keen-compass",
    "lively-ledger",
    "mellow-summit",
    "nimble-otter",
    "quiet-grove",
    "rustic-pier",
    "silver-current",
    "steady-falcon",
    "sunny-mooring",
    "swift-heron",
    "vivid-breeze",
];

/// Pick a display name unused among `existing`.
///
/// Draws a random unused entry from the pool; once the pool is exhausted,
/// appends the smallest unused positive suffix to a random pool entry.
pub fn generate_name(existing: &HashSet<String>) -> String {
    let mut rng = rand::thread_rng();

    let unused: Vec<&str> = NAME_POOL
        .iter()
        .copied()
        .filter(|name| !existing.contains(*name))
        .collect();
    if let Some(name) = unused.choose(&mut rng) {
        return name.to_string();
    }

    let base = NAME_POOL[rng.gen_range(0..NAME_POOL.len())];
    let mut suffix = 1u32;
    loop {
        let candidate = format!("{} {}", base, suffix);
        if !existing.contains(&candidate) {
            return candidate;
        }
        suffix += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_then_suffix() {
        let mut existing = HashSet::new();

        for _ in 0..NAME_POOL.len() {
            let name = generate_name(&existing);
            assert!(NAME_POOL.contains(&name.as_str()));
            assert!(existing.insert(name), "pool names must not repeat");
        }

        let overflow = generate_name(&existing);
        assert!(!existing.contains(&overflow));
        let (base, suffix) = overflow
            .rsplit_once(' ')
            .expect("exhausted pool must produce a suffixed name");
        assert!(NAME_POOL.contains(&base));
        assert!(suffix.parse::<u32>().expect("numeric suffix") >= 1);
    }

    #[test]
    fn test_smallest_unused_suffix() {
        // Block every pool name plus suffix 1 for all of them; the generator
        // must land on suffix 2.
        let mut existing: HashSet<String> =
            NAME_POOL.iter().map(|n| n.to_string()).collect();
        for name in NAME_POOL {
            existing.insert(format!("{} 1", name));
        }

        let name = generate_name(&existing);
        assert!(name.ends_with(" 2"), "unexpected name: {}", name);
    }

    #[test]
    fn test_never_collides_with_existing() {
        let mut existing = HashSet::new();
        for _ in 0..NAME_POOL.len() * 3 {
            let name = generate_name(&existing);
            assert!(existing.insert(name));
        }
    }
}
