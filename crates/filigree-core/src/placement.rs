//! Horizontal placement of groups
//!
//! Each group's glyph is centered at a position on the categorical axis.
//! Without a caller-supplied map, integer group keys sit at their own
//! value and text keys at their rank in sorted key order.
//!
//! Also holds the seeded generator used for outlier jitter and generated
//! colors, so layouts are reproducible for a given seed.

use std::collections::HashMap;

use filigree_stats::GroupKey;

use crate::error::{LayoutError, LayoutResult};

/// Caller-supplied group centers
pub type CenterMap = HashMap<GroupKey, f64>;

/// Default center for each key
///
/// Integer keys map to themselves when every key is an integer;
/// otherwise keys map to their index in sorted order.
pub fn default_centers<'a>(keys: impl IntoIterator<Item = &'a GroupKey>) -> CenterMap {
    let mut keys: Vec<&GroupKey> = keys.into_iter().collect();
    keys.sort();
    keys.dedup();

    if keys.iter().all(|k| k.as_int().is_some()) {
        keys.into_iter()
            .filter_map(|k| k.as_int().map(|i| (k.clone(), i as f64)))
            .collect()
    } else {
        keys.into_iter()
            .enumerate()
            .map(|(i, k)| (k.clone(), i as f64))
            .collect()
    }
}

/// Center for every key in `keys`, from `overrides` when given
pub fn resolve_centers(keys: &[GroupKey], overrides: Option<&CenterMap>) -> LayoutResult<Vec<f64>> {
    let defaults;
    let map = match overrides {
        Some(map) => map,
        None => {
            defaults = default_centers(keys);
            &defaults
        }
    };

    keys.iter()
        .map(|k| {
            map.get(k).copied().ok_or_else(|| LayoutError::MissingCenter {
                group: k.to_string(),
            })
        })
        .collect()
}

/// Small deterministic generator (SplitMix64 output over an LCG state)
#[derive(Debug, Clone)]
pub struct SeededRng {
    state: u64,
}

impl SeededRng {
    pub fn new(seed: u64) -> Self {
        Self {
            state: seed.wrapping_add(0x9E3779B97F4A7C15),
        }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
        z ^ (z >> 31)
    }

    /// Uniform in [0, 1)
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}

/// Horizontal offset for one outlier point: uniform in `[-0.4, 0.4) * width`
pub fn jitter(rng: &mut SeededRng, width: f64) -> f64 {
    width * (rng.next_f64() * 0.8 - 0.4)
}
