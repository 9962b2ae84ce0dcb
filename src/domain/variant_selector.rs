//! Weighted random choice over link variants.

use rand::Rng;

use crate::domain::entities::LinkVariant;

/// Picks one variant with probability proportional to its weight.
///
/// Returns `None` only for an empty slice. When every weight is zero (or
/// negative, which is treated as zero) the first variant is returned without
/// drawing a random number.
pub fn select_variant<'a, R>(variants: &'a [LinkVariant], rng: &mut R) -> Option<&'a LinkVariant>
where
    R: Rng + ?Sized,
{
    let first = variants.first()?;

    let total: u64 = variants.iter().map(weight_of).sum();
    if total == 0 {
        return Some(first);
    }

    let roll = rng.random_range(0..total);
    let mut cumulative = 0u64;
    for variant in variants {
        cumulative += weight_of(variant);
        if roll < cumulative {
            return Some(variant);
        }
    }

    variants.last()
}

fn weight_of(variant: &LinkVariant) -> u64 {
    variant.weight.max(0) as u64
}
