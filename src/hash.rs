/// Fast 2-value hash with xorshift
#[inline(always)]
pub fn hash2(a: u64, b: u64) -> u64 {
    let mut seed = a.wrapping_mul(2654435761).wrapping_add(b.wrapping_mul(2246822519));
    seed ^= seed << 13;
    seed ^= seed >> 7;
    seed ^= seed << 17;
    seed
}

/// Fast deterministic random using splitmix64 - handles small seeds properly
#[inline(always)]
pub fn rand_simple(seed: u64) -> f64 {
    let mut x = seed.wrapping_mul(0x9e3779b97f4a7c15);
    x ^= x >> 30;
    x = x.wrapping_mul(0xbf58476d1ce4e5b9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94d049bb133111eb);
    x ^= x >> 31;
    (x >> 11) as f64 / 9007199254740992.0
}

/// Uniform value in [-half, half) for item `index`, component `axis`.
#[inline]
pub fn centered(index: u64, axis: u64, half: f64) -> f64 {
    (rand_simple(hash2(index, axis)) - 0.5) * 2.0 * half
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rand_simple_is_unit_range_and_deterministic() {
        for seed in 0..1000 {
            let v = rand_simple(seed);
            assert!((0.0..1.0).contains(&v));
            assert_eq!(v, rand_simple(seed));
        }
    }

    #[test]
    fn centered_spans_both_signs() {
        let values: Vec<f64> = (0..500).map(|i| centered(i, 0, 100.0)).collect();
        assert!(values.iter().all(|v| (-100.0..100.0).contains(v)));
        assert!(values.iter().any(|&v| v < -50.0));
        assert!(values.iter().any(|&v| v > 50.0));
    }
}
