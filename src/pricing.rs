// Saint Quartz pricing. Costs are in yen.

pub const STONES_PER_TRIAL: u64 = 3;

/// Store bundles as (stones, price), largest first. Per-stone price rises as
/// the bundle shrinks: 58, 63, 70, 77, 96, 120.
pub const BUNDLES: [(u64, u64); 6] = [
    (167, 9800),
    (76, 4800),
    (41, 2900),
    (18, 1400),
    (5, 480),
    (1, 120),
];

pub fn stone_cost_for(trials: u64) -> u64 {
    trials * STONES_PER_TRIAL
}

/// Price of `stones` bought greedily from the largest bundle down.
/// `None` when the price does not fit in a `u64`.
pub fn stone_fee_for(stones: u64) -> Option<u64> {
    let mut remaining = stones;
    let mut fee: u64 = 0;
    for (size, price) in BUNDLES {
        fee = fee.checked_add((remaining / size).checked_mul(price)?)?;
        remaining %= size;
    }
    Some(fee)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_bundles() {
        assert_eq!(stone_fee_for(167), Some(9800));
        assert_eq!(stone_fee_for(76), Some(4800));
        assert_eq!(stone_fee_for(41), Some(2900));
        assert_eq!(stone_fee_for(18), Some(1400));
        assert_eq!(stone_fee_for(5), Some(480));
        assert_eq!(stone_fee_for(1), Some(120));
        assert_eq!(stone_fee_for(0), Some(0));
    }

    #[test]
    fn mixed_bundles() {
        // 30 stones = 18 + 5 + 5 + 1 + 1
        assert_eq!(stone_fee_for(30), Some(1400 + 2 * 480 + 2 * 120));
        // 334 = 2 * 167
        assert_eq!(stone_fee_for(334), Some(19600));
        // 200 = 167 + 18 + 5 + 5 + 5
        assert_eq!(stone_fee_for(200), Some(9800 + 1400 + 3 * 480));
    }

    #[test]
    fn unpayable_amounts_have_no_price() {
        assert_eq!(stone_fee_for(400_000_000_000_000_000), None);
        assert_eq!(stone_fee_for(u64::MAX), None);
        // 167 * k stones for the largest k whose price still fits.
        let k = u64::MAX / 9800;
        assert_eq!(stone_fee_for(167 * k), Some(9800 * k));
    }

    #[test]
    fn three_stones_per_trial() {
        assert_eq!(stone_cost_for(10), 30);
        assert_eq!(stone_cost_for(1), 3);
        assert_eq!(stone_cost_for(0), 0);
    }

    #[test]
    fn per_stone_price_decreases_with_bundle_size() {
        let per_stone: Vec<f64> = BUNDLES.iter().map(|&(n, p)| p as f64 / n as f64).collect();
        assert!(per_stone.windows(2).all(|w| w[0] < w[1]));
    }
}
