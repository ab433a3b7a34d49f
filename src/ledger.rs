use crate::gacha::Roll;
use crate::pricing::{stone_cost_for, stone_fee_for};

/// Per-user spend, stone balance and summon counts for one session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Ledger {
    cumulative_spend: u64,
    stones: u64,
    counts: Vec<u64>,
}

impl Ledger {
    pub fn new(slot_count: usize) -> Self {
        Ledger {
            cumulative_spend: 0,
            stones: 0,
            counts: vec![0; slot_count],
        }
    }

    /// Clears everything and sizes the counters for a new table.
    pub fn reset(&mut self, slot_count: usize) {
        *self = Ledger::new(slot_count);
    }

    /// Keeps spend and balance; counters restart at the new size.
    pub fn resize_counts(&mut self, slot_count: usize) {
        self.counts = vec![0; slot_count];
    }

    /// Buys `stones` and returns what they cost. `None` leaves the ledger
    /// untouched: the price, balance or total spend would overflow.
    pub fn purchase(&mut self, stones: u64) -> Option<u64> {
        let fee = stone_fee_for(stones)?;
        let balance = self.stones.checked_add(stones)?;
        let spend = self.cumulative_spend.checked_add(fee)?;
        self.stones = balance;
        self.cumulative_spend = spend;
        Some(fee)
    }

    /// Stones still missing to afford `trials`, if any.
    pub fn shortfall(&self, trials: u64) -> Option<u64> {
        let cost = stone_cost_for(trials);
        (cost > self.stones).then(|| cost - self.stones)
    }

    /// Pays for a roll. Returns the balance before and after.
    pub fn spend(&mut self, roll: &Roll) -> (u64, u64) {
        let before = self.stones;
        self.stones = before.saturating_sub(stone_cost_for(roll.len() as u64));
        (before, self.stones)
    }

    /// Adds a roll to the per-slot counters. Out-of-range slots are ignored.
    pub fn record(&mut self, roll: &Roll) {
        for &slot in &roll.slots {
            if let Some(count) = self.counts.get_mut(slot) {
                *count += 1;
            }
        }
    }

    pub fn cumulative_spend(&self) -> u64 {
        self.cumulative_spend
    }

    pub fn stones(&self) -> u64 {
        self.stones
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    pub fn total_trials(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn total_stones_used(&self) -> u64 {
        stone_cost_for(self.total_trials())
    }

    /// Yen value of every stone consumed so far, priced as bundles.
    pub fn total_fee(&self) -> u64 {
        // Consumed stones were all bought, so their price already fit once.
        stone_fee_for(self.total_stones_used()).unwrap_or(u64::MAX)
    }
}

/// Per-slot counts for a single roll.
pub fn batch_counts(roll: &Roll, slot_count: usize) -> Vec<u64> {
    let mut counts = vec![0; slot_count];
    for &slot in &roll.slots {
        if let Some(count) = counts.get_mut(slot) {
            *count += 1;
        }
    }
    counts
}
