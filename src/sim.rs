use crate::error::GachaError;
use crate::gacha::{Gacha, RollEvent};
use crate::i18n::Language;
use crate::rng::Rng;
use crate::table::{OutcomeTable, Relief};
use crate::worker::WorkerPool;
use rayon::prelude::*;

const CHUNK_SIZE: usize = 64;

/// Aggregate of many independent rolls.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimStats {
    pub runs: u64,
    pub counts: Vec<u64>,
    pub rare_reliefs: u64,
    pub servant_reliefs: u64,
    pub skipped_reliefs: u64,
    pub fallthroughs: u64,
}

impl SimStats {
    pub fn empty(slot_count: usize) -> Self {
        SimStats {
            runs: 0,
            counts: vec![0; slot_count],
            rare_reliefs: 0,
            servant_reliefs: 0,
            skipped_reliefs: 0,
            fallthroughs: 0,
        }
    }

    fn merge(mut self, other: SimStats) -> Self {
        self.runs += other.runs;
        for (a, b) in self.counts.iter_mut().zip(&other.counts) {
            *a += b;
        }
        self.rare_reliefs += other.rare_reliefs;
        self.servant_reliefs += other.servant_reliefs;
        self.skipped_reliefs += other.skipped_reliefs;
        self.fallthroughs += other.fallthroughs;
        self
    }

    pub fn total_draws(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Observed share of each slot, in percent.
    pub fn frequencies(&self) -> Vec<f64> {
        let total = self.total_draws();
        if total == 0 {
            return vec![0.0; self.counts.len()];
        }
        self.counts
            .iter()
            .map(|&c| c as f64 * 100.0 / total as f64)
            .collect()
    }
}

/// Rolls `trials` summons `runs` times on one engine.
pub fn simulate_runs(gacha: &mut Gacha<Rng>, runs: usize, trials: u32) -> Result<SimStats, GachaError> {
    let mut stats = SimStats::empty(gacha.slot_count());
    for _ in 0..runs {
        let roll = gacha.roll(trials)?;
        stats.runs += 1;
        for &slot in &roll.slots {
            stats.counts[slot] += 1;
        }
        for event in &roll.events {
            match event {
                RollEvent::ReliefApplied { relief: Relief::Rare, .. } => stats.rare_reliefs += 1,
                RollEvent::ReliefApplied { relief: Relief::Servant, .. } => stats.servant_reliefs += 1,
                RollEvent::ReliefSkipped { .. } => stats.skipped_reliefs += 1,
                RollEvent::SamplingFallthrough { .. } => stats.fallthroughs += 1,
                RollEvent::NoTrials => {}
            }
        }
    }
    Ok(stats)
}

/// Splits `runs` into fixed chunks, each with its own engine seeded from
/// `seed` and the chunk index, so the totals do not depend on thread count.
pub fn simulate_stats(
    runs: usize,
    trials: u32,
    pick_up: bool,
    seed: u64,
    worker: &WorkerPool,
) -> Result<SimStats, GachaError> {
    let mut master_rng = Rng::from_seed(seed);
    let base_seed = master_rng.next_u64();
    let slot_count = OutcomeTable::canonical(pick_up, Language::En).len();

    let chunk_count = (runs + CHUNK_SIZE - 1) / CHUNK_SIZE;
    worker.execute(|| {
        (0..chunk_count)
            .into_par_iter()
            .map(|chunk_idx| {
                let start = chunk_idx * CHUNK_SIZE;
                let end = (start + CHUNK_SIZE).min(runs);
                let rng = Rng::from_seed(base_seed.wrapping_add(chunk_idx as u64));
                let mut gacha = Gacha::new(rng, pick_up, Language::En);
                simulate_runs(&mut gacha, end - start, trials)
            })
            .try_reduce(|| SimStats::empty(slot_count), |a, b| Ok(a.merge(b)))
    })?
}

pub fn format_frequency_lines(stats: &SimStats, table: &OutcomeTable) -> Vec<String> {
    let width = table.slots().iter().map(|s| s.label.chars().count()).max().unwrap_or(0);
    table
        .slots()
        .iter()
        .zip(stats.frequencies())
        .zip(&stats.counts)
        .map(|((slot, observed), count)| {
            format!(
                "  {:<width$}  {:>7.3}% (expected {:>6.2}%, {} hits)",
                slot.label,
                observed,
                slot.weight,
                count,
                width = width
            )
        })
        .collect()
}
