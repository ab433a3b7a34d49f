use crate::error::GachaError;
use crate::i18n::Language;
use crate::rng::{RandomSource, Rng};
use crate::table::{OutcomeTable, Relief, SlotKind};
use log::{debug, info, warn};

/// Batch size that triggers the relief corrections.
pub const PITY_BATCH_SIZE: u32 = 10;
/// `next_scaled(SAMPLE_SCALE)` yields `[0, 100)` in 0.001% steps.
pub const SAMPLE_SCALE: u32 = 100_000;

const RARE_RELIEF_INDEX: usize = 0;
const SERVANT_RELIEF_INDEX: usize = 1;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Draw {
    pub slot: usize,
    pub value: f64,
    /// No interval contained `value`; `slot` is the slot-0 fallback.
    pub fell_through: bool,
}

/// Recoverable conditions met while rolling.
#[derive(Clone, Debug, PartialEq)]
pub enum RollEvent {
    NoTrials,
    SamplingFallthrough { value: f64 },
    ReliefApplied { relief: Relief, index: usize, slot: usize },
    ReliefSkipped { relief: Relief, sum: f64 },
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Roll {
    /// Slot indices in draw order.
    pub slots: Vec<usize>,
    pub events: Vec<RollEvent>,
}

impl Roll {
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[cfg(test)]
    pub fn relief_applied(&self, relief: Relief) -> bool {
        self.events
            .iter()
            .any(|e| matches!(e, RollEvent::ReliefApplied { relief: r, .. } if *r == relief))
    }
}

/// Inverse-CDF lookup: the first slot whose running weight sum exceeds the
/// sampled value wins. Declared order fixes the interval boundaries.
pub fn draw_one<R: RandomSource + ?Sized>(table: &OutcomeTable, rng: &mut R) -> Draw {
    let value = rng.next_scaled(SAMPLE_SCALE);
    let mut sum = 0.0;
    for (slot, entry) in table.slots().iter().enumerate() {
        sum += entry.weight;
        if value < sum {
            debug!("draw {:.3} -> {}", value, entry.label);
            return Draw { slot, value, fell_through: false };
        }
    }
    warn!("Could not pick gacha contents for value {:.3}, falling back to slot 0", value);
    Draw { slot: 0, value, fell_through: true }
}

/// Owns the active banner, its relief tables and the random source.
pub struct Gacha<R: RandomSource = Rng> {
    rng: R,
    lang: Language,
    pick_up: bool,
    table: OutcomeTable,
    rare_relief: OutcomeTable,
    servant_relief: OutcomeTable,
}

impl<R: RandomSource> Gacha<R> {
    pub fn new(rng: R, pick_up: bool, lang: Language) -> Self {
        Gacha {
            rng,
            lang,
            pick_up,
            table: OutcomeTable::canonical(pick_up, lang),
            rare_relief: OutcomeTable::relief(Relief::Rare, pick_up, lang),
            servant_relief: OutcomeTable::relief(Relief::Servant, pick_up, lang),
        }
    }

    /// Engine over hand-built tables; used to exercise the failure paths.
    #[cfg(test)]
    pub(crate) fn with_tables(
        rng: R,
        table: OutcomeTable,
        rare_relief: OutcomeTable,
        servant_relief: OutcomeTable,
    ) -> Self {
        Gacha {
            rng,
            lang: Language::En,
            pick_up: false,
            table,
            rare_relief,
            servant_relief,
        }
    }

    /// Replaces the active table and both relief tables. Anything sized by
    /// `slot_count()` must be re-sized by the caller.
    pub fn set_pick_up_mode(&mut self, active: bool) {
        self.pick_up = active;
        self.table = OutcomeTable::canonical(active, self.lang);
        self.rare_relief = OutcomeTable::relief(Relief::Rare, active, self.lang);
        self.servant_relief = OutcomeTable::relief(Relief::Servant, active, self.lang);
        info!("Pick-up mode set to {}", active);
    }

    pub fn is_pick_up(&self) -> bool {
        self.pick_up
    }

    pub fn table(&self) -> &OutcomeTable {
        &self.table
    }

    pub fn slot_count(&self) -> usize {
        self.table.len()
    }

    pub fn outcome_labels(&self) -> Vec<&str> {
        self.table.labels()
    }

    /// Draws `trials` outcomes. A batch of exactly `PITY_BATCH_SIZE` gets the
    /// 4★ relief (index 0) and then the servant relief (index 1).
    pub fn roll(&mut self, trials: u32) -> Result<Roll, GachaError> {
        if !self.table.validate() {
            let sum = self.table.weight_sum();
            warn!("Active table sums to {}, refusing to draw", sum);
            return Err(GachaError::InvalidTable { sum });
        }

        let mut roll = Roll::default();
        if trials == 0 {
            roll.events.push(RollEvent::NoTrials);
            return Ok(roll);
        }

        debug!("Trials: {}", trials);
        roll.slots.reserve(trials as usize);
        for _ in 0..trials {
            let draw = draw_one(&self.table, &mut self.rng);
            if draw.fell_through {
                roll.events.push(RollEvent::SamplingFallthrough { value: draw.value });
            }
            roll.slots.push(draw.slot);
        }

        if trials == PITY_BATCH_SIZE {
            if !self.any_slot(&roll.slots, SlotKind::is_rare) {
                self.apply_relief(Relief::Rare, RARE_RELIEF_INDEX, &mut roll);
            }
            if !self.any_slot(&roll.slots, SlotKind::is_servant) {
                self.apply_relief(Relief::Servant, SERVANT_RELIEF_INDEX, &mut roll);
            }
        }

        Ok(roll)
    }

    fn any_slot(&self, history: &[usize], pred: fn(&SlotKind) -> bool) -> bool {
        history
            .iter()
            .filter_map(|&i| self.table.get(i))
            .any(|slot| pred(&slot.kind))
    }

    fn apply_relief(&mut self, relief: Relief, index: usize, roll: &mut Roll) {
        let sub = match relief {
            Relief::Rare => &self.rare_relief,
            Relief::Servant => &self.servant_relief,
        };
        if !sub.validate() {
            let sum = sub.weight_sum();
            warn!("[{}] table sums to {}, keeping the original result", relief, sum);
            roll.events.push(RollEvent::ReliefSkipped { relief, sum });
            return;
        }

        let draw = draw_one(sub, &mut self.rng);
        if draw.fell_through {
            roll.events.push(RollEvent::SamplingFallthrough { value: draw.value });
        }
        info!("10-summon {}: index {} re-drawn as slot {}", relief, index, draw.slot);
        roll.slots[index] = draw.slot;
        roll.events.push(RollEvent::ReliefApplied { relief, index, slot: draw.slot });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Replays fixed, already-scaled values.
    struct Scripted(VecDeque<f64>);

    impl Scripted {
        fn new(values: &[f64]) -> Self {
            Scripted(values.iter().copied().collect())
        }
    }

    impl RandomSource for Scripted {
        fn next_scaled(&mut self, _max_exclusive: u32) -> f64 {
            self.0.pop_front().expect("script exhausted")
        }
    }

    fn normal(values: &[f64]) -> Gacha<Scripted> {
        Gacha::new(Scripted::new(values), false, Language::En)
    }

    fn ten(value: f64) -> Vec<f64> {
        vec![value; PITY_BATCH_SIZE as usize]
    }

    // Normal table cumulative bounds: 1, 4, 44, 48, 60, 100.
    const S3: f64 = 20.0;
    const CE4: f64 = 55.0;
    const CE3: f64 = 70.0;

    #[test]
    fn forced_positions_hit_expected_slots() {
        let table = OutcomeTable::canonical(false, Language::En);
        let mut rng = Scripted::new(&[0.5, 2.0, 99.9, 0.0, 1.0, 44.0]);
        let slots: Vec<usize> = (0..6).map(|_| draw_one(&table, &mut rng).slot).collect();
        assert_eq!(slots, vec![0, 1, 5, 0, 1, 3]);
        assert_eq!(table.labels()[0], "Servant 5★");
        assert_eq!(table.labels()[5], "Craft Essence 3★");
    }

    #[test]
    fn value_past_every_interval_falls_back_to_slot_zero() {
        let table = OutcomeTable::canonical(false, Language::En).with_weights(&[10.0, 10.0]);
        let draw = draw_one(&table, &mut Scripted::new(&[75.0]));
        assert_eq!(draw, Draw { slot: 0, value: 75.0, fell_through: true });
    }

    #[test]
    fn fallthrough_is_reported_but_roll_continues() {
        let mut gacha = normal(&[100.0, 3.0]);
        let roll = gacha.roll(2).unwrap();
        assert_eq!(roll.slots, vec![0, 1]);
        assert_eq!(roll.events, vec![RollEvent::SamplingFallthrough { value: 100.0 }]);
    }

    #[test]
    fn zero_trials_is_an_empty_no_op() {
        let mut gacha = normal(&[]);
        let roll = gacha.roll(0).unwrap();
        assert!(roll.is_empty());
        assert_eq!(roll.events, vec![RollEvent::NoTrials]);

        let mut gacha = Gacha::new(Rng::from_seed(1), true, Language::En);
        assert!(gacha.roll(0).unwrap().is_empty());
    }

    #[test]
    fn invalid_table_returns_error_and_nothing() {
        let base = OutcomeTable::canonical(false, Language::En);
        let broken = base.with_weights(&[1.0, 3.0, 40.0, 4.0, 12.0, 30.0]);
        let mut gacha = Gacha::with_tables(
            Rng::from_seed(3),
            broken,
            OutcomeTable::relief(Relief::Rare, false, Language::En),
            OutcomeTable::relief(Relief::Servant, false, Language::En),
        );
        for trials in [0, 1, 10] {
            match gacha.roll(trials) {
                Err(GachaError::InvalidTable { sum }) => assert_eq!(sum, 90.0),
                other => panic!("expected InvalidTable, got {:?}", other),
            }
        }
    }

    #[test]
    fn non_pity_batches_are_never_corrected() {
        // Nine 3★ essences: no relief outside a 10-batch.
        let mut gacha = normal(&[CE3; 9]);
        let roll = gacha.roll(9).unwrap();
        assert_eq!(roll.slots, vec![5; 9]);
        assert!(roll.events.is_empty());

        let mut gacha = normal(&[CE3; 11]);
        let roll = gacha.roll(11).unwrap();
        assert_eq!(roll.slots, vec![5; 11]);
        assert!(roll.events.is_empty());
    }

    #[test]
    fn all_three_star_servants_get_rare_relief_only() {
        let mut script = ten(S3);
        // Rare relief cumulative: 1, 4, 4, 8, 100, 100.
        script.push(50.0);
        let mut gacha = normal(&script);
        let roll = gacha.roll(10).unwrap();
        assert_eq!(roll.slots[0], 4);
        assert!(roll.slots[1..].iter().all(|&s| s == 2));
        assert_eq!(
            roll.events,
            vec![RollEvent::ReliefApplied { relief: Relief::Rare, index: 0, slot: 4 }]
        );
    }

    #[test]
    fn all_essences_get_servant_relief_only_when_rare_present() {
        let mut gacha = normal(&{
            let mut s = ten(CE4);
            // Servant relief cumulative: 1, 4, 100.
            s.push(50.0);
            s
        });
        let roll = gacha.roll(10).unwrap();
        assert_eq!(roll.slots[1], 2);
        assert_eq!(roll.slots[0], 4);
        assert!(!roll.relief_applied(Relief::Rare));
        assert!(roll.relief_applied(Relief::Servant));
    }

    #[test]
    fn both_reliefs_fire_on_all_three_star_essences() {
        let mut script = ten(CE3);
        script.push(50.0); // rare relief -> CE 4★
        script.push(50.0); // servant relief -> Servant 3★
        let mut gacha = normal(&script);
        let roll = gacha.roll(10).unwrap();
        assert_eq!(roll.slots[0], 4);
        assert_eq!(roll.slots[1], 2);
        assert!(roll.slots[2..].iter().all(|&s| s == 5));
        assert!(roll.relief_applied(Relief::Rare));
        assert!(roll.relief_applied(Relief::Servant));
    }

    #[test]
    fn pick_up_reliefs_use_the_pick_up_sub_tables() {
        // Pick-up cumulative: 0.5, 1, 2.5, 4, 44, 46, 48, 54, 60, 100.
        let mut script = ten(70.0); // CE 3★, slot 9
        // Rare relief cumulative: 0.5, 1, 2.5, 4, 4, 6, 8, 54, 100, 100.
        script.push(30.0); // -> CE 4★ (Pick-up), slot 7
        // Servant relief cumulative: 0.5, 1, 2.5, 4, 100.
        script.push(50.0); // -> Servant 3★, slot 4
        let mut gacha = Gacha::new(Scripted::new(&script), true, Language::En);
        let roll = gacha.roll(10).unwrap();
        assert_eq!(roll.slots[0], 7);
        assert_eq!(roll.slots[1], 4);
        assert!(roll.slots[2..].iter().all(|&s| s == 9));
        assert_eq!(
            roll.events,
            vec![
                RollEvent::ReliefApplied { relief: Relief::Rare, index: 0, slot: 7 },
                RollEvent::ReliefApplied { relief: Relief::Servant, index: 1, slot: 4 },
            ]
        );

        let mut script = ten(70.0);
        script.push(80.0); // -> CE 4★, slot 8
        script.push(3.0); // -> Servant 4★, slot 3
        let mut gacha = Gacha::new(Scripted::new(&script), true, Language::En);
        let roll = gacha.roll(10).unwrap();
        assert_eq!(&roll.slots[..2], &[8, 3]);
        assert_eq!(gacha.outcome_labels()[8], "Craft Essence 4★");
        assert_eq!(gacha.outcome_labels()[3], "Servant 4★");
    }

    #[test]
    fn servant_check_sees_the_rare_relief_result() {
        let mut script = ten(CE3);
        script.push(0.5); // rare relief -> Servant 5★, which also satisfies the servant check
        let mut gacha = normal(&script);
        let roll = gacha.roll(10).unwrap();
        assert_eq!(roll.slots[0], 0);
        assert_eq!(roll.slots[1], 5);
        assert!(!roll.relief_applied(Relief::Servant));
    }

    #[test]
    fn invalid_relief_table_is_skipped() {
        let base = OutcomeTable::canonical(false, Language::En);
        let broken_rare = base.with_weights(&[1.0, 3.0, 0.0, 4.0, 90.0, 0.0]);
        let mut script = ten(CE3);
        script.push(50.0); // consumed by the servant relief only
        let mut gacha = Gacha::with_tables(
            Scripted::new(&script),
            base,
            broken_rare,
            OutcomeTable::relief(Relief::Servant, false, Language::En),
        );
        let roll = gacha.roll(10).unwrap();
        assert_eq!(roll.slots[0], 5);
        assert_eq!(roll.slots[1], 2);
        assert_eq!(roll.events[0], RollEvent::ReliefSkipped { relief: Relief::Rare, sum: 98.0 });
        assert!(roll.relief_applied(Relief::Servant));
    }

    #[test]
    fn batch_lengths_and_ranges() {
        for pick_up in [true, false] {
            let mut gacha = Gacha::new(Rng::from_seed(11), pick_up, Language::En);
            for trials in [1u32, 2, 9, 10, 11, 100] {
                let roll = gacha.roll(trials).unwrap();
                assert_eq!(roll.len(), trials as usize);
                assert!(roll.slots.iter().all(|&s| s < gacha.slot_count()));
            }
        }
    }

    #[test]
    fn ten_batches_always_hold_a_rare_and_a_servant() {
        for pick_up in [true, false] {
            let mut gacha = Gacha::new(Rng::from_seed(2024), pick_up, Language::En);
            for _ in 0..5_000 {
                let roll = gacha.roll(10).unwrap();
                assert_eq!(roll.len(), 10);
                let kinds: Vec<SlotKind> =
                    roll.slots.iter().filter_map(|&s| gacha.table().get(s).map(|x| x.kind)).collect();
                assert!(kinds.iter().any(SlotKind::is_rare));
                assert!(kinds.iter().any(SlotKind::is_servant));
                if roll.relief_applied(Relief::Rare) {
                    assert!(kinds[0].is_rare());
                }
                if roll.relief_applied(Relief::Servant) {
                    assert!(kinds[1].is_servant());
                }
            }
        }
    }

    #[test]
    fn observed_frequencies_match_weights() {
        const N: usize = 1_000_000;
        for pick_up in [true, false] {
            let table = OutcomeTable::canonical(pick_up, Language::En);
            let mut rng = Rng::from_seed(0xC0FFEE);
            let mut counts = vec![0usize; table.len()];
            for _ in 0..N {
                counts[draw_one(&table, &mut rng).slot] += 1;
            }
            for (slot, count) in table.slots().iter().zip(&counts) {
                let observed = *count as f64 * 100.0 / N as f64;
                assert!(
                    (observed - slot.weight).abs() < 0.5,
                    "{}: observed {:.3}% vs {:.3}%",
                    slot.label,
                    observed,
                    slot.weight
                );
            }
        }
    }

    #[test]
    fn switching_mode_swaps_the_table() {
        let mut gacha = Gacha::new(Rng::from_seed(5), true, Language::En);
        assert_eq!(gacha.slot_count(), 10);
        assert!(gacha.is_pick_up());

        gacha.set_pick_up_mode(false);
        assert_eq!(gacha.slot_count(), 6);
        assert!(!gacha.is_pick_up());
        assert_eq!(
            gacha.outcome_labels(),
            OutcomeTable::canonical(false, Language::En).labels()
        );

        gacha.set_pick_up_mode(true);
        assert_eq!(gacha.slot_count(), 10);
        assert_eq!(gacha.outcome_labels()[0], "Servant 5★ (Pick-up)");
    }
}
