use crate::i18n::{I18n, Language};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    Servant,
    CraftEssence,
}

/// What a slot yields. Pity decisions look at this, never at the label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SlotKind {
    pub category: Category,
    pub rarity: u8,
    pub pick_up: bool,
}

impl SlotKind {
    pub const fn servant(rarity: u8, pick_up: bool) -> Self {
        SlotKind { category: Category::Servant, rarity, pick_up }
    }

    pub const fn essence(rarity: u8, pick_up: bool) -> Self {
        SlotKind { category: Category::CraftEssence, rarity, pick_up }
    }

    pub fn is_servant(&self) -> bool {
        self.category == Category::Servant
    }

    /// 4★ or better, either category. The 4★ relief only fires on a batch of
    /// nothing but 3★ results, so a 4★ craft essence counts as much as a servant.
    pub fn is_rare(&self) -> bool {
        self.rarity >= 4
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Slot {
    pub kind: SlotKind,
    pub weight: f64,
    pub label: String,
}

/// The two pity corrections of a 10-draw batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Relief {
    /// Guarantees a 4★ or better outcome.
    Rare,
    /// Guarantees a servant.
    Servant,
}

impl fmt::Display for Relief {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Relief::Rare => write!(f, "4-star relief"),
            Relief::Servant => write!(f, "servant relief"),
        }
    }
}

// --- Authored tables (percent). Order defines the sampling intervals. ---

const PICK_UP_LAYOUT: [SlotKind; 10] = [
    SlotKind::servant(5, true),
    SlotKind::servant(5, false),
    SlotKind::servant(4, true),
    SlotKind::servant(4, false),
    SlotKind::servant(3, false),
    SlotKind::essence(5, true),
    SlotKind::essence(5, false),
    SlotKind::essence(4, true),
    SlotKind::essence(4, false),
    SlotKind::essence(3, false),
];
const PICK_UP_WEIGHTS: [f64; 10] = [0.5, 0.5, 1.5, 1.5, 40.0, 2.0, 2.0, 6.0, 6.0, 40.0];
const PICK_UP_RARE_RELIEF: [f64; 10] = [0.5, 0.5, 1.5, 1.5, 0.0, 2.0, 2.0, 46.0, 46.0, 0.0];
const PICK_UP_SERVANT_RELIEF: [f64; 10] = [0.5, 0.5, 1.5, 1.5, 96.0, 0.0, 0.0, 0.0, 0.0, 0.0];

const NORMAL_LAYOUT: [SlotKind; 6] = [
    SlotKind::servant(5, false),
    SlotKind::servant(4, false),
    SlotKind::servant(3, false),
    SlotKind::essence(5, false),
    SlotKind::essence(4, false),
    SlotKind::essence(3, false),
];
const NORMAL_WEIGHTS: [f64; 6] = [1.0, 3.0, 40.0, 4.0, 12.0, 40.0];
const NORMAL_RARE_RELIEF: [f64; 6] = [1.0, 3.0, 0.0, 4.0, 92.0, 0.0];
const NORMAL_SERVANT_RELIEF: [f64; 6] = [1.0, 3.0, 96.0, 0.0, 0.0, 0.0];

/// Weights must add up to this, in percent.
pub const TOTAL_WEIGHT: f64 = 100.0;

/// Ordered outcome table for one banner mode.
#[derive(Clone, Debug, PartialEq)]
pub struct OutcomeTable {
    slots: Vec<Slot>,
}

impl OutcomeTable {
    fn from_layout(layout: &[SlotKind], weights: &[f64], lang: Language) -> Self {
        let slots = layout
            .iter()
            .zip(weights)
            .map(|(kind, &weight)| Slot {
                kind: *kind,
                weight,
                label: I18n::slot_label(lang, kind),
            })
            .collect();
        OutcomeTable { slots }
    }

    /// The banner table for the given mode.
    pub fn canonical(pick_up: bool, lang: Language) -> Self {
        if pick_up {
            Self::from_layout(&PICK_UP_LAYOUT, &PICK_UP_WEIGHTS, lang)
        } else {
            Self::from_layout(&NORMAL_LAYOUT, &NORMAL_WEIGHTS, lang)
        }
    }

    /// The re-draw table for one relief, same slots as `canonical(pick_up, _)`.
    pub fn relief(relief: Relief, pick_up: bool, lang: Language) -> Self {
        let weights: &[f64] = match (relief, pick_up) {
            (Relief::Rare, true) => &PICK_UP_RARE_RELIEF,
            (Relief::Rare, false) => &NORMAL_RARE_RELIEF,
            (Relief::Servant, true) => &PICK_UP_SERVANT_RELIEF,
            (Relief::Servant, false) => &NORMAL_SERVANT_RELIEF,
        };
        Self::canonical(pick_up, lang).with_weights(weights)
    }

    /// Same slots, new weights. Extra weights are ignored, missing ones become 0.
    pub fn with_weights(&self, weights: &[f64]) -> Self {
        let slots = self
            .slots
            .iter()
            .enumerate()
            .map(|(i, slot)| Slot {
                weight: weights.get(i).copied().unwrap_or(0.0),
                ..slot.clone()
            })
            .collect();
        OutcomeTable { slots }
    }

    pub fn weight_sum(&self) -> f64 {
        self.slots.iter().map(|s| s.weight).sum()
    }

    /// Exact comparison: tables are authored so the sum is representable.
    pub fn validate(&self) -> bool {
        self.weight_sum() == TOTAL_WEIGHT
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn get(&self, index: usize) -> Option<&Slot> {
        self.slots.get(index)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.slots.iter().map(|s| s.label.as_str()).collect()
    }
}

impl fmt::Display for OutcomeTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.slots.iter().map(|s| s.label.chars().count()).max().unwrap_or(0);
        let mut cumulative = 0.0;
        for slot in &self.slots {
            cumulative += slot.weight;
            writeln!(
                f,
                "  {:<width$}  {:>6.2}%  (cumulative {:>6.2}%)",
                slot.label,
                slot.weight,
                cumulative,
                width = width
            )?;
        }
        write!(f, "  total: {:.2}%", self.weight_sum())
    }
}
