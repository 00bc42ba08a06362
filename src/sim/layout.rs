//! Per-round door assignment
//!
//! One safe door, one distinct curse door, everything else is a monster.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::{CURSE_DAMAGE, MONSTER_DAMAGE};

/// What lies behind a door
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DoorOutcome {
    Safe,
    Monster,
    Curse,
}

impl DoorOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            DoorOutcome::Safe => "SAFE",
            DoorOutcome::Monster => "MONSTER",
            DoorOutcome::Curse => "CURSE",
        }
    }

    /// Lives lost before wards/criticals
    pub fn base_damage(&self) -> u8 {
        match self {
            DoorOutcome::Safe => 0,
            DoorOutcome::Monster => MONSTER_DAMAGE,
            DoorOutcome::Curse => CURSE_DAMAGE,
        }
    }

    pub fn is_damaging(&self) -> bool {
        *self != DoorOutcome::Safe
    }
}

/// Hidden assignment for one round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundLayout {
    pub door_count: usize,
    pub safe_door_index: usize,
    pub curse_door_index: usize,
}

impl RoundLayout {
    /// Roll a layout: uniform safe door, then a curse door re-rolled until distinct.
    ///
    /// Panics if `door_count` is below 2; no distinct curse door exists then.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R, door_count: usize) -> Self {
        assert!(door_count >= 2, "need room for a safe and a curse door, got {door_count}");
        let safe_door_index = rng.random_range(0..door_count);
        let mut curse_door_index = rng.random_range(0..door_count);
        while curse_door_index == safe_door_index {
            curse_door_index = rng.random_range(0..door_count);
        }
        Self {
            door_count,
            safe_door_index,
            curse_door_index,
        }
    }

    /// Fixed layout; `None` if the indices break the layout invariant
    pub fn fixed(door_count: usize, safe_door_index: usize, curse_door_index: usize) -> Option<Self> {
        let layout = Self {
            door_count,
            safe_door_index,
            curse_door_index,
        };
        layout.is_valid().then_some(layout)
    }

    pub fn is_valid(&self) -> bool {
        self.safe_door_index < self.door_count
            && self.curse_door_index < self.door_count
            && self.safe_door_index != self.curse_door_index
    }

    /// Outcome behind `index` (monster by elimination)
    pub fn outcome(&self, index: usize) -> DoorOutcome {
        if index == self.safe_door_index {
            DoorOutcome::Safe
        } else if index == self.curse_door_index {
            DoorOutcome::Curse
        } else {
            DoorOutcome::Monster
        }
    }

    /// First monster door (handy for scripted picks)
    pub fn first_monster(&self) -> Option<usize> {
        (0..self.door_count).find(|&i| self.outcome(i) == DoorOutcome::Monster)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    #[should_panic(expected = "need room for a safe and a curse door")]
    fn test_single_door_fails_fast() {
        let mut rng = Pcg32::seed_from_u64(1);
        RoundLayout::generate(&mut rng, 1);
    }

    #[test]
    fn test_outcome_by_elimination() {
        let layout = RoundLayout::fixed(5, 2, 4).unwrap();
        assert_eq!(layout.outcome(2), DoorOutcome::Safe);
        assert_eq!(layout.outcome(4), DoorOutcome::Curse);
        for i in [0, 1, 3] {
            assert_eq!(layout.outcome(i), DoorOutcome::Monster);
        }
        assert_eq!(layout.first_monster(), Some(0));
    }

    #[test]
    fn test_fixed_rejects_bad_layouts() {
        assert!(RoundLayout::fixed(5, 2, 2).is_none());
        assert!(RoundLayout::fixed(5, 5, 1).is_none());
        assert!(RoundLayout::fixed(5, 1, 7).is_none());
    }

    #[test]
    fn test_two_doors_always_split() {
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..100 {
            let layout = RoundLayout::generate(&mut rng, 2);
            assert_eq!(layout.safe_door_index + layout.curse_door_index, 1);
        }
    }

    #[test]
    fn test_damage_values() {
        assert_eq!(DoorOutcome::Safe.base_damage(), 0);
        assert_eq!(DoorOutcome::Monster.base_damage(), 1);
        assert_eq!(DoorOutcome::Curse.base_damage(), 2);
    }

    proptest! {
        #[test]
        fn prop_generated_layouts_are_valid(seed in any::<u64>(), doors in 2usize..12) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let layout = RoundLayout::generate(&mut rng, doors);
            prop_assert!(layout.is_valid());
            prop_assert_ne!(layout.safe_door_index, layout.curse_door_index);
            prop_assert!(layout.safe_door_index < doors);
            prop_assert!(layout.curse_door_index < doors);
        }
    }
}
