//! Injectable randomness for battles and expeditions.
//!
//! Every random draw in the arena goes through [`RollSource`], a uniform
//! `[0, 1)` source. Any [`rand::Rng`] is a roll source, so production code
//! passes `rand::rng()` and tests pass a seeded `SmallRng` or a
//! [`ScriptedRolls`] sequence that pins each branch exactly.

/// A source of uniform rolls in `[0, 1)`.
pub trait RollSource {
    /// Draw the next roll in `[0, 1)`.
    fn roll(&mut self) -> f64;

    /// Pick an index in `0..len` from the next roll.
    ///
    /// Returns `None` when `len` is zero.
    fn pick_index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        let len_f = crate::math::usize_to_f64(len);
        let index = crate::math::floor_to_usize(self.roll() * len_f);
        Some(index.min(len.saturating_sub(1)))
    }

    /// Draw a value in `[low, high)`.
    fn roll_between(&mut self, low: f64, high: f64) -> f64 {
        (high - low).mul_add(self.roll(), low)
    }
}

impl<R: rand::Rng + ?Sized> RollSource for R {
    fn roll(&mut self) -> f64 {
        self.random::<f64>()
    }
}

/// A fixed, cycling sequence of rolls.
///
/// Values are clamped into `[0, 1)` on construction. An empty script
/// always rolls `0.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptedRolls {
    values: Vec<f64>,
    cursor: usize,
}

impl ScriptedRolls {
    /// Create a script that replays `values` in order, wrapping around.
    pub fn new(values: impl IntoIterator<Item = f64>) -> Self {
        let values = values
            .into_iter()
            .map(|v| if v.is_nan() { 0.0 } else { v.clamp(0.0, MAX_ROLL) })
            .collect();
        Self { values, cursor: 0 }
    }

    /// Number of rolls drawn so far.
    pub const fn drawn(&self) -> usize {
        self.cursor
    }
}

/// Largest `f64` strictly below 1.0.
const MAX_ROLL: f64 = 1.0 - f64::EPSILON / 2.0;

impl RollSource for ScriptedRolls {
    fn roll(&mut self) -> f64 {
        let value = match self.values.len() {
            0 => 0.0,
            len => self.values.get(self.cursor % len).copied().unwrap_or(0.0),
        };
        self.cursor = self.cursor.saturating_add(1);
        value
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    #[test]
    fn scripted_rolls_cycle() {
        let mut rolls = ScriptedRolls::new([0.1, 0.9]);
        assert_eq!(rolls.roll(), 0.1);
        assert_eq!(rolls.roll(), 0.9);
        assert_eq!(rolls.roll(), 0.1);
        assert_eq!(rolls.drawn(), 3);
    }

    #[test]
    fn scripted_rolls_clamp_out_of_range_values() {
        let mut rolls = ScriptedRolls::new([1.5, -0.2, f64::NAN]);
        assert!(rolls.roll() < 1.0);
        assert_eq!(rolls.roll(), 0.0);
        assert_eq!(rolls.roll(), 0.0);
    }

    #[test]
    fn empty_script_rolls_zero() {
        let mut rolls = ScriptedRolls::new([]);
        assert_eq!(rolls.roll(), 0.0);
    }

    #[test]
    fn pick_index_stays_in_bounds() {
        let mut rolls = ScriptedRolls::new([0.0, 0.5, 0.999_999]);
        assert_eq!(rolls.pick_index(4), Some(0));
        assert_eq!(rolls.pick_index(4), Some(2));
        assert_eq!(rolls.pick_index(4), Some(3));
        assert_eq!(rolls.pick_index(0), None);
    }

    #[test]
    fn seeded_rng_rolls_are_unit_interval() {
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..1000 {
            let r = RollSource::roll(&mut rng);
            assert!((0.0..1.0).contains(&r));
        }
    }

    #[test]
    fn roll_between_scales_roll() {
        let mut rolls = ScriptedRolls::new([0.5]);
        let v = rolls.roll_between(0.8, 1.2);
        assert!((v - 1.0).abs() < 1e-12);
    }
}
