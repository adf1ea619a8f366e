//! Float/integer conversions for the combat and rarity formulas.
//!
//! The formulas are specified over reals and rounded at fixed points. These
//! helpers do the rounding once, saturating instead of wrapping.

/// Round half away from zero and saturate into `u32`. NaN maps to 0.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn round_to_u32(value: f64) -> u32 {
    if value.is_nan() {
        return 0;
    }
    // `as` saturates for floats, negatives clamp to 0.
    value.round() as u32
}

/// Floor and saturate into `u32`. NaN maps to 0.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn floor_to_u32(value: f64) -> u32 {
    if value.is_nan() {
        return 0;
    }
    value.floor() as u32
}

/// Floor and saturate into `usize`. NaN maps to 0.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn floor_to_usize(value: f64) -> usize {
    if value.is_nan() {
        return 0;
    }
    value.floor() as usize
}

/// Widen a count into `f64`.
#[allow(clippy::cast_precision_loss)]
pub const fn usize_to_f64(value: usize) -> f64 {
    value as f64
}

/// Round to one decimal place.
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn rounding_saturates() {
        assert_eq!(round_to_u32(-3.2), 0);
        assert_eq!(round_to_u32(2.5), 3);
        assert_eq!(round_to_u32(f64::INFINITY), u32::MAX);
        assert_eq!(round_to_u32(f64::NAN), 0);
        assert_eq!(floor_to_u32(7.99), 7);
    }

    #[test]
    fn one_decimal() {
        assert_eq!(round_one_decimal(4.96), 5.0);
        assert_eq!(round_one_decimal(0.04), 0.0);
        assert_eq!(round_one_decimal(12.345), 12.3);
    }
}
