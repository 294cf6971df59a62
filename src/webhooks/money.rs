//! Minor/major currency unit conversion
//!
//! Amounts travel on the wire as integer minor units (cents). These two
//! functions are the only place in the crate where the factor of 100 is
//! applied.

/// Minor units per major unit
pub const MINOR_UNITS_PER_MAJOR: i64 = 100;

/// Convert minor units (cents) to a major-unit float
pub fn minor_to_major(minor: i64) -> f64 {
    minor as f64 / MINOR_UNITS_PER_MAJOR as f64
}

/// Convert a major-unit float to minor units.
///
/// Rounds half away from zero so that values like `0.29` (which is
/// `28.999...` after multiplication) land on the intended cent.
/// Non-finite input saturates the way `as` casts do (NaN becomes 0).
pub fn major_to_minor(major: f64) -> i64 {
    (major * MINOR_UNITS_PER_MAJOR as f64).round() as i64
}
