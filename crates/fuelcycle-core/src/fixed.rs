use fixed::types::I32F32;

/// Q32.32 fixed-point: 32 integer bits, 32 fractional bits.
pub type Fixed64 = I32F32;

/// Material mass in kilograms.
pub type Mass = Fixed64;

/// Time steps are the atomic unit of simulation time.
pub type Ticks = u64;

/// Convert an f64 to Fixed64. Use only for initialization, never in the step loop.
#[inline]
pub fn f64_to_fixed64(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

/// Convert Fixed64 to f64. Use only for display and logging.
#[inline]
pub fn fixed64_to_f64(v: Fixed64) -> f64 {
    v.to_num::<f64>()
}

/// Mass of `count` whole units of `unit` kg, saturating at [`Mass::MAX`].
///
/// Very large counts (e.g. an "unbounded" spent store of a billion
/// assemblies) collapse to the maximum representable mass.
#[inline]
pub fn units_mass(count: u32, unit: Mass) -> Mass {
    Mass::saturating_from_num(count).saturating_mul(unit)
}

/// Number of whole `unit`-sized pieces that fit in `mass`. Zero for a
/// non-positive unit.
#[inline]
pub fn whole_units(mass: Mass, unit: Mass) -> u32 {
    if unit <= Mass::ZERO || mass <= Mass::ZERO {
        return 0;
    }
    mass.checked_div(unit)
        .map(|n| n.saturating_to_num::<u32>())
        .unwrap_or(u32::MAX)
}
