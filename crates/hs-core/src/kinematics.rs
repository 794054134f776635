//! Relativistic kinematics for single particles.
//!
//! Units: MeV, MeV/c, MeV/c², velocities in units of c. Every function is
//! pure and works on `f64`; nothing here rounds or clamps.

/// Transverse momentum `sqrt(px² + py²)`.
#[inline]
pub fn get_pt(px: f64, py: f64) -> f64 {
    px.hypot(py)
}

/// Total momentum `sqrt(pt² + pz²)`.
#[inline]
pub fn get_p(pt: f64, pz: f64) -> f64 {
    pt.hypot(pz)
}

/// Kinetic energy `sqrt(p² + m²) - m`.
#[inline]
pub fn get_ekin(mass: f64, p: f64) -> f64 {
    p.hypot(mass) - mass
}

/// Longitudinal rapidity `0.5 ln((E + pz) / (E - pz))` with `E = kinergy + mass`.
///
/// At the kinematic edge `E == |pz|` the result is ±inf; unphysical inputs
/// give NaN. Callers are expected to test `is_finite()`.
#[inline]
pub fn get_rapidity(kinergy: f64, pz: f64, mass: f64) -> f64 {
    let energy = kinergy + mass;
    0.5 * ((energy + pz) / (energy - pz)).ln()
}

/// Lorentz factor for velocity `beta`.
#[inline]
pub fn gamma(beta: f64) -> f64 {
    1.0 / (1.0 - beta * beta).sqrt()
}

/// Boost the longitudinal momentum along z: `pz' = γ (pz + β E)`.
///
/// With `beta = +betacms` this takes a cms momentum to the lab frame;
/// `-betacms` goes the other way.
#[inline]
pub fn boostz(mass: f64, pz: f64, kinergy: f64, beta: f64) -> f64 {
    let energy = kinergy + mass;
    gamma(beta) * (pz + beta * energy)
}

/// Polar angle (rad) of a momentum with transverse part `pt`.
#[inline]
pub fn get_theta(pt: f64, pz: f64) -> f64 {
    pt.atan2(pz)
}

/// Azimuthal angle in `(-π, π]`.
#[inline]
pub fn get_phi(px: f64, py: f64) -> f64 {
    py.atan2(px)
}
