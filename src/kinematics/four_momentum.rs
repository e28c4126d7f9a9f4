//! Lorentz four-momentum in Cartesian components.
//!
//! Detector objects are stored as (pT, eta, phi, m); sums and invariant
//! masses are taken in (px, py, pz, E) so that vector addition is exact.

use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// A four-momentum (px, py, pz, E) in GeV
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FourMomentum {
    pub px: f64,
    pub py: f64,
    pub pz: f64,
    pub e: f64,
}

impl FourMomentum {
    /// Build from Cartesian components
    pub fn new(px: f64, py: f64, pz: f64, e: f64) -> Self {
        Self { px, py, pz, e }
    }

    /// Build from transverse momentum, pseudorapidity, azimuth and mass
    ///
    /// **Public** - the constructor every detector object goes through
    pub fn from_pt_eta_phi_m(pt: f64, eta: f64, phi: f64, m: f64) -> Self {
        let pt = pt.abs();
        let px = pt * phi.cos();
        let py = pt * phi.sin();
        let pz = pt * eta.sinh();
        let e = (px * px + py * py + pz * pz + m * m).sqrt();
        Self { px, py, pz, e }
    }

    /// Transverse momentum
    pub fn pt(&self) -> f64 {
        self.px.hypot(self.py)
    }

    /// Azimuthal angle in (-pi, pi]
    pub fn phi(&self) -> f64 {
        if self.px == 0.0 && self.py == 0.0 {
            0.0
        } else {
            self.py.atan2(self.px)
        }
    }

    /// Pseudorapidity; 0 for a vector with no momentum at all
    ///
    /// Purely longitudinal vectors map to +-infinity.
    pub fn eta(&self) -> f64 {
        let pt = self.pt();
        if pt == 0.0 {
            if self.pz == 0.0 {
                0.0
            } else {
                f64::INFINITY.copysign(self.pz)
            }
        } else {
            (self.pz / pt).asinh()
        }
    }

    /// Squared invariant mass (may be slightly negative from rounding)
    pub fn m2(&self) -> f64 {
        self.e * self.e - (self.px * self.px + self.py * self.py + self.pz * self.pz)
    }

    /// Invariant mass, signed like ROOT's `TLorentzVector::M`
    pub fn m(&self) -> f64 {
        let m2 = self.m2();
        if m2 < 0.0 {
            -(-m2).sqrt()
        } else {
            m2.sqrt()
        }
    }
}

impl Add for FourMomentum {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            px: self.px + rhs.px,
            py: self.py + rhs.py,
            pz: self.pz + rhs.pz,
            e: self.e + rhs.e,
        }
    }
}

impl AddAssign for FourMomentum {
    fn add_assign(&mut self, rhs: Self) {
        self.px += rhs.px;
        self.py += rhs.py;
        self.pz += rhs.pz;
        self.e += rhs.e;
    }
}

impl Sum for FourMomentum {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |acc, p| acc + p)
    }
}

impl<'a> Sum<&'a FourMomentum> for FourMomentum {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |acc, p| acc + *p)
    }
}

/// Invariant mass of a two-object system
pub fn pair_mass(a: &FourMomentum, b: &FourMomentum) -> f64 {
    (*a + *b).m()
}

/// Transverse mass of a visible object and the missing-energy vector
///
/// `mT = sqrt(2 pT(a) pT(met) (1 - cos(dphi)))`
pub fn transverse_mass(visible: &FourMomentum, met: &FourMomentum) -> f64 {
    let dphi = visible.phi() - met.phi();
    let mt2 = 2.0 * visible.pt() * met.pt() * (1.0 - dphi.cos());
    mt2.max(0.0).sqrt()
}
