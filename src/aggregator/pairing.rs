//! Combinatorial b-jet pairing for di-resonance reconstruction.
//!
//! Two searches run over the same b-jet list:
//!
//! - a chi-square search over every way of picking four b-jets and
//!   splitting them into two pairs, scoring `sum (m_pair - target)^2`;
//! - an independent best-pair search keeping the pair with the largest
//!   scalar pT sum (`H_b`) and its invariant mass (`m_bb`).
//!
//! The best pair is not required to be one of the halves of the
//! chi-square assignment, and the two often disagree.

use crate::kinematics::{pair_mass, FourMomentum};
use crate::selection::PhysicsObject;
use crate::utils::config::DEFAULT_PAIR_TARGET_MASS;
use log::trace;

/// The three ways to split four labelled slots into two unordered pairs
const SPLITS: [[(usize, usize); 2]; 3] = [[(0, 1), (2, 3)], [(0, 2), (1, 3)], [(0, 3), (1, 2)]];

/// Winning chi-square assignment
#[derive(Debug, Clone, PartialEq)]
pub struct PairAssignment {
    /// Indices into the input list; each pair ordered, pairs ordered by first index
    pub pairs: [(usize, usize); 2],
    /// Invariant mass of each pair
    pub masses: [f64; 2],
    pub chi2: f64,
}

/// Highest summed-pT pair
#[derive(Debug, Clone, PartialEq)]
pub struct BestPair {
    pub indices: (usize, usize),
    /// Invariant mass of the pair (`m_bb`)
    pub mass: f64,
    /// Scalar pT sum of the pair (`H_b`)
    pub ht: f64,
}

/// Output of both searches; `None` when too few jets were given
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PairingResult {
    pub assignment: Option<PairAssignment>,
    pub best_pair: Option<BestPair>,
}

/// Chi-square pairing search with a fixed target mass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairAssignmentSolver {
    target_mass: f64,
}

impl Default for PairAssignmentSolver {
    fn default() -> Self {
        Self::new(DEFAULT_PAIR_TARGET_MASS)
    }
}

impl PairAssignmentSolver {
    pub fn new(target_mass: f64) -> Self {
        Self { target_mass }
    }

    pub fn target_mass(&self) -> f64 {
        self.target_mass
    }

    /// Run both searches over `objects`, in their given order
    ///
    /// **Public** - main entry point for pairing
    pub fn solve<T: PhysicsObject>(&self, objects: &[T]) -> PairingResult {
        let p4s: Vec<FourMomentum> = objects.iter().map(|o| o.p4()).collect();
        let pts: Vec<f64> = objects.iter().map(|o| o.pt()).collect();

        PairingResult {
            assignment: self.best_assignment(&p4s),
            best_pair: best_pair(&p4s, &pts),
        }
    }

    /// Minimum chi-square over all 4-subsets x 3 splits
    ///
    /// Enumeration is lexicographic in (i1 < i2 < i3 < i4, split); on a tie
    /// the first candidate found is kept. NaN scores never win. Fewer than
    /// four inputs give `None`.
    ///
    /// Cost is C(n,4) * 3 mass evaluations, fine for b-jet multiplicities.
    pub fn best_assignment(&self, p4s: &[FourMomentum]) -> Option<PairAssignment> {
        let n = p4s.len();
        if n < 4 {
            return None;
        }

        let mut best: Option<PairAssignment> = None;

        for i1 in 0..n - 3 {
            for i2 in i1 + 1..n - 2 {
                for i3 in i2 + 1..n - 1 {
                    for i4 in i3 + 1..n {
                        let slots = [i1, i2, i3, i4];
                        for split in SPLITS.iter() {
                            let candidate = self.score(p4s, &slots, split);
                            if candidate.chi2.is_nan() {
                                continue;
                            }
                            let better = best.as_ref().map_or(true, |b| candidate.chi2 < b.chi2);
                            if better {
                                best = Some(candidate);
                            }
                        }
                    }
                }
            }
        }

        if let Some(b) = &best {
            trace!("Best b-jet assignment {:?} with chi2 {:.3}", b.pairs, b.chi2);
        }

        best
    }

    fn score(
        &self,
        p4s: &[FourMomentum],
        slots: &[usize; 4],
        split: &[(usize, usize); 2],
    ) -> PairAssignment {
        let pairs = [
            (slots[split[0].0], slots[split[0].1]),
            (slots[split[1].0], slots[split[1].1]),
        ];
        let masses = [
            pair_mass(&p4s[pairs[0].0], &p4s[pairs[0].1]),
            pair_mass(&p4s[pairs[1].0], &p4s[pairs[1].1]),
        ];
        let chi2 = masses
            .iter()
            .map(|m| (m - self.target_mass).powi(2))
            .sum();

        PairAssignment { pairs, masses, chi2 }
    }
}

/// Pair with the largest scalar pT sum over all unordered pairs
///
/// First pair found wins a tie. Fewer than two inputs give `None`.
pub fn best_pair(p4s: &[FourMomentum], pts: &[f64]) -> Option<BestPair> {
    let n = p4s.len().min(pts.len());
    let mut best: Option<BestPair> = None;

    for i in 0..n {
        for j in i + 1..n {
            let ht = pts[i] + pts[j];
            if best.as_ref().map_or(true, |b| ht > b.ht) {
                best = Some(BestPair {
                    indices: (i, j),
                    mass: pair_mass(&p4s[i], &p4s[j]),
                    ht,
                });
            }
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    /// Massless jet of given pT in the transverse plane
    fn jet(pt: f64, phi: f64) -> FourMomentum {
        FourMomentum::from_pt_eta_phi_m(pt, 0.0, phi, 0.0)
    }

    #[test]
    fn test_too_few_jets() {
        let solver = PairAssignmentSolver::default();
        let p4s = vec![jet(60.0, 0.0), jet(60.0, PI), jet(30.0, 1.0)];
        assert!(solver.best_assignment(&p4s).is_none());
        assert!(best_pair(&p4s[..1], &[60.0]).is_none());
        assert!(best_pair(&p4s, &[60.0, 60.0, 30.0]).is_some());
    }

    #[test]
    fn test_exact_pairing_interleaved() {
        // Jets 0+2 and 1+3 are back-to-back 60 GeV pairs -> m = 120 each
        let p4s = vec![
            jet(60.0, 0.0),
            jet(60.0, 0.5 * PI),
            jet(60.0, PI),
            jet(60.0, -0.5 * PI),
        ];

        let best = PairAssignmentSolver::new(120.0).best_assignment(&p4s).unwrap();
        assert_eq!(best.pairs, [(0, 2), (1, 3)]);
        assert!(best.chi2 < 1e-12);
        assert!((best.masses[0] - 120.0).abs() < 1e-9);
    }

    #[test]
    fn test_best_pair_independent_of_assignment() {
        let p4s = vec![
            jet(200.0, 0.0),
            jet(150.0, 0.1),
            jet(60.0, PI),
            jet(60.0, 0.0),
        ];
        let pts = [200.0, 150.0, 60.0, 60.0];

        let pair = best_pair(&p4s, &pts).unwrap();
        assert_eq!(pair.indices, (0, 1));
        assert_eq!(pair.ht, 350.0);
        assert!(pair.mass > 0.0);
    }

    #[test]
    fn test_search_covers_every_subset() {
        // Soft decoys at 0 and 1; exact 120 GeV pairs are (2,4) and (3,5)
        let p4s = vec![
            jet(5.0, 0.0),
            jet(4.0, 0.3),
            jet(60.0, 0.0),
            jet(60.0, 0.5 * PI),
            jet(60.0, PI),
            jet(60.0, -0.5 * PI),
        ];

        let best = PairAssignmentSolver::new(120.0).best_assignment(&p4s).unwrap();
        assert_eq!(best.pairs, [(2, 4), (3, 5)]);
        assert!(best.chi2 < 1e-9);
    }

    #[test]
    fn test_tie_keeps_first_candidate() {
        // Identical jets score every split of every subset the same
        let p4s = vec![FourMomentum::from_pt_eta_phi_m(50.0, 0.3, 1.0, 10.0); 5];

        let best = PairAssignmentSolver::new(120.0).best_assignment(&p4s).unwrap();
        assert_eq!(best.pairs, [(0, 1), (2, 3)]);
    }

    #[test]
    fn test_nan_candidates_skipped() {
        let mut p4s = vec![
            jet(f64::NAN, 0.0),
            jet(60.0, 0.0),
            jet(60.0, 0.5 * PI),
            jet(60.0, PI),
            jet(60.0, -0.5 * PI),
        ];

        let solver = PairAssignmentSolver::new(120.0);
        let best = solver.best_assignment(&p4s).unwrap();
        assert!(!best.chi2.is_nan());
        assert_eq!(best.pairs, [(1, 3), (2, 4)]);

        // Every subset touches the NaN jet
        p4s.truncate(4);
        assert!(solver.best_assignment(&p4s).is_none());
    }
}
