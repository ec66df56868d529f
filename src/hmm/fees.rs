use super::{Alphabet, ProfileHmm, NUM_TRANSITIONS};
use crate::utils::Result;

/// Transition kinds, in the column order used by HMMER files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    MM = 0,
    MI = 1,
    MD = 2,
    IM = 3,
    II = 4,
    DM = 5,
    DD = 6,
}

/// Null-model residue frequencies (HMMER's BLOSUM62 background).
#[rustfmt::skip]
const AMINO_BACKGROUND: [f64; 20] = [
    0.0787945, 0.0151600, 0.0535222, 0.0668298, 0.0397062,
    0.0695071, 0.0229198, 0.0590092, 0.0594422, 0.0963728,
    0.0237718, 0.0414386, 0.0482904, 0.0395639, 0.0540978,
    0.0683364, 0.0540687, 0.0673417, 0.0114135, 0.0304133,
];

const DNA_BACKGROUND: [f64; 4] = [0.25; 4];

pub fn background(alphabet: Alphabet) -> &'static [f64] {
    match alphabet {
        Alphabet::Dna => &DNA_BACKGROUND,
        Alphabet::Amino => &AMINO_BACKGROUND,
    }
}

/// Cost table of a profile. Every value is a negative natural log (lower is
/// better), emissions taken relative to the background.
///
/// Row 0 of the transitions belongs to the Begin state: `MM` enters match 1,
/// `MI` enters insert 0 and `MD` enters delete 1. `t[M][MM]` leaves the last
/// match column for End.
#[derive(Debug, Clone, PartialEq)]
pub struct Fees {
    pub m: usize,
    pub alphabet: Alphabet,
    pub t: Vec<[f64; NUM_TRANSITIONS]>,
    pub mat: Vec<Vec<f64>>,
    pub ins: Vec<Vec<f64>>,
}

impl Fees {
    pub fn new(
        alphabet: Alphabet,
        t: Vec<[f64; NUM_TRANSITIONS]>,
        mat: Vec<Vec<f64>>,
        ins: Vec<Vec<f64>>,
    ) -> Result<Self> {
        let rows = t.len();
        if rows == 0 || mat.len() != rows || ins.len() != rows {
            return Err(format!(
                "Inconsistent fee tables: {} transition, {} match, {} insert rows",
                rows,
                mat.len(),
                ins.len()
            ));
        }
        if mat
            .iter()
            .chain(ins.iter())
            .any(|row| row.len() != alphabet.size())
        {
            return Err(format!(
                "Emission rows must have {} columns for the {} alphabet",
                alphabet.size(),
                alphabet
            ));
        }
        Ok(Fees {
            m: rows - 1,
            alphabet,
            t,
            mat,
            ins,
        })
    }

    pub fn len(&self) -> usize {
        self.m
    }

    pub fn is_empty(&self) -> bool {
        self.m == 0
    }

    pub fn is_amino(&self) -> bool {
        self.alphabet == Alphabet::Amino
    }

    pub fn transition(&self, i: usize, kind: Transition) -> f64 {
        self.t[i][kind as usize]
    }

    /// Match emission cost at column `i`; symbols outside the alphabet (stops,
    /// unknown bases) cost infinity.
    pub fn mat(&self, i: usize, symbol: u8) -> f64 {
        self.mat[i]
            .get(symbol as usize)
            .copied()
            .unwrap_or(f64::INFINITY)
    }

    pub fn ins(&self, i: usize, symbol: u8) -> f64 {
        self.ins[i]
            .get(symbol as usize)
            .copied()
            .unwrap_or(f64::INFINITY)
    }

    pub fn begin_to_match(&self) -> f64 {
        self.transition(0, Transition::MM)
    }

    pub fn begin_to_insert(&self) -> f64 {
        self.transition(0, Transition::MI)
    }

    pub fn begin_to_delete(&self) -> f64 {
        self.transition(0, Transition::MD)
    }

    pub fn match_to_end(&self) -> f64 {
        self.transition(self.m, Transition::MM)
    }

    /// Smallest match emission cost of column `i`.
    pub fn min_mat(&self, i: usize) -> f64 {
        self.mat[i].iter().copied().fold(f64::INFINITY, f64::min)
    }
}

/// Converts a profile's negative log probabilities into costs against the
/// alphabet's background. Insert emissions never score better than
/// background, so they are clamped at zero.
pub fn fees_from_hmm(hmm: &ProfileHmm, alphabet: Alphabet) -> Result<Fees> {
    if hmm.alphabet != alphabet {
        return Err(format!(
            "Profile {} uses the {} alphabet, expected {}",
            hmm.name, hmm.alphabet, alphabet
        ));
    }
    let bg: Vec<f64> = background(alphabet).iter().map(|p| p.ln()).collect();
    let log_odds = |row: &Vec<f64>| -> Vec<f64> {
        row.iter().zip(&bg).map(|(score, ln_bg)| score + ln_bg).collect()
    };

    let mut mat: Vec<Vec<f64>> = hmm.match_emissions.iter().map(&log_odds).collect();
    if let Some(row) = mat.first_mut() {
        row.iter_mut().for_each(|v| *v = f64::INFINITY);
    }
    let ins = hmm
        .insert_emissions
        .iter()
        .map(|row| log_odds(row).into_iter().map(|v| v.max(0.0)).collect())
        .collect();

    Fees::new(alphabet, hmm.transitions.clone(), mat, ins)
        .map_err(|e| format!("Profile {}: {}", hmm.name, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn profile() -> ProfileHmm {
        ProfileHmm::from_probabilities(
            "p",
            Alphabet::Dna,
            &[vec![0.97, 0.01, 0.01, 0.01], vec![0.25; 4]],
            &[vec![0.25; 4], vec![0.1, 0.4, 0.4, 0.1], vec![0.25; 4]],
            &[
                [0.9, 0.05, 0.05, 0.5, 0.5, 1.0, 0.0],
                [0.8, 0.1, 0.1, 0.5, 0.5, 0.6, 0.4],
                [1.0, 0.0, 0.0, 1.0, 0.0, 1.0, 0.0],
            ],
        )
        .unwrap()
    }

    #[test]
    fn emissions_are_log_odds() {
        let fees = fees_from_hmm(&profile(), Alphabet::Dna).unwrap();
        assert_eq!(fees.m, 2);
        assert_relative_eq!(fees.mat(1, 0), -(0.97f64 / 0.25).ln(), epsilon = 1e-12);
        assert_relative_eq!(fees.mat(1, 1), -(0.01f64 / 0.25).ln(), epsilon = 1e-12);
        assert_relative_eq!(fees.mat(2, 3), 0.0, epsilon = 1e-12);
        assert!(fees.mat(0, 0).is_infinite());
        assert_relative_eq!(fees.min_mat(1), fees.mat(1, 0));
    }

    #[test]
    fn insert_costs_are_clamped() {
        let fees = fees_from_hmm(&profile(), Alphabet::Dna).unwrap();
        assert_relative_eq!(fees.ins(1, 1), 0.0);
        assert_relative_eq!(fees.ins(1, 0), -(0.1f64 / 0.25).ln(), epsilon = 1e-12);
    }

    #[test]
    fn boundary_transitions() {
        let fees = fees_from_hmm(&profile(), Alphabet::Dna).unwrap();
        assert_relative_eq!(fees.begin_to_match(), -(0.9f64.ln()));
        assert_relative_eq!(fees.begin_to_delete(), -(0.05f64.ln()));
        assert_relative_eq!(fees.match_to_end(), 0.0);
        assert_relative_eq!(fees.transition(1, Transition::DD), -(0.4f64.ln()));
        assert!(fees.transition(2, Transition::MD).is_infinite());
    }

    #[test]
    fn unscorable_symbols_cost_infinity() {
        let fees = fees_from_hmm(&profile(), Alphabet::Dna).unwrap();
        assert!(fees.mat(1, 4).is_infinite());
        assert!(fees.ins(1, 20).is_infinite());
    }

    #[test]
    fn alphabet_must_match() {
        assert!(fees_from_hmm(&profile(), Alphabet::Amino).is_err());
        assert!(Fees::new(Alphabet::Dna, vec![], vec![], vec![]).is_err());
    }
}
