//! # Equilibrium constants and backward rate coefficients
//!
//! For every reaction `j` with net stoichiometry column `nu[:, j]` (products minus reactants)
//! the equilibrium constant is obtained from the NASA-7 fits of the species:
//!
//! ```text
//! dH/RT = nu^T * H/RT,   dS/R = nu^T * S/R,   dG/RT = dS/R - dH/RT
//! Ke    = (p0 / (R*T))^gamma * exp(dG/RT),    gamma = sum(nu[:, j])
//! ```
//!
//! All reactions are evaluated at once: `a` is a (species x 7) matrix of coefficients,
//! `nu` a (species x reactions) matrix, the result is a vector with one entry per reaction.
//! Backward coefficients are `kb = kf / Ke` for reversible reactions and `0` otherwise.
use crate::Kinetics::errors::{KinError, prohibited};
use crate::Thermodynamics::DBhandlers::NASAdata::{Cp_over_R, H_over_RT, S_over_R};
use crate::Thermodynamics::DBhandlers::thermo_api::NASA7;
use nalgebra::{DMatrix, DVector};

/// reference pressure, Pa
pub const P0: f64 = 1.0e5;
/// universal gas constant, J/(mol K)
pub const R_GAS: f64 = 8.3144598;

#[derive(Debug, Clone, PartialEq)]
pub struct BackwardLaw {
    pub p0: f64,
    pub R: f64,
}

impl Default for BackwardLaw {
    fn default() -> Self {
        Self::new()
    }
}

impl BackwardLaw {
    pub fn new() -> Self {
        Self { p0: P0, R: R_GAS }
    }
    pub fn with_constants(p0: f64, R: f64) -> Self {
        Self { p0, R }
    }
    /// applies a scalar NASA-7 fit to every species (row of `a`)
    fn per_species(a: &DMatrix<f64>, T: f64, fit: fn(&NASA7, f64) -> f64) -> DVector<f64> {
        DVector::from_iterator(
            a.nrows(),
            a.row_iter().map(|r| {
                let coeffs: NASA7 = std::array::from_fn(|k| r[k]);
                fit(&coeffs, T)
            }),
        )
    }
    /// Cp/R of each species (row of `a`)
    pub fn Cp_over_R(&self, a: &DMatrix<f64>, T: f64) -> DVector<f64> {
        Self::per_species(a, T, Cp_over_R)
    }
    /// H/RT of each species
    pub fn H_over_RT(&self, a: &DMatrix<f64>, T: f64) -> DVector<f64> {
        Self::per_species(a, T, H_over_RT)
    }
    /// S/R of each species
    pub fn S_over_R(&self, a: &DMatrix<f64>, T: f64) -> DVector<f64> {
        Self::per_species(a, T, S_over_R)
    }

    fn check_input(&self, a: &DMatrix<f64>, nu: &DMatrix<f64>, T: f64) -> Result<(), KinError> {
        if !(T > 0.0) {
            return Err(KinError::InvalidParameter(prohibited(
                "T",
                T,
                "non-positive temperature",
            )));
        }
        if a.ncols() != 7 {
            return Err(KinError::InvalidInput(format!(
                "NASA coefficient matrix must have 7 columns, got {}",
                a.ncols()
            )));
        }
        if a.nrows() != nu.nrows() {
            return Err(KinError::InvalidInput(format!(
                "coefficient matrix has {} species rows, stoichiometry has {}",
                a.nrows(),
                nu.nrows()
            )));
        }
        Ok(())
    }

    /// equilibrium constant of every reaction (column of `nu`)
    pub fn equilibrium_coeffs(
        &self,
        a: &DMatrix<f64>,
        nu: &DMatrix<f64>,
        T: f64,
    ) -> Result<DVector<f64>, KinError> {
        self.check_input(a, nu, T)?;
        let delta_H_over_RT = nu.transpose() * self.H_over_RT(a, T);
        let delta_S_over_R = nu.transpose() * self.S_over_R(a, T);
        let delta_G_over_RT = delta_S_over_R - delta_H_over_RT;
        let fact = self.p0 / self.R / T;
        let Ke = DVector::from_iterator(
            nu.ncols(),
            nu.column_iter()
                .zip(delta_G_over_RT.iter())
                .map(|(nu_j, dG)| fact.powf(nu_j.sum()) * dG.exp()),
        );
        Ok(Ke)
    }

    /// `kb = kf / Ke` for reversible reactions, `0` for the rest
    pub fn backward_coeffs(
        &self,
        kf: &DVector<f64>,
        Ke: &DVector<f64>,
        reversible: &[bool],
    ) -> Result<DVector<f64>, KinError> {
        if kf.len() != Ke.len() || kf.len() != reversible.len() {
            return Err(KinError::InvalidInput(format!(
                "kf ({}), Ke ({}) and reversibility flags ({}) differ in length",
                kf.len(),
                Ke.len(),
                reversible.len()
            )));
        }
        Ok(DVector::from_iterator(
            kf.len(),
            kf.iter()
                .zip(Ke.iter())
                .zip(reversible)
                .map(|((kf, ke), &rev)| if rev { kf / ke } else { 0.0 }),
        ))
    }
}
