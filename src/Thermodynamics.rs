/// equilibrium constants and backward rate coefficients
pub mod ChemEquilibrium;
#[allow(non_snake_case)]
/// NASA-7 thermodynamic data and the coefficient lookup interface
pub mod DBhandlers;
