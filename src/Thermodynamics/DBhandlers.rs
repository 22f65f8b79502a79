pub mod NASAdata;
pub mod thermo_api;
