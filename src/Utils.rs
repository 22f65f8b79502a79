/// mechanism files: SPECIES, REACTIONS and THERMO sections
pub mod load_from_file;
