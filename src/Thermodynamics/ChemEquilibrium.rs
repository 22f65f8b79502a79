pub mod BackwardLaw;
