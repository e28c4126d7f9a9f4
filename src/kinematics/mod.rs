//! Relativistic kinematics shared by selection and aggregation.

pub mod four_momentum;

pub use four_momentum::{pair_mass, transverse_mass, FourMomentum};
