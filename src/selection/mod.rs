//! Object selection: thresholds, selected objects and normalized events.

pub mod event;
pub mod objects;
pub mod profile;

pub use event::NormalizedEvent;
pub use objects::{sorted_by_pt, Flavor, Jet, Lepton, PhysicsObject};
pub use profile::SelectionProfile;
