//! # hs-core
//!
//! Core types for hicspec: particles and events, single-particle relativistic
//! kinematics, nuclide masses and reaction-level constants.
//!
//! ## Example
//!
//! ```
//! use hs_core::{Frame, MassTable, Particle, ReactionSystem};
//!
//! let masses = MassTable::builtin();
//! let reaction: ReactionSystem = "Ca48Ni64E140".parse().unwrap();
//! let k = reaction.kinematics(&masses).unwrap();
//!
//! let p = Particle::new(0, 1, [50.0, 0.0, 100.0], Frame::Cms, 938.272, k.betacms).unwrap();
//! assert!(p.lab().pz > p.cms().pz);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod kinematics;
pub mod masses;
pub mod reaction;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use masses::MassTable;
pub use reaction::{Nuclide, ReactionKinematics, ReactionSystem};
pub use traits::{Acceptance, EventSource, NuclideMasses};
pub use types::{Event, Frame, FrameKinematics, MomentumUnits, Particle};

/// hicspec version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
