//! # drape - interactive mass-spring cloth
//!
//! A rectangular sheet of mass points joined by structural, shear and bend
//! springs, integrated with explicit Euler at a fixed timestep and kept from
//! over-stretching by Provot's dynamic inverse.
//!
//! ## Quick Start
//!
//! ```
//! use drape::prelude::*;
//!
//! let config = ClothConfig::new().with_grid(10, 10);
//! let mut cloth = drape::network::build(&config).unwrap();
//! let mut scheduler = FixedTimestep::new(config.time_step);
//!
//! for _ in 0..100 {
//!     scheduler.accumulate(config.time_step);
//!     scheduler.tick(&mut cloth);
//! }
//! assert!(cloth.positions().iter().all(|p| p.y >= 0.0));
//! ```
//!
//! ## Core Concepts
//!
//! ### The step
//!
//! [`ClothState::step`] runs three passes in order:
//!
//! 1. [`forces::accumulate`]: gravity, velocity damping, and spring forces
//!    for every free point. Pinned points get zero force.
//! 2. [`integrator::integrate`]: forward Euler. Positions move with the
//!    velocity from before the update, then everything is clamped to the
//!    floor at `y = 0`.
//! 3. [`provot::correct`]: one ordered pass over the springs that removes
//!    relative velocity along any spring longer than its rest length.
//!
//! ### Pins
//!
//! A [`PinSet`] marks anchored points. Pinned points never integrate and
//! never receive forces, but still pass through the floor clamp.
//!
//! ### Scheduling
//!
//! [`FixedTimestep`] decouples physics from the display rate. By default it
//! runs at most one step per presentation tick.
//!
//! ### Interaction
//!
//! [`Interaction`] turns mouse input into point selection, point dragging,
//! or camera orbit and zoom. Picking takes the first point within the pick
//! radius of the unprojected cursor.
//!
//! ## Running the viewer
//!
//! ```ignore
//! drape::run(ClothConfig::new(), ViewerOptions::default())?;
//! ```

pub mod camera;
pub mod cloth;
pub mod config;
pub mod device;
pub mod error;
pub mod forces;
mod gpu;
pub mod input;
pub mod integrator;
pub mod interaction;
pub mod network;
pub mod pins;
pub mod provot;
pub mod scheduler;
pub mod spring;
pub mod time;
mod window;

pub use camera::Camera;
pub use cloth::{ClothState, PointParams};
pub use config::{ClothConfig, PinPolicy};
pub use device::{DeviceLoop, DeviceSample, HapticDevice, IdleDevice};
pub use error::{ConfigError, DeviceError, GpuError, SimulationError};
pub use glam::{Vec2, Vec3};
pub use interaction::Interaction;
pub use pins::PinSet;
pub use scheduler::FixedTimestep;
pub use spring::{Spring, SpringConstants, SpringKind};
pub use window::{run, ViewerOptions};

/// Convenient re-exports.
///
/// ```
/// use drape::prelude::*;
/// ```
pub mod prelude {
    pub use crate::camera::Camera;
    pub use crate::cloth::ClothState;
    pub use crate::config::{ClothConfig, PinPolicy};
    pub use crate::interaction::Interaction;
    pub use crate::scheduler::FixedTimestep;
    pub use crate::window::{run, ViewerOptions};
    pub use glam::{Vec2, Vec3};
}
