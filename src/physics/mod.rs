//! Physics simulation module
//!
//! Built on top of rapier2d, reached through the [`PhysicsWorld`] trait

mod body;
mod contact;
mod rapier;
mod scaled;

pub use body::{
    BodyHandle, BodyObserver, PhysicsBodyDescription, PhysicsBodyKind, PhysicsBodyShape,
    PhysicsWorld, RayCastHit,
};
pub use contact::{ContactEvent, ContactQueue};
pub use rapier::RapierWorld;
pub use scaled::ScaledPhysicsWorld;
