//! Components stored on world entities

use crate::ai::SteeringDriver;
use crate::physics::BodyHandle;

/// Links an entity to its body in the physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PhysicsBody(pub BodyHandle);

/// Steering driver ticked by `World::update`
pub struct Steering(pub Box<dyn SteeringDriver>);

impl Steering {
    /// Box a driver into a component
    pub fn new(driver: impl SteeringDriver + 'static) -> Self {
        Self(Box::new(driver))
    }

    /// The driver
    pub fn driver(&self) -> &dyn SteeringDriver {
        self.0.as_ref()
    }

    /// The driver, mutably
    pub fn driver_mut(&mut self) -> &mut dyn SteeringDriver {
        self.0.as_mut()
    }
}
