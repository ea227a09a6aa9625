//! Headless demo: walk a body around a wall

use std::time::Duration;

use tilewalk::prelude::*;

const TICK: Duration = Duration::from_millis(33);
const MAX_TICKS: usize = 600;

fn main() {
    env_logger::init();

    let config = WorldConfig::default().with_physics_scale(0.5);
    let mut world = World::new(config);

    // A wall between the walker and its goal
    for y in -3..=3 {
        world.spawn_obstacle(IVec2::new(4, y));
    }

    let walker = world.spawn_body(
        &PhysicsBodyDescription::dynamic(Rect::new(-0.4, -0.4, 0.8, 0.8)),
        Vec2::ZERO,
    );
    world.update(TICK);

    let destination = Vec2::new(8.0, 0.0);
    let route = match world.plan_route(walker, destination) {
        Ok(route) => route,
        Err(WorldError::Route(RouteError::Incomplete { partial })) => {
            log::warn!("Destination unreachable, following partial route");
            partial
        }
        Err(err) => {
            log::error!("Failed to plan route: {err}");
            return;
        }
    };
    log::info!(
        "Planned route with {} waypoints: {:?}",
        route.len(),
        route.waypoints().collect::<Vec<_>>()
    );

    let driver = VelocityLimitSteeringDriver::from_config(&world.config().navigation);
    if let Err(err) = world.attach_steering(walker, driver) {
        log::error!("Failed to attach steering: {err}");
        return;
    }
    if let Err(err) = world.follow_route(walker, route) {
        log::error!("Failed to follow route: {err}");
        return;
    }

    for tick in 0..MAX_TICKS {
        world.update(TICK);

        let Some(location) = world.location(walker) else {
            break;
        };
        if tick % 30 == 0 {
            log::info!("Tick {tick}: walker at {location}");
        }
        if location.distance(destination) < world.config().navigation.waypoint_tolerance {
            log::info!("Arrived at {destination} after {tick} ticks");
            return;
        }
    }

    log::info!("Stopped after {MAX_TICKS} ticks");
}
