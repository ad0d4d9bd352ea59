use std::f64::consts::{PI, TAU};
use std::fmt::Display;

use log::info;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::Serialize;

use super::physics::defaults::GRAVITY;
use super::{Collision, CollisionRules, Entity, EntityId, EntityKind, Kinematic, Response, Vector2};

mod defaults {
    pub const MAX_TOUCHDOWN_SPEED: f64 = 45.;
    pub const MAX_TOUCHDOWN_GRADIENT: f64 = 0.18;
    // a twentieth of a turn either way
    pub const MAX_TOUCHDOWN_TILT: f64 = 0.05 * std::f64::consts::TAU;

    pub const EXPLOSION_DURATION: f64 = 5.;
    pub const EXPLOSION_DRAG: f64 = 0.06;
    pub const EXPLOSION_ACCELERATION: (f64, f64) = (0., 180.);
    pub const VELOCITY_CARRY: f64 = 0.4;

    pub const DEBRIS_COUNT: usize = 6;
    pub const DEBRIS_SPEED: f64 = 60.;

    pub const VAPOUR_SETTLE_VELOCITY: (f64, f64) = (0., -1.);
    pub const VAPOUR_SETTLE_ACCELERATION: (f64, f64) = (0., 160.);

    pub const SEED: u64 = 0x6d61_7273;
}

/// Outcome of a craft touching the ground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Landing {
    Correct,
    TooFast,
    Toppled,
    Steep,
    /// The ground poked through the hull instead of meeting the feet.
    Punctured,
}

impl Landing {
    pub fn is_crash(self) -> bool {
        self != Landing::Correct
    }
}

impl Display for Landing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LandingLimits {
    pub max_touchdown_speed: f64,
    pub max_touchdown_gradient: f64,
    /// Radians away from upright.
    pub max_touchdown_tilt: f64,
}

impl Default for LandingLimits {
    fn default() -> Self {
        Self {
            max_touchdown_speed: defaults::MAX_TOUCHDOWN_SPEED,
            max_touchdown_gradient: defaults::MAX_TOUCHDOWN_GRADIENT,
            max_touchdown_tilt: defaults::MAX_TOUCHDOWN_TILT,
        }
    }
}

impl LandingLimits {
    pub fn with_max_touchdown_speed(self, max_touchdown_speed: f64) -> Self {
        Self {
            max_touchdown_speed,
            ..self
        }
    }

    pub fn with_max_touchdown_gradient(self, max_touchdown_gradient: f64) -> Self {
        Self {
            max_touchdown_gradient,
            ..self
        }
    }

    pub fn with_max_touchdown_tilt(self, max_touchdown_tilt: f64) -> Self {
        Self {
            max_touchdown_tilt,
            ..self
        }
    }

    /// Judges a craft/terrain contact. The checks run in order, so a
    /// fast landing on a slope is `TooFast`, not `Steep`.
    pub fn classify(&self, collision: &Collision, craft: EntityId, craft_angle: f64) -> Landing {
        if collision.edge_belongs_to(craft) {
            return Landing::Punctured;
        }
        let speed = collision.velocity_of(craft).unwrap_or(Vector2::ZERO).length();
        if speed > self.max_touchdown_speed {
            return Landing::TooFast;
        }
        if tilt(craft_angle) > self.max_touchdown_tilt {
            return Landing::Toppled;
        }
        if collision.edge_start.gradient(collision.edge_end).abs() > self.max_touchdown_gradient {
            return Landing::Steep;
        }
        Landing::Correct
    }
}

/// Distance from upright, in `[0, PI]`.
fn tilt(angle: f64) -> f64 {
    let turned = angle.rem_euclid(TAU);
    if turned > PI {
        TAU - turned
    } else {
        turned
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Touchdown {
    pub craft: EntityId,
    pub landing: Landing,
    pub at: f64,
}

/// Landing game responses: craft touchdowns, vapour settling on the
/// ground, meteors and debris.
pub struct LandingRules {
    limits: LandingLimits,
    rng: StdRng,
    touchdowns: Vec<Touchdown>,
}

impl Default for LandingRules {
    fn default() -> Self {
        Self::new(defaults::SEED)
    }
}

impl LandingRules {
    pub fn new(seed: u64) -> Self {
        Self {
            limits: LandingLimits::default(),
            rng: StdRng::seed_from_u64(seed),
            touchdowns: Vec::new(),
        }
    }

    pub fn with_limits(self, limits: LandingLimits) -> Self {
        Self { limits, ..self }
    }

    pub fn touchdowns(&self) -> &[Touchdown] {
        &self.touchdowns
    }

    /// Kinds each kind collides with when a scene does not say otherwise.
    pub fn targets(kind: EntityKind) -> &'static [EntityKind] {
        match kind {
            EntityKind::Craft => &[EntityKind::Terrain],
            EntityKind::Vapour | EntityKind::Debris => &[EntityKind::Terrain],
            EntityKind::Meteor => &[EntityKind::Terrain, EntityKind::Craft],
            EntityKind::Terrain | EntityKind::Explosion => &[],
        }
    }

    fn touchdown(&mut self, collision: &Collision, response: &mut Response<'_>) {
        let Some((craft, _)) = collision.split(EntityKind::Craft) else {
            return;
        };
        let Some(angle) = response.get(craft).map(|e| e.pose.angle()) else {
            return;
        };

        let landing = self.limits.classify(collision, craft, angle);
        info!("Craft {} touched down at {}: {landing}", craft.0, collision.at);
        self.touchdowns.push(Touchdown {
            craft,
            landing,
            at: collision.at,
        });

        if landing.is_crash() {
            self.explode(craft, collision, response);
        } else if let Some(entity) = response.get_mut(craft) {
            entity.pose.position.stop();
            if let Some(rotation) = entity.pose.rotation.as_mut() {
                rotation.velocity = 0.;
                rotation.acceleration = 0.;
            }
        }
    }

    fn settle(&self, collision: &Collision, kind: EntityKind, response: &mut Response<'_>) {
        let Some((id, _)) = collision.split(kind) else {
            return;
        };
        let Some(entity) = response.get_mut(id) else {
            return;
        };
        match kind {
            EntityKind::Vapour => {
                entity.pose.position = Kinematic::at(collision.point)
                    .with_velocity(defaults::VAPOUR_SETTLE_VELOCITY.into())
                    .with_acceleration(defaults::VAPOUR_SETTLE_ACCELERATION.into())
                    .with_drag(entity.pose.position.drag);
            }
            _ => entity.pose.position.stop(),
        }
    }

    /// Replaces `victim` with an explosion and a spray of debris.
    fn explode(&mut self, victim: EntityId, collision: &Collision, response: &mut Response<'_>) {
        let carried = collision.velocity_of(victim).unwrap_or(Vector2::ZERO) * defaults::VELOCITY_CARRY;
        let expires_at = response.now() + defaults::EXPLOSION_DURATION;
        response.despawn(victim);

        response.spawn(
            Entity::point(EntityKind::Explosion, collision.point)
                .with_position(
                    Kinematic::at(collision.point)
                        .with_velocity(carried)
                        .with_acceleration(defaults::EXPLOSION_ACCELERATION.into())
                        .with_drag(defaults::EXPLOSION_DRAG),
                )
                .with_expiry(expires_at),
        );

        for _ in 0..defaults::DEBRIS_COUNT {
            let direction = self.rng.gen_range(0. ..PI);
            let speed = self.rng.gen_range(0.5..1.) * defaults::DEBRIS_SPEED;
            let velocity = carried + Vector2::new(speed, 0.).rotate(direction);
            // lifted off the contact so the first sub-step does not re-hit it
            let start = collision.point + Vector2::new(0., 1.);
            response.spawn(
                Entity::point(EntityKind::Debris, start)
                    .with_position(
                        Kinematic::at(start)
                            .with_velocity(velocity)
                            .with_acceleration(Vector2::new(0., -GRAVITY)),
                    )
                    .with_collides_with(Self::targets(EntityKind::Debris).iter().copied())
                    .with_expiry(expires_at),
            );
        }
    }
}

impl CollisionRules for LandingRules {
    fn handles(&self, a: EntityKind, b: EntityKind) -> bool {
        use EntityKind::*;
        matches!(
            (a, b),
            (Craft, Terrain)
                | (Terrain, Craft)
                | (Vapour, Terrain)
                | (Terrain, Vapour)
                | (Debris, Terrain)
                | (Terrain, Debris)
                | (Meteor, Terrain)
                | (Terrain, Meteor)
                | (Meteor, Craft)
                | (Craft, Meteor)
        )
    }

    fn respond(&mut self, collision: &mut Collision, response: &mut Response<'_>) {
        use EntityKind::*;
        let (a, b) = collision.kinds;
        match (a, b) {
            (Craft, Terrain) | (Terrain, Craft) => self.touchdown(collision, response),
            (Vapour, Terrain) | (Terrain, Vapour) => self.settle(collision, Vapour, response),
            (Debris, Terrain) | (Terrain, Debris) => self.settle(collision, Debris, response),
            (Meteor, _) | (_, Meteor) => {
                if let Some((meteor, _)) = collision.split(Meteor) {
                    self.explode(meteor, collision, response);
                }
            }
            _ => {}
        }
    }
}
