use std::ops::{Add, Mul, Sub};

use super::Vector2;

pub(crate) mod defaults {
    // 3.7 m/s^2 at 5 px per metre, sped up four times for play
    pub const GRAVITY: f64 = 74.;
}

/// Anything the integrator can advance: a position vector or a scalar angle.
pub trait Integrable: Copy + Add<Output = Self> + Sub<Output = Self> + Mul<f64, Output = Self> {}

impl<T> Integrable for T where T: Copy + Add<Output = T> + Sub<Output = T> + Mul<f64, Output = T> {}

/// One integrable degree of freedom.
///
/// `drag` is removed from the velocity once per integration step, not per
/// unit of time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Kinematic<T> {
    pub value: T,
    pub velocity: T,
    pub acceleration: T,
    pub drag: f64,
}

impl Default for Kinematic<Vector2> {
    fn default() -> Self {
        Self::at(Vector2::ZERO)
    }
}

impl Default for Kinematic<f64> {
    fn default() -> Self {
        Self::at(0.)
    }
}

impl<T: Integrable> Kinematic<T> {
    pub fn at(value: T) -> Self {
        let zero = value - value;
        Self {
            value,
            velocity: zero,
            acceleration: zero,
            drag: 0.,
        }
    }

    pub fn with_velocity(self, velocity: T) -> Self {
        Self { velocity, ..self }
    }

    pub fn with_acceleration(self, acceleration: T) -> Self {
        Self {
            acceleration,
            ..self
        }
    }

    pub fn with_drag(self, drag: f64) -> Self {
        debug_assert!(drag >= 0.);
        Self { drag, ..self }
    }

    pub fn integrate(&mut self, dt: f64) {
        self.velocity = self.velocity + self.acceleration * dt;
        self.velocity = self.velocity - self.velocity * self.drag;
        self.value = self.value + self.velocity * dt;
    }

    pub fn integrated(&self, dt: f64) -> Self {
        let mut next = *self;
        next.integrate(dt);
        next
    }
}

impl Kinematic<Vector2> {
    pub fn stop(&mut self) {
        self.velocity = Vector2::ZERO;
        self.acceleration = Vector2::ZERO;
    }
}

#[cfg(test)]
mod physics_tests {
    use super::*;

    fn assert_feq(left: f64, right: f64) {
        if (left - right).abs() > 1e-9 {
            panic!("Float equal assertion failed, {left} != {right}");
        }
    }

    fn assert_close(left: f64, right: f64, range: f64) {
        if (left - right).abs() > range {
            panic!("Assertion failed {left} not close to {right} within a range {range}");
        }
    }

    #[test]
    fn constant_velocity() {
        let state = Kinematic::at(Vector2::new(500., 500.))
            .with_velocity(Vector2::new(10., -20.))
            .integrated(0.5);
        assert_eq!(state.value, Vector2::new(505., 490.));
        assert_eq!(state.velocity, Vector2::new(10., -20.));
    }

    #[test]
    fn free_fall() {
        let mut state = Kinematic::at(Vector2::new(0., 500.))
            .with_acceleration(Vector2::new(0., -defaults::GRAVITY));
        state.integrate(1.);
        assert_feq(state.value.x, 0.);
        assert_feq(state.velocity.y, -74.);
        assert_feq(state.value.y, 426.);
    }

    #[test]
    fn drag_applies_per_step() {
        let state = Kinematic::at(0.).with_velocity(10.).with_drag(0.1);
        let once = state.integrated(2.);
        assert_feq(once.velocity, 9.);
        assert_feq(once.value, 18.);

        let twice = state.integrated(1.).integrated(1.);
        assert_feq(twice.velocity, 8.1);
        assert_close(twice.value, once.value, 1.);
    }

    #[test]
    fn scalar_rotation() {
        let rotation = Kinematic::at(0.25).with_velocity(0.5).integrated(0.5);
        assert_feq(rotation.value, 0.5);
    }

    #[test]
    fn stop_clears_motion() {
        let mut state = Kinematic::at(Vector2::new(1., 1.))
            .with_velocity(Vector2::new(3., 4.))
            .with_acceleration(Vector2::new(0., -1.));
        state.stop();
        assert_eq!(state.integrated(1.).value, Vector2::new(1., 1.));
    }
}
