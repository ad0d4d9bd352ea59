use serde::Serialize;

use crate::simulation::*;
use crate::Error;

/// One row of the collision history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub frame: usize,
    pub at: f64,
    pub point: Vector2,
    pub kinds: (EntityKind, EntityKind),
    pub objects: (EntityId, EntityId),
}

/// Every collision since the app started, column by column.
#[derive(Debug, Clone, Default)]
pub struct CollisionHistory {
    frame: Vec<usize>,
    at: Vec<f64>,
    point: Vec<Vector2>,
    kinds: Vec<(EntityKind, EntityKind)>,
    objects: Vec<(EntityId, EntityId)>,
}

impl CollisionHistory {
    pub fn append_frame(&mut self, frame: usize, collisions: &[Collision]) {
        for collision in collisions {
            self.frame.push(frame);
            self.at.push(collision.at);
            self.point.push(collision.point);
            self.kinds.push(collision.kinds);
            self.objects.push(collision.objects);
        }
    }

    pub fn len(&self) -> usize {
        self.frame.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.is_empty()
    }

    pub fn iter_history(&self) -> impl Iterator<Item = HistoryEntry> + '_ {
        self.frame
            .iter()
            .zip(&self.at)
            .zip(&self.point)
            .zip(&self.kinds)
            .zip(&self.objects)
            .map(|((((frame, at), point), kinds), objects)| HistoryEntry {
                frame: *frame,
                at: *at,
                point: *point,
                kinds: *kinds,
                objects: *objects,
            })
    }

    pub fn pretty_to_string(&self) -> String {
        self.iter_history().fold(
            format!(
                "{:8}{:10}{:10}{:10}{:20}",
                "FRAME", "TIME", "X", "Y", "PAIR"
            ),
            |out,
             HistoryEntry {
                 frame,
                 at,
                 point,
                 kinds: (a, b),
                 ..
             }| {
                out + &format!(
                    "\n{frame:<8}{at:<10.4}{:<10.2}{:<10.2}{}",
                    point.x,
                    point.y,
                    format!("{a}-{b}")
                )
            },
        )
    }
}

/// A scene plus the clock that drives it frame by frame.
pub struct App {
    scene: Scene,
    rules: LandingRules,
    stepper: Stepper,
    diagnostics: Diagnostics,
    clock: f64,
    frame: usize,
    last_frame: FrameReport,
    history: CollisionHistory,
}

impl App {
    pub fn new(scene: Scene, rules: LandingRules) -> Self {
        Self {
            scene,
            rules,
            stepper: Stepper::default(),
            diagnostics: Diagnostics::new(),
            clock: 0.,
            frame: 0,
            last_frame: FrameReport::default(),
            history: CollisionHistory::default(),
        }
    }

    pub fn with_stepper(self, stepper: Stepper) -> Self {
        Self { stepper, ..self }
    }

    /// Advances the scene by `dt`. The previous frame's collision log is
    /// replaced by this frame's.
    pub fn run_frame(&mut self, dt: f64) -> Result<&FrameReport, Error> {
        let t0 = self.clock;
        let t1 = t0 + dt;
        self.last_frame = self
            .stepper
            .step(&mut self.scene, t0, t1, &mut self.rules, &mut self.diagnostics)?;
        self.clock = t1;
        self.frame += 1;
        self.history
            .append_frame(self.frame, &self.last_frame.collisions);
        Ok(&self.last_frame)
    }

    pub fn run(&mut self, frames: usize, dt: f64) -> Result<(), Error> {
        for _ in 0..frames {
            self.run_frame(dt)?;
        }
        Ok(())
    }

    pub fn get_scene(&self) -> &Scene {
        &self.scene
    }

    pub fn get_clock(&self) -> f64 {
        self.clock
    }

    pub fn get_frame_id(&self) -> usize {
        self.frame
    }

    pub fn get_last_frame(&self) -> &FrameReport {
        &self.last_frame
    }

    pub fn get_history(&self) -> &CollisionHistory {
        &self.history
    }

    pub fn get_touchdowns(&self) -> &[Touchdown] {
        self.rules.touchdowns()
    }

    pub fn get_diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }
}
