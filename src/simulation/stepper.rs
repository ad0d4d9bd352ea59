use std::collections::BTreeSet;

use log::debug;
use serde::Serialize;

use super::{
    detect_entities, Contact, Diagnostics, Entity, EntityId, EntityKind, GeometryError, Pose,
    Scene, Side, Vector2,
};

mod defaults {
    pub const MAX_SUBSTEPS: usize = 64;
}

/// One resolved collision. Lives for the frame it happened in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Collision {
    /// Normalized time within the sub-step that found it.
    pub time: f64,
    /// Absolute simulation time of the hit.
    pub at: f64,
    pub point: Vector2,
    pub edge_start: Vector2,
    pub edge_end: Vector2,
    /// `objects.0` is the later entity in scene order.
    pub objects: (EntityId, EntityId),
    pub kinds: (EntityKind, EntityKind),
    pub edge_owner: Side,
    /// Position velocities of both objects at the moment of impact.
    pub velocities: (Vector2, Vector2),
}

impl Collision {
    fn new(contact: Contact, at: f64, a: &Entity, b: &Entity) -> Self {
        Self {
            time: contact.time,
            at,
            point: contact.point,
            edge_start: contact.edge_start,
            edge_end: contact.edge_end,
            objects: (a.id, b.id),
            kinds: (a.kind, b.kind),
            edge_owner: contact.edge_owner,
            velocities: (a.pose.position.velocity, b.pose.position.velocity),
        }
    }

    /// The participant of `kind` and its partner, if one of them is that kind.
    pub fn split(&self, kind: EntityKind) -> Option<(EntityId, EntityId)> {
        if self.kinds.0 == kind {
            Some(self.objects)
        } else if self.kinds.1 == kind {
            Some((self.objects.1, self.objects.0))
        } else {
            None
        }
    }

    pub fn velocity_of(&self, id: EntityId) -> Option<Vector2> {
        if self.objects.0 == id {
            Some(self.velocities.0)
        } else if self.objects.1 == id {
            Some(self.velocities.1)
        } else {
            None
        }
    }

    /// Whether the edge in this contact belongs to `id`.
    pub fn edge_belongs_to(&self, id: EntityId) -> bool {
        match self.edge_owner {
            Side::First => self.objects.0 == id,
            Side::Second => self.objects.1 == id,
        }
    }
}

/// Collision responses, by kind pair.
pub trait CollisionRules {
    /// Whether a response exists for this pair. Kind order is not significant.
    fn handles(&self, a: EntityKind, b: EntityKind) -> bool;

    /// Runs synchronously inside the stepper, right after both objects
    /// have been moved to the collision time.
    fn respond(&mut self, collision: &mut Collision, response: &mut Response<'_>);
}

/// Closure-backed [`CollisionRules`].
pub struct FnRules<P, F> {
    handles: P,
    respond: F,
}

pub fn rules_from_fn<P, F>(handles: P, respond: F) -> FnRules<P, F>
where
    P: Fn(EntityKind, EntityKind) -> bool,
    F: FnMut(&mut Collision, &mut Response<'_>),
{
    FnRules { handles, respond }
}

impl<P, F> CollisionRules for FnRules<P, F>
where
    P: Fn(EntityKind, EntityKind) -> bool,
    F: FnMut(&mut Collision, &mut Response<'_>),
{
    fn handles(&self, a: EntityKind, b: EntityKind) -> bool {
        (self.handles)(a, b)
    }

    fn respond(&mut self, collision: &mut Collision, response: &mut Response<'_>) {
        (self.respond)(collision, response)
    }
}

/// What a collision response may do to the scene.
///
/// Kinematic changes apply at once. Spawns and despawns are queued and
/// applied when the response returns, before the next detection pass.
pub struct Response<'a> {
    scene: &'a mut Scene,
    now: f64,
    spawned: Vec<Entity>,
    despawned: Vec<EntityId>,
}

impl<'a> Response<'a> {
    fn new(scene: &'a mut Scene, now: f64) -> Self {
        Self {
            scene,
            now,
            spawned: Vec::new(),
            despawned: Vec::new(),
        }
    }

    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.scene.get(id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.scene.get_mut(id)
    }

    pub fn spawn(&mut self, mut entity: Entity) -> EntityId {
        let id = self.scene.allocate_id();
        entity.id = id;
        self.spawned.push(entity);
        id
    }

    pub fn despawn(&mut self, id: EntityId) {
        if !self.despawned.contains(&id) {
            self.despawned.push(id);
        }
    }

    fn apply(self) {
        let Self {
            scene,
            spawned,
            despawned,
            ..
        } = self;
        scene.retain(|e| !despawned.contains(&e.id));
        spawned.into_iter().for_each(|e| scene.insert(e));
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FrameReport {
    pub collisions: Vec<Collision>,
    pub budget_exceeded: bool,
    pub expired: usize,
}

/// Advances a scene through a frame, one collision at a time.
pub struct Stepper {
    max_substeps: usize,
}

impl Default for Stepper {
    fn default() -> Self {
        Self {
            max_substeps: defaults::MAX_SUBSTEPS,
        }
    }
}

impl Stepper {
    pub fn with_max_substeps(self, max_substeps: usize) -> Self {
        Self { max_substeps }
    }

    /// Moves every entity from `t0` to `t1`.
    ///
    /// Each pass integrates the whole scene over what is left of the frame
    /// and looks for the earliest collision among pairs that may interact
    /// and have not collided yet this frame. On a hit the scene is advanced
    /// only to the hit time, the response runs, and the pass repeats from
    /// there. Without a hit the tentative step is committed and the frame
    /// ends. Entities expired at `t1` are removed afterwards.
    pub fn step(
        &self,
        scene: &mut Scene,
        t0: f64,
        t1: f64,
        rules: &mut impl CollisionRules,
        diagnostics: &mut Diagnostics,
    ) -> Result<FrameReport, GeometryError> {
        let mut report = FrameReport::default();
        if t1 <= t0 {
            return Ok(report);
        }

        let mut t = t0;
        let mut resolved: BTreeSet<(EntityId, EntityId)> = BTreeSet::new();

        loop {
            let dt = t1 - t;
            let after: Vec<Pose> = scene.iter().map(|e| e.pose.integrated(dt)).collect();

            let Some((i, j, contact)) =
                earliest_collision(scene.entities(), &after, &resolved, &*rules, diagnostics)?
            else {
                commit(scene, after);
                break;
            };

            if report.collisions.len() >= self.max_substeps {
                diagnostics.budget_exceeded(t0, t1, self.max_substeps);
                report.budget_exceeded = true;
                commit(scene, after);
                break;
            }

            let t_hit = t + contact.time * dt;
            let partial: Vec<Pose> = scene
                .iter()
                .zip(&after)
                .map(|(e, after)| e.pose.truncated(after, contact.time, t_hit - t))
                .collect();
            commit(scene, partial);

            let entities = scene.entities();
            let mut collision = Collision::new(contact, t_hit, &entities[i], &entities[j]);
            debug!(
                "{}-{} collision at {t_hit} ({}, {})",
                collision.kinds.0, collision.kinds.1, collision.point.x, collision.point.y
            );
            resolved.insert(pair_key(collision.objects.0, collision.objects.1));

            let mut response = Response::new(scene, t_hit);
            rules.respond(&mut collision, &mut response);
            response.apply();

            report.collisions.push(collision);
            t = t_hit;
        }

        let before = scene.len();
        scene.retain(|e| !e.is_expired(t1));
        report.expired = before - scene.len();

        Ok(report)
    }
}

/// [`Stepper::step`] with default settings.
pub fn step_scene(
    scene: &mut Scene,
    t0: f64,
    t1: f64,
    rules: &mut impl CollisionRules,
    diagnostics: &mut Diagnostics,
) -> Result<FrameReport, GeometryError> {
    Stepper::default().step(scene, t0, t1, rules, diagnostics)
}

/// Pairs are visited with the outer index running down from the last
/// entity and the inner index running down below it; on exact ties the
/// first pair visited keeps the collision.
fn earliest_collision(
    entities: &[Entity],
    after: &[Pose],
    resolved: &BTreeSet<(EntityId, EntityId)>,
    rules: &impl CollisionRules,
    diagnostics: &mut Diagnostics,
) -> Result<Option<(usize, usize, Contact)>, GeometryError> {
    let mut earliest: Option<(usize, usize, Contact)> = None;

    for i in (1..entities.len()).rev() {
        let a = &entities[i];
        for j in (0..i).rev() {
            let b = &entities[j];
            if !a.interacts_with(b) || resolved.contains(&pair_key(a.id, b.id)) {
                continue;
            }
            if !rules.handles(a.kind, b.kind) {
                diagnostics.unhandled_pair(a.kind, b.kind);
                continue;
            }
            let Some(contact) = detect_entities(a, &a.pose, &after[i], b, &b.pose, &after[j])?
            else {
                continue;
            };
            if earliest.is_some_and(|(_, _, c)| c.time <= contact.time) {
                continue;
            }
            earliest = Some((i, j, contact));
        }
    }

    Ok(earliest)
}

fn commit(scene: &mut Scene, poses: Vec<Pose>) {
    scene
        .iter_mut()
        .zip(poses)
        .for_each(|(entity, pose)| entity.pose = pose);
}

fn pair_key(a: EntityId, b: EntityId) -> (EntityId, EntityId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
