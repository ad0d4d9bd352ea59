use std::collections::BTreeSet;
use std::fmt::Display;

use serde::Serialize;

use super::{Kinematic, Shape, Terrain, Vector2};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum EntityKind {
    Craft,
    Terrain,
    Vapour,
    Explosion,
    Meteor,
    Debris,
}

impl EntityKind {
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Craft,
        EntityKind::Terrain,
        EntityKind::Vapour,
        EntityKind::Explosion,
        EntityKind::Meteor,
        EntityKind::Debris,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EntityKind::Craft => "craft",
            EntityKind::Terrain => "terrain",
            EntityKind::Vapour => "vapour",
            EntityKind::Explosion => "explosion",
            EntityKind::Meteor => "meteor",
            EntityKind::Debris => "debris",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name))
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Stable handle into a [`Scene`]. Never reused within one scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EntityId(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub enum Outline {
    /// Local-space outline, rotated by the rotation state then moved to the position.
    Polygon(Shape),
    /// A single vertex at the position.
    Point,
    /// World-space polyline that never moves.
    Terrain(Terrain),
}

/// Kinematic state of an entity, the part the integrator advances.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    pub position: Kinematic<Vector2>,
    pub rotation: Option<Kinematic<f64>>,
}

impl Pose {
    pub fn integrated(&self, dt: f64) -> Pose {
        Pose {
            position: self.position.integrated(dt),
            rotation: self.rotation.map(|r| r.integrated(dt)),
        }
    }

    /// Pose at normalized `time` on the straight sweep towards `after`,
    /// the path detection tested. Velocities are integrated over `dt`.
    pub fn truncated(&self, after: &Pose, time: f64, dt: f64) -> Pose {
        let mut pose = self.integrated(dt);
        pose.position.value = self.position.value.lerp(after.position.value, time);
        if let (Some(rotation), Some(before), Some(after)) =
            (pose.rotation.as_mut(), self.rotation, after.rotation)
        {
            rotation.value = before.value + (after.value - before.value) * time;
        }
        pose
    }

    pub fn angle(&self) -> f64 {
        self.rotation.map_or(0., |r| r.value)
    }

    /// Same place and orientation, velocities aside.
    pub fn coincides(&self, other: &Pose) -> bool {
        self.position.value.equal(other.position.value) && self.angle() == other.angle()
    }
}

#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub pose: Pose,
    pub outline: Outline,
    pub collides_with: BTreeSet<EntityKind>,
    pub expires_at: Option<f64>,
}

impl Entity {
    /// The id is assigned when the entity is spawned into a scene.
    pub fn new(kind: EntityKind, outline: Outline) -> Self {
        Self {
            id: EntityId(0),
            kind,
            pose: Pose::default(),
            outline,
            collides_with: BTreeSet::new(),
            expires_at: None,
        }
    }

    pub fn point(kind: EntityKind, position: Vector2) -> Self {
        Self::new(kind, Outline::Point).with_position(Kinematic::at(position))
    }

    pub fn polygon(kind: EntityKind, shape: Shape, position: Vector2) -> Self {
        Self::new(kind, Outline::Polygon(shape))
            .with_position(Kinematic::at(position))
            .with_rotation(Kinematic::at(0.))
    }

    pub fn terrain(terrain: Terrain) -> Self {
        Self::new(EntityKind::Terrain, Outline::Terrain(terrain))
    }

    pub fn with_position(self, position: Kinematic<Vector2>) -> Self {
        Self {
            pose: Pose {
                position,
                ..self.pose
            },
            ..self
        }
    }

    pub fn with_rotation(self, rotation: Kinematic<f64>) -> Self {
        Self {
            pose: Pose {
                rotation: Some(rotation),
                ..self.pose
            },
            ..self
        }
    }

    pub fn with_collides_with(self, kinds: impl IntoIterator<Item = EntityKind>) -> Self {
        Self {
            collides_with: kinds.into_iter().collect(),
            ..self
        }
    }

    pub fn with_expiry(self, expires_at: f64) -> Self {
        Self {
            expires_at: Some(expires_at),
            ..self
        }
    }

    /// Either side listing the other's kind is enough.
    pub fn interacts_with(&self, other: &Entity) -> bool {
        self.collides_with.contains(&other.kind) || other.collides_with.contains(&self.kind)
    }

    pub fn is_static(&self) -> bool {
        matches!(self.outline, Outline::Terrain(_))
    }

    pub fn is_expired(&self, now: f64) -> bool {
        self.expires_at.is_some_and(|t| t <= now)
    }

    /// World-space outline at `pose`. Terrain has no single outline, it is
    /// queried per region instead.
    pub fn world_shape(&self, pose: &Pose) -> Option<Shape> {
        match &self.outline {
            Outline::Polygon(shape) => Some(shape.placed(pose.position.value, pose.angle())),
            Outline::Point => Some(Shape::point(pose.position.value)),
            Outline::Terrain(_) => None,
        }
    }
}

/// Live entities of one simulation, in insertion order.
///
/// Insertion order is significant: it fixes the order pairs are tested in,
/// and with it which collision wins an exact tie.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    entities: Vec<Entity>,
    next_id: u64,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, mut entity: Entity) -> EntityId {
        let id = self.allocate_id();
        entity.id = id;
        self.entities.push(entity);
        id
    }

    pub(crate) fn allocate_id(&mut self) -> EntityId {
        self.next_id += 1;
        EntityId(self.next_id)
    }

    /// Appends an entity whose id came from [`Scene::allocate_id`].
    pub(crate) fn insert(&mut self, entity: Entity) {
        self.entities.push(entity);
    }

    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        let index = self.index_of(id)?;
        Some(self.entities.remove(index))
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    pub fn index_of(&self, id: EntityId) -> Option<usize> {
        self.entities.iter().position(|e| e.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub(crate) fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub(crate) fn retain(&mut self, keep: impl FnMut(&Entity) -> bool) {
        self.entities.retain(keep)
    }
}
