//! Earliest contact between two moving shapes, and between two entities.

use serde::Serialize;

use super::{
    detect_primitive, Aabb, Entity, GeometryError, Intersection, Outline, Pose, Shape,
    TerrainQuery, Vector2,
};

/// Which of the two shapes passed to [`detect_shape_pair`] owned the edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Side {
    First,
    Second,
}

/// Earliest edge/vertex contact between two shapes within a sub-step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Contact {
    /// Normalized sub-step time in `[0, 1)`.
    pub time: f64,
    pub point: Vector2,
    /// Edge endpoints at the moment of contact.
    pub edge_start: Vector2,
    pub edge_end: Vector2,
    pub edge_owner: Side,
    pub edge_index: usize,
    pub vertex_index: usize,
}

/// Test every edge of `a` against every vertex of `b`, then every edge of
/// `b` against every vertex of `a`, and keep the earliest hit.
///
/// Exact ties go to the pairing met first: edges of `a` in ascending order
/// (vertices ascending within each edge), then edges of `b`.
pub fn detect_shape_pair(
    a0: &Shape,
    a1: &Shape,
    b0: &Shape,
    b1: &Shape,
) -> Result<Option<Contact>, GeometryError> {
    ensure_same_vertex_count(a0, a1)?;
    ensure_same_vertex_count(b0, b1)?;

    let first = earliest_edge_hit(a0, a1, b0, b1, Side::First)?;
    let second = earliest_edge_hit(b0, b1, a0, a1, Side::Second)?;

    Ok(match (first, second) {
        (Some(f), Some(s)) if s.time < f.time => Some(s),
        (Some(f), _) => Some(f),
        (None, s) => s,
    })
}

fn earliest_edge_hit(
    edges0: &Shape,
    edges1: &Shape,
    points0: &Shape,
    points1: &Shape,
    owner: Side,
) -> Result<Option<Contact>, GeometryError> {
    let mut earliest: Option<Contact> = None;

    for (edge_index, ((s0, e0), (s1, e1))) in edges0.edges().zip(edges1.edges()).enumerate() {
        for (vertex_index, (p0, p1)) in points0
            .vertices
            .iter()
            .zip(points1.vertices.iter())
            .enumerate()
        {
            let Some(Intersection { time, point }) = detect_primitive(s0, e0, s1, e1, *p0, *p1)?
            else {
                continue;
            };
            if earliest.is_some_and(|c| c.time <= time) {
                continue;
            }
            earliest = Some(Contact {
                time,
                point,
                edge_start: s0.lerp(s1, time),
                edge_end: e0.lerp(e1, time),
                edge_owner: owner,
                edge_index,
                vertex_index,
            });
        }
    }

    Ok(earliest)
}

fn ensure_same_vertex_count(before: &Shape, after: &Shape) -> Result<(), GeometryError> {
    if before.len() == after.len() && before.closed == after.closed {
        Ok(())
    } else {
        Err(GeometryError::PoseMismatch {
            before: before.len(),
            after: after.len(),
        })
    }
}

/// Contact between entity `a` moving `a0 -> a1` and entity `b` moving
/// `b0 -> b1`. `Side::First` in the result refers to `a`.
///
/// Terrain is narrowed to the vertices under the other entity's swept
/// bounds first. Pairs where neither entity moves are resting contacts and
/// are not reported.
pub fn detect_entities(
    a: &Entity,
    a0: &Pose,
    a1: &Pose,
    b: &Entity,
    b0: &Pose,
    b1: &Pose,
) -> Result<Option<Contact>, GeometryError> {
    let a_moves = !a.is_static() && !a0.coincides(a1);
    let b_moves = !b.is_static() && !b0.coincides(b1);
    if !a_moves && !b_moves {
        return Ok(None);
    }

    match (&a.outline, &b.outline) {
        (Outline::Terrain(_), Outline::Terrain(_)) => Ok(None),
        (Outline::Terrain(terrain), _) => {
            let (Some(b0), Some(b1)) = (b.world_shape(b0), b.world_shape(b1)) else {
                return Ok(None);
            };
            let Some(ground) = terrain_under(terrain, &b0, &b1) else {
                return Ok(None);
            };
            detect_shape_pair(&ground, &ground, &b0, &b1)
        }
        (_, Outline::Terrain(terrain)) => {
            let (Some(a0), Some(a1)) = (a.world_shape(a0), a.world_shape(a1)) else {
                return Ok(None);
            };
            let Some(ground) = terrain_under(terrain, &a0, &a1) else {
                return Ok(None);
            };
            detect_shape_pair(&a0, &a1, &ground, &ground)
        }
        _ => {
            let (Some(a0), Some(a1), Some(b0), Some(b1)) = (
                a.world_shape(a0),
                a.world_shape(a1),
                b.world_shape(b0),
                b.world_shape(b1),
            ) else {
                return Ok(None);
            };
            detect_shape_pair(&a0, &a1, &b0, &b1)
        }
    }
}

/// Terrain polyline covering the sweep of `before -> after`.
fn terrain_under(terrain: &impl TerrainQuery, before: &Shape, after: &Shape) -> Option<Shape> {
    let region: Aabb = before.bounds()?.union(after.bounds()?);
    let points = terrain.query(region);
    (points.len() >= 2).then(|| Shape::polyline(points))
}


#[cfg(test)]
mod entity_pair_tests {
    use super::*;
    use crate::simulation::{EntityKind, Kinematic, Terrain};

    fn terrain() -> Entity {
        Entity::terrain(
            Terrain::try_new(vec![0., 100., 200., 300.], vec![0., 0., 50., 0.]).unwrap(),
        )
    }

    #[test]
    fn particle_falls_onto_terrain() {
        let vapour = Entity::point(EntityKind::Vapour, Vector2::new(50., 20.));
        let before = vapour.pose;
        let after = Pose {
            position: Kinematic::at(Vector2::new(50., -20.)),
            rotation: None,
        };
        let ground = terrain();
        let contact = detect_entities(&ground, &ground.pose, &ground.pose, &vapour, &before, &after)
            .unwrap()
            .unwrap();
        assert_eq!(contact.time, 0.5);
        assert_eq!(contact.point, Vector2::new(50., 0.));
        assert_eq!(contact.edge_owner, Side::First);

        // same contact, terrain passed second
        let contact = detect_entities(&vapour, &before, &after, &ground, &ground.pose, &ground.pose)
            .unwrap()
            .unwrap();
        assert_eq!(contact.edge_owner, Side::Second);
        assert_eq!(contact.point, Vector2::new(50., 0.));
    }

    #[test]
    fn lands_on_cliff_top_at_region_edge() {
        let cliff = Entity::terrain(
            Terrain::try_new(vec![0., 100., 100., 200.], vec![0., 0., 50., 50.]).unwrap(),
        );
        let vapour = Entity::point(EntityKind::Vapour, Vector2::new(100., 60.));
        let after = Pose {
            position: Kinematic::at(Vector2::new(100., 40.)),
            rotation: None,
        };
        let contact = detect_entities(&cliff, &cliff.pose, &cliff.pose, &vapour, &vapour.pose, &after)
            .unwrap()
            .unwrap();
        assert_eq!(contact.time, 0.5);
        assert_eq!(contact.point, Vector2::new(100., 50.));
    }

    #[test]
    fn resting_contact_is_ignored() {
        let vapour = Entity::point(EntityKind::Vapour, Vector2::new(50., 0.));
        let ground = terrain();
        assert!(
            detect_entities(&ground, &ground.pose, &ground.pose, &vapour, &vapour.pose, &vapour.pose)
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn outside_terrain_span() {
        let vapour = Entity::point(EntityKind::Vapour, Vector2::new(500., 20.));
        let after = Pose {
            position: Kinematic::at(Vector2::new(500., -20.)),
            rotation: None,
        };
        let ground = terrain();
        assert!(
            detect_entities(&ground, &ground.pose, &ground.pose, &vapour, &vapour.pose, &after)
                .unwrap()
                .is_none()
        );
    }
}
