use super::Vector2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vector2,
    pub max: Vector2,
}

impl Aabb {
    pub fn new(min: Vector2, max: Vector2) -> Self {
        Self { min, max }
    }

    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Vector2>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = *points.next()?;
        Some(points.fold(Self::new(first, first), |bounds, p| bounds.including(*p)))
    }

    pub fn including(self, p: Vector2) -> Self {
        Self {
            min: Vector2::new(self.min.x.min(p.x), self.min.y.min(p.y)),
            max: Vector2::new(self.max.x.max(p.x), self.max.y.max(p.y)),
        }
    }

    pub fn union(self, other: Aabb) -> Self {
        self.including(other.min).including(other.max)
    }
}

/// Ordered vertices. Consecutive vertices form edges; a closed shape also
/// joins the last vertex back to the first.
///
/// Edge order is vertex order, and it decides which edge owns a collision
/// when two edges are hit at the same instant, so keep it stable.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Shape {
    pub vertices: Vec<Vector2>,
    pub closed: bool,
}

impl Shape {
    pub fn polygon(vertices: Vec<Vector2>) -> Self {
        Self {
            vertices,
            closed: true,
        }
    }

    pub fn polyline(vertices: Vec<Vector2>) -> Self {
        Self {
            vertices,
            closed: false,
        }
    }

    pub fn point(p: Vector2) -> Self {
        Self::polyline(vec![p])
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn num_of_edges(&self) -> usize {
        match self.vertices.len() {
            0 | 1 => 0,
            2 => 1,
            n if self.closed => n,
            n => n - 1,
        }
    }

    /// Edge `n` runs from vertex `n` to vertex `n + 1` (wrapping when closed).
    pub fn edge(&self, n: usize) -> Option<(Vector2, Vector2)> {
        if n >= self.num_of_edges() {
            return None;
        }
        let start = self.vertices[n];
        let end = self.vertices[(n + 1) % self.vertices.len()];
        Some((start, end))
    }

    pub fn edges(&self) -> impl Iterator<Item = (Vector2, Vector2)> + '_ {
        (0..self.num_of_edges()).filter_map(|n| self.edge(n))
    }

    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(&self.vertices)
    }

    /// Rotate by `angle` radians about the local origin, then move to `position`.
    pub fn placed(&self, position: Vector2, angle: f64) -> Shape {
        Shape {
            vertices: self
                .vertices
                .iter()
                .map(|v| v.rotate(angle).add(position))
                .collect(),
            closed: self.closed,
        }
    }
}

#[cfg(test)]
mod shape_tests {
    use super::*;

    fn square() -> Shape {
        Shape::polygon(vec![
            Vector2::new(-1., -1.),
            Vector2::new(1., -1.),
            Vector2::new(1., 1.),
            Vector2::new(-1., 1.),
        ])
    }

    #[test]
    fn closed_polygon_wraps() {
        let shape = square();
        assert_eq!(shape.num_of_edges(), 4);
        assert_eq!(
            shape.edge(3),
            Some((Vector2::new(-1., 1.), Vector2::new(-1., -1.)))
        );
        assert_eq!(shape.edge(4), None);
    }

    #[test]
    fn open_polyline_does_not_wrap() {
        let shape = Shape::polyline(square().vertices);
        assert_eq!(shape.num_of_edges(), 3);
        assert_eq!(shape.edges().count(), 3);
    }

    #[test]
    fn degenerate_shapes_have_no_edges() {
        assert_eq!(Shape::point(Vector2::ZERO).num_of_edges(), 0);
        assert_eq!(Shape::default().num_of_edges(), 0);
        let pair = Shape::polygon(vec![Vector2::ZERO, Vector2::new(1., 0.)]);
        assert_eq!(pair.num_of_edges(), 1);
    }

    #[test]
    fn placed_translates() {
        let shape = square().placed(Vector2::new(10., 5.), 0.);
        assert_eq!(shape.vertices[0], Vector2::new(9., 4.));
        assert!(shape.closed);
    }

    #[test]
    fn bounds_cover_all_vertices() {
        let bounds = square().bounds().unwrap();
        assert_eq!(bounds.min, Vector2::new(-1., -1.));
        assert_eq!(bounds.max, Vector2::new(1., 1.));
        assert!(Shape::default().bounds().is_none());
    }
}
