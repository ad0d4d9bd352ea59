use super::{Aabb, Vector2};

/// Source of terrain vertices for collision tests.
///
/// Implementations return the polyline vertices under `region`, sorted by
/// ascending x, plus the first vertex outside each end so that edges
/// crossing the region boundary are still tested.
pub trait TerrainQuery {
    fn query(&self, region: Aabb) -> Vec<Vector2>;
}

/// A fixed terrain polyline.
#[derive(Debug, Clone, PartialEq)]
pub struct Terrain {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl Terrain {
    pub fn try_new(x: Vec<f64>, y: Vec<f64>) -> Result<Self, String> {
        if x.len() != y.len() {
            return Err(format!(
                "Terrain x and y differ in length ({} != {})",
                x.len(),
                y.len()
            ));
        }
        if let Some(w) = x.windows(2).find(|w| w[0] > w[1]) {
            return Err(format!(
                "Terrain has to be sorted by x ({} > {})",
                w[0], w[1]
            ));
        }
        if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
            return Err("Terrain has to contain finite landpoints".to_owned());
        }
        Ok(Self { x, y })
    }

    pub fn from_points(points: impl IntoIterator<Item = Vector2>) -> Result<Self, String> {
        let (x, y) = points
            .into_iter()
            .fold((Vec::new(), Vec::new()), |(mut xs, mut ys), p| {
                xs.push(p.x);
                ys.push(p.y);
                (xs, ys)
            });
        Self::try_new(x, y)
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn iter_points(&self) -> impl Iterator<Item = Vector2> + '_ {
        self.x
            .iter()
            .zip(self.y.iter())
            .map(|(&x, &y)| Vector2::new(x, y))
    }
}

impl TerrainQuery for Terrain {
    fn query(&self, region: Aabb) -> Vec<Vector2> {
        if self.is_empty() {
            return Vec::new();
        }
        let start = self
            .x
            .partition_point(|&x| x < region.min.x)
            .saturating_sub(1);
        // vertices sharing max.x (a cliff) all belong inside, the neighbour is past them
        let end = (self.x.partition_point(|&x| x <= region.max.x) + 1).min(self.len());

        self.iter_points()
            .skip(start)
            .take(end.saturating_sub(start))
            .collect()
    }
}
