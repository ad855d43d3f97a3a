//! Synthetic road networks and vehicle movement for headless runs

use rand::seq::IndexedRandom;
use rand::Rng;

use super::error::DispatchResult;
use super::road_network::{EdgeRecord, NodeRecord, RoadGraph};
use super::types::GeoPoint;

/// Approximate centre of Ernakulam
pub const KOCHI_CENTER: GeoPoint = GeoPoint {
    lat: 9.9816,
    lon: 76.2999,
};

/// Distance between neighbouring grid intersections, in degrees
pub const GRID_SPACING_DEG: f64 = 0.004;

/// Posted limits drawn for grid streets; `None` means unposted
const SPEED_LIMITS: [Option<f64>; 5] = [Some(30.0), Some(40.0), Some(50.0), Some(60.0), None];

/// Build a `size` x `size` two-way street grid centred on `center`.
///
/// The first row also gets a slower parallel service road and the grid has
/// one dead-end spur, which the largest-component trim removes.
pub fn grid_network<R: Rng>(
    center: GeoPoint,
    size: usize,
    spacing_deg: f64,
    rng: &mut R,
) -> DispatchResult<RoadGraph> {
    let half = (size as f64 - 1.0) / 2.0;
    let id = |row: usize, col: usize| (row * size + col + 1) as u64;

    let mut points = Vec::with_capacity(size * size);
    for row in 0..size {
        for col in 0..size {
            points.push(GeoPoint::new(
                center.lat + (row as f64 - half) * spacing_deg,
                center.lon + (col as f64 - half) * spacing_deg,
            ));
        }
    }
    let position = |node: u64| points[(node - 1) as usize];

    let mut edges = Vec::new();
    let mut two_way = |a: u64, b: u64, rng: &mut R| {
        let length = position(a).distance_m(&position(b));
        let limit = SPEED_LIMITS.choose(rng).copied().flatten();
        edges.push(EdgeRecord::new(a, b, length, limit));
        edges.push(EdgeRecord::new(b, a, length, limit));
    };

    for row in 0..size {
        for col in 0..size {
            if col + 1 < size {
                two_way(id(row, col), id(row, col + 1), rng);
            }
            if row + 1 < size {
                two_way(id(row, col), id(row + 1, col), rng);
            }
        }
    }

    for col in 0..size.saturating_sub(1) {
        let (a, b) = (id(0, col), id(0, col + 1));
        let length = position(a).distance_m(&position(b)) * 1.2;
        edges.push(EdgeRecord::new(a, b, length, Some(20.0)));
    }

    let mut nodes: Vec<NodeRecord> = points
        .iter()
        .enumerate()
        .map(|(i, point)| NodeRecord::new(i as u64 + 1, point.lat, point.lon))
        .collect();

    if size > 0 {
        let corner_id = id(size - 1, size - 1);
        let corner = position(corner_id);
        let spur = GeoPoint::new(corner.lat + spacing_deg, corner.lon + spacing_deg);
        let spur_id = (size * size + 1) as u64;
        nodes.push(NodeRecord::new(spur_id, spur.lat, spur.lon));
        edges.push(EdgeRecord::new(corner_id, spur_id, corner.distance_m(&spur), None));
    }

    RoadGraph::build(nodes, edges)
}

/// A vehicle driving along a polyline at constant speed
#[derive(Debug, Clone)]
pub struct VehicleTrack {
    points: Vec<GeoPoint>,
    /// Cumulative distance in metres at each point
    offsets: Vec<f64>,
    speed_kph: f64,
    travelled_m: f64,
}

impl VehicleTrack {
    pub fn new(points: Vec<GeoPoint>, speed_kph: f64) -> Self {
        let mut offsets = Vec::with_capacity(points.len());
        let mut total = 0.0;
        for (i, point) in points.iter().enumerate() {
            if i > 0 {
                total += points[i - 1].distance_m(point);
            }
            offsets.push(total);
        }
        Self {
            points,
            offsets,
            speed_kph,
            travelled_m: 0.0,
        }
    }

    pub fn length_m(&self) -> f64 {
        self.offsets.last().copied().unwrap_or(0.0)
    }

    pub fn is_finished(&self) -> bool {
        self.travelled_m >= self.length_m()
    }

    /// Move forward by `secs` of driving time
    pub fn advance(&mut self, secs: f64) {
        self.travelled_m = (self.travelled_m + self.speed_kph / 3.6 * secs).min(self.length_m());
    }

    /// Current interpolated position, `None` for an empty track
    pub fn position(&self) -> Option<GeoPoint> {
        let first = *self.points.first()?;
        let segment = self
            .offsets
            .windows(2)
            .position(|pair| self.travelled_m <= pair[1]);

        Some(match segment {
            Some(i) => {
                let span = self.offsets[i + 1] - self.offsets[i];
                let t = if span > 0.0 {
                    (self.travelled_m - self.offsets[i]) / span
                } else {
                    0.0
                };
                self.points[i].lerp(&self.points[i + 1], t)
            }
            None => self.points.last().copied().unwrap_or(first),
        })
    }
}
