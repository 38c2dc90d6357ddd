use crate::{Detection, Vector2};

/// A ranked point source used for quad building.
///
/// Stars are created once from detector output and never modified. The `id`
/// is the detection number, which is what quads and their dedup keys refer to.
#[derive(Debug, Clone, PartialEq)]
pub struct Star {
    pub id: u64,
    pub x: f64,
    pub y: f64,
    pub flux: f64,
    pub fwhm: f64,
    pub flag: u32,
    pub elongation: f64,
}

impl Star {
    /// Position in pixel coordinates.
    pub fn pos(&self) -> Vector2 {
        Vector2::new(self.x, self.y)
    }

    /// Euclidean distance to another star, in pixels.
    pub fn distance(&self, other: &Star) -> f64 {
        (self.pos() - other.pos()).norm()
    }

    /// Euclidean distance to an arbitrary point, in pixels.
    pub fn distance_to(&self, point: &Vector2) -> f64 {
        (self.pos() - point).norm()
    }
}

impl From<&Detection> for Star {
    fn from(det: &Detection) -> Self {
        Star {
            id: det.id,
            x: det.x,
            y: det.y,
            flux: det.flux,
            fwhm: det.fwhm,
            flag: det.flag,
            elongation: det.elongation,
        }
    }
}

/// Smallest of the pairwise distances between the given stars.
///
/// Returns `f64::INFINITY` for fewer than two stars.
pub fn min_pairwise_distance(stars: &[&Star]) -> f64 {
    let mut min = f64::INFINITY;
    for i in 0..stars.len() {
        for j in (i + 1)..stars.len() {
            min = min.min(stars[i].distance(stars[j]));
        }
    }
    min
}

#[cfg(test)]
mod tests {
    use super::*;

    fn star(id: u64, x: f64, y: f64) -> Star {
        Star {
            id,
            x,
            y,
            flux: 1.0,
            fwhm: 2.0,
            flag: 0,
            elongation: 1.0,
        }
    }

    #[test]
    fn test_distance() {
        let a = star(0, 0.0, 0.0);
        let b = star(1, 3.0, 4.0);
        assert_eq!(a.distance(&b), 5.0);
        assert_eq!(b.distance(&a), 5.0);
        assert_eq!(a.distance_to(&Vector2::new(0.0, 2.0)), 2.0);
    }

    #[test]
    fn test_min_pairwise_distance() {
        let s = [
            star(0, 0.0, 0.0),
            star(1, 10.0, 0.0),
            star(2, 10.0, 1.5),
            star(3, 0.0, 10.0),
        ];
        let refs: Vec<&Star> = s.iter().collect();
        assert_eq!(min_pairwise_distance(&refs), 1.5);
        assert_eq!(min_pairwise_distance(&refs[..1]), f64::INFINITY);
    }

    #[test]
    fn test_from_detection() {
        let det = Detection {
            id: 42,
            x: 12.5,
            y: 7.25,
            flux: 3000.0,
            fwhm: 2.1,
            flag: 2,
            elongation: 1.3,
        };
        let s = Star::from(&det);
        assert_eq!(s.id, 42);
        assert_eq!(s.pos(), Vector2::new(12.5, 7.25));
        assert_eq!(s.flag, 2);
    }
}
