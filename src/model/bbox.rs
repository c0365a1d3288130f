//! Axis-aligned bounding boxes in page point-space.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// An axis-aligned rectangle with integer point coordinates.
///
/// A `BBox` always has positive width and height; zero-area boxes are
/// rejected by [`BBox::new`] and by deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "[i32; 4]", try_from = "[i32; 4]")]
pub struct BBox {
    /// Left edge
    pub x0: i32,
    /// Top edge
    pub y0: i32,
    /// Right edge
    pub x1: i32,
    /// Bottom edge
    pub y1: i32,
}

impl BBox {
    /// Create a box, returning `None` when it would have zero or negative area.
    pub fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Option<Self> {
        if x1 > x0 && y1 > y0 {
            Some(Self { x0, y0, x1, y1 })
        } else {
            None
        }
    }

    /// Width in points, saturating at `i32::MAX`.
    pub fn width(&self) -> i32 {
        self.x1.saturating_sub(self.x0)
    }

    /// Height in points, saturating at `i32::MAX`.
    pub fn height(&self) -> i32 {
        self.y1.saturating_sub(self.y0)
    }

    /// Area in square points.
    pub fn area(&self) -> i64 {
        i64::from(self.width()) * i64::from(self.height())
    }

    /// Horizontal centre, doubled to stay in integers.
    pub fn center_x2(&self) -> i64 {
        i64::from(self.x0) + i64::from(self.x1)
    }

    /// Vertical centre, doubled to stay in integers.
    pub fn center_y2(&self) -> i64 {
        i64::from(self.y0) + i64::from(self.y1)
    }

    /// The intersection rectangle, if the boxes share a positive area.
    pub fn intersection(&self, other: &BBox) -> Option<BBox> {
        BBox::new(
            self.x0.max(other.x0),
            self.y0.max(other.y0),
            self.x1.min(other.x1),
            self.y1.min(other.y1),
        )
    }

    /// Area shared by both boxes (0 when disjoint or merely touching).
    pub fn intersection_area(&self, other: &BBox) -> i64 {
        self.intersection(other).map_or(0, |b| b.area())
    }

    /// Intersection area divided by the area of the smaller box.
    pub fn overlap_ratio_of_smaller(&self, other: &BBox) -> f64 {
        let min_area = self.area().min(other.area());
        self.intersection_area(other) as f64 / min_area as f64
    }

    /// Fraction of this box's area that lies inside `other`.
    pub fn overlap_ratio_in(&self, other: &BBox) -> f64 {
        self.intersection_area(other) as f64 / self.area() as f64
    }

    /// Intersection over union.
    pub fn iou(&self, other: &BBox) -> f64 {
        let inter = self.intersection_area(other);
        let union = self.area().saturating_add(other.area()) - inter;
        inter as f64 / union as f64
    }

    /// Whether `other` lies entirely inside this box.
    pub fn contains(&self, other: &BBox) -> bool {
        self.x0 <= other.x0 && self.y0 <= other.y0 && self.x1 >= other.x1 && self.y1 >= other.y1
    }

    /// Length of the shared vertical range (0 when disjoint).
    pub fn y_overlap(&self, other: &BBox) -> i32 {
        self.y1
            .min(other.y1)
            .saturating_sub(self.y0.max(other.y0))
            .max(0)
    }

    /// Vertical overlap divided by the shorter box's height.
    pub fn y_overlap_ratio(&self, other: &BBox) -> f64 {
        let min_height = self.height().min(other.height());
        f64::from(self.y_overlap(other)) / f64::from(min_height)
    }

    /// Smallest box covering both.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Smallest box covering every box in the iterator.
    pub fn union_all<'a>(boxes: impl IntoIterator<Item = &'a BBox>) -> Option<BBox> {
        boxes.into_iter().fold(None, |acc: Option<BBox>, b| {
            Some(acc.map_or(*b, |a| a.union(b)))
        })
    }

    /// Replace the vertical range, rejecting a degenerate result.
    pub fn with_y(&self, y0: i32, y1: i32) -> Option<BBox> {
        BBox::new(self.x0, y0, self.x1, y1)
    }

    /// Squared distance between the two centres (doubled coordinates),
    /// saturating at `i64::MAX`.
    pub fn center_distance2(&self, other: &BBox) -> i64 {
        let dx = self.center_x2() - other.center_x2();
        let dy = self.center_y2() - other.center_y2();
        dx.saturating_mul(dx).saturating_add(dy.saturating_mul(dy))
    }

    /// Parts of this box not covered by `cut`, as up to four disjoint boxes.
    ///
    /// Order: top band, bottom band, left piece, right piece.
    pub fn subtract(&self, cut: &BBox) -> Vec<BBox> {
        let Some(inter) = self.intersection(cut) else {
            return vec![*self];
        };
        [
            BBox::new(self.x0, self.y0, self.x1, inter.y0),
            BBox::new(self.x0, inter.y1, self.x1, self.y1),
            BBox::new(self.x0, inter.y0, inter.x0, inter.y1),
            BBox::new(inter.x1, inter.y0, self.x1, inter.y1),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Coordinates as `[x0, y0, x1, y1]`.
    pub fn to_array(&self) -> [i32; 4] {
        [self.x0, self.y0, self.x1, self.y1]
    }
}

impl From<BBox> for [i32; 4] {
    fn from(b: BBox) -> Self {
        b.to_array()
    }
}

impl TryFrom<[i32; 4]> for BBox {
    type Error = Error;

    fn try_from(v: [i32; 4]) -> Result<Self, Self::Error> {
        BBox::new(v[0], v[1], v[2], v[3]).ok_or(Error::DegenerateBBox(v))
    }
}

impl std::fmt::Display for BBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}, {}, {}]", self.x0, self.y0, self.x1, self.y1)
    }
}
