use serde::{Deserialize, Serialize};
use std::fmt;

/// A closed interval on one coordinate axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub start: f64,
    pub end: f64,
}

impl Range {
    pub fn new(start: f64, end: f64) -> Range {
        Range { start, end }
    }

    pub fn size(&self) -> f64 {
        self.end - self.start
    }

    pub fn center(&self) -> f64 {
        (self.start + self.end) / 2.0
    }

    /// Inclusive membership test on both ends.
    pub fn contains(&self, value: f64) -> bool {
        self.start <= value && value <= self.end
    }

    /// Grow this range to cover another one.
    pub fn union(&self, other: &Range) -> Range {
        Range {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}]", self.start, self.end)
    }
}

/// An interval where either bound may be absent (unbounded on that side).
///
/// Used for declarative clipping rules: a format may restrict the table body
/// to "everything below y=103" without knowing the page height.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub start: Option<f64>,
    pub end: Option<f64>,
}

impl Band {
    pub fn new(start: Option<f64>, end: Option<f64>) -> Band {
        Band { start, end }
    }

    /// Band covering everything up to `end`.
    pub fn up_to(end: f64) -> Band {
        Band {
            start: None,
            end: Some(end),
        }
    }

    /// Band covering everything from `start` on.
    pub fn starting_at(start: f64) -> Band {
        Band {
            start: Some(start),
            end: None,
        }
    }

    pub fn between(start: f64, end: f64) -> Band {
        Band {
            start: Some(start),
            end: Some(end),
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.start.is_none_or(|s| s <= value) && self.end.is_none_or(|e| value <= e)
    }
}

/// An axis-aligned rectangle, the bounding box of a piece of page content.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Area {
    pub x: Range,
    pub y: Range,
}

impl Area {
    pub fn new(x: Range, y: Range) -> Area {
        Area { x, y }
    }

    /// Parse a `"x0 y0 x1 y1"` bbox attribute value.
    pub fn from_bbox(bbox: &str) -> Option<Area> {
        let mut coords = bbox.split_whitespace().map(|c| c.parse::<f64>());
        let x0 = coords.next()?.ok()?;
        let y0 = coords.next()?.ok()?;
        let x1 = coords.next()?.ok()?;
        let y1 = coords.next()?.ok()?;
        Some(Area {
            x: Range::new(x0, x1),
            y: Range::new(y0, y1),
        })
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x.center(), self.y.center())
    }

    pub fn width(&self) -> f64 {
        self.x.size()
    }

    pub fn height(&self) -> f64 {
        self.y.size()
    }

    /// Corner coordinates as ((top-left, top-right), (bottom-left, bottom-right)).
    pub fn corners(&self) -> (((f64, f64), (f64, f64)), ((f64, f64), (f64, f64))) {
        let (x0, x1) = (self.x.start, self.x.end);
        let (y0, y1) = (self.y.start, self.y.end);
        (((x0, y0), (x1, y0)), ((x0, y1), (x1, y1)))
    }

    pub fn union(&self, other: &Area) -> Area {
        Area {
            x: self.x.union(&other.x),
            y: self.y.union(&other.y),
        }
    }
}

/// Which coordinate axis an operation reads from an `Area`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    /// Extent of the area along this axis (width for X, height for Y).
    pub fn extent(&self, area: &Area) -> f64 {
        match self {
            Axis::X => area.width(),
            Axis::Y => area.height(),
        }
    }

    pub fn center(&self, area: &Area) -> f64 {
        match self {
            Axis::X => area.x.center(),
            Axis::Y => area.y.center(),
        }
    }

    pub fn bounds(&self, area: &Area) -> Range {
        match self {
            Axis::X => area.x,
            Axis::Y => area.y,
        }
    }
}
