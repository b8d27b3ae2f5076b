use crate::errors::{IndexError, IndexResult};

/// An axis-aligned rectangle represented by minimum and maximum coordinates.
///
/// `Rectangle` is the key type of the [`SpatialTree`](crate::SpatialTree):
/// every stored record sits under one, and every internal entry carries the
/// minimum bounding rectangle (MBR) of its subtree. Point rectangles, where
/// the min and max corners coincide, are valid and are what the geospatial
/// index inserts for each record.
///
/// # Examples
///
/// ```rust
/// use poi_rtree::Rectangle;
///
/// let a = Rectangle::new(0.0, 0.0, 2.0, 2.0);
/// let b = Rectangle::point(3.0, 1.0);
///
/// assert!(!a.intersects(&b));
/// assert_eq!(a.union(&b), Rectangle::new(0.0, 0.0, 3.0, 2.0));
/// assert_eq!(a.enlargement(&b), 2.0);
/// ```
#[derive(Clone, Copy, PartialEq, Default, Debug, serde::Deserialize, serde::Serialize)]
pub struct Rectangle {
    /// Minimum X coordinate
    pub min_x: f64,
    /// Minimum Y coordinate
    pub min_y: f64,
    /// Maximum X coordinate
    pub max_x: f64,
    /// Maximum Y coordinate
    pub max_y: f64,
}

impl std::fmt::Display for Rectangle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Rectangle({}, {}, {}, {})", self.min_x, self.min_y, self.max_x, self.max_y)
    }
}

impl Rectangle {
    /// Creates a new rectangle with the specified coordinates.
    ///
    /// No validation is performed; use [`Rectangle::try_new`] for input that
    /// has not been checked yet.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Rectangle {
        Rectangle {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Creates a rectangle after checking that every coordinate is finite
    /// and that the min corner does not exceed the max corner.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::InvalidCoordinate`] when the check fails.
    pub fn try_new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> IndexResult<Rectangle> {
        let rect = Rectangle::new(min_x, min_y, max_x, max_y);
        if !rect.is_finite() {
            return Err(IndexError::InvalidCoordinate(format!(
                "{} has a non-finite coordinate",
                rect
            )));
        }
        if !rect.is_valid() {
            return Err(IndexError::InvalidCoordinate(format!(
                "{} has min greater than max",
                rect
            )));
        }
        Ok(rect)
    }

    /// Creates a zero-area rectangle at a single point.
    pub fn point(x: f64, y: f64) -> Rectangle {
        Rectangle::new(x, y, x, y)
    }

    /// Returns the tight MBR of all rectangles yielded by the iterator,
    /// or `None` if it yields nothing.
    pub fn union_all<'a, I>(rects: I) -> Option<Rectangle>
    where
        I: IntoIterator<Item = &'a Rectangle>,
    {
        let mut iter = rects.into_iter();
        let mut acc = *iter.next()?;
        for rect in iter {
            acc.enlarge(rect);
        }
        Some(acc)
    }

    /// Returns the width of the rectangle.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Returns the height of the rectangle.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Returns the area of the rectangle.
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Checks if this rectangle contains a point. Boundaries are inclusive.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Checks if this rectangle fully contains another rectangle.
    pub fn contains(&self, other: &Rectangle) -> bool {
        other.min_x >= self.min_x && other.max_x <= self.max_x
            && other.min_y >= self.min_y && other.max_y <= self.max_y
    }

    /// Checks if this rectangle intersects another rectangle.
    ///
    /// Only strict separation on an axis counts as disjoint, so rectangles
    /// that merely touch along an edge or at a corner intersect.
    pub fn intersects(&self, other: &Rectangle) -> bool {
        !(self.max_x < other.min_x
            || self.min_x > other.max_x
            || self.max_y < other.min_y
            || self.min_y > other.max_y)
    }

    /// Returns the smallest rectangle containing both this one and `other`.
    pub fn union(&self, other: &Rectangle) -> Rectangle {
        Rectangle::new(
            self.min_x.min(other.min_x),
            self.min_y.min(other.min_y),
            self.max_x.max(other.max_x),
            self.max_y.max(other.max_y),
        )
    }

    /// Grows this rectangle in place so that it also covers `other`.
    pub fn enlarge(&mut self, other: &Rectangle) {
        self.min_x = self.min_x.min(other.min_x);
        self.min_y = self.min_y.min(other.min_y);
        self.max_x = self.max_x.max(other.max_x);
        self.max_y = self.max_y.max(other.max_y);
    }

    /// Area that would be added if this rectangle were grown to cover `other`.
    pub fn enlargement(&self, other: &Rectangle) -> f64 {
        self.union(other).area() - self.area()
    }

    /// Checks if this rectangle is a point (zero area, zero extent).
    pub fn is_point(&self) -> bool {
        self.min_x == self.max_x && self.min_y == self.max_y
    }

    /// Checks if this rectangle is valid (min <= max on both axes).
    pub fn is_valid(&self) -> bool {
        self.min_x <= self.max_x && self.min_y <= self.max_y
    }

    /// Checks that none of the coordinates is NaN or infinite.
    pub fn is_finite(&self) -> bool {
        self.min_x.is_finite()
            && self.min_y.is_finite()
            && self.max_x.is_finite()
            && self.max_y.is_finite()
    }
}
