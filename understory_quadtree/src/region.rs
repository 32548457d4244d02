// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Query regions.
//!
//! The tree only needs two predicates from a query shape: does it overlap a
//! rectangle, and does it fully contain one. [`Region`] provides both for
//! [`kurbo::Rect`] and [`kurbo::Circle`].
//!
//! All predicates treat shapes as closed sets: a rectangle that touches a
//! query region only along an edge or at a corner overlaps it. Note that this
//! differs from [`Rect::contains`], which is half-open.
//!
//! Degenerate query shapes match nothing: a circle with a negative or NaN
//! radius, and a rectangle whose `x0 > x1` or `y0 > y1`. Call [`Rect::abs`]
//! first when a rectangle may have been built from unordered corners.

use kurbo::{Circle, Point, Rect};

/// A shape that can be used to query a [`Quadtree`](crate::Quadtree).
pub trait Region {
    /// Whether this region and `rect` share at least one point.
    fn intersects_rect(&self, rect: &Rect) -> bool;

    /// Whether every point of `rect` lies inside this region.
    fn encloses_rect(&self, rect: &Rect) -> bool;
}

impl<R: Region + ?Sized> Region for &R {
    #[inline]
    fn intersects_rect(&self, rect: &Rect) -> bool {
        (**self).intersects_rect(rect)
    }

    #[inline]
    fn encloses_rect(&self, rect: &Rect) -> bool {
        (**self).encloses_rect(rect)
    }
}

impl Region for Rect {
    #[inline]
    fn intersects_rect(&self, rect: &Rect) -> bool {
        self.x0 <= rect.x1 && self.x1 >= rect.x0 && self.y0 <= rect.y1 && self.y1 >= rect.y0
    }

    #[inline]
    fn encloses_rect(&self, rect: &Rect) -> bool {
        self.x0 <= rect.x0 && rect.x1 <= self.x1 && self.y0 <= rect.y0 && rect.y1 <= self.y1
    }
}

impl Region for Circle {
    #[inline]
    fn intersects_rect(&self, rect: &Rect) -> bool {
        // Distance from the center to the nearest point of the rectangle.
        let nearest_x = self.center.x.max(rect.x0).min(rect.x1);
        let nearest_y = self.center.y.max(rect.y0).min(rect.y1);
        circle_contains_point(self, Point::new(nearest_x, nearest_y))
    }

    #[inline]
    fn encloses_rect(&self, rect: &Rect) -> bool {
        circle_contains_point(self, Point::new(rect.x0, rect.y0))
            && circle_contains_point(self, Point::new(rect.x1, rect.y0))
            && circle_contains_point(self, Point::new(rect.x1, rect.y1))
            && circle_contains_point(self, Point::new(rect.x0, rect.y1))
    }
}

/// Closed containment test of a point in a rectangle.
#[inline]
pub fn rect_contains_point(rect: &Rect, point: Point) -> bool {
    rect.x0 <= point.x && point.x <= rect.x1 && rect.y0 <= point.y && point.y <= rect.y1
}

/// Closed containment test of a point in a circle.
///
/// Always `false` for a negative or NaN radius.
#[inline]
pub fn circle_contains_point(circle: &Circle, point: Point) -> bool {
    if circle.radius.is_nan() || circle.radius < 0.0 {
        return false;
    }
    let dx = point.x - circle.center.x;
    let dy = point.y - circle.center.y;
    dx * dx + dy * dy <= circle.radius * circle.radius
}

/// Whether `rect` is usable as a node region: finite, with positive width and height.
pub(crate) fn is_proper_rect(rect: &Rect) -> bool {
    rect.x0.is_finite()
        && rect.y0.is_finite()
        && rect.x1.is_finite()
        && rect.y1.is_finite()
        && rect.width() > 0.0
        && rect.height() > 0.0
}
