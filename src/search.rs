/*
MIT License
Copyright (c) 2021 Germán Molina
Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:
The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.
THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
*/

//! The geometric searches in [`crate::dimensions`] all work the same way: two
//! half-lines leave an origin on the window, they span a planar region (a
//! [`SearchQuadrant`]), the obstructions are cut with that region and the
//! resulting points are ranked by the angle they form with the window's normal.

use crate::scene::{ObstructionSurface, Triangle};
use crate::Float;
use geometry3d::{Point3D, Vector3D};

/// Distances below this are considered zero when classifying
/// vertices against a plane.
const PLANE_EPS: Float = 1e-9;

/// Returns the unit vector in the direction of `v`, or `None`
/// if `v` has (almost) no length.
pub fn unit(v: Vector3D) -> Option<Vector3D> {
    let l = v.length();
    if !l.is_finite() || l < 1e-12 {
        return None;
    }
    Some(v * (1. / l))
}

/// The point halfway between `a` and `b`
pub fn midpoint(a: Point3D, b: Point3D) -> Point3D {
    a + (b - a) * 0.5
}

/// The angle (in radians) between `v` and `normal`.
///
/// Returns `None` when `v` is shorter than `degenerate_length` or when the
/// angle cannot be calculated.
pub fn angle_from_normal(v: Vector3D, normal: Vector3D, degenerate_length: Float) -> Option<Float> {
    let l = v.length();
    let nl = normal.length();
    if !l.is_finite() || l < degenerate_length || nl < 1e-12 {
        return None;
    }
    let cos = ((v * normal) / (l * nl)).clamp(-1., 1.);
    let angle = cos.acos();
    if angle.is_finite() {
        Some(angle)
    } else {
        None
    }
}

/// `sqrt(hypotenuse² - leg²)`, clamping negative values (that only appear
/// due to floating point noise) to zero.
pub fn other_leg(hypotenuse: Float, leg: Float) -> Float {
    (hypotenuse * hypotenuse - leg * leg).max(0.0).sqrt()
}

/// The plane in which a polygon lies
#[derive(Debug, Clone, Copy)]
pub struct PolygonPlane {
    /// The average of the vertices
    pub centroid: Point3D,
    /// Unit normal, following the right-hand rule with the order of the vertices
    pub normal: Vector3D,
    /// The area of the polygon
    pub area: Float,
    /// The largest distance between a vertex and the plane
    pub deviation: Float,
}

impl PolygonPlane {
    /// Fits a plane to a polygon using Newell's method. Returns `None`
    /// if there are less than three vertices or if the polygon has no area.
    pub fn fit(vertices: &[Point3D]) -> Option<Self> {
        let n = vertices.len();
        if n < 3 {
            return None;
        }
        let (mut nx, mut ny, mut nz) = (0.0, 0.0, 0.0);
        let (mut cx, mut cy, mut cz) = (0.0, 0.0, 0.0);
        for (i, this) in vertices.iter().enumerate() {
            let next = vertices[(i + 1) % n];
            nx += (this.y - next.y) * (this.z + next.z);
            ny += (this.z - next.z) * (this.x + next.x);
            nz += (this.x - next.x) * (this.y + next.y);
            cx += this.x;
            cy += this.y;
            cz += this.z;
        }
        let newell = Vector3D::new(nx, ny, nz);
        let area = newell.length() / 2.;
        let normal = unit(newell)?;
        let nf = n as Float;
        let centroid = Point3D::new(cx / nf, cy / nf, cz / nf);
        let deviation = vertices
            .iter()
            .map(|p| ((*p - centroid) * normal).abs())
            .fold(0.0, Float::max);

        Some(Self {
            centroid,
            normal,
            area,
            deviation,
        })
    }
}

/// Angles closer than this are the same angle when ranking candidates
const ANGLE_TOL: Float = 1e-6;

/// A point found by a search, and the angle it forms with the window's normal
#[derive(Debug, Clone, Copy)]
pub struct Candidate {
    /// The point
    pub point: Point3D,
    /// Angle (in radians) between the normal and the vector from the search origin to the point
    pub angle: Float,
    /// Distance between the search origin and the point
    pub distance: Float,
}

impl Candidate {
    /// The candidate with the largest angle. Among points on the same
    /// line of sight, the farthest one wins.
    pub fn steepest<I: IntoIterator<Item = Candidate>>(candidates: I) -> Option<Candidate> {
        candidates.into_iter().reduce(|best, c| {
            let steeper = c.angle > best.angle + ANGLE_TOL;
            let tied = (c.angle - best.angle).abs() <= ANGLE_TOL;
            if steeper || (tied && c.distance > best.distance) {
                c
            } else {
                best
            }
        })
    }

    /// The candidate with the smallest angle. Among points on the same
    /// line of sight, the farthest one wins.
    pub fn shallowest<I: IntoIterator<Item = Candidate>>(candidates: I) -> Option<Candidate> {
        candidates.into_iter().reduce(|best, c| {
            let shallower = c.angle < best.angle - ANGLE_TOL;
            let tied = (c.angle - best.angle).abs() <= ANGLE_TOL;
            if shallower || (tied && c.distance > best.distance) {
                c
            } else {
                best
            }
        })
    }
}

/// The planar region `origin + s*u + t*v`, with `s` in `[0, u_max]`
/// and `t` in `[0, v_max]`.
///
/// `u` and `v` need to be unit vectors, but not necessarily perpendicular.
#[derive(Debug, Clone, Copy)]
pub struct SearchQuadrant {
    origin: Point3D,
    u: Vector3D,
    v: Vector3D,
    u_max: Float,
    v_max: Float,
    plane_normal: Vector3D,
}

impl SearchQuadrant {
    /// Builds a new quadrant. Returns `None` if `u` and `v` are parallel
    /// or if any of them has no length.
    pub fn new(origin: Point3D, u: Vector3D, v: Vector3D, u_max: Float, v_max: Float) -> Option<Self> {
        let u = unit(u)?;
        let v = unit(v)?;
        let cross = u.cross(v);
        if cross.length() < 1e-6 {
            return None;
        }
        let plane_normal = unit(cross)?;
        Some(Self {
            origin,
            u,
            v,
            u_max,
            v_max,
            plane_normal,
        })
    }

    /// The point where both half-lines start
    pub fn origin(&self) -> Point3D {
        self.origin
    }

    /// The end of the first half-line
    pub fn u_end(&self) -> Point3D {
        self.origin + self.u * self.u_max
    }

    /// The end of the second half-line
    pub fn v_end(&self) -> Point3D {
        self.origin + self.v * self.v_max
    }

    /// The coordinates `(s, t)` of a point lying on the plane of the quadrant
    fn plane_coordinates(&self, p: Point3D) -> (Float, Float) {
        let w = p - self.origin;
        let a = w * self.u;
        let b = w * self.v;
        let uv = self.u * self.v;
        let det = 1. - uv * uv;
        ((a - uv * b) / det, (b - uv * a) / det)
    }

    /// Cuts a triangle with the plane of the quadrant, and clips the
    /// resulting segment to the quadrant. Triangles lying on the
    /// plane are ignored, as their neighbours produce their edges anyway.
    pub fn section_triangle(&self, triangle: &Triangle) -> Option<(Point3D, Point3D)> {
        let d: Vec<Float> = triangle
            .iter()
            .map(|p| (*p - self.origin) * self.plane_normal)
            .collect();

        if d.iter().all(|x| x.abs() <= PLANE_EPS) {
            return None;
        }

        let mut crossings: Vec<Point3D> = Vec::with_capacity(3);
        for i in 0..3 {
            let j = (i + 1) % 3;
            if d[i].abs() <= PLANE_EPS {
                crossings.push(triangle[i]);
            } else if d[j].abs() > PLANE_EPS && d[i] * d[j] < 0.0 {
                let f = d[i] / (d[i] - d[j]);
                crossings.push(triangle[i] + (triangle[j] - triangle[i]) * f);
            }
        }

        let start = *crossings.first()?;
        let end = crossings
            .iter()
            .copied()
            .max_by(|a, b| (*a - start).length().total_cmp(&(*b - start).length()))
            .unwrap_or(start);

        self.clip(start, end)
    }

    /// Liang-Barsky clipping of a segment (on the plane) to the quadrant
    fn clip(&self, start: Point3D, end: Point3D) -> Option<(Point3D, Point3D)> {
        let (s0, t0) = self.plane_coordinates(start);
        let (s1, t1) = self.plane_coordinates(end);
        let (ds, dt) = (s1 - s0, t1 - t0);

        let tol = PLANE_EPS * (1. + self.u_max.max(self.v_max));
        let boundaries = [
            (-ds, s0 + tol),
            (ds, self.u_max + tol - s0),
            (-dt, t0 + tol),
            (dt, self.v_max + tol - t0),
        ];

        let mut enter: Float = 0.;
        let mut exit: Float = 1.;
        for (p, q) in boundaries {
            if p.abs() < 1e-15 {
                if q < 0.0 {
                    return None;
                }
            } else {
                let r = q / p;
                if p < 0.0 {
                    enter = enter.max(r);
                } else {
                    exit = exit.min(r);
                }
            }
        }
        if enter > exit {
            return None;
        }

        let dir = end - start;
        Some((start + dir * enter, start + dir * exit))
    }

    /// All the points in which the surface meets the quadrant. These are the
    /// ends of the clipped sections of each triangle.
    pub fn section(&self, surface: &ObstructionSurface) -> Vec<Point3D> {
        if !surface.bounding_box().overlaps_points(&self.corners()) {
            return Vec::new();
        }
        surface
            .triangles()
            .iter()
            .filter_map(|tri| self.section_triangle(tri))
            .flat_map(|(a, b)| [a, b])
            .collect()
    }

    /// Checks whether the surface touches the quadrant at all
    pub fn touches(&self, surface: &ObstructionSurface) -> bool {
        surface.bounding_box().overlaps_points(&self.corners())
            && surface
                .triangles()
                .iter()
                .any(|tri| self.section_triangle(tri).is_some())
    }

    /// The four corners of the quadrant
    fn corners(&self) -> [Point3D; 4] {
        let a = self.u * self.u_max;
        let b = self.v * self.v_max;
        [self.origin, self.origin + a, self.origin + a + b, self.origin + b]
    }
}
