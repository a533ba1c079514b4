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

use crate::error::{Result, ShadingError};
use crate::search::PolygonPlane;
use crate::Float;
use geometry3d::{Point3D, Ray3D, Vector3D};

/// A triangle, as three vertices
pub type Triangle = [Point3D; 3];

/// Rays start counting hits a little bit after their origin
const MIN_T: Float = 1e-6;

/// Tolerance used for the barycentric coordinates of ray hits
const BARY_EPS: Float = 1e-9;

/// Two vertices closer than this are the same vertex
const VERTEX_EPS: Float = 1e-9;

/// Möller–Trumbore intersection. Returns the parameter `t` such that
/// `origin + direction * t` is on the triangle (edges included).
pub(crate) fn intersect_triangle(origin: Point3D, direction: Vector3D, triangle: &Triangle) -> Option<Float> {
    let [a, b, c] = *triangle;
    let e1 = b - a;
    let e2 = c - a;
    let p = direction.cross(e2);
    let det = e1 * p;
    let scale = e1.length() * e2.length() * direction.length();
    if det.abs() <= 1e-12 * scale {
        // parallel
        return None;
    }
    let inv_det = 1. / det;

    let s = origin - a;
    let u = (s * p) * inv_det;
    if u < -BARY_EPS || u > 1. + BARY_EPS {
        return None;
    }
    let q = s.cross(e1);
    let v = (direction * q) * inv_det;
    if v < -BARY_EPS || u + v > 1. + BARY_EPS {
        return None;
    }
    Some((e2 * q) * inv_det)
}

/// Distance between point `p` and the segment `a`-`b`
fn distance_to_segment(p: Point3D, a: Point3D, b: Point3D) -> Float {
    let ab = b - a;
    let l2 = ab * ab;
    if l2 < 1e-24 {
        return (p - a).length();
    }
    let t = (((p - a) * ab) / l2).clamp(0., 1.);
    (p - (a + ab * t)).length()
}

/// The edges that belong to a single triangle, i.e., the outline of the mesh
/// (including the outline of any hole in it).
fn boundary_edges(triangles: &[Triangle]) -> Vec<(Point3D, Point3D)> {
    let edges: Vec<(Point3D, Point3D)> = triangles
        .iter()
        .flat_map(|[a, b, c]| [(*a, *b), (*b, *c), (*c, *a)])
        .collect();
    let same = |p: Point3D, q: Point3D| (p - q).length() < VERTEX_EPS;

    edges
        .iter()
        .filter(|(a, b)| {
            edges
                .iter()
                .filter(|(c, d)| (same(*a, *c) && same(*b, *d)) || (same(*a, *d) && same(*b, *c)))
                .count()
                == 1
        })
        .copied()
        .collect()
}

/// Checks whether the corner at `b` turns the way `normal` says the
/// polygon turns. Collinear corners are not convex.
fn is_corner_convex(a: Point3D, b: Point3D, c: Point3D, normal: Vector3D) -> bool {
    let ab = b - a;
    let bc = c - b;
    ab.cross(bc) * normal > 1e-12 * ab.length() * bc.length()
}

/// Checks whether `p` is inside the triangle `a`, `b`, `c` (edges included),
/// assuming they are all on the plane with the given `normal`
fn is_inside_triangle(p: Point3D, [a, b, c]: Triangle, normal: Vector3D) -> bool {
    [(a, b), (b, c), (c, a)]
        .iter()
        .all(|(from, to)| (*to - *from).cross(p - *from) * normal >= -1e-12)
}

/// Splits a simple planar polygon into triangles by cutting
/// ears. `normal` must follow the order of the vertices.
///
/// Returns `None` if the polygon runs out of ears, which happens
/// when it intersects itself.
fn ear_clip(vertices: &[Point3D], normal: Vector3D) -> Option<Vec<Triangle>> {
    let mut remaining: Vec<Point3D> = vertices.to_vec();
    let mut triangles: Vec<Triangle> = Vec::with_capacity(vertices.len().saturating_sub(2));
    let mut pos = 0;
    let mut fails = 0;

    while remaining.len() > 3 {
        let n = remaining.len();
        if fails > n {
            return None;
        }
        pos %= n;
        let ear = [remaining[(pos + n - 1) % n], remaining[pos], remaining[(pos + 1) % n]];
        let is_ear = is_corner_convex(ear[0], ear[1], ear[2], normal)
            && !remaining.iter().any(|p| {
                // Repeated vertices (e.g., the bridge into a hole) are fine
                ear.iter().all(|q| (*p - *q).length() > VERTEX_EPS) && is_inside_triangle(*p, ear, normal)
            });

        if is_ear {
            triangles.push(ear);
            remaining.remove(pos);
            fails = 0;
        } else {
            fails += 1;
            pos += 1;
        }
    }
    if let &[a, b, c] = remaining.as_slice() {
        triangles.push([a, b, c]);
    }
    Some(triangles)
}

/// An axis-aligned box
#[derive(Debug, Clone, Copy)]
pub struct BoundingBox {
    /// The smallest coordinates
    pub min: Point3D,
    /// The largest coordinates
    pub max: Point3D,
}

impl BoundingBox {
    /// The smallest box containing all the points
    pub fn from_points(points: &[Point3D]) -> Option<Self> {
        let first = points.first()?;
        let (mut min, mut max) = (*first, *first);
        for p in points.iter().skip(1) {
            min = Point3D::new(min.x.min(p.x), min.y.min(p.y), min.z.min(p.z));
            max = Point3D::new(max.x.max(p.x), max.y.max(p.y), max.z.max(p.z));
        }
        Some(Self { min, max })
    }

    /// Checks whether this box overlaps with the box containing `points`
    pub fn overlaps_points(&self, points: &[Point3D]) -> bool {
        match Self::from_points(points) {
            Some(other) => self.overlaps(&other),
            None => false,
        }
    }

    /// Checks whether two boxes overlap (touching counts)
    pub fn overlaps(&self, other: &BoundingBox) -> bool {
        const TOL: Float = 1e-9;
        self.min.x <= other.max.x + TOL
            && other.min.x <= self.max.x + TOL
            && self.min.y <= other.max.y + TOL
            && other.min.y <= self.max.y + TOL
            && self.min.z <= other.max.z + TOL
            && other.min.z <= self.max.z + TOL
    }

    /// Slab test. Checks whether `origin + direction * t`, for `t` in `[0, t_max]`,
    /// goes through the box
    pub fn hit_by(&self, origin: Point3D, direction: Vector3D, t_max: Float) -> bool {
        const TOL: Float = 1e-9;
        let mut t0: Float = 0.0;
        let mut t1 = t_max;
        let axes = [
            (origin.x, direction.x, self.min.x, self.max.x),
            (origin.y, direction.y, self.min.y, self.max.y),
            (origin.z, direction.z, self.min.z, self.max.z),
        ];
        for (o, d, lo, hi) in axes {
            if d.abs() < 1e-15 {
                if o < lo - TOL || o > hi + TOL {
                    return false;
                }
                continue;
            }
            let (mut near, mut far) = ((lo - TOL - o) / d, (hi + TOL - o) / d);
            if near > far {
                std::mem::swap(&mut near, &mut far);
            }
            t0 = t0.max(near);
            t1 = t1.min(far);
            if t0 > t1 {
                return false;
            }
        }
        true
    }
}

/// An opaque surface that can shade a window.
///
/// It is stored as a list of triangles. There is no relation between
/// obstructions and windows... they are just things around.
#[derive(Debug, Clone)]
pub struct ObstructionSurface {
    triangles: Vec<Triangle>,
    boundary: Vec<(Point3D, Point3D)>,
    bbox: BoundingBox,
}

impl ObstructionSurface {
    /// Triangles with a smaller area are dropped.
    const MIN_TRIANGLE_AREA: Float = 1e-12;

    /// Creates a surface from a triangle mesh.
    pub fn from_triangles(triangles: Vec<Triangle>) -> Result<Self> {
        let finite = triangles
            .iter()
            .flatten()
            .all(|p| p.x.is_finite() && p.y.is_finite() && p.z.is_finite());
        if !finite {
            return Err(ShadingError::NonFinite("Obstruction"));
        }

        let triangles: Vec<Triangle> = triangles
            .into_iter()
            .filter(|[a, b, c]| (*b - *a).cross(*c - *a).length() / 2. > Self::MIN_TRIANGLE_AREA)
            .collect();

        let vertices: Vec<Point3D> = triangles.iter().flatten().copied().collect();
        let bbox = BoundingBox::from_points(&vertices).ok_or(ShadingError::ZeroArea("Obstruction"))?;

        let boundary = boundary_edges(&triangles);

        Ok(Self {
            triangles,
            boundary,
            bbox,
        })
    }

    /// Creates a surface from a planar polygon, which may be concave.
    pub fn from_polygon(vertices: &[Point3D], planarity_tolerance: Float) -> Result<Self> {
        if vertices.len() < 3 {
            return Err(ShadingError::TooFewVertices(vertices.len()));
        }
        let plane = PolygonPlane::fit(vertices).ok_or(ShadingError::ZeroArea("Obstruction"))?;
        if plane.deviation > planarity_tolerance {
            return Err(ShadingError::NonPlanar {
                what: "Obstruction",
                deviation: plane.deviation,
                tolerance: planarity_tolerance,
            });
        }

        let triangles =
            ear_clip(vertices, plane.normal).ok_or(ShadingError::FailedTriangulation("Obstruction"))?;
        Self::from_triangles(triangles)
    }

    /// The triangles in this surface
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// The box containing the surface
    pub fn bounding_box(&self) -> &BoundingBox {
        &self.bbox
    }

    /// Checks whether the segment between `start` and `end` hits the surface,
    /// touching its outline included. A touch of the outline that lies on any
    /// of the `ignored` segments (e.g., the edges of the window being analysed,
    /// which bound the opening of its host wall) does not count.
    pub fn hit_by_segment(
        &self,
        start: Point3D,
        end: Point3D,
        ignored: &[(Point3D, Point3D)],
    ) -> bool {
        const TOL: Float = 1e-9;
        const OUTLINE_TOL: Float = 1e-7;
        let dir = end - start;
        if !self.bbox.hit_by(start, dir, 1.0) {
            return false;
        }
        let near = |p: Point3D, edges: &[(Point3D, Point3D)]| {
            edges
                .iter()
                .any(|(a, b)| distance_to_segment(p, *a, *b) < OUTLINE_TOL)
        };
        self.triangles
            .iter()
            .filter_map(|tri| intersect_triangle(start, dir, tri))
            .filter(|t| (-TOL..=1. + TOL).contains(t))
            .map(|t| start + dir * t)
            .any(|p| !(near(p, ignored) && near(p, &self.boundary)))
    }

    /// Checks whether a ray hits this surface
    pub fn hit_by_ray(&self, ray: &Ray3D) -> bool {
        if !self.bbox.hit_by(ray.origin, ray.direction, Float::MAX) {
            return false;
        }
        self.triangles.iter().any(|tri| {
            matches!(
                intersect_triangle(ray.origin, ray.direction, tri),
                Some(t) if t > MIN_T
            )
        })
    }
}

/// The immutable set of opaque surfaces considered in an analysis.
#[derive(Debug, Clone, Default)]
pub struct ObstructionScene {
    surfaces: Vec<ObstructionSurface>,
}

impl ObstructionScene {
    /// Creates a new scene
    pub fn new(surfaces: Vec<ObstructionSurface>) -> Self {
        Self { surfaces }
    }

    /// A scene with nothing in it
    pub fn empty() -> Self {
        Self::default()
    }

    /// The surfaces in the scene
    pub fn surfaces(&self) -> &[ObstructionSurface] {
        &self.surfaces
    }

    /// The number of surfaces
    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    /// Checks whether there are no surfaces in the scene
    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    /// Checks whether a ray hits anything in the scene
    pub fn is_blocked(&self, ray: &Ray3D) -> bool {
        self.surfaces.iter().any(|s| s.hit_by_ray(ray))
    }
}

impl FromIterator<ObstructionSurface> for ObstructionScene {
    fn from_iter<I: IntoIterator<Item = ObstructionSurface>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
