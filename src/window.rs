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
use crate::scene::{ObstructionScene, ObstructionSurface, Triangle};
use crate::search::{midpoint, unit, PolygonPlane};
use crate::Float;
use geometry3d::{Point3D, Vector3D};
use serde::{Deserialize, Serialize};

/// The four edges of a window, as seen from the outside
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WindowEdge {
    /// From the top-left to the bottom-left corner
    Left,
    /// From the bottom-right to the top-right corner
    Right,
    /// From the bottom-left to the bottom-right corner
    Bottom,
    /// From the top-right to the top-left corner
    Top,
}

/// A window: a planar quadrilateral installed some depth
/// behind the face of its host wall.
#[derive(Debug, Clone)]
pub struct Window {
    /// Bottom-left, bottom-right, top-right and top-left, as seen from outside
    corners: [Point3D; 4],
    normal: Vector3D,
    centroid: Point3D,
    recess_depth: Float,
    area: Float,
}

impl Window {
    /// Creates a new window.
    ///
    /// The `corners` are ordered bottom-left, bottom-right, top-right and top-left
    /// as seen from the outside, and `normal` points outwards. The normal does not need
    /// to be a unit vector, but it has to agree with the order of the corners.
    /// `recess_depth` is the distance between the glazing and the face of the host wall.
    pub fn new(
        corners: [Point3D; 4],
        normal: Vector3D,
        recess_depth: Float,
        planarity_tolerance: Float,
    ) -> Result<Self> {
        let finite = corners
            .iter()
            .all(|p| p.x.is_finite() && p.y.is_finite() && p.z.is_finite())
            && normal.x.is_finite()
            && normal.y.is_finite()
            && normal.z.is_finite();
        if !finite {
            return Err(ShadingError::NonFinite("Window"));
        }
        if !recess_depth.is_finite() || recess_depth < 0.0 {
            return Err(ShadingError::NegativeRecess(recess_depth));
        }
        let normal = unit(normal).ok_or(ShadingError::DegenerateNormal("Window"))?;

        let plane = PolygonPlane::fit(&corners).ok_or(ShadingError::ZeroArea("Window"))?;
        if plane.area < 1e-9 {
            return Err(ShadingError::ZeroArea("Window"));
        }
        if plane.deviation > planarity_tolerance {
            return Err(ShadingError::NonPlanar {
                what: "Window",
                deviation: plane.deviation,
                tolerance: planarity_tolerance,
            });
        }
        let cos = plane.normal * normal;
        if cos < 0.5 {
            return Err(ShadingError::InconsistentNormal(cos));
        }

        Ok(Self {
            corners,
            normal,
            centroid: plane.centroid,
            recess_depth,
            area: plane.area,
        })
    }

    /// Creates a window whose outward normal is derived from the order
    /// of its corners
    pub fn from_corners(corners: [Point3D; 4], recess_depth: Float, planarity_tolerance: Float) -> Result<Self> {
        let normal = PolygonPlane::fit(&corners)
            .map(|p| p.normal)
            .ok_or(ShadingError::ZeroArea("Window"))?;
        Self::new(corners, normal, recess_depth, planarity_tolerance)
    }

    /// Bottom-left, bottom-right, top-right and top-left corners, as seen from outside
    pub fn corners(&self) -> &[Point3D; 4] {
        &self.corners
    }

    /// The outward unit normal
    pub fn normal(&self) -> Vector3D {
        self.normal
    }

    /// The centroid of the glazing
    pub fn centroid(&self) -> Point3D {
        self.centroid
    }

    /// The distance between the glazing and the face of the host wall
    pub fn recess_depth(&self) -> Float {
        self.recess_depth
    }

    /// The area of the glazing
    pub fn area(&self) -> Float {
        self.area
    }

    /// The start and end of an edge
    pub fn edge(&self, edge: WindowEdge) -> (Point3D, Point3D) {
        let [bl, br, tr, tl] = self.corners;
        match edge {
            WindowEdge::Left => (tl, bl),
            WindowEdge::Right => (br, tr),
            WindowEdge::Bottom => (bl, br),
            WindowEdge::Top => (tr, tl),
        }
    }

    /// The four edges, in the order left, right, bottom and top
    pub fn edges(&self) -> [(Point3D, Point3D); 4] {
        [
            self.edge(WindowEdge::Left),
            self.edge(WindowEdge::Right),
            self.edge(WindowEdge::Bottom),
            self.edge(WindowEdge::Top),
        ]
    }

    /// The midpoint of an edge
    pub fn edge_midpoint(&self, edge: WindowEdge) -> Point3D {
        let (a, b) = self.edge(edge);
        midpoint(a, b)
    }

    /// The unit vector going from the centroid to the midpoint of an edge.
    ///
    /// This is "up" for the [`WindowEdge::Top`] and "sideways" for the
    /// [`WindowEdge::Left`] and [`WindowEdge::Right`], also for tilted windows.
    pub fn direction_to(&self, edge: WindowEdge) -> Option<Vector3D> {
        unit(self.edge_midpoint(edge) - self.centroid)
    }

    /// A copy of the window moved by `displacement`
    pub fn translated(&self, displacement: Vector3D) -> Self {
        Self {
            corners: self.corners.map(|p| p + displacement),
            centroid: self.centroid + displacement,
            ..self.clone()
        }
    }

    /// The window as two triangles
    pub fn triangles(&self) -> [Triangle; 2] {
        let [bl, br, tr, tl] = self.corners;
        [[bl, br, tr], [bl, tr, tl]]
    }

    /// A copy of this window moved `offset` behind the glazing, as a
    /// scene. Nothing in front of the window can hit it, so it works
    /// as a guaranteed-clear backdrop.
    pub fn backdrop(&self, offset: Float) -> Result<ObstructionScene> {
        let moved = self.translated(self.normal * (-offset));
        let surface = ObstructionSurface::from_triangles(moved.triangles().to_vec())?;
        Ok(ObstructionScene::new(vec![surface]))
    }
}
