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
use crate::options::ShadingOptions;
use crate::scene::{ObstructionScene, ObstructionSurface};
use crate::sky::SkyDome;
use crate::window::Window;
use crate::Float;
use geometry3d::{Point3D, Vector3D};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn point(p: &[Float; 3]) -> Point3D {
    Point3D::new(p[0], p[1], p[2])
}

/// A window, as described by the model
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WindowDescription {
    /// Identifies the window in the results
    pub id: String,

    /// Bottom-left, bottom-right, top-right and top-left corners, as seen from outside
    pub corners: Vec<[Float; 3]>,

    /// The outward normal. Derived from the corners if not given.
    #[serde(default)]
    pub normal: Option<[Float; 3]>,

    /// Distance between the glazing and the face of the wall
    #[serde(default)]
    pub recess_depth: Float,
}

impl WindowDescription {
    /// Builds the [`Window`]
    pub fn build(&self, planarity_tolerance: Float) -> Result<Window> {
        let corners: [Point3D; 4] = match self.corners.as_slice() {
            [a, b, c, d] => [point(a), point(b), point(c), point(d)],
            other => return Err(ShadingError::WrongCornerCount(other.len())),
        };
        match self.normal {
            Some([x, y, z]) => Window::new(corners, Vector3D::new(x, y, z), self.recess_depth, planarity_tolerance),
            None => Window::from_corners(corners, self.recess_depth, planarity_tolerance),
        }
    }
}

/// The geometry of an obstruction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ObstructionGeometry {
    /// A planar polygon without self-intersections
    Polygon {
        /// The vertices, in order
        vertices: Vec<[Float; 3]>,
    },
    /// A triangle mesh
    Mesh {
        /// The triangles
        triangles: Vec<[[Float; 3]; 3]>,
    },
}

/// An obstruction, as described by the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObstructionDescription {
    /// A name, for the logs
    #[serde(default)]
    pub name: Option<String>,

    /// The geometry
    #[serde(flatten)]
    pub geometry: ObstructionGeometry,
}

impl ObstructionDescription {
    /// Builds the [`ObstructionSurface`]
    pub fn build(&self, planarity_tolerance: Float) -> Result<ObstructionSurface> {
        match &self.geometry {
            ObstructionGeometry::Polygon { vertices } => {
                let vertices: Vec<Point3D> = vertices.iter().map(point).collect();
                ObstructionSurface::from_polygon(&vertices, planarity_tolerance)
            }
            ObstructionGeometry::Mesh { triangles } => {
                let triangles = triangles
                    .iter()
                    .map(|[a, b, c]| [point(a), point(b), point(c)])
                    .collect();
                ObstructionSurface::from_triangles(triangles)
            }
        }
    }
}

/// A patch of the sky, as produced by a sky-matrix generator
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatchDescription {
    /// Pointing towards the patch
    pub direction: [Float; 3],
    /// Combined irradiance coming from the patch
    pub irradiance: Float,
}

/// A sky for one analysis period
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SkyDescription {
    /// The patches
    pub patches: Vec<PatchDescription>,
}

impl SkyDescription {
    /// Builds the [`SkyDome`]
    pub fn build(&self) -> Result<SkyDome> {
        SkyDome::new(
            self.patches
                .iter()
                .map(|p| (Vector3D::new(p.direction[0], p.direction[1], p.direction[2]), p.irradiance))
                .collect(),
        )
    }
}

/// Everything needed for analysing the windows of a building
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneDescription {
    /// Options for the calculation
    #[serde(default)]
    pub options: ShadingOptions,

    /// The windows
    pub windows: Vec<WindowDescription>,

    /// The things around the windows
    #[serde(default)]
    pub obstructions: Vec<ObstructionDescription>,

    /// Skies for each analysis period (e.g., "winter" and "summer")
    #[serde(default)]
    pub skies: BTreeMap<String, SkyDescription>,
}

impl SceneDescription {
    /// Builds the [`ObstructionScene`]. Obstructions that cannot be
    /// built are left out and returned along with their index.
    pub fn build_scene(&self) -> (ObstructionScene, Vec<(usize, ShadingError)>) {
        let mut rejected = Vec::new();
        let scene = self
            .obstructions
            .iter()
            .enumerate()
            .filter_map(|(i, o)| match o.build(self.options.planarity_tolerance) {
                Ok(s) => Some(s),
                Err(e) => {
                    tracing::warn!(
                        index = i,
                        name = o.name.as_deref().unwrap_or("unnamed"),
                        error = %e,
                        "Ignoring obstruction"
                    );
                    rejected.push((i, e));
                    None
                }
            })
            .collect();
        (scene, rejected)
    }
}

#[cfg(test)]
mod testing {
    use super::*;

    #[test]
    fn test_deserialize() {
        let json = r#"{
            "options": {"search_limit": 50.0},
            "windows": [
                {"id": "w1", "corners": [[0,0,0],[1,0,0],[1,0,1],[0,0,1]], "recess_depth": 0.1}
            ],
            "obstructions": [
                {"type": "polygon", "name": "neighbour", "vertices": [[-5,-5,-1],[5,-5,-1],[5,-5,3],[-5,-5,3]]},
                {"type": "mesh", "triangles": [[[0,0,0],[1,0,0],[1,1,0]]]},
                {"type": "polygon", "vertices": [[0,0,0],[1,0,0]]}
            ],
            "skies": {"winter": {"patches": [{"direction": [0,-1,1], "irradiance": 10.0}]}}
        }"#;
        let desc: SceneDescription = serde_json::from_str(json).unwrap();
        assert_eq!(desc.options.search_limit, 50.);
        assert_eq!(desc.windows.len(), 1);

        let w = desc.windows[0].build(0.01).unwrap();
        assert!((w.normal().y + 1.).abs() < 1e-9);

        let (scene, rejected) = desc.build_scene();
        assert_eq!(scene.len(), 2);
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].0, 2);

        let sky = desc.skies["winter"].build().unwrap();
        assert_eq!(sky.len(), 1);
    }

    #[test]
    fn test_wrong_corner_count() {
        let desc = WindowDescription {
            id: "triangle".to_string(),
            corners: vec![[0., 0., 0.], [1., 0., 0.], [1., 0., 1.]],
            normal: None,
            recess_depth: 0.0,
        };
        assert_eq!(desc.build(0.01).unwrap_err(), ShadingError::WrongCornerCount(3));
    }
}
