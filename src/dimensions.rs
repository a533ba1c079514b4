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

//! The simplified geometric method describes the obstructions around a window with
//! four pairs of numbers:
//!
//! * **Horizon**: how much a tall, distant obstruction blocks the sky in front of the window.
//! * **Overhang**: objects directly above the window.
//! * **Reveals**: the jambs at each side of the window.
//!
//! Each one is found by the same procedure. Two half-lines leave a point on the window,
//! spanning a planar region (a [`SearchQuadrant`]). A cheap test discards the obstructions
//! that cannot matter, the rest are cut with the region, and each intersection point
//! is ranked by the angle it forms with the window's normal. Each obstruction nominates its
//! best point, and the best of those is the result.

use crate::error::{Result, ShadingError};
use crate::options::ShadingOptions;
use crate::scene::{ObstructionScene, ObstructionSurface};
use crate::search::{angle_from_normal, other_leg, Candidate, SearchQuadrant};
use crate::window::{Window, WindowEdge};
use crate::Float;
use geometry3d::{Point3D, Vector3D};
use serde::{Deserialize, Serialize};

/// An obstruction in front of the window, blocking the low sky
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Horizon {
    /// Height of the obstruction above the bottom of the window
    pub height: Float,
    /// Horizontal distance between the window and the obstruction
    pub distance: Float,
}

/// An obstruction above the window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Overhang {
    /// Height of the overhang above the top of the window
    pub vertical_offset: Float,
    /// How far the overhang projects from the glazing
    pub horizontal_offset: Float,
}

/// An obstruction at one side of the window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reveal {
    /// Distance between the edge of the glazing and the obstruction, sideways
    pub offset: Float,
    /// How far the obstruction projects from the glazing
    pub distance: Float,
}

/// Any of the dimension pairs
pub trait DimensionPair {
    /// The two components of the pair
    fn legs(&self) -> (Float, Float);

    /// The length of the line between the search origin and the selected point
    fn hypotenuse(&self) -> Float {
        let (a, b) = self.legs();
        (a * a + b * b).sqrt()
    }
}

impl DimensionPair for Horizon {
    fn legs(&self) -> (Float, Float) {
        (self.height, self.distance)
    }
}

impl DimensionPair for Overhang {
    fn legs(&self) -> (Float, Float) {
        (self.vertical_offset, self.horizontal_offset)
    }
}

impl DimensionPair for Reveal {
    fn legs(&self) -> (Float, Float) {
        (self.offset, self.distance)
    }
}

/// A line used during the search. For debugging and visual checks only.
#[derive(Debug, Clone, Copy)]
pub struct TestLine {
    /// Start
    pub start: Point3D,
    /// End
    pub end: Point3D,
}

/// What a single search looked at. For debugging and visual checks only.
#[derive(Debug, Clone)]
pub struct SearchDiagnostics {
    /// From the search origin to the selected point or, if nothing was
    /// found, the default probe of the search
    pub test_line: TestLine,
    /// The best point of each obstruction considered
    pub candidates: Vec<Point3D>,
}

/// The diagnostics of the four searches
#[derive(Debug, Clone)]
pub struct DimensionDiagnostics {
    /// The Horizon search
    pub horizon: SearchDiagnostics,
    /// The Overhang search
    pub overhang: SearchDiagnostics,
    /// The search for the left reveal
    pub reveal_left: SearchDiagnostics,
    /// The search for the right reveal
    pub reveal_right: SearchDiagnostics,
}

/// The shading dimensions of a window.
///
/// `None` means that no obstruction was found, which is a valid result
/// and different from a dimension of zero.
#[derive(Debug, Clone, Serialize)]
pub struct ShadingDimensionResult {
    /// Horizon
    pub horizon: Option<Horizon>,
    /// Overhang
    pub overhang: Option<Overhang>,
    /// Reveal at the left of the window (seen from outside)
    pub reveal_left: Option<Reveal>,
    /// Reveal at the right of the window (seen from outside)
    pub reveal_right: Option<Reveal>,
    /// What the searches looked at
    #[serde(skip)]
    pub diagnostics: DimensionDiagnostics,
}

/// The outcome of a search
struct Found {
    origin: Point3D,
    point: Option<Point3D>,
    default_line: TestLine,
    candidates: Vec<Candidate>,
}

impl Found {
    fn diagnostics(&self) -> SearchDiagnostics {
        SearchDiagnostics {
            test_line: match self.point {
                Some(end) => TestLine {
                    start: self.origin,
                    end,
                },
                None => self.default_line,
            },
            candidates: self.candidates.iter().map(|c| c.point).collect(),
        }
    }
}

/// Ranks the points where `surface` meets the `quadrant`, keeping
/// only those that `accept` likes.
fn rank(
    quadrant: &SearchQuadrant,
    surface: &ObstructionSurface,
    normal: Vector3D,
    degenerate_length: Float,
    accept: impl Fn(&Candidate) -> bool,
) -> Vec<Candidate> {
    let origin = quadrant.origin();
    quadrant
        .section(surface)
        .into_iter()
        .filter_map(|point| {
            let v = point - origin;
            angle_from_normal(v, normal, degenerate_length).map(|angle| Candidate {
                point,
                angle,
                distance: v.length(),
            })
        })
        .filter(|c| accept(c))
        .collect()
}

/// Finds the horizon. The search starts at the middle of the bottom edge and
/// looks in the plane spanned by the normal and the vertical.
fn search_horizon(window: &Window, scene: &ObstructionScene, search_limit: Float, options: &ShadingOptions) -> Found {
    let origin = window.edge_midpoint(WindowEdge::Bottom);
    let normal = window.normal();
    let up = Vector3D::new(0., 0., 1.);
    let horizontal_end = origin + normal * search_limit;
    // The opening of a flush host wall is not an obstruction
    let own_edges = window.edges();

    let mut found = Found {
        origin,
        point: None,
        default_line: TestLine {
            start: origin,
            end: horizontal_end,
        },
        candidates: Vec::new(),
    };

    // Windows facing straight up or down have no horizon
    let quadrant = match SearchQuadrant::new(origin, normal, up, search_limit, search_limit) {
        Some(q) => q,
        None => return found,
    };

    found.candidates = scene
        .surfaces()
        .iter()
        .filter(|s| s.hit_by_segment(origin, horizontal_end, &own_edges))
        .filter_map(|s| Candidate::steepest(rank(&quadrant, s, normal, options.degenerate_length, |_| true)))
        .collect();
    found.point = Candidate::steepest(found.candidates.iter().copied()).map(|c| c.point);
    found
}

/// Finds the overhang. The search starts at the middle of the top edge and
/// looks in the plane spanned by the normal and the window's own "up".
fn search_overhang(window: &Window, scene: &ObstructionScene, search_limit: Float, options: &ShadingOptions) -> Found {
    let origin = window.edge_midpoint(WindowEdge::Top);
    let normal = window.normal();

    let mut found = Found {
        origin,
        point: None,
        default_line: TestLine {
            start: origin,
            end: origin + normal * search_limit,
        },
        candidates: Vec::new(),
    };

    let up = match window.direction_to(WindowEdge::Top) {
        Some(v) => v,
        None => return found,
    };
    found.default_line.end = origin + up * search_limit;

    // Only things that are literally overhanging... not the facade
    // in front or the ground.
    let swath_depth = window.recess_depth() + options.overhang_swath_margin;
    let swath = SearchQuadrant::new(origin, normal, up, swath_depth, search_limit);
    let quadrant = SearchQuadrant::new(origin, normal, up, search_limit, search_limit);
    let (swath, quadrant) = match (swath, quadrant) {
        (Some(s), Some(q)) => (s, q),
        _ => return found,
    };

    let min_angle = options.min_overhang_angle.to_radians();
    // A host wall flush with the glazing is not an overhang
    let max_angle = options.max_overhang_angle.to_radians();
    found.candidates = scene
        .surfaces()
        .iter()
        .filter(|s| swath.touches(s))
        .filter_map(|s| {
            Candidate::shallowest(rank(&quadrant, s, normal, options.degenerate_length, |c| {
                c.angle >= min_angle && c.angle <= max_angle
            }))
        })
        .collect();
    found.point = Candidate::shallowest(found.candidates.iter().copied()).map(|c| c.point);
    found
}

/// Finds the reveal at one side of the window. The search starts at the middle of
/// the side edge and looks in the plane spanned by the normal and that side.
fn search_reveal(
    window: &Window,
    side: WindowEdge,
    scene: &ObstructionScene,
    search_limit: Float,
    options: &ShadingOptions,
) -> Found {
    let origin = window.edge_midpoint(side);
    let normal = window.normal();

    let mut found = Found {
        origin,
        point: None,
        default_line: TestLine {
            start: origin,
            end: origin + normal * search_limit,
        },
        candidates: Vec::new(),
    };

    let sideways = match window.direction_to(side) {
        Some(v) => v,
        None => return found,
    };

    let probe_start = origin + normal * options.reveal_probe_offset;
    let probe_end = probe_start + sideways * options.reveal_probe_length;
    found.default_line = TestLine {
        start: probe_start,
        end: probe_end,
    };

    let quadrant = match SearchQuadrant::new(origin, normal, sideways, search_limit, search_limit) {
        Some(q) => q,
        None => return found,
    };

    let max_angle = options.max_reveal_angle.to_radians();
    let own_edges = window.edges();
    found.candidates = scene
        .surfaces()
        .iter()
        .filter(|s| s.hit_by_segment(probe_start, probe_end, &own_edges))
        .filter_map(|s| {
            Candidate::shallowest(rank(&quadrant, s, normal, options.degenerate_length, |c| {
                c.angle <= max_angle
            }))
        })
        .collect();
    found.point = Candidate::shallowest(found.candidates.iter().copied()).map(|c| c.point);
    found
}

/// Calculates the Horizon, Overhang and Reveal dimensions of `window`, considering only
/// the obstructions within `search_limit`. The argument is used instead of
/// [`ShadingOptions::search_limit`], which only matters to [`crate::ShadingAnalysis`].
///
/// This only fails if `search_limit` is not a positive number. Use
/// [`ShadingOptions::check_search_limit`] to find out whether the
/// search limit is reasonable.
pub fn compute(
    window: &Window,
    obstructions: &ObstructionScene,
    search_limit: Float,
    options: &ShadingOptions,
) -> Result<ShadingDimensionResult> {
    if !search_limit.is_finite() || search_limit <= 0.0 {
        return Err(ShadingError::InvalidSearchLimit(search_limit));
    }

    let horizon = search_horizon(window, obstructions, search_limit, options);
    let overhang = search_overhang(window, obstructions, search_limit, options);
    let reveal_left = search_reveal(window, WindowEdge::Left, obstructions, search_limit, options);
    let reveal_right = search_reveal(window, WindowEdge::Right, obstructions, search_limit, options);

    let normal = window.normal();
    let ret = ShadingDimensionResult {
        horizon: horizon.point.map(|p| {
            let v = p - horizon.origin;
            let height = p.z - horizon.origin.z;
            Horizon {
                height,
                distance: other_leg(v.length(), height),
            }
        }),
        overhang: overhang.point.map(|p| {
            let v = p - overhang.origin;
            let vertical_offset = p.z - overhang.origin.z;
            Overhang {
                vertical_offset,
                horizontal_offset: other_leg(v.length(), vertical_offset),
            }
        }),
        reveal_left: reveal(&reveal_left, window.direction_to(WindowEdge::Left)),
        reveal_right: reveal(&reveal_right, window.direction_to(WindowEdge::Right)),
        diagnostics: DimensionDiagnostics {
            horizon: horizon.diagnostics(),
            overhang: overhang.diagnostics(),
            reveal_left: reveal_left.diagnostics(),
            reveal_right: reveal_right.diagnostics(),
        },
    };

    tracing::debug!(
        normal = ?(normal.x, normal.y, normal.z),
        horizon = ?ret.horizon,
        overhang = ?ret.overhang,
        reveal_left = ?ret.reveal_left,
        reveal_right = ?ret.reveal_right,
        "Calculated shading dimensions"
    );
    Ok(ret)
}

fn reveal(found: &Found, sideways: Option<Vector3D>) -> Option<Reveal> {
    let p = found.point?;
    let sideways = sideways?;
    let v = p - found.origin;
    let offset = v * sideways;
    Some(Reveal {
        offset,
        distance: other_leg(v.length(), offset),
    })
}

#[cfg(test)]
mod testing {
    use super::*;
    use validate::assert_close;

    /// 1 by 1 window on the plane y = 0, facing -y, sill at z = 0
    fn window(recess: Float) -> Window {
        Window::new(
            [
                Point3D::new(0., 0., 0.),
                Point3D::new(1., 0., 0.),
                Point3D::new(1., 0., 1.),
                Point3D::new(0., 0., 1.),
            ],
            Vector3D::new(0., -1., 0.),
            recess,
            0.01,
        )
        .unwrap()
    }

    fn rectangle(corners: [(Float, Float, Float); 4]) -> ObstructionSurface {
        let v: Vec<Point3D> = corners.iter().map(|(x, y, z)| Point3D::new(*x, *y, *z)).collect();
        ObstructionSurface::from_polygon(&v, 1e-6).unwrap()
    }

    #[test]
    fn test_empty_scene() {
        let r = compute(&window(0.1), &ObstructionScene::empty(), 99., &ShadingOptions::default()).unwrap();
        assert!(r.horizon.is_none());
        assert!(r.overhang.is_none());
        assert!(r.reveal_left.is_none());
        assert!(r.reveal_right.is_none());

        // The horizon test line defaults to the horizontal half-line
        let line = r.diagnostics.horizon.test_line;
        assert_close!(line.end.y, -99., 1e-9);
        assert_close!(line.end.z, 0., 1e-9);
    }

    #[test]
    fn test_horizon_right_triangle() {
        // A wall 5 away, 3 high
        let wall = rectangle([(-10., -5., -1.), (10., -5., -1.), (10., -5., 3.), (-10., -5., 3.)]);
        let scene = ObstructionScene::new(vec![wall]);
        let r = compute(&window(0.0), &scene, 99., &ShadingOptions::default()).unwrap();
        let h = r.horizon.unwrap();
        assert_close!(h.height, 3., 1e-9);
        assert_close!(h.distance, 5., 1e-9);
        assert_close!(h.hypotenuse(), 34f64.sqrt() as Float, 1e-6);
        assert_eq!(r.diagnostics.horizon.candidates.len(), 1);
    }

    #[test]
    fn test_overhang() {
        // A slab 0.5 above the window top, projecting 0.8 from the glazing
        let slab = rectangle([(-1., 0., 1.5), (2., 0., 1.5), (2., -0.8, 1.5), (-1., -0.8, 1.5)]);
        let scene = ObstructionScene::new(vec![slab]);
        let r = compute(&window(0.0), &scene, 99., &ShadingOptions::default()).unwrap();
        let o = r.overhang.unwrap();
        assert_close!(o.vertical_offset, 0.5, 1e-9);
        assert_close!(o.horizontal_offset, 0.8, 1e-9);

        // The slab is not a horizon: the horizontal half-line
        // does not touch it
        assert!(r.horizon.is_none());
    }

    #[test]
    fn test_reveals() {
        // Jambs of a window recessed 0.3
        let left = rectangle([(0., 0., -0.5), (0., -0.3, -0.5), (0., -0.3, 1.5), (0., 0., 1.5)]);
        let right = rectangle([(1., 0., -0.5), (1., 0., 1.5), (1., -0.3, 1.5), (1., -0.3, -0.5)]);
        let scene = ObstructionScene::new(vec![left, right]);
        let r = compute(&window(0.3), &scene, 99., &ShadingOptions::default()).unwrap();

        let l = r.reveal_left.unwrap();
        let rr = r.reveal_right.unwrap();
        assert_close!(l.offset, 0.0, 1e-9);
        assert_close!(l.distance, 0.3, 1e-9);
        assert_close!(l.offset, rr.offset, 1e-9);
        assert_close!(l.distance, rr.distance, 1e-9);
    }

    #[test]
    fn test_invalid_search_limit() {
        let r = compute(&window(0.0), &ObstructionScene::empty(), -1., &ShadingOptions::default());
        assert_eq!(r.unwrap_err(), ShadingError::InvalidSearchLimit(-1.));
    }
}
