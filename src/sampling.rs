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

use crate::search::unit;
use crate::window::Window;
use crate::Float;
use geometry3d::{Point3D, Ray3D, Vector3D};

/// A point on a window from which rays are sent to the sky
#[derive(Debug, Clone, Copy)]
pub struct SamplePoint {
    /// Where the rays start
    pub point: Point3D,
    /// The outward normal of the piece of window this point represents
    pub normal: Vector3D,
    /// The area of the piece of window this point represents
    pub area: Float,
}

impl SamplePoint {
    /// A ray leaving this sample in `direction`
    pub fn ray(&self, direction: Vector3D) -> Ray3D {
        Ray3D {
            origin: self.point,
            direction,
        }
    }
}

/// Bilinear interpolation over the window, with `u` running along the
/// bottom edge and `v` along the left one.
fn bilinear(window: &Window, u: Float, v: Float) -> Point3D {
    let [bl, br, tr, tl] = *window.corners();
    bl + (br - bl) * (u * (1. - v)) + (tr - bl) * (u * v) + (tl - bl) * ((1. - u) * v)
}

/// The number of cells along the bottom and the left edges of the window
pub(crate) fn grid_resolution(window: &Window, grid_size: Float) -> (usize, usize) {
    let [bl, br, tr, tl] = *window.corners();
    let width = (br - bl).length().max((tr - tl).length());
    let height = (tl - bl).length().max((tr - br).length());
    // `as` saturates, so absurd grids do not wrap around
    let nu = ((width / grid_size).ceil() as usize).max(1);
    let nv = ((height / grid_size).ceil() as usize).max(1);
    (nu, nv)
}

/// Splits a window into cells of roughly `grid_size` by `grid_size` and returns
/// one [`SamplePoint`] per cell.
///
/// Samples are placed in the centre of each cell, so they never sit on the
/// boundary of the window, and lifted `ray_offset` along the outward normal
/// to avoid self-intersections.
pub(crate) fn tessellate(window: &Window, grid_size: Float, ray_offset: Float) -> Vec<SamplePoint> {
    let (nu, nv) = grid_resolution(window, grid_size);
    let window_normal = window.normal();

    (0..nv)
        .flat_map(|j| (0..nu).map(move |i| (i, j)))
        .map(|(i, j)| {
            let (u0, u1) = (i as Float / nu as Float, (i + 1) as Float / nu as Float);
            let (v0, v1) = (j as Float / nv as Float, (j + 1) as Float / nv as Float);
            let c00 = bilinear(window, u0, v0);
            let c10 = bilinear(window, u1, v0);
            let c11 = bilinear(window, u1, v1);
            let c01 = bilinear(window, u0, v1);

            // Area of a quadrilateral is half the cross product of its diagonals
            let cross = (c11 - c00).cross(c01 - c10);
            let area = cross.length() / 2.;
            let normal = match unit(cross) {
                Some(n) if n * window_normal >= 0.0 => n,
                Some(n) => n * -1.,
                None => window_normal,
            };

            let centre = bilinear(window, (u0 + u1) / 2., (v0 + v1) / 2.);
            SamplePoint {
                point: centre + normal * ray_offset,
                normal,
                area,
            }
        })
        .collect()
}

#[cfg(test)]
mod testing {
    use super::*;
    use validate::assert_close;

    fn window() -> Window {
        Window::new(
            [
                Point3D::new(0., 0., 0.),
                Point3D::new(1., 0., 0.),
                Point3D::new(1., 0., 1.5),
                Point3D::new(0., 0., 1.5),
            ],
            Vector3D::new(0., -1., 0.),
            0.0,
            0.01,
        )
        .unwrap()
    }

    #[test]
    fn test_tessellate() {
        let w = window();
        let samples = tessellate(&w, 0.5, 0.001);
        // 2 by 3 cells
        assert_eq!(samples.len(), 6);
        let total: Float = samples.iter().map(|s| s.area).sum();
        assert_close!(total, w.area(), 1e-9);
        for s in &samples {
            assert_close!(s.normal.y, -1., 1e-9);
            assert_close!(s.point.y, -0.001, 1e-9);
            assert!(s.point.x > 0.0 && s.point.x < 1.0);
            assert!(s.point.z > 0.0 && s.point.z < 1.5);
        }
    }

    #[test]
    fn test_coarse_grid() {
        let w = window();
        let samples = tessellate(&w, 10., 0.0);
        assert_eq!(samples.len(), 1);
        assert_close!(samples[0].point.x, 0.5, 1e-9);
        assert_close!(samples[0].point.z, 0.75, 1e-9);
        assert_close!(samples[0].area, 1.5, 1e-9);
    }
}
