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
use crate::search::unit;
use crate::Float;
use geometry3d::Vector3D;

/// A patch of the sky
#[derive(Debug, Clone, Copy)]
pub struct SkyPatch {
    /// Unit vector pointing from the ground towards the patch
    pub direction: Vector3D,
    /// Combined (direct + diffuse) irradiance coming from this patch
    /// during the analysis period (e.g., kWh/m2)
    pub irradiance: Float,
}

/// A discretized sky for a certain analysis period (e.g., winter or summer).
///
/// It is produced by a sky-matrix generator, which is not part of this crate. The
/// directions are assumed to be already rotated according to the project's north.
#[derive(Debug, Clone)]
pub struct SkyDome {
    patches: Vec<SkyPatch>,
}

impl SkyDome {
    /// Builds a `SkyDome` from `(direction, irradiance)` pairs. Directions are normalized.
    pub fn new(patches: Vec<(Vector3D, Float)>) -> Result<Self> {
        let patches = patches
            .into_iter()
            .enumerate()
            .map(|(index, (direction, irradiance))| {
                if !irradiance.is_finite() || irradiance < 0.0 {
                    return Err(ShadingError::InvalidSkyPatch {
                        index,
                        reason: format!("irradiance must be finite and non-negative... found {}", irradiance),
                    });
                }
                let direction = unit(direction).ok_or_else(|| ShadingError::InvalidSkyPatch {
                    index,
                    reason: "direction has no length".into(),
                })?;
                Ok(SkyPatch {
                    direction,
                    irradiance,
                })
            })
            .collect::<Result<Vec<SkyPatch>>>()?;
        Ok(Self { patches })
    }

    /// The patches of this sky
    pub fn patches(&self) -> &[SkyPatch] {
        &self.patches
    }

    /// The number of patches
    pub fn len(&self) -> usize {
        self.patches.len()
    }

    /// Checks whether there are no patches
    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }
}

#[cfg(test)]
mod testing {
    use super::*;
    use validate::assert_close;

    #[test]
    fn test_new() {
        let sky = SkyDome::new(vec![
            (Vector3D::new(0., 0., 2.), 10.),
            (Vector3D::new(0., -1., 1.), 5.),
        ])
        .unwrap();
        assert_eq!(sky.len(), 2);
        assert_close!(sky.patches()[0].direction.z, 1., 1e-12);
        assert_close!(sky.patches()[1].direction.length(), 1., 1e-12);
    }

    #[test]
    fn test_invalid() {
        let r = SkyDome::new(vec![
            (Vector3D::new(0., 0., 1.), 10.),
            (Vector3D::new(0., 0., 0.), 5.),
        ]);
        assert!(matches!(r, Err(ShadingError::InvalidSkyPatch { index: 1, .. })));

        let r = SkyDome::new(vec![(Vector3D::new(0., 0., 1.), -1.)]);
        assert!(matches!(r, Err(ShadingError::InvalidSkyPatch { index: 0, .. })));
    }
}
