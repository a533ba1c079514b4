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

//! The estimator tessellates the window into sample points and, for each of them, casts
//! a ray towards every patch of the sky. The ray is tested against the obstructions
//! (shaded pass) and against a copy of the window placed just behind the glazing
//! (unshaded pass). That backdrop can never be hit, so both passes share the same
//! ray-testing machinery and differ only in the scene they test against.
//!
//! The (sample, patch) tests are independent. With the `parallel` feature, each sample is
//! processed by a worker of the `rayon` pool, and the totals are only added up once every
//! sample is done.

use crate::error::{Result, ShadingError};
use crate::options::ShadingOptions;
use crate::sampling::{grid_resolution, tessellate, SamplePoint};
use crate::scene::ObstructionScene;
use crate::sky::SkyDome;
use crate::window::Window;
use crate::Float;
use serde::Serialize;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// The energy received by a single sample point
#[derive(Debug, Clone, Copy)]
pub struct SampleRadiation {
    /// The sample
    pub sample: SamplePoint,
    /// Incident energy with obstructions (e.g., kWh)
    pub shaded: Float,
    /// Incident energy without obstructions (e.g., kWh)
    pub unshaded: Float,
}

/// The incident solar energy on a window during an analysis period.
///
/// The shading factor is `shaded_kwh / unshaded_kwh`... this is left for the
/// caller to calculate.
#[derive(Debug, Clone, Serialize)]
pub struct RadiationResult {
    /// Incident energy, considering the obstructions
    pub shaded_kwh: Float,
    /// Incident energy if there were no obstructions
    pub unshaded_kwh: Float,
    /// The contribution of each sample. Only for diagnostics and visualization;
    /// it is kept only when [`ShadingOptions::keep_sample_breakdown`] is set.
    #[serde(skip)]
    pub samples: Option<Vec<SampleRadiation>>,
}

/// Irradiance reaching a sample from all the sky patches that are in front of it and
/// that are not blocked by the `scene`
fn weighted_irradiance(sample: &SamplePoint, sky: &SkyDome, scene: &ObstructionScene) -> Float {
    sky.patches()
        .iter()
        .filter_map(|patch| {
            let cos = sample.normal * patch.direction;
            // Behind the sample
            if cos <= 0.0 {
                return None;
            }
            let blocked = scene.is_blocked(&sample.ray(patch.direction));
            if blocked {
                None
            } else {
                Some(cos * patch.irradiance)
            }
        })
        .sum()
}

/// Calculates the shaded and unshaded incident energy on `window`, tessellated in
/// cells of `grid_size`, during the period represented by `sky`.
///
/// Fails if `grid_size` is not a positive number or if it would split the
/// window into more than [`ShadingOptions::max_samples`] samples.
pub fn compute(
    window: &Window,
    obstructions: &ObstructionScene,
    sky: &SkyDome,
    grid_size: Float,
    options: &ShadingOptions,
) -> Result<RadiationResult> {
    options.check_grid_size(grid_size)?;
    let (nu, nv) = grid_resolution(window, grid_size);
    let n_samples = nu.saturating_mul(nv);
    if n_samples > options.max_samples {
        return Err(ShadingError::TooManySamples {
            samples: n_samples,
            max: options.max_samples,
        });
    }
    let samples = tessellate(window, grid_size, options.ray_offset);
    let backdrop = window.backdrop(options.backdrop_offset)?;

    #[cfg(feature = "parallel")]
    let iter = samples.par_iter();
    #[cfg(not(feature = "parallel"))]
    let iter = samples.iter();

    let per_sample: Vec<SampleRadiation> = iter
        .map(|sample| SampleRadiation {
            sample: *sample,
            shaded: weighted_irradiance(sample, sky, obstructions) * sample.area,
            unshaded: weighted_irradiance(sample, sky, &backdrop) * sample.area,
        })
        .collect();

    let (shaded_kwh, unshaded_kwh) = per_sample
        .iter()
        .fold((0.0, 0.0), |(shaded, unshaded), s| (shaded + s.shaded, unshaded + s.unshaded));

    tracing::debug!(
        samples = per_sample.len(),
        patches = sky.len(),
        shaded_kwh,
        unshaded_kwh,
        "Calculated window radiation"
    );

    Ok(RadiationResult {
        shaded_kwh,
        unshaded_kwh,
        samples: if options.keep_sample_breakdown {
            Some(per_sample)
        } else {
            None
        },
    })
}
