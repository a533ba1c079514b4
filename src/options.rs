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

use crate::error::{Advisory, Result, ShadingError};
use crate::Float;
use serde::{Deserialize, Serialize};

/// The options for the shading calculations.
///
/// The defaults are the values for which the simplified method was
/// tuned. Change them only if you know what you are doing. Lengths are in
/// the units of the model (usually metres) and angles are in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShadingOptions {
    /// How far away from the window obstructions are searched for. This is what
    /// [`crate::ShadingAnalysis`] uses; calling [`crate::dimensions::compute`]
    /// directly takes the search limit as an argument instead, and this field
    /// is ignored.
    pub search_limit: Float,

    /// Search limits beyond this value produce an [`Advisory`]
    pub search_limit_advisory: Float,

    /// The swath used for detecting overhangs extends
    /// `recess_depth + overhang_swath_margin` out of the glazing.
    pub overhang_swath_margin: Float,

    /// Candidate points closer than this to the search origin are degenerate
    pub degenerate_length: Float,

    /// Overhang candidates with a smaller angle-from-normal are degenerate
    pub min_overhang_angle: Float,

    /// Overhang candidates with a larger angle-from-normal lie (almost) on
    /// the plane of the window, so they are ignored
    pub max_overhang_angle: Float,

    /// Reveal candidates with a larger angle-from-normal are ignored
    pub max_reveal_angle: Float,

    /// Distance between the glazing and the probe used for detecting reveals
    pub reveal_probe_offset: Float,

    /// Length of the probe used for detecting reveals
    pub reveal_probe_length: Float,

    /// Size of the cells in which windows are tessellated
    pub grid_size: Float,

    /// Windows that would be tessellated into more samples than this are
    /// not analysed
    pub max_samples: usize,

    /// Offset for the starting point of the rays.
    pub ray_offset: Float,

    /// Distance between the glazing and the unobstructed backdrop
    pub backdrop_offset: Float,

    /// Maximum distance between a vertex and the plane of its surface
    pub planarity_tolerance: Float,

    /// Keep the per-sample breakdown of the radiation results
    pub keep_sample_breakdown: bool,
}

impl Default for ShadingOptions {
    fn default() -> Self {
        Self {
            search_limit: 99.,
            search_limit_advisory: 200.,
            overhang_swath_margin: 0.5,
            degenerate_length: 0.001,
            min_overhang_angle: 0.05,
            max_overhang_angle: 89.9,
            max_reveal_angle: 89.9,
            reveal_probe_offset: 0.1,
            reveal_probe_length: 1.0,
            grid_size: 0.25,
            max_samples: 250_000,
            ray_offset: 0.001,
            backdrop_offset: 0.1,
            planarity_tolerance: 0.01,
            keep_sample_breakdown: false,
        }
    }
}

impl ShadingOptions {
    /// Creates a new set of default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the search limit
    pub fn set_search_limit(&mut self, v: Float) -> &mut Self {
        self.search_limit = v;
        self
    }

    /// Sets the size of the tessellation cells
    pub fn set_grid_size(&mut self, v: Float) -> &mut Self {
        self.grid_size = v;
        self
    }

    /// Sets the maximum angle-from-normal of reveal candidates, in degrees
    pub fn set_max_reveal_angle(&mut self, v: Float) -> &mut Self {
        self.max_reveal_angle = v;
        self
    }

    /// Sets the minimum angle-from-normal of overhang candidates, in degrees
    pub fn set_min_overhang_angle(&mut self, v: Float) -> &mut Self {
        self.min_overhang_angle = v;
        self
    }

    /// Sets the maximum angle-from-normal of overhang candidates, in degrees
    pub fn set_max_overhang_angle(&mut self, v: Float) -> &mut Self {
        self.max_overhang_angle = v;
        self
    }

    /// Sets the largest number of samples a window can be tessellated into
    pub fn set_max_samples(&mut self, v: usize) -> &mut Self {
        self.max_samples = v;
        self
    }

    /// Sets the distance between the glazing and the backdrop
    pub fn set_backdrop_offset(&mut self, v: Float) -> &mut Self {
        self.backdrop_offset = v;
        self
    }

    /// Sets the planarity tolerance
    pub fn set_planarity_tolerance(&mut self, v: Float) -> &mut Self {
        self.planarity_tolerance = v;
        self
    }

    /// Keeps (or not) the per-sample radiation results
    pub fn set_keep_sample_breakdown(&mut self, v: bool) -> &mut Self {
        self.keep_sample_breakdown = v;
        self
    }

    /// Checks that the search limit is usable, returning an [`Advisory`]
    /// if it is larger than recommended.
    pub fn check_search_limit(&self, search_limit: Float) -> Result<Option<Advisory>> {
        if !search_limit.is_finite() || search_limit <= 0.0 {
            return Err(ShadingError::InvalidSearchLimit(search_limit));
        }
        if search_limit > self.search_limit_advisory {
            let advisory = Advisory::SearchLimitExceeded {
                search_limit,
                threshold: self.search_limit_advisory,
            };
            tracing::warn!(search_limit, threshold = self.search_limit_advisory, "{}", advisory);
            return Ok(Some(advisory));
        }
        Ok(None)
    }

    /// Checks that the grid size is usable
    pub fn check_grid_size(&self, grid_size: Float) -> Result<()> {
        if !grid_size.is_finite() || grid_size <= 0.0 {
            return Err(ShadingError::InvalidGridSize(grid_size));
        }
        Ok(())
    }
}
