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

use crate::Float;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for shading calculations
pub type Result<T> = std::result::Result<T, ShadingError>;

/// Errors that can occur when building the inputs of a calculation.
///
/// Not finding an obstruction is not an error (see [`crate::ShadingDimensionResult`]),
/// and neither are degenerate candidate points found during a search, which are
/// simply discarded.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShadingError {
    /// Some coordinate is NaN or infinite
    #[error("{0} contains non-finite coordinates")]
    NonFinite(&'static str),

    /// A window needs exactly four corners
    #[error("Expecting 4 window corners... found {0}")]
    WrongCornerCount(usize),

    /// The surface is not planar within tolerance
    #[error("{what} is not planar: a vertex is {deviation} away from its plane (tolerance is {tolerance})")]
    NonPlanar {
        /// The kind of geometry
        what: &'static str,
        /// The largest distance between a vertex and the fitted plane
        deviation: Float,
        /// The tolerance used
        tolerance: Float,
    },

    /// The surface has no area
    #[error("{0} has zero area")]
    ZeroArea(&'static str),

    /// The normal has zero length
    #[error("{0} has a zero-length normal")]
    DegenerateNormal(&'static str),

    /// The outward normal does not agree with the order of the corners
    #[error("The outward normal of the window does not match the order of its corners (cos = {0})")]
    InconsistentNormal(Float),

    /// Windows cannot be installed in front of the wall
    #[error("Installed recess depth must be non-negative... found {0}")]
    NegativeRecess(Float),

    /// The polygon could not be split into triangles
    #[error("{0} could not be triangulated... is it self-intersecting?")]
    FailedTriangulation(&'static str),

    /// The window would be split into too many samples
    #[error("The grid would split the window into {samples} samples, but only {max} are allowed")]
    TooManySamples {
        /// Samples needed
        samples: usize,
        /// Samples allowed
        max: usize,
    },

    /// The polygon needs at least 3 vertices
    #[error("A polygon needs at least 3 vertices... found {0}")]
    TooFewVertices(usize),

    /// A sky patch is not usable
    #[error("Sky patch {index} is invalid: {reason}")]
    InvalidSkyPatch {
        /// The position of the patch in the sky dome
        index: usize,
        /// What is wrong with it
        reason: String,
    },

    /// Tessellation resolution must be positive
    #[error("Grid size must be positive and finite... found {0}")]
    InvalidGridSize(Float),

    /// Two windows share the same identifier
    #[error("There is more than one window with id '{0}'")]
    DuplicateWindow(String),

    /// Search limit must be positive
    #[error("Search limit must be positive and finite... found {0}")]
    InvalidSearchLimit(Float),
}

/// Conditions that deserve the attention of the user but that
/// do not stop the calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Advisory {
    /// The search limit is much larger than the range within which
    /// the simplified method is meaningful. The results are calculated
    /// anyway.
    SearchLimitExceeded {
        /// The search limit requested
        search_limit: Float,
        /// The largest recommended value
        threshold: Float,
    },
}

impl std::fmt::Display for Advisory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Advisory::SearchLimitExceeded {
                search_limit,
                threshold,
            } => write!(
                f,
                "Search limit of {} is beyond the recommended maximum of {}... obstructions that far away barely affect the simplified method",
                search_limit, threshold
            ),
        }
    }
}
