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

#![deny(missing_docs)]

//! This is [SIMPLE's](https://www.simplesim.tools) window shading module. It estimates how much
//! the solar exposure of a window is reduced by the things around it (the building's own massing,
//! the window reveals, neighbouring buildings and any other context geometry). It offers two methods
//! that answer the same question at different levels of detail:
//!
//! * **Shading dimensions**: A simplified geometric method that, for each window, finds the
//! Horizon, Overhang and Reveal (left and right) dimensions that simplified energy-balance tools
//! (e.g., PHPP) expect as input. See [`dimensions`].
//! * **Seasonal radiation**: A ray-based estimation of the incident solar energy on each window with
//! and without obstructions, by sampling a discretized sky dome. The ratio between both is the
//! shading factor, although calculating it is left to the caller. See [`radiation`].
//!
//! Everything in here is a pure function of its inputs. Build an [`ObstructionScene`] once per
//! building and then query it as many times as needed, from as many threads as needed.

/// The kind of Floating point number used in the
/// library... the `"float"` feature means it becomes `f32`
/// and `f64` is used otherwise.
#[cfg(feature = "float")]
pub type Float = f32;
/// Well, Pi.
#[cfg(feature = "float")]
pub const PI: Float = std::f32::consts::PI;

/// The kind of Floating point number used in the
/// library... the `"float"` feature means it becomes `f32`
/// and `f64` is used otherwise.
#[cfg(not(feature = "float"))]
pub type Float = f64;

/// Well, Pi.
#[cfg(not(feature = "float"))]
pub const PI: Float = std::f64::consts::PI;

/// Errors and advisories
pub mod error;
pub use error::{Advisory, Result, ShadingError};

/// Tuned constants and other options for the calculations
pub mod options;
pub use options::ShadingOptions;

/// The windows being analysed
pub mod window;
pub use window::{Window, WindowEdge};

/// The opaque surfaces that may shade a window
pub mod scene;
pub use scene::{ObstructionScene, ObstructionSurface};

/// Bounded search planes and other shared geometric utilities
pub mod search;

/// The simplified geometric method: Horizon, Overhang and Reveals.
pub mod dimensions;
pub use dimensions::{DimensionPair, Horizon, Overhang, Reveal, ShadingDimensionResult};

/// Discretized skies, as produced by a sky-matrix generator
pub mod sky;
pub use sky::{SkyDome, SkyPatch};

mod sampling;
pub use sampling::SamplePoint;

/// The ray-based seasonal radiation estimator
pub mod radiation;
pub use radiation::{RadiationResult, SampleRadiation};

/// Runs the calculations for every window in a building
pub mod analysis;
pub use analysis::{BatchResult, ShadingAnalysis, SkippedWindow};

/// Serializable descriptions of the inputs
pub mod input;
