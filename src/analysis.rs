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

use crate::dimensions::{self, ShadingDimensionResult};
use crate::error::{Advisory, Result, ShadingError};
use crate::input::WindowDescription;
use crate::options::ShadingOptions;
use crate::radiation::{self, RadiationResult};
use crate::scene::ObstructionScene;
use crate::sky::SkyDome;
use crate::window::Window;
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, HashSet};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

fn serialize_error<S: Serializer>(e: &ShadingError, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.collect_str(e)
}

/// A window that could not be analysed
#[derive(Debug, Clone, Serialize)]
pub struct SkippedWindow {
    /// The id of the window
    pub id: String,
    /// What went wrong
    #[serde(serialize_with = "serialize_error")]
    pub reason: ShadingError,
}

/// The results of analysing many windows.
///
/// A window that cannot be analysed does not stop the others from being
/// analysed. It simply ends up in `skipped` instead of in `results`.
#[derive(Debug, Clone, Serialize)]
pub struct BatchResult<T> {
    /// The results, by window id
    pub results: BTreeMap<String, T>,
    /// The windows that could not be analysed
    pub skipped: Vec<SkippedWindow>,
    /// Warnings about the calculation
    pub advisories: Vec<Advisory>,
}

/// Analyses all the windows of a building against the same
/// set of obstructions.
pub struct ShadingAnalysis {
    scene: ObstructionScene,
    options: ShadingOptions,
}

impl ShadingAnalysis {
    /// Creates a new analysis
    pub fn new(scene: ObstructionScene, options: ShadingOptions) -> Self {
        Self { scene, options }
    }

    /// The obstructions
    pub fn scene(&self) -> &ObstructionScene {
        &self.scene
    }

    /// The options
    pub fn options(&self) -> &ShadingOptions {
        &self.options
    }

    /// Calculates the [`ShadingDimensionResult`] of every window.
    ///
    /// Fails only if the search limit in the options is not a positive number.
    pub fn dimensions(&self, windows: &[WindowDescription]) -> Result<BatchResult<ShadingDimensionResult>> {
        let search_limit = self.options.search_limit;
        let advisory = self.options.check_search_limit(search_limit)?;
        let mut ret = self.run(windows, |w| dimensions::compute(w, &self.scene, search_limit, &self.options));
        ret.advisories.extend(advisory);
        Ok(ret)
    }

    /// Calculates the [`RadiationResult`] of every window for the period represented by `sky`.
    ///
    /// Fails only if the grid size in the options is not a positive number.
    pub fn radiation(&self, windows: &[WindowDescription], sky: &SkyDome) -> Result<BatchResult<RadiationResult>> {
        let grid_size = self.options.grid_size;
        self.options.check_grid_size(grid_size)?;
        Ok(self.run(windows, |w| radiation::compute(w, &self.scene, sky, grid_size, &self.options)))
    }

    /// Builds each window and runs `calc` on it, isolating failures.
    fn run<T, F>(&self, windows: &[WindowDescription], calc: F) -> BatchResult<T>
    where
        T: Send,
        F: Fn(&Window) -> Result<T> + Sync,
    {
        // Repeated ids would overwrite each other
        let mut seen = HashSet::with_capacity(windows.len());
        let unique: Vec<bool> = windows.iter().map(|w| seen.insert(w.id.as_str())).collect();

        let planarity_tolerance = self.options.planarity_tolerance;
        let process = |(w, is_unique): (&WindowDescription, &bool)| -> (String, Result<T>) {
            let result = if *is_unique {
                w.build(planarity_tolerance).and_then(|window| calc(&window))
            } else {
                Err(ShadingError::DuplicateWindow(w.id.clone()))
            };
            (w.id.clone(), result)
        };

        #[cfg(feature = "parallel")]
        let outcomes: Vec<(String, Result<T>)> = windows.par_iter().zip(unique.par_iter()).map(process).collect();
        #[cfg(not(feature = "parallel"))]
        let outcomes: Vec<(String, Result<T>)> = windows.iter().zip(unique.iter()).map(process).collect();

        let mut ret = BatchResult {
            results: BTreeMap::new(),
            skipped: Vec::new(),
            advisories: Vec::new(),
        };
        for (id, outcome) in outcomes {
            match outcome {
                Ok(v) => {
                    ret.results.insert(id, v);
                }
                Err(reason) => {
                    tracing::warn!(window = %id, %reason, "Skipping window");
                    ret.skipped.push(SkippedWindow { id, reason });
                }
            }
        }
        ret
    }
}
