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
use clap::Parser;
use serde::Serialize;
use shading::analysis::BatchResult;
use shading::input::SceneDescription;
use shading::{Float, RadiationResult, ShadingAnalysis, ShadingDimensionResult};
use std::collections::BTreeMap;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Inputs {
    /// A JSON file with the windows, the obstructions and the skies
    #[arg(short, long)]
    input: String,

    /// Where to write the results. They are printed if not given.
    #[arg(short, long)]
    output: Option<String>,

    /// Overrides the search limit in the input file
    #[arg(long)]
    search_limit: Option<Float>,

    /// Overrides the grid size in the input file
    #[arg(long)]
    grid_size: Option<Float>,
}

#[derive(Serialize)]
struct Report {
    dimensions: BatchResult<ShadingDimensionResult>,
    radiation: BTreeMap<String, BatchResult<RadiationResult>>,
    ignored_obstructions: Vec<usize>,
}

fn run(args: Inputs) -> Result<(), String> {
    let content = std::fs::read_to_string(&args.input)
        .map_err(|e| format!("Could not read input file '{}': {}", args.input, e))?;
    let mut description: SceneDescription =
        serde_json::from_str(&content).map_err(|e| format!("Could not parse '{}': {}", args.input, e))?;

    if let Some(v) = args.search_limit {
        description.options.set_search_limit(v);
    }
    if let Some(v) = args.grid_size {
        description.options.set_grid_size(v);
    }

    let (scene, ignored) = description.build_scene();
    tracing::info!(
        windows = description.windows.len(),
        obstructions = scene.len(),
        ignored = ignored.len(),
        skies = description.skies.len(),
        "Ready to calc"
    );

    let analysis = ShadingAnalysis::new(scene, description.options);
    let dimensions = analysis
        .dimensions(&description.windows)
        .map_err(|e| e.to_string())?;

    let mut radiation = BTreeMap::new();
    for (season, sky) in &description.skies {
        let sky = sky.build().map_err(|e| format!("Sky '{}': {}", season, e))?;
        let results = analysis
            .radiation(&description.windows, &sky)
            .map_err(|e| e.to_string())?;
        radiation.insert(season.clone(), results);
    }

    let report = Report {
        dimensions,
        radiation,
        ignored_obstructions: ignored.into_iter().map(|(i, _)| i).collect(),
    };
    let json = serde_json::to_string_pretty(&report).map_err(|e| e.to_string())?;
    match args.output {
        Some(path) => std::fs::write(&path, json).map_err(|e| format!("Could not write '{}': {}", path, e))?,
        None => println!("{}", json),
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Inputs::parse();
    if let Err(e) = run(args) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
