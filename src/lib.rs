#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod geom;
pub mod path;

use std::fmt;

use geom::Point3;
use path::{
    CameraPath, InterpolatedPathOptions, PathDiagnostics, Route, StereoEye, interpolated_path,
};
use serde::Serialize;
use wasm_bindgen::JsError;
use wasm_bindgen::prelude::*;

cfg_if::cfg_if! {
    if #[cfg(all(feature = "console_error_panic_hook", target_arch = "wasm32"))] {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            console_error_panic_hook::set_once();
            init_logger();
        }
    } else {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            init_logger();
        }
    }
}

#[cfg(feature = "debug_logs")]
fn init_logger() {
    use log::LevelFilter;
    use wasm_bindgen_console_logger::DEFAULT_LOGGER;
    // A second call finds the logger already installed.
    if log::set_logger(&DEFAULT_LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Debug);
    }
}

#[cfg(not(feature = "debug_logs"))]
fn init_logger() {}

#[cfg(all(feature = "parallel", target_arch = "wasm32"))]
#[wasm_bindgen]
pub async fn initialize_parallel(worker_count: Option<u32>) -> Result<(), JsError> {
    let threads = worker_count
        .map(|count| count.max(1) as usize)
        .or_else(|| {
            std::thread::available_parallelism()
                .map(|value| value.get())
                .ok()
        })
        .unwrap_or(1);

    wasm_bindgen_rayon::init_thread_pool(threads)
        .await
        .map_err(|err| JsError::new(&format!("could not start rayon thread pool: {err}")))
}

#[macro_export]
macro_rules! debug_log {
    ($($t:tt)*) => {{
        #[cfg(feature = "debug_logs")]
        {
            #[cfg(target_arch = "wasm32")]
            {
                ::web_sys::console::log_1(&::wasm_bindgen::JsValue::from_str(&format!($($t)*)));
            }
            #[cfg(not(target_arch = "wasm32"))]
            {
                println!("{}", format!($($t)*));
            }
        }
    }};
}

#[derive(Debug, Serialize)]
struct FrameExport {
    position: [f64; 3],
    alpha: f64,
    beta: f64,
}

#[derive(Debug, Serialize)]
struct RouteExport {
    name: &'static str,
    description: &'static str,
}

#[derive(Debug, Serialize)]
struct DiagnosticsExport {
    anchor_count: usize,
    spline_point_count: usize,
    fine_sample_count: usize,
    spline_residual: f64,
    geometric_length: f64,
    travel_length: f64,
    min_speed: f64,
    max_speed: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    closure_start: Option<usize>,
    frame_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    timing_ms: Option<f64>,
}

impl From<&PathDiagnostics> for DiagnosticsExport {
    fn from(diagnostics: &PathDiagnostics) -> Self {
        Self {
            anchor_count: diagnostics.anchor_count,
            spline_point_count: diagnostics.spline_point_count,
            fine_sample_count: diagnostics.fine_sample_count,
            spline_residual: diagnostics.spline_residual,
            geometric_length: diagnostics.geometric_length,
            travel_length: diagnostics.travel_length,
            min_speed: diagnostics.min_speed,
            max_speed: diagnostics.max_speed,
            closure_start: diagnostics.closure_start,
            frame_count: diagnostics.frame_count,
            timing_ms: diagnostics.timing.as_ref().map(path::PathTimingReport::total_ms),
        }
    }
}

/// Public entry point for consumers.
#[wasm_bindgen]
pub struct Engine {
    anchors: Vec<Point3>,
    options: InterpolatedPathOptions,
    frames: Option<CameraPath>,
    diagnostics: Option<PathDiagnostics>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl Engine {
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new() -> Engine {
        Engine {
            anchors: Vec::new(),
            options: InterpolatedPathOptions::default(),
            frames: None,
            diagnostics: None,
        }
    }

    /// Replaces the anchors with a flat `[x0, y0, z0, x1, ...]` list, parsecs.
    #[wasm_bindgen]
    pub fn set_anchors(&mut self, coordinates: Vec<f64>) -> Result<(), JsValue> {
        if coordinates.len() % 3 != 0 {
            return Err(js_error("anchor coordinates must come in x, y, z triples"));
        }
        self.anchors = coordinates
            .chunks_exact(3)
            .map(|xyz| Point3::new(xyz[0], xyz[1], xyz[2]))
            .collect();
        self.clear_frames();
        Ok(())
    }

    #[wasm_bindgen]
    #[must_use]
    pub fn anchor_count(&self) -> usize {
        self.anchors.len()
    }

    /// Replaces the synthesis options; missing fields take their defaults.
    #[wasm_bindgen]
    pub fn set_options(&mut self, options: JsValue) -> Result<(), JsValue> {
        let options: InterpolatedPathOptions =
            serde_wasm_bindgen::from_value(options).map_err(to_js_error)?;
        options.validate().map_err(to_js_error)?;
        self.options = options;
        self.clear_frames();
        Ok(())
    }

    /// Switches the closed-loop behaviour without touching other options.
    #[wasm_bindgen]
    pub fn set_closed(&mut self, closed: bool, close_distance: f64) -> Result<(), JsValue> {
        let closure = if closed {
            path::LoopClosure::closed(close_distance)
        } else {
            path::LoopClosure::open()
        };
        closure.validate().map_err(to_js_error)?;
        self.options.closure = closure;
        self.clear_frames();
        Ok(())
    }

    /// Synthesizes `n_frames` frames through the current anchors.
    #[wasm_bindgen]
    pub fn generate(&mut self, n_frames: usize) -> Result<(), JsValue> {
        let (frames, diagnostics) =
            interpolated_path(&self.anchors, n_frames, &self.options).map_err(to_js_error)?;
        debug_log!(
            "generated {} frames from {} anchors (travel {:.1})",
            frames.len(),
            self.anchors.len(),
            diagnostics.travel_length
        );
        self.frames = Some(frames);
        self.diagnostics = Some(diagnostics);
        Ok(())
    }

    /// Loads a built-in route by name; `eye` picks a stereo eye where supported.
    #[wasm_bindgen]
    pub fn load_route(
        &mut self,
        name: &str,
        n_frames: usize,
        eye: Option<String>,
    ) -> Result<(), JsValue> {
        let route = Route::from_name(name)
            .ok_or_else(|| js_error(&format!("unknown route `{name}`")))?;
        let eye = match eye.as_deref() {
            None => StereoEye::Center,
            Some(value) => StereoEye::from_name(value)
                .ok_or_else(|| js_error(&format!("unknown stereo eye `{value}`")))?,
        };

        if route == Route::GrandTour {
            let (frames, diagnostics) = path::grand_tour_path(n_frames).map_err(to_js_error)?;
            self.frames = Some(frames);
            self.diagnostics = Some(diagnostics);
        } else {
            self.frames = Some(route.build(n_frames, eye).map_err(to_js_error)?);
            self.diagnostics = None;
        }
        debug_log!("loaded route {} with {} frames", route, self.frame_count());
        Ok(())
    }

    #[wasm_bindgen]
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frames.as_ref().map_or(0, CameraPath::len)
    }

    /// Frames as `{ position, alpha, beta }` objects.
    #[wasm_bindgen]
    pub fn get_frames(&self) -> Result<JsValue, JsValue> {
        let frames = self
            .frames
            .as_ref()
            .ok_or_else(|| js_error("no frames generated yet"))?;
        let export: Vec<FrameExport> = frames
            .iter()
            .map(|frame| FrameExport {
                position: frame.position.to_array(),
                alpha: frame.alpha,
                beta: frame.beta,
            })
            .collect();
        serde_wasm_bindgen::to_value(&export).map_err(to_js_error)
    }

    /// Frames flattened to `[x, y, z, alpha, beta]` per frame.
    #[wasm_bindgen]
    #[must_use]
    pub fn get_frame_rows(&self) -> Vec<f64> {
        self.frames
            .as_ref()
            .map(|frames| frames.to_rows().into_iter().flatten().collect())
            .unwrap_or_default()
    }

    #[wasm_bindgen]
    pub fn get_diagnostics(&self) -> Result<JsValue, JsValue> {
        let diagnostics = self
            .diagnostics
            .as_ref()
            .ok_or_else(|| js_error("no interpolated path generated yet"))?;
        serde_wasm_bindgen::to_value(&DiagnosticsExport::from(diagnostics))
            .map_err(to_js_error)
    }

    #[wasm_bindgen]
    pub fn get_routes(&self) -> Result<JsValue, JsValue> {
        let routes: Vec<RouteExport> = Route::ALL
            .iter()
            .map(|route| RouteExport {
                name: route.name(),
                description: route.description(),
            })
            .collect();
        serde_wasm_bindgen::to_value(&routes).map_err(to_js_error)
    }
}

impl Engine {
    /// Diagnostics of the last interpolated path, if any.
    #[must_use]
    pub fn diagnostics(&self) -> Option<&PathDiagnostics> {
        self.diagnostics.as_ref()
    }

    #[must_use]
    pub fn frames(&self) -> Option<&CameraPath> {
        self.frames.as_ref()
    }

    /// Replaces the options from Rust callers.
    pub fn set_path_options(&mut self, options: InterpolatedPathOptions) -> Result<(), path::PathError> {
        options.validate()?;
        self.options = options;
        self.clear_frames();
        Ok(())
    }

    fn clear_frames(&mut self) {
        self.frames = None;
        self.diagnostics = None;
    }
}

fn to_js_error<E: fmt::Display>(error: E) -> JsValue {
    js_error(&error.to_string())
}

fn js_error(message: &str) -> JsValue {
    #[cfg(target_arch = "wasm32")]
    {
        JsError::new(message).into()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
        JsValue::NULL
    }
}
