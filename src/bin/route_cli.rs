#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    if let Err(err) = native::run() {
        eprintln!("route_cli error: {err}");
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use flythrough_engine::geom::Point3;
    use flythrough_engine::path::{
        CameraPath, InterpolatedPathOptions, LoopClosure, PathDiagnostics, Route, StereoEye,
        grand_tour_path, interpolated_path,
    };
    use std::fmt::Write as _;
    use std::fs;
    use std::path::{Path, PathBuf};

    const DEFAULT_FRAMES: usize = 300;

    const USAGE: &str = r#"route_cli (flythrough-engine)

USAGE:
  route_cli list
  route_cli run <route|all> [options]
  route_cli path <anchors-file> [options]

ROUTES:
  orion          straight flight toward Orion
  paper          three fixed viewpoints
  local_dust     zoom out, then orbit
  grand_tour     closed loop through 14 waypoints
  circle_local   circle the Sun staring at one point

OPTIONS:
  --frames <n>         Number of frames (default 300)
  --eye <center|left|right>
                       Stereo eye for circle_local
  --out <path>         Write frames to this file instead of stdout
  --out-dir <dir>      Write <route>.txt per route (required for `run all`)
  --overwrite          Overwrite existing output files
  -h, --help           Show this help

OPTIONS (path):
  --closed <distance>  Close the loop, pinning the last <distance> of travel
  --smoothing <f>      Residual budget per anchor (default 1.5, 0 = exact)
  --fine-samples <n>   Fine-curve resolution (default 100000)

The anchors file holds one `x y z` triple per line, parsecs; `#` starts a comment.
Frames are written as `x y z alpha beta` lines.
"#;

    pub fn run() -> Result<(), String> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let mut args = Args::new(args);

        let Some(command) = args.next() else {
            print_usage();
            return Ok(());
        };

        match command.as_str() {
            "list" => {
                print_routes();
                Ok(())
            }
            "run" => cmd_run(&mut args),
            "path" => cmd_path(&mut args),
            "-h" | "--help" | "help" => {
                print_usage();
                Ok(())
            }
            other => Err(format!("unknown command `{other}`\n\n{USAGE}")),
        }
    }

    fn print_usage() {
        println!("{USAGE}");
    }

    fn print_routes() {
        for route in Route::ALL {
            println!("{:<14} {}", route.name(), route.description());
        }
    }

    #[derive(Debug)]
    struct OutputOptions {
        frames: usize,
        eye: StereoEye,
        out: Option<PathBuf>,
        out_dir: Option<PathBuf>,
        overwrite: bool,
    }

    impl Default for OutputOptions {
        fn default() -> Self {
            Self {
                frames: DEFAULT_FRAMES,
                eye: StereoEye::Center,
                out: None,
                out_dir: None,
                overwrite: false,
            }
        }
    }

    impl OutputOptions {
        /// Consumes a shared flag; returns `false` if `arg` is not one.
        fn accept(&mut self, arg: &str, args: &mut Args) -> Result<bool, String> {
            match arg {
                "--frames" => self.frames = args.parsed("--frames")?,
                "--eye" => {
                    let value = args.value("--eye")?;
                    self.eye = StereoEye::from_name(&value)
                        .ok_or_else(|| format!("unknown eye `{value}`"))?;
                }
                "--out" => self.out = Some(PathBuf::from(args.value("--out")?)),
                "--out-dir" => self.out_dir = Some(PathBuf::from(args.value("--out-dir")?)),
                "--overwrite" => self.overwrite = true,
                _ => return Ok(false),
            }
            Ok(true)
        }
    }

    fn cmd_run(args: &mut Args) -> Result<(), String> {
        let route_name = args.next().ok_or("missing route name")?;
        let mut output = OutputOptions::default();

        while let Some(arg) = args.next() {
            if output.accept(&arg, args)? {
                continue;
            }
            match arg.as_str() {
                "-h" | "--help" => {
                    print_usage();
                    return Ok(());
                }
                other => return Err(format!("unknown option `{other}`\n\n{USAGE}")),
            }
        }

        if route_name == "all" {
            let dir = output
                .out_dir
                .as_deref()
                .ok_or("`run all` requires --out-dir")?;
            for route in Route::ALL {
                let (frames, diagnostics) = build_route(route, &output)?;
                let path = dir.join(format!("{}.txt", route.name()));
                write_text_file(&path, &format_frames(&frames), output.overwrite)?;
                report(route.name(), &frames, diagnostics.as_ref());
                eprintln!("wrote {}", path.display());
            }
            return Ok(());
        }

        let route = Route::from_name(&route_name)
            .ok_or_else(|| format!("unknown route `{route_name}` (see `route_cli list`)"))?;
        let (frames, diagnostics) = build_route(route, &output)?;
        emit(route.name(), &frames, diagnostics.as_ref(), &output)
    }

    fn cmd_path(args: &mut Args) -> Result<(), String> {
        let anchors_file = PathBuf::from(args.next().ok_or("missing anchors file")?);
        let mut output = OutputOptions::default();
        let mut options = InterpolatedPathOptions::default();

        while let Some(arg) = args.next() {
            if output.accept(&arg, args)? {
                continue;
            }
            match arg.as_str() {
                "--closed" => options.closure = LoopClosure::closed(args.parsed("--closed")?),
                "--smoothing" => options.smoothing_factor = args.parsed("--smoothing")?,
                "--fine-samples" => options.fine_samples = args.parsed("--fine-samples")?,
                "-h" | "--help" => {
                    print_usage();
                    return Ok(());
                }
                other => return Err(format!("unknown option `{other}`\n\n{USAGE}")),
            }
        }

        let text = fs::read_to_string(&anchors_file)
            .map_err(|e| format!("read {}: {e}", anchors_file.display()))?;
        let anchors = parse_anchors(&text)?;
        let (frames, diagnostics) =
            interpolated_path(&anchors, output.frames, &options).map_err(|e| e.to_string())?;
        let name = anchors_file
            .file_stem()
            .map_or_else(|| "path".to_string(), |stem| stem.to_string_lossy().into_owned());
        emit(&name, &frames, Some(&diagnostics), &output)
    }

    fn build_route(
        route: Route,
        output: &OutputOptions,
    ) -> Result<(CameraPath, Option<PathDiagnostics>), String> {
        if route == Route::GrandTour {
            let (frames, diagnostics) = grand_tour_path(output.frames).map_err(|e| e.to_string())?;
            return Ok((frames, Some(diagnostics)));
        }
        let frames = route
            .build(output.frames, output.eye)
            .map_err(|e| e.to_string())?;
        Ok((frames, None))
    }

    fn emit(
        name: &str,
        frames: &CameraPath,
        diagnostics: Option<&PathDiagnostics>,
        output: &OutputOptions,
    ) -> Result<(), String> {
        let text = format_frames(frames);
        let target = match (&output.out, &output.out_dir) {
            (Some(_), Some(_)) => return Err("use either --out or --out-dir (not both)".to_string()),
            (Some(path), None) => Some(path.clone()),
            (None, Some(dir)) => Some(dir.join(format!("{name}.txt"))),
            (None, None) => None,
        };

        if let Some(path) = target.as_deref() {
            write_text_file(path, &text, output.overwrite)?;
            eprintln!("wrote {}", path.display());
        } else {
            print!("{text}");
        }
        report(name, frames, diagnostics);
        Ok(())
    }

    fn report(name: &str, frames: &CameraPath, diagnostics: Option<&PathDiagnostics>) {
        match diagnostics {
            Some(d) => eprintln!(
                "{name}: frames={} anchors={} length={:.1}pc travel={:.1} speed={:.2}..{:.2}",
                frames.len(),
                d.anchor_count,
                d.geometric_length,
                d.travel_length,
                d.min_speed,
                d.max_speed
            ),
            None => eprintln!("{name}: frames={}", frames.len()),
        }
    }

    fn format_frames(frames: &CameraPath) -> String {
        let mut text = String::new();
        for frame in frames {
            let p = frame.position;
            let _ = writeln!(
                text,
                "{:.6} {:.6} {:.6} {:.6} {:.6}",
                p.x, p.y, p.z, frame.alpha, frame.beta
            );
        }
        text
    }

    fn parse_anchors(text: &str) -> Result<Vec<Point3>, String> {
        text.lines()
            .enumerate()
            .filter_map(|(number, line)| {
                let content = line.split('#').next().unwrap_or("").trim();
                (!content.is_empty()).then_some((number + 1, content))
            })
            .map(|(number, content)| {
                let values: Vec<f64> = content
                    .split(|c: char| c.is_whitespace() || c == ',')
                    .filter(|token| !token.is_empty())
                    .map(str::parse::<f64>)
                    .collect::<Result<_, _>>()
                    .map_err(|e| format!("line {number}: {e}"))?;
                match values.as_slice() {
                    [x, y, z] => Ok(Point3::new(*x, *y, *z)),
                    _ => Err(format!("line {number}: expected `x y z`, got {} values", values.len())),
                }
            })
            .collect()
    }

    fn write_text_file(path: &Path, text: &str, overwrite: bool) -> Result<(), String> {
        if path.exists() && !overwrite {
            return Err(format!(
                "refusing to overwrite existing file {} (use --overwrite)",
                path.display()
            ));
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| format!("create dir {}: {e}", parent.display()))?;
        }
        fs::write(path, text).map_err(|e| format!("write {}: {e}", path.display()))
    }

    struct Args {
        args: Vec<String>,
        pos: usize,
    }

    impl Args {
        fn new(args: Vec<String>) -> Self {
            Self { args, pos: 0 }
        }

        fn next(&mut self) -> Option<String> {
            let arg = self.args.get(self.pos)?.clone();
            self.pos += 1;
            Some(arg)
        }

        fn value(&mut self, flag: &str) -> Result<String, String> {
            self.next().ok_or_else(|| format!("missing value for {flag}"))
        }

        fn parsed<T>(&mut self, flag: &str) -> Result<T, String>
        where
            T: std::str::FromStr,
            T::Err: std::fmt::Display,
        {
            let value = self.value(flag)?;
            value
                .parse()
                .map_err(|e| format!("invalid value `{value}` for {flag}: {e}"))
        }
    }
}
