use clap::{Parser, Subcommand};
use cubegrid_common::TurnDirection;
use cubegrid_input::{Action, CameraScheme, Key, Keymap};
use cubegrid_kernel::rotation::DEFAULT_ANGULAR_SPEED;
use cubegrid_kernel::{Cube, CubeEvent, CubeGrid};
use cubegrid_render::{
    ActiveCamera, Camera, CubeScene, DEBUG_PROGRAM, DebugTextRenderer, Projection,
    RecordingBackend, RenderView, Renderer, call_histogram,
};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cubegrid-cli", about = "Headless driver for the cube demo")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version, grid figures and the draw calls of one frame
    Info,
    /// Turn the front layer and print the resulting cube
    Turn {
        /// Number of quarter turns
        #[arg(short, long, default_value = "1")]
        turns: u32,
        /// Turn counter-clockwise instead of clockwise
        #[arg(long)]
        counter_clockwise: bool,
        /// Request all turns at once; requests during a turn are dropped
        #[arg(long)]
        no_wait: bool,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Press keys against a camera scheme and print the resulting view
    View {
        /// Camera scheme: orbit or free
        #[arg(short, long, default_value = "orbit")]
        camera: CameraScheme,
        /// Keys to press in order, comma separated (e.g. left,up,u,f)
        #[arg(short, long = "press", value_delimiter = ',')]
        presses: Vec<Key>,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct TurnReport<'a> {
    tick: u64,
    turns_completed: u64,
    solved: bool,
    events: &'a [CubeEvent],
    grid: &'a CubeGrid,
}

#[derive(Serialize)]
struct ViewReport {
    scheme: CameraScheme,
    applied: usize,
    ignored: usize,
    turns_completed: u64,
    view: RenderView,
}

/// Log level for the subscriber. Logs go to stderr so `--json` output stays clean.
fn log_filter(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "info" }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(log_filter(cli.verbose)))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Info => info()?,
        Commands::Turn {
            turns,
            counter_clockwise,
            no_wait,
            json,
        } => {
            let direction = if counter_clockwise {
                TurnDirection::CounterClockwise
            } else {
                TurnDirection::Clockwise
            };
            turn(turns, direction, no_wait, json)?;
        }
        Commands::View {
            camera,
            presses,
            json,
        } => view(camera, &presses, json)?,
    }

    Ok(())
}

fn info() -> anyhow::Result<()> {
    let mut cube = Cube::new();
    println!("cubegrid-cli v{}", env!("CARGO_PKG_VERSION"));
    println!(
        "grid: {} sub-cubes, {} in the front layer",
        cube.grid().len(),
        cube.grid().front_layer().count()
    );

    cube.rotate_front(TurnDirection::Clockwise);
    let ticks = cube.settle();
    println!(
        "turn: {ticks} ticks per quarter turn at {:.1} deg/tick",
        DEFAULT_ANGULAR_SPEED.to_degrees()
    );

    let mut backend = RecordingBackend::new();
    let scene = CubeScene::new(&mut backend, &DEBUG_PROGRAM, cube.grid())?;
    backend.clear_calls();
    scene.draw(&mut backend, &RenderView::default(), &cube)?;
    let calls: BTreeMap<_, _> = call_histogram(backend.calls()).into_iter().collect();
    println!("frame: {} backend calls", backend.calls().len());
    for (kind, count) in calls {
        println!("  {kind}: {count}");
    }
    Ok(())
}

fn turn(turns: u32, direction: TurnDirection, no_wait: bool, json: bool) -> anyhow::Result<()> {
    let mut cube = Cube::new();
    for _ in 0..turns {
        cube.rotate_front(direction);
        if !no_wait {
            cube.settle();
        }
    }
    cube.settle();

    if json {
        let report = TurnReport {
            tick: cube.tick(),
            turns_completed: cube.turns_completed(),
            solved: cube.is_solved(),
            events: cube.events(),
            grid: cube.grid(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!(
            "{}",
            DebugTextRenderer::new().render(&cube, &RenderView::default())
        );
    }
    Ok(())
}

fn view(scheme: CameraScheme, presses: &[Key], json: bool) -> anyhow::Result<()> {
    let keymap = Keymap::for_scheme(scheme);
    let mut camera = ActiveCamera::new(scheme);
    let mut cube = Cube::new();
    let (mut applied, mut ignored) = (0, 0);

    for &key in presses {
        let handled = match keymap.action(key) {
            Some(Action::Camera(action)) => camera.apply(action),
            Some(Action::RotateFront(direction)) => {
                let started = cube.rotate_front(direction);
                cube.settle();
                started
            }
            Some(Action::ToggleHud | Action::Quit) | None => false,
        };
        if handled {
            applied += 1;
        } else {
            tracing::warn!(%key, %scheme, "key has no effect here");
            ignored += 1;
        }
    }

    let render_view = RenderView::from_camera(&camera, Projection::default());
    if json {
        let report = ViewReport {
            scheme,
            applied,
            ignored,
            turns_completed: cube.turns_completed(),
            view: render_view,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", DebugTextRenderer::new().render(&cube, &render_view));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_log_level_is_info() {
        let cli = Cli::try_parse_from(["cubegrid-cli", "info"]).unwrap();
        assert_eq!(log_filter(cli.verbose), "info");
        let cli = Cli::try_parse_from(["cubegrid-cli", "--verbose", "info"]).unwrap();
        assert_eq!(log_filter(cli.verbose), "debug");
    }
}
