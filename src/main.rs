//! Rasterizes one segment and prints the resulting occupancy grid.
//!
//! cargo run -- 0 0 100 100 --scale 2

use clap::{ArgAction, Parser};
use crossterm::queue;
use crossterm::style::{PrintStyledContent, Stylize};
use log::info;
use rasterline::{FragmentPolicy, Grid, Point, Rasterizer, Segment};
use std::io;
use std::io::{stdout, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about = "Rasterize a line segment onto an occupancy grid")]
#[command(allow_negative_numbers = true)]
struct Args {
    /// x of the starting point
    x0: i64,
    /// y of the starting point
    y0: i64,
    /// x of the ending point
    x1: i64,
    /// y of the ending point
    y1: i64,

    /// Resolution multiplier applied to both points
    #[arg(long, short, default_value_t = 1, value_parser = clap::value_parser!(i64).range(1..))]
    scale: i64,

    /// Map line values to the nearest pixel center instead of flooring them
    #[arg(long)]
    center: bool,

    /// Store the filled grid as a bincode file
    #[arg(long)]
    save: Option<PathBuf>,

    /// Print the raw 0/1 matrix, one row per x
    #[arg(long)]
    plain: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let segment = Segment::scaled(
        Point::new(args.x0, args.y0),
        Point::new(args.x1, args.y1),
        args.scale,
    )?;
    let policy = if args.center {
        FragmentPolicy::PixelCenter
    } else {
        FragmentPolicy::Floor
    };
    let grid = Rasterizer::new().with_policy(policy).trace(&segment)?;
    info!("marked {} of {}x{} cells", grid.count_marked(), grid.width(), grid.height());

    let mut out = stdout();
    print_line_info(&mut out, &segment)?;
    if args.plain {
        print_matrix(&mut out, &grid)?;
    } else {
        print_grid(&mut out, &grid)?;
    }
    out.flush()?;

    if let Some(path) = args.save {
        grid.write_to_file(&path)?;
        info!("saved grid to {}", path.display());
    }
    Ok(())
}

fn print_line_info(out: &mut impl Write, segment: &Segment) -> io::Result<()> {
    let show = |value: Option<f64>| value.map_or_else(|| "undefined".to_string(), |v| v.to_string());
    writeln!(out, "{:=^20}", "Line info")?;
    writeln!(out, "    Starting point = {}", segment.start())?;
    writeln!(out, "    Ending point = {}", segment.end())?;
    writeln!(out)?;
    writeln!(out, "    dx = {}", segment.dx())?;
    writeln!(out, "    dy = {}", segment.dy())?;
    writeln!(out)?;
    writeln!(out, "    m = {}", show(segment.slope()))?;
    writeln!(out, "    b = {}", show(segment.intercept()))?;
    writeln!(out, "{}", "=".repeat(20))
}

/// Prints the `[x][y]` matrix, so the line appears transposed.
fn print_matrix(out: &mut impl Write, grid: &Grid) -> io::Result<()> {
    for column in grid.columns() {
        let row: Vec<String> = column.iter().map(u8::to_string).collect();
        writeln!(out, "{}", row.join(" "))?;
    }
    Ok(())
}

/// Draws the grid with `y` growing upwards, two terminal columns per cell.
fn print_grid(out: &mut impl Write, grid: &Grid) -> io::Result<()> {
    for y in (0..grid.height()).rev() {
        for x in 0..grid.width() {
            if grid.is_marked(x, y) {
                queue!(out, PrintStyledContent("██".white()))?;
            } else {
                queue!(out, PrintStyledContent("··".dark_grey()))?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}
