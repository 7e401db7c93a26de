use std::path::{Path, PathBuf};

use board_packer::api::OptimizeResponse;
use board_packer::render;
use board_packer::types::{PieceSpec, Rect};
use board_packer::Planner;
use clap::Parser;
use tracing::Level;

#[derive(Parser)]
#[command(
    name = "board_packer",
    about = "Lay out rectangular boards on stock sheets"
)]
struct Cli {
    /// Sheet dimensions (LxW, e.g. 96x48)
    #[arg(long, default_value = "96x48")]
    sheet: String,

    /// Boards as LxW:qty or LxW:qty:name (e.g. 30x22:6 36x22:3:top)
    #[arg(long = "boards", num_args = 1..)]
    boards: Vec<String>,

    /// JSON file holding an array of board specs
    #[arg(long)]
    input: Option<PathBuf>,

    /// Disable rotation for boards given with --boards
    #[arg(long)]
    no_rotate: bool,

    /// Show ASCII layout of each sheet
    #[arg(long)]
    layout: bool,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Log planner decisions to stderr
    #[arg(long, short)]
    verbose: bool,
}

fn parse_dimensions(s: &str) -> Result<Rect, String> {
    let (length, width) = s
        .split_once('x')
        .ok_or_else(|| format!("invalid dimensions '{}', expected LxW", s))?;
    let length = length
        .parse::<u32>()
        .map_err(|_| format!("invalid length in '{}'", s))?;
    let width = width
        .parse::<u32>()
        .map_err(|_| format!("invalid width in '{}'", s))?;
    if length == 0 || width == 0 {
        return Err(format!("dimensions must be non-zero in '{}'", s));
    }
    Ok(Rect::new(length, width))
}

fn parse_board(s: &str, index: usize, allow_rotate: bool) -> Result<PieceSpec, String> {
    let parts: Vec<&str> = s.splitn(3, ':').collect();
    if parts.len() < 2 {
        return Err(format!("invalid board '{}', expected LxW:qty[:name]", s));
    }
    let rect = parse_dimensions(parts[0])?;
    let quantity = parts[1]
        .parse::<i32>()
        .map_err(|_| format!("invalid quantity in '{}'", s))?;

    let mut spec = PieceSpec::new(format!("b{}", index + 1), rect.length, rect.width, quantity)
        .with_rotation(allow_rotate);
    if let Some(name) = parts.get(2).filter(|n| !n.is_empty()) {
        spec = spec.with_name(*name);
    }
    Ok(spec)
}

fn read_input(path: &Path) -> Result<Vec<PieceSpec>, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
    serde_json::from_str(&text).map_err(|e| format!("invalid board list in {}: {}", path.display(), e))
}

fn load_specs(cli: &Cli) -> Result<Vec<PieceSpec>, String> {
    let mut specs = cli
        .boards
        .iter()
        .enumerate()
        .map(|(i, b)| parse_board(b, i, !cli.no_rotate))
        .collect::<Result<Vec<_>, _>>()?;
    if let Some(path) = &cli.input {
        specs.extend(read_input(path)?);
    }
    Ok(specs)
}

fn fail(msg: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", msg);
    std::process::exit(1);
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .init();

    let sheet = parse_dimensions(&cli.sheet).unwrap_or_else(|e| fail(e));
    let specs = load_specs(&cli).unwrap_or_else(|e| fail(e));

    let planner = Planner::new(sheet).unwrap_or_else(|e| fail(e));
    let outcome = planner.plan(&specs).unwrap_or_else(|e| fail(e));

    if cli.json {
        let response = OptimizeResponse::from(&outcome);
        match serde_json::to_string_pretty(&response) {
            Ok(json) => println!("{json}"),
            Err(e) => fail(e),
        }
        return;
    }

    for (i, result) in outcome.sheets.iter().enumerate() {
        println!("Sheet {}:", i + 1);
        for p in &result.placements {
            let rot = if p.rotated() { " [rotated]" } else { "" };
            println!("  {} {} @ ({}, {}){}", p.spec.label(), p.rect(), p.x, p.y, rot);
        }
        if cli.layout {
            print!("{}", render::render_sheet(sheet, result));
        }
        println!();
    }

    for spec in &outcome.unplaceable {
        println!(
            "Unplaceable: {} {} x{} does not fit on a {} sheet",
            spec.label(),
            spec.rect(),
            spec.units(),
            sheet
        );
    }

    println!(
        "Summary: {} board{} on {} sheet{}, {:.1}% waste",
        outcome.total_placed,
        if outcome.total_placed == 1 { "" } else { "s" },
        outcome.sheet_count(),
        if outcome.sheet_count() == 1 { "" } else { "s" },
        outcome.waste_percent(),
    );
}
