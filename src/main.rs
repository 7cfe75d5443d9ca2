mod config;
mod domain;
mod geometry;
mod interaction;
mod lanes;
mod logging;
mod seed;
mod ui;
mod window;

use std::error::Error;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::config::{display_path, load_config, resolve_seed_path};
use crate::domain::Item;
use crate::geometry::{format_date_range, format_day};
use crate::interaction::Controller;
use crate::lanes::assign_lanes;
use crate::logging::init_logging;
use crate::seed::{load_items, sample_items};
use crate::ui::run_dashboard;
use crate::window::{Zoom, compute_window};

#[derive(Debug, Parser)]
#[command(name = "timeline-lanes", about = "Terminal timeline with lane stacking and drag-to-edit")]
struct Cli {
	/// Seed file with the items to show (JSON or TOML)
	#[arg(long)]
	seed: Option<PathBuf>,
	#[arg(long)]
	config: Option<PathBuf>,
	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
	Dashboard,
	Items,
	Lanes,
	Window {
		#[arg(long, default_value_t = 1.0)]
		scale: f64,
	},
}

fn main() {
	if let Err(err) = run() {
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

fn run() -> Result<(), Box<dyn Error>> {
	let cli = Cli::parse();

	if let Err(err) = init_logging() {
		eprintln!("warning: logging disabled: {err}");
	}

	let config = load_config(cli.config)?;
	let seed_path = resolve_seed_path(cli.seed);
	let items = load_seed(seed_path.as_deref())?;
	tracing::info!(seed = %display_path(seed_path.as_deref()), items = items.len(), "seed loaded");

	match cli.command.unwrap_or(Command::Dashboard) {
		Command::Dashboard => {
			let mut controller = Controller::new(items, config.layout.metrics());
			run_dashboard(&mut controller, seed_path.as_deref(), &config.dashboard)?;
		}
		Command::Items => print_items(&items),
		Command::Lanes => print_lanes(&items),
		Command::Window { scale } => print_window(&items, config.layout.base_day_width, scale),
	}

	Ok(())
}

fn load_seed(path: Option<&Path>) -> Result<Vec<Item>, Box<dyn Error>> {
	match path {
		Some(path) => Ok(load_items(path)?),
		None => Ok(sample_items()),
	}
}

fn print_items(items: &[Item]) {
	if items.is_empty() {
		println!("no items");
		return;
	}

	for item in items {
		println!(
			"{} | {} | {} | {}",
			item.id,
			format_day(item.start),
			format_day(item.end),
			item.name
		);
	}
}

fn print_lanes(items: &[Item]) {
	let lanes = assign_lanes(items, &Default::default());
	if lanes.is_empty() {
		println!("no items");
		return;
	}

	for (index, lane) in lanes.iter().enumerate() {
		let entries = lane
			.iter()
			.map(|item| {
				format!(
					"#{} {} ({})",
					item.id,
					item.name,
					format_date_range(item.start, item.end)
				)
			})
			.collect::<Vec<_>>();
		println!("lane {index}: {}", entries.join(" | "));
	}
}

fn print_window(items: &[Item], base_day_width: f64, scale: f64) {
	if items.is_empty() {
		println!("no items");
		return;
	}

	let zoom = Zoom::clamped(scale);
	let window = compute_window(items, base_day_width, zoom.scale());
	println!("from:       {}", format_day(window.min_date));
	println!("to:         {}", format_day(window.max_date));
	println!("days:       {}", window.total_days);
	println!("scale:      {:.2}", zoom.scale());
	println!("day width:  {:.1}px", window.day_width);
	println!("width:      {:.1}px", window.total_width());
}
