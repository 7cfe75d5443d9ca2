use std::error::Error;
use std::io;
use std::path::Path;
use std::time::{Duration as StdDuration, Instant};

use chrono::Datelike;
use crossterm::event::{
	self, DisableMouseCapture, EnableMouseCapture, Event as CEvent, KeyCode, KeyEventKind, MouseButton,
	MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::{Frame, Terminal};

use crate::config::{display_path, DashboardConfig};
use crate::domain::{Item, ItemId};
use crate::geometry::{format_date_range, format_day, item_span, shows_date_range};
use crate::interaction::{Controller, CursorHint, DragKind, DragState, EditState, PointerOutcome};
use crate::load_seed;
use crate::window::{day_labels, month_labels, TimelineWindow};

const ITEM_COLORS: [Color; 5] = [
	Color::LightBlue,
	Color::LightGreen,
	Color::LightMagenta,
	Color::Rgb(255, 183, 110),
	Color::Rgb(255, 170, 205),
];
const ODD_LANE_BACKGROUND: Color = Color::Rgb(32, 34, 40);
const DRAG_TARGET_BACKGROUND: Color = Color::Rgb(30, 52, 92);
const HEADER_ROWS: u16 = 2;
const PAN_STEP_COLS: i32 = 4;
const PAN_DRAG_FACTOR: i32 = 2;
const EDGE_HANDLE_MIN_WIDTH: i32 = 3;

pub fn run_dashboard(
	controller: &mut Controller,
	seed_path: Option<&Path>,
	config: &DashboardConfig,
) -> Result<(), Box<dyn Error>> {
	enable_raw_mode()?;
	let mut stdout = io::stdout();
	execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
	let backend = CrosstermBackend::new(stdout);
	let mut terminal = Terminal::new(backend)?;

	let result = run_event_loop(&mut terminal, controller, seed_path, config);

	disable_raw_mode()?;
	execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen)?;
	terminal.show_cursor()?;

	result
}

fn run_event_loop(
	terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
	controller: &mut Controller,
	seed_path: Option<&Path>,
	config: &DashboardConfig,
) -> Result<(), Box<dyn Error>> {
	let mut app = App::new(config.clone(), display_path(seed_path));

	loop {
		terminal.draw(|frame| draw_dashboard(frame, &mut app, controller))?;

		if event::poll(StdDuration::from_millis(250))? {
			match event::read()? {
				CEvent::Key(key) => {
					if key.kind != KeyEventKind::Press {
						continue;
					}
					if handle_key(&mut app, key.code, controller, seed_path) {
						break;
					}
				}
				CEvent::Mouse(mouse) => handle_mouse(&mut app, mouse, controller),
				_ => {}
			}
		}
	}

	Ok(())
}

fn draw_dashboard(frame: &mut Frame, app: &mut App, controller: &Controller) {
	let layout = Layout::default()
		.direction(Direction::Vertical)
		.constraints([Constraint::Length(3), Constraint::Min(8), Constraint::Length(5)])
		.split(frame.area());

	render_summary(frame, layout[0], app, controller);
	render_timeline(frame, layout[1], app, controller);
	render_footer(frame, layout[2], app, controller);
}

fn render_summary(frame: &mut Frame, area: Rect, app: &App, controller: &Controller) {
	let range = match controller.window() {
		Some(window) => format!(
			"{} -> {} ({} days)",
			format_day(window.min_date),
			format_day(window.max_date),
			window.total_days
		),
		None => "empty".to_string(),
	};

	let line = Line::from(vec![
		Span::styled(
			format!("zoom {:.2}x", controller.scale()),
			Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
		),
		Span::raw(format!(
			" | {range} | {} lanes | {} items | seed: {}",
			controller.lanes().len(),
			controller.timeline().items().len(),
			app.seed_label
		)),
	]);

	let panel = Paragraph::new(line).block(Block::default().borders(Borders::ALL).title("Timeline"));
	frame.render_widget(panel, area);
}

fn render_timeline(frame: &mut Frame, area: Rect, app: &mut App, controller: &Controller) {
	let block = Block::default().borders(Borders::ALL).title("Lanes");
	let inner = block.inner(area);
	frame.render_widget(block, area);

	app.hits.clear();
	app.canvas = inner;
	if inner.height <= HEADER_ROWS || inner.width == 0 {
		app.body = Rect::default();
		return;
	}

	let header = Rect {
		height: HEADER_ROWS,
		..inner
	};
	let body = Rect {
		y: inner.y + HEADER_ROWS,
		height: inner.height - HEADER_ROWS,
		..inner
	};
	app.body = body;

	let Some(window) = controller.window() else {
		frame.render_widget(Paragraph::new("no items"), body);
		return;
	};

	let total_cols = (window.total_width() / app.config.cell_width).ceil() as i32;
	app.max_scroll = (total_cols - body.width as i32).max(0);
	app.scroll_by(0);

	let buf = frame.buffer_mut();
	render_header(buf, header, app, &window, controller.scale());
	render_lanes(buf, body, app, controller, &window);
}

fn render_header(buf: &mut Buffer, area: Rect, app: &App, window: &TimelineWindow, scale: f64) {
	let month_style = Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD);
	for label in month_labels(window) {
		let column = area.x as i32 + app.column_of(label.position);
		put_text(buf, area, column, area.y, &format!("|{}", label.date.format("%b %Y")), month_style);
	}

	let day_style = Style::default().fg(Color::DarkGray);
	for label in day_labels(window, scale) {
		let column = area.x as i32 + app.column_of(label.position);
		put_text(buf, area, column, area.y + 1, &label.date.day().to_string(), day_style);
	}
}

fn render_lanes(buf: &mut Buffer, body: Rect, app: &mut App, controller: &Controller, window: &TimelineWindow) {
	let lane_rows = app.lane_rows(controller.metrics().lane_height);
	let drag = controller.drag();
	let edit = controller.edit();

	for (index, lane) in controller.lanes().iter().enumerate() {
		let top = body.y as usize + index * lane_rows as usize;
		if top >= body.bottom() as usize {
			break;
		}
		let top = top as u16;
		let rows = lane_rows.min(body.bottom() - top);

		let is_target = drag.is_some_and(|drag| drag.kind == DragKind::Move && drag.current_lane == index);
		let background = if is_target {
			DRAG_TARGET_BACKGROUND
		} else if index % 2 == 1 {
			ODD_LANE_BACKGROUND
		} else {
			Color::Reset
		};
		for row in top..top + rows {
			fill_row(buf, body, body.x as i32, row, body.width as i32, Style::default().bg(background));
		}

		for item in lane {
			let hit = render_item(buf, body, app, item, window, top, rows, drag, edit);
			app.hits.push(hit);
		}
	}
}

#[allow(clippy::too_many_arguments)]
fn render_item(
	buf: &mut Buffer,
	body: Rect,
	app: &App,
	item: &Item,
	window: &TimelineWindow,
	top: u16,
	rows: u16,
	drag: Option<&DragState>,
	edit: Option<&EditState>,
) -> ItemHit {
	let span = item_span(item, window.min_date, window.day_width);
	let left = body.x as i32 + app.column_of(span.left);
	let right = body.x as i32 + app.column_of(span.right());
	let width = (right - left).max(1);

	let mut style = Style::default().fg(Color::Black).bg(item_color(item.id));
	if drag.is_some_and(|drag| drag.item_id == item.id) {
		style = style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
	}
	for row in top..top + rows {
		fill_row(buf, body, left, row, width, style);
	}

	let editing = edit.filter(|edit| edit.item_id == item.id);
	let title = match editing {
		Some(edit) => format!("{}_", edit.value),
		None => item.name.clone(),
	};
	put_text(buf, body, left + 1, top, &truncate(&title, width - 2), style);

	if rows > 1 && editing.is_none() && shows_date_range(item, window.day_width) {
		let range = format_date_range(item.start, item.end);
		put_text(buf, body, left + 1, top + 1, &truncate(&range, width - 2), style.fg(Color::DarkGray));
	}

	if width >= EDGE_HANDLE_MIN_WIDTH {
		put_text(buf, body, left, top, "[", style);
		put_text(buf, body, left + width - 1, top, "]", style);
	}

	ItemHit {
		id: item.id,
		left,
		width,
		top,
		height: rows,
	}
}

fn render_footer(frame: &mut Frame, area: Rect, app: &App, controller: &Controller) {
	let lines = if controller.edit().is_some() {
		vec![
			Line::from("Editing name: type to change | Backspace delete"),
			Line::from("Enter save | Esc cancel | click outside the item saves"),
			status_line(app, controller),
		]
	} else {
		vec![
			Line::from("drag item body move | drag [ ] edges resize | double-click rename | drag empty space pan"),
			Line::from("+/- zoom | h/l or arrows pan | 0 home | r reload seed | q quit"),
			status_line(app, controller),
		]
	};

	let footer = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Shortcuts"));
	frame.render_widget(footer, area);
}

fn status_line(app: &App, controller: &Controller) -> Line<'static> {
	let cursor = match controller.cursor() {
		CursorHint::Default => "pointer",
		CursorHint::Grabbing => "grabbing",
		CursorHint::ResizeStart => "resize start",
		CursorHint::ResizeEnd => "resize end",
	};
	let mut spans = vec![
		Span::raw(app.status.clone()),
		Span::styled(format!(" | {cursor}"), Style::default().fg(Color::DarkGray)),
	];
	if app.selection_locked(controller) {
		spans.push(Span::styled(" | selection locked", Style::default().fg(Color::Yellow)));
	}
	Line::from(spans)
}

fn handle_key(app: &mut App, code: KeyCode, controller: &mut Controller, seed_path: Option<&Path>) -> bool {
	if let Some(mut value) = controller.edit().map(|edit| edit.value.clone()) {
		match code {
			KeyCode::Enter => {
				app.status = if controller.commit_name_edit() {
					"Renamed".to_string()
				} else {
					"Name unchanged".to_string()
				};
			}
			KeyCode::Esc => {
				controller.cancel_edit();
				app.status = "Edit cancelled".to_string();
			}
			KeyCode::Backspace => {
				value.pop();
				controller.update_edit(value);
			}
			KeyCode::Char(ch) => {
				value.push(ch);
				controller.update_edit(value);
			}
			_ => {}
		}
		return false;
	}

	match code {
		KeyCode::Char('q') | KeyCode::Esc => return true,
		KeyCode::Char('+') | KeyCode::Char('=') => {
			controller.zoom_in();
			app.status = format!("Zoom {:.2}x", controller.scale());
		}
		KeyCode::Char('-') => {
			controller.zoom_out();
			app.status = format!("Zoom {:.2}x", controller.scale());
		}
		KeyCode::Left | KeyCode::Char('h') => app.scroll_by(-PAN_STEP_COLS),
		KeyCode::Right | KeyCode::Char('l') => app.scroll_by(PAN_STEP_COLS),
		KeyCode::Home | KeyCode::Char('0') => app.scroll_cols = 0,
		KeyCode::Char('r') => reload_seed(app, controller, seed_path),
		_ => {}
	}

	false
}

fn handle_mouse(app: &mut App, mouse: MouseEvent, controller: &mut Controller) {
	match mouse.kind {
		MouseEventKind::Down(MouseButton::Left) => handle_press(app, mouse.column, mouse.row, controller),
		MouseEventKind::Drag(MouseButton::Left) => handle_pointer_move(app, mouse.column, mouse.row, controller),
		MouseEventKind::Up(MouseButton::Left) => handle_release(app, controller),
		MouseEventKind::ScrollLeft => app.scroll_by(-PAN_STEP_COLS),
		MouseEventKind::ScrollRight => app.scroll_by(PAN_STEP_COLS),
		_ => {}
	}
}

fn handle_press(app: &mut App, column: u16, row: u16, controller: &mut Controller) {
	// A pan owns the pointer until release.
	if app.pan.is_some() {
		return;
	}
	let hit = app.hit_test(column, row);

	if let Some(editing) = controller.edit().map(|edit| edit.item_id) {
		if hit.map(|hit| hit.id) == Some(editing) {
			return;
		}
		app.status = if controller.commit_name_edit() {
			"Renamed".to_string()
		} else {
			"Name unchanged".to_string()
		};
	}

	let Some(hit) = hit else {
		if !controller.is_interacting() && app.canvas.contains(Position::new(column, row)) {
			app.pan = Some(PanState {
				origin_col: column,
				origin_scroll: app.scroll_cols,
			});
		}
		return;
	};

	if app.register_click(hit.id, Instant::now()) {
		if controller.begin_edit(hit.id) {
			app.status = format!("Editing #{}", hit.id);
		}
		return;
	}

	let kind = hit.zone(column);
	let (x, y) = app.pointer_px(column, row, controller.metrics().lane_height);
	if controller.begin_drag(hit.id, kind, x, y) {
		let verb = match kind {
			DragKind::Move => "Moving",
			DragKind::StartEdge | DragKind::EndEdge => "Resizing",
		};
		app.status = format!("{verb} #{}", hit.id);
	}
}

fn handle_pointer_move(app: &mut App, column: u16, row: u16, controller: &mut Controller) {
	if let Some(pan) = app.pan {
		let travel = column as i32 - pan.origin_col as i32;
		app.scroll_cols = 0;
		app.scroll_by(pan.origin_scroll as i32 - travel * PAN_DRAG_FACTOR);
		return;
	}

	let (x, y) = app.pointer_px(column, row, controller.metrics().lane_height);
	if controller.on_pointer_move(x, y, app.lane_container_top()) != PointerOutcome::Updated {
		return;
	}

	if let Some(drag) = controller.drag() {
		if let Some(item) = controller.timeline().item(drag.item_id) {
			app.status = format!(
				"#{} {} | lane {}",
				item.id,
				format_date_range(item.start, item.end),
				drag.current_lane
			);
		}
	}
}

fn handle_release(app: &mut App, controller: &mut Controller) {
	app.pan = None;

	let pending = controller.drag().map(|drag| (drag.item_id, drag.current_lane));
	if controller.end_drag() {
		if let Some((id, lane)) = pending {
			app.status = format!("Pinned #{id} to lane {lane}");
		}
	}
}

fn reload_seed(app: &mut App, controller: &mut Controller, seed_path: Option<&Path>) {
	match load_seed(seed_path) {
		Ok(items) => {
			controller.replace_items(items);
			app.status = format!("Reloaded {}", app.seed_label);
		}
		Err(err) => {
			tracing::warn!(%err, "seed reload failed");
			app.status = format!("Reload failed: {err}");
		}
	}
}

fn item_color(id: ItemId) -> Color {
	ITEM_COLORS[id.rem_euclid(ITEM_COLORS.len() as i64) as usize]
}

fn put_text(buf: &mut Buffer, clip: Rect, x: i32, y: u16, text: &str, style: Style) {
	if y < clip.y || y >= clip.bottom() {
		return;
	}
	for (offset, ch) in text.chars().enumerate() {
		let column = x + offset as i32;
		if column < clip.x as i32 || column >= clip.right() as i32 {
			continue;
		}
		if let Some(cell) = buf.cell_mut((column as u16, y)) {
			cell.set_char(ch).set_style(style);
		}
	}
}

fn fill_row(buf: &mut Buffer, clip: Rect, x: i32, y: u16, width: i32, style: Style) {
	let blank = " ".repeat(width.max(0) as usize);
	put_text(buf, clip, x, y, &blank, style);
}

fn truncate(text: &str, max_chars: i32) -> String {
	text.chars().take(max_chars.max(0) as usize).collect()
}

#[derive(Debug, Clone, Copy)]
struct PanState {
	origin_col: u16,
	origin_scroll: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ItemHit {
	id: ItemId,
	left: i32,
	width: i32,
	top: u16,
	height: u16,
}

impl ItemHit {
	fn contains(&self, column: u16, row: u16) -> bool {
		let column = column as i32;
		column >= self.left && column < self.left + self.width && row >= self.top && row < self.top + self.height
	}

	fn zone(&self, column: u16) -> DragKind {
		let column = column as i32;
		if self.width < EDGE_HANDLE_MIN_WIDTH {
			DragKind::Move
		} else if column == self.left {
			DragKind::StartEdge
		} else if column == self.left + self.width - 1 {
			DragKind::EndEdge
		} else {
			DragKind::Move
		}
	}
}

#[derive(Debug, Clone)]
struct App {
	config: DashboardConfig,
	seed_label: String,
	scroll_cols: u16,
	max_scroll: i32,
	pan: Option<PanState>,
	last_click: Option<(ItemId, Instant)>,
	canvas: Rect,
	body: Rect,
	hits: Vec<ItemHit>,
	status: String,
}

impl App {
	fn new(config: DashboardConfig, seed_label: String) -> Self {
		Self {
			config,
			seed_label,
			scroll_cols: 0,
			max_scroll: 0,
			pan: None,
			last_click: None,
			canvas: Rect::default(),
			body: Rect::default(),
			hits: Vec::new(),
			status: "Ready".to_string(),
		}
	}

	fn lane_rows(&self, lane_height: f64) -> u16 {
		((lane_height / self.config.cell_height).round() as u16).max(1)
	}

	/// Column offset, relative to the body, of a timeline pixel position.
	fn column_of(&self, position: f64) -> i32 {
		(position / self.config.cell_width).floor() as i32 - self.scroll_cols as i32
	}

	/// Maps a terminal cell to timeline pixels. Rows are scaled so that every lane spans exactly
	/// `lane_height` pixels regardless of how many rows it is drawn with.
	fn pointer_px(&self, column: u16, row: u16, lane_height: f64) -> (f64, f64) {
		let x = (column as f64 - self.body.x as f64 + self.scroll_cols as f64) * self.config.cell_width;
		let lane_rows = self.lane_rows(lane_height) as f64;
		let y = self.lane_container_top() + (row as f64 - self.body.y as f64) / lane_rows * lane_height;
		(x, y)
	}

	fn lane_container_top(&self) -> f64 {
		self.body.y as f64 * self.config.cell_height
	}

	fn hit_test(&self, column: u16, row: u16) -> Option<ItemHit> {
		if !self.body.contains(Position::new(column, row)) {
			return None;
		}
		self.hits.iter().rev().find(|hit| hit.contains(column, row)).copied()
	}

	/// Records a press on `id`; true when it completes a double click.
	fn register_click(&mut self, id: ItemId, now: Instant) -> bool {
		let window = StdDuration::from_millis(self.config.double_click_ms);
		let is_double = self
			.last_click
			.is_some_and(|(last_id, at)| last_id == id && now.saturating_duration_since(at) <= window);
		self.last_click = if is_double { None } else { Some((id, now)) };
		is_double
	}

	fn scroll_by(&mut self, delta: i32) {
		let next = (self.scroll_cols as i32 + delta).clamp(0, self.max_scroll.clamp(0, u16::MAX as i32));
		self.scroll_cols = next as u16;
	}

	fn selection_locked(&self, controller: &Controller) -> bool {
		controller.is_interacting() || self.pan.is_some()
	}
}
