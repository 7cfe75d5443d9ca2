//! Pointer-driven editing of the timeline.
//!
//! [`Controller`] owns the item collection together with the transient drag and name-edit
//! sessions. Renderers read it through accessors and feed pointer input back through
//! `begin_drag`, `on_pointer_move`, `end_drag` and the edit methods. Invalid gestures are dropped
//! without error.

use chrono::{Duration, NaiveDateTime};
use tracing::{debug, info};

use crate::domain::{Item, ItemId, Timeline};
use crate::geometry::{lane_at, normalize_day, pixels_to_days, shift_by_days};
use crate::lanes::{Lane, assign_lanes, lane_of};
use crate::window::{TimelineWindow, Zoom, compute_window};

/// A resized edge must stay at least this far from the opposite edge.
const RESIZE_FLOOR_MINUTES: i64 = 60;
/// Horizontal travel below this is treated as jitter while resizing.
const MIN_EDGE_TRAVEL_PX: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragKind {
    StartEdge,
    EndEdge,
    Move,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DragState {
    pub item_id: ItemId,
    pub kind: DragKind,
    pub origin_x: f64,
    pub origin_y: f64,
    /// Position of the dragged edge (the start edge for moves) as of the last applied update.
    pub anchor: NaiveDateTime,
    pub source_lane: usize,
    pub current_lane: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditState {
    pub item_id: ItemId,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorHint {
    Default,
    Grabbing,
    ResizeStart,
    ResizeEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerOutcome {
    /// No drag is active, or its item is gone.
    Ignored,
    /// The gesture was consumed but nothing visible changed.
    Unchanged,
    /// Item dates or the drag target lane changed.
    Updated,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutMetrics {
    pub base_day_width: f64,
    pub lane_height: f64,
}

#[derive(Debug, Clone)]
pub struct Controller {
    timeline: Timeline,
    lanes: Vec<Lane>,
    zoom: Zoom,
    metrics: LayoutMetrics,
    drag: Option<DragState>,
    edit: Option<EditState>,
}

impl Controller {
    pub fn new(items: Vec<Item>, metrics: LayoutMetrics) -> Self {
        let mut controller = Self {
            timeline: Timeline::new(items),
            lanes: Vec::new(),
            zoom: Zoom::default(),
            metrics,
            drag: None,
            edit: None,
        };
        controller.relayout();
        controller
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn lanes(&self) -> &[Lane] {
        &self.lanes
    }

    pub fn metrics(&self) -> LayoutMetrics {
        self.metrics
    }

    pub fn drag(&self) -> Option<&DragState> {
        self.drag.as_ref()
    }

    pub fn edit(&self) -> Option<&EditState> {
        self.edit.as_ref()
    }

    pub fn scale(&self) -> f64 {
        self.zoom.scale()
    }

    pub fn day_width(&self) -> f64 {
        self.metrics.base_day_width * self.zoom.scale()
    }

    pub fn window(&self) -> Option<TimelineWindow> {
        if self.timeline.is_empty() {
            return None;
        }
        Some(compute_window(
            self.timeline.items(),
            self.metrics.base_day_width,
            self.zoom.scale(),
        ))
    }

    /// True while a drag is in progress; renderers suppress text selection.
    pub fn is_interacting(&self) -> bool {
        self.drag.is_some()
    }

    pub fn cursor(&self) -> CursorHint {
        match self.drag.as_ref().map(|drag| drag.kind) {
            None => CursorHint::Default,
            Some(DragKind::Move) => CursorHint::Grabbing,
            Some(DragKind::StartEdge) => CursorHint::ResizeStart,
            Some(DragKind::EndEdge) => CursorHint::ResizeEnd,
        }
    }

    pub fn zoom_in(&mut self) {
        self.zoom.zoom_in();
        debug!(scale = self.zoom.scale(), "zoomed in");
    }

    pub fn zoom_out(&mut self) {
        self.zoom.zoom_out();
        debug!(scale = self.zoom.scale(), "zoomed out");
    }

    /// Swaps the whole collection, e.g. after the seed file was reloaded.
    pub fn replace_items(&mut self, items: Vec<Item>) {
        self.timeline.replace_items(items);
        self.relayout();
        info!(items = self.timeline.items().len(), lanes = self.lanes.len(), "items replaced");
    }

    pub fn begin_drag(&mut self, id: ItemId, kind: DragKind, x: f64, y: f64) -> bool {
        if let Some(active) = &self.drag {
            debug!(item_id = id, active = active.item_id, "drag already active; ignoring");
            return false;
        }

        let Some(item) = self.timeline.item(id) else {
            return false;
        };
        let Some(lane) = lane_of(&self.lanes, id) else {
            return false;
        };

        let anchor = match kind {
            DragKind::EndEdge => item.end_at(),
            DragKind::StartEdge | DragKind::Move => item.start_at(),
        };

        self.drag = Some(DragState {
            item_id: id,
            kind,
            origin_x: x,
            origin_y: y,
            anchor,
            source_lane: lane,
            current_lane: lane,
        });
        info!(item_id = id, kind = ?kind, lane, "drag started");
        true
    }

    /// Applies pointer travel since the last applied update to the dragged item.
    ///
    /// Date changes and the move target lane are written together, so observers never see one
    /// without the other.
    pub fn on_pointer_move(&mut self, x: f64, y: f64, lane_container_top: f64) -> PointerOutcome {
        let Some(drag) = self.drag.clone() else {
            return PointerOutcome::Ignored;
        };
        let Some(item) = self.timeline.item(drag.item_id).cloned() else {
            debug!(item_id = drag.item_id, "dragged item vanished; ignoring pointer move");
            return PointerOutcome::Ignored;
        };

        let delta_px = x - drag.origin_x;
        let delta_days = pixels_to_days(delta_px, self.day_width());
        let mut next_drag = drag.clone();
        let mut next_item = None;

        match drag.kind {
            DragKind::StartEdge | DragKind::EndEdge => {
                if delta_px.abs() < MIN_EDGE_TRAVEL_PX {
                    return PointerOutcome::Unchanged;
                }
                let Some((resized, anchor)) = resize(&item, &drag, delta_days) else {
                    debug!(item_id = item.id, kind = ?drag.kind, delta_days, "resize rejected");
                    return PointerOutcome::Unchanged;
                };
                next_item = Some(resized);
                next_drag.anchor = anchor;
                next_drag.origin_x = x;
            }
            DragKind::Move => {
                if let Some(lane) = lane_at(
                    y,
                    lane_container_top,
                    self.metrics.lane_height,
                    self.lanes.len(),
                ) {
                    next_drag.current_lane = lane;
                }
                if delta_days != 0.0 {
                    if let Some((moved, anchor)) = shift(&item, &drag, delta_days) {
                        next_item = Some(moved);
                        next_drag.anchor = anchor;
                        next_drag.origin_x = x;
                    }
                }
            }
        }

        let lane_changed = next_drag.current_lane != drag.current_lane;
        let dates_changed = next_item.as_ref().is_some_and(|next| *next != item);

        self.drag = Some(next_drag);
        if let Some(next) = next_item.filter(|_| dates_changed) {
            self.timeline.replace_item(next);
            self.relayout();
        }

        if dates_changed || lane_changed {
            PointerOutcome::Updated
        } else {
            PointerOutcome::Unchanged
        }
    }

    /// Ends the drag. A move that finished on another lane pins the item there unless it is
    /// already pinned. Returns whether a lane override was written.
    pub fn end_drag(&mut self) -> bool {
        let Some(drag) = self.drag.take() else {
            return false;
        };

        if drag.kind != DragKind::Move || drag.current_lane == drag.source_lane {
            debug!(item_id = drag.item_id, "drag finished");
            return false;
        }
        if self.timeline.item(drag.item_id).is_none() {
            debug!(item_id = drag.item_id, "dragged item vanished; nothing to commit");
            return false;
        }
        if let Some(existing) = self.timeline.lane_override(drag.item_id) {
            debug!(item_id = drag.item_id, existing, "lane override already set; keeping it");
            return false;
        }

        self.timeline
            .set_lane_override(drag.item_id, drag.current_lane);
        self.relayout();
        info!(
            item_id = drag.item_id,
            from = drag.source_lane,
            to = drag.current_lane,
            "lane override committed"
        );
        true
    }

    pub fn begin_edit(&mut self, id: ItemId) -> bool {
        let Some(item) = self.timeline.item(id) else {
            return false;
        };
        self.edit = Some(EditState {
            item_id: id,
            value: item.name.clone(),
        });
        true
    }

    pub fn update_edit(&mut self, value: impl Into<String>) {
        if let Some(edit) = &mut self.edit {
            edit.value = value.into();
        }
    }

    /// Ends the edit session, renaming the item when the trimmed value is not blank.
    pub fn commit_name_edit(&mut self) -> bool {
        let Some(edit) = self.edit.take() else {
            return false;
        };

        if !self.timeline.rename(edit.item_id, &edit.value) {
            debug!(item_id = edit.item_id, "name edit dropped");
            return false;
        }
        self.relayout();
        info!(item_id = edit.item_id, name = edit.value.trim(), "item renamed");
        true
    }

    pub fn cancel_edit(&mut self) {
        self.edit = None;
    }

    fn relayout(&mut self) {
        self.lanes = assign_lanes(self.timeline.items(), self.timeline.overrides());
    }
}

fn resize_floor() -> Duration {
    Duration::minutes(RESIZE_FLOOR_MINUTES)
}

/// Moves one edge to `anchor + delta_days`, refusing to bring it within the floor of the other edge.
fn resize(item: &Item, drag: &DragState, delta_days: f64) -> Option<(Item, NaiveDateTime)> {
    let candidate = shift_by_days(drag.anchor, delta_days)?;
    match drag.kind {
        DragKind::StartEdge => {
            if candidate >= item.end_at() - resize_floor() {
                return None;
            }
            Some((item.with_dates(normalize_day(candidate), item.end), candidate))
        }
        DragKind::EndEdge => {
            if candidate <= item.start_at() + resize_floor() {
                return None;
            }
            Some((item.with_dates(item.start, normalize_day(candidate)), candidate))
        }
        DragKind::Move => None,
    }
}

/// Shifts the whole item, keeping its duration.
fn shift(item: &Item, drag: &DragState, delta_days: f64) -> Option<(Item, NaiveDateTime)> {
    let start = shift_by_days(drag.anchor, delta_days)?;
    let end = start.checked_add_signed(item.duration())?;
    Some((
        item.with_dates(normalize_day(start), normalize_day(end)),
        start,
    ))
}
