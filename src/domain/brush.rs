// Draggable brush over the minimap track
use super::viewport::{viewport_to_brush_geometry, BrushGeometry, Viewport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMode {
    Move,
    ResizeLeft,
    ResizeRight,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct DragState {
    mode: DragMode,
    anchor_pointer_x: f64,
    anchor: BrushGeometry,
    track_width: f64,
}

/// Brush geometry plus the gesture currently moving it.
///
/// The brush never writes to the chart itself: callers derive the viewport
/// from [`Brush::on_drag_move`]'s result, and push chart changes back through
/// [`Brush::sync_from_viewport`]. Each mutation goes one way only.
#[derive(Debug, Clone)]
pub struct Brush {
    geometry: BrushGeometry,
    drag: Option<DragState>,
    minimum_width_pct: f64,
}

impl Brush {
    pub fn new(minimum_width_pct: f64) -> Self {
        Self {
            geometry: BrushGeometry::FULL,
            drag: None,
            minimum_width_pct: minimum_width_pct.clamp(f64::EPSILON, 100.0),
        }
    }

    pub fn geometry(&self) -> BrushGeometry {
        self.geometry
    }

    pub fn drag_mode(&self) -> Option<DragMode> {
        self.drag.map(|d| d.mode)
    }

    /// Re-derive the rectangle from the chart's viewport.
    pub fn sync_from_viewport(&mut self, viewport: Option<Viewport>, len: usize) {
        self.geometry = viewport_to_brush_geometry(viewport, len, self.minimum_width_pct);
    }

    /// Begin a gesture. Returns `false` if one is already running or the
    /// track has no width.
    pub fn on_drag_start(&mut self, pointer_x: f64, track_width: f64, mode: DragMode) -> bool {
        if self.drag.is_some() || track_width <= 0.0 {
            return false;
        }
        self.drag = Some(DragState {
            mode,
            anchor_pointer_x: pointer_x,
            anchor: self.geometry,
            track_width,
        });
        true
    }

    /// Follow the pointer. Returns the new geometry, or `None` when no
    /// gesture is active.
    pub fn on_drag_move(&mut self, pointer_x: f64) -> Option<BrushGeometry> {
        let drag = self.drag?;
        let delta_pct = (pointer_x - drag.anchor_pointer_x) / drag.track_width * 100.0;
        self.geometry = apply_drag(drag.mode, drag.anchor, delta_pct, self.minimum_width_pct);
        Some(self.geometry)
    }

    pub fn on_drag_end(&mut self) {
        self.drag = None;
    }
}

/// Clamped geometry for a drag of `delta_pct` away from `anchor`.
pub fn apply_drag(
    mode: DragMode,
    anchor: BrushGeometry,
    delta_pct: f64,
    minimum_width_pct: f64,
) -> BrushGeometry {
    match mode {
        DragMode::Move => {
            let width_pct = anchor.width_pct;
            let left_pct = (anchor.left_pct + delta_pct).clamp(0.0, (100.0 - width_pct).max(0.0));
            BrushGeometry { left_pct, width_pct }
        }
        DragMode::ResizeLeft => {
            // The right edge stays where the gesture found it.
            let right_pct = anchor.right_pct().min(100.0);
            if right_pct < minimum_width_pct {
                return BrushGeometry {
                    left_pct: 0.0,
                    width_pct: minimum_width_pct,
                };
            }
            let left_pct = (anchor.left_pct + delta_pct).clamp(0.0, right_pct - minimum_width_pct);
            BrushGeometry {
                left_pct,
                width_pct: right_pct - left_pct,
            }
        }
        DragMode::ResizeRight => {
            let width_pct = (anchor.width_pct + delta_pct)
                .min(100.0 - anchor.left_pct)
                .max(minimum_width_pct);
            BrushGeometry {
                left_pct: anchor.left_pct.min(100.0 - width_pct),
                width_pct,
            }
        }
    }
}
