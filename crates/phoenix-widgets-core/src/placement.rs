//! Placement: boundary enforcement, collision detection and grid search for
//! free positions.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::geometry::{Point, Positionable, Rect, Size, Viewport};

/// Layout limits shared by every widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraints {
    #[serde(default = "default_screen_margin")]
    pub screen_margin: f64,
    #[serde(default = "default_min_width")]
    pub min_width: f64,
    #[serde(default = "default_max_width")]
    pub max_width: f64,
    #[serde(default = "default_min_height")]
    pub min_height: f64,
    #[serde(default = "default_max_height")]
    pub max_height: f64,
    #[serde(default = "default_max_widgets")]
    pub max_widgets: usize,
    /// Minimum gap kept around existing widgets when placing a new one.
    #[serde(default = "default_spacing")]
    pub spacing: f64,
}

fn default_screen_margin() -> f64 {
    10.0
}
fn default_min_width() -> f64 {
    300.0
}
fn default_max_width() -> f64 {
    600.0
}
fn default_min_height() -> f64 {
    120.0
}
fn default_max_height() -> f64 {
    500.0
}
fn default_max_widgets() -> usize {
    8
}
fn default_spacing() -> f64 {
    20.0
}

impl Default for Constraints {
    fn default() -> Self {
        Self {
            screen_margin: default_screen_margin(),
            min_width: default_min_width(),
            max_width: default_max_width(),
            min_height: default_min_height(),
            max_height: default_max_height(),
            max_widgets: default_max_widgets(),
            spacing: default_spacing(),
        }
    }
}

impl Constraints {
    /// Clamp a requested size into the configured min/max box.
    pub fn clamp_size(&self, size: Size) -> Size {
        Size::new(
            size.width.clamp(self.min_width, self.max_width),
            size.height.clamp(self.min_height, self.max_height),
        )
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.min_width > self.max_width {
            return Err(ValidationError::InvalidRange {
                field: "constraints.width".into(),
                min: self.min_width,
                max: self.max_width,
            });
        }
        if self.min_height > self.max_height {
            return Err(ValidationError::InvalidRange {
                field: "constraints.height".into(),
                min: self.min_height,
                max: self.max_height,
            });
        }
        if self.screen_margin < 0.0 || self.spacing < 0.0 {
            return Err(ValidationError::InvalidValue {
                field: "constraints.screen_margin/spacing".into(),
                message: "must not be negative".into(),
            });
        }
        if self.max_widgets == 0 {
            return Err(ValidationError::InvalidValue {
                field: "constraints.max_widgets".into(),
                message: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}

/// Outcome of [`PlacementSolver::enforce_screen_boundaries`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundaryResult {
    pub x: f64,
    pub y: f64,
    /// Whether either coordinate had to move.
    pub constrained: bool,
}

/// An unordered pair of overlapping widgets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collision {
    pub widget1: String,
    pub widget2: String,
}

impl Collision {
    pub fn involves(&self, widget_id: &str) -> bool {
        self.widget1 == widget_id || self.widget2 == widget_id
    }
}

pub const DEFAULT_GRID_STEP: f64 = 50.0;

#[derive(Debug, Clone)]
pub struct PlacementSolver {
    constraints: Constraints,
    grid_step: f64,
}

impl Default for PlacementSolver {
    fn default() -> Self {
        Self::new(Constraints::default())
    }
}

impl PlacementSolver {
    pub fn new(constraints: Constraints) -> Self {
        Self {
            constraints,
            grid_step: DEFAULT_GRID_STEP,
        }
    }

    pub fn with_grid_step(mut self, grid_step: f64) -> Self {
        self.grid_step = grid_step;
        self
    }

    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    pub fn grid_step(&self) -> f64 {
        self.grid_step
    }

    /// Pull an element back inside the viewport (minus margin) and write the
    /// corrected position back.
    ///
    /// When the element is larger than the available area the margin edge
    /// wins. Applying this twice gives the same position as applying it once.
    pub fn enforce_screen_boundaries<P: Positionable + ?Sized>(
        &self,
        element: &mut P,
        viewport: &Viewport,
    ) -> BoundaryResult {
        let rect = element.bounding_rect();
        let margin = self.constraints.screen_margin;
        let current = element.position().unwrap_or_else(|| rect.origin());

        let x = current
            .x
            .min(viewport.width - rect.width - margin)
            .max(margin);
        let y = current
            .y
            .min(viewport.height - rect.height - margin)
            .max(margin);

        element.set_position(Point::new(x, y));

        BoundaryResult {
            x,
            y,
            constrained: x != current.x || y != current.y,
        }
    }

    /// Every overlapping pair, each reported once with the earlier widget first.
    pub fn detect_collisions(&self, widgets: &[(String, Rect)]) -> Vec<Collision> {
        let mut collisions = Vec::new();
        for (i, (id_a, rect_a)) in widgets.iter().enumerate() {
            for (id_b, rect_b) in &widgets[i + 1..] {
                if rect_a.overlaps(rect_b) {
                    collisions.push(Collision {
                        widget1: id_a.clone(),
                        widget2: id_b.clone(),
                    });
                }
            }
        }
        collisions
    }

    /// Candidate grid cells that keep a `size` widget fully inside the
    /// viewport minus margin, column by column.
    pub fn candidate_positions(&self, size: Size, viewport: &Viewport) -> Vec<Point> {
        let margin = self.constraints.screen_margin;
        let mut positions = Vec::new();
        if self.grid_step <= 0.0 || !self.grid_step.is_finite() {
            return positions;
        }

        let max_x = viewport.width - margin - size.width;
        let max_y = viewport.height - margin - size.height;

        let mut x = margin;
        while x <= max_x {
            let mut y = margin;
            while y <= max_y {
                positions.push(Point::new(x, y));
                y += self.grid_step;
            }
            x += self.grid_step;
        }
        positions
    }

    /// Free grid cell closest to the top-left corner, or `None` when the
    /// viewport has no room for `size`.
    ///
    /// A cell is free when it overlaps none of the `existing` rects.
    pub fn find_optimal_position(
        &self,
        existing: &[Rect],
        size: Size,
        viewport: &Viewport,
    ) -> Option<Point> {
        self.nearest_free_cell(existing, size, viewport)
    }

    /// Like [`find_optimal_position`](Self::find_optimal_position), but keeps
    /// at least `padding` pixels between the new widget and every existing one.
    pub fn find_spaced_position(
        &self,
        existing: &[Rect],
        size: Size,
        viewport: &Viewport,
        padding: f64,
    ) -> Option<Point> {
        let padded: Vec<Rect> = existing.iter().map(|r| r.inflate(padding.max(0.0))).collect();
        self.nearest_free_cell(&padded, size, viewport)
    }

    fn nearest_free_cell(&self, blocked: &[Rect], size: Size, viewport: &Viewport) -> Option<Point> {
        let mut best: Option<Point> = None;
        for pos in self.candidate_positions(size, viewport) {
            let candidate = Rect::at(pos, size);
            if blocked.iter().any(|r| candidate.overlaps(r)) {
                continue;
            }
            match best {
                Some(b) if b.distance_from_origin() <= pos.distance_from_origin() => {}
                _ => best = Some(pos),
            }
        }
        best
    }
}
