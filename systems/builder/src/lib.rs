#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure builder system responsible for emitting tower placement and removal commands.

use grid_defence_core::{CellCoord, Command, PlacementFeedback, TowerId, TowerKind};

/// Declarative placement preview describing a potential tower construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlacementPreview {
    /// Kind of tower proposed for placement.
    pub kind: TowerKind,
    /// Cell the tower would occupy.
    pub cell: CellCoord,
    /// Classification of the placement against the live world.
    pub feedback: PlacementFeedback,
}

impl PlacementPreview {
    /// Creates a new placement preview descriptor.
    #[must_use]
    pub const fn new(kind: TowerKind, cell: CellCoord, feedback: PlacementFeedback) -> Self {
        Self {
            kind,
            cell,
            feedback,
        }
    }

    /// Indicates whether the preview represents a valid placement location.
    #[must_use]
    pub const fn placeable(&self) -> bool {
        matches!(self.feedback, PlacementFeedback::Valid)
    }
}

/// Input snapshot distilled from adapter-provided frame input data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuilderInput {
    /// Indicates whether the player confirmed an action on this frame.
    pub confirm_action: bool,
    /// Indicates whether the player toggled demolish mode on this frame.
    pub toggle_demolish: bool,
    /// Tower kind chosen on this frame, if any.
    pub select: Option<TowerKind>,
    /// Cell currently hovered by the cursor.
    pub cursor_cell: Option<CellCoord>,
}

/// Builder system that translates preview + input into placement commands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Builder {
    selected: Option<TowerKind>,
    demolish: bool,
}

impl Builder {
    /// Creates a new builder system instance.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            selected: None,
            demolish: false,
        }
    }

    /// Tower kind that confirmations will place.
    #[must_use]
    pub const fn selected(&self) -> Option<TowerKind> {
        self.selected
    }

    /// Indicates whether confirmations remove towers instead of placing them.
    #[must_use]
    pub const fn demolish_mode(&self) -> bool {
        self.demolish
    }

    /// Builds the preview for the hovered cell.
    ///
    /// `feedback` should mirror the world's `query::placement_feedback`. No
    /// preview exists in demolish mode or while no tower kind is selected.
    pub fn preview<F>(
        &self,
        cursor_cell: Option<CellCoord>,
        feedback: F,
    ) -> Option<PlacementPreview>
    where
        F: FnOnce(CellCoord) -> PlacementFeedback,
    {
        if self.demolish {
            return None;
        }

        let kind = self.selected?;
        let cell = cursor_cell?;
        Some(PlacementPreview::new(kind, cell, feedback(cell)))
    }

    /// Consumes adapter-derived input to emit builder commands.
    ///
    /// The `tower_at` closure should mirror the semantics of the world's
    /// `query::tower_at` helper so the system can identify the hovered tower.
    pub fn handle<F>(
        &mut self,
        preview: Option<PlacementPreview>,
        input: BuilderInput,
        mut tower_at: F,
        out: &mut Vec<Command>,
    ) where
        F: FnMut(CellCoord) -> Option<TowerId>,
    {
        if input.toggle_demolish {
            self.demolish = !self.demolish;
            self.selected = None;
        }

        if let Some(kind) = input.select {
            self.selected = Some(kind);
            self.demolish = false;
        }

        if !input.confirm_action {
            return;
        }

        if self.demolish {
            if let Some(tower) = input.cursor_cell.and_then(&mut tower_at) {
                out.push(Command::RemoveTower { tower });
            }
            return;
        }

        let Some(preview) = preview else {
            return;
        };

        if preview.placeable() && self.selected == Some(preview.kind) {
            out.push(Command::PlaceTower {
                kind: preview.kind,
                cell: preview.cell,
            });
        }
    }
}
