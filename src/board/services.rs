//! Operations the checker needs from the surrounding application

use super::items::AirWire;
use super::Board;
use crate::geometry::Path;

/// Freshly computed fill of every plane, indexed like `Board::planes`
pub type PlaneFills = Vec<Vec<Path>>;

/// Plane filling and connectivity live outside the checker. Implementors
/// must not mutate the board while a run borrows it.
pub trait BoardServices {
    /// Recompute all plane fills
    fn rebuild_planes(&mut self, board: &Board) -> anyhow::Result<PlaneFills>;

    /// Connections that are still unrouted
    fn air_wires(&mut self, board: &Board) -> anyhow::Result<Vec<AirWire>>;
}

/// Serves whatever the snapshot already carries
#[derive(Clone, Copy, Debug, Default)]
pub struct SnapshotServices;

impl BoardServices for SnapshotServices {
    fn rebuild_planes(&mut self, board: &Board) -> anyhow::Result<PlaneFills> {
        Ok(board.planes.iter().map(|p| p.fragments.clone()).collect())
    }

    fn air_wires(&mut self, board: &Board) -> anyhow::Result<Vec<AirWire>> {
        Ok(board.air_wires.clone())
    }
}
