//! Passes that call into the board services

use super::{RunContext, Span};
use crate::board::BoardServices;
use crate::drc::types::{CheckKind, Violation};
use crate::error::Result;
use crate::geometry::{Length, Path};
use tracing::warn;

/// Width of the capsule marking an unrouted connection
const AIR_WIRE_LOCATION_WIDTH: Length = Length::from_nm(50_000);

pub(crate) fn rebuild_planes(ctx: &mut RunContext, services: &mut dyn BoardServices, span: Span) -> Result<()> {
    ctx.status("Rebuild planes...");
    let fills = services.rebuild_planes(ctx.board)?;
    if fills.len() != ctx.board.planes.len() {
        warn!(
            "[DRC] Plane rebuild returned {} fills for {} planes",
            fills.len(),
            ctx.board.planes.len()
        );
    }
    ctx.set_plane_fills(fills);
    ctx.progress(span.end);
    Ok(())
}

pub(crate) fn check_missing_connections(
    ctx: &mut RunContext,
    services: &mut dyn BoardServices,
    span: Span,
) -> Result<()> {
    ctx.status("Check for missing connections...");
    for air_wire in services.air_wires(ctx.board)? {
        if !ctx.board.net_signals.contains_key(&air_wire.net) {
            warn!("[DRC] Air wire refers to unknown net '{}'", air_wire.net);
        }
        let message = format!("Missing connection: '{}'", ctx.net_name(Some(&air_wire.net)));
        let location = Path::obround(air_wire.p1, air_wire.p2, AIR_WIRE_LOCATION_WIDTH);
        ctx.report(Violation::new(CheckKind::MissingConnection, message, vec![location]));
    }
    ctx.progress(span.end);
    Ok(())
}
