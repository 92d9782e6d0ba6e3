//! Minimum annular ring of vias and plated pad holes
//!
//! A hole passes when a ring of the minimum width around it is covered by
//! copper on every enabled copper layer. The required area is flattened
//! inward and the copper outward, so an exact fit is not reported.

use super::{RunContext, Span};
use crate::drc::algebra::PolygonSet;
use crate::drc::paths::NetFilter;
use crate::drc::types::{CheckKind, Violation};
use crate::error::Result;
use crate::geometry::{FlattenMode, Length, Path};

pub(crate) fn check_pth_annular_rings(ctx: &mut RunContext, span: Span) -> Result<()> {
    ctx.status("Check minimum PTH annular rings...");
    let ring = ctx.options.min_pth_annular_ring;
    let tolerance = ctx.tolerance();
    let board = ctx.board;

    // Area with copper on all layers at once
    let layers = ctx.copper_layers();
    let copper = layers
        .iter()
        .map(|layer| ctx.copper(layer, &NetFilter::All))
        .collect::<Result<Vec<_>>>()?;
    let tht_copper = PolygonSet::intersect_all(&copper)?;

    for segment in &board.net_segments {
        for via in &segment.vias {
            let diameter = via.drill_diameter + ring * 2;
            if diameter <= Length::ZERO {
                continue;
            }
            let required = Path::circle_at(via.position, diameter);
            let remaining = PolygonSet::from_path(&required, tolerance, FlattenMode::Inward)?.subtract(&tht_copper)?;
            if !remaining.is_empty() {
                let message = format!(
                    "Annular ring of via '{}' < {}",
                    ctx.net_name(segment.net.as_ref()),
                    ring.to_mm_string()
                );
                ctx.report(Violation::new(CheckKind::AnnularRing, message, remaining.to_paths()));
            }
        }
    }

    for device in &board.devices {
        for pad in device.footprint.pads.iter().filter(|p| p.is_tht()) {
            let mut areas = Vec::new();
            for hole in &pad.holes {
                let diameter = hole.diameter + ring * 2;
                if diameter <= Length::ZERO {
                    continue;
                }
                areas.extend(
                    hole.path
                        .to_outline_strokes(diameter)
                        .iter()
                        .map(|area| device.pad_to_board(pad, area)),
                );
            }
            if areas.is_empty() {
                continue;
            }
            let remaining = PolygonSet::from_paths(&areas, tolerance, FlattenMode::Inward)?.subtract(&tht_copper)?;
            if !remaining.is_empty() {
                let net = pad.net.as_ref().map(|n| ctx.net_name(Some(n)));
                let message = format!(
                    "Annular ring of pad '{}' < {}",
                    device.pad_display_text(pad, net),
                    ring.to_mm_string()
                );
                ctx.report(Violation::new(CheckKind::AnnularRing, message, remaining.to_paths()));
            }
        }
    }

    ctx.progress(span.end);
    Ok(())
}
