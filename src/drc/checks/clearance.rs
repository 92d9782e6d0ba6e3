//! Board outline, copper-copper and courtyard clearance checks

use super::{candidate_pairs, RunContext, Span, MIN_LOCATION_WIDTH};
use crate::board::{BOT_COURTYARD, TOP_COURTYARD};
use crate::drc::algebra::PolygonSet;
use crate::drc::distance::sets_within;
use crate::drc::paths::NetFilter;
use crate::drc::types::{CheckKind, Violation};
use crate::error::Result;
use crate::geometry::{Length, Path, Point};

/// Copper inside the band along the board edge or around non-plated holes
pub(crate) fn check_board_clearances(ctx: &mut RunContext, span: Span) -> Result<()> {
    ctx.status("Check board clearances...");
    let tolerance = ctx.tolerance();
    let options = ctx.options;
    let generator = ctx.generator();

    let mut restricted = PolygonSet::new();
    if options.check_copper_board_clearance {
        let outline = generator.board_outline()?;
        let inner = outline.offset(-options.min_copper_board_clearance, tolerance)?;
        restricted = outline.subtract(&inner)?;
    }
    if options.check_copper_npth_clearance {
        restricted = restricted.union(&generator.holes(options.min_copper_npth_clearance)?)?;
    }
    drop(generator);

    let layers = ctx.copper_layers();
    let nets = ctx.nets();
    let total = layers.len() * nets.len();
    for (layer_index, layer) in layers.iter().enumerate() {
        let layer_name = ctx.layer_name(layer);
        for (i, net) in nets.iter().enumerate() {
            if !restricted.is_empty() {
                let copper = ctx.copper(layer, &NetFilter::single(net.as_ref()))?;
                let overlap = restricted.intersect(&copper)?;
                let message = format!(
                    "Clearance ({}): '{}' <-> Board Outline",
                    layer_name,
                    ctx.net_name(net.as_ref())
                );
                for region in overlap.regions() {
                    ctx.report(
                        Violation::new(CheckKind::BoardClearance, message.clone(), region.to_paths()).on_layer(layer.as_str()),
                    );
                }
            }
            ctx.progress(span.at(layer_index * nets.len() + i + 1, total));
        }
    }
    ctx.progress(span.end);
    Ok(())
}

/// Copper of different nets closer than the minimum clearance. Each pair of
/// nets is looked at once per layer.
pub(crate) fn check_copper_clearances(ctx: &mut RunContext, span: Span) -> Result<()> {
    ctx.status("Check copper clearances...");
    let clearance = ctx.options.min_copper_copper_clearance;
    let tolerance = ctx.tolerance();

    let layers = ctx.copper_layers();
    let nets = ctx.nets();
    let total = layers.len() * nets.len();
    for (layer_index, layer) in layers.iter().enumerate() {
        let layer_name = ctx.layer_name(layer);
        let copper = nets
            .iter()
            .map(|net| ctx.copper(layer, &NetFilter::single(net.as_ref())))
            .collect::<Result<Vec<_>>>()?;
        let pairs = candidate_pairs(&copper, clearance);
        for (i, partners) in pairs.iter().enumerate() {
            for &k in partners {
                let Some(closest) = sets_within(&copper[i], &copper[k], clearance) else {
                    continue;
                };
                let locations = clearance_locations(&copper[i], &copper[k], clearance, closest, tolerance)?;
                let message = format!(
                    "Clearance ({}): '{}' <-> '{}'",
                    layer_name,
                    ctx.net_name(nets[i].as_ref()),
                    ctx.net_name(nets[k].as_ref())
                );
                ctx.report(Violation::new(CheckKind::CopperClearance, message, locations).on_layer(layer.as_str()));
            }
            ctx.progress(span.at(layer_index * nets.len() + i + 1, total));
        }
    }
    ctx.progress(span.end);
    Ok(())
}

/// Area where two copper sets grown towards each other overlap. If rounding
/// leaves nothing, a small circle marks the closest approach.
fn clearance_locations(
    a: &PolygonSet,
    b: &PolygonSet,
    clearance: Length,
    closest: [f64; 2],
    tolerance: Length,
) -> Result<Vec<Path>> {
    let half_up = Length::from_nm((clearance.nm() + 1) / 2);
    let half_down = Length::from_nm(clearance.nm() / 2);
    let overlap = a.offset(half_up, tolerance)?.intersect(&b.offset(half_down, tolerance)?)?;
    if !overlap.is_empty() {
        return Ok(overlap.to_paths());
    }
    let center = Point::from_f64(closest[0], closest[1]);
    Ok(vec![Path::circle_at(center, clearance.max(MIN_LOCATION_WIDTH))])
}

/// Overlapping device courtyards on the top and bottom courtyard layers
pub(crate) fn check_courtyard_clearances(ctx: &mut RunContext, span: Span) -> Result<()> {
    ctx.status("Check courtyard clearances...");
    let tolerance = ctx.tolerance();
    let offset = ctx.options.courtyard_offset;
    let board = ctx.board;

    let layers = [TOP_COURTYARD, BOT_COURTYARD];
    let total = layers.len() * board.devices.len();
    for (layer_index, layer) in layers.into_iter().enumerate() {
        if !board.layers.contains(layer) {
            continue;
        }
        let layer_name = ctx.layer_name(layer);
        let generator = ctx.generator();
        let courtyards = board
            .devices
            .iter()
            .map(|device| generator.device_courtyard(device, layer)?.offset(offset, tolerance))
            .collect::<Result<Vec<_>>>()?;
        drop(generator);

        let pairs = candidate_pairs(&courtyards, Length::ZERO);
        for (i, partners) in pairs.iter().enumerate() {
            for &k in partners {
                let overlap = courtyards[i].intersect(&courtyards[k])?;
                if overlap.is_empty() {
                    continue;
                }
                let message = format!(
                    "Clearance ({}): '{}' <-> '{}'",
                    layer_name, board.devices[i].name, board.devices[k].name
                );
                ctx.report(
                    Violation::new(CheckKind::CourtyardClearance, message, overlap.to_paths()).on_layer(layer),
                );
            }
            ctx.progress(span.at(layer_index * board.devices.len() + i + 1, total));
        }
    }
    ctx.progress(span.end);
    Ok(())
}
