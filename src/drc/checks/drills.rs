//! Drill diameters, slot widths and slot shape advisories

use super::{RunContext, Span, MIN_LOCATION_WIDTH};
use crate::board::{Device, FootprintPad, Hole, SlotShape};
use crate::drc::types::{CheckKind, Violation};
use crate::error::Result;
use crate::geometry::{Path, Transform};
use crate::rules::SlotsWarningLevel;

const AVOID_OR_CHECK: &str = "Either avoid them or check if your PCB manufacturer supports them.";
const CHOOSE_SLOT_MODE: &str =
    "Choose the desired Excellon slot mode when generating the production data (G85 vs. G00..G03).";
const NO_G85: &str = "The drilled slot mode (G85) will not be available when generating production data.";

/// Board holes and package holes with the transform into board coordinates
fn npth_holes(ctx: &RunContext) -> Vec<(Transform, Hole)> {
    let board = ctx.board;
    let mut holes: Vec<(Transform, Hole)> = board.holes.iter().map(|h| (Transform::IDENTITY, h.clone())).collect();
    for device in &board.devices {
        let transform = device.transform();
        holes.extend(device.footprint.holes.iter().map(|h| (transform, h.clone())));
    }
    holes
}

/// Plated holes of all pads
fn pad_holes<'a>(ctx: &RunContext<'a, '_>) -> Vec<(&'a Device, &'a FootprintPad, &'a Hole)> {
    let board = ctx.board;
    board
        .devices
        .iter()
        .flat_map(|device| {
            device
                .footprint
                .pads
                .iter()
                .flat_map(move |pad| pad.holes.iter().map(move |hole| (device, pad, hole)))
        })
        .collect()
}

fn pad_hole_outlines(device: &Device, pad: &FootprintPad, hole: &Hole) -> Vec<Path> {
    let width = hole.diameter.max(MIN_LOCATION_WIDTH);
    hole.path
        .to_outline_strokes(width)
        .iter()
        .map(|path| device.pad_to_board(pad, path))
        .collect()
}

fn pad_text(ctx: &RunContext, device: &Device, pad: &FootprintPad) -> String {
    let net = pad.net.as_ref().map(|n| ctx.net_name(Some(n)));
    device.pad_display_text(pad, net)
}

pub(crate) fn check_npth_drill_diameters(ctx: &mut RunContext, span: Span) -> Result<()> {
    ctx.status("Check minimum NPTH drill diameters...");
    let min = ctx.options.min_npth_drill_diameter;
    for (transform, hole) in npth_holes(ctx) {
        if hole.is_slot() || hole.diameter >= min {
            continue;
        }
        let message = format!(
            "Min. hole diameter: {} < {}",
            hole.diameter.to_mm_string(),
            min.to_mm_string()
        );
        ctx.report(Violation::new(CheckKind::DrillDiameter, message, hole.outlines(&transform)));
    }
    ctx.progress(span.end);
    Ok(())
}

pub(crate) fn check_pth_drill_diameters(ctx: &mut RunContext, span: Span) -> Result<()> {
    ctx.status("Check minimum PTH drill diameters...");
    let min = ctx.options.min_pth_drill_diameter;
    let board = ctx.board;

    for segment in &board.net_segments {
        for via in &segment.vias {
            if via.drill_diameter >= min {
                continue;
            }
            let message = format!(
                "Min. via drill diameter ('{}'): {}",
                ctx.net_name(segment.net.as_ref()),
                via.drill_diameter.to_mm_string()
            );
            let location = Path::circle_at(via.position, via.drill_diameter.max(MIN_LOCATION_WIDTH));
            ctx.report(Violation::new(CheckKind::DrillDiameter, message, vec![location]));
        }
    }

    for (device, pad, hole) in pad_holes(ctx) {
        if hole.is_slot() || hole.diameter >= min {
            continue;
        }
        let message = format!(
            "Min. pad drill diameter ('{}'): {}",
            pad_text(ctx, device, pad),
            hole.diameter.to_mm_string()
        );
        ctx.report(Violation::new(CheckKind::DrillDiameter, message, pad_hole_outlines(device, pad, hole)));
    }

    ctx.progress(span.end);
    Ok(())
}

pub(crate) fn check_npth_slot_widths(ctx: &mut RunContext, span: Span) -> Result<()> {
    ctx.status("Check minimum NPTH slot width...");
    let min = ctx.options.min_npth_slot_width;
    for (transform, hole) in npth_holes(ctx) {
        if !hole.is_slot() || hole.diameter >= min {
            continue;
        }
        let message = format!(
            "Min. NPTH slot width: {} < {}",
            hole.diameter.to_mm_string(),
            min.to_mm_string()
        );
        ctx.report(Violation::new(CheckKind::SlotWidth, message, hole.outlines(&transform)));
    }
    ctx.progress(span.end);
    Ok(())
}

pub(crate) fn check_pth_slot_widths(ctx: &mut RunContext, span: Span) -> Result<()> {
    ctx.status("Check minimum PTH slot width...");
    let min = ctx.options.min_pth_slot_width;
    for (device, pad, hole) in pad_holes(ctx) {
        if !hole.is_slot() || hole.diameter >= min {
            continue;
        }
        let message = format!(
            "Min. PTH slot width: {} < {}",
            hole.diameter.to_mm_string(),
            min.to_mm_string()
        );
        ctx.report(Violation::new(CheckKind::SlotWidth, message, pad_hole_outlines(device, pad, hole)));
    }
    ctx.progress(span.end);
    Ok(())
}

pub(crate) fn check_npth_slots(ctx: &mut RunContext, span: Span) -> Result<()> {
    ctx.status("Check NPTH slots...");
    let level = ctx.options.npth_slots_warning;
    for (transform, hole) in npth_holes(ctx) {
        if let Some(advisory) = slot_advisory(&hole, level, hole.outlines(&transform)) {
            ctx.report(advisory);
        }
    }
    ctx.progress(span.end);
    Ok(())
}

pub(crate) fn check_pth_slots(ctx: &mut RunContext, span: Span) -> Result<()> {
    ctx.status("Check PTH slots...");
    let level = ctx.options.pth_slots_warning;
    for (device, pad, hole) in pad_holes(ctx) {
        if let Some(advisory) = slot_advisory(hole, level, pad_hole_outlines(device, pad, hole)) {
            ctx.report(advisory);
        }
    }
    ctx.progress(span.end);
    Ok(())
}

/// At most one advisory per hole; the most unusual shape wins
fn slot_advisory(hole: &Hole, level: SlotsWarningLevel, locations: Vec<Path>) -> Option<Violation> {
    let (message, description) = match hole.slot_shape()? {
        SlotShape::Curved if level >= SlotsWarningLevel::Curved => (
            "Hole is a slot with curves",
            format!(
                "Curved slots are a very unusual thing and may cause troubles with many PCB manufacturers.\n{}\n{}",
                AVOID_OR_CHECK, NO_G85
            ),
        ),
        SlotShape::MultiSegment if level >= SlotsWarningLevel::MultiSegment => (
            "Hole is a multi-segment slot",
            format!(
                "Multi-segment slots are a rather unusual thing and may cause troubles with some PCB manufacturers.\n{}\n{}",
                AVOID_OR_CHECK, CHOOSE_SLOT_MODE
            ),
        ),
        SlotShape::Plain if level >= SlotsWarningLevel::All => (
            "Hole is a slot",
            format!(
                "Slots may cause troubles with some PCB manufacturers.\n{}\n{}",
                AVOID_OR_CHECK, CHOOSE_SLOT_MODE
            ),
        ),
        _ => return None,
    };
    Some(
        Violation::new(CheckKind::SlotShape, message, locations)
            .with_description(description)
            .advisory(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Angle, Length, Point, Vertex};

    fn hole(vertices: Vec<Vertex>) -> Hole {
        Hole::slot(Path::new(vertices), Length::from_mm(1.0))
    }

    #[test]
    fn test_slot_advisory_levels() {
        let p = |x: i64, y: i64| Point::from_nm(x, y);
        let plain = hole(vec![Vertex::straight(p(0, 0)), Vertex::straight(p(1000, 0))]);
        let multi = hole(vec![
            Vertex::straight(p(0, 0)),
            Vertex::straight(p(1000, 0)),
            Vertex::straight(p(1000, 1000)),
        ]);
        let curved_multi = hole(vec![
            Vertex::new(p(0, 0), Angle::DEG90),
            Vertex::straight(p(1000, 0)),
            Vertex::straight(p(1000, 1000)),
        ]);

        let msg = |h: &Hole, level| slot_advisory(h, level, vec![]).map(|v| v.message);
        assert_eq!(msg(&plain, SlotsWarningLevel::MultiSegment), None);
        assert_eq!(msg(&plain, SlotsWarningLevel::All).as_deref(), Some("Hole is a slot"));
        assert_eq!(msg(&multi, SlotsWarningLevel::Curved), None);
        assert_eq!(msg(&multi, SlotsWarningLevel::MultiSegment).as_deref(), Some("Hole is a multi-segment slot"));
        assert_eq!(msg(&curved_multi, SlotsWarningLevel::None), None);
        for level in [SlotsWarningLevel::Curved, SlotsWarningLevel::MultiSegment, SlotsWarningLevel::All] {
            assert_eq!(msg(&curved_multi, level).as_deref(), Some("Hole is a slot with curves"));
        }

        let drill = Hole::round(p(0, 0), Length::from_mm(0.3));
        assert_eq!(msg(&drill, SlotsWarningLevel::All), None);
    }

    #[test]
    fn test_advisory_carries_description() {
        let slot = Hole::slot(
            Path::from_points([Point::from_nm(0, 0), Point::from_nm(1000, 0)]),
            Length::from_mm(1.0),
        );
        let advisory = slot_advisory(&slot, SlotsWarningLevel::All, vec![]).unwrap();
        assert!(advisory.is_advisory());
        assert!(advisory.description.unwrap().contains("G85 vs. G00..G03"));
    }
}
