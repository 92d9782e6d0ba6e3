//! Minimum copper width of texts, planes and traces

use super::{RunContext, Span, MIN_LOCATION_WIDTH};
use crate::board::StrokeText;
use crate::drc::types::{CheckKind, Violation};
use crate::error::Result;
use crate::geometry::{Length, Path};

/// Stroke used to outline a plane whose minimum width is too small
const PLANE_LOCATION_WIDTH: Length = Length::from_nm(200_000);

pub(crate) fn check_copper_width(ctx: &mut RunContext, span: Span) -> Result<()> {
    ctx.status("Check minimum copper width...");
    let min_width = ctx.options.min_copper_width;
    let board = ctx.board;

    for text in &board.stroke_texts {
        check_text(ctx, text, min_width);
    }

    for plane in &board.planes {
        if !ctx.is_enabled_copper_layer(&plane.layer) || plane.min_width >= min_width {
            continue;
        }
        let message = format!(
            "Min. copper width ({}) of plane: {}",
            ctx.layer_name(&plane.layer),
            plane.min_width.to_mm_string()
        );
        let locations = plane.outline.closed().to_outline_strokes(PLANE_LOCATION_WIDTH);
        ctx.report(Violation::new(CheckKind::CopperWidth, message, locations).on_layer(plane.layer.as_str()));
    }

    // Device texts are already on their board layer
    for device in &board.devices {
        for text in &device.stroke_texts {
            check_text(ctx, text, min_width);
        }
    }

    for segment in &board.net_segments {
        for line in &segment.lines {
            if !ctx.is_enabled_copper_layer(&line.layer) || line.width >= min_width {
                continue;
            }
            let message = format!(
                "Min. copper width ({}) of trace: {}",
                ctx.layer_name(&line.layer),
                line.width.to_mm_string()
            );
            let location = line.outline(line.width.max(MIN_LOCATION_WIDTH));
            ctx.report(Violation::new(CheckKind::CopperWidth, message, vec![location]).on_layer(line.layer.as_str()));
        }
    }

    ctx.progress(span.end);
    Ok(())
}

fn check_text(ctx: &mut RunContext, text: &StrokeText, min_width: Length) {
    if !ctx.is_enabled_copper_layer(&text.layer) || text.stroke_width >= min_width {
        return;
    }
    let message = format!(
        "Min. copper width ({}) of text: {}",
        ctx.layer_name(&text.layer),
        text.stroke_width.to_mm_string()
    );
    let locations: Vec<Path> = text.outlines(text.stroke_width.max(MIN_LOCATION_WIDTH));
    ctx.report(Violation::new(CheckKind::CopperWidth, message, locations).on_layer(text.layer.as_str()));
}
