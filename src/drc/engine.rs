//! DRC runner
//!
//! [`CheckEngine`] runs the enabled passes in a fixed order on the calling
//! thread. Every pass owns a slice of the progress range; events reach the
//! listener in the order they happen.

use super::algebra::PolygonSet;
use super::checks::{annular, clearance, connections, drills, width, CacheKey, RunContext, Span};
use super::listener::{DrcListener, NullListener};
use super::types::{DrcEvent, DrcReport};
use crate::board::{Board, BoardServices, SnapshotServices};
use crate::error::Result;
use crate::rules::CheckOptions;
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, info, warn};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EngineState {
    #[default]
    Idle,
    Running,
    Finished,
}

pub struct CheckEngine {
    options: CheckOptions,
    state: EngineState,
    /// Copper per (layer, nets), valid for one run only
    cache: HashMap<CacheKey, PolygonSet>,
}

impl CheckEngine {
    /// Fails with a configuration error if the options are invalid
    pub fn new(options: CheckOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            options,
            state: EngineState::Idle,
            cache: HashMap::new(),
        })
    }

    pub fn options(&self) -> &CheckOptions {
        &self.options
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Run all enabled checks against `board`.
    ///
    /// The board must not change while the run borrows it. A geometry or
    /// collaborator failure aborts the run; no partial result is returned.
    pub fn run(
        &mut self,
        board: &Board,
        services: &mut dyn BoardServices,
        listener: &mut dyn DrcListener,
    ) -> Result<DrcReport> {
        let start = Instant::now();
        self.state = EngineState::Running;
        self.cache.clear();

        let mut ctx = RunContext::new(board, &self.options, &mut self.cache, listener);
        let result = execute(&mut ctx, services);
        match result {
            Ok(()) => {
                let report = ctx.finish();
                self.state = EngineState::Finished;
                self.cache.clear();
                info!(
                    "[DRC] Board '{}' checked: {} messages in {:?}",
                    board.name,
                    report.violations.len(),
                    start.elapsed()
                );
                Ok(report)
            }
            Err(e) => {
                drop(ctx);
                self.state = EngineState::Idle;
                self.cache.clear();
                warn!("[DRC] Run aborted after {:?}: {}", start.elapsed(), e);
                Err(e)
            }
        }
    }
}

/// Run with the snapshot's own plane fills and air wires, without events
pub fn check_board(board: &Board, options: CheckOptions) -> Result<DrcReport> {
    let mut engine = CheckEngine::new(options)?;
    engine.run(board, &mut SnapshotServices, &mut NullListener)
}

fn execute(ctx: &mut RunContext, services: &mut dyn BoardServices) -> Result<()> {
    ctx.emit(DrcEvent::Started);
    ctx.progress(5);

    let options = ctx.options;
    if options.rebuild_planes {
        timed(ctx, "Rebuild planes", |ctx| {
            connections::rebuild_planes(ctx, services, Span::new(5, 15))
        })?;
    }
    if options.check_copper_board_clearance || options.check_copper_npth_clearance {
        timed(ctx, "Board clearances", |ctx| {
            clearance::check_board_clearances(ctx, Span::new(15, 40))
        })?;
    }
    if options.check_copper_copper_clearance {
        timed(ctx, "Copper clearances", |ctx| {
            clearance::check_copper_clearances(ctx, Span::new(40, 70))
        })?;
    }
    if options.check_copper_width {
        timed(ctx, "Copper width", |ctx| width::check_copper_width(ctx, Span::new(70, 72)))?;
    }
    if options.check_pth_annular_ring {
        timed(ctx, "Annular rings", |ctx| {
            annular::check_pth_annular_rings(ctx, Span::new(72, 74))
        })?;
    }
    if options.check_npth_drill_diameter {
        timed(ctx, "NPTH drills", |ctx| {
            drills::check_npth_drill_diameters(ctx, Span::new(74, 76))
        })?;
    }
    if options.check_pth_drill_diameter {
        timed(ctx, "PTH drills", |ctx| {
            drills::check_pth_drill_diameters(ctx, Span::new(76, 78))
        })?;
    }
    if options.check_npth_slot_width {
        timed(ctx, "NPTH slot width", |ctx| {
            drills::check_npth_slot_widths(ctx, Span::new(78, 80))
        })?;
    }
    if options.check_pth_slot_width {
        timed(ctx, "PTH slot width", |ctx| {
            drills::check_pth_slot_widths(ctx, Span::new(80, 82))
        })?;
    }
    if options.check_npth_slots_warning {
        timed(ctx, "NPTH slots", |ctx| drills::check_npth_slots(ctx, Span::new(82, 83)))?;
    }
    if options.check_pth_slots_warning {
        timed(ctx, "PTH slots", |ctx| drills::check_pth_slots(ctx, Span::new(83, 84)))?;
    }
    if options.check_courtyard_clearance {
        timed(ctx, "Courtyard clearances", |ctx| {
            clearance::check_courtyard_clearances(ctx, Span::new(84, 88))
        })?;
    }
    if options.check_missing_connections {
        timed(ctx, "Missing connections", |ctx| {
            connections::check_missing_connections(ctx, services, Span::new(88, 90))
        })?;
    }

    let count = ctx.violation_count();
    ctx.status(format!("Finished with {} message(s)!", count));
    ctx.progress(100);
    ctx.emit(DrcEvent::Finished { violations: count });
    Ok(())
}

fn timed<'a, 'l, F>(ctx: &mut RunContext<'a, 'l>, pass: &str, f: F) -> Result<()>
where
    F: FnOnce(&mut RunContext<'a, 'l>) -> Result<()>,
{
    let start = Instant::now();
    let before = ctx.violation_count();
    f(ctx)?;
    debug!(
        "[DRC] {}: {} messages in {:?}",
        pass,
        ctx.violation_count() - before,
        start.elapsed()
    );
    Ok(())
}
