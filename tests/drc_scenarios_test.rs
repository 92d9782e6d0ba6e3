// End-to-end checks of small boards against single passes
use board_drc::board::{
    AirWire, Board, ComponentSide, Device, Footprint, FootprintPad, Hole, LayerStack, NetLine, NetSegment,
    NetSignalId, PadShape, PolygonShape, Via, BOARD_OUTLINES, TOP_COPPER, TOP_COURTYARD,
};
use board_drc::drc::{check_board, CheckKind, DrcReport};
use board_drc::geometry::{Angle, Length, Path, Point};
use board_drc::rules::{CheckOptions, RuleSet, RuleSetData};
use std::time::Instant;

fn mm(v: f64) -> Length {
    Length::from_mm(v)
}

/// 100mm x 100mm board with two copper layers
fn board() -> Board {
    let mut board = Board::new("scenario", LayerStack::standard(0));
    board.polygons.push(PolygonShape::new(
        BOARD_OUTLINES,
        Path::rect(Point::from_mm(0.0, 0.0), Point::from_mm(100.0, 100.0)),
        Length::ZERO,
        false,
    ));
    board
}

fn add_trace(board: &mut Board, net: Option<NetSignalId>, start: Point, end: Point, width: Length) {
    board.net_segments.push(NetSegment {
        net,
        vias: vec![],
        lines: vec![NetLine::new(TOP_COPPER, start, end, width)],
    });
}

fn add_via(board: &mut Board, net: Option<NetSignalId>, position: Point, size: Length, drill: Length) {
    board.net_segments.push(NetSegment {
        net,
        vias: vec![Via::new(position, size, drill)],
        lines: vec![],
    });
}

fn tht_pad(name: &str, size: Length, drill: Length, net: Option<NetSignalId>) -> FootprintPad {
    FootprintPad {
        name: name.to_string(),
        position: Point::from_nm(0, 0),
        rotation: Angle::ZERO,
        shape: PadShape::Round,
        width: size,
        height: size,
        component_side: ComponentSide::Top,
        holes: vec![Hole::round(Point::from_nm(0, 0), drill)],
        net,
    }
}

fn courtyard_device(name: &str, x: f64, y: f64) -> Device {
    let footprint = Footprint {
        polygons: vec![PolygonShape::new(
            TOP_COURTYARD,
            Path::rect(Point::from_mm(-1.0, -1.0), Point::from_mm(1.0, 1.0)),
            Length::ZERO,
            false,
        )],
        ..Footprint::default()
    };
    Device::new(name, Point::from_mm(x, y), footprint)
}

fn run(board: &Board, options: CheckOptions) -> DrcReport {
    let start = Instant::now();
    let report = check_board(board, options).expect("check failed");
    println!("{} message(s) in {:?}", report.violations.len(), start.elapsed());
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_narrow_trace_reported_once() {
        let mut board = board();
        let gnd = board.add_net_signal("GND");
        add_trace(&mut board, Some(gnd), Point::from_mm(10.0, 10.0), Point::from_mm(20.0, 10.0), mm(0.1));
        add_trace(&mut board, None, Point::from_mm(10.0, 20.0), Point::from_mm(20.0, 20.0), mm(0.25));

        let options = CheckOptions {
            check_copper_width: true,
            min_copper_width: mm(0.2),
            ..CheckOptions::none()
        };
        let report = run(&board, options);
        assert_eq!(report.messages(), vec!["Min. copper width (Top Copper) of trace: 0.1mm"]);
        assert_eq!(report.violations[0].kind, CheckKind::CopperWidth);
        assert_eq!(report.violations[0].layer.as_deref(), Some(TOP_COPPER));
    }

    #[test]
    fn test_copper_clearance_boundary_is_exclusive() {
        let clearance = mm(0.2);
        let options = CheckOptions {
            check_copper_copper_clearance: true,
            min_copper_copper_clearance: clearance,
            ..CheckOptions::none()
        };
        // Trace edges at y = +-0.1mm around the centerline
        let report_for_gap = |gap: i64| {
            let mut board = board();
            let a = board.add_net_signal("A");
            let b = board.add_net_signal("B");
            add_trace(&mut board, Some(a), Point::from_mm(10.0, 10.0), Point::from_mm(20.0, 10.0), mm(0.2));
            let y = mm(10.0).nm() + 200_000 + gap;
            add_trace(
                &mut board,
                Some(b),
                Point::from_nm(mm(10.0).nm(), y),
                Point::from_nm(mm(20.0).nm(), y),
                mm(0.2),
            );
            run(&board, options.clone())
        };

        let too_close = report_for_gap(clearance.nm() - 1);
        assert_eq!(too_close.messages(), vec!["Clearance (Top Copper): 'A' <-> 'B'"]);
        assert!(!too_close.violations[0].locations.is_empty());

        let exact = report_for_gap(clearance.nm());
        assert!(exact.violations.is_empty(), "{:?}", exact.messages());
    }

    #[test]
    fn test_each_net_pair_reported_once() {
        let mut board = board();
        let nets: Vec<NetSignalId> = ["A", "B", "C"].iter().map(|n| board.add_net_signal(*n)).collect();
        // Three parallel traces 0.05mm apart from each other
        for (i, net) in nets.iter().enumerate() {
            let y = 10.0 + 0.25 * i as f64;
            add_trace(&mut board, Some(net.clone()), Point::from_mm(10.0, y), Point::from_mm(20.0, y), mm(0.2));
        }
        let options = CheckOptions {
            check_copper_copper_clearance: true,
            // A and C are 0.3mm apart
            min_copper_copper_clearance: mm(0.35),
            ..CheckOptions::none()
        };
        let report = run(&board, options);
        assert_eq!(
            report.messages(),
            vec![
                "Clearance (Top Copper): 'A' <-> 'B'",
                "Clearance (Top Copper): 'A' <-> 'C'",
                "Clearance (Top Copper): 'B' <-> 'C'",
            ]
        );
    }

    #[test]
    fn test_island_inside_other_net_found_wherever_other_islands_are() {
        let options = CheckOptions {
            check_copper_copper_clearance: true,
            ..CheckOptions::none()
        };
        for far in [None, Some((90.0, 90.0)), Some((5.0, 5.0)), Some((5.0, 90.0))] {
            let mut board = board();
            let a = board.add_net_signal("A");
            let b = board.add_net_signal("B");
            // Net B covers 30mm..70mm vertically, net A has a short trace in its middle
            add_trace(&mut board, Some(b), Point::from_mm(30.0, 50.0), Point::from_mm(70.0, 50.0), mm(40.0));
            add_trace(&mut board, Some(a.clone()), Point::from_mm(45.0, 50.0), Point::from_mm(55.0, 50.0), mm(0.2));
            if let Some((x, y)) = far {
                add_trace(&mut board, Some(a), Point::from_mm(x, y), Point::from_mm(x + 1.0, y), mm(0.2));
            }
            let report = run(&board, options.clone());
            assert_eq!(
                report.messages(),
                vec!["Clearance (Top Copper): 'A' <-> 'B'"],
                "far island at {:?}",
                far
            );
        }
    }

    #[test]
    fn test_same_net_copper_never_conflicts() {
        let mut board = board();
        let gnd = board.add_net_signal("GND");
        add_trace(&mut board, Some(gnd.clone()), Point::from_mm(10.0, 10.0), Point::from_mm(20.0, 10.0), mm(0.2));
        add_trace(&mut board, Some(gnd), Point::from_mm(10.0, 10.25), Point::from_mm(20.0, 10.25), mm(0.2));
        let options = CheckOptions {
            check_copper_copper_clearance: true,
            ..CheckOptions::none()
        };
        assert!(run(&board, options).violations.is_empty());
    }

    #[test]
    fn test_copper_near_board_edge() {
        let mut board = board();
        let gnd = board.add_net_signal("GND");
        add_trace(&mut board, Some(gnd), Point::from_mm(10.0, 0.2), Point::from_mm(20.0, 0.2), mm(0.2));
        add_trace(&mut board, None, Point::from_mm(10.0, 50.0), Point::from_mm(20.0, 50.0), mm(0.2));
        let options = CheckOptions {
            check_copper_board_clearance: true,
            min_copper_board_clearance: mm(0.3),
            ..CheckOptions::none()
        };
        let report = run(&board, options);
        assert_eq!(report.messages(), vec!["Clearance (Top Copper): 'GND' <-> Board Outline"]);
        assert_eq!(report.violations[0].kind, CheckKind::BoardClearance);
    }

    #[test]
    fn test_copper_around_npth() {
        let mut board = board();
        board.holes.push(Hole::round(Point::from_mm(50.0, 50.0), mm(1.0)));
        // Trace edge 0.1mm away from the hole
        add_trace(&mut board, None, Point::from_mm(50.7, 45.0), Point::from_mm(50.7, 55.0), mm(0.2));
        let options = CheckOptions {
            check_copper_npth_clearance: true,
            min_copper_npth_clearance: mm(0.25),
            ..CheckOptions::none()
        };
        let report = run(&board, options);
        assert_eq!(report.messages(), vec!["Clearance (Top Copper): '' <-> Board Outline"]);
    }

    #[test]
    fn test_small_npth_reported_as_drill_only() {
        let mut board = board();
        board.holes.push(Hole::round(Point::from_mm(50.0, 50.0), mm(0.2)));
        let options = CheckOptions {
            check_npth_drill_diameter: true,
            min_npth_drill_diameter: mm(0.3),
            check_pth_annular_ring: true,
            ..CheckOptions::none()
        };
        let report = run(&board, options);
        assert_eq!(report.messages(), vec!["Min. hole diameter: 0.2mm < 0.3mm"]);
        assert_eq!(report.count(CheckKind::AnnularRing), 0);
    }

    #[test]
    fn test_via_annular_ring() {
        let options = CheckOptions {
            check_pth_annular_ring: true,
            min_pth_annular_ring: mm(0.2),
            ..CheckOptions::none()
        };
        let report_for_size = |size: Length| {
            let mut board = board();
            let gnd = board.add_net_signal("GND");
            add_via(&mut board, Some(gnd), Point::from_mm(30.0, 30.0), size, mm(0.3));
            run(&board, options.clone())
        };

        assert!(report_for_size(mm(0.7)).violations.is_empty());
        let report = report_for_size(mm(0.6));
        assert_eq!(report.messages(), vec!["Annular ring of via 'GND' < 0.2mm"]);
        assert!(!report.violations[0].locations.is_empty());

        // Copper radius one nanometer short of the exact fit
        let one_short = Length::from_nm(mm(0.7).nm() - 2);
        let report = report_for_size(one_short);
        assert_eq!(report.messages(), vec!["Annular ring of via 'GND' < 0.2mm"]);
    }

    #[test]
    fn test_pad_annular_ring_exact_fit() {
        let options = CheckOptions {
            check_pth_annular_ring: true,
            min_pth_annular_ring: mm(0.2),
            ..CheckOptions::none()
        };
        let report_for_width = |width: Length| {
            let mut board = board();
            let footprint = Footprint {
                pads: vec![FootprintPad {
                    shape: PadShape::Rect,
                    width,
                    ..tht_pad("1", mm(1.2), mm(0.8), None)
                }],
                ..Footprint::default()
            };
            board.devices.push(Device::new("J1", Point::from_mm(40.0, 40.0), footprint));
            run(&board, options.clone())
        };

        assert!(report_for_width(mm(1.2)).violations.is_empty());
        let report = report_for_width(Length::from_nm(mm(1.2).nm() - 2));
        assert_eq!(report.messages(), vec!["Annular ring of pad '1' < 0.2mm"]);
    }

    #[test]
    fn test_pad_annular_ring_uses_pad_text() {
        let mut board = board();
        let vcc = board.add_net_signal("VCC");
        let footprint = Footprint {
            pads: vec![
                tht_pad("1", mm(1.0), mm(0.8), Some(vcc)),
                FootprintPad {
                    position: Point::from_mm(2.54, 0.0),
                    ..tht_pad("2", mm(1.6), mm(0.8), None)
                },
            ],
            ..Footprint::default()
        };
        board.devices.push(Device::new("J1", Point::from_mm(40.0, 40.0), footprint));
        let options = CheckOptions {
            check_pth_annular_ring: true,
            min_pth_annular_ring: mm(0.2),
            ..CheckOptions::none()
        };
        let report = run(&board, options);
        assert_eq!(report.messages(), vec!["Annular ring of pad '1: VCC' < 0.2mm"]);
    }

    #[test]
    fn test_small_pad_drill() {
        let mut board = board();
        let footprint = Footprint {
            pads: vec![tht_pad("1", mm(1.0), mm(0.25), None)],
            ..Footprint::default()
        };
        board.devices.push(Device::new("J1", Point::from_mm(40.0, 40.0), footprint));
        let options = CheckOptions {
            check_pth_drill_diameter: true,
            min_pth_drill_diameter: mm(0.3),
            ..CheckOptions::none()
        };
        let report = run(&board, options);
        assert_eq!(report.messages(), vec!["Min. pad drill diameter ('1'): 0.25mm"]);
    }

    #[test]
    fn test_slot_width_and_advisory() {
        let mut board = board();
        let slot = Path::from_points([
            Point::from_mm(20.0, 20.0),
            Point::from_mm(22.0, 20.0),
            Point::from_mm(22.0, 22.0),
        ]);
        board.holes.push(Hole::slot(slot, mm(0.8)));
        let options = CheckOptions {
            check_npth_slot_width: true,
            min_npth_slot_width: mm(1.0),
            check_npth_slots_warning: true,
            npth_slots_warning: board_drc::rules::SlotsWarningLevel::MultiSegment,
            ..CheckOptions::none()
        };
        let report = run(&board, options);
        assert_eq!(
            report.messages(),
            vec!["Min. NPTH slot width: 0.8mm < 1mm", "Hole is a multi-segment slot"]
        );
        assert_eq!(report.advisory_count(), 1);
    }

    #[test]
    fn test_overlapping_courtyards() {
        let mut board = board();
        board.devices.push(courtyard_device("U1", 10.0, 10.0));
        board.devices.push(courtyard_device("U2", 11.5, 10.0));
        board.devices.push(courtyard_device("U3", 30.0, 10.0));
        let options = CheckOptions {
            check_courtyard_clearance: true,
            ..CheckOptions::none()
        };
        let report = run(&board, options);
        assert_eq!(report.messages(), vec!["Clearance (Top Courtyard): 'U1' <-> 'U2'"]);
        assert_eq!(report.violations[0].kind, CheckKind::CourtyardClearance);
    }

    #[test]
    fn test_missing_connection_from_snapshot() {
        let mut board = board();
        let gnd = board.add_net_signal("GND");
        board.air_wires.push(AirWire {
            net: gnd,
            p1: Point::from_mm(10.0, 10.0),
            p2: Point::from_mm(20.0, 10.0),
        });
        let options = CheckOptions {
            check_missing_connections: true,
            ..CheckOptions::none()
        };
        let report = run(&board, options);
        assert_eq!(report.messages(), vec!["Missing connection: 'GND'"]);
        assert_eq!(report.violations[0].locations.len(), 1);
    }

    #[test]
    fn test_inverted_pad_ring_bounds_rejected() {
        let data = RuleSetData {
            pad_annular_ring_min: mm(0.3),
            pad_annular_ring_max: mm(0.2),
            ..RuleSetData::default()
        };
        assert!(RuleSet::new(data).unwrap_err().is_configuration());

        let mut rules = RuleSet::default();
        let err = rules.set_pad_annular_ring_bounds(mm(0.3), mm(0.2)).unwrap_err();
        assert!(err.is_configuration());
        // Rule set stays valid after a rejected change
        assert!(rules.pad_annular_ring().min() <= rules.pad_annular_ring().max());
    }

    #[test]
    fn test_clean_board_with_default_options() {
        let mut board = board();
        let gnd = board.add_net_signal("GND");
        add_trace(&mut board, Some(gnd.clone()), Point::from_mm(10.0, 10.0), Point::from_mm(20.0, 10.0), mm(0.3));
        add_via(&mut board, Some(gnd), Point::from_mm(20.0, 10.0), mm(0.8), mm(0.4));
        let report = run(&board, CheckOptions::default());
        assert!(report.violations.is_empty(), "{:?}", report.messages());
        assert_eq!(report.status.last().map(String::as_str), Some("Finished with 0 message(s)!"));
    }
}
