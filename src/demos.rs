//! Fixture case studies, ported from the original implementation's worked
//! examples (`examples/original_source/src/ijrr_example_cozmo.py`), used by
//! the CLI demo and the end-to-end scenario tests.

use crate::buchi::{Buchi, BuchiBuilder, BuchiState, Guard};
use crate::geometry::{Point2, Region};
use crate::robot::Robot;
use crate::workspace::{Request, Workspace};

pub struct Scenario {
    pub robot: Robot,
    pub buchi: Buchi,
    pub requests: Vec<Request>,
}

/// The IJRR "Cozmo" persistent-surveillance case study: workspace 4.8×3.6,
/// regions r1..r4 in the corners, obstacles o1..o4, global mission
/// `[] (<>r1 && <>r2 && <>r3 && <>r4 && !(o1||o2||o3||o4))`.
pub fn ijrr_case_study() -> Scenario {
    let robot_diameter = 0.036;

    let mut wspace = Workspace::new(
        Region::new_box(Point2::new(0.0, 0.0), Point2::new(4.8, 3.6), vec![]).unwrap(),
    );

    wspace.add_region(
        Region::new_box(Point2::new(1.0, 0.2), Point2::new(2.0, 0.8), vec!["r1".into()]).unwrap(),
        false,
    );
    wspace.add_region(
        Region::new_ball(Point2::new(4.2, 0.7), 0.3, vec!["r2".into()]).unwrap(),
        false,
    );
    wspace.add_region(
        Region::new_box(Point2::new(3.7, 1.5), Point2::new(4.5, 2.3), vec!["r3".into()]).unwrap(),
        false,
    );
    wspace.add_region(
        Region::new_box(Point2::new(0.7, 1.8), Point2::new(1.4, 2.3), vec!["r4".into()]).unwrap(),
        false,
    );

    wspace.add_region(
        Region::new_polygon(
            vec![
                Point2::new(0.0, 1.6),
                Point2::new(0.7, 1.34),
                Point2::new(0.7, 1.19),
                Point2::new(0.0, 1.34),
            ],
            vec!["o1".into()],
        )
        .unwrap(),
        false,
    );
    wspace.add_region(
        Region::new_polygon(
            vec![
                Point2::new(1.3, 1.33),
                Point2::new(2.6, 1.2),
                Point2::new(2.19, 1.06),
                Point2::new(1.3, 1.1),
            ],
            vec!["o2".into()],
        )
        .unwrap(),
        false,
    );
    wspace.add_region(
        Region::new_polygon(
            vec![
                Point2::new(3.54, 1.27),
                Point2::new(4.8, 1.52),
                Point2::new(4.8, 1.3),
                Point2::new(3.44, 1.08),
            ],
            vec!["o3".into()],
        )
        .unwrap(),
        false,
    );
    wspace.add_region(
        Region::new_box(Point2::new(0.0, 2.5), Point2::new(4.8, 3.6), vec!["o4".into()]).unwrap(),
        false,
    );

    let robot = Robot::new(
        "cozmo",
        wspace,
        Point2::new(2.0, 2.0),
        0.999,
        robot_diameter,
        0.5,
    );

    let requests = vec![
        Request {
            region: Region::new_ball(Point2::new(3.24, 1.98), 0.3, vec!["fire".into()]).unwrap(),
            name: "fire".into(),
            priority: 1,
        },
        Request {
            region: Region::new_ball(Point2::new(1.26, 0.48), 0.18, vec!["fire".into()]).unwrap(),
            name: "fire".into(),
            priority: 1,
        },
        Request {
            region: Region::new_ball(Point2::new(4.32, 1.48), 0.27, vec!["survivor".into()])
                .unwrap(),
            name: "survivor".into(),
            priority: 0,
        },
    ];

    Scenario {
        robot,
        buchi: ijrr_global_buchi(),
        requests,
    }
}

/// Hand-built Büchi automaton for `[] (<>r1 && <>r2 && <>r3 && <>r4 &&
/// !(o1||o2||o3||o4))`: a single accepting state reachable only once all
/// four regions have been seen since the last visit to the accepting state,
/// and rejecting on any obstacle symbol.
fn ijrr_global_buchi() -> Buchi {
    const START: BuchiState = 0;
    const SEEN_1: BuchiState = 1;
    const SEEN_12: BuchiState = 2;
    const SEEN_123: BuchiState = 3;
    const ACCEPT: BuchiState = 4; // seen r1..r4 since the last visit here

    let no_obstacle = |extra: &'static [&'static str]| {
        let mut g = Guard {
            must_have: extra.iter().map(|s| s.to_string()).collect(),
            must_not_have: vec!["o1".into(), "o2".into(), "o3".into(), "o4".into()],
        };
        g.must_have.sort();
        g
    };

    BuchiBuilder::new()
        .state(START, true, false)
        .state(SEEN_1, false, false)
        .state(SEEN_12, false, false)
        .state(SEEN_123, false, false)
        .state(ACCEPT, false, true)
        .transition(START, no_obstacle(&["r1"]), SEEN_1)
        .transition(START, no_obstacle(&[]), START)
        .transition(SEEN_1, no_obstacle(&["r2"]), SEEN_12)
        .transition(SEEN_1, no_obstacle(&[]), SEEN_1)
        .transition(SEEN_12, no_obstacle(&["r3"]), SEEN_123)
        .transition(SEEN_12, no_obstacle(&[]), SEEN_12)
        .transition(SEEN_123, no_obstacle(&["r4"]), ACCEPT)
        .transition(SEEN_123, no_obstacle(&[]), SEEN_123)
        .transition(ACCEPT, no_obstacle(&["r1"]), SEEN_1)
        .transition(ACCEPT, no_obstacle(&[]), ACCEPT)
        .build()
}

/// A trivial reach scenario: a 1×1 box with regions `a` and `b` in opposite
/// corners, mission `<> a && <> b`.
pub fn trivial_reach_scenario() -> Scenario {
    let mut wspace = Workspace::new(
        Region::new_box(Point2::new(0.0, 0.0), Point2::new(1.0, 1.0), vec![]).unwrap(),
    );
    wspace.add_region(
        Region::new_box(Point2::new(0.0, 0.0), Point2::new(0.2, 0.2), vec!["a".into()]).unwrap(),
        false,
    );
    wspace.add_region(
        Region::new_box(Point2::new(0.8, 0.8), Point2::new(1.0, 1.0), vec!["b".into()]).unwrap(),
        false,
    );
    let robot = Robot::new("r", wspace, Point2::new(0.5, 0.5), 0.3, 0.02, 0.2);

    let buchi = BuchiBuilder::new()
        .state(0, true, false)
        .state(1, false, false)
        .state(2, false, true)
        .transition(0, Guard::new(["a"], []), 1)
        .transition(0, Guard::new([], ["a"]), 0)
        .transition(1, Guard::new(["b"], []), 2)
        .transition(1, Guard::new([], ["b"]), 1)
        .transition(2, Guard::any(), 2)
        .build();

    Scenario {
        robot,
        buchi,
        requests: Vec::new(),
    }
}
