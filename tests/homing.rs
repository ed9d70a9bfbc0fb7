// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

mod common;

use common::RigBuilder;
use scara_plotter::{
    hw::{Axis, Level},
    HomingError, HomingState, PenState, PulseGenerator,
};

#[test]
fn homes_once_switches_release_and_close() {
    let pulses = PulseGenerator::new();
    let mut rig = RigBuilder::new()
        .switches(|ms| ms < 400 || ms >= 1_200, |ms| ms < 400 || ms >= 1_500)
        .build(&pulses);

    rig.plotter.command_pose(5.0, 5.0, PenState::Down).unwrap();
    assert_ne!(rig.plotter.motion().prev_theta(Axis::One), 0.0);

    assert_eq!(rig.plotter.home(), Ok(()));
    assert_eq!(rig.plotter.homing_state(), HomingState::Done);
    assert!(!rig.plotter.fault());
    assert!(rig.enable.is_high());
    assert_eq!(rig.pen_duty.get(), 2_000);
    assert_eq!(rig.dir_level(Axis::One), Level::High);
    assert_eq!(rig.dir_level(Axis::Two), Level::High);

    for axis in Axis::BOTH {
        assert_eq!(rig.plotter.motion().prev_theta(axis), 0.0);
        assert_eq!(rig.plotter.motion().carried_error(axis), 0.0);
    }

    let log = rig.timer.borrow();
    assert_eq!(log.freq_hz, 4_000);
    assert!(!log.base_running);
    assert_eq!(log.running, [false, false]);

    // The pre-homing move started the base once; homing starts it once more.
    assert_eq!(log.base_starts, 2);

    let homed1 = log.first_halt_after(Axis::One, 400_000).unwrap();
    let homed2 = log.first_halt_after(Axis::Two, 400_000).unwrap();
    assert!((1_215_000..1_250_000).contains(&homed1), "joint 1 homed at {homed1} us");
    assert!((1_515_000..1_550_000).contains(&homed2), "joint 2 homed at {homed2} us");
}

#[test]
fn stuck_switch_fails_without_driving() {
    let pulses = PulseGenerator::new();
    let mut rig = RigBuilder::new().switches(|_| true, |_| false).build(&pulses);

    assert_eq!(rig.plotter.home(), Err(HomingError::SwitchesStuck));
    assert_eq!(rig.plotter.homing_state(), HomingState::TimeoutError);
    assert!(rig.plotter.fault());
    assert!(rig.now_ms() >= 3_000);

    let log = rig.timer.borrow();
    assert_eq!(log.base_starts, 0);
    assert_eq!(log.starts, [0, 0]);
}

#[test]
fn missing_switch_times_out_and_keeps_the_pose() {
    let pulses = PulseGenerator::new();
    let mut rig = RigBuilder::new()
        .switches(|ms| ms >= 500, |_| false)
        .build(&pulses);

    rig.plotter.command_pose(10.0, -5.0, PenState::Down).unwrap();

    assert_eq!(
        rig.plotter.home(),
        Err(HomingError::Timeout {
            joint1_homed: true,
            joint2_homed: false
        })
    );
    assert!(rig.plotter.fault());
    assert_eq!(rig.plotter.homing_state(), HomingState::TimeoutError);
    assert_eq!(rig.plotter.motion().prev_theta(Axis::One), 10.0);
    assert_eq!(rig.plotter.motion().prev_theta(Axis::Two), -5.0);

    let log = rig.timer.borrow();
    assert!(!log.base_running);
    assert_eq!(log.running, [false, false]);
}

#[test]
fn bounce_restarts_the_debounce() {
    let pulses = PulseGenerator::new();
    let mut rig = RigBuilder::new()
        .switches(
            |ms| (1_000..1_003).contains(&ms) || ms >= 1_010,
            |ms| ms >= 600,
        )
        .build(&pulses);

    assert_eq!(rig.plotter.home(), Ok(()));

    let log = rig.timer.borrow();
    let homed1 = log.first_halt_after(Axis::One, 200_000).unwrap();
    assert!(homed1 >= 1_025_000, "joint 1 homed at {homed1} us");
}

#[test]
fn homing_again_clears_the_fault() {
    let pulses = PulseGenerator::new();
    let mut rig = RigBuilder::new()
        .switches(|ms| ms < 3_500 || ms >= 5_000, |ms| ms < 3_500 || ms >= 5_000)
        .build(&pulses);

    assert_eq!(rig.plotter.home(), Err(HomingError::SwitchesStuck));
    assert!(rig.plotter.fault());

    assert_eq!(rig.plotter.home(), Ok(()));
    assert!(!rig.plotter.fault());
    assert_eq!(rig.plotter.homing_state(), HomingState::Done);
}
