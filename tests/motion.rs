// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

mod common;

use common::RigBuilder;
use scara_plotter::{
    hw::{Axis, Level},
    MotionError, MoveOutcome, PenState, PlotterConfig, PulseGenerator,
};

#[test]
fn moves_that_round_to_nothing_never_start_the_timer() {
    let pulses = PulseGenerator::new();
    let mut rig = RigBuilder::new().blocked_until_ms(u64::MAX).build(&pulses);

    assert_eq!(
        rig.plotter.command_pose(0.0, 0.0, PenState::Up),
        Ok(MoveOutcome::Idle)
    );
    assert_eq!(rig.pen_duty.get(), 2_000);

    assert_eq!(
        rig.plotter.command_pose(0.01, -0.01, PenState::Down),
        Ok(MoveOutcome::Idle)
    );
    assert_eq!(rig.pen_duty.get(), 1_000);
    assert_eq!(rig.plotter.motion().prev_theta(Axis::One), 0.01);
    assert_eq!(rig.plotter.motion().prev_theta(Axis::Two), -0.01);

    // Idle moves skip the obstruction hold.
    assert_eq!(rig.sensor_polls.get(), 0);
    assert_eq!(rig.timer.borrow().base_starts, 0);
}

#[test]
fn move_delivers_rounded_steps_at_draw_rate() {
    let pulses = PulseGenerator::new();
    let mut rig = RigBuilder::new().build(&pulses);

    assert_eq!(
        rig.plotter.command_pose(10.0, -5.0, PenState::Down),
        Ok(MoveOutcome::Completed)
    );
    assert!(!rig.plotter.fault());
    assert!(pulses.is_idle());

    // Joint 1 forward, joint 2 backward on an inverted driver.
    assert_eq!(rig.dir_level(Axis::One), Level::High);
    assert_eq!(rig.dir_level(Axis::Two), Level::High);

    let log = rig.timer.borrow();
    assert_eq!(log.freq_hz, 2_000);
    assert_eq!(log.edges, [2 * 178, 2 * 89]);
    assert!(!log.base_running);
    assert_eq!(log.running, [false, false]);
    // 178 steps at 2 kHz.
    assert!(rig.now.get() >= 89_000);

    assert_eq!(rig.plotter.motion().prev_theta(Axis::One), 10.0);
    assert_eq!(rig.plotter.motion().prev_theta(Axis::Two), -5.0);
}

#[test]
fn idle_joint_channel_stays_off() {
    let pulses = PulseGenerator::new();
    let mut rig = RigBuilder::new().build(&pulses);

    assert_eq!(
        rig.plotter.command_pose(10.0, 0.0, PenState::Down),
        Ok(MoveOutcome::Completed)
    );

    let log = rig.timer.borrow();
    assert_eq!(log.starts, [1, 0]);
    assert_eq!(log.edges, [356, 0]);
}

#[test]
fn stalled_timer_times_out_and_keeps_the_pose() {
    let pulses = PulseGenerator::new();
    let mut rig = RigBuilder::new().build(&pulses);
    rig.timer.borrow_mut().stalled = true;

    assert_eq!(
        rig.plotter.command_pose(10.0, 0.0, PenState::Down),
        Ok(MoveOutcome::TimedOut {
            undelivered: [178, 0]
        })
    );
    assert!(rig.plotter.fault());
    assert!(pulses.is_idle());
    assert!(rig.now_ms() >= 3_000);
    assert!(!rig.timer.borrow().base_running);
    assert_eq!(rig.plotter.motion().prev_theta(Axis::One), 0.0);

    rig.timer.borrow_mut().stalled = false;
    assert_eq!(
        rig.plotter.command_pose(10.0, 0.0, PenState::Down),
        Ok(MoveOutcome::Completed)
    );
    assert_eq!(rig.timer.borrow().edges[0], 356);
}

#[test]
fn partial_delivery_resyncs_the_pose() {
    let pulses = PulseGenerator::new();
    let config = PlotterConfig::default().with_draw_timeout_ms(200);
    let mut rig = RigBuilder::new().config(config).build(&pulses);
    rig.timer.borrow_mut().stall_after_edges = Some(100);

    assert_eq!(
        rig.plotter.command_pose(10.0, 0.0, PenState::Down),
        Ok(MoveOutcome::TimedOut {
            undelivered: [128, 0]
        })
    );

    // 50 steps made it out.
    let spd = rig.plotter.config().joint1.steps_per_deg;
    let prev = rig.plotter.motion().prev_theta(Axis::One);
    assert!((prev - 50.0 / spd).abs() < 1e-4, "prev {prev}");
    assert_eq!(rig.plotter.motion().carried_error(Axis::One), 0.0);

    rig.timer.borrow_mut().stall_after_edges = None;
    assert_eq!(
        rig.plotter.command_pose(10.0, 0.0, PenState::Down),
        Ok(MoveOutcome::Completed)
    );
    assert_eq!(rig.timer.borrow().edges[0], 100 + 2 * 128);
    assert_eq!(rig.plotter.motion().prev_theta(Axis::One), 10.0);
}

#[test]
fn obstruction_holds_the_next_move() {
    let pulses = PulseGenerator::new();
    let mut rig = RigBuilder::new().blocked_until_ms(250).build(&pulses);

    assert_eq!(
        rig.plotter.command_pose(1.0, 0.0, PenState::Down),
        Ok(MoveOutcome::Completed)
    );
    assert!(rig.now_ms() >= 250);
    assert!(rig.sensor_polls.get() > 1);
    assert!(!rig.plotter.fault());
}

#[test]
fn busy_joint_is_refused() {
    let pulses = PulseGenerator::new();
    let mut rig = RigBuilder::new().build(&pulses);
    pulses.arm(Axis::One, 5).unwrap();

    assert_eq!(
        rig.plotter.command_pose(10.0, 0.0, PenState::Down),
        Err(MotionError::Busy(Axis::One))
    );
    assert_eq!(rig.pen_duty.get(), 0);
    assert_eq!(rig.timer.borrow().base_starts, 0);
}
