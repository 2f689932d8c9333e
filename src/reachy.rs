//! Bridge between the dataflow and a Reachy 2 arm pair.
//!
//! Actions and reported state share one 16-value layout, radians for arm
//! joints: `[left arm x7, left gripper, right arm x7, right gripper]`.

use std::{thread::sleep, time::Duration};

use tracing::{debug, info};

use crate::{
    errors::Error,
    message::{Message, Metadata},
    node::{Event, Outputs},
    Result,
};

pub const ACTION: &str = "action";
pub const TICK: &str = "tick";
pub const AGENT_POS: &str = "agent_pos";

/// Values per action and per state report.
pub const DOF: usize = 16;

/// Gripper command (radians) that maps to a fully open gripper.
pub const GRIPPER_FULL_OPEN: f64 = 2.26;

/// Gain the start-up pose applies to the left gripper instead of the
/// `GRIPPER_FULL_OPEN` normalisation every other gripper command uses.
pub const STARTUP_LEFT_GRIPPER_GAIN: f64 = 40.0;

/// Pose commanded once the robot is turned on.
pub const INITIAL_POSE: [f64; DOF] = [
    -0.11903145498601328,
    0.11292280260403312,
    0.48048914307403895,
    -1.4491468779308918,
    0.1895427567665842,
    0.009599310885968814,
    -0.20141099568014562,
    2.2656896114349365,
    -0.13212142437597074,
    -0.07731808586334879,
    -0.5141739976375295,
    -1.512502329778286,
    0.00034906585039886593,
    0.3193952531149623,
    0.40474185353748504,
    2.2610876560211,
];

/// Order of the values in `agent_pos`.
pub const JOINT_NAMES: [&str; DOF] = [
    "l_arm_shoulder_pitch",
    "l_arm_shoulder_roll",
    "l_arm_elbow_yaw",
    "l_arm_elbow_pitch",
    "l_arm_wrist_roll",
    "l_arm_wrist_pitch",
    "l_arm_wrist_yaw",
    "l_gripper",
    "r_arm_shoulder_pitch",
    "r_arm_shoulder_roll",
    "r_arm_elbow_yaw",
    "r_arm_elbow_pitch",
    "r_arm_wrist_roll",
    "r_arm_wrist_pitch",
    "r_arm_wrist_yaw",
    "r_gripper",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::Left, Side::Right];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArmJoint {
    ShoulderPitch,
    ShoulderRoll,
    ElbowYaw,
    ElbowPitch,
    WristRoll,
    WristPitch,
    WristYaw,
}

impl ArmJoint {
    pub const ALL: [ArmJoint; 7] = [
        ArmJoint::ShoulderPitch,
        ArmJoint::ShoulderRoll,
        ArmJoint::ElbowYaw,
        ArmJoint::ElbowPitch,
        ArmJoint::WristRoll,
        ArmJoint::WristPitch,
        ArmJoint::WristYaw,
    ];
}

/// The subset of the vendor SDK the bridge drives. Angles are in degrees, as
/// the SDK exposes them.
pub trait ReachySdk {
    fn turn_on(&mut self) -> Result<()>;
    fn set_goal_position(&mut self, side: Side, joint: ArmJoint, degrees: f64) -> Result<()>;
    fn present_position(&self, side: Side, joint: ArmJoint) -> Result<f64>;
    /// `percent` is 0 (closed) to 100 (open).
    fn set_gripper_opening(&mut self, side: Side, percent: f64) -> Result<()>;
    /// Raw gripper reading, reported as is.
    fn gripper_present_position(&self, side: Side) -> Result<f64>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GripperScale {
    /// `value / GRIPPER_FULL_OPEN * 100`
    Normalized,
    Gain(f64),
}

impl GripperScale {
    /// Opening percentage, clamped to 0..=100. NaN closes the gripper.
    pub fn opening(self, value: f64) -> f64 {
        let percent = match self {
            GripperScale::Normalized => value / GRIPPER_FULL_OPEN * 100.0,
            GripperScale::Gain(gain) => value * gain,
        };
        percent.max(0.0).min(100.0)
    }
}

/// Commands all 16 values of `action`.
pub fn apply_action<S: ReachySdk + ?Sized>(
    sdk: &mut S,
    action: &[f64],
    left_gripper: GripperScale,
) -> Result<()> {
    if action.len() != DOF {
        return Err(Error::LengthMismatch {
            expected: DOF,
            actual: action.len(),
        });
    }
    for (side, values) in Side::ALL.into_iter().zip(action.chunks(DOF / 2)) {
        for (joint, radians) in ArmJoint::ALL.into_iter().zip(values) {
            sdk.set_goal_position(side, joint, radians.to_degrees())?;
        }
        let scale = match side {
            Side::Left => left_gripper,
            Side::Right => GripperScale::Normalized,
        };
        sdk.set_gripper_opening(side, scale.opening(values[DOF / 2 - 1]))?;
    }
    Ok(())
}

/// Reads the current state in `JOINT_NAMES` order.
pub fn read_state<S: ReachySdk + ?Sized>(sdk: &S) -> Result<Vec<f64>> {
    let mut state = Vec::with_capacity(DOF);
    for side in Side::ALL {
        for joint in ArmJoint::ALL {
            state.push(sdk.present_position(side, joint)?.to_radians());
        }
        state.push(sdk.gripper_present_position(side)?);
    }
    Ok(state)
}

pub struct ReachyBridge<S> {
    sdk: S,
}

impl<S: ReachySdk> ReachyBridge<S> {
    pub fn new(sdk: S) -> Self {
        Self { sdk }
    }

    pub fn sdk(&self) -> &S {
        &self.sdk
    }

    /// Turns the robot on and moves it to `INITIAL_POSE`, pausing `settle`
    /// after each step.
    pub fn start(&mut self, settle: Duration) -> Result<()> {
        self.sdk.turn_on()?;
        sleep(settle);
        info!("moving to initial pose");
        apply_action(
            &mut self.sdk,
            &INITIAL_POSE,
            GripperScale::Gain(STARTUP_LEFT_GRIPPER_GAIN),
        )?;
        sleep(settle);
        Ok(())
    }

    pub fn handle(&mut self, event: &Event, outputs: &mut impl Outputs) -> Result<()> {
        match event.id.as_str() {
            ACTION => {
                let action: Vec<f64> = event.message.parse()?;
                apply_action(&mut self.sdk, &action, GripperScale::Normalized)
            }
            TICK => {
                let state = read_state(&self.sdk)?;
                outputs.send_output(AGENT_POS, Message::json(Metadata::new(), &state)?)
            }
            other => {
                debug!("ignoring input `{other}`");
                Ok(())
            }
        }
    }
}
