use std::collections::HashMap;

use crate::{
    errors::Error,
    reachy::{ArmJoint, ReachySdk, Side},
    Result,
};

/// In-process stand-in for the Reachy SDK: goals are reached instantly and the
/// gripper reports its last commanded opening.
#[derive(Debug, Default)]
pub struct SimulatedReachy {
    on: bool,
    positions: HashMap<(Side, ArmJoint), f64>,
    grippers: HashMap<Side, f64>,
}

impl SimulatedReachy {
    pub fn turned_on() -> Self {
        Self {
            on: true,
            ..Self::default()
        }
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    /// Last commanded opening, in percent.
    pub fn gripper_opening(&self, side: Side) -> f64 {
        self.grippers.get(&side).copied().unwrap_or_default()
    }

    fn ensure_on(&self) -> Result<()> {
        if !self.on {
            return Err(Error::Sdk("robot is turned off".into()));
        }
        Ok(())
    }
}

impl ReachySdk for SimulatedReachy {
    fn turn_on(&mut self) -> Result<()> {
        self.on = true;
        Ok(())
    }

    fn set_goal_position(&mut self, side: Side, joint: ArmJoint, degrees: f64) -> Result<()> {
        self.ensure_on()?;
        self.positions.insert((side, joint), degrees);
        Ok(())
    }

    fn present_position(&self, side: Side, joint: ArmJoint) -> Result<f64> {
        Ok(self.positions.get(&(side, joint)).copied().unwrap_or_default())
    }

    fn set_gripper_opening(&mut self, side: Side, percent: f64) -> Result<()> {
        self.ensure_on()?;
        self.grippers.insert(side, percent);
        Ok(())
    }

    fn gripper_present_position(&self, side: Side) -> Result<f64> {
        Ok(self.gripper_opening(side))
    }
}
