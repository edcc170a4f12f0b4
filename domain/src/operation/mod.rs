//! Operations and host calls
//!
//! An [`Operation`] is one of the high-level modes the runtime host can run.
//! Once an operation is executed, its controller object lives in the script
//! namespace and the remaining [`HostCall`]s forward to it.

use serde::{Deserialize, Serialize};

/// A high-level mode of the scripting host. Exactly one may be active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Print the known friends.
    #[serde(rename = "list")]
    FriendsList,
    /// Remove a friend.
    #[serde(rename = "remove")]
    FriendsRemove,
    /// Run the interactive robot session.
    #[default]
    Interact,
}

impl Operation {
    pub const ALL: [Operation; 3] = [Self::FriendsList, Self::FriendsRemove, Self::Interact];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FriendsList => "list",
            Self::FriendsRemove => "remove",
            Self::Interact => "interact",
        }
    }
}

impl std::str::FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "list" => Ok(Self::FriendsList),
            "remove" => Ok(Self::FriendsRemove),
            "interact" => Ok(Self::Interact),
            other => Err(format!(
                "unknown operation: '{}'. Valid operations: list, remove, interact",
                other
            )),
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of diversion a manually driven interaction can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Diversion {
    Faces,
    Converse,
    Wander,
}

impl Diversion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Faces => "faces",
            Self::Converse => "converse",
            Self::Wander => "wander",
        }
    }
}

impl std::fmt::Display for Diversion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A procedure call accepted by the runtime host.
///
/// Every variant except [`HostCall::ExecOperation`] forwards to the
/// controller published by the active operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostCall {
    /// Select an operation and run its exec stage.
    ExecOperation(Operation),
    /// Enable automatic interaction.
    AutoEnable,
    /// Disable automatic interaction.
    AutoDisable,
    /// Simulate a low battery condition. Works in manual and automatic modes.
    TestLowBattery,
    /// Manual mode. Advance the active robot from the charger.
    ManualAdvance,
    /// Manual mode. Return the active robot to the charger.
    ManualReturn,
    /// Manual mode. Request a diversion.
    RequestDiversion(Diversion),
}

impl HostCall {
    /// Stable ordinal used in log lines.
    pub fn ordinal(&self) -> u32 {
        match self {
            Self::ExecOperation(_) => 0,
            Self::AutoEnable => 1,
            Self::AutoDisable => 2,
            Self::TestLowBattery => 3,
            Self::ManualAdvance => 4,
            Self::ManualReturn => 5,
            Self::RequestDiversion(Diversion::Faces) => 6,
            Self::RequestDiversion(Diversion::Converse) => 7,
            Self::RequestDiversion(Diversion::Wander) => 8,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::ExecOperation(_) => "op_exec",
            Self::AutoEnable => "auto_enable",
            Self::AutoDisable => "auto_disable",
            Self::TestLowBattery => "test_low_battery",
            Self::ManualAdvance => "manual_advance",
            Self::ManualReturn => "manual_return",
            Self::RequestDiversion(Diversion::Faces) => "manual_req_diversion_faces",
            Self::RequestDiversion(Diversion::Converse) => "manual_req_diversion_converse",
            Self::RequestDiversion(Diversion::Wander) => "manual_req_diversion_wander",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_parse() {
        for op in Operation::ALL {
            assert_eq!(op.as_str().parse::<Operation>().unwrap(), op);
        }
        assert!("dance".parse::<Operation>().is_err());
    }

    #[test]
    fn test_host_call_ordinals_are_unique() {
        let calls = [
            HostCall::ExecOperation(Operation::Interact),
            HostCall::AutoEnable,
            HostCall::AutoDisable,
            HostCall::TestLowBattery,
            HostCall::ManualAdvance,
            HostCall::ManualReturn,
            HostCall::RequestDiversion(Diversion::Faces),
            HostCall::RequestDiversion(Diversion::Converse),
            HostCall::RequestDiversion(Diversion::Wander),
        ];
        let mut ordinals: Vec<u32> = calls.iter().map(HostCall::ordinal).collect();
        ordinals.sort();
        assert_eq!(ordinals, (0..9).collect::<Vec<_>>());
    }

    #[test]
    fn test_exec_ordinal_ignores_operation() {
        assert_eq!(
            HostCall::ExecOperation(Operation::FriendsList).ordinal(),
            HostCall::ExecOperation(Operation::Interact).ordinal()
        );
    }
}
