//! Fixed Lua snippets run by the runtime host.
//!
//! Exec snippets construct the operation controller from the global `args`
//! table and publish it as the global `op`. Stop snippets clear `op` before
//! stopping it, so the namespace is clean even if `stop` raises. Control
//! snippets call one method on `op`.

use cozmonaut_domain::{Diversion, HostCall, Operation};

/// Snippets for one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationScript {
    /// Lua module implementing the controller
    pub module: &'static str,
    pub exec: &'static str,
    pub stop: &'static str,
}

const STOP: &str = r#"
local current = op
op = nil
if current ~= nil then
    current:stop()
end
"#;

const FRIENDS_LIST: OperationScript = OperationScript {
    module: "cozmonaut.operation.friends_list",
    exec: r#"
local Operation = require("cozmonaut.operation.friends_list")
op = Operation.new(args)
op:start()
"#,
    stop: STOP,
};

const FRIENDS_REMOVE: OperationScript = OperationScript {
    module: "cozmonaut.operation.friends_remove",
    exec: r#"
local Operation = require("cozmonaut.operation.friends_remove")
op = Operation.new(args)
op:start()
"#,
    stop: STOP,
};

const INTERACT: OperationScript = OperationScript {
    module: "cozmonaut.operation.interact",
    exec: r#"
local Operation = require("cozmonaut.operation.interact")
op = Operation.new(args)
op:start()
"#,
    stop: STOP,
};

/// Snippets for the given operation.
pub fn operation_script(operation: Operation) -> &'static OperationScript {
    match operation {
        Operation::FriendsList => &FRIENDS_LIST,
        Operation::FriendsRemove => &FRIENDS_REMOVE,
        Operation::Interact => &INTERACT,
    }
}

/// Snippet forwarding a control call to `op`. `None` for `ExecOperation`.
pub fn control_snippet(call: HostCall) -> Option<&'static str> {
    let snippet = match call {
        HostCall::ExecOperation(_) => return None,
        HostCall::AutoEnable => "op:auto_enable()",
        HostCall::AutoDisable => "op:auto_disable()",
        HostCall::TestLowBattery => "op:test_low_battery()",
        HostCall::ManualAdvance => "op:manual_advance()",
        HostCall::ManualReturn => "op:manual_return()",
        HostCall::RequestDiversion(Diversion::Faces) => "op:manual_req_diversion_faces()",
        HostCall::RequestDiversion(Diversion::Converse) => "op:manual_req_diversion_converse()",
        HostCall::RequestDiversion(Diversion::Wander) => "op:manual_req_diversion_wander()",
    };
    Some(snippet)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exec_snippets_require_their_module() {
        for operation in Operation::ALL {
            let script = operation_script(operation);
            assert!(script.module.starts_with("cozmonaut.operation."));
            assert!(script.exec.contains(&format!("require(\"{}\")", script.module)));
            assert!(script.exec.contains("op:start()"));
        }
    }

    #[test]
    fn test_control_snippets_match_call_names() {
        let calls = [
            HostCall::AutoEnable,
            HostCall::AutoDisable,
            HostCall::TestLowBattery,
            HostCall::ManualAdvance,
            HostCall::ManualReturn,
            HostCall::RequestDiversion(Diversion::Faces),
            HostCall::RequestDiversion(Diversion::Converse),
            HostCall::RequestDiversion(Diversion::Wander),
        ];
        for call in calls {
            let snippet = control_snippet(call).unwrap();
            assert_eq!(snippet, format!("op:{}()", call.name()));
        }
    }

    #[test]
    fn test_exec_has_no_control_snippet() {
        assert!(control_snippet(HostCall::ExecOperation(Operation::Interact)).is_none());
    }

    #[test]
    fn test_stop_snippet_clears_op_first() {
        let lua = mlua::Lua::new();
        lua.load(
            r#"
            op = { stop = function() error("boom") end }
            "#,
        )
        .exec()
        .unwrap();

        assert!(lua.load(INTERACT.stop).exec().is_err());
        let op: mlua::Value = lua.globals().get("op").unwrap();
        assert!(op.is_nil());
    }

    #[test]
    fn test_stop_snippet_without_op_is_noop() {
        let lua = mlua::Lua::new();
        lua.load(FRIENDS_LIST.stop).exec().unwrap();
    }
}
