//! Shared fixtures for the end-to-end tests.
//!
//! Every run goes through a registry of host functions that record their
//! calls, so tests can compare outcomes and native call logs.

#![allow(dead_code)]

use std::cell::RefCell;

use indoc::indoc;
use once_cell::sync::Lazy;

use lanes::{
    CompilationOptions, CompiledProgram, Error, ExecutionOptions, NativeError, NativeRegistry,
    Outcome, Value, Vm, compile,
};

/// One native call: function name and the arguments in push order.
pub type Call = (String, Vec<Value>);

/// Result of compiling and running one program.
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub result: Result<Outcome, Error>,
    pub calls: Vec<Call>,
    pub stack: Vec<Value>,
}

/// Natives with fixed behavior, recording every invocation into `log`.
pub fn recording_registry(log: &RefCell<Vec<Call>>) -> NativeRegistry<'_> {
    let mut natives = NativeRegistry::new();
    let mut record = |name: &'static str, arity: usize, result: Option<Value>| {
        natives.register(name, arity, move |args: &[Value]| {
            log.borrow_mut().push((name.to_string(), args.to_vec()));
            Ok(result.clone())
        });
    };
    record("console_log", 1, None);
    record("parse_find_constant", 1, Some(Value::Int(107)));
    record("find_closest", 1, Some(Value::str("tree")));
    record("mine", 1, Some(Value::Int(0)));
    record("approach_entity", 1, Some(Value::str("OK")));
    record("pair", 2, None);

    natives.register("fail", 0, |_: &[Value]| Err(NativeError::new("refused")));
    natives
}

pub fn run(source: &str) -> Run {
    run_with(source, &CompilationOptions::default(), ExecutionOptions::default())
}

pub fn run_with(
    source: &str,
    compilation: &CompilationOptions,
    execution: ExecutionOptions,
) -> Run {
    let log = RefCell::new(Vec::new());
    let natives = recording_registry(&log);

    let (result, stack) = match compile(source.as_bytes(), compilation) {
        Ok(program) => execute(&program, &natives, execution),
        Err(err) => (Err(err.into()), Vec::new()),
    };
    // The registry borrows `log`.
    drop(natives);
    Run {
        result,
        calls: log.into_inner(),
        stack,
    }
}

pub fn execute(
    program: &CompiledProgram,
    natives: &NativeRegistry<'_>,
    options: ExecutionOptions,
) -> (Result<Outcome, Error>, Vec<Value>) {
    let mut vm = Vm::with_options(natives, options);
    let result = vm.run(program).map_err(Error::from);
    (result, vm.stack().to_vec())
}

pub fn call(name: &str, args: impl IntoIterator<Item = Value>) -> Call {
    (name.to_string(), args.into_iter().collect())
}

/// Declares a test compiling and running `input`, then checking the run.
///
/// `calls` lists the expected native invocations in order; `stack` the
/// operand stack left behind. Both are optional.
#[allow(unused_macros)]
macro_rules! test_case {
    (
        $name:ident,
        input: $input:expr,
        outcome: $outcome:expr
        $(, calls: [$($call:expr),* $(,)?])?
        $(, stack: [$($value:expr),* $(,)?])?
        $(,)?
    ) => {
        #[test]
        fn $name() {
            let run = $crate::cases::run($input);
            pretty_assertions::assert_eq!(run.result, $outcome);
            $(
                let expected: Vec<$crate::cases::Call> = vec![$($call),*];
                pretty_assertions::assert_eq!(run.calls, expected);
            )?
            $(
                let expected: Vec<lanes::Value> = vec![$($value),*];
                pretty_assertions::assert_eq!(run.stack, expected);
            )?
        }
    };
}

/// A legacy program: a flat numeric card table, with control transfers
/// targeting card ids. Jumping to a card id enters its lane at that card.
pub static MULTI_LANE_PROGRAM: &str = indoc! {r#"
    {
        "submodules": {},
        "imports": [],
        "cards": {
            "1": { "StringLiteral": "RESOURCE" },
            "2": { "CallNative": "parse_find_constant" },
            "3": { "CallNative": "find_closest" },
            "4": { "SetVar": "resource" },
            "5": { "ReadVar": "resource" },
            "6": { "ScalarNil": null },
            "7": { "Equals": null },
            "8": { "IfTrue": 15 },
            "9": { "ReadVar": "resource" },
            "10": { "ReadVar": "resource" },
            "11": { "CallNative": "mine" },
            "12": { "ScalarInt": 0 },
            "13": { "Equals": null },
            "14": { "IfElse": { "then": 16, "else": 17 } },
            "15": { "Jump": "resource_error" },
            "16": { "Jump": "mine_success" },
            "17": { "Jump": "approach_resource" },
            "18": { "ReadVar": "resource" },
            "19": { "StringLiteral": "Work work...\nMove Result: " },
            "20": { "CallNative": "console_log" },
            "21": { "CallNative": "approach_entity" },
            "22": { "CallNative": "console_log" },
            "23": { "StringLiteral": "No resource found" },
            "24": { "CallNative": "console_log" },
            "25": { "Abort": null },
            "26": { "StringLiteral": "I be mining baws" },
            "27": { "CallNative": "console_log" }
        },
        "lanes": {
            "main": {
                "arguments": [],
                "cards": [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17]
            },
            "approach_resource": { "arguments": ["resource"], "cards": [18, 19, 20, 21, 22] },
            "resource_error": { "arguments": [], "cards": [23, 24, 25] },
            "mine_success": { "arguments": [], "cards": [26, 27] }
        }
    }
"#};

/// A miner script in the numeric card table shape, targeting lanes by name.
pub static MINER_TABLE: &str = indoc! {r#"
    {
        "cards": {
            "1": { "StringLiteral": "RESOURCE" },
            "2": { "CallNative": "parse_find_constant" },
            "3": { "CallNative": "find_closest" },
            "4": { "SetVar": "resource" },
            "5": { "ReadVar": "resource" },
            "6": { "ScalarNil": null },
            "7": { "Equals": null },
            "8": { "IfElse": { "then": "resource_error", "else": "dig" } },
            "9": { "ReadVar": "resource" },
            "10": { "CallNative": "mine" },
            "11": { "ScalarInt": 0 },
            "12": { "Equals": null },
            "13": { "IfElse": { "then": "mine_success", "else": "approach_resource" } },
            "14": { "ReadVar": "resource" },
            "15": { "CallNative": "approach_entity" },
            "16": { "CallNative": "console_log" },
            "17": { "StringLiteral": "No resource found" },
            "18": { "CallNative": "console_log" },
            "19": { "Abort": null },
            "20": { "StringLiteral": "I be mining baws" },
            "21": { "CallNative": "console_log" }
        },
        "lanes": {
            "main": { "arguments": [], "cards": [1, 2, 3, 4, 5, 5, 6, 7, 8] },
            "dig": { "arguments": ["resource"], "cards": [9, 9, 10, 11, 12, 13] },
            "approach_resource": { "arguments": ["resource"], "cards": [14, 15, 16] },
            "resource_error": { "arguments": [], "cards": [17, 18, 19] },
            "mine_success": { "arguments": [], "cards": [20, 21] }
        }
    }
"#};

/// [`MINER_TABLE`] written with inline tag/value cards.
pub static MINER_INLINE: Lazy<String> = Lazy::new(|| {
    indoc! {r#"
        {
            "lanes": [
                ["main", { "arguments": [], "cards": [
                    { "ty": "StringLiteral", "val": "RESOURCE" },
                    { "ty": "CallNative", "val": "parse_find_constant" },
                    { "ty": "CallNative", "val": "find_closest" },
                    { "ty": "SetVar", "val": "resource" },
                    { "ty": "ReadVar", "val": "resource" },
                    { "ty": "ReadVar", "val": "resource" },
                    { "ty": "ScalarNil" },
                    { "ty": "Equals" },
                    { "ty": "IfElse", "val": { "then": "resource_error", "else": "dig" } }
                ]}],
                ["dig", { "arguments": ["resource"], "cards": [
                    { "ty": "ReadVar", "val": "resource" },
                    { "ty": "ReadVar", "val": "resource" },
                    { "ty": "CallNative", "val": "mine" },
                    { "ty": "ScalarInt", "val": 0 },
                    { "ty": "Equals" },
                    { "ty": "IfElse", "val": { "then": "mine_success", "else": "approach_resource" } }
                ]}],
                ["approach_resource", { "arguments": ["resource"], "cards": [
                    { "ty": "ReadVar", "val": "resource" },
                    { "ty": "CallNative", "val": "approach_entity" },
                    { "ty": "CallNative", "val": "console_log" }
                ]}],
                ["resource_error", { "arguments": [], "cards": [
                    { "ty": "StringLiteral", "val": "No resource found" },
                    { "ty": "CallNative", "val": "console_log" },
                    { "ty": "Abort" }
                ]}],
                ["mine_success", { "arguments": [], "cards": [
                    { "ty": "StringLiteral", "val": "I be mining baws" },
                    { "ty": "CallNative", "val": "console_log" }
                ]}]
            ]
        }
    "#}
    .to_string()
});
