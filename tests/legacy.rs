//! Historical input shapes compile to programs that behave like their
//! canonical counterparts.

#[macro_use]
mod cases;

use cases::{MINER_INLINE, MINER_TABLE, MULTI_LANE_PROGRAM, call};
use lanes::{CompilationOptions, Outcome, Value, compile};

test_case!(
    multi_lane_program,
    input: MULTI_LANE_PROGRAM,
    // Jumping to a card id enters the owning lane at that card and returns
    // to the card after the jump, so `main` falls through to card 15.
    outcome: Ok(Outcome::Aborted),
    calls: [
        call("parse_find_constant", [Value::str("RESOURCE")]),
        call("find_closest", [Value::Int(107)]),
        call("mine", [Value::str("tree")]),
        call("console_log", [Value::str("I be mining baws")]),
        call("console_log", [Value::str("Work work...\nMove Result: ")]),
        call("approach_entity", [Value::str("tree")]),
        call("console_log", [Value::str("OK")]),
        call("console_log", [Value::str("No resource found")]),
    ],
);

test_case!(
    miner_card_table,
    input: MINER_TABLE,
    outcome: Ok(Outcome::Finished),
    calls: [
        call("parse_find_constant", [Value::str("RESOURCE")]),
        call("find_closest", [Value::Int(107)]),
        call("mine", [Value::str("tree")]),
        call("console_log", [Value::str("I be mining baws")]),
    ],
    stack: [Value::str("tree")],
);

#[test]
fn card_table_and_inline_cards_agree() {
    let table = cases::run(MINER_TABLE);
    let inline = cases::run(&MINER_INLINE);
    pretty_assertions::assert_eq!(table, inline);
}

#[test]
fn card_table_and_inline_cards_compile_alike() {
    let options = CompilationOptions::default();
    let table = compile(MINER_TABLE.as_bytes(), &options).unwrap();
    let inline = compile(MINER_INLINE.as_bytes(), &options).unwrap();

    pretty_assertions::assert_eq!(table.instructions(), inline.instructions());
    pretty_assertions::assert_eq!(table.constants(), inline.constants());
    pretty_assertions::assert_eq!(format!("{:?}", table), format!("{:?}", inline));
}

test_case!(
    floating_card_is_reachable,
    // Card 9 is in the table but in no lane.
    input: r#"{
        "cards": {
            "1": {"ScalarInt": 1},
            "2": {"ScalarInt": 1},
            "3": "Equals",
            "4": {"IfTrue": 9},
            "9": {"ty": "CallNative", "val": "console_log"}
        },
        "lanes": {"main": {"cards": [{"StringLiteral": "floating"}, 1, 2, 3, 4]}}
    }"#,
    outcome: Ok(Outcome::Finished),
    calls: [call("console_log", [Value::str("floating")])],
    stack: [],
);

test_case!(
    functions_alias,
    input: r#"{"functions": [["main", {"arguments": [], "cards": [{"StringLiteral": "x"}, {"CallNative": "console_log"}]}]]}"#,
    outcome: Ok(Outcome::Finished),
    calls: [call("console_log", [Value::str("x")])],
);
