//! Compiled programs are immutable and can be stored or shared.

mod cases;

use std::cell::RefCell;
use std::sync::Arc;
use std::thread;

use cases::{MINER_TABLE, call, recording_registry};
use lanes::{
    CompilationOptions, CompiledProgram, Engine, EngineOptions, ExecutionOptions, Outcome, Value,
    Vm, compile,
};

#[test]
fn shared_across_threads() {
    let program = Arc::new(compile(MINER_TABLE.as_bytes(), &CompilationOptions::default()).unwrap());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let program = Arc::clone(&program);
            thread::spawn(move || {
                let log = RefCell::new(Vec::new());
                let natives = recording_registry(&log);
                let mut vm = Vm::new(&natives);
                let outcome = vm.run(&program);
                drop(vm);
                drop(natives);
                (outcome, log.into_inner())
            })
        })
        .collect();

    for handle in handles {
        let (outcome, calls) = handle.join().unwrap();
        assert_eq!(outcome, Ok(Outcome::Finished));
        assert_eq!(calls.len(), 4);
        assert_eq!(calls[3], call("console_log", [Value::str("I be mining baws")]));
    }
}

#[test]
fn stored_program_runs_like_the_original() {
    let program = compile(MINER_TABLE.as_bytes(), &CompilationOptions::default()).unwrap();
    let bytes = program.to_bytes().unwrap();
    let loaded = CompiledProgram::from_bytes(&bytes).unwrap();

    pretty_assertions::assert_eq!(format!("{:?}", loaded), format!("{:?}", program));

    let log = RefCell::new(Vec::new());
    let natives = recording_registry(&log);
    let original = cases::execute(&program, &natives, ExecutionOptions::default());
    let original_calls = log.take();
    let restored = cases::execute(&loaded, &natives, ExecutionOptions::default());
    pretty_assertions::assert_eq!(original, restored);
    pretty_assertions::assert_eq!(original_calls, log.take());
}

#[test]
fn corrupt_artifact_is_rejected() {
    let program = compile(MINER_TABLE.as_bytes(), &CompilationOptions::default()).unwrap();
    let bytes = program.to_bytes().unwrap();
    assert!(CompiledProgram::from_bytes(&bytes[..bytes.len() / 2]).is_err());
}

#[test]
fn one_vm_many_runs() {
    let log = RefCell::new(Vec::new());
    let natives = recording_registry(&log);
    let mut vm = Vm::new(&natives);

    let program = compile(MINER_TABLE.as_bytes(), &CompilationOptions::default()).unwrap();
    assert_eq!(vm.run(&program), Ok(Outcome::Finished));
    let first_stack = vm.stack().to_vec();
    assert_eq!(vm.run(&program), Ok(Outcome::Finished));
    assert_eq!(vm.stack(), first_stack.as_slice());
    assert_eq!(log.borrow().len(), 8);
}

#[test]
fn engine_limits() {
    let engine = Engine::new(
        EngineOptions {
            default_execution_options: ExecutionOptions {
                max_instructions: Some(3),
                ..ExecutionOptions::default()
            },
            ..EngineOptions::default()
        },
        |_| {},
    );
    let program = engine
        .compile(br#"{"lanes": {"main": {"cards": ["ScalarNil", "ScalarNil", "ScalarNil", "ScalarNil"]}}}"#)
        .unwrap();

    assert!(engine.run(&program).is_err());
    assert_eq!(
        engine.run_with(&program, ExecutionOptions::default()),
        Ok(Outcome::Finished)
    );
}
