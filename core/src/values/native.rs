//! Host-supplied native functions.
//!
//! The VM knows nothing about what a native function does. It only honors
//! the calling contract: pop `arity()` values off the operand stack, pass
//! them in push order, and push the returned value if there is one.

use alloc::boxed::Box;

use ecow::EcoString;
use hashbrown::HashMap;
use thiserror::Error;

use super::Value;

/// Failure reported by a native function.
///
/// The VM surfaces it as `NativeCallFailed` and terminates the run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct NativeError {
    pub message: EcoString,
}

impl NativeError {
    pub fn new(message: impl Into<EcoString>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// What a native function returns: an optional value to push.
pub type NativeResult = Result<Option<Value>, NativeError>;

/// Trait for callables that can be registered with the VM.
pub trait Function {
    /// Number of operand stack values consumed per call.
    fn arity(&self) -> usize;

    /// Call the function.
    ///
    /// `args.len()` always equals `arity()`; `args[0]` is the value that was
    /// pushed first.
    fn call(&self, args: &[Value]) -> NativeResult;
}

/// Wrapper turning a closure and a declared arity into a [`Function`].
///
/// # Example
///
/// ```
/// use lanes_core::values::{Function, NativeFunction, Value};
///
/// let double = NativeFunction::new(1, |args: &[Value]| {
///     Ok(args[0].as_int().map(|i| Value::Int(i * 2)))
/// });
/// assert_eq!(double.call(&[Value::Int(21)]), Ok(Some(Value::Int(42))));
/// ```
pub struct NativeFunction<F> {
    arity: usize,
    func: F,
}

impl<F> NativeFunction<F>
where
    F: Fn(&[Value]) -> NativeResult,
{
    pub fn new(arity: usize, func: F) -> Self {
        Self { arity, func }
    }
}

impl<F> Function for NativeFunction<F>
where
    F: Fn(&[Value]) -> NativeResult,
{
    fn arity(&self) -> usize {
        self.arity
    }

    fn call(&self, args: &[Value]) -> NativeResult {
        (self.func)(args)
    }
}

/// Name to function mapping handed to the VM.
///
/// The registry is owned by the host and only borrowed for the duration of a
/// run. The lifetime `'f` lets registered closures borrow host state.
#[derive(Default)]
pub struct NativeRegistry<'f> {
    functions: HashMap<EcoString, Box<dyn Function + 'f>>,
}

impl<'f> NativeRegistry<'f> {
    pub fn new() -> Self {
        Self {
            functions: HashMap::new(),
        }
    }

    /// Register a closure under `name`, replacing any previous registration.
    pub fn register<F>(&mut self, name: impl Into<EcoString>, arity: usize, func: F)
    where
        F: Fn(&[Value]) -> NativeResult + 'f,
    {
        self.register_function(name, NativeFunction::new(arity, func));
    }

    /// Register any [`Function`] implementation under `name`.
    pub fn register_function(&mut self, name: impl Into<EcoString>, function: impl Function + 'f) {
        self.functions.insert(name.into(), Box::new(function));
    }

    pub fn get(&self, name: &str) -> Option<&(dyn Function + 'f)> {
        self.functions.get(name).map(|f| f.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(|name| name.as_str())
    }
}

impl core::fmt::Debug for NativeRegistry<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    #[test]
    fn test_register_and_call() {
        let calls = Cell::new(0);
        let mut registry = NativeRegistry::new();
        registry.register("count", 0, |_| {
            calls.set(calls.get() + 1);
            Ok(None)
        });

        let count = registry.get("count").unwrap();
        assert_eq!(count.arity(), 0);
        assert_eq!(count.call(&[]), Ok(None));
        assert_eq!(calls.get(), 1);
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = NativeRegistry::new();
        registry.register("f", 0, |_| Ok(Some(Value::Int(1))));
        registry.register("f", 1, |args| Ok(Some(args[0].clone())));

        assert_eq!(registry.len(), 1);
        let f = registry.get("f").unwrap();
        assert_eq!(f.arity(), 1);
        assert_eq!(f.call(&[Value::Bool(true)]), Ok(Some(Value::Bool(true))));
    }

    #[test]
    fn test_native_error_display() {
        let err = NativeError::new("target out of range");
        assert_eq!(err.to_string(), "target out of range");
    }
}
