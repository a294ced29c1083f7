//! Function registry and invoker
//!
//! Function implementations live outside the engine. Callers register them
//! by identifier in an explicitly constructed [`FunctionRegistry`] that is
//! handed to the executor; there is no process-wide registry.
//!
//! The [`FunctionInvoker`] only resolves parameter bindings and dispatches.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use crate::error::{BoxError, RmlError, RmlResult};
use crate::mapping::{FunctionValue, TermMap};

/// Parameter bindings passed to a function: parameter name → ordered values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionArgs {
    values: BTreeMap<String, Vec<String>>,
}

impl FunctionArgs {
    /// Create empty bindings
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind values to a parameter, appending if it is already bound
    pub fn bind(&mut self, name: impl Into<String>, values: Vec<String>) {
        self.values.entry(name.into()).or_default().extend(values);
    }

    /// Builder form of [`bind`](Self::bind)
    pub fn with(mut self, name: impl Into<String>, values: Vec<String>) -> Self {
        self.bind(name, values);
        self
    }

    /// All values bound to a parameter (empty if unbound)
    pub fn get(&self, name: &str) -> &[String] {
        self.values.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First value bound to a parameter
    pub fn first(&self, name: &str) -> Option<&str> {
        self.get(name).first().map(String::as_str)
    }

    /// Iterate bindings in parameter-name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Number of bound parameters
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if no parameter is bound
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A callable function capability
///
/// Any `Fn(&FunctionArgs) -> Result<Vec<String>, BoxError>` closure is a
/// function.
pub trait RmlFunction: Send + Sync {
    /// Run the function over bound parameters, returning zero or more values
    fn call(&self, args: &FunctionArgs) -> Result<Vec<String>, BoxError>;
}

impl<F> RmlFunction for F
where
    F: Fn(&FunctionArgs) -> Result<Vec<String>, BoxError> + Send + Sync,
{
    fn call(&self, args: &FunctionArgs) -> Result<Vec<String>, BoxError> {
        self(args)
    }
}

/// A registered function and its invocation options
#[derive(Clone)]
pub struct RegisteredFunction {
    function: Arc<dyn RmlFunction>,
    accepts_missing: bool,
}

impl RegisteredFunction {
    /// Whether the function is invoked even when required parameters are empty
    pub fn accepts_missing_inputs(&self) -> bool {
        self.accepts_missing
    }

    /// Call the underlying function
    pub fn call(&self, args: &FunctionArgs) -> Result<Vec<String>, BoxError> {
        self.function.call(args)
    }
}

impl fmt::Debug for RegisteredFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredFunction")
            .field("accepts_missing", &self.accepts_missing)
            .finish_non_exhaustive()
    }
}

/// Registry of functions by identifier
#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, RegisteredFunction>,
}

impl FunctionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a function (replacing any previous registration)
    pub fn register(
        &mut self,
        identifier: impl Into<String>,
        function: impl RmlFunction + 'static,
    ) {
        self.insert(identifier.into(), Arc::new(function), false);
    }

    /// Register a function that is still invoked when required inputs are missing
    pub fn register_lenient(
        &mut self,
        identifier: impl Into<String>,
        function: impl RmlFunction + 'static,
    ) {
        self.insert(identifier.into(), Arc::new(function), true);
    }

    fn insert(
        &mut self,
        identifier: String,
        function: Arc<dyn RmlFunction>,
        accepts_missing: bool,
    ) {
        self.functions.insert(
            identifier,
            RegisteredFunction {
                function,
                accepts_missing,
            },
        );
    }

    /// Look up a function by identifier
    pub fn lookup(&self, identifier: &str) -> Option<&RegisteredFunction> {
        self.functions.get(identifier)
    }

    /// Check if an identifier is registered
    pub fn contains(&self, identifier: &str) -> bool {
        self.functions.contains_key(identifier)
    }

    /// Number of registered functions
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

/// Resolves parameter bindings and dispatches to registered functions
#[derive(Debug, Clone, Copy)]
pub struct FunctionInvoker<'a> {
    registry: &'a FunctionRegistry,
}

impl<'a> FunctionInvoker<'a> {
    /// Create an invoker over a registry
    pub fn new(registry: &'a FunctionRegistry) -> Self {
        Self { registry }
    }

    /// Invoke a function with already-resolved bindings
    ///
    /// Fails with `UnknownFunction` for unregistered identifiers and with
    /// `FunctionExecution` wrapping whatever the function raised.
    pub fn invoke(&self, identifier: &str, args: &FunctionArgs) -> RmlResult<Vec<String>> {
        let function = self.lookup(identifier)?;
        Self::dispatch(identifier, function, args)
    }

    /// Resolve bindings for a function value and invoke it
    ///
    /// `eval` generates the lexical values of one parameter term map against
    /// the current record. Returns no values without invoking when a required
    /// parameter has no values, unless the function was registered lenient.
    pub fn call<F>(&self, function: &FunctionValue, eval: F) -> RmlResult<Vec<String>>
    where
        F: FnMut(&TermMap) -> RmlResult<Vec<String>>,
    {
        let registered = self.lookup(&function.function)?;
        match Self::bind(function, registered.accepts_missing_inputs(), eval)? {
            Some(args) => Self::dispatch(&function.function, registered, &args),
            None => Ok(Vec::new()),
        }
    }

    fn lookup(&self, identifier: &str) -> RmlResult<&'a RegisteredFunction> {
        self.registry
            .lookup(identifier)
            .ok_or_else(|| RmlError::UnknownFunction {
                function: identifier.to_string(),
            })
    }

    fn bind<F>(
        function: &FunctionValue,
        accepts_missing: bool,
        mut eval: F,
    ) -> RmlResult<Option<FunctionArgs>>
    where
        F: FnMut(&TermMap) -> RmlResult<Vec<String>>,
    {
        let mut args = FunctionArgs::new();
        for param in &function.parameters {
            let values = eval(&param.value)?;
            if values.is_empty() && param.required && !accepts_missing {
                tracing::trace!(
                    function = %function.function,
                    parameter = %param.name,
                    "required parameter has no value, skipping invocation"
                );
                return Ok(None);
            }
            args.bind(param.name.as_str(), values);
        }
        Ok(Some(args))
    }

    fn dispatch(
        identifier: &str,
        function: &RegisteredFunction,
        args: &FunctionArgs,
    ) -> RmlResult<Vec<String>> {
        function
            .call(args)
            .map_err(|source| RmlError::FunctionExecution {
                function: identifier.to_string(),
                source,
            })
    }
}
