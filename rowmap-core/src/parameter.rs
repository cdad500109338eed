use crate::{StorageType, Value, ValueType};

/// A named command parameter, the native descriptor handed to a driver.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub value: Value,
    /// Resolved storage type, `None` lets the driver infer it from the value.
    pub storage_type: Option<StorageType>,
}

impl Parameter {
    pub fn value_type(&self) -> Option<ValueType> {
        self.value
            .value_type()
            .or_else(|| self.storage_type.and_then(|v| v.value_type()))
    }
}

/// Receives the parameters produced by a compiled object to parameters routine.
pub trait ParameterSink {
    fn push_parameter(&mut self, parameter: Parameter);
}

impl ParameterSink for Vec<Parameter> {
    fn push_parameter(&mut self, parameter: Parameter) {
        self.push(parameter);
    }
}

/// Minimal command: query text plus its parameter list.
#[derive(Default, Debug, Clone)]
pub struct Command {
    pub text: String,
    pub parameters: Vec<Parameter>,
}

impl Command {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            parameters: Vec::new(),
        }
    }
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }
    pub fn clear_parameters(&mut self) {
        self.parameters.clear();
    }
}

impl ParameterSink for Command {
    fn push_parameter(&mut self, parameter: Parameter) {
        self.parameters.push(parameter);
    }
}
