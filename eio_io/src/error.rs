//! Model and binding error types.

use thiserror::Error;

/// A record that could not be interpreted as a device or signal.
///
/// Deserialization issues never abort the model build — the record
/// contributes nothing and the issue is reported beside the model.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ModelIssue {
    /// Required attribute missing on an item.
    #[error("{section} item is missing required attribute '{attribute}'")]
    MissingAttribute {
        section: String,
        attribute: String,
    },

    /// `SignalType` value outside the known set.
    #[error("Signal '{signal}' has unknown SignalType '{value}'")]
    UnknownSignalType { signal: String, value: String },

    /// `DeviceMap` expression is neither `LOW-HIGH` nor a single integer.
    #[error("Signal '{signal}' has invalid DeviceMap '{value}', using index 0")]
    BadDeviceMap { signal: String, value: String },

    /// Signal width outside {1, 8, 16, 32} — the buffer layout producing
    /// this configuration is suspect.
    #[error("Signal '{signal}' has unsupported width {bits} bits")]
    UnsupportedWidth { signal: String, bits: u32 },
}

/// Failure writing a value through a bound external handle.
///
/// Caught and logged where it occurs; never aborts a cycle.
#[derive(Debug, Clone, Error)]
#[error("binding write failed: {0}")]
pub struct BindingError(pub String);
