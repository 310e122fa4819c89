//! Signal types, descriptors and runtime bindings.
//!
//! A [`SignalDescriptor`] is the typed projection of one `EIO_SIGNAL`
//! item; an [`IoSignal`] adds the runtime state: the live value and an
//! optional bound external handle. Values live in an `AtomicU32` as f32
//! bits so asynchronous change notifications never tear against the
//! cyclic encode/decode pass.

use core::fmt;
use core::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use eio_cfg::CfgRecord;
use parking_lot::RwLock;
use tracing::error;

use crate::error::{BindingError, ModelIssue};

/// Value changes smaller than this are suppressed (no store, no
/// notification of the bound handle).
pub const CHANGE_TOLERANCE: f32 = 1.0e-9;

// ─── SignalType ─────────────────────────────────────────────────────

/// Signal type code: digital/group/analog, input or output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SignalType {
    /// Digital input.
    Di = 0,
    /// Digital output.
    Do = 1,
    /// Group input.
    Gi = 2,
    /// Group output.
    Go = 3,
    /// Analog input.
    Ai = 4,
    /// Analog output.
    Ao = 5,
}

impl SignalType {
    pub fn is_input(self) -> bool {
        matches!(self, Self::Di | Self::Gi | Self::Ai)
    }

    pub fn is_output(self) -> bool {
        !self.is_input()
    }
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Di => "DI",
            Self::Do => "DO",
            Self::Gi => "GI",
            Self::Go => "GO",
            Self::Ai => "AI",
            Self::Ao => "AO",
        };
        write!(f, "{s}")
    }
}

impl FromStr for SignalType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DI" => Ok(Self::Di),
            "DO" => Ok(Self::Do),
            "GI" => Ok(Self::Gi),
            "GO" => Ok(Self::Go),
            "AI" => Ok(Self::Ai),
            "AO" => Ok(Self::Ao),
            _ => Err(format!("unknown SignalType: {s:?}")),
        }
    }
}

// ─── SignalDescriptor ───────────────────────────────────────────────

/// Typed projection of one signal item.
///
/// `index`/`length` are derived from the `DeviceMap` attribute:
/// `LOW-HIGH` gives index LOW and length HIGH-LOW+1, a single integer
/// gives that index with length 1. Length is 1, 8, 16 or 32 bits in
/// practice — validated by the producing layout, not enforced here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalDescriptor {
    pub name: String,
    pub signal_type: SignalType,
    /// Owning device name. System signals carry no device and never
    /// resolve to a device's I/O area.
    pub device: Option<String>,
    pub label: Option<String>,
    pub category: Option<String>,
    pub access: Option<String>,
    pub device_map: Option<String>,
    /// Bit offset within the device's I/O area.
    pub index: u32,
    /// Field width in bits.
    pub length: u32,
}

impl SignalDescriptor {
    /// Interpret a signal item. Missing `Name` or an unknown
    /// `SignalType` rejects the record; a malformed `DeviceMap` falls
    /// back to index 0, length 1 and is reported by the caller.
    pub fn from_record(record: &CfgRecord) -> Result<(Self, Option<ModelIssue>), ModelIssue> {
        let name = record
            .get("Name")
            .filter(|n| !n.is_empty())
            .ok_or_else(|| ModelIssue::MissingAttribute {
                section: "EIO_SIGNAL".to_string(),
                attribute: "Name".to_string(),
            })?
            .to_string();

        let type_str = record.get("SignalType").unwrap_or("");
        let signal_type =
            type_str
                .parse::<SignalType>()
                .map_err(|_| ModelIssue::UnknownSignalType {
                    signal: name.clone(),
                    value: type_str.to_string(),
                })?;

        let device_map = record.get("DeviceMap").map(str::to_string);
        let (index, length, map_issue) = match device_map.as_deref() {
            Some(map) => match parse_device_map(map) {
                Some((index, length)) => (index, length, None),
                None => (
                    0,
                    1,
                    Some(ModelIssue::BadDeviceMap {
                        signal: name.clone(),
                        value: map.to_string(),
                    }),
                ),
            },
            None => (0, 1, None),
        };

        Ok((
            Self {
                name,
                signal_type,
                device: record.get("Device").map(str::to_string),
                label: record.get("Label").map(str::to_string),
                category: record.get("Category").map(str::to_string),
                access: record.get("Access").map(str::to_string),
                device_map,
                index,
                length,
            },
            map_issue,
        ))
    }
}

/// Parse a `DeviceMap` expression: `LOW-HIGH` or a single integer.
fn parse_device_map(map: &str) -> Option<(u32, u32)> {
    if let Some((low, high)) = map.split_once('-') {
        let low: u32 = low.trim().parse().ok()?;
        let high: u32 = high.trim().parse().ok()?;
        if high < low {
            return None;
        }
        return Some((low, high - low + 1));
    }
    map.trim().parse().ok().map(|index| (index, 1))
}

// ─── SignalHandle ───────────────────────────────────────────────────

/// Live external handle attached to a signal by the value-binding
/// collaborator. Implementations forward value writes to the controller.
pub trait SignalHandle: Send + Sync {
    fn write_value(&self, value: f32) -> Result<(), BindingError>;
}

// ─── IoSignal ───────────────────────────────────────────────────────

/// Runtime state for one signal: descriptor, live value, bound handle.
///
/// Unbound → Bound on the first [`bind`](Self::bind); stays bound until
/// the model is rebuilt. Only bound signals take part in real value
/// exchange — unbound signals are valid codec no-ops that still occupy
/// their slot in the buffer layout.
pub struct IoSignal {
    descriptor: SignalDescriptor,
    value_bits: AtomicU32,
    handle: RwLock<Option<Arc<dyn SignalHandle>>>,
}

impl IoSignal {
    pub fn new(descriptor: SignalDescriptor) -> Self {
        Self {
            descriptor,
            value_bits: AtomicU32::new(0f32.to_bits()),
            handle: RwLock::new(None),
        }
    }

    pub fn descriptor(&self) -> &SignalDescriptor {
        &self.descriptor
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// Bit offset within the owning device's I/O area.
    pub fn index(&self) -> u32 {
        self.descriptor.index
    }

    /// Field width in bits.
    pub fn length(&self) -> u32 {
        self.descriptor.length
    }

    /// A signal is valid for value exchange once a handle is attached.
    pub fn is_bound(&self) -> bool {
        self.handle.read().is_some()
    }

    /// Attach the live external handle (Unbound → Bound).
    pub fn bind(&self, handle: Arc<dyn SignalHandle>) {
        *self.handle.write() = Some(handle);
    }

    /// Current value.
    pub fn value(&self) -> f32 {
        f32::from_bits(self.value_bits.load(Ordering::Relaxed))
    }

    /// Boolean view for 1-bit fields.
    pub fn as_bool(&self) -> bool {
        self.value().abs() > 0.5
    }

    /// Wire bit pattern for multi-bit fields: the value truncated to an
    /// unsigned 32-bit integer (the buffer's unsigned wire convention).
    pub fn as_bits(&self) -> u32 {
        self.value() as u32
    }

    /// Assign a new value with change suppression.
    ///
    /// A change smaller than [`CHANGE_TOLERANCE`] is a no-op. Otherwise
    /// the value is stored and, when bound, forwarded to the external
    /// handle; a handle failure is logged and swallowed.
    pub fn set_value(&self, value: f32) {
        if (value - self.value()).abs() < CHANGE_TOLERANCE {
            return;
        }
        self.value_bits.store(value.to_bits(), Ordering::Relaxed);

        if let Some(handle) = self.handle.read().as_ref() {
            if let Err(e) = handle.write_value(value) {
                error!("Signal '{}': {e}", self.descriptor.name);
            }
        }
    }

    /// Asynchronous change notification from the external side.
    ///
    /// Stores the value directly — no suppression, no write-back.
    pub fn notify_changed(&self, value: f32) {
        self.value_bits.store(value.to_bits(), Ordering::Relaxed);
    }
}

impl fmt::Debug for IoSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IoSignal")
            .field("descriptor", &self.descriptor)
            .field("value", &self.value())
            .field("bound", &self.is_bound())
            .finish()
    }
}
