//! EIO I/O Model & Exchange
//!
//! Typed device/signal model over the generic configuration tree from
//! `eio_cfg`, plus the bit-level codec that packs signal values into the
//! flat byte buffers exchanged with the controller each cycle.
//!
//! # Module Structure
//!
//! - [`signal`] - Signal types, descriptors and runtime bindings
//! - [`device`] - Device hierarchy reconstruction and signal registry
//! - [`codec`] - Bit-cursor encode/decode of signal values
//! - [`exchange`] - Cyclic input/output workers with cooperative stop
//! - [`config`] - TOML runtime configuration
//! - [`error`] - Model and binding error types
//!
//! The model build pass produces an immutable snapshot: devices own
//! `Arc`-shared signals, the registry indexes the same signals by name
//! and in buffer layout order. Rebuilding the model replaces the whole
//! snapshot.

pub mod codec;
pub mod config;
pub mod device;
pub mod error;
pub mod exchange;
pub mod signal;

pub use codec::{CodecError, decode, encode, is_supported_width, layout_bits, layout_bytes};
pub use config::{ConfigError, ExchangeConfig};
pub use device::{DEVICE_SECTIONS, DeviceDescriptor, DeviceModel, IoDevice, SIGNAL_SECTION, SignalRegistry};
pub use error::{BindingError, ModelIssue};
pub use exchange::ExchangeRunner;
pub use signal::{CHANGE_TOLERANCE, IoSignal, SignalDescriptor, SignalHandle, SignalType};
