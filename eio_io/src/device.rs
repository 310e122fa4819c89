//! Device hierarchy reconstruction and the signal registry.
//!
//! Devices come from a fixed set of bus container sections. An item
//! without a `HostDevice` attribute is a host device and appears at the
//! top level; an item with `HostDevice = "X"` is a submodule of the
//! device named `X`. Submodule resolution is a whole-tree scan by name —
//! device counts are small, and recomputing on rebuild keeps the
//! relationship free of dangling pointers.

use std::collections::HashMap;
use std::sync::Arc;

use eio_cfg::{CfgRecord, CfgTree};
use tracing::warn;

use crate::codec::is_supported_width;
use crate::error::ModelIssue;
use crate::signal::{IoSignal, SignalDescriptor, SignalHandle};

/// Device bus container sections scanned for device items.
pub const DEVICE_SECTIONS: [&str; 4] = [
    "PROFINET_INTERNAL_DEVICE",
    "PROFINET_DEVICE",
    "DEVICENET_DEVICE",
    "ETHERNETIP_DEVICE",
];

/// Section holding the signal items.
pub const SIGNAL_SECTION: &str = "EIO_SIGNAL";

// ─── DeviceDescriptor ───────────────────────────────────────────────

/// Typed projection of one device item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    pub name: String,
    pub vendor_name: Option<String>,
    pub product_name: Option<String>,
    pub label: Option<String>,
    pub input_size: Option<u32>,
    pub output_size: Option<u32>,
    /// Name of the host device; `None` means this item IS a host device.
    pub host_device: Option<String>,
    pub slot_index: Option<u32>,
    pub module_id: Option<u32>,
    pub station_name: Option<String>,
    pub simulated: bool,
}

impl DeviceDescriptor {
    pub fn from_record(section: &str, record: &CfgRecord) -> Result<Self, ModelIssue> {
        let name = record
            .get("Name")
            .filter(|n| !n.is_empty())
            .ok_or_else(|| ModelIssue::MissingAttribute {
                section: section.to_string(),
                attribute: "Name".to_string(),
            })?
            .to_string();

        Ok(Self {
            name,
            vendor_name: record.get("VendorName").map(str::to_string),
            product_name: record.get("ProductName").map(str::to_string),
            label: record.get("Label").map(str::to_string),
            input_size: numeric_attr(record, "InputSize"),
            output_size: numeric_attr(record, "OutputSize"),
            host_device: record
                .get("HostDevice")
                .filter(|v| !v.is_empty())
                .map(str::to_string),
            slot_index: numeric_attr(record, "SlotIndex"),
            module_id: numeric_attr(record, "ModuleId"),
            station_name: record.get("StationName").map(str::to_string),
            simulated: record.get("Simulated").is_some(),
        })
    }

    pub fn is_host_device(&self) -> bool {
        self.host_device.is_none()
    }
}

fn numeric_attr(record: &CfgRecord, name: &str) -> Option<u32> {
    record.get(name).and_then(|v| v.trim().parse().ok())
}

// ─── IoDevice ───────────────────────────────────────────────────────

/// One device with its submodules and resolved signal lists.
///
/// Inputs and outputs are sorted ascending by index; ties keep document
/// order (stable sort).
#[derive(Debug)]
pub struct IoDevice {
    pub descriptor: DeviceDescriptor,
    /// Devices whose `HostDevice` names this device. Submodules are not
    /// expanded further (hierarchy depth is exactly 2).
    pub sub_modules: Vec<IoDevice>,
    pub inputs: Vec<Arc<IoSignal>>,
    pub outputs: Vec<Arc<IoSignal>>,
}

impl IoDevice {
    pub fn has_sub_modules(&self) -> bool {
        !self.sub_modules.is_empty()
    }
}

// ─── DeviceModel ────────────────────────────────────────────────────

/// Result of a model build pass: top-level host devices plus every
/// deserialization issue encountered.
#[derive(Debug, Default)]
pub struct DeviceModel {
    pub devices: Vec<IoDevice>,
    pub issues: Vec<ModelIssue>,
}

impl DeviceModel {
    /// Reconstruct the device hierarchy from the generic tree.
    ///
    /// An empty tree yields an empty model. Rejected records are
    /// reported in `issues` and contribute nothing.
    pub fn build(tree: &CfgTree) -> Self {
        let mut issues = Vec::new();

        // Every device item in the fixed container set, document order.
        let mut descriptors = Vec::new();
        for section in DEVICE_SECTIONS {
            for item in tree.items_of(section) {
                match DeviceDescriptor::from_record(section, item) {
                    Ok(descriptor) => descriptors.push(descriptor),
                    Err(issue) => {
                        warn!("{issue}");
                        issues.push(issue);
                    }
                }
            }
        }

        let devices = descriptors
            .iter()
            .filter(|d| d.is_host_device())
            .map(|host| {
                let sub_modules = descriptors
                    .iter()
                    .filter(|d| d.host_device.as_deref() == Some(host.name.as_str()))
                    .map(|sub| IoDevice {
                        descriptor: sub.clone(),
                        sub_modules: Vec::new(),
                        inputs: signals_for(tree, &sub.name, true, &mut issues),
                        outputs: signals_for(tree, &sub.name, false, &mut issues),
                    })
                    .collect();

                IoDevice {
                    descriptor: host.clone(),
                    sub_modules,
                    inputs: signals_for(tree, &host.name, true, &mut issues),
                    outputs: signals_for(tree, &host.name, false, &mut issues),
                }
            })
            .collect();

        Self { devices, issues }
    }
}

/// Collect the signals of one device: items in the signal section whose
/// `SignalType` is in the input (DI/GI/AI) or output (DO/GO/AO) set and
/// whose `Device` attribute equals `device_name`, sorted by index.
fn signals_for(
    tree: &CfgTree,
    device_name: &str,
    inputs: bool,
    issues: &mut Vec<ModelIssue>,
) -> Vec<Arc<IoSignal>> {
    let mut signals: Vec<Arc<IoSignal>> = Vec::new();

    for item in tree.items_of(SIGNAL_SECTION) {
        if item.get("Device") != Some(device_name) {
            continue;
        }
        let (descriptor, map_issue) = match SignalDescriptor::from_record(item) {
            Ok(parsed) => parsed,
            Err(issue) => {
                warn!("{issue}");
                issues.push(issue);
                continue;
            }
        };
        if descriptor.signal_type.is_input() != inputs {
            continue;
        }
        if let Some(issue) = map_issue {
            warn!("{issue}");
            issues.push(issue);
        }
        if !is_supported_width(descriptor.length) {
            let issue = ModelIssue::UnsupportedWidth {
                signal: descriptor.name.clone(),
                bits: descriptor.length,
            };
            warn!("{issue}");
            issues.push(issue);
        }
        signals.push(Arc::new(IoSignal::new(descriptor)));
    }

    signals.sort_by_key(|s| s.index());
    signals
}

// ─── SignalRegistry ─────────────────────────────────────────────────

/// Flat view of the model's signals: buffer layout order for the codec,
/// name lookup for the value-binding collaborator.
///
/// Layout order is the device traversal order — per device first its own
/// signals, then its submodules' — matching how the exchange buffers are
/// laid out.
#[derive(Debug, Default)]
pub struct SignalRegistry {
    inputs: Vec<Arc<IoSignal>>,
    outputs: Vec<Arc<IoSignal>>,
    by_name: HashMap<String, Arc<IoSignal>>,
}

impl SignalRegistry {
    pub fn from_devices(devices: &[IoDevice]) -> Self {
        let mut registry = Self::default();
        registry.collect(devices);
        registry
    }

    fn collect(&mut self, devices: &[IoDevice]) {
        for device in devices {
            for signal in &device.inputs {
                self.inputs.push(signal.clone());
                self.by_name.insert(signal.name().to_string(), signal.clone());
            }
            for signal in &device.outputs {
                self.outputs.push(signal.clone());
                self.by_name.insert(signal.name().to_string(), signal.clone());
            }
            self.collect(&device.sub_modules);
        }
    }

    /// Input signals in buffer layout order.
    pub fn inputs(&self) -> &[Arc<IoSignal>] {
        &self.inputs
    }

    /// Output signals in buffer layout order.
    pub fn outputs(&self) -> &[Arc<IoSignal>] {
        &self.outputs
    }

    pub fn get(&self, name: &str) -> Option<&Arc<IoSignal>> {
        self.by_name.get(name)
    }

    /// Attach a live handle to the named signal. Returns false when the
    /// name is not in the model.
    pub fn bind(&self, name: &str, handle: Arc<dyn SignalHandle>) -> bool {
        match self.by_name.get(name) {
            Some(signal) => {
                signal.bind(handle);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eio_cfg::parse_str;

    const CFG: &str = "\
EIO:CFG_1.0:6:1::
#
PROFINET_DEVICE:

      -Name \"d652_1\" -VendorName \"ABB\" -ProductName \"DSQC 652\"
      -Name \"mod_1\" -HostDevice \"d652_1\" -SlotIndex 1
      -Name \"mod_2\" -HostDevice \"d652_1\" -SlotIndex 2
#
DEVICENET_DEVICE:

      -Name \"dn_1\"
#
EIO_SIGNAL:

      -Name \"di2\" -SignalType \"DI\" -Device \"d652_1\" -DeviceMap \"2\"
      -Name \"di0\" -SignalType \"DI\" -Device \"d652_1\" -DeviceMap \"0\"
      -Name \"giSpeed\" -SignalType \"GI\" -Device \"d652_1\" -DeviceMap \"8-23\"
      -Name \"doRun\" -SignalType \"DO\" -Device \"d652_1\" -DeviceMap \"0\"
      -Name \"aiTemp\" -SignalType \"AI\" -Device \"mod_1\" -DeviceMap \"0-15\"
      -Name \"sysSignal\" -SignalType \"DI\" -DeviceMap \"7\"
#
";

    fn model() -> DeviceModel {
        let (tree, report) = parse_str(CFG, "");
        assert!(report.is_clean());
        DeviceModel::build(&tree)
    }

    #[test]
    fn host_devices_only_at_top_level() {
        let model = model();
        let names: Vec<_> = model
            .devices
            .iter()
            .map(|d| d.descriptor.name.as_str())
            .collect();
        assert_eq!(names, ["d652_1", "dn_1"]);
        assert!(model.issues.is_empty());
    }

    #[test]
    fn submodules_collected_by_host_name() {
        let model = model();
        let host = &model.devices[0];
        assert!(host.descriptor.is_host_device());
        assert!(host.has_sub_modules());
        let subs: Vec<_> = host
            .sub_modules
            .iter()
            .map(|d| d.descriptor.name.as_str())
            .collect();
        assert_eq!(subs, ["mod_1", "mod_2"]);
        assert!(!host.sub_modules[0].descriptor.is_host_device());
        assert_eq!(host.sub_modules[0].descriptor.slot_index, Some(1));
    }

    #[test]
    fn signals_sorted_by_index() {
        let model = model();
        let host = &model.devices[0];
        let inputs: Vec<_> = host.inputs.iter().map(|s| s.name()).collect();
        // di0 (index 0), di2 (index 2), giSpeed (index 8).
        assert_eq!(inputs, ["di0", "di2", "giSpeed"]);
        let outputs: Vec<_> = host.outputs.iter().map(|s| s.name()).collect();
        assert_eq!(outputs, ["doRun"]);
    }

    #[test]
    fn submodule_signals_resolved() {
        let model = model();
        let sub = &model.devices[0].sub_modules[0];
        assert_eq!(sub.inputs.len(), 1);
        assert_eq!(sub.inputs[0].name(), "aiTemp");
        assert_eq!(sub.inputs[0].length(), 16);
    }

    #[test]
    fn deviceless_signals_belong_to_no_device() {
        let model = model();
        let all: Vec<&str> = model
            .devices
            .iter()
            .flat_map(|d| d.inputs.iter().chain(&d.outputs))
            .map(|s| s.name())
            .collect();
        assert!(!all.contains(&"sysSignal"));
    }

    #[test]
    fn empty_tree_yields_empty_model() {
        let (tree, _) = parse_str("", "");
        let model = DeviceModel::build(&tree);
        assert!(model.devices.is_empty());
    }

    #[test]
    fn bad_records_are_reported_not_fatal() {
        let cfg = "\
EIO:CFG_1.0:6:1::
#
PROFINET_DEVICE:

      -VendorName \"no name here\"
      -Name \"ok_dev\"
#
EIO_SIGNAL:

      -Name \"s1\" -SignalType \"ZZ\" -Device \"ok_dev\" -DeviceMap \"0\"
      -Name \"s2\" -SignalType \"DI\" -Device \"ok_dev\" -DeviceMap \"9-2\"
#
";
        let (tree, _) = parse_str(cfg, "");
        let model = DeviceModel::build(&tree);
        assert_eq!(model.devices.len(), 1);
        // s2 survives with the fallback map; s1 is rejected.
        assert_eq!(model.devices[0].inputs.len(), 1);
        assert_eq!(model.devices[0].inputs[0].name(), "s2");
        assert_eq!(model.devices[0].inputs[0].index(), 0);
        assert!(
            model
                .issues
                .iter()
                .any(|i| matches!(i, ModelIssue::MissingAttribute { .. }))
        );
        assert!(
            model
                .issues
                .iter()
                .any(|i| matches!(i, ModelIssue::UnknownSignalType { .. }))
        );
        assert!(
            model
                .issues
                .iter()
                .any(|i| matches!(i, ModelIssue::BadDeviceMap { .. }))
        );
    }

    #[test]
    fn registry_layout_order_and_lookup() {
        let model = model();
        let registry = SignalRegistry::from_devices(&model.devices);

        // Host signals first, then submodule signals (traversal order).
        let inputs: Vec<_> = registry.inputs().iter().map(|s| s.name()).collect();
        assert_eq!(inputs, ["di0", "di2", "giSpeed", "aiTemp"]);

        assert!(registry.get("doRun").is_some());
        assert!(registry.get("sysSignal").is_none());
        assert_eq!(registry.len(), 5);
    }

    #[test]
    fn registry_bind_by_name() {
        struct NullHandle;
        impl crate::signal::SignalHandle for NullHandle {
            fn write_value(&self, _: f32) -> Result<(), crate::error::BindingError> {
                Ok(())
            }
        }

        let model = model();
        let registry = SignalRegistry::from_devices(&model.devices);
        assert!(registry.bind("di0", Arc::new(NullHandle)));
        assert!(!registry.bind("missing", Arc::new(NullHandle)));
        assert!(registry.get("di0").unwrap().is_bound());
        assert!(!registry.get("di2").unwrap().is_bound());
    }

    #[test]
    fn unsupported_width_is_flagged() {
        let cfg = "\
EIO:CFG_1.0:6:1::
#
PROFINET_DEVICE:

      -Name \"d1\"
#
EIO_SIGNAL:

      -Name \"odd\" -SignalType \"GI\" -Device \"d1\" -DeviceMap \"0-9\"
#
";
        let (tree, _) = parse_str(cfg, "");
        let model = DeviceModel::build(&tree);
        // The signal is kept — width validation belongs to the layout
        // producer — but the issue is visible.
        assert_eq!(model.devices[0].inputs.len(), 1);
        assert!(
            model
                .issues
                .iter()
                .any(|i| matches!(i, ModelIssue::UnsupportedWidth { bits: 10, .. }))
        );
    }
}
