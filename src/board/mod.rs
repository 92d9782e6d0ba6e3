//! Read-only board snapshot consumed by the checker
//!
//! The snapshot holds everything a run looks at: the layer stack, net
//! signals, placed devices, net segments, planes, polygons, holes and texts.
//! It derives `Deserialize` so batch tools can load one from JSON.
//!
//! # Submodules
//! - `layers` - Layer names and the ordered layer stack
//! - `items` - Holes, vias, traces, planes, graphics and air wires
//! - `device` - Placed devices, footprints and pads
//! - `services` - Plane rebuild and air-wire collaborator

mod device;
mod items;
mod layers;
mod services;

use crate::rules::RuleSet;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use device::{ComponentSide, Device, Footprint, FootprintPad, PadShape};
pub use items::{
    AirWire, CircleShape, Hole, NetLine, NetSegment, Plane, PolygonShape, SlotShape, StrokeText, Via, ViaShape,
};
pub use layers::{
    inner_copper_layer, is_copper_layer, is_inner_copper_layer, mirrored_layer_name, Layer, LayerStack,
    BOARD_OUTLINES, BOT_COPPER, BOT_COURTYARD, BOT_SOLDER_PASTE, BOT_STOP_MASK, TOP_COPPER, TOP_COURTYARD,
    TOP_SOLDER_PASTE, TOP_STOP_MASK,
};
pub use services::{BoardServices, PlaneFills, SnapshotServices};

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetSignalId(String);

impl NetSignalId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NetSignalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetSignal {
    pub id: NetSignalId,
    pub name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Board {
    pub name: String,
    pub layers: LayerStack,
    pub rules: RuleSet,
    /// Net signals in a stable order, which drives pair enumeration
    pub net_signals: IndexMap<NetSignalId, NetSignal>,
    pub devices: Vec<Device>,
    pub net_segments: Vec<NetSegment>,
    pub planes: Vec<Plane>,
    pub polygons: Vec<PolygonShape>,
    /// Non-plated board holes
    pub holes: Vec<Hole>,
    pub stroke_texts: Vec<StrokeText>,
    /// Last known unrouted connections
    pub air_wires: Vec<AirWire>,
}

impl Board {
    pub fn new(name: impl Into<String>, layers: LayerStack) -> Self {
        Self {
            name: name.into(),
            layers,
            ..Self::default()
        }
    }

    /// Register a net signal; the name doubles as its id
    pub fn add_net_signal(&mut self, name: impl Into<String>) -> NetSignalId {
        let name = name.into();
        let id = NetSignalId::new(name.clone());
        self.net_signals.insert(
            id.clone(),
            NetSignal {
                id: id.clone(),
                name,
            },
        );
        id
    }

    /// Net name for messages; unconnected or unknown nets print as ""
    pub fn net_name(&self, net: Option<&NetSignalId>) -> &str {
        net.and_then(|id| self.net_signals.get(id))
            .map(|n| n.name.as_str())
            .unwrap_or("")
    }

    /// All net signals followed by `None` for unconnected copper
    pub fn nets_with_unconnected(&self) -> Vec<Option<&NetSignalId>> {
        self.net_signals
            .keys()
            .map(Some)
            .chain(std::iter::once(None))
            .collect()
    }

    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_net_order_and_names() {
        let mut board = Board::new("test", LayerStack::standard(0));
        let gnd = board.add_net_signal("GND");
        let vcc = board.add_net_signal("VCC");
        let nets = board.nets_with_unconnected();
        assert_eq!(nets, vec![Some(&gnd), Some(&vcc), None]);
        assert_eq!(board.net_name(Some(&vcc)), "VCC");
        assert_eq!(board.net_name(None), "");
    }

    #[test]
    fn test_board_json_roundtrip_defaults() {
        let board = Board::from_json_str(r#"{ "name": "empty" }"#).unwrap();
        assert_eq!(board.name, "empty");
        assert_eq!(board.rules, RuleSet::default());
        assert!(board.devices.is_empty());
    }
}
