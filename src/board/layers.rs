//! Layer names and the ordered layer stack

use serde::{Deserialize, Serialize};

pub const BOARD_OUTLINES: &str = "brd_outlines";
pub const TOP_COPPER: &str = "top_cu";
pub const BOT_COPPER: &str = "bot_cu";
pub const TOP_COURTYARD: &str = "top_courtyard";
pub const BOT_COURTYARD: &str = "bot_courtyard";
pub const TOP_STOP_MASK: &str = "top_stop_mask";
pub const BOT_STOP_MASK: &str = "bot_stop_mask";
pub const TOP_SOLDER_PASTE: &str = "top_solder_paste";
pub const BOT_SOLDER_PASTE: &str = "bot_solder_paste";

/// Copper layers are the only ones taking part in clearance checks
pub fn is_copper_layer(name: &str) -> bool {
    name.ends_with("_cu")
}

pub fn is_inner_copper_layer(name: &str) -> bool {
    is_copper_layer(name) && name.starts_with("in")
}

pub fn inner_copper_layer(number: usize) -> String {
    format!("in{}_cu", number)
}

/// The layer on the opposite board side (inner layers map to themselves)
pub fn mirrored_layer_name(name: &str) -> String {
    if let Some(rest) = name.strip_prefix("top_") {
        format!("bot_{}", rest)
    } else if let Some(rest) = name.strip_prefix("bot_") {
        format!("top_{}", rest)
    } else {
        name.to_string()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layer {
    pub name: String,
    pub display_name: String,
    pub copper: bool,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

impl Layer {
    pub fn new(name: impl Into<String>, display_name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            copper: is_copper_layer(&name),
            name,
            display_name: display_name.into(),
            enabled: true,
        }
    }
}

/// Layers in stack order, top to bottom
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerStack {
    layers: Vec<Layer>,
}

impl LayerStack {
    pub fn new(layers: Vec<Layer>) -> Self {
        Self { layers }
    }

    /// Outline, courtyards, masks and `2 + inner` copper layers
    pub fn standard(inner: usize) -> Self {
        let mut layers = vec![
            Layer::new(BOARD_OUTLINES, "Board Outlines"),
            Layer::new(TOP_COURTYARD, "Top Courtyard"),
            Layer::new(TOP_SOLDER_PASTE, "Top Solder Paste"),
            Layer::new(TOP_STOP_MASK, "Top Stop Mask"),
            Layer::new(TOP_COPPER, "Top Copper"),
        ];
        for i in 1..=inner {
            layers.push(Layer::new(inner_copper_layer(i), format!("Inner Copper {}", i)));
        }
        layers.extend([
            Layer::new(BOT_COPPER, "Bottom Copper"),
            Layer::new(BOT_STOP_MASK, "Bottom Stop Mask"),
            Layer::new(BOT_SOLDER_PASTE, "Bottom Solder Paste"),
            Layer::new(BOT_COURTYARD, "Bottom Courtyard"),
        ]);
        Self { layers }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter()
    }

    pub fn get(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Enabled copper layers in stack order
    pub fn enabled_copper_layers(&self) -> Vec<&Layer> {
        self.layers.iter().filter(|l| l.copper && l.enabled).collect()
    }

    /// Display name for messages, falling back to the internal name
    pub fn display_name<'a>(&'a self, name: &'a str) -> &'a str {
        self.get(name).map(|l| l.display_name.as_str()).unwrap_or(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_copper_layer() {
        assert!(is_copper_layer("top_cu"));
        assert!(is_copper_layer("in3_cu"));
        assert!(!is_copper_layer("top_courtyard"));
        assert!(is_inner_copper_layer("in1_cu"));
        assert!(!is_inner_copper_layer("bot_cu"));
    }

    #[test]
    fn test_standard_stack_order() {
        let stack = LayerStack::standard(2);
        let copper: Vec<&str> = stack.enabled_copper_layers().iter().map(|l| l.name.as_str()).collect();
        assert_eq!(copper, vec!["top_cu", "in1_cu", "in2_cu", "bot_cu"]);
        assert_eq!(stack.display_name("bot_cu"), "Bottom Copper");
    }

    #[test]
    fn test_disabled_layers_are_skipped() {
        let mut stack = LayerStack::standard(1);
        if let Some(layer) = stack.get_mut("in1_cu") {
            layer.enabled = false;
        }
        assert_eq!(stack.enabled_copper_layers().len(), 2);
    }
}
