use serde::{Deserialize, Serialize};

/// Highlight fill color, straight RGBA with alpha in [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FillColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Default for FillColor {
    fn default() -> Self {
        // Translucent yellow, the classic marker look
        Self {
            r: 255,
            g: 255,
            b: 0,
            a: 0.4,
        }
    }
}

/// Engine configuration. Hosts embed this in their own settings files;
/// every field falls back to a sensible default when absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Pages kept materialized on each side of the current page before
    /// eviction. Also bounds the repaint window around the current page.
    #[serde(default = "default_overscan")]
    pub overscan: usize,

    /// Worker threads for page text materialization.
    #[serde(default = "default_text_workers")]
    pub text_workers: usize,

    /// Fill used when painting highlight boxes.
    #[serde(default)]
    pub highlight_fill: FillColor,
}

fn default_overscan() -> usize {
    3
}

fn default_text_workers() -> usize {
    2
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            overscan: default_overscan(),
            text_workers: default_text_workers(),
            highlight_fill: FillColor::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let config: EngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.overscan, 3);
        assert_eq!(config.text_workers, 2);
        assert_eq!(config.highlight_fill, FillColor::default());
    }

    #[test]
    fn partial_config_keeps_other_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"overscan": 1}"#).unwrap();
        assert_eq!(config.overscan, 1);
        assert_eq!(config.text_workers, 2);
    }

    #[test]
    fn round_trips_through_json() {
        let config = EngineConfig {
            overscan: 5,
            text_workers: 4,
            highlight_fill: FillColor {
                r: 0,
                g: 128,
                b: 255,
                a: 0.25,
            },
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.overscan, 5);
        assert_eq!(back.text_workers, 4);
        assert_eq!(back.highlight_fill.b, 255);
    }
}
