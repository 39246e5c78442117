use serde::{Deserialize, Serialize};

/// How the registry's contents are exposed to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode")]
pub enum Exposure {
    /// Fixed set built once at startup. Never mutated afterwards.
    #[serde(rename = "static")]
    StaticSet { names: Vec<String> },
    /// Restored from the host cache and mutated at runtime by triggers.
    #[serde(rename = "dynamic")]
    DynamicSet,
    /// Each device is published as its own separately paired accessory.
    #[serde(rename = "external")]
    ExternallyPublished { names: Vec<String> },
}

impl Exposure {
    /// Parse a mode keyword (`static`, `dynamic`, `external`).
    ///
    /// Empty `names` fall back to the default device names of the mode.
    pub fn from_mode(mode: &str, names: Vec<String>) -> Option<Self> {
        let or_default = |defaults: &[&str]| {
            if names.is_empty() {
                defaults.iter().map(|n| n.to_string()).collect()
            } else {
                names.clone()
            }
        };

        match mode.trim().to_ascii_lowercase().as_str() {
            "static" => Some(Self::StaticSet {
                names: or_default(&["Switch 1", "Switch 2"]),
            }),
            "dynamic" => Some(Self::DynamicSet),
            "external" => Some(Self::ExternallyPublished {
                names: or_default(&["MySwitch 1"]),
            }),
            _ => None,
        }
    }

    /// Whether triggers may add and remove devices.
    pub fn is_mutable(&self) -> bool {
        matches!(self, Self::DynamicSet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_mode_defaults() {
        assert_eq!(
            Exposure::from_mode("static", Vec::new()),
            Some(Exposure::StaticSet {
                names: vec!["Switch 1".to_string(), "Switch 2".to_string()]
            })
        );
        assert_eq!(
            Exposure::from_mode("External", Vec::new()),
            Some(Exposure::ExternallyPublished {
                names: vec!["MySwitch 1".to_string()]
            })
        );
        assert_eq!(Exposure::from_mode("dynamic", Vec::new()), Some(Exposure::DynamicSet));
        assert_eq!(Exposure::from_mode("bogus", Vec::new()), None);
    }

    #[test]
    fn test_from_mode_keeps_names() {
        let names = vec!["Hall".to_string()];
        assert_eq!(
            Exposure::from_mode("static", names.clone()),
            Some(Exposure::StaticSet { names })
        );
    }

    #[test]
    fn test_serde_uses_mode_keywords() {
        let cases = [
            ("static", vec!["A".to_string()]),
            ("dynamic", Vec::new()),
            ("external", Vec::new()),
        ];
        for (mode, names) in cases {
            let exposure = Exposure::from_mode(mode, names).unwrap();
            let json = serde_json::to_value(&exposure).unwrap();
            assert_eq!(json["mode"], mode);

            let back: Exposure = serde_json::from_value(json).unwrap();
            assert_eq!(back, exposure);
        }
        assert!(Exposure::DynamicSet.is_mutable());
    }
}
