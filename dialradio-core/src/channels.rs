use std::collections::BTreeMap;

use crate::error::{ConfigError, DialError};

/// A selectable stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelEntry {
    pub index: u8,
    pub name: String,
    pub uri: String,
}

/// What sits behind a channel index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelSlot {
    Station(ChannelEntry),
    /// An inert stop, e.g. "off".
    Disabled,
}

/// Static table of channels keyed by index.
///
/// Index 1 is the stop nearest the knob's "max" end; higher indices move
/// away from it.
#[derive(Debug, Clone, Default)]
pub struct ChannelRegistry {
    slots: BTreeMap<u8, ChannelSlot>,
}

impl ChannelRegistry {
    pub fn new(slots: impl IntoIterator<Item = (u8, ChannelSlot)>) -> Result<Self, ConfigError> {
        let mut map = BTreeMap::new();
        for (index, slot) in slots {
            if index == 0 {
                return Err(ConfigError::ZeroChannelIndex);
            }
            if let ChannelSlot::Station(entry) = &slot {
                if entry.name.trim().is_empty() {
                    return Err(ConfigError::UnnamedChannel(index));
                }
            }
            if map.insert(index, slot).is_some() {
                return Err(ConfigError::DuplicateChannel(index));
            }
        }
        Ok(Self { slots: map })
    }

    /// Unknown indices read as disabled.
    pub fn lookup(&self, index: u8) -> &ChannelSlot {
        self.slots.get(&index).unwrap_or(&ChannelSlot::Disabled)
    }

    /// The entry for `index` if it can actually be played.
    pub fn playable(&self, index: u8) -> Result<&ChannelEntry, DialError> {
        match self.lookup(index) {
            ChannelSlot::Station(entry) if !entry.uri.trim().is_empty() => Ok(entry),
            _ => Err(DialError::ChannelUnavailable(index)),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station(index: u8, name: &str, uri: &str) -> (u8, ChannelSlot) {
        (
            index,
            ChannelSlot::Station(ChannelEntry {
                index,
                name: name.to_string(),
                uri: uri.to_string(),
            }),
        )
    }

    #[test]
    fn test_lookup_station_and_disabled() {
        let registry = ChannelRegistry::new([
            station(1, "City Radio", "https://example.com/city"),
            (2, ChannelSlot::Disabled),
        ])
        .unwrap();

        assert!(matches!(registry.lookup(1), ChannelSlot::Station(e) if e.name == "City Radio"));
        assert_eq!(registry.lookup(2), &ChannelSlot::Disabled);
        assert_eq!(registry.lookup(9), &ChannelSlot::Disabled);
    }

    #[test]
    fn test_playable_rejects_disabled_unknown_and_empty_uri() {
        let registry = ChannelRegistry::new([
            station(1, "City Radio", "https://example.com/city"),
            station(2, "Silent", "  "),
            (3, ChannelSlot::Disabled),
        ])
        .unwrap();

        assert_eq!(registry.playable(1).unwrap().uri, "https://example.com/city");
        assert_eq!(
            registry.playable(2).unwrap_err(),
            DialError::ChannelUnavailable(2)
        );
        assert_eq!(
            registry.playable(3).unwrap_err(),
            DialError::ChannelUnavailable(3)
        );
        assert_eq!(
            registry.playable(7).unwrap_err(),
            DialError::ChannelUnavailable(7)
        );
    }

    #[test]
    fn test_registry_validation() {
        assert!(matches!(
            ChannelRegistry::new([(0, ChannelSlot::Disabled)]),
            Err(ConfigError::ZeroChannelIndex)
        ));
        assert!(matches!(
            ChannelRegistry::new([station(1, "A", "a"), station(1, "B", "b")]),
            Err(ConfigError::DuplicateChannel(1))
        ));
        assert!(matches!(
            ChannelRegistry::new([station(4, "", "a")]),
            Err(ConfigError::UnnamedChannel(4))
        ));
    }
}
