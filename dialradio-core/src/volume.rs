use dialradio_messages::Gain;

use crate::error::ConfigError;
use crate::knob::KnobId;

/// Gain for each volume knob stop, indexed `1..=steps`.
///
/// Stop 1 is the loudest and the last stop the quietest.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeLevels {
    levels: Vec<Gain>,
}

impl VolumeLevels {
    /// Validate a level list against the volume knob's step count.
    pub fn new(levels: Vec<f32>, steps: usize) -> Result<Self, ConfigError> {
        if steps < 2 {
            return Err(ConfigError::TooFewSteps {
                knob: KnobId::Volume,
                steps,
            });
        }
        if levels.len() != steps {
            return Err(ConfigError::LevelCountMismatch {
                steps,
                levels: levels.len(),
            });
        }

        for (i, &level) in levels.iter().enumerate() {
            if !(level > 0.0 && level <= 1.0) {
                return Err(ConfigError::LevelOutOfRange {
                    position: i + 1,
                    level,
                });
            }
            if i > 0 && level > levels[i - 1] {
                return Err(ConfigError::LevelsNotDescending { position: i + 1 });
            }
        }

        Ok(Self {
            levels: levels.into_iter().map(Gain).collect(),
        })
    }

    /// Level for a 1-based stop, `None` outside `1..=len`.
    pub fn level(&self, stop: usize) -> Option<Gain> {
        stop.checked_sub(1).and_then(|i| self.levels.get(i)).copied()
    }

    pub fn quietest(&self) -> Gain {
        self.levels[self.levels.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_are_one_based() {
        let levels = VolumeLevels::new(vec![1.0, 0.85, 0.6, 0.35, 0.2], 5).unwrap();
        assert_eq!(levels.level(0), None);
        assert_eq!(levels.level(1), Some(Gain(1.0)));
        assert_eq!(levels.level(5), Some(Gain(0.2)));
        assert_eq!(levels.level(6), None);
        assert_eq!(levels.quietest(), Gain(0.2));
    }

    #[test]
    fn test_level_count_must_match_steps() {
        let err = VolumeLevels::new(vec![1.0, 0.5], 5).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::LevelCountMismatch {
                steps: 5,
                levels: 2
            }
        ));
    }

    #[test]
    fn test_levels_must_not_increase() {
        let err = VolumeLevels::new(vec![1.0, 0.5, 0.7], 3).unwrap_err();
        assert!(matches!(err, ConfigError::LevelsNotDescending { position: 3 }));

        // Equal neighbours are allowed.
        assert!(VolumeLevels::new(vec![1.0, 0.5, 0.5], 3).is_ok());
    }

    #[test]
    fn test_empty_table_is_rejected() {
        let err = VolumeLevels::new(vec![], 0).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::TooFewSteps {
                knob: KnobId::Volume,
                steps: 0
            }
        ));
        assert!(VolumeLevels::new(vec![1.0], 1).is_err());
    }

    #[test]
    fn test_levels_must_be_audible_fractions() {
        assert!(VolumeLevels::new(vec![1.2, 0.5], 2).is_err());
        assert!(VolumeLevels::new(vec![0.5, 0.0], 2).is_err());
        assert!(VolumeLevels::new(vec![f32::NAN, 0.5], 2).is_err());
    }
}
