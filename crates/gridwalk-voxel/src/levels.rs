//! Scale levels of the traversal hierarchy.

use gridwalk_core::constants::{COARSE_MAX_STEPS, DEFAULT_SCALES, FINE_MAX_STEPS};
use gridwalk_core::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::chunk::Chunk;

/// One grid resolution and its iteration budget.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LevelConfig {
    /// World units per cell.
    pub scale: u32,
    /// Maximum stepping iterations at this level.
    pub max_steps: u32,
}

impl LevelConfig {
    /// Create a new level
    #[inline]
    pub const fn new(scale: u32, max_steps: u32) -> Self {
        Self { scale, max_steps }
    }
}

/// Unvalidated traversal configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraversalConfig {
    /// Levels, coarsest first.
    pub levels: Vec<LevelConfig>,
    /// Optional bound for the coarsest level, in coarsest-level cells.
    pub root_bounds: Option<Chunk>,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        let last = DEFAULT_SCALES.len() - 1;
        Self {
            levels: DEFAULT_SCALES
                .iter()
                .enumerate()
                .map(|(i, &scale)| {
                    let budget = if i == last {
                        FINE_MAX_STEPS
                    } else {
                        COARSE_MAX_STEPS
                    };
                    LevelConfig::new(scale, budget)
                })
                .collect(),
            root_bounds: None,
        }
    }
}

impl TraversalConfig {
    /// Create a config from explicit levels.
    pub fn new(levels: impl Into<Vec<LevelConfig>>) -> Self {
        Self {
            levels: levels.into(),
            root_bounds: None,
        }
    }

    /// Single unbounded level.
    pub fn flat(level: LevelConfig) -> Self {
        Self::new(vec![level])
    }

    /// Confine the coarsest level to a chunk of coarsest-level cells.
    #[must_use]
    pub fn with_root_bounds(mut self, bounds: Chunk) -> Self {
        self.root_bounds = Some(bounds);
        self
    }

    /// Validate into a traversable level list.
    pub fn build(self) -> Result<TraversalLevels> {
        TraversalLevels::new(self.levels, self.root_bounds)
    }
}

/// Validated level list.
///
/// Guarantees at least one level, non-zero scales and budgets, strictly
/// decreasing scales, and each scale dividing its parent's evenly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraversalLevels {
    levels: Vec<LevelConfig>,
    root_bounds: Option<Chunk>,
}

impl TraversalLevels {
    /// Validate a level list.
    pub fn new(levels: Vec<LevelConfig>, root_bounds: Option<Chunk>) -> Result<Self> {
        if levels.is_empty() {
            return Err(Error::InvalidConfig(
                "traversal needs at least one level".to_string(),
            ));
        }
        for level in &levels {
            if level.scale == 0 {
                return Err(Error::InvalidConfig("level scale must be non-zero".to_string()));
            }
            if level.max_steps == 0 {
                return Err(Error::InvalidConfig(format!(
                    "level with scale {} has a zero step budget",
                    level.scale
                )));
            }
        }
        for pair in levels.windows(2) {
            let (parent, child) = (pair[0].scale, pair[1].scale);
            if child >= parent {
                return Err(Error::InvalidConfig(format!(
                    "scales must strictly decrease, got {parent} then {child}"
                )));
            }
            if parent % child != 0 {
                return Err(Error::InvalidConfig(format!(
                    "scale {child} does not evenly divide parent scale {parent}"
                )));
            }
        }
        if let Some(bounds) = root_bounds {
            if bounds.extent <= 0 {
                return Err(Error::InvalidConfig(format!(
                    "root bounds extent must be positive, got {}",
                    bounds.extent
                )));
            }
        }
        Ok(Self {
            levels,
            root_bounds,
        })
    }

    /// All levels, coarsest first.
    #[inline]
    pub fn levels(&self) -> &[LevelConfig] {
        &self.levels
    }

    /// Bound applied to the coarsest level, if any.
    #[inline]
    pub const fn root_bounds(&self) -> Option<Chunk> {
        self.root_bounds
    }

    /// Number of levels.
    #[inline]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Always false; a validated list has at least one level.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// The finest level.
    #[inline]
    pub fn finest(&self) -> LevelConfig {
        self.levels[self.levels.len() - 1]
    }

    /// Upper bound on iterations for one ray across all levels.
    pub fn max_total_steps(&self) -> u64 {
        self.levels.iter().map(|l| u64::from(l.max_steps)).sum()
    }
}

/// Parse levels from `"64:20,8:20,1:23"` (`scale:max_steps` pairs).
pub fn parse_levels(s: &str) -> Result<Vec<LevelConfig>> {
    s.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            let (scale, steps) = part.split_once(':').ok_or_else(|| {
                Error::InvalidData(format!("level '{part}' is not of the form scale:steps"))
            })?;
            let scale = scale
                .trim()
                .parse()
                .map_err(|e| Error::InvalidData(format!("bad scale in '{part}': {e}")))?;
            let steps = steps
                .trim()
                .parse()
                .map_err(|e| Error::InvalidData(format!("bad step budget in '{part}': {e}")))?;
            Ok(LevelConfig::new(scale, steps))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridwalk_core::GridCoord;

    #[test]
    fn default_levels() {
        let levels = TraversalConfig::default().build().unwrap();
        assert_eq!(
            levels.levels(),
            &[
                LevelConfig::new(64, 20),
                LevelConfig::new(8, 20),
                LevelConfig::new(1, 23)
            ]
        );
        assert_eq!(levels.finest(), LevelConfig::new(1, 23));
        assert_eq!(levels.max_total_steps(), 63);
        assert!(levels.root_bounds().is_none());
    }

    #[test]
    fn rejects_non_decreasing_scales() {
        let err = TraversalConfig::new([LevelConfig::new(8, 10), LevelConfig::new(8, 10)])
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn rejects_uneven_division() {
        let result = TraversalConfig::new([LevelConfig::new(12, 10), LevelConfig::new(8, 10)])
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn rejects_empty_and_zero_values() {
        assert!(TraversalConfig::new(Vec::new()).build().is_err());
        assert!(TraversalConfig::flat(LevelConfig::new(0, 10)).build().is_err());
        assert!(TraversalConfig::flat(LevelConfig::new(1, 0)).build().is_err());
        assert!(TraversalConfig::flat(LevelConfig::new(1, 5))
            .with_root_bounds(Chunk::new(GridCoord::default(), 0))
            .build()
            .is_err());
    }

    #[test]
    fn accepts_non_power_of_two_ratios() {
        let levels = TraversalConfig::new([
            LevelConfig::new(27, 8),
            LevelConfig::new(9, 8),
            LevelConfig::new(3, 8),
            LevelConfig::new(1, 8),
        ])
        .build()
        .unwrap();
        assert_eq!(levels.len(), 4);
    }

    #[test]
    fn parse_level_list() {
        let levels = parse_levels("64:20, 8:20,1:23").unwrap();
        assert_eq!(
            levels,
            vec![
                LevelConfig::new(64, 20),
                LevelConfig::new(8, 20),
                LevelConfig::new(1, 23)
            ]
        );
        assert!(parse_levels("64").is_err());
        assert!(parse_levels("64:x").is_err());
        assert!(parse_levels("-8:3").is_err());
    }
}
