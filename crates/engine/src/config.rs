use serde::{Deserialize, Serialize};

/// Tie-break policy when a walker has more than one way to go.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickMode {
    /// Keep going straight when possible, otherwise pick a random
    /// non-backward neighbor.
    #[default]
    Forward,
    /// Uniform over every candidate, backward included.
    Random,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    pub pick_mode: PickMode,
    /// Layer holding the walkable track tiles.
    pub path_layer: i32,
    /// Hard cap on loop iterations; zero-cost loops would otherwise spin
    /// forever.
    pub max_steps: usize,
}

impl PlannerConfig {
    /// Board-game track: straight ahead first, track on layer 0.
    pub fn monopoly() -> Self {
        Self {
            pick_mode: PickMode::Forward,
            path_layer: 0,
            max_steps: 4096,
        }
    }

    pub fn wandering() -> Self {
        Self {
            pick_mode: PickMode::Random,
            ..Self::monopoly()
        }
    }

    pub fn with_path_layer(mut self, layer: i32) -> Self {
        self.path_layer = layer;
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self::monopoly()
    }
}
