use serde::{Deserialize, Serialize};

/// Default distance between PRINT tab stops.
pub const DEFAULT_TAB_WIDTH: usize = 10;

/// Knobs for one program run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Statement budget; `None` runs until the program stops.
    pub max_steps: Option<u64>,
    pub tab_width: usize,
    /// Seed for RND. Unseeded runs draw from OS entropy.
    pub seed: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_steps: None,
            tab_width: DEFAULT_TAB_WIDTH,
            seed: None,
        }
    }
}

impl RunConfig {
    pub fn with_max_steps(mut self, max_steps: u64) -> Self {
        self.max_steps = Some(max_steps);
        self
    }

    /// A width of zero is treated as one.
    pub fn with_tab_width(mut self, tab_width: usize) -> Self {
        self.tab_width = tab_width.max(1);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
