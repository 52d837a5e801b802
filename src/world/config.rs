//! `worlds/{worldId}/config.json` shape: seed and display name (§6).

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorldConfig {
    pub seed: u32,
    pub name: String,
}
