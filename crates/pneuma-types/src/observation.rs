use serde::{Deserialize, Serialize};

use crate::Millis;

/// Host visibility state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
}

/// User interaction tag attached to an observation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interaction {
    Pause,
    Resume,
    Touch,
}

/// Point-in-time input to the inference model, built fresh on every tick.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    pub timestamp: Millis,
    /// Seconds since the previous tick.
    pub delta_time: f64,
    pub visibility: Visibility,
    pub interaction: Option<Interaction>,
}

impl Observation {
    /// Hidden host or an explicit pause both count as an interruption.
    pub fn is_interrupted(&self) -> bool {
        self.visibility == Visibility::Hidden || self.interaction == Some(Interaction::Pause)
    }
}
