use serde::{Deserialize, Serialize};

use crate::money::Chips;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "action")]
pub enum PlayerAction {
    Fold,
    Check,
    Call,
    BetTo { to: Chips },
    RaiseTo { to: Chips },
    AllIn,
}
