//! Upgrade shop: player stat tiers bought with coins
//!
//! Only the purchase rules live here; layout and click handling belong to
//! the UI layer.

use serde::{Deserialize, Serialize};

use crate::sim::state::{GameState, Modal, Player};

/// One step on an upgrade track
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tier {
    pub cost: u32,
    pub value: f32,
    pub description: &'static str,
}

const JUMP_TIERS: [Tier; 5] = [
    Tier {
        cost: 0,
        value: 550.0,
        description: "Standard Jump",
    },
    Tier {
        cost: 5,
        value: 650.0,
        description: "Enhanced Jump",
    },
    Tier {
        cost: 15,
        value: 750.0,
        description: "Super Jump",
    },
    Tier {
        cost: 30,
        value: 850.0,
        description: "Ultra Jump",
    },
    Tier {
        cost: 50,
        value: 950.0,
        description: "Mega Jump",
    },
];

const SPEED_TIERS: [Tier; 5] = [
    Tier {
        cost: 0,
        value: 300.0,
        description: "Standard Speed",
    },
    Tier {
        cost: 5,
        value: 350.0,
        description: "Quick Pace",
    },
    Tier {
        cost: 15,
        value: 400.0,
        description: "Swift Run",
    },
    Tier {
        cost: 30,
        value: 450.0,
        description: "Blazing Speed",
    },
    Tier {
        cost: 50,
        value: 500.0,
        description: "Lightning Fast",
    },
];

/// Upgrade tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Upgrade {
    JumpPower,
    MoveSpeed,
}

impl Upgrade {
    pub fn name(&self) -> &'static str {
        match self {
            Upgrade::JumpPower => "Jump Power",
            Upgrade::MoveSpeed => "Movement Speed",
        }
    }

    pub fn tiers(&self) -> &'static [Tier] {
        match self {
            Upgrade::JumpPower => &JUMP_TIERS,
            Upgrade::MoveSpeed => &SPEED_TIERS,
        }
    }

    fn stat(&self, player: &Player) -> f32 {
        match self {
            Upgrade::JumpPower => player.jump_power,
            Upgrade::MoveSpeed => player.move_speed,
        }
    }

    fn stat_mut<'a>(&self, player: &'a mut Player) -> &'a mut f32 {
        match self {
            Upgrade::JumpPower => &mut player.jump_power,
            Upgrade::MoveSpeed => &mut player.move_speed,
        }
    }

    /// Index of the tier matching the player's stat (highest tier at or below it)
    pub fn current_tier(&self, player: &Player) -> usize {
        let stat = self.stat(player);
        self.tiers()
            .iter()
            .rposition(|t| t.value <= stat)
            .unwrap_or(0)
    }

    /// The tier a purchase would grant, if any remain
    pub fn next_tier(&self, player: &Player) -> Option<Tier> {
        self.tiers().get(self.current_tier(player) + 1).copied()
    }
}

/// Why a purchase failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseError {
    MaxedOut,
    NotEnoughCoins { needed: u32, available: u32 },
}

impl std::fmt::Display for PurchaseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PurchaseError::MaxedOut => write!(f, "This upgrade is already at maximum level!"),
            PurchaseError::NotEnoughCoins { needed, .. } => {
                write!(f, "Not enough coins! You need {} coins.", needed)
            }
        }
    }
}

impl std::error::Error for PurchaseError {}

/// Buy the next tier of `upgrade`, spending coins from `state`
pub fn purchase(state: &mut GameState, upgrade: Upgrade) -> Result<Tier, PurchaseError> {
    let tier = upgrade
        .next_tier(&state.player)
        .ok_or(PurchaseError::MaxedOut)?;

    if state.coins < tier.cost {
        return Err(PurchaseError::NotEnoughCoins {
            needed: tier.cost,
            available: state.coins,
        });
    }

    state.coins -= tier.cost;
    *upgrade.stat_mut(&mut state.player) = tier.value;
    log::info!(
        "Upgraded {} to {} for {} coins ({} left)",
        upgrade.name(),
        tier.description,
        tier.cost,
        state.coins
    );
    Ok(tier)
}

/// Open or close the shop overlay; gameplay pauses while it is open
pub fn toggle_shop(state: &mut GameState) -> bool {
    match state.modal {
        Some(Modal::Shop) => {
            state.modal = None;
            false
        }
        Some(Modal::Tutorial) => false,
        None => {
            state.modal = Some(Modal::Shop);
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_purchase_flow() {
        let mut state = GameState::new();
        state.coins = 20;

        let tier = purchase(&mut state, Upgrade::JumpPower).unwrap();
        assert_eq!(tier.description, "Enhanced Jump");
        assert_eq!(state.player.jump_power, 650.0);
        assert_eq!(state.coins, 15);

        let tier = purchase(&mut state, Upgrade::JumpPower).unwrap();
        assert_eq!(tier.value, 750.0);
        assert_eq!(state.coins, 0);

        let err = purchase(&mut state, Upgrade::JumpPower).unwrap_err();
        assert_eq!(
            err,
            PurchaseError::NotEnoughCoins {
                needed: 30,
                available: 0
            }
        );
        assert_eq!(state.player.jump_power, 750.0);
    }

    #[test]
    fn test_maxed_out() {
        let mut state = GameState::new();
        state.coins = 1000;
        for _ in 0..4 {
            purchase(&mut state, Upgrade::MoveSpeed).unwrap();
        }
        assert_eq!(state.player.move_speed, 500.0);
        assert_eq!(
            purchase(&mut state, Upgrade::MoveSpeed),
            Err(PurchaseError::MaxedOut)
        );
        assert_eq!(state.coins, 1000 - 5 - 15 - 30 - 50);
    }

    #[test]
    fn test_toggle_shop() {
        let mut state = GameState::new();
        assert!(toggle_shop(&mut state));
        assert_eq!(state.modal, Some(Modal::Shop));
        assert!(!toggle_shop(&mut state));
        assert_eq!(state.modal, None);
    }
}
