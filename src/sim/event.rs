/// Events emitted during a simulation step.
/// The presentation layer and the log consume these.

use crate::domain::bonus::FruitKind;
use crate::domain::entity::Pos;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    SmallEaten { at: Pos, remaining: u32 },
    LargeEaten { at: Pos, remaining: u32 },
    BonusSpawned { at: Pos, fruit: FruitKind },
    BonusCollected { at: Pos, fruit: FruitKind },
    LifeLost { remaining: u32 },
    /// Player and pursuers sent back to their start cells after a catch.
    PositionsReset,
    RoundWon { score: u32 },
    RoundLost { score: u32 },
}
