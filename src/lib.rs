//! A virtual cat whose mood follows three bounded stats (hunger, happiness,
//! energy), passive decay and the player's care.
//!
//! [`PetGame`] owns the pet. Drive it with [`PetGame::apply`] for player
//! interactions and [`PetGame::advance`] as wall-clock time passes, and read
//! [`PetGame::view`] to draw it.

pub mod activity;
pub mod dice;
pub mod game;
pub mod model;
pub mod mood;
pub mod rules;
pub mod scheduler;
pub mod sim;
pub mod stats;
pub mod storage;
pub mod store;

pub use activity::{Activity, Facing, PressKind};
pub use dice::{Dice, RngDice, ScriptedDice};
pub use game::{PetGame, PetView};
pub use model::{PetState, Toy, ToyChoice};
pub use mood::{resolve_mood, MoodId};
pub use rules::Rules;
pub use sim::{Interaction, Outcome};
pub use stats::{clamp, Stats};
pub use storage::{Persistence, LAST_DAY_KEY, STATS_KEY};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
