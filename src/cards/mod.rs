//! Card definitions, instances and filters.
//!
//! - `CardDefinition`: printed card data, loaded once
//! - `CardInstance`: a card in a game, with its derived state
//! - `CardRegistry`: lookup for definitions
//! - `CardFilter`: predicates over cards for targeting and counting
//! - `Keyword`: typed keyword abilities

mod definition;
mod filter;
mod instance;
mod keyword;
mod registry;

pub use definition::{CardDefinition, CardId};
pub use filter::{CardFilter, OwnerScope};
pub use instance::{AbilityUseKey, CardInstance, CardMeta, CardType, Stat, Zone};
pub use keyword::Keyword;
pub use registry::CardRegistry;
