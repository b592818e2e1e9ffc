// Core raffle logic: roster parsing and winner selection. No IO and no
// global state; callers own the pool and exclusion set.

pub mod draw;
pub mod loader;
pub mod record;
pub mod rng;
pub mod value;

pub use draw::{available, select, DrawError, EntryKey, ExclusionScheme, ExclusionSet, Winner, WinnerSelection};
pub use loader::{parse, parse_with, DedupeRule, LoadError, LoaderOptions, Roster, RowPolicy};
pub use record::{Columns, Record};
pub use rng::DrawRng;
pub use value::Value;
