//! Region resolution: turn free-form user text into a Taiwanese region name.
//!
//! Strategies are tried in configured order (lexicon first, then the completion service by
//! default); the first one that yields a region wins.

mod ai;
mod lexicon;
mod resolver;

pub use ai::{is_plausible_region, AiRegionExtractor};
pub use lexicon::{match_region, LexiconStrategy, REGIONS};
pub use resolver::{RegionResolver, RegionStrategy, Resolution};
