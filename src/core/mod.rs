// Core algorithm exports
pub mod exclusion;
pub mod feed;
pub mod pairing;

pub use exclusion::ExclusionSet;
pub use feed::{absorb_batch, batch_size, clamp_limit, is_feed_eligible, BatchOutcome};
pub use pairing::{block_key, like_key, match_key, sorted_pair, valid_pair};
