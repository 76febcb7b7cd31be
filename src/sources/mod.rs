pub mod auction;
pub mod cafe;
pub mod traits;
pub mod types;

pub use auction::AuctionNormalizer;
pub use cafe::CafeNormalizer;
pub use traits::SourceNormalizer;
pub use types::{IngestReport, SkippedRecord};
