// Production source fetchers, one per platform.
//
// Each adapter wraps a platform client, converts its native items into
// CandidateRecords, and skips items that cannot be converted rather than
// failing the whole call.

mod instagram;
mod tiktok;
mod youtube;

pub use instagram::InstagramSource;
pub use tiktok::TikTokSource;
pub use youtube::YouTubeSource;
