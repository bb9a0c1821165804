//! Content collection: portal scrapers, synthetic generators and the
//! RSS industry-intel source, behind one [`Collector`] trait.

mod collector;
mod error;
mod fetch;
mod html;
mod sources;

pub use collector::{collect_all, CollectContext, Collector};
pub use error::CollectError;
pub use fetch::Fetcher;
pub use html::{extract_anchors, strip_tags, Anchor};
pub use sources::{
    default_collectors, BilibiliCollector, HotTrendsCollector, IqiyiCollector, JjwxcCollector,
    KuaikanCollector, MangaIntelCollector, QidianCollector, SinaCollector, WeiboCollector,
    YoukuCollector,
};
