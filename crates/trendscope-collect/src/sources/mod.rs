//! Content source implementations.

mod hot_trends;
mod intel;
mod jjwxc;
mod qidian;
mod sina;
mod synthetic;
mod youku;

pub use hot_trends::HotTrendsCollector;
pub use intel::MangaIntelCollector;
pub use jjwxc::JjwxcCollector;
pub use qidian::QidianCollector;
pub use sina::SinaCollector;
pub use synthetic::{BilibiliCollector, IqiyiCollector, KuaikanCollector, WeiboCollector};
pub use youku::YoukuCollector;

use crate::collector::Collector;

/// The full production collector set across all five verticals. Hot trends
/// go first so the ranked cross-platform signal lands even if a later
/// scraper stalls out its retry budget.
#[must_use]
pub fn default_collectors() -> Vec<Box<dyn Collector>> {
    vec![
        Box::new(HotTrendsCollector::default()),
        Box::new(QidianCollector::default()),
        Box::new(JjwxcCollector::default()),
        Box::new(YoukuCollector::default()),
        Box::new(IqiyiCollector),
        Box::new(BilibiliCollector),
        Box::new(KuaikanCollector),
        Box::new(MangaIntelCollector),
        Box::new(SinaCollector::default()),
        Box::new(WeiboCollector),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    use trendscope_core::{ContentType, CONTENT_TYPES};

    #[test]
    fn default_set_covers_every_vertical() {
        let collectors = default_collectors();
        let verticals: HashSet<ContentType> =
            collectors.iter().map(|c| c.vertical()).collect();
        for ct in CONTENT_TYPES {
            assert!(verticals.contains(&ct), "missing vertical {ct:?}");
        }
    }

    #[test]
    fn collector_names_are_unique() {
        let collectors = default_collectors();
        let names: HashSet<&'static str> = collectors.iter().map(|c| c.name()).collect();
        assert_eq!(names.len(), collectors.len());
    }
}
