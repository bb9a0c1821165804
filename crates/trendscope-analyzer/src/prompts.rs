//! Prompt builders for the daily trend analysis and next-day prediction.
//!
//! The model sees aggregate numbers, never raw page content: per-vertical
//! counts plus the category distribution for today, and the seven-day count
//! history for the prediction. Prompts are Chinese because the corpus is.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use trendscope_core::{ContentType, DailyStats, CONTENT_TYPES};

/// A (vertical, category) pair feeding the trend prompt. The analyzer only
/// needs the distribution, not the full items.
#[derive(Debug, Clone)]
pub struct CategorizedItem {
    pub content_type: ContentType,
    pub category: String,
}

/// Builds the daily trend-analysis prompt.
#[must_use]
pub fn trend_prompt(items: &[CategorizedItem]) -> String {
    let mut type_counts: BTreeMap<&str, usize> = BTreeMap::new();
    let mut distribution: BTreeMap<&str, BTreeMap<String, usize>> = BTreeMap::new();

    for item in items {
        let key = item.content_type.as_str();
        *type_counts.entry(key).or_insert(0) += 1;
        *distribution
            .entry(key)
            .or_default()
            .entry(item.category.clone())
            .or_insert(0) += 1;
    }

    let count_for = |ct: ContentType| type_counts.get(ct.as_str()).copied().unwrap_or(0);
    let distribution_json =
        serde_json::to_string_pretty(&distribution).unwrap_or_else(|_| "{}".to_string());

    format!(
        "请分析以下内容行业的今日数据趋势：\n\
         \n\
         总体统计：\n\
         - 小说类内容: {novel} 条\n\
         - 短剧类内容: {drama} 条\n\
         - 漫剧类内容: {comic} 条\n\
         - 新闻类内容: {news} 条\n\
         - 娱乐类内容: {entertainment} 条\n\
         \n\
         分类详情：\n\
         {distribution_json}\n\
         \n\
         请从以下几个维度进行专业分析：\n\
         1. 各类型内容的热度变化趋势\n\
         2. 热门分类的变化情况\n\
         3. 整体市场活跃度评估\n\
         4. 用户关注度转移趋势\n\
         5. 潜在的新兴热门方向\n\
         \n\
         请用中文回答，要求分析深入、专业，并给出具体的数据支撑。",
        novel = count_for(ContentType::Novel),
        drama = count_for(ContentType::Drama),
        comic = count_for(ContentType::Comic),
        news = count_for(ContentType::News),
        entertainment = count_for(ContentType::Entertainment),
    )
}

/// Builds the next-day prediction prompt from the recent count history and
/// today's stats.
#[must_use]
pub fn prediction_prompt(history: &[(NaiveDate, DailyStats)], today: &DailyStats) -> String {
    let mut history_map: BTreeMap<String, serde_json::Value> = BTreeMap::new();
    for (date, stats) in history {
        history_map.insert(date.to_string(), stats_json(stats));
    }

    let history_json =
        serde_json::to_string_pretty(&history_map).unwrap_or_else(|_| "{}".to_string());
    let today_json = serde_json::to_string_pretty(&stats_json(today))
        .unwrap_or_else(|_| "{}".to_string());

    format!(
        "基于以下历史数据和今日数据，请预测明日的内容行业趋势：\n\
         \n\
         历史数据趋势：\n\
         {history_json}\n\
         \n\
         今日数据：\n\
         {today_json}\n\
         \n\
         请从以下角度进行预测分析：\n\
         1. 明日各类型内容热度预测\n\
         2. 可能出现的热门分类\n\
         3. 用户兴趣转移预测\n\
         4. 市场整体发展趋势\n\
         5. 投资和创作建议\n\
         \n\
         要求：\n\
         - 预测要有合理的逻辑依据\n\
         - 给出具体的数值预测（如增长百分比）\n\
         - 提供风险提醒和注意事项\n\
         - 用中文回答，语言专业但易懂"
    )
}

fn stats_json(stats: &DailyStats) -> serde_json::Value {
    let mut map = serde_json::Map::new();
    for ct in CONTENT_TYPES {
        map.insert(
            ct.as_str().to_string(),
            serde_json::Value::from(stats.count_for(ct)),
        );
    }
    map.insert("total".to_string(), serde_json::Value::from(stats.total));
    serde_json::Value::Object(map)
}
