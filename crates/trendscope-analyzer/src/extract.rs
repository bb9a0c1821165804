//! Keyword-based line extraction over free-form model output.
//!
//! The models answer in prose, not JSON. Rather than fighting them for a
//! structured reply, the analyzer mines the text: lines mentioning the
//! right signal words become insights, predictions or risk flags, and the
//! balance of certainty words versus hedge words becomes the confidence.

const INSIGHT_KEYWORDS: &[&str] = &["增长", "下降", "热门", "趋势", "变化"];
const PREDICTION_KEYWORDS: &[&str] = &["预测", "预计", "将", "可能", "有望"];
const RISK_KEYWORDS: &[&str] = &["风险", "注意", "警惕", "挑战", "问题"];

const POSITIVE_KEYWORDS: &[&str] = &["明确", "显著", "明显", "确定", "强烈"];
const NEGATIVE_KEYWORDS: &[&str] = &["可能", "也许", "或许", "不确定", "模糊"];

const MAX_INSIGHTS: usize = 5;
const MAX_PREDICTIONS: usize = 8;
const MAX_RISKS: usize = 3;

/// Default confidence when the text contains no certainty markers at all.
const NEUTRAL_CONFIDENCE: f64 = 0.7;

/// Lines describing movement or popularity, capped at five.
#[must_use]
pub fn extract_insights(text: &str) -> Vec<String> {
    matching_lines(text, INSIGHT_KEYWORDS, MAX_INSIGHTS)
}

/// Forward-looking lines, capped at eight.
#[must_use]
pub fn extract_predictions(text: &str) -> Vec<String> {
    matching_lines(text, PREDICTION_KEYWORDS, MAX_PREDICTIONS)
}

/// Warning lines, capped at three.
#[must_use]
pub fn extract_risks(text: &str) -> Vec<String> {
    matching_lines(text, RISK_KEYWORDS, MAX_RISKS)
}

/// Certainty ratio in `[0, 1]`, rounded to two decimals.
///
/// Counts occurrences of assertive words against hedge words; a text with
/// neither gets the neutral default of 0.7.
#[must_use]
pub fn confidence(text: &str) -> f64 {
    let positive: usize = POSITIVE_KEYWORDS
        .iter()
        .map(|k| text.matches(k).count())
        .sum();
    let negative: usize = NEGATIVE_KEYWORDS
        .iter()
        .map(|k| text.matches(k).count())
        .sum();

    let total = positive + negative;
    if total == 0 {
        return NEUTRAL_CONFIDENCE;
    }

    #[allow(clippy::cast_precision_loss)]
    let ratio = (positive as f64 / total as f64).min(1.0);
    (ratio * 100.0).round() / 100.0
}

fn matching_lines(text: &str, keywords: &[&str], cap: usize) -> Vec<String> {
    text.lines()
        .filter(|line| keywords.iter().any(|k| line.contains(k)))
        .map(|line| line.trim().to_string())
        .take(cap)
        .collect()
}
