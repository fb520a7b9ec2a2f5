use chrono::{DateTime, Utc};
use indexmap::IndexSet;

use crate::models::{MatchInput, MatchScore};

/// 文本归一化 -> token 集合 (保序去重)
///
/// 小写化后, 非 [a-z0-9] 且非空白的字符一律替换为空格, 再按空白切分,
/// 丢弃长度 < 2 的 token。
fn tokens(s: &str) -> IndexSet<String> {
    s.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect::<String>()
        .split_whitespace()
        .filter(|t| t.len() >= 2)
        .map(|t| t.to_string())
        .collect()
}

/// 两个时刻的天数差: 绝对毫秒差截断成整天, 不对齐日历日边界。
///
/// 相差 23 小时 (跨日历日) 记 0 天, 相差 25 小时记 1 天 —— 这是既定口径,
/// 改成日历日对齐会悄悄改变评分结果。
fn days_between(a: DateTime<Utc>, b: DateTime<Utc>) -> i64 {
    (a - b).num_days().abs()
}

/// 挂失单 vs 拾得物品评分 (确定性 + 可解释)
///
/// 四路独立加分信号, 权重为标定常量, 最终夹到 [0, 100]:
/// 类别 +40 / 地点 +25 / 日期邻近 +15|+10|+5 / 关键词重合最多 +20。
/// reasons 固定按 类别 -> 地点 -> 日期 -> 关键词 顺序追加, 不按分值重排。
pub fn score_lost_vs_found(lost: &MatchInput, found: &MatchInput) -> MatchScore {
    let mut score: i64 = 0;
    let mut reasons: Vec<String> = Vec::new();

    // 1. 类别相同 (强信号)
    if lost.category_id == found.category_id {
        score += 40;
        reasons.push("Same category".to_string());
    }

    // 2. 地点相同 (中信号)
    if lost.location_id == found.location_id {
        score += 25;
        reasons.push("Same location".to_string());
    }

    // 3. 日期邻近 (弱-中信号, 三档互斥)
    let d = days_between(lost.date, found.date);
    if d <= 1 {
        score += 15;
        reasons.push("Date is within 1 day".to_string());
    } else if d <= 3 {
        score += 10;
        reasons.push("Date is within 3 days".to_string());
    } else if d <= 7 {
        score += 5;
        reasons.push("Date is within 7 days".to_string());
    }

    // 4. 关键词重合 (中信号, 封顶 20 分)
    let lost_text = format!("{} {}", lost.item_name, lost.description.as_deref().unwrap_or(""));
    let found_text = format!("{} {}", found.item_name, found.description.as_deref().unwrap_or(""));

    let lost_tokens = tokens(&lost_text);
    let found_tokens = tokens(&found_text);

    let overlap = lost_tokens.intersection(&found_tokens).count();

    // 重合度按挂失侧 token 数归一化; 挂失侧为空则整路不参与 (避免除零)
    if !lost_tokens.is_empty() {
        let ratio = overlap as f64 / lost_tokens.len() as f64;
        let kw_score = (ratio * 28.0).min(20.0).round() as i64;
        if kw_score > 0 {
            score += kw_score;
        }
    }

    // 即使取整后 0 分, 只要有重合词就给出原因
    if overlap >= 1 {
        reasons.push(format!("{} shared keyword(s)", overlap));
    }

    MatchScore {
        score: score.clamp(0, 100),
        reasons,
    }
}
