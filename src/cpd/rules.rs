use crate::cpd::period::Period;
use crate::domain::model::{Activity, AppliedActivity, CapSet};
use std::collections::HashMap;

/// 規則引擎：依申報週期與類別上限計算每筆活動的實際採計點數。
///
/// 引擎永不失敗，壞資料一律降級為 0 點並附上警告字串。
/// 上限額度依輸入順序消耗，同一輸入順序保證得到同一結果。
pub fn apply_rules(
    activities: &[Activity],
    period: Option<Period>,
    caps: &CapSet,
) -> Vec<AppliedActivity> {
    // 每個 (類別, 年份) 的剩餘額度，僅在這次呼叫內累計
    let mut remaining: HashMap<(String, i32), f64> = HashMap::new();

    activities
        .iter()
        .map(|activity| {
            let (points, mut warning) = if activity.points.is_finite() {
                (activity.points, None)
            } else {
                (
                    0.0,
                    Some("invalid points value, counted as 0".to_string()),
                )
            };

            let year = match activity.effective_year() {
                Some(year) => year,
                None => {
                    return AppliedActivity {
                        activity: activity.clone(),
                        in_period: false,
                        applied_points: 0.0,
                        warning: Some("invalid year, activity not counted".to_string()),
                    };
                }
            };

            let in_period = period.map_or(true, |p| p.contains(year));
            if !in_period {
                return AppliedActivity {
                    activity: activity.clone(),
                    in_period: false,
                    applied_points: 0.0,
                    warning: Some(format!(
                        "activity year {} is outside the reporting period, 0 of {} points counted",
                        year, points
                    )),
                };
            }

            let applied_points = match caps.get(&activity.category) {
                Some(&cap) => {
                    let left = remaining
                        .entry((activity.category.clone(), year))
                        .or_insert(cap);
                    let applied = points.min(*left);
                    if points > *left {
                        let excess = points - *left;
                        warning = Some(format!(
                            "annual cap of {} for category '{}' reached in {}: {} of {} points not counted",
                            cap, activity.category, year, excess, points
                        ));
                    }
                    *left -= applied;
                    applied
                }
                None => points,
            };

            AppliedActivity {
                activity: activity.clone(),
                in_period: true,
                applied_points,
                warning,
            }
        })
        .collect()
}
