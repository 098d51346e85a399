use crate::cpd::period::Period;
use crate::domain::model::{Activity, AppliedActivity};

/// 規則引擎輸出的採計點數總和
pub fn total_applied(applied: &[AppliedActivity]) -> f64 {
    applied.iter().map(|a| a.applied_points).sum()
}

/// 舊版計算路徑：直接加總原始點數，只做週期過濾不套用上限。
/// 給定週期時，缺少年份的活動視為不在週期內。
pub fn total_points(activities: &[Activity], period: Option<Period>) -> f64 {
    activities
        .iter()
        .filter(|a| a.points.is_finite())
        .filter(|a| match period {
            None => true,
            Some(p) => a.effective_year().map_or(false, |year| p.contains(year)),
        })
        .map(|a| a.points)
        .sum()
}

/// 距離達標還缺多少點；要求 <= 0 時視為無要求
pub fn calc_missing(total: f64, required: f64) -> f64 {
    if required <= 0.0 {
        return 0.0;
    }
    (required - total).max(0.0)
}

/// 完成百分比，夾在 0..=100 之間
pub fn calc_progress(total: f64, required: f64) -> f64 {
    if required <= 0.0 || total <= 0.0 {
        return 0.0;
    }
    (total / required * 100.0).clamp(0.0, 100.0)
}
