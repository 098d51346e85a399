//! 純計算核心：週期正規化、規則引擎、加總與狀態判定。
//! 這裡沒有任何 I/O，也永遠不會回傳錯誤。

pub mod aggregate;
pub mod period;
pub mod rules;
pub mod status;

pub use aggregate::{calc_missing, calc_progress, total_applied, total_points};
pub use period::Period;
pub use rules::apply_rules;
pub use status::{classify_by_missing, classify_by_progress, ComplianceStatus, StatusPolicy};
