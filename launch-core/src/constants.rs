/// Peak heat fraction above which an attempt counts as overheated.
pub const HOT_HEAT: f64 = 0.95;
/// `best_settings` refuses to replay a top record at or above this heat.
pub const CRITICAL_HEAT: f64 = 1.0;
/// Below this heat a lone record leaves room for a more aggressive turn.
pub const HEAT_MARGIN: f64 = 0.90;

pub const ADJUST_MIN: f64 = 0.80;
pub const ADJUST_MAX: f64 = 0.95;

// Back-off applied to a lone overheated record.
pub const HOT_ANGLE_FACTOR: f64 = 0.95;
pub const HOT_SPEED_FACTOR: f64 = 1.05;

/// Extrapolated ratios within 1% of a guard record count as reaching it.
pub const GUARD_TOLERANCE: f64 = 0.99;

pub const KM_TO_M: f64 = 1000.0;

pub const HISTORY_FILE_PREFIX: &str = "gt_launchdb_";
pub const HISTORY_FILE_EXTENSION: &str = "cfg";

pub const ROOT_LIST_NODE: &str = "DB";
pub const RECORD_NODE: &str = "item";
