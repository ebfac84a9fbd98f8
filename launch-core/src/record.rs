//! One launch attempt and the policy that ranks attempts against each other.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{HOT_HEAT, KM_TO_M, RECORD_NODE};
use crate::node::Node;

/// Control inputs the host actually flew for one attempt.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct AttemptInputs {
    pub turn_angle: f64,
    pub start_speed: f64,
    /// Target apoapsis, kilometers.
    pub destination_height: f64,
    pub sensitivity: f64,
    pub roll: f64,
    pub pressure_cutoff: f64,
}

/// What the host measured once the attempt finished.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct AttemptResults {
    pub total_loss: f64,
    pub max_heat: f64,
    /// Achieved apoapsis, meters.
    pub apoapsis: f64,
    pub apoapsis_time_start: f64,
    pub apoapsis_time_finish: f64,
}

/// Recommended control inputs for the next attempt.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LaunchSettings {
    pub turn_angle: f64,
    pub start_speed: f64,
}

impl LaunchSettings {
    pub fn aggressiveness(&self) -> f64 {
        self.turn_angle / self.start_speed
    }

    /// Halfway between the best record and a record it must not overshoot.
    pub(crate) fn between(best: &LaunchRecord, limit: &LaunchRecord) -> Self {
        Self {
            turn_angle: (best.turn_angle + limit.turn_angle) / 2.0,
            start_speed: (best.start_speed + limit.start_speed) / 2.0,
        }
    }
}

impl From<&LaunchRecord> for LaunchSettings {
    fn from(record: &LaunchRecord) -> Self {
        Self {
            turn_angle: record.turn_angle,
            start_speed: record.start_speed,
        }
    }
}

impl fmt::Display for LaunchSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}/{:.2}", self.turn_angle, self.start_speed)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct LaunchRecord {
    pub start_speed: f64,
    pub apoapsis_time_start: f64,
    pub apoapsis_time_finish: f64,
    pub turn_angle: f64,
    pub sensitivity: f64,
    pub roll: f64,
    /// Target apoapsis, kilometers.
    pub destination_height: f64,
    pub pressure_cutoff: f64,
    pub total_loss: f64,
    pub max_heat: f64,
    pub launch_success: bool,
}

// Persisted key names. These match history files written by earlier plugin builds.
const KEY_START_SPEED: &str = "StartSpeed";
const KEY_AP_TIME_START: &str = "APTimeStart";
const KEY_AP_TIME_FINISH: &str = "APTimeFinish";
const KEY_TURN_ANGLE: &str = "TurnAngle";
const KEY_SENSITIVITY: &str = "Sensitivity";
const KEY_ROLL: &str = "Roll";
const KEY_DESTINATION_HEIGHT: &str = "DestinationHeight";
const KEY_PRESSURE_CUTOFF: &str = "PressureCutoff";
const KEY_TOTAL_LOSS: &str = "TotalLoss";
const KEY_MAX_HEAT: &str = "MaxHeat";
const KEY_LAUNCH_SUCCESS: &str = "LaunchSuccess";

impl LaunchRecord {
    pub fn is_hot(&self) -> bool {
        self.max_heat > HOT_HEAT
    }

    /// Angle per unit of speed; higher is an earlier, steeper pitch-over.
    pub fn aggressiveness(&self) -> f64 {
        self.turn_angle / self.start_speed
    }

    pub fn matches_inputs(&self, inputs: &AttemptInputs) -> bool {
        self.turn_angle == inputs.turn_angle
            && self.start_speed == inputs.start_speed
            && self.destination_height == inputs.destination_height
    }

    /// True when this exact attempt has already been recorded.
    pub fn matches_attempt(&self, inputs: &AttemptInputs, results: &AttemptResults) -> bool {
        self.matches_inputs(inputs)
            && self.max_heat == results.max_heat
            && self.total_loss == results.total_loss
    }

    pub(crate) fn apply_attempt(&mut self, inputs: &AttemptInputs, results: &AttemptResults) {
        self.turn_angle = inputs.turn_angle;
        self.start_speed = inputs.start_speed;
        self.destination_height = inputs.destination_height;
        self.sensitivity = inputs.sensitivity;
        self.roll = inputs.roll;
        self.pressure_cutoff = inputs.pressure_cutoff;

        self.total_loss = results.total_loss;
        self.max_heat = results.max_heat;
        self.apoapsis_time_start = results.apoapsis_time_start;
        self.apoapsis_time_finish = results.apoapsis_time_finish;
        self.launch_success = results.apoapsis >= self.destination_height * KM_TO_M;
    }

    pub fn to_node(&self) -> Node {
        let mut node = Node::new(RECORD_NODE);
        node.set_f64(KEY_START_SPEED, self.start_speed);
        node.set_f64(KEY_AP_TIME_START, self.apoapsis_time_start);
        node.set_f64(KEY_AP_TIME_FINISH, self.apoapsis_time_finish);
        node.set_f64(KEY_TURN_ANGLE, self.turn_angle);
        node.set_f64(KEY_SENSITIVITY, self.sensitivity);
        node.set_f64(KEY_ROLL, self.roll);
        node.set_f64(KEY_DESTINATION_HEIGHT, self.destination_height);
        node.set_f64(KEY_PRESSURE_CUTOFF, self.pressure_cutoff);
        node.set_f64(KEY_TOTAL_LOSS, self.total_loss);
        node.set_f64(KEY_MAX_HEAT, self.max_heat);
        node.set_bool(KEY_LAUNCH_SUCCESS, self.launch_success);
        node
    }

    /// Missing or unparsable values fall back to zero / false.
    pub fn from_node(node: &Node) -> Self {
        Self {
            start_speed: node.f64_or_zero(KEY_START_SPEED),
            apoapsis_time_start: node.f64_or_zero(KEY_AP_TIME_START),
            apoapsis_time_finish: node.f64_or_zero(KEY_AP_TIME_FINISH),
            turn_angle: node.f64_or_zero(KEY_TURN_ANGLE),
            sensitivity: node.f64_or_zero(KEY_SENSITIVITY),
            roll: node.f64_or_zero(KEY_ROLL),
            destination_height: node.f64_or_zero(KEY_DESTINATION_HEIGHT),
            pressure_cutoff: node.f64_or_zero(KEY_PRESSURE_CUTOFF),
            total_loss: node.f64_or_zero(KEY_TOTAL_LOSS),
            max_heat: node.f64_or_zero(KEY_MAX_HEAT),
            launch_success: node.bool_or_false(KEY_LAUNCH_SUCCESS),
        }
    }
}

impl fmt::Display for LaunchRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}/{:.2}", self.turn_angle, self.start_speed)
    }
}

/// Ranks `a` against `b`: `Less` means `a` is the better attempt.
///
/// The rules are checked in order and the first match wins, so this is a
/// policy rather than a metric. It is not guaranteed to be antisymmetric:
/// rules 3 and 4 only look at `b`'s weakness.
pub fn compare_quality(a: &LaunchRecord, b: &LaunchRecord) -> Ordering {
    let (a_hot, b_hot) = (a.is_hot(), b.is_hot());
    if a_hot && !b_hot {
        return Ordering::Greater;
    }
    if b_hot && !a_hot {
        return Ordering::Less;
    }
    // Both hot here; the milder of two overheated runs wins.
    if b_hot && b.max_heat > a.max_heat {
        return Ordering::Less;
    }
    if !b.launch_success && a.launch_success {
        return Ordering::Less;
    }
    if a.total_loss == b.total_loss {
        Ordering::Equal
    } else if b.total_loss > a.total_loss {
        Ordering::Less
    } else {
        Ordering::Greater
    }
}

pub fn more_aggressive(a: &LaunchRecord, b: &LaunchRecord) -> bool {
    a.aggressiveness() > b.aggressiveness()
}

/// Stable insertion sort, best attempt first.
///
/// `compare_quality` is not a total order, which `slice::sort_by` may reject
/// with a panic; this never inspects the comparator's consistency.
pub(crate) fn rank_by_quality(records: &mut [LaunchRecord]) {
    for i in 1..records.len() {
        let mut j = i;
        while j > 0 && compare_quality(&records[j], &records[j - 1]) == Ordering::Less {
            records.swap(j, j - 1);
            j -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(turn_angle: f64, start_speed: f64, total_loss: f64, max_heat: f64) -> LaunchRecord {
        LaunchRecord {
            turn_angle,
            start_speed,
            total_loss,
            max_heat,
            destination_height: 80.0,
            launch_success: true,
            ..LaunchRecord::default()
        }
    }

    #[test]
    fn hot_threshold_is_exclusive() {
        assert!(!record(10.0, 100.0, 0.0, 0.95).is_hot());
        assert!(record(10.0, 100.0, 0.0, 0.951).is_hot());
    }

    #[test]
    fn overheating_always_loses() {
        let cool = record(10.0, 100.0, 900.0, 0.5);
        let hot = record(12.0, 90.0, 100.0, 0.99);
        assert_eq!(compare_quality(&hot, &cool), Ordering::Greater);
        assert_eq!(compare_quality(&cool, &hot), Ordering::Less);
    }

    #[test]
    fn milder_of_two_hot_runs_wins() {
        let mild = record(10.0, 100.0, 900.0, 0.97);
        let severe = record(12.0, 90.0, 100.0, 1.10);
        assert_eq!(compare_quality(&mild, &severe), Ordering::Less);
    }

    #[test]
    fn success_beats_failure_before_loss() {
        let success = record(10.0, 100.0, 900.0, 0.5);
        let mut failure = record(12.0, 90.0, 100.0, 0.5);
        failure.launch_success = false;
        assert_eq!(compare_quality(&success, &failure), Ordering::Less);
    }

    #[test]
    fn loss_decides_between_comparable_runs() {
        let low = record(10.0, 100.0, 400.0, 0.5);
        let high = record(12.0, 90.0, 500.0, 0.5);
        assert_eq!(compare_quality(&low, &high), Ordering::Less);
        assert_eq!(compare_quality(&high, &low), Ordering::Greater);
    }

    #[test]
    fn equal_losses_rank_equal_both_ways() {
        let a = record(10.0, 100.0, 400.0, 0.5);
        let b = record(12.0, 90.0, 400.0, 0.6);
        assert_eq!(compare_quality(&a, &b), Ordering::Equal);
        assert_eq!(compare_quality(&b, &a), Ordering::Equal);
    }

    #[test]
    fn aggressiveness_ratio_orders_turns() {
        let steep = record(15.0, 100.0, 0.0, 0.5);
        let shallow = record(10.0, 100.0, 0.0, 0.5);
        assert!(more_aggressive(&steep, &shallow));
        assert!(!more_aggressive(&shallow, &steep));
        assert!(!more_aggressive(&steep, &steep));
    }

    #[test]
    fn ranking_is_stable_for_equal_records() {
        let mut records = vec![
            record(1.0, 100.0, 500.0, 0.5),
            record(2.0, 100.0, 300.0, 0.5),
            record(3.0, 100.0, 500.0, 0.5),
            record(4.0, 100.0, 200.0, 0.99),
        ];
        rank_by_quality(&mut records);
        let angles: Vec<f64> = records.iter().map(|r| r.turn_angle).collect();
        assert_eq!(angles, vec![2.0, 1.0, 3.0, 4.0]);
    }

    #[test]
    fn recording_an_attempt_judges_success_in_meters() {
        let inputs = AttemptInputs {
            turn_angle: 10.0,
            start_speed: 100.0,
            destination_height: 80.0,
            ..AttemptInputs::default()
        };
        let mut rec = LaunchRecord::default();
        rec.apply_attempt(
            &inputs,
            &AttemptResults {
                apoapsis: 80_000.0,
                ..AttemptResults::default()
            },
        );
        assert!(rec.launch_success);

        rec.apply_attempt(
            &inputs,
            &AttemptResults {
                apoapsis: 79_999.0,
                ..AttemptResults::default()
            },
        );
        assert!(!rec.launch_success);
    }

    #[test]
    fn node_mapping_defaults_missing_fields() {
        let mut node = Node::new(RECORD_NODE);
        node.set(KEY_TURN_ANGLE, "12.5");
        node.set(KEY_MAX_HEAT, "not-a-number");
        node.set("SomethingNew", "1");
        let rec = LaunchRecord::from_node(&node);
        assert_eq!(rec.turn_angle, 12.5);
        assert_eq!(rec.max_heat, 0.0);
        assert_eq!(rec.start_speed, 0.0);
        assert!(!rec.launch_success);
    }
}
