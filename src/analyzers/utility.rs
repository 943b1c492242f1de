use std::cmp::Ordering;
use std::collections::BTreeMap;

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

pub const WEEKDAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Divides, returning 0.0 when `total` is zero.
pub fn safe_div(part: f64, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part / total as f64
    }
}

/// Orders grouped totals by value, largest first. Equal values keep the
/// ascending key order of the map.
pub fn rank_descending<V>(totals: BTreeMap<String, V>) -> Vec<(String, V)>
where
    V: PartialOrd,
{
    let mut ranked: Vec<(String, V)> = totals.into_iter().collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    ranked
}
