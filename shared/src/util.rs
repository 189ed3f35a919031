/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

const DAY_MILLIS: i64 = 86_400_000;

/// UTC midnight of the day containing `millis`
pub fn day_start_millis(millis: i64) -> i64 {
    millis.div_euclid(DAY_MILLIS) * DAY_MILLIS
}

/// Whole minutes elapsed between two millisecond timestamps (never negative)
pub fn elapsed_minutes(from: i64, to: i64) -> i64 {
    (to - from).max(0) / 60_000
}
