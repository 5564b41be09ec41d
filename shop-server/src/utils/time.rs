//! 时间工具函数 — 业务时区转换
//!
//! 订单编号里的日期部分按香港时区计算，
//! 其余时间戳一律存 UTC Unix millis。

use chrono_tz::Tz;

/// 业务时区：香港
pub const BUSINESS_TZ: Tz = chrono_tz::Asia::Hong_Kong;

/// 当前营业日期字符串 (YYYYMMDD, 业务时区)
pub fn business_date_string() -> String {
    chrono::Utc::now()
        .with_timezone(&BUSINESS_TZ)
        .format("%Y%m%d")
        .to_string()
}
