//! Per-tier rule handlers. Every handler interpolates the triggering reading
//! (speed, gear, battery, weather, fatigue, distraction) into its reasoning.

pub mod baseline;
pub mod driving;
pub mod restricted;
pub mod stationary;

use super::intent::CommandIntent;
use super::limits::estimated_range_km;

/// Short Chinese name of the feature an intent addresses, for response text.
pub(crate) fn feature_name(intent: CommandIntent) -> &'static str {
    match intent {
        CommandIntent::Navigation => "导航",
        CommandIntent::Music => "音乐",
        CommandIntent::Video => "视频/游戏",
        CommandIntent::Phone => "电话",
        CommandIntent::Message => "消息查看",
        CommandIntent::SeatAdjust => "座椅调节",
        CommandIntent::SeatComfort => "座椅加热/通风",
        CommandIntent::Climate => "空调",
        CommandIntent::BatteryQuery => "电量查询",
        CommandIntent::Window => "车窗操作",
        CommandIntent::Settings => "系统设置",
        CommandIntent::AmbientLight => "氛围灯调节",
        CommandIntent::General => "该指令",
    }
}

/// "当前电量X%，续航约Y公里" or an explicit "unavailable" when the reading is unknown.
pub(crate) fn battery_report(battery_percentage: Option<f64>) -> String {
    match battery_percentage {
        Some(b) => format!("当前电量{}%，续航约{}公里", b, estimated_range_km(b)),
        None => "电量数据暂不可用".to_string(),
    }
}
