//! Tiers that restrict what the driver may do: emergency braking, critical power,
//! reverse gear, adverse weather, fatigue and distraction.

use super::baseline::baseline;
use super::{battery_report, feature_name};
use crate::policy::decision::{RiskLevel, Ruling};
use crate::policy::intent::CommandIntent;
use crate::policy::limits::{
    estimated_range_km, ALERTNESS_TEMP_C, CRITICAL_BATTERY_THRESHOLD, DISTRACTED_AR_OPACITY,
    FATIGUE_ALERT_THRESHOLD,
};
use crate::policy::tiers::Facts;

const EMERGENCY_PHRASES: &[&str] = &["紧急", "emergency", "sos"];
const REAR_VIEW_PHRASES: &[&str] = &["倒车", "影像", "后", "摄像", "camera", "rear"];
const NEAREST_CHARGER_KM: u32 = 15;

pub fn emergency(facts: &Facts<'_>) -> Ruling {
    let speed = facts.ctx.speed;
    if facts.intent == CommandIntent::Phone && facts.mentions(EMERGENCY_PHRASES) {
        return Ruling::allow("✓ 紧急通话系统已激活，正在拨打紧急联系人。")
            .because(format!(
                "检测到AEB紧急制动事件（制动前车速{}km/h），驾驶员请求紧急通话，这是安全必需功能，立即允许。",
                speed
            ))
            .actions(["激活紧急通话", "双闪已开启", "记录事件数据"])
            .risk(RiskLevel::Critical, "紧急状态：仅允许紧急通话");
    }
    Ruling::deny(format!(
        "⚠️ 紧急制动（AEB）已触发！{}请求已拒绝，所有非安全功能已锁定，请确认车辆及周围环境安全。",
        feature_name(facts.intent)
    ))
    .because(format!(
        "AEB紧急制动触发（车速{}km/h），系统进入安全锁定模式，只允许紧急通话等安全相关操作。",
        speed
    ))
    .actions(["全系统静音", "双闪启动", "AR-HUD显示警告", "记录行车数据"])
    .risk(RiskLevel::Critical, "紧急制动状态，禁止所有非安全功能")
}

pub fn critical_power(facts: &Facts<'_>) -> Option<Ruling> {
    let battery = facts.ctx.battery_percentage?;
    let range = estimated_range_km(battery);
    let ruling = match facts.intent {
        CommandIntent::Navigation => Ruling::allow(format!(
            "⚠️ 电量危急（{}%）！导航已自动规划至最近充电站（{}km），限制高功耗功能。",
            battery, NEAREST_CHARGER_KM
        ))
        .because(format!(
            "电量{}%，低于{}%，续航仅约{}公里。导航至充电站是当前最紧急的任务，自动规划路线，同时限制空调、座椅加热等高功耗功能以保证续航。",
            battery, CRITICAL_BATTERY_THRESHOLD, range
        ))
        .actions(["自动导航至充电站", "关闭空调制冷", "座椅加热停用", "限速80km/h"])
        .risk(RiskLevel::High, "电量危急，必须立即充电"),
        CommandIntent::Climate | CommandIntent::SeatComfort => Ruling::deny(format!(
            "🚫 电量不足{}%，已禁用{}等高功耗功能。导航已规划至最近充电站（{}km），请优先充电。",
            battery,
            feature_name(facts.intent),
            NEAREST_CHARGER_KM
        ))
        .because(format!(
            "电量{}%，处于危急状态（低于{}%），空调制冷和座椅加热/通风属于高功耗非必需功能，为保证续航必须禁用。",
            battery, CRITICAL_BATTERY_THRESHOLD
        ))
        .actions(["拒绝高功耗操作", "维持通风模式", "导航充电站"])
        .risk(RiskLevel::High, "电量不足，禁用高功耗功能"),
        CommandIntent::BatteryQuery => Ruling::allow(format!(
            "⚠️ 当前电量{}%，续航约{}公里。最近充电站{}公里，已为您规划路线。",
            battery, range, NEAREST_CHARGER_KM
        ))
        .because(format!(
            "电量{}%已进入危急区间。电量查询是信息获取功能，完全允许，同时主动提供充电站信息。",
            battery
        ))
        .actions(["查询电量数据", "计算续航", "定位充电站", "语音播报"])
        .risk(RiskLevel::None, "信息查询"),
        _ => return None,
    };
    Some(ruling)
}

pub fn reverse(facts: &Facts<'_>) -> Ruling {
    let speed = facts.ctx.speed;
    if facts.mentions(REAR_VIEW_PHRASES) {
        return Ruling::allow("✓ 倒车辅助系统已全面激活：360°全景影像、倒车雷达、AR轨迹线已显示。")
            .because(format!(
                "R档倒车中（车速{}km/h），驾驶员需要后方视野辅助。系统自动启用全景影像、雷达和AR轨迹，这是倒车必需功能。",
                speed
            ))
            .actions(["全屏360°影像", "倒车雷达激活", "AR轨迹投影", "娱乐系统静音"])
            .risk(RiskLevel::Medium, "倒车操作，需集中注意力");
    }
    match facts.intent {
        CommandIntent::Music
        | CommandIntent::Video
        | CommandIntent::Phone
        | CommandIntent::Message
        | CommandIntent::Navigation => Ruling::deny(format!(
            "⚠️ R档倒车中，已禁用{}等娱乐和通讯功能。倒车影像和雷达已自动激活，请专注周围环境。",
            feature_name(facts.intent)
        ))
        .because(format!(
            "R档倒车（车速{}km/h）是高风险操作，需要驾驶员全神贯注。{}会分散注意力，必须禁用，系统强制显示倒车影像。",
            speed,
            feature_name(facts.intent)
        ))
        .actions(["拒绝娱乐功能", "全屏倒车影像", "雷达报警优先"])
        .risk(RiskLevel::Medium, "倒车状态，禁用分散注意力的功能"),
        CommandIntent::SeatAdjust
        | CommandIntent::Window
        | CommandIntent::Settings
        | CommandIntent::AmbientLight => Ruling::deny(format!(
            "🚫 倒车模式下禁止{}，请停车后操作。",
            feature_name(facts.intent)
        ))
        .because(format!(
            "R档倒车中（车速{}km/h）。调节座椅会导致驾驶姿势变化，车窗操作会影响倒车雷达，设置和灯光需要菜单操作，都会严重影响安全。",
            speed
        ))
        .actions(["拒绝操作", "保持倒车影像显示"])
        .risk(RiskLevel::Medium, "倒车中禁止物理调节"),
        CommandIntent::Climate => {
            let held = match facts.ctx.cabin_temp {
                Some(t) => format!("空调保持当前状态（{}°C）", t),
                None => "空调保持当前状态".to_string(),
            };
            Ruling::deny(format!("⚠️ 倒车模式下，{}，暂不支持调节。", held))
                .because(format!(
                    "R档倒车中（车速{}km/h），空调调节虽然简单但会分散注意力，暂时禁用，保持当前舒适状态。",
                    speed
                ))
                .actions(["维持空调状态", "倒车影像优先显示"])
                .risk(RiskLevel::Low, "保持现状，不允许调节")
        }
        CommandIntent::SeatComfort | CommandIntent::BatteryQuery | CommandIntent::General => {
            baseline(facts)
                .because(format!(
                    "R档倒车中（车速{}km/h），{}无需视线或手动操作，允许执行，倒车影像保持显示。",
                    speed,
                    feature_name(facts.intent)
                ))
                .also("倒车影像保持显示")
                .risk(RiskLevel::Medium, "倒车中，仅允许无需视线的简单功能")
        }
    }
}

pub fn adverse_weather(facts: &Facts<'_>) -> Option<Ruling> {
    let weather = facts.ctx.weather.as_deref()?;
    let ruling = match facts.intent {
        CommandIntent::Video | CommandIntent::Settings | CommandIntent::AmbientLight => {
            Ruling::deny(format!(
                "⚠️ 恶劣天气（{}），能见度低，已禁用{}等非必要功能。请专注驾驶，建议时速<50km/h。",
                weather,
                feature_name(facts.intent)
            ))
            .because(format!(
                "当前天气：{}，能见度降低，路面湿滑。视频/游戏/复杂设置会严重分散注意力，必须禁用。",
                weather
            ))
            .actions(["拒绝操作", "自动除雾", "AR增强车道线", "降低娱乐音量"])
            .risk(RiskLevel::High, "恶劣天气，禁用分心功能")
        }
        CommandIntent::Climate => {
            Ruling::allow("✓ 恶劣天气模式：空调已切换除雾优先，前后风挡自动除雾，确保视野清晰。")
                .because(format!(
                    "{}天气，车窗易起雾。空调除雾是安全必需功能，优先级最高，立即执行。",
                    weather
                ))
                .actions(["自动除雾模式", "前后风挡加热", "空调风量最大"])
                .risk(RiskLevel::Low, "安全必需功能")
        }
        CommandIntent::Navigation => {
            Ruling::allow("✓ 导航已启动，恶劣天气模式下语音引导已增强，AR-HUD显示车道线。")
                .because(format!(
                    "{}天气，能见度低。导航是驾驶必需信息，采用语音为主模式，减少视觉干扰。",
                    weather
                ))
                .actions(["语音导航", "AR车道增强", "HUD简化显示"])
                .risk(RiskLevel::Low, "驾驶必需信息")
        }
        CommandIntent::BatteryQuery => {
            Ruling::allow(format!("✓ {}。", battery_report(facts.ctx.battery_percentage)))
                .because(format!(
                    "{}天气，能见度低。电量查询是驾驶必需信息，采用语音播报，减少视觉干扰。",
                    weather
                ))
                .actions(["语音播报电量", "HUD显示续航"])
                .risk(RiskLevel::Low, "驾驶必需信息")
        }
        _ => return None,
    };
    Some(ruling)
}

pub fn high_fatigue(facts: &Facts<'_>) -> Option<Ruling> {
    let fatigue = facts.ctx.fatigue_level?;
    let ruling = match facts.intent {
        CommandIntent::Music => Ruling::allow(format!(
            "✓ 检测到疲劳驾驶（疲劳度{}%）！已为您播放节奏明快的音乐，空调降至{}°C，建议前方服务区休息。",
            fatigue, ALERTNESS_TEMP_C
        ))
        .because(format!(
            "疲劳度{}%，超过{}%警戒线。播放提神音乐、降低温度可帮助保持清醒，同时主动建议休息，这是安全辅助措施。",
            fatigue, FATIGUE_ALERT_THRESHOLD
        ))
        .actions([
            "播放提神音乐".to_string(),
            format!("降温至{}°C", ALERTNESS_TEMP_C),
            "座椅振动提醒".to_string(),
            "建议前方服务区休息".to_string(),
        ])
        .risk(RiskLevel::Medium, "疲劳驾驶，需提神措施"),
        CommandIntent::Phone | CommandIntent::Message | CommandIntent::Video => {
            let blocked = if facts.intent == CommandIntent::Video {
                "视频"
            } else {
                "通讯"
            };
            Ruling::deny(format!(
                "⚠️ 检测到疲劳驾驶（疲劳度{}%）！已禁用{}功能，强烈建议前方服务区休息15分钟。",
                fatigue, blocked
            ))
            .because(format!(
                "疲劳度{}%，超过{}%警戒线，反应迟钝。视频/消息/拨打电话会进一步分散注意力，极度危险，必须拒绝。",
                fatigue, FATIGUE_ALERT_THRESHOLD
            ))
            .actions(["拒绝操作", "播放提神音乐", "降温", "导航服务区", "座椅振动警告"])
            .risk(RiskLevel::High, "疲劳驾驶，禁用分心功能")
        }
        CommandIntent::Climate => Ruling::allow(format!(
            "✓ 检测到疲劳！空调已自动降至{}°C，增强通风，帮助您保持清醒。前方12公里有服务区，建议休息。",
            ALERTNESS_TEMP_C
        ))
        .because(format!(
            "疲劳度{}%，超过{}%警戒线。降温是有效的提神措施，主动执行，同时引导驾驶员休息。",
            fatigue, FATIGUE_ALERT_THRESHOLD
        ))
        .actions([
            format!("降温至{}°C", ALERTNESS_TEMP_C),
            "通风模式".to_string(),
            "播放提神音乐".to_string(),
            "导航服务区".to_string(),
        ])
        .risk(RiskLevel::Low, "提神措施"),
        _ => return None,
    };
    Some(ruling)
}

pub fn high_distraction(facts: &Facts<'_>) -> Ruling {
    let distraction = facts.ctx.distraction_level;
    let attention = 100.0 - distraction;
    let speed = facts.ctx.speed;
    match facts.intent {
        CommandIntent::Navigation | CommandIntent::BatteryQuery => {
            let mode = if facts.intent == CommandIntent::Navigation {
                "导航已切换纯语音模式".to_string()
            } else {
                format!("{}，已语音播报", battery_report(facts.ctx.battery_percentage))
            };
            Ruling::allow(format!(
                "⚠️ 检测到分心（注意力{}%）！{}，请立即专注驾驶！",
                attention, mode
            ))
            .because(format!(
                "分心等级{}%，车速{}km/h，存在严重安全隐患。{}是必需功能，但必须切换为纯语音模式，禁止触摸操作。",
                distraction,
                speed,
                feature_name(facts.intent)
            ))
            .actions([
                "强制语音模式".to_string(),
                format!("AR透明度降至{}", DISTRACTED_AR_OPACITY),
                "触发专注提醒".to_string(),
            ])
            .risk(RiskLevel::High, "驾驶员分心，仅语音模式")
            .overlay_opacity(DISTRACTED_AR_OPACITY)
        }
        _ => Ruling::deny(format!(
            "🚫 检测到严重分心（注意力{}%）！{}等非紧急功能已锁定，请立即专注前方道路！",
            attention,
            feature_name(facts.intent)
        ))
        .because(format!(
            "检测到驾驶员严重分心（分心度{}%），车速{}km/h，为保障行车安全，系统拒绝所有非必要功能。",
            distraction, speed
        ))
        .actions([
            "请求拦截".to_string(),
            format!("AR透明度锁定{}", DISTRACTED_AR_OPACITY),
            "声音警报".to_string(),
            "座椅振动".to_string(),
        ])
        .risk(RiskLevel::Critical, "严重分心且行驶中")
        .overlay_opacity(DISTRACTED_AR_OPACITY),
    }
}
