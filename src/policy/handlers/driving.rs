use super::baseline::baseline;
use super::feature_name;
use crate::policy::decision::{RiskLevel, Ruling};
use crate::policy::intent::CommandIntent;
use crate::policy::limits::{
    AMBIENT_LIGHT_SPEED_LIMIT, SIMPLIFIED_NAVIGATION_SPEED, VOICE_CONTROL_SPEED,
    WINDOW_SPEED_LIMIT,
};
use crate::policy::tiers::Facts;

/// Forward driving with no other restriction active.
pub fn driving(facts: &Facts<'_>) -> Ruling {
    let speed = facts.ctx.speed;
    match facts.intent {
        CommandIntent::Video | CommandIntent::Settings | CommandIntent::Message => {
            Ruling::deny(format!(
                "🚫 行驶中禁止{}，这会严重分散注意力。请停车后再使用。",
                feature_name(facts.intent)
            ))
            .because(format!(
                "驾驶模式：车辆以{}km/h行驶中，{}需要视线离开路面，属于行车禁用功能。",
                speed,
                feature_name(facts.intent)
            ))
            .actions(["拒绝请求", "语音提醒专注驾驶"])
            .risk(RiskLevel::High, "行驶中视觉分心")
        }
        CommandIntent::SeatAdjust => Ruling::deny("🚫 行驶中禁止调节座椅位置，请停车后再调整。")
            .because(format!(
                "车辆以{}km/h行驶中，调节座椅会改变驾驶姿势，可能导致失去车辆控制。",
                speed
            ))
            .actions(["拒绝座椅调节", "保持当前位置"])
            .risk(RiskLevel::Critical, "驾驶姿势改变"),
        CommandIntent::Navigation if speed > SIMPLIFIED_NAVIGATION_SPEED => {
            Ruling::allow("✓ 导航已启动，高速模式下采用简化界面和语音引导，AR-HUD显示关键转向信息。")
                .because(format!(
                    "车速{}km/h，高于{}km/h。导航是驾驶必需功能，采用简化显示和语音引导，减少视线离开路面的时间。",
                    speed, SIMPLIFIED_NAVIGATION_SPEED
                ))
                .actions(["启动导航", "简化界面", "语音引导", "AR-HUD转向提示"])
                .risk(RiskLevel::Low, "驾驶必需信息，已简化")
        }
        CommandIntent::Navigation => {
            Ruling::allow("✓ 导航已启动，正在规划最优路线，AR实景导航已开启。")
                .because(format!(
                    "车速{}km/h，处于中低速行驶，可使用完整导航界面，AR实景导航辅助驾驶。",
                    speed
                ))
                .actions(["启动导航", "完整路线显示", "AR实景导航"])
                .risk(RiskLevel::Low, "驾驶辅助功能")
        }
        CommandIntent::Music | CommandIntent::Phone => {
            let ruling = baseline(facts);
            if speed > VOICE_CONTROL_SPEED {
                Ruling {
                    response: format!("✓ {}高速行驶中，建议使用方向盘按键或语音控制。", ruling.response),
                    ..ruling
                }
                .because(format!(
                    "车速{}km/h，高于{}km/h。{}属于低干扰功能，允许使用，但推荐语音或方向盘操作，避免触摸屏幕。",
                    speed,
                    VOICE_CONTROL_SPEED,
                    feature_name(facts.intent)
                ))
                .also("推荐语音控制")
                .risk(RiskLevel::Low, "高速下建议语音操作")
            } else {
                ruling
                    .because(format!(
                        "车速{}km/h，{}属于低干扰功能，行驶中允许使用。",
                        speed,
                        feature_name(facts.intent)
                    ))
                    .risk(RiskLevel::Low, "低干扰功能")
            }
        }
        CommandIntent::Climate | CommandIntent::SeatComfort | CommandIntent::BatteryQuery => {
            baseline(facts)
                .because(format!(
                    "车辆以{}km/h正常行驶，{}不影响驾驶操作，可以安全执行。",
                    speed,
                    feature_name(facts.intent)
                ))
                .risk(RiskLevel::None, "不影响驾驶")
        }
        CommandIntent::Window if speed > WINDOW_SPEED_LIMIT => {
            Ruling::deny(format!(
                "⚠️ 车速超过{}km/h，开窗会产生较大风噪并增加风阻，建议使用空调通风。",
                WINDOW_SPEED_LIMIT
            ))
            .because(format!(
                "车速{}km/h，高于{}km/h。高速开窗会显著增加风阻和风噪，并可能有异物进入，影响驾驶安全。",
                speed, WINDOW_SPEED_LIMIT
            ))
            .actions(["拒绝开窗", "建议空调外循环"])
            .risk(RiskLevel::Medium, "高速风噪与风阻")
        }
        CommandIntent::Window => baseline(facts)
            .because(format!(
                "车速{}km/h，低于{}km/h，车窗操作安全。",
                speed, WINDOW_SPEED_LIMIT
            ))
            .risk(RiskLevel::Low, "低速车窗操作"),
        CommandIntent::AmbientLight if speed > AMBIENT_LIGHT_SPEED_LIMIT => {
            Ruling::deny("⚠️ 行驶速度较快，暂不支持调节氛围灯，请停车或低速时再调整。")
                .because(format!(
                    "车速{}km/h，高于{}km/h。氛围灯调节需要菜单操作，高速下会分散注意力。",
                    speed, AMBIENT_LIGHT_SPEED_LIMIT
                ))
                .actions(["拒绝调节", "保持当前灯光"])
                .risk(RiskLevel::Medium, "高速菜单操作")
        }
        CommandIntent::AmbientLight => baseline(facts)
            .because(format!(
                "车速{}km/h，低于{}km/h，氛围灯调节干扰较小，允许执行。",
                speed, AMBIENT_LIGHT_SPEED_LIMIT
            ))
            .risk(RiskLevel::Low, "低速灯光调节"),
        CommandIntent::General => baseline(facts)
            .because(format!("车辆以{}km/h行驶中，指令不涉及驾驶操作，正常处理。", speed))
            .risk(RiskLevel::Low, "常规指令"),
    }
}
