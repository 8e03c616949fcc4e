//! Regimes where the car is not moving forward: parked and the idle fallback.
//! Neither denies anything.

use super::baseline::baseline;
use crate::policy::decision::{RiskLevel, Ruling};
use crate::policy::intent::CommandIntent;
use crate::policy::limits::{COMFORT_TEMP_C, HOT_CABIN_C, PARKED_COOLING_TARGET_C};
use crate::policy::tiers::Facts;

pub fn parked(facts: &Facts<'_>) -> Ruling {
    let ctx = facts.ctx;
    let reasoning = format!(
        "环境分析：车辆已停稳（{}档，速度{}km/h），所有功能均可安全使用。",
        ctx.gear, ctx.speed
    );
    let ruling = match facts.intent {
        CommandIntent::Video => {
            Ruling::allow("✓ 车辆已停稳，视频播放器已打开，为您推荐热门影片，可尽情享受娱乐时光。")
                .actions(["启动视频播放器", "推荐影片列表", "沉浸式音响"])
        }
        CommandIntent::SeatAdjust => {
            Ruling::allow("✓ 车辆已停稳，座椅可自由调节，已开启座椅记忆功能。")
                .actions(["启用座椅调节", "座椅记忆", "显示调节界面"])
        }
        CommandIntent::Climate => match ctx.cabin_temp {
            Some(t) if t > HOT_CABIN_C => Ruling::allow(format!(
                "✓ 检测到车内温度{}°C，已开启强力制冷，将降温至{}°C。",
                t, PARKED_COOLING_TARGET_C
            ))
            .actions([
                "强力制冷".to_string(),
                format!("目标温度{}°C", PARKED_COOLING_TARGET_C),
                "外循环通风".to_string(),
            ]),
            _ => Ruling::allow(format!(
                "✓ 车辆已停稳，空调已设置为舒适温度{}°C。",
                COMFORT_TEMP_C
            ))
            .actions([format!("调节温度至{}°C", COMFORT_TEMP_C), "智能温控".to_string()]),
        },
        _ => {
            let plain = baseline(facts);
            Ruling {
                response: format!("✓ 车辆已停稳，{}", plain.response),
                ..plain
            }
        }
    };
    ruling
        .because(reasoning)
        .risk(RiskLevel::None, "车辆静止状态")
}

pub fn idle(facts: &Facts<'_>) -> Ruling {
    let ctx = facts.ctx;
    baseline(facts)
        .because(format!(
            "车辆状态正常（{}档，{}km/h），环境安全，驾驶员注意力集中。",
            ctx.gear, ctx.speed
        ))
        .risk(RiskLevel::None, "正常状态")
}
