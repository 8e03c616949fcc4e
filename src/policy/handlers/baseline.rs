use crate::policy::decision::Ruling;
use crate::policy::intent::CommandIntent;
use crate::policy::limits::{estimated_range_km, COLD_CABIN_C, COMFORT_TEMP_C, HOT_CABIN_C};
use crate::policy::tiers::Facts;

const GREETINGS: &[&str] = &["你好", "嗨", "hello", "hi there"];
const HELP: &[&str] = &["帮助", "功能", "help"];
const THANKS: &[&str] = &["谢谢", "感谢", "thank"];

/// Unrestricted handling of an intent. Callers supply reasoning and risk.
pub fn baseline(facts: &Facts<'_>) -> Ruling {
    match facts.intent {
        CommandIntent::Navigation => Ruling::allow("导航系统已启动，正在规划最优路线并标注沿途充电站。")
            .actions(["启动导航", "智能路线规划", "标注充电站"]),
        CommandIntent::Music => Ruling::allow("音乐播放器已打开，正在播放推荐歌单。")
            .actions(["启动音乐播放", "加载推荐歌单", "沉浸式音响"]),
        CommandIntent::Video => Ruling::allow("视频播放器已打开，为您推荐热门影片。")
            .actions(["启动视频播放器", "推荐影片列表"]),
        CommandIntent::Phone => Ruling::allow("语音通话系统就绪，请说出联系人姓名。")
            .actions(["激活蓝牙通话", "准备拨号系统"]),
        CommandIntent::Message => Ruling::allow("消息中心已打开，可为您语音朗读未读消息。")
            .actions(["打开消息中心", "语音朗读"]),
        CommandIntent::SeatAdjust => Ruling::allow("座椅调节已启用，可调节至舒适位置。")
            .actions(["启用座椅调节", "显示调节界面"]),
        CommandIntent::SeatComfort => Ruling::allow("座椅加热和按摩功能已启用，为您提供舒适体验。")
            .actions(["启动座椅加热", "激活按摩模式"]),
        CommandIntent::Climate => climate(facts.ctx.cabin_temp),
        CommandIntent::BatteryQuery => battery(facts.ctx.battery_percentage),
        CommandIntent::Window => Ruling::allow("车窗控制已启用，可以开启车窗通风。")
            .actions(["启用车窗控制", "开启通风"]),
        CommandIntent::Settings => Ruling::allow("系统设置已打开。")
            .actions(["打开设置菜单"]),
        CommandIntent::AmbientLight => Ruling::allow("氛围灯已调整为舒适模式。")
            .actions(["调整氛围灯", "舒适场景"]),
        CommandIntent::General => general(facts),
    }
}

fn climate(cabin_temp: Option<f64>) -> Ruling {
    match cabin_temp {
        Some(t) if t > HOT_CABIN_C => Ruling::allow(format!(
            "检测到车内温度偏高（{}°C），空调已调至舒适温度{}°C。",
            t, COMFORT_TEMP_C
        ))
        .actions([format!("降温至{}°C", COMFORT_TEMP_C), "智能节能模式".to_string()]),
        Some(t) if t < COLD_CABIN_C => Ruling::allow(format!(
            "检测到车内温度偏低（{}°C），空调已调至舒适温度{}°C。",
            t, COMFORT_TEMP_C
        ))
        .actions([format!("升温至{}°C", COMFORT_TEMP_C), "座椅加热推荐".to_string()]),
        _ => Ruling::allow(format!("智能空调系统已调整至舒适温度{}°C。", COMFORT_TEMP_C))
            .actions([format!("调节温度至{}°C", COMFORT_TEMP_C), "智能温控".to_string()]),
    }
}

fn battery(battery_percentage: Option<f64>) -> Ruling {
    match battery_percentage {
        Some(b) => Ruling::allow(format!(
            "当前电量：{}%，预计续航{}公里。最近充电站距离12公里。",
            b,
            estimated_range_km(b)
        ))
        .actions(["查询电池状态", "计算续航", "定位充电站"]),
        None => Ruling::allow("电量数据暂不可用，请稍后再试。").actions(["查询电池状态"]),
    }
}

fn general(facts: &Facts<'_>) -> Ruling {
    if facts.mentions(GREETINGS) {
        return Ruling::allow(
            "您好！我是您的AI驾驶助手，随时为您服务。可以让我帮您导航、播放音乐、调节空调等。",
        )
        .actions(["语音问候", "功能提示"]);
    }
    if facts.mentions(HELP) {
        return Ruling::allow(
            "我可以帮您：智能导航、播放音乐、拨打电话、查询电量续航、调节空调、座椅控制、氛围灯设置等。",
        )
        .actions(["显示功能列表", "语音提示"]);
    }
    if facts.mentions(THANKS) {
        return Ruling::allow("不客气！很高兴为您服务，祝您行车愉快！").actions(["礼貌回应"]);
    }
    Ruling::allow(format!(
        "收到您的指令\"{}\"。我会尽力为您处理。如需明确指令，可以试试：\"播放音乐\"、\"打开导航\"、\"调节空调\"等。",
        facts.command.trim()
    ))
    .actions(["处理自定义指令", "提供建议"])
}
