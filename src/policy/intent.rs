use serde::{Deserialize, Serialize};
use std::fmt;

/// What a spoken or typed command is asking for. Exactly one per command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandIntent {
    Navigation,
    Music,
    Video,
    Phone,
    Message,
    SeatAdjust,
    SeatComfort,
    Climate,
    BatteryQuery,
    Window,
    Settings,
    AmbientLight,
    General,
}

impl CommandIntent {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandIntent::Navigation => "navigation",
            CommandIntent::Music => "music",
            CommandIntent::Video => "video",
            CommandIntent::Phone => "phone",
            CommandIntent::Message => "message",
            CommandIntent::SeatAdjust => "seat_adjust",
            CommandIntent::SeatComfort => "seat_comfort",
            CommandIntent::Climate => "climate",
            CommandIntent::BatteryQuery => "battery_query",
            CommandIntent::Window => "window",
            CommandIntent::Settings => "settings",
            CommandIntent::AmbientLight => "ambient_light",
            CommandIntent::General => "general",
        }
    }
}

impl fmt::Display for CommandIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A keyword set. Matches when the text contains any `any_of` keyword and,
/// if `requires` is non-empty, also one of the `requires` keywords.
struct KeywordRule {
    intent: CommandIntent,
    requires: &'static [&'static str],
    any_of: &'static [&'static str],
}

impl KeywordRule {
    fn matches(&self, lowered: &str) -> bool {
        let required = self.requires.is_empty() || self.requires.iter().any(|k| lowered.contains(k));
        required && self.any_of.iter().any(|k| lowered.contains(k))
    }
}

const SEAT: &[&str] = &["座椅", "seat"];

// Keyword sets overlap; this order is canonical and first match wins.
const RULES: [KeywordRule; 12] = [
    KeywordRule {
        intent: CommandIntent::Navigation,
        requires: &[],
        any_of: &["导航", "地图", "路线", "去", "到", "navigat", "route"],
    },
    KeywordRule {
        intent: CommandIntent::Music,
        requires: &[],
        any_of: &["音乐", "播放", "歌", "无聊", "music", "song"],
    },
    KeywordRule {
        intent: CommandIntent::Video,
        requires: &[],
        any_of: &["视频", "游戏", "电影", "video", "movie", "game"],
    },
    KeywordRule {
        intent: CommandIntent::Phone,
        requires: &[],
        any_of: &["电话", "通话", "打给", "phone", "call"],
    },
    KeywordRule {
        intent: CommandIntent::Message,
        requires: &[],
        any_of: &["消息", "短信", "微信", "message", "sms"],
    },
    KeywordRule {
        intent: CommandIntent::SeatAdjust,
        requires: SEAT,
        any_of: &["调节", "位置", "前后", "靠背", "adjust", "position", "recline"],
    },
    KeywordRule {
        intent: CommandIntent::SeatComfort,
        requires: SEAT,
        any_of: &["加热", "通风", "按摩", "heat", "ventilat", "massage"],
    },
    KeywordRule {
        intent: CommandIntent::Climate,
        requires: &[],
        any_of: &[
            "空调", "温度", "好热", "好冷", "制冷", "制热", "climate", "temperature", "too hot",
            "too cold",
        ],
    },
    KeywordRule {
        intent: CommandIntent::BatteryQuery,
        requires: &[],
        any_of: &["电量", "续航", "充电", "battery", "charging"],
    },
    KeywordRule {
        intent: CommandIntent::Window,
        requires: &[],
        any_of: &["车窗", "天窗", "window", "sunroof"],
    },
    KeywordRule {
        intent: CommandIntent::Settings,
        requires: &[],
        any_of: &["设置", "配置", "settings"],
    },
    KeywordRule {
        intent: CommandIntent::AmbientLight,
        requires: &[],
        any_of: &["氛围灯", "灯光", "ambient light"],
    },
];

/// Case-insensitive keyword classification. Total: no match means `General`.
pub fn classify(text: &str) -> CommandIntent {
    let lowered = text.to_lowercase();
    RULES
        .iter()
        .find(|rule| rule.matches(&lowered))
        .map(|rule| rule.intent)
        .unwrap_or(CommandIntent::General)
}

/// Intents in the order the classifier tests them, `General` last.
pub fn precedence() -> impl Iterator<Item = CommandIntent> {
    RULES
        .iter()
        .map(|rule| rule.intent)
        .chain(std::iter::once(CommandIntent::General))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seat_rules_need_the_seat_keyword() {
        assert_eq!(classify("座椅加热"), CommandIntent::SeatComfort);
        assert_eq!(classify("调节座椅靠背"), CommandIntent::SeatAdjust);
        // "加热" alone is not a seat request
        assert_eq!(classify("加热"), CommandIntent::General);
    }

    #[test]
    fn english_is_case_insensitive() {
        assert_eq!(classify("Play some MUSIC"), CommandIntent::Music);
        assert_eq!(classify("Battery status?"), CommandIntent::BatteryQuery);
    }
}
