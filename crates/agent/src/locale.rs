//! Learner-facing strings, in the learner's native language where we have it.

/// Language for confirmations and apologies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Locale {
    #[default]
    English,
    Vietnamese,
}

impl Locale {
    /// Pick a locale from a profile's native language. Unknown languages fall back to English.
    pub fn for_language(native_language: &str) -> Self {
        match native_language.trim().to_lowercase().as_str() {
            "vietnamese" | "vi" | "tiếng việt" | "tieng viet" => Locale::Vietnamese,
            _ => Locale::English,
        }
    }

    pub fn apology(self, detail: &str) -> String {
        match self {
            Locale::Vietnamese => format!("Xin lỗi, có lỗi xảy ra: {detail}"),
            Locale::English => format!("Sorry, something went wrong: {detail}"),
        }
    }

    pub fn analysis_failed(self, detail: &str) -> String {
        match self {
            Locale::Vietnamese => format!("Không thể phân tích text: {detail}"),
            Locale::English => format!("Could not analyze the text: {detail}"),
        }
    }

    pub fn level_updated(self, level: &str) -> String {
        match self {
            Locale::Vietnamese => format!("Đã cập nhật trình độ thành: {level}"),
            Locale::English => format!("Level updated to: {level}"),
        }
    }

    pub fn model_switched(self, tier: &str, model: &str) -> String {
        match self {
            Locale::Vietnamese => format!("Đã chuyển sang model: {tier} ({model})"),
            Locale::English => format!("Switched to model: {tier} ({model})"),
        }
    }

    pub fn unable_to_complete(self) -> String {
        match self {
            Locale::Vietnamese => {
                "Xin lỗi, mình chưa thể hoàn thành câu trả lời. Bạn thử hỏi lại theo cách khác nhé?".into()
            }
            Locale::English => {
                "Sorry, I couldn't finish working that out. Could you try asking in a different way?".into()
            }
        }
    }

    pub fn empty_message(self) -> String {
        match self {
            Locale::Vietnamese => "Bạn hãy nhập một câu bằng tiếng Anh nhé!".into(),
            Locale::English => "Please type a message in English!".into(),
        }
    }
}
