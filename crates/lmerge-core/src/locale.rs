//! Locale display names for transform placeholders

/// A locale code with its English and native display names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocaleInfo {
    pub code: &'static str,
    pub name: &'static str,
    pub native_name: &'static str,
}

const fn locale(code: &'static str, name: &'static str, native_name: &'static str) -> LocaleInfo {
    LocaleInfo {
        code,
        name,
        native_name,
    }
}

const KNOWN_LOCALES: &[LocaleInfo] = &[
    locale("ar", "Arabic", "العربية"),
    locale("bg", "Bulgarian", "Български"),
    locale("bn", "Bengali", "বাংলা"),
    locale("ca", "Catalan", "Català"),
    locale("cs", "Czech", "Čeština"),
    locale("da", "Danish", "Dansk"),
    locale("de", "German", "Deutsch"),
    locale("el", "Greek", "Ελληνικά"),
    locale("en-GB", "English (United Kingdom)", "English (United Kingdom)"),
    locale("en-US", "English (United States)", "English (United States)"),
    locale("en", "English", "English"),
    locale("es-419", "Spanish (Latin America)", "Español (Latinoamérica)"),
    locale("es-MX", "Spanish (Mexico)", "Español (México)"),
    locale("es", "Spanish", "Español"),
    locale("et", "Estonian", "Eesti"),
    locale("fa", "Persian", "فارسی"),
    locale("fi", "Finnish", "Suomi"),
    locale("fil", "Filipino", "Filipino"),
    locale("fr-CA", "French (Canada)", "Français (Canada)"),
    locale("fr", "French", "Français"),
    locale("he", "Hebrew", "עברית"),
    locale("hi", "Hindi", "हिन्दी"),
    locale("hr", "Croatian", "Hrvatski"),
    locale("hu", "Hungarian", "Magyar"),
    locale("id", "Indonesian", "Bahasa Indonesia"),
    locale("it", "Italian", "Italiano"),
    locale("ja", "Japanese", "日本語"),
    locale("ko", "Korean", "한국어"),
    locale("lt", "Lithuanian", "Lietuvių"),
    locale("lv", "Latvian", "Latviešu"),
    locale("ms", "Malay", "Bahasa Melayu"),
    locale("nb", "Norwegian Bokmål", "Norsk bokmål"),
    locale("nl", "Dutch", "Nederlands"),
    locale("no", "Norwegian", "Norsk"),
    locale("pl", "Polish", "Polski"),
    locale("pt-BR", "Portuguese (Brazil)", "Português (Brasil)"),
    locale("pt-PT", "Portuguese (Portugal)", "Português (Portugal)"),
    locale("pt", "Portuguese", "Português"),
    locale("ro", "Romanian", "Română"),
    locale("ru", "Russian", "Русский"),
    locale("sk", "Slovak", "Slovenčina"),
    locale("sl", "Slovenian", "Slovenščina"),
    locale("sr", "Serbian", "Српски"),
    locale("sv", "Swedish", "Svenska"),
    locale("sw", "Swahili", "Kiswahili"),
    locale("ta", "Tamil", "தமிழ்"),
    locale("th", "Thai", "ไทย"),
    locale("tr", "Turkish", "Türkçe"),
    locale("uk", "Ukrainian", "Українська"),
    locale("ur", "Urdu", "اردو"),
    locale("vi", "Vietnamese", "Tiếng Việt"),
    locale("zh-CN", "Chinese (Simplified)", "简体中文"),
    locale("zh-Hans", "Chinese (Simplified)", "简体中文"),
    locale("zh-TW", "Chinese (Traditional)", "繁體中文"),
    locale("zh-Hant", "Chinese (Traditional)", "繁體中文"),
    locale("zh", "Chinese", "中文"),
];

/// Look up a locale code.
///
/// Matching ignores case and treats `_` like `-`. A region-qualified code
/// that is not listed falls back to its base language (`de-AT` -> `de`).
pub fn lookup(code: &str) -> Option<&'static LocaleInfo> {
    let normalized = code.trim().replace('_', "-");
    find(&normalized).or_else(|| {
        normalized
            .split_once('-')
            .and_then(|(base, _)| find(base))
    })
}

fn find(code: &str) -> Option<&'static LocaleInfo> {
    KNOWN_LOCALES
        .iter()
        .find(|l| l.code.eq_ignore_ascii_case(code))
}

/// English display name, or the code itself when unknown
pub fn display_name(code: &str) -> String {
    lookup(code)
        .map(|l| l.name.to_string())
        .unwrap_or_else(|| code.to_string())
}

/// Native display name, or the code itself when unknown
pub fn native_name(code: &str) -> String {
    lookup(code)
        .map(|l| l.native_name.to_string())
        .unwrap_or_else(|| code.to_string())
}
