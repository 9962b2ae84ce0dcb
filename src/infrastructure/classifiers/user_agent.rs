//! User-agent classification backed by `woothee` and a bot pattern list.

use std::sync::LazyLock;

use regex::RegexSet;
use tracing::warn;
use woothee::parser::Parser;

use crate::domain::classifiers::{UserAgentClassifier, UserAgentInfo};

/// Known crawler, scraper, monitor and headless-browser signatures.
///
/// Order matters: the first matching entry names the bot type.
const BOT_PATTERNS: &[&str] = &[
    // Search engines
    "googlebot",
    "bingbot",
    "slurp",
    "duckduckbot",
    "baiduspider",
    "yandexbot",
    "sogou",
    "exabot",
    "facebot",
    "ia_archiver",
    // Social previews
    "facebookexternalhit",
    "twitterbot",
    "linkedinbot",
    "pinterestbot",
    "whatsapp",
    "telegrambot",
    "slackbot",
    "discordbot",
    // SEO
    "ahrefsbot",
    "semrushbot",
    "mj12bot",
    "dotbot",
    "rogerbot",
    "blexbot",
    "screaming frog",
    "petalbot",
    "dataforseo",
    // Scrapers and generic crawlers
    "scrapy",
    "python-requests",
    "go-http-client",
    "wget",
    "curl",
    "httrack",
    "webcopier",
    "crawler",
    "spider",
    "scraper",
    "bot",
    "crawl",
    "fetch",
    "scan",
    "check",
    // Uptime monitors
    "pingdom",
    "uptimerobot",
    "statuscake",
    "newrelic",
    "monitis",
    "site24x7",
    "gtmetrix",
    "pagespeed",
    // Vulnerability scanners
    "nmap",
    "nikto",
    "nessus",
    "openvas",
    "masscan",
    "acunetix",
    "sqlmap",
    "metasploit",
    // AI agents
    "gptbot",
    "chatgpt",
    "claudebot",
    "anthropic",
    "cohere",
    "perplexitybot",
    "you.com",
    // Automation
    "headless",
    "phantomjs",
    "selenium",
    "webdriver",
];

static BOT_REGEXES: LazyLock<Option<RegexSet>> = LazyLock::new(|| {
    match RegexSet::new(BOT_PATTERNS.iter().map(|p| format!("(?i){p}"))) {
        Ok(set) => Some(set),
        Err(e) => {
            warn!("Failed to compile bot patterns, pattern detection disabled: {}", e);
            None
        }
    }
});

const UNKNOWN: &str = "UNKNOWN";

/// [`UserAgentClassifier`] using the woothee parser.
#[derive(Debug, Default, Clone, Copy)]
pub struct WootheeClassifier;

impl WootheeClassifier {
    pub fn new() -> Self {
        Self
    }
}

impl UserAgentClassifier for WootheeClassifier {
    fn classify(&self, user_agent: &str) -> UserAgentInfo {
        if user_agent.is_empty() {
            return UserAgentInfo::default();
        }

        let parsed = Parser::new().parse(user_agent);
        let (raw_os, raw_browser, category) = match &parsed {
            Some(r) => (known(r.os), known(r.name), r.category),
            None => ("", "", ""),
        };

        let pattern_bot = bot_type(user_agent);
        let is_bot = pattern_bot.is_some() || category == "crawler";
        let bot_type = match pattern_bot {
            Some(t) => t,
            None if is_bot => raw_browser.to_lowercase().replace(' ', "_"),
            None => String::new(),
        };

        UserAgentInfo {
            os: normalize_os(raw_os),
            device: device_class(user_agent, category).to_string(),
            browser: normalize_browser(raw_browser, user_agent),
            is_bot,
            bot_type,
        }
    }
}

fn known(value: &str) -> &str {
    if value == UNKNOWN { "" } else { value }
}

/// First matching bot pattern, with spaces turned into underscores.
fn bot_type(user_agent: &str) -> Option<String> {
    let set = BOT_REGEXES.as_ref()?;
    let index = set.matches(user_agent).iter().next()?;
    Some(BOT_PATTERNS[index].replace(' ', "_"))
}

/// Collapses versioned OS names into the families used by allow-lists.
fn normalize_os(os: &str) -> String {
    let family = match os {
        "" => "",
        "iPhone" | "iPod" | "iOS" => "iOS",
        "iPad" => "iPadOS",
        "Mac OSX" | "Mac OS X" => "macOS",
        _ if os.contains("iPhone OS") => "iOS",
        _ if os.contains("CPU OS") && os.contains("like Mac OS X") => "iPadOS",
        _ if os.contains("Mac OS X") => "macOS",
        _ if os.starts_with("Android") => "Android",
        _ if os.starts_with("Windows") => "Windows",
        _ if os.contains("Linux") || os.contains("Ubuntu") => "Linux",
        _ => os,
    };
    family.to_string()
}

fn normalize_browser(browser: &str, user_agent: &str) -> String {
    if browser.is_empty() {
        return String::new();
    }
    if user_agent.contains("SamsungBrowser") {
        "Samsung Browser".to_string()
    } else if user_agent.contains("CriOS") {
        "Chrome".to_string()
    } else if user_agent.contains("FxiOS") {
        "Firefox".to_string()
    } else {
        browser.to_string()
    }
}

fn device_class(user_agent: &str, category: &str) -> &'static str {
    if user_agent.contains("iPad") {
        "Tablet"
    } else if user_agent.contains("Android") && !user_agent.contains("Mobile") {
        "Tablet"
    } else if matches!(category, "smartphone" | "mobilephone") {
        "Mobile"
    } else {
        "Desktop"
    }
}
