/// Family-level classification of a raw user-agent string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub browser: String,
    pub os: String,
    pub device: String,
}

impl Classification {
    pub fn other() -> Self {
        Classification {
            browser: "Other".to_string(),
            os: "Other".to_string(),
            device: "Other".to_string(),
        }
    }
}

/// Capability for mapping a raw user-agent string to browser/OS/device
/// families. The parser only depends on this trait, so record construction is
/// testable with a stub classifier.
pub trait UserAgentClassifier {
    fn classify(&self, raw: &str) -> Classification;
}

/// Substring-heuristic classifier covering the browser families that show up
/// in real access logs. Unrecognized strings classify as "Other" across the
/// board; that is a valid classification, not a parse failure.
#[derive(Debug, Default)]
pub struct HeuristicClassifier;

impl HeuristicClassifier {
    fn browser(raw: &str) -> &'static str {
        // Order matters: Edge and mobile Safari embed other engines' tokens.
        if raw.contains("Edg/") || raw.contains("Edge/") {
            "Edge"
        } else if raw.contains("Firefox/") {
            "Firefox"
        } else if raw.contains("Chrome/") {
            if raw.contains("Mobile") {
                "Chrome Mobile"
            } else {
                "Chrome"
            }
        } else if raw.contains("Safari/") {
            if raw.contains("Mobile/") {
                "Mobile Safari"
            } else {
                "Safari"
            }
        } else if raw.contains("curl/") {
            "curl"
        } else if raw.contains("bot") || raw.contains("Bot") || raw.contains("spider") {
            "Bot"
        } else {
            "Other"
        }
    }

    fn os(raw: &str) -> &'static str {
        if raw.contains("Windows NT") {
            "Windows"
        } else if raw.contains("iPhone OS") || raw.contains("iPad") {
            "iOS"
        } else if raw.contains("Mac OS X") {
            "Mac OS X"
        } else if raw.contains("Android") {
            "Android"
        } else if raw.contains("Linux") {
            "Linux"
        } else {
            "Other"
        }
    }

    fn device(raw: &str) -> &'static str {
        if raw.contains("iPhone") {
            "iPhone"
        } else if raw.contains("iPad") {
            "iPad"
        } else if raw.contains("Android") {
            "Smartphone"
        } else {
            "Other"
        }
    }
}

impl UserAgentClassifier for HeuristicClassifier {
    fn classify(&self, raw: &str) -> Classification {
        Classification {
            browser: Self::browser(raw).to_string(),
            os: Self::os(raw).to_string(),
            device: Self::device(raw).to_string(),
        }
    }
}
