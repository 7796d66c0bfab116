use chrono::NaiveDate;

pub const AVATAR_BASE_URL: &str = "https://picsum.photos/seed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    Coordinator,
    Technical,
    Marketing,
    Logistics,
    Hospitality,
    Designer,
    Host,
    Security,
}

impl Role {
    pub const ALL: [Role; 8] = [
        Role::Coordinator,
        Role::Technical,
        Role::Marketing,
        Role::Logistics,
        Role::Hospitality,
        Role::Designer,
        Role::Host,
        Role::Security,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Role::Coordinator => "coordinator",
            Role::Technical => "technical",
            Role::Marketing => "marketing",
            Role::Logistics => "logistics",
            Role::Hospitality => "hospitality",
            Role::Designer => "designer",
            Role::Host => "host",
            Role::Security => "security",
        }
    }

    /// Display label. These strings are also the enum values sent in the
    /// prediction response schema.
    pub fn label(self) -> &'static str {
        match self {
            Role::Coordinator => "Coordinator",
            Role::Technical => "Technical Support",
            Role::Marketing => "Media & PR",
            Role::Logistics => "Logistics",
            Role::Hospitality => "Reception & Hospitality",
            Role::Designer => "Visual Design",
            Role::Host => "MC / Host",
            Role::Security => "Security & Access Control",
        }
    }

    /// Accepts either the display label or the key, ignoring case and
    /// surrounding whitespace.
    pub fn from_label(raw: &str) -> Option<Role> {
        let needle = raw.trim();
        if needle.is_empty() {
            return None;
        }
        Role::ALL.into_iter().find(|role| {
            role.label().eq_ignore_ascii_case(needle) || role.key().eq_ignore_ascii_case(needle)
        })
    }

    pub fn labels() -> Vec<&'static str> {
        Role::ALL.iter().map(|role| role.label()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerformanceRecord {
    pub event_name: String,
    pub role: Role,
    // 1..=5
    pub rating: u8,
    pub feedback: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar: String,
    pub skills: Vec<String>,
    pub strengths: Vec<String>,
    pub history: Vec<PerformanceRecord>,
    pub joined_date: NaiveDate,
}

impl Member {
    pub fn average_rating(&self) -> f64 {
        average_rating(&self.history)
    }

    pub fn short_name(&self) -> &str {
        short_name(&self.name)
    }

    /// Case-insensitive substring match over name, email and skills.
    pub fn matches_query(&self, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }
        let needle = query.to_lowercase();
        contains_ci(&self.name, &needle)
            || contains_ci(&self.email, &needle)
            || self.skills.iter().any(|skill| contains_ci(skill, &needle))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AIPrediction {
    pub recommended_role: Role,
    pub confidence: f64,
    pub reasoning: String,
    pub alternative_role: Role,
    pub suggested_improvement: String,
}

impl AIPrediction {
    pub fn confidence_percent(&self) -> u32 {
        (self.confidence * 100.0).round().clamp(0.0, 100.0) as u32
    }
}

pub fn average_rating(history: &[PerformanceRecord]) -> f64 {
    if history.is_empty() {
        return 0.0;
    }
    let total: u32 = history.iter().map(|h| u32::from(h.rating)).sum();
    f64::from(total) / history.len() as f64
}

/// Last whitespace-delimited token of a full name. Not unique.
pub fn short_name(name: &str) -> &str {
    name.split_whitespace().last().unwrap_or("")
}

pub fn avatar_url(seed: &str) -> String {
    format!("{AVATAR_BASE_URL}/{seed}/100/100")
}

/// Splits comma-separated text into trimmed, non-empty labels.
pub fn parse_label_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

// `needle` must already be lowercased.
fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(role: Role, rating: u8) -> PerformanceRecord {
        PerformanceRecord {
            event_name: "E".to_string(),
            role,
            rating,
            feedback: String::new(),
        }
    }

    #[test]
    fn average_rating_is_mean_or_zero() {
        assert_eq!(average_rating(&[]), 0.0);
        let history = vec![record(Role::Host, 5), record(Role::Security, 4)];
        assert!((average_rating(&history) - 4.5).abs() < 1e-9);
    }

    #[test]
    fn short_name_takes_last_token() {
        assert_eq!(short_name("Nguyễn Văn An"), "An");
        assert_eq!(short_name("Solo"), "Solo");
        assert_eq!(short_name("  trailing  space  "), "space");
        assert_eq!(short_name(""), "");
    }

    #[test]
    fn parse_label_list_drops_empty_entries() {
        assert_eq!(parse_label_list("A, B, ,C"), vec!["A", "B", "C"]);
        assert!(parse_label_list(" , ,").is_empty());
        assert!(parse_label_list("").is_empty());
    }

    #[test]
    fn role_parses_labels_and_keys() {
        assert_eq!(Role::from_label("MC / Host"), Some(Role::Host));
        assert_eq!(Role::from_label("  media & pr "), Some(Role::Marketing));
        assert_eq!(Role::from_label("SECURITY"), Some(Role::Security));
        assert_eq!(Role::from_label("Chef"), None);
        assert_eq!(Role::from_label(""), None);
    }

    #[test]
    fn role_labels_are_distinct() {
        let mut labels = Role::labels();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), Role::ALL.len());
    }

    #[test]
    fn matches_query_handles_unicode_case() {
        let member = Member {
            id: "1".to_string(),
            name: "Phạm Minh Đức".to_string(),
            email: "minhduc@example.com".to_string(),
            avatar: avatar_url("1"),
            skills: vec!["Vendor Management".to_string()],
            strengths: Vec::new(),
            history: Vec::new(),
            joined_date: NaiveDate::from_ymd_opt(2023, 11, 2).unwrap(),
        };
        assert!(member.matches_query("đức"));
        assert!(member.matches_query("EXAMPLE.COM"));
        assert!(member.matches_query("vendor"));
        assert!(member.matches_query(""));
        assert!(!member.matches_query("catering"));
    }

    #[test]
    fn confidence_percent_rounds() {
        let p = AIPrediction {
            recommended_role: Role::Host,
            confidence: 0.876,
            reasoning: String::new(),
            alternative_role: Role::Marketing,
            suggested_improvement: String::new(),
        };
        assert_eq!(p.confidence_percent(), 88);
    }
}
