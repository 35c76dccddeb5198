//! Agent card - summary of one agent for listings

use chrono::{DateTime, Utc};
use serde::Serialize;

use tantei_domain::model::agent::{Agent, RiskLevel};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentCardView {
    /// Route to the agent's detail page
    pub link: String,
    pub name: String,
    pub strategy_type: String,
    /// Hidden in compact cards
    pub strategy_description: Option<String>,
    /// Shown as a badge for low-risk agents
    pub verified: bool,
    /// e.g. `+12.35%` or `-3.20%`
    pub roi_display: String,
    pub roi_positive: bool,
    pub risk_label: String,
    /// Hidden in compact cards
    pub fee_label: Option<String>,
    /// e.g. `Published 3 days ago`
    pub published: String,
    /// e.g. `By 0x1234...abcd`
    pub owner: String,
}

impl AgentCardView {
    pub fn new(agent: &Agent, now: DateTime<Utc>, compact: bool) -> Self {
        let roi = agent.roi.unwrap_or(0.0);
        let roi_positive = roi >= 0.0;
        let sign = if roi_positive { "+" } else { "" };

        Self {
            link: format!("/app/agent/{}", agent.id),
            name: agent.agent_name.clone(),
            strategy_type: agent.strategy_type.clone(),
            strategy_description: (!compact).then(|| agent.strategy_description.clone()),
            verified: agent.risk_level == RiskLevel::Low,
            roi_display: format!("{}{:.2}%", sign, roi),
            roi_positive,
            risk_label: agent.risk_level.label().to_string(),
            fee_label: (!compact).then(|| format!("{} HBAR", agent.subscription_fee)),
            published: format!("Published {}", format_time_since(agent.time_created, now)),
            owner: format!("By {}", shorten_address(&agent.owner_wallet_address)),
        }
    }
}

/// Coarse relative time, e.g. `5 minutes ago`
pub fn format_time_since(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - then).num_seconds().max(0);

    const MINUTE: i64 = 60;
    const HOUR: i64 = 60 * MINUTE;
    const DAY: i64 = 24 * HOUR;
    const MONTH: i64 = 30 * DAY;
    const YEAR: i64 = 365 * DAY;

    let (count, unit) = match seconds {
        s if s < MINUTE => return "just now".to_string(),
        s if s < HOUR => (s / MINUTE, "minute"),
        s if s < DAY => (s / HOUR, "hour"),
        s if s < MONTH => (s / DAY, "day"),
        s if s < YEAR => (s / MONTH, "month"),
        s => (s / YEAR, "year"),
    };

    if count == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", count, unit)
    }
}

/// `0x1234567890abcdef` -> `0x1234...cdef`
fn shorten_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 10 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use tantei_domain::model::agent::{AgentDraft, AgentId, AgentRecord};

    fn agent(now: DateTime<Utc>) -> Agent {
        Agent::from_record(
            AgentRecord {
                id: AgentId::parse("65f1c2a9b3d4e5f60718293a").unwrap(),
                draft: AgentDraft::new(
                    "0x1234567890abcdef1234567890abcdef12345678",
                    "0.0.1001",
                    "Momentum Rider",
                )
                .with_strategy("momentum", "Rides trends")
                .with_subscription_fee(10.0)
                .with_roi(12.5)
                .with_time_created(now - Duration::days(3)),
            },
            now,
        )
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_full_card() {
        let view = AgentCardView::new(&agent(now()), now(), false);

        assert_eq!(view.link, "/app/agent/65f1c2a9b3d4e5f60718293a");
        assert_eq!(view.roi_display, "+12.50%");
        assert!(view.roi_positive);
        assert_eq!(view.risk_label, "Moderate");
        assert!(!view.verified);
        assert_eq!(view.fee_label.as_deref(), Some("10 HBAR"));
        assert_eq!(view.strategy_description.as_deref(), Some("Rides trends"));
        assert_eq!(view.published, "Published 3 days ago");
        assert_eq!(view.owner, "By 0x1234...5678");
    }

    #[test]
    fn test_compact_card_hides_details() {
        let view = AgentCardView::new(&agent(now()), now(), true);

        assert!(view.fee_label.is_none());
        assert!(view.strategy_description.is_none());
    }

    #[test]
    fn test_negative_and_missing_roi() {
        let mut a = agent(now());
        a.roi = Some(-3.2);
        let view = AgentCardView::new(&a, now(), false);
        assert_eq!(view.roi_display, "-3.20%");
        assert!(!view.roi_positive);

        a.roi = None;
        let view = AgentCardView::new(&a, now(), false);
        assert_eq!(view.roi_display, "+0.00%");
        assert!(view.roi_positive);
    }

    #[test]
    fn test_low_risk_is_verified() {
        let mut a = agent(now());
        a.risk_level = RiskLevel::Low;
        let view = AgentCardView::new(&a, now(), false);

        assert!(view.verified);
        assert_eq!(view.risk_label, "Low");
    }

    #[test]
    fn test_format_time_since() {
        let now = now();
        assert_eq!(format_time_since(now, now), "just now");
        assert_eq!(format_time_since(now + Duration::hours(1), now), "just now");
        assert_eq!(format_time_since(now - Duration::minutes(1), now), "1 minute ago");
        assert_eq!(format_time_since(now - Duration::minutes(59), now), "59 minutes ago");
        assert_eq!(format_time_since(now - Duration::hours(5), now), "5 hours ago");
        assert_eq!(format_time_since(now - Duration::days(45), now), "1 month ago");
        assert_eq!(format_time_since(now - Duration::days(800), now), "2 years ago");
    }

    #[test]
    fn test_short_address_kept() {
        assert_eq!(shorten_address("0xabc"), "0xabc");
    }
}
