//! Asset allocation - share of each token in an account's holdings

use serde::Serialize;

use tantei_domain::model::token::TokenBalance;

/// Bar colors, assigned to rows by index and cycling
pub const ASSET_PALETTE: [&str; 10] = [
    "blue", "purple", "green", "yellow", "red", "indigo", "pink", "teal", "orange", "cyan",
];

/// Whether rows show their share or their raw balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    #[default]
    Percentage,
    Value,
}

impl DisplayMode {
    pub fn toggle(self) -> Self {
        match self {
            DisplayMode::Percentage => DisplayMode::Value,
            DisplayMode::Value => DisplayMode::Percentage,
        }
    }
}

/// State of the caller's balance query
#[derive(Debug, Clone, PartialEq)]
pub enum QueryState<T> {
    /// Query not enabled (no account connected)
    Idle,
    Loading,
    Failed,
    Ready(T),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationRow {
    /// e.g. `Hedera (HBAR)`
    pub title: String,
    pub percentage: f64,
    /// Never below 1 so every holding stays visible
    pub bar_width: f64,
    pub color: &'static str,
    /// Depends on the display mode
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetAllocation {
    pub mode: DisplayMode,
    pub rows: Vec<AllocationRow>,
    pub total: f64,
    pub total_label: String,
}

impl AssetAllocation {
    pub fn new(tokens: &[TokenBalance], mode: DisplayMode) -> Self {
        let total: f64 = tokens.iter().map(|t| t.balance).sum();

        let rows = tokens
            .iter()
            .enumerate()
            .map(|(index, token)| {
                let percentage = if total != 0.0 {
                    token.balance / total * 100.0
                } else {
                    0.0
                };
                let label = match mode {
                    DisplayMode::Percentage => format!("{:.1}%", percentage),
                    DisplayMode::Value => {
                        format!("{} {}", format_balance(token.balance), token.symbol)
                    }
                };

                AllocationRow {
                    title: format!("{} ({})", token.name, token.symbol),
                    percentage,
                    bar_width: percentage.max(1.0),
                    color: ASSET_PALETTE[index % ASSET_PALETTE.len()],
                    label,
                }
            })
            .collect();

        Self {
            mode,
            rows,
            total,
            total_label: format_balance(total),
        }
    }
}

/// What the allocation panel should show
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum AllocationPanel {
    Loading,
    Error {
        title: String,
        message: String,
    },
    Empty {
        title: String,
        message: String,
        sub_message: String,
    },
    Ready(AssetAllocation),
}

impl AllocationPanel {
    pub fn from_query(state: &QueryState<Vec<TokenBalance>>, mode: DisplayMode) -> Self {
        match state {
            QueryState::Loading => AllocationPanel::Loading,
            QueryState::Failed => AllocationPanel::Error {
                title: "Error Loading Assets".to_string(),
                message: "We encountered an error while retrieving your asset allocation."
                    .to_string(),
            },
            QueryState::Ready(tokens) if !tokens.is_empty() => {
                AllocationPanel::Ready(AssetAllocation::new(tokens, mode))
            }
            QueryState::Idle | QueryState::Ready(_) => AllocationPanel::Empty {
                title: "No Assets".to_string(),
                message: "You have no assets linked to this account".to_string(),
                sub_message: "Buy some assets to start building your portfolio on Tantei."
                    .to_string(),
            },
        }
    }
}

/// Thousands separators, at most two fraction digits: `1234.5` -> `1,234.5`
pub fn format_balance(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let fraction = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    match fraction {
        0 => format!("{}{}", sign, grouped),
        f if f % 10 == 0 => format!("{}{}.{}", sign, grouped, f / 10),
        f => format!("{}{}.{:02}", sign, grouped, f),
    }
}
