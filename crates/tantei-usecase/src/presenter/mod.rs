//! View models - Plain data a renderer can display without further logic
//!
//! Nothing here fetches or mutates. Inputs are DTOs the caller already has.

pub mod agent_card;
pub mod allocation;

pub use agent_card::{format_time_since, AgentCardView};
pub use allocation::{
    format_balance, AllocationPanel, AllocationRow, AssetAllocation, DisplayMode, QueryState,
    ASSET_PALETTE,
};
