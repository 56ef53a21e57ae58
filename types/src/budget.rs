//! Per-nullifier daily action budget.
//!
//! The budget ledger is keyed by nullifier and UTC calendar date
//! (`YYYY-MM-DD`); usage counters reset implicitly at day boundaries because
//! stale-dated usage entries count as zero.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// The eight rate-limited action classes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BudgetActionKey {
    PostsPerDay,
    CommentsPerDay,
    SentimentVotesPerDay,
    GovernanceVotesPerDay,
    ModerationPerDay,
    AnalysesPerDay,
    CivicActionsPerDay,
    SharesPerDay,
}

impl BudgetActionKey {
    pub const ALL: [Self; 8] = [
        Self::PostsPerDay,
        Self::CommentsPerDay,
        Self::SentimentVotesPerDay,
        Self::GovernanceVotesPerDay,
        Self::ModerationPerDay,
        Self::AnalysesPerDay,
        Self::CivicActionsPerDay,
        Self::SharesPerDay,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::PostsPerDay => "posts/day",
            Self::CommentsPerDay => "comments/day",
            Self::SentimentVotesPerDay => "sentiment_votes/day",
            Self::GovernanceVotesPerDay => "governance_votes/day",
            Self::ModerationPerDay => "moderation/day",
            Self::AnalysesPerDay => "analyses/day",
            Self::CivicActionsPerDay => "civic_actions/day",
            Self::SharesPerDay => "shares/day",
        }
    }

    pub fn parse(value: &str) -> Result<Self, BudgetError> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == value)
            .ok_or_else(|| BudgetError::UnknownActionKey(value.to_owned()))
    }
}

impl fmt::Display for BudgetActionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for BudgetActionKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for BudgetActionKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BudgetError {
    #[error("unknown budget action key: {0}")]
    UnknownActionKey(String),

    #[error("invalid budget date (expected YYYY-MM-DD): {0}")]
    InvalidDate(String),

    #[error("nullifier must be non-empty")]
    EmptyNullifier,

    #[error("topic count keys must be non-empty")]
    EmptyTopicKey,

    #[error("daily limit exhausted for {0}")]
    Exhausted(BudgetActionKey),
}

/// A configured daily ceiling for one action class.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BudgetLimit {
    pub action_key: BudgetActionKey,
    pub daily_limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_topic_cap: Option<u32>,
}

/// Usage accrued for one action class on one UTC calendar day.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DailyUsage {
    pub action_key: BudgetActionKey,
    pub count: u32,
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic_counts: Option<BTreeMap<String, u32>>,
}

impl DailyUsage {
    pub fn validate(&self) -> Result<(), BudgetError> {
        validate_date(&self.date)?;
        if let Some(counts) = &self.topic_counts {
            if counts.keys().any(|k| k.is_empty()) {
                return Err(BudgetError::EmptyTopicKey);
            }
        }
        Ok(())
    }
}

/// The full budget state for one nullifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NullifierBudget {
    pub nullifier: String,
    pub limits: Vec<BudgetLimit>,
    pub usage: Vec<DailyUsage>,
    pub date: String,
}

/// Season-0 launch defaults for all eight action classes.
pub fn season_0_defaults() -> Vec<BudgetLimit> {
    fn limit(action_key: BudgetActionKey, daily_limit: u32) -> BudgetLimit {
        BudgetLimit {
            action_key,
            daily_limit,
            per_topic_cap: None,
        }
    }

    vec![
        limit(BudgetActionKey::PostsPerDay, 20),
        limit(BudgetActionKey::CommentsPerDay, 50),
        limit(BudgetActionKey::SentimentVotesPerDay, 200),
        limit(BudgetActionKey::GovernanceVotesPerDay, 20),
        limit(BudgetActionKey::ModerationPerDay, 10),
        BudgetLimit {
            action_key: BudgetActionKey::AnalysesPerDay,
            daily_limit: 25,
            per_topic_cap: Some(5),
        },
        limit(BudgetActionKey::CivicActionsPerDay, 3),
        limit(BudgetActionKey::SharesPerDay, 10),
    ]
}

impl NullifierBudget {
    /// A fresh ledger with Season-0 defaults and no usage.
    pub fn season_0(nullifier: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            nullifier: nullifier.into(),
            limits: season_0_defaults(),
            usage: Vec::new(),
            date: date.into(),
        }
    }

    pub fn validate(&self) -> Result<(), BudgetError> {
        if self.nullifier.trim().is_empty() {
            return Err(BudgetError::EmptyNullifier);
        }
        validate_date(&self.date)?;
        for usage in &self.usage {
            usage.validate()?;
        }
        Ok(())
    }

    pub fn limit_for(&self, action: BudgetActionKey) -> Option<&BudgetLimit> {
        self.limits.iter().find(|l| l.action_key == action)
    }

    /// Usage counted for `action` on `today`; entries for other dates are
    /// stale and count as zero.
    pub fn usage_for(&self, action: BudgetActionKey, today: &str) -> u32 {
        self.usage
            .iter()
            .filter(|u| u.action_key == action && u.date == today)
            .map(|u| u.count)
            .sum()
    }

    /// How many more `action`s are allowed today. Actions without a
    /// configured limit are unconstrained.
    pub fn remaining(&self, action: BudgetActionKey, today: &str) -> u32 {
        match self.limit_for(action) {
            Some(limit) => limit.daily_limit.saturating_sub(self.usage_for(action, today)),
            None => u32::MAX,
        }
    }

    /// Record one `action` against today's quota.
    pub fn charge(&mut self, action: BudgetActionKey, today: &str) -> Result<(), BudgetError> {
        validate_date(today)?;
        if self.remaining(action, today) == 0 {
            return Err(BudgetError::Exhausted(action));
        }
        self.date = today.to_owned();
        if let Some(entry) = self
            .usage
            .iter_mut()
            .find(|u| u.action_key == action && u.date == today)
        {
            entry.count = entry.count.saturating_add(1);
        } else {
            self.usage.push(DailyUsage {
                action_key: action,
                count: 1,
                date: today.to_owned(),
                topic_counts: None,
            });
        }
        Ok(())
    }
}

fn validate_date(value: &str) -> Result<(), BudgetError> {
    let bytes = value.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| matches!(i, 4 | 7) || b.is_ascii_digit());
    if well_formed {
        Ok(())
    } else {
        Err(BudgetError::InvalidDate(value.to_owned()))
    }
}
