//! Digest subscriptions behind an injected repository

use crate::digest::Period;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    #[error("Invalid email address: {0}")]
    InvalidEmail(String),
    #[error("frequency must be one of: daily, weekly, monthly (got {0:?})")]
    InvalidFrequency(String),
    #[error("No subscription for {0}")]
    NotFound(String),
}

/// How often a subscriber receives the digest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    #[default]
    Weekly,
    Monthly,
}

impl Frequency {
    /// The digest period covered by one delivery
    pub fn period(&self) -> Period {
        match self {
            Frequency::Daily => Period::Day,
            Frequency::Weekly => Period::Week,
            Frequency::Monthly => Period::Month,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
        }
    }
}

impl FromStr for Frequency {
    type Err = SubscriptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            _ => Err(SubscriptionError::InvalidFrequency(s.to_string())),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub email: String,
    pub frequency: Frequency,
    /// User id of whoever created the subscription
    pub owner: u64,
}

impl Subscription {
    /// Build a subscription, normalizing and checking the address
    pub fn new(email: &str, frequency: Frequency, owner: u64) -> Result<Self, SubscriptionError> {
        let email = email.trim().to_ascii_lowercase();
        let valid = match email.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
            }
            None => false,
        };
        if !valid || email.chars().any(char::is_whitespace) {
            return Err(SubscriptionError::InvalidEmail(email));
        }

        Ok(Self {
            email,
            frequency,
            owner,
        })
    }
}

/// Storage for subscriptions, keyed by email address
pub trait SubscriptionRepository {
    fn list(&self) -> Vec<Subscription>;
    fn get(&self, email: &str) -> Option<Subscription>;
    /// Insert or replace; the last write for an address wins
    fn upsert(&self, subscription: Subscription);
    fn delete(&self, email: &str) -> Result<Subscription, SubscriptionError>;
}

/// Subscriptions a scheduler should deliver for one frequency
pub fn subscriptions_due(repo: &dyn SubscriptionRepository, frequency: Frequency) -> Vec<Subscription> {
    repo.list()
        .into_iter()
        .filter(|s| s.frequency == frequency)
        .collect()
}

/// In-memory repository, kept in insertion order
#[derive(Debug, Default)]
pub struct MemorySubscriptions {
    entries: RefCell<Vec<Subscription>>,
}

impl MemorySubscriptions {
    pub fn new() -> Self {
        Self::default()
    }
}

fn same_address(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

impl SubscriptionRepository for MemorySubscriptions {
    fn list(&self) -> Vec<Subscription> {
        self.entries.borrow().clone()
    }

    fn get(&self, email: &str) -> Option<Subscription> {
        self.entries
            .borrow()
            .iter()
            .find(|s| same_address(&s.email, email))
            .cloned()
    }

    fn upsert(&self, subscription: Subscription) {
        let mut entries = self.entries.borrow_mut();
        match entries
            .iter()
            .position(|s| same_address(&s.email, &subscription.email))
        {
            Some(i) => entries[i] = subscription,
            None => entries.push(subscription),
        }
    }

    fn delete(&self, email: &str) -> Result<Subscription, SubscriptionError> {
        let mut entries = self.entries.borrow_mut();
        let position = entries
            .iter()
            .position(|s| same_address(&s.email, email))
            .ok_or_else(|| SubscriptionError::NotFound(email.to_string()))?;
        Ok(entries.remove(position))
    }
}
