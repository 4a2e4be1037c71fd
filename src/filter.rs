use std::collections::BTreeSet;

use serde::Serialize;

use crate::models::CampaignRecord;
use crate::period::DateWindow;

/// Categorical inclusion filters. An empty set leaves its dimension unrestricted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterSet {
    pub campaign_names: BTreeSet<String>,
    pub recipient_ids: BTreeSet<String>,
    pub email_types: BTreeSet<String>,
    pub messages: BTreeSet<String>,
    pub variants: BTreeSet<String>,
}

impl FilterSet {
    pub fn with_campaigns<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.campaign_names.extend(values.into_iter().map(Into::into));
        self
    }

    pub fn with_recipients<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.recipient_ids.extend(values.into_iter().map(Into::into));
        self
    }

    pub fn with_email_types<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.email_types.extend(values.into_iter().map(Into::into));
        self
    }

    pub fn with_messages<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.messages.extend(values.into_iter().map(Into::into));
        self
    }

    pub fn with_variants<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.variants.extend(values.into_iter().map(Into::into));
        self
    }

    pub fn is_unrestricted(&self) -> bool {
        self.campaign_names.is_empty()
            && self.recipient_ids.is_empty()
            && self.email_types.is_empty()
            && self.messages.is_empty()
            && self.variants.is_empty()
    }

    pub fn matches(&self, record: &CampaignRecord) -> bool {
        allows(&self.campaign_names, &record.campaign_name)
            && allows(&self.recipient_ids, &record.recipient_id)
            && allows(&self.email_types, &record.email_type)
            && allows(&self.messages, &record.message)
            && allows(&self.variants, &record.variant)
    }
}

fn allows(selected: &BTreeSet<String>, value: &str) -> bool {
    selected.is_empty() || selected.contains(value)
}

pub fn filter_records(
    records: &[CampaignRecord],
    window: &DateWindow,
    filters: &FilterSet,
) -> Vec<CampaignRecord> {
    records
        .iter()
        .filter(|record| window.contains(record.send_date) && filters.matches(record))
        .cloned()
        .collect()
}

/// Distinct values per dimension, sorted, for populating filter pickers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub campaign_names: Vec<String>,
    pub recipient_ids: Vec<String>,
    pub email_types: Vec<String>,
    pub messages: Vec<String>,
    pub variants: Vec<String>,
}

impl FilterOptions {
    pub fn from_records(records: &[CampaignRecord]) -> Self {
        fn distinct<'a>(values: impl Iterator<Item = &'a String>) -> Vec<String> {
            values
                .cloned()
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect()
        }

        Self {
            campaign_names: distinct(records.iter().map(|r| &r.campaign_name)),
            recipient_ids: distinct(records.iter().map(|r| &r.recipient_id)),
            email_types: distinct(records.iter().map(|r| &r.email_type)),
            messages: distinct(records.iter().map(|r| &r.message)),
            variants: distinct(records.iter().map(|r| &r.variant)),
        }
    }
}
