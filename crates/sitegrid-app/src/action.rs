// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::ids::RecordId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowAction {
    View,
    Edit,
    Flag,
    Delete,
    Approve,
    Reject,
    CreatePurchaseOrder,
    Resolve,
    Escalate,
    LogMaintenance,
}

impl RowAction {
    pub const ALL: [Self; 10] = [
        Self::View,
        Self::Edit,
        Self::Flag,
        Self::Delete,
        Self::Approve,
        Self::Reject,
        Self::CreatePurchaseOrder,
        Self::Resolve,
        Self::Escalate,
        Self::LogMaintenance,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Edit => "edit",
            Self::Flag => "flag",
            Self::Delete => "delete",
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::CreatePurchaseOrder => "create po",
            Self::Resolve => "resolve",
            Self::Escalate => "escalate",
            Self::LogMaintenance => "log maintenance",
        }
    }

    pub const fn key(self) -> char {
        match self {
            Self::View => 'v',
            Self::Edit => 'e',
            Self::Flag => 'n',
            Self::Delete => 'd',
            Self::Approve => 'A',
            Self::Reject => 'R',
            Self::CreatePurchaseOrder => 'P',
            Self::Resolve => 'r',
            Self::Escalate => '!',
            Self::LogMaintenance => 'm',
        }
    }

    pub fn from_key(key: char) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.key() == key)
    }

    /// Destructive actions go through a y/n prompt first.
    pub const fn requires_confirmation(self) -> bool {
        matches!(self, Self::Delete | Self::Reject)
    }
}

/// What the table hands back when a row action is invoked. The table never
/// applies it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowActionRequest {
    pub action: RowAction,
    pub record_id: RecordId,
    pub payload: Option<String>,
}

impl RowActionRequest {
    pub fn new(action: RowAction, record_id: RecordId) -> Self {
        Self {
            action,
            record_id,
            payload: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RowAction;

    #[test]
    fn keys_are_unique_and_resolve_back() {
        for action in RowAction::ALL {
            assert_eq!(RowAction::from_key(action.key()), Some(action));
        }
        assert_eq!(RowAction::from_key('z'), None);
    }

    #[test]
    fn only_destructive_actions_confirm() {
        let confirmed: Vec<RowAction> = RowAction::ALL
            .into_iter()
            .filter(|action| action.requires_confirmation())
            .collect();
        assert_eq!(confirmed, vec![RowAction::Delete, RowAction::Reject]);
    }
}
