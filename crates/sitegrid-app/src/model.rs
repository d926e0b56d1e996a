// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use time::Date;

use crate::ids::RecordId;

/// A single field read off a record, typed enough for display, search, and
/// equality filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldValue {
    Text(String),
    Tags(Vec<String>),
    Integer(i64),
    /// Amount in paise.
    Money(i64),
    Date(Date),
    Flag(bool),
}

impl FieldValue {
    pub fn display(&self) -> String {
        match self {
            Self::Text(value) => value.clone(),
            Self::Tags(values) => values.join(", "),
            Self::Integer(value) => value.to_string(),
            Self::Money(paise) => format_money(*paise),
            Self::Date(value) => value.to_string(),
            Self::Flag(true) => "yes".to_owned(),
            Self::Flag(false) => "no".to_owned(),
        }
    }

    /// `needle` must already be lowercased.
    pub fn contains_text(&self, needle: &str) -> bool {
        match self {
            Self::Tags(values) => values
                .iter()
                .any(|value| value.to_lowercase().contains(needle)),
            other => other.display().to_lowercase().contains(needle),
        }
    }

    /// Equality for scalar fields, membership for multi-valued ones.
    pub fn matches_value(&self, wanted: &str) -> bool {
        match self {
            Self::Tags(values) => values.iter().any(|value| value == wanted),
            Self::Text(value) => value == wanted,
            other => other.display() == wanted,
        }
    }

    pub const fn is_multi_valued(&self) -> bool {
        matches!(self, Self::Tags(_))
    }
}

pub trait Record: Clone {
    fn id(&self) -> &RecordId;
    fn set_id(&mut self, id: RecordId);
    fn field(&self, key: &str) -> Option<FieldValue>;
}

pub trait Flaggable: Record {
    fn is_flagged(&self) -> bool;
    fn set_flagged(&mut self, flagged: bool);
}

macro_rules! choice_enum {
    ($name:ident { $($variant:ident => $value:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];
            pub const VALUES: &'static [&'static str] = &[$($value),+];

            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $value),+
                }
            }

            pub fn parse(value: &str) -> Option<Self> {
                match value {
                    $($value => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

choice_enum!(PoStatus {
    Draft => "draft",
    Sent => "sent",
    Acknowledged => "acknowledged",
    Delivered => "delivered",
    Invoiced => "invoiced",
    Paid => "paid",
});

choice_enum!(Priority {
    Low => "low",
    Medium => "medium",
    High => "high",
    Urgent => "urgent",
});

choice_enum!(RequestStatus {
    Pending => "pending",
    Approved => "approved",
    Ordered => "ordered",
    Delivered => "delivered",
});

choice_enum!(Urgency {
    Normal => "normal",
    Urgent => "urgent",
    Emergency => "emergency",
});

choice_enum!(TransferStatus {
    Pending => "pending",
    InTransit => "in_transit",
    Delivered => "delivered",
});

choice_enum!(IssueStatus {
    Open => "open",
    Resolved => "resolved",
});

choice_enum!(IssuePriority {
    Low => "low",
    Medium => "medium",
    High => "high",
    Critical => "critical",
});

choice_enum!(TaskStatus {
    NotStarted => "not_started",
    InProgress => "in_progress",
    Completed => "completed",
});

impl TaskStatus {
    /// Status implied by a progress percentage.
    pub const fn from_progress(progress: i64) -> Self {
        if progress >= 100 {
            Self::Completed
        } else if progress > 0 {
            Self::InProgress
        } else {
            Self::NotStarted
        }
    }
}

choice_enum!(EquipmentStatus {
    Active => "active",
    MaintenanceDue => "maintenance_due",
    Warning => "warning",
    Idle => "idle",
});

choice_enum!(MaintenanceKind {
    Routine => "routine",
    Repair => "repair",
    Inspection => "inspection",
    Calibration => "calibration",
});

pub const TASK_PHASES: &[&str] = &["Foundation", "Structure", "Roofing", "Finishing"];

pub const INVENTORY_CATEGORIES: &[&str] = &[
    "Construction Materials",
    "Tools & Equipment",
    "Safety Equipment",
    "Electrical Components",
    "Plumbing Materials",
    "HVAC Equipment",
    "Finishing Materials",
    "Hardware & Fasteners",
];

pub const INVENTORY_LOCATIONS: &[&str] = &[
    "Warehouse A",
    "Warehouse B",
    "Site Storage 1",
    "Site Storage 2",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PageKind {
    PurchaseOrders,
    MaterialRequests,
    Inventory,
    Transfers,
    Issues,
    Tasks,
    Equipment,
    Maintenance,
}

impl PageKind {
    pub const ALL: [Self; 8] = [
        Self::PurchaseOrders,
        Self::MaterialRequests,
        Self::Inventory,
        Self::Transfers,
        Self::Issues,
        Self::Tasks,
        Self::Equipment,
        Self::Maintenance,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::PurchaseOrders => "purchase orders",
            Self::MaterialRequests => "requests",
            Self::Inventory => "inventory",
            Self::Transfers => "transfers",
            Self::Issues => "issues",
            Self::Tasks => "tasks",
            Self::Equipment => "equipment",
            Self::Maintenance => "maintenance",
        }
    }

    pub const fn slug(self) -> &'static str {
        match self {
            Self::PurchaseOrders => "purchase-orders",
            Self::MaterialRequests => "material-requests",
            Self::Inventory => "inventory-items",
            Self::Transfers => "material-transfers",
            Self::Issues => "site-issues",
            Self::Tasks => "site-tasks",
            Self::Equipment => "equipment",
            Self::Maintenance => "maintenance-log",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|page| page.slug() == value || page.label() == value)
    }

    pub const fn entity_label(self) -> &'static str {
        match self {
            Self::PurchaseOrders => "purchase order",
            Self::MaterialRequests => "material request",
            Self::Inventory => "inventory item",
            Self::Transfers => "transfer",
            Self::Issues => "issue",
            Self::Tasks => "task",
            Self::Equipment => "equipment",
            Self::Maintenance => "maintenance entry",
        }
    }

    pub const fn id_prefix(self) -> &'static str {
        match self {
            Self::PurchaseOrders => "PO",
            Self::MaterialRequests => "MR",
            Self::Inventory => "INV",
            Self::Transfers => "TRF",
            Self::Issues => "ISS",
            Self::Tasks => "TSK",
            Self::Equipment => "EQ",
            Self::Maintenance => "MNT",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub id: RecordId,
    pub po_number: String,
    pub vendor: String,
    pub items: String,
    pub total_amount: i64,
    pub order_date: Date,
    pub expected_delivery: Date,
    pub status: PoStatus,
    pub priority: Priority,
    pub project: String,
    pub is_flagged: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialRequest {
    pub id: RecordId,
    pub request_number: String,
    pub requested_by: String,
    pub items: String,
    pub quantity: i64,
    pub unit: String,
    pub request_date: Date,
    pub required_date: Date,
    pub status: RequestStatus,
    pub project: String,
    pub urgency: Urgency,
    pub is_flagged: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: RecordId,
    pub name: String,
    pub categories: Vec<String>,
    pub quantity: i64,
    pub unit: String,
    pub location: String,
    pub last_updated: Date,
    pub reorder_level: i64,
    pub max_stock: i64,
    pub safety_stock: i64,
    pub primary_supplier: String,
    pub unit_cost: i64,
    pub is_flagged: bool,
}

impl InventoryItem {
    pub const fn is_low_stock(&self) -> bool {
        self.quantity <= self.reorder_level
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub id: RecordId,
    pub from: String,
    pub to: String,
    pub items: i64,
    pub status: TransferStatus,
    pub driver: String,
    pub eta: String,
    pub is_flagged: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteIssue {
    pub id: RecordId,
    pub title: String,
    pub priority: IssuePriority,
    pub status: IssueStatus,
    pub reported_by: String,
    pub raised_on: Date,
    pub is_flagged: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteTask {
    pub id: RecordId,
    pub name: String,
    pub project: String,
    pub assigned_to: String,
    pub start_date: Date,
    pub due_date: Date,
    pub status: TaskStatus,
    /// Percent complete, 0 to 100.
    pub progress: i64,
    pub phase: String,
    /// Ids of tasks that must finish first.
    pub dependencies: Vec<String>,
    pub is_flagged: bool,
}

impl SiteTask {
    pub fn set_progress(&mut self, progress: i64) {
        self.progress = progress.clamp(0, 100);
        self.status = TaskStatus::from_progress(self.progress);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipment {
    pub id: RecordId,
    pub name: String,
    /// Running hours on the meter.
    pub hours: i64,
    pub next_service: String,
    pub status: EquipmentStatus,
    pub last_serviced: Option<Date>,
    pub is_flagged: bool,
}

impl Equipment {
    /// A logged service puts the machine back in use until the next one.
    pub fn log_maintenance(&mut self, entry: &MaintenanceEntry) {
        self.status = EquipmentStatus::Active;
        self.next_service = format!("{}hrs", entry.next_service_hours);
        self.last_serviced = Some(entry.logged_on);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceEntry {
    pub id: RecordId,
    pub equipment_id: RecordId,
    pub kind: MaintenanceKind,
    pub notes: String,
    pub next_service_hours: i64,
    pub logged_on: Date,
    pub is_flagged: bool,
}

macro_rules! impl_flaggable {
    ($($name:ty),+) => {
        $(impl Flaggable for $name {
            fn is_flagged(&self) -> bool {
                self.is_flagged
            }

            fn set_flagged(&mut self, flagged: bool) {
                self.is_flagged = flagged;
            }
        })+
    };
}

impl_flaggable!(
    PurchaseOrder,
    MaterialRequest,
    InventoryItem,
    Transfer,
    SiteIssue,
    SiteTask,
    Equipment,
    MaintenanceEntry
);

fn text(value: &str) -> Option<FieldValue> {
    Some(FieldValue::Text(value.to_owned()))
}

impl Record for PurchaseOrder {
    fn id(&self) -> &RecordId {
        &self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn field(&self, key: &str) -> Option<FieldValue> {
        match key {
            "id" => text(self.id.as_str()),
            "po_number" => text(&self.po_number),
            "vendor" => text(&self.vendor),
            "items" => text(&self.items),
            "total_amount" => Some(FieldValue::Money(self.total_amount)),
            "order_date" => Some(FieldValue::Date(self.order_date)),
            "expected_delivery" => Some(FieldValue::Date(self.expected_delivery)),
            "status" => text(self.status.as_str()),
            "priority" => text(self.priority.as_str()),
            "project" => text(&self.project),
            "is_flagged" => Some(FieldValue::Flag(self.is_flagged)),
            _ => None,
        }
    }
}

impl Record for MaterialRequest {
    fn id(&self) -> &RecordId {
        &self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn field(&self, key: &str) -> Option<FieldValue> {
        match key {
            "id" => text(self.id.as_str()),
            "request_number" => text(&self.request_number),
            "requested_by" => text(&self.requested_by),
            "items" => text(&self.items),
            "quantity" => Some(FieldValue::Integer(self.quantity)),
            "unit" => text(&self.unit),
            "request_date" => Some(FieldValue::Date(self.request_date)),
            "required_date" => Some(FieldValue::Date(self.required_date)),
            "status" => text(self.status.as_str()),
            "project" => text(&self.project),
            "urgency" => text(self.urgency.as_str()),
            "is_flagged" => Some(FieldValue::Flag(self.is_flagged)),
            _ => None,
        }
    }
}

impl Record for InventoryItem {
    fn id(&self) -> &RecordId {
        &self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn field(&self, key: &str) -> Option<FieldValue> {
        match key {
            "id" => text(self.id.as_str()),
            "name" => text(&self.name),
            "category" => Some(FieldValue::Tags(self.categories.clone())),
            "quantity" => Some(FieldValue::Integer(self.quantity)),
            "unit" => text(&self.unit),
            "location" => text(&self.location),
            "last_updated" => Some(FieldValue::Date(self.last_updated)),
            "reorder_level" => Some(FieldValue::Integer(self.reorder_level)),
            "max_stock" => Some(FieldValue::Integer(self.max_stock)),
            "safety_stock" => Some(FieldValue::Integer(self.safety_stock)),
            "primary_supplier" => text(&self.primary_supplier),
            "unit_cost" => Some(FieldValue::Money(self.unit_cost)),
            "is_flagged" => Some(FieldValue::Flag(self.is_flagged)),
            _ => None,
        }
    }
}

impl Record for Transfer {
    fn id(&self) -> &RecordId {
        &self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn field(&self, key: &str) -> Option<FieldValue> {
        match key {
            "id" => text(self.id.as_str()),
            "from" => text(&self.from),
            "to" => text(&self.to),
            "items" => Some(FieldValue::Integer(self.items)),
            "status" => text(self.status.as_str()),
            "driver" => text(&self.driver),
            "eta" => text(&self.eta),
            "is_flagged" => Some(FieldValue::Flag(self.is_flagged)),
            _ => None,
        }
    }
}

impl Record for SiteIssue {
    fn id(&self) -> &RecordId {
        &self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn field(&self, key: &str) -> Option<FieldValue> {
        match key {
            "id" => text(self.id.as_str()),
            "title" => text(&self.title),
            "priority" => text(self.priority.as_str()),
            "status" => text(self.status.as_str()),
            "reported_by" => text(&self.reported_by),
            "raised_on" => Some(FieldValue::Date(self.raised_on)),
            "is_flagged" => Some(FieldValue::Flag(self.is_flagged)),
            _ => None,
        }
    }
}

impl Record for SiteTask {
    fn id(&self) -> &RecordId {
        &self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn field(&self, key: &str) -> Option<FieldValue> {
        match key {
            "id" => text(self.id.as_str()),
            "name" => text(&self.name),
            "project" => text(&self.project),
            "assigned_to" => text(&self.assigned_to),
            "start_date" => Some(FieldValue::Date(self.start_date)),
            "due_date" => Some(FieldValue::Date(self.due_date)),
            "status" => text(self.status.as_str()),
            "progress" => Some(FieldValue::Integer(self.progress)),
            "phase" => text(&self.phase),
            "dependencies" => Some(FieldValue::Tags(self.dependencies.clone())),
            "is_flagged" => Some(FieldValue::Flag(self.is_flagged)),
            _ => None,
        }
    }
}

impl Record for Equipment {
    fn id(&self) -> &RecordId {
        &self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn field(&self, key: &str) -> Option<FieldValue> {
        match key {
            "id" => text(self.id.as_str()),
            "name" => text(&self.name),
            "hours" => Some(FieldValue::Integer(self.hours)),
            "next_service" => text(&self.next_service),
            "status" => text(self.status.as_str()),
            "last_serviced" => self.last_serviced.map(FieldValue::Date),
            "is_flagged" => Some(FieldValue::Flag(self.is_flagged)),
            _ => None,
        }
    }
}

impl Record for MaintenanceEntry {
    fn id(&self) -> &RecordId {
        &self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn field(&self, key: &str) -> Option<FieldValue> {
        match key {
            "id" => text(self.id.as_str()),
            "equipment" => text(self.equipment_id.as_str()),
            "kind" => text(self.kind.as_str()),
            "notes" => text(&self.notes),
            "next_service_hours" => Some(FieldValue::Integer(self.next_service_hours)),
            "logged_on" => Some(FieldValue::Date(self.logged_on)),
            "is_flagged" => Some(FieldValue::Flag(self.is_flagged)),
            _ => None,
        }
    }
}

pub fn format_money(paise: i64) -> String {
    let sign = if paise < 0 { "-" } else { "" };
    let paise = paise.unsigned_abs();
    format!("{sign}₹{}.{:02}", group_thousands(paise / 100), paise % 100)
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}
