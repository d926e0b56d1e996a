// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use sitegrid_app::{
    ALL_SENTINEL, Equipment, EquipmentStatus, FilterOption, FilterSelection, FormRecord,
    FormSchema, INVENTORY_CATEGORIES, INVENTORY_LOCATIONS, InventoryItem, IssuePriority,
    IssueStatus, MaintenanceEntry, MaintenanceKind, MaterialRequest, PageKind, PoStatus, Priority,
    PurchaseOrder, Record, RecordId, RequestStatus, RowAction, SiteIssue, SiteTask, TASK_PHASES,
    TaskStatus, Transfer, TransferStatus, Urgency, format_money,
};

use crate::table::{
    self, ColumnSpec, ExportSheet, TableCell, TableProjection, TableSpec, TableUiState, Tone,
};

const FLAG_MARK: &str = "⚑";

/// Rows of the active page as handed over by the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageSnapshot {
    PurchaseOrders(Vec<PurchaseOrder>),
    MaterialRequests(Vec<MaterialRequest>),
    Inventory(Vec<InventoryItem>),
    Transfers(Vec<Transfer>),
    Issues(Vec<SiteIssue>),
    Tasks(Vec<SiteTask>),
    Equipment(Vec<Equipment>),
    Maintenance(Vec<MaintenanceEntry>),
}

macro_rules! with_spec {
    ($snapshot:expr, |$records:ident, $spec:ident| $body:expr) => {
        match $snapshot {
            PageSnapshot::PurchaseOrders($records) => {
                let $spec = purchase_order_spec();
                $body
            }
            PageSnapshot::MaterialRequests($records) => {
                let $spec = material_request_spec();
                $body
            }
            PageSnapshot::Inventory($records) => {
                let $spec = inventory_spec();
                $body
            }
            PageSnapshot::Transfers($records) => {
                let $spec = transfer_spec();
                $body
            }
            PageSnapshot::Issues($records) => {
                let $spec = issue_spec();
                $body
            }
            PageSnapshot::Tasks($records) => {
                let $spec = task_spec();
                $body
            }
            PageSnapshot::Equipment($records) => {
                let $spec = equipment_spec();
                $body
            }
            PageSnapshot::Maintenance($records) => {
                let $spec = maintenance_spec();
                $body
            }
        }
    };
}

impl PageSnapshot {
    pub fn page(&self) -> PageKind {
        match self {
            Self::PurchaseOrders(_) => PageKind::PurchaseOrders,
            Self::MaterialRequests(_) => PageKind::MaterialRequests,
            Self::Inventory(_) => PageKind::Inventory,
            Self::Transfers(_) => PageKind::Transfers,
            Self::Issues(_) => PageKind::Issues,
            Self::Tasks(_) => PageKind::Tasks,
            Self::Equipment(_) => PageKind::Equipment,
            Self::Maintenance(_) => PageKind::Maintenance,
        }
    }

    pub fn len(&self) -> usize {
        self.ids().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ids(&self) -> Vec<RecordId> {
        with_spec!(self, |records, _spec| ids_of(records))
    }

    pub fn projection(&self, ui: &TableUiState) -> TableProjection {
        with_spec!(self, |records, spec| table::project(records, &spec, ui))
    }

    pub fn export_sheet(&self, ui: &TableUiState) -> ExportSheet {
        with_spec!(self, |records, spec| table::export_sheet(records, &spec, ui))
    }

    pub fn filter_options(&self) -> Vec<FilterOption> {
        with_spec!(self, |_records, spec| spec.filters)
    }

    pub fn actions(&self) -> &'static [RowAction] {
        actions_for(self.page())
    }

    pub fn detail(&self, id: &RecordId) -> Option<Vec<(String, String)>> {
        with_spec!(self, |records, spec| records
            .iter()
            .find(|record| record.id() == id)
            .map(|record| table::render_detail(spec.detail, record)))
    }

    pub fn label_of(&self, id: &RecordId) -> String {
        with_spec!(self, |records, _spec| records
            .iter()
            .find(|record| record.id() == id)
            .map_or_else(|| id.to_string(), record_label))
    }
}

fn ids_of<R: Record>(records: &[R]) -> Vec<RecordId> {
    records.iter().map(|record| record.id().clone()).collect()
}

fn record_label<R: Record>(record: &R) -> String {
    ["po_number", "request_number", "name", "title"]
        .into_iter()
        .find_map(|key| record.field(key))
        .map_or_else(|| record.id().to_string(), |value| value.display())
}

pub fn actions_for(page: PageKind) -> &'static [RowAction] {
    match page {
        PageKind::PurchaseOrders
        | PageKind::Inventory
        | PageKind::Transfers
        | PageKind::Tasks => &[
            RowAction::View,
            RowAction::Edit,
            RowAction::Flag,
            RowAction::Delete,
        ],
        PageKind::MaterialRequests => &[
            RowAction::View,
            RowAction::Edit,
            RowAction::Approve,
            RowAction::Reject,
            RowAction::CreatePurchaseOrder,
            RowAction::Delete,
        ],
        PageKind::Issues => &[
            RowAction::View,
            RowAction::Resolve,
            RowAction::Escalate,
            RowAction::Reject,
            RowAction::Delete,
        ],
        PageKind::Equipment => &[
            RowAction::View,
            RowAction::Edit,
            RowAction::Flag,
            RowAction::LogMaintenance,
            RowAction::Delete,
        ],
        PageKind::Maintenance => &[RowAction::View, RowAction::Edit, RowAction::Delete],
    }
}

pub fn schema_for(page: PageKind) -> &'static FormSchema {
    match page {
        PageKind::PurchaseOrders => PurchaseOrder::schema(),
        PageKind::MaterialRequests => MaterialRequest::schema(),
        PageKind::Inventory => InventoryItem::schema(),
        PageKind::Transfers => Transfer::schema(),
        PageKind::Issues => SiteIssue::schema(),
        PageKind::Tasks => SiteTask::schema(),
        PageKind::Equipment => Equipment::schema(),
        PageKind::Maintenance => MaintenanceEntry::schema(),
    }
}

fn flag_cell(flagged: bool) -> TableCell {
    if flagged {
        TableCell::badge(FLAG_MARK, Tone::Warn)
    } else {
        TableCell::plain("")
    }
}

fn priority_tone(priority: Priority) -> Tone {
    match priority {
        Priority::Low => Tone::Muted,
        Priority::Medium => Tone::Plain,
        Priority::High => Tone::Warn,
        Priority::Urgent => Tone::Bad,
    }
}

fn purchase_order_spec() -> TableSpec<PurchaseOrder> {
    TableSpec {
        columns: vec![
            ColumnSpec::custom("is_flagged", "", |order| Ok(flag_cell(order.is_flagged))),
            ColumnSpec::text("po_number", "po #"),
            ColumnSpec::text("vendor", "vendor"),
            ColumnSpec::text("items", "items"),
            ColumnSpec::text("total_amount", "total"),
            ColumnSpec::text("expected_delivery", "delivery"),
            ColumnSpec::badge("status", "status", |order| {
                let tone = match order.status {
                    PoStatus::Draft => Tone::Muted,
                    PoStatus::Sent | PoStatus::Acknowledged => Tone::Plain,
                    PoStatus::Delivered | PoStatus::Invoiced => Tone::Warn,
                    PoStatus::Paid => Tone::Good,
                };
                Ok(TableCell::badge(order.status.as_str(), tone))
            }),
            ColumnSpec::badge("priority", "priority", |order| {
                Ok(TableCell::badge(
                    order.priority.as_str(),
                    priority_tone(order.priority),
                ))
            }),
            ColumnSpec::actions(),
        ],
        filters: vec![
            FilterOption::single("status", "status", PoStatus::VALUES),
            FilterOption::single("priority", "priority", Priority::VALUES),
        ],
        search_keys: &["po_number", "vendor", "items", "project"],
        detail: |order| {
            Ok(vec![
                ("po number", order.po_number.clone()),
                ("vendor", order.vendor.clone()),
                ("items", order.items.clone()),
                ("project", order.project.clone()),
                ("total", format_money(order.total_amount)),
                ("ordered", order.order_date.to_string()),
                ("expected", order.expected_delivery.to_string()),
            ])
        },
        actions: actions_for(PageKind::PurchaseOrders),
    }
}

fn material_request_spec() -> TableSpec<MaterialRequest> {
    TableSpec {
        columns: vec![
            ColumnSpec::custom("is_flagged", "", |request| Ok(flag_cell(request.is_flagged))),
            ColumnSpec::text("request_number", "request #"),
            ColumnSpec::text("requested_by", "requested by"),
            ColumnSpec::custom("items", "items", |request| {
                Ok(TableCell::plain(format!(
                    "{} ({} {})",
                    request.items, request.quantity, request.unit
                )))
            }),
            ColumnSpec::text("required_date", "required"),
            ColumnSpec::badge("status", "status", |request| {
                let tone = match request.status {
                    RequestStatus::Pending => Tone::Warn,
                    RequestStatus::Approved => Tone::Good,
                    RequestStatus::Ordered | RequestStatus::Delivered => Tone::Plain,
                };
                Ok(TableCell::badge(request.status.as_str(), tone))
            }),
            ColumnSpec::badge("urgency", "urgency", |request| {
                let tone = match request.urgency {
                    Urgency::Normal => Tone::Plain,
                    Urgency::Urgent => Tone::Warn,
                    Urgency::Emergency => Tone::Bad,
                };
                Ok(TableCell::badge(request.urgency.as_str(), tone))
            }),
            ColumnSpec::actions(),
        ],
        filters: vec![
            FilterOption::single("status", "status", RequestStatus::VALUES),
            FilterOption::single("urgency", "urgency", Urgency::VALUES),
        ],
        search_keys: &["request_number", "requested_by", "items", "project"],
        detail: |request| {
            Ok(vec![
                ("request number", request.request_number.clone()),
                ("requested by", request.requested_by.clone()),
                (
                    "quantity",
                    format!("{} {}", request.quantity, request.unit),
                ),
                ("project", request.project.clone()),
                ("requested", request.request_date.to_string()),
                ("required by", request.required_date.to_string()),
            ])
        },
        actions: actions_for(PageKind::MaterialRequests),
    }
}

fn inventory_spec() -> TableSpec<InventoryItem> {
    TableSpec {
        columns: vec![
            ColumnSpec::custom("is_flagged", "", |item| Ok(flag_cell(item.is_flagged))),
            ColumnSpec::text("name", "item"),
            ColumnSpec::badge("category", "category", |item| {
                Ok(TableCell::badge(item.categories.join(", "), Tone::Muted))
            }),
            ColumnSpec::custom("quantity", "quantity", |item| {
                let tone = if item.is_low_stock() {
                    Tone::Bad
                } else {
                    Tone::Plain
                };
                Ok(TableCell::badge(
                    format!("{} {}", item.quantity, item.unit),
                    tone,
                ))
            }),
            ColumnSpec::text("location", "location"),
            ColumnSpec::text("last_updated", "updated"),
            ColumnSpec::badge("stock", "stock", |item| {
                Ok(if item.is_low_stock() {
                    TableCell::badge("low stock", Tone::Bad)
                } else {
                    TableCell::badge("in stock", Tone::Good)
                })
            }),
            ColumnSpec::actions(),
        ],
        filters: vec![
            FilterOption::single("location", "location", INVENTORY_LOCATIONS),
            FilterOption::multiple("category", "category", INVENTORY_CATEGORIES),
        ],
        search_keys: &["name", "category", "primary_supplier"],
        detail: |item| {
            Ok(vec![
                ("id", item.id.to_string()),
                ("categories", item.categories.join(", ")),
                ("reorder level", item.reorder_level.to_string()),
                ("max stock", item.max_stock.to_string()),
                ("safety stock", item.safety_stock.to_string()),
                ("supplier", item.primary_supplier.clone()),
                ("unit cost", format_money(item.unit_cost)),
                (
                    "stock value",
                    format_money(item.unit_cost.saturating_mul(item.quantity)),
                ),
            ])
        },
        actions: actions_for(PageKind::Inventory),
    }
}

fn transfer_spec() -> TableSpec<Transfer> {
    TableSpec {
        columns: vec![
            ColumnSpec::custom("is_flagged", "", |transfer| Ok(flag_cell(transfer.is_flagged))),
            ColumnSpec::text("id", "id"),
            ColumnSpec::text("from", "from"),
            ColumnSpec::text("to", "to"),
            ColumnSpec::text("items", "items"),
            ColumnSpec::badge("status", "status", |transfer| {
                let tone = match transfer.status {
                    TransferStatus::Pending => Tone::Warn,
                    TransferStatus::InTransit => Tone::Plain,
                    TransferStatus::Delivered => Tone::Good,
                };
                Ok(TableCell::badge(transfer.status.as_str(), tone))
            }),
            ColumnSpec::text("driver", "driver"),
            ColumnSpec::text("eta", "eta"),
            ColumnSpec::actions(),
        ],
        filters: vec![FilterOption::single(
            "status",
            "status",
            TransferStatus::VALUES,
        )],
        search_keys: &["id", "from", "to", "driver"],
        detail: |transfer| {
            Ok(vec![
                ("route", format!("{} → {}", transfer.from, transfer.to)),
                ("items", transfer.items.to_string()),
                ("driver", transfer.driver.clone()),
                ("eta", transfer.eta.clone()),
            ])
        },
        actions: actions_for(PageKind::Transfers),
    }
}

fn issue_spec() -> TableSpec<SiteIssue> {
    TableSpec {
        columns: vec![
            ColumnSpec::text("id", "id"),
            ColumnSpec::text("title", "issue"),
            ColumnSpec::badge("priority", "priority", |issue| {
                let tone = match issue.priority {
                    IssuePriority::Low => Tone::Muted,
                    IssuePriority::Medium => Tone::Plain,
                    IssuePriority::High => Tone::Warn,
                    IssuePriority::Critical => Tone::Bad,
                };
                Ok(TableCell::badge(issue.priority.as_str(), tone))
            }),
            ColumnSpec::badge("status", "status", |issue| {
                let tone = match issue.status {
                    IssueStatus::Open => Tone::Warn,
                    IssueStatus::Resolved => Tone::Good,
                };
                Ok(TableCell::badge(issue.status.as_str(), tone))
            }),
            ColumnSpec::text("reported_by", "reported by"),
            ColumnSpec::text("raised_on", "raised"),
            ColumnSpec::actions(),
        ],
        filters: vec![
            FilterOption::single("status", "status", IssueStatus::VALUES),
            FilterOption::single("priority", "priority", IssuePriority::VALUES),
        ],
        search_keys: &["title", "reported_by"],
        detail: |issue| {
            Ok(vec![
                ("title", issue.title.clone()),
                ("reported by", issue.reported_by.clone()),
                ("raised on", issue.raised_on.to_string()),
            ])
        },
        actions: actions_for(PageKind::Issues),
    }
}

fn task_spec() -> TableSpec<SiteTask> {
    TableSpec {
        columns: vec![
            ColumnSpec::custom("is_flagged", "", |task| Ok(flag_cell(task.is_flagged))),
            ColumnSpec::text("name", "task"),
            ColumnSpec::text("phase", "phase"),
            ColumnSpec::text("assigned_to", "assigned to"),
            ColumnSpec::text("due_date", "due"),
            ColumnSpec::custom("progress", "progress", |task| {
                Ok(TableCell::plain(format!("{}%", task.progress)))
            }),
            ColumnSpec::badge("status", "status", |task| {
                let tone = match task.status {
                    TaskStatus::NotStarted => Tone::Muted,
                    TaskStatus::InProgress => Tone::Warn,
                    TaskStatus::Completed => Tone::Good,
                };
                Ok(TableCell::badge(task.status.as_str(), tone))
            }),
            ColumnSpec::actions(),
        ],
        filters: vec![
            FilterOption::single("status", "status", TaskStatus::VALUES),
            FilterOption::single("phase", "phase", TASK_PHASES),
        ],
        search_keys: &["name", "project", "assigned_to"],
        detail: |task| {
            let dependencies = if task.dependencies.is_empty() {
                "none".to_owned()
            } else {
                task.dependencies.join(", ")
            };
            Ok(vec![
                ("project", task.project.clone()),
                ("window", format!("{} → {}", task.start_date, task.due_date)),
                ("depends on", dependencies),
            ])
        },
        actions: actions_for(PageKind::Tasks),
    }
}

fn equipment_spec() -> TableSpec<Equipment> {
    TableSpec {
        columns: vec![
            ColumnSpec::custom("is_flagged", "", |equipment| Ok(flag_cell(equipment.is_flagged))),
            ColumnSpec::text("id", "id"),
            ColumnSpec::text("name", "equipment"),
            ColumnSpec::text("hours", "hours"),
            ColumnSpec::text("next_service", "next service"),
            ColumnSpec::badge("status", "status", |equipment| {
                let tone = match equipment.status {
                    EquipmentStatus::Active => Tone::Good,
                    EquipmentStatus::MaintenanceDue => Tone::Warn,
                    EquipmentStatus::Warning => Tone::Bad,
                    EquipmentStatus::Idle => Tone::Muted,
                };
                Ok(TableCell::badge(equipment.status.as_str(), tone))
            }),
            ColumnSpec::actions(),
        ],
        filters: vec![FilterOption::single(
            "status",
            "status",
            EquipmentStatus::VALUES,
        )],
        search_keys: &["id", "name"],
        detail: |equipment| {
            Ok(vec![
                ("running hours", equipment.hours.to_string()),
                ("next service", equipment.next_service.clone()),
                (
                    "last serviced",
                    equipment
                        .last_serviced
                        .map_or_else(|| "never".to_owned(), |date| date.to_string()),
                ),
            ])
        },
        actions: actions_for(PageKind::Equipment),
    }
}

fn maintenance_spec() -> TableSpec<MaintenanceEntry> {
    TableSpec {
        columns: vec![
            ColumnSpec::text("id", "id"),
            ColumnSpec::text("equipment", "equipment"),
            ColumnSpec::badge("kind", "type", |entry| {
                let tone = match entry.kind {
                    MaintenanceKind::Repair => Tone::Warn,
                    MaintenanceKind::Routine
                    | MaintenanceKind::Inspection
                    | MaintenanceKind::Calibration => Tone::Plain,
                };
                Ok(TableCell::badge(entry.kind.as_str(), tone))
            }),
            ColumnSpec::text("logged_on", "logged"),
            ColumnSpec::custom("next_service_hours", "next service", |entry| {
                Ok(TableCell::plain(format!("{}hrs", entry.next_service_hours)))
            }),
            ColumnSpec::actions(),
        ],
        filters: vec![FilterOption::single(
            "kind",
            "type",
            MaintenanceKind::VALUES,
        )],
        search_keys: &["equipment", "notes"],
        detail: |entry| {
            Ok(vec![
                ("equipment", entry.equipment_id.to_string()),
                ("notes", entry.notes.clone()),
            ])
        },
        actions: actions_for(PageKind::Maintenance),
    }
}

/// Filter-picker entries for a page: an "all" row per filter followed by its
/// options.
pub fn filter_entries(filters: &[FilterOption]) -> Vec<FilterEntry> {
    let mut entries = Vec::new();
    for filter in filters {
        entries.push(FilterEntry {
            key: filter.key,
            value: ALL_SENTINEL.to_owned(),
            multiple: filter.multiple,
        });
        for option in &filter.options {
            entries.push(FilterEntry {
                key: filter.key,
                value: option.clone(),
                multiple: filter.multiple,
            });
        }
    }
    entries
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterEntry {
    pub key: &'static str,
    pub value: String,
    pub multiple: bool,
}

impl FilterEntry {
    pub fn is_selected(&self, ui: &TableUiState) -> bool {
        match ui.filters.selection(self.key) {
            FilterSelection::All => self.value == ALL_SENTINEL,
            FilterSelection::One(value) => *value == self.value,
            FilterSelection::Any(values) => values.contains(&self.value),
        }
    }
}
