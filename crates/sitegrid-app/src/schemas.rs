// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use time::{Date, Duration};

use crate::forms::{
    FieldError, FieldKind, FieldSpec, FormDraft, FormRecord, FormSchema, FormValues, money_input,
};
use crate::ids::RecordId;
use crate::model::{
    Equipment, EquipmentStatus, INVENTORY_CATEGORIES, INVENTORY_LOCATIONS, InventoryItem,
    IssuePriority, IssueStatus, MaintenanceEntry, MaintenanceKind, MaterialRequest, PoStatus,
    Priority, PurchaseOrder, RequestStatus, SiteIssue, SiteTask, TASK_PHASES, TaskStatus,
    Transfer, TransferStatus, Urgency,
};

const NAME: FieldKind = FieldKind::Text { min_len: 2 };
const SHORT: FieldKind = FieldKind::Text { min_len: 1 };
const COUNT: FieldKind = FieldKind::Integer { min: Some(0) };
const POSITIVE: FieldKind = FieldKind::Integer { min: Some(1) };
const AMOUNT: FieldKind = FieldKind::Money {
    allow_negative: false,
};
const LEAD_TIME: Duration = Duration::days(7);

/// Default due date for new orders and requests.
fn a_week_after(today: Date) -> Date {
    today.saturating_add(LEAD_TIME)
}

fn not_before(
    values: &FormValues,
    earlier: &str,
    later: &'static str,
    message: &str,
) -> Vec<(&'static str, FieldError)> {
    match (values.optional_date(earlier), values.optional_date(later)) {
        (Some(start), Some(end)) if end < start => {
            vec![(later, FieldError::Rule(message.to_owned()))]
        }
        _ => Vec::new(),
    }
}

static PURCHASE_ORDER_SCHEMA: FormSchema = FormSchema {
    title: "Purchase order",
    fields: &[
        FieldSpec::optional("po_number", "PO number", SHORT),
        FieldSpec::required("vendor", "Vendor", NAME),
        FieldSpec::required("items", "Items", NAME),
        FieldSpec::required("total_amount", "Total (₹)", AMOUNT),
        FieldSpec::required("order_date", "Order date", FieldKind::Date),
        FieldSpec::required("expected_delivery", "Expected delivery", FieldKind::Date),
        FieldSpec::required("status", "Status", FieldKind::Choice(PoStatus::VALUES)),
        FieldSpec::required("priority", "Priority", FieldKind::Choice(Priority::VALUES)),
        FieldSpec::required("project", "Project", NAME),
    ],
    check: Some(check_purchase_order),
};

fn check_purchase_order(values: &FormValues) -> Vec<(&'static str, FieldError)> {
    not_before(
        values,
        "order_date",
        "expected_delivery",
        "cannot be before the order date",
    )
}

impl FormRecord for PurchaseOrder {
    fn schema() -> &'static FormSchema {
        &PURCHASE_ORDER_SCHEMA
    }

    fn blank_draft(today: Date) -> FormDraft {
        FormDraft::default()
            .with("order_date", today.to_string())
            .with("expected_delivery", a_week_after(today).to_string())
            .with("status", PoStatus::Draft.as_str())
            .with("priority", Priority::Medium.as_str())
    }

    fn to_draft(&self) -> FormDraft {
        FormDraft::new(self.id.clone())
            .with("po_number", &self.po_number)
            .with("vendor", &self.vendor)
            .with("items", &self.items)
            .with("total_amount", money_input(self.total_amount))
            .with("order_date", self.order_date.to_string())
            .with("expected_delivery", self.expected_delivery.to_string())
            .with("status", self.status.as_str())
            .with("priority", self.priority.as_str())
            .with("project", &self.project)
    }

    fn from_values(id: RecordId, values: &FormValues) -> Result<Self> {
        Ok(Self {
            id,
            po_number: values.text("po_number"),
            vendor: values.text("vendor"),
            items: values.text("items"),
            total_amount: values.money("total_amount")?,
            order_date: values.date("order_date")?,
            expected_delivery: values.date("expected_delivery")?,
            status: values.choice("status", PoStatus::parse)?,
            priority: values.choice("priority", Priority::parse)?,
            project: values.text("project"),
            is_flagged: false,
        })
    }
}

static MATERIAL_REQUEST_SCHEMA: FormSchema = FormSchema {
    title: "Material request",
    fields: &[
        FieldSpec::optional("request_number", "Request number", SHORT),
        FieldSpec::required("requested_by", "Requested by", NAME),
        FieldSpec::required("items", "Items", NAME),
        FieldSpec::required("quantity", "Quantity", POSITIVE),
        FieldSpec::required("unit", "Unit", SHORT),
        FieldSpec::required("request_date", "Request date", FieldKind::Date),
        FieldSpec::required("required_date", "Required by", FieldKind::Date),
        FieldSpec::required("status", "Status", FieldKind::Choice(RequestStatus::VALUES)),
        FieldSpec::required("project", "Project", NAME),
        FieldSpec::required("urgency", "Urgency", FieldKind::Choice(Urgency::VALUES)),
    ],
    check: Some(check_material_request),
};

fn check_material_request(values: &FormValues) -> Vec<(&'static str, FieldError)> {
    not_before(
        values,
        "request_date",
        "required_date",
        "cannot be before the request date",
    )
}

impl FormRecord for MaterialRequest {
    fn schema() -> &'static FormSchema {
        &MATERIAL_REQUEST_SCHEMA
    }

    fn blank_draft(today: Date) -> FormDraft {
        FormDraft::default()
            .with("request_date", today.to_string())
            .with("required_date", a_week_after(today).to_string())
            .with("status", RequestStatus::Pending.as_str())
            .with("urgency", Urgency::Normal.as_str())
    }

    fn to_draft(&self) -> FormDraft {
        FormDraft::new(self.id.clone())
            .with("request_number", &self.request_number)
            .with("requested_by", &self.requested_by)
            .with("items", &self.items)
            .with("quantity", self.quantity.to_string())
            .with("unit", &self.unit)
            .with("request_date", self.request_date.to_string())
            .with("required_date", self.required_date.to_string())
            .with("status", self.status.as_str())
            .with("project", &self.project)
            .with("urgency", self.urgency.as_str())
    }

    fn from_values(id: RecordId, values: &FormValues) -> Result<Self> {
        Ok(Self {
            id,
            request_number: values.text("request_number"),
            requested_by: values.text("requested_by"),
            items: values.text("items"),
            quantity: values.integer("quantity")?,
            unit: values.text("unit"),
            request_date: values.date("request_date")?,
            required_date: values.date("required_date")?,
            status: values.choice("status", RequestStatus::parse)?,
            project: values.text("project"),
            urgency: values.choice("urgency", Urgency::parse)?,
            is_flagged: false,
        })
    }
}

static INVENTORY_ITEM_SCHEMA: FormSchema = FormSchema {
    title: "Inventory item",
    fields: &[
        FieldSpec::required("name", "Item name", NAME),
        FieldSpec::required("category", "Category", FieldKind::Tags(INVENTORY_CATEGORIES)),
        FieldSpec::required("quantity", "Quantity", COUNT),
        FieldSpec::required("unit", "Unit", SHORT),
        FieldSpec::required("location", "Location", FieldKind::Choice(INVENTORY_LOCATIONS)),
        FieldSpec::required("reorder_level", "Reorder level", COUNT),
        FieldSpec::required("max_stock", "Max stock", COUNT),
        FieldSpec::optional("safety_stock", "Safety stock", COUNT),
        FieldSpec::optional("primary_supplier", "Primary supplier", NAME),
        FieldSpec::optional("unit_cost", "Unit cost (₹)", AMOUNT),
    ],
    check: Some(check_inventory_item),
};

fn check_inventory_item(values: &FormValues) -> Vec<(&'static str, FieldError)> {
    match (
        values.optional_integer("reorder_level"),
        values.optional_integer("max_stock"),
    ) {
        (Some(reorder), Some(max)) if max < reorder => vec![(
            "max_stock",
            FieldError::Rule("must be at least the reorder level".to_owned()),
        )],
        _ => Vec::new(),
    }
}

impl FormRecord for InventoryItem {
    fn schema() -> &'static FormSchema {
        &INVENTORY_ITEM_SCHEMA
    }

    fn blank_draft(_today: Date) -> FormDraft {
        FormDraft::default()
            .with("quantity", "0")
            .with("reorder_level", "0")
            .with("max_stock", "0")
    }

    fn to_draft(&self) -> FormDraft {
        let draft = FormDraft::new(self.id.clone())
            .with("name", &self.name)
            .with("category", self.categories.join(", "))
            .with("quantity", self.quantity.to_string())
            .with("unit", &self.unit)
            .with("location", &self.location)
            .with("reorder_level", self.reorder_level.to_string())
            .with("max_stock", self.max_stock.to_string())
            .with("safety_stock", self.safety_stock.to_string())
            .with("primary_supplier", &self.primary_supplier);
        if self.unit_cost > 0 {
            draft.with("unit_cost", money_input(self.unit_cost))
        } else {
            draft
        }
    }

    /// `last_updated` is stamped by the caller.
    fn from_values(id: RecordId, values: &FormValues) -> Result<Self> {
        Ok(Self {
            id,
            name: values.text("name"),
            categories: values.tags("category"),
            quantity: values.integer("quantity")?,
            unit: values.text("unit"),
            location: values.text("location"),
            last_updated: Date::MIN,
            reorder_level: values.integer("reorder_level")?,
            max_stock: values.integer("max_stock")?,
            safety_stock: values.optional_integer("safety_stock").unwrap_or(0),
            primary_supplier: values.text("primary_supplier"),
            unit_cost: values.optional_money("unit_cost").unwrap_or(0),
            is_flagged: false,
        })
    }
}

static TRANSFER_SCHEMA: FormSchema = FormSchema {
    title: "Transfer",
    fields: &[
        FieldSpec::required("from", "From", NAME),
        FieldSpec::required("to", "To", NAME),
        FieldSpec::required("items", "Items", POSITIVE),
        FieldSpec::required("status", "Status", FieldKind::Choice(TransferStatus::VALUES)),
        FieldSpec::required("driver", "Driver", NAME),
        FieldSpec::optional("eta", "ETA", SHORT),
    ],
    check: Some(check_transfer),
};

fn check_transfer(values: &FormValues) -> Vec<(&'static str, FieldError)> {
    let (from, to) = (values.text("from"), values.text("to"));
    if !from.is_empty() && from.eq_ignore_ascii_case(&to) {
        vec![("to", FieldError::Rule("must differ from the origin".to_owned()))]
    } else {
        Vec::new()
    }
}

impl FormRecord for Transfer {
    fn schema() -> &'static FormSchema {
        &TRANSFER_SCHEMA
    }

    fn blank_draft(_today: Date) -> FormDraft {
        FormDraft::default().with("status", TransferStatus::Pending.as_str())
    }

    fn to_draft(&self) -> FormDraft {
        FormDraft::new(self.id.clone())
            .with("from", &self.from)
            .with("to", &self.to)
            .with("items", self.items.to_string())
            .with("status", self.status.as_str())
            .with("driver", &self.driver)
            .with("eta", &self.eta)
    }

    fn from_values(id: RecordId, values: &FormValues) -> Result<Self> {
        Ok(Self {
            id,
            from: values.text("from"),
            to: values.text("to"),
            items: values.integer("items")?,
            status: values.choice("status", TransferStatus::parse)?,
            driver: values.text("driver"),
            eta: values.text("eta"),
            is_flagged: false,
        })
    }
}

static SITE_ISSUE_SCHEMA: FormSchema = FormSchema {
    title: "Site issue",
    fields: &[
        FieldSpec::required("title", "Title", FieldKind::Text { min_len: 3 }),
        FieldSpec::required("priority", "Priority", FieldKind::Choice(IssuePriority::VALUES)),
        FieldSpec::required("status", "Status", FieldKind::Choice(IssueStatus::VALUES)),
        FieldSpec::required("reported_by", "Reported by", NAME),
        FieldSpec::required("raised_on", "Raised on", FieldKind::Date),
    ],
    check: None,
};

impl FormRecord for SiteIssue {
    fn schema() -> &'static FormSchema {
        &SITE_ISSUE_SCHEMA
    }

    fn blank_draft(today: Date) -> FormDraft {
        FormDraft::default()
            .with("priority", IssuePriority::Medium.as_str())
            .with("status", IssueStatus::Open.as_str())
            .with("raised_on", today.to_string())
    }

    fn to_draft(&self) -> FormDraft {
        FormDraft::new(self.id.clone())
            .with("title", &self.title)
            .with("priority", self.priority.as_str())
            .with("status", self.status.as_str())
            .with("reported_by", &self.reported_by)
            .with("raised_on", self.raised_on.to_string())
    }

    fn from_values(id: RecordId, values: &FormValues) -> Result<Self> {
        Ok(Self {
            id,
            title: values.text("title"),
            priority: values.choice("priority", IssuePriority::parse)?,
            status: values.choice("status", IssueStatus::parse)?,
            reported_by: values.text("reported_by"),
            raised_on: values.date("raised_on")?,
            is_flagged: false,
        })
    }
}

static SITE_TASK_SCHEMA: FormSchema = FormSchema {
    title: "Site task",
    fields: &[
        FieldSpec::required("name", "Task name", NAME),
        FieldSpec::required("project", "Project", NAME),
        FieldSpec::required("assigned_to", "Assigned to", NAME),
        FieldSpec::required("start_date", "Start date", FieldKind::Date),
        FieldSpec::required("due_date", "Due date", FieldKind::Date),
        FieldSpec::required("progress", "Progress (%)", COUNT),
        FieldSpec::required("phase", "Phase", FieldKind::Choice(TASK_PHASES)),
        FieldSpec::optional("dependencies", "Depends on", SHORT),
    ],
    check: Some(check_site_task),
};

fn check_site_task(values: &FormValues) -> Vec<(&'static str, FieldError)> {
    let mut errors = not_before(
        values,
        "start_date",
        "due_date",
        "cannot be before the start date",
    );
    if values.optional_integer("progress").is_some_and(|progress| progress > 100) {
        errors.push(("progress", FieldError::Rule("must be 100 or less".to_owned())));
    }
    errors
}

fn split_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_owned)
        .collect()
}

impl FormRecord for SiteTask {
    fn schema() -> &'static FormSchema {
        &SITE_TASK_SCHEMA
    }

    fn blank_draft(today: Date) -> FormDraft {
        FormDraft::default()
            .with("start_date", today.to_string())
            .with("due_date", a_week_after(today).to_string())
            .with("progress", "0")
    }

    fn to_draft(&self) -> FormDraft {
        FormDraft::new(self.id.clone())
            .with("name", &self.name)
            .with("project", &self.project)
            .with("assigned_to", &self.assigned_to)
            .with("start_date", self.start_date.to_string())
            .with("due_date", self.due_date.to_string())
            .with("progress", self.progress.to_string())
            .with("phase", &self.phase)
            .with("dependencies", self.dependencies.join(", "))
    }

    /// Status is never entered; it follows from progress.
    fn from_values(id: RecordId, values: &FormValues) -> Result<Self> {
        let progress = values.integer("progress")?;
        Ok(Self {
            id,
            name: values.text("name"),
            project: values.text("project"),
            assigned_to: values.text("assigned_to"),
            start_date: values.date("start_date")?,
            due_date: values.date("due_date")?,
            status: TaskStatus::from_progress(progress),
            progress,
            phase: values.text("phase"),
            dependencies: split_ids(&values.text("dependencies")),
            is_flagged: false,
        })
    }
}

static EQUIPMENT_SCHEMA: FormSchema = FormSchema {
    title: "Equipment",
    fields: &[
        FieldSpec::required("name", "Name", NAME),
        FieldSpec::required("hours", "Running hours", COUNT),
        FieldSpec::required("next_service", "Next service", SHORT),
        FieldSpec::required("status", "Status", FieldKind::Choice(EquipmentStatus::VALUES)),
        FieldSpec::optional("last_serviced", "Last serviced", FieldKind::Date),
    ],
    check: None,
};

impl FormRecord for Equipment {
    fn schema() -> &'static FormSchema {
        &EQUIPMENT_SCHEMA
    }

    fn blank_draft(_today: Date) -> FormDraft {
        FormDraft::default()
            .with("hours", "0")
            .with("status", EquipmentStatus::Active.as_str())
    }

    fn to_draft(&self) -> FormDraft {
        let draft = FormDraft::new(self.id.clone())
            .with("name", &self.name)
            .with("hours", self.hours.to_string())
            .with("next_service", &self.next_service)
            .with("status", self.status.as_str());
        match self.last_serviced {
            Some(serviced) => draft.with("last_serviced", serviced.to_string()),
            None => draft,
        }
    }

    fn from_values(id: RecordId, values: &FormValues) -> Result<Self> {
        Ok(Self {
            id,
            name: values.text("name"),
            hours: values.integer("hours")?,
            next_service: values.text("next_service"),
            status: values.choice("status", EquipmentStatus::parse)?,
            last_serviced: values.optional_date("last_serviced"),
            is_flagged: false,
        })
    }
}

static MAINTENANCE_SCHEMA: FormSchema = FormSchema {
    title: "Maintenance log",
    fields: &[
        FieldSpec::required("equipment", "Equipment id", SHORT),
        FieldSpec::required("kind", "Type", FieldKind::Choice(MaintenanceKind::VALUES)),
        FieldSpec::required("notes", "Notes", NAME),
        FieldSpec::required("next_service_hours", "Next service (hrs)", POSITIVE),
        FieldSpec::required("logged_on", "Logged on", FieldKind::Date),
    ],
    check: None,
};

impl FormRecord for MaintenanceEntry {
    fn schema() -> &'static FormSchema {
        &MAINTENANCE_SCHEMA
    }

    fn blank_draft(today: Date) -> FormDraft {
        FormDraft::default()
            .with("kind", MaintenanceKind::Routine.as_str())
            .with("logged_on", today.to_string())
    }

    fn to_draft(&self) -> FormDraft {
        FormDraft::new(self.id.clone())
            .with("equipment", self.equipment_id.as_str())
            .with("kind", self.kind.as_str())
            .with("notes", &self.notes)
            .with("next_service_hours", self.next_service_hours.to_string())
            .with("logged_on", self.logged_on.to_string())
    }

    fn from_values(id: RecordId, values: &FormValues) -> Result<Self> {
        Ok(Self {
            id,
            equipment_id: RecordId::from(values.text("equipment").trim()),
            kind: values.choice("kind", MaintenanceKind::parse)?,
            notes: values.text("notes"),
            next_service_hours: values.integer("next_service_hours")?,
            logged_on: values.date("logged_on")?,
            is_flagged: false,
        })
    }
}
