// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::config::ExportFormat;
use crate::export;
use anyhow::{Result, bail};
use sitegrid_app::{
    DialogMode, Equipment, Flaggable, FormDraft, FormRecord, IdSequence, InventoryItem,
    IssueStatus, MaintenanceEntry, MaterialRequest, Notice, PageKind, Priority, PurchaseOrder,
    Record, RecordId, RecordStore, RequestStatus, RowAction, RowActionRequest, SiteIssue,
    SiteTask, StoreError, SubmittedForm, Transfer, UpsertOutcome, Urgency,
};
use sitegrid_testkit::DemoData;
use sitegrid_tui::{ActionOutcome, AppRuntime, ExportSheet, FollowUp, PageSnapshot};
use std::path::PathBuf;
use time::Date;

const ID_WIDTH: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportTarget {
    pub dir: PathBuf,
    pub format: ExportFormat,
}

/// In-memory stores for every page. Mutations happen here and nowhere else;
/// the UI reloads a page snapshot after each call.
pub struct SiteRuntime {
    purchase_orders: RecordStore<PurchaseOrder>,
    material_requests: RecordStore<MaterialRequest>,
    inventory: RecordStore<InventoryItem>,
    transfers: RecordStore<Transfer>,
    issues: RecordStore<SiteIssue>,
    tasks: RecordStore<SiteTask>,
    equipment: RecordStore<Equipment>,
    maintenance: RecordStore<MaintenanceEntry>,
    export: ExportTarget,
    clock: fn() -> Date,
}

fn sequence(page: PageKind) -> IdSequence {
    IdSequence::new(page.id_prefix(), ID_WIDTH)
}

impl SiteRuntime {
    pub fn new(data: DemoData, export: ExportTarget, clock: fn() -> Date) -> Result<Self> {
        Ok(Self {
            purchase_orders: RecordStore::with_records(
                sequence(PageKind::PurchaseOrders),
                data.purchase_orders,
            )?,
            material_requests: RecordStore::with_records(
                sequence(PageKind::MaterialRequests),
                data.material_requests,
            )?,
            inventory: RecordStore::with_records(sequence(PageKind::Inventory), data.inventory)?,
            transfers: RecordStore::with_records(sequence(PageKind::Transfers), data.transfers)?,
            issues: RecordStore::with_records(sequence(PageKind::Issues), data.issues)?,
            tasks: RecordStore::with_records(sequence(PageKind::Tasks), data.tasks)?,
            equipment: RecordStore::with_records(sequence(PageKind::Equipment), data.equipment)?,
            maintenance: RecordStore::with_records(
                sequence(PageKind::Maintenance),
                data.maintenance,
            )?,
            export,
            clock,
        })
    }

    fn today(&self) -> Date {
        (self.clock)()
    }

    fn toggle_flag(&mut self, page: PageKind, id: &RecordId) -> Result<bool, StoreError> {
        match page {
            PageKind::PurchaseOrders => self.purchase_orders.toggle_flag(id),
            PageKind::MaterialRequests => self.material_requests.toggle_flag(id),
            PageKind::Inventory => self.inventory.toggle_flag(id),
            PageKind::Transfers => self.transfers.toggle_flag(id),
            PageKind::Issues => self.issues.toggle_flag(id),
            PageKind::Tasks => self.tasks.toggle_flag(id),
            PageKind::Equipment => self.equipment.toggle_flag(id),
            PageKind::Maintenance => self.maintenance.toggle_flag(id),
        }
    }

    fn remove(&mut self, page: PageKind, id: &RecordId) -> bool {
        match page {
            PageKind::PurchaseOrders => self.purchase_orders.remove_by_id(id),
            PageKind::MaterialRequests => self.material_requests.remove_by_id(id),
            PageKind::Inventory => self.inventory.remove_by_id(id),
            PageKind::Transfers => self.transfers.remove_by_id(id),
            PageKind::Issues => self.issues.remove_by_id(id),
            PageKind::Tasks => self.tasks.remove_by_id(id),
            PageKind::Equipment => self.equipment.remove_by_id(id),
            PageKind::Maintenance => self.maintenance.remove_by_id(id),
        }
    }

    fn request_label(&self, id: &RecordId) -> String {
        self.material_requests
            .get(id)
            .map_or_else(|| id.to_string(), |request| request.request_number.clone())
    }

    fn order_from_request(&mut self, id: &RecordId) -> Result<ActionOutcome> {
        let request = self.material_requests.update(id, |request| {
            request.status = RequestStatus::Ordered;
            request.clone()
        })?;
        let priority = match request.urgency {
            Urgency::Urgent | Urgency::Emergency => Priority::High,
            Urgency::Normal => Priority::Medium,
        };
        let draft = PurchaseOrder::blank_draft(self.today())
            .with("items", &request.items)
            .with("project", &request.project)
            .with("expected_delivery", request.required_date.to_string())
            .with("priority", priority.as_str());
        tracing::info!(request = %id, "request marked ordered");
        Ok(ActionOutcome::notice(Notice::info(format!(
            "{} ordered; complete the purchase order",
            request.request_number
        )))
        .then(FollowUp::OpenForm {
            page: PageKind::PurchaseOrders,
            draft,
        }))
    }

    fn maintenance_form(&self, id: &RecordId) -> Result<ActionOutcome> {
        let machine = self
            .equipment
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        let draft = MaintenanceEntry::blank_draft(self.today()).with("equipment", id.as_str());
        Ok(
            ActionOutcome::notice(Notice::info(format!("log maintenance for {}", machine.name)))
                .then(FollowUp::OpenForm {
                    page: PageKind::Maintenance,
                    draft,
                }),
        )
    }

    /// Entries must name stored equipment. A new entry services the machine.
    fn save_maintenance(&mut self, form: &SubmittedForm) -> Result<UpsertOutcome> {
        let equipment_id = RecordId::from(form.values.text("equipment").trim());
        if !self.equipment.contains(&equipment_id) {
            return Err(StoreError::NotFound(equipment_id).into());
        }
        let outcome = save(&mut self.maintenance, form, |_, _| {})?;
        if let UpsertOutcome::Inserted(id) = &outcome {
            let entry = self
                .maintenance
                .get(id)
                .cloned()
                .ok_or_else(|| StoreError::NotFound(id.clone()))?;
            self.equipment
                .update(&entry.equipment_id, |machine| machine.log_maintenance(&entry))?;
            tracing::info!(
                equipment = %entry.equipment_id,
                entry = %id,
                kind = entry.kind.as_str(),
                "maintenance logged"
            );
        }
        Ok(outcome)
    }
}

/// Builds a record from submitted values and upserts it. Edits keep the
/// stored flag. `finish` sees the record's sequence number: the one a create
/// will receive, or the one an edited record already carries.
fn save<R>(
    store: &mut RecordStore<R>,
    form: &SubmittedForm,
    finish: impl FnOnce(&mut R, Option<u64>),
) -> Result<UpsertOutcome>
where
    R: FormRecord + Flaggable,
{
    let (mut record, number) = match &form.mode {
        DialogMode::Create => (
            R::from_values(RecordId::unassigned(), &form.values)?,
            Some(store.next_sequence()),
        ),
        DialogMode::Edit(id) => {
            let stored = store
                .get(id)
                .ok_or_else(|| StoreError::NotFound(id.clone()))?;
            let mut record = R::from_values(id.clone(), &form.values)?;
            record.set_flagged(stored.is_flagged());
            (record, store.number_of(id))
        }
    };
    finish(&mut record, number);
    Ok(store.upsert(record)?)
}

/// Fills a blank document number. Ids outside the store's sequence have no
/// number to derive from, so the field stays blank.
fn fill_document_number(field: &mut String, prefix: &str, today: Date, number: Option<u64>) {
    if let Some(number) = number
        && field.trim().is_empty()
    {
        *field = format!("{prefix}-{}-{number:03}", today.year());
    }
}

fn draft_of<R: FormRecord + Record>(store: &RecordStore<R>, id: &RecordId) -> Result<FormDraft> {
    store
        .get(id)
        .map(R::to_draft)
        .ok_or_else(|| StoreError::NotFound(id.clone()).into())
}

impl AppRuntime for SiteRuntime {
    fn load_page_snapshot(&mut self, page: PageKind) -> Result<PageSnapshot> {
        Ok(match page {
            PageKind::PurchaseOrders => {
                PageSnapshot::PurchaseOrders(self.purchase_orders.records().to_vec())
            }
            PageKind::MaterialRequests => {
                PageSnapshot::MaterialRequests(self.material_requests.records().to_vec())
            }
            PageKind::Inventory => PageSnapshot::Inventory(self.inventory.records().to_vec()),
            PageKind::Transfers => PageSnapshot::Transfers(self.transfers.records().to_vec()),
            PageKind::Issues => PageSnapshot::Issues(self.issues.records().to_vec()),
            PageKind::Tasks => PageSnapshot::Tasks(self.tasks.records().to_vec()),
            PageKind::Equipment => PageSnapshot::Equipment(self.equipment.records().to_vec()),
            PageKind::Maintenance => {
                PageSnapshot::Maintenance(self.maintenance.records().to_vec())
            }
        })
    }

    fn blank_draft(&mut self, page: PageKind) -> Result<FormDraft> {
        let today = self.today();
        Ok(match page {
            PageKind::PurchaseOrders => PurchaseOrder::blank_draft(today),
            PageKind::MaterialRequests => MaterialRequest::blank_draft(today),
            PageKind::Inventory => InventoryItem::blank_draft(today),
            PageKind::Transfers => Transfer::blank_draft(today),
            PageKind::Issues => SiteIssue::blank_draft(today),
            PageKind::Tasks => SiteTask::blank_draft(today),
            PageKind::Equipment => Equipment::blank_draft(today),
            PageKind::Maintenance => MaintenanceEntry::blank_draft(today),
        })
    }

    fn edit_draft(&mut self, page: PageKind, id: &RecordId) -> Result<FormDraft> {
        match page {
            PageKind::PurchaseOrders => draft_of(&self.purchase_orders, id),
            PageKind::MaterialRequests => draft_of(&self.material_requests, id),
            PageKind::Inventory => draft_of(&self.inventory, id),
            PageKind::Transfers => draft_of(&self.transfers, id),
            PageKind::Issues => draft_of(&self.issues, id),
            PageKind::Tasks => draft_of(&self.tasks, id),
            PageKind::Equipment => draft_of(&self.equipment, id),
            PageKind::Maintenance => draft_of(&self.maintenance, id),
        }
    }

    fn submit_form(&mut self, page: PageKind, form: SubmittedForm) -> Result<Notice> {
        let today = self.today();
        let outcome = match page {
            PageKind::PurchaseOrders => save(&mut self.purchase_orders, &form, |order, number| {
                fill_document_number(&mut order.po_number, "PO", today, number);
            })?,
            PageKind::MaterialRequests => {
                save(&mut self.material_requests, &form, |request, number| {
                    fill_document_number(&mut request.request_number, "MR", today, number);
                })?
            }
            PageKind::Inventory => save(&mut self.inventory, &form, |item, _| {
                item.last_updated = today;
            })?,
            PageKind::Transfers => save(&mut self.transfers, &form, |_, _| {})?,
            PageKind::Issues => save(&mut self.issues, &form, |_, _| {})?,
            PageKind::Tasks => save(&mut self.tasks, &form, |_, _| {})?,
            PageKind::Equipment => save(&mut self.equipment, &form, |_, _| {})?,
            PageKind::Maintenance => self.save_maintenance(&form)?,
        };

        let label = page.entity_label();
        Ok(match outcome {
            UpsertOutcome::Inserted(id) => {
                tracing::info!(page = page.slug(), record = %id, "record created");
                Notice::success(format!("{label} {id} created"))
            }
            UpsertOutcome::Updated(id) => {
                tracing::info!(page = page.slug(), record = %id, "record updated");
                Notice::success(format!("{label} {id} updated"))
            }
        })
    }

    fn apply_row_action(
        &mut self,
        page: PageKind,
        request: &RowActionRequest,
    ) -> Result<ActionOutcome> {
        let id = &request.record_id;
        let label = page.entity_label();
        let notice = match (page, request.action) {
            (_, RowAction::Flag) => {
                let flagged = self.toggle_flag(page, id)?;
                tracing::info!(page = page.slug(), record = %id, flagged, "flag toggled");
                let verb = if flagged { "flagged" } else { "unflagged" };
                Notice::info(format!("{label} {id} {verb}"))
            }
            (_, RowAction::Delete) => {
                if !self.remove(page, id) {
                    tracing::warn!(page = page.slug(), record = %id, "delete of missing record");
                    return Err(StoreError::NotFound(id.clone()).into());
                }
                tracing::info!(page = page.slug(), record = %id, "record deleted");
                Notice::success(format!("{label} {id} deleted"))
            }
            (PageKind::MaterialRequests, RowAction::Approve) => {
                self.material_requests
                    .update(id, |request| request.status = RequestStatus::Approved)?;
                tracing::info!(request = %id, "request approved");
                Notice::success(format!("{} approved", self.request_label(id)))
            }
            (PageKind::MaterialRequests, RowAction::Reject) => {
                let number = self.request_label(id);
                if !self.material_requests.remove_by_id(id) {
                    return Err(StoreError::NotFound(id.clone()).into());
                }
                tracing::info!(request = %id, "request rejected");
                Notice::info(format!("{number} rejected"))
            }
            (PageKind::MaterialRequests, RowAction::CreatePurchaseOrder) => {
                return self.order_from_request(id);
            }
            (PageKind::Issues, RowAction::Resolve) => {
                self.issues
                    .update(id, |issue| issue.status = IssueStatus::Resolved)?;
                tracing::info!(issue = %id, "issue resolved");
                Notice::success(format!("issue {id} resolved"))
            }
            (PageKind::Issues, RowAction::Escalate) if self.issues.contains(id) => {
                tracing::info!(issue = %id, "issue escalated");
                Notice::info(format!("issue {id} escalated"))
            }
            (PageKind::Issues, RowAction::Reject) if self.issues.contains(id) => {
                tracing::info!(issue = %id, "issue rejected");
                Notice::info(format!("issue {id} rejected"))
            }
            (PageKind::Issues, RowAction::Escalate | RowAction::Reject) => {
                return Err(StoreError::NotFound(id.clone()).into());
            }
            (PageKind::Equipment, RowAction::LogMaintenance) => {
                return self.maintenance_form(id);
            }
            (_, action) => bail!("{} is not available on {}", action.label(), page.label()),
        };
        Ok(ActionOutcome::notice(notice))
    }

    fn export_page(&mut self, page: PageKind, sheet: &ExportSheet) -> Result<PathBuf> {
        let path = export::write_sheet(
            &self.export.dir,
            page,
            self.today(),
            self.export.format,
            sheet,
        )?;
        tracing::info!(
            page = page.slug(),
            rows = sheet.rows.len(),
            path = %path.display(),
            "page exported"
        );
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::{ExportTarget, SiteRuntime};
    use crate::config::ExportFormat;
    use anyhow::Result;
    use sitegrid_app::{
        EquipmentStatus, FormDialog, FormDraft, IssueStatus, PageKind, PoStatus, RecordId,
        RequestStatus, RowAction, RowActionRequest, SubmittedForm, TaskStatus,
    };
    use sitegrid_testkit::DemoData;
    use sitegrid_tui::{
        AppRuntime, ExportSheet, FollowUp, PageSnapshot, TableUiState, schema_for,
    };
    use std::path::{Path, PathBuf};
    use time::Date;
    use time::macros::date;

    fn fixed_today() -> Date {
        date!(2024 - 01 - 20)
    }

    fn runtime_in(dir: &Path) -> Result<SiteRuntime> {
        SiteRuntime::new(
            DemoData::seeded(),
            ExportTarget {
                dir: dir.to_path_buf(),
                format: ExportFormat::Csv,
            },
            fixed_today,
        )
    }

    fn runtime() -> Result<SiteRuntime> {
        runtime_in(&PathBuf::from("unused-export-dir"))
    }

    fn request(action: RowAction, id: &str) -> RowActionRequest {
        RowActionRequest::new(action, RecordId::from(id))
    }

    fn submitted(page: PageKind, draft: FormDraft) -> SubmittedForm {
        FormDialog::open(schema_for(page), draft)
            .submit()
            .expect("draft should validate")
    }

    fn ids(snapshot: &PageSnapshot) -> Vec<String> {
        snapshot.ids().iter().map(ToString::to_string).collect()
    }

    #[test]
    fn seeded_pages_load_every_record() -> Result<()> {
        let mut runtime = runtime()?;
        let counts = PageKind::ALL
            .into_iter()
            .map(|page| runtime.load_page_snapshot(page).map(|snapshot| snapshot.len()))
            .collect::<Result<Vec<_>>>()?;
        assert_eq!(counts, [3, 2, 5, 3, 3, 4, 4, 2]);
        Ok(())
    }

    #[test]
    fn create_assigns_next_id_and_document_number() -> Result<()> {
        let mut runtime = runtime()?;
        let draft = runtime
            .blank_draft(PageKind::PurchaseOrders)?
            .with("vendor", "Timber Works")
            .with("items", "Plywood sheets")
            .with("total_amount", "1500")
            .with("project", "Residential Towers");
        let notice = runtime.submit_form(
            PageKind::PurchaseOrders,
            submitted(PageKind::PurchaseOrders, draft),
        )?;
        assert_eq!(notice.message, "purchase order PO004 created");

        let PageSnapshot::PurchaseOrders(orders) =
            runtime.load_page_snapshot(PageKind::PurchaseOrders)?
        else {
            panic!("expected purchase orders");
        };
        let created = orders.last().expect("created order");
        assert_eq!(created.po_number, "PO-2024-004");
        assert_eq!(created.status, PoStatus::Draft);
        assert_eq!(created.total_amount, 150_000);
        Ok(())
    }

    #[test]
    fn editing_with_a_blank_number_keeps_numbers_unique() -> Result<()> {
        let mut runtime = runtime()?;
        let draft = runtime
            .edit_draft(PageKind::PurchaseOrders, &RecordId::from("PO002"))?
            .with("po_number", "");
        runtime.submit_form(
            PageKind::PurchaseOrders,
            submitted(PageKind::PurchaseOrders, draft),
        )?;
        let draft = runtime
            .blank_draft(PageKind::PurchaseOrders)?
            .with("vendor", "Timber Works")
            .with("items", "Plywood sheets")
            .with("total_amount", "1500")
            .with("project", "Residential Towers");
        runtime.submit_form(
            PageKind::PurchaseOrders,
            submitted(PageKind::PurchaseOrders, draft),
        )?;

        let PageSnapshot::PurchaseOrders(orders) =
            runtime.load_page_snapshot(PageKind::PurchaseOrders)?
        else {
            panic!("expected purchase orders");
        };
        let numbers: Vec<(&str, &str)> = orders
            .iter()
            .map(|order| (order.id.as_str(), order.po_number.as_str()))
            .collect();
        assert!(numbers.contains(&("PO002", "PO-2024-002")));
        assert!(numbers.contains(&("PO004", "PO-2024-004")));
        Ok(())
    }

    #[test]
    fn edit_replaces_in_place_and_keeps_flag() -> Result<()> {
        let mut runtime = runtime()?;
        runtime.apply_row_action(PageKind::Inventory, &request(RowAction::Flag, "INV003"))?;
        let draft = runtime
            .edit_draft(PageKind::Inventory, &RecordId::from("INV003"))?
            .with("quantity", "80");
        runtime.submit_form(PageKind::Inventory, submitted(PageKind::Inventory, draft))?;

        let PageSnapshot::Inventory(items) = runtime.load_page_snapshot(PageKind::Inventory)?
        else {
            panic!("expected inventory");
        };
        assert_eq!(items.len(), 5);
        assert_eq!(items[2].id.as_str(), "INV003");
        assert_eq!(items[2].quantity, 80);
        assert!(items[2].is_flagged);
        assert_eq!(items[2].last_updated, fixed_today());
        Ok(())
    }

    #[test]
    fn editing_a_removed_record_reports_not_found() -> Result<()> {
        let mut runtime = runtime()?;
        let draft = runtime.edit_draft(PageKind::Transfers, &RecordId::from("TRF002"))?;
        runtime.apply_row_action(PageKind::Transfers, &request(RowAction::Delete, "TRF002"))?;
        let error = runtime
            .submit_form(PageKind::Transfers, submitted(PageKind::Transfers, draft))
            .expect_err("stale edit should fail");
        assert!(error.to_string().contains("TRF002 not found"));
        assert_eq!(
            ids(&runtime.load_page_snapshot(PageKind::Transfers)?),
            ["TRF001", "TRF003"]
        );
        Ok(())
    }

    #[test]
    fn flag_toggles_back_and_forth() -> Result<()> {
        let mut runtime = runtime()?;
        let first =
            runtime.apply_row_action(PageKind::PurchaseOrders, &request(RowAction::Flag, "PO002"))?;
        let second =
            runtime.apply_row_action(PageKind::PurchaseOrders, &request(RowAction::Flag, "PO002"))?;
        assert_eq!(first.notice.message, "purchase order PO002 flagged");
        assert_eq!(second.notice.message, "purchase order PO002 unflagged");
        Ok(())
    }

    #[test]
    fn deleting_a_missing_record_is_an_error() -> Result<()> {
        let mut runtime = runtime()?;
        let error = runtime
            .apply_row_action(PageKind::Issues, &request(RowAction::Delete, "ISS404"))
            .expect_err("missing record");
        assert!(error.to_string().contains("ISS404"));
        assert_eq!(runtime.load_page_snapshot(PageKind::Issues)?.len(), 3);
        Ok(())
    }

    #[test]
    fn approve_and_reject_material_requests() -> Result<()> {
        let mut runtime = runtime()?;
        let approved = runtime.apply_row_action(
            PageKind::MaterialRequests,
            &request(RowAction::Approve, "MR002"),
        )?;
        assert_eq!(approved.notice.message, "MR-2024-002 approved");

        let PageSnapshot::MaterialRequests(requests) =
            runtime.load_page_snapshot(PageKind::MaterialRequests)?
        else {
            panic!("expected requests");
        };
        assert_eq!(requests[1].status, RequestStatus::Approved);

        let rejected = runtime.apply_row_action(
            PageKind::MaterialRequests,
            &request(RowAction::Reject, "MR001"),
        )?;
        assert_eq!(rejected.notice.message, "MR-2024-001 rejected");
        assert_eq!(
            ids(&runtime.load_page_snapshot(PageKind::MaterialRequests)?),
            ["MR002"]
        );
        Ok(())
    }

    #[test]
    fn create_po_marks_request_ordered_and_prefills_order() -> Result<()> {
        let mut runtime = runtime()?;
        let outcome = runtime.apply_row_action(
            PageKind::MaterialRequests,
            &request(RowAction::CreatePurchaseOrder, "MR002"),
        )?;
        let Some(FollowUp::OpenForm { page, draft }) = outcome.follow_up else {
            panic!("expected a purchase order form");
        };
        assert_eq!(page, PageKind::PurchaseOrders);
        assert_eq!(draft.get("items"), "RMC M25");
        assert_eq!(draft.get("project"), "Residential Towers");
        assert_eq!(draft.get("expected_delivery"), "2024-01-25");
        assert_eq!(draft.get("priority"), "high");
        assert_eq!(draft.get("order_date"), "2024-01-20");

        let PageSnapshot::MaterialRequests(requests) =
            runtime.load_page_snapshot(PageKind::MaterialRequests)?
        else {
            panic!("expected requests");
        };
        assert_eq!(requests[1].status, RequestStatus::Ordered);
        Ok(())
    }

    #[test]
    fn issue_actions_resolve_or_only_notify() -> Result<()> {
        let mut runtime = runtime()?;
        runtime.apply_row_action(PageKind::Issues, &request(RowAction::Escalate, "ISS001"))?;
        runtime.apply_row_action(PageKind::Issues, &request(RowAction::Reject, "ISS001"))?;
        let resolved =
            runtime.apply_row_action(PageKind::Issues, &request(RowAction::Resolve, "ISS001"))?;
        assert_eq!(resolved.notice.message, "issue ISS001 resolved");

        let PageSnapshot::Issues(issues) = runtime.load_page_snapshot(PageKind::Issues)? else {
            panic!("expected issues");
        };
        assert_eq!(issues.len(), 3);
        assert_eq!(issues[0].status, IssueStatus::Resolved);
        Ok(())
    }

    #[test]
    fn actions_outside_a_page_are_refused() -> Result<()> {
        let mut runtime = runtime()?;
        let error = runtime
            .apply_row_action(PageKind::Transfers, &request(RowAction::Approve, "TRF001"))
            .expect_err("transfers cannot be approved");
        assert_eq!(error.to_string(), "approve is not available on transfers");
        Ok(())
    }

    #[test]
    fn export_writes_the_filtered_view() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let mut runtime = runtime_in(temp.path())?;
        let snapshot = runtime.load_page_snapshot(PageKind::Inventory)?;
        let mut ui = TableUiState::default();
        ui.filters.select("location", "Warehouse A");
        let sheet = snapshot.export_sheet(&ui);
        let path = runtime.export_page(PageKind::Inventory, &sheet)?;
        assert_eq!(path, temp.path().join("inventory-items-2024-01-20.csv"));
        let written = std::fs::read_to_string(path)?;
        assert_eq!(written.lines().count(), 3);

        let error = runtime
            .export_page(PageKind::Inventory, &ExportSheet::default())
            .expect_err("empty view");
        assert_eq!(error.to_string(), "no data available to export");
        Ok(())
    }

    #[test]
    fn empty_runtime_starts_ids_at_one() -> Result<()> {
        let mut runtime = SiteRuntime::new(
            DemoData::empty(),
            ExportTarget {
                dir: PathBuf::from("unused"),
                format: ExportFormat::Json,
            },
            fixed_today,
        )?;
        let draft = runtime
            .blank_draft(PageKind::Issues)?
            .with("title", "Crane inspection overdue")
            .with("reported_by", "Site Engineer");
        let notice =
            runtime.submit_form(PageKind::Issues, submitted(PageKind::Issues, draft))?;
        assert_eq!(notice.message, "issue ISS001 created");
        Ok(())
    }

    #[test]
    fn task_progress_edit_updates_status() -> Result<()> {
        let mut runtime = runtime()?;
        let draft = runtime
            .edit_draft(PageKind::Tasks, &RecordId::from("TSK004"))?
            .with("progress", "30");
        let notice = runtime.submit_form(PageKind::Tasks, submitted(PageKind::Tasks, draft))?;
        assert_eq!(notice.message, "task TSK004 updated");

        let draft = runtime
            .edit_draft(PageKind::Tasks, &RecordId::from("TSK002"))?
            .with("progress", "100");
        runtime.submit_form(PageKind::Tasks, submitted(PageKind::Tasks, draft))?;

        let PageSnapshot::Tasks(tasks) = runtime.load_page_snapshot(PageKind::Tasks)? else {
            panic!("expected tasks");
        };
        assert_eq!(
            (tasks[3].progress, tasks[3].status),
            (30, TaskStatus::InProgress)
        );
        assert_eq!(tasks[1].status, TaskStatus::Completed);
        assert_eq!(tasks[1].dependencies, ["TSK001"]);
        Ok(())
    }

    #[test]
    fn new_tasks_start_not_started() -> Result<()> {
        let mut runtime = runtime()?;
        let draft = runtime
            .blank_draft(PageKind::Tasks)?
            .with("name", "Facade Glazing")
            .with("project", "Main Building")
            .with("assigned_to", "Priya Nair")
            .with("phase", "Finishing")
            .with("dependencies", "TSK004");
        let notice = runtime.submit_form(PageKind::Tasks, submitted(PageKind::Tasks, draft))?;
        assert_eq!(notice.message, "task TSK005 created");

        let PageSnapshot::Tasks(tasks) = runtime.load_page_snapshot(PageKind::Tasks)? else {
            panic!("expected tasks");
        };
        let created = tasks.last().expect("created task");
        assert_eq!(created.status, TaskStatus::NotStarted);
        assert_eq!(created.due_date, date!(2024 - 01 - 27));
        Ok(())
    }

    #[test]
    fn logging_maintenance_reactivates_the_machine() -> Result<()> {
        let mut runtime = runtime()?;
        let outcome = runtime.apply_row_action(
            PageKind::Equipment,
            &request(RowAction::LogMaintenance, "EQ002"),
        )?;
        assert_eq!(outcome.notice.message, "log maintenance for Scissor Lift");
        let Some(FollowUp::OpenForm { page, draft }) = outcome.follow_up else {
            panic!("expected a maintenance form");
        };
        assert_eq!(page, PageKind::Maintenance);
        assert_eq!(draft.get("equipment"), "EQ002");

        let draft = draft
            .with("notes", "Hydraulic hoses replaced")
            .with("next_service_hours", "200");
        let notice = runtime.submit_form(
            PageKind::Maintenance,
            submitted(PageKind::Maintenance, draft),
        )?;
        assert_eq!(notice.message, "maintenance entry MNT003 created");

        let PageSnapshot::Equipment(machines) = runtime.load_page_snapshot(PageKind::Equipment)?
        else {
            panic!("expected equipment");
        };
        assert_eq!(machines[1].status, EquipmentStatus::Active);
        assert_eq!(machines[1].next_service, "200hrs");
        assert_eq!(machines[1].hours, 180);
        assert_eq!(machines[1].last_serviced, Some(fixed_today()));
        Ok(())
    }

    #[test]
    fn maintenance_for_unknown_equipment_is_refused() -> Result<()> {
        let mut runtime = runtime()?;
        let draft = runtime
            .blank_draft(PageKind::Maintenance)?
            .with("equipment", "EQ404")
            .with("notes", "Inspection of missing crane")
            .with("next_service_hours", "100");
        let error = runtime
            .submit_form(
                PageKind::Maintenance,
                submitted(PageKind::Maintenance, draft),
            )
            .expect_err("unknown equipment");
        assert!(error.to_string().contains("EQ404 not found"));
        assert_eq!(runtime.load_page_snapshot(PageKind::Maintenance)?.len(), 2);

        let error = runtime
            .apply_row_action(
                PageKind::Equipment,
                &request(RowAction::LogMaintenance, "EQ404"),
            )
            .expect_err("unknown equipment");
        assert!(error.to_string().contains("EQ404"));
        Ok(())
    }
}
