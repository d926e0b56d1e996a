// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use sitegrid_app::{
    Equipment, EquipmentStatus, InventoryItem, IssuePriority, IssueStatus, MaintenanceEntry,
    MaintenanceKind, MaterialRequest, PoStatus, Priority, PurchaseOrder, RecordId, RequestStatus,
    SiteIssue, SiteTask, TaskStatus, Transfer, TransferStatus, Urgency,
};
use time::Date;
use time::macros::date;

/// Seed data for every page: a handful of realistic site records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoData {
    pub purchase_orders: Vec<PurchaseOrder>,
    pub material_requests: Vec<MaterialRequest>,
    pub inventory: Vec<InventoryItem>,
    pub transfers: Vec<Transfer>,
    pub issues: Vec<SiteIssue>,
    pub tasks: Vec<SiteTask>,
    pub equipment: Vec<Equipment>,
    pub maintenance: Vec<MaintenanceEntry>,
}

impl DemoData {
    pub fn seeded() -> Self {
        Self {
            purchase_orders: purchase_orders(),
            material_requests: material_requests(),
            inventory: inventory_items(),
            transfers: transfers(),
            issues: site_issues(),
            tasks: site_tasks(),
            equipment: equipment(),
            maintenance: maintenance_log(),
        }
    }

    pub fn empty() -> Self {
        Self {
            purchase_orders: Vec::new(),
            material_requests: Vec::new(),
            inventory: Vec::new(),
            transfers: Vec::new(),
            issues: Vec::new(),
            tasks: Vec::new(),
            equipment: Vec::new(),
            maintenance: Vec::new(),
        }
    }
}

pub fn purchase_orders() -> Vec<PurchaseOrder> {
    vec![
        PurchaseOrder {
            id: RecordId::from("PO001"),
            po_number: "PO-2024-001".to_owned(),
            vendor: "Steel Corp Ltd".to_owned(),
            items: "TMT Bars, Steel Plates".to_owned(),
            total_amount: 25_000_000,
            order_date: date!(2024 - 01 - 15),
            expected_delivery: date!(2024 - 01 - 25),
            status: PoStatus::Delivered,
            priority: Priority::High,
            project: "Commercial Complex".to_owned(),
            is_flagged: false,
        },
        PurchaseOrder {
            id: RecordId::from("PO002"),
            po_number: "PO-2024-002".to_owned(),
            vendor: "Cement Industries".to_owned(),
            items: "OPC Cement, PPC Cement".to_owned(),
            total_amount: 18_000_000,
            order_date: date!(2024 - 01 - 18),
            expected_delivery: date!(2024 - 01 - 28),
            status: PoStatus::Acknowledged,
            priority: Priority::Medium,
            project: "Residential Towers".to_owned(),
            is_flagged: false,
        },
        PurchaseOrder {
            id: RecordId::from("PO003"),
            po_number: "PO-2024-003".to_owned(),
            vendor: "Hardware Solutions".to_owned(),
            items: "Tools, Safety Equipment".to_owned(),
            total_amount: 9_500_000,
            order_date: date!(2024 - 01 - 20),
            expected_delivery: date!(2024 - 01 - 30),
            status: PoStatus::Sent,
            priority: Priority::Urgent,
            project: "Infrastructure Dev".to_owned(),
            is_flagged: false,
        },
    ]
}

pub fn material_requests() -> Vec<MaterialRequest> {
    vec![
        MaterialRequest {
            id: RecordId::from("MR001"),
            request_number: "MR-2024-001".to_owned(),
            requested_by: "Site Engineer - Team A".to_owned(),
            items: "Steel Rods".to_owned(),
            quantity: 500,
            unit: "kg".to_owned(),
            request_date: date!(2024 - 01 - 22),
            required_date: date!(2024 - 01 - 30),
            status: RequestStatus::Approved,
            project: "Commercial Complex".to_owned(),
            urgency: Urgency::Normal,
            is_flagged: false,
        },
        MaterialRequest {
            id: RecordId::from("MR002"),
            request_number: "MR-2024-002".to_owned(),
            requested_by: "Project Manager".to_owned(),
            items: "RMC M25".to_owned(),
            quantity: 25,
            unit: "cum".to_owned(),
            request_date: date!(2024 - 01 - 23),
            required_date: date!(2024 - 01 - 25),
            status: RequestStatus::Pending,
            project: "Residential Towers".to_owned(),
            urgency: Urgency::Urgent,
            is_flagged: false,
        },
    ]
}

type StockRow = (&'static str, &'static str, &'static str, i64, &'static str, &'static str, &'static str, i64);

const STOCK: [StockRow; 5] = [
    ("INV001", "Portland Cement (50kg)", "Construction Materials", 320, "bags", "Warehouse A", "Cement Industries", 38_000),
    ("INV002", "TMT Steel Bars 12mm", "Construction Materials", 45, "tonnes", "Warehouse B", "Steel Corp Ltd", 5_800_000),
    ("INV003", "Safety Helmets", "Safety Equipment", 120, "pcs", "Site Storage 1", "Hardware Solutions", 45_000),
    ("INV004", "Copper Wire 2.5mm", "Electrical Components", 30, "rolls", "Warehouse A", "Volt Electricals", 210_000),
    ("INV005", "PVC Pipes 4in", "Plumbing Materials", 200, "pcs", "Site Storage 2", "Hardware Solutions", 65_000),
];

pub fn inventory_items() -> Vec<InventoryItem> {
    STOCK
        .into_iter()
        .map(
            |(id, name, category, quantity, unit, location, supplier, unit_cost)| InventoryItem {
                id: RecordId::from(id),
                name: name.to_owned(),
                categories: vec![category.to_owned()],
                quantity,
                unit: unit.to_owned(),
                location: location.to_owned(),
                last_updated: date!(2024 - 01 - 20),
                reorder_level: 50,
                max_stock: 500,
                safety_stock: 20,
                primary_supplier: supplier.to_owned(),
                unit_cost,
                is_flagged: false,
            },
        )
        .collect()
}

pub fn transfers() -> Vec<Transfer> {
    let transfer = |id: &str, from: &str, to: &str, items, status, driver: &str, eta: &str| {
        Transfer {
            id: RecordId::from(id),
            from: from.to_owned(),
            to: to.to_owned(),
            items,
            status,
            driver: driver.to_owned(),
            eta: eta.to_owned(),
            is_flagged: false,
        }
    };
    vec![
        transfer(
            "TRF001",
            "Warehouse A",
            "Site 1",
            10,
            TransferStatus::InTransit,
            "John Doe",
            "2 hours",
        ),
        transfer(
            "TRF002",
            "Warehouse B",
            "Site 2",
            15,
            TransferStatus::Delivered,
            "Jane Smith",
            "Completed",
        ),
        transfer(
            "TRF003",
            "Site 1",
            "Warehouse A",
            5,
            TransferStatus::Pending,
            "Mike Johnson",
            "4 hours",
        ),
    ]
}

pub fn site_issues() -> Vec<SiteIssue> {
    vec![
        SiteIssue {
            id: RecordId::from("ISS001"),
            title: "Scaffolding not secured on Block B".to_owned(),
            priority: IssuePriority::Critical,
            status: IssueStatus::Open,
            reported_by: "Safety Officer".to_owned(),
            raised_on: date!(2024 - 01 - 21),
            is_flagged: false,
        },
        SiteIssue {
            id: RecordId::from("ISS002"),
            title: "Concrete curing delayed by rain".to_owned(),
            priority: IssuePriority::Medium,
            status: IssueStatus::Open,
            reported_by: "Site Engineer - Team A".to_owned(),
            raised_on: date!(2024 - 01 - 22),
            is_flagged: false,
        },
        SiteIssue {
            id: RecordId::from("ISS003"),
            title: "Generator fuel shortage".to_owned(),
            priority: IssuePriority::High,
            status: IssueStatus::Resolved,
            reported_by: "Project Manager".to_owned(),
            raised_on: date!(2024 - 01 - 18),
            is_flagged: false,
        },
    ]
}

fn task(
    id: &str,
    name: &str,
    assigned_to: &str,
    window: (Date, Date),
    progress: i64,
    phase: &str,
    dependencies: &[&str],
) -> SiteTask {
    SiteTask {
        id: RecordId::from(id),
        name: name.to_owned(),
        project: "Main Building".to_owned(),
        assigned_to: assigned_to.to_owned(),
        start_date: window.0,
        due_date: window.1,
        status: TaskStatus::from_progress(progress),
        progress,
        phase: phase.to_owned(),
        dependencies: dependencies.iter().map(|id| (*id).to_owned()).collect(),
        is_flagged: false,
    }
}

pub fn site_tasks() -> Vec<SiteTask> {
    vec![
        task(
            "TSK001",
            "Foundation Work",
            "John Doe",
            (date!(2024 - 01 - 01), date!(2024 - 01 - 15)),
            100,
            "Foundation",
            &[],
        ),
        task(
            "TSK002",
            "Steel Structure",
            "Jane Smith",
            (date!(2024 - 01 - 16), date!(2024 - 02 - 15)),
            75,
            "Structure",
            &["TSK001"],
        ),
        task(
            "TSK003",
            "Roofing Installation",
            "Mike Johnson",
            (date!(2024 - 02 - 01), date!(2024 - 02 - 28)),
            45,
            "Roofing",
            &["TSK002"],
        ),
        task(
            "TSK004",
            "Interior Finishing",
            "Sarah Wilson",
            (date!(2024 - 02 - 20), date!(2024 - 03 - 20)),
            0,
            "Finishing",
            &["TSK003"],
        ),
    ]
}

fn machine(
    id: &str,
    name: &str,
    hours: i64,
    next_service: &str,
    status: EquipmentStatus,
) -> Equipment {
    Equipment {
        id: RecordId::from(id),
        name: name.to_owned(),
        hours,
        next_service: next_service.to_owned(),
        status,
        last_serviced: None,
        is_flagged: false,
    }
}

pub fn equipment() -> Vec<Equipment> {
    vec![
        Equipment {
            last_serviced: Some(date!(2024 - 01 - 20)),
            ..machine("EQ001", "Generator Set", 250, "50hrs", EquipmentStatus::Active)
        },
        machine(
            "EQ002",
            "Scissor Lift",
            180,
            "20hrs",
            EquipmentStatus::MaintenanceDue,
        ),
        Equipment {
            last_serviced: Some(date!(2024 - 01 - 15)),
            ..machine(
                "EQ003",
                "Concrete Mixer",
                420,
                "Due Now",
                EquipmentStatus::Warning,
            )
        },
        machine("EQ004", "Tower Crane", 150, "100hrs", EquipmentStatus::Active),
    ]
}

pub fn maintenance_log() -> Vec<MaintenanceEntry> {
    vec![
        MaintenanceEntry {
            id: RecordId::from("MNT001"),
            equipment_id: RecordId::from("EQ003"),
            kind: MaintenanceKind::Repair,
            notes: "Fixed hydraulic leak".to_owned(),
            next_service_hours: 40,
            logged_on: date!(2024 - 01 - 15),
            is_flagged: false,
        },
        MaintenanceEntry {
            id: RecordId::from("MNT002"),
            equipment_id: RecordId::from("EQ001"),
            kind: MaintenanceKind::Routine,
            notes: "Routine service completed".to_owned(),
            next_service_hours: 50,
            logged_on: date!(2024 - 01 - 20),
            is_flagged: false,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::DemoData;
    use sitegrid_app::{INVENTORY_CATEGORIES, INVENTORY_LOCATIONS, Record};
    use std::collections::BTreeSet;

    fn assert_unique<R: Record>(records: &[R]) {
        let ids: BTreeSet<&str> = records.iter().map(|record| record.id().as_str()).collect();
        assert_eq!(ids.len(), records.len());
    }

    #[test]
    fn seeded_ids_are_unique_per_page() {
        let data = DemoData::seeded();
        assert_unique(&data.purchase_orders);
        assert_unique(&data.material_requests);
        assert_unique(&data.inventory);
        assert_unique(&data.transfers);
        assert_unique(&data.issues);
        assert_unique(&data.tasks);
        assert_unique(&data.equipment);
        assert_unique(&data.maintenance);
    }

    #[test]
    fn maintenance_entries_point_at_known_equipment() {
        let data = DemoData::seeded();
        for entry in &data.maintenance {
            assert!(data.equipment.iter().any(|machine| machine.id == entry.equipment_id));
        }
    }

    #[test]
    fn inventory_uses_known_categories_and_locations() {
        for item in DemoData::seeded().inventory {
            assert!(INVENTORY_LOCATIONS.contains(&item.location.as_str()));
            for category in &item.categories {
                assert!(INVENTORY_CATEGORIES.contains(&category.as_str()));
            }
        }
    }

    #[test]
    fn seeded_data_has_low_stock_rows() {
        let low: Vec<String> = DemoData::seeded()
            .inventory
            .iter()
            .filter(|item| item.is_low_stock())
            .map(|item| item.id.to_string())
            .collect();
        assert_eq!(low, ["INV002", "INV004"]);
    }
}
