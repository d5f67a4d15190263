//! Shortest-path printer selection for a job (§4.2). Grounded on `cli.c`'s
//! `find_printer_for_job`: walk printers in ascending id order, skip
//! ineligible/non-idle ones, accept the first with a usable conversion path.

use crate::job::Job;
use crate::printer::PrinterTable;
use crate::registry::{ConversionRegistry, ConversionStep};
use crate::types::{PrinterId, PrinterStatus};

/// A printer selected for a job, with the conversion path that gets it
/// there (possibly empty, when the job's source type already matches the
/// printer's type).
pub struct Selection {
    pub printer_id: PrinterId,
    pub path: Vec<ConversionStep>,
}

pub fn select_printer(
    job: &Job,
    printers: &PrinterTable,
    registry: &ConversionRegistry,
) -> Option<Selection> {
    for printer in printers.iter_in_order() {
        if !job.eligibility.contains(printer.id) {
            continue;
        }
        if printer.status != PrinterStatus::Idle {
            continue;
        }
        if let Some(path) = registry.find_conversion_path(job.file_type, printer.file_type) {
            return Some(Selection {
                printer_id: printer.id,
                path,
            });
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::JobTable;
    use crate::types::{Eligibility, TypeId};

    fn make_registry() -> ConversionRegistry {
        ConversionRegistry::new()
    }

    #[test]
    fn skips_ineligible_printers() {
        let mut printers = PrinterTable::new(4);
        let p1 = printers.declare("p1", TypeId(0)).unwrap();
        let p2 = printers.declare("p2", TypeId(0)).unwrap();
        printers.get_mut(p1).unwrap().status = PrinterStatus::Idle;
        printers.get_mut(p2).unwrap().status = PrinterStatus::Idle;

        let mut jobs = JobTable::new(4);
        let job_id = jobs
            .create(TypeId(0), "f".into(), Eligibility::single(p2))
            .unwrap();
        let job = jobs.get(job_id).unwrap();

        let registry = make_registry();
        let selection = select_printer(job, &printers, &registry).unwrap();
        assert_eq!(selection.printer_id, p2);
        assert!(selection.path.is_empty());
    }

    #[test]
    fn skips_busy_printers() {
        let mut printers = PrinterTable::new(4);
        let p1 = printers.declare("p1", TypeId(0)).unwrap();
        printers.get_mut(p1).unwrap().status = PrinterStatus::Busy;

        let mut jobs = JobTable::new(4);
        let job_id = jobs
            .create(TypeId(0), "f".into(), Eligibility::all(4))
            .unwrap();
        let job = jobs.get(job_id).unwrap();

        let registry = make_registry();
        assert!(select_printer(job, &printers, &registry).is_none());
    }

    #[test]
    fn skips_printers_with_no_reachable_type() {
        let mut registry = make_registry();
        let a = registry.define_type("a");
        let b = registry.define_type("b");

        let mut printers = PrinterTable::new(4);
        let p1 = printers.declare("p1", b).unwrap();
        printers.get_mut(p1).unwrap().status = PrinterStatus::Idle;

        let mut jobs = JobTable::new(4);
        let job_id = jobs.create(a, "f".into(), Eligibility::all(4)).unwrap();
        let job = jobs.get(job_id).unwrap();

        assert!(select_printer(job, &printers, &registry).is_none());
    }

    #[test]
    fn lowest_id_eligible_idle_printer_wins() {
        let registry = make_registry();
        let mut printers = PrinterTable::new(4);
        let p1 = printers.declare("p1", TypeId(0)).unwrap();
        let p2 = printers.declare("p2", TypeId(0)).unwrap();
        printers.get_mut(p1).unwrap().status = PrinterStatus::Idle;
        printers.get_mut(p2).unwrap().status = PrinterStatus::Idle;

        let mut jobs = JobTable::new(4);
        let job_id = jobs
            .create(TypeId(0), "f".into(), Eligibility::all(4))
            .unwrap();
        let job = jobs.get(job_id).unwrap();

        let selection = select_printer(job, &printers, &registry).unwrap();
        assert_eq!(selection.printer_id, p1);
    }
}
