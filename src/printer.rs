use crate::error::{Result, SupervisorError};
use crate::types::{PrinterId, PrinterStatus, TypeId};

/// A single declared printer (§3). Never destroyed during a session —
/// only its status moves between `disabled`/`idle`/`busy`.
#[derive(Debug)]
pub struct Printer {
    pub id: PrinterId,
    pub name: String,
    pub file_type: TypeId,
    pub status: PrinterStatus,
}

/// The supervisor's fixed-capacity printer table, indexed by slot.
/// Printers are never removed once declared, so unlike `JobTable` there is
/// no freeing/reuse of slots here.
#[derive(Debug, Default)]
pub struct PrinterTable {
    slots: Vec<Option<Printer>>,
    capacity: usize,
}

impl PrinterTable {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::new(),
            capacity,
        }
    }

    /// Declare a new printer, initially `disabled`. Fails if the name is
    /// already taken or the table is at capacity.
    pub fn declare(&mut self, name: &str, file_type: TypeId) -> Result<PrinterId> {
        if self.find_by_name(name).is_some() {
            return Err(SupervisorError::DuplicatePrinter(name.to_string()));
        }
        if self.slots.len() >= self.capacity {
            return Err(SupervisorError::PrinterCapacityExhausted);
        }

        let id = PrinterId(self.slots.len());
        self.slots.push(Some(Printer {
            id,
            name: name.to_string(),
            file_type,
            status: PrinterStatus::Disabled,
        }));
        Ok(id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<PrinterId> {
        self.slots
            .iter()
            .flatten()
            .find(|p| p.name == name)
            .map(|p| p.id)
    }

    pub fn get(&self, id: PrinterId) -> Option<&Printer> {
        self.slots.get(id.0).and_then(|slot| slot.as_ref())
    }

    pub fn get_mut(&mut self, id: PrinterId) -> Option<&mut Printer> {
        self.slots.get_mut(id.0).and_then(|slot| slot.as_mut())
    }

    /// All declared printers in ascending id order — the order the
    /// scanner and path selector are required to honor (§4.2, §5).
    pub fn iter_in_order(&self) -> impl Iterator<Item = &Printer> {
        self.slots.iter().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declare_assigns_ascending_ids() {
        let mut table = PrinterTable::new(4);
        let p1 = table.declare("p1", TypeId(0)).unwrap();
        let p2 = table.declare("p2", TypeId(0)).unwrap();
        assert_eq!(p1, PrinterId(0));
        assert_eq!(p2, PrinterId(1));
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let mut table = PrinterTable::new(4);
        table.declare("p1", TypeId(0)).unwrap();
        let err = table.declare("p1", TypeId(0)).unwrap_err();
        assert!(matches!(err, SupervisorError::DuplicatePrinter(_)));
    }

    #[test]
    fn capacity_is_enforced() {
        let mut table = PrinterTable::new(1);
        table.declare("p1", TypeId(0)).unwrap();
        let err = table.declare("p2", TypeId(0)).unwrap_err();
        assert!(matches!(err, SupervisorError::PrinterCapacityExhausted));
    }

    #[test]
    fn new_printer_starts_disabled() {
        let mut table = PrinterTable::new(4);
        let id = table.declare("p1", TypeId(0)).unwrap();
        assert_eq!(table.get(id).unwrap().status, PrinterStatus::Disabled);
    }
}
