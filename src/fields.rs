//! Process-field catalog
//!
//! A field is a selectable process attribute (one table column) identified
//! by a small integer. The catalog is supplied by the host platform as an
//! ordered table of descriptors; slot 0 and slots with an empty name are
//! placeholders that can never be displayed. A stock catalog mirroring the
//! classic field table is provided for hosts that do not bring their own.

use std::fmt;

use bitflags::bitflags;
use lazy_static::lazy_static;

bitflags! {
    /// Flag bits a field contributes to the settings-wide scan mask.
    ///
    /// Bit meanings belong to the host; bits outside the named constants
    /// are preserved as-is.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct FieldFlags: u32 {
        /// Field requires per-process I/O accounting.
        const IO = 0x0001;
    }
}

impl FieldFlags {
    /// Admits arbitrary host-defined bits.
    pub fn from_raw(bits: u32) -> Self {
        FieldFlags::from_bits_retain(bits)
    }
}

/// Identifier of a process field: an index into the host catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldId(pub i32);

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One slot of the field catalog.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Display name; empty for placeholder slots.
    pub name: &'static str,
    pub flags: FieldFlags,
}

impl FieldDescriptor {
    pub const fn new(name: &'static str, flags: FieldFlags) -> Self {
        FieldDescriptor { name, flags }
    }

    const fn placeholder() -> Self {
        FieldDescriptor {
            name: "",
            flags: FieldFlags::empty(),
        }
    }
}

/// Ordered table of field descriptors plus the host's defaults.
#[derive(Debug, Clone)]
pub struct FieldCatalog {
    descriptors: Vec<FieldDescriptor>,
    default_fields: Vec<FieldId>,
    default_sort_key: FieldId,
}

impl FieldCatalog {
    /// Builds a catalog. Slot 0 is forced to a placeholder so that valid
    /// field ids are always strictly positive.
    pub fn new(
        descriptors: Vec<FieldDescriptor>,
        default_fields: Vec<FieldId>,
        default_sort_key: FieldId,
    ) -> Self {
        let mut descriptors = descriptors;
        if descriptors.is_empty() {
            descriptors.push(FieldDescriptor::placeholder());
        } else {
            descriptors[0] = FieldDescriptor::placeholder();
        }
        FieldCatalog {
            descriptors,
            default_fields,
            default_sort_key,
        }
    }

    /// Number of catalog slots, placeholders included.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn descriptor(&self, id: FieldId) -> Option<&FieldDescriptor> {
        usize::try_from(id.0).ok().and_then(|i| self.descriptors.get(i))
    }

    /// A field can be shown when its id is in range and its slot carries a
    /// non-empty name.
    pub fn is_displayable(&self, id: FieldId) -> bool {
        id.0 > 0 && self.descriptor(id).is_some_and(|d| !d.name.is_empty())
    }

    pub fn flags(&self, id: FieldId) -> FieldFlags {
        self.descriptor(id).map(|d| d.flags).unwrap_or_default()
    }

    pub fn name(&self, id: FieldId) -> &'static str {
        self.descriptor(id).map(|d| d.name).unwrap_or("")
    }

    pub fn default_fields(&self) -> &[FieldId] {
        &self.default_fields
    }

    pub fn default_sort_key(&self) -> FieldId {
        self.default_sort_key
    }
}

/// Ids of the stock catalog entries referenced elsewhere in the crate.
pub mod stock {
    use super::FieldId;

    pub const PID: FieldId = FieldId(1);
    pub const COMMAND: FieldId = FieldId(2);
    pub const STATE: FieldId = FieldId(3);
    pub const PRIORITY: FieldId = FieldId(11);
    pub const NICE: FieldId = FieldId(12);
    pub const M_VIRT: FieldId = FieldId(15);
    pub const M_RESIDENT: FieldId = FieldId(16);
    pub const M_SHARE: FieldId = FieldId(17);
    pub const USER: FieldId = FieldId(23);
    pub const TIME: FieldId = FieldId(24);
    pub const PERCENT_CPU: FieldId = FieldId(31);
    pub const PERCENT_MEM: FieldId = FieldId(32);
}

lazy_static! {
    static ref STOCK_CATALOG: FieldCatalog = build_stock_catalog();
}

/// Catalog mirroring the classic process-field table. Hosts with their own
/// field set construct a [`FieldCatalog`] directly instead.
pub fn stock_catalog() -> &'static FieldCatalog {
    &STOCK_CATALOG
}

fn build_stock_catalog() -> FieldCatalog {
    const IO: FieldFlags = FieldFlags::IO;
    const NONE: FieldFlags = FieldFlags::empty();

    // Slot 0 is the placeholder; ids are the positions below, from 1 up.
    let names: &[(&'static str, FieldFlags)] = &[
        ("", NONE),
        ("PID", NONE),
        ("Command", NONE),
        ("STATE", NONE),
        ("PPID", NONE),
        ("PGRP", NONE),
        ("SESSION", NONE),
        ("TTY_NR", NONE),
        ("TPGID", NONE),
        ("MINFLT", NONE),
        ("MAJFLT", NONE),
        ("PRIORITY", NONE),
        ("NICE", NONE),
        ("STARTTIME", NONE),
        ("PROCESSOR", NONE),
        ("M_VIRT", NONE),
        ("M_RESIDENT", NONE),
        ("M_SHARE", NONE),
        ("M_TRS", NONE),
        ("M_LRS", NONE),
        ("M_DRS", NONE),
        ("M_DT", NONE),
        ("ST_UID", NONE),
        ("USER", NONE),
        ("TIME", NONE),
        ("NLWP", NONE),
        ("TTY", NONE),
        ("CMDLINE", NONE),
        ("COMM", NONE),
        ("EXE", NONE),
        ("CWD", NONE),
        ("PERCENT_CPU", NONE),
        ("PERCENT_MEM", NONE),
        ("IO_PRIORITY", IO),
        ("RBYTES", IO),
        ("WBYTES", IO),
        ("IO_RATE", IO),
        ("IO_READ_RATE", IO),
        ("IO_WRITE_RATE", IO),
        ("PERCENT_IO_DELAY", IO),
        ("PERCENT_SWAP_DELAY", IO),
        ("CTXT", NONE),
        ("CGROUP", NONE),
        ("OOM", NONE),
        ("SECATTR", NONE),
        ("ELAPSED", NONE),
    ];

    let descriptors = names
        .iter()
        .map(|&(name, flags)| FieldDescriptor::new(name, flags))
        .collect();

    let defaults = vec![
        stock::PID,
        stock::USER,
        stock::PRIORITY,
        stock::NICE,
        stock::M_VIRT,
        stock::M_RESIDENT,
        stock::M_SHARE,
        stock::STATE,
        stock::PERCENT_CPU,
        stock::PERCENT_MEM,
        stock::TIME,
        stock::COMMAND,
    ];

    FieldCatalog::new(descriptors, defaults, stock::PERCENT_CPU)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_catalog() -> FieldCatalog {
        FieldCatalog::new(
            vec![
                FieldDescriptor::new("ignored", FieldFlags::empty()),
                FieldDescriptor::new("PID", FieldFlags::empty()),
                FieldDescriptor::new("", FieldFlags::empty()),
                FieldDescriptor::new("IO_RATE", FieldFlags::IO),
            ],
            vec![FieldId(1)],
            FieldId(1),
        )
    }

    #[test]
    fn test_slot_zero_is_never_displayable() {
        let catalog = tiny_catalog();
        assert!(!catalog.is_displayable(FieldId(0)));
        assert_eq!(catalog.name(FieldId(0)), "");
    }

    #[test]
    fn test_displayable_requires_name_and_range() {
        let catalog = tiny_catalog();
        assert!(catalog.is_displayable(FieldId(1)));
        assert!(!catalog.is_displayable(FieldId(2))); // empty-name gap
        assert!(catalog.is_displayable(FieldId(3)));
        assert!(!catalog.is_displayable(FieldId(4))); // past the end
        assert!(!catalog.is_displayable(FieldId(-1)));
    }

    #[test]
    fn test_flags_lookup() {
        let catalog = tiny_catalog();
        assert_eq!(catalog.flags(FieldId(3)), FieldFlags::IO);
        assert_eq!(catalog.flags(FieldId(1)), FieldFlags::empty());
        assert_eq!(catalog.flags(FieldId(99)), FieldFlags::empty());
    }

    #[test]
    fn test_from_raw_keeps_unknown_bits() {
        let flags = FieldFlags::from_raw(0x8001);
        assert!(flags.contains(FieldFlags::IO));
        assert_eq!(flags.bits(), 0x8001);
    }

    #[test]
    fn test_stock_catalog_defaults_are_displayable() {
        let catalog = stock_catalog();
        assert!(!catalog.default_fields().is_empty());
        for &id in catalog.default_fields() {
            assert!(catalog.is_displayable(id), "default field {} invalid", id);
        }
        assert!(catalog.is_displayable(catalog.default_sort_key()));
    }

    #[test]
    fn test_stock_catalog_named_ids_line_up() {
        let catalog = stock_catalog();
        assert_eq!(catalog.name(stock::PID), "PID");
        assert_eq!(catalog.name(stock::USER), "USER");
        assert_eq!(catalog.name(stock::PERCENT_CPU), "PERCENT_CPU");
        assert_eq!(catalog.name(stock::TIME), "TIME");
    }
}
