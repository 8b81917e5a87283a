//! Settings
//!
//! In-memory user configuration and its load/save lifecycle. A single
//! instance lives for the whole session: constructed through the
//! resolver/codec/defaulter chain, mutated in place by the interface, and
//! written back on exit or explicit save.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::codec;
use crate::fields::{FieldCatalog, FieldFlags, FieldId};
use crate::meters::{default_meters, MeterColumnSettings};
use crate::paths::ConfigPaths;
use crate::privilege::PrivilegeScope;

/// Default update interval, in tenths of a second.
pub const DEFAULT_DELAY: u32 = 15;

/// Color schemes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorScheme {
    #[default]
    Default,
    Monochrome,
    BlackOnWhite,
    LightTerminal,
    Midnight,
    BlackNight,
    BrokenGray,
    Nord,
}

impl ColorScheme {
    /// Out-of-range values clamp to the default scheme.
    pub fn from_i32(value: i32) -> Self {
        match value {
            0 => ColorScheme::Default,
            1 => ColorScheme::Monochrome,
            2 => ColorScheme::BlackOnWhite,
            3 => ColorScheme::LightTerminal,
            4 => ColorScheme::Midnight,
            5 => ColorScheme::BlackNight,
            6 => ColorScheme::BrokenGray,
            7 => ColorScheme::Nord,
            _ => ColorScheme::Default,
        }
    }
}

/// Main settings structure
#[derive(Debug, Clone)]
pub struct Settings {
    /// File every save goes to.
    pub filename: PathBuf,

    /// Meter layout of the two header columns.
    pub columns: [MeterColumnSettings; 2],

    /// Displayed process fields, in column order.
    pub fields: Vec<FieldId>,
    /// Union of the displayed fields' flag bits; maintained by
    /// [`Settings::set_fields`], never assigned directly.
    pub flags: FieldFlags,

    pub sort_key: FieldId,
    /// +1 ascending, -1 descending.
    pub direction: i32,

    pub color_scheme: ColorScheme,
    /// Update interval in tenths of a second.
    pub delay: u32,

    pub cpu_count: u32,

    // Display toggles
    pub tree_view: bool,
    pub hide_threads: bool,
    pub hide_kernel_threads: bool,
    pub hide_userland_threads: bool,
    pub shadow_other_users: bool,
    pub show_thread_names: bool,
    pub show_program_path: bool,
    pub highlight_base_name: bool,
    pub highlight_megabytes: bool,
    pub highlight_threads: bool,
    pub header_margin: bool,
    pub detailed_cpu_time: bool,
    pub cpu_count_from_zero: bool,
    pub update_process_names: bool,
    pub account_guest_in_cpu_meter: bool,

    /// Whether in-memory state differs from the file on disk. Saving is
    /// allowed either way.
    pub changed: bool,
}

impl Settings {
    /// Loads the session settings for a machine with `cpu_count` cores,
    /// resolving the configuration location from the environment.
    pub fn new(cpu_count: u32, catalog: &FieldCatalog) -> Self {
        Self::with_paths(ConfigPaths::resolve(), cpu_count, catalog)
    }

    /// Same as [`Settings::new`] with an explicit path resolution.
    ///
    /// Parses the legacy dotfile when one is eligible (migrating it to the
    /// modern location), otherwise the resolved file; an unreadable file
    /// falls back to the system-wide default, and past that to compiled-in
    /// defaults with the state marked dirty.
    pub fn with_paths(paths: ConfigPaths, cpu_count: u32, catalog: &FieldCatalog) -> Self {
        let mut settings = Self::compiled_defaults(paths.filename, cpu_count, catalog);

        let source = match &paths.legacy {
            Some(legacy) => legacy.clone(),
            None => settings.filename.clone(),
        };

        match codec::load(&mut settings, catalog, &source) {
            Ok(()) => {
                if let Some(legacy) = paths.legacy {
                    // Transition to the new location and drop the old
                    // dotfile once its contents are safely rewritten.
                    if settings.write().is_ok() {
                        let _scope = PrivilegeScope::enter();
                        let _ = fs::remove_file(&legacy);
                    }
                }
            }
            Err(_) => {
                settings.changed = true;
                if codec::load(&mut settings, catalog, &paths.system).is_err() {
                    settings.columns = default_meters(cpu_count);
                    settings.hide_kernel_threads = true;
                    settings.highlight_megabytes = true;
                    settings.highlight_threads = false;
                    settings.header_margin = true;
                }
            }
        }

        settings
    }

    /// Baseline state before any file is consulted.
    pub(crate) fn compiled_defaults(
        filename: PathBuf,
        cpu_count: u32,
        catalog: &FieldCatalog,
    ) -> Self {
        let mut settings = Settings {
            filename,
            columns: Default::default(),
            fields: Vec::new(),
            flags: FieldFlags::empty(),
            sort_key: catalog.default_sort_key(),
            direction: 1,
            color_scheme: ColorScheme::Default,
            delay: DEFAULT_DELAY,
            cpu_count,
            tree_view: false,
            hide_threads: false,
            hide_kernel_threads: false,
            hide_userland_threads: false,
            shadow_other_users: false,
            show_thread_names: false,
            show_program_path: true,
            highlight_base_name: false,
            highlight_megabytes: false,
            highlight_threads: false,
            header_margin: false,
            detailed_cpu_time: false,
            cpu_count_from_zero: false,
            update_process_names: false,
            account_guest_in_cpu_meter: false,
            changed: false,
        };
        settings.set_fields(catalog.default_fields().to_vec(), catalog);
        settings
    }

    /// Replaces the displayed fields, keeping `flags` the union of the new
    /// selection's flag bits.
    pub fn set_fields(&mut self, fields: Vec<FieldId>, catalog: &FieldCatalog) {
        self.flags = fields
            .iter()
            .fold(FieldFlags::empty(), |acc, &id| acc | catalog.flags(id));
        self.fields = fields;
    }

    /// Flips between ascending and descending sort.
    pub fn invert_sort_order(&mut self) {
        self.direction = if self.direction == 1 { -1 } else { 1 };
    }

    /// Display number of a CPU: zero- or one-based per configuration.
    pub fn cpu_id(&self, cpu: u32) -> u32 {
        if self.cpu_count_from_zero {
            cpu
        } else {
            cpu + 1
        }
    }

    /// Writes the settings to the resolved path.
    ///
    /// The new content goes to a temporary file in the target directory
    /// and is renamed over the old one, so a failed save never truncates
    /// the existing configuration. Failure is reported to the caller and
    /// is non-fatal to the session.
    pub fn write(&self) -> anyhow::Result<()> {
        let mut buffer = Vec::new();
        codec::write_to(self, &mut buffer)?;

        let dir = self.filename.parent().unwrap_or_else(|| Path::new("."));

        let _scope = PrivilegeScope::enter();
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(&buffer)?;
        tmp.persist(&self.filename)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{stock, stock_catalog};
    use tempfile::TempDir;

    fn temp_paths(dir: &TempDir) -> ConfigPaths {
        ConfigPaths {
            filename: dir.path().join("htoprc"),
            legacy: None,
            system: dir.path().join("system-htoprc"),
        }
    }

    #[test]
    fn test_fresh_start_uses_compiled_defaults_and_marks_dirty() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::with_paths(temp_paths(&dir), 4, stock_catalog());

        assert!(settings.changed);
        assert_eq!(settings.delay, DEFAULT_DELAY);
        assert_eq!(settings.direction, 1);
        assert_eq!(settings.sort_key, stock::PERCENT_CPU);
        assert_eq!(settings.fields, stock_catalog().default_fields());
        assert!(settings.hide_kernel_threads);
        assert!(settings.highlight_megabytes);
        assert!(!settings.highlight_threads);
        assert!(settings.header_margin);
        assert!(settings.show_program_path);
        assert_eq!(settings.columns[0].names, ["AllCPUs", "Memory", "Swap"]);
    }

    #[test]
    fn test_load_existing_file_is_not_dirty() {
        let dir = TempDir::new().unwrap();
        let paths = temp_paths(&dir);
        std::fs::write(&paths.filename, "delay=33\ntree_view=1\n").unwrap();

        let settings = Settings::with_paths(paths, 4, stock_catalog());
        assert!(!settings.changed);
        assert_eq!(settings.delay, 33);
        assert!(settings.tree_view);
    }

    #[test]
    fn test_system_fallback_when_user_file_missing() {
        let dir = TempDir::new().unwrap();
        let paths = temp_paths(&dir);
        std::fs::write(&paths.system, "delay=77\n").unwrap();

        let settings = Settings::with_paths(paths, 4, stock_catalog());
        assert!(settings.changed);
        assert_eq!(settings.delay, 77);
        // The no-config hardcoded toggles stay untouched on this path.
        assert!(!settings.hide_kernel_threads);
    }

    #[test]
    fn test_legacy_migration() {
        let home = TempDir::new().unwrap();
        std::fs::write(home.path().join(".htoprc"), "delay=25\n").unwrap();

        let mut paths = ConfigPaths::resolve_from(
            None,
            None,
            Some(home.path().as_os_str().to_os_string()),
        );
        paths.system = home.path().join("no-system-file");
        let legacy = paths.legacy.clone().expect("dotfile should be eligible");

        let settings = Settings::with_paths(paths.clone(), 4, stock_catalog());

        assert_eq!(settings.delay, 25);
        assert!(paths.filename.is_file(), "modern file should be written");
        assert!(!legacy.exists(), "legacy dotfile should be deleted");
    }

    #[test]
    fn test_save_and_reload_round_trip() {
        let dir = TempDir::new().unwrap();
        let paths = temp_paths(&dir);

        let mut settings = Settings::with_paths(paths.clone(), 8, stock_catalog());
        settings.set_fields(vec![stock::PID, stock::COMMAND], stock_catalog());
        settings.sort_key = stock::M_RESIDENT;
        settings.invert_sort_order();
        settings.delay = 50;
        settings.color_scheme = ColorScheme::Nord;
        settings.shadow_other_users = true;
        settings.write().unwrap();

        let reloaded = Settings::with_paths(paths, 8, stock_catalog());
        assert!(!reloaded.changed);
        assert_eq!(reloaded.fields, settings.fields);
        assert_eq!(reloaded.sort_key, stock::M_RESIDENT);
        assert_eq!(reloaded.direction, -1);
        assert_eq!(reloaded.delay, 50);
        assert_eq!(reloaded.color_scheme, ColorScheme::Nord);
        assert!(reloaded.shadow_other_users);
        assert_eq!(reloaded.columns, settings.columns);
    }

    #[test]
    fn test_idempotent_save() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::with_paths(temp_paths(&dir), 4, stock_catalog());

        settings.write().unwrap();
        let first = std::fs::read(&settings.filename).unwrap();
        settings.write().unwrap();
        let second = std::fs::read(&settings.filename).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_write_failure_is_reported() {
        let dir = TempDir::new().unwrap();
        let mut settings = Settings::with_paths(temp_paths(&dir), 4, stock_catalog());
        settings.filename = dir.path().join("missing").join("htoprc");
        assert!(settings.write().is_err());
    }

    #[test]
    fn test_invert_sort_order() {
        let dir = TempDir::new().unwrap();
        let mut settings = Settings::with_paths(temp_paths(&dir), 4, stock_catalog());

        assert_eq!(settings.direction, 1);
        settings.invert_sort_order();
        assert_eq!(settings.direction, -1);
        settings.invert_sort_order();
        assert_eq!(settings.direction, 1);

        // Anything other than ascending flips back to ascending.
        settings.direction = -5;
        settings.invert_sort_order();
        assert_eq!(settings.direction, 1);
    }

    #[test]
    fn test_cpu_id_numbering() {
        let dir = TempDir::new().unwrap();
        let mut settings = Settings::with_paths(temp_paths(&dir), 4, stock_catalog());

        assert_eq!(settings.cpu_id(0), 1);
        assert_eq!(settings.cpu_id(3), 4);
        settings.cpu_count_from_zero = true;
        assert_eq!(settings.cpu_id(0), 0);
        assert_eq!(settings.cpu_id(3), 3);
    }

    #[test]
    fn test_flags_follow_field_selection() {
        let dir = TempDir::new().unwrap();
        let mut settings = Settings::with_paths(temp_paths(&dir), 4, stock_catalog());

        let io_rate = FieldId(36);
        settings.set_fields(vec![stock::PID, io_rate], stock_catalog());
        assert!(settings.flags.contains(FieldFlags::IO));

        settings.set_fields(vec![stock::PID], stock_catalog());
        assert_eq!(settings.flags, FieldFlags::empty());
    }
}
