//! htoprc codec
//!
//! Line-oriented `key=value` reader and writer for the configuration
//! file. Unknown keys and malformed lines are skipped so files written by
//! other versions keep working in both directions. Field identifiers are
//! stored on disk in the older zero-based enum format, one below their
//! catalog ids.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use crate::fields::{FieldCatalog, FieldId};
use crate::meters::{default_meters, MeterColumnSettings};
use crate::privilege::PrivilegeScope;
use crate::settings::{ColorScheme, Settings};

/// Offset between on-disk field values and catalog ids, kept for
/// compatibility with the older enum format.
pub const LEGACY_FIELD_OFFSET: i32 = 1;

/// Maps a catalog id to its on-disk value.
pub fn encode_field_id(id: FieldId) -> i32 {
    id.0 - LEGACY_FIELD_OFFSET
}

/// Maps an on-disk value to its catalog id.
pub fn decode_field_id(raw: i32) -> FieldId {
    FieldId(raw + LEGACY_FIELD_OFFSET)
}

/// `atoi`-style parsing: optional sign, leading digits, 0 for anything
/// unparseable. Out-of-range magnitudes saturate.
fn lenient_i32(value: &str) -> i32 {
    let s = value.trim_start();
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let mut n: i64 = 0;
    for c in digits.chars() {
        match c.to_digit(10) {
            Some(d) => n = n * 10 + i64::from(d),
            None => break,
        }
        if n > i64::from(i32::MAX) + 1 {
            break;
        }
    }
    if negative {
        n = -n;
    }
    n.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

fn lenient_bool(value: &str) -> bool {
    lenient_i32(value) != 0
}

/// Opens `path` with effective privilege dropped and parses it into
/// `settings`. An unreadable file is the caller's cue to advance the
/// fallback chain.
pub(crate) fn load(
    settings: &mut Settings,
    catalog: &FieldCatalog,
    path: &Path,
) -> io::Result<()> {
    let file = {
        let _scope = PrivilegeScope::enter();
        File::open(path)?
    };
    parse_from(settings, catalog, BufReader::new(file))
}

/// Parses htoprc text from any buffered reader; split out of [`load`] so
/// in-memory buffers can be parsed in tests.
pub(crate) fn parse_from<R: BufRead>(
    settings: &mut Settings,
    catalog: &FieldCatalog,
    reader: R,
) -> io::Result<()> {
    let mut saw_meters = false;

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some((key, value)) = line.split_once('=') {
            saw_meters |= parse_option(settings, catalog, key.trim(), value.trim());
        }
    }

    if !saw_meters {
        settings.columns = default_meters(settings.cpu_count);
    }
    for column in &mut settings.columns {
        column.normalize();
    }

    Ok(())
}

/// Applies one `key=value` option. Returns whether the key belonged to the
/// meter layout group. Unrecognized keys are ignored.
fn parse_option(
    settings: &mut Settings,
    catalog: &FieldCatalog,
    key: &str,
    value: &str,
) -> bool {
    match key {
        "fields" => read_fields(settings, catalog, value),
        "sort_key" => settings.sort_key = decode_field_id(lenient_i32(value)),
        "sort_direction" => settings.direction = lenient_i32(value),
        "tree_view" => settings.tree_view = lenient_bool(value),
        "hide_threads" => settings.hide_threads = lenient_bool(value),
        "hide_kernel_threads" => settings.hide_kernel_threads = lenient_bool(value),
        "hide_userland_threads" => settings.hide_userland_threads = lenient_bool(value),
        "shadow_other_users" => settings.shadow_other_users = lenient_bool(value),
        "show_thread_names" => settings.show_thread_names = lenient_bool(value),
        "show_program_path" => settings.show_program_path = lenient_bool(value),
        "highlight_base_name" => settings.highlight_base_name = lenient_bool(value),
        "highlight_megabytes" => settings.highlight_megabytes = lenient_bool(value),
        "highlight_threads" => settings.highlight_threads = lenient_bool(value),
        "header_margin" => settings.header_margin = lenient_bool(value),
        // expand_system_time is the historical spelling of the same switch.
        "detailed_cpu_time" | "expand_system_time" => {
            settings.detailed_cpu_time = lenient_bool(value)
        }
        "cpu_count_from_zero" => settings.cpu_count_from_zero = lenient_bool(value),
        "update_process_names" => settings.update_process_names = lenient_bool(value),
        "account_guest_in_cpu_meter" => {
            settings.account_guest_in_cpu_meter = lenient_bool(value)
        }
        "delay" => settings.delay = lenient_i32(value).max(0) as u32,
        "color_scheme" => settings.color_scheme = ColorScheme::from_i32(lenient_i32(value)),
        "left_meters" => {
            read_meter_names(&mut settings.columns[0], value);
            return true;
        }
        "right_meters" => {
            read_meter_names(&mut settings.columns[1], value);
            return true;
        }
        "left_meter_modes" => {
            read_meter_modes(&mut settings.columns[0], value);
            return true;
        }
        "right_meter_modes" => {
            read_meter_modes(&mut settings.columns[1], value);
            return true;
        }
        _ => {}
    }
    false
}

/// Decodes the ordered field list, dropping entries the catalog does not
/// recognize as displayable. The accepted list is bounded by the catalog
/// size.
fn read_fields(settings: &mut Settings, catalog: &FieldCatalog, value: &str) {
    let mut fields = Vec::with_capacity(catalog.len());
    for token in value.split_whitespace() {
        if fields.len() + 1 >= catalog.len() {
            break;
        }
        let id = decode_field_id(lenient_i32(token));
        if catalog.is_displayable(id) {
            fields.push(id);
        }
    }
    settings.set_fields(fields, catalog);
}

fn read_meter_names(column: &mut MeterColumnSettings, value: &str) {
    column.names = value.split_whitespace().map(str::to_owned).collect();
}

fn read_meter_modes(column: &mut MeterColumnSettings, value: &str) {
    column.modes = value.split_whitespace().map(lenient_i32).collect();
}

/// Renders `settings` in the on-disk format. Key order is fixed, every
/// owned key is written, and list items each carry a trailing space, so
/// repeated saves of unchanged settings are byte-identical.
pub(crate) fn write_to<W: Write>(settings: &Settings, out: &mut W) -> io::Result<()> {
    writeln!(
        out,
        "# Beware! This file is rewritten by htop when settings are changed in the interface."
    )?;
    writeln!(
        out,
        "# The parser is also very primitive, and not human-friendly."
    )?;

    write!(out, "fields=")?;
    for &id in &settings.fields {
        write!(out, "{} ", encode_field_id(id))?;
    }
    writeln!(out)?;

    writeln!(out, "sort_key={}", encode_field_id(settings.sort_key))?;
    writeln!(out, "sort_direction={}", settings.direction)?;
    write_flag(out, "hide_threads", settings.hide_threads)?;
    write_flag(out, "hide_kernel_threads", settings.hide_kernel_threads)?;
    write_flag(out, "hide_userland_threads", settings.hide_userland_threads)?;
    write_flag(out, "shadow_other_users", settings.shadow_other_users)?;
    write_flag(out, "show_thread_names", settings.show_thread_names)?;
    write_flag(out, "show_program_path", settings.show_program_path)?;
    write_flag(out, "highlight_base_name", settings.highlight_base_name)?;
    write_flag(out, "highlight_megabytes", settings.highlight_megabytes)?;
    write_flag(out, "highlight_threads", settings.highlight_threads)?;
    write_flag(out, "tree_view", settings.tree_view)?;
    write_flag(out, "header_margin", settings.header_margin)?;
    write_flag(out, "detailed_cpu_time", settings.detailed_cpu_time)?;
    write_flag(out, "cpu_count_from_zero", settings.cpu_count_from_zero)?;
    write_flag(out, "update_process_names", settings.update_process_names)?;
    write_flag(
        out,
        "account_guest_in_cpu_meter",
        settings.account_guest_in_cpu_meter,
    )?;
    writeln!(out, "color_scheme={}", settings.color_scheme as i32)?;
    writeln!(out, "delay={}", settings.delay)?;

    write_meter_names(out, "left_meters", &settings.columns[0])?;
    write_meter_modes(out, "left_meter_modes", &settings.columns[0])?;
    write_meter_names(out, "right_meters", &settings.columns[1])?;
    write_meter_modes(out, "right_meter_modes", &settings.columns[1])?;

    Ok(())
}

fn write_flag<W: Write>(out: &mut W, key: &str, value: bool) -> io::Result<()> {
    writeln!(out, "{}={}", key, i32::from(value))
}

fn write_meter_names<W: Write>(
    out: &mut W,
    key: &str,
    column: &MeterColumnSettings,
) -> io::Result<()> {
    write!(out, "{}=", key)?;
    for name in &column.names {
        write!(out, "{} ", name)?;
    }
    writeln!(out)
}

fn write_meter_modes<W: Write>(
    out: &mut W,
    key: &str,
    column: &MeterColumnSettings,
) -> io::Result<()> {
    write!(out, "{}=", key)?;
    for mode in &column.modes {
        write!(out, "{} ", mode)?;
    }
    writeln!(out)
}
