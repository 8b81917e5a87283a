//! Meter layout
//!
//! Meters are the status widgets at the top of the screen, arranged in two
//! columns. Settings stores only their names and display modes; the
//! widgets themselves live in the host.

/// Parallel name/mode lists for one header column.
///
/// Invariant: `names` and `modes` have equal length.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeterColumnSettings {
    pub names: Vec<String>,
    pub modes: Vec<i32>,
}

impl MeterColumnSettings {
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn push(&mut self, name: impl Into<String>, mode: i32) {
        self.names.push(name.into());
        self.modes.push(mode);
    }

    /// Restores the length invariant after the two lists were read
    /// independently: missing modes become 0, surplus modes are dropped.
    pub(crate) fn normalize(&mut self) {
        self.modes.resize(self.names.len(), 0);
    }
}

/// Default two-column layout for a machine with `cpu_count` cores.
///
/// Up to 4 cores a single combined CPU meter fits in the left column;
/// larger machines split the cores across both columns, and past 8 cores
/// the split meters group two cores per line. Every meter starts in
/// display mode 0.
pub fn default_meters(cpu_count: u32) -> [MeterColumnSettings; 2] {
    let mut left = MeterColumnSettings::default();
    let mut right = MeterColumnSettings::default();

    if cpu_count > 8 {
        left.push("LeftCPUs2", 0);
        right.push("RightCPUs2", 0);
    } else if cpu_count > 4 {
        left.push("LeftCPUs", 0);
        right.push("RightCPUs", 0);
    } else {
        left.push("AllCPUs", 0);
    }
    left.push("Memory", 0);
    left.push("Swap", 0);

    right.push("Tasks", 0);
    right.push("LoadAverage", 0);
    right.push("Uptime", 0);

    [left, right]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(column: &MeterColumnSettings) -> Vec<&str> {
        column.names.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_default_meters_small_machines() {
        for n in [1, 4] {
            let [left, right] = default_meters(n);
            assert_eq!(names(&left), ["AllCPUs", "Memory", "Swap"]);
            assert_eq!(names(&right), ["Tasks", "LoadAverage", "Uptime"]);
            assert_eq!(left.len(), 3);
            assert_eq!(right.len(), 3);
        }
    }

    #[test]
    fn test_default_meters_split_cpus() {
        for n in [5, 8] {
            let [left, right] = default_meters(n);
            assert_eq!(names(&left), ["LeftCPUs", "Memory", "Swap"]);
            assert_eq!(names(&right), ["RightCPUs", "Tasks", "LoadAverage", "Uptime"]);
            assert_eq!(left.len(), 3);
            assert_eq!(right.len(), 4);
        }
    }

    #[test]
    fn test_default_meters_grouped_cpus() {
        for n in [9, 16] {
            let [left, right] = default_meters(n);
            assert_eq!(names(&left), ["LeftCPUs2", "Memory", "Swap"]);
            assert_eq!(
                names(&right),
                ["RightCPUs2", "Tasks", "LoadAverage", "Uptime"]
            );
        }
    }

    #[test]
    fn test_default_meters_modes_all_zero() {
        for n in [1, 5, 9] {
            for column in default_meters(n) {
                assert_eq!(column.names.len(), column.modes.len());
                assert!(column.modes.iter().all(|&m| m == 0));
            }
        }
    }

    #[test]
    fn test_default_meters_deterministic() {
        assert_eq!(default_meters(6), default_meters(6));
    }

    #[test]
    fn test_normalize_pads_missing_modes() {
        let mut column = MeterColumnSettings {
            names: vec!["CPU".into(), "Memory".into()],
            modes: vec![3],
        };
        column.normalize();
        assert_eq!(column.modes, [3, 0]);
    }

    #[test]
    fn test_normalize_drops_surplus_modes() {
        let mut column = MeterColumnSettings {
            names: vec!["CPU".into()],
            modes: vec![1, 2, 3],
        };
        column.normalize();
        assert_eq!(column.modes, [1]);
    }
}
