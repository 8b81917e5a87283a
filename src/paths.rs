//! Configuration file location
//!
//! The active file is the first match of: the `HTOPRC` override, the XDG
//! config directory, and, as a one-time migration source, the legacy
//! `~/.htoprc` dotfile. Directory creation and the legacy eligibility
//! checks run with effective privilege dropped.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::privilege::PrivilegeScope;

/// Compiled-in directory of the read-only system-wide fallback file.
const SYSCONFDIR: &str = "/etc";

/// Environment variable overriding the configuration path entirely.
pub const CONFIG_PATH_ENV: &str = "HTOPRC";

/// Resolved configuration locations for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    /// File used for the initial parse (unless `legacy` is set) and for
    /// every save.
    pub filename: PathBuf,
    /// Eligible legacy dotfile awaiting migration, if any.
    pub legacy: Option<PathBuf>,
    /// Read-only system-wide fallback consulted when the user file is
    /// unreadable.
    pub system: PathBuf,
}

impl ConfigPaths {
    /// Resolves from the real process environment.
    pub fn resolve() -> Self {
        Self::resolve_from(
            env::var_os(CONFIG_PATH_ENV),
            env::var_os("XDG_CONFIG_HOME"),
            env::var_os("HOME"),
        )
    }

    /// Resolution from explicit environment inputs.
    ///
    /// With an override the path is taken verbatim and nothing is touched
    /// on disk. Otherwise the `htop` config directory is created (mode
    /// 0700, errors ignored) and the legacy dotfile is checked for
    /// migration eligibility, all with effective privilege dropped. A
    /// missing home behaves as the empty path.
    pub fn resolve_from(
        override_path: Option<OsString>,
        xdg_config_home: Option<OsString>,
        home: Option<OsString>,
    ) -> Self {
        if let Some(rcfile) = override_path {
            return ConfigPaths {
                filename: PathBuf::from(rcfile),
                legacy: None,
                system: Self::system_default(),
            };
        }

        let home = PathBuf::from(home.unwrap_or_default());
        let config_dir = match xdg_config_home {
            Some(xdg) => PathBuf::from(xdg),
            None => home.join(".config"),
        };
        let htop_dir = config_dir.join("htop");
        let legacy_dotfile = home.join(".htoprc");

        let _scope = PrivilegeScope::enter();
        let _ = create_private_dir(&config_dir);
        let _ = create_private_dir(&htop_dir);
        let legacy = eligible_legacy(&legacy_dotfile);

        ConfigPaths {
            filename: htop_dir.join("htoprc"),
            legacy,
            system: Self::system_default(),
        }
    }

    /// Read-only system-wide fallback file.
    pub fn system_default() -> PathBuf {
        Path::new(SYSCONFDIR).join("htoprc")
    }
}

fn create_private_dir(path: &Path) -> std::io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder.create(path)
}

/// A dotfile qualifies for migration only when it exists, is not a
/// symbolic link, and is readable by the real user. The symlink refusal
/// matters when the binary carries elevated permission bits.
fn eligible_legacy(path: &Path) -> Option<PathBuf> {
    let meta = fs::symlink_metadata(path).ok()?;
    if meta.file_type().is_symlink() {
        return None;
    }
    if !readable_by_real_user(path) {
        return None;
    }
    Some(path.to_path_buf())
}

#[cfg(unix)]
fn readable_by_real_user(path: &Path) -> bool {
    use nix::unistd::{access, AccessFlags};
    access(path, AccessFlags::R_OK).is_ok()
}

#[cfg(not(unix))]
fn readable_by_real_user(path: &Path) -> bool {
    fs::File::open(path).is_ok()
}
