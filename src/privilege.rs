//! Scoped effective-privilege drop
//!
//! The host binary may be installed with elevated permission bits so the
//! process scanner can see other users' tasks. Configuration files must
//! never be touched with those credentials, so every filesystem access in
//! this crate runs inside a [`PrivilegeScope`].

#[cfg(unix)]
use nix::unistd::{geteuid, getuid, seteuid, Uid};

/// Drops the effective uid to the real uid for the lifetime of the guard.
///
/// The saved euid is restored on drop, on every exit path. Set/restore
/// failures are not reported; for an unprivileged process both calls are
/// no-ops.
#[cfg(unix)]
#[derive(Debug)]
pub struct PrivilegeScope {
    saved: Uid,
}

#[cfg(unix)]
impl PrivilegeScope {
    pub fn enter() -> Self {
        let saved = geteuid();
        let _ = seteuid(getuid());
        PrivilegeScope { saved }
    }
}

#[cfg(unix)]
impl Drop for PrivilegeScope {
    fn drop(&mut self) {
        let _ = seteuid(self.saved);
    }
}

/// No privilege identity to juggle outside unix.
#[cfg(not(unix))]
#[derive(Debug)]
pub struct PrivilegeScope;

#[cfg(not(unix))]
impl PrivilegeScope {
    pub fn enter() -> Self {
        PrivilegeScope
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_scope_restores_euid() {
        let before = geteuid();
        {
            let _scope = PrivilegeScope::enter();
            // Unprivileged test runs keep euid == uid throughout.
            assert_eq!(geteuid(), getuid());
        }
        assert_eq!(geteuid(), before);
    }

    #[test]
    fn test_nested_scopes() {
        let before = geteuid();
        {
            let _outer = PrivilegeScope::enter();
            {
                let _inner = PrivilegeScope::enter();
            }
            assert_eq!(geteuid(), getuid());
        }
        assert_eq!(geteuid(), before);
    }
}
