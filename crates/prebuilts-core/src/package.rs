//! Build server artifact names for each prebuilt package.

use crate::host::{Arch, Host};

/// A build artifact: the build server target that produces it and its file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    /// Build server target name, e.g. `linux_arm64`.
    pub target: String,
    /// Artifact file name, e.g. `binutils-arm64-linux.tar.bz2`.
    pub file_name: String,
}

impl Package {
    /// The binutils package built for `arch` running on `host`.
    pub fn binutils(host: Host, arch: Arch) -> Self {
        Package {
            target: build_target(host, arch),
            file_name: format!("binutils-{arch}-{}.tar.bz2", host.short_name()),
        }
    }

    /// The GCC package built for `arch` running on `host`.
    pub fn gcc(host: Host, arch: Arch) -> Self {
        Package {
            target: build_target(host, arch),
            file_name: format!("gcc-{arch}-{}.tar.bz2", host.ndk_tag()),
        }
    }

    /// The platform sysroot package.
    pub fn platform() -> Self {
        Package {
            target: "ndk".to_string(),
            file_name: "ndk_platform.tar.bz2".to_string(),
        }
    }
}

fn build_target(host: Host, arch: Arch) -> String {
    format!("{}_{arch}", host.short_name())
}
