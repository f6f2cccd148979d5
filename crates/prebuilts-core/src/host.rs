//! Host platforms and target architectures prebuilts are produced for.
//!
//! The same host goes by different names depending on who is asking: the NDK
//! tags its toolchain directories `linux-x86_64`, the platform prebuilts tree
//! uses `linux-x86`, and the build server names its targets `linux_<arch>`.

use std::fmt;

use serde::Deserialize;

/// A host operating system the toolchains run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Host {
    Darwin,
    Linux,
    /// 32-bit Windows.
    Windows,
    /// 64-bit Windows.
    Windows64,
}

impl Host {
    /// Every host, in the order links and packages are processed.
    pub const ALL: [Host; 4] = [Host::Darwin, Host::Linux, Host::Windows, Host::Windows64];

    /// NDK host tag, used for `current/toolchains/<tag>`.
    pub fn ndk_tag(self) -> &'static str {
        match self {
            Host::Darwin => "darwin-x86_64",
            Host::Linux => "linux-x86_64",
            Host::Windows => "windows",
            Host::Windows64 => "windows-x86_64",
        }
    }

    /// Host tag used under `prebuilts/clang/host`.
    pub fn prebuilt_tag(self) -> &'static str {
        match self {
            Host::Darwin => "darwin-x86",
            Host::Linux => "linux-x86",
            Host::Windows => "windows-x86_32",
            Host::Windows64 => "windows-x86",
        }
    }

    /// Short name used in build server target names and package names.
    pub fn short_name(self) -> &'static str {
        match self {
            Host::Darwin => "darwin",
            Host::Linux => "linux",
            Host::Windows => "win",
            Host::Windows64 => "win64",
        }
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ndk_tag())
    }
}

/// A target CPU architecture.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    Arm,
    Arm64,
    X86,
    X86_64,
}

impl Arch {
    /// Every architecture the NDK ships.
    pub const ALL: [Arch; 4] = [Arch::Arm, Arch::Arm64, Arch::X86, Arch::X86_64];

    pub fn name(self) -> &'static str {
        match self {
            Arch::Arm => "arm",
            Arch::Arm64 => "arm64",
            Arch::X86 => "x86",
            Arch::X86_64 => "x86_64",
        }
    }

    /// GCC toolchain name for this architecture.
    pub fn gcc_toolchain(self) -> &'static str {
        match self {
            Arch::Arm => "arm-linux-androideabi",
            Arch::Arm64 => "aarch64-linux-android",
            Arch::X86 => "x86",
            Arch::X86_64 => "x86_64",
        }
    }

    /// Directory the GCC toolchain for this architecture is installed in.
    pub fn gcc_toolchain_dir(self) -> String {
        format!("{}-4.9", self.gcc_toolchain())
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_tags() {
        assert_eq!(Host::Linux.ndk_tag(), "linux-x86_64");
        assert_eq!(Host::Windows.ndk_tag(), "windows");
        assert_eq!(Host::Darwin.prebuilt_tag(), "darwin-x86");
        assert_eq!(Host::Windows.prebuilt_tag(), "windows-x86_32");
        assert_eq!(Host::Windows64.prebuilt_tag(), "windows-x86");
        assert_eq!(Host::Windows64.short_name(), "win64");
    }

    #[test]
    fn gcc_toolchain_dirs() {
        assert_eq!(Arch::Arm.gcc_toolchain_dir(), "arm-linux-androideabi-4.9");
        assert_eq!(Arch::Arm64.gcc_toolchain_dir(), "aarch64-linux-android-4.9");
        assert_eq!(Arch::X86_64.gcc_toolchain_dir(), "x86_64-4.9");
    }

    #[derive(Deserialize)]
    struct Lists {
        hosts: Vec<Host>,
        arches: Vec<Arch>,
    }

    #[test]
    fn deserialize_from_lowercase_names() {
        let lists: Lists =
            toml::from_str("hosts = [\"darwin\", \"windows64\"]\narches = [\"arm64\", \"x86_64\"]")
                .unwrap();
        assert_eq!(lists.hosts, vec![Host::Darwin, Host::Windows64]);
        assert_eq!(lists.arches, vec![Arch::Arm64, Arch::X86_64]);
    }
}
