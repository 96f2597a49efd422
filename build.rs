fn main() {
    #[cfg(target_os = "windows")]
    {
        windows_exe_info::versioninfo::VersionInfo::from_cargo_env_ex(
            Some("WaveTrim Audio Trim Editor"),
            Some("WaveTrim"),
            None,
            None,
        )
        .link()
        .expect("failed to link version info");
    }
}
