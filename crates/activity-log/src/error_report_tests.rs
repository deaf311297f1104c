use super::*;

#[test]
fn host_info_snapshot_fills_os_and_arch() {
    let host = HostInfo::snapshot("1.0.0");
    assert_eq!(host.os, std::env::consts::OS);
    assert_eq!(host.arch, std::env::consts::ARCH);
    assert_eq!(host.app_version, "1.0.0");
}
