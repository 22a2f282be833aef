use super::*;
use stablepin_core::{
    HostFailure, InstalledPackage, PackageDescriptor, PackageHost, PackageVersion, PinEntry,
    PinStore,
};
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

static TEST_LAYOUT_COUNTER: AtomicU64 = AtomicU64::new(0);

fn build_test_layout_path(nanos: u128) -> PathBuf {
    let mut path = std::env::temp_dir();
    let sequence = TEST_LAYOUT_COUNTER.fetch_add(1, Ordering::Relaxed);
    path.push(format!(
        "stablepin-installer-tests-{}-{}-{}",
        std::process::id(),
        nanos,
        sequence
    ));
    path
}

fn test_layout() -> PrefixLayout {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("system time")
        .as_nanos();
    PrefixLayout::new(build_test_layout_path(nanos))
}

fn version(raw: &str) -> PackageVersion {
    raw.parse().expect("version should parse")
}

fn descriptor(name: &str, raw_version: &str, repository: &str) -> PackageDescriptor {
    PackageDescriptor {
        package_name: name.to_string(),
        version: version(raw_version),
        source_repository_name: repository.to_string(),
    }
}

fn installed(name: &str, raw_version: &str, repository: &str) -> InstalledPackage {
    InstalledPackage::from(&descriptor(name, raw_version, repository))
}

#[test]
fn build_test_layout_path_disambiguates_same_timestamp_calls() {
    let first = build_test_layout_path(42);
    let second = build_test_layout_path(42);
    assert_ne!(first, second);
}

#[test]
fn receipt_round_trip() {
    let layout = test_layout();
    layout.ensure_base_dirs().expect("must create dirs");

    let receipt = InstallReceipt {
        name: "magit".to_string(),
        version: version("20140204.291"),
        repository: "melpa".to_string(),
        installed_at_unix: 1_771_001_234,
    };
    write_install_receipt(&layout, &receipt).expect("must write receipt");

    let loaded = read_install_receipt(&layout, "magit", "20140204.291")
        .expect("must read receipt")
        .expect("receipt must exist");
    assert_eq!(loaded, receipt);

    let _ = fs::remove_dir_all(layout.prefix());
}

#[test]
fn parse_receipt_requires_repository() {
    let err = receipts::parse_receipt("name=magit\nversion=1.2\ninstalled_at_unix=1\n")
        .expect_err("repository is required");
    assert!(err.to_string().contains("missing repository"));
}

#[test]
fn parse_receipt_ignores_unknown_keys() {
    let receipt = receipts::parse_receipt(
        "name=magit\nversion=1.2\nrepository=melpa-stable\nchecksum=abc\ninstalled_at_unix=7\n",
    )
    .expect("unknown keys are ignored");
    assert_eq!(receipt.repository, "melpa-stable");
    assert_eq!(receipt.installed_at_unix, 7);
}

#[test]
fn read_installed_registry_orders_by_name_then_version() {
    let layout = test_layout();
    layout.ensure_base_dirs().expect("must create dirs");

    for (name, raw_version) in [("zz", "1.0"), ("aa", "2.0"), ("aa", "1.5")] {
        write_install_receipt(
            &layout,
            &InstallReceipt::for_descriptor(&descriptor(name, raw_version, "gnu"), 1),
        )
        .expect("must write receipt");
    }

    let registry = read_installed_registry(&layout).expect("must read registry");
    let order = registry
        .records()
        .map(|record| format!("{} {}", record.package_name, record.version))
        .collect::<Vec<_>>();
    assert_eq!(order, vec!["aa 1.5", "aa 2.0", "zz 1.0"]);

    let _ = fs::remove_dir_all(layout.prefix());
}

#[test]
fn read_install_receipts_on_missing_dir_is_empty() {
    let layout = test_layout();
    assert!(read_install_receipts(&layout)
        .expect("missing dir is not an error")
        .is_empty());
}

#[test]
fn append_pins_skips_pairs_already_recorded() {
    let layout = test_layout();
    layout.ensure_base_dirs().expect("must create dirs");

    let first = append_pins(
        &layout,
        &[
            PinEntry::new("foo", "melpa-stable"),
            PinEntry::new("bar", "melpa-stable"),
        ],
    )
    .expect("must append pins");
    assert_eq!(first, 2);

    let second = append_pins(
        &layout,
        &[
            PinEntry::new("foo", "melpa-stable"),
            PinEntry::new("baz", "melpa-stable"),
            PinEntry::new("baz", "melpa-stable"),
        ],
    )
    .expect("must append pins");
    assert_eq!(second, 1);

    let pins = read_pins(&layout).expect("must read pins");
    assert_eq!(
        pins,
        vec![
            PinEntry::new("foo", "melpa-stable"),
            PinEntry::new("bar", "melpa-stable"),
            PinEntry::new("baz", "melpa-stable"),
        ]
    );

    let _ = fs::remove_dir_all(layout.prefix());
}

#[test]
fn append_pins_preserves_existing_lines() {
    let layout = test_layout();
    layout.ensure_base_dirs().expect("must create dirs");
    fs::write(layout.pins_path(), "# hand pinned\nmagit=melpa-stable\n").expect("must seed pins");

    append_pins(&layout, &[PinEntry::new("dash", "melpa-stable")]).expect("must append");

    let raw = fs::read_to_string(layout.pins_path()).expect("must read pin file");
    assert_eq!(
        raw,
        "# hand pinned\nmagit=melpa-stable\ndash=melpa-stable\n"
    );

    let _ = fs::remove_dir_all(layout.prefix());
}

#[test]
fn read_pins_rejects_malformed_line() {
    let layout = test_layout();
    layout.ensure_base_dirs().expect("must create dirs");
    fs::write(layout.pins_path(), "magit\n").expect("must seed pins");

    let err = read_pins(&layout).expect_err("line without '=' must fail");
    assert!(err.to_string().contains("malformed pin on line 1"));

    let _ = fs::remove_dir_all(layout.prefix());
}

#[test]
fn prefix_host_install_then_uninstall() {
    let layout = test_layout();
    layout.ensure_base_dirs().expect("must create dirs");
    let mut host = PrefixHost::new(layout.clone());

    let stable = descriptor("foo", "1.2.0", "melpa-stable");
    host.install(&stable).expect("must install");
    assert!(layout.package_dir("foo", "1.2.0").is_dir());
    let registry = read_installed_registry(&layout).expect("must read registry");
    assert_eq!(
        registry.get("foo"),
        &[installed("foo", "1.2.0", "melpa-stable")]
    );

    host.uninstall(&installed("foo", "1.2.0", "melpa-stable"))
        .expect("must uninstall");
    assert!(!layout.package_dir("foo", "1.2.0").exists());
    assert!(!layout.pkgs_dir().join("foo").exists());
    assert!(read_installed_registry(&layout)
        .expect("must read registry")
        .is_empty());

    let _ = fs::remove_dir_all(layout.prefix());
}

#[test]
fn prefix_host_uninstall_missing_package_is_uninstall_failure() {
    let layout = test_layout();
    layout.ensure_base_dirs().expect("must create dirs");
    let mut host = PrefixHost::new(layout.clone());

    let err = host
        .uninstall(&installed("foo", "20140101.5", "melpa"))
        .expect_err("missing package must fail");
    match err.downcast_ref::<HostFailure>() {
        Some(HostFailure::Uninstall { name, reason, .. }) => {
            assert_eq!(name, "foo");
            assert!(reason.contains("not installed"));
        }
        other => panic!("unexpected failure: {other:?}"),
    }

    let _ = fs::remove_dir_all(layout.prefix());
}

#[test]
fn prefix_host_uninstall_rejects_repository_mismatch() {
    let layout = test_layout();
    layout.ensure_base_dirs().expect("must create dirs");
    let mut host = PrefixHost::new(layout.clone());
    host.install(&descriptor("foo", "20140101.5", "melpa"))
        .expect("must install");

    let err = host
        .uninstall(&installed("foo", "20140101.5", "other"))
        .expect_err("mismatched repository must fail");
    assert!(matches!(
        err.downcast_ref::<HostFailure>(),
        Some(HostFailure::Uninstall { .. })
    ));
    assert!(layout.receipt_path("foo", "20140101.5").exists());

    let _ = fs::remove_dir_all(layout.prefix());
}

#[test]
fn prefix_host_install_same_descriptor_twice_is_noop() {
    let layout = test_layout();
    layout.ensure_base_dirs().expect("must create dirs");
    let mut host = PrefixHost::new(layout.clone());
    let stable = descriptor("foo", "1.2.0", "melpa-stable");
    host.install(&stable).expect("must install");
    let first = read_install_receipt(&layout, "foo", "1.2.0")
        .expect("must read receipt")
        .expect("receipt must exist");

    host.install(&stable).expect("repeat install must succeed");
    assert_eq!(
        read_install_receipt(&layout, "foo", "1.2.0").expect("must read receipt"),
        Some(first)
    );

    let _ = fs::remove_dir_all(layout.prefix());
}

#[test]
fn prefix_host_install_version_from_other_repository_is_install_failure() {
    let layout = test_layout();
    layout.ensure_base_dirs().expect("must create dirs");
    let mut host = PrefixHost::new(layout.clone());
    host.install(&descriptor("foo", "1.2.0", "gnu"))
        .expect("must install");

    let err = host
        .install(&descriptor("foo", "1.2.0", "melpa-stable"))
        .expect_err("install over another repository's copy must fail");
    match err.downcast_ref::<HostFailure>() {
        Some(HostFailure::Install {
            repository, reason, ..
        }) => {
            assert_eq!(repository, "melpa-stable");
            assert!(reason.contains("already installed from 'gnu'"));
        }
        other => panic!("unexpected failure: {other:?}"),
    }

    let _ = fs::remove_dir_all(layout.prefix());
}

#[test]
fn prefix_host_replaces_two_synthetic_records_with_one_stable_copy() {
    let layout = test_layout();
    layout.ensure_base_dirs().expect("must create dirs");
    let mut host = PrefixHost::new(layout.clone());
    host.install(&descriptor("foo", "20140101.5", "melpa"))
        .expect("must install first build");
    host.install(&descriptor("foo", "20140202.7", "melpa"))
        .expect("must install second build");

    let stable = descriptor("foo", "1.2.0", "melpa-stable");
    for raw_version in ["20140101.5", "20140202.7"] {
        host.uninstall(&installed("foo", raw_version, "melpa"))
            .expect("must uninstall synthetic build");
        host.install(&stable).expect("must install stable copy");
    }

    let registry = read_installed_registry(&layout).expect("must read installed");
    assert_eq!(registry.get("foo"), &[InstalledPackage::from(&stable)]);
    assert!(layout.package_dir("foo", "1.2.0").exists());
    assert!(!layout.package_dir("foo", "20140202.7").exists());

    let _ = fs::remove_dir_all(layout.prefix());
}

#[test]
fn prefix_host_pin_store_appends_to_pin_file() {
    let layout = test_layout();
    layout.ensure_base_dirs().expect("must create dirs");
    let mut host = PrefixHost::new(layout.clone());

    let added = host
        .append_pins(&[PinEntry::new("foo", "melpa-stable")])
        .expect("must append");
    assert_eq!(added, 1);
    assert_eq!(
        read_pins(&layout).expect("must read pins"),
        vec![PinEntry::new("foo", "melpa-stable")]
    );

    let _ = fs::remove_dir_all(layout.prefix());
}
