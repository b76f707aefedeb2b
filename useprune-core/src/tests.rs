//! End-to-end test suite for useprune-core over synthetic package databases.

use crate::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

const PY36: &str = "python_targets_python3_6";

fn setup_temp_db() -> PathBuf {
    let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir()
        .join("useprune_tests")
        .join(format!("{}_{}", timestamp, id));

    if dir.exists() {
        fs::remove_dir_all(&dir).ok();
    }
    fs::create_dir_all(dir.join("pkg")).unwrap();
    dir
}

/// Writes an installed record `<root>/pkg/<cpf>` with the given files.
fn write_record(root: &Path, cpf: &str, slot: &str, use_flags: &str, rdepend: &str) {
    let dir = root.join("pkg").join(cpf);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("environment.bz2"), "").unwrap();
    fs::write(dir.join("SLOT"), format!("{}\n", slot)).unwrap();
    fs::write(dir.join("USE"), format!("{}\n", use_flags)).unwrap();
    fs::write(dir.join("RDEPEND"), format!("{}\n", rdepend)).unwrap();
}

fn write_world(root: &Path, content: &str) {
    fs::write(root.join("world"), content).unwrap();
}

fn audit(root: &Path) -> AuditReport {
    UsePrune::new()
        .pkg_dir(root.join("pkg"))
        .world_file(root.join("world"))
        .analyze()
        .unwrap()
}

fn lines(report: &AuditReport) -> Vec<String> {
    report.unpulled.iter().map(ToString::to_string).collect()
}

// Core Test 1: justified package is silent, unjustified one is reported
#[test]
fn test_world_dependency_justifies_flag() {
    let root = setup_temp_db();
    write_world(&root, "dev-python/python-slip\n");
    write_record(
        &root,
        "dev-python/python-slip-0.6.5",
        "0",
        &format!("{} dbus", PY36),
        "app-misc/p[python_targets_python3_6]",
    );
    write_record(&root, "app-misc/p-1.0", "0", PY36, "");
    write_record(&root, "app-misc/q-1.0", "0", PY36, "sys-libs/glibc");

    let report = audit(&root);
    assert_eq!(
        lines(&report),
        vec!["app-misc/q:0[python_targets_python3_6] is not pulled by any world packages"]
    );
}

// Core Test 1b: depending on a world package does not justify one's own flag
#[test]
fn test_depending_on_world_is_not_justification() {
    let root = setup_temp_db();
    write_world(&root, "dev-python/python-slip\n");
    write_record(&root, "dev-python/python-slip-0.6.5", "0", PY36, "");
    write_record(
        &root,
        "app-misc/p-1.0",
        "0",
        PY36,
        "dev-python/python-slip[python_targets_python3_6]",
    );

    assert_eq!(
        lines(&audit(&root)),
        vec!["app-misc/p:0[python_targets_python3_6] is not pulled by any world packages"]
    );
}

// Core Test 2: the dependent side is what matters. A world package that
// depends on P with the flag justifies P keeping it.
#[test]
fn test_world_dependent_justifies_dependency() {
    let root = setup_temp_db();
    write_world(&root, "app-admin/setroubleshoot\n");
    write_record(
        &root,
        "app-admin/setroubleshoot-3.3.32",
        "0",
        PY36,
        ">=dev-python/python-slip-0.2.7[dbus,python_targets_python3_6(-)?]",
    );
    write_record(&root, "dev-python/python-slip-0.6.5", "0", PY36, "");

    assert!(audit(&root).unpulled.is_empty());
}

// Core Test 3: transitive chain through a non-world package
#[test]
fn test_transitive_justification() {
    let root = setup_temp_db();
    write_world(&root, "app-editors/editor\n");
    write_record(
        &root,
        "app-editors/editor-2.0",
        "0",
        "",
        "dev-python/mid-1.0[python_targets_python3_6]",
    );
    write_record(
        &root,
        "dev-python/mid-1.0",
        "0",
        PY36,
        "dev-python/leaf-3.2.1[python_targets_python3_6(-)]",
    );
    write_record(&root, "dev-python/leaf-3.2.1", "0", PY36, "");

    assert!(audit(&root).unpulled.is_empty());
}

// Core Test 4: a dependency cycle with no world exit is reported, not looped on
#[test]
fn test_cycle_is_reported() {
    let root = setup_temp_db();
    write_world(&root, "app-misc/unrelated\n");
    write_record(
        &root,
        "dev-python/a-1",
        "0",
        PY36,
        "dev-python/b[python_targets_python3_6]",
    );
    write_record(
        &root,
        "dev-python/b-1",
        "0",
        PY36,
        "dev-python/a[python_targets_python3_6]",
    );

    assert_eq!(
        lines(&audit(&root)),
        vec![
            "dev-python/a:0[python_targets_python3_6] is not pulled by any world packages",
            "dev-python/b:0[python_targets_python3_6] is not pulled by any world packages",
        ]
    );
}

// Core Test 5: an edge under one flag does not justify another flag
#[test]
fn test_flags_do_not_leak() {
    let root = setup_temp_db();
    write_world(&root, "app-emulation/wine\n");
    write_record(
        &root,
        "app-emulation/wine-9.0",
        "0",
        "abi_x86_32 abi_x86_64",
        "media-libs/mesa[abi_x86_32(-)]",
    );
    write_record(&root, "media-libs/mesa-24.1.0", "0", "abi_x86_32 abi_x86_64", "");

    assert_eq!(
        lines(&audit(&root)),
        vec!["media-libs/mesa:0[abi_x86_64] is not pulled by any world packages"]
    );
}

// Core Test 6: slot-qualified world entries only match their slot
#[test]
fn test_slotted_world_entry() {
    let root = setup_temp_db();
    write_world(&root, "dev-lang/ruby:3.2\n");
    write_record(&root, "dev-lang/ruby-3.1.4", "3.1/3.1", "ruby_targets_ruby31", "");
    write_record(&root, "dev-lang/ruby-3.2.2", "3.2/3.2", "ruby_targets_ruby32", "");

    assert_eq!(
        lines(&audit(&root)),
        vec!["dev-lang/ruby:3.1[ruby_targets_ruby31] is not pulled by any world packages"]
    );
}

// Core Test 7: the version-control tool counts as world even if unlisted
#[test]
fn test_git_is_always_world() {
    let root = setup_temp_db();
    write_world(&root, "");
    write_record(&root, "dev-vcs/git-2.45.2", "0", "", "dev-lang/perl[abi_x86_32]");
    write_record(&root, "dev-lang/perl-5.38.2", "0/5.38", "abi_x86_32", "");

    assert!(audit(&root).unpulled.is_empty());

    let report = UsePrune::new()
        .pkg_dir(root.join("pkg"))
        .world_file(root.join("world"))
        .extra_world(Vec::<String>::new())
        .analyze()
        .unwrap();
    assert_eq!(report.unpulled.len(), 1);
}

// Core Test 7b: versioned extra-world entries still match the installed package
#[test]
fn test_versioned_extra_world_entry() {
    let root = setup_temp_db();
    write_world(&root, "");
    write_record(&root, "app-portage/eix-0.36.7", "0", "", "dev-lang/perl[abi_x86_32]");
    write_record(&root, "dev-lang/perl-5.38.2", "0/5.38", "abi_x86_32", "");

    let report = UsePrune::new()
        .pkg_dir(root.join("pkg"))
        .world_file(root.join("world"))
        .extra_world([">=app-portage/eix-0.36"])
        .analyze()
        .unwrap();
    assert!(report.unpulled.is_empty());
}

// Core Test 8: blockers and disabled requirements add no edges
#[test]
fn test_blockers_and_disabled_flags_ignored() {
    let root = setup_temp_db();
    write_world(&root, "app-misc/tool\n");
    write_record(
        &root,
        "app-misc/tool-1.0",
        "0",
        "",
        "!dev-python/old[python_targets_python3_6] dev-python/new[-python_targets_python3_6]",
    );
    write_record(&root, "dev-python/new-1.0", "0", PY36, "");
    write_record(&root, "dev-python/old-1.0", "0", PY36, "");

    assert_eq!(audit(&root).unpulled.len(), 2);
}

// Core Test 9: non-target flags are never reported
#[test]
fn test_non_target_flags_ignored() {
    let root = setup_temp_db();
    write_world(&root, "");
    write_record(&root, "net-misc/curl-8.8.0", "0", "ssl http2 lua_targets_luajit", "");

    let report = audit(&root);
    assert!(report.unpulled.is_empty());
    assert_eq!(report.stats.flags, 0);
}

// Error Test 1: malformed dependency atom aborts
#[test]
fn test_malformed_atom_aborts() {
    let root = setup_temp_db();
    write_world(&root, "");
    write_record(&root, "app-misc/bad-1.0", "0", PY36, "python-slip[python_targets_python3_6]");

    let err = UsePrune::new()
        .pkg_dir(root.join("pkg"))
        .world_file(root.join("world"))
        .analyze()
        .unwrap_err();
    assert!(matches!(err, UsePruneError::MalformedSpec { .. }));
}

// Error Test 2: a marked record without SLOT aborts
#[test]
fn test_missing_slot_aborts() {
    let root = setup_temp_db();
    write_world(&root, "");
    let dir = root.join("pkg/app-misc/broken-1.0");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("environment.bz2"), "").unwrap();
    fs::write(dir.join("USE"), PY36).unwrap();

    let err = UsePrune::new()
        .pkg_dir(root.join("pkg"))
        .world_file(root.join("world"))
        .analyze()
        .unwrap_err();
    assert!(matches!(err, UsePruneError::MissingRecordFile { .. }));
}

// Error Test 3: missing world file aborts
#[test]
fn test_missing_world_aborts() {
    let root = setup_temp_db();
    let err = UsePrune::new()
        .pkg_dir(root.join("pkg"))
        .world_file(root.join("world"))
        .analyze()
        .unwrap_err();
    assert!(matches!(err, UsePruneError::Io { .. }));
}

// Error Test 4: a world token without a category aborts
#[test]
fn test_malformed_world_entry_aborts() {
    let root = setup_temp_db();
    write_world(&root, "dev-python/six\npython-slip\n");
    write_record(&root, "dev-python/six-1.16.0", "0", PY36, "");

    let err = UsePrune::new()
        .pkg_dir(root.join("pkg"))
        .world_file(root.join("world"))
        .analyze()
        .unwrap_err();
    assert!(matches!(err, UsePruneError::MalformedSpec { ref spec } if spec == "python-slip"));
}

// Output Test: output is stable across runs
#[test]
fn test_report_is_reproducible() {
    let root = setup_temp_db();
    write_world(&root, "");
    for name in ["zeta", "alpha", "mid"] {
        write_record(
            &root,
            &format!("dev-python/{}-1.0", name),
            "0",
            "python_targets_python3_12 python_targets_python3_11",
            "",
        );
    }

    let first = lines(&audit(&root));
    let second = lines(&audit(&root));
    assert_eq!(first, second);
    assert_eq!(
        first,
        vec![
            "dev-python/alpha:0[python_targets_python3_12] is not pulled by any world packages",
            "dev-python/mid:0[python_targets_python3_12] is not pulled by any world packages",
            "dev-python/zeta:0[python_targets_python3_12] is not pulled by any world packages",
            "dev-python/alpha:0[python_targets_python3_11] is not pulled by any world packages",
            "dev-python/mid:0[python_targets_python3_11] is not pulled by any world packages",
            "dev-python/zeta:0[python_targets_python3_11] is not pulled by any world packages",
        ]
    );
}

// Session Test: components can be driven separately
#[test]
fn test_manual_pipeline() {
    let root = setup_temp_db();
    write_record(
        &root,
        "app-misc/p-1.0",
        "0",
        PY36,
        "dev-python/python-slip[python_targets_python3_6]",
    );
    write_record(&root, "dev-python/python-slip-0.6.5", "0", PY36, "");

    let records = read_installed(&root.join("pkg")).unwrap();
    let (graph, using) = build_rdep_graph(&records, &TargetPattern::default()).unwrap();
    let world = WorldSet::from_entries(["app-misc/p"]).unwrap();

    let mut memo = ReachMemo::new();
    for pkg in using.get(PY36).unwrap() {
        let found = reaches_world(PY36, pkg, &graph, &world, &mut memo);
        assert_eq!(found.len(), 1, "{} should reach app-misc/p", pkg);
    }
    assert_eq!(memo.len(), 2);
}
