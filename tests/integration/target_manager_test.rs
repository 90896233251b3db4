// End-to-end behaviour of the target/LUN operations against a fake ietd

use super::support::{FakeRunner, Fixture, BASE};
use ietlv::core::{Overrides, TargetManager};
use ietlv::IetError;

const VOLUMES: &str = "\
tid:1 name:iqn.2007-12.net.enpraxis:web
\tlun:0 state:0 iotype:blockio iomode:wt blocks:2097152 blocksize:512 path:/dev/vg_spare/web_0
tid:4 name:iqn.2007-12.net.enpraxis:db
";

const CONF: &str = "\
# managed by ietlv
Target 1 iqn.2007-12.net.enpraxis:web
\tLun 0 PATH=/dev/vg_spare/web_0,Type=blockio
Target 4 iqn.2007-12.net.enpraxis:db
";

#[test]
fn test_add_target_end_to_end() {
    let fx = Fixture::new(VOLUMES, CONF);
    let mgr = fx.manager(FakeRunner::default());

    let info = mgr.add_target("test").unwrap();

    assert_eq!(info.iqn, format!("{}:test", BASE));
    assert_eq!(info.iqn, "iqn.2007-12.net.enpraxis:test");
    assert_eq!(info.tid, 5);
    assert_eq!(
        mgr.runner().actions(),
        vec!["ietadm --op new --tid 5 --params Name=iqn.2007-12.net.enpraxis:test"]
    );
    assert_eq!(
        fx.ietd_conf(),
        format!("{}Target 5 iqn.2007-12.net.enpraxis:test\n", CONF)
    );
}

#[test]
fn test_add_target_on_empty_table_uses_tid_one() {
    let fx = Fixture::new("", "");
    let mgr = fx.manager(FakeRunner::default());

    let info = mgr.add_target("first").unwrap();
    assert_eq!(info.tid, 1);
    assert_eq!(fx.ietd_conf(), "Target 1 iqn.2007-12.net.enpraxis:first\n");
}

#[test]
fn test_add_existing_target_is_refused() {
    let fx = Fixture::new(VOLUMES, CONF);
    let mgr = fx.manager(FakeRunner::default());

    let err = mgr.add_target("web").unwrap_err();
    assert!(matches!(err, IetError::TargetExists(ref iqn) if iqn == "iqn.2007-12.net.enpraxis:web"));
    assert!(mgr.runner().actions().is_empty());
    assert_eq!(fx.ietd_conf(), CONF);
}

#[test]
fn test_failed_target_creation_leaves_config_alone() {
    let fx = Fixture::new(VOLUMES, CONF);
    let mgr = fx.manager(FakeRunner::failing("ietadm --op new", 2));

    let err = mgr.add_target("test").unwrap_err();
    assert_eq!(err.exit_code(), Some(2));
    assert_eq!(fx.ietd_conf(), CONF);
}

#[test]
fn test_overrides_change_the_iqn_and_config_file() {
    let fx = Fixture::new(VOLUMES, CONF);
    let other_conf = fx.dir.path().join("other.conf");
    let overrides = Overrides {
        iqn_base: Some("iqn.2024-01.org.example".to_string()),
        ietd_config: Some(other_conf.clone()),
        ..Default::default()
    };
    let settings = fx.config().resolve(&overrides).unwrap();
    let mgr = TargetManager::with_runner(settings, FakeRunner::default());

    let info = mgr.add_target("test").unwrap();
    assert_eq!(info.iqn, "iqn.2024-01.org.example:test");
    assert_eq!(
        std::fs::read_to_string(other_conf).unwrap(),
        "Target 5 iqn.2024-01.org.example:test\n"
    );
    assert_eq!(fx.ietd_conf(), CONF);
}

#[test]
fn test_delete_target_removes_its_block_only() {
    let fx = Fixture::new(VOLUMES, CONF);
    let mgr = fx.manager(FakeRunner::default());

    let removal = mgr.delete_target("web", false).unwrap();

    assert_eq!(removal.tid, 1);
    assert_eq!(removal.volumes, vec!["/dev/vg_spare/web_0"]);
    assert!(removal.purged.is_empty());
    assert_eq!(mgr.runner().actions(), vec!["ietadm --op delete --tid 1"]);
    assert_eq!(
        fx.ietd_conf(),
        "# managed by ietlv\nTarget 4 iqn.2007-12.net.enpraxis:db\n"
    );
}

#[test]
fn test_delete_target_with_purge_removes_volumes() {
    let fx = Fixture::new(VOLUMES, CONF);
    let mgr = fx.manager(FakeRunner::default());

    let removal = mgr.delete_target("web", true).unwrap();

    assert_eq!(removal.purged, vec!["/dev/vg_spare/web_0"]);
    assert_eq!(
        mgr.runner().actions(),
        vec!["ietadm --op delete --tid 1", "lvremove -f /dev/vg_spare/web_0"]
    );
}

#[test]
fn test_delete_unknown_target() {
    let fx = Fixture::new(VOLUMES, CONF);
    let mgr = fx.manager(FakeRunner::default());

    let err = mgr.delete_target("missing", false).unwrap_err();
    assert!(matches!(err, IetError::TargetNotFound(_)));
    assert!(mgr.runner().actions().is_empty());
    assert_eq!(fx.ietd_conf(), CONF);
}

#[test]
fn test_failed_target_deletion_leaves_config_alone() {
    let fx = Fixture::new(VOLUMES, CONF);
    let mgr = fx.manager(FakeRunner::failing("ietadm --op delete", 1));

    assert!(mgr.delete_target("web", true).is_err());
    assert_eq!(mgr.runner().actions(), vec!["ietadm --op delete --tid 1"]);
    assert_eq!(fx.ietd_conf(), CONF);
}

#[test]
fn test_add_lun_after_existing_luns() {
    let fx = Fixture::new(VOLUMES, CONF);
    let mgr = fx.manager(FakeRunner::default());

    let info = mgr.add_lun("web", 1, "10G").unwrap();

    assert_eq!(info.tid, 1);
    assert_eq!(info.volume, "web_1");
    assert_eq!(info.path, "/dev/vg_spare/web_1");
    assert_eq!(
        mgr.runner().actions(),
        vec![
            "lvcreate -n web_1 vg_spare -L 10G",
            "ietadm --op new --tid 1 --lun 1 --params Path=/dev/vg_spare/web_1,Type=blockio",
        ]
    );
    assert_eq!(
        fx.ietd_conf(),
        "# managed by ietlv\n\
         Target 1 iqn.2007-12.net.enpraxis:web\n\
         \tLun 0 PATH=/dev/vg_spare/web_0,Type=blockio\n\
         \tLun 1 PATH=/dev/vg_spare/web_1,Type=blockio\n\
         Target 4 iqn.2007-12.net.enpraxis:db\n"
    );
}

#[test]
fn test_add_first_lun_to_declared_target() {
    let fx = Fixture::new(VOLUMES, CONF);
    let mgr = fx.manager(FakeRunner::default());

    mgr.add_lun("db", 0, "512M").unwrap();

    assert!(fx.ietd_conf().ends_with(
        "Target 4 iqn.2007-12.net.enpraxis:db\n\tLun 0 PATH=/dev/vg_spare/db_0,Type=blockio\n"
    ));
}

#[test]
fn test_add_lun_to_undeclared_target_creates_block() {
    let volumes = format!("{}tid:6 name:iqn.2007-12.net.enpraxis:orphan\n", VOLUMES);
    let fx = Fixture::new(&volumes, CONF);
    let mgr = fx.manager(FakeRunner::default());

    mgr.add_lun("orphan", 2, "1G").unwrap();

    assert_eq!(
        fx.ietd_conf(),
        format!(
            "{}Target 6 iqn.2007-12.net.enpraxis:orphan\n\tLun 2 PATH=/dev/vg_spare/orphan_2,Type=blockio\n",
            CONF
        )
    );
}

#[test]
fn test_add_lun_to_unknown_target_creates_nothing() {
    let fx = Fixture::new(VOLUMES, CONF);
    let mgr = fx.manager(FakeRunner::default());

    let err = mgr.add_lun("missing", 0, "1G").unwrap_err();
    assert!(matches!(err, IetError::TargetNotFound(_)));
    assert!(mgr.runner().actions().is_empty());
}

#[test]
fn test_failed_volume_creation_stops_before_ietadm() {
    let fx = Fixture::new(VOLUMES, CONF);
    let mgr = fx.manager(FakeRunner::failing("lvcreate", 5));

    let err = mgr.add_lun("web", 1, "10G").unwrap_err();
    assert_eq!(err.exit_code(), Some(5));
    assert_eq!(mgr.runner().actions(), vec!["lvcreate -n web_1 vg_spare -L 10G"]);
    assert_eq!(fx.ietd_conf(), CONF);
}

#[test]
fn test_failed_attach_removes_new_volume() {
    let fx = Fixture::new(VOLUMES, CONF);
    let mgr = fx.manager(FakeRunner::failing("ietadm --op new", 1));

    let err = mgr.add_lun("web", 1, "10G").unwrap_err();

    assert!(matches!(err, IetError::CommandFailed { ref program, .. } if program == "ietadm"));
    assert_eq!(
        mgr.runner().actions(),
        vec![
            "lvcreate -n web_1 vg_spare -L 10G",
            "ietadm --op new --tid 1 --lun 1 --params Path=/dev/vg_spare/web_1,Type=blockio",
            "lvremove -f /dev/vg_spare/web_1",
        ]
    );
    assert_eq!(fx.ietd_conf(), CONF);
}

#[test]
fn test_failed_attach_and_cleanup_is_partial() {
    let fx = Fixture::new(VOLUMES, CONF);
    let runner = FakeRunner {
        failures: vec![("ietadm --op new".to_string(), 1), ("lvremove".to_string(), 5)],
        ..Default::default()
    };
    let mgr = fx.manager(runner);

    let err = mgr.add_lun("web", 1, "10G").unwrap_err();
    assert_eq!(err.exit_code(), Some(5));
    match err {
        IetError::Partial { done, step, source } => {
            assert!(done.contains("/dev/vg_spare/web_1"));
            assert!(done.contains("left in place"));
            assert!(done.contains("ietadm exited with status 1"));
            assert_eq!(step, "removing volume /dev/vg_spare/web_1");
            assert!(matches!(*source, IetError::CommandFailed { ref program, .. } if program == "lvremove"));
        }
        other => panic!("expected a partial failure, got {other}"),
    }
}

#[test]
fn test_delete_lun() {
    let fx = Fixture::new(VOLUMES, CONF);
    let mgr = fx.manager(FakeRunner::default());

    let info = mgr.delete_lun("web", 0).unwrap();

    assert_eq!(info.path, "/dev/vg_spare/web_0");
    assert_eq!(
        mgr.runner().actions(),
        vec!["ietadm --op delete --tid 1 --lun 0", "lvremove -f /dev/vg_spare/web_0"]
    );
    assert_eq!(
        fx.ietd_conf(),
        "# managed by ietlv\n\
         Target 1 iqn.2007-12.net.enpraxis:web\n\
         Target 4 iqn.2007-12.net.enpraxis:db\n"
    );
}

#[test]
fn test_failed_volume_removal_reports_partial_state() {
    let fx = Fixture::new(VOLUMES, CONF);
    let mgr = fx.manager(FakeRunner::failing("lvremove", 5));

    let err = mgr.delete_lun("web", 0).unwrap_err();

    assert!(matches!(err, IetError::Partial { .. }));
    assert_eq!(err.exit_code(), Some(5));
    assert!(!fx.ietd_conf().contains("Lun 0"));
}

#[test]
fn test_failed_detach_keeps_everything() {
    let fx = Fixture::new(VOLUMES, CONF);
    let mgr = fx.manager(FakeRunner::failing("ietadm --op delete", 1));

    assert!(mgr.delete_lun("web", 0).is_err());
    assert_eq!(mgr.runner().actions(), vec!["ietadm --op delete --tid 1 --lun 0"]);
    assert_eq!(fx.ietd_conf(), CONF);
}

#[test]
fn test_daemon_down_blocks_every_change() {
    let fx = Fixture::new(VOLUMES, CONF);
    let runner = FakeRunner {
        daemon_down: true,
        ..Default::default()
    };
    let mgr = fx.manager(runner);

    assert!(matches!(mgr.add_target("test"), Err(IetError::DaemonNotRunning)));
    assert!(matches!(mgr.delete_target("web", true), Err(IetError::DaemonNotRunning)));
    assert!(matches!(mgr.add_lun("web", 1, "1G"), Err(IetError::DaemonNotRunning)));
    assert!(matches!(mgr.delete_lun("web", 0), Err(IetError::DaemonNotRunning)));

    assert!(mgr.runner().actions().is_empty());
    assert_eq!(mgr.runner().calls().len(), 4);
    assert_eq!(fx.ietd_conf(), CONF);
}

#[test]
fn test_lun_operations_need_a_volume_group() {
    let fx = Fixture::new(VOLUMES, CONF);
    let mut config = fx.config();
    config.volgroup = None;
    let settings = config.resolve(&Overrides::default()).unwrap();
    let mgr = TargetManager::with_runner(settings, FakeRunner::default());

    assert!(matches!(mgr.add_lun("web", 1, "1G"), Err(IetError::Config(_))));
    assert!(mgr.runner().calls().is_empty());
}

#[test]
fn test_invalid_size_is_rejected_up_front() {
    let fx = Fixture::new(VOLUMES, CONF);
    let mgr = fx.manager(FakeRunner::default());

    assert!(matches!(
        mgr.add_lun("web", 1, "10G; reboot"),
        Err(IetError::InvalidInput(_))
    ));
    assert!(mgr.runner().calls().is_empty());
}

#[test]
fn test_tables_are_returned_verbatim() {
    let fx = Fixture::new(VOLUMES, CONF);
    let mgr = fx.manager(FakeRunner::default());

    assert_eq!(mgr.list_volumes().unwrap(), VOLUMES);
    assert_eq!(
        mgr.list_sessions().unwrap(),
        "tid:1 name:iqn.2007-12.net.enpraxis:web\n"
    );
    assert_eq!(mgr.volume_table().unwrap().next_tid().unwrap(), 5);
    assert!(mgr.runner().calls().is_empty());
}
