//! Base distribution reading

use jpr_core::archive::Archive;
use jpr_core::{BaseDistribution, Error, PluginCoordinate, Requester};
use jpr_fs::StoreLayout;
use jpr_test_utils::TestWorkspace;
use jpr_test_utils::archive::{distribution_archive, zip_archive};
use pretty_assertions::assert_eq;

#[test]
fn reads_detached_plugins_from_manifest() {
    let workspace = TestWorkspace::new();
    let war = workspace.write_file(
        "jenkins.war",
        &distribution_archive(
            "2.176.3",
            &[
                ("mailer", "1.20", ""),
                ("matrix-auth", "1.0.2", "mailer:1.2;resolution:=optional"),
            ],
            true,
        ),
    );
    let layout = StoreLayout::new(workspace.working_dir());

    let distribution = BaseDistribution::read(&war, &layout).unwrap();

    assert_eq!(distribution.version, "2.176.3");
    assert_eq!(distribution.plugins.len(), 2);
    assert_eq!(distribution.plugins[1].plugin.name, "matrix-auth");
    assert_eq!(
        distribution.plugins[1].optional_dependencies,
        vec![PluginCoordinate::new("mailer", "1.2")]
    );
    assert!(
        workspace
            .working_dir()
            .join("war/jenkins-2.176.3.war")
            .is_file()
    );
    assert!(
        distribution
            .bundled_coordinates()
            .iter()
            .all(|p| p.requester == Requester::War)
    );
}

#[test]
fn falls_back_to_archive_listing() {
    let workspace = TestWorkspace::new();
    let war = workspace.write_file(
        "jenkins.war",
        &distribution_archive("2.200", &[("command-launcher", "1.2", "")], false),
    );

    let distribution =
        BaseDistribution::read(&war, &StoreLayout::new(workspace.working_dir())).unwrap();
    assert_eq!(
        distribution.bundled_coordinates(),
        vec![PluginCoordinate::new("command-launcher", "1.2").with_requester(Requester::War)]
    );
}

#[test]
fn second_read_uses_cached_copy() {
    let workspace = TestWorkspace::new();
    let war = workspace.write_file(
        "jenkins.war",
        &distribution_archive("2.176.3", &[("mailer", "1.20", "")], true),
    );
    let layout = StoreLayout::new(workspace.working_dir());
    let first = BaseDistribution::read(&war, &layout).unwrap();

    // Same version, different content: the cached parse wins.
    workspace.write_file(
        "jenkins.war",
        &distribution_archive("2.176.3", &[("jdk-tool", "1.0", "")], true),
    );
    let second = BaseDistribution::read(&war, &layout).unwrap();
    assert_eq!(first, second);
}

#[test]
fn missing_jenkins_version_fails() {
    let workspace = TestWorkspace::new();
    let war = workspace.write_file(
        "jenkins.war",
        &zip_archive(&[(
            "META-INF/MANIFEST.MF",
            &b"Manifest-Version: 1.0\r\n\r\n"[..],
        )]),
    );

    let err = BaseDistribution::read(&war, &StoreLayout::new(workspace.working_dir())).unwrap_err();
    assert!(matches!(err, Error::MissingManifestField { field } if field == "Jenkins-Version"));
}

#[test]
fn broken_nested_plugin_is_reported() {
    let workspace = TestWorkspace::new();
    let war = workspace.write_file(
        "jenkins.war",
        &zip_archive(&[
            (
                "META-INF/MANIFEST.MF",
                &b"Manifest-Version: 1.0\r\nJenkins-Version: 2.1\r\n\r\n"[..],
            ),
            ("WEB-INF/detached-plugins/broken.hpi", &b"garbage"[..]),
        ]),
    );

    let err = BaseDistribution::read(&war, &StoreLayout::new(workspace.working_dir())).unwrap_err();
    assert!(err.to_string().starts_with("WEB-INF/detached-plugins/broken.hpi"));
    assert!(Archive::open(&war).is_ok());
}
