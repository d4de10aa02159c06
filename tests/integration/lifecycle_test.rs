//! Registration, dependency resolution, and unregistration.

use inkpress_plugin::{PluginError, PluginState};

use crate::helpers::{FixturePlugin, TestRuntime, append_reviewed, post, uppercase_reviewed};

fn reviewed_pair() -> TestRuntime {
    TestRuntime::new(vec![post("hello-world", &[])])
}

#[tokio::test]
async fn test_dependent_sees_dependency_output() {
    let rt = reviewed_pair();
    rt.register_all(vec![
        FixturePlugin::new("A", &[]).with_transform(append_reviewed).arc(),
        FixturePlugin::new("B", &["A"]).with_transform(uppercase_reviewed).arc(),
    ])
    .await;

    let report = rt.manager.initialize_all().await.unwrap();
    assert!(report.is_complete());
    assert_eq!(report.order, vec!["A", "B"]);

    let post = rt.manager.enhanced_post("hello-world").await.unwrap().unwrap();
    assert_eq!(post.tags, vec!["REVIEWED"]);
}

#[tokio::test]
async fn test_registration_order_does_not_override_dependencies() {
    let rt = reviewed_pair();
    rt.register_all(vec![
        FixturePlugin::new("B", &["A"]).with_transform(uppercase_reviewed).arc(),
        FixturePlugin::new("A", &[]).with_transform(append_reviewed).arc(),
    ])
    .await;

    rt.manager.initialize_all().await.unwrap();
    assert_eq!(rt.manager.initialization_order().await, vec!["A", "B"]);
    assert_eq!(rt.enhanced_tags().await, vec![vec!["REVIEWED"]]);
}

#[tokio::test]
async fn test_missing_dependency_initializes_nothing() {
    let rt = reviewed_pair();
    rt.register_all(vec![
        FixturePlugin::new("A", &[]).with_transform(append_reviewed).arc(),
        FixturePlugin::new("C", &["D"]).arc(),
    ])
    .await;

    let err = rt.manager.initialize_all().await.unwrap_err();
    assert_eq!(
        err,
        PluginError::MissingDependency {
            plugin: "C".into(),
            dependency: "D".into(),
        }
    );

    for status in rt.manager.statuses().await {
        assert_eq!(status.state, PluginState::Registered, "{}", status.name);
    }
    assert_eq!(rt.enhanced_tags().await, vec![Vec::<String>::new()]);
}

#[tokio::test]
async fn test_three_plugin_cycle_is_reported() {
    let rt = reviewed_pair();
    rt.register_all(vec![
        FixturePlugin::new("x", &["z"]).arc(),
        FixturePlugin::new("y", &["x"]).arc(),
        FixturePlugin::new("z", &["y"]).arc(),
        FixturePlugin::new("free", &[]).arc(),
    ])
    .await;

    let PluginError::CyclicDependency { cycle } = rt.manager.initialize_all().await.unwrap_err()
    else {
        panic!("expected a cycle");
    };
    assert_eq!(cycle.len(), 3);
    for name in ["x", "y", "z"] {
        assert!(cycle.contains(&name.to_string()));
    }
    assert_eq!(
        rt.manager.status("free").await.unwrap().state,
        PluginState::Registered
    );
}

#[tokio::test]
async fn test_duplicate_registration_rejected() {
    let rt = reviewed_pair();
    rt.register_all(vec![FixturePlugin::new("A", &[]).arc()]).await;

    let err = rt
        .manager
        .register(FixturePlugin::new("A", &[]).arc())
        .await
        .unwrap_err();
    assert_eq!(err, PluginError::DuplicateName("A".into()));
    assert_eq!(rt.manager.plugin_count().await, 1);
}

#[tokio::test]
async fn test_failed_initializer_isolated_from_siblings() {
    let rt = reviewed_pair();
    rt.register_all(vec![
        FixturePlugin::new("broken", &[])
            .with_setup(|_| anyhow::bail!("missing api key"))
            .arc(),
        FixturePlugin::new("needs-broken", &["broken"]).arc(),
        FixturePlugin::new("A", &[]).with_transform(append_reviewed).arc(),
    ])
    .await;

    let report = rt.manager.initialize_all().await.unwrap();
    assert_eq!(report.ready, vec!["A"]);
    let failed: Vec<&str> = report.failed.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(failed, vec!["broken", "needs-broken"]);

    let broken = rt.manager.status("broken").await.unwrap();
    assert_eq!(broken.state, PluginState::Failed);
    assert!(broken.last_error.unwrap().contains("missing api key"));

    let dependent = rt.manager.status("needs-broken").await.unwrap();
    assert!(dependent.last_error.unwrap().contains("'broken'"));

    assert_eq!(rt.enhanced_tags().await, vec![vec!["reviewed"]]);
}

#[tokio::test]
async fn test_unregistered_plugin_is_not_found() {
    let rt = reviewed_pair();
    rt.register_all(vec![
        FixturePlugin::new("A", &[]).with_transform(append_reviewed).arc(),
        FixturePlugin::new("B", &["A"]).with_transform(uppercase_reviewed).arc(),
    ])
    .await;
    rt.manager.initialize_all().await.unwrap();

    rt.manager.unregister("A").await.unwrap();

    assert_eq!(
        rt.manager.status("A").await.unwrap_err(),
        PluginError::PluginNotFound("A".into())
    );
    let dependent = rt.manager.status("B").await.unwrap();
    assert_eq!(dependent.state, PluginState::Failed);
    assert_eq!(rt.enhanced_tags().await, vec![Vec::<String>::new()]);

    let err = rt.manager.initialize_all().await.unwrap_err();
    assert!(matches!(err, PluginError::MissingDependency { .. }));
}

#[tokio::test]
async fn test_unregister_all_empties_runtime() {
    let rt = reviewed_pair();
    rt.register_all(vec![
        FixturePlugin::new("A", &[]).with_transform(append_reviewed).arc(),
        FixturePlugin::new("B", &["A"]).with_transform(uppercase_reviewed).arc(),
    ])
    .await;
    rt.manager.initialize_all().await.unwrap();

    rt.manager.unregister_all().await;

    assert_eq!(rt.manager.plugin_count().await, 0);
    assert!(rt.manager.statuses().await.is_empty());
    assert!(rt.manager.initialization_order().await.is_empty());
    assert_eq!(rt.enhanced_tags().await, vec![Vec::<String>::new()]);
}
