//! Extension point resolution through the manager.

use std::time::Duration;

use serde_json::json;

use inkpress_plugin::{
    ComponentDescriptor, ComponentProvider, DeferredComponent, PluginError, PluginState,
    Resolution,
};

use crate::helpers::{FixturePlugin, TestRuntime};

const POINT: &str = "CommentsSection";

fn widget(name: &str, component: &'static str) -> FixturePlugin {
    FixturePlugin::new(name, &[]).with_setup(move |ctx| {
        ctx.provide_component(
            POINT,
            ComponentProvider::Ready(ComponentDescriptor::new(component, json!({}))),
        );
        Ok(())
    })
}

fn component_name(resolution: Resolution) -> String {
    match resolution {
        Resolution::Ready(descriptor) => descriptor.component,
        other => panic!("expected a ready provider, got {other:?}"),
    }
}

#[tokio::test]
async fn test_last_initialized_provider_wins() {
    let rt = TestRuntime::new(Vec::new());
    rt.register_all(vec![
        widget("giscus", "Giscus").arc(),
        widget("utterances", "Utterances").arc(),
    ])
    .await;
    rt.manager.initialize_all().await.unwrap();

    assert_eq!(component_name(rt.manager.resolve_component(POINT).await), "Utterances");

    let summary = rt.manager.summary("utterances").await.unwrap();
    assert_eq!(summary.hooks.components, vec![POINT.to_string()]);
    assert!(rt.manager.summary("giscus").await.unwrap().hooks.components.is_empty());
}

#[tokio::test]
async fn test_unknown_point_is_absent() {
    let rt = TestRuntime::new(Vec::new());
    rt.register_all(vec![widget("giscus", "Giscus").arc()]).await;
    rt.manager.initialize_all().await.unwrap();

    assert!(rt.manager.resolve_component("Sidebar").await.is_absent());
}

#[tokio::test]
async fn test_owner_lifecycle_controls_resolution() {
    let rt = TestRuntime::new(Vec::new());
    rt.register_all(vec![widget("giscus", "Giscus").arc()]).await;

    // Nothing is resolvable before initialization.
    assert!(rt.manager.resolve_component(POINT).await.is_absent());

    rt.manager.initialize_all().await.unwrap();
    assert_eq!(component_name(rt.manager.resolve_component(POINT).await), "Giscus");

    rt.manager.set_enabled("giscus", false).await.unwrap();
    assert!(rt.manager.resolve_component(POINT).await.is_absent());

    rt.manager.set_enabled("giscus", true).await.unwrap();
    assert!(!rt.manager.resolve_component(POINT).await.is_absent());

    rt.manager.unregister("giscus").await.unwrap();
    assert!(rt.manager.resolve_component(POINT).await.is_absent());
}

#[tokio::test]
async fn test_failed_initializer_registers_no_component() {
    let rt = TestRuntime::new(Vec::new());
    rt.register_all(vec![
        FixturePlugin::new("half-done", &[])
            .with_setup(|ctx| {
                ctx.provide_component(
                    POINT,
                    ComponentProvider::Ready(ComponentDescriptor::new("Half", json!({}))),
                );
                anyhow::bail!("gave up after registering")
            })
            .arc(),
    ])
    .await;

    let report = rt.manager.initialize_all().await.unwrap();
    assert_eq!(report.failed.len(), 1);
    assert_eq!(
        rt.manager.status("half-done").await.unwrap().state,
        PluginState::Failed
    );
    assert!(rt.manager.resolve_component(POINT).await.is_absent());
}

#[tokio::test]
async fn test_deferred_failure_reaches_caller_only() {
    let rt = TestRuntime::new(Vec::new());
    rt.register_all(vec![
        FixturePlugin::new("lazy", &[])
            .with_setup(|ctx| {
                ctx.provide_component(
                    POINT,
                    ComponentProvider::Deferred(DeferredComponent::new(|| async {
                        Err::<ComponentDescriptor, _>(anyhow::anyhow!("bundle missing"))
                    })),
                );
                Ok(())
            })
            .arc(),
    ])
    .await;
    rt.manager.initialize_all().await.unwrap();

    let resolution = rt.manager.resolve_component(POINT).await;
    assert!(matches!(resolution, Resolution::Deferred(_)));

    let err = resolution
        .materialize(Duration::from_secs(1))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        PluginError::ComponentResolutionFailure {
            point: POINT.into(),
            cause: "bundle missing".into(),
        }
    );

    let status = rt.manager.status("lazy").await.unwrap();
    assert!(status.is_active());
    assert!(status.last_error.is_none());
}
