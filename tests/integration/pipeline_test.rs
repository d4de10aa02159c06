//! Content transformation through the hook pipeline.

use serde_json::json;

use inkpress_core::error::ErrorKind;
use inkpress_plugin::TransformFn;

use crate::helpers::{FixturePlugin, TestRuntime, append_reviewed, append_tag, post, uppercase_reviewed};

fn flaky() -> TransformFn {
    TransformFn::sync("flaky", |mut item, _| {
        if item.slug == "b" {
            anyhow::bail!("cannot handle '{}'", item.slug);
        }
        item.tags.push("flaky".to_string());
        Ok(item)
    })
}

fn after() -> TransformFn {
    append_tag("after")
}

#[tokio::test]
async fn test_disabling_removes_effects() {
    let rt = TestRuntime::new(vec![post("hello-world", &[])]);
    rt.register_all(vec![
        FixturePlugin::new("A", &[]).with_transform(append_reviewed).arc(),
        FixturePlugin::new("B", &["A"]).with_transform(uppercase_reviewed).arc(),
    ])
    .await;
    rt.manager.initialize_all().await.unwrap();

    rt.manager.set_enabled("A", false).await.unwrap();
    assert_eq!(rt.enhanced_tags().await, vec![Vec::<String>::new()]);

    rt.manager.set_enabled("A", true).await.unwrap();
    assert_eq!(rt.enhanced_tags().await, vec![vec!["REVIEWED"]]);

    rt.manager.set_enabled("B", false).await.unwrap();
    assert_eq!(rt.enhanced_tags().await, vec![vec!["reviewed"]]);
}

#[tokio::test]
async fn test_hook_failure_isolated_per_item() {
    let rt = TestRuntime::new(vec![post("a", &[]), post("b", &[]), post("c", &[])]);
    rt.register_all(vec![
        FixturePlugin::new("flaky", &[]).with_transform(flaky).arc(),
        FixturePlugin::new("after", &[]).with_transform(after).arc(),
    ])
    .await;
    rt.manager.initialize_all().await.unwrap();

    assert_eq!(
        rt.enhanced_tags().await,
        vec![
            vec!["flaky", "after"],
            vec!["after"],
            vec!["flaky", "after"],
        ]
    );

    let status = rt.manager.status("flaky").await.unwrap();
    let error = status.last_error.unwrap();
    assert!(error.contains("'b'"));
    assert!(error.contains("cannot handle"));
    assert!(status.enabled);
    assert!(rt.manager.status("after").await.unwrap().last_error.is_none());
}

#[tokio::test]
async fn test_hooks_receive_current_config() {
    let rt = TestRuntime::new(vec![post("hello-world", &[])]);
    rt.register_all(vec![
        FixturePlugin::new("suffix", &[])
            .with_transform(|| {
                TransformFn::sync("suffix", |mut item, config| {
                    let suffix = config["suffix"].as_str().unwrap_or("none");
                    item.tags.push(suffix.to_string());
                    Ok(item)
                })
            })
            .arc(),
    ])
    .await;
    rt.manager.initialize_all().await.unwrap();
    assert_eq!(rt.enhanced_tags().await, vec![vec!["none"]]);

    rt.manager
        .update_config("suffix", json!({ "suffix": "draft" }))
        .await
        .unwrap();
    assert_eq!(rt.enhanced_tags().await, vec![vec!["draft"]]);
}

#[tokio::test]
async fn test_results_are_deterministic() {
    let posts: Vec<_> = (0..20).map(|i| post(&format!("post-{i}"), &["x"])).collect();
    let rt = TestRuntime::new(posts);
    rt.register_all(vec![
        FixturePlugin::new("A", &[]).with_transform(append_reviewed).arc(),
        FixturePlugin::new("B", &["A"]).with_transform(uppercase_reviewed).arc(),
    ])
    .await;
    rt.manager.initialize_all().await.unwrap();

    let first = rt.manager.enhanced_posts().await.unwrap();
    for _ in 0..3 {
        assert_eq!(rt.manager.enhanced_posts().await.unwrap(), first);
    }
    let slugs: Vec<String> = first.iter().map(|p| p.slug.clone()).collect();
    let expected: Vec<String> = (0..20).map(|i| format!("post-{i}")).collect();
    assert_eq!(slugs, expected);
}

#[tokio::test]
async fn test_unknown_slug_and_provider_outage() {
    let rt = TestRuntime::new(vec![post("hello-world", &[])]);
    rt.manager.initialize_all().await.unwrap();

    assert!(rt.manager.enhanced_post("missing").await.unwrap().is_none());

    rt.content.set_outage(Some("disk unplugged")).await;
    let err = rt.manager.enhanced_posts().await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::ExternalService);

    rt.content.set_outage(None).await;
    assert_eq!(rt.manager.enhanced_posts().await.unwrap().len(), 1);
}
