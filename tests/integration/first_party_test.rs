//! The bundled plugins working together.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};

use inkpress_core::config::{PluginEntryConfig, PluginSystemConfig};
use inkpress_core::types::content::ContentItem;
use inkpress_plugin::{Plugin, PluginAdmin, PluginPatch, PluginState, Resolution};
use plugin_comments::{COMMENTS_SECTION, CommentsPlugin};
use plugin_enrichment::{ReadingTimePlugin, TagNormalizerPlugin};

use crate::helpers::TestRuntime;

fn posts() -> Vec<ContentItem> {
    vec![
        ContentItem::new("hello-world", "Hello, world")
            .with_body("word ".repeat(450))
            .with_tags([" Rust ", "rs", "Intro"]),
        ContentItem::new("changelog", "Changelog")
            .with_body("fixed things")
            .with_tags(["No-Comments"]),
    ]
}

fn settings(comments: Value) -> PluginSystemConfig {
    let mut settings = PluginSystemConfig::default();
    settings.entries.insert(
        "tag-normalizer".to_string(),
        PluginEntryConfig {
            enabled: None,
            config: Some(json!({ "aliases": { "rs": "rust" } })),
        },
    );
    settings.entries.insert(
        "comments".to_string(),
        PluginEntryConfig {
            enabled: None,
            config: Some(comments),
        },
    );
    settings
}

fn bundled() -> Vec<Arc<dyn Plugin>> {
    // Registered out of dependency order on purpose.
    vec![
        Arc::new(CommentsPlugin::new()),
        Arc::new(ReadingTimePlugin::new()),
        Arc::new(TagNormalizerPlugin::new()),
    ]
}

async fn runtime(comments: Value) -> TestRuntime {
    let rt = TestRuntime::with_settings(posts(), settings(comments));
    rt.register_all(bundled()).await;
    rt
}

#[tokio::test]
async fn test_bundled_plugins_enrich_posts() {
    let rt = runtime(json!({ "repo": "inkpress/blog" })).await;
    let report = rt.manager.initialize_all().await.unwrap();
    assert!(report.is_complete());
    assert_eq!(report.order, vec!["reading-time", "tag-normalizer", "comments"]);

    let posts = rt.manager.enhanced_posts().await.unwrap();

    let hello = &posts[0];
    assert_eq!(hello.tags, vec!["rust", "intro"]);
    assert_eq!(hello.extension("reading_time_minutes"), Some(&json!(3)));
    assert_eq!(
        hello.extension("comments"),
        Some(&json!({ "provider": "giscus", "term": "hello-world" }))
    );

    let changelog = &posts[1];
    assert_eq!(changelog.tags, vec!["no-comments"]);
    assert_eq!(changelog.extension("comments"), Some(&Value::Null));

    match rt.manager.resolve_component(COMMENTS_SECTION).await {
        Resolution::Ready(descriptor) => {
            assert_eq!(descriptor.component, "CommentsWidget");
            assert_eq!(descriptor.props["repo"], "inkpress/blog");
        }
        other => panic!("expected a ready widget, got {other:?}"),
    }
}

#[tokio::test]
async fn test_comments_rely_on_normalized_tags() {
    let rt = runtime(json!({ "repo": "inkpress/blog" })).await;
    rt.manager.initialize_all().await.unwrap();

    rt.manager.set_enabled("tag-normalizer", false).await.unwrap();
    let changelog = rt.manager.enhanced_post("changelog").await.unwrap().unwrap();

    assert_eq!(changelog.tags, vec!["No-Comments"]);
    assert_eq!(changelog.extension("comments").unwrap()["term"], "changelog");
}

#[tokio::test]
async fn test_lazy_comments_resolve_deferred() {
    let rt = runtime(json!({ "repo": "inkpress/blog", "lazy": true })).await;
    rt.manager.initialize_all().await.unwrap();

    let resolution = rt.manager.resolve_component(COMMENTS_SECTION).await;
    assert!(matches!(resolution, Resolution::Deferred(_)));

    let descriptor = resolution
        .materialize(Duration::from_secs(1))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(descriptor.component, "CommentsWidget");
}

#[tokio::test]
async fn test_comments_reconfigure_updates_widget() {
    let rt = runtime(json!({ "repo": "old/repo" })).await;
    rt.manager.initialize_all().await.unwrap();

    rt.manager
        .update_config(
            "comments",
            json!({ "repo": "new/repo", "provider": "utterances" }),
        )
        .await
        .unwrap();

    let hello = rt.manager.enhanced_post("hello-world").await.unwrap().unwrap();
    assert_eq!(hello.extension("comments").unwrap()["provider"], "utterances");

    match rt.manager.resolve_component(COMMENTS_SECTION).await {
        Resolution::Ready(descriptor) => {
            assert_eq!(descriptor.props["repo"], "new/repo");
            assert_eq!(descriptor.props["provider"], "utterances");
        }
        other => panic!("expected a ready widget, got {other:?}"),
    }

    rt.manager
        .update_config(
            "comments",
            json!({ "repo": "new/repo", "lazy": true }),
        )
        .await
        .unwrap();
    assert!(matches!(
        rt.manager.resolve_component(COMMENTS_SECTION).await,
        Resolution::Deferred(_)
    ));
}

#[tokio::test]
async fn test_comments_without_repo_fail_alone() {
    let rt = runtime(json!({ "provider": "giscus" })).await;
    let report = rt.manager.initialize_all().await.unwrap();

    assert_eq!(report.ready, vec!["reading-time", "tag-normalizer"]);
    assert_eq!(report.failed.len(), 1);

    let comments = rt.manager.status("comments").await.unwrap();
    assert_eq!(comments.state, PluginState::Failed);
    assert!(comments.last_error.unwrap().contains("'repo' is required"));

    assert!(rt.manager.resolve_component(COMMENTS_SECTION).await.is_absent());
    let hello = rt.manager.enhanced_post("hello-world").await.unwrap().unwrap();
    assert!(hello.extension("comments").is_none());
    assert_eq!(hello.tags, vec!["rust", "intro"]);
}

#[tokio::test]
async fn test_admin_rejected_config_sits_out() {
    let rt = runtime(json!({ "repo": "inkpress/blog" })).await;
    rt.manager.initialize_all().await.unwrap();
    let admin = PluginAdmin::new(Arc::clone(&rt.manager));

    let status = admin
        .patch(
            "reading-time",
            PluginPatch::config(json!({ "words_per_minute": 0 })),
        )
        .await
        .unwrap();
    assert_eq!(status.config["words_per_minute"], 0);
    assert!(status.last_error.unwrap().contains("Invalid configuration"));

    let hello = rt.manager.enhanced_post("hello-world").await.unwrap().unwrap();
    assert!(hello.extension("reading_time_minutes").is_none());
    assert!(hello.extension("comments").is_some());

    admin
        .patch(
            "reading-time",
            PluginPatch::config(json!({ "words_per_minute": 150 })),
        )
        .await
        .unwrap();
    let hello = rt.manager.enhanced_post("hello-world").await.unwrap().unwrap();
    assert_eq!(hello.extension("reading_time_minutes"), Some(&json!(3)));
    assert!(
        rt.manager
            .status("reading-time")
            .await
            .unwrap()
            .last_error
            .is_none()
    );

    let err = admin.patch("ghost", PluginPatch::enabled(false)).await.unwrap_err();
    assert_eq!(err.status_code(), 404);
}
