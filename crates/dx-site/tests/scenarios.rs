//! End-to-end behavior of a site over a real document directory.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use dx_cache::Converter;
use dx_site::{
    ContentUpdater, MarkdownConverter, RefreshError, Site, SiteConfig, UpdateError,
};
use dx_tree::{NavItem, NodeKind};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn write(root: &Path, path: &str, content: &str) {
    let path = root.join(path);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn config(root: &Path) -> SiteConfig {
    SiteConfig {
        source_dir: root.to_path_buf(),
        ..SiteConfig::default()
    }
}

fn nav_titles(items: &[NavItem]) -> Vec<&str> {
    items.iter().map(|i| i.title.as_str()).collect()
}

#[derive(Default)]
struct CountingConverter {
    calls: AtomicUsize,
}

impl Converter for CountingConverter {
    fn to_markup(&self, raw: &str) -> String {
        self.calls.fetch_add(1, Ordering::SeqCst);
        MarkdownConverter::new().to_markup(raw)
    }
}

struct UnreachableRemote;

impl ContentUpdater for UnreachableRemote {
    fn pull(&self) -> Result<(), UpdateError> {
        Err(UpdateError::Timeout {
            program: "git".to_owned(),
            timeout: Duration::from_secs(60),
        })
    }
}

#[test]
fn test_tree_with_nested_directory() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "readme.md", "# Welcome\n\nStart here.");
    write(temp_dir.path(), "guide/setup.md", "# Setup\n\nInstall.");

    let site = Site::open(config(temp_dir.path())).unwrap();
    let nav = site.navigation();

    assert_eq!(
        nav.items,
        vec![
            NavItem {
                kind: NodeKind::File,
                title: "Welcome".to_owned(),
                path: "readme.md".to_owned(),
                children: vec![],
            },
            NavItem {
                kind: NodeKind::Directory,
                title: "guide".to_owned(),
                path: "guide".to_owned(),
                children: vec![NavItem {
                    kind: NodeKind::File,
                    title: "Setup".to_owned(),
                    path: "guide/setup.md".to_owned(),
                    children: vec![],
                }],
            },
        ]
    );

    let tree = site.state();
    let root = tree.tree();
    assert_eq!(root.children[0].item_name, "readme");
    assert_eq!(root.children[1].item_name, "guide");
    assert_eq!(root.children[1].children[0].item_name, "setup");
}

#[test]
fn test_directories_follow_sort_keys() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "a/one.md", "# One");
    write(temp_dir.path(), "b/two.md", "# Two");
    write(
        temp_dir.path(),
        "map.json",
        r#"{"a": {"sort": 2}, "b": {"sort": 1}}"#,
    );

    let site = Site::open(config(temp_dir.path())).unwrap();

    assert_eq!(nav_titles(&site.navigation().items), vec!["b", "a"]);
}

#[test]
fn test_failed_pull_leaves_everything_unchanged() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "readme.md", "# Welcome\n\nStart here.");
    let site = Site::builder(config(temp_dir.path()))
        .with_updater(Arc::new(UnreachableRemote))
        .open()
        .unwrap();
    let rendered = site.document("readme.md").unwrap();
    let before = site.state();

    write(temp_dir.path(), "new.md", "# New page");
    let result = site.refresh();

    assert!(matches!(result, Err(RefreshError::Update(_))));
    let after = site.state();
    assert!(Arc::ptr_eq(&before, &after));
    assert_eq!(after.tree(), before.tree());
    assert_eq!(after.cache().get("readme.md"), Some(rendered.content));
    assert_eq!(site.search_title("welcome").len(), 1);
    assert!(site.search_title("new page").is_empty());
    assert!(site.document("new.md").is_err());
}

#[test]
fn test_second_request_hits_cache() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "readme.md", "# Welcome\n\nStart here.");
    let converter = Arc::new(CountingConverter::default());
    let site = Site::builder(config(temp_dir.path()))
        .with_converter(Arc::clone(&converter) as Arc<dyn Converter>)
        .open()
        .unwrap();

    let first = site.document("readme.md").unwrap();
    let second = site.document("readme.md").unwrap();

    assert!(!first.from_cache);
    assert!(second.from_cache);
    assert_eq!(first.content, second.content);
    assert_eq!(converter.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_title_search_across_site() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "intro.md", "# Introduction to X\n\nBasics.");
    write(temp_dir.path(), "reference.md", "# Reference\n\nDetails.");

    let site = Site::open(config(temp_dir.path())).unwrap();

    assert!(site.search_title("").is_empty());
    let hits = site.search_title("Intro");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].path, "intro.md");
    assert_eq!(hits[0].title, "Introduction to X");
}
