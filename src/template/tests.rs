use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use rustc_hash::FxHashSet;
use tempfile::TempDir;

use super::*;

const BASE: &str = "<main>{% for m in members %}{% include m %}{% endfor %}</main>";

fn write(root: &Path, name: &str, content: &str) {
    let path = root.join(name);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Replace a file in one step so concurrent readers never see it half written.
fn replace(root: &Path, name: &str, content: &str) {
    let tmp = root.join(format!("{name}.next"));
    fs::write(&tmp, content).unwrap();
    fs::rename(tmp, root.join(name)).unwrap();
}

fn fixture() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "base.tmpl", BASE);
    write(dir.path(), "life/life.tmpl", "v1");
    dir
}

fn cache(dir: &TempDir) -> TemplateCache {
    TemplateCache::new(TrustedFs::new(dir.path()), Layout::default())
}

#[test]
fn test_production_resolves_are_cached() {
    let dir = fixture();
    let cache = cache(&dir);

    let first = cache.resolve("life", false).unwrap();
    let second = cache.resolve("life", false).unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(cache.generation(), 1);
}

#[test]
fn test_production_ignores_edits_after_first_parse() {
    let dir = fixture();
    let cache = cache(&dir);

    assert_eq!(cache.resolve("life", false).unwrap().render().unwrap(), "<main>v1</main>");
    write(dir.path(), "life/life.tmpl", "v2");
    assert_eq!(cache.resolve("life", false).unwrap().render().unwrap(), "<main>v1</main>");
}

#[test]
fn test_dev_mode_reparses_every_resolve() {
    let dir = fixture();
    let cache = cache(&dir);

    let first = cache.resolve("life", true).unwrap();
    let second = cache.resolve("life", true).unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(cache.generation(), 2);
    assert_eq!(second.generation(), 2);
}

#[test]
fn test_dev_mode_sees_edits() {
    let dir = fixture();
    let cache = cache(&dir);

    assert_eq!(cache.resolve("life", true).unwrap().render().unwrap(), "<main>v1</main>");
    write(dir.path(), "life/life.tmpl", "v2");
    assert_eq!(cache.resolve("life", true).unwrap().render().unwrap(), "<main>v2</main>");
}

#[test]
fn test_unknown_page_is_not_found() {
    let dir = fixture();
    let cache = cache(&dir);

    let err = cache.resolve("missing", false).unwrap_err();
    assert!(matches!(err, TemplateError::NotFound(ref name) if name == "missing"));
}

#[test]
fn test_parse_failure_keeps_previous_generation() {
    let dir = fixture();
    let cache = cache(&dir);
    let good = cache.resolve("life", true).unwrap();

    write(dir.path(), "life/life.tmpl", "{% if %}");
    assert!(matches!(
        cache.resolve("life", true).unwrap_err(),
        TemplateError::Parse { .. }
    ));

    let cached = cache.resolve("life", false).unwrap();
    assert!(Arc::ptr_eq(&good, &cached));
}

#[test]
fn test_concurrent_dev_resolves_see_complete_generations() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "base.tmpl", BASE);
    write(dir.path(), "life/life.tmpl", "v0");
    write(dir.path(), "game/game.tmpl", "v0");

    let layout = Layout {
        groups: vec!["life".to_owned(), "game".to_owned()],
        ..Layout::default()
    };
    let cache = TemplateCache::new(TrustedFs::new(dir.path()), layout.clone());
    let root = dir.path();
    let done = AtomicBool::new(false);

    thread::scope(|s| {
        s.spawn(|| {
            for i in 1..=20 {
                replace(root, "life/life.tmpl", &format!("v{i}"));
            }
        });

        // Every published generation holds all groups, parsed in the same pass.
        s.spawn(|| {
            let mut checked = 0;
            while !done.load(Ordering::SeqCst) || checked == 0 {
                let Some(generation) = cache.current_generation() else {
                    thread::yield_now();
                    continue;
                };
                assert_eq!(generation.pages.len(), layout.groups.len());
                let ids: FxHashSet<_> = generation.pages.values().map(|p| p.generation()).collect();
                assert_eq!(ids.len(), 1, "pages from different parses: {ids:?}");
                checked += 1;
            }
        });

        let readers: Vec<_> = (0..4)
            .map(|_| {
                s.spawn(|| {
                    for _ in 0..25 {
                        let life = cache.resolve("life", true).unwrap();
                        let game = cache.resolve("game", false).unwrap();
                        let out = life.render().unwrap();
                        assert!(out.starts_with("<main>v") && out.ends_with("</main>"), "{out}");
                        assert!(game.generation() >= life.generation());
                    }
                })
            })
            .collect();
        let joined: Vec<_> = readers.into_iter().map(|r| r.join()).collect();
        done.store(true, Ordering::SeqCst);
        for result in joined {
            result.unwrap();
        }
    });

    assert_eq!(cache.generation(), 100);
}
