//! Configuration applied to a live dispatcher.

use std::path::PathBuf;
use std::sync::Arc;

use request_dispatch::config::{self, ConfigWatcher, RouterConfig};
use request_dispatch::http::ResponseBody;
use request_dispatch::{Dispatcher, MethodSet, Response};
use tokio::sync::mpsc;

mod common;
use common::get;

fn temp_site() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("dispatch-site-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(dir.join("docs")).unwrap();
    std::fs::write(dir.join("index.htm"), "<html>home</html>").unwrap();
    std::fs::write(dir.join("docs").join("index.htm"), "<html>docs</html>").unwrap();
    dir
}

fn site_config(site: &std::path::Path) -> RouterConfig {
    config::parse_config(&format!(
        r#"
        [[rewrites]]
        from = "/home"
        to = "/?from=home"

        [[static_mounts]]
        uri = "/"
        path = "{}"
        cache_control = "max-age=3600"
        "#,
        site.display()
    ))
    .unwrap()
}

#[test]
fn test_config_routes_static_site() {
    common::init_logging();
    let site = temp_site();
    let dispatcher = Dispatcher::from_config(&site_config(&site));

    let mut home = get("/home");
    dispatcher.handle(&mut home).unwrap();
    assert_eq!(home.url(), "/");
    assert_eq!(home.param("from"), Some("home"));
    let response = home.response().unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.header("Cache-Control"), Some("max-age=3600"));
    assert_eq!(
        response.body,
        ResponseBody::File { path: "/index.htm".into(), gzip: false }
    );

    let mut docs = get("/docs/");
    dispatcher.handle(&mut docs).unwrap();
    assert_eq!(
        docs.response().unwrap().body,
        ResponseBody::File { path: "/docs/index.htm".into(), gzip: false }
    );

    std::fs::remove_dir_all(&site).unwrap();
}

#[tokio::test]
async fn test_reloader_replaces_routes_and_keeps_catch_all() {
    let site = temp_site();
    let dispatcher = Arc::new(Dispatcher::new());
    dispatcher.on("/legacy", MethodSet::ANY, |_| {});
    dispatcher.on_not_found(|req| {
        req.send(Response::status(418));
    });

    let (tx, rx) = mpsc::unbounded_channel();
    let task = config::spawn_reloader(dispatcher.clone(), rx);
    tx.send(site_config(&site)).unwrap();
    drop(tx);
    task.await.unwrap();

    assert_eq!(dispatcher.rewrites().len(), 1);
    assert_eq!(dispatcher.handlers().len(), 1);

    let mut legacy = get("/legacy");
    dispatcher.handle(&mut legacy).unwrap();
    assert_eq!(legacy.response().map(|r| r.status), Some(418));

    std::fs::remove_dir_all(&site).unwrap();
}

#[tokio::test]
async fn test_watcher_starts_on_existing_file() {
    let dir = std::env::temp_dir().join(format!("dispatch-cfg-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("routes.toml");
    std::fs::write(&path, "[server]\nport = 8080\n").unwrap();

    let (watcher, _updates) = ConfigWatcher::new(&path);
    let handle = watcher.run().expect("watcher should start");
    drop(handle);

    assert_eq!(config::load_config(&path).unwrap().server.port, 8080);
    std::fs::remove_dir_all(&dir).unwrap();
}
