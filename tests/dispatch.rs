//! End-to-end dispatch behavior.

use std::sync::Arc;

use http::Method;
use request_dispatch::handlers::{filters, MemoryFs};
use request_dispatch::http::{DispatchState, ResponseBody};
use request_dispatch::routing::PathPrefixMatcher;
use request_dispatch::{DispatchError, Dispatcher, MethodSet, Request, Response, RewriteRule};

mod common;
use common::{get, request_via, same, Probe};

#[test]
fn test_rewrites_compose_last_match_wins() {
    common::init_logging();
    let dispatcher = Dispatcher::new();
    dispatcher.add_rewrite(
        RewriteRule::new("", "/A?p=1&keep=yes").with_matcher(PathPrefixMatcher::new("/")),
    );
    dispatcher.add_rewrite(RewriteRule::new("", "/B?p=2").with_matcher(PathPrefixMatcher::new("/")));

    let mut req = get("/start");
    dispatcher.dispatch(&mut req).unwrap();

    assert_eq!(req.url(), "/B");
    assert_eq!(req.param("p"), Some("2"));
    assert_eq!(req.param("keep"), Some("yes"));
}

#[test]
fn test_first_capable_handler_selected() {
    let dispatcher = Dispatcher::new();
    let h1 = dispatcher.add_handler(Probe::new("h1", true, false));
    let h2 = dispatcher.add_handler(Probe::new("h2", true, true));

    let mut req = get("/");
    dispatcher.handle(&mut req).unwrap();

    assert!(req.handler().is_some_and(|h| same(&h, &h2)));
    assert_eq!(h1.processed(), 0);
    assert_eq!(h2.processed(), 1);
    assert_eq!(req.response().map(|r| r.body.clone()), Some(ResponseBody::Text("h2".into())));
}

#[test]
fn test_catch_all_is_stable() {
    let dispatcher = Dispatcher::new();
    dispatcher.add_handler(Probe::new("nope", false, true));
    dispatcher.add_handler(Probe::new("nope", true, false));

    let mut a = get("/a");
    let mut b = Request::builder(Method::POST, "/b").build().unwrap();
    let first = dispatcher.dispatch(&mut a).unwrap();
    let second = dispatcher.dispatch(&mut b).unwrap();

    let catch_all = dispatcher.catch_all_handler();
    assert!(same(&first, &catch_all));
    assert!(same(&second, &catch_all));
}

#[test]
fn test_default_catch_all_answers_404() {
    let dispatcher = Dispatcher::new();
    let mut req = get("/missing");
    dispatcher.handle(&mut req).unwrap();
    assert_eq!(req.response().map(|r| r.status), Some(404));
}

#[test]
fn test_reset_falls_through_to_catch_all() {
    let dispatcher = Dispatcher::new();
    dispatcher.rewrite("/", "/index.htm");
    dispatcher.on("/index.htm", MethodSet::GET, |req| {
        req.send(Response::status(200));
    });
    dispatcher.on_not_found(|req| {
        req.send(Response::status(410));
    });

    dispatcher.reset();

    let mut req = get("/");
    dispatcher.handle(&mut req).unwrap();
    assert_eq!(req.url(), "/");
    assert!(req.handler().is_some_and(|h| same(&h, &dispatcher.catch_all_handler())));
    // Callbacks were cleared too, so the default 404 is produced.
    assert_eq!(req.response().map(|r| r.status), Some(404));
}

#[test]
fn test_request_dispatched_once() {
    let dispatcher = Dispatcher::new();
    let mut req = get("/");
    dispatcher.handle(&mut req).unwrap();
    assert_eq!(req.state(), DispatchState::Bound);
    assert!(matches!(
        dispatcher.handle(&mut req),
        Err(DispatchError::AlreadyDispatched(_))
    ));
}

#[test]
fn test_interface_filters_split_station_and_access_point() {
    let station = Some("192.168.1.20".parse().unwrap());
    let dispatcher = Dispatcher::new();
    let sta = dispatcher.add_handler(
        request_dispatch::CallbackHandler::new("/").with_filter(filters::on_station(station)),
    );
    sta.on_request(|req| {
        req.send(Response::text(200, "text/plain", "station"));
    });
    let ap = dispatcher.add_handler(
        request_dispatch::CallbackHandler::new("/").with_filter(filters::on_access_point(station)),
    );
    ap.on_request(|req| {
        req.send(Response::text(200, "text/plain", "portal"));
    });

    let mut via_sta = request_via(Method::GET, "/", "192.168.1.20:80", "192.168.1.5:40000");
    let mut via_ap = request_via(Method::GET, "/", "192.168.4.1:80", "192.168.4.2:40000");
    dispatcher.handle(&mut via_sta).unwrap();
    dispatcher.handle(&mut via_ap).unwrap();

    assert_eq!(via_sta.response().unwrap().body, ResponseBody::Text("station".into()));
    assert_eq!(via_ap.response().unwrap().body, ResponseBody::Text("portal".into()));
}

#[test]
fn test_static_and_callback_routes() {
    let fs = Arc::new(
        MemoryFs::new()
            .with_file("/www/index.htm", "<html>")
            .with_file("/www/style.css", "body{}"),
    );
    let dispatcher = Dispatcher::new();
    dispatcher.on("/api/status", MethodSet::GET, |req| {
        req.send(Response::text(200, "application/json", "{\"ok\":true}"));
    });
    dispatcher.serve_static("/", fs, "/www/", Some("max-age=60"));

    let mut css = get("/style.css");
    dispatcher.handle(&mut css).unwrap();
    let response = css.response().unwrap();
    assert_eq!(response.content_type.as_deref(), Some("text/css"));
    assert_eq!(
        response.body,
        ResponseBody::File { path: "/www/style.css".into(), gzip: false }
    );

    let mut api = get("/api/status");
    dispatcher.handle(&mut api).unwrap();
    assert_eq!(api.response().unwrap().content_type.as_deref(), Some("application/json"));

    let mut post = Request::builder(Method::POST, "/style.css").build().unwrap();
    let handler = dispatcher.dispatch(&mut post).unwrap();
    assert_eq!(handler.kind(), "catch_all");
}

#[test]
fn test_handler_callback_may_reconfigure_routes() {
    let dispatcher = Arc::new(Dispatcher::new());
    let weak = Arc::downgrade(&dispatcher);
    dispatcher.on("/enable", MethodSet::POST, move |req| {
        if let Some(d) = weak.upgrade() {
            d.on("/feature", MethodSet::GET, |req| {
                req.send(Response::status(204));
            });
            d.rewrite("/f", "/feature");
        }
        req.send(Response::status(200));
    });

    let mut before = get("/f");
    assert_eq!(dispatcher.dispatch(&mut before).unwrap().kind(), "catch_all");

    let mut enable = Request::builder(Method::POST, "/enable").build().unwrap();
    dispatcher.handle(&mut enable).unwrap();

    let mut after = get("/f");
    dispatcher.handle(&mut after).unwrap();
    assert_eq!(after.url(), "/feature");
    assert_eq!(after.response().map(|r| r.status), Some(204));
}
