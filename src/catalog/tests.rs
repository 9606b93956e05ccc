use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::sync::mpsc;
use std::thread;

use super::parse::ScrapeRules;
use super::*;
use crate::config::CatalogSettings;
use crate::error::Error;
use crate::library::DisplayKind;

const AIRHORN_PAGE: &str = r#"
<html><body>
<div class="instant">
  <button class="small-button" title="Jouer le son de Air Horn"
          onclick="play('/media/sounds/air-horn-club-sample_1.mp3', 'loader-1', 'air-horn-1')"></button>
</div>
<div class="instant">
  <button class="small-button" title="Jouer le son de Sad Trombone"
          onclick="play('/media/sounds/sadtrombone.swf.mp3', 'loader-2', 'sad-2')"></button>
</div>
<div class="instant">
  <button class="small-button" title="Jouer le son de Wrong"
          onclick="stop()"></button>
</div>
</body></html>
"#;

fn rules() -> ScrapeRules {
    ScrapeRules::from_settings(&CatalogSettings::default()).unwrap()
}

fn page_with_buttons(n: usize) -> String {
    let mut html = String::from("<html><body>");
    for i in 0..n {
        html.push_str(&format!(
            r#"<button class="small-button" title="Jouer le son de Clip {i}" onclick="play('/media/sounds/clip-{i}.mp3', 'l{i}', 's{i}')"></button>"#
        ));
    }
    html.push_str("</body></html>");
    html
}

/// Serve `body` once on a local port and report the request line.
fn serve_once(status: &'static str, body: String) -> (String, mpsc::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let mut request_line = String::new();
        reader.read_line(&mut request_line).unwrap();
        loop {
            let mut line = String::new();
            if reader.read_line(&mut line).unwrap() == 0 || line == "\r\n" {
                break;
            }
        }
        let _ = tx.send(request_line.trim().to_string());
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).unwrap();
    });

    (format!("http://{addr}"), rx)
}

fn catalog_for(base_url: String) -> HttpCatalog {
    let settings = CatalogSettings {
        base_url,
        timeout_secs: 5,
        ..CatalogSettings::default()
    };
    let http = build_http_client(&settings).unwrap();
    HttpCatalog::new(http, &settings).unwrap()
}

#[test]
fn airhorn_page_yields_two_records() {
    let records = rules().parse(AIRHORN_PAGE);

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].name, "Air Horn");
    assert_eq!(records[0].filename, "air-horn-club-sample_1.mp3");
    assert_eq!(
        records[0].source_url.as_deref(),
        Some("https://www.myinstants.com/media/sounds/air-horn-club-sample_1.mp3")
    );
    assert_eq!(records[1].name, "Sad Trombone");
    assert_eq!(records[1].filename, "sadtrombone.swf.mp3");
    assert!(records.iter().all(|r| r.kind == DisplayKind::Entry));
    assert!(records.iter().all(|r| r.metadata.is_none()));
}

#[test]
fn n_well_formed_buttons_yield_n_records() {
    for n in [0usize, 1, 7] {
        let records = rules().parse(&page_with_buttons(n));
        assert_eq!(records.len(), n);
        assert!(records.iter().all(|r| !r.name.is_empty() && !r.filename.is_empty()));
    }
}

#[test]
fn malformed_buttons_are_skipped() {
    let html = r#"
        <button class="small-button" onclick="play('/media/sounds/no-title.mp3', 'l')"></button>
        <button class="small-button" title="Jouer le son de No handler"></button>
        <button class="small-button" title="Jouer le son de " onclick="play('/media/sounds/empty-name.mp3', 'l')"></button>
        <button class="small-button" title="Jouer le son de Dir" onclick="play('/media/sounds/', 'l')"></button>
        <button class="big-button" title="Jouer le son de Other" onclick="play('/media/sounds/other.mp3', 'l')"></button>
        <button class="small-button" title="Jouer le son de Ok" onclick="play('/media/sounds/ok.mp3', 'l')"></button>
    "#;
    let records = rules().parse(html);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "Ok");
    assert_eq!(records[0].filename, "ok.mp3");
}

#[test]
fn garbage_html_is_not_an_error() {
    assert!(rules().parse("<<<not html at all").is_empty());
    assert!(rules().parse("").is_empty());
}

#[test]
fn title_without_localized_prefix_is_kept_whole() {
    let html = r#"<button class="small-button" title="Bruh" onclick="play('/media/sounds/bruh.mp3', 'l')"></button>"#;
    let records = rules().parse(html);
    assert_eq!(records[0].name, "Bruh");
}

#[test]
fn search_url_encodes_query() {
    let catalog = catalog_for("https://www.myinstants.com/".to_string());
    assert_eq!(
        catalog.search_url("air horn & co"),
        "https://www.myinstants.com/fr/search/?name=air%20horn%20%26%20co"
    );
}

#[test]
fn search_fetches_and_parses_results_page() {
    let (base, requests) = serve_once("200 OK", AIRHORN_PAGE.to_string());
    let catalog = catalog_for(base.clone());

    let records = catalog.search("airhorn").unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(
        records[0].source_url.as_deref(),
        Some(format!("{base}/media/sounds/air-horn-club-sample_1.mp3").as_str())
    );

    let request_line = requests.recv().unwrap();
    assert_eq!(request_line, "GET /fr/search/?name=airhorn HTTP/1.1");
}

#[test]
fn search_reports_http_errors_as_network_errors() {
    let (base, _requests) = serve_once("503 Service Unavailable", String::new());
    let catalog = catalog_for(base);
    assert!(matches!(catalog.search("airhorn"), Err(Error::Network(_))));
}

#[test]
fn search_reports_transport_failures_as_network_errors() {
    let catalog = catalog_for("http://127.0.0.1:9".to_string());
    assert!(matches!(catalog.search("airhorn"), Err(Error::Network(_))));
}
