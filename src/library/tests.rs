use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::path::Path;
use std::thread;

use tempfile::tempdir;

use super::metadata::{display_name, read_local};
use super::*;
use crate::error::Error;

/// A tiny PCM WAV file carrying a RIFF INFO tag.
fn wav_with_info(title: &str, artist: &str) -> Vec<u8> {
    fn sub(id: &[u8; 4], value: &str) -> Vec<u8> {
        let mut data = value.as_bytes().to_vec();
        data.push(0);
        if data.len() % 2 == 1 {
            data.push(0);
        }
        let mut out = id.to_vec();
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend_from_slice(&data);
        out
    }

    let mut fmt = b"fmt ".to_vec();
    fmt.extend_from_slice(&16u32.to_le_bytes());
    fmt.extend_from_slice(&1u16.to_le_bytes()); // PCM
    fmt.extend_from_slice(&1u16.to_le_bytes()); // mono
    fmt.extend_from_slice(&8000u32.to_le_bytes());
    fmt.extend_from_slice(&16000u32.to_le_bytes());
    fmt.extend_from_slice(&2u16.to_le_bytes());
    fmt.extend_from_slice(&16u16.to_le_bytes());

    let mut data = b"data".to_vec();
    data.extend_from_slice(&8u32.to_le_bytes());
    data.extend_from_slice(&[0u8; 8]);

    let mut info = b"INFO".to_vec();
    info.extend(sub(b"INAM", title));
    info.extend(sub(b"IART", artist));
    let mut list = b"LIST".to_vec();
    list.extend_from_slice(&(info.len() as u32).to_le_bytes());
    list.extend(info);

    let mut body = b"WAVE".to_vec();
    body.extend(fmt);
    body.extend(data);
    body.extend(list);

    let mut out = b"RIFF".to_vec();
    out.extend_from_slice(&(body.len() as u32).to_le_bytes());
    out.extend(body);
    out
}

#[test]
fn ensure_directory_is_idempotent() {
    let dir = tempdir().unwrap();
    let store = LibraryStore::new(dir.path().join("clips"));

    assert!(!store.root().exists());
    store.ensure_directory().unwrap();
    store.ensure_directory().unwrap();
    assert!(store.root().is_dir());
}

#[test]
fn list_is_empty_when_root_is_absent() {
    let dir = tempdir().unwrap();
    let store = LibraryStore::new(dir.path().join("missing"));
    assert!(store.list().is_empty());
    assert!(store.local_records().is_empty());
}

#[test]
fn list_only_returns_top_level_visible_files() {
    let dir = tempdir().unwrap();
    let store = LibraryStore::new(dir.path());

    fs::write(dir.path().join("a.mp3"), b"x").unwrap();
    fs::write(dir.path().join("b.mp3"), b"x").unwrap();
    fs::write(dir.path().join(".partial"), b"x").unwrap();
    fs::create_dir_all(dir.path().join("sub")).unwrap();
    fs::write(dir.path().join("sub").join("c.mp3"), b"x").unwrap();

    let mut names = store.list();
    names.sort();
    assert_eq!(names, vec!["a.mp3".to_string(), "b.mp3".to_string()]);
}

#[test]
fn exists_tracks_files_by_filename() {
    let dir = tempdir().unwrap();
    let store = LibraryStore::new(dir.path());

    assert!(!store.exists("horn.mp3"));
    fs::write(store.path_for("horn.mp3"), b"x").unwrap();
    assert!(store.exists("horn.mp3"));
    // Sentinel rows have an empty filename and never exist.
    assert!(!store.exists(""));
}

#[test]
fn delete_removes_blob_and_reports_missing_ones() {
    let dir = tempdir().unwrap();
    let store = LibraryStore::new(dir.path());
    fs::write(store.path_for("horn.mp3"), b"x").unwrap();

    store.delete("horn.mp3").unwrap();
    assert!(!store.exists("horn.mp3"));
    assert!(store.list().is_empty());

    match store.delete("horn.mp3") {
        Err(Error::DeleteNotFound(name)) => assert_eq!(name, "horn.mp3"),
        other => panic!("expected DeleteNotFound, got {other:?}"),
    }
}

#[test]
fn local_records_are_sorted_and_named_after_file_stem() {
    let dir = tempdir().unwrap();
    let store = LibraryStore::new(dir.path());
    fs::write(store.path_for("wrong.mp3"), b"not audio").unwrap();
    fs::write(store.path_for("Airhorn.mp3"), b"not audio").unwrap();

    let records = store.local_records();
    let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Airhorn", "wrong"]);
    assert!(records.iter().all(|r| r.source_url.is_none()));
    assert!(records.iter().all(|r| r.kind == DisplayKind::Entry));
    assert!(records.iter().all(|r| r.metadata.is_none()));
}

#[test]
fn read_local_swallows_parse_errors() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("garbage.mp3");
    fs::write(&path, b"definitely not audio").unwrap();

    assert_eq!(read_local(&path), AudioMetadata::default());
    assert_eq!(read_local(&dir.path().join("absent.mp3")), AudioMetadata::default());
}

#[test]
fn read_local_extracts_riff_info_tags() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("horn.wav");
    fs::write(&path, wav_with_info("Air Horn", "Bob")).unwrap();

    let meta = read_local(&path);
    assert_eq!(meta.title.as_deref(), Some("Air Horn"));
    assert_eq!(meta.artist.as_deref(), Some("Bob"));
    assert_eq!(meta.album, None);
    assert_eq!(meta.cover, None);

    let store = LibraryStore::new(dir.path());
    let records = store.local_records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "Air Horn");
    assert_eq!(records[0].filename, "horn.wav");
}

/// Answer a single HTTP request with `body` as an audio file.
fn serve_clip(body: Vec<u8>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        loop {
            let mut line = String::new();
            if reader.read_line(&mut line).unwrap() == 0 || line == "\r\n" {
                break;
            }
        }
        let head = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: audio/wav\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        );
        stream.write_all(head.as_bytes()).unwrap();
        stream.write_all(&body).unwrap();
    });

    format!("http://{addr}/media/sounds/horn.wav")
}

#[test]
fn remote_metadata_is_read_from_fetched_bytes() {
    let url = serve_clip(wav_with_info("Air Horn", "Bob"));
    let http = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()
        .unwrap();

    let meta = MetadataReader::new(http).read(&MetadataSource::Remote(url));
    assert_eq!(meta.title.as_deref(), Some("Air Horn"));
    assert_eq!(meta.artist.as_deref(), Some("Bob"));
    assert_eq!(meta.album, None);
}

#[test]
fn remote_metadata_failures_yield_empty_metadata() {
    let http = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(2))
        .build()
        .unwrap();
    let reader = MetadataReader::new(http);
    let meta = reader.read(&MetadataSource::Remote(
        "http://127.0.0.1:9/media/sounds/horn.mp3".to_string(),
    ));
    assert_eq!(meta, AudioMetadata::default());
}

#[test]
fn display_name_prefers_title_tag() {
    let p = Path::new("/tmp/horn.mp3");
    let mut meta = AudioMetadata::default();
    assert_eq!(display_name(p, &meta), "horn");
    meta.title = Some("Air Horn".into());
    assert_eq!(display_name(p, &meta), "Air Horn");
}

#[test]
fn same_clip_matches_by_filename_only() {
    let a = SoundRecord::remote("Air Horn", "https://x/media/sounds/horn.mp3", "horn.mp3");
    let b = SoundRecord::local("horn", "horn.mp3");
    let c = SoundRecord::local("horn", "other.mp3");
    assert!(a.same_clip(&b));
    assert!(!a.same_clip(&c));
    assert!(!SoundRecord::search_prompt().same_clip(&SoundRecord::search_prompt()));
}
