//! Fetcher and driver behavior against a local mock HTTP server.

use equipment_image_download::BROWSER_REFERER;
use equipment_image_download::catalog::CatalogItem;
use equipment_image_download::driver::{Driver, Tally};
use equipment_image_download::fetch::Fetcher;
use equipment_image_download::proxy::Proxies;
use std::path::Path;
use std::time::{Duration, Instant};
use tempfile::tempdir;
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher() -> Fetcher {
    Fetcher::new(Duration::from_secs(5), &Proxies::default()).unwrap()
}

fn image(content_type: &str, body: &[u8]) -> ResponseTemplate {
    ResponseTemplate::new(200).insert_header("content-type", content_type).set_body_bytes(body.to_vec())
}

fn sorted_file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> =
        std::fs::read_dir(dir).unwrap().map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned()).collect();
    names.sort();
    names
}

async fn mount(server: &MockServer, route: &str, response: ResponseTemplate) {
    Mock::given(method("GET")).and(path(route)).respond_with(response).mount(server).await;
}

#[tokio::test]
async fn test_run_two_items_three_images() {
    let server = MockServer::start().await;
    mount(&server, "/a.jpg", image("image/jpeg", b"aaaa")).await;
    mount(&server, "/b.jpg", image("image/jpeg", b"bb")).await;
    mount(&server, "/c.jpg", image("image/jpeg", b"c")).await;

    let uri = server.uri();
    let catalog = vec![
        CatalogItem::new("item1", "Item 1", &[format!("{uri}/a.jpg").as_str()]),
        CatalogItem::new("item2", "Item 2", &[format!("{uri}/b.jpg").as_str(), format!("{uri}/c.jpg").as_str()]),
    ];

    let dir = tempdir().unwrap();
    let fetcher = fetcher();
    let driver = Driver::new(&fetcher, dir.path().to_path_buf(), Duration::ZERO, true);
    let tally = driver.run(&catalog).await.unwrap();

    assert_eq!(
        tally,
        Tally {
            success: 3,
            failed: 0
        }
    );
    assert_eq!(sorted_file_names(dir.path()), vec!["item1.jpg", "item2_0.jpg", "item2_1.jpg"]);
    // URL order is preserved in the index suffix
    assert_eq!(std::fs::read(dir.path().join("item2_0.jpg")).unwrap(), b"bb");
    assert_eq!(std::fs::read(dir.path().join("item2_1.jpg")).unwrap(), b"c");
}

#[tokio::test]
async fn test_fetch_extension_from_content_type() {
    let server = MockServer::start().await;
    mount(&server, "/png", image("image/png", b"png")).await;
    mount(&server, "/webp", image("image/webp", b"webp")).await;
    mount(&server, "/gif", image("image/gif", b"gif")).await;
    mount(&server, "/none", ResponseTemplate::new(200).set_body_bytes(b"raw".to_vec())).await;

    let dir = tempdir().unwrap();
    let fetcher = fetcher();
    let uri = server.uri();

    let result = fetcher.fetch(&format!("{uri}/png"), "p", dir.path()).await;
    assert!(result.success);
    assert_eq!(result.filename, "p.png");
    assert_eq!(result.byte_count, 3);
    assert_eq!(result.error, None);

    assert_eq!(fetcher.fetch(&format!("{uri}/webp"), "w", dir.path()).await.filename, "w.webp");
    assert_eq!(fetcher.fetch(&format!("{uri}/gif"), "g", dir.path()).await.filename, "g.jpg");
    assert_eq!(fetcher.fetch(&format!("{uri}/none"), "n", dir.path()).await.filename, "n.jpg");

    assert_eq!(sorted_file_names(dir.path()), vec!["g.jpg", "n.jpg", "p.png", "w.webp"]);
}

#[tokio::test]
async fn test_fetch_sends_browser_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/guarded.jpg"))
        .and(header_exists("user-agent"))
        .and(header("referer", BROWSER_REFERER))
        .and(header("dnt", "1"))
        .and(header("sec-fetch-dest", "image"))
        .and(header("sec-fetch-mode", "no-cors"))
        .and(header("sec-fetch-site", "same-origin"))
        .and(header_exists("accept-encoding"))
        .respond_with(image("image/jpeg", b"ok"))
        .mount(&server)
        .await;
    mount(&server, "/guarded.jpg", ResponseTemplate::new(403)).await;

    let dir = tempdir().unwrap();
    let result = fetcher().fetch(&format!("{}/guarded.jpg", server.uri()), "guarded", dir.path()).await;
    assert!(result.success, "{:?}", result.error);
}

#[tokio::test]
async fn test_fetch_follows_redirects() {
    let server = MockServer::start().await;
    let uri = server.uri();
    mount(&server, "/old", ResponseTemplate::new(302).insert_header("location", format!("{uri}/new"))).await;
    mount(&server, "/new", image("image/png", b"moved")).await;

    let dir = tempdir().unwrap();
    let result = fetcher().fetch(&format!("{uri}/old"), "moved", dir.path()).await;
    assert!(result.success);
    assert_eq!(std::fs::read(dir.path().join("moved.png")).unwrap(), b"moved");
}

#[tokio::test]
async fn test_fetch_http_error_writes_nothing() {
    let server = MockServer::start().await;
    mount(&server, "/missing.jpg", ResponseTemplate::new(404)).await;

    let dir = tempdir().unwrap();
    let result = fetcher().fetch(&format!("{}/missing.jpg", server.uri()), "missing", dir.path()).await;

    assert!(!result.success);
    assert_eq!(result.filename, "missing");
    assert_eq!(result.byte_count, 0);
    assert!(result.error.unwrap().contains("404"));
    assert!(sorted_file_names(dir.path()).is_empty());
}

#[tokio::test]
async fn test_fetch_timeout() {
    let server = MockServer::start().await;
    mount(&server, "/slow.jpg", image("image/jpeg", b"late").set_delay(Duration::from_secs(3))).await;

    let dir = tempdir().unwrap();
    let fetcher = Fetcher::new(Duration::from_millis(200), &Proxies::default()).unwrap();
    let result = fetcher.fetch(&format!("{}/slow.jpg", server.uri()), "slow", dir.path()).await;

    assert!(!result.success);
    assert!(result.error.is_some());
    assert!(sorted_file_names(dir.path()).is_empty());
}

#[tokio::test]
async fn test_fetch_write_error() {
    let server = MockServer::start().await;
    mount(&server, "/a.jpg", image("image/jpeg", b"aaaa")).await;

    // A regular file can not hold the image
    let dir = tempdir().unwrap();
    let not_a_dir = dir.path().join("plain-file");
    std::fs::write(&not_a_dir, b"").unwrap();

    let result = fetcher().fetch(&format!("{}/a.jpg", server.uri()), "a", &not_a_dir).await;
    assert!(!result.success);
    assert!(result.error.unwrap().starts_with("unable to write"));
}

#[tokio::test]
async fn test_run_continues_after_failure() {
    let server = MockServer::start().await;
    mount(&server, "/one.jpg", image("image/jpeg", b"1")).await;
    mount(&server, "/two.jpg", ResponseTemplate::new(404)).await;
    mount(&server, "/three.png", image("image/png", b"3")).await;

    let uri = server.uri();
    let catalog = vec![
        CatalogItem::new("one", "One", &[format!("{uri}/one.jpg").as_str()]),
        CatalogItem::new("two", "Two", &[format!("{uri}/two.jpg").as_str()]),
        CatalogItem::new("empty", "No image", &[]),
        CatalogItem::new("three", "Three", &[format!("{uri}/three.png").as_str()]),
    ];

    let dir = tempdir().unwrap();
    let fetcher = fetcher();
    let tally =
        Driver::new(&fetcher, dir.path().to_path_buf(), Duration::ZERO, true).run(&catalog).await.unwrap();

    assert_eq!(tally.success, 2);
    assert_eq!(tally.failed, 1);
    assert_eq!(sorted_file_names(dir.path()), vec!["one.jpg", "three.png"]);
}

#[tokio::test]
async fn test_run_overwrites_previous_files() {
    let server = MockServer::start().await;
    mount(&server, "/a.jpg", image("image/jpeg", b"fresh")).await;

    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("item1.jpg"), b"stale content").unwrap();

    let catalog = vec![CatalogItem::new("item1", "Item 1", &[format!("{}/a.jpg", server.uri()).as_str()])];
    let fetcher = fetcher();
    let driver = Driver::new(&fetcher, dir.path().to_path_buf(), Duration::ZERO, true);

    driver.run(&catalog).await.unwrap();
    driver.run(&catalog).await.unwrap();

    assert_eq!(sorted_file_names(dir.path()), vec!["item1.jpg"]);
    assert_eq!(std::fs::read(dir.path().join("item1.jpg")).unwrap(), b"fresh");
}

#[tokio::test]
async fn test_run_creates_output_dir() {
    let server = MockServer::start().await;
    mount(&server, "/a.webp", image("image/webp", b"w")).await;

    let dir = tempdir().unwrap();
    let output_dir = dir.path().join("nested").join("images");
    let catalog = vec![CatalogItem::new("item1", "Item 1", &[format!("{}/a.webp", server.uri()).as_str()])];

    let fetcher = fetcher();
    let tally = Driver::new(&fetcher, output_dir.clone(), Duration::ZERO, true).run(&catalog).await.unwrap();

    assert_eq!(tally.success, 1);
    assert!(output_dir.join("item1.webp").is_file());
}

#[tokio::test]
async fn test_run_output_dir_error() {
    let dir = tempdir().unwrap();
    let not_a_dir = dir.path().join("plain-file");
    std::fs::write(&not_a_dir, b"").unwrap();

    let fetcher = fetcher();
    let driver = Driver::new(&fetcher, not_a_dir.join("images"), Duration::ZERO, true);
    assert!(driver.run(&[]).await.is_err());
}

#[tokio::test]
async fn test_run_output_dir_is_a_file() {
    let server = MockServer::start().await;
    Mock::given(method("GET")).respond_with(image("image/jpeg", b"x")).expect(0).mount(&server).await;

    let dir = tempdir().unwrap();
    let not_a_dir = dir.path().join("plain-file");
    std::fs::write(&not_a_dir, b"").unwrap();

    let catalog = vec![
        CatalogItem::new("item1", "Item 1", &[format!("{}/a.jpg", server.uri()).as_str()]),
        CatalogItem::new("item2", "Item 2", &[format!("{}/b.jpg", server.uri()).as_str()]),
    ];
    let fetcher = fetcher();
    let driver = Driver::new(&fetcher, not_a_dir.clone(), Duration::ZERO, true);

    assert!(driver.run(&catalog).await.is_err());
    assert!(not_a_dir.is_file());
    // No request goes out once the output directory is known to be unusable
    server.verify().await;
}

#[tokio::test]
async fn test_run_pauses_after_every_attempt() {
    let server = MockServer::start().await;
    mount(&server, "/a.jpg", image("image/jpeg", b"a")).await;
    mount(&server, "/b.jpg", ResponseTemplate::new(404)).await;

    let uri = server.uri();
    let catalog = vec![CatalogItem::new(
        "item1",
        "Item 1",
        &[format!("{uri}/a.jpg").as_str(), format!("{uri}/b.jpg").as_str()],
    )];

    let dir = tempdir().unwrap();
    let fetcher = fetcher();
    let throttle = Duration::from_millis(150);
    let driver = Driver::new(&fetcher, dir.path().to_path_buf(), throttle, true);

    let start = Instant::now();
    let tally = driver.run(&catalog).await.unwrap();
    let elapsed = start.elapsed();

    assert_eq!(tally.success + tally.failed, 2);
    // The pause follows failures and the last attempt too
    assert!(elapsed >= throttle * 2, "elapsed {elapsed:?}");
}
