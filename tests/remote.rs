use sitemap_stream::{
    DecodeError, Error, FetchConfig, FetchError, Fetcher, USER_AGENT, parse_entries_from_site,
    parse_index_entries_from_site,
};
use std::future::pending;
use std::path::PathBuf;

const SITEMAP: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>https://example.com/a</loc><priority>0.9</priority></url>
  <url><loc>https://example.com/b</loc></url>
</urlset>"#;

const INDEX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <sitemap><loc>https://example.com/sitemap1.xml</loc></sitemap>
</sitemapindex>"#;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_parse_entries_from_site() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/sitemap.xml")
        .match_header("user-agent", USER_AGENT)
        .with_status(200)
        .with_header("content-type", "application/xml")
        .with_body(SITEMAP)
        .create_async()
        .await;

    let mut seen = Vec::new();
    parse_entries_from_site::<_, ()>(&format!("{}/sitemap.xml", server.url()), |e| {
        seen.push((e.location().to_string(), e.priority()));
        Ok(())
    })
    .await
    .unwrap();

    assert_eq!(
        seen,
        vec![
            ("https://example.com/a".to_string(), 0.9),
            ("https://example.com/b".to_string(), 0.5),
        ]
    );
    mock.assert_async().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_parse_index_entries_from_site() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/sitemap_index.xml")
        .with_status(200)
        .with_body(INDEX)
        .create_async()
        .await;

    let mut seen = Vec::new();
    parse_index_entries_from_site::<_, ()>(&format!("{}/sitemap_index.xml", server.url()), |e| {
        seen.push(e.location().to_string());
        Ok(())
    })
    .await
    .unwrap();

    assert_eq!(seen, vec!["https://example.com/sitemap1.xml"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_error_status_never_reaches_consumer() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/sitemap.xml")
        .with_status(503)
        .with_body(SITEMAP)
        .create_async()
        .await;

    let mut calls = 0;
    let result = parse_entries_from_site::<_, ()>(&format!("{}/sitemap.xml", server.url()), |_| {
        calls += 1;
        Ok(())
    })
    .await;

    assert_eq!(calls, 0);
    assert!(matches!(
        result,
        Err(Error::Fetch(FetchError::Status { status: 503, .. }))
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_custom_user_agent_and_consumer_stop() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/sitemap.xml")
        .match_header("user-agent", "TestBot/1.0")
        .with_status(200)
        .with_body(SITEMAP)
        .create_async()
        .await;

    let config = FetchConfig {
        user_agent: "TestBot/1.0".to_string(),
        ..FetchConfig::default()
    };
    let fetcher = Fetcher::new(&config).unwrap();

    let mut calls = 0;
    let result = fetcher
        .parse_entries_from_site(&format!("{}/sitemap.xml", server.url()), pending(), |_| {
            calls += 1;
            Err("stop")
        })
        .await;

    assert_eq!(calls, 1);
    assert_eq!(result.unwrap_err().into_stopped(), Some("stop"));
    mock.assert_async().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_cancelled_fetch() {
    let server = mockito::Server::new_async().await;
    let fetcher = Fetcher::new(&FetchConfig::default()).unwrap();

    let (tx, rx) = tokio::sync::oneshot::channel::<()>();
    drop(tx);

    let mut calls = 0;
    let result = fetcher
        .parse_index_entries_from_site::<_, _, ()>(
            &format!("{}/sitemap_index.xml", server.url()),
            async {
                let _ = rx.await;
            },
            |_| {
                calls += 1;
                Ok(())
            },
        )
        .await;

    assert_eq!(calls, 0);
    assert!(matches!(result, Err(Error::Fetch(FetchError::Cancelled { .. }))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_gzip_encoded_sitemap() {
    let gz = std::fs::read(
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("testdata")
            .join("sitemap.xml.gz"),
    )
    .unwrap();
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/sitemap.xml")
        .with_status(200)
        .with_header("content-type", "application/xml")
        .with_header("content-encoding", "gzip")
        .with_body(gz)
        .create_async()
        .await;

    let mut seen = Vec::new();
    parse_entries_from_site::<_, ()>(&format!("{}/sitemap.xml", server.url()), |e| {
        seen.push(e.location().to_string());
        Ok(())
    })
    .await
    .unwrap();

    assert_eq!(
        seen,
        vec![
            "http://www.example.com/",
            "http://www.example.com/catalog?item=12&desc=vacation_hawaii",
            "http://www.example.com/catalog?item=73&desc=vacation_new_zealand",
            "http://www.example.com/catalog?item=74&desc=vacation_newfoundland",
        ]
    );
    mock.assert_async().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_truncated_body_is_decode_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/sitemap.xml")
        .with_status(200)
        .with_body("<urlset><url><loc>a</loc></url>")
        .create_async()
        .await;

    let mut seen = Vec::new();
    let result = parse_entries_from_site::<_, ()>(&format!("{}/sitemap.xml", server.url()), |e| {
        seen.push(e.location().to_string());
        Ok(())
    })
    .await;

    assert_eq!(seen, vec!["a"]);
    match result {
        Err(Error::Decode(DecodeError::UnexpectedEof { tag })) => assert_eq!(tag, "urlset"),
        other => panic!("expected unexpected EOF, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_cancel_between_records() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/sitemap.xml")
        .with_status(200)
        .with_body(SITEMAP)
        .create_async()
        .await;

    let fetcher = Fetcher::new(&FetchConfig::default()).unwrap();
    let notify = tokio::sync::Notify::new();

    let mut calls = 0;
    let result = fetcher
        .parse_entries_from_site::<_, _, ()>(
            &format!("{}/sitemap.xml", server.url()),
            notify.notified(),
            |_| {
                calls += 1;
                notify.notify_one();
                Ok(())
            },
        )
        .await;

    assert_eq!(calls, 1);
    assert!(matches!(result, Err(Error::Fetch(FetchError::Cancelled { .. }))));
}
