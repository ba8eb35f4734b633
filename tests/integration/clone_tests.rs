use crate::{
    attr_values, mount_bytes, mount_html, mount_status, mount_text, seed, test_config,
    MOCK_FOLDER,
};
use site_clone::config::OutputFormat;
use site_clone::crawler::{Cloner, Page, ResourceContent};
use site_clone::{clone_site, CloneError, CloneIssue, ResourceKind};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

/// Mounts a small two-page site with one resource of each kind on the seed
async fn mount_basic_site(server: &MockServer) {
    mount_html(
        server,
        "/",
        r#"<html><head>
        <title>Home</title>
        <link rel="stylesheet" href="/s.css">
        <style>h1 { font-weight: 700; }</style>
        <script src="/a.js"></script>
        </head><body>
        <h1>Home</h1>
        <img src="/b.png" srcset="/b-2x.png 2x" alt="logo">
        <a href="/about">About</a>
        <a href="/">Home</a>
        <a href="https://elsewhere.example.org/">Elsewhere</a>
        </body></html>"#,
    )
    .await;
    mount_html(
        server,
        "/about",
        r#"<html><head><link rel="stylesheet" href="/s.css"></head>
        <body><h1>About</h1><a href="/">Back</a></body></html>"#,
    )
    .await;
    mount_text(server, "/s.css", "body { margin: 0; }", "text/css").await;
    mount_text(server, "/a.js", "console.log('hi');", "application/javascript").await;
    mount_bytes(server, "/b.png", PNG_BYTES, "image/png").await;
}

fn resource_paths(page: &Page) -> Vec<String> {
    page.resources
        .iter()
        .map(|r| r.relative_path.clone())
        .collect()
}

/// Local (non-remote, non-navigation) references of a rewritten page
fn local_references(html: &str) -> BTreeSet<String> {
    let mut refs = attr_values(html, "link[rel=stylesheet]", "href");
    refs.extend(attr_values(html, "script[src]", "src"));
    refs.extend(attr_values(html, "img[src]", "src"));
    refs.into_iter()
        .filter(|r| !r.starts_with('/') && !r.starts_with("data:") && !r.contains("://"))
        .collect()
}

#[tokio::test]
async fn test_clone_localizes_resources() {
    let server = MockServer::start().await;
    mount_basic_site(&server).await;

    let report = clone_site(&seed(&server), test_config()).await.unwrap();

    assert_eq!(report.folder_name, MOCK_FOLDER);
    assert!(report.errors.is_empty(), "unexpected errors: {:?}", report.errors);
    assert_eq!(report.pages.len(), 2);

    let index = &report.pages[0];
    assert_eq!(index.slug, "index");
    assert_eq!(
        resource_paths(index),
        vec![
            "css/index-style0.css",
            "css/index-inline-style0.css",
            "js/index-script0.js",
            "images/index-image0.png"
        ]
    );

    assert_eq!(
        attr_values(&index.html, "link[rel=stylesheet]", "href"),
        vec!["css/index-style0.css", "css/index-inline-style0.css"]
    );
    assert_eq!(attr_values(&index.html, "script", "src"), vec!["js/index-script0.js"]);
    assert_eq!(attr_values(&index.html, "img", "src"), vec!["images/index-image0.png"]);
    assert!(attr_values(&index.html, "img", "srcset").is_empty());

    assert_eq!(
        attr_values(&index.html, "a", "href"),
        vec![
            "/127-clone/about.html",
            "/127-clone/index.html",
            "https://elsewhere.example.org/"
        ]
    );
    assert_eq!(attr_values(&index.html, "a[target=_blank]", "href").len(), 2);

    let image = index
        .resources
        .iter()
        .find(|r| r.kind == ResourceKind::Image)
        .unwrap();
    assert_eq!(image.content, ResourceContent::Binary(PNG_BYTES.to_vec()));

    let inline = &index.resources[1];
    assert_eq!(
        inline.content,
        ResourceContent::Text("h1 { font-weight: 700; }".to_string())
    );

    let about = &report.pages[1];
    assert_eq!(about.slug, "about");
    assert_eq!(resource_paths(about), vec!["css/about-style0.css"]);
    assert_eq!(attr_values(&about.html, "a", "href"), vec!["/127-clone/index.html"]);
}

#[tokio::test]
async fn test_failed_stylesheet_keeps_remote_href() {
    let server = MockServer::start().await;
    let missing = format!("{}/second.css?v=2", server.uri());

    mount_html(
        &server,
        "/",
        &format!(
            r#"<html><head>
            <link rel="stylesheet" href="/first.css">
            <link rel="stylesheet" href="{}">
            </head><body></body></html>"#,
            missing
        ),
    )
    .await;
    mount_text(&server, "/first.css", "p { color: blue; }", "text/css").await;
    mount_status(&server, "/second.css", 404).await;

    let report = clone_site(&seed(&server), test_config()).await.unwrap();
    let page = &report.pages[0];

    assert_eq!(page.css_files().len(), 1);
    assert_eq!(resource_paths(page), vec!["css/index-style0.css"]);
    assert_eq!(
        attr_values(&page.html, "link[rel=stylesheet]", "href"),
        vec!["css/index-style0.css".to_string(), missing]
    );

    assert_eq!(report.errors.len(), 1);
    assert!(matches!(
        &report.errors[0],
        CloneIssue::ResourceFetch {
            kind: ResourceKind::Css,
            ..
        }
    ));
}

#[tokio::test]
async fn test_every_local_reference_has_a_resource() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        "/",
        r#"<html><head>
        <link rel="stylesheet" href="/ok.css">
        <link rel="stylesheet" href="/gone.css">
        <style>.a{}</style>
        <script src="/gone.js"></script>
        <script src="/ok.js"></script>
        </head><body>
        <img src="/pic.jpg"><img src="/gone.gif"><img src="data:image/gif;base64,R0lGOD">
        <a href="/docs">Docs</a>
        </body></html>"#,
    )
    .await;
    mount_html(
        &server,
        "/docs",
        r#"<html><head><style>.b{}</style></head><body><img src="/pic.jpg"></body></html>"#,
    )
    .await;
    mount_text(&server, "/ok.css", ".ok{}", "text/css").await;
    mount_text(&server, "/ok.js", "ok()", "application/javascript").await;
    mount_bytes(&server, "/pic.jpg", b"JPEGDATA", "image/jpeg").await;

    let report = clone_site(&seed(&server), test_config()).await.unwrap();
    assert_eq!(report.pages.len(), 2);

    for page in &report.pages {
        let referenced = local_references(&page.html);
        let produced: BTreeSet<String> = resource_paths(page).into_iter().collect();
        assert_eq!(referenced, produced, "page {}", page.url);
    }

    // gone.css, gone.js, gone.gif; the data: image is never fetched.
    assert_eq!(report.errors.len(), 3);
    assert_eq!(
        resource_paths(&report.pages[0]),
        vec![
            "css/index-style0.css",
            "css/index-inline-style0.css",
            "js/index-script0.js",
            "images/index-image0.jpg"
        ]
    );
}

#[tokio::test]
async fn test_page_failure_is_soft() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        "/",
        r#"<a href="/about">About</a><a href="/flaky">Flaky</a>"#,
    )
    .await;
    mount_html(&server, "/about", "<p>About</p>").await;

    // Passes the link check, then fails when scraped.
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>Flaky</p>"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_status(&server, "/flaky", 500).await;

    let report = clone_site(&seed(&server), test_config()).await.unwrap();

    let slugs: Vec<&str> = report.pages.iter().map(|p| p.slug.as_str()).collect();
    assert_eq!(slugs, vec!["index", "about"]);
    assert_eq!(report.errors.len(), 1);
    assert!(matches!(
        &report.errors[0],
        CloneIssue::PageScrape { url, .. } if url.ends_with("/flaky")
    ));
}

#[tokio::test]
async fn test_seed_failing_after_discovery_is_fatal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>Home</p>"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_status(&server, "/", 502).await;

    let result = clone_site(&seed(&server), test_config()).await;
    assert!(matches!(result, Err(CloneError::SeedUnreachable { .. })));
}

#[tokio::test]
async fn test_colliding_slugs_are_disambiguated() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        "/",
        r#"<a href="/docs/index">Docs</a><a href="/blog/index">Blog</a>"#,
    )
    .await;
    mount_html(&server, "/docs/index", "<p>Docs</p>").await;
    mount_html(&server, "/blog/index", "<p>Blog</p>").await;

    let report = clone_site(&seed(&server), test_config()).await.unwrap();

    let files: Vec<String> = report.pages.iter().map(|p| p.file_name()).collect();
    assert_eq!(files, vec!["index.html", "index-2.html", "index-3.html"]);
}

#[tokio::test]
async fn test_inline_suffixed_slug_does_not_share_files() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        "/",
        r#"<a href="/x">X</a><a href="/x-inline">X inline</a>"#,
    )
    .await;
    mount_html(
        &server,
        "/x",
        "<html><head><style>.x{}</style></head><body>X</body></html>",
    )
    .await;
    mount_html(
        &server,
        "/x-inline",
        r#"<html><head><link rel="stylesheet" href="/s.css"></head><body>Y</body></html>"#,
    )
    .await;
    mount_text(&server, "/s.css", ".y{}", "text/css").await;

    let cloner = Cloner::new(test_config()).unwrap();
    let report = cloner.clone_site(&seed(&server)).await.unwrap();

    let slugs: Vec<&str> = report.pages.iter().map(|p| p.slug.as_str()).collect();
    assert_eq!(slugs, vec!["index", "x", "x-inline-2"]);
    assert_eq!(resource_paths(&report.pages[1]), vec!["css/x-inline-style0.css"]);
    assert_eq!(
        resource_paths(&report.pages[2]),
        vec!["css/x-inline-2-style0.css"]
    );

    let mut seen = BTreeSet::new();
    for page in &report.pages {
        for (path, _) in page.entries() {
            assert!(seen.insert(path.clone()), "duplicate entry {}", path);
        }
    }

    let out = TempDir::new().unwrap();
    let packaged = cloner
        .clone_into(&seed(&server), OutputFormat::Zip, out.path())
        .await
        .unwrap();
    assert_eq!(packaged.entries, seen.len());
}

#[tokio::test]
async fn test_slow_link_and_stylesheet_time_out_softly() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        "/",
        r#"<html><head>
        <link rel="stylesheet" href="/fast.css">
        <link rel="stylesheet" href="/slow.css">
        </head><body>
        <a href="/about">About</a>
        <a href="/slow">Slow</a>
        </body></html>"#,
    )
    .await;
    mount_html(&server, "/about", "<p>About</p>").await;
    mount_text(&server, "/fast.css", ".fast{}", "text/css").await;

    for route in ["/slow", "/slow.css"] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("late")
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;
    }

    let mut config = test_config();
    config.http.request_timeout_secs = 1;
    config.http.connect_timeout_secs = 1;

    let report = clone_site(&seed(&server), config).await.unwrap();

    let slugs: Vec<&str> = report.pages.iter().map(|p| p.slug.as_str()).collect();
    assert_eq!(slugs, vec!["index", "about"]);

    let index = &report.pages[0];
    assert_eq!(resource_paths(index), vec!["css/index-style0.css"]);
    assert_eq!(
        attr_values(&index.html, "link[rel=stylesheet]", "href"),
        vec!["css/index-style0.css", "/slow.css"]
    );

    assert_eq!(report.errors.len(), 2, "errors: {:?}", report.errors);
    assert!(report.errors.iter().any(|issue| matches!(
        issue,
        CloneIssue::LinkCheck { url, reason }
            if url.ends_with("/slow") && reason.contains("timeout")
    )));
    assert!(report.errors.iter().any(|issue| matches!(
        issue,
        CloneIssue::ResourceFetch { url, kind: ResourceKind::Css, reason, .. }
            if url.ends_with("/slow.css") && reason.contains("timeout")
    )));
}

#[tokio::test]
async fn test_clone_is_idempotent() {
    let server = MockServer::start().await;
    mount_basic_site(&server).await;

    let cloner = Cloner::new(test_config()).unwrap();
    let first = cloner.clone_site(&seed(&server)).await.unwrap();
    let second = cloner.clone_site(&seed(&server)).await.unwrap();

    let paths = |pages: &[Page]| -> Vec<Vec<String>> {
        pages
            .iter()
            .map(|p| {
                let mut entries: Vec<String> = p.entries().map(|(path, _)| path).collect();
                entries.sort();
                entries
            })
            .collect()
    };

    assert_eq!(first.folder_name, second.folder_name);
    assert_eq!(paths(&first.pages), paths(&second.pages));
}

#[tokio::test]
async fn test_clone_into_directory() {
    let server = MockServer::start().await;
    mount_basic_site(&server).await;
    let out = TempDir::new().unwrap();

    let cloner = Cloner::new(test_config()).unwrap();
    let report = cloner
        .clone_into(&seed(&server), OutputFormat::Directory, out.path())
        .await
        .unwrap();

    let root = out.path().join(MOCK_FOLDER);
    assert_eq!(report.output, root);
    assert_eq!(report.pages.len(), 2);
    assert_eq!(report.entries, 7);

    for file in [
        "index.html",
        "about.html",
        "css/index-style0.css",
        "css/index-inline-style0.css",
        "css/about-style0.css",
        "js/index-script0.js",
        "images/index-image0.png",
    ] {
        assert!(root.join(file).is_file(), "missing {}", file);
    }

    assert_eq!(
        std::fs::read(root.join("images/index-image0.png")).unwrap(),
        PNG_BYTES
    );
    let index = std::fs::read_to_string(root.join("index.html")).unwrap();
    assert_eq!(attr_values(&index, "script", "src"), vec!["js/index-script0.js"]);

    // Only the finished tree is left in the output directory.
    let names: Vec<String> = std::fs::read_dir(out.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec![MOCK_FOLDER]);
}

#[tokio::test]
async fn test_clone_into_zip() {
    let server = MockServer::start().await;
    mount_basic_site(&server).await;
    let out = TempDir::new().unwrap();

    let cloner = Cloner::new(test_config()).unwrap();
    let report = cloner
        .clone_into(&seed(&server), OutputFormat::Zip, out.path())
        .await
        .unwrap();

    let archive_path = out.path().join(format!("{}.zip", MOCK_FOLDER));
    assert_eq!(report.output, archive_path);

    let mut archive = zip::ZipArchive::new(File::open(&archive_path).unwrap()).unwrap();
    let names: BTreeSet<String> = archive.file_names().map(str::to_string).collect();
    let expected: BTreeSet<String> = [
        "index.html",
        "about.html",
        "css/index-style0.css",
        "css/index-inline-style0.css",
        "css/about-style0.css",
        "js/index-script0.js",
        "images/index-image0.png",
    ]
    .iter()
    .map(|f| format!("{}/{}", MOCK_FOLDER, f))
    .collect();
    assert_eq!(names, expected);

    let mut css = String::new();
    archive
        .by_name(&format!("{}/css/index-style0.css", MOCK_FOLDER))
        .unwrap()
        .read_to_string(&mut css)
        .unwrap();
    assert_eq!(css, "body { margin: 0; }");
}

#[tokio::test]
async fn test_failed_job_leaves_no_output() {
    let server = MockServer::start().await;
    mount_status(&server, "/", 404).await;
    let out = TempDir::new().unwrap();

    let cloner = Cloner::new(test_config()).unwrap();
    for format in [OutputFormat::Directory, OutputFormat::Zip] {
        let result = cloner.clone_into(&seed(&server), format, out.path()).await;
        assert!(matches!(result, Err(CloneError::SeedUnreachable { .. })));
    }

    assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);
}
