use popcorn::omdb::{OmdbApi, OmdbClient, OmdbError};
use popcorn::search::SearchController;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

const SEARCH_BODY: &str = r#"{"Search":[{"Title":"Alien","Year":"1979","imdbID":"tt0078748","Poster":"N/A"}],"totalResults":"1","Response":"True"}"#;

/// Answers one connection per canned `(status line, body)` pair, in order,
/// and records each request line.
async fn serve(replies: Vec<(&'static str, &'static str)>) -> (String, Arc<Mutex<Vec<String>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let base = format!("http://{}/", listener.local_addr().expect("addr"));
    let requests = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&requests);
    tokio::spawn(async move {
        for (status, body) in replies {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let head = read_head(&mut socket).await;
            if let Some(line) = head.lines().next() {
                seen.lock().unwrap().push(line.to_string());
            }
            let reply = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = socket.write_all(reply.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });
    (base, requests)
}

async fn read_head(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

async fn settle(search: &mut SearchController) {
    search.step().await;
    search.step().await;
}

#[tokio::test]
async fn non_success_status_reports_code_and_reason() {
    let (base, requests) = serve(vec![("500 Internal Server Error", "oops")]).await;
    let client = OmdbClient::new(&base, "k").expect("client");

    let err = client.search("star wars").await.unwrap_err();
    assert!(matches!(err, OmdbError::Transport { status: 500, .. }));
    assert_eq!(err.to_string(), "Error: 500: Internal Server Error");
    assert_eq!(
        *requests.lock().unwrap(),
        vec!["GET /?apikey=k&s=star%20wars HTTP/1.1"]
    );
}

#[tokio::test]
async fn search_and_detail_decode_over_http() {
    let (base, _) = serve(vec![
        ("200 OK", SEARCH_BODY),
        ("200 OK", r#"{"Response":"False","Error":"Incorrect IMDb ID."}"#),
    ])
    .await;
    let client = OmdbClient::new(&base, "k").expect("client");

    let results = client.search("alien").await.expect("search");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, "tt0078748");
    assert_eq!(results[0].poster_url, None);
    assert!(matches!(
        client.fetch_detail("tt-bogus").await,
        Err(OmdbError::NotFound)
    ));
}

#[tokio::test]
async fn controller_clears_results_on_http_failures() {
    let (base, _) = serve(vec![
        ("200 OK", SEARCH_BODY),
        ("503 Service Unavailable", ""),
        ("200 OK", SEARCH_BODY),
        ("200 OK", "<html>maintenance</html>"),
    ])
    .await;
    let client = OmdbClient::new(&base, "k").expect("client");
    let mut search = SearchController::new(Arc::new(client), Duration::from_millis(1));

    search.set_query("alien", || {});
    settle(&mut search).await;
    assert_eq!(search.results().len(), 1);

    search.set_query("aliens", || {});
    settle(&mut search).await;
    assert_eq!(search.error(), Some("Error: 503: Service Unavailable"));
    assert!(search.results().is_empty());
    assert!(!search.is_loading());

    search.set_query("alien3", || {});
    settle(&mut search).await;
    assert_eq!(search.results().len(), 1);
    assert!(search.error().is_none());

    search.set_query("alien4", || {});
    settle(&mut search).await;
    let error = search.error().expect("malformed body error");
    assert!(error.starts_with("Error: malformed OMDb response"));
    assert!(search.results().is_empty());
}

#[tokio::test]
async fn connection_failure_surfaces_as_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let base = format!("http://{}/", listener.local_addr().expect("addr"));
    drop(listener);

    let client = OmdbClient::new(&base, "k").expect("client");
    let mut search = SearchController::new(Arc::new(client), Duration::from_millis(1));
    search.set_query("alien", || {});
    settle(&mut search).await;

    let error = search.error().expect("connection error");
    assert!(error.starts_with("Error: request failed"));
    assert!(search.results().is_empty());
    assert!(!search.is_loading());
}
