//! Fake PX-Web upstream for tests: a warp server on an ephemeral localhost
//! port answering canned bodies and counting requests.

use serde_json::Value;
use std::{
    collections::HashMap,
    convert::Infallible,
    net::SocketAddr,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};
use url::Url;
use warp::{http::StatusCode, hyper::body::Bytes, path::Tail, Filter, Reply};

use crate::client::StatsClient;

/// Canned responses keyed by path without the leading slash (`"is/Ibuar"`).
/// Unknown paths answer 404.
#[derive(Default, Clone)]
pub struct Fixture {
    gets: HashMap<String, String>,
    posts: HashMap<String, String>,
    delays: HashMap<String, Duration>,
}

impl Fixture {
    pub fn get(mut self, path: &str, body: Value) -> Self {
        self.gets.insert(path.to_string(), body.to_string());
        self
    }

    /// Serve `body` verbatim, labelled as JSON whether or not it is.
    pub fn get_raw(mut self, path: &str, body: &str) -> Self {
        self.gets.insert(path.to_string(), body.to_string());
        self
    }

    /// Hold GET answers for `path` back by `wait`.
    pub fn delay(mut self, path: &str, wait: Duration) -> Self {
        self.delays.insert(path.to_string(), wait);
        self
    }

    pub fn post(mut self, path: &str, body: Value) -> Self {
        self.posts.insert(path.to_string(), body.to_string());
        self
    }

    pub async fn spawn(self) -> FakeUpstream {
        let gets = Arc::new(AtomicUsize::new(0));
        let posts = Arc::new(AtomicUsize::new(0));
        let posted = Arc::new(Mutex::new(Vec::new()));

        let get_bodies = Arc::new(self.gets);
        let delays = Arc::new(self.delays);
        let get_route = warp::get().and(warp::path::tail()).and_then({
            let counter = gets.clone();
            move |tail: Tail| {
                counter.fetch_add(1, Ordering::SeqCst);
                let wait = delays.get(tail.as_str()).copied();
                let reply = canned(get_bodies.get(tail.as_str()));
                async move {
                    if let Some(wait) = wait {
                        tokio::time::sleep(wait).await;
                    }
                    Ok::<_, Infallible>(reply)
                }
            }
        });

        let post_bodies = Arc::new(self.posts);
        let post_route = warp::post()
            .and(warp::path::tail())
            .and(warp::body::bytes())
            .map({
                let counter = posts.clone();
                let posted = posted.clone();
                move |tail: Tail, body: Bytes| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    let parsed = serde_json::from_slice(&body).unwrap_or(Value::Null);
                    posted.lock().unwrap().push(parsed);
                    canned(post_bodies.get(tail.as_str()))
                }
            });

        let (addr, server) =
            warp::serve(get_route.or(post_route)).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);

        FakeUpstream {
            addr,
            gets,
            posts,
            posted,
        }
    }
}

fn canned(body: Option<&String>) -> warp::reply::Response {
    match body {
        Some(text) => {
            warp::reply::with_header(text.clone(), "content-type", "application/json")
                .into_response()
        }
        None => warp::reply::with_status("not found", StatusCode::NOT_FOUND).into_response(),
    }
}

pub struct FakeUpstream {
    pub addr: SocketAddr,
    gets: Arc<AtomicUsize>,
    posts: Arc<AtomicUsize>,
    posted: Arc<Mutex<Vec<Value>>>,
}

impl FakeUpstream {
    pub fn base_url(&self) -> Url {
        Url::parse(&format!("http://{}/", self.addr)).unwrap()
    }

    pub fn client(&self) -> StatsClient {
        let http = reqwest::Client::builder()
            .no_proxy()
            .timeout(Duration::from_secs(2))
            .build()
            .unwrap();
        StatsClient::with_client(http, self.base_url(), "is")
    }

    pub fn get_count(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn post_count(&self) -> usize {
        self.posts.load(Ordering::SeqCst)
    }

    pub fn posted_bodies(&self) -> Vec<Value> {
        self.posted.lock().unwrap().clone()
    }
}
