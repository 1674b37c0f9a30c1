use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

const HOME: &str = r#"<!doctype html>
<html>
  <head><title>Home</title></head>
  <body>
    <a href="/about">About</a>
    <a href="/contact#form">Contact</a>
    <a href="blog/">Blog</a>
    <a href="https://partner.example/contact">Partner</a>
    <a href="/logo.png">Logo</a>
    <a href="mailto:owner@example.com">Mail</a>
  </body>
</html>
"#;

const ABOUT: &str = r#"<!doctype html>
<html>
  <body>
    <a href="/">Home</a>
    <a href="/broken">Write for us</a>
    <a href="/about#team">Team</a>
  </body>
</html>
"#;

const CONTACT: &str = r#"<!doctype html>
<html>
  <body>
    <form action="/contact/send" method="post">
      <label for="c-email">Email</label><input id="c-email" type="email" name="email" required>
      <label for="c-msg">Message</label><textarea id="c-msg" name="message"></textarea>
      <button type="submit">Send</button>
    </form>
  </body>
</html>
"#;

const BLOG: &str = r#"<!doctype html>
<html>
  <body>
    <a href="first-post">First post</a>
    <form action="/wp-comments-post.php" method="post" id="commentform">
      <textarea id="comment" name="comment"></textarea>
      <input id="author" name="author" type="text">
      <input id="email" name="email" type="email">
      <input id="url" name="url" type="url">
    </form>
  </body>
</html>
"#;

const FIRST_POST: &str = r#"<!doctype html>
<html>
  <body>
    <form role="search" action="/"><input name="s" placeholder="Search"></form>
    <a href="/contact">Contact</a>
  </body>
</html>
"#;

/// A small site on 127.0.0.1; records every requested path
pub struct SiteStub {
    pub base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl SiteStub {
    pub fn spawn() -> Self {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("start site stub server");
        let base_url = format!("http://{}", server.server_addr());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let log = Arc::clone(&requests);
        let handle = thread::spawn(move || {
            loop {
                if shutdown_rx.try_recv().is_ok() {
                    break;
                }

                let request = match server.recv_timeout(Duration::from_millis(50)) {
                    Ok(Some(req)) => req,
                    Ok(None) => continue,
                    Err(_) => break,
                };

                let path = request.url().to_string();
                log.lock().expect("request log").push(path.clone());

                let (status, body) = match path.as_str() {
                    "/" => (200, HOME),
                    "/about" => (200, ABOUT),
                    "/contact" => (200, CONTACT),
                    "/blog/" => (200, BLOG),
                    "/blog/first-post" => (200, FIRST_POST),
                    "/broken" => (500, "internal error"),
                    _ => (404, "not found"),
                };

                let header = tiny_http::Header::from_bytes(
                    &b"Content-Type"[..],
                    &b"text/html; charset=utf-8"[..],
                )
                .expect("build header");
                let response = tiny_http::Response::from_string(body)
                    .with_status_code(status)
                    .with_header(header);

                let _ = request.respond(response);
            }
        });

        Self {
            base_url,
            requests,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    #[allow(dead_code)]
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("request log").clone()
    }
}

impl Drop for SiteStub {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
