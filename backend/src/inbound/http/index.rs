//! Landing page served at `/`.
//!
//! A single static document with a small form that calls the lookup endpoint
//! from the browser. It is rendered inline so the binary ships without a
//! template directory.

use actix_web::{HttpResponse, get, http::header};

// A macro rather than a const so `concat!` can splice it into the page.
macro_rules! page_title {
    () => {
        "Weather Service"
    };
}

/// Title shown in the browser tab and page heading.
pub const PAGE_TITLE: &str = page_title!();

const INDEX_HTML: &str = concat!(
    r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <link rel="icon" href="/favicon.ico">
  <title>"#,
    page_title!(),
    r#"</title>
  <style>
    body { font-family: system-ui, sans-serif; max-width: 32rem; margin: 3rem auto; padding: 0 1rem; }
    form { display: flex; gap: 0.5rem; }
    input { flex: 1; padding: 0.4rem; }
    #result { margin-top: 1.5rem; font-size: 1.2rem; }
  </style>
</head>
<body>
  <h1>"#,
    page_title!(),
    r#"</h1>
  <form id="lookup">
    <input id="city" name="city" placeholder="City, e.g. London" required>
    <button type="submit">Look up</button>
  </form>
  <p id="result"></p>
  <script>
    document.getElementById("lookup").addEventListener("submit", async (event) => {
      event.preventDefault();
      const city = document.getElementById("city").value;
      const result = document.getElementById("result");
      const response = await fetch("/api/weather?city=" + encodeURIComponent(city));
      const body = await response.json();
      result.textContent = response.ok
        ? body.city + ": " + body.weather + ", " + body.temperature
        : body.message;
    });
  </script>
</body>
</html>
"#
);

const FAVICON_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 32 32"><circle cx="12" cy="12" r="7" fill="#f5b400"/><path d="M10 26h14a5 5 0 0 0 0-10 7 7 0 0 0-13 2 4 4 0 0 0-1 8z" fill="#9aa7b8"/></svg>"##;

/// Serve the landing page.
#[get("/")]
pub async fn index() -> HttpResponse {
    HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, "text/html; charset=utf-8"))
        .body(INDEX_HTML)
}

/// Serve the site icon referenced by the landing page.
#[get("/favicon.ico")]
pub async fn favicon() -> HttpResponse {
    HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, "image/svg+xml"))
        .insert_header((header::CACHE_CONTROL, "public, max-age=86400"))
        .body(FAVICON_SVG)
}
