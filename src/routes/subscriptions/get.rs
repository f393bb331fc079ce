use actix_web::http::header::ContentType;
use actix_web::HttpResponse;
use actix_web_flash_messages::IncomingFlashMessages;
use actix_web_flash_messages::Level;

/// `GET /`, `GET /subscriptions` (and any other non-`POST` method on the
/// latter)
///
/// Renders the signup form, preceded by the outcome of the previous `POST`, if
/// any.
pub async fn subscription_form(flash_messages: IncomingFlashMessages) -> HttpResponse {
    let mut msg_html = String::new();
    for msg in flash_messages.iter() {
        let class = match msg.level() {
            Level::Error | Level::Warning => "error",
            _ => "success",
        };
        msg_html.push_str(&format!(
            "<p class=\"{class}\"><i>{}</i></p>\n",
            htmlescape::encode_minimal(msg.content())
        ))
    }

    let body = format!(
        r#"
<!doctype html>
<html lang="en">
  <head>
    <meta http-equiv="content-type" content="text/html; charset=utf-8" />
    <title>Subscribe to our newsletter</title>
  </head>
  <body>
    {msg_html}
    <form action="/subscriptions" method="post">
      <label>
        Email
        <input type="email" placeholder="Enter your email address" name="email" required />
      </label>
      <button type="submit">Subscribe</button>
    </form>
  </body>
</html>
    "#
    );

    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(body)
}
