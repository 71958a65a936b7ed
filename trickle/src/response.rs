use std::sync::Arc;

use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use http::{HeaderMap, Response, StatusCode};

use crate::{BodyMode, Config, Html, HtmlBody};

pub const HTML_CONTENT_TYPE: &str = "text/html;charset=UTF-8";

/// An HTTP response whose body is produced from a template.
///
/// Status and headers are available right away; the body is produced while it
/// is being sent, or all at once in [`BodyMode::Buffered`].
#[derive(Debug)]
pub struct HtmlResponse {
    html: Html,
    config: Arc<Config>,
    mode: BodyMode,
    status: StatusCode,
    headers: HeaderMap,
}

impl HtmlResponse {
    pub fn new(html: Html) -> Self {
        Self::with_config(html, Config::default())
    }

    /// Buffers the whole document before sending it.
    pub fn buffered(html: Html) -> Self {
        Self::new(html).mode(BodyMode::Buffered)
    }

    pub fn with_config(html: Html, config: impl Into<Arc<Config>>) -> Self {
        let config = config.into();
        HtmlResponse {
            html,
            mode: config.body,
            config,
            status: StatusCode::OK,
            headers: HeaderMap::new(),
        }
    }

    pub fn mode(mut self, mode: BodyMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn into_http(self) -> Response<HtmlBody> {
        let mut headers = self.headers;
        if !headers.contains_key(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(HTML_CONTENT_TYPE));
        }
        let body = HtmlBody::new(self.html.into_chunks_with(self.config), self.mode);
        let mut response = Response::new(body);
        *response.status_mut() = self.status;
        *response.headers_mut() = headers;
        response
    }
}

impl From<HtmlResponse> for Response<HtmlBody> {
    fn from(response: HtmlResponse) -> Self {
        response.into_http()
    }
}

#[cfg(feature = "axum")]
mod axum {
    use axum_core::body::Body;
    use axum_core::response::{IntoResponse, Response};

    use super::HtmlResponse;
    use crate::Html;

    impl IntoResponse for HtmlResponse {
        fn into_response(self) -> Response {
            self.into_http().map(Body::new)
        }
    }

    impl IntoResponse for Html {
        fn into_response(self) -> Response {
            HtmlResponse::new(self).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html;
    use http_body_util::BodyExt;

    async fn text(response: Response<HtmlBody>) -> String {
        let bytes = response.into_body().collect().await.expect("body").to_bytes();
        String::from_utf8(bytes.to_vec()).expect("utf-8")
    }

    #[tokio::test]
    async fn test_stringify() {
        let response = HtmlResponse::new(html!("<div></div>")).into_http();
        assert_eq!(text(response).await, "<div></div>");
    }

    #[test]
    fn test_default_content_type() {
        let response = HtmlResponse::new(html!("<div></div>")).into_http();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], HTML_CONTENT_TYPE);
        assert!(response.headers()[CONTENT_TYPE].to_str().expect("ascii").contains("text/html"));
    }

    #[test]
    fn test_caller_content_type_is_kept() {
        let response = HtmlResponse::new(html!("body {{ color: red }}"))
            .header(CONTENT_TYPE, HeaderValue::from_static("text/css"))
            .status(StatusCode::NOT_FOUND)
            .into_http();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/css");
        assert_eq!(response.headers().get_all(CONTENT_TYPE).iter().count(), 1);
    }

    #[tokio::test]
    async fn test_escaping() {
        let response = HtmlResponse::new(html!("<div>{}</div>", "<div></div>")).into_http();
        assert_eq!(text(response).await, "<div>&lt;div&gt;&lt;/div&gt;</div>");
    }

    #[tokio::test]
    async fn test_buffered() {
        let response = HtmlResponse::buffered(html!("<b>{}</b>", 1)).into_http();
        assert_eq!(response.body().mode(), BodyMode::Buffered);
        assert_eq!(response.headers()[CONTENT_TYPE], HTML_CONTENT_TYPE);
        assert_eq!(text(response).await, "<b>1</b>");
    }

    #[test]
    fn test_mode_from_config() {
        let config = Config {
            body: BodyMode::Buffered,
            ..Config::default()
        };
        let response = HtmlResponse::with_config(html!("x"), config).into_http();
        assert_eq!(response.body().mode(), BodyMode::Buffered);
    }
}
