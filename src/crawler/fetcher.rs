//! Page fetching
//!
//! [`PageFetcher`] is the boundary between the crawl engine and whatever
//! actually loads documents. The bundled [`HttpFetcher`] is a plain reqwest
//! GET with a navigation timeout; a browser-driven implementation would slot
//! in behind the same trait. [`ListSource`] sits one level up: it produces
//! the ordered entity list the whole run works through.

use crate::config::UserAgentConfig;
use crate::crawler::extract::parse_entity_list;
use crate::state::EntityRef;
use crate::{GrimoireError, Result};
use reqwest::Client;
use std::future::Future;
use std::time::Duration;

/// A successfully loaded document
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: String,

    /// HTTP status code
    pub status: u16,

    /// Document body
    pub body: String,
}

/// Loads one document from a URL
pub trait PageFetcher: Send + Sync {
    /// Loads the document at `url`, classifying failures
    fn load(&self, url: &str) -> impl Future<Output = Result<FetchedPage>> + Send;
}

/// Produces the ordered entity list for a crawl run
pub trait ListSource: Send + Sync {
    /// Fetches and parses the entity list
    ///
    /// Fails with [`GrimoireError::ListUnavailable`] when the list page
    /// cannot be loaded or yields no entities.
    fn fetch_list(&self) -> impl Future<Output = Result<Vec<EntityRef>>> + Send;
}

/// Builds the shared HTTP client with proper identification
///
/// User agent format: `CrawlerName/Version (+ContactURL; ContactEmail)`
pub fn build_http_client(config: &UserAgentConfig) -> std::result::Result<Client, reqwest::Error> {
    let user_agent = format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    );

    Client::builder()
        .user_agent(user_agent)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// reqwest-backed page fetcher
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

impl PageFetcher for HttpFetcher {
    async fn load(&self, url: &str) -> Result<FetchedPage> {
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GrimoireError::Timeout {
                        url: url.to_string(),
                    }
                } else {
                    GrimoireError::Http {
                        url: url.to_string(),
                        source: e,
                    }
                }
            })?;

        let status = response.status();
        let final_url = response.url().to_string();

        if !status.is_success() {
            return Err(GrimoireError::BadStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| GrimoireError::Http {
            url: url.to_string(),
            source: e,
        })?;

        Ok(FetchedPage {
            final_url,
            status: status.as_u16(),
            body,
        })
    }
}

/// List source that scrapes the catalog's list page over HTTP
#[derive(Debug, Clone)]
pub struct HttpListSource<F: PageFetcher> {
    fetcher: F,
    base_url: String,
    list_url: String,
}

impl<F: PageFetcher> HttpListSource<F> {
    pub fn new(fetcher: F, base_url: impl Into<String>, list_url: impl Into<String>) -> Self {
        Self {
            fetcher,
            base_url: base_url.into(),
            list_url: list_url.into(),
        }
    }
}

impl<F: PageFetcher> ListSource for HttpListSource<F> {
    async fn fetch_list(&self) -> Result<Vec<EntityRef>> {
        tracing::info!("Fetching entity list from {}", self.list_url);

        let page = self
            .fetcher
            .load(&self.list_url)
            .await
            .map_err(|e| GrimoireError::ListUnavailable {
                message: e.to_string(),
            })?;

        let entities = parse_entity_list(&page.body, &self.base_url)?;
        if entities.is_empty() {
            return Err(GrimoireError::ListUnavailable {
                message: format!("no entity links found at {}", self.list_url),
            });
        }

        tracing::info!("Found {} entities", entities.len());
        Ok(entities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_test_config() -> UserAgentConfig {
        UserAgentConfig {
            crawler_name: "TestCrawler".to_string(),
            crawler_version: "1.0".to_string(),
            contact_url: "https://example.com/about".to_string(),
            contact_email: "admin@example.com".to_string(),
        }
    }

    #[test]
    fn test_build_http_client() {
        let config = create_test_config();
        let client = build_http_client(&config);
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_load_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/card/viper"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>viper</html>"))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(Client::new(), Duration::from_secs(5));
        let page = fetcher
            .load(&format!("{}/card/viper", server.uri()))
            .await
            .unwrap();

        assert_eq!(page.status, 200);
        assert_eq!(page.body, "<html>viper</html>");
    }

    #[tokio::test]
    async fn test_load_non_2xx_is_bad_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/card/gone"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(Client::new(), Duration::from_secs(5));
        let err = fetcher
            .load(&format!("{}/card/gone", server.uri()))
            .await
            .unwrap_err();

        assert!(matches!(err, GrimoireError::BadStatus { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_load_timeout_classified() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(
                ResponseTemplate::new(200).set_delay(Duration::from_secs(10)),
            )
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(Client::new(), Duration::from_millis(100));
        let err = fetcher
            .load(&format!("{}/slow", server.uri()))
            .await
            .unwrap_err();

        assert!(matches!(err, GrimoireError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_list_source_parses_entities() {
        let server = MockServer::start().await;
        let body = format!(
            r#"<html><body>
            <a href="/card/viper"><h3>Viper</h3><img src="{}/img/viper.png"></a>
            <a href="/card/ghost"><h3>Ghost</h3></a>
            </body></html>"#,
            server.uri()
        );
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(Client::new(), Duration::from_secs(5));
        let source = HttpListSource::new(
            fetcher,
            server.uri(),
            format!("{}/search?c=monsters", server.uri()),
        );

        let entities = source.fetch_list().await.unwrap();
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].id, 0);
        assert_eq!(entities[0].name, "Viper");
        assert!(entities[0].icon_url.is_some());
        assert_eq!(entities[1].name, "Ghost");
        assert_eq!(entities[1].icon_url, None);
    }

    #[tokio::test]
    async fn test_list_source_empty_page_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(Client::new(), Duration::from_secs(5));
        let source = HttpListSource::new(
            fetcher,
            server.uri(),
            format!("{}/search", server.uri()),
        );

        let err = source.fetch_list().await.unwrap_err();
        assert!(matches!(err, GrimoireError::ListUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_list_source_fetch_failure_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(Client::new(), Duration::from_secs(5));
        let source = HttpListSource::new(
            fetcher,
            server.uri(),
            format!("{}/search", server.uri()),
        );

        let err = source.fetch_list().await.unwrap_err();
        assert!(matches!(err, GrimoireError::ListUnavailable { .. }));
    }
}
