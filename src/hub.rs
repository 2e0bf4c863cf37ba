use crate::opt_env_var;
use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Method, Url};
use std::time::Duration;

// The hub exposes its registry of things over a small unauthenticated
// REST API on the local network:
//
//   GET    /rest/v1/things        -> {"data": [{"id", "type", "name", "promoted"}, ...]}
//   DELETE /rest/v1/things/<id>

pub const DEFAULT_HUB_HOST: &str = "ninjasphere.local";
pub const DEFAULT_HUB_PORT: u16 = 8000;

#[derive(clap::Parser, Debug)]
pub struct HubArguments {
    /// Host name or address of the hub.
    /// You may also set this via the SPHERE_HUB_HOST environment variable.
    /// Defaults to ninjasphere.local.
    #[arg(long, global = true)]
    hub_host: Option<String>,

    /// Port of the hub's REST API.
    /// You may also set this via the SPHERE_HUB_PORT environment variable.
    /// Defaults to 8000.
    #[arg(long, global = true)]
    hub_port: Option<u16>,

    /// Give up on a request after this many seconds.
    /// You may also set this via the SPHERE_HUB_TIMEOUT environment variable.
    /// By default requests wait for the hub indefinitely.
    #[arg(long, global = true)]
    timeout: Option<u64>,
}

impl HubArguments {
    pub fn hub_host(&self) -> anyhow::Result<String> {
        match &self.hub_host {
            Some(h) => Ok(h.to_string()),
            None => Ok(opt_env_var("SPHERE_HUB_HOST")?
                .unwrap_or_else(|| DEFAULT_HUB_HOST.to_string())),
        }
    }

    pub fn hub_port(&self) -> anyhow::Result<u16> {
        match self.hub_port {
            Some(p) => Ok(p),
            None => Ok(opt_env_var("SPHERE_HUB_PORT")?.unwrap_or(DEFAULT_HUB_PORT)),
        }
    }

    pub fn timeout(&self) -> anyhow::Result<Option<Duration>> {
        let secs = match self.timeout {
            Some(t) => Some(t),
            None => opt_env_var("SPHERE_HUB_TIMEOUT")?,
        };
        Ok(secs.map(Duration::from_secs))
    }

    pub fn base_url(&self) -> anyhow::Result<String> {
        Ok(format!("http://{}:{}", self.hub_host()?, self.hub_port()?))
    }

    pub fn hub_client(&self) -> anyhow::Result<HubClient> {
        HubClient::new(self.base_url()?, self.timeout()?)
    }
}

/// The two calls a prune run makes against the hub.
#[async_trait]
pub trait HubApi {
    /// Fetch the raw inventory body. Transport failures are reported
    /// and yield an empty body, which fails to decode downstream.
    async fn fetch_inventory(&self) -> Vec<u8>;

    /// Delete a single thing. Only a transport failure is an error;
    /// the response status and body are not inspected for success.
    async fn delete_thing(&self, id: &str) -> anyhow::Result<()>;
}

#[derive(Clone)]
pub struct HubClient {
    client: reqwest::Client,
    base_url: String,
}

impl HubClient {
    pub fn new<U: Into<String>>(base_url: U, timeout: Option<Duration>) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            client: builder.build().context("building HTTP client")?,
            base_url,
        })
    }

    pub fn things_url(&self) -> String {
        format!("{}/rest/v1/things", self.base_url)
    }

    pub fn thing_url(&self, id: &str) -> anyhow::Result<Url> {
        let things = self.things_url();
        let mut url = Url::parse(&things).with_context(|| format!("parsing {things}"))?;
        url.path_segments_mut()
            .map_err(|()| anyhow::anyhow!("{things} cannot have path segments"))?
            .push(id);
        Ok(url)
    }

    async fn get_things_body(&self) -> anyhow::Result<Vec<u8>> {
        let url = self.things_url();
        log::debug!("GET {url}");
        let response = self
            .client
            .request(Method::GET, &url)
            .send()
            .await
            .with_context(|| format!("request {url}"))?;

        let status = response.status();
        if !status.is_success() {
            log::warn!(
                "request {url} status {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("")
            );
        }

        let body = response
            .bytes()
            .await
            .with_context(|| format!("read {url} response body"))?;
        Ok(body.to_vec())
    }
}

#[async_trait]
impl HubApi for HubClient {
    async fn fetch_inventory(&self) -> Vec<u8> {
        match self.get_things_body().await {
            Ok(body) => body,
            Err(err) => {
                log::error!("Error. {err:#}");
                Vec::new()
            }
        }
    }

    async fn delete_thing(&self, id: &str) -> anyhow::Result<()> {
        let url = self.thing_url(id)?;
        log::debug!("DELETE {url}");
        let response = self
            .client
            .request(Method::DELETE, url.clone())
            .send()
            .await
            .with_context(|| format!("request DELETE {url}"))?;

        let status = response.status();
        if status.is_success() {
            log::debug!("DELETE {url} status {}", status.as_u16());
        } else {
            log::warn!(
                "DELETE {url} status {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("")
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use clap::Parser;
    use httpmock::prelude::*;
    use serde_json::json;

    // Nothing listens on the discard port
    const UNREACHABLE: &str = "http://127.0.0.1:9";

    #[test]
    fn hub_arguments() {
        let args = HubArguments::try_parse_from([
            "pruner",
            "--hub-host",
            "sphere.lan",
            "--hub-port",
            "9000",
        ])
        .unwrap();
        assert_eq!(args.base_url().unwrap(), "http://sphere.lan:9000");

        let args = HubArguments::try_parse_from(["pruner", "--timeout", "5"]).unwrap();
        assert_eq!(args.timeout().unwrap(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn endpoints() {
        let client = HubClient::new("http://ninjasphere.local:8000/", None).unwrap();
        assert_eq!(client.things_url(), "http://ninjasphere.local:8000/rest/v1/things");
        assert_eq!(
            client.thing_url("abc-123").unwrap().as_str(),
            "http://ninjasphere.local:8000/rest/v1/things/abc-123"
        );
        assert_eq!(
            client.thing_url("a/b c").unwrap().as_str(),
            "http://ninjasphere.local:8000/rest/v1/things/a%2Fb%20c"
        );
    }

    #[tokio::test]
    async fn fetch_inventory_returns_body() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET).path("/rest/v1/things");
            then.status(200).json_body(json!({"data": [
                {"id": "1", "type": "light", "name": "Lamp", "promoted": true},
            ]}));
        });

        let client = HubClient::new(server.base_url(), None).unwrap();
        let body = client.fetch_inventory().await;
        mock.assert();

        let things = crate::thing::Inventory::decode(&body).unwrap();
        assert_eq!(things.len(), 1);
        assert_eq!(things[0].name, "Lamp");
    }

    #[tokio::test]
    async fn fetch_inventory_unreachable_is_empty() {
        let client = HubClient::new(UNREACHABLE, Some(Duration::from_secs(5))).unwrap();
        assert!(client.fetch_inventory().await.is_empty());
    }

    #[tokio::test]
    async fn delete_thing_issues_delete_request() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(DELETE).path("/rest/v1/things/abc");
            then.status(200);
        });

        let client = HubClient::new(server.base_url(), None).unwrap();
        client.delete_thing("abc").await.unwrap();
        mock.assert();
    }

    #[tokio::test]
    async fn delete_thing_ignores_status() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(DELETE).path("/rest/v1/things/gone");
            then.status(404).body("not found");
        });

        let client = HubClient::new(server.base_url(), None).unwrap();
        client.delete_thing("gone").await.unwrap();
        mock.assert();
    }

    #[tokio::test]
    async fn delete_thing_transport_failure() {
        let client = HubClient::new(UNREACHABLE, Some(Duration::from_secs(5))).unwrap();
        let err = client.delete_thing("abc").await.unwrap_err();
        assert!(
            format!("{err:#}").contains("request DELETE http://127.0.0.1:9/rest/v1/things/abc"),
            "{err:#}"
        );
    }
}
