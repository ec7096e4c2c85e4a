use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;

pub const IPIFY_URL: &str = "https://api64.ipify.org?format=json";

#[derive(Debug, Deserialize)]
struct IpResponse {
    ip: String,
}

/// Look up the public IP address this machine reaches the internet with
///
/// Exchanges can restrict API keys to whitelisted addresses, so this is shown
/// to the user on request.
pub async fn fetch_public_ip(client: &Client, url: &str) -> Result<String> {
    let response = client
        .get(url)
        .send()
        .await
        .context("IP lookup request failed")?;

    if !response.status().is_success() {
        anyhow::bail!("IP lookup returned {}", response.status());
    }

    let data: IpResponse = response
        .json()
        .await
        .context("Failed to parse IP lookup response")?;

    Ok(data.ip)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_public_ip() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/")
            .match_query(mockito::Matcher::UrlEncoded("format".into(), "json".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"ip":"203.0.113.7"}"#)
            .create_async()
            .await;

        let url = format!("{}/?format=json", server.url());
        let ip = fetch_public_ip(&Client::new(), &url).await.unwrap();

        assert_eq!(ip, "203.0.113.7");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_public_ip_error_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/")
            .with_status(503)
            .create_async()
            .await;

        let result = fetch_public_ip(&Client::new(), &server.url()).await;
        assert!(result.is_err());
    }
}
