use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Raw response kept around so failures can quote the body.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, String> {
        serde_json::from_str(&self.body).map_err(|e| format!("invalid response JSON: {e}"))
    }

    /// `"<status>: <body>"`, the diagnostic carried by failed outcomes.
    pub fn describe(&self) -> String {
        format!("{}: {}", self.status, self.body)
    }
}

/// Blocking JSON client shared by the platform adapters.
///
/// Non-2xx statuses come back as an [`HttpResponse`]; only transport
/// failures (DNS, refused connection, timeout) are an `Err`.
#[derive(Debug, Clone)]
pub struct HttpClient {
    agent: ureq::Agent,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl HttpClient {
    pub fn new(timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }

    pub fn get(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        query: &[(&str, String)],
    ) -> Result<HttpResponse, String> {
        let mut request = self.agent.get(url);
        for (name, value) in headers {
            request = request.set(name, value);
        }
        for (name, value) in query {
            request = request.query(name, value);
        }
        finish(request.call())
    }

    pub fn send_json<B: Serialize + ?Sized>(
        &self,
        method: &str,
        url: &str,
        headers: &[(&str, &str)],
        body: &B,
    ) -> Result<HttpResponse, String> {
        let body = serde_json::to_string(body).map_err(|e| format!("failed to encode request: {e}"))?;
        let mut request = self
            .agent
            .request(method, url)
            .set("Content-Type", "application/json");
        for (name, value) in headers {
            request = request.set(name, value);
        }
        tracing::debug!(method, url, "sending request");
        finish(request.send_string(&body))
    }
}

fn finish(result: Result<ureq::Response, ureq::Error>) -> Result<HttpResponse, String> {
    match result {
        Ok(response) => into_response(response),
        Err(ureq::Error::Status(_, response)) => into_response(response),
        Err(ureq::Error::Transport(transport)) => Err(transport.to_string()),
    }
}

fn into_response(response: ureq::Response) -> Result<HttpResponse, String> {
    let status = response.status();
    let body = response
        .into_string()
        .map_err(|e| format!("failed to read response body: {e}"))?;
    Ok(HttpResponse { status, body })
}
