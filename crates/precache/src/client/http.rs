//! Conversions between worker types and `reqwest`.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::error::{PrecacheError, PrecacheResult};
use crate::types::{Request, Response};

pub(crate) fn build_request(
    client: &reqwest::Client,
    request: &Request,
) -> PrecacheResult<reqwest::RequestBuilder> {
    let mut headers = HeaderMap::new();
    for (name, value) in &request.headers {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| PrecacheError::Network {
            message: format!("invalid header name {:?}: {}", name, e),
        })?;
        let value = HeaderValue::from_str(value).map_err(|e| PrecacheError::Network {
            message: format!("invalid header value for {}: {}", name, e),
        })?;
        headers.append(name, value);
    }

    let builder = client
        .request(request.method.clone(), request.url.clone())
        .headers(headers);

    if request.body.is_empty() {
        Ok(builder)
    } else {
        Ok(builder.body(request.body.clone()))
    }
}

pub(crate) async fn read_response(response: reqwest::Response) -> PrecacheResult<Response> {
    let status = response.status().as_u16();
    let url = response.url().to_string();
    let headers = header_pairs(response.headers());

    let body = response.bytes().await.map_err(|e| PrecacheError::Network {
        message: format!("failed to read response body: {}", e),
    })?;

    Ok(Response {
        status,
        headers,
        body: body.to_vec(),
        url,
    })
}

/// Headers as `(name, raw value)` pairs in wire order.
pub(crate) fn header_pairs(headers: &HeaderMap) -> Vec<(String, Vec<u8>)> {
    headers
        .iter()
        .map(|(name, value)| (name.as_str().to_string(), value.as_bytes().to_vec()))
        .collect()
}
