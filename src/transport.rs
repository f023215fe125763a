use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{header::HeaderMap, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::{
    documents::Document,
    error::{Error, TransportError},
};

/// A single request/response exchange with the GraphQL endpoint.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `document` with `variables` and returns the response's `data` member.
    ///
    /// Backend-reported `errors` surface as [`Error::Backend`]; anything that prevents a
    /// well-formed GraphQL response from being read surfaces as [`Error::Transport`].
    async fn execute(&self, document: &Document, variables: Option<Value>)
        -> Result<Value, Error>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn execute(
        &self,
        document: &Document,
        variables: Option<Value>,
    ) -> Result<Value, Error> {
        (**self).execute(document, variables).await
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GraphQlRequest<'a> {
    query: &'a str,
    operation_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    variables: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

impl GraphQlResponse {
    fn into_data(self) -> Result<Value, Error> {
        if !self.errors.is_empty() {
            return Err(Error::Backend(
                self.errors.into_iter().map(|e| e.message).collect(),
            ));
        }
        self.data
            .filter(|data| !data.is_null())
            .ok_or_else(|| TransportError::Malformed("response carries no data".to_owned()).into())
    }
}

/// GraphQL over HTTP POST with a JSON body.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpTransport {
    pub fn new(endpoint: Url, headers: HeaderMap) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;
        Ok(HttpTransport { client, endpoint })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(
        &self,
        document: &Document,
        variables: Option<Value>,
    ) -> Result<Value, Error> {
        // Only the operation name is logged; variables may carry keys and passphrases.
        debug!(operation = document.operation_name, "Sending GraphQL request");

        let request = GraphQlRequest {
            query: document.source,
            operation_name: document.operation_name,
            variables,
        };
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await
            .map_err(TransportError::from)?;

        let status = response.status();
        let body = response.bytes().await.map_err(TransportError::from)?;
        debug!(
            operation = document.operation_name,
            status = status.as_u16(),
            "Received GraphQL response"
        );

        match (status.is_success(), serde_json::from_slice::<GraphQlResponse>(&body)) {
            // Some servers report validation failures with a 4xx status and a regular body.
            (_, Ok(response)) if !response.errors.is_empty() => response.into_data(),
            (true, Ok(response)) => response.into_data(),
            (true, Err(e)) => Err(TransportError::Malformed(e.to_string()).into()),
            (false, _) => Err(TransportError::Status {
                code: status.as_u16(),
                body: String::from_utf8_lossy(&body).trim().to_owned(),
            }
            .into()),
        }
    }
}



#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::documents::{GET_ACCOUNTS, PING_API_VERSION};

    #[test]
    fn errors_take_precedence_over_data() {
        let response: GraphQlResponse = serde_json::from_value(json!({
            "data": { "createAccount": null },
            "errors": [{ "message": "duplicate name" }, { "message": "bad birth" }],
        }))
        .unwrap();
        match response.into_data() {
            Err(Error::Backend(messages)) => {
                assert_eq!(messages, vec!["duplicate name", "bad birth"])
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn missing_data_is_malformed() {
        let response: GraphQlResponse = serde_json::from_value(json!({})).unwrap();
        assert!(matches!(
            response.into_data(),
            Err(Error::Transport(TransportError::Malformed(_)))
        ));
    }

    #[tokio::test]
    async fn posts_document_and_returns_data() {
        let (url, server) = serve_one(200, r#"{"data":{"apiVersion":"1.0"}}"#).await;
        let transport = HttpTransport::new(url, HeaderMap::new()).unwrap();

        let data = transport.execute(&PING_API_VERSION, None).await.unwrap();
        assert_eq!(data, json!({ "apiVersion": "1.0" }));

        let seen = server.await.unwrap();
        assert_eq!(seen[0].body["operationName"], "PingApiVersion");
        assert_eq!(seen[0].body["query"], PING_API_VERSION.source);
        assert!(seen[0].body.get("variables").is_none());
        assert_eq!(seen[0].header("content-type"), Some("application/json"));
    }

    #[tokio::test]
    async fn error_status_without_graphql_body_is_transport_error() {
        let (url, server) = serve_one(502, "bad gateway").await;
        let transport = HttpTransport::new(url, HeaderMap::new()).unwrap();

        let err = transport.execute(&GET_ACCOUNTS, None).await.unwrap_err();
        match err {
            Error::Transport(TransportError::Status { code, body }) => {
                assert_eq!(code, 502);
                assert_eq!(body, "bad gateway");
            }
            other => panic!("unexpected {other:?}"),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn error_status_with_graphql_errors_is_backend_error() {
        let (url, server) = serve_one(400, r#"{"errors":[{"message":"unknown field"}]}"#).await;
        let transport = HttpTransport::new(url, HeaderMap::new()).unwrap();

        let err = transport.execute(&GET_ACCOUNTS, None).await.unwrap_err();
        assert!(matches!(err, Error::Backend(m) if m == vec!["unknown field".to_owned()]));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn connection_refused_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let url = Url::parse(&format!("http://{addr}/graphql")).unwrap();
        let transport = HttpTransport::new(url, HeaderMap::new()).unwrap();
        let err = transport.execute(&PING_API_VERSION, None).await.unwrap_err();
        assert!(matches!(err, Error::Transport(TransportError::Http(_))));
    }

    async fn serve_one(
        status: u16,
        body: &str,
    ) -> (Url, tokio::task::JoinHandle<Vec<responder::Seen>>) {
        responder::serve(vec![(status, body.to_owned())]).await
    }
}
