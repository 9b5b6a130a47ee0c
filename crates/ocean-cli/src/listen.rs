//! Websocket relay for live logs and console sessions.
//!
//! ```text
//!   server frames ──▶ decode ──▶ out (stdout)
//!   input channel ──────────────▶ server
//! ```
//!
//! The relay ends when the server closes, the input channel closes, or
//! Ctrl-C arrives. There is no reconnect.

use std::future::Future;
use std::io::Write;

use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tracing::debug;
use url::Url;

use crate::error::CliError;

/// Turns a raw server frame into the bytes written to the output.
pub type Decoder = fn(&[u8]) -> Result<Vec<u8>, CliError>;

/// A streaming connection.
pub trait Listener {
    /// Relay frames between the server at `url` and `out` until either side
    /// stops.
    fn listen<W: Write>(
        &self,
        url: &Url,
        token: &str,
        decode: Decoder,
        out: &mut W,
        input: Option<mpsc::Receiver<String>>,
    ) -> impl Future<Output = Result<(), CliError>>;
}

/// Websocket listener over `tokio-tungstenite`.
#[derive(Debug, Default, Clone, Copy)]
pub struct WsListener;

impl Listener for WsListener {
    async fn listen<W: Write>(
        &self,
        url: &Url,
        token: &str,
        decode: Decoder,
        out: &mut W,
        mut input: Option<mpsc::Receiver<String>>,
    ) -> Result<(), CliError> {
        let mut request = url
            .as_str()
            .into_client_request()
            .map_err(|e| CliError::Stream(e.to_string()))?;
        let auth = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|e| CliError::Stream(e.to_string()))?;
        request.headers_mut().insert(AUTHORIZATION, auth);

        debug!(host = url.host_str().unwrap_or_default(), "connecting stream");
        let (socket, _) = connect_async(request)
            .await
            .map_err(|e| CliError::Stream(e.to_string()))?;
        let (mut sink, mut stream) = socket.split();
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                frame = stream.next() => match frame {
                    Some(Ok(Message::Text(text))) => write_frame(out, decode, text.as_bytes())?,
                    Some(Ok(Message::Binary(bytes))) => write_frame(out, decode, &bytes)?,
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(CliError::Stream(e.to_string())),
                },
                message = next_input(&mut input) => match message {
                    Some(text) => sink
                        .send(Message::Text(text))
                        .await
                        .map_err(|e| CliError::Stream(e.to_string()))?,
                    None => break,
                },
                _ = &mut ctrl_c => break,
            }
        }

        if let Err(e) = sink.send(Message::Close(None)).await {
            debug!(error = %e, "stream close failed");
        }
        Ok(())
    }
}

async fn next_input(input: &mut Option<mpsc::Receiver<String>>) -> Option<String> {
    match input {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

fn write_frame<W: Write>(out: &mut W, decode: Decoder, frame: &[u8]) -> Result<(), CliError> {
    let data = decode(frame)?;
    out.write_all(&data)?;
    out.flush()?;
    Ok(())
}

#[derive(Deserialize)]
struct DataFrame {
    data: String,
}

/// Decode `{"data": "..."}` frames.
///
/// # Errors
///
/// Returns an error if the frame is not such an object.
pub fn decode_data(frame: &[u8]) -> Result<Vec<u8>, CliError> {
    let frame: DataFrame = serde_json::from_slice(frame)?;
    Ok(frame.data.into_bytes())
}

/// Decode `{"data": "..."}` frames and drop the leading component token of
/// each line.
///
/// # Errors
///
/// Returns an error if the frame is not such an object.
pub fn decode_data_no_prefix(frame: &[u8]) -> Result<Vec<u8>, CliError> {
    let frame: DataFrame = serde_json::from_slice(frame)?;
    Ok(strip_prefix(&frame.data).into_bytes())
}

/// Remove the first whitespace-delimited token of every line.
pub fn strip_prefix(text: &str) -> String {
    text.split_inclusive('\n')
        .map(|line| match line.split_once(' ') {
            Some((_, rest)) => rest,
            None => line,
        })
        .collect()
}

/// Rewrite an `https`/`http` stream URL to `wss`/`ws` and pull out its
/// `token` query parameter.
///
/// # Errors
///
/// Returns an error if the URL does not parse.
pub fn stream_url(raw: &str) -> Result<(Url, String), CliError> {
    let mut url = Url::parse(raw).map_err(|e| CliError::Stream(format!("invalid stream URL: {e}")))?;
    let scheme = match url.scheme() {
        "https" => Some("wss"),
        "http" => Some("ws"),
        _ => None,
    };
    if let Some(scheme) = scheme {
        url.set_scheme(scheme)
            .map_err(|()| CliError::Stream(format!("cannot rewrite scheme of {raw}")))?;
    }
    let token = url
        .query_pairs()
        .find(|(key, _)| key == "token")
        .map(|(_, value)| value.into_owned())
        .unwrap_or_default();
    Ok((url, token))
}

#[cfg(test)]
mod tests {
    use tokio::net::TcpListener;
    use tokio_tungstenite::accept_hdr_async;
    use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};

    use super::*;

    /// Accept one connection, send a log frame, read one input frame, then
    /// close. Returns the `Authorization` header and the input frame.
    async fn serve_once(listener: TcpListener) -> (String, String) {
        let (stream, _) = listener.accept().await.expect("accept");
        let mut auth = String::new();
        let callback = |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
            auth = req
                .headers()
                .get(AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            Ok(resp)
        };
        let mut ws = accept_hdr_async(stream, callback).await.expect("handshake");

        ws.send(Message::Text(r#"{"data":"web hello\n"}"#.into()))
            .await
            .expect("send frame");
        let input = ws
            .next()
            .await
            .expect("input frame")
            .expect("read frame")
            .into_text()
            .expect("text frame");
        ws.close(None).await.expect("close");
        (auth, input)
    }

    #[tokio::test]
    async fn test_ws_listener_relays_both_ways() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        let server = tokio::spawn(serve_once(listener));

        let (url, token) = stream_url(&format!("http://{addr}/logs?token=tok-1")).expect("url");
        assert_eq!(url.scheme(), "ws");
        let (tx, rx) = mpsc::channel(4);
        tx.send(r#"{"op":"stdin","data":"ls\n"}"#.to_string())
            .await
            .expect("queue input");
        let mut out = Vec::new();

        WsListener
            .listen(&url, &token, decode_data, &mut out, Some(rx))
            .await
            .expect("listen");
        drop(tx);

        let (auth, input) = server.await.expect("server task");
        assert_eq!(auth, "Bearer tok-1");
        assert_eq!(input, r#"{"op":"stdin","data":"ls\n"}"#);
        assert_eq!(out, b"web hello\n");
    }

    #[test]
    fn test_stream_url_rewrites_scheme_and_reads_token() {
        let (url, token) =
            stream_url("https://proxy-apps-prod-ams3-001.ondigitalocean.app/?token=aa-bb-11-cc-33").expect("url");
        assert_eq!(
            url.as_str(),
            "wss://proxy-apps-prod-ams3-001.ondigitalocean.app/?token=aa-bb-11-cc-33"
        );
        assert_eq!(token, "aa-bb-11-cc-33");

        let (url, token) = stream_url("http://localhost:8080/logs").expect("url");
        assert_eq!(url.as_str(), "ws://localhost:8080/logs");
        assert_eq!(token, "");
    }

    #[test]
    fn test_decode_data() {
        let bytes = decode_data(br#"{"data":"web 2024-01-01 hello\n"}"#).expect("decode");
        assert_eq!(bytes, b"web 2024-01-01 hello\n");
        assert!(decode_data(b"not json").is_err());
    }

    #[test]
    fn test_decode_data_no_prefix() {
        let bytes = decode_data_no_prefix(br#"{"data":"web line one\nweb line two\n"}"#).expect("decode");
        assert_eq!(bytes, b"line one\nline two\n");
    }

    #[test]
    fn test_strip_prefix_keeps_single_token_lines() {
        assert_eq!(strip_prefix("alone\nweb text"), "alone\ntext");
    }
}
