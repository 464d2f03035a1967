//! Blocking obs-websocket client
//!
//! Connects, performs the Hello/Identify handshake and sends requests one
//! at a time, waiting for the matching response.

use super::protocol::{
    auth_response, encode, op, Envelope, Hello, Identify, Request, RequestResponse,
    SceneItemList, RPC_VERSION,
};
use crate::error::ObsError;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;
use tungstenite::client::IntoClientRequest;
use tungstenite::handshake::client::Request as WsRequest;
use tungstenite::{HandshakeError, Message, WebSocket};

/// Close code OBS sends when the password is wrong
const CLOSE_AUTH_FAILED: u16 = 4009;

/// How long to wait for the TCP connection to OBS
const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// How long to wait for any single message from OBS
const READ_TIMEOUT: Duration = Duration::from_secs(5);

type Socket = WebSocket<TcpStream>;

/// Identified connection to OBS
pub struct ObsClient {
    socket: Socket,
    next_id: u64,
    version: Option<String>,
}

impl ObsClient {
    /// Connect and identify
    ///
    /// `password` is only used when OBS asks for authentication.
    pub fn connect(url: &str, password: &str) -> Result<Self, ObsError> {
        let request = url.into_client_request()?;
        let stream = open_stream(&request)?;
        let (socket, _) = tungstenite::client(request, stream).map_err(|e| match e {
            HandshakeError::Failure(err) => ObsError::from(err),
            HandshakeError::Interrupted(_) => {
                ObsError::Handshake("no answer to the websocket upgrade".to_string())
            }
        })?;

        let mut client = Self {
            socket,
            next_id: 1,
            version: None,
        };
        client.identify(password)?;
        Ok(client)
    }

    fn identify(&mut self, password: &str) -> Result<(), ObsError> {
        let hello: Hello = self.expect(op::HELLO)?;
        log::debug!(
            "OBS hello: websocket {} rpc {}",
            hello.obs_web_socket_version.as_deref().unwrap_or("?"),
            hello.rpc_version
        );

        let authentication = hello
            .authentication
            .map(|c| auth_response(password, &c.salt, &c.challenge));

        self.send(encode(
            op::IDENTIFY,
            Identify {
                rpc_version: RPC_VERSION,
                authentication,
                event_subscriptions: 0,
            },
        )?)?;

        let _: Value = self.expect(op::IDENTIFIED)?;
        self.version = hello.obs_web_socket_version;
        Ok(())
    }

    /// obs-websocket version reported in the handshake
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Send a request and wait for its response data
    pub fn request(&mut self, request_type: &str, data: Value) -> Result<Option<Value>, ObsError> {
        let request_id = self.next_id.to_string();
        self.next_id += 1;

        self.send(encode(
            op::REQUEST,
            Request {
                request_type,
                request_id: request_id.clone(),
                request_data: data,
            },
        )?)?;

        loop {
            let envelope = self.read_envelope()?;
            if envelope.op != op::REQUEST_RESPONSE {
                continue;
            }

            let response: RequestResponse = serde_json::from_value(envelope.d)?;
            if response.request_id != request_id {
                log::debug!("Ignoring response to request {}", response.request_id);
                continue;
            }

            if !response.request_status.result {
                return Err(ObsError::RequestFailed {
                    request: response.request_type,
                    code: response.request_status.code,
                    comment: response.request_status.comment.unwrap_or_default(),
                });
            }
            return Ok(response.response_data);
        }
    }

    /// Look up the scene item id of a source within a scene
    pub fn scene_item_id(&mut self, scene: &str, source: &str) -> Result<i64, ObsError> {
        let data = self
            .request("GetSceneItemList", json!({ "sceneName": scene }))?
            .unwrap_or(Value::Null);
        let list: SceneItemList = serde_json::from_value(data)?;

        list.scene_items
            .into_iter()
            .find(|item| item.source_name == source)
            .map(|item| item.scene_item_id)
            .ok_or_else(|| ObsError::SourceNotFound {
                scene: scene.to_string(),
                source_name: source.to_string(),
            })
    }

    /// Show or hide a scene item
    pub fn set_scene_item_enabled(
        &mut self,
        scene: &str,
        scene_item_id: i64,
        enabled: bool,
    ) -> Result<(), ObsError> {
        self.request(
            "SetSceneItemEnabled",
            json!({
                "sceneName": scene,
                "sceneItemId": scene_item_id,
                "sceneItemEnabled": enabled,
            }),
        )?;
        Ok(())
    }

    /// Close the connection
    pub fn disconnect(mut self) {
        if let Err(e) = self.socket.close(None) {
            log::debug!("Error closing OBS connection: {}", e);
        }
        // Drain until the close handshake completes or the socket errors
        while self.socket.read().is_ok() {}
    }

    fn send(&mut self, text: String) -> Result<(), ObsError> {
        self.socket.send(Message::Text(text.into()))?;
        Ok(())
    }

    fn expect<T: DeserializeOwned>(&mut self, expected: u8) -> Result<T, ObsError> {
        let envelope = self.read_envelope()?;
        if envelope.op != expected {
            return Err(ObsError::Handshake(format!(
                "expected op {}, got op {}",
                expected, envelope.op
            )));
        }
        Ok(serde_json::from_value(envelope.d)?)
    }

    fn read_envelope(&mut self) -> Result<Envelope, ObsError> {
        loop {
            match self.socket.read()? {
                Message::Text(text) => return Ok(serde_json::from_str(&text)?),
                Message::Close(frame) => {
                    let code = frame.map(|f| u16::from(f.code));
                    return Err(if code == Some(CLOSE_AUTH_FAILED) {
                        ObsError::AuthFailed
                    } else {
                        ObsError::Closed
                    });
                }
                _ => continue,
            }
        }
    }
}

/// Open a TCP connection to the request's host, bounded by [`CONNECT_TIMEOUT`]
fn open_stream(request: &WsRequest) -> Result<TcpStream, ObsError> {
    let uri = request.uri();
    let host = uri
        .host()
        .map(|h| h.trim_start_matches('[').trim_end_matches(']'))
        .ok_or_else(|| ObsError::Handshake(format!("no host in {}", uri)))?;
    let port = uri.port_u16().unwrap_or(4455);

    let addrs = (host, port).to_socket_addrs().map_err(io_error)?;
    let mut last_err = None;
    for addr in addrs {
        match TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT) {
            Ok(stream) => {
                stream.set_read_timeout(Some(READ_TIMEOUT)).map_err(io_error)?;
                return Ok(stream);
            }
            Err(e) => last_err = Some(e),
        }
    }

    Err(match last_err {
        Some(e) => io_error(e),
        None => ObsError::Handshake(format!("{} did not resolve to any address", host)),
    })
}

fn io_error(err: std::io::Error) -> ObsError {
    ObsError::from(tungstenite::Error::Io(err))
}

impl std::fmt::Debug for ObsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObsClient")
            .field("next_id", &self.next_id)
            .field("version", &self.version)
            .finish()
    }
}
