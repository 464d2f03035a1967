//! In-process OBS websocket server for tests

use super::protocol::auth_response;
use serde_json::{json, Value};
use std::net::{TcpListener, TcpStream};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use tungstenite::protocol::frame::coding::CloseCode;
use tungstenite::protocol::CloseFrame;
use tungstenite::{Message, WebSocket};

const SALT: &str = "c2FsdA==";
const CHALLENGE: &str = "Y2hhbGxlbmdl";

/// Fake OBS instance listening on an ephemeral port
pub struct FakeObs {
    pub url: String,
    pub port: u16,
    toggles: Receiver<(i64, bool)>,
}

impl FakeObs {
    /// Only scene the fake knows about
    pub const SCENE: &'static str = "Live";

    /// Start serving connections until the test process exits
    pub fn spawn(password: Option<&str>, items: &[(&str, i64)]) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let url = format!("ws://{}", addr);
        let password = password.map(str::to_string);
        let items: Vec<Value> = items
            .iter()
            .map(|(name, id)| json!({"sourceName": name, "sceneItemId": id}))
            .collect();
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                let Ok(ws) = tungstenite::accept(stream) else {
                    continue;
                };
                serve(ws, password.as_deref(), &items, &tx);
            }
        });

        Self {
            url,
            port: addr.port(),
            toggles: rx,
        }
    }

    /// Next `SetSceneItemEnabled` call received, if any arrives soon
    pub fn next_toggle(&self) -> Option<(i64, bool)> {
        self.toggles.recv_timeout(Duration::from_secs(2)).ok()
    }
}

fn serve(
    mut ws: WebSocket<TcpStream>,
    password: Option<&str>,
    items: &[Value],
    toggles: &Sender<(i64, bool)>,
) {
    let mut hello = json!({"obsWebSocketVersion": "5.5.0", "rpcVersion": 1});
    if password.is_some() {
        hello["authentication"] = json!({"challenge": CHALLENGE, "salt": SALT});
    }
    if send(&mut ws, 0, hello).is_err() {
        return;
    }

    let Some(identify) = read(&mut ws) else { return };
    if let Some(password) = password {
        let expected = auth_response(password, SALT, CHALLENGE);
        if identify["d"]["authentication"] != json!(expected) {
            let _ = ws.close(Some(CloseFrame {
                code: CloseCode::from(4009),
                reason: "Authentication failed.".into(),
            }));
            while ws.read().is_ok() {}
            return;
        }
    }
    if send(&mut ws, 2, json!({"negotiatedRpcVersion": 1})).is_err() {
        return;
    }

    while let Some(request) = read(&mut ws) {
        let d = &request["d"];
        let request_type = d["requestType"].as_str().unwrap_or_default().to_string();
        let request_id = d["requestId"].clone();
        let data = &d["requestData"];

        let (status, response_data) = if data["sceneName"] != json!(FakeObs::SCENE) {
            (
                json!({"result": false, "code": 600, "comment": "No source was found"}),
                Value::Null,
            )
        } else if request_type == "GetSceneItemList" {
            (
                json!({"result": true, "code": 100}),
                json!({"sceneItems": items}),
            )
        } else if request_type == "SetSceneItemEnabled" {
            let id = data["sceneItemId"].as_i64().unwrap_or(-1);
            let enabled = data["sceneItemEnabled"].as_bool().unwrap_or(false);
            let _ = toggles.send((id, enabled));
            (json!({"result": true, "code": 100}), Value::Null)
        } else {
            (json!({"result": false, "code": 204}), Value::Null)
        };

        let mut response = json!({
            "requestType": request_type,
            "requestId": request_id,
            "requestStatus": status,
        });
        if !response_data.is_null() {
            response["responseData"] = response_data;
        }
        if send(&mut ws, 7, response).is_err() {
            return;
        }
    }
}

fn send(ws: &mut WebSocket<TcpStream>, op: u8, d: Value) -> tungstenite::Result<()> {
    ws.send(Message::Text(json!({"op": op, "d": d}).to_string().into()))
}

fn read(ws: &mut WebSocket<TcpStream>) -> Option<Value> {
    loop {
        match ws.read().ok()? {
            Message::Text(text) => return serde_json::from_str(&text).ok(),
            Message::Close(_) => return None,
            _ => continue,
        }
    }
}
