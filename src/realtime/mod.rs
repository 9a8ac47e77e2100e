//! Change-feed subscription against the hosted realtime service.
//!
//! The service speaks Phoenix-channel frames (`{topic, event, payload, ref}`)
//! over a WebSocket. We join one topic with a `postgres_changes` config
//! filtered to the current user's rows, forward every parsed row event to a
//! single registered handler, and keep the connection alive with a heartbeat
//! frame. Teardown is explicit: `unsubscribe()` clears the heartbeat timer,
//! detaches the handlers, and closes the socket, so no late callbacks can
//! reach unmounted state.

use crate::board::ChangeEvent;
use crate::models::Bookmark;
use leptos::logging::{log, warn};
use std::cell::Cell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

const BOOKMARKS_TOPIC: &str = "realtime:public:bookmarks";
const HEARTBEAT_INTERVAL_MS: i32 = 25_000;

/// `http(s)://host` -> `ws(s)://host/realtime/v1/websocket?...`.
pub(crate) fn websocket_url(base_url: &str, anon_key: &str) -> String {
    let ws_base = if let Some(rest) = base_url.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = base_url.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        base_url.to_string()
    };

    format!("{ws_base}/realtime/v1/websocket?apikey={anon_key}&vsn=1.0.0")
}

fn frame(topic: &str, event: &str, payload: serde_json::Value, frame_ref: u64) -> String {
    serde_json::json!({
        "topic": topic,
        "event": event,
        "payload": payload,
        "ref": frame_ref.to_string(),
    })
    .to_string()
}

/// Channel join push: subscribe to insert/update/delete on the bookmarks
/// relation, server-side filtered to the owner's rows.
pub(crate) fn join_frame(user_id: &str, access_token: &str, frame_ref: u64) -> String {
    frame(
        BOOKMARKS_TOPIC,
        "phx_join",
        serde_json::json!({
            "config": {
                "postgres_changes": [{
                    "event": "*",
                    "schema": "public",
                    "table": "bookmarks",
                    "filter": format!("user_id=eq.{user_id}"),
                }],
            },
            "access_token": access_token,
        }),
        frame_ref,
    )
}

pub(crate) fn heartbeat_frame(frame_ref: u64) -> String {
    frame("phoenix", "heartbeat", serde_json::json!({}), frame_ref)
}

/// Parse one incoming frame into a row event.
///
/// Anything that is not a well-formed `postgres_changes` frame (replies,
/// system messages, heartbeat acks, truncated payloads) yields `None`; the
/// caller decides whether that is worth a log line. On DELETE the service
/// only replays the primary key in `old_record`.
pub(crate) fn parse_change_frame(text: &str) -> Option<ChangeEvent> {
    let v: serde_json::Value = serde_json::from_str(text).ok()?;

    if v.get("event").and_then(|e| e.as_str()) != Some("postgres_changes") {
        return None;
    }

    let data = v.get("payload")?.get("data")?;
    match data.get("type").and_then(|t| t.as_str())? {
        "INSERT" => serde_json::from_value::<Bookmark>(data.get("record")?.clone())
            .ok()
            .map(ChangeEvent::Insert),
        "UPDATE" => serde_json::from_value::<Bookmark>(data.get("record")?.clone())
            .ok()
            .map(ChangeEvent::Update),
        "DELETE" => data
            .get("old_record")?
            .get("id")?
            .as_str()
            .map(|id| ChangeEvent::Delete(id.to_string())),
        _ => None,
    }
}

/// Live subscription handle. Keeps the JS closures alive for as long as the
/// socket may call back into them; dropping without `unsubscribe()` would
/// leave a dangling connection, so the owning component must tear down on
/// unmount.
pub(crate) struct RealtimeSubscription {
    socket: web_sys::WebSocket,
    heartbeat_id: Option<i32>,

    _on_open: Closure<dyn FnMut(web_sys::Event)>,
    _on_message: Closure<dyn FnMut(web_sys::MessageEvent)>,
    _on_error: Closure<dyn FnMut(web_sys::ErrorEvent)>,
    _on_close: Closure<dyn FnMut(web_sys::CloseEvent)>,
    _heartbeat: Closure<dyn FnMut()>,
}

impl RealtimeSubscription {
    /// Open the socket and register `on_event` as the single handler for row
    /// events. The join push goes out on open; events start flowing once the
    /// service acks it.
    pub fn subscribe(
        base_url: &str,
        anon_key: &str,
        user_id: &str,
        access_token: &str,
        on_event: impl Fn(ChangeEvent) + 'static,
    ) -> Result<Self, String> {
        let url = websocket_url(base_url, anon_key);
        let socket = web_sys::WebSocket::new(&url)
            .map_err(|_| format!("realtime: cannot open socket to {url}"))?;

        let frame_ref = Rc::new(Cell::new(0u64));
        let next_ref = move || {
            let r = frame_ref.get() + 1;
            frame_ref.set(r);
            r
        };
        let next_ref = Rc::new(next_ref);

        let join = {
            let socket = socket.clone();
            let next_ref = Rc::clone(&next_ref);
            let join_text = {
                let user_id = user_id.to_string();
                let access_token = access_token.to_string();
                move |r: u64| join_frame(&user_id, &access_token, r)
            };
            Closure::<dyn FnMut(web_sys::Event)>::new(move |_| {
                log!("realtime: socket open, joining {BOOKMARKS_TOPIC}");
                if socket.send_with_str(&join_text(next_ref())).is_err() {
                    warn!("realtime: join push failed");
                }
            })
        };
        socket.set_onopen(Some(join.as_ref().unchecked_ref()));

        let on_message = Closure::<dyn FnMut(web_sys::MessageEvent)>::new(
            move |ev: web_sys::MessageEvent| {
                let Some(text) = ev.data().as_string() else {
                    return;
                };
                if let Some(event) = parse_change_frame(&text) {
                    on_event(event);
                }
            },
        );
        socket.set_onmessage(Some(on_message.as_ref().unchecked_ref()));

        let on_error = Closure::<dyn FnMut(web_sys::ErrorEvent)>::new(
            move |_ev: web_sys::ErrorEvent| {
                warn!("realtime: socket error");
            },
        );
        socket.set_onerror(Some(on_error.as_ref().unchecked_ref()));

        let on_close =
            Closure::<dyn FnMut(web_sys::CloseEvent)>::new(move |ev: web_sys::CloseEvent| {
                log!("realtime: socket closed (code {})", ev.code());
            });
        socket.set_onclose(Some(on_close.as_ref().unchecked_ref()));

        let heartbeat = {
            let socket = socket.clone();
            let next_ref = Rc::clone(&next_ref);
            Closure::<dyn FnMut()>::new(move || {
                if socket.ready_state() == web_sys::WebSocket::OPEN {
                    let _ = socket.send_with_str(&heartbeat_frame(next_ref()));
                }
            })
        };

        let heartbeat_id = web_sys::window().and_then(|win| {
            win.set_interval_with_callback_and_timeout_and_arguments_0(
                heartbeat.as_ref().unchecked_ref(),
                HEARTBEAT_INTERVAL_MS,
            )
            .ok()
        });

        Ok(Self {
            socket,
            heartbeat_id,
            _on_open: join,
            _on_message: on_message,
            _on_error: on_error,
            _on_close: on_close,
            _heartbeat: heartbeat,
        })
    }

    /// Explicit teardown: stop the heartbeat, detach handlers, close.
    pub fn unsubscribe(self) {
        if let (Some(win), Some(id)) = (web_sys::window(), self.heartbeat_id) {
            win.clear_interval_with_handle(id);
        }

        self.socket.set_onopen(None);
        self.socket.set_onmessage(None);
        self.socket.set_onerror(None);
        self.socket.set_onclose(None);
        let _ = self.socket.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_websocket_url_scheme_swap() {
        assert_eq!(
            websocket_url("http://localhost:54321", "k"),
            "ws://localhost:54321/realtime/v1/websocket?apikey=k&vsn=1.0.0"
        );
        assert_eq!(
            websocket_url("https://proj.supabase.co", "k"),
            "wss://proj.supabase.co/realtime/v1/websocket?apikey=k&vsn=1.0.0"
        );
    }

    #[test]
    fn test_join_frame_scopes_to_owner() {
        let text = join_frame("u1", "jwt", 1);
        let v: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(v["topic"], "realtime:public:bookmarks");
        assert_eq!(v["event"], "phx_join");
        assert_eq!(v["ref"], "1");

        let change = &v["payload"]["config"]["postgres_changes"][0];
        assert_eq!(change["event"], "*");
        assert_eq!(change["table"], "bookmarks");
        assert_eq!(change["filter"], "user_id=eq.u1");
        assert_eq!(v["payload"]["access_token"], "jwt");
    }

    #[test]
    fn test_heartbeat_frame_shape() {
        let v: serde_json::Value = serde_json::from_str(&heartbeat_frame(7)).unwrap();
        assert_eq!(v["topic"], "phoenix");
        assert_eq!(v["event"], "heartbeat");
        assert_eq!(v["ref"], "7");
    }

    #[test]
    fn test_parse_insert_frame() {
        let text = r#"{
            "topic": "realtime:public:bookmarks",
            "event": "postgres_changes",
            "payload": {"data": {
                "type": "INSERT",
                "record": {"id": "b1", "title": "A", "url": "http://a", "user_id": "u1", "created_at": "t"},
                "schema": "public",
                "table": "bookmarks"
            }},
            "ref": null
        }"#;
        match parse_change_frame(text) {
            Some(ChangeEvent::Insert(b)) => assert_eq!(b.id, "b1"),
            other => panic!("expected Insert, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_update_frame() {
        let text = r#"{
            "event": "postgres_changes",
            "payload": {"data": {
                "type": "UPDATE",
                "record": {"id": "b2", "title": "B2", "url": "http://b", "user_id": "u1"},
                "old_record": {"id": "b2"}
            }}
        }"#;
        match parse_change_frame(text) {
            Some(ChangeEvent::Update(b)) => assert_eq!(b.title, "B2"),
            other => panic!("expected Update, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_delete_frame_uses_old_record_key() {
        // DELETE only replays the primary key.
        let text = r#"{
            "event": "postgres_changes",
            "payload": {"data": {"type": "DELETE", "old_record": {"id": "b3"}}}
        }"#;
        assert_eq!(
            parse_change_frame(text),
            Some(ChangeEvent::Delete("b3".to_string()))
        );
    }

    #[test]
    fn test_non_change_frames_are_ignored() {
        let reply = r#"{"topic": "realtime:public:bookmarks", "event": "phx_reply",
                        "payload": {"status": "ok", "response": {}}, "ref": "1"}"#;
        assert_eq!(parse_change_frame(reply), None);
        assert_eq!(parse_change_frame("not json"), None);
        assert_eq!(parse_change_frame("{}"), None);
    }

    #[test]
    fn test_truncated_delete_frame_is_ignored() {
        let text = r#"{"event": "postgres_changes", "payload": {"data": {"type": "DELETE"}}}"#;
        assert_eq!(parse_change_frame(text), None);
    }

    #[test]
    fn test_insert_frame_with_malformed_record_is_ignored() {
        let text = r#"{
            "event": "postgres_changes",
            "payload": {"data": {"type": "INSERT", "record": {"title": "no id"}}}
        }"#;
        assert_eq!(parse_change_frame(text), None);
    }
}
