//! 進捗プッシュの購読（Socket.IO over WebSocket）
//!
//! 画面がアンマウントされたら Drop でソケットを閉じ、ハンドラも解放する

use reference_validator_common::push::{self, Packet, PushEvent, CONNECT_FRAME, PONG_FRAME};
use wasm_bindgen::prelude::*;
use web_sys::{CloseEvent, MessageEvent, WebSocket};

use super::{js_error, window};

pub struct PushSubscription {
    socket: WebSocket,
    _on_open: Closure<dyn FnMut(JsValue)>,
    _on_message: Closure<dyn FnMut(MessageEvent)>,
    _on_close: Closure<dyn FnMut(CloseEvent)>,
}

impl PushSubscription {
    /// ページと同じオリジンのエンドポイントへ接続
    ///
    /// # Arguments
    /// * `on_event` - デコード済みのイベントを受け取る
    pub fn connect<F>(on_event: F) -> Result<Self, String>
    where
        F: Fn(PushEvent) + 'static,
    {
        let origin = window()
            .and_then(|w| w.location().origin())
            .map_err(js_error)?;
        let socket = WebSocket::new(&push::socket_url(&origin)).map_err(js_error)?;

        let on_open = {
            let socket = socket.clone();
            Closure::<dyn FnMut(JsValue)>::new(move |_| {
                if let Err(e) = socket.send_with_str(CONNECT_FRAME) {
                    gloo::console::warn!(format!("push connect failed: {}", js_error(e)));
                }
            })
        };

        let on_message = {
            let socket = socket.clone();
            Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| {
                let Some(frame) = event.data().as_string() else {
                    return;
                };
                handle_frame(&socket, &frame, &on_event);
            })
        };

        let on_close = Closure::<dyn FnMut(CloseEvent)>::new(|event: CloseEvent| {
            gloo::console::log!(format!("push channel closed ({})", event.code()));
        });

        socket.set_onopen(Some(on_open.as_ref().unchecked_ref()));
        socket.set_onmessage(Some(on_message.as_ref().unchecked_ref()));
        socket.set_onclose(Some(on_close.as_ref().unchecked_ref()));

        Ok(Self {
            socket,
            _on_open: on_open,
            _on_message: on_message,
            _on_close: on_close,
        })
    }
}

fn handle_frame<F>(socket: &WebSocket, frame: &str, on_event: &F)
where
    F: Fn(PushEvent),
{
    let packet = match push::decode(frame) {
        Ok(packet) => packet,
        Err(e) => {
            gloo::console::warn!(format!("ignored push frame: {}", e));
            return;
        }
    };

    match &packet {
        Packet::Ping => {
            let _ = socket.send_with_str(PONG_FRAME);
        }
        Packet::ConnectError(message) => {
            gloo::console::warn!(format!("push channel rejected: {}", message));
        }
        Packet::Event { .. } => match PushEvent::from_packet(&packet) {
            Ok(Some(event)) => on_event(event),
            Ok(None) => {}
            Err(e) => gloo::console::warn!(format!("malformed push event: {}", e)),
        },
        _ => {}
    }
}

impl Drop for PushSubscription {
    fn drop(&mut self) {
        self.socket.set_onopen(None);
        self.socket.set_onmessage(None);
        self.socket.set_onclose(None);
        let _ = self.socket.close();
    }
}
