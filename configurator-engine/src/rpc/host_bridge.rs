//! Message bridge between the engine and the hosting web page.
//!
//! The host page owns all chrome: palette swatches, view buttons and the
//! finalize action arrive here as JSON commands posted into the canvas
//! window, and every chosen-color mutation goes back out as a full config
//! snapshot. Outbound traffic is fire-and-forget: messages are queued during
//! the frame and drained to `window.parent.postMessage` in one system, with
//! no acknowledgement, retry or back-pressure. On native builds the drain is
//! a no-op and commands come from debug keyboard shortcuts instead.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use web_sys::{MessageEvent, window};

use crate::engine::assets::part_registry::ChosenColors;
use crate::engine::camera::view_camera::{ViewChangeRequest, ViewMode};
use crate::engine::capture::CaptureRequest;
use crate::tools::color::ApplyColorRequest;

/// Outgoing message to the host page.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HostNotification {
    /// Full chosen-color snapshot, sent on every mutation.
    #[serde(rename_all = "camelCase")]
    ConfigUpdate {
        chassis: String,
        buttons: BTreeMap<String, String>,
        knobs: BTreeMap<String, String>,
    },
    /// A palette pick arrived with nothing selected.
    #[serde(rename_all = "camelCase")]
    InvalidSelection { reason: String },
    /// Capture succeeded; the PNG payload follows as a binary frame.
    #[serde(rename_all = "camelCase")]
    Checkout { image_bytes: usize },
}

/// Incoming command from the host page.
#[derive(Deserialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HostCommand {
    ApplyColor { name: String },
    SetView { mode: ViewMode },
    Finalize,
}

/// Resource queuing outbound traffic for the drain system.
#[derive(Resource, Default)]
pub struct HostBridge {
    outgoing: Vec<HostNotification>,
    binary_frames: Vec<Vec<u8>>,
    last_config: Option<HostNotification>,
}

impl HostBridge {
    /// Queues the full snapshot and remembers it for the checkout re-send.
    pub fn push_config(&mut self, chosen: &ChosenColors) {
        let message = HostNotification::ConfigUpdate {
            chassis: chosen.chassis.clone(),
            buttons: chosen.buttons.clone(),
            knobs: chosen.knobs.clone(),
        };
        self.last_config = Some(message.clone());
        self.outgoing.push(message);
    }

    /// Re-queues the last emitted config snapshot, if any.
    pub fn resend_last_config(&mut self) {
        if let Some(message) = self.last_config.clone() {
            self.outgoing.push(message);
        }
    }

    pub fn notify(&mut self, notification: HostNotification) {
        self.outgoing.push(notification);
    }

    pub fn queue_binary(&mut self, bytes: Vec<u8>) {
        self.binary_frames.push(bytes);
    }

    /// Messages queued and not yet drained.
    pub fn pending(&self) -> &[HostNotification] {
        &self.outgoing
    }
}

/// Registers the host bridge resource and its message pump.
pub struct HostBridgePlugin;

impl Plugin for HostBridgePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<HostBridge>()
            .add_event::<IncomingHostMessage>()
            .add_systems(
                Update,
                (
                    process_incoming_messages,
                    dispatch_host_commands,
                    send_outgoing_messages,
                )
                    .chain(),
            );

        #[cfg(target_arch = "wasm32")]
        app.add_systems(Startup, setup_message_listener);
    }
}

#[cfg(target_arch = "wasm32")]
fn setup_message_listener(mut commands: Commands) {
    use std::sync::Arc;
    use std::sync::Mutex;

    let message_queue: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let queue_clone = message_queue.clone();

    let closure = Closure::wrap(Box::new(move |event: MessageEvent| {
        if let Ok(data) = event.data().dyn_into::<js_sys::JsString>() {
            let message_str: String = data.into();

            // Only tagged command objects are worth queuing.
            if message_str.contains("\"type\"") {
                if let Ok(mut queue) = queue_clone.lock() {
                    queue.push(message_str);
                }
            }
        }
    }) as Box<dyn FnMut(MessageEvent)>);

    if let Some(window) = window() {
        if let Err(err) =
            window.add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
        {
            error!("failed to register message listener: {err:?}");
        }
    }

    // Ownership moves to the JS side for the page's lifetime.
    closure.forget();
    commands.insert_resource(MessageQueue(message_queue));
}

/// Resource wrapping the listener's thread-safe message queue.
#[derive(Resource)]
struct MessageQueue(std::sync::Arc<std::sync::Mutex<Vec<String>>>);

/// Event carrying one raw message from the host page.
#[derive(Event)]
struct IncomingHostMessage {
    content: String,
}

fn process_incoming_messages(
    message_queue: Option<Res<MessageQueue>>,
    mut message_events: EventWriter<IncomingHostMessage>,
) {
    let Some(queue_res) = message_queue else {
        return;
    };

    let messages = if let Ok(mut queue) = queue_res.0.lock() {
        std::mem::take(&mut *queue)
    } else {
        Vec::new()
    };

    for message_str in messages {
        message_events.write(IncomingHostMessage {
            content: message_str,
        });
    }
}

/// Parses raw host messages into the engine's command events.
fn dispatch_host_commands(
    mut events: EventReader<IncomingHostMessage>,
    mut color_events: EventWriter<ApplyColorRequest>,
    mut view_events: EventWriter<ViewChangeRequest>,
    mut capture_events: EventWriter<CaptureRequest>,
) {
    for event in events.read() {
        match serde_json::from_str::<HostCommand>(&event.content) {
            Ok(HostCommand::ApplyColor { name }) => {
                color_events.write(ApplyColorRequest { name });
            }
            Ok(HostCommand::SetView { mode }) => {
                view_events.write(ViewChangeRequest { mode });
            }
            Ok(HostCommand::Finalize) => {
                info!("finalize requested by host page");
                capture_events.write(CaptureRequest);
            }
            Err(parse_error) => {
                warn!("unrecognized host message: {parse_error}");
            }
        }
    }
}

/// Drains queued notifications (and any binary capture frames) to the host.
fn send_outgoing_messages(mut bridge: ResMut<HostBridge>) {
    for notification in bridge.outgoing.drain(..) {
        send_message_to_parent(&notification);
    }
    for frame in bridge.binary_frames.drain(..) {
        send_binary_to_parent(&frame);
    }
}

/// Posts one serialized message to the parent window.
fn send_message_to_parent<T: Serialize>(message: &T) {
    #[cfg(target_arch = "wasm32")]
    {
        match serde_json::to_string(message) {
            Ok(json) => {
                if let Some(window) = window() {
                    if let Some(parent) = window.parent().ok().flatten() {
                        if let Err(err) = parent.post_message(&JsValue::from_str(&json), "*") {
                            error!("failed to post message to parent: {err:?}");
                        }
                    } else {
                        warn!("no parent window available for message transmission");
                    }
                }
            }
            Err(err) => {
                error!("failed to serialize host message: {err}");
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
    }
}

fn send_binary_to_parent(bytes: &[u8]) {
    #[cfg(target_arch = "wasm32")]
    {
        if let Some(window) = window() {
            if let Some(parent) = window.parent().ok().flatten() {
                let payload = js_sys::Uint8Array::from(bytes);
                if let Err(err) = parent.post_message(&payload.into(), "*") {
                    error!("failed to post capture payload: {err:?}");
                }
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = bytes;
    }
}
