// Synapse Host - Frame Router
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// One inbound frame in, zero or one outbound frame out.
// tool_call -> dispatcher -> tool_result. Informational and unknown
// types are absorbed. Text that is not JSON, or an object without a
// type, is logged and dropped. JSON that is not an object at all is
// handed back as a frame fault for the connection loop.

use crate::dispatch::Dispatcher;
use crate::gate::Operator;
use crate::protocol::{FrameError, InboundFrame, OutboundFrame, ToolResult};
use crate::ui;

pub struct Router<O> {
    dispatcher: Dispatcher<O>,
}

impl<O: Operator> Router<O> {
    pub fn new(dispatcher: Dispatcher<O>) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &Dispatcher<O> {
        &self.dispatcher
    }

    /// Decode and route one text message
    pub async fn handle_text(&mut self, text: &str) -> Result<Option<OutboundFrame>, FrameError> {
        match InboundFrame::decode(text) {
            Ok(frame) => Ok(self.handle(frame).await),
            Err(FrameError::NotAnObject) => Err(FrameError::NotAnObject),
            Err(e) => {
                log::error!("Dropping malformed frame: {}", e);
                Ok(None)
            }
        }
    }

    pub async fn handle(&mut self, frame: InboundFrame) -> Option<OutboundFrame> {
        match frame {
            InboundFrame::ToolCall(call) => {
                ui::print_request(&call.name, &call.arguments);
                let output = self.dispatcher.dispatch(&call.name, &call.arguments).await;
                let result = ToolResult::new(call.call_id, call.name, output);
                ui::print_result(&result);
                Some(OutboundFrame::ToolResult(result))
            }
            InboundFrame::Informational(kind) => {
                log::debug!("Ignoring {} frame", kind);
                None
            }
            InboundFrame::Unknown(kind) => {
                log::debug!("Ignoring unknown frame type {}", kind);
                None
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
