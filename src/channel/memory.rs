//! In-memory channel for exercising the reconciler.

use std::sync::Mutex;

use async_trait::async_trait;

use super::{ChannelMessage, MessageChannel};
use crate::error::{AppError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Op {
    Send(String),
    Edit(String),
    Delete(String),
}

#[derive(Default)]
struct State {
    /// Oldest first
    messages: Vec<ChannelMessage>,
    next_id: u64,
    ops: Vec<Op>,
}

impl State {
    fn push(&mut self, author: &str, content: &str, own: bool) -> ChannelMessage {
        self.next_id += 1;
        let message = ChannelMessage {
            id: format!("{:06}", self.next_id),
            author_id: author.to_string(),
            content: content.to_string(),
            editable: own,
            deletable: own,
        };
        self.messages.push(message.clone());
        message
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.messages.iter().position(|m| m.id == id)
    }
}

pub(crate) struct MemoryChannel {
    bot: String,
    state: Mutex<State>,
}

impl MemoryChannel {
    pub(crate) fn new(bot: &str) -> Self {
        Self {
            bot: bot.to_string(),
            state: Mutex::new(State::default()),
        }
    }

    /// Post a message without recording an operation.
    pub(crate) fn post_as(&self, author: &str, content: &str) -> String {
        let own = author == self.bot;
        self.state.lock().unwrap().push(author, content, own).id
    }

    pub(crate) fn set_flags(&self, id: &str, editable: bool, deletable: bool) {
        let mut state = self.state.lock().unwrap();
        let pos = state.position(id).unwrap();
        state.messages[pos].editable = editable;
        state.messages[pos].deletable = deletable;
    }

    pub(crate) fn messages(&self) -> Vec<ChannelMessage> {
        self.state.lock().unwrap().messages.clone()
    }

    pub(crate) fn contents(&self) -> Vec<String> {
        self.messages().into_iter().map(|m| m.content).collect()
    }

    pub(crate) fn take_ops(&self) -> Vec<Op> {
        std::mem::take(&mut self.state.lock().unwrap().ops)
    }
}

#[async_trait]
impl MessageChannel for MemoryChannel {
    fn bot_user_id(&self) -> &str {
        &self.bot
    }

    async fn recent_messages(&self, limit: usize) -> Result<Vec<ChannelMessage>> {
        let state = self.state.lock().unwrap();
        Ok(state.messages.iter().rev().take(limit).cloned().collect())
    }

    async fn messages_before(&self, before: &str, limit: usize) -> Result<Vec<ChannelMessage>> {
        let state = self.state.lock().unwrap();
        let pos = state
            .position(before)
            .ok_or_else(|| AppError::channel("fetching messages", "unknown message"))?;
        Ok(state.messages[..pos]
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect())
    }

    async fn send(&self, content: &str) -> Result<ChannelMessage> {
        let mut state = self.state.lock().unwrap();
        let message = state.push(&self.bot, content, true);
        state.ops.push(Op::Send(content.to_string()));
        Ok(message)
    }

    async fn edit(&self, message_id: &str, content: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let pos = state
            .position(message_id)
            .ok_or_else(|| AppError::channel("editing message", "unknown message"))?;
        if state.messages[pos].author_id != self.bot {
            return Err(AppError::channel("editing message", "not the author"));
        }
        state.messages[pos].content = content.to_string();
        state.ops.push(Op::Edit(content.to_string()));
        Ok(())
    }

    async fn delete(&self, message_id: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let pos = state
            .position(message_id)
            .ok_or_else(|| AppError::channel("deleting message", "unknown message"))?;
        let removed = state.messages.remove(pos);
        state.ops.push(Op::Delete(removed.content));
        Ok(())
    }
}
