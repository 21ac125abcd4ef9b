// src/pipeline/reconcile.rs

//! Keeps the plan channel in sync with the newest rendering.
//!
//! The channel itself records what was posted last: the plan messages are
//! followed by a marker message (see [`BotMarker`]) holding their day, month
//! and count. Each run first recovers that state from the channel history,
//! then edits, appends or rewrites so the channel ends with the new messages
//! followed by exactly one up-to-date marker.

use crate::channel::{ChannelMessage, MessageChannel};
use crate::error::Result;
use crate::models::{BotMarker, MarkerKey};

/// How many recent messages are searched for the marker.
pub const HISTORY_LIMIT: usize = 20;

/// What a reconciliation run did to the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Existing messages and the marker were edited in place
    InPlace,
    /// Existing messages were edited, the marker was replaced after new ones
    PartialRewrite,
    /// Everything was posted fresh
    FullRewrite,
}

/// Protocol state recovered from the channel history.
#[derive(Debug)]
enum PostingState {
    /// No marker among the recent messages
    Unmarked,
    /// A marker exists but the messages before it cannot be reused
    Stale { marker: ChannelMessage },
    /// The marker and the plan messages it counts, oldest first
    Reusable {
        marker: ChannelMessage,
        existing: Vec<ChannelMessage>,
    },
}

impl PostingState {
    fn marker(&self) -> Option<&ChannelMessage> {
        match self {
            PostingState::Unmarked => None,
            PostingState::Stale { marker } | PostingState::Reusable { marker, .. } => Some(marker),
        }
    }
}

/// Reconciles one channel.
pub struct ChannelReconciler<'a, C: MessageChannel + ?Sized> {
    channel: &'a C,
}

impl<'a, C: MessageChannel + ?Sized> ChannelReconciler<'a, C> {
    pub fn new(channel: &'a C) -> Self {
        Self { channel }
    }

    /// Make the channel show `messages` followed by `marker`.
    pub async fn reconcile(
        &self,
        messages: &[String],
        marker: &BotMarker,
    ) -> Result<ReconcileOutcome> {
        let state = self.recover_state(marker.key).await?;
        let outcome = self.apply(state, messages, marker).await?;
        log::info!(
            "Reconciled {} plan messages ({:?})",
            messages.len(),
            outcome
        );
        Ok(outcome)
    }

    async fn recover_state(&self, key: MarkerKey) -> Result<PostingState> {
        let bot = self.channel.bot_user_id();
        let recent = self.channel.recent_messages(HISTORY_LIMIT).await?;

        let Some(marker) = recent
            .into_iter()
            .find(|m| m.author_id == bot && BotMarker::is_marker(&m.content))
        else {
            log::debug!("No bot marker among the last {HISTORY_LIMIT} messages");
            return Ok(PostingState::Unmarked);
        };

        let Some(previous) = BotMarker::parse(&marker.content) else {
            log::warn!(
                "Found invalid bot marker '{}' in message {}",
                marker.content.trim(),
                marker.id
            );
            return Ok(PostingState::Stale { marker });
        };

        // Error announcements are reused whatever they replace; a plan is
        // only reused for the same day.
        if matches!(previous.key, MarkerKey::Date { .. }) && previous.key != key {
            log::debug!("Marker {} belongs to another day", marker.id);
            return Ok(PostingState::Stale { marker });
        }

        let span = self
            .channel
            .messages_before(&marker.id, previous.count)
            .await?;

        if span.iter().any(|m| m.author_id != bot) {
            log::warn!(
                "Found foreign messages among the {} plan messages, rewriting",
                previous.count
            );
            for message in span.iter().filter(|m| m.author_id == bot && m.deletable) {
                self.channel.delete(&message.id).await?;
            }
            return Ok(PostingState::Stale { marker });
        }

        let mut existing = span;
        existing.reverse();
        Ok(PostingState::Reusable { marker, existing })
    }

    async fn apply(
        &self,
        state: PostingState,
        messages: &[String],
        marker: &BotMarker,
    ) -> Result<ReconcileOutcome> {
        let marker_text = marker.to_string();

        let locked = state
            .marker()
            .filter(|m| !m.editable || !m.deletable)
            .map(|m| m.id.clone());
        let state = match locked {
            Some(id) => {
                log::warn!("Marker {id} can't be edited or deleted, posting anew");
                PostingState::Unmarked
            }
            None => state,
        };

        match state {
            PostingState::Unmarked => {
                self.send_all(messages).await?;
                self.channel.send(&marker_text).await?;
                Ok(ReconcileOutcome::FullRewrite)
            }

            PostingState::Stale { marker } => {
                self.channel.delete(&marker.id).await?;
                self.send_all(messages).await?;
                self.channel.send(&marker_text).await?;
                Ok(ReconcileOutcome::FullRewrite)
            }

            PostingState::Reusable {
                marker,
                mut existing,
            } => {
                for (old, new) in existing.iter().zip(messages) {
                    self.edit_if_changed(old, new).await?;
                }

                if messages.len() > existing.len() {
                    self.channel.delete(&marker.id).await?;
                    self.send_all(&messages[existing.len()..]).await?;
                    self.channel.send(&marker_text).await?;
                    return Ok(ReconcileOutcome::PartialRewrite);
                }

                while existing.len() > messages.len() {
                    if let Some(surplus) = existing.pop() {
                        self.channel.delete(&surplus.id).await?;
                    }
                }
                self.edit_if_changed(&marker, &marker_text).await?;
                Ok(ReconcileOutcome::InPlace)
            }
        }
    }

    async fn send_all(&self, messages: &[String]) -> Result<()> {
        for message in messages {
            self.channel.send(message).await?;
        }
        Ok(())
    }

    async fn edit_if_changed(&self, old: &ChannelMessage, content: &str) -> Result<()> {
        if old.content == content {
            return Ok(());
        }
        self.channel.edit(&old.id, content).await
    }
}
