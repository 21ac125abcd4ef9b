// src/pipeline/announce.rs

//! Where cycle results go.

use async_trait::async_trait;

use crate::channel::{MESSAGE_LIMIT, MessageChannel, split_message};
use crate::error::{AppError, Result};
use crate::models::{BotMarker, TableInformation};
use crate::pipeline::reconcile::{ChannelReconciler, ReconcileOutcome};
use crate::services::{RoleTable, ScheduleRenderer, render_error};

/// Receives the result of each scrape cycle.
#[async_trait]
pub trait PlanSink: Send + Sync {
    async fn plan_received(&self, plan: &TableInformation) -> Result<()>;

    async fn scrape_failed(&self, error: &AppError) -> Result<()>;
}

/// Posts plans and failures to a chat channel.
pub struct Announcer<C> {
    channel: C,
    roles: RoleTable,
}

impl<C: MessageChannel> Announcer<C> {
    pub fn new(channel: C, roles: RoleTable) -> Self {
        Self { channel, roles }
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    async fn publish(
        &self,
        text: &str,
        marker: impl Fn(usize) -> BotMarker,
    ) -> Result<ReconcileOutcome> {
        let messages = split_message(text, MESSAGE_LIMIT);
        let marker = marker(messages.len());
        ChannelReconciler::new(&self.channel)
            .reconcile(&messages, &marker)
            .await
    }
}

#[async_trait]
impl<C: MessageChannel> PlanSink for Announcer<C> {
    async fn plan_received(&self, plan: &TableInformation) -> Result<()> {
        let text = ScheduleRenderer::new(&self.roles).render(plan);
        let (day, month) = plan.date_key();
        self.publish(&text, |count| BotMarker::for_plan(day, month, count))
            .await?;
        Ok(())
    }

    async fn scrape_failed(&self, error: &AppError) -> Result<()> {
        let text = render_error(error);
        self.publish(&text, BotMarker::for_error).await?;
        Ok(())
    }
}
