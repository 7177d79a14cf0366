use std::{sync::Arc, time::Duration};

use anyhow::Result;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use almanac_core::{ChatGateway, ChatId, OutboundMessage};

use crate::events::{EventContext, EventDispatcher, HandlerResult, TelegramUpdate};
use crate::transport::{TransportError, UpdateTransport};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self { max_retries: 5, base_delay_ms: 250, max_delay_ms: 5_000 }
    }
}

impl ReconnectPolicy {
    fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.min(16);
        let multiplier = 1_u64 << exponent;
        let delay_ms = self.base_delay_ms.saturating_mul(multiplier).min(self.max_delay_ms);
        Duration::from_millis(delay_ms)
    }
}

/// Long-polls for updates and hands each one to the dispatcher on its own task.
///
/// At most `max_concurrent` updates are in flight; polling waits for a free
/// slot before spawning the next one. The offset survives reconnects so an
/// update is never dispatched twice.
pub struct PollingRunner {
    transport: Arc<dyn UpdateTransport>,
    dispatcher: Arc<EventDispatcher>,
    gateway: Arc<dyn ChatGateway>,
    reconnect_policy: ReconnectPolicy,
    permits: Arc<Semaphore>,
}

impl PollingRunner {
    pub fn new(
        transport: Arc<dyn UpdateTransport>,
        dispatcher: Arc<EventDispatcher>,
        gateway: Arc<dyn ChatGateway>,
        reconnect_policy: ReconnectPolicy,
        max_concurrent: usize,
    ) -> Self {
        Self {
            transport,
            dispatcher,
            gateway,
            reconnect_policy,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    pub async fn start(&self) -> Result<()> {
        let mut offset = None;
        let mut attempt = 0;

        loop {
            let offset_before = offset;
            match self.connect_and_pump(attempt, &mut offset).await {
                Ok(()) => return Ok(()),
                Err(transport_error) => {
                    if offset != offset_before {
                        attempt = 0;
                    }

                    warn!(
                        event_name = "ingress.telegram.transport_failed",
                        attempt,
                        max_retries = self.reconnect_policy.max_retries,
                        error = %transport_error,
                        "telegram transport failed"
                    );

                    if attempt >= self.reconnect_policy.max_retries {
                        warn!(
                            max_retries = self.reconnect_policy.max_retries,
                            "telegram retries exhausted; stopping polling without crash"
                        );
                        return Ok(());
                    }

                    let delay = self.reconnect_policy.backoff(attempt);
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    attempt += 1;
                }
            }
        }
    }

    async fn connect_and_pump(
        &self,
        attempt: u32,
        offset: &mut Option<i64>,
    ) -> Result<(), TransportError> {
        let mut in_flight = JoinSet::new();
        let result = self.pump(attempt, offset, &mut in_flight).await;

        while let Some(joined) = in_flight.join_next().await {
            if let Err(error) = joined {
                warn!(error = %error, "update task panicked");
            }
        }
        result
    }

    async fn pump(
        &self,
        attempt: u32,
        offset: &mut Option<i64>,
        in_flight: &mut JoinSet<()>,
    ) -> Result<(), TransportError> {
        info!(attempt, "opening telegram transport connection");
        self.transport.connect().await?;
        info!(attempt, "telegram transport connected");

        loop {
            let Some(updates) = self.transport.poll_updates(*offset).await? else {
                info!(attempt, "telegram update stream closed");
                self.transport.disconnect().await?;
                return Ok(());
            };

            for update in updates {
                *offset = Some(update.update_id + 1);

                let Ok(permit) = self.permits.clone().acquire_owned().await else {
                    return Ok(());
                };
                let dispatcher = self.dispatcher.clone();
                let gateway = self.gateway.clone();
                in_flight.spawn(async move {
                    process_update(&dispatcher, gateway.as_ref(), update).await;
                    drop(permit);
                });
            }

            while let Some(joined) = in_flight.try_join_next() {
                if let Err(error) = joined {
                    warn!(error = %error, "update task panicked");
                }
            }
        }
    }
}

async fn process_update(
    dispatcher: &EventDispatcher,
    gateway: &dyn ChatGateway,
    update: TelegramUpdate,
) {
    let context = EventContext::for_update(&update);
    let chat_id = update.event.chat_id();

    info!(
        event_name = "ingress.telegram.update_received",
        update_id = update.update_id,
        event_type = ?update.event.event_type(),
        correlation_id = %context.correlation_id,
        chat_id = chat_id.unwrap_or_default(),
        "received telegram update"
    );

    match dispatcher.dispatch(&update, &context).await {
        Ok(HandlerResult::Responded(template)) => {
            let Some(chat_id) = chat_id else {
                return;
            };
            let message = OutboundMessage {
                chat_id: ChatId(chat_id.to_string()),
                text: template.text,
                format: template.format,
            };
            if let Err(error) = gateway.send(message).await {
                warn!(
                    event_name = "egress.telegram.reply_failed",
                    correlation_id = %context.correlation_id,
                    error = %error,
                    "failed to send reply"
                );
            }
        }
        Ok(result) => {
            debug!(
                event_name = "ingress.telegram.update_handled",
                correlation_id = %context.correlation_id,
                result = ?result,
                "update handled without direct reply"
            );
        }
        Err(error) => {
            warn!(
                correlation_id = %context.correlation_id,
                error = %error,
                "event dispatch failed; continuing polling loop"
            );
        }
    }
}
