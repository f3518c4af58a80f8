//! Hand-written doubles shared by the chat tests.

use super::orchestrator::ChatOrchestrator;
use async_trait::async_trait;
use penguin_core::auth::AccountStatus;
use penguin_core::chat::HistoryEntry;
use penguin_core::gateway::{AssistantGateway, AssistantReply, GatewayError};
use penguin_infrastructure::MemoryShareRepository;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

pub type RecordedCall = (String, Vec<HistoryEntry>);

/// Gateway that returns scripted results in order and records every call.
///
/// When gated, each `ask` waits for a permit released by the test.
pub struct ScriptedGateway {
    results: Mutex<VecDeque<Result<AssistantReply, GatewayError>>>,
    calls: Mutex<Vec<RecordedCall>>,
    gate: Option<Semaphore>,
}

impl ScriptedGateway {
    pub fn new(results: Vec<Result<AssistantReply, GatewayError>>) -> Arc<Self> {
        Arc::new(Self {
            results: Mutex::new(results.into()),
            calls: Mutex::new(Vec::new()),
            gate: None,
        })
    }

    pub fn replying<const N: usize>(replies: [&str; N]) -> Arc<Self> {
        Self::new(
            replies
                .into_iter()
                .map(|reply| Ok(AssistantReply::new(reply)))
                .collect(),
        )
    }

    pub fn failing(error: GatewayError) -> Arc<Self> {
        Self::new(vec![Err(error)])
    }

    pub fn gated<const N: usize>(replies: [&str; N]) -> Arc<Self> {
        Arc::new(Self {
            results: Mutex::new(
                replies
                    .into_iter()
                    .map(|reply| Ok(AssistantReply::new(reply)))
                    .collect(),
            ),
            calls: Mutex::new(Vec::new()),
            gate: Some(Semaphore::new(0)),
        })
    }

    /// Lets one gated call complete.
    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1);
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AssistantGateway for ScriptedGateway {
    async fn ask(
        &self,
        message: &str,
        history: &[HistoryEntry],
    ) -> Result<AssistantReply, GatewayError> {
        self.calls
            .lock()
            .unwrap()
            .push((message.to_string(), history.to_vec()));

        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }

        self.results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GatewayError::transport("no scripted result left")))
    }
}

/// Orchestrator over `gateway` with an in-memory share store.
pub fn orchestrator_with(
    gateway: Arc<ScriptedGateway>,
    account: AccountStatus,
) -> (ChatOrchestrator, Arc<MemoryShareRepository>) {
    let repository = Arc::new(MemoryShareRepository::new());
    let orchestrator = ChatOrchestrator::new(
        gateway,
        repository.clone(),
        Arc::new(account),
        "https://penguin.test",
    );
    (orchestrator, repository)
}
