use async_trait::async_trait;
use std::collections::{BTreeSet, VecDeque};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use crate::domain::basket::{BasketId, BasketValidation, ValidationScope};
use crate::domain::checkout::ApiError;
use super::ValidationClient;

/// One recorded `validate` call
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationCall {
    pub basket_id: BasketId,
    pub scopes: BTreeSet<ValidationScope>,
}

#[derive(Debug, Clone)]
struct ScriptedOutcome {
    delay: Duration,
    result: Result<BasketValidation, ApiError>,
}

#[derive(Debug)]
struct Script {
    queued: VecDeque<ScriptedOutcome>,
    fallback: ScriptedOutcome,
    calls: Vec<ValidationCall>,
}

/// Replies with queued outcomes first, then with the fallback forever
#[derive(Debug)]
pub struct ScriptedValidationClient {
    script: Mutex<Script>,
}

impl ScriptedValidationClient {
    pub fn new(fallback: Result<BasketValidation, ApiError>) -> Self {
        Self {
            script: Mutex::new(Script {
                queued: VecDeque::new(),
                fallback: ScriptedOutcome {
                    delay: Duration::ZERO,
                    result: fallback,
                },
                calls: Vec::new(),
            }),
        }
    }

    pub fn returning(validation: BasketValidation) -> Self {
        Self::new(Ok(validation))
    }

    pub fn failing(error: ApiError) -> Self {
        Self::new(Err(error))
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn set_fallback(&self, result: Result<BasketValidation, ApiError>) {
        self.lock().fallback.result = result;
    }

    /// Answer the next call with `result` after `delay`
    pub fn enqueue(&self, delay: Duration, result: Result<BasketValidation, ApiError>) {
        self.lock().queued.push_back(ScriptedOutcome { delay, result });
    }

    pub fn calls(&self) -> Vec<ValidationCall> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }
}

#[async_trait]
impl ValidationClient for ScriptedValidationClient {
    async fn validate(
        &self,
        basket_id: &BasketId,
        scopes: &BTreeSet<ValidationScope>,
    ) -> Result<BasketValidation, ApiError> {
        let outcome = {
            let mut script = self.lock();
            script.calls.push(ValidationCall {
                basket_id: basket_id.clone(),
                scopes: scopes.clone(),
            });
            match script.queued.pop_front() {
                Some(outcome) => outcome,
                None => script.fallback.clone(),
            }
        };

        if !outcome.delay.is_zero() {
            tokio::time::sleep(outcome.delay).await;
        }
        outcome.result
    }
}
