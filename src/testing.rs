//! Recording host double for unit tests.

use std::cell::RefCell;

use serde_json::{Map, Value, json};

use crate::error::HostError;
use crate::msg::SessionId;
use crate::plugin::host::{Host, LogLevel};

#[derive(Debug, Default)]
pub struct FakeHost {
    models: Vec<String>,
    catalog_error: Option<String>,
    activation_error: Option<String>,
    panic_on_activation: bool,
    activations: RefCell<Vec<(String, String)>>,
    logs: RefCell<Vec<(LogLevel, String)>>,
}

impl FakeHost {
    pub fn with_models(models: &[&str]) -> Self {
        Self {
            models: models.iter().map(|m| m.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn failing_catalog(mut self, message: &str) -> Self {
        self.catalog_error = Some(message.to_string());
        self
    }

    pub fn failing_activation(mut self, message: &str) -> Self {
        self.activation_error = Some(message.to_string());
        self
    }

    pub fn panicking_activation(mut self) -> Self {
        self.panic_on_activation = true;
        self
    }

    pub fn activations(&self) -> Vec<(String, String)> {
        self.activations.borrow().clone()
    }

    pub fn logs(&self) -> Vec<(LogLevel, String)> {
        self.logs.borrow().clone()
    }
}

impl Host for FakeHost {
    fn providers(&self) -> Result<Value, HostError> {
        if let Some(message) = &self.catalog_error {
            return Err(HostError::new(message.clone()));
        }

        let models: Map<String, Value> = self
            .models
            .iter()
            .map(|id| (id.clone(), json!({ "id": id })))
            .collect();
        Ok(json!({ "data": { "providers": [{ "id": "fake", "models": models }] } }))
    }

    fn set_session_model(&self, session: &SessionId, model: &str) -> Result<(), HostError> {
        if self.panic_on_activation {
            panic!("host blew up");
        }
        if let Some(message) = &self.activation_error {
            return Err(HostError::new(message.clone()));
        }
        self.activations
            .borrow_mut()
            .push((session.as_str().to_string(), model.to_string()));
        Ok(())
    }

    fn log(&self, level: LogLevel, message: &str) {
        self.logs.borrow_mut().push((level, message.to_string()));
    }
}
