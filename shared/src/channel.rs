//! Method-channel dispatch
//!
//! The host framework delivers calls as a method name plus a JSON object
//! of arguments and expects a success value, an error code, or a "not
//! implemented" marker back. [`AncoEnvPlugin`] routes the four channel
//! methods to the [`EnvironmentProbe`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::ProbeConfig;
use crate::core::errors::{ChannelError, ChannelResult};
use crate::core::{AppBindings, EnvironmentProbe, ProbeContext};

/// Name of the channel the host registers
pub const CHANNEL_NAME: &str = "anco_env";

pub const METHOD_GET_PLATFORM_VERSION: &str = "getPlatformVersion";
pub const METHOD_IS_HARMONY_ANCO: &str = "isHarmonyAnco";
pub const METHOD_GET_ENV_INFO: &str = "getEnvInfo";
pub const METHOD_GET_PROP: &str = "getProp";

/// Every method the plugin answers
pub const METHODS: [&str; 4] = [
    METHOD_GET_PLATFORM_VERSION,
    METHOD_IS_HARMONY_ANCO,
    METHOD_GET_ENV_INFO,
    METHOD_GET_PROP,
];

/// Argument carrying the property name for `getProp`
pub const KEY_ARGUMENT: &str = "key";

/// Error message when `getProp` has no usable key
pub const MISSING_KEY_MESSAGE: &str = "Property key is null";

const SERIALIZATION_FAILURE_RESPONSE: &str =
    r#"{"status":"error","code":"SERIALIZATION_ERROR","message":"Failed to serialize response"}"#;

/// An incoming call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    pub method: String,
    #[serde(default)]
    pub arguments: Value,
}

impl MethodCall {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            arguments: Value::Null,
        }
    }

    pub fn with_argument(mut self, name: &str, value: impl Into<Value>) -> Self {
        if !self.arguments.is_object() {
            self.arguments = Value::Object(serde_json::Map::new());
        }
        if let Value::Object(map) = &mut self.arguments {
            map.insert(name.to_string(), value.into());
        }
        self
    }

    /// Typed argument lookup
    ///
    /// A missing argument, a JSON `null`, or a value of the wrong type all
    /// read as `None`.
    pub fn argument<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        self.arguments
            .get(name)
            .filter(|value| !value.is_null())
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }
}

/// Reply sent back to the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MethodResponse {
    Success {
        result: Value,
    },
    Error {
        code: String,
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        details: Option<Value>,
    },
    NotImplemented,
}

impl MethodResponse {
    pub fn is_success(&self) -> bool {
        matches!(self, MethodResponse::Success { .. })
    }

    /// The success value, if any
    pub fn result(&self) -> Option<&Value> {
        match self {
            MethodResponse::Success { result } => Some(result),
            _ => None,
        }
    }
}

impl From<ChannelError> for MethodResponse {
    fn from(error: ChannelError) -> Self {
        match error {
            ChannelError::NotImplemented { .. } => MethodResponse::NotImplemented,
            other => MethodResponse::Error {
                code: other.code().to_string(),
                message: other.to_string(),
                details: None,
            },
        }
    }
}

/// The anco_env channel handler
#[derive(Debug, Clone)]
pub struct AncoEnvPlugin {
    context: ProbeContext,
    config: ProbeConfig,
}

impl AncoEnvPlugin {
    pub fn new(context: ProbeContext, config: ProbeConfig) -> Self {
        Self { context, config }
    }

    /// Plugin backed by the running system with the default probe lists
    pub fn native() -> Self {
        Self::new(ProbeContext::native(), ProbeConfig::default())
    }

    pub fn with_config(mut self, config: ProbeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn context(&self) -> &ProbeContext {
        &self.context
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Bind the host application's services
    pub fn on_attached(&mut self, app: AppBindings) {
        self.context.attach(app);
        crate::log_debug!("{} attached to application", CHANNEL_NAME);
    }

    /// Release the host application's services
    pub fn on_detached(&mut self) {
        self.context.detach();
        crate::log_debug!("{} detached from application", CHANNEL_NAME);
    }

    pub fn is_attached(&self) -> bool {
        self.context.is_attached()
    }

    pub fn probe(&self) -> EnvironmentProbe<'_> {
        EnvironmentProbe::new(&self.context, &self.config)
    }

    pub fn on_method_call(&self, call: &MethodCall) -> MethodResponse {
        crate::log_debug!("Method call: {}", call.method);

        match self.dispatch(call) {
            Ok(result) => MethodResponse::Success { result },
            Err(e) => {
                crate::log_debug!("Method {} failed: {}", call.method, e);
                e.into()
            }
        }
    }

    fn dispatch(&self, call: &MethodCall) -> ChannelResult<Value> {
        let probe = self.probe();

        match call.method.as_str() {
            METHOD_GET_PLATFORM_VERSION => Ok(Value::String(probe.platform_version())),
            METHOD_IS_HARMONY_ANCO => Ok(Value::Bool(probe.is_harmony_variant())),
            METHOD_GET_ENV_INFO => Ok(serde_json::to_value(probe.environment_info())?),
            METHOD_GET_PROP => {
                let key: String =
                    call.argument(KEY_ARGUMENT)
                        .ok_or_else(|| ChannelError::InvalidArgument {
                            message: MISSING_KEY_MESSAGE.to_string(),
                        })?;
                Ok(probe
                    .get_property(&key)
                    .map(Value::String)
                    .unwrap_or(Value::Null))
            }
            other => Err(ChannelError::NotImplemented {
                method: other.to_string(),
            }),
        }
    }

    /// Handle a raw JSON request and return the JSON response
    pub fn handle_json(&self, request: &str) -> String {
        let response = match serde_json::from_str::<MethodCall>(request) {
            Ok(call) => self.on_method_call(&call),
            Err(e) => ChannelError::from(e).into(),
        };

        serde_json::to_string(&response)
            .unwrap_or_else(|_| SERIALIZATION_FAILURE_RESPONSE.to_string())
    }
}
