//! `client-credentials-exchange`: customise tokens issued to a client.

use serde_json::Value;

use super::{context_object, PointSchema};
use crate::validation::{FieldAccess, Fields};
use crate::{ContextObject, ExtensibilityPointType, JsonObject, ValidationError};

/// `(client, scope, audience, context)`.
///
/// `scope` is `None` when the request carried no scope.
pub type ClientCredentialsArgs = (JsonObject, Option<Vec<Value>>, String, ContextObject);

/// Schema of the client-credentials-exchange point.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClientCredentialsExchange;

impl PointSchema for ClientCredentialsExchange {
    type Args = ClientCredentialsArgs;

    const POINT: ExtensibilityPointType = ExtensibilityPointType::ClientCredentialsExchange;
    const PARAMETERS: &'static [&'static str] = &["client", "scope", "audience", "context"];

    fn validate(body: &Value, webtask: Value) -> Result<Self::Args, ValidationError> {
        let fields = Fields::body(body)?;
        let client = fields.object_field("client")?.to_object();
        let scope = fields.optional_array("scope")?;
        let audience = fields.string("audience")?;
        let context = context_object(&fields, webtask)?;
        Ok((client, scope, audience, context))
    }
}
